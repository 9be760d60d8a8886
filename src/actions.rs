//! The linear pipeline: config -> server -> location -> session.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cli::Args;
use crate::inventory::{self, Inventory, InventoryError};
use crate::menu::{self, Selector};
use crate::persistence;
use crate::ssh;

/// Sentinel for the remote home directory. Resolved by querying the
/// remote `$HOME` only when it is actually picked.
const HOME_SENTINEL: &str = "~";
const ROOT_SENTINEL: &str = "/";

pub fn handle(args: Args) -> Result<()> {
    let selector = menu::backend(args.plain);

    let config_path = select_config(&args, selector.as_ref())?;
    let inventory = persistence::load_inventory(&config_path)?;

    let host = select_server(&inventory, selector.as_ref())?;
    println!("Show locations for {host}...");

    let location =
        select_location(&inventory, &host, &args, selector.as_ref())?;

    let command = ssh::SessionCommand::new(&host, &location);

    if args.interactive && !confirm(&command.render())? {
        println!("Exiting...");
        return Ok(());
    }

    let status = command.spawn()?;
    if !status.success() {
        bail!("Remote session exited with {status}");
    }

    Ok(())
}

fn select_config(args: &Args, selector: &dyn Selector) -> Result<PathBuf> {
    if let Some(file) = &args.config_file {
        return Ok(persistence::resolve_path(file)?);
    }

    println!("Browse '{}' directories...", args.browse_dirs);

    let files = persistence::discover_config_files(
        &args.browse_dirs,
        !args.browse_dirs_overridden(),
    )?;

    let Some(file) = selector.choose("Config files", &files)? else {
        bail!("No config file selected!");
    };

    Ok(PathBuf::from(file))
}

fn select_server(
    inventory: &Inventory,
    selector: &dyn Selector,
) -> Result<String> {
    let rows = inventory.server_rows();

    let Some(row) = selector.choose("Servers", &rows)? else {
        bail!("No server selected!");
    };

    Ok(inventory::hostname_of_row(&row).to_string())
}

fn select_location(
    inventory: &Inventory,
    host: &str,
    args: &Args,
    selector: &dyn Selector,
) -> Result<String> {
    let candidates = location_candidates(inventory, host)?;

    let title = format!("Locations on {host}");
    let Some(picked) = selector.choose(&title, &candidates)? else {
        bail!("No location selected!");
    };

    let mut location = if picked == HOME_SENTINEL {
        ssh::remote_home(host)?
    } else {
        picked
    };

    if args.fuzzy_search {
        let dirs = ssh::list_remote_dirs(host, &location, args.fuzzy_depth)?;
        if dirs.is_empty() {
            bail!("No directories found!");
        }

        let title = format!("Directories under {location}");
        let Some(dir) = selector.choose(&title, &dirs)? else {
            bail!("No directory selected!");
        };
        location = dir;
    }

    Ok(location)
}

/// Flattened locations for `host`, augmented with the root and home
/// sentinels, sorted for display.
fn location_candidates(
    inventory: &Inventory,
    host: &str,
) -> Result<Vec<String>, InventoryError> {
    let mut candidates = inventory.resolved_locations(host)?;
    candidates.push(ROOT_SENTINEL.to_string());
    candidates.push(HOME_SENTINEL.to_string());
    candidates.sort();
    Ok(candidates)
}

/// Prints the command and asks for confirmation, defaulting to yes.
fn confirm(command: &str) -> Result<bool> {
    println!("{command}");

    loop {
        print!("Continue? [Y/n] ");
        io::stdout().flush()?;

        let mut answer = String::new();
        if io::stdin().read_line(&mut answer)? == 0 {
            return Ok(true);
        }

        match answer.trim().to_lowercase().as_str() {
            "" | "y" => return Ok(true),
            "n" => return Ok(false),
            _ => {}
        }
    }
}
