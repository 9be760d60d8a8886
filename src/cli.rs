//! CLI argument parser
use clap::{ArgGroup, Parser};

/// Default directories scanned by `--browse`, comma-separated.
pub const DEFAULT_BROWSE_DIRS: &str = "/etc/scotty/conf.d/,~/.scotty/conf.d/";

/// Command-line argument parser for `scotty`.
#[derive(Debug, Parser)]
#[command(name = "scotty")]
#[command(group(ArgGroup::new("source").required(true).args(["config_file", "browse"])))]
#[command(
    about = "Ssh into remote directories",
    long_about = "scotty - open an interactive shell on a remote host, in a
directory picked from a YAML inventory.

The inventory maps hostnames to server entries and group-keys to lists of
paths:

 servers:
   db1.example.org:
     description: primary database
     locations: [www, logs]
 locations:
   www: [/var/www]
   logs: [/var/log, /var/log/nginx]

Examples:
 scotty -c hosts.yml        # pick a server and directory from hosts.yml
 scotty -b                  # browse the default config directories first
 scotty -c hosts.yml -i     # show the ssh command and confirm before running
 scotty -c hosts.yml -f -d2 # refine the directory on the remote host itself"
)]
pub struct Args {
    /// Config yaml file
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Browse through all available configs
    #[arg(short, long)]
    pub browse: bool,

    /// Browse dir(s) - separated by comma - for available config files
    #[arg(long, default_value = DEFAULT_BROWSE_DIRS)]
    pub browse_dirs: String,

    /// Print the ssh command and ask for confirmation before running it
    #[arg(short, long)]
    pub interactive: bool,

    /// Refine the chosen location by fuzzy-finding within the remote
    /// directory tree
    #[arg(short, long)]
    pub fuzzy_search: bool,

    /// Depth bound for the remote directory listing used by --fuzzy-search
    #[arg(short = 'd', long, default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub fuzzy_depth: u32,

    /// Use a plain arrow-navigable list prompt instead of the fuzzy finder
    #[arg(long)]
    pub plain: bool,
}

impl Args {
    /// True when the user overrode the default `--browse-dirs` list.
    pub fn browse_dirs_overridden(&self) -> bool {
        self.browse_dirs != DEFAULT_BROWSE_DIRS
    }
}
