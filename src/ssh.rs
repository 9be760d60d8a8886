//! Remote command plumbing on top of the system ssh client.

use std::borrow::Cow;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result, bail};
use regex::Regex;
use shell_escape::escape;

/// The final interactive login command: ssh into the host, change to the
/// directory and start a login shell there.
#[derive(Debug, Clone)]
pub struct SessionCommand {
    host: String,
    dir: String,
}

impl SessionCommand {
    pub fn new(host: &str, dir: &str) -> Self {
        Self {
            host: host.to_string(),
            dir: dir.to_string(),
        }
    }

    fn remote_shell(&self) -> String {
        format!("cd {}; bash --login", escape(Cow::from(&self.dir)))
    }

    /// The command as it would be typed into a shell, for confirmation
    /// prompts.
    pub fn render(&self) -> String {
        format!("ssh {} -t \"{}\"", self.host, self.remote_shell())
    }

    /// Runs the session with the terminal attached, blocking until the
    /// remote shell exits.
    pub fn spawn(&self) -> Result<ExitStatus> {
        Command::new("ssh")
            .arg(&self.host)
            .arg("-t")
            .arg(self.remote_shell())
            .status()
            .with_context(|| format!("Failed to ssh into {}", self.host))
    }
}

/// Queries the expanded `$HOME` of the login user on `host`.
pub fn remote_home(host: &str) -> Result<String> {
    let output = Command::new("ssh")
        .arg(host)
        .arg("eval echo $HOME")
        .output()
        .with_context(|| format!("Failed to query $HOME on {host}"))?;

    if !output.status.success() {
        bail!("Querying $HOME on {} failed: {}", host, output.status);
    }

    let home = String::from_utf8(output.stdout)
        .context("Remote $HOME is not valid UTF-8")?
        .trim()
        .to_string();

    if home.is_empty() {
        bail!("Remote host {} reported an empty $HOME", host);
    }

    Ok(home)
}

/// Lists directories under `root` on `host`, bounded to `depth` levels.
/// Hidden directories are filtered out.
pub fn list_remote_dirs(
    host: &str,
    root: &str,
    depth: u32,
) -> Result<Vec<String>> {
    let find = format!(
        "find {} -maxdepth {} -type d",
        escape(Cow::from(root)),
        depth
    );

    let output = Command::new("ssh")
        .arg(host)
        .arg(&find)
        .output()
        .with_context(|| format!("Failed to list directories on {host}"))?;

    if !output.status.success() {
        bail!("Listing directories on {} failed: {}", host, output.status);
    }

    let listing = String::from_utf8(output.stdout)
        .context("Remote directory listing is not valid UTF-8")?;

    Ok(filter_hidden(&listing))
}

/// Splits a `find` listing into lines, dropping empties and anything
/// inside a hidden directory.
fn filter_hidden(listing: &str) -> Vec<String> {
    let hidden = Regex::new(r"/\.").unwrap();

    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !hidden.is_match(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_login_command() {
        let cmd = SessionCommand::new("host1", "/data");
        assert_eq!(cmd.render(), "ssh host1 -t \"cd /data; bash --login\"");
    }

    #[test]
    fn directories_with_special_characters_are_escaped() {
        let cmd = SessionCommand::new("host1", "/srv/my app");
        assert_eq!(
            cmd.render(),
            "ssh host1 -t \"cd '/srv/my app'; bash --login\""
        );
    }

    #[test]
    fn hidden_directories_are_filtered() {
        let listing = "/srv\n/srv/app\n/srv/.git\n/srv/.git/hooks\n\n/srv/data\n";
        assert_eq!(
            filter_hidden(listing),
            vec!["/srv", "/srv/app", "/srv/data"]
        );
    }

    #[test]
    fn empty_listing_yields_no_directories() {
        assert!(filter_hidden("\n\n").is_empty());
    }
}
