//! Config file resolution, discovery and loading.

use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use glob::glob;
use thiserror::Error;

use crate::inventory::Inventory;

/// Failures while locating or reading an inventory file. All of them are
/// terminal for the current invocation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config dir {0} not found!")]
    DirNotFound(String),
    #[error("No config dirs found.")]
    NoConfigDirs,
    #[error("No config files found!")]
    NoConfigFiles,
    #[error("Config file \"{}\" not found!", .0.display())]
    FileNotFound(PathBuf),
    #[error("{} file not supported!", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Exception in parsing yaml file {}!\n{source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Failed to determine HOME directory")]
    NoHomeDir,
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolves a user-supplied path to an absolute one.
///
/// A leading `~/` expands to the home directory; absolute paths are kept
/// as-is; everything else is taken relative to the current working
/// directory.
pub fn resolve_path(raw: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = raw.strip_prefix("~/") {
        return Ok(home_dir().ok_or(ConfigError::NoHomeDir)?.join(rest));
    }

    let path = PathBuf::from(raw);
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Collects all `*.yml` files (non-recursive) from a comma-separated list
/// of directories, sorted lexicographically.
///
/// A missing directory is fatal only when the caller overrode the default
/// list; with the defaults it is silently skipped.
pub fn discover_config_files(
    dirs: &str,
    using_defaults: bool,
) -> Result<Vec<String>, ConfigError> {
    let mut found_dirs = Vec::new();

    for raw in dirs.split(',').filter(|s| !s.is_empty()) {
        let dir = resolve_path(raw)?;
        if dir.exists() {
            found_dirs.push(dir);
        } else if !using_defaults {
            return Err(ConfigError::DirNotFound(raw.to_string()));
        }
    }

    if found_dirs.is_empty() {
        return Err(ConfigError::NoConfigDirs);
    }

    let mut config_files = Vec::new();
    for dir in found_dirs {
        let pattern = dir.join("*.yml");
        let entries = glob(&pattern.to_string_lossy())?;
        for entry in entries.flatten() {
            config_files.push(entry.to_string_lossy().into_owned());
        }
    }

    if config_files.is_empty() {
        return Err(ConfigError::NoConfigFiles);
    }

    config_files.sort();
    Ok(config_files)
}

/// Loads and parses the inventory at `path`.
///
/// The extension is checked before the file is read, so an unsupported
/// format never reaches the parser.
pub fn load_inventory(path: &Path) -> Result<Inventory, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("yml" | "yaml") => {}
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }

    let data = fs::read_to_string(path)?;
    serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::tempdir;

    #[test]
    fn absolute_paths_resolve_to_themselves() {
        assert_eq!(
            resolve_path("/etc/scotty/hosts.yml").unwrap(),
            PathBuf::from("/etc/scotty/hosts.yml")
        );
    }

    #[test]
    fn relative_paths_resolve_against_cwd() {
        let cwd = env::current_dir().unwrap();
        assert_eq!(resolve_path("./hosts.yml").unwrap(), cwd.join("hosts.yml"));
        assert_eq!(resolve_path("hosts.yml").unwrap(), cwd.join("hosts.yml"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let resolved = resolve_path("~/hosts.yml").unwrap();
        assert_eq!(resolved, home_dir().unwrap().join("hosts.yml"));
    }

    #[test]
    fn discovery_finds_sorted_yml_files_only() {
        let dir = tempdir().unwrap();
        write(dir.path().join("b.yml"), "servers: {}").unwrap();
        write(dir.path().join("a.yml"), "servers: {}").unwrap();
        write(dir.path().join("ignored.txt"), "").unwrap();

        let files = discover_config_files(
            &dir.path().to_string_lossy(),
            false,
        )
        .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.yml"));
        assert!(files[1].ends_with("b.yml"));
    }

    #[test]
    fn discovery_fails_without_config_files() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover_config_files(&dir.path().to_string_lossy(), false),
            Err(ConfigError::NoConfigFiles)
        ));
    }

    #[test]
    fn overridden_missing_dir_is_fatal() {
        assert!(matches!(
            discover_config_files("/definitely/not/here", false),
            Err(ConfigError::DirNotFound(_))
        ));
    }

    #[test]
    fn default_missing_dirs_are_skipped() {
        assert!(matches!(
            discover_config_files("/definitely/not/here", true),
            Err(ConfigError::NoConfigDirs)
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_parsing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        write(&path, "this is not even yaml: [").unwrap();

        assert!(matches!(
            load_inventory(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_rejected() {
        assert!(matches!(
            load_inventory(Path::new("/no/such/hosts.yml")),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn valid_yaml_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.yml");
        write(
            &path,
            "servers:\n  h:\n    description: db\n    locations: [grp]\nlocations:\n  grp: [/data]\n",
        )
        .unwrap();

        let inventory = load_inventory(&path).unwrap();
        assert_eq!(inventory.servers.len(), 1);
        assert_eq!(inventory.locations["grp"], vec!["/data"]);
    }

    #[test]
    fn broken_yaml_reports_the_parser_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.yml");
        write(&path, "servers: [unbalanced").unwrap();

        match load_inventory(&path) {
            Err(ConfigError::Parse { source, .. }) => {
                assert!(!source.to_string().is_empty());
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
