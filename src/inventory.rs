//! Inventory data model and display helpers.
//!
//! The inventory is read once at startup and held immutably for the rest of
//! the process lifetime.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Column width for the hostname in a server display row.
const HOSTNAME_COLUMN: usize = 40;
/// Column width for the description in a server display row.
const DESCRIPTION_COLUMN: usize = 20;

/// Error type for lookups against a loaded [`Inventory`].
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Server \"{0}\" not found in inventory")]
    UnknownServer(String),
    #[error("No locations defined...")]
    NoLocationsDefined,
    #[error("No location found...")]
    NoLocationFound,
}

/// The parsed configuration: hostnames to server entries and group-keys to
/// lists of paths.
#[derive(Debug, Deserialize)]
pub struct Inventory {
    pub servers: BTreeMap<String, ServerEntry>,
    #[serde(default)]
    pub locations: BTreeMap<String, Vec<String>>,
}

/// A single server in the inventory.
#[derive(Debug, Deserialize)]
pub struct ServerEntry {
    #[serde(default)]
    pub description: Option<Description>,
    /// Group-keys into the top-level `locations` map, order-preserving.
    #[serde(default)]
    pub locations: Option<Vec<String>>,
}

/// A description is either a single string or a list of strings; lists are
/// joined with commas for display.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Description {
    One(String),
    Many(Vec<String>),
}

impl Description {
    pub fn joined(&self) -> String {
        match self {
            Description::One(s) => s.clone(),
            Description::Many(parts) => parts.join(","),
        }
    }
}

impl Inventory {
    /// Builds the sorted display rows for server selection.
    ///
    /// Each row starts with the hostname left-padded to a fixed column, so
    /// that [`hostname_of_row`] can recover it. Hostnames must not contain
    /// whitespace for this to hold.
    pub fn server_rows(&self) -> Vec<String> {
        let mut rows: Vec<String> = self
            .servers
            .iter()
            .map(|(fqdn, entry)| {
                let mut row = format!("{fqdn:<HOSTNAME_COLUMN$}");
                if let Some(description) = &entry.description {
                    row.push(' ');
                    let joined = description.joined();
                    row.push_str(&format!("{joined:<DESCRIPTION_COLUMN$}"));
                }
                row
            })
            .collect();

        rows.sort();
        rows
    }

    /// Flattens the location group-keys of `host` into a list of paths.
    ///
    /// Group-keys missing from the top-level `locations` map are silently
    /// skipped; paths within a group keep their list order.
    pub fn resolved_locations(
        &self,
        host: &str,
    ) -> Result<Vec<String>, InventoryError> {
        let entry = self
            .servers
            .get(host)
            .ok_or_else(|| InventoryError::UnknownServer(host.to_string()))?;

        let keys = entry
            .locations
            .as_ref()
            .ok_or(InventoryError::NoLocationsDefined)?;

        let mut resolved = Vec::new();
        for key in keys {
            if let Some(paths) = self.locations.get(key) {
                resolved.extend(paths.iter().cloned());
            }
        }

        if resolved.is_empty() {
            return Err(InventoryError::NoLocationFound);
        }

        Ok(resolved)
    }
}

/// Recovers the bare hostname from a display row built by
/// [`Inventory::server_rows`].
pub fn hostname_of_row(row: &str) -> &str {
    row.split_whitespace().next().unwrap_or(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Inventory {
        serde_yaml::from_str(
            "
servers:
  web1.example.org:
    description: frontend
    locations: [www, logs]
  db1.example.org:
    description: [primary, postgres]
    locations: [data]
  bare.example.org: {}
locations:
  www: [/var/www]
  logs: [/var/log, /var/log/nginx]
  data: [/srv/pg]
",
        )
        .unwrap()
    }

    #[test]
    fn rows_are_sorted_and_padded() {
        let inventory = sample();
        let rows = inventory.server_rows();

        assert_eq!(rows.len(), inventory.servers.len());
        let mut sorted = rows.clone();
        sorted.sort();
        assert_eq!(rows, sorted);

        for row in &rows {
            let host = hostname_of_row(row);
            assert!(row.starts_with(&format!("{host:<40}")));
        }
    }

    #[test]
    fn hostname_round_trips_through_row() {
        let inventory = sample();
        let mut recovered: Vec<String> = inventory
            .server_rows()
            .iter()
            .map(|row| hostname_of_row(row).to_string())
            .collect();
        recovered.sort_unstable();

        let expected: Vec<String> =
            inventory.servers.keys().cloned().collect();
        assert_eq!(recovered, expected);
    }

    #[test]
    fn list_descriptions_are_joined_with_commas() {
        let inventory = sample();
        let row = inventory
            .server_rows()
            .into_iter()
            .find(|r| r.starts_with("db1"))
            .unwrap();
        assert!(row.contains("primary,postgres"));
    }

    #[test]
    fn flatten_keeps_order_and_skips_missing_keys() {
        let inventory: Inventory = serde_yaml::from_str(
            "
servers:
  h:
    locations: [a, missing, b]
locations:
  a: [p1]
  b: [p2, p3]
",
        )
        .unwrap();

        let resolved = inventory.resolved_locations("h").unwrap();
        assert_eq!(resolved, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn missing_locations_field_is_an_error() {
        let inventory = sample();
        assert!(matches!(
            inventory.resolved_locations("bare.example.org"),
            Err(InventoryError::NoLocationsDefined)
        ));
    }

    #[test]
    fn unresolvable_keys_only_is_an_error() {
        let inventory: Inventory = serde_yaml::from_str(
            "
servers:
  h:
    locations: [nope]
locations:
  other: [/x]
",
        )
        .unwrap();
        assert!(matches!(
            inventory.resolved_locations("h"),
            Err(InventoryError::NoLocationFound)
        ));
    }

    #[test]
    fn unknown_server_is_an_error() {
        let inventory = sample();
        assert!(matches!(
            inventory.resolved_locations("ghost"),
            Err(InventoryError::UnknownServer(_))
        ));
    }
}
