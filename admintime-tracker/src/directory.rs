//! Admin directory lookups.
//!
//! The tracker only acts on known administrators. Who counts as an admin is
//! decided elsewhere; this module defines the lookup seam and a static
//! implementation loaded from a JSON file of `identity -> display name`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::StartupError;
use crate::validation::{AdminId, parse_admin_id};

/// Directory entry for a known admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminInfo {
    /// Current display name
    pub name: String,
}

/// Resolves an identity to an admin, if it is one.
pub trait AdminDirectory: Send + Sync {
    fn lookup(&self, id: &AdminId) -> Option<AdminInfo>;
}

impl<D: AdminDirectory + ?Sized> AdminDirectory for Arc<D> {
    fn lookup(&self, id: &AdminId) -> Option<AdminInfo> {
        (**self).lookup(id)
    }
}

/// Fixed set of admins known at startup.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    admins: HashMap<AdminId, AdminInfo>,
}

impl StaticDirectory {
    /// Build a directory from `(identity, name)` pairs. Invalid identities are skipped.
    pub fn from_pairs<I, S, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        S: AsRef<str>,
        N: Into<String>,
    {
        let mut admins = HashMap::new();
        for (identity, name) in pairs {
            match parse_admin_id(identity.as_ref()) {
                Ok(id) => {
                    admins.insert(id, AdminInfo { name: name.into() });
                }
                Err(e) => {
                    warn!(identity = identity.as_ref(), error = %e, "skipping invalid admin entry");
                }
            }
        }
        Self { admins }
    }

    /// Parse a JSON object mapping identity to display name.
    pub fn from_json(json: &str) -> Result<Self, StartupError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(entries))
    }

    /// Load the directory from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let directory = Self::from_json(&json)?;
        info!(path = %path.display(), admins = directory.len(), "loaded admin directory");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

impl AdminDirectory for StaticDirectory {
    fn lookup(&self, id: &AdminId) -> Option<AdminInfo> {
        self.admins.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_and_unknown() {
        let directory = StaticDirectory::from_pairs([("76561198000000001", "Alice")]);

        let alice = parse_admin_id("76561198000000001").unwrap();
        let bob = parse_admin_id("76561198000000002").unwrap();

        assert_eq!(
            directory.lookup(&alice),
            Some(AdminInfo {
                name: "Alice".to_string()
            })
        );
        assert_eq!(directory.lookup(&bob), None);
    }

    #[test]
    fn test_from_json_skips_invalid_identities() {
        let directory = StaticDirectory::from_json(
            r#"{ "76561198000000001": "Alice", "not-a-steam-id": "Mallory" }"#,
        )
        .unwrap();

        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let result = StaticDirectory::from_json("[1, 2, 3]");
        assert!(matches!(result, Err(StartupError::DirectoryParse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("admintime-directory-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "76561198000000003": "Carol" }"#).unwrap();

        let directory = StaticDirectory::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let carol = parse_admin_id("76561198000000003").unwrap();
        assert_eq!(directory.lookup(&carol).unwrap().name, "Carol");
    }

    #[test]
    fn test_load_missing_file() {
        let result = StaticDirectory::load("/nonexistent/admins.json");
        assert!(matches!(result, Err(StartupError::DirectoryRead(_))));
    }
}
