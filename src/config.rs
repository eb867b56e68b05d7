//! Declarative binding policies loaded from configuration.
//!
//! A [`PolicyTable`] overrides the lifetime and scope an implementation type
//! declares, and assigns declared scopes to contracts, without recompiling.
//! Types are named by their `std::any::type_name`.
//!
//! ```json
//! {
//!   "services": {
//!     "my_game::audio::Mixer": { "lifetime": "transient", "scope": "scene" }
//!   },
//!   "contracts": {
//!     "dyn my_game::audio::Audio": "scene"
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lifetime::{Lifetime, Scope, ServicePolicy};

/// Errors raised while loading a [`PolicyTable`].
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON policy table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML policy table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported policy file format: {0}")]
    UnsupportedFormat(String),
}

/// Partial override of a declared [`ServicePolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverride {
    pub lifetime: Option<Lifetime>,
    pub scope: Option<Scope>,
}

/// Table of policy overrides keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    /// Implementation type name -> override of its declared policy
    pub services: HashMap<String, PolicyOverride>,
    /// Contract type name -> scope searched first on resolve
    pub contracts: HashMap<String, Scope>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(source: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, PolicyError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Loads a table, choosing the format from the file extension
    /// (`.json`, `.yaml` or `.yml`).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&source),
            other => Err(PolicyError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Adds or replaces the override for an implementation type.
    pub fn with_service(
        mut self,
        type_name: impl Into<String>,
        policy: PolicyOverride,
    ) -> Self {
        self.services.insert(type_name.into(), policy);
        self
    }

    pub fn with_contract(mut self, type_name: impl Into<String>, scope: Scope) -> Self {
        self.contracts.insert(type_name.into(), scope);
        self
    }

    /// The declared policy with any matching override applied.
    pub fn apply(&self, type_name: &str, declared: ServicePolicy) -> ServicePolicy {
        match self.services.get(type_name) {
            Some(over) => ServicePolicy {
                lifetime: over.lifetime.unwrap_or(declared.lifetime),
                scope: over.scope.unwrap_or(declared.scope),
            },
            None => declared,
        }
    }

    pub fn contract_scope(&self, type_name: &str) -> Option<Scope> {
        self.contracts.get(type_name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_overrides_merge_with_declaration() {
        let table = PolicyTable::from_json_str(
            r#"{ "services": { "app::Mixer": { "scope": "scene" } } }"#,
        )
        .unwrap();

        let declared = ServicePolicy::transient(Scope::Global);
        assert_eq!(
            table.apply("app::Mixer", declared),
            ServicePolicy::transient(Scope::Scene)
        );
        assert_eq!(table.apply("app::Other", declared), declared);
        assert!(table.contracts.is_empty());
    }

    #[test]
    fn yaml_contract_scopes() {
        let table = PolicyTable::from_yaml_str(
            "contracts:\n  \"dyn app::Audio\": scene\nservices:\n  \"app::Mixer\":\n    lifetime: singleton\n",
        )
        .unwrap();
        assert_eq!(table.contract_scope("dyn app::Audio"), Some(Scope::Scene));
        assert_eq!(table.contract_scope("dyn app::Video"), None);
        assert_eq!(
            table.services["app::Mixer"].lifetime,
            Some(Lifetime::Singleton)
        );
    }

    #[test]
    fn unknown_lifetime_is_rejected() {
        let err = PolicyTable::from_json_str(
            r#"{ "services": { "x": { "lifetime": "scoped" } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, PolicyError::Json(_)));
    }

    #[test]
    fn unsupported_extension() {
        let dir = std::env::temp_dir().join("scene_di_policy_test.toml");
        fs::write(&dir, "x = 1").unwrap();
        let err = PolicyTable::from_path(&dir).unwrap_err();
        assert!(matches!(err, PolicyError::UnsupportedFormat(ref ext) if ext == "toml"));
        let _ = fs::remove_file(&dir);
    }
}
