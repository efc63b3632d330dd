//! Configuration blocks exposed to the orchestration host.
//!
//! Layout:
//! - `credentials.rs`: authentication material (`FireboltCredentials`)
//! - `database.rs`: connection parameters and `get_connection` (`FireboltDatabase`)

pub mod credentials;
pub mod database;

pub use credentials::FireboltCredentials;
pub use database::FireboltDatabase;

use crate::error::FireboltError;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

pub const FIREBOLT_LOGO_URL: &str = "https://images.ctfassets.net/gm98wzqotmnx/3loU17IXqVIWl4aWQfqc78/3c7eefe5e8cf4eec870856f10d7fdcce/5e8a264ceaf4870c90478037_Favicon_128.svg.png?h=250";

/// Operator-facing documentation for a single block field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDoc {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub secret: bool,
    pub required: bool,
}

/// Metadata the host needs to register and render a block type.
pub trait Block {
    const BLOCK_TYPE_NAME: &'static str;
    const LOGO_URL: &'static str;
    const DESCRIPTION: &'static str;

    fn fields() -> &'static [FieldDoc];

    /// Lowercase, dash-separated form of the type name.
    fn block_type_slug() -> String {
        Self::BLOCK_TYPE_NAME
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }

    fn secret_fields() -> Vec<&'static str> {
        Self::fields()
            .iter()
            .filter(|f| f.secret)
            .map(|f| f.name)
            .collect()
    }

    fn block_schema() -> Value {
        let properties: Map<String, Value> = Self::fields()
            .iter()
            .map(|f| {
                let mut prop = json!({
                    "title": f.title,
                    "description": f.description,
                });
                if f.secret {
                    prop["format"] = json!("password");
                    prop["writeOnly"] = json!(true);
                }
                (f.name.to_string(), prop)
            })
            .collect();
        let required: Vec<&str> = Self::fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        json!({
            "title": Self::BLOCK_TYPE_NAME,
            "description": Self::DESCRIPTION,
            "block_type_slug": Self::block_type_slug(),
            "logo_url": Self::LOGO_URL,
            "secret_fields": Self::secret_fields(),
            "properties": properties,
            "required": required,
        })
    }
}

/// Registered block types keyed by type name.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    schemas: BTreeMap<&'static str, Value>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every block type this crate provides.
    pub fn with_firebolt_blocks() -> Result<Self, FireboltError> {
        let mut registry = Self::new();
        registry.register::<FireboltCredentials>()?;
        registry.register::<FireboltDatabase>()?;
        Ok(registry)
    }

    pub fn register<B: Block>(&mut self) -> Result<(), FireboltError> {
        if self.schemas.contains_key(B::BLOCK_TYPE_NAME) {
            return Err(FireboltError::Configuration(format!(
                "block type `{}` is already registered",
                B::BLOCK_TYPE_NAME
            )));
        }
        self.schemas.insert(B::BLOCK_TYPE_NAME, B::block_schema());
        Ok(())
    }

    pub fn schema(&self, block_type_name: &str) -> Option<&Value> {
        self.schemas.get(block_type_name)
    }

    pub fn block_type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schemas.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_block_standards<B: Block>() {
        assert!(!B::BLOCK_TYPE_NAME.is_empty());
        assert!(!B::DESCRIPTION.trim().is_empty());
        assert!(B::LOGO_URL.starts_with("https://"));
        url::Url::parse(B::LOGO_URL).unwrap();
        for field in B::fields() {
            assert!(
                !field.description.is_empty(),
                "{} is undocumented",
                field.name
            );
            assert!(!field.title.is_empty());
        }
        let schema = B::block_schema();
        assert_eq!(
            schema["properties"].as_object().unwrap().len(),
            B::fields().len()
        );
    }

    #[test]
    fn all_blocks_adhere_to_standards() {
        assert_block_standards::<FireboltCredentials>();
        assert_block_standards::<FireboltDatabase>();
    }

    #[test]
    fn slugs_are_dash_separated() {
        assert_eq!(
            FireboltCredentials::block_type_slug(),
            "firebolt-credentials"
        );
        assert_eq!(FireboltDatabase::block_type_slug(), "firebolt-database");
    }

    #[test]
    fn credential_schema_lists_secret_fields() {
        assert_eq!(FireboltCredentials::secret_fields(), vec!["password", "token"]);
        let schema = FireboltCredentials::block_schema();
        assert_eq!(schema["properties"]["token"]["writeOnly"], json!(true));
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn registry_rejects_duplicate_type_names() {
        let mut registry = BlockRegistry::with_firebolt_blocks().unwrap();
        assert_eq!(
            registry.block_type_names().collect::<Vec<_>>(),
            vec!["Firebolt Credentials", "Firebolt Database"]
        );
        assert!(registry.schema("Firebolt Database").is_some());

        let err = registry.register::<FireboltDatabase>().unwrap_err();
        assert!(err.is_configuration());
    }
}
