use std::{fmt::Display, str::FromStr};

use crate::error::ModelError;

/// Checks that `name` can be used as one part of a three-level name.
pub fn validate_identifier(kind: &'static str, name: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidName {
        kind,
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.contains('.') {
        return Err(invalid("must not contain '.'"));
    }
    if name.contains('/') {
        return Err(invalid("must not contain '/'"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    Ok(())
}

/// A validated `catalog.schema` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName {
    pub catalog: String,
    pub schema: String,
}

impl SchemaName {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Result<Self, ModelError> {
        let catalog = catalog.into();
        let schema = schema.into();
        validate_identifier("catalog", &catalog)?;
        validate_identifier("schema", &schema)?;
        Ok(Self { catalog, schema })
    }
}

impl Display for SchemaName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}

/// A validated `catalog.schema.table` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullName {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl FullName {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let catalog = catalog.into();
        let schema = schema.into();
        let table = table.into();
        validate_identifier("catalog", &catalog)?;
        validate_identifier("schema", &schema)?;
        validate_identifier("table", &table)?;
        Ok(Self {
            catalog,
            schema,
            table,
        })
    }

    pub fn schema_name(&self) -> SchemaName {
        SchemaName {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

impl FromStr for FullName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [catalog, schema, table] => FullName::new(*catalog, *schema, *table),
            _ => Err(ModelError::InvalidName {
                kind: "table",
                name: s.to_string(),
                reason: "expected catalog.schema.table",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_name() {
        let name: FullName = "unity.default.numbers".parse().unwrap();
        assert_eq!(name.catalog, "unity");
        assert_eq!(name.schema, "default");
        assert_eq!(name.table, "numbers");
        assert_eq!(name.to_string(), "unity.default.numbers");
        assert_eq!(name.schema_name().to_string(), "unity.default");
    }

    #[test]
    fn test_rejects_dotted_parts() {
        assert!(FullName::new("unity", "default", "this.name.will.fail").is_err());
        assert!("unity.default".parse::<FullName>().is_err());
        assert!("a.b.c.d".parse::<FullName>().is_err());
    }

    #[test]
    fn test_rejects_empty_parts() {
        let err = FullName::new("unity", " ", "numbers").unwrap_err();
        assert!(err.to_string().contains("schema"));
        assert!(SchemaName::new("", "default").is_err());
        assert!(validate_identifier("table", "a/b").is_err());
    }
}
