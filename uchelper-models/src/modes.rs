use std::str::FromStr;

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Append,
    Overwrite,
}

/// How a write handles a difference between the frame's schema and the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaEvolution {
    /// Fail on any difference.
    #[default]
    Strict,
    /// Merge both schemas, failing when they cannot be merged.
    Merge,
    /// Replace the stored schema with the frame's schema.
    Overwrite,
}

impl FromStr for WriteMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(WriteMode::Append),
            "overwrite" => Ok(WriteMode::Overwrite),
            _ => Err(ModelError::InvalidLiteral {
                kind: "WriteMode",
                literal: s.to_string(),
            }),
        }
    }
}

impl FromStr for SchemaEvolution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(SchemaEvolution::Strict),
            "merge" => Ok(SchemaEvolution::Merge),
            "overwrite" => Ok(SchemaEvolution::Overwrite),
            _ => Err(ModelError::InvalidLiteral {
                kind: "SchemaEvolution",
                literal: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Append => f.write_str("APPEND"),
            WriteMode::Overwrite => f.write_str("OVERWRITE"),
        }
    }
}

impl std::fmt::Display for SchemaEvolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaEvolution::Strict => f.write_str("STRICT"),
            SchemaEvolution::Merge => f.write_str("MERGE"),
            SchemaEvolution::Overwrite => f.write_str("OVERWRITE"),
        }
    }
}
