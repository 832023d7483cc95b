#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },
    #[error("{literal} is not a valid {kind}.")]
    InvalidLiteral { kind: &'static str, literal: String },
    #[error("Failed to decode property {0}: {1}")]
    InvalidProperty(String, serde_json::Error),
}
