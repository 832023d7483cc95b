use uchelper_models::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Does not exist: {0}")]
    DoesNotExist(String),
    #[error("Something went wrong. Server response ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Request to Unity Catalog failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid response from Unity Catalog: {0}")]
    InvalidResponse(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl RestError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, RestError::AlreadyExists(_))
    }

    pub fn is_does_not_exist(&self) -> bool {
        matches!(self, RestError::DoesNotExist(_))
    }
}
