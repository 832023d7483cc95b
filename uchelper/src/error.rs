use uchelper_frames::FrameError;
use uchelper_models::ModelError;
use uchelper_rest::RestError;
use uchelper_sql::SqlError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    RestError(#[from] RestError),
    #[error(transparent)]
    FrameError(#[from] FrameError),
    #[error(transparent)]
    SqlError(#[from] SqlError),
    #[error(transparent)]
    ModelError(#[from] ModelError),
    #[error("{0}")]
    UnsupportedOperation(String),
    #[error("Data was written to {table} but its schema in Unity Catalog could not be updated: {source}")]
    SchemaUpdateError { table: String, source: RestError },
}

pub type Result<T> = std::result::Result<T, Error>;
