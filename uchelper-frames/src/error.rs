use uchelper_models::FileType;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Only local storage is supported. Location must be of the form file://<absolute_path>, got: {0}")]
    UnsupportedLocation(String),
    #[error("Table {0} has no storage location.")]
    MissingLocation(String),
    #[error("Reading {0} tables is not supported.")]
    UnsupportedFormat(FileType),
    #[error("Unsupported datatype: {0}")]
    UnsupportedType(String),
    #[error("Schema evolution is set to strict but schemas do not match: {0}")]
    SchemaMismatch(String),
    #[error("{0}")]
    UnsupportedOperation(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
    #[error("DataFusion error: {0}")]
    DataFusionError(#[from] datafusion::error::DataFusionError),
    #[error("Parquet error: {0}")]
    ParquetError(#[from] datafusion::parquet::errors::ParquetError),
    #[error("Delta error: {0}")]
    DeltaError(#[from] deltalake::DeltaTableError),
    #[error("Avro error: {0}")]
    AvroError(#[from] Box<apache_avro::Error>),
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}

impl From<apache_avro::Error> for FrameError {
    fn from(e: apache_avro::Error) -> Self {
        FrameError::AvroError(Box::new(e))
    }
}

impl FrameError {
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        FrameError::UnsupportedOperation(message.into())
    }
}
