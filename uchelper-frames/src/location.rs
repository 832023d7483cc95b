use std::path::{Path, PathBuf};

use uchelper_models::Table;

use crate::error::FrameError;

pub const LOCAL_SCHEME: &str = "file://";

/// Strips the `file://` scheme from a storage location.
pub fn local_path(location: &str) -> Result<PathBuf, FrameError> {
    match location.strip_prefix(LOCAL_SCHEME) {
        Some(path) if path.starts_with('/') => Ok(PathBuf::from(path)),
        _ => Err(FrameError::UnsupportedLocation(location.to_string())),
    }
}

pub(crate) fn table_path(table: &Table) -> Result<PathBuf, FrameError> {
    let location = table.storage_location.as_deref().ok_or_else(|| {
        FrameError::MissingLocation(format!(
            "{}.{}.{}",
            table.catalog_name, table.schema_name, table.name
        ))
    })?;
    local_path(location)
}

/// Accepts `file://<abs>` or a plain absolute path and returns the `file://` form.
pub fn to_location(path: &str) -> Result<String, FrameError> {
    if path.starts_with(LOCAL_SCHEME) {
        local_path(path)?;
        return Ok(path.to_string());
    }
    if !Path::new(path).is_absolute() {
        return Err(FrameError::unsupported(format!(
            "Filepath must be absolute, e.g. file:///home/me/ex-delta-table or simply /home/me/ex-delta-table, got: {path}"
        )));
    }
    Ok(format!("{LOCAL_SCHEME}{path}"))
}

pub(crate) fn path_str(path: &Path) -> Result<&str, FrameError> {
    path.to_str()
        .ok_or_else(|| FrameError::InvalidArgument(format!("Path {} is not valid UTF-8", path.display())))
}

/// File extension with its leading dot, as DataFusion's listing options expect it.
pub(crate) fn dotted_extension(path: &Path, default: &str) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !path.is_dir() => format!(".{ext}"),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path() {
        assert_eq!(
            local_path("file:///tmp/table").unwrap(),
            PathBuf::from("/tmp/table")
        );
        assert!(matches!(
            local_path("s3://bucket/table"),
            Err(FrameError::UnsupportedLocation(_))
        ));
        assert!(local_path("file://relative/table").is_err());
    }

    #[test]
    fn test_to_location() {
        assert_eq!(to_location("/tmp/t").unwrap(), "file:///tmp/t");
        assert_eq!(to_location("file:///tmp/t").unwrap(), "file:///tmp/t");
        assert!(to_location("tmp/t").is_err());
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("/x/y.csv"), ".parquet"), ".csv");
        assert_eq!(dotted_extension(Path::new("/x/y"), ".parquet"), ".parquet");
    }
}
