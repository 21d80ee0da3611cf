//! Error bridges for front-door errors.
//!
//! Conversions into `DtsError` for error types only the root crate depends
//! on, applied with `map_err`.
//!
//! The parser, transformer and pipeline errors are bridged in their own
//! crates, next to the error types.

use tugdts_core::error::DtsError;

// ============================================================================
// Bridge: walkdir::Error -> DtsError
// ============================================================================

pub(crate) fn walkdir_error(err: walkdir::Error) -> DtsError {
    let path = err
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    match err.into_io_error() {
        Some(io_err) => DtsError::io(path, io_err),
        None => DtsError::Io {
            path,
            message: "filesystem loop detected".to_string(),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tugdts_core::error::OutputErrorCode;
    use walkdir::WalkDir;

    #[test]
    fn test_missing_root_maps_to_file_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let err = WalkDir::new(&missing)
            .into_iter()
            .find_map(Result::err)
            .unwrap();
        let err = walkdir_error(err);
        assert!(matches!(err, DtsError::FileNotFound { .. }));
        assert_eq!(OutputErrorCode::from(&err), OutputErrorCode::InputError);
    }
}
