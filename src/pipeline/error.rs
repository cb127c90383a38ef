//! Bundling error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::asset::MinifyError;

/// Errors raised while producing a bundle or writing the rewritten html.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to write `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error("{0} error(s) reported while minifying")]
    Reported(usize),

    #[error("{0} warning(s) recorded and fail_on_warning is enabled")]
    FailOnWarning(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_bundle_error_display() {
        let err = BundleError::Read(
            PathBuf::from("src/main/js/app.js"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{err}");
        assert!(display.contains("failed to read"));
        assert!(display.contains("src/main/js/app.js"));

        let err = BundleError::FailOnWarning(2);
        assert!(format!("{err}").contains("fail_on_warning"));
    }
}
