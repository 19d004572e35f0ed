#[cfg(feature = "python")]
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Missing field: {0}")]
    MissingField(String),

    /// The input could not be read as a table at all. Carries the polars
    /// error untouched.
    #[error("Unparseable sheet: {0}")]
    UnparseableSheet(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid month: '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Invalid reporting window: {0}")]
    InvalidWindow(String),
}

#[cfg(feature = "python")]
impl From<IndicatorError> for PyErr {
    fn from(err: IndicatorError) -> PyErr {
        match err {
            IndicatorError::MissingField(_) => PyKeyError::new_err(err.to_string()),
            IndicatorError::InvalidMonth(_) | IndicatorError::InvalidWindow(_) => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = IndicatorError::MissingField("open_date".into());
        assert_eq!(err.to_string(), "Missing field: open_date");

        let err = IndicatorError::InvalidMonth("2025-13".into());
        assert_eq!(
            err.to_string(),
            "Invalid month: '2025-13' (expected YYYY-MM)"
        );
    }
}
