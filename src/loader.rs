use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use log::debug;
use polars::prelude::*;

use crate::error::IndicatorError;

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names and applies optional rename.
pub fn read_csv_as_strings(
    path: &Path,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, IndicatorError> {
    if !path.exists() {
        return Err(IndicatorError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!("Loaded {} rows from {}", df.height(), path.display());

    tidy_columns(df, rename)
}

/// Same as [`read_csv_as_strings`] for an in-memory upload.
pub fn read_csv_bytes(
    bytes: Vec<u8>,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, IndicatorError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;
    debug!("Loaded {} rows from uploaded bytes", df.height());

    tidy_columns(df, rename)
}

/// Trim header whitespace, then apply the rename map.
pub fn tidy_columns(
    mut df: DataFrame,
    rename: Option<&HashMap<String, String>>,
) -> Result<DataFrame, IndicatorError> {
    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    if let Some(map) = rename {
        let old: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
        let new: Vec<&str> = map.values().map(|s| s.as_str()).collect();
        df = df.lazy().rename(old, new, true).collect()?;
    }

    Ok(df)
}

/// Fail with [`IndicatorError::MissingField`] naming the first absent column.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), IndicatorError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(IndicatorError::MissingField(col_name.to_string()));
        }
    }
    Ok(())
}
