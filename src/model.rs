use std::collections::HashMap;
use std::path::PathBuf;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::config::{DiacriticPolicy, GroupFilter, MonthFilter, NormalizeOptions};
use crate::error::IndicatorError;
use crate::frame;
use crate::loader;
use crate::month::ReportingWindow;
use crate::normalize::{fold_group_filter, normalize, CoercedDate, SkippedRow};
use crate::record::WorkOrder;
use crate::rollup;

#[pyclass]
pub struct IndicatorModel {
    base_path: PathBuf,
    options: NormalizeOptions,
    work_orders: Option<Vec<WorkOrder>>,
    coerced_dates: Vec<CoercedDate>,
    skipped_rows: Vec<SkippedRow>,
}

#[pymethods]
impl IndicatorModel {
    #[new]
    #[pyo3(signature = (base_path=".", delimiter='_', strip_diacritics=true, columns=None))]
    fn new(
        base_path: &str,
        delimiter: char,
        strip_diacritics: bool,
        columns: Option<HashMap<String, String>>,
    ) -> PyResult<Self> {
        let mut options = NormalizeOptions {
            delimiter,
            diacritics: if strip_diacritics {
                DiacriticPolicy::Strip
            } else {
                DiacriticPolicy::Keep
            },
            ..NormalizeOptions::default()
        };
        if let Some(map) = columns {
            Self::apply_column_names(&mut options, map)?;
        }
        Ok(Self {
            base_path: PathBuf::from(base_path),
            options,
            work_orders: None,
            coerced_dates: Vec::new(),
            skipped_rows: Vec::new(),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load any CSV into a Polars DataFrame with all columns as strings.
    /// Optionally rename columns via a map.
    #[pyo3(signature = (filename, rename=None))]
    fn load_csv(
        &self,
        filename: &str,
        rename: Option<HashMap<String, String>>,
    ) -> PyResult<PyDataFrame> {
        let df = loader::read_csv_as_strings(&self.base_path.join(filename), rename.as_ref())?;
        Ok(PyDataFrame(df))
    }

    /// Load work orders from a CSV file.
    ///
    /// Required columns: sector, open_date, resolution_date
    /// Optional columns: equipment, maintenance_type
    /// Dates are read day-first (15/01/2025). Returns the detail frame.
    #[pyo3(signature = (filename="work_orders.csv", rename=None))]
    fn load_work_orders(
        &mut self,
        filename: &str,
        rename: Option<HashMap<String, String>>,
    ) -> PyResult<PyDataFrame> {
        let raw = loader::read_csv_as_strings(&self.base_path.join(filename), rename.as_ref())?;
        self.ingest(&raw)
    }

    /// Load work orders from uploaded CSV bytes.
    #[pyo3(signature = (data, rename=None))]
    fn load_work_orders_bytes(
        &mut self,
        data: Vec<u8>,
        rename: Option<HashMap<String, String>>,
    ) -> PyResult<PyDataFrame> {
        let raw = loader::read_csv_bytes(data, rename.as_ref())?;
        self.ingest(&raw)
    }

    /// Load work orders from a DataFrame already read by the caller
    /// (e.g. a spreadsheet upload). Date columns may be strings or typed.
    #[pyo3(signature = (df, rename=None))]
    fn load_work_orders_frame(
        &mut self,
        df: PyDataFrame,
        rename: Option<HashMap<String, String>>,
    ) -> PyResult<PyDataFrame> {
        let raw = loader::tidy_columns(df.0, rename.as_ref())?;
        self.ingest(&raw)
    }

    // ── Indicator ───────────────────────────────────────────────────────────

    /// Monthly effectiveness indicator.
    ///
    /// Args:
    ///     group: group key to restrict to, or "all" (default)
    ///     window: list of "YYYY-MM" months, strictly increasing
    ///             (default: 2025-01 through 2025-07)
    ///     start, end: alternative to `window`, an inclusive month range
    ///
    /// Returns a DataFrame with columns
    ///     month, planned, executed, accumulated, effectiveness
    #[pyo3(signature = (group="all", window=None, start=None, end=None))]
    fn compute_indicators(
        &self,
        group: &str,
        window: Option<Vec<String>>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> PyResult<PyDataFrame> {
        let orders = self.loaded()?;
        let group = self.group_filter(group)?;
        let window = Self::resolve_window(window, start, end)?;

        let rows = rollup::compute_indicators(orders, &group, &window);
        Ok(PyDataFrame(frame::indicators_frame(&rows)?))
    }

    /// Normalized work orders for a detail view, filtered by group and by
    /// open month ("YYYY-MM" or "all").
    #[pyo3(signature = (group="all", month="all"))]
    fn details(&self, group: &str, month: &str) -> PyResult<PyDataFrame> {
        let orders = self.loaded()?;
        let group = self.group_filter(group)?;
        let month: MonthFilter = month.parse()?;

        let selected = rollup::select_details(orders, &group, &month);
        Ok(PyDataFrame(frame::details_frame(&selected)?))
    }

    // ── Properties ──────────────────────────────────────────────────────────

    /// Distinct group keys, sorted.
    #[getter]
    fn groups(&self) -> PyResult<Vec<String>> {
        Ok(rollup::group_keys(self.loaded()?))
    }

    #[getter]
    fn work_orders_df(&self) -> PyResult<Option<PyDataFrame>> {
        match &self.work_orders {
            Some(orders) => {
                let all: Vec<&WorkOrder> = orders.iter().collect();
                Ok(Some(PyDataFrame(frame::details_frame(&all)?)))
            }
            None => Ok(None),
        }
    }

    /// (row, value) for every resolution date that could not be read and
    /// was treated as unresolved.
    #[getter]
    fn coerced_dates(&self) -> Vec<(usize, String)> {
        self.coerced_dates
            .iter()
            .map(|c| (c.row, c.value.clone()))
            .collect()
    }

    /// (row, value) for every row left out because its open date was blank
    /// or could not be read.
    #[getter]
    fn skipped_rows(&self) -> Vec<(usize, String)> {
        self.skipped_rows
            .iter()
            .map(|s| (s.row, s.value.clone()))
            .collect()
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl IndicatorModel {
    fn ingest(&mut self, raw: &polars::prelude::DataFrame) -> PyResult<PyDataFrame> {
        let normalized = normalize(raw, &self.options)?;
        let all: Vec<&WorkOrder> = normalized.work_orders.iter().collect();
        let details = frame::details_frame(&all)?;

        self.coerced_dates = normalized.coerced_dates;
        self.skipped_rows = normalized.skipped_rows;
        self.work_orders = Some(normalized.work_orders);
        Ok(PyDataFrame(details))
    }

    /// Parse a group argument, folded the same way group keys are.
    fn group_filter(&self, group: &str) -> Result<GroupFilter, IndicatorError> {
        Ok(fold_group_filter(group.parse()?, self.options.diacritics))
    }

    fn loaded(&self) -> Result<&[WorkOrder], IndicatorError> {
        self.work_orders
            .as_deref()
            .ok_or_else(|| IndicatorError::NotLoaded("work orders".into()))
    }

    fn resolve_window(
        window: Option<Vec<String>>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ReportingWindow, IndicatorError> {
        match (window, start, end) {
            (Some(months), None, None) => ReportingWindow::parse(months.as_slice()),
            (None, Some(start), Some(end)) => {
                ReportingWindow::contiguous(start.parse()?, end.parse()?)
            }
            (None, None, None) => Ok(ReportingWindow::default()),
            _ => Err(IndicatorError::InvalidWindow(
                "pass either `window` or both `start` and `end`".into(),
            )),
        }
    }

    /// Map keys "sector", "open_date", ... to the caller's column names.
    fn apply_column_names(
        options: &mut NormalizeOptions,
        map: HashMap<String, String>,
    ) -> PyResult<()> {
        use crate::schema::work_order;

        for (field, name) in map {
            let slot = match field.as_str() {
                work_order::SECTOR => &mut options.columns.sector,
                work_order::OPEN_DATE => &mut options.columns.open_date,
                work_order::RESOLUTION_DATE => &mut options.columns.resolution_date,
                work_order::EQUIPMENT => &mut options.columns.equipment,
                work_order::MAINTENANCE_TYPE => &mut options.columns.maintenance_type,
                _ => {
                    return Err(PyValueError::new_err(format!(
                        "Unknown work-order field: '{field}'"
                    )))
                }
            };
            *slot = name;
        }
        Ok(())
    }
}
