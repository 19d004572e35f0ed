//! Monthly maintenance-effectiveness indicator.
//!
//! Raw work-order rows are normalized into [`WorkOrder`]s, then rolled up
//! month by month over a [`ReportingWindow`], carrying unresolved work into
//! the next month's planned set. With the `python` feature the crate builds
//! the `_core` extension module.

pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod month;
pub mod normalize;
pub mod record;
pub mod rollup;
pub mod schema;

#[cfg(feature = "python")]
mod model;

pub use config::{
    ColumnNames, DiacriticPolicy, GroupFilter, IndicatorQuery, MonthFilter, NormalizeOptions,
};
pub use error::IndicatorError;
pub use month::{MonthKey, ReportingWindow};
pub use normalize::{fold_group_filter, normalize, CoercedDate, Normalized, SkippedRow};
pub use record::{Status, WorkOrder};
pub use rollup::{compute_indicators, MonthlyIndicator};

/// Normalize `df` and compute the indicator for `query`.
///
/// A missing column aborts before the rollup starts. Rows without a readable
/// open date are left out and the rest still count.
pub fn indicators_for(
    df: &polars::prelude::DataFrame,
    options: &NormalizeOptions,
    query: &IndicatorQuery,
) -> Result<Vec<MonthlyIndicator>, IndicatorError> {
    let normalized = normalize(df, options)?;
    Ok(compute_indicators(
        &normalized.work_orders,
        &query.group,
        &query.window,
    ))
}

/// Work orders for the detail view of `query`. The window plays no part.
pub fn details_for<'a>(orders: &'a [WorkOrder], query: &IndicatorQuery) -> Vec<&'a WorkOrder> {
    rollup::select_details(orders, &query.group, &query.month)
}

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::model::IndicatorModel;
    use crate::schema;

    /// Export schema constants as Python submodules
    fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Work order
        let work_order = PyModule::new(m.py(), "work_order")?;
        work_order.add("SECTOR", schema::work_order::SECTOR)?;
        work_order.add("OPEN_DATE", schema::work_order::OPEN_DATE)?;
        work_order.add("RESOLUTION_DATE", schema::work_order::RESOLUTION_DATE)?;
        work_order.add("EQUIPMENT", schema::work_order::EQUIPMENT)?;
        work_order.add("MAINTENANCE_TYPE", schema::work_order::MAINTENANCE_TYPE)?;
        m.add_submodule(&work_order)?;

        // Derived
        let derived = PyModule::new(m.py(), "derived")?;
        derived.add("GROUP_KEY", schema::derived::GROUP_KEY)?;
        derived.add("OPEN_MONTH", schema::derived::OPEN_MONTH)?;
        derived.add("RESOLUTION_MONTH", schema::derived::RESOLUTION_MONTH)?;
        derived.add("STATUS", schema::derived::STATUS)?;
        m.add_submodule(&derived)?;

        // Status
        let status = PyModule::new(m.py(), "status")?;
        status.add("EXECUTED", schema::status::EXECUTED)?;
        status.add("PENDING", schema::status::PENDING)?;
        m.add_submodule(&status)?;

        // Indicator
        let indicator = PyModule::new(m.py(), "indicator")?;
        indicator.add("MONTH", schema::indicator::MONTH)?;
        indicator.add("PLANNED", schema::indicator::PLANNED)?;
        indicator.add("EXECUTED", schema::indicator::EXECUTED)?;
        indicator.add("ACCUMULATED", schema::indicator::ACCUMULATED)?;
        indicator.add("EFFECTIVENESS", schema::indicator::EFFECTIVENESS)?;
        m.add_submodule(&indicator)?;

        m.add("ALL", schema::filter::ALL)?;
        Ok(())
    }

    #[pymodule]
    #[pyo3(name = "_core")]
    fn core_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<IndicatorModel>()?;
        add_schema_exports(m)?;
        Ok(())
    }
}
