//! DataFrame export for the table/chart and detail views.
//!
//! Values are left raw: months as `YYYY-MM`, dates as ISO strings,
//! effectiveness as an unformatted percentage.

use polars::prelude::*;

use crate::error::IndicatorError;
use crate::record::WorkOrder;
use crate::rollup::MonthlyIndicator;
use crate::schema::{derived, indicator, work_order};

/// One row per month, in window order.
pub fn indicators_frame(rows: &[MonthlyIndicator]) -> Result<DataFrame, IndicatorError> {
    let months: Vec<String> = rows.iter().map(|r| r.month.to_string()).collect();
    let planned: Vec<u64> = rows.iter().map(|r| r.planned).collect();
    let executed: Vec<u64> = rows.iter().map(|r| r.executed).collect();
    let accumulated: Vec<u64> = rows.iter().map(|r| r.accumulated).collect();
    let effectiveness: Vec<f64> = rows.iter().map(|r| r.effectiveness).collect();

    let df = DataFrame::new(vec![
        Column::new(indicator::MONTH.into(), months),
        Column::new(indicator::PLANNED.into(), planned),
        Column::new(indicator::EXECUTED.into(), executed),
        Column::new(indicator::ACCUMULATED.into(), accumulated),
        Column::new(indicator::EFFECTIVENESS.into(), effectiveness),
    ])?;
    Ok(df)
}

/// Normalized per-record fields plus the passthrough descriptive columns.
pub fn details_frame(orders: &[&WorkOrder]) -> Result<DataFrame, IndicatorError> {
    let text = |f: fn(&WorkOrder) -> Option<&str>| -> Vec<Option<String>> {
        orders.iter().map(|o| f(o).map(str::to_string)).collect()
    };

    let open_dates: Vec<String> = orders.iter().map(|o| o.open_date().to_string()).collect();
    let resolution_dates: Vec<Option<String>> = orders
        .iter()
        .map(|o| o.resolution_date().map(|d| d.to_string()))
        .collect();
    let open_months: Vec<String> = orders.iter().map(|o| o.open_month().to_string()).collect();
    let resolution_months: Vec<Option<String>> = orders
        .iter()
        .map(|o| o.resolution_month().map(|m| m.to_string()))
        .collect();
    let statuses: Vec<&str> = orders.iter().map(|o| o.status().as_str()).collect();

    let df = DataFrame::new(vec![
        Column::new(work_order::SECTOR.into(), text(WorkOrder::sector)),
        Column::new(derived::GROUP_KEY.into(), text(WorkOrder::group_key)),
        Column::new(work_order::EQUIPMENT.into(), text(WorkOrder::equipment)),
        Column::new(
            work_order::MAINTENANCE_TYPE.into(),
            text(WorkOrder::maintenance_type),
        ),
        Column::new(work_order::OPEN_DATE.into(), open_dates),
        Column::new(work_order::RESOLUTION_DATE.into(), resolution_dates),
        Column::new(derived::OPEN_MONTH.into(), open_months),
        Column::new(derived::RESOLUTION_MONTH.into(), resolution_months),
        Column::new(derived::STATUS.into(), statuses),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthKey;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn indicator_frame_keeps_window_order() {
        let rows = vec![
            MonthlyIndicator::new(MonthKey::new(2025, 1).unwrap(), 2, 1, 1),
            MonthlyIndicator::new(MonthKey::new(2025, 2).unwrap(), 0, 0, 0),
        ];
        let df = indicators_frame(&rows).unwrap();

        assert_eq!(df.shape(), (2, 5));
        let months = df.column(indicator::MONTH).unwrap().str().unwrap();
        assert_eq!(months.get(0), Some("2025-01"));
        assert_eq!(months.get(1), Some("2025-02"));
        let eff = df.column(indicator::EFFECTIVENESS).unwrap().f64().unwrap();
        assert_eq!(eff.get(0), Some(50.0));
        assert_eq!(eff.get(1), Some(100.0));
        let planned = df.column(indicator::PLANNED).unwrap().u64().unwrap();
        assert_eq!(planned.get(0), Some(2));
    }

    #[test]
    fn details_frame_renders_absent_values_as_null() {
        let executed = WorkOrder::new(date(2025, 1, 5), Some(date(2025, 1, 9)))
            .with_sector("UTI_Adulto")
            .with_group_key("UTI")
            .with_equipment("Monitor");
        let pending = WorkOrder::new(date(2025, 2, 1), None);
        let df = details_frame(&[&executed, &pending]).unwrap();

        assert_eq!(df.shape(), (2, 9));
        let status = df.column(derived::STATUS).unwrap().str().unwrap();
        assert_eq!(status.get(0), Some("Executed"));
        assert_eq!(status.get(1), Some("Pending"));
        let resolved = df.column(work_order::RESOLUTION_DATE).unwrap().str().unwrap();
        assert_eq!(resolved.get(0), Some("2025-01-09"));
        assert_eq!(resolved.get(1), None);
        let groups = df.column(derived::GROUP_KEY).unwrap().str().unwrap();
        assert_eq!(groups.get(0), Some("UTI"));
        assert_eq!(groups.get(1), None);
        let kinds = df.column(work_order::MAINTENANCE_TYPE).unwrap();
        assert_eq!(kinds.null_count(), 2);
    }

    #[test]
    fn empty_inputs_give_empty_frames() {
        assert_eq!(indicators_frame(&[]).unwrap().height(), 0);
        assert_eq!(details_frame(&[]).unwrap().height(), 0);
    }
}
