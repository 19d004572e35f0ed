//! Monthly rollup engine.
//!
//! Walks the reporting window in order. Each month's planned set is the
//! month's new arrivals plus whatever was still open at the end of the
//! previous month; executed counts the planned work orders resolved in the
//! month, and the rest is carried forward as the next backlog.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use crate::config::{GroupFilter, MonthFilter};
use crate::month::{MonthKey, ReportingWindow};
use crate::record::WorkOrder;

/// One row of the effectiveness indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyIndicator {
    pub month: MonthKey,
    pub planned: u64,
    pub executed: u64,
    pub accumulated: u64,
    /// `executed / planned * 100`; `100.0` when nothing was planned.
    /// Not clamped: clearing backlog can push it past 100.
    pub effectiveness: f64,
}

impl MonthlyIndicator {
    pub fn new(month: MonthKey, planned: u64, executed: u64, accumulated: u64) -> Self {
        Self {
            month,
            planned,
            executed,
            accumulated,
            effectiveness: effectiveness(planned, executed),
        }
    }
}

/// Percentage of planned work that was executed. Nothing planned counts as
/// fully met.
pub fn effectiveness(planned: u64, executed: u64) -> f64 {
    if planned == 0 {
        100.0
    } else {
        executed as f64 / planned as f64 * 100.0
    }
}

/// Compute the indicator for every month of `window`, in window order.
///
/// Work orders opened before the first window month never enter the pass.
/// `orders` is only borrowed; the backlog lives for the duration of the call.
pub fn compute_indicators(
    orders: &[WorkOrder],
    group: &GroupFilter,
    window: &ReportingWindow,
) -> Vec<MonthlyIndicator> {
    let mut arrivals: BTreeMap<MonthKey, Vec<&WorkOrder>> = BTreeMap::new();
    for order in orders.iter().filter(|o| group.matches(o.group_key())) {
        if window.contains(order.open_month()) {
            arrivals.entry(order.open_month()).or_default().push(order);
        }
    }

    let mut backlog: Vec<&WorkOrder> = Vec::new();
    let mut rows = Vec::with_capacity(window.len());

    for &month in window.months() {
        let mut planned = std::mem::take(&mut backlog);
        if let Some(new) = arrivals.get(&month) {
            planned.extend(new.iter().copied());
        }

        let executed = planned.iter().filter(|o| o.is_resolved_in(month)).count();
        backlog = planned
            .iter()
            .copied()
            .filter(|o| o.is_outstanding_after(month))
            .collect();

        let row = MonthlyIndicator::new(
            month,
            planned.len() as u64,
            executed as u64,
            backlog.len() as u64,
        );
        trace!(
            "{}: planned={} executed={} accumulated={}",
            row.month,
            row.planned,
            row.executed,
            row.accumulated
        );
        rows.push(row);
    }

    debug!(
        "Computed {} indicator rows for group {:?}",
        rows.len(),
        group
    );
    rows
}

/// Work orders to show in a detail view: matching group, opened in the
/// selected month.
pub fn select_details<'a>(
    orders: &'a [WorkOrder],
    group: &GroupFilter,
    month: &MonthFilter,
) -> Vec<&'a WorkOrder> {
    orders
        .iter()
        .filter(|o| group.matches(o.group_key()) && month.matches(o.open_month()))
        .collect()
}

/// Distinct group keys, sorted, for populating a unit selector.
pub fn group_keys(orders: &[WorkOrder]) -> Vec<String> {
    orders
        .iter()
        .filter_map(|o| o.group_key())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
