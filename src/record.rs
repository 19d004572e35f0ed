use std::fmt;

use chrono::NaiveDate;

use crate::month::MonthKey;
use crate::schema::status;

/// Whether a work order has been resolved as of the data snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Executed,
    Pending,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executed => status::EXECUTED,
            Self::Pending => status::PENDING,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized maintenance work order.
///
/// Month keys and status are derived once at construction and cannot drift
/// from the dates they come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    open_date: NaiveDate,
    resolution_date: Option<NaiveDate>,
    open_month: MonthKey,
    resolution_month: Option<MonthKey>,
    group_key: Option<String>,
    sector: Option<String>,
    equipment: Option<String>,
    maintenance_type: Option<String>,
}

impl WorkOrder {
    pub fn new(open_date: NaiveDate, resolution_date: Option<NaiveDate>) -> Self {
        Self {
            open_date,
            resolution_date,
            open_month: MonthKey::from_date(open_date),
            resolution_month: resolution_date.map(MonthKey::from_date),
            group_key: None,
            sector: None,
            equipment: None,
            maintenance_type: None,
        }
    }

    pub fn with_group_key(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    pub fn with_maintenance_type(mut self, maintenance_type: impl Into<String>) -> Self {
        self.maintenance_type = Some(maintenance_type.into());
        self
    }

    pub fn open_date(&self) -> NaiveDate {
        self.open_date
    }

    pub fn resolution_date(&self) -> Option<NaiveDate> {
        self.resolution_date
    }

    pub fn open_month(&self) -> MonthKey {
        self.open_month
    }

    pub fn resolution_month(&self) -> Option<MonthKey> {
        self.resolution_month
    }

    pub fn group_key(&self) -> Option<&str> {
        self.group_key.as_deref()
    }

    pub fn sector(&self) -> Option<&str> {
        self.sector.as_deref()
    }

    pub fn equipment(&self) -> Option<&str> {
        self.equipment.as_deref()
    }

    pub fn maintenance_type(&self) -> Option<&str> {
        self.maintenance_type.as_deref()
    }

    pub fn status(&self) -> Status {
        if self.resolution_date.is_some() {
            Status::Executed
        } else {
            Status::Pending
        }
    }

    /// Resolved exactly within `month`.
    pub fn is_resolved_in(&self, month: MonthKey) -> bool {
        self.resolution_month == Some(month)
    }

    /// Still open at the end of `month`: unresolved, or resolved in a later month.
    pub fn is_outstanding_after(&self, month: MonthKey) -> bool {
        match self.resolution_month {
            None => true,
            Some(resolved) => resolved > month,
        }
    }
}
