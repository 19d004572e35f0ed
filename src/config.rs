use std::str::FromStr;

use crate::error::IndicatorError;
use crate::month::{MonthKey, ReportingWindow};
use crate::schema::{filter, work_order};

// ── Normalization ───────────────────────────────────────────────────────────

/// Whether accents are folded out of group keys before grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiacriticPolicy {
    /// "Manutenção" and "Manutencao" land in the same group.
    #[default]
    Strip,
    Keep,
}

/// Names of the input columns the normalizer reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub sector: String,
    pub open_date: String,
    pub resolution_date: String,
    pub equipment: String,
    pub maintenance_type: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            sector: work_order::SECTOR.to_string(),
            open_date: work_order::OPEN_DATE.to_string(),
            resolution_date: work_order::RESOLUTION_DATE.to_string(),
            equipment: work_order::EQUIPMENT.to_string(),
            maintenance_type: work_order::MAINTENANCE_TYPE.to_string(),
        }
    }
}

/// Configuration for the record normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub columns: ColumnNames,
    /// Sector strings are cut at the first occurrence of this character.
    pub delimiter: char,
    pub diacritics: DiacriticPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            delimiter: '_',
            diacritics: DiacriticPolicy::Strip,
        }
    }
}

// ── Query ───────────────────────────────────────────────────────────────────

/// Restricts the work orders a computation sees to one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Only(String),
}

impl GroupFilter {
    pub fn matches(&self, group_key: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => group_key == Some(wanted.as_str()),
        }
    }
}

impl FromStr for GroupFilter {
    type Err = IndicatorError;

    /// `"all"` (any case) or blank selects everything; anything else is an
    /// exact group key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(filter::ALL) {
            Ok(Self::All)
        } else {
            Ok(Self::Only(trimmed.to_string()))
        }
    }
}

/// Restricts detail rows to one open month. Never affects the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(MonthKey),
}

impl MonthFilter {
    pub fn matches(&self, month: MonthKey) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == month,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(filter::ALL) {
            Ok(Self::All)
        } else {
            Ok(Self::Only(trimmed.parse()?))
        }
    }
}

/// Everything one indicator computation is parameterised by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorQuery {
    pub group: GroupFilter,
    pub month: MonthFilter,
    pub window: ReportingWindow,
}

impl IndicatorQuery {
    pub fn with_group(mut self, group: GroupFilter) -> Self {
        self.group = group;
        self
    }

    pub fn with_month(mut self, month: MonthFilter) -> Self {
        self.month = month;
        self
    }

    pub fn with_window(mut self, window: ReportingWindow) -> Self {
        self.window = window;
        self
    }
}
