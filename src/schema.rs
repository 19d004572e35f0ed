/// Column-name constants for the maintenance-effectiveness schema.
/// Single source of truth - exported to Python via PyO3.

// ── Raw work-order columns ──────────────────────────────────────────────────
pub mod work_order {
    pub const SECTOR: &str = "sector";
    pub const OPEN_DATE: &str = "open_date";
    pub const RESOLUTION_DATE: &str = "resolution_date";
    pub const EQUIPMENT: &str = "equipment";
    pub const MAINTENANCE_TYPE: &str = "maintenance_type";
}

// ── Derived per-record columns ──────────────────────────────────────────────
pub mod derived {
    pub const GROUP_KEY: &str = "group_key";
    pub const OPEN_MONTH: &str = "open_month";
    pub const RESOLUTION_MONTH: &str = "resolution_month";
    pub const STATUS: &str = "status";
}

// ── Status values ───────────────────────────────────────────────────────────
pub mod status {
    pub const EXECUTED: &str = "Executed";
    pub const PENDING: &str = "Pending";
}

// ── Indicator columns ───────────────────────────────────────────────────────
pub mod indicator {
    pub const MONTH: &str = "month";
    pub const PLANNED: &str = "planned";
    pub const EXECUTED: &str = "executed";
    pub const ACCUMULATED: &str = "accumulated";
    pub const EFFECTIVENESS: &str = "effectiveness";
}

// ── Filter values ───────────────────────────────────────────────────────────
pub mod filter {
    pub const ALL: &str = "all";
}
