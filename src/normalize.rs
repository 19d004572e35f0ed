//! Record normalizer: raw string rows in, [`WorkOrder`]s out.
//!
//! Only a missing column fails the batch. A row whose open date is blank or
//! unreadable is left out and reported as a [`SkippedRow`]; a resolution date
//! that is present but unreadable is coerced to "unresolved" and reported as
//! a [`CoercedDate`].

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use polars::prelude::*;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::{DiacriticPolicy, GroupFilter, NormalizeOptions};
use crate::error::IndicatorError;
use crate::loader::require_columns;
use crate::record::WorkOrder;

/// Day-first layouts with a time part, tried before the date-only ones.
/// Two-digit years come first: `%Y` would read `25` as year 25, while `%y`
/// refuses four digits.
const DATETIME_FORMATS: [&str; 14] = [
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d-%m-%y %H:%M:%S",
    "%d-%m-%y %H:%M",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 7] = [
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
];

/// A resolution-date cell that was present but unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercedDate {
    pub row: usize,
    pub value: String,
}

/// A row left out because its open date was blank or unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub row: usize,
    pub value: String,
}

/// Output of one normalization pass.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub work_orders: Vec<WorkOrder>,
    pub coerced_dates: Vec<CoercedDate>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Normalize every row of `df`.
///
/// Rows are numbered from zero.
pub fn normalize(df: &DataFrame, options: &NormalizeOptions) -> Result<Normalized, IndicatorError> {
    let names = &options.columns;
    require_columns(
        df,
        &[
            names.sector.as_str(),
            names.open_date.as_str(),
            names.resolution_date.as_str(),
        ],
    )?;

    let sectors = string_column(df, &names.sector)?;
    let open_dates = string_column(df, &names.open_date)?;
    let resolution_dates = string_column(df, &names.resolution_date)?;
    let equipment = optional_string_column(df, &names.equipment)?;
    let maintenance_types = optional_string_column(df, &names.maintenance_type)?;

    let mut out = Normalized {
        work_orders: Vec::with_capacity(df.height()),
        coerced_dates: Vec::new(),
        skipped_rows: Vec::new(),
    };

    for row in 0..df.height() {
        let raw_open = open_dates.get(row).unwrap_or("");
        let Some(open_date) = parse_day_first(raw_open) else {
            out.skipped_rows.push(SkippedRow {
                row,
                value: raw_open.trim().to_string(),
            });
            continue;
        };

        let resolution_date = match resolution_dates.get(row).map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_day_first(raw);
                if parsed.is_none() {
                    out.coerced_dates.push(CoercedDate {
                        row,
                        value: raw.to_string(),
                    });
                }
                parsed
            }
        };

        let mut order = WorkOrder::new(open_date, resolution_date);
        if let Some(sector) = sectors.get(row) {
            if let Some(key) = derive_group_key(sector, options.delimiter, options.diacritics) {
                order = order.with_group_key(key);
            }
            order = order.with_sector(sector);
        }
        if let Some(value) = equipment.as_ref().and_then(|c| c.get(row)) {
            order = order.with_equipment(value);
        }
        if let Some(value) = maintenance_types.as_ref().and_then(|c| c.get(row)) {
            order = order.with_maintenance_type(value);
        }
        out.work_orders.push(order);
    }

    if !out.coerced_dates.is_empty() {
        warn!(
            "{} unreadable value(s) in '{}' treated as unresolved",
            out.coerced_dates.len(),
            names.resolution_date
        );
        for coerced in &out.coerced_dates {
            debug!("row {}: '{}' is not a date", coerced.row, coerced.value);
        }
    }
    if !out.skipped_rows.is_empty() {
        warn!(
            "{} row(s) without a readable '{}' left out",
            out.skipped_rows.len(),
            names.open_date
        );
        for skipped in &out.skipped_rows {
            debug!("row {}: open date '{}' is not a date", skipped.row, skipped.value);
        }
    }
    debug!("Normalized {} work orders", out.work_orders.len());

    Ok(out)
}

/// Parse a date written day-first (`15/01/2025`, `15-01-2025 08:30`, ...).
/// ISO `2025-01-15` is accepted as well since that is how typed date
/// columns render once cast to strings.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

/// Portion of `sector` before the first `delimiter`, trimmed.
pub fn derive_group_key(sector: &str, delimiter: char, policy: DiacriticPolicy) -> Option<String> {
    let head = sector.split(delimiter).next().unwrap_or("").trim();
    if head.is_empty() {
        return None;
    }
    Some(match policy {
        DiacriticPolicy::Strip => fold_diacritics(head),
        DiacriticPolicy::Keep => head.to_string(),
    })
}

/// Drop combining marks after canonical decomposition, so precomposed and
/// decomposed spellings fold to the same text.
pub fn fold_diacritics(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Apply the same folding to a filter value that [`derive_group_key`]
/// applies to sector strings.
pub fn fold_group_filter(filter: GroupFilter, policy: DiacriticPolicy) -> GroupFilter {
    match (filter, policy) {
        (GroupFilter::Only(key), DiacriticPolicy::Strip) => {
            GroupFilter::Only(fold_diacritics(&key))
        }
        (other, _) => other,
    }
}

// ── Column access ───────────────────────────────────────────────────────────

/// Fetch a column as strings, casting typed columns (dates, numbers) first.
fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked, IndicatorError> {
    let column = df.column(name)?;
    let column = if column.dtype() == &DataType::String {
        column.clone()
    } else {
        column.cast(&DataType::String)?
    };
    Ok(column.str()?.clone())
}

fn optional_string_column(
    df: &DataFrame,
    name: &str,
) -> Result<Option<StringChunked>, IndicatorError> {
    if df.schema().contains(name) {
        Ok(Some(string_column(df, name)?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnNames;
    use crate::record::Status;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_day_first_layouts() {
        assert_eq!(parse_day_first("03/02/2025"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first(" 03/02/2025 14:05 "), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03/02/2025 14:05:59"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03-02-2025"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03.02.2025"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("2025-02-03"), Some(date(2025, 2, 3)));
        assert_eq!(
            parse_day_first("2025-02-03 10:00:00.000000"),
            Some(date(2025, 2, 3))
        );
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(parse_day_first("03/02/25"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03-02-25 14:05"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03.02.25 14:05:59"), Some(date(2025, 2, 3)));
        assert_eq!(parse_day_first("03/02/2025"), Some(date(2025, 2, 3)));
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("pending"), None);
        assert_eq!(parse_day_first("31/02/2025"), None);
        assert_eq!(parse_day_first("13/13/2025"), None);
    }

    #[test]
    fn group_key_takes_first_segment() {
        assert_eq!(
            derive_group_key("UTI_Adulto_Leito 3", '_', DiacriticPolicy::Keep),
            Some("UTI".to_string())
        );
        assert_eq!(
            derive_group_key("Centro Cirúrgico", '_', DiacriticPolicy::Keep),
            Some("Centro Cirúrgico".to_string())
        );
        assert_eq!(derive_group_key("  _x", '_', DiacriticPolicy::Keep), None);
        assert_eq!(
            derive_group_key("Radiologia-Sala 2", '-', DiacriticPolicy::Keep),
            Some("Radiologia".to_string())
        );
    }

    #[test]
    fn diacritic_policy_controls_grouping() {
        let stripped = derive_group_key("Manutenção_Geral", '_', DiacriticPolicy::Strip);
        assert_eq!(stripped, Some("Manutencao".to_string()));
        let kept = derive_group_key("Manutenção_Geral", '_', DiacriticPolicy::Keep);
        assert_eq!(kept, Some("Manutenção".to_string()));
        assert_eq!(fold_diacritics("ÁÉÍÓÚ àêõü Ç"), "AEIOU aeou C");
    }

    #[test]
    fn precomposed_and_decomposed_spellings_share_a_group() {
        let precomposed = "Emerg\u{ea}ncia_Box 1";
        let decomposed = "Emerge\u{302}ncia_Box 2";
        let a = derive_group_key(precomposed, '_', DiacriticPolicy::Strip);
        let b = derive_group_key(decomposed, '_', DiacriticPolicy::Strip);
        assert_eq!(a, Some("Emergencia".to_string()));
        assert_eq!(a, b);
    }

    #[test]
    fn group_filter_is_folded_like_group_keys() {
        let filter = GroupFilter::Only("Emergência".into());
        assert_eq!(
            fold_group_filter(filter.clone(), DiacriticPolicy::Strip),
            GroupFilter::Only("Emergencia".into())
        );
        assert_eq!(fold_group_filter(filter.clone(), DiacriticPolicy::Keep), filter);
        assert_eq!(
            fold_group_filter(GroupFilter::All, DiacriticPolicy::Strip),
            GroupFilter::All
        );
    }

    #[test]
    fn normalizes_rows() {
        let df = df!(
            "sector" => [Some("UTI_Adulto"), Some("Emergência_1"), None],
            "open_date" => ["05/01/2025", "20/01/2025 08:00", "01/02/2025"],
            "resolution_date" => [Some("10/01/2025"), None, Some("  ")],
            "equipment" => ["Monitor", "Desfibrilador", "Bomba"],
        )
        .unwrap();

        let out = normalize(&df, &NormalizeOptions::default()).unwrap();
        assert!(out.coerced_dates.is_empty());
        let orders = &out.work_orders;
        assert_eq!(orders.len(), 3);

        assert_eq!(orders[0].group_key(), Some("UTI"));
        assert_eq!(orders[0].sector(), Some("UTI_Adulto"));
        assert_eq!(orders[0].status(), Status::Executed);
        assert_eq!(orders[0].resolution_date(), Some(date(2025, 1, 10)));
        assert_eq!(orders[0].equipment(), Some("Monitor"));
        assert_eq!(orders[0].maintenance_type(), None);

        assert_eq!(orders[1].group_key(), Some("Emergencia"));
        assert_eq!(orders[1].status(), Status::Pending);

        assert_eq!(orders[2].group_key(), None);
        assert_eq!(orders[2].status(), Status::Pending);
        assert_eq!(orders[2].open_month().to_string(), "2025-02");
    }

    #[test]
    fn unreadable_resolution_dates_are_coerced() {
        let df = df!(
            "sector" => ["UTI", "UTI"],
            "open_date" => ["05/01/2025", "06/01/2025"],
            "resolution_date" => ["em andamento", "07/01/2025"],
        )
        .unwrap();

        let out = normalize(&df, &NormalizeOptions::default()).unwrap();
        assert_eq!(
            out.coerced_dates,
            vec![CoercedDate {
                row: 0,
                value: "em andamento".to_string()
            }]
        );
        assert_eq!(out.work_orders[0].status(), Status::Pending);
        assert_eq!(out.work_orders[1].status(), Status::Executed);
    }

    #[test]
    fn missing_column_fails_batch() {
        let df = df!(
            "sector" => ["UTI"],
            "open_date" => ["05/01/2025"],
        )
        .unwrap();

        let err = normalize(&df, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, IndicatorError::MissingField(ref c) if c == "resolution_date"));
    }

    #[test]
    fn rows_without_open_date_are_skipped() {
        let df = df!(
            "sector" => [Some("UTI_1"), None, Some("UTI_2")],
            "open_date" => [Some("05/01/2025"), None, Some("sem data")],
            "resolution_date" => [None::<&str>, None, None],
        )
        .unwrap();

        let out = normalize(&df, &NormalizeOptions::default()).unwrap();
        assert_eq!(out.work_orders.len(), 1);
        assert_eq!(out.work_orders[0].sector(), Some("UTI_1"));
        assert_eq!(
            out.skipped_rows,
            vec![
                SkippedRow {
                    row: 1,
                    value: String::new()
                },
                SkippedRow {
                    row: 2,
                    value: "sem data".to_string()
                },
            ]
        );
        assert!(out.coerced_dates.is_empty());
    }

    #[test]
    fn honours_custom_column_names() {
        let df = df!(
            "Setor" => ["UTI_1"],
            "Data de Abertura" => ["05/01/2025"],
            "Data de Solução" => ["06/02/2025"],
        )
        .unwrap();

        let options = NormalizeOptions {
            columns: ColumnNames {
                sector: "Setor".into(),
                open_date: "Data de Abertura".into(),
                resolution_date: "Data de Solução".into(),
                ..ColumnNames::default()
            },
            ..NormalizeOptions::default()
        };
        let out = normalize(&df, &options).unwrap();
        assert_eq!(out.work_orders[0].resolution_month().unwrap().to_string(), "2025-02");
    }
}
