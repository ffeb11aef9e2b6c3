/// Site workbook sheets loaded as tables of named columns
///
/// Each sheet's first row is its header; every following non-blank row becomes
/// a [`Row`] mapping column name to a JSON scalar (number, string, bool, or
/// null for an empty cell).
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde_json::{Number, Value as JsonValue};
use std::cmp::Ordering;
use tracing::{debug, info};

use super::excel_importer::ImportError;

pub type Row = serde_json::Map<String, JsonValue>;

pub const SITES: &str = "Sites";
pub const NETWORKS: &str = "Networks";
pub const STATIONS: &str = "Stations";
pub const SENSORS: &str = "Sensors";
pub const COMPONENTS: &str = "Components";
pub const CABLE_TYPES: &str = "Cable types";
pub const SENSOR_TYPES: &str = "Sensor types";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub rows: Vec<Row>,
}

impl SheetTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row given as `(column, value)` pairs
    pub fn with_row<I, K, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        self.rows
            .push(cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Build a table from a worksheet range: header row, then data rows
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let name = name.into();
        let mut rows_iter = range.rows();

        let Some(header_row) = rows_iter.next() else {
            return Self::new(name);
        };
        let header: Vec<Option<String>> = header_row
            .iter()
            .map(|cell| match cell_to_json(cell) {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .collect();

        let mut rows = Vec::new();
        for cells in rows_iter {
            if cells.iter().all(|c| matches!(c, Data::Empty)) {
                continue;
            }
            let row: Row = header
                .iter()
                .zip(cells.iter())
                .filter_map(|(column, cell)| {
                    column.as_ref().map(|c| (c.clone(), cell_to_json(cell)))
                })
                .collect();
            rows.push(row);
        }

        debug!("Sheet {}: {} rows", name, rows.len());
        Self { name, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_row(&self) -> Result<&Row, ImportError> {
        self.rows
            .first()
            .ok_or_else(|| ImportError::EmptySheet(self.name.clone()))
    }

    /// Copy column `from` into a new column `to` on every row
    pub fn alias_column(&mut self, from: &str, to: &str) {
        for row in &mut self.rows {
            if let Some(value) = row.get(from).cloned() {
                row.insert(to.to_string(), value);
            }
        }
    }
}

/// The seven sheets of a site workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSet {
    pub sites: SheetTable,
    pub networks: SheetTable,
    pub stations: SheetTable,
    pub sensors: SheetTable,
    pub components: SheetTable,
    pub cable_types: SheetTable,
    pub sensor_types: SheetTable,
}

impl SheetSet {
    /// Open a workbook (xlsx, xls, ods) and load every required sheet
    pub fn from_workbook(path: &str) -> Result<Self, ImportError> {
        info!("Opening site workbook: {}", path);

        let mut workbook =
            open_workbook_auto(path).map_err(|e| ImportError::WorkbookOpen(e.to_string()))?;

        let mut load = |name: &str| -> Result<SheetTable, ImportError> {
            let range = workbook
                .worksheet_range(name)
                .map_err(|_| ImportError::SheetNotFound(name.to_string()))?;
            Ok(SheetTable::from_range(name, &range))
        };

        Ok(SheetSet {
            sites: load(SITES)?,
            networks: load(NETWORKS)?,
            stations: load(STATIONS)?,
            sensors: load(SENSORS)?,
            components: load(COMPONENTS)?,
            cable_types: load(CABLE_TYPES)?,
            sensor_types: load(SENSOR_TYPES)?,
        })
    }
}

/// Convert a calamine cell to a JSON scalar
pub(crate) fn cell_to_json(cell: &Data) -> JsonValue {
    match cell {
        Data::Int(i) => JsonValue::from(*i),
        Data::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Data::String(s) if s.trim().is_empty() => JsonValue::Null,
        Data::String(s) => JsonValue::String(s.clone()),
        Data::Bool(b) => JsonValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| JsonValue::String(d.to_string()))
            .unwrap_or(JsonValue::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => JsonValue::String(s.clone()),
        Data::Error(_) | Data::Empty => JsonValue::Null,
        #[allow(unreachable_patterns)]
        _ => JsonValue::Null,
    }
}

/// Numeric view of a cell: numbers, numeric strings and booleans (as 0/1)
pub fn value_as_f64(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Text view of a cell; integral numbers print without a fractional part
pub fn value_as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        }),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Truthiness of an `enabled`-style cell
pub fn value_as_bool(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "y" | "1" | "x"
        ),
        _ => false,
    }
}

/// Order cells the way a sort over a mixed column would: nulls, numbers, text
pub fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
    fn rank(v: &JsonValue) -> u8 {
        match v {
            JsonValue::Null => 0,
            JsonValue::Bool(_) | JsonValue::Number(_) => 1,
            _ => 2,
        }
    }

    match (value_as_f64(a), value_as_f64(b)) {
        (Some(x), Some(y)) if rank(a) == 1 && rank(b) == 1 => x.total_cmp(&y),
        _ => rank(a).cmp(&rank(b)).then_with(|| {
            value_as_string(a)
                .unwrap_or_default()
                .cmp(&value_as_string(b).unwrap_or_default())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_range_uses_header_row() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("code".into()));
        range.set_value((0, 1), Data::String(" name ".into()));
        range.set_value((1, 0), Data::String("A".into()));
        range.set_value((1, 1), Data::String("Alpha".into()));
        range.set_value((1, 2), Data::Float(3.0));
        range.set_value((2, 0), Data::Float(7.0));

        let table = SheetTable::from_range("Stations", &range);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("code"), Some(&json!("A")));
        assert_eq!(table.rows[0].get("name"), Some(&json!("Alpha")));
        assert_eq!(table.rows[1].get("code"), Some(&json!(7.0)));
        assert_eq!(table.rows[1].get("name"), Some(&JsonValue::Null));
        // Column without a header is dropped
        assert_eq!(table.rows[0].len(), 2);
    }

    #[test]
    fn test_from_range_skips_blank_rows() {
        let mut range = Range::new((0, 0), (2, 0));
        range.set_value((0, 0), Data::String("code".into()));
        range.set_value((2, 0), Data::String("B".into()));

        let table = SheetTable::from_range("Stations", &range);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_first_row_of_empty_sheet() {
        let table = SheetTable::new("Sites");
        assert!(matches!(table.first_row(), Err(ImportError::EmptySheet(_))));
    }

    #[test]
    fn test_alias_column() {
        let mut table = SheetTable::new("Sensors").with_row([("code", json!("S1"))]);
        table.alias_column("code", "sensor_code");
        assert_eq!(table.rows[0].get("sensor_code"), Some(&json!("S1")));
        assert_eq!(table.rows[0].get("code"), Some(&json!("S1")));
    }

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&Data::Int(4)), json!(4));
        assert_eq!(cell_to_json(&Data::Float(f64::NAN)), JsonValue::Null);
        assert_eq!(cell_to_json(&Data::String("  ".into())), JsonValue::Null);
        assert_eq!(cell_to_json(&Data::Bool(true)), json!(true));
        assert_eq!(cell_to_json(&Data::Empty), JsonValue::Null);
    }

    #[test]
    fn test_value_views() {
        assert_eq!(value_as_f64(&json!("2.5")), Some(2.5));
        assert_eq!(value_as_f64(&json!("n/a")), None);
        assert_eq!(value_as_string(&json!(1.0)), Some("1".to_string()));
        assert_eq!(value_as_string(&json!(1.25)), Some("1.25".to_string()));
        assert_eq!(value_as_string(&JsonValue::Null), None);
        assert!(value_as_bool(&json!(1)));
        assert!(value_as_bool(&json!("TRUE")));
        assert!(!value_as_bool(&json!(0.0)));
        assert!(!value_as_bool(&JsonValue::Null));
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("S10"), &json!("S2")), Ordering::Less);
        assert_eq!(compare_values(&json!(5), &json!("A")), Ordering::Less);
        assert_eq!(compare_values(&JsonValue::Null, &json!(0)), Ordering::Less);
    }
}
