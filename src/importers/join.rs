/// Inner joins between workbook sheets
///
/// Rows from the left table are kept in order and paired with every matching
/// right row. A column present on both sides keeps its name on the left and
/// gets `suffix` appended on the right, unless it is the shared join key.
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::workbook::{value_as_string, Row, SheetTable};

/// Outcome of one join step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinReport {
    pub step: String,
    pub left_rows: usize,
    pub matched_rows: usize,
    /// Left keys with no partner on the right, in first-seen order
    pub dropped_keys: Vec<String>,
    /// Right keys nothing on the left referenced
    pub orphaned_right_keys: Vec<String>,
}

impl JoinReport {
    /// Whether any left row was discarded
    pub fn dropped(&self) -> bool {
        !self.dropped_keys.is_empty()
    }

    fn log(&self) {
        if self.dropped() {
            warn!(
                "Join {}: dropped {} key(s) with no match: {}",
                self.step,
                self.dropped_keys.len(),
                self.dropped_keys.join(", ")
            );
        }
        if !self.orphaned_right_keys.is_empty() {
            debug!(
                "Join {}: {} unreferenced right key(s): {}",
                self.step,
                self.orphaned_right_keys.len(),
                self.orphaned_right_keys.join(", ")
            );
        }
        debug!(
            "Join {}: {} left rows -> {} rows",
            self.step, self.left_rows, self.matched_rows
        );
    }
}

/// Key cell as text; empty and null keys never match
fn join_key(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .and_then(value_as_string)
        .filter(|k| !k.is_empty())
}

fn merge_row(left: &Row, right: &Row, shared_key: Option<&str>, suffix: &str) -> Row {
    let mut merged = left.clone();
    for (column, value) in right {
        if shared_key == Some(column.as_str()) {
            continue;
        }
        if left.contains_key(column) {
            merged.insert(format!("{column}{suffix}"), value.clone());
        } else {
            merged.insert(column.clone(), value.clone());
        }
    }
    merged
}

/// Inner join `left.left_on == right.right_on`
pub fn inner_join(
    left: &SheetTable,
    right: &SheetTable,
    left_on: &str,
    right_on: &str,
    suffix: &str,
    step: &str,
) -> (SheetTable, JoinReport) {
    let mut index: HashMap<String, Vec<&Row>> = HashMap::new();
    let mut right_order = Vec::new();
    for row in &right.rows {
        if let Some(key) = join_key(row, right_on) {
            if !index.contains_key(&key) {
                right_order.push(key.clone());
            }
            index.entry(key).or_default().push(row);
        }
    }

    let shared_key = (left_on == right_on).then_some(left_on);
    let mut rows = Vec::new();
    let mut dropped_keys: Vec<String> = Vec::new();
    let mut referenced = HashSet::new();

    for row in &left.rows {
        let key = join_key(row, left_on);
        match key.as_ref().and_then(|k| index.get(k)) {
            Some(partners) => {
                for partner in partners {
                    rows.push(merge_row(row, partner, shared_key, suffix));
                }
                if let Some(k) = key {
                    referenced.insert(k);
                }
            }
            None => {
                let label = key.unwrap_or_else(|| "<empty>".to_string());
                if !dropped_keys.contains(&label) {
                    dropped_keys.push(label);
                }
            }
        }
    }

    let orphaned_right_keys = right_order
        .into_iter()
        .filter(|k| !referenced.contains(k))
        .collect();

    let report = JoinReport {
        step: step.to_string(),
        left_rows: left.len(),
        matched_rows: rows.len(),
        dropped_keys,
        orphaned_right_keys,
    };
    report.log();

    let table = SheetTable {
        name: format!("{}+{}", left.name, right.name),
        rows,
    };
    (table, report)
}

/// Replace every null cell with numeric zero
pub fn fill_nulls(table: &mut SheetTable) {
    for row in &mut table.rows {
        for value in row.values_mut() {
            if value.is_null() {
                *value = JsonValue::from(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stations() -> SheetTable {
        SheetTable::new("Stations")
            .with_row([("code", json!("A")), ("name", json!("Alpha"))])
            .with_row([("code", json!("B")), ("name", json!("Bravo"))])
            .with_row([("code", json!("C")), ("name", json!("Charlie"))])
    }

    fn sensors() -> SheetTable {
        SheetTable::new("Sensors")
            .with_row([
                ("code", json!("S1")),
                ("station__code", json!("A")),
                ("name", json!("first")),
            ])
            .with_row([
                ("code", json!("S2")),
                ("station__code", json!("A")),
                ("name", json!("second")),
            ])
            .with_row([
                ("code", json!("S3")),
                ("station__code", json!("B")),
                ("name", json!("third")),
            ])
            .with_row([
                ("code", json!("S9")),
                ("station__code", json!("Z")),
                ("name", json!("orphan")),
            ])
    }

    #[test]
    fn test_inner_join_pairs_rows_in_left_order() {
        let (joined, report) =
            inner_join(&stations(), &sensors(), "code", "station__code", "_channel", "stations-sensors");

        assert_eq!(joined.len(), 3);
        let sensor_codes: Vec<_> = joined
            .rows
            .iter()
            .map(|r| r["code_channel"].clone())
            .collect();
        assert_eq!(sensor_codes, vec![json!("S1"), json!("S2"), json!("S3")]);
        assert_eq!(report.left_rows, 3);
        assert_eq!(report.matched_rows, 3);
    }

    #[test]
    fn test_inner_join_suffixes_right_collisions() {
        let (joined, _) =
            inner_join(&stations(), &sensors(), "code", "station__code", "_channel", "stations-sensors");

        let row = &joined.rows[0];
        assert_eq!(row["code"], json!("A"));
        assert_eq!(row["name"], json!("Alpha"));
        assert_eq!(row["name_channel"], json!("first"));
        assert_eq!(row["station__code"], json!("A"));
    }

    #[test]
    fn test_inner_join_reports_drops_and_orphans() {
        let (_, report) =
            inner_join(&stations(), &sensors(), "code", "station__code", "_channel", "stations-sensors");

        assert!(report.dropped());
        assert_eq!(report.dropped_keys, vec!["C".to_string()]);
        assert_eq!(report.orphaned_right_keys, vec!["Z".to_string()]);
    }

    #[test]
    fn test_inner_join_shared_key_kept_once() {
        let left = SheetTable::new("L").with_row([("model", json!("GS-11D")), ("a", json!(1))]);
        let right = SheetTable::new("R").with_row([("model", json!("GS-11D")), ("b", json!(2))]);

        let (joined, report) = inner_join(&left, &right, "model", "model", "_r", "l-r");
        assert!(!report.dropped());
        assert_eq!(joined.rows[0].len(), 3);
        assert!(!joined.rows[0].contains_key("model_r"));
    }

    #[test]
    fn test_inner_join_matches_numeric_and_text_keys() {
        let left = SheetTable::new("L").with_row([("id", json!(7.0))]);
        let right = SheetTable::new("R").with_row([("ref", json!("7")), ("v", json!("x"))]);

        let (joined, _) = inner_join(&left, &right, "id", "ref", "_r", "l-r");
        assert_eq!(joined.len(), 1);
        assert_eq!(joined.rows[0]["v"], json!("x"));
    }

    #[test]
    fn test_inner_join_null_keys_never_match() {
        let left = SheetTable::new("L").with_row([("id", JsonValue::Null)]);
        let right = SheetTable::new("R").with_row([("id", JsonValue::Null)]);

        let (joined, report) = inner_join(&left, &right, "id", "id", "_r", "l-r");
        assert!(joined.is_empty());
        assert_eq!(report.dropped_keys, vec!["<empty>".to_string()]);
    }

    #[test]
    fn test_fill_nulls() {
        let mut table = SheetTable::new("T").with_row([("a", JsonValue::Null), ("b", json!("x"))]);
        fill_nulls(&mut table);
        assert_eq!(table.rows[0]["a"], json!(0));
        assert_eq!(table.rows[0]["b"], json!("x"));
    }
}
