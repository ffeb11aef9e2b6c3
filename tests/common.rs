#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uquake_inventory::importers::{SheetSet, SheetTable};

pub const SITE_CODE: &str = "OT";
pub const SITE_OPERATOR: &str = "Oyu Tolgoi LLC";
pub const NETWORK_CODE: &str = "OT";

/// A small site: station A has a three component geophone, station B a single
/// component accelerometer, station C has no sensor and one component points
/// at a sensor that does not exist
pub fn site_sheets() -> SheetSet {
    SheetSet {
        sites: SheetTable::new("Sites").with_row([
            ("code", json!(SITE_CODE)),
            ("operator", json!(SITE_OPERATOR)),
            ("country", json!("Mongolia")),
            ("name", json!("Oyu Tolgoi Underground")),
        ]),
        networks: SheetTable::new("Networks").with_row([
            ("code", json!(NETWORK_CODE)),
            ("name", json!("Oyu Tolgoi microseismic network")),
            ("contact_name", json!("Jane Doe")),
            ("contact_email", json!("jane.doe@example.com")),
            ("contact_phone", json!("(976) 555-0100")),
        ]),
        stations: SheetTable::new("Stations")
            .with_row(station("A", 650000.0))
            .with_row(station("B", 651000.0))
            .with_row(station("C", 652000.0)),
        sensors: SheetTable::new("Sensors")
            .with_row(sensor("B01", "B", "ACC-1", "gn", 651010.0, 500.0))
            .with_row(sensor("A01", "A", "GS-11D", "gp", 650010.5, 1000.0)),
        components: SheetTable::new("Components")
            .with_row(component(1, "x", "A01", [1.0, 0.0, 0.0]))
            .with_row(component(2, "y", "A01", [0.0, 1.0, 0.0]))
            .with_row(component(3, "z", "A01", [0.0, 0.0, -1.0]))
            .with_row(component(4, "z", "B01", [0.0, 0.0, 1.0]))
            .with_row(component(5, "x", "Q01", [1.0, 0.0, 0.0])),
        cable_types: SheetTable::new("Cable types").with_row([
            ("code", json!("CBL1")),
            ("description", json!("Twisted pair")),
            ("c", json!(1e-10)),
        ]),
        sensor_types: SheetTable::new("Sensor types")
            .with_row([
                ("model", json!("GS-11D")),
                ("manufacturer", json!("OYO Geospace")),
                ("sensor_type", json!("Geophone")),
                ("resonance_frequency", json!(15.0)),
                ("gain", json!(1.0)),
                ("damping", json!(0.7)),
                ("coil_resistance", json!(375.0)),
            ])
            .with_row([
                ("model", json!("ACC-1")),
                ("manufacturer", json!("Acme")),
                ("sensor_type", json!("Accelerometer")),
                ("resonance_frequency", json!(2300.0)),
                ("gain", json!(2.5)),
                ("damping", json!(0.707)),
                ("coil_resistance", Value::Null),
            ]),
    }
}

fn station(code: &str, x: f64) -> [(&'static str, Value); 6] {
    [
        ("code", json!(code)),
        ("network__code", json!(NETWORK_CODE)),
        ("name", json!(format!("Station {code}"))),
        ("location_x", json!(x)),
        ("location_y", json!(4766000.0)),
        ("location_z", json!(-300.0)),
    ]
}

fn sensor(
    code: &str,
    station: &str,
    model: &str,
    base_code: &str,
    x: f64,
    cable_length: f64,
) -> [(&'static str, Value); 11] {
    [
        ("code", json!(code)),
        ("station__code", json!(station)),
        ("location_code", json!(1)),
        ("location_x", json!(x)),
        ("location_y", json!(4766010.25)),
        ("location_z", json!(-310.0)),
        ("cable__code", json!("CBL1")),
        ("cable_length", json!(cable_length)),
        ("sensor_type__model", json!(model)),
        ("channel_base_code", json!(base_code)),
        ("name", json!(format!("Sensor {code}"))),
    ]
}

fn component(id: i64, code: &str, sensor: &str, orientation: [f64; 3]) -> [(&'static str, Value); 7] {
    [
        ("id", json!(id)),
        ("code", json!(code)),
        ("sensor__code", json!(sensor)),
        ("orientation_x", json!(orientation[0])),
        ("orientation_y", json!(orientation[1])),
        ("orientation_z", json!(orientation[2])),
        ("enabled", json!(true)),
    ]
}

/// Write every sheet of `sheets` to an xlsx file, header row first
pub fn write_workbook(sheets: &SheetSet, path: &Path) {
    let mut workbook = Workbook::new();

    for table in [
        &sheets.sites,
        &sheets.networks,
        &sheets.stations,
        &sheets.sensors,
        &sheets.components,
        &sheets.cable_types,
        &sheets.sensor_types,
    ] {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&table.name)
            .expect("Failed to name worksheet");

        let columns: BTreeSet<&String> = table.rows.iter().flat_map(|r| r.keys()).collect();
        for (col, column) in columns.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, column.as_str())
                .expect("Failed to write header");
        }

        for (i, row) in table.rows.iter().enumerate() {
            let excel_row = (i + 1) as u32;
            for (col, column) in columns.iter().enumerate() {
                let col = col as u16;
                match row.get(*column) {
                    Some(Value::Number(n)) => {
                        worksheet
                            .write_number(excel_row, col, n.as_f64().unwrap_or_default())
                            .expect("Failed to write number");
                    }
                    Some(Value::String(s)) => {
                        worksheet
                            .write_string(excel_row, col, s)
                            .expect("Failed to write string");
                    }
                    Some(Value::Bool(b)) => {
                        worksheet
                            .write_boolean(excel_row, col, *b)
                            .expect("Failed to write boolean");
                    }
                    _ => {}
                }
            }
        }
    }

    workbook.save(path).expect("Failed to save workbook");
}

/// Fixture workbook in a temporary directory; keep the `TempDir` alive while
/// the path is used
pub fn site_workbook() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("site.xlsx");
    write_workbook(&site_sheets(), &path);
    (dir, path)
}
