use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::join::{fill_nulls, inner_join, JoinReport};
use super::station_builder::{StationContext, StationRecord};
use super::workbook::{compare_values, value_as_string, Row, SheetSet, SheetTable};
use crate::config::InventoryConfig;
use crate::inventory::{Inventory, Network, Operator, Person, Site, Station};
use crate::response::{NoResponseLibrary, ResponseError, ResponseLibrary};
use crate::utils::parse_phone_number;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Sheet {0} has no data rows")]
    EmptySheet(String),

    #[error("Missing column {column} in {context}")]
    MissingColumn { context: String, column: String },

    #[error("Invalid value in column {column}: {msg}")]
    InvalidValue { column: String, msg: String },

    #[error("Invalid contact phone number {value:?}: {msg}")]
    InvalidPhoneNumber { value: String, msg: String },

    #[error("Unknown motion: {0}")]
    UnknownMotion(String),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

/// Inventory built from a workbook together with what the joins discarded
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub inventory: Inventory,
    pub join_reports: Vec<JoinReport>,
}

impl ImportOutcome {
    pub fn dropped_rows(&self) -> bool {
        self.join_reports.iter().any(JoinReport::dropped)
    }
}

/// Importer for site workbooks (Sites, Networks, Stations, Sensors,
/// Components, Cable types, Sensor types)
pub struct SpreadsheetImporter {
    workbook_path: String,
    config: InventoryConfig,
}

impl SpreadsheetImporter {
    pub fn new(workbook_path: impl Into<String>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
            config: InventoryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: InventoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn read_sheets(&self) -> Result<SheetSet, ImportError> {
        SheetSet::from_workbook(&self.workbook_path)
    }

    /// Import without a response library; sensors listing NRL keys fail
    pub fn import(&self) -> Result<Inventory, ImportError> {
        Ok(self.import_with_report(&NoResponseLibrary)?.inventory)
    }

    pub fn import_with_report(
        &self,
        library: &dyn ResponseLibrary,
    ) -> Result<ImportOutcome, ImportError> {
        let sheets = self.read_sheets()?;
        let outcome = build_inventory(&sheets, &self.config, library)?;

        info!(
            "Imported {} station(s) from {}",
            outcome.inventory.stations().count(),
            self.workbook_path
        );
        Ok(outcome)
    }
}

/// Read a site workbook into an inventory using the default configuration
pub fn load_from_excel(path: &str) -> Result<Inventory, ImportError> {
    SpreadsheetImporter::new(path).import()
}

fn text_cell(row: &Row, column: &str, sheet: &str) -> Result<String, ImportError> {
    row.get(column)
        .and_then(value_as_string)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ImportError::MissingColumn {
            context: format!("sheet {sheet}"),
            column: column.to_string(),
        })
}

fn optional_text_cell(row: &Row, column: &str) -> Option<String> {
    row.get(column)
        .and_then(value_as_string)
        .filter(|s| !s.is_empty())
}

/// Identity of the site and its network, read from the first rows of the
/// Sites and Networks sheets
struct SiteIdentity {
    source: String,
    sender: String,
    network_code: String,
    network_description: Option<String>,
    site: Site,
    operator: Operator,
}

impl SiteIdentity {
    fn from_sheets(sheets: &SheetSet) -> Result<Self, ImportError> {
        let sites = sheets.sites.first_row()?;
        let networks = sheets.networks.first_row()?;
        let sites_name = sheets.sites.name.as_str();
        let networks_name = sheets.networks.name.as_str();

        let source = text_cell(sites, "code", sites_name)?;
        let site_operator = text_cell(sites, "operator", sites_name)?;
        let site_name = text_cell(sites, "name", sites_name)?;

        let contact_phone = text_cell(networks, "contact_phone", networks_name)?;
        let phone = parse_phone_number(&contact_phone).map_err(|msg| {
            ImportError::InvalidPhoneNumber {
                value: contact_phone.clone(),
                msg: msg.to_string(),
            }
        })?;

        let person = Person {
            names: optional_text_cell(networks, "contact_name").into_iter().collect(),
            agencies: vec![site_operator.clone()],
            emails: optional_text_cell(networks, "contact_email")
                .into_iter()
                .collect(),
            phones: vec![phone],
        };

        let site = Site {
            name: site_name.clone(),
            description: Some(site_name),
            country: optional_text_cell(sites, "country"),
        };

        info!("source={}", source);
        info!("sender={}", site_operator);

        Ok(SiteIdentity {
            source,
            sender: site_operator.clone(),
            network_code: text_cell(networks, "code", networks_name)?,
            network_description: optional_text_cell(networks, "name"),
            site,
            operator: Operator {
                agency: site_operator,
                contacts: vec![person],
            },
        })
    }
}

/// Join Stations, Sensors, Components, Cable types and Sensor types into one
/// row per component, sorted by sensor and location code with empty cells
/// filled with zero
pub fn merge_sheets(sheets: &SheetSet) -> (SheetTable, Vec<JoinReport>) {
    let mut stations = sheets.stations.clone();
    let mut sensors = sheets.sensors.clone();
    let mut components = sheets.components.clone();
    stations.alias_column("code", "station_code");
    sensors.alias_column("code", "sensor_code");
    components.alias_column("code", "code_channel");
    components.alias_column("sensor__code", "sensor");

    let (merged, stations_sensors) = inner_join(
        &stations,
        &sensors,
        "code",
        "station__code",
        "_channel",
        "stations-sensors",
    );
    let (merged, sensors_components) = inner_join(
        &merged,
        &components,
        "sensor_code",
        "sensor__code",
        "_sensor",
        "sensors-components",
    );
    let (merged, components_cables) = inner_join(
        &merged,
        &sheets.cable_types,
        "cable__code",
        "code",
        "_cable",
        "components-cable-types",
    );
    let (mut merged, cables_sensor_types) = inner_join(
        &merged,
        &sheets.sensor_types,
        "sensor_type__model",
        "model",
        "_sensor_type",
        "cable-types-sensor-types",
    );

    merged.rows.sort_by(|a, b| compare_columns(a, b, &["sensor_code", "location_code"]));
    fill_nulls(&mut merged);

    (
        merged,
        vec![
            stations_sensors,
            sensors_components,
            components_cables,
            cables_sensor_types,
        ],
    )
}

fn compare_columns(a: &Row, b: &Row, columns: &[&str]) -> Ordering {
    let null = serde_json::Value::Null;
    columns.iter().fold(Ordering::Equal, |ordering, column| {
        ordering.then_with(|| {
            compare_values(a.get(*column).unwrap_or(&null), b.get(*column).unwrap_or(&null))
        })
    })
}

/// Group merged rows by sensor code, keeping the sorted order
fn group_by_sensor(rows: &[Row]) -> Vec<Vec<Row>> {
    let mut groups: Vec<(String, Vec<Row>)> = Vec::new();
    for row in rows {
        let key = row
            .get("sensor_code")
            .and_then(value_as_string)
            .unwrap_or_default();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(row.clone()),
            None => groups.push((key, vec![row.clone()])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Build an inventory from already loaded workbook sheets
pub fn build_inventory(
    sheets: &SheetSet,
    config: &InventoryConfig,
    library: &dyn ResponseLibrary,
) -> Result<ImportOutcome, ImportError> {
    let identity = SiteIdentity::from_sheets(sheets)?;
    debug!("net_code={}", identity.network_code);

    let (merged, join_reports) = merge_sheets(sheets);
    for report in join_reports.iter().filter(|r| r.dropped()) {
        warn!(
            "{}: {} of {} row(s) kept",
            report.step, report.matched_rows, report.left_rows
        );
    }

    let context = StationContext {
        site: &identity.site,
        operator: &identity.operator,
        config,
        library,
    };

    let mut stations = Vec::new();
    for rows in group_by_sensor(&merged.rows) {
        let record = StationRecord::from_rows(&rows)?;
        debug!(
            "Sensor {} with {} component(s)",
            record.sensor_code,
            record.channels.len()
        );
        stations.push(Station::from_record(&record, &context)?);
    }

    let mut network = Network::new(identity.network_code).with_stations(stations);
    network.description = identity.network_description;

    let mut inventory = Inventory::new(vec![network], identity.source);
    inventory.sender = Some(identity.sender);

    Ok(ImportOutcome {
        inventory,
        join_reports,
    })
}
