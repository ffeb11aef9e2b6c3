/// Reshape joined workbook rows into station records and typed stations
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::excel_importer::ImportError;
use super::workbook::{value_as_bool, value_as_f64, value_as_string, Row};
use crate::config::InventoryConfig;
use crate::inventory::{Channel, Equipment, Operator, Site, Station};
use crate::response::{
    accelerometer_response, geophone_response, AccelerometerParameters, GeophoneParameters,
    Response, ResponseLibrary,
};
use crate::utils::format_location_code;

/// Columns describing a single component rather than the sensor
const REMOVED_KEYS: [&str; 9] = [
    "code",
    "id_channel",
    "orientation_x",
    "orientation_y",
    "orientation_z",
    "id_sensor",
    "enabled_channel",
    "station_id",
    "id_cable",
];

/// Columns the record carries under its own field names
const RENAMED_KEYS: [&str; 5] = ["sensor_code", "location_x", "location_y", "location_z", "name"];

/// Ground motion a sensor measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Velocity,
    Acceleration,
}

impl Motion {
    /// Accelerometers measure acceleration; everything else is a velocity sensor
    pub fn from_sensor_type(sensor_type: &str) -> Self {
        if sensor_type.trim().eq_ignore_ascii_case("ACCELEROMETER") {
            Motion::Acceleration
        } else {
            Motion::Velocity
        }
    }
}

impl FromStr for Motion {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VELOCITY" => Ok(Motion::Velocity),
            "ACCELERATION" => Ok(Motion::Acceleration),
            _ => Err(ImportError::UnknownMotion(s.to_string())),
        }
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Motion::Velocity => write!(f, "VELOCITY"),
            Motion::Acceleration => write!(f, "ACCELERATION"),
        }
    }
}

/// One component row of a sensor
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// Component letter, upper-cased
    pub component: String,
    /// (east, north, up) orientation vector
    pub orientation: [f64; 3],
    pub enabled: bool,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Everything known about one sensor after the sheets are joined
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub sensor_code: String,
    pub station_code: String,
    /// `{network}.{station}.{location:02}`
    pub long_name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub cable_capacitance_pf_per_meter: f64,
    /// Derived from the sensor type column
    pub motion: Motion,
    /// Remaining non-empty columns carried verbatim
    pub fields: Row,
    pub channels: Vec<ChannelRecord>,
}

fn column<'r>(row: &'r Row, names: &[&str]) -> Option<&'r JsonValue> {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .find(|value| !value.is_null())
}

fn required_text(row: &Row, names: &[&str], context: &str) -> Result<String, ImportError> {
    column(row, names)
        .and_then(value_as_string)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ImportError::MissingColumn {
            context: context.to_string(),
            column: names[0].to_string(),
        })
}

fn required_f64(row: &Row, names: &[&str], context: &str) -> Result<f64, ImportError> {
    let value = column(row, names).ok_or_else(|| ImportError::MissingColumn {
        context: context.to_string(),
        column: names[0].to_string(),
    })?;
    value_as_f64(value).ok_or_else(|| ImportError::InvalidValue {
        column: names[0].to_string(),
        msg: format!("expected a number, got {value}"),
    })
}

fn is_empty_cell(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl StationRecord {
    /// Build a record from every joined row of one sensor, sorted by location
    pub fn from_rows(rows: &[Row]) -> Result<Self, ImportError> {
        let row = rows.first().ok_or_else(|| ImportError::MissingColumn {
            context: "sensor rows".to_string(),
            column: "sensor_code".to_string(),
        })?;

        let sensor_code = required_text(row, &["sensor_code"], "joined sensor row")?;
        let context = format!("sensor {sensor_code}");

        let station_code = required_text(row, &["station_code"], &context)?;
        let network_code = required_text(row, &["network__code"], &context)?;
        let location_code =
            format_location_code(&required_text(row, &["location_code"], &context)?);

        let x = required_f64(row, &["location_x_channel", "location_x"], &context)?;
        let y = required_f64(row, &["location_y_channel", "location_y"], &context)?;
        let z = required_f64(row, &["location_z_channel", "location_z"], &context)?;

        // Cable capacitance is stored in F/m on the Cable types sheet
        let cable_capacitance_pf_per_meter = column(row, &["c"])
            .and_then(value_as_f64)
            .unwrap_or(0.0)
            * 1e12;

        let sensor_type = column(row, &["sensor_type"])
            .and_then(value_as_string)
            .unwrap_or_default();
        let motion = Motion::from_sensor_type(&sensor_type);

        let fields: Row = row
            .iter()
            .filter(|(key, value)| {
                !REMOVED_KEYS.contains(&key.as_str())
                    && !RENAMED_KEYS.contains(&key.as_str())
                    && !is_empty_cell(value)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let channels = rows
            .iter()
            .map(|r| {
                let component =
                    required_text(r, &["code_channel_sensor", "code_channel"], &context)?
                        .to_uppercase();
                let orientation = [
                    required_f64(r, &["orientation_x"], &context)?,
                    required_f64(r, &["orientation_y"], &context)?,
                    required_f64(r, &["orientation_z"], &context)?,
                ];
                let enabled = column(r, &["enabled"]).is_some_and(value_as_bool);
                Ok(ChannelRecord {
                    component,
                    orientation,
                    enabled,
                    x,
                    y,
                    z,
                })
            })
            .collect::<Result<Vec<_>, ImportError>>()?;

        Ok(StationRecord {
            sensor_code,
            long_name: format!("{network_code}.{station_code}.{location_code}"),
            station_code,
            x,
            y,
            z,
            cable_capacitance_pf_per_meter,
            motion,
            fields,
            channels,
        })
    }

    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name).filter(|v| !is_empty_cell(v))
    }

    /// Non-empty text field; numeric zero counts as empty
    pub fn text_field(&self, name: &str) -> Option<String> {
        match self.field(name)? {
            JsonValue::String(s) => Some(s.trim().to_string()),
            JsonValue::Number(n) if n.as_f64() == Some(0.0) => None,
            other => value_as_string(other),
        }
    }

    pub fn number_field(&self, name: &str) -> Result<f64, ImportError> {
        required_f64(&self.fields, &[name], &format!("sensor {}", self.sensor_code))
    }

    /// Comma separated response library keys, trimmed
    pub fn nrl_sensor_keys(&self) -> Option<Vec<String>> {
        let keys: Vec<String> = self
            .text_field("nrl_sensor_keys")?
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        (!keys.is_empty()).then_some(keys)
    }

    pub fn location_code(&self) -> Result<String, ImportError> {
        self.text_field("location_code")
            .or_else(|| {
                // A location code of 0 is filled as numeric zero
                self.fields.get("location_code").and_then(value_as_string)
            })
            .map(|code| format_location_code(&code))
            .ok_or_else(|| ImportError::MissingColumn {
                context: format!("sensor {}", self.sensor_code),
                column: "location_code".to_string(),
            })
    }

    /// Sensor equipment when the sheets name a manufacturer
    pub fn equipment(&self) -> Option<Equipment> {
        let manufacturer = self
            .text_field("manufacturer_sensor")
            .or_else(|| self.text_field("manufacturer"))?;
        Some(Equipment {
            equipment_type: Some("Sensor".to_string()),
            manufacturer: Some(manufacturer),
            model: self.text_field("model"),
        })
    }

    /// Response shared by every channel of the sensor
    pub fn response(&self, library: &dyn ResponseLibrary) -> Result<Response, ImportError> {
        if let Some(keys) = self.nrl_sensor_keys() {
            debug!("Sensor {}: response from library {:?}", self.sensor_code, keys);
            return Ok(library.sensor_response(&keys)?);
        }

        let resonance_frequency = self.number_field("resonance_frequency")?;
        let gain = self.number_field("gain")?;

        debug!("Sensor {}: {} response", self.sensor_code, self.motion);
        match self.motion {
            Motion::Acceleration => Ok(accelerometer_response(&AccelerometerParameters::new(
                resonance_frequency,
                gain,
            ))?),
            Motion::Velocity => {
                let mut params = GeophoneParameters::new(resonance_frequency, gain);
                if let Some(damping) = self.field("damping").and_then(value_as_f64) {
                    params = params.with_damping(damping);
                }
                let cable = (
                    self.field("coil_resistance").and_then(value_as_f64),
                    self.field("cable_length").and_then(value_as_f64),
                    self.field("c").and_then(value_as_f64),
                );
                if let (Some(resistance), Some(length), Some(capacitance)) = cable {
                    params = params.with_cable(resistance, length, capacitance);
                }
                Ok(geophone_response(&params)?)
            }
        }
    }
}

/// Site-wide values shared by every station of an import
pub struct StationContext<'a> {
    pub site: &'a Site,
    pub operator: &'a Operator,
    pub config: &'a InventoryConfig,
    pub library: &'a dyn ResponseLibrary,
}

impl Station {
    /// Typed station with one channel per component of the record
    pub fn from_record(
        record: &StationRecord,
        context: &StationContext<'_>,
    ) -> Result<Self, ImportError> {
        let config = context.config;

        let base_code = record
            .text_field("channel_base_code")
            .ok_or_else(|| ImportError::MissingColumn {
                context: format!("sensor {}", record.sensor_code),
                column: "channel_base_code".to_string(),
            })?
            .to_uppercase();
        let location_code = record.location_code()?;
        let response = record.response(context.library)?;

        let mut station = Station::new(record.station_code.clone(), 0.0, 0.0, 0.0);
        station.historical_code = Some(record.long_name.clone());
        station.creation_date = Some(config.creation_date);
        station.start_date = Some(config.station_start_date);
        station.end_date = Some(config.station_end_date);
        station.site = context.site.clone();
        station.operators = vec![context.operator.clone()];
        station.equipments = record.equipment().into_iter().collect();
        station.set_loc([record.x, record.y, record.z]);

        for channel_record in &record.channels {
            if !channel_record.enabled {
                debug!(
                    "Sensor {} component {} is disabled",
                    record.sensor_code, channel_record.component
                );
            }

            let mut channel = Channel::new(
                format!("{}{}", base_code, channel_record.component),
                location_code.clone(),
            );
            channel.start_date = Some(config.channel_start_date);
            channel.end_date = Some(config.channel_end_date);
            channel.response = Some(response.clone());
            channel.set_loc([channel_record.x, channel_record.y, channel_record.z]);
            channel.set_orientation(channel_record.orientation);
            channel.set_alternative_code(record.sensor_code.clone());
            station.channels.push(channel);
        }

        if station.channels.is_empty() {
            warn!("Sensor {} has no components", record.sensor_code);
        }

        Ok(station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{LocalCoordinates, Person};
    use crate::response::{InMemoryResponseLibrary, NoResponseLibrary, ResponseError};
    use serde_json::json;

    fn joined_row(component: &str, orientation: [f64; 3]) -> Row {
        let mut row = Row::new();
        for (key, value) in [
            ("code", json!("STA")),
            ("station_code", json!("STA")),
            ("network__code", json!("OT")),
            ("sensor_code", json!("STA.01")),
            ("location_code", json!(1)),
            ("location_x", json!(1.0)),
            ("location_x_channel", json!(650100.5)),
            ("location_y_channel", json!(4766200.25)),
            ("location_z_channel", json!(-350.0)),
            ("code_channel_sensor", json!(component)),
            ("orientation_x", json!(orientation[0])),
            ("orientation_y", json!(orientation[1])),
            ("orientation_z", json!(orientation[2])),
            ("enabled", json!(1)),
            ("id_channel", json!(12)),
            ("channel_base_code", json!("gp")),
            ("sensor_type", json!("Geophone")),
            ("resonance_frequency", json!(15.0)),
            ("gain", json!(1.0)),
            ("damping", json!(0.7)),
            ("coil_resistance", json!(375.0)),
            ("cable_length", json!(1000.0)),
            ("c", json!(1e-10)),
            ("manufacturer_sensor", json!("OYO Geospace")),
            ("model", json!("GS-11D")),
            ("nrl_sensor_keys", json!(0)),
            ("name", json!("Sensor STA")),
        ] {
            row.insert(key.to_string(), value);
        }
        row
    }

    fn context_parts() -> (Site, Operator, InventoryConfig) {
        let site = Site::new("Test Mine");
        let operator = Operator {
            agency: "Operator Inc".to_string(),
            contacts: vec![Person::default()],
        };
        (site, operator, InventoryConfig::default())
    }

    #[test]
    fn test_motion_from_sensor_type() {
        assert_eq!(Motion::from_sensor_type("accelerometer"), Motion::Acceleration);
        assert_eq!(Motion::from_sensor_type("Geophone"), Motion::Velocity);
        assert_eq!("velocity".parse::<Motion>().unwrap(), Motion::Velocity);
        assert!(matches!(
            "DISPLACEMENT".parse::<Motion>(),
            Err(ImportError::UnknownMotion(_))
        ));
    }

    #[test]
    fn test_record_from_rows() {
        let rows = vec![
            joined_row("x", [1.0, 0.0, 0.0]),
            joined_row("y", [0.0, 1.0, 0.0]),
            joined_row("z", [0.0, 0.0, -1.0]),
        ];
        let record = StationRecord::from_rows(&rows).unwrap();

        assert_eq!(record.sensor_code, "STA.01");
        assert_eq!(record.station_code, "STA");
        assert_eq!(record.long_name, "OT.STA.01");
        assert_eq!(record.x, 650100.5);
        assert_eq!(record.z, -350.0);
        assert!((record.cable_capacitance_pf_per_meter - 100.0).abs() < 1e-9);
        assert_eq!(record.motion, Motion::Velocity);

        let components: Vec<_> = record.channels.iter().map(|c| c.component.as_str()).collect();
        assert_eq!(components, vec!["X", "Y", "Z"]);
        assert!(record.channels.iter().all(|c| c.enabled));
        assert_eq!(record.channels[2].orientation, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_record_drops_removed_and_renamed_keys() {
        let record = StationRecord::from_rows(&[joined_row("x", [1.0, 0.0, 0.0])]).unwrap();

        for key in ["code", "id_channel", "orientation_x", "sensor_code", "location_x", "name"] {
            assert!(!record.fields.contains_key(key), "{key} should not be carried");
        }
        assert!(record.fields.contains_key("channel_base_code"));
        assert!(record.fields.contains_key("location_x_channel"));
    }

    #[test]
    fn test_record_accelerometer_motion() {
        let mut row = joined_row("x", [1.0, 0.0, 0.0]);
        row.insert("sensor_type".to_string(), json!("ACCELEROMETER"));
        let record = StationRecord::from_rows(&[row]).unwrap();
        assert_eq!(record.motion, Motion::Acceleration);

        let response = record.response(&NoResponseLibrary).unwrap();
        assert!(response.zeros().is_empty());
        assert_eq!(response.poles().len(), 2);
    }

    #[test]
    fn test_record_missing_sensor_code() {
        let mut row = joined_row("x", [1.0, 0.0, 0.0]);
        row.remove("sensor_code");
        assert!(matches!(
            StationRecord::from_rows(&[row]),
            Err(ImportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_nrl_keys_use_library() {
        let mut row = joined_row("x", [1.0, 0.0, 0.0]);
        row.insert("nrl_sensor_keys".to_string(), json!("Sercel, L-22D , "));
        let record = StationRecord::from_rows(&[row]).unwrap();
        assert_eq!(
            record.nrl_sensor_keys(),
            Some(vec!["Sercel".to_string(), "L-22D".to_string()])
        );

        assert!(matches!(
            record.response(&NoResponseLibrary),
            Err(ImportError::Response(ResponseError::UnknownSensorKeys(_)))
        ));

        let mut library = InMemoryResponseLibrary::new();
        library.insert(["Sercel", "L-22D"], Response::default());
        assert_eq!(record.response(&library).unwrap(), Response::default());
    }

    #[test]
    fn test_geophone_response_has_cable_pole() {
        let record = StationRecord::from_rows(&[joined_row("x", [1.0, 0.0, 0.0])]).unwrap();
        let response = record.response(&NoResponseLibrary).unwrap();

        assert_eq!(response.zeros().len(), 2);
        assert_eq!(response.poles().len(), 3);
        let expected = -1.0 / (375.0 * 1000.0 * 1e-10);
        assert!(response
            .poles()
            .iter()
            .any(|p| p.is_real() && (p.real - expected).abs() < 1e-6));
    }

    #[test]
    fn test_station_from_record() {
        let rows = vec![
            joined_row("x", [1.0, 0.0, 0.0]),
            joined_row("z", [0.0, 0.0, -1.0]),
        ];
        let record = StationRecord::from_rows(&rows).unwrap();
        let (site, operator, config) = context_parts();
        let context = StationContext {
            site: &site,
            operator: &operator,
            config: &config,
            library: &NoResponseLibrary,
        };

        let station = Station::from_record(&record, &context).unwrap();
        assert_eq!(station.code, "STA");
        assert_eq!(station.historical_code.as_deref(), Some("OT.STA.01"));
        assert_eq!(station.site.name, "Test Mine");
        assert_eq!(station.operators[0].agency, "Operator Inc");
        assert_eq!(station.start_date, Some(config.station_start_date));
        assert_eq!(station.equipments[0].model.as_deref(), Some("GS-11D"));
        assert_eq!(station.x().unwrap(), 650100.5);

        let codes: Vec<_> = station.channels.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["GPX", "GPZ"]);

        let vertical = &station.channels[1];
        assert_eq!(vertical.location_code, "01");
        assert_eq!(vertical.alternative_code().unwrap(), "STA.01");
        assert!((vertical.dip - 90.0).abs() < 1e-9);
        assert_eq!(vertical.start_date, Some(config.channel_start_date));
        assert!(vertical.response.is_some());
    }

    #[test]
    fn test_station_from_hand_built_motion() {
        let mut record = StationRecord::from_rows(&[joined_row("x", [1.0, 0.0, 0.0])]).unwrap();
        assert!(matches!(
            "ROTATION".parse::<Motion>(),
            Err(ImportError::UnknownMotion(m)) if m == "ROTATION"
        ));
        record.motion = " acceleration ".parse().unwrap();
        let (site, operator, config) = context_parts();
        let context = StationContext {
            site: &site,
            operator: &operator,
            config: &config,
            library: &NoResponseLibrary,
        };

        let station = Station::from_record(&record, &context).unwrap();
        let response = station.channels[0].response.as_ref().unwrap();
        assert!(response.zeros().is_empty());
        assert_eq!(response.poles().len(), 2);
    }
}
