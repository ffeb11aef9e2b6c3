/// FDSN StationXML base schema (the subset this crate reads and writes)
///
/// Extra site-local fields are elements of the `uquake` namespace. They are
/// kept as raw strings here because a document written by another tool may
/// carry them as text of any shape; conversion parses them.
use quick_xml::de::from_str;
use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::StationXmlError;

pub const FDSN_NAMESPACE: &str = "http://www.fdsn.org/xml/station/1";
pub const SCHEMA_VERSION: &str = "1.1";

fn default_namespace() -> String {
    FDSN_NAMESPACE.to_string()
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "FDSNStationXML")]
pub struct FdsnStationXml {
    #[serde(rename = "@xmlns", default = "default_namespace")]
    pub xmlns: String,
    #[serde(
        rename = "@xmlns:uquake",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_namespace: Option<String>,
    #[serde(rename = "@schemaVersion", default = "default_schema_version")]
    pub schema_version: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Sender", default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(rename = "Module", default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(rename = "Created")]
    pub created: String,
    #[serde(rename = "Network", default)]
    pub networks: Vec<NetworkXml>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkXml {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Station", default)]
    pub stations: Vec<StationXml>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationXml {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "@startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "@endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(
        rename = "@alternateCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alternate_code: Option<String>,
    #[serde(
        rename = "@historicalCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub historical_code: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Elevation")]
    pub elevation: f64,
    #[serde(rename = "Site", default)]
    pub site: SiteXml,
    #[serde(rename = "Equipment", default, skip_serializing_if = "Vec::is_empty")]
    pub equipments: Vec<EquipmentXml>,
    #[serde(rename = "Operator", default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorXml>,
    #[serde(rename = "CreationDate", default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(
        rename = "uquake:x",
        alias = "x",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<String>,
    #[serde(
        rename = "uquake:y",
        alias = "y",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<String>,
    #[serde(
        rename = "uquake:z",
        alias = "z",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub z: Option<String>,
    #[serde(rename = "Channel", default)]
    pub channels: Vec<ChannelXml>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteXml {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Country", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentXml {
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(rename = "Manufacturer", default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(rename = "Model", default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorXml {
    #[serde(rename = "Agency", default)]
    pub agency: String,
    #[serde(rename = "Contact", default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<PersonXml>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonXml {
    #[serde(rename = "Name", default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(rename = "Agency", default, skip_serializing_if = "Vec::is_empty")]
    pub agencies: Vec<String>,
    #[serde(rename = "Email", default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    #[serde(rename = "Phone", default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<PhoneXml>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneXml {
    #[serde(rename = "CountryCode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<u32>,
    #[serde(rename = "AreaCode")]
    pub area_code: u32,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelXml {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "@locationCode", default)]
    pub location_code: String,
    #[serde(rename = "@startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "@endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "Elevation")]
    pub elevation: f64,
    #[serde(rename = "Depth")]
    pub depth: f64,
    #[serde(rename = "Azimuth", default, skip_serializing_if = "Option::is_none")]
    pub azimuth: Option<f64>,
    #[serde(rename = "Dip", default, skip_serializing_if = "Option::is_none")]
    pub dip: Option<f64>,
    #[serde(rename = "Response", default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseXml>,
    #[serde(
        rename = "uquake:x",
        alias = "x",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<String>,
    #[serde(
        rename = "uquake:y",
        alias = "y",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<String>,
    #[serde(
        rename = "uquake:z",
        alias = "z",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub z: Option<String>,
    #[serde(
        rename = "uquake:alternative_code",
        alias = "alternative_code",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub alternative_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseXml {
    #[serde(
        rename = "InstrumentSensitivity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub instrument_sensitivity: Option<SensitivityXml>,
    #[serde(rename = "Stage", default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<StageXml>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityXml {
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Frequency")]
    pub frequency: f64,
    #[serde(rename = "InputUnits")]
    pub input_units: UnitsXml,
    #[serde(rename = "OutputUnits")]
    pub output_units: UnitsXml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitsXml {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageXml {
    #[serde(rename = "@number")]
    pub number: u32,
    #[serde(rename = "PolesZeros", default, skip_serializing_if = "Option::is_none")]
    pub poles_zeros: Option<PolesZerosXml>,
    #[serde(rename = "StageGain", default, skip_serializing_if = "Option::is_none")]
    pub stage_gain: Option<GainXml>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolesZerosXml {
    #[serde(rename = "InputUnits")]
    pub input_units: UnitsXml,
    #[serde(rename = "OutputUnits")]
    pub output_units: UnitsXml,
    #[serde(rename = "PzTransferFunctionType")]
    pub transfer_function_type: String,
    #[serde(rename = "NormalizationFactor", default = "unit_factor")]
    pub normalization_factor: f64,
    #[serde(rename = "NormalizationFrequency")]
    pub normalization_frequency: f64,
    #[serde(rename = "Zero", default, skip_serializing_if = "Vec::is_empty")]
    pub zeros: Vec<PoleZeroXml>,
    #[serde(rename = "Pole", default, skip_serializing_if = "Vec::is_empty")]
    pub poles: Vec<PoleZeroXml>,
}

fn unit_factor() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleZeroXml {
    #[serde(rename = "@number")]
    pub number: u32,
    #[serde(rename = "Real")]
    pub real: f64,
    #[serde(rename = "Imaginary")]
    pub imaginary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainXml {
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Frequency")]
    pub frequency: f64,
}

impl FdsnStationXml {
    pub fn from_xml(xml: &str) -> Result<Self, StationXmlError> {
        from_str(xml).map_err(|e| StationXmlError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, StationXmlError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_xml(&content)
    }

    /// Serialize with two-space indentation and an XML declaration
    pub fn to_xml(&self) -> Result<String, StationXmlError> {
        let mut buffer = String::new();
        let mut ser = Serializer::new(&mut buffer);
        ser.indent(' ', 2);
        self.serialize(ser)
            .map_err(|e| StationXmlError::Serialize(e.to_string()))?;
        Ok(format!("<?xml version='1.0' encoding='UTF-8'?>\n{buffer}"))
    }
}
