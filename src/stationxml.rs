// FDSN StationXML read/write
//
// `document` holds the base schema as serde types; `convert` maps it to and
// from the extended inventory model, carrying site-local fields as elements of
// the `uquake` namespace.

pub mod convert;
pub mod document;

use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub use document::FdsnStationXml;

use crate::inventory::Inventory;

#[derive(Error, Debug)]
pub enum StationXmlError {
    #[error("Failed to parse StationXML: {0}")]
    Parse(String),

    #[error("Failed to serialize StationXML: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported inventory format: {0}")]
    UnsupportedFormat(String),
}

/// Inventory file formats understood by [`read_inventory_with_format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryFormat {
    #[default]
    StationXml,
}

impl FromStr for InventoryFormat {
    type Err = StationXmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STATIONXML" => Ok(InventoryFormat::StationXml),
            other => Err(StationXmlError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Read a StationXML file into the extended inventory model
pub fn read_inventory(path: impl AsRef<Path>) -> Result<Inventory, StationXmlError> {
    read_inventory_with_format(path, InventoryFormat::StationXml)
}

pub fn read_inventory_with_format(
    path: impl AsRef<Path>,
    format: InventoryFormat,
) -> Result<Inventory, StationXmlError> {
    let path = path.as_ref();
    info!("Reading inventory from {}", path.display());

    let document = match format {
        InventoryFormat::StationXml => FdsnStationXml::from_file(path)?,
    };

    Ok(Inventory::from_station_xml(document))
}
