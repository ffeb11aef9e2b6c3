// Station metadata model
//
// Inventory -> Network -> Station -> Channel, with site-local coordinates kept
// in typed extension structs and sensors derived from channel location codes.

pub mod channel;
pub mod extra;
pub mod network;
pub mod sensor;
pub mod site;
pub mod station;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub use channel::Channel;
pub use extra::{ChannelExtra, LocalCoordinates, StationExtra};
pub use network::Network;
pub use sensor::Sensor;
pub use site::{Equipment, Operator, Person, PhoneNumber, Site};
pub use station::Station;

use crate::config::DEFAULT_NAMESPACE_URI;
use crate::stationxml::{self, FdsnStationXml, StationXmlError};

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("{entity} has no attribute '{attribute}'")]
    MissingAttribute {
        entity: String,
        attribute: &'static str,
    },

    #[error("Channels of a sensor must share one location code, found: {0:?}")]
    MixedLocationCodes(Vec<String>),

    #[error("A sensor needs at least one channel")]
    EmptySensor,
}

#[derive(Debug, Clone)]
pub struct Inventory {
    pub networks: Vec<Network>,
    pub source: String,
    pub sender: Option<String>,
    pub created: DateTime<Utc>,
}

/// Result of [`Inventory::select`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Station(&'a Station),
    Channel(&'a Channel),
}

impl<'a> Selection<'a> {
    pub fn as_station(&self) -> Option<&'a Station> {
        match *self {
            Selection::Station(station) => Some(station),
            Selection::Channel(_) => None,
        }
    }

    pub fn as_channel(&self) -> Option<&'a Channel> {
        match *self {
            Selection::Channel(channel) => Some(channel),
            Selection::Station(_) => None,
        }
    }
}

impl Inventory {
    pub fn new(networks: Vec<Network>, source: impl Into<String>) -> Self {
        Self {
            networks,
            source: source.into(),
            sender: None,
            created: Utc::now(),
        }
    }

    /// Upgrade a parsed StationXML document into the extended model
    pub fn from_station_xml(document: FdsnStationXml) -> Self {
        stationxml::convert::inventory_from_document(document)
    }

    /// Write StationXML, binding the extra-field prefix to the default namespace URI
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), StationXmlError> {
        self.write_with_namespace(path, DEFAULT_NAMESPACE_URI)
    }

    pub fn write_with_namespace(
        &self,
        path: impl AsRef<Path>,
        namespace_uri: &str,
    ) -> Result<(), StationXmlError> {
        let xml = self.to_xml(namespace_uri)?;
        std::fs::write(path, xml)?;
        Ok(())
    }

    pub fn to_xml(&self, namespace_uri: &str) -> Result<String, StationXmlError> {
        stationxml::convert::document_from_inventory(self, namespace_uri).to_xml()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.networks.iter().flat_map(|n| n.stations.iter())
    }

    /// Select a single station or channel.
    ///
    /// Scans networks and stations in order and takes the first station whose
    /// code is in `station_codes` (and whose network code equals `network`, when
    /// given). With an empty `channel_codes` that station is returned; otherwise
    /// the first of its channels whose code is listed (and whose location code
    /// equals `location`, when given).
    pub fn select(
        &self,
        network: Option<&str>,
        station_codes: &[&str],
        location: Option<&str>,
        channel_codes: &[&str],
    ) -> Option<Selection<'_>> {
        let station = self
            .networks
            .iter()
            .filter(|net| network.map_or(true, |code| net.code == code))
            .flat_map(|net| net.stations.iter())
            .find(|sta| station_codes.contains(&sta.code.as_str()))?;

        if channel_codes.is_empty() {
            return Some(Selection::Station(station));
        }

        station
            .channels
            .iter()
            .find(|cha| {
                channel_codes.contains(&cha.code.as_str())
                    && location.map_or(true, |loc| cha.location_code == loc)
            })
            .map(Selection::Channel)
    }

    pub fn get_station(&self, code: &str) -> Option<&Station> {
        self.select(None, &[code], None, &[])
            .and_then(|s| s.as_station())
    }

    pub fn get_channel(&self, station: &str, channel: &str) -> Option<&Channel> {
        self.select(None, &[station], None, &[channel])
            .and_then(|s| s.as_channel())
    }

    /// Every station's sensors, sorted by sensor code
    pub fn sensors(&self) -> Vec<Sensor<'_>> {
        let mut sensors: Vec<Sensor<'_>> = self.stations().flat_map(|s| s.sensors()).collect();
        sensors.sort();
        sensors
    }
}

impl PartialEq for Inventory {
    fn eq(&self, other: &Self) -> bool {
        self.sensors() == other.sensors()
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inventory created at {}", format_date(Some(self.created)))?;
        writeln!(f, "\tSending institution: {}", self.source)?;
        write!(f, "\tContains {} network(s):", self.networks.len())?;
        for network in &self.networks {
            write!(
                f,
                "\n\t\t{} ({} station(s), {} sensor(s))",
                network.code,
                network.stations.len(),
                network
                    .stations
                    .iter()
                    .map(|s| s.sensors().len())
                    .sum::<usize>()
            )?;
        }
        Ok(())
    }
}

pub(crate) fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.to_rfc3339_opts(SecondsFormat::Micros, true))
        .unwrap_or_default()
}

pub(crate) fn format_local(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.0}"))
}
