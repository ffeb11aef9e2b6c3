/// Station with local coordinates and the derived sensor grouping
use chrono::{DateTime, Utc};
use std::fmt;

use super::extra::{require, LocalCoordinates, StationExtra};
use super::site::{Equipment, Operator, Site};
use super::{format_date, format_local, Channel, InventoryError, Sensor};

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub historical_code: Option<String>,
    pub alternate_code: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub site: Site,
    pub equipments: Vec<Equipment>,
    pub operators: Vec<Operator>,
    pub channels: Vec<Channel>,
    pub extra: StationExtra,
}

impl Station {
    pub fn new(code: impl Into<String>, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            code: code.into(),
            latitude,
            longitude,
            elevation,
            historical_code: None,
            alternate_code: None,
            creation_date: None,
            start_date: None,
            end_date: None,
            site: Site::default(),
            equipments: Vec::new(),
            operators: Vec::new(),
            channels: Vec::new(),
            extra: StationExtra::default(),
        }
    }

    pub fn set_x(&mut self, x: f64) {
        self.extra.x = Some(x);
    }

    pub fn set_y(&mut self, y: f64) {
        self.extra.y = Some(y);
    }

    pub fn set_z(&mut self, z: f64) {
        self.extra.z = Some(z);
    }

    pub fn set_loc(&mut self, [x, y, z]: [f64; 3]) {
        self.set_x(x);
        self.set_y(y);
        self.set_z(z);
    }

    /// Channels grouped by location code, in order of first appearance
    pub fn sensors(&self) -> Vec<Sensor<'_>> {
        let mut groups: Vec<(&str, Vec<&Channel>)> = Vec::new();

        for channel in &self.channels {
            match groups
                .iter_mut()
                .find(|(code, _)| *code == channel.location_code)
            {
                Some((_, members)) => members.push(channel),
                None => groups.push((channel.location_code.as_str(), vec![channel])),
            }
        }

        groups
            .into_iter()
            .map(|(_, channels)| Sensor::from_group(self, channels))
            .collect()
    }

    fn label(&self) -> String {
        format!("Station {}", self.code)
    }

    fn has_local_coordinates(&self) -> bool {
        self.extra.x.is_some() && self.extra.y.is_some()
    }
}

impl LocalCoordinates for Station {
    fn x(&self) -> Result<f64, InventoryError> {
        require(&self.extra.x, || self.label(), "x")
    }

    fn y(&self) -> Result<f64, InventoryError> {
        require(&self.extra.y, || self.label(), "y")
    }

    fn z(&self) -> Result<f64, InventoryError> {
        require(&self.extra.z, || self.label(), "z")
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Station {}",
            self.historical_code.as_deref().unwrap_or(&self.code)
        )?;
        writeln!(f, "\tStation Code: {}", self.code)?;
        writeln!(f, "\tSensor Count: {}", self.sensors().len())?;
        writeln!(f, "\tChannel Count: {}", self.channels.len())?;
        writeln!(
            f,
            "\t{} - {}",
            format_date(self.start_date),
            format_date(self.end_date)
        )?;

        if self.has_local_coordinates() {
            writeln!(
                f,
                "\tEasting [x]: {} m, Northing [y]: {} m, Elevation [z]: {} m",
                format_local(self.extra.x),
                format_local(self.extra.y),
                format_local(self.extra.z)
            )?;
        } else {
            writeln!(
                f,
                "\tLatitude: {:.4}, Longitude: {:.4}, Elevation: {:.0} m",
                self.latitude, self.longitude, self.elevation
            )?;
        }

        write!(f, "\tAvailable Channels:")?;
        let mut codes: Vec<String> = self
            .channels
            .iter()
            .map(|c| format!("{}.{}.{}", self.code, c.location_code, c.code))
            .collect();
        codes.sort();
        codes.dedup();
        if !codes.is_empty() {
            write!(f, "\n\t\t{}", codes.join(", "))?;
        }
        Ok(())
    }
}
