/// Recording channel with local coordinates and an alternative code
use chrono::{DateTime, Utc};
use std::fmt;

use super::extra::{require, ChannelExtra, LocalCoordinates};
use super::{format_date, format_local, InventoryError};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub code: String,
    pub location_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub depth: f64,
    /// Degrees clockwise from north, in [0, 360)
    pub azimuth: f64,
    /// Degrees down from horizontal, in [-90, 90]
    pub dip: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub response: Option<Response>,
    pub extra: ChannelExtra,
}

impl Channel {
    pub fn new(code: impl Into<String>, location_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            location_code: location_code.into(),
            latitude: 0.0,
            longitude: 0.0,
            elevation: 0.0,
            depth: 0.0,
            azimuth: 0.0,
            dip: 0.0,
            start_date: None,
            end_date: None,
            response: None,
            extra: ChannelExtra::default(),
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

    pub fn alternative_code(&self) -> Result<&str, InventoryError> {
        self.extra
            .alternative_code
            .as_deref()
            .ok_or_else(|| InventoryError::MissingAttribute {
                entity: self.label(),
                attribute: "alternative_code",
            })
    }

    pub fn set_alternative_code(&mut self, code: impl Into<String>) {
        self.extra.alternative_code = Some(code.into());
    }

    /// Set azimuth and dip from an (east, north, up) orientation vector
    pub fn set_orientation(&mut self, [east, north, up]: [f64; 3]) {
        let horizontal_length = east.hypot(north);

        let mut azimuth = east.atan2(north).to_degrees();
        if azimuth < 0.0 {
            azimuth += 360.0;
        }
        // A tiny negative angle rounds up to exactly 360
        self.azimuth = if azimuth >= 360.0 { 0.0 } else { azimuth };
        self.dip = (-up).atan2(horizontal_length).to_degrees();
    }

    /// Unit (east, north, up) vector pointing along the channel axis
    pub fn orientation_vector(&self) -> [f64; 3] {
        let azimuth = self.azimuth.to_radians();
        let dip = self.dip.to_radians();

        let up = -dip.sin();
        let east = azimuth.sin() * dip.cos();
        let north = azimuth.cos() * dip.cos();

        [east, north, up]
    }

    fn label(&self) -> String {
        format!("Channel {}.{}", self.location_code, self.code)
    }
}

impl LocalCoordinates for Channel {
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

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Channel {}, Location {}", self.code, self.location_code)?;
        writeln!(
            f,
            "Time range: {} - {}",
            format_date(self.start_date),
            format_date(self.end_date)
        )?;
        writeln!(
            f,
            "Easting [x]: {} m, Northing [y]: {} m, Elevation [z]: {} m",
            format_local(self.extra.x),
            format_local(self.extra.y),
            format_local(self.extra.z)
        )?;
        writeln!(
            f,
            "Dip (degrees): {:.0}, Azimuth (degrees): {:.0}",
            self.dip, self.azimuth
        )?;
        if self.response.is_some() {
            write!(f, "Response information available")
        } else {
            write!(f, "Response information not available")
        }
    }
}
