/// Sensor: the channels of one station that share a location code
///
/// A station is the physical place where acquisition equipment is grouped; one
/// or several sensors can be connected to it. Sensors are never stored, they
/// are derived on demand from the station's channels.
use std::cmp::Ordering;
use std::fmt;

use super::extra::LocalCoordinates;
use super::{format_local, Channel, InventoryError, Station};

#[derive(Debug, Clone)]
pub struct Sensor<'a> {
    station: &'a Station,
    channels: Vec<&'a Channel>,
}

impl<'a> Sensor<'a> {
    /// Group channels into a sensor. Fails when the list is empty or when the
    /// channels do not all share one location code.
    pub fn new(station: &'a Station, channels: Vec<&'a Channel>) -> Result<Self, InventoryError> {
        let first = channels.first().ok_or(InventoryError::EmptySensor)?;

        if channels
            .iter()
            .any(|c| c.location_code != first.location_code)
        {
            let mut codes: Vec<String> =
                channels.iter().map(|c| c.location_code.clone()).collect();
            codes.sort();
            codes.dedup();
            return Err(InventoryError::MixedLocationCodes(codes));
        }

        Ok(Self { station, channels })
    }

    /// Build from a group already known to be non-empty with one location code
    pub(crate) fn from_group(station: &'a Station, channels: Vec<&'a Channel>) -> Self {
        debug_assert!(!channels.is_empty());
        Self { station, channels }
    }

    pub fn station(&self) -> &'a Station {
        self.station
    }

    pub fn channels(&self) -> &[&'a Channel] {
        &self.channels
    }

    fn first(&self) -> &'a Channel {
        self.channels[0]
    }

    pub fn alternate_code(&self) -> Result<&'a str, InventoryError> {
        self.first().alternative_code()
    }

    pub fn station_code(&self) -> &'a str {
        &self.station.code
    }

    pub fn location_code(&self) -> &'a str {
        &self.first().location_code
    }

    /// Station code immediately followed by the location code
    pub fn code(&self) -> String {
        format!("{}{}", self.station_code(), self.location_code())
    }

    /// First channel code minus its component letter, e.g. `GP` for `GPZ`
    pub fn sensor_type_code(&self) -> &'a str {
        let mut chars = self.first().code.chars();
        chars.next_back();
        chars.as_str()
    }

    /// `station.location.type`, the identity used for equality and ordering
    pub fn sensor_code(&self) -> String {
        format!(
            "{}.{}.{}",
            self.station_code(),
            self.location_code(),
            self.sensor_type_code()
        )
    }

    pub fn describe(&self) -> String {
        let first = self.first();
        format!(
            "\tSensor {}\n\tx: {} m, y: {} m z: {} m\n\tChannel Count: {}",
            self.sensor_code(),
            format_local(first.extra.x),
            format_local(first.extra.y),
            format_local(first.extra.z),
            self.channels.len()
        )
    }
}

impl LocalCoordinates for Sensor<'_> {
    fn x(&self) -> Result<f64, InventoryError> {
        self.first().x()
    }

    fn y(&self) -> Result<f64, InventoryError> {
        self.first().y()
    }

    fn z(&self) -> Result<f64, InventoryError> {
        self.first().z()
    }
}

impl fmt::Display for Sensor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sensor_code())
    }
}

impl PartialEq for Sensor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.sensor_code() == other.sensor_code()
    }
}

impl Eq for Sensor<'_> {}

impl PartialOrd for Sensor<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sensor_code().cmp(&other.sensor_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        let mut station = Station::new("S7", 0.0, 0.0, 0.0);
        for (code, location) in [("GPX", "01"), ("GPY", "01"), ("ACZ", "02")] {
            let mut channel = Channel::new(code, location);
            channel.set_loc([10.0, 20.0, -5.0]);
            channel.set_alternative_code("SENSOR-1");
            station.channels.push(channel);
        }
        station
    }

    #[test]
    fn test_new_rejects_mixed_location_codes() {
        let station = station();
        let channels: Vec<&Channel> = station.channels.iter().collect();
        match Sensor::new(&station, channels) {
            Err(InventoryError::MixedLocationCodes(codes)) => {
                assert_eq!(codes, vec!["01", "02"]);
            }
            other => panic!("Expected MixedLocationCodes, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_empty_channel_list() {
        let station = station();
        assert!(matches!(
            Sensor::new(&station, Vec::new()),
            Err(InventoryError::EmptySensor)
        ));
    }

    #[test]
    fn test_codes() {
        let station = station();
        let sensor = Sensor::new(&station, station.channels[..2].iter().collect()).unwrap();

        assert_eq!(sensor.station_code(), "S7");
        assert_eq!(sensor.location_code(), "01");
        assert_eq!(sensor.code(), "S701");
        assert_eq!(sensor.sensor_type_code(), "GP");
        assert_eq!(sensor.sensor_code(), "S7.01.GP");
        assert_eq!(sensor.to_string(), "S7.01.GP");
        assert_eq!(sensor.alternate_code().unwrap(), "SENSOR-1");
        assert_eq!(sensor.loc().unwrap(), [10.0, 20.0, -5.0]);
    }

    #[test]
    fn test_ordering_by_sensor_code() {
        let station = station();
        let sensors = station.sensors();
        assert!(sensors[0] < sensors[1]);
        assert_eq!(sensors[0], sensors[0].clone());
    }

    #[test]
    fn test_describe() {
        let station = station();
        let sensors = station.sensors();
        let text = sensors[1].describe();
        assert!(text.contains("Sensor S7.02.AC"));
        assert!(text.contains("x: 10 m, y: 20 m z: -5 m"));
        assert!(text.ends_with("Channel Count: 1"));
    }
}
