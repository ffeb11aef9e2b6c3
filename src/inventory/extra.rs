/// Site-local fields carried outside the StationXML base schema
///
/// Stations and channels of a mine-scale network are located in a local
/// easting/northing/elevation frame. StationXML has no slot for these, so they
/// travel as namespaced extra elements. Each field is either set or absent;
/// an absent field is an error on read, never a silent zero.
use super::InventoryError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationExtra {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelExtra {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub alternative_code: Option<String>,
}

/// Read access to local coordinates shared by stations, channels and sensors
pub trait LocalCoordinates {
    fn x(&self) -> Result<f64, InventoryError>;
    fn y(&self) -> Result<f64, InventoryError>;
    fn z(&self) -> Result<f64, InventoryError>;

    /// `[x, y, z]`, failing when any of the three is unset
    fn loc(&self) -> Result<[f64; 3], InventoryError> {
        Ok([self.x()?, self.y()?, self.z()?])
    }
}

pub(crate) fn require<T: Clone>(
    value: &Option<T>,
    entity: impl FnOnce() -> String,
    attribute: &'static str,
) -> Result<T, InventoryError> {
    value.clone().ok_or_else(|| InventoryError::MissingAttribute {
        entity: entity(),
        attribute,
    })
}
