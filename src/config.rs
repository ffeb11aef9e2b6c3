use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use std::env;

/// Namespace URI bound to the `uquake` prefix of extra StationXML fields
pub const DEFAULT_NAMESPACE_URI: &str = "uquake";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings applied when building stations and channels from a site workbook
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryConfig {
    pub namespace_uri: String,
    pub creation_date: DateTime<Utc>,
    pub station_start_date: DateTime<Utc>,
    pub station_end_date: DateTime<Utc>,
    pub channel_start_date: DateTime<Utc>,
    pub channel_end_date: DateTime<Utc>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            namespace_uri: DEFAULT_NAMESPACE_URI.to_string(),
            creation_date: half_past(2015, 12, 31),
            station_start_date: half_past(2015, 12, 31),
            station_end_date: half_past(2599, 12, 31),
            channel_start_date: half_past(1999, 12, 31),
            channel_end_date: half_past(2599, 12, 31),
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(InventoryConfig {
            namespace_uri: env::var("UQUAKE_NAMESPACE_URI")
                .unwrap_or_else(|_| defaults.namespace_uri.clone()),
            creation_date: date_var("UQUAKE_CREATION_DATE", defaults.creation_date)?,
            station_start_date: date_var(
                "UQUAKE_STATION_START_DATE",
                defaults.station_start_date,
            )?,
            station_end_date: date_var("UQUAKE_STATION_END_DATE", defaults.station_end_date)?,
            channel_start_date: date_var(
                "UQUAKE_CHANNEL_START_DATE",
                defaults.channel_start_date,
            )?,
            channel_end_date: date_var("UQUAKE_CHANNEL_END_DATE", defaults.channel_end_date)?,
        })
    }
}

/// `YYYY-MM-DDT12:23:34.5Z`, the placeholder epoch stamped on imported metadata
fn half_past(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 23, 34)
        .single()
        .unwrap_or_default()
        + Duration::milliseconds(500)
}

fn date_var(name: &'static str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_date(&value).ok_or(ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|n| n.and_utc())
        })
}
