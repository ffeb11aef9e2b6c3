/// Canonical sensor responses looked up by manufacturer/model keys (NRL style)
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::{Response, ResponseError};
use crate::inventory::Inventory;
use crate::stationxml::read_inventory;

/// Lookup of canonical responses by an ordered key list such as
/// `["Sercel", "SG-5", "375 Ohms"]`
pub trait ResponseLibrary {
    fn sensor_response(&self, keys: &[String]) -> Result<Response, ResponseError>;
}

/// Library with no entries, used when a workbook never lists NRL keys
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResponseLibrary;

impl ResponseLibrary for NoResponseLibrary {
    fn sensor_response(&self, keys: &[String]) -> Result<Response, ResponseError> {
        Err(ResponseError::UnknownSensorKeys(keys.to_vec()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryResponseLibrary {
    responses: HashMap<Vec<String>, Response>,
}

impl InMemoryResponseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, K>(&mut self, keys: I, response: Response)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.responses.insert(normalize_keys(keys), response);
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Collect one response per `[manufacturer, model]` equipment pair found in
    /// an inventory. The first channel carrying a response wins.
    pub fn from_inventory(inventory: &Inventory) -> Self {
        let mut library = Self::new();

        for station in inventory.stations() {
            let Some(response) = station.channels.iter().find_map(|c| c.response.as_ref()) else {
                continue;
            };

            for equipment in &station.equipments {
                if let (Some(manufacturer), Some(model)) =
                    (&equipment.manufacturer, &equipment.model)
                {
                    let keys = normalize_keys([manufacturer.as_str(), model.as_str()]);
                    if !library.responses.contains_key(&keys) {
                        debug!("Registering response for {:?}", keys);
                        library.responses.insert(keys, response.clone());
                    }
                }
            }
        }

        library
    }

    /// Load a library from a StationXML file whose stations list sensor equipment
    pub fn from_station_xml_file(path: impl AsRef<Path>) -> Result<Self, ResponseError> {
        let path = path.as_ref();
        let inventory =
            read_inventory(path).map_err(|e| ResponseError::LibraryLoad(e.to_string()))?;
        let library = Self::from_inventory(&inventory);
        info!(
            "Loaded {} sensor responses from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }
}

impl ResponseLibrary for InMemoryResponseLibrary {
    fn sensor_response(&self, keys: &[String]) -> Result<Response, ResponseError> {
        self.responses
            .get(&normalize_keys(keys.iter().map(String::as_str)))
            .cloned()
            .ok_or_else(|| ResponseError::UnknownSensorKeys(keys.to_vec()))
    }
}

fn normalize_keys<I, K>(keys: I) -> Vec<String>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    keys.into_iter()
        .map(|k| {
            let key: String = k.into();
            key.trim().to_string()
        })
        .filter(|k| !k.is_empty())
        .collect()
}
