use super::Station;

#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub code: String,
    pub description: Option<String>,
    pub stations: Vec<Station>,
}

impl Network {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: None,
            stations: Vec::new(),
        }
    }

    pub fn with_stations(mut self, stations: Vec<Station>) -> Self {
        self.stations = stations;
        self
    }
}
