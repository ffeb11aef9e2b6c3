/// Site, equipment and operator descriptors attached to stations
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub name: String,
    pub description: Option<String>,
    pub country: Option<String>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    pub equipment_type: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
}

/// Phone number in the StationXML shape: area code plus `[0-9]+-[0-9]+`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber {
    pub country_code: Option<u32>,
    pub area_code: u32,
    pub phone_number: String,
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(country) = self.country_code {
            write!(f, "+{country} ")?;
        }
        write!(f, "({}) {}", self.area_code, self.phone_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub names: Vec<String>,
    pub agencies: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<PhoneNumber>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operator {
    pub agency: String,
    pub contacts: Vec<Person>,
}
