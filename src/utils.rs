/// Shared utility functions for the inventory importers
use regex::Regex;

use crate::inventory::PhoneNumber;

/// Split a free-form contact phone number into area code and subscriber number
///
/// The first three groups of digits are used: the first is the area code, the
/// next two become the `NNN-NNNN` subscriber number StationXML expects.
///
/// # Examples
///
/// ```
/// use uquake_inventory::utils::parse_phone_number;
///
/// let phone = parse_phone_number("(819) 555-0142").unwrap();
/// assert_eq!(phone.area_code, 819);
/// assert_eq!(phone.phone_number, "555-0142");
/// assert!(parse_phone_number("ext. 12").is_err());
/// ```
pub fn parse_phone_number(value: &str) -> Result<PhoneNumber, &'static str> {
    let re = Regex::new(r"[\d']+").map_err(|_| "Invalid digit pattern")?;
    let groups: Vec<String> = re
        .find_iter(value)
        .map(|m| m.as_str().replace('\'', ""))
        .filter(|g| !g.is_empty())
        .collect();

    if groups.len() < 3 {
        return Err("Phone number needs at least three groups of digits");
    }

    let area_code = groups[0]
        .parse::<u32>()
        .map_err(|_| "Area code is not a number")?;

    Ok(PhoneNumber {
        country_code: None,
        area_code,
        phone_number: format!("{}-{}", groups[1], groups[2]),
    })
}

/// Format a location code cell as two digits when it is numeric ("1" -> "01")
pub fn format_location_code(value: &str) -> String {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n >= 0.0 => format!("{:02}", n as u64),
        _ => trimmed.to_string(),
    }
}
