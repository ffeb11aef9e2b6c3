/// Mapping between the StationXML base schema and the extended inventory model
use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::document::{
    ChannelXml, EquipmentXml, FdsnStationXml, GainXml, NetworkXml, OperatorXml, PersonXml,
    PhoneXml, PoleZeroXml, PolesZerosXml, ResponseXml, SensitivityXml, SiteXml, StageXml,
    StationXml, UnitsXml, FDSN_NAMESPACE, SCHEMA_VERSION,
};
use crate::config::parse_date;
use crate::inventory::{
    format_date, Channel, ChannelExtra, Equipment, Inventory, Network, Operator, Person,
    PhoneNumber, Site, Station, StationExtra,
};
use crate::response::{
    InstrumentSensitivity, PoleZero, PolesZerosStage, Response, Units,
};

const MODULE: &str = concat!("uquake-inventory ", env!("CARGO_PKG_VERSION"));

pub fn document_from_inventory(inventory: &Inventory, namespace_uri: &str) -> FdsnStationXml {
    FdsnStationXml {
        xmlns: FDSN_NAMESPACE.to_string(),
        extra_namespace: Some(namespace_uri.to_string()),
        schema_version: SCHEMA_VERSION.to_string(),
        source: inventory.source.clone(),
        sender: inventory.sender.clone(),
        module: Some(MODULE.to_string()),
        created: format_date(Some(inventory.created)),
        networks: inventory
            .networks
            .iter()
            .map(|network| NetworkXml {
                code: network.code.clone(),
                description: network.description.clone(),
                stations: network.stations.iter().map(station_to_xml).collect(),
            })
            .collect(),
    }
}

pub fn inventory_from_document(document: FdsnStationXml) -> Inventory {
    let created = parse_date(&document.created).unwrap_or_else(|| {
        error!("Unparsable Created date '{}', using now", document.created);
        Utc::now()
    });

    let networks = document
        .networks
        .into_iter()
        .map(|network| {
            let stations: Vec<Station> =
                network.stations.into_iter().map(station_from_xml).collect();
            debug!("Network {}: {} station(s)", network.code, stations.len());
            Network {
                code: network.code,
                description: network.description,
                stations,
            }
        })
        .collect();

    Inventory {
        networks,
        source: document.source,
        sender: document.sender,
        created,
    }
}

fn station_to_xml(station: &Station) -> StationXml {
    StationXml {
        code: station.code.clone(),
        start_date: date_to_xml(station.start_date),
        end_date: date_to_xml(station.end_date),
        alternate_code: station.alternate_code.clone(),
        historical_code: station.historical_code.clone(),
        latitude: station.latitude,
        longitude: station.longitude,
        elevation: station.elevation,
        site: SiteXml {
            name: station.site.name.clone(),
            description: station.site.description.clone(),
            country: station.site.country.clone(),
        },
        equipments: station
            .equipments
            .iter()
            .map(|e| EquipmentXml {
                equipment_type: e.equipment_type.clone(),
                manufacturer: e.manufacturer.clone(),
                model: e.model.clone(),
            })
            .collect(),
        operators: station.operators.iter().map(operator_to_xml).collect(),
        creation_date: date_to_xml(station.creation_date),
        x: station.extra.x.map(|v| v.to_string()),
        y: station.extra.y.map(|v| v.to_string()),
        z: station.extra.z.map(|v| v.to_string()),
        channels: station.channels.iter().map(channel_to_xml).collect(),
    }
}

fn station_from_xml(xml: StationXml) -> Station {
    let label = format!("Station {}", xml.code);

    Station {
        start_date: date_from_xml(xml.start_date, &label, "startDate"),
        end_date: date_from_xml(xml.end_date, &label, "endDate"),
        creation_date: date_from_xml(xml.creation_date, &label, "CreationDate"),
        extra: StationExtra {
            x: extra_from_xml(xml.x, &label, "x"),
            y: extra_from_xml(xml.y, &label, "y"),
            z: extra_from_xml(xml.z, &label, "z"),
        },
        site: Site {
            name: xml.site.name,
            description: xml.site.description,
            country: xml.site.country,
        },
        equipments: xml
            .equipments
            .into_iter()
            .map(|e| Equipment {
                equipment_type: e.equipment_type,
                manufacturer: e.manufacturer,
                model: e.model,
            })
            .collect(),
        operators: xml.operators.into_iter().map(operator_from_xml).collect(),
        channels: xml.channels.into_iter().map(channel_from_xml).collect(),
        code: xml.code,
        latitude: xml.latitude,
        longitude: xml.longitude,
        elevation: xml.elevation,
        historical_code: xml.historical_code,
        alternate_code: xml.alternate_code,
    }
}

fn operator_to_xml(operator: &Operator) -> OperatorXml {
    OperatorXml {
        agency: operator.agency.clone(),
        contacts: operator
            .contacts
            .iter()
            .map(|p| PersonXml {
                names: p.names.clone(),
                agencies: p.agencies.clone(),
                emails: p.emails.clone(),
                phones: p
                    .phones
                    .iter()
                    .map(|ph| PhoneXml {
                        country_code: ph.country_code,
                        area_code: ph.area_code,
                        phone_number: ph.phone_number.clone(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn operator_from_xml(xml: OperatorXml) -> Operator {
    Operator {
        agency: xml.agency,
        contacts: xml
            .contacts
            .into_iter()
            .map(|p| Person {
                names: p.names,
                agencies: p.agencies,
                emails: p.emails,
                phones: p
                    .phones
                    .into_iter()
                    .map(|ph| PhoneNumber {
                        country_code: ph.country_code,
                        area_code: ph.area_code,
                        phone_number: ph.phone_number,
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn channel_to_xml(channel: &Channel) -> ChannelXml {
    ChannelXml {
        code: channel.code.clone(),
        location_code: channel.location_code.clone(),
        start_date: date_to_xml(channel.start_date),
        end_date: date_to_xml(channel.end_date),
        latitude: channel.latitude,
        longitude: channel.longitude,
        elevation: channel.elevation,
        depth: channel.depth,
        azimuth: Some(channel.azimuth),
        dip: Some(channel.dip),
        response: channel.response.as_ref().map(response_to_xml),
        x: channel.extra.x.map(|v| v.to_string()),
        y: channel.extra.y.map(|v| v.to_string()),
        z: channel.extra.z.map(|v| v.to_string()),
        alternative_code: channel.extra.alternative_code.clone(),
    }
}

fn channel_from_xml(xml: ChannelXml) -> Channel {
    let label = format!("Channel {}.{}", xml.location_code, xml.code);

    Channel {
        start_date: date_from_xml(xml.start_date, &label, "startDate"),
        end_date: date_from_xml(xml.end_date, &label, "endDate"),
        extra: ChannelExtra {
            x: extra_from_xml(xml.x, &label, "x"),
            y: extra_from_xml(xml.y, &label, "y"),
            z: extra_from_xml(xml.z, &label, "z"),
            alternative_code: xml
                .alternative_code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        },
        response: xml.response.map(response_from_xml),
        code: xml.code,
        location_code: xml.location_code,
        latitude: xml.latitude,
        longitude: xml.longitude,
        elevation: xml.elevation,
        depth: xml.depth,
        azimuth: xml.azimuth.unwrap_or(0.0),
        dip: xml.dip.unwrap_or(0.0),
    }
}

fn units_to_xml(units: &Units) -> UnitsXml {
    UnitsXml {
        name: units.name.clone(),
        description: units.description.clone(),
    }
}

fn units_from_xml(xml: UnitsXml) -> Units {
    Units {
        name: xml.name,
        description: xml.description,
    }
}

fn pole_zero_list(values: &[PoleZero]) -> Vec<PoleZeroXml> {
    values
        .iter()
        .enumerate()
        .map(|(number, pz)| PoleZeroXml {
            number: number as u32,
            real: pz.real,
            imaginary: pz.imaginary,
        })
        .collect()
}

fn response_to_xml(response: &Response) -> ResponseXml {
    ResponseXml {
        instrument_sensitivity: response
            .instrument_sensitivity
            .as_ref()
            .map(|s| SensitivityXml {
                value: s.value,
                frequency: s.frequency,
                input_units: units_to_xml(&s.input_units),
                output_units: units_to_xml(&s.output_units),
            }),
        stages: response
            .stages
            .iter()
            .map(|stage| StageXml {
                number: stage.sequence_number,
                poles_zeros: Some(PolesZerosXml {
                    input_units: units_to_xml(&stage.input_units),
                    output_units: units_to_xml(&stage.output_units),
                    transfer_function_type: stage.transfer_function_type.clone(),
                    normalization_factor: stage.normalization_factor,
                    normalization_frequency: stage.normalization_frequency,
                    zeros: pole_zero_list(&stage.zeros),
                    poles: pole_zero_list(&stage.poles),
                }),
                stage_gain: Some(GainXml {
                    value: stage.stage_gain,
                    frequency: stage.stage_gain_frequency,
                }),
            })
            .collect(),
    }
}

fn response_from_xml(xml: ResponseXml) -> Response {
    let stages = xml
        .stages
        .into_iter()
        .filter_map(|stage| {
            let Some(pz) = stage.poles_zeros else {
                warn!(
                    "Dropping response stage {} without poles and zeros",
                    stage.number
                );
                return None;
            };
            let gain = stage.stage_gain.unwrap_or(GainXml {
                value: 1.0,
                frequency: pz.normalization_frequency,
            });
            Some(PolesZerosStage {
                sequence_number: stage.number,
                stage_gain: gain.value,
                stage_gain_frequency: gain.frequency,
                input_units: units_from_xml(pz.input_units),
                output_units: units_from_xml(pz.output_units),
                transfer_function_type: pz.transfer_function_type,
                normalization_factor: pz.normalization_factor,
                normalization_frequency: pz.normalization_frequency,
                zeros: pz
                    .zeros
                    .into_iter()
                    .map(|z| PoleZero::new(z.real, z.imaginary))
                    .collect(),
                poles: pz
                    .poles
                    .into_iter()
                    .map(|p| PoleZero::new(p.real, p.imaginary))
                    .collect(),
            })
        })
        .collect();

    Response {
        instrument_sensitivity: xml.instrument_sensitivity.map(|s| InstrumentSensitivity {
            value: s.value,
            frequency: s.frequency,
            input_units: units_from_xml(s.input_units),
            output_units: units_from_xml(s.output_units),
        }),
        stages,
    }
}

fn date_to_xml(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| format_date(Some(d)))
}

fn date_from_xml(value: Option<String>, entity: &str, field: &str) -> Option<DateTime<Utc>> {
    let value = value?;
    let parsed = parse_date(&value);
    if parsed.is_none() {
        error!("{entity}: skipping unparsable {field} '{value}'");
    }
    parsed
}

/// Extra fields may come back from other writers as any text; parse as float
fn extra_from_xml(value: Option<String>, entity: &str, field: &str) -> Option<f64> {
    let value = value?;
    match value.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(e) => {
            error!("{entity}: skipping extra field {field}='{value}': {e}");
            None
        }
    }
}
