// Instrument response construction
//
// Poles/zeros responses for passive transducers, built in closed form from the
// physical parameters listed on the site workbook (resonance frequency, damping,
// coil resistance, cable length and capacitance).

pub mod library;

use std::f64::consts::PI;
use thiserror::Error;
use tracing::debug;

pub use library::{InMemoryResponseLibrary, NoResponseLibrary, ResponseLibrary};

/// Transfer function type written on every poles/zeros stage built here
pub const LAPLACE_RADIANS_PER_SECOND: &str = "LAPLACE (RADIANS/SECOND)";

/// Stage gain frequency used for accelerometer stages
pub const ACCELEROMETER_GAIN_FREQUENCY: f64 = 14.0;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Invalid resonance frequency: {0} (must be finite and greater than zero)")]
    InvalidFrequency(f64),

    #[error("Invalid damping: {0} (must be finite and non-negative)")]
    InvalidDamping(f64),

    #[error("No response registered for sensor keys: {0:?}")]
    UnknownSensorKeys(Vec<String>),

    #[error("Failed to load response library: {0}")]
    LibraryLoad(String),
}

/// A pole or zero location in the complex Laplace plane (rad/s)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleZero {
    pub real: f64,
    pub imaginary: f64,
}

impl PoleZero {
    pub fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    pub fn real(real: f64) -> Self {
        Self::new(real, 0.0)
    }

    pub fn is_real(&self) -> bool {
        self.imaginary == 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Units {
    pub name: String,
    pub description: Option<String>,
}

impl Units {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }

    pub fn velocity() -> Self {
        Self::new("M/S", "velocity")
    }

    pub fn acceleration() -> Self {
        Self::new("M/S/S", "acceleration")
    }
}

/// Overall sensitivity of the full response chain
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSensitivity {
    pub value: f64,
    pub frequency: f64,
    pub input_units: Units,
    pub output_units: Units,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolesZerosStage {
    pub sequence_number: u32,
    pub stage_gain: f64,
    pub stage_gain_frequency: f64,
    pub input_units: Units,
    pub output_units: Units,
    pub transfer_function_type: String,
    pub normalization_factor: f64,
    pub normalization_frequency: f64,
    pub zeros: Vec<PoleZero>,
    pub poles: Vec<PoleZero>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub instrument_sensitivity: Option<InstrumentSensitivity>,
    pub stages: Vec<PolesZerosStage>,
}

impl Response {
    /// Poles of every stage, in stage order
    pub fn poles(&self) -> Vec<PoleZero> {
        self.stages.iter().flat_map(|s| s.poles.iter().copied()).collect()
    }

    /// Zeros of every stage, in stage order
    pub fn zeros(&self) -> Vec<PoleZero> {
        self.stages.iter().flat_map(|s| s.zeros.iter().copied()).collect()
    }
}

/// Poles and zeros of a second order transducer
#[derive(Debug, Clone, PartialEq)]
pub struct PolesAndZeros {
    pub poles: Vec<PoleZero>,
    pub zeros: Vec<PoleZero>,
}

/// Convert a corner frequency and damping ratio into poles and zeros.
///
/// Under-damped and critically damped systems (`damping <= 1`) give a complex
/// conjugate pair `-(h ± i·sqrt(1 - h²))·2πf`; over-damped systems give two real
/// poles `-(h ± sqrt(h² - 1))·2πf`. Both have a double zero at the origin.
pub fn corn_freq_2_paz(
    resonance_frequency: f64,
    damping: f64,
) -> Result<PolesAndZeros, ResponseError> {
    validate_frequency(resonance_frequency)?;
    if !damping.is_finite() || damping < 0.0 {
        return Err(ResponseError::InvalidDamping(damping));
    }

    let omega = 2.0 * PI * resonance_frequency;
    let poles = if damping <= 1.0 {
        let im = (1.0 - damping * damping).sqrt();
        vec![
            PoleZero::new(-damping * omega, -im * omega),
            PoleZero::new(-damping * omega, im * omega),
        ]
    } else {
        let re = (damping * damping - 1.0).sqrt();
        vec![
            PoleZero::real(-(damping + re) * omega),
            PoleZero::real(-(damping - re) * omega),
        ]
    };

    Ok(PolesAndZeros {
        poles,
        zeros: vec![PoleZero::new(0.0, 0.0), PoleZero::new(0.0, 0.0)],
    })
}

fn validate_frequency(frequency: f64) -> Result<(), ResponseError> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(())
    } else {
        Err(ResponseError::InvalidFrequency(frequency))
    }
}

/// Physical description of a moving-coil geophone and its cable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeophoneParameters {
    pub resonance_frequency: f64,
    pub gain: f64,
    pub damping: f64,
    /// Coil output resistance (ohm)
    pub output_resistance: f64,
    /// Cable length (m)
    pub cable_length: f64,
    /// Cable capacitance (F/m)
    pub cable_capacitance: f64,
    pub sensitivity: f64,
    pub stage_sequence_number: u32,
}

impl GeophoneParameters {
    /// Parameters with no cable loading, 0.707 damping and unit sensitivity
    pub fn new(resonance_frequency: f64, gain: f64) -> Self {
        Self {
            resonance_frequency,
            gain,
            damping: 0.707,
            output_resistance: f64::INFINITY,
            cable_length: f64::INFINITY,
            cable_capacitance: f64::INFINITY,
            sensitivity: 1.0,
            stage_sequence_number: 1,
        }
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_cable(
        mut self,
        output_resistance: f64,
        cable_length: f64,
        cable_capacitance: f64,
    ) -> Self {
        self.output_resistance = output_resistance;
        self.cable_length = cable_length;
        self.cable_capacitance = cable_capacitance;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_stage_sequence_number(mut self, number: u32) -> Self {
        self.stage_sequence_number = number;
        self
    }

    /// Real pole at -1/(R·l·C) when the cable RC product is finite and non-zero
    fn cable_pole(&self) -> Option<PoleZero> {
        let rlc = self.output_resistance * self.cable_length * self.cable_capacitance;
        (rlc.is_finite() && rlc != 0.0).then(|| PoleZero::real(-1.0 / rlc))
    }
}

/// Physical description of an accelerometer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerometerParameters {
    pub resonance_frequency: f64,
    pub gain: f64,
    pub sensitivity: f64,
    pub stage_sequence_number: u32,
    pub damping: f64,
}

impl AccelerometerParameters {
    pub fn new(resonance_frequency: f64, gain: f64) -> Self {
        Self {
            resonance_frequency,
            gain,
            sensitivity: 1.0,
            stage_sequence_number: 1,
            damping: 0.707,
        }
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f64) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_stage_sequence_number(mut self, number: u32) -> Self {
        self.stage_sequence_number = number;
        self
    }
}

/// Velocity response of a geophone, optionally loaded by its cable
pub fn geophone_response(params: &GeophoneParameters) -> Result<Response, ResponseError> {
    let mut paz = corn_freq_2_paz(params.resonance_frequency, params.damping)?;

    if let Some(pole) = params.cable_pole() {
        debug!("Adding cable pole at {} rad/s", pole.real);
        paz.poles.push(pole);
    }

    let stage = PolesZerosStage {
        sequence_number: params.stage_sequence_number,
        stage_gain: params.gain,
        stage_gain_frequency: params.resonance_frequency,
        input_units: Units::velocity(),
        output_units: Units::velocity(),
        transfer_function_type: LAPLACE_RADIANS_PER_SECOND.to_string(),
        normalization_factor: 1.0,
        normalization_frequency: params.resonance_frequency,
        zeros: paz.zeros,
        poles: paz.poles,
    };

    Ok(Response {
        instrument_sensitivity: Some(InstrumentSensitivity {
            value: params.sensitivity,
            frequency: params.resonance_frequency,
            input_units: Units::velocity(),
            output_units: Units::velocity(),
        }),
        stages: vec![stage],
    })
}

/// Acceleration response of an accelerometer. Accelerometers have no zero at DC,
/// so the zeros of the second order system are dropped.
pub fn accelerometer_response(
    params: &AccelerometerParameters,
) -> Result<Response, ResponseError> {
    let paz = corn_freq_2_paz(params.resonance_frequency, params.damping)?;

    let stage = PolesZerosStage {
        sequence_number: params.stage_sequence_number,
        stage_gain: params.gain,
        stage_gain_frequency: ACCELEROMETER_GAIN_FREQUENCY,
        input_units: Units::acceleration(),
        output_units: Units::velocity(),
        transfer_function_type: LAPLACE_RADIANS_PER_SECOND.to_string(),
        normalization_factor: 1.0,
        normalization_frequency: 1.0,
        zeros: Vec::new(),
        poles: paz.poles,
    };

    Ok(Response {
        instrument_sensitivity: Some(InstrumentSensitivity {
            value: params.sensitivity,
            frequency: params.resonance_frequency,
            input_units: Units::acceleration(),
            output_units: Units::acceleration(),
        }),
        stages: vec![stage],
    })
}
