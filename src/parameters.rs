use crate::{context::Context, error::ContagionError};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// The immutable configuration of one simulation run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Base seed for every random number generator in the run.
    pub seed: u64,
    /// Number of days to simulate after day 0.
    pub days: usize,
    /// Probability that a patient's disease is contagious at seeding.
    pub p_infectious: f64,
    /// Per-contact transmission probability when the source is a patient.
    pub p_patient_transmit: f64,
    /// Per-contact transmission probability when the source is staff.
    pub p_other_transmit: f64,
    /// Days between staff check-ups. A check happens on every day divisible by this.
    pub screening_interval: u32,
    /// Probability that an infected staff member is detected and isolated at a check-up.
    pub p_recovery: f64,
    /// Share of people, ranked by averaged centrality, who are immunized.
    pub immunization_fraction: f64,
    /// Probability that a contact is exposed enough to be infectable on a given day.
    pub susceptibility_threshold: f64,
    /// Probability that a person is a patient when roles are sampled instead of loaded.
    pub patient_proportion: f64,
    /// Upper bound on the initial-infection rejection loop.
    pub max_seeding_attempts: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            seed: 123,
            days: 30,
            p_infectious: 0.01,
            p_patient_transmit: 0.05,
            p_other_transmit: 0.03,
            screening_interval: 7,
            p_recovery: 0.6,
            immunization_fraction: 0.0,
            susceptibility_threshold: 0.5,
            patient_proportion: 0.387,
            max_seeding_attempts: 10_000,
        }
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), ContagionError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ContagionError::Configuration(format!(
            "{name} must be a probability in [0, 1], got {value}"
        )));
    }
    Ok(())
}

impl Parameters {
    /// Checks every value against its allowed range, so that a bad input fails here rather
    /// than as a panic in the middle of a run.
    pub fn validate(&self) -> Result<(), ContagionError> {
        check_probability("p_infectious", self.p_infectious)?;
        check_probability("p_patient_transmit", self.p_patient_transmit)?;
        check_probability("p_other_transmit", self.p_other_transmit)?;
        check_probability("p_recovery", self.p_recovery)?;
        check_probability("immunization_fraction", self.immunization_fraction)?;
        check_probability("susceptibility_threshold", self.susceptibility_threshold)?;
        check_probability("patient_proportion", self.patient_proportion)?;

        if self.screening_interval == 0 {
            return Err(ContagionError::Configuration(
                "screening_interval must be at least 1 day".to_string(),
            ));
        }
        if self.max_seeding_attempts == 0 {
            return Err(ContagionError::Configuration(
                "max_seeding_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads parameters from a JSON object. Missing fields take their default values; unknown
/// fields are rejected. The result is not validated.
pub fn load_parameters_from_json(file_path: &Path) -> Result<Parameters, ContagionError> {
    let reader = BufReader::new(File::open(file_path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Default)]
struct ParametersPlugin {
    parameters: Option<Parameters>,
}

crate::define_data_plugin!(ParametersPlugin, ParametersPlugin::default());

pub trait ContextParametersExt {
    /// Validates and stores the parameters for this run, replacing any previous value.
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), ContagionError>;

    /// Returns a copy of the run parameters.
    fn parameters(&self) -> Result<Parameters, ContagionError>;
}

impl ContextParametersExt for Context {
    fn set_parameters(&mut self, parameters: Parameters) -> Result<(), ContagionError> {
        parameters.validate()?;
        self.get_data_container_mut::<ParametersPlugin>().parameters = Some(parameters);
        Ok(())
    }

    fn parameters(&self) -> Result<Parameters, ContagionError> {
        self.get_data_container::<ParametersPlugin>()
            .and_then(|plugin| plugin.parameters)
            .ok_or_else(|| ContagionError::Configuration("parameters have not been set".to_string()))
    }
}
