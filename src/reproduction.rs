use crate::{
    context::Context,
    error::ContagionError,
    graph::ContextGraphExt,
    parameters::ContextParametersExt,
    roles::ContextRoleExt,
};
use log::info;

/// Configuration-model estimate of the basic reproduction number.
///
/// The per-contact rate blends both source roles by the patient share `q`,
/// `r = p_patient·q + p_other·(1 − q)`, and is scaled by the mean excess degree,
/// `R0 = r·(d² − d)/d`. A graph without contacts has an R0 of 0.
#[must_use]
pub fn reproduction_number(mean_degree: f64, q: f64, p_patient: f64, p_other: f64) -> f64 {
    if mean_degree <= 0.0 {
        return 0.0;
    }
    let rate = p_patient * q + p_other * (1.0 - q);
    rate * (mean_degree * mean_degree - mean_degree) / mean_degree
}

pub trait ContextReproductionExt {
    /// R0 of the loaded graph, using the realized share of patients.
    fn estimate_r0(&self) -> Result<f64, ContagionError>;
}

impl ContextReproductionExt for Context {
    fn estimate_r0(&self) -> Result<f64, ContagionError> {
        let parameters = self.parameters()?;
        let mean_degree = self.contact_graph()?.mean_degree();
        let q = self.patient_proportion();
        let r0 = reproduction_number(
            mean_degree,
            q,
            parameters.p_patient_transmit,
            parameters.p_other_transmit,
        );
        info!("R0 = {r0:.4} (mean degree {mean_degree:.2}, patient share {q:.3})");
        Ok(r0)
    }
}
