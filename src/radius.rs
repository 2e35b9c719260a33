//! Radii by inverting the cumulative mass profile.

use log::log;
use rand::Rng;

use crate::{
    components::ComponentTable,
    error::{Result, SampleError},
    math::{interp_into, uniforms},
    model::Model,
    settings::SampleSettings,
};

#[derive(Debug, Clone)]
pub(crate) struct Radii {
    pub r: Vec<f64>,
    /// Potential at `r` in units of the global dispersion scale.
    pub phihat: Vec<f64>,
}

/// Normalize an enclosed-mass table to a cumulative distribution.
fn normalized_profile(mc: &[f64]) -> Result<Vec<f64>> {
    let total = mc.last().copied().unwrap_or(0.);
    if !(total > 0.) {
        return Err(SampleError::InvalidModel(
            "cumulative mass profile has no mass".to_string(),
        ));
    }
    Ok(mc.iter().map(|m| m / total).collect())
}

/// Draw one radius per particle and evaluate the dimensionless potential.
///
/// One uniform is drawn per particle up front; each component then inverts
/// its own profile on its slice of those draws. For multi-mass models the
/// first profile entry is replaced by half the second so the innermost bin
/// never carries zero mass.
pub(crate) fn sample_radii<M, R>(
    model: &M,
    table: &ComponentTable,
    settings: &SampleSettings,
    rng: &mut R,
) -> Result<Radii>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    log!(settings.log_level(), "sample r ...");

    let n = table.n_particles();
    let grid = model.radii();
    let u = uniforms(rng, n);
    let mut r = vec![0.; n];

    if !model.is_multi() {
        let profile = normalized_profile(model.cumulative_mass())?;
        if profile.len() != grid.len() {
            return Err(SampleError::InvalidModel(
                "cumulative mass and radial grid differ in length".to_string(),
            ));
        }
        interp_into(&u, &profile, grid, &mut r);
    } else {
        for component in table.iter() {
            let mut mc = model.component_cumulative_mass(component.index).to_vec();
            if mc.len() != grid.len() || mc.len() < 2 {
                return Err(SampleError::InvalidModel(format!(
                    "cumulative mass of component {} does not match the radial grid",
                    component.index
                )));
            }
            mc[0] = 0.5 * mc[1];
            let profile = normalized_profile(&mc)?;
            let range = component.range.clone();
            interp_into(&u[range.clone()], &profile, grid, &mut r[range]);
        }
    }

    let mut phihat = vec![0.; n];
    model.potential(&r, &mut phihat)?;
    let sig2 = model.sig2();
    phihat.iter_mut().for_each(|phi| *phi /= sig2);

    Ok(Radii { r, phihat })
}
