//! Direction of the velocity relative to the radial direction.

use itertools::izip;
use log::log;
use rand::Rng;
use rayon::prelude::*;

use crate::{
    components::ComponentTable,
    error::{Result, SampleError},
    math::uniforms,
    model::Model,
    roots::{brentq, BrentOptions},
    settings::SampleSettings,
    special::erfi_ratio,
};

#[derive(Debug, Clone)]
pub(crate) struct Directions {
    /// Cosine between velocity and radius vector, in `[0, 1]`.
    pub q: Vec<f64>,
    pub vr: Vec<f64>,
    pub vt: Vec<f64>,
}

/// Solve `u = erfi(a q) / erfi(a)` for `q` in `[0, 1]`.
///
/// The right-hand side increases monotonically from 0 to 1 on the unit
/// interval, so every `u` in `[0, 1]` has exactly one root.
pub fn solve_direction_cosine(a: f64, u: f64) -> Result<f64> {
    if a.abs() < 1e-8 {
        return Ok(u);
    }
    brentq(|q| u - erfi_ratio(a, q), 0., 1., BrentOptions::default())
        .map_err(|_| SampleError::DirectionSolve { a, u })
}

/// Draw direction cosines and split speeds into radial and tangential parts.
///
/// Draws `n` uniforms for the cosines, then `n` signs for the radial
/// velocity. Isotropic systems use the uniforms as cosines directly; in
/// anisotropic systems each cosine is the root of its own equation, solved
/// in parallel once all draws are taken.
#[allow(clippy::too_many_arguments)]
pub(crate) fn sample_directions<M, R>(
    model: &M,
    table: &ComponentTable,
    r: &[f64],
    k: &[f64],
    v: &[f64],
    anisotropic: bool,
    settings: &SampleSettings,
    rng: &mut R,
) -> Result<Directions>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    log!(settings.log_level(), "sample angles ...");

    let n = table.n_particles();
    let u = uniforms(rng, n);
    let signs: Vec<f64> = (0..n)
        .map(|_| if rng.random::<bool>() { 1. } else { -1. })
        .collect();

    let q = if anisotropic {
        let ra = table.broadcast(|c| c.anisotropy_radius);
        let sig2fac = table.broadcast(|c| model.sig2() / c.sig2);
        let a: Vec<f64> = izip!(r, k, &ra, &sig2fac)
            .map(|(r, k, ra, fac)| r / ra * k.sqrt() * fac.sqrt())
            .collect();
        a.par_iter()
            .zip(u.par_iter())
            .map(|(&a, &u)| solve_direction_cosine(a, u))
            .collect::<Result<Vec<f64>>>()?
    } else {
        u
    };

    let vr = izip!(v, &q, &signs).map(|(v, q, s)| v * q * s).collect();
    let vt = izip!(v, &q)
        .map(|(v, q)| v * (1. - q * q).max(0.).sqrt())
        .collect();

    Ok(Directions { q, vr, vt })
}
