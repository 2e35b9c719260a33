//! A [`Model`] backed by plain radial tables.

use anyhow::ensure;
use itertools::Itertools;

use crate::{
    error::{Result, SampleError},
    math::interp_into,
    model::{EnergyTotals, Model},
};

/// Model tables as handed over by an equilibrium solver.
///
/// The potential is interpolated linearly on the radial grid and clamped to
/// the end values outside it.
#[derive(Debug, Clone)]
pub struct TabulatedModel {
    converged: bool,
    multi: bool,
    component_masses: Vec<f64>,
    star_masses: Vec<f64>,
    anisotropy_radii: Vec<f64>,
    dispersions: Vec<f64>,
    total_mass: f64,
    sig2: f64,
    tidal_radius: f64,
    truncation: f64,
    grav_const: f64,
    r: Vec<f64>,
    mc: Vec<f64>,
    mcj: Vec<Vec<f64>>,
    phi: Vec<f64>,
    energies: Option<EnergyTotals>,
}

fn check_non_decreasing(name: &str, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SampleError::InvalidModel(format!(
            "{name} contains non-finite values"
        )));
    }
    if values.iter().tuple_windows().any(|(a, b)| b < a) {
        return Err(SampleError::InvalidModel(format!(
            "{name} is not non-decreasing"
        )));
    }
    Ok(())
}

fn check_grid(r: &[f64], phi: &[f64]) -> Result<()> {
    if r.len() < 2 {
        return Err(SampleError::InvalidModel(
            "radial grid needs at least two points".to_string(),
        ));
    }
    if phi.len() != r.len() {
        return Err(SampleError::InvalidModel(format!(
            "potential has {} entries, radial grid {}",
            phi.len(),
            r.len()
        )));
    }
    if r[0] < 0. {
        return Err(SampleError::InvalidModel(
            "radial grid starts at a negative radius".to_string(),
        ));
    }
    check_non_decreasing("radial grid", r)
}

fn check_anisotropy_radii(radii: &[f64]) -> Result<()> {
    // Infinite radii are the isotropic limit.
    if radii.iter().any(|&ra| !(ra > 0.)) {
        return Err(SampleError::InvalidModel(
            "anisotropy radii must be positive".to_string(),
        ));
    }
    Ok(())
}

impl TabulatedModel {
    /// Single-mass model. Total mass and tidal radius are taken from the
    /// last entries of `mc` and `r`.
    pub fn single_mass(
        r: Vec<f64>,
        mc: Vec<f64>,
        phi: Vec<f64>,
        ra: f64,
        sig2: f64,
        truncation: f64,
    ) -> Result<Self> {
        check_grid(&r, &phi)?;
        if mc.len() != r.len() {
            return Err(SampleError::InvalidModel(format!(
                "cumulative mass has {} entries, radial grid {}",
                mc.len(),
                r.len()
            )));
        }
        check_non_decreasing("cumulative mass", &mc)?;
        let total_mass = mc[mc.len() - 1];
        if !(total_mass > 0.) {
            return Err(SampleError::InvalidModel(
                "total mass must be positive".to_string(),
            ));
        }
        if !(sig2 > 0.) {
            return Err(SampleError::InvalidModel(
                "sig2 must be positive".to_string(),
            ));
        }
        check_anisotropy_radii(&[ra])?;

        Ok(TabulatedModel {
            converged: true,
            multi: false,
            component_masses: vec![total_mass],
            star_masses: vec![total_mass],
            anisotropy_radii: vec![ra],
            dispersions: vec![sig2],
            total_mass,
            sig2,
            tidal_radius: r[r.len() - 1],
            truncation,
            grav_const: 1.,
            mcj: vec![mc.clone()],
            r,
            mc,
            phi,
            energies: None,
        })
    }

    /// Multi-mass model. Component masses are the last entries of each
    /// `mcj` row and the total profile is their sum.
    #[allow(clippy::too_many_arguments)]
    pub fn multi_mass(
        r: Vec<f64>,
        mcj: Vec<Vec<f64>>,
        phi: Vec<f64>,
        star_masses: Vec<f64>,
        anisotropy_radii: Vec<f64>,
        dispersions: Vec<f64>,
        sig2: f64,
        truncation: f64,
    ) -> Result<Self> {
        check_grid(&r, &phi)?;
        let nmbin = mcj.len();
        if nmbin == 0 {
            return Err(SampleError::InvalidModel("no mass components".to_string()));
        }
        if star_masses.len() != nmbin
            || anisotropy_radii.len() != nmbin
            || dispersions.len() != nmbin
        {
            return Err(SampleError::InvalidModel(format!(
                "component tables disagree on the number of components ({nmbin})"
            )));
        }
        for (j, row) in mcj.iter().enumerate() {
            if row.len() != r.len() {
                return Err(SampleError::InvalidModel(format!(
                    "cumulative mass of component {j} has {} entries, radial grid {}",
                    row.len(),
                    r.len()
                )));
            }
            check_non_decreasing(&format!("cumulative mass of component {j}"), row)?;
        }
        if star_masses.iter().any(|&m| !(m > 0.)) {
            return Err(SampleError::InvalidModel(
                "star masses must be positive".to_string(),
            ));
        }
        if !(sig2 > 0.) || dispersions.iter().any(|&s| !(s > 0.)) {
            return Err(SampleError::InvalidModel(
                "velocity-dispersion scales must be positive".to_string(),
            ));
        }
        check_anisotropy_radii(&anisotropy_radii)?;

        let mut mc = vec![0.; r.len()];
        for row in &mcj {
            mc.iter_mut().zip(row).for_each(|(total, m)| *total += m);
        }
        let component_masses = mcj.iter().map(|row| row[row.len() - 1]).collect();
        let total_mass = mc[mc.len() - 1];

        Ok(TabulatedModel {
            converged: true,
            multi: true,
            component_masses,
            star_masses,
            anisotropy_radii,
            dispersions,
            total_mass,
            sig2,
            tidal_radius: r[r.len() - 1],
            truncation,
            grav_const: 1.,
            r,
            mc,
            mcj,
            phi,
            energies: None,
        })
    }

    pub fn with_converged(mut self, converged: bool) -> Self {
        self.converged = converged;
        self
    }

    pub fn with_tidal_radius(mut self, rt: f64) -> Self {
        self.tidal_radius = rt;
        self
    }

    pub fn with_grav_const(mut self, grav_const: f64) -> Self {
        self.grav_const = grav_const;
        self
    }

    pub fn with_reported_energies(mut self, energies: EnergyTotals) -> Self {
        self.energies = Some(energies);
        self
    }
}

impl Model for TabulatedModel {
    fn converged(&self) -> bool {
        self.converged
    }

    fn is_multi(&self) -> bool {
        self.multi
    }

    fn component_masses(&self) -> &[f64] {
        &self.component_masses
    }

    fn star_masses(&self) -> &[f64] {
        &self.star_masses
    }

    fn anisotropy_radii(&self) -> &[f64] {
        &self.anisotropy_radii
    }

    fn dispersions(&self) -> &[f64] {
        &self.dispersions
    }

    fn total_mass(&self) -> f64 {
        self.total_mass
    }

    fn sig2(&self) -> f64 {
        self.sig2
    }

    fn tidal_radius(&self) -> f64 {
        self.tidal_radius
    }

    fn truncation(&self) -> f64 {
        self.truncation
    }

    fn grav_const(&self) -> f64 {
        self.grav_const
    }

    fn radii(&self) -> &[f64] {
        &self.r
    }

    fn cumulative_mass(&self) -> &[f64] {
        &self.mc
    }

    fn component_cumulative_mass(&self, component: usize) -> &[f64] {
        &self.mcj[component]
    }

    fn potential(&self, radii: &[f64], out: &mut [f64]) -> anyhow::Result<()> {
        ensure!(
            radii.len() == out.len(),
            "potential output has length {}, expected {}",
            out.len(),
            radii.len()
        );
        interp_into(radii, &self.r, &self.phi, out);
        Ok(())
    }

    fn reported_energies(&self) -> Option<&EnergyTotals> {
        self.energies.as_ref()
    }
}

/// Small analytic models for tests and benchmarks.
///
/// The profiles are Plummer-like cores truncated at `rt = 1` with the
/// potential shifted to vanish there. They are not self-consistent
/// equilibria, but have the shape the sampler expects: a monotone enclosed
/// mass and a positive potential decreasing to zero at the tidal radius.
pub mod test_models {
    use super::TabulatedModel;

    pub const N_GRID: usize = 201;
    pub const W0: f64 = 6.;

    pub fn grid() -> Vec<f64> {
        (0..N_GRID)
            .map(|i| i as f64 / (N_GRID - 1) as f64)
            .collect()
    }

    /// Enclosed mass of a Plummer sphere with core radius `rc`, normalized to
    /// `mass` at `r = 1`.
    pub fn enclosed_mass(r: &[f64], rc: f64, mass: f64) -> Vec<f64> {
        let profile = |r: f64| {
            let s = r / rc;
            s.powi(3) / (1. + s * s).powf(1.5)
        };
        let norm = profile(1.);
        r.iter().map(|&r| mass * profile(r) / norm).collect()
    }

    /// Potential with central value `W0 * sig2` vanishing at `r = 1`.
    pub fn potential(r: &[f64], rc: f64, sig2: f64) -> Vec<f64> {
        let shape = |r: f64| 1. / (1. + (r / rc).powi(2)).sqrt();
        let edge = shape(1.);
        r.iter()
            .map(|&r| W0 * sig2 * (shape(r) - edge) / (1. - edge))
            .collect()
    }

    /// Unit-mass King-like (`g = 1`) single-mass model. Anisotropic when
    /// `ra < 3`.
    pub fn single_mass(ra: f64) -> TabulatedModel {
        let r = grid();
        let mc = enclosed_mass(&r, 0.2, 1.);
        let phi = potential(&r, 0.2, 1.);
        // Tables built here always satisfy the constructor checks.
        TabulatedModel::single_mass(r, mc, phi, ra, 1., 1.).unwrap()
    }

    /// Multi-mass model with component masses `big_m` and star masses `mj`.
    /// Heavier components get smaller dispersions and tighter cores.
    pub fn multi_mass(big_m: &[f64], mj: &[f64], ra: f64) -> TabulatedModel {
        let r = grid();
        let mbar = big_m.iter().sum::<f64>().max(f64::MIN_POSITIVE)
            / big_m
                .iter()
                .zip(mj)
                .map(|(big, m)| big / m)
                .sum::<f64>()
                .max(1.);
        let mcj = big_m
            .iter()
            .zip(mj)
            .map(|(&big, &m)| enclosed_mass(&r, 0.2 * (mbar / m).powf(0.25), big))
            .collect();
        let sig2j = mj.iter().map(|&m| (mbar / m).clamp(0.25, 4.)).collect();
        let phi = potential(&r, 0.2, 1.);
        TabulatedModel::multi_mass(
            r,
            mcj,
            phi,
            mj.to_vec(),
            vec![ra; mj.len()],
            sig2j,
            1.,
            1.,
        )
        .unwrap()
    }
}
