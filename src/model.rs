//! Interface to the equilibrium model that supplies the distribution function.
//!
//! The sampler never solves the model itself. It reads the radial tables,
//! the per-component parameters and the potential through the [`Model`]
//! trait, so any solver that can expose these quantities can be sampled.

use anyhow::Result;

/// Energy totals reported by the model solver.
///
/// These are only used to compare a finished sample against the model in
/// [`crate::Diagnostics`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnergyTotals {
    /// Potential energy.
    pub u: f64,
    /// Kinetic energy.
    pub k: f64,
    /// Radial part of the kinetic energy.
    pub kr: f64,
    /// Tangential part of the kinetic energy.
    pub kt: f64,
    /// Per-component kinetic energy. Empty for single-mass models.
    pub kj: Vec<f64>,
    pub krj: Vec<f64>,
    pub ktj: Vec<f64>,
}

/// A converged, spherically symmetric equilibrium model.
///
/// Single-mass models still expose one-element component tables; the
/// anisotropy radius of a single-mass model is `anisotropy_radii()[0]`.
pub trait Model {
    /// Whether the solver converged. Unconverged models are never sampled.
    fn converged(&self) -> bool;

    /// Whether the model has more than one mass component.
    fn is_multi(&self) -> bool;

    /// Number of mass components.
    fn n_components(&self) -> usize {
        self.star_masses().len()
    }

    /// Total mass `Mj` of every component.
    fn component_masses(&self) -> &[f64];

    /// Mass `mj` of a single star of every component.
    fn star_masses(&self) -> &[f64];

    /// Anisotropy radius `raj` of every component.
    fn anisotropy_radii(&self) -> &[f64];

    /// Velocity-dispersion scale `sig2j` of every component.
    fn dispersions(&self) -> &[f64];

    /// Total mass `M`.
    fn total_mass(&self) -> f64;

    /// Global velocity-dispersion scale `sig2`.
    fn sig2(&self) -> f64;

    /// Tidal radius `rt`.
    fn tidal_radius(&self) -> f64;

    /// Truncation parameter `g` of the distribution function.
    fn truncation(&self) -> f64;

    /// Gravitational constant in model units.
    fn grav_const(&self) -> f64 {
        1.0
    }

    /// Radial grid shared by all cumulative-mass tables.
    fn radii(&self) -> &[f64];

    /// Enclosed mass on the radial grid, all components together.
    fn cumulative_mass(&self) -> &[f64];

    /// Enclosed mass of one component on the radial grid.
    fn component_cumulative_mass(&self, component: usize) -> &[f64];

    /// Evaluate the potential at every radius in `radii`, writing into `out`.
    fn potential(&self, radii: &[f64], out: &mut [f64]) -> Result<()>;

    /// Energy totals computed by the solver, if it reports them.
    fn reported_energies(&self) -> Option<&EnergyTotals> {
        None
    }
}
