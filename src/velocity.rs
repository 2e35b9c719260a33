//! Speeds by rejection sampling against a per-particle piecewise envelope.
//!
//! The sampled variable is `x = k^(3/2)`, where `k` is the kinetic energy
//! per unit mass in units of `sig2`. Its density depends on the particle's
//! radius and potential, so every particle gets its own envelope. Envelopes
//! of one component are built together in a `[breakpoint, particle]` grid.

use faer::Mat;
use itertools::izip;
use log::{log, trace};
use rand::Rng;

use crate::{
    components::{Component, ComponentTable},
    error::{Result, SampleError},
    math::uniforms,
    model::Model,
    radius::Radii,
    sampler_stats::ComponentStats,
    settings::SampleSettings,
    special::{dawson_over_arg, eg},
};

/// Unnormalized density of `x` for the particles of one component.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VelocityDensity {
    truncation: f64,
    /// `sig2 / sig2j`
    sig2fac: f64,
    anisotropy_radius: f64,
    anisotropic: bool,
}

impl VelocityDensity {
    pub(crate) fn new<M: Model + ?Sized>(
        model: &M,
        component: &Component,
        anisotropic: bool,
    ) -> Self {
        VelocityDensity {
            truncation: model.truncation(),
            sig2fac: model.sig2() / component.sig2,
            anisotropy_radius: component.anisotropy_radius,
            anisotropic,
        }
    }

    /// Density of `x` at radius `r` with dimensionless potential `phihat`.
    ///
    /// At `x = 0` the anisotropic factor is 1 and both branches agree.
    pub(crate) fn pdf(&self, x: f64, r: f64, phihat: f64) -> f64 {
        let x13 = x.cbrt();
        let e = (phihat - x13 * x13) * self.sig2fac;
        let energy = eg(e, self.truncation);
        if self.anisotropic && x > 0. {
            let p = r / self.anisotropy_radius;
            energy * dawson_over_arg(x13 * p * self.sig2fac.sqrt())
        } else {
            energy
        }
    }
}

/// Piecewise envelopes of all particles of one component.
///
/// Row `j` holds breakpoint `j` of every particle: `x[j] = xmax * j / nx`,
/// `y[j] = pdf(x[j])`, and `ycum[j]` the envelope mass left of `x[j]`
/// using the left-endpoint value on every segment.
pub(crate) struct ProposalGrid {
    x: Mat<f64>,
    y: Mat<f64>,
    ycum: Mat<f64>,
    nx: usize,
}

impl ProposalGrid {
    pub(crate) fn build(density: &VelocityDensity, r: &[f64], phihat: &[f64], nx: usize) -> Self {
        debug_assert_eq!(r.len(), phihat.len());
        let n = r.len();

        let mut x = Mat::<f64>::zeros(nx + 1, n);
        let mut y = Mat::<f64>::zeros(nx + 1, n);
        let mut ycum = Mat::<f64>::zeros(nx + 1, n);

        for (i, (&r, &phihat)) in r.iter().zip(phihat).enumerate() {
            let xmax = phihat.max(0.).powf(1.5);
            for j in 0..=nx {
                let xj = if j == nx {
                    xmax
                } else {
                    xmax * (j as f64 / nx as f64)
                };
                x[(j, i)] = xj;
                y[(j, i)] = density.pdf(xj, r, phihat);
            }
            for j in 0..nx {
                ycum[(j + 1, i)] = ycum[(j, i)] + y[(j, i)] * (x[(j + 1, i)] - x[(j, i)]);
            }
        }

        ProposalGrid { x, y, ycum, nx }
    }

    pub(crate) fn n_particles(&self) -> usize {
        self.x.ncols()
    }

    /// Total envelope mass of particle `i`.
    pub(crate) fn total(&self, i: usize) -> f64 {
        self.ycum[(self.nx, i)]
    }

    /// Map a point `target` in `[0, total)` of the cumulative envelope of
    /// particle `i` to a candidate `x` and the envelope height there.
    ///
    /// A target outside every segment (an envelope with no mass) yields
    /// `(0, 0)`.
    pub(crate) fn invert(&self, i: usize, target: f64) -> (f64, f64) {
        for j in 0..self.nx {
            let lo = self.ycum[(j, i)];
            let hi = self.ycum[(j + 1, i)];
            if target >= lo && target < hi {
                let height = self.y[(j, i)];
                return ((target - lo) / height + self.x[(j, i)], height);
            }
        }
        (0., 0.)
    }
}

/// Accepted samples of one component, in acceptance order.
pub(crate) struct Accepted {
    /// Local particle index of every accepted sample.
    pub order: Vec<usize>,
    pub x: Vec<f64>,
    pub stats: ComponentStats,
}

/// Batch rejection sampling of `x` for the particles of one component.
///
/// Every round draws one location uniform per pending particle, then one
/// acceptance uniform per pending particle. Rejected particles are retried
/// in the next round with fresh draws.
pub(crate) fn sample_component<R: Rng + ?Sized>(
    density: &VelocityDensity,
    grid: &ProposalGrid,
    r: &[f64],
    phihat: &[f64],
    component: usize,
    max_rounds: Option<u64>,
    rng: &mut R,
) -> Result<Accepted> {
    let n = grid.n_particles();
    let mut pending: Vec<usize> = (0..n).collect();
    let mut order = Vec::with_capacity(n);
    let mut accepted_x = Vec::with_capacity(n);
    let mut stats = ComponentStats {
        component,
        n_particles: n,
        rounds: 0,
        proposals: 0,
    };

    while !pending.is_empty() {
        if let Some(max) = max_rounds {
            if stats.rounds >= max {
                return Err(SampleError::ProposalInefficient {
                    component,
                    rounds: stats.rounds,
                    pending: pending.len(),
                });
            }
        }

        let nc = pending.len();
        let candidates: Vec<(f64, f64)> = izip!(&pending, uniforms(rng, nc))
            .map(|(&i, u)| grid.invert(i, u * grid.total(i)))
            .collect();
        let accept_draws = uniforms(rng, nc);

        let mut still_pending = Vec::new();
        for (&i, &(x, height), u2) in izip!(&pending, &candidates, accept_draws) {
            let threshold = u2 * height;
            if threshold <= density.pdf(x, r[i], phihat[i]) {
                order.push(i);
                accepted_x.push(x);
            } else {
                still_pending.push(i);
            }
        }

        stats.rounds += 1;
        stats.proposals += nc as u64;
        trace!(
            "component {component} round {}: {} of {nc} rejected",
            stats.rounds,
            still_pending.len()
        );
        pending = still_pending;
    }

    Ok(Accepted {
        order,
        x: accepted_x,
        stats,
    })
}

/// Speeds of all particles.
#[derive(Debug, Clone)]
pub(crate) struct Speeds {
    /// `x^(2/3)`, kinetic energy per unit mass over `sig2`.
    pub k: Vec<f64>,
    pub v: Vec<f64>,
    pub stats: Vec<ComponentStats>,
}

/// Sample a speed for every particle, one component at a time.
///
/// Within each component the particles end up in acceptance order: radius
/// and potential are permuted together with the accepted samples so every
/// row stays consistent.
pub(crate) fn sample_speeds<M, R>(
    model: &M,
    table: &ComponentTable,
    radii: &mut Radii,
    anisotropic: bool,
    settings: &SampleSettings,
    rng: &mut R,
) -> Result<Speeds>
where
    M: Model + ?Sized,
    R: Rng + ?Sized,
{
    let n = table.n_particles();
    let mut k = vec![0.; n];
    let mut v = vec![0.; n];
    let mut stats = Vec::with_capacity(table.components().len());
    let sig2 = model.sig2();

    for component in table.iter() {
        let range = component.range.clone();
        let density = VelocityDensity::new(model, component, anisotropic);

        log!(
            settings.log_level(),
            "component {}: set up velocity envelopes for {} particles",
            component.index,
            component.len()
        );
        let r = &radii.r[range.clone()];
        let phihat = &radii.phihat[range.clone()];
        let grid = ProposalGrid::build(&density, r, phihat, settings.nx);

        let accepted = sample_component(
            &density,
            &grid,
            r,
            phihat,
            component.index,
            settings.max_rounds,
            rng,
        )?;
        drop(grid);

        log!(
            settings.log_level(),
            "component {}: accepted after {} rounds ({:.3} acceptance)",
            component.index,
            accepted.stats.rounds,
            accepted.stats.acceptance_rate()
        );

        let r_sorted: Vec<f64> = accepted.order.iter().map(|&i| r[i]).collect();
        let phihat_sorted: Vec<f64> = accepted.order.iter().map(|&i| phihat[i]).collect();
        radii.r[range.clone()].copy_from_slice(&r_sorted);
        radii.phihat[range.clone()].copy_from_slice(&phihat_sorted);

        for (x, k, v) in izip!(&accepted.x, &mut k[range.clone()], &mut v[range]) {
            let x13 = x.cbrt();
            *k = x13 * x13;
            *v = (2. * *k * sig2).sqrt();
        }
        stats.push(accepted.stats);
    }

    Ok(Speeds { k, v, stats })
}
