use log::{log, log_enabled};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    cartesian::to_cartesian,
    components::ComponentTable,
    diagnostics::Diagnostics,
    direction::sample_directions,
    error::{Result, SampleError},
    model::Model,
    radius::sample_radii,
    sampler_stats::SamplerStats,
    settings::SampleSettings,
    velocity::sample_speeds,
};

/// Anisotropy radii below this many tidal radii switch the whole run to
/// anisotropic sampling.
pub const ANISOTROPY_THRESHOLD: f64 = 3.;

/// A particle realization of a model.
///
/// All vectors have one entry per particle. Particles of one mass component
/// occupy a contiguous block of rows; the order within a block carries no
/// meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub m: Vec<f64>,
    pub r: Vec<f64>,
    /// Potential over the global dispersion scale.
    pub phihat: Vec<f64>,
    pub v: Vec<f64>,
    /// Kinetic energy per unit mass over the global dispersion scale.
    pub k: Vec<f64>,
    /// Cosine between velocity and radius vector, without sign.
    pub q: Vec<f64>,
    pub vr: Vec<f64>,
    pub vt: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub vz: Vec<f64>,
    /// Mass component of every particle.
    pub component: Vec<usize>,
    pub stats: SamplerStats,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }

    pub fn is_anisotropic(&self) -> bool {
        self.stats.anisotropic
    }
}

/// Whether a model is sampled with anisotropic velocity directions.
pub fn is_anisotropic<M: Model + ?Sized>(model: &M) -> bool {
    let ra = model
        .anisotropy_radii()
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    ra / model.tidal_radius() < ANISOTROPY_THRESHOLD
}

/// Draw `np` particles from the distribution function of `model`.
///
/// Multi-mass models get `round(Mj / mj)` particles per component instead,
/// so the sample length can differ from `np`.
///
/// All randomness comes from one generator seeded with `settings.seed`,
/// consumed in this order: one radius uniform per particle; per component
/// and rejection round, one location and then one acceptance uniform per
/// pending particle; one direction uniform and then one sign per particle;
/// two position uniforms per particle; and finally one azimuth per particle
/// (anisotropic) or two direction uniforms per particle (isotropic) for the
/// velocity vectors.
pub fn sample<M: Model + ?Sized>(model: &M, np: usize, settings: SampleSettings) -> Result<Sample> {
    if !model.converged() {
        return Err(SampleError::NotConverged);
    }
    settings.validate()?;

    let table = ComponentTable::build(model, np, &settings)?;
    let anisotropic = is_anisotropic(model);
    log!(
        settings.log_level(),
        "sampling {} particles ({})",
        table.n_particles(),
        if anisotropic { "anisotropic" } else { "isotropic" }
    );

    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);

    let mut radii = sample_radii(model, &table, &settings, &mut rng)?;
    let speeds = sample_speeds(model, &table, &mut radii, anisotropic, &settings, &mut rng)?;
    let directions = sample_directions(
        model,
        &table,
        &radii.r,
        &speeds.k,
        &speeds.v,
        anisotropic,
        &settings,
        &mut rng,
    )?;

    log!(settings.log_level(), "convert to cartesian coordinates ...");
    let cartesian = to_cartesian(
        &radii.r,
        &speeds.v,
        &directions.vr,
        &directions.vt,
        anisotropic,
        &mut rng,
    );

    let sample = Sample {
        m: table.broadcast(|c| c.mass),
        r: radii.r,
        phihat: radii.phihat,
        v: speeds.v,
        k: speeds.k,
        q: directions.q,
        vr: directions.vr,
        vt: directions.vt,
        x: cartesian.x,
        y: cartesian.y,
        z: cartesian.z,
        vx: cartesian.vx,
        vy: cartesian.vy,
        vz: cartesian.vz,
        component: table.component_index(),
        stats: SamplerStats {
            anisotropic,
            components: speeds.stats,
        },
    };

    let level = settings.log_level();
    if log_enabled!(level) {
        log!(
            level,
            "done! {} rejection rounds in total",
            sample.stats.total_rounds()
        );
        Diagnostics::new(&sample, model).log(level);
    }

    Ok(sample)
}
