//! Draw N-body realizations from spherical, lowered-isothermal distribution
//! functions.
//!
//! Given the radial tables of a converged equilibrium model (see [`Model`]),
//! [`sample`] draws radii by inverting the cumulative mass profile, speeds by
//! rejection sampling against per-particle envelopes, velocity directions
//! (closed form for isotropic systems, by root finding for anisotropic ones)
//! and finally Cartesian positions and velocities.
//!
//! ```no_run
//! use dfsample::{sample, tabulated::test_models::single_mass, SampleSettings};
//!
//! let model = single_mass(50.);
//! let particles = sample(&model, 1000, SampleSettings::default())?;
//! assert_eq!(particles.len(), 1000);
//! # Ok::<(), dfsample::SampleError>(())
//! ```

pub(crate) mod cartesian;
pub(crate) mod components;
pub(crate) mod diagnostics;
pub(crate) mod direction;
pub(crate) mod error;
pub(crate) mod math;
pub(crate) mod model;
pub(crate) mod radius;
pub(crate) mod roots;
pub(crate) mod sampler;
pub(crate) mod sampler_stats;
pub(crate) mod settings;
pub mod special;
pub mod tabulated;
pub(crate) mod velocity;

pub use components::{Component, ComponentTable};
pub use diagnostics::{ComponentDiagnostics, Diagnostics};
pub use direction::solve_direction_cosine;
pub use error::{Result, SampleError};
pub use model::{EnergyTotals, Model};
pub use roots::{brentq, BrentOptions, RootError};
pub use sampler::{is_anisotropic, sample, Sample, ANISOTROPY_THRESHOLD};
pub use sampler_stats::{ComponentStats, SamplerStats};
pub use settings::SampleSettings;
pub use tabulated::TabulatedModel;
