//! Energy bookkeeping of a finished sample, compared against the model.

use itertools::izip;
use log::log;

use crate::{
    math::weighted_sum,
    model::{EnergyTotals, Model},
    sampler::Sample,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDiagnostics {
    pub component: usize,
    pub kinetic_energy: f64,
    /// `2 Kr / Kt`
    pub anisotropy: f64,
}

/// Sample energies next to the totals reported by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub potential_energy: f64,
    pub kinetic_energy: f64,
    /// `K / U`
    pub virial_ratio: f64,
    /// `2 Kr / Kt`
    pub anisotropy: f64,
    /// Per-component values; empty for single-mass models.
    pub components: Vec<ComponentDiagnostics>,
    pub model: Option<EnergyTotals>,
}

fn anisotropy(vr: &[f64], vt: &[f64]) -> f64 {
    2. * weighted_sum(vr, vr) / weighted_sum(vt, vt)
}

impl Diagnostics {
    pub fn new<M: Model + ?Sized>(sample: &Sample, model: &M) -> Self {
        let sig2 = model.sig2();
        let escape = model.grav_const() * model.total_mass() / model.tidal_radius();

        let potential_energy = 0.5
            * izip!(&sample.m, &sample.phihat)
                .map(|(m, phihat)| m * (-phihat * sig2 - escape))
                .sum::<f64>();
        let kinetic_energy = 0.5
            * izip!(&sample.m, &sample.v)
                .map(|(m, v)| m * v * v)
                .sum::<f64>();

        let components = if model.is_multi() {
            (0..model.n_components())
                .map(|j| {
                    let (mut k, mut vr2, mut vt2) = (0., 0., 0.);
                    for (_, m, v, vr, vt) in izip!(
                        &sample.component,
                        &sample.m,
                        &sample.v,
                        &sample.vr,
                        &sample.vt
                    )
                    .filter(|(c, ..)| **c == j)
                    {
                        k += 0.5 * m * v * v;
                        vr2 += vr * vr;
                        vt2 += vt * vt;
                    }
                    ComponentDiagnostics {
                        component: j,
                        kinetic_energy: k,
                        anisotropy: 2. * vr2 / vt2,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        Diagnostics {
            potential_energy,
            kinetic_energy,
            virial_ratio: kinetic_energy / potential_energy,
            anisotropy: anisotropy(&sample.vr, &sample.vt),
            components,
            model: model.reported_energies().cloned(),
        }
    }

    /// Write the comparison table to the log.
    pub fn log(&self, level: log::Level) {
        let model = self.model.as_ref();
        let column = |value: Option<f64>| match value {
            Some(value) => format!("{value:12.4e}"),
            None => format!("{:>12}", "-"),
        };

        log!(
            level,
            "       U: sample = {:12.4e}; model = {}",
            self.potential_energy,
            column(model.map(|m| m.u))
        );
        log!(
            level,
            "       K: sample = {:12.4e}; model = {}",
            self.kinetic_energy,
            column(model.map(|m| m.k))
        );
        log!(
            level,
            "       Q: sample = {:12.4e}; model = {}",
            self.virial_ratio,
            column(model.map(|m| m.k / m.u))
        );
        log!(
            level,
            "  2Kr/Kt: sample = {:12.4}; model = {}",
            self.anisotropy,
            column(model.map(|m| 2. * m.kr / m.kt))
        );

        for c in &self.components {
            let j = c.component;
            log!(
                level,
                "  Kj[{j}]: sample = {:12.4e}; model = {}",
                c.kinetic_energy,
                column(model.and_then(|m| m.kj.get(j).copied()))
            );
            log!(
                level,
                " 2Kr/Kt[{j}]: sample = {:12.4e}; model = {}",
                c.anisotropy,
                column(model.and_then(|m| Some(2. * m.krj.get(j)? / m.ktj.get(j)?)))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sampler_stats::SamplerStats,
        tabulated::test_models::{multi_mass, single_mass},
    };
    use approx::assert_relative_eq;

    fn handmade(component: Vec<usize>) -> Sample {
        let n = component.len();
        Sample {
            m: vec![0.5; n],
            r: vec![0.5; n],
            phihat: vec![2.; n],
            v: vec![1.; n],
            k: vec![0.5; n],
            q: vec![0.5; n],
            vr: vec![0.5; n],
            vt: vec![0.75f64.sqrt(); n],
            x: vec![0.; n],
            y: vec![0.; n],
            z: vec![0.5; n],
            vx: vec![0.; n],
            vy: vec![0.; n],
            vz: vec![1.; n],
            component,
            stats: SamplerStats {
                anisotropic: false,
                components: Vec::new(),
            },
        }
    }

    #[test]
    fn energies_of_handmade_sample() {
        let model = single_mass(50.).with_reported_energies(EnergyTotals {
            u: -1.,
            k: 0.5,
            kr: 1.,
            kt: 2.,
            ..Default::default()
        });
        let sample = handmade(vec![0; 2]);
        let diag = Diagnostics::new(&sample, &model);

        // U = 0.5 * 2 * 0.5 * (-2 - 1), K = 0.5 * 2 * 0.5 * 1
        assert_relative_eq!(diag.potential_energy, -1.5);
        assert_relative_eq!(diag.kinetic_energy, 0.5);
        assert_relative_eq!(diag.virial_ratio, -1. / 3.);
        assert_relative_eq!(diag.anisotropy, 2. * 0.25 / 0.75, max_relative = 1e-12);
        assert!(diag.components.is_empty());
        assert_eq!(diag.model.as_ref().map(|m| m.k), Some(0.5));
        diag.log(log::Level::Debug);
    }

    #[test]
    fn potential_energy_uses_escape_term() {
        // G M / rt = 4 * 1 / 2 = 2 with M = 1 from the test tables.
        let model = single_mass(50.).with_grav_const(4.).with_tidal_radius(2.);
        assert_eq!(model.grav_const(), 4.);
        assert_eq!(model.tidal_radius(), 2.);
        let sample = handmade(vec![0; 2]);
        let diag = Diagnostics::new(&sample, &model);

        // U = 0.5 * 2 * 0.5 * (-2 - 2)
        assert_relative_eq!(diag.potential_energy, -2.);
        assert_relative_eq!(diag.virial_ratio, -0.25);
    }

    #[test]
    fn components_are_split() {
        let model = multi_mass(&[0.5, 0.5], &[0.01, 0.05], 50.);
        let mut sample = handmade(vec![0, 0, 1]);
        sample.v[2] = 2.;
        let diag = Diagnostics::new(&sample, &model);
        assert_eq!(diag.components.len(), 2);
        assert_relative_eq!(diag.components[0].kinetic_energy, 0.5);
        assert_relative_eq!(diag.components[1].kinetic_energy, 1.);
        assert!(diag.model.is_none());
        diag.log(log::Level::Debug);
    }
}
