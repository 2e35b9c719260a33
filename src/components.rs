//! Partition of the particle arrays into mass components.

use std::ops::Range;

use log::log;

use crate::{
    error::{Result, SampleError},
    model::Model,
    settings::SampleSettings,
};

/// One mass component and the contiguous slice of particles it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub index: usize,
    pub range: Range<usize>,
    /// Mass of every particle of the component.
    pub mass: f64,
    pub anisotropy_radius: f64,
    /// Velocity-dispersion scale of the component.
    pub sig2: f64,
}

impl Component {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Components laid out back to back over `[0, n_particles)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTable {
    components: Vec<Component>,
    n_particles: usize,
}

impl ComponentTable {
    /// Assign particle counts and per-particle parameters.
    ///
    /// A single-mass model gets `np` equal-mass particles in one component.
    /// A multi-mass model gets `round(Mj / mj)` particles per component, so
    /// the realized total can differ from `np`.
    pub fn build<M: Model + ?Sized>(
        model: &M,
        np: usize,
        settings: &SampleSettings,
    ) -> Result<Self> {
        let ra = model.anisotropy_radii();
        if ra.is_empty() {
            return Err(SampleError::InvalidModel(
                "model has no anisotropy radius".to_string(),
            ));
        }

        if !model.is_multi() {
            if np == 0 {
                return Err(SampleError::InvalidSettings(
                    "requested zero particles".to_string(),
                ));
            }
            let component = Component {
                index: 0,
                range: 0..np,
                mass: model.total_mass() / np as f64,
                anisotropy_radius: ra[0],
                sig2: model.sig2(),
            };
            return Ok(ComponentTable {
                components: vec![component],
                n_particles: np,
            });
        }

        let nmbin = model.n_components();
        let big_m = model.component_masses();
        let mj = model.star_masses();
        let sig2j = model.dispersions();
        if big_m.len() != nmbin || ra.len() != nmbin || sig2j.len() != nmbin {
            return Err(SampleError::InvalidModel(format!(
                "component tables disagree on the number of components ({nmbin})"
            )));
        }

        let mut components = Vec::with_capacity(nmbin);
        let mut start = 0;
        for j in 0..nmbin {
            let count = (big_m[j] / mj[j]).round();
            if !(count >= 1.) {
                return Err(SampleError::ZeroStars { component: j });
            }
            let count = count as usize;
            components.push(Component {
                index: j,
                range: start..start + count,
                mass: mj[j],
                anisotropy_radius: ra[j],
                sig2: sig2j[j],
            });
            start += count;
        }

        log!(
            settings.log_level(),
            "{} particles in {} components: {:?}",
            start,
            nmbin,
            components.iter().map(Component::len).collect::<Vec<_>>()
        );

        Ok(ComponentTable {
            components,
            n_particles: start,
        })
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Broadcast a per-component value onto every particle.
    pub fn broadcast<F>(&self, value: F) -> Vec<f64>
    where
        F: Fn(&Component) -> f64,
    {
        let mut out = vec![0.; self.n_particles];
        for component in &self.components {
            out[component.range.clone()].fill(value(component));
        }
        out
    }

    pub fn component_index(&self) -> Vec<usize> {
        let mut out = vec![0; self.n_particles];
        for component in &self.components {
            out[component.range.clone()].fill(component.index);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabulated::test_models::{multi_mass, single_mass};
    use pretty_assertions::assert_eq;

    #[test]
    fn single_mass_gets_equal_masses() {
        let model = single_mass(50.);
        let table = ComponentTable::build(&model, 400, &SampleSettings::default()).unwrap();
        assert_eq!(table.n_particles(), 400);
        assert_eq!(table.components().len(), 1);
        let masses = table.broadcast(|c| c.mass);
        assert!(masses.iter().all(|&m| m == 1. / 400.));
    }

    #[test]
    fn multi_mass_ranges_partition() {
        let model = multi_mass(&[0.6, 0.4], &[0.001, 0.004], 50.);
        let table = ComponentTable::build(&model, 123, &SampleSettings::default()).unwrap();
        let ranges: Vec<_> = table.iter().map(|c| c.range.clone()).collect();
        assert_eq!(ranges, vec![0..600, 600..700]);
        assert_eq!(table.n_particles(), 700);

        let masses = table.broadcast(|c| c.mass);
        assert_eq!(masses[599], 0.001);
        assert_eq!(masses[600], 0.004);
        let index = table.component_index();
        assert_eq!(index[0], 0);
        assert_eq!(index[699], 1);
    }

    #[test]
    fn zero_star_component_fails() {
        let model = multi_mass(&[1.0, 0.0], &[0.01, 0.01], 50.);
        let err = ComponentTable::build(&model, 100, &SampleSettings::default()).unwrap_err();
        assert!(matches!(err, SampleError::ZeroStars { component: 1 }));
    }

    #[test]
    fn zero_requested_particles_fails() {
        let model = single_mass(50.);
        let err = ComponentTable::build(&model, 0, &SampleSettings::default()).unwrap_err();
        assert!(matches!(err, SampleError::InvalidSettings(_)));
    }
}
