/// Work done by the velocity rejection loop for one mass component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentStats {
    pub component: usize,
    pub n_particles: usize,
    /// Rejection rounds until every particle was accepted.
    pub rounds: u64,
    /// Candidates proposed over all rounds.
    pub proposals: u64,
}

impl ComponentStats {
    /// Fraction of proposals that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            return 1.;
        }
        self.n_particles as f64 / self.proposals as f64
    }
}

/// Statistics of a finished sampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerStats {
    pub anisotropic: bool,
    pub components: Vec<ComponentStats>,
}

impl SamplerStats {
    pub fn total_rounds(&self) -> u64 {
        self.components.iter().map(|c| c.rounds).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceptance_rate() {
        let stats = ComponentStats {
            component: 0,
            n_particles: 10,
            rounds: 3,
            proposals: 40,
        };
        assert_eq!(stats.acceptance_rate(), 0.25);

        let empty = ComponentStats {
            proposals: 0,
            n_particles: 0,
            ..stats
        };
        assert_eq!(empty.acceptance_rate(), 1.);
    }

    #[test]
    fn rounds_add_up_over_components() {
        let first = ComponentStats {
            component: 0,
            n_particles: 10,
            rounds: 3,
            proposals: 40,
        };
        let stats = SamplerStats {
            anisotropic: true,
            components: vec![
                first,
                ComponentStats {
                    component: 1,
                    rounds: 5,
                    ..first
                },
            ],
        };
        assert_eq!(stats.total_rounds(), 8);
        assert_eq!(
            SamplerStats {
                anisotropic: false,
                components: Vec::new()
            }
            .total_rounds(),
            0
        );
    }
}
