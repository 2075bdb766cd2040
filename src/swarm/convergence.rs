//! Shaman election and good/bad classification.

use log::debug;

use super::tribe::Tribe;

impl Tribe {
    /// Sort members by best error, lowest first, and elect the first as shaman.
    ///
    /// The sort is stable, so among equal errors the earlier member wins.
    pub fn update_shaman(&mut self) {
        self.members
            .sort_by(|a, b| a.best_solution.error.total_cmp(&b.best_solution.error));
        self.shaman = self.members.first().map(|p| p.id);
    }

    /// One-shot comparison of the shaman against the tribe's best-ever error
    pub fn update_is_good(&mut self) {
        let shaman_error = self.best_error();
        if shaman_error < self.historical_best_error {
            debug!(
                "Tribe {} improved: {} -> {}",
                self.id, self.historical_best_error, shaman_error
            );
            self.is_good = true;
            self.historical_best_error = shaman_error;
        } else {
            self.is_good = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::swarm::{Particle, ParticleId, Tribe, TribeId};

    fn tribe_with_errors(errors: &[f64]) -> Tribe {
        let members = errors
            .iter()
            .enumerate()
            .map(|(i, &e)| Particle::new(ParticleId(i as u64), vec![e], e, 2))
            .collect();
        Tribe::new(TribeId(0), members).unwrap()
    }

    #[test]
    fn test_update_shaman_picks_lowest_best_error() {
        let mut tribe = tribe_with_errors(&[3.0, 1.0, 2.0]);
        tribe.members[2].best_solution.error = 0.5;

        tribe.update_shaman();

        assert_eq!(tribe.shaman_particle().unwrap().best_solution.error, 0.5);
        let errors: Vec<f64> = tribe.members.iter().map(|p| p.best_solution.error).collect();
        assert_eq!(errors, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_update_shaman_tie_keeps_earlier_member() {
        let mut tribe = tribe_with_errors(&[1.0, 1.0]);
        tribe.update_shaman();
        assert_eq!(tribe.shaman, Some(ParticleId(0)));
    }

    #[test]
    fn test_update_is_good_change_status_to_true() {
        let mut tribe = tribe_with_errors(&[10.0]);
        tribe.historical_best_error = 15.0;

        tribe.update_is_good();

        assert!(tribe.is_good);
        assert_eq!(tribe.historical_best_error, 10.0);
    }

    #[test]
    fn test_update_is_good_change_status_to_false() {
        let mut tribe = tribe_with_errors(&[15.0]);
        tribe.is_good = true;
        tribe.historical_best_error = 10.0;

        tribe.update_is_good();

        assert!(!tribe.is_good);
        assert_eq!(tribe.historical_best_error, 10.0);
    }

    #[test]
    fn test_equal_error_is_not_good() {
        let mut tribe = tribe_with_errors(&[4.0]);
        tribe.is_good = true;
        tribe.update_is_good();
        assert!(!tribe.is_good);
    }
}
