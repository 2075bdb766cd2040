//! Structural adaptation: pruning converged tribes and rescuing stagnant ones.

use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;

use crate::core::error::TribesResult;
use crate::search::{Objective, PositionSampler};

use super::particle::{Particle, ParticleFactory};
use super::population::Swarm;
use super::tribe::{Tribe, TribeId};

/// Whether enough moves have passed for the informer relationships to settle.
///
/// Each tribe contributes `members² + informers` links; the swarm adapts
/// once the move count reaches a quarter of the total.
pub fn requires_adaptation(tribes: &[Tribe], moves_since_adaptation: usize) -> bool {
    let links: usize = tribes
        .iter()
        .map(|t| t.members.len() * t.members.len() + t.informers.len())
        .sum();
    let interval = links as f64 / 4.0;
    moves_since_adaptation as f64 >= interval
}

/// What one adaptation pass changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdaptationSummary {
    /// Worst members dropped from good tribes
    pub particles_removed: usize,
    /// Single-member tribes absorbed by a better informer
    pub tribes_merged: usize,
    /// Tribes deleted because they ended up empty
    pub tribes_removed: Vec<TribeId>,
    /// Rescue tribe created for the bad tribes, if any
    pub tribe_created: Option<TribeId>,
    /// Tribes the rescue tribe was linked to
    pub bad_tribes: Vec<TribeId>,
}

impl Swarm {
    pub fn requires_adaptation(&self, moves_since_adaptation: usize) -> bool {
        requires_adaptation(&self.tribes, moves_since_adaptation)
    }

    /// Shrink a tribe by one particle, if it can spare one.
    ///
    /// A tribe with several members loses its worst one. A single-member
    /// tribe is dissolved into its best informer, but only if that informer
    /// is strictly better; the emptied tribe is left for
    /// [`Swarm::remove_empty_tribes`].
    pub fn try_remove_worst_particle(&mut self, tribe_id: TribeId) -> bool {
        let Some(tribe) = self.tribe(tribe_id) else {
            return false;
        };

        match tribe.len() {
            0 => false,
            1 => {
                let own_error = tribe.best_error();
                let absorber = tribe
                    .informers
                    .iter()
                    .filter_map(|&id| self.tribe(id))
                    .filter(|other| other.best_error() < own_error)
                    .min_by(|a, b| a.best_error().total_cmp(&b.best_error()))
                    .map(|other| other.id);

                let Some(absorber) = absorber else {
                    return false;
                };

                if let Err(e) = self.redistribute_links(tribe_id, absorber) {
                    warn!("Could not merge tribe {} into {}: {}", tribe_id, absorber, e);
                    return false;
                }
                if let Some(tribe) = self.tribe_mut(tribe_id) {
                    tribe.members.clear();
                    tribe.shaman = None;
                }
                debug!("Tribe {} merged into tribe {}", tribe_id, absorber);
                true
            }
            _ => {
                let Some(tribe) = self.tribe_mut(tribe_id) else {
                    return false;
                };
                // max_by keeps the last maximum, so walk backwards to remove the first
                let worst = tribe
                    .members
                    .iter()
                    .enumerate()
                    .rev()
                    .max_by(|(_, a), (_, b)| a.best_solution.error.total_cmp(&b.best_solution.error))
                    .map(|(i, _)| i);

                match worst {
                    Some(index) => {
                        let removed: Particle = tribe.members.remove(index);
                        tribe.update_shaman();
                        debug!(
                            "Removed particle {} (error {}) from tribe {}",
                            removed.id, removed.best_solution.error, tribe_id
                        );
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// One adaptation pass: prune good tribes, drop empty ones, and give all
    /// bad tribes a shared rescue tribe with one fresh particle per bad tribe.
    pub fn adapt<O, S, R>(
        &mut self,
        factory: &ParticleFactory<O, S>,
        rng: &mut R,
    ) -> TribesResult<AdaptationSummary>
    where
        O: Objective,
        S: PositionSampler,
        R: Rng + ?Sized,
    {
        let mut summary = AdaptationSummary::default();

        let good: Vec<(TribeId, usize)> = self
            .tribes
            .iter()
            .filter(|t| t.is_good)
            .map(|t| (t.id, t.len()))
            .collect();

        for (id, size) in good {
            if self.try_remove_worst_particle(id) {
                if size == 1 {
                    summary.tribes_merged += 1;
                } else {
                    summary.particles_removed += 1;
                }
            }
        }

        summary.tribes_removed = self.remove_empty_tribes();

        summary.bad_tribes = self
            .tribes
            .iter()
            .filter(|t| !t.is_good)
            .map(|t| t.id)
            .collect();

        if !summary.bad_tribes.is_empty() {
            let members: Vec<Particle> = summary
                .bad_tribes
                .iter()
                .map(|_| self.spawn_particle(factory, rng))
                .collect();
            let rescue = self.create_tribe(members)?;
            for &bad in &summary.bad_tribes {
                self.add_link(bad, rescue)?;
            }
            summary.tribe_created = Some(rescue);
        }

        info!(
            "Adaptation: {} particles removed, {} tribes merged, {} tribes removed, {} bad tribes{}",
            summary.particles_removed,
            summary.tribes_merged,
            summary.tribes_removed.len(),
            summary.bad_tribes.len(),
            summary
                .tribe_created
                .map(|id| format!(", rescue tribe {}", id))
                .unwrap_or_default()
        );

        Ok(summary)
    }
}
