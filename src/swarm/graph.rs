//! Symmetric informer links between tribes.
//!
//! Every mutation here updates both endpoints in one pass, so the relation
//! stays symmetric after each call.

use log::debug;

use crate::core::error::{TribesError, TribesResult};

use super::population::Swarm;
use super::tribe::TribeId;

impl Swarm {
    /// Link `tribe` and `other` in both directions.
    ///
    /// Returns `Ok(false)` when nothing changed: `other == tribe` or the two
    /// are already linked. Unknown ids are rejected.
    pub fn add_link(&mut self, tribe: TribeId, other: TribeId) -> TribesResult<bool> {
        for id in [tribe, other] {
            if !self.contains(id) {
                return Err(TribesError::InvalidInformer(id));
            }
        }
        if tribe == other {
            return Ok(false);
        }
        Ok(self.link_pair(tribe, other))
    }

    /// Remove the link between `a` and `b` on both sides; no-op when absent
    pub fn remove_link(&mut self, a: TribeId, b: TribeId) -> bool {
        let mut changed = false;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(tribe) = self.tribe_mut(from) {
                let before = tribe.informers.len();
                tribe.informers.retain(|&id| id != to);
                changed |= tribe.informers.len() != before;
            }
        }
        changed
    }

    /// Hand every link of `source` over to `destination`, leaving `source` isolated
    pub fn redistribute_links(&mut self, source: TribeId, destination: TribeId) -> TribesResult<()> {
        for id in [source, destination] {
            if !self.contains(id) {
                return Err(TribesError::InvalidInformer(id));
            }
        }

        let informers = self
            .tribe_mut(source)
            .map(|t| std::mem::take(&mut t.informers))
            .unwrap_or_default();

        debug!(
            "Redistributing {} links from tribe {} to tribe {}",
            informers.len(),
            source,
            destination
        );

        for informer in informers {
            if let Some(tribe) = self.tribe_mut(informer) {
                tribe.informers.retain(|&id| id != source);
            }
            if informer != destination && informer != source {
                self.link_pair(informer, destination);
            }
        }

        Ok(())
    }

    /// Drop every link touching `id`
    pub fn unlink_all(&mut self, id: TribeId) {
        if let Some(tribe) = self.tribe_mut(id) {
            tribe.informers.clear();
        }
        for tribe in &mut self.tribes {
            tribe.informers.retain(|&other| other != id);
        }
    }

    pub fn are_linked(&self, a: TribeId, b: TribeId) -> bool {
        self.tribe(a).is_some_and(|t| t.is_informed_by(b))
            && self.tribe(b).is_some_and(|t| t.is_informed_by(a))
    }

    /// Whether every informer link has its mirror and points at a live tribe
    pub fn is_graph_consistent(&self) -> bool {
        self.tribes.iter().all(|tribe| {
            tribe.informers.iter().all(|&other| {
                other != tribe.id
                    && self.tribe(other).is_some_and(|t| t.is_informed_by(tribe.id))
            })
        })
    }

    /// Total number of directed informer entries, i.e. twice the link count
    pub fn informer_entries(&self) -> usize {
        self.tribes.iter().map(|t| t.informers.len()).sum()
    }

    fn link_pair(&mut self, a: TribeId, b: TribeId) -> bool {
        let mut changed = false;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(tribe) = self.tribe_mut(from) {
                if !tribe.is_informed_by(to) {
                    tribe.informers.push(to);
                    changed = true;
                }
            }
        }
        if changed {
            debug!("Linked tribes {} and {}", a, b);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::Particle;

    fn swarm_with_tribes(n: usize) -> (Swarm, Vec<TribeId>) {
        let mut swarm = Swarm::new();
        let ids = (0..n)
            .map(|i| {
                let pid = swarm.allocate_particle_id();
                swarm
                    .create_tribe(vec![Particle::new(pid, vec![i as f64], i as f64, 2)])
                    .unwrap()
            })
            .collect();
        (swarm, ids)
    }

    #[test]
    fn test_add_link_is_symmetric() {
        let (mut swarm, ids) = swarm_with_tribes(2);

        assert!(swarm.add_link(ids[0], ids[1]).unwrap());

        assert_eq!(swarm.tribe(ids[0]).unwrap().informers, vec![ids[1]]);
        assert_eq!(swarm.tribe(ids[1]).unwrap().informers, vec![ids[0]]);
    }

    #[test]
    fn test_add_link_is_idempotent() {
        let (mut swarm, ids) = swarm_with_tribes(2);

        assert!(swarm.add_link(ids[0], ids[1]).unwrap());
        assert!(!swarm.add_link(ids[0], ids[1]).unwrap());
        assert!(!swarm.add_link(ids[1], ids[0]).unwrap());

        assert_eq!(swarm.informer_entries(), 2);
    }

    #[test]
    fn test_add_link_to_self_is_ignored() {
        let (mut swarm, ids) = swarm_with_tribes(1);
        assert!(!swarm.add_link(ids[0], ids[0]).unwrap());
        assert!(swarm.tribe(ids[0]).unwrap().informers.is_empty());
    }

    #[test]
    fn test_add_link_to_unknown_tribe_fails() {
        let (mut swarm, ids) = swarm_with_tribes(1);
        let result = swarm.add_link(ids[0], TribeId(99));
        assert!(matches!(result, Err(TribesError::InvalidInformer(TribeId(99)))));
        assert!(swarm.tribe(ids[0]).unwrap().informers.is_empty());
    }

    #[test]
    fn test_add_link_appends_to_existing_informers() {
        let (mut swarm, ids) = swarm_with_tribes(3);
        swarm.add_link(ids[0], ids[1]).unwrap();
        swarm.add_link(ids[0], ids[2]).unwrap();
        assert_eq!(swarm.tribe(ids[0]).unwrap().informers.len(), 2);
    }

    #[test]
    fn test_redistribute_links_onto_own_informer() {
        let (mut swarm, ids) = swarm_with_tribes(2);
        swarm.add_link(ids[0], ids[1]).unwrap();

        swarm.redistribute_links(ids[0], ids[1]).unwrap();

        assert!(swarm.tribe(ids[0]).unwrap().informers.is_empty());
        assert!(swarm.tribe(ids[1]).unwrap().informers.is_empty());
        assert!(swarm.is_graph_consistent());
    }

    #[test]
    fn test_redistribute_links_moves_every_neighbour() {
        let (mut swarm, ids) = swarm_with_tribes(4);
        let (a, b, t1, t2) = (ids[0], ids[1], ids[2], ids[3]);
        swarm.add_link(a, t1).unwrap();
        swarm.add_link(a, t2).unwrap();
        swarm.add_link(a, b).unwrap();

        swarm.redistribute_links(a, b).unwrap();

        assert!(swarm.tribe(a).unwrap().informers.is_empty());
        assert!(swarm.are_linked(b, t1));
        assert!(swarm.are_linked(b, t2));
        assert!(!swarm.are_linked(a, b));
        assert!(swarm.is_graph_consistent());
    }

    #[test]
    fn test_remove_link_clears_both_sides() {
        let (mut swarm, ids) = swarm_with_tribes(2);
        swarm.add_link(ids[0], ids[1]).unwrap();

        assert!(swarm.remove_link(ids[1], ids[0]));
        assert!(!swarm.remove_link(ids[1], ids[0]));
        assert_eq!(swarm.informer_entries(), 0);
    }

    #[test]
    fn test_unlink_all_isolates_tribe() {
        let (mut swarm, ids) = swarm_with_tribes(3);
        swarm.add_link(ids[0], ids[1]).unwrap();
        swarm.add_link(ids[0], ids[2]).unwrap();
        swarm.add_link(ids[1], ids[2]).unwrap();

        swarm.unlink_all(ids[0]);

        assert!(swarm.tribe(ids[0]).unwrap().informers.is_empty());
        assert!(swarm.are_linked(ids[1], ids[2]));
        assert_eq!(swarm.informer_entries(), 2);
    }
}
