//! Interactive transform constraints: bounds containment by per-axis clamp
//! and pairwise non-overlap by strict revert. Runs synchronously on every
//! transform update, so drag-style interaction never exposes a
//! constraint-violating state between calls.

use crate::bounds::BoundsVolume;
use crate::entity::{EntityId, SceneEntity};
use crate::node::Transform;
use std::collections::HashMap;

/// The enclosing room shell is the one entity allowed to overlap others —
/// everything else lives inside it.
pub const ROOM_SHELL_NAME: &str = "Room";

/// Result of running a candidate transform through the engine. A revert is
/// not an error: the caller simply drops the candidate and the previous
/// committed state stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    Committed,
    Reverted,
}

/// Owns the per-entity last-valid-transform memory. Entries are seeded when
/// an entity enters the collection, updated only on successful commits, and
/// pruned on delete — never refreshed mid-drag, or the revert target would
/// chase the cursor into the overlap.
#[derive(Debug, Default)]
pub struct ConstraintEngine {
    last_valid: HashMap<EntityId, Transform>,
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the revert target for an entity entering the collection.
    pub fn remember(&mut self, entity: &SceneEntity) {
        self.last_valid.insert(entity.id, entity.node.transform);
    }

    pub fn prune(&mut self, id: &EntityId) {
        self.last_valid.remove(id);
    }

    pub fn last_valid(&self, id: &EntityId) -> Option<Transform> {
        self.last_valid.get(id).copied()
    }

    /// Enforce both invariants on the candidate collection, in place.
    ///
    /// 1. Clamp each position axis so the entity's AABB stays inside the
    ///    bounds volume (a slide along the wall, not a rejection).
    /// 2. Test the clamped AABB against every other entity except the room
    ///    shell; any overlap restores the last-valid transform wholesale.
    ///
    /// The shell itself only gets clamped — it defines the interior, so
    /// overlap with its contents is expected.
    pub fn enforce(
        &mut self,
        entities: &mut [SceneEntity],
        id: &EntityId,
        bounds: &BoundsVolume,
    ) -> TransformOutcome {
        let Some(index) = entities.iter().position(|entity| entity.id == *id) else {
            return TransformOutcome::Reverted;
        };

        let half_extents = match entities[index].world_aabb() {
            Some(aabb) => aabb.half_extents(),
            None => glam::Vec3::ZERO,
        };
        let position = entities[index].node.transform.position;
        entities[index].node.transform.position = bounds.clamp_position(position, half_extents);

        let is_shell = entities[index].name == ROOM_SHELL_NAME;
        if !is_shell {
            if let Some(moved) = entities[index].world_aabb() {
                if !moved.is_degenerate() {
                    let overlapping = entities.iter().enumerate().any(|(other_index, other)| {
                        if other_index == index || other.name == ROOM_SHELL_NAME {
                            return false;
                        }
                        other
                            .world_aabb()
                            .map(|other_aabb| !other_aabb.is_degenerate() && moved.intersects(&other_aabb))
                            .unwrap_or(false)
                    });
                    if overlapping {
                        if let Some(last) = self.last_valid.get(id) {
                            entities[index].node.transform = *last;
                        }
                        log::debug!("[constraint] transform on {id} overlaps, reverting");
                        return TransformOutcome::Reverted;
                    }
                }
            }
        }

        self.last_valid.insert(*id, entities[index].node.transform);
        TransformOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops;
    use glam::Vec3;

    fn cube_at(position: Vec3) -> SceneEntity {
        let mut cube = ops::create_cube();
        cube.node.transform.position = position;
        cube
    }

    fn bounds() -> BoundsVolume {
        BoundsVolume::from_dimensions(10.0, 10.0, 2.8)
    }

    #[test]
    fn clamp_projects_axis_into_bounds() {
        let mut engine = ConstraintEngine::new();
        let mut entities = vec![cube_at(Vec3::new(0.5, 0.5, 0.5))];
        let id = entities[0].id;
        engine.remember(&entities[0]);

        entities[0].node.transform.position.x = 20.0;
        let outcome = engine.enforce(&mut entities, &id, &bounds());
        assert_eq!(outcome, TransformOutcome::Committed);
        assert!((entities[0].node.transform.position.x - 4.5).abs() < 1e-5);
        assert_eq!(entities[0].node.transform.position.y, 0.5);
    }

    #[test]
    fn overlap_reverts_to_last_valid_transform() {
        let mut engine = ConstraintEngine::new();
        let mut entities = vec![cube_at(Vec3::new(0.5, 0.5, 0.5)), cube_at(Vec3::new(3.0, 0.5, 0.5))];
        let id = entities[1].id;
        engine.remember(&entities[0]);
        engine.remember(&entities[1]);

        entities[1].node.transform.position = Vec3::new(0.5, 0.5, 0.5);
        let outcome = engine.enforce(&mut entities, &id, &bounds());
        assert_eq!(outcome, TransformOutcome::Reverted);
        assert_eq!(entities[1].node.transform.position, Vec3::new(3.0, 0.5, 0.5));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn room_shell_overlaps_contents_freely() {
        let mut engine = ConstraintEngine::new();
        let mut shell = cube_at(Vec3::new(0.0, 0.5, 0.0));
        shell.name = ROOM_SHELL_NAME.to_string();
        let mut entities = vec![shell, cube_at(Vec3::new(0.2, 0.5, 0.0))];
        let id = entities[0].id;
        engine.remember(&entities[0]);
        engine.remember(&entities[1]);

        let outcome = engine.enforce(&mut entities, &id, &bounds());
        assert_eq!(outcome, TransformOutcome::Committed);
    }

    #[test]
    fn shell_is_exempt_as_a_collider_too() {
        let mut engine = ConstraintEngine::new();
        let mut shell = cube_at(Vec3::new(0.0, 0.5, 0.0));
        shell.name = ROOM_SHELL_NAME.to_string();
        let mover = cube_at(Vec3::new(3.0, 0.5, 0.0));
        let id = mover.id;
        let mut entities = vec![shell, mover];
        engine.remember(&entities[1]);

        // Moving inside the shell's box must not trigger a revert.
        entities[1].node.transform.position = Vec3::new(0.4, 0.5, 0.0);
        let outcome = engine.enforce(&mut entities, &id, &bounds());
        assert_eq!(outcome, TransformOutcome::Committed);
        assert_eq!(entities[1].node.transform.position, Vec3::new(0.4, 0.5, 0.0));
    }

    #[test]
    fn geometry_less_entity_only_clamps() {
        let mut engine = ConstraintEngine::new();
        let mut empty = SceneEntity::new("Empty", crate::node::SceneNode::new("Empty"));
        empty.node.transform.position = Vec3::new(50.0, 1.0, 0.0);
        let id = empty.id;
        let mut entities = vec![empty, cube_at(Vec3::new(0.5, 0.5, 0.5))];
        engine.remember(&entities[0]);

        let outcome = engine.enforce(&mut entities, &id, &bounds());
        assert_eq!(outcome, TransformOutcome::Committed);
        assert_eq!(entities[0].node.transform.position.x, 5.0);
    }

    #[test]
    fn prune_drops_revert_memory() {
        let mut engine = ConstraintEngine::new();
        let cube = cube_at(Vec3::ZERO);
        engine.remember(&cube);
        assert!(engine.last_valid(&cube.id).is_some());
        engine.prune(&cube.id);
        assert!(engine.last_valid(&cube.id).is_none());
    }
}
