//! The editing facade: owns the entity collection, selection, bounds,
//! constraint engine and history, and routes every UI intent through a
//! mutation operator so each committed snapshot lands in history exactly
//! once. The viewport layer reads the collection and selected id but never
//! writes payloads directly.

use crate::bounds::BoundsVolume;
use crate::config::ProjectConfig;
use crate::constraint::{ConstraintEngine, TransformOutcome};
use crate::entity::{debug_assert_unique_ids, find_entity, EntityId, SceneEntity};
use crate::error::EditError;
use crate::export;
use crate::history::History;
use crate::import;
use crate::lights::{derive_lights, LightDescriptor};
use crate::node::{TransformAxis, TransformField};
use crate::ops;
use std::path::Path;

pub struct SceneEditor {
    objects: Vec<SceneEntity>,
    selected: Option<EntityId>,
    bounds: BoundsVolume,
    constraints: ConstraintEngine,
    history: History,
}

impl SceneEditor {
    pub fn new(config: &ProjectConfig) -> Self {
        let mut editor = Self {
            objects: Vec::new(),
            selected: None,
            bounds: config.bounds_volume(),
            constraints: ConstraintEngine::new(),
            history: History::new(),
        };
        // The empty scene is the first history record, so the very first
        // edit can be undone back to it.
        editor.history.record(&editor.objects);
        editor
    }

    pub fn objects(&self) -> &[SceneEntity] {
        &self.objects
    }

    pub fn bounds(&self) -> BoundsVolume {
        self.bounds
    }

    pub fn selected_id(&self) -> Option<EntityId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&SceneEntity> {
        self.selected.as_ref().and_then(|id| find_entity(&self.objects, id))
    }

    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected = id.filter(|id| find_entity(&self.objects, id).is_some());
        self.reseed_selected();
    }

    /// Refresh the selected entity's revert target from its live transform.
    /// Runs on selection change and after history navigation, so a drag
    /// started next never reverts to a position from a discarded timeline.
    fn reseed_selected(&mut self) {
        if let Some(entity) = self.selected.as_ref().and_then(|id| find_entity(&self.objects, id)) {
            self.constraints.remember(entity);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit(&mut self, next: Vec<SceneEntity>) {
        debug_assert_unique_ids(&next);
        self.objects = next;
        self.history.record(&self.objects);
    }

    fn spawn(&mut self, entity: SceneEntity) -> EntityId {
        let id = entity.id;
        self.constraints.remember(&entity);
        let mut next = self.objects.clone();
        next.push(entity);
        self.commit(next);
        id
    }

    pub fn add_cube(&mut self) -> EntityId {
        self.spawn(ops::create_cube())
    }

    pub fn add_sphere(&mut self) -> EntityId {
        self.spawn(ops::create_sphere())
    }

    pub fn add_light(&mut self) -> EntityId {
        self.spawn(ops::create_light())
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete_entity(&id),
            None => false,
        }
    }

    pub fn delete_entity(&mut self, id: &EntityId) -> bool {
        if find_entity(&self.objects, id).is_none() {
            return false;
        }
        let next = ops::delete_entity(&self.objects, Some(id));
        self.constraints.prune(id);
        if self.selected == Some(*id) {
            self.selected = None;
        }
        self.commit(next);
        true
    }

    pub fn rename(&mut self, id: &EntityId, name: &str) -> bool {
        if find_entity(&self.objects, id).is_none() {
            return false;
        }
        let next = ops::rename_entity(&self.objects, id, name);
        self.commit(next);
        true
    }

    pub fn recolor(&mut self, id: &EntityId, color: [f32; 4]) -> bool {
        if find_entity(&self.objects, id).is_none() {
            return false;
        }
        let next = ops::recolor_entity(&self.objects, id, color);
        self.commit(next);
        true
    }

    /// Bind decoded image bytes (or clear with `None`). A decode failure
    /// leaves collection and history untouched.
    pub fn set_texture(&mut self, id: &EntityId, bytes: Option<&[u8]>) -> Result<bool, EditError> {
        if find_entity(&self.objects, id).is_none() {
            return Ok(false);
        }
        let next = ops::apply_texture(&self.objects, id, bytes)?;
        self.commit(next);
        Ok(true)
    }

    pub fn set_light_intensity(&mut self, id: &EntityId, intensity: f32) -> bool {
        let is_light = find_entity(&self.objects, id).map(|e| e.light.is_some()).unwrap_or(false);
        if !is_light {
            return false;
        }
        let next = ops::set_light_intensity(&self.objects, id, intensity);
        self.commit(next);
        true
    }

    pub fn set_light_color(&mut self, id: &EntityId, color: [f32; 3]) -> bool {
        let is_light = find_entity(&self.objects, id).map(|e| e.light.is_some()).unwrap_or(false);
        if !is_light {
            return false;
        }
        let next = ops::set_light_color(&self.objects, id, color);
        self.commit(next);
        true
    }

    /// Apply a single-axis transform edit through the constraint engine.
    ///
    /// A committed candidate becomes the live collection and a history
    /// record; a reverted one is dropped wholesale, leaving the last valid
    /// state standing — the self-healing no-op of the constraint contract.
    pub fn set_transform(
        &mut self,
        id: &EntityId,
        field: TransformField,
        axis: TransformAxis,
        value: f32,
    ) -> TransformOutcome {
        if find_entity(&self.objects, id).is_none() {
            return TransformOutcome::Reverted;
        }
        let mut candidate = ops::set_transform(&self.objects, id, field, axis, value);
        match self.constraints.enforce(&mut candidate, id, &self.bounds) {
            TransformOutcome::Committed => {
                self.commit(candidate);
                TransformOutcome::Committed
            }
            TransformOutcome::Reverted => TransformOutcome::Reverted,
        }
    }

    /// Step back one snapshot. Returns `false` at the start of history —
    /// selection and collection stay as they are.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.objects = snapshot;
        // The collection changed, which normally records; the navigation
        // guard armed by undo swallows exactly this one.
        let recorded = self.history.record(&self.objects);
        debug_assert!(!recorded);
        self.selected = self.selected.filter(|id| find_entity(&self.objects, id).is_some());
        self.reseed_selected();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.objects = snapshot;
        let recorded = self.history.record(&self.objects);
        debug_assert!(!recorded);
        self.selected = self.selected.filter(|id| find_entity(&self.objects, id).is_some());
        self.reseed_selected();
        true
    }

    fn append_imported(&mut self, imported: Vec<SceneEntity>) -> Vec<EntityId> {
        let ids: Vec<EntityId> = imported.iter().map(|entity| entity.id).collect();
        if imported.is_empty() {
            return ids;
        }
        for entity in &imported {
            self.constraints.remember(entity);
        }
        let mut next = self.objects.clone();
        next.extend(imported);
        self.commit(next);
        ids
    }

    /// Import an interchange payload from memory and append the resulting
    /// entities. Failures leave collection and history unchanged; imports
    /// racing each other simply append in completion order.
    pub fn import_slice(&mut self, bytes: &[u8], source_name: &str) -> Result<Vec<EntityId>, EditError> {
        let imported = import::import_from_slice(bytes, source_name)?;
        Ok(self.append_imported(imported))
    }

    pub fn import_path(&mut self, path: impl AsRef<Path>) -> Result<Vec<EntityId>, EditError> {
        let imported = import::import_from_path(path)?;
        Ok(self.append_imported(imported))
    }

    pub fn import_url(
        &mut self,
        url: &str,
        progress: impl FnMut(f32),
    ) -> Result<Vec<EntityId>, EditError> {
        let imported = import::import_from_url(url, progress)?;
        Ok(self.append_imported(imported))
    }

    pub fn export_glb(&self) -> Result<Vec<u8>, EditError> {
        export::export_glb(&self.objects)
    }

    pub fn export_gltf_json(&self) -> Result<Vec<u8>, EditError> {
        export::export_gltf_json(&self.objects)
    }

    pub fn lights(&self) -> Vec<LightDescriptor> {
        derive_lights(&self.objects)
    }
}
