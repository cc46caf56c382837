//! Scene: world extent plus the ordered list of placed models

use glam::UVec3;

use crate::core::{Error, Result};
use crate::voxel::VoxelGrid;
use super::flatten::CELL_BYTES;

/// World extent of a freshly created scene
pub const DEFAULT_SCENE_SIZE: UVec3 = UVec3::splat(22);

/// The world container.
///
/// Model order is meaningful: it is the UI row order and the export
/// precedence (later models overwrite earlier ones). The selection is an
/// index into the model list and is kept consistent across list edits.
#[derive(Clone, Debug)]
pub struct Scene {
    size: UVec3,
    models: Vec<VoxelGrid>,
    selected: Option<usize>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            size: DEFAULT_SCENE_SIZE,
            models: Vec::new(),
            selected: None,
        }
    }
}

impl Scene {
    /// Create an empty scene with the default extent
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scene with the given extent
    pub fn with_size(size: UVec3) -> Result<Self> {
        let mut scene = Self::default();
        scene.set_size(size)?;
        Ok(scene)
    }

    /// Target world extent used by export
    pub fn size(&self) -> UVec3 {
        self.size
    }

    /// Change the world extent.
    ///
    /// Models are not checked against the new extent; export drops whatever
    /// falls outside.
    pub fn set_size(&mut self, size: UVec3) -> Result<()> {
        if !Self::is_valid_size(size) {
            return Err(Error::InvalidSize { x: size.x, y: size.y, z: size.z });
        }
        self.size = size;
        Ok(())
    }

    /// Each axis fits the i32 file fields and the exported volume fits in memory
    pub fn is_valid_size(size: UVec3) -> bool {
        size.max_element() <= i32::MAX as u32
            && VoxelGrid::cell_count(size)
                .and_then(|n| n.checked_mul(CELL_BYTES))
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
    }

    pub fn models(&self) -> &[VoxelGrid] {
        &self.models
    }

    pub fn model(&self, index: usize) -> Option<&VoxelGrid> {
        self.models.get(index)
    }

    pub fn model_mut(&mut self, index: usize) -> Option<&mut VoxelGrid> {
        self.models.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Append a model, building its mesh. Returns its index.
    pub fn add_model(&mut self, mut model: VoxelGrid) -> usize {
        model.regenerate_mesh();
        self.models.push(model);
        self.models.len() - 1
    }

    /// Remove a model, keeping the selection pointed at the same model
    pub fn remove_model(&mut self, index: usize) -> Option<VoxelGrid> {
        if index >= self.models.len() {
            return None;
        }
        let removed = self.models.remove(index);

        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };

        Some(removed)
    }

    /// Swap a model with the one before it (earlier export precedence).
    ///
    /// Returns the model's new index, or `None` if it was already first.
    pub fn move_model_up(&mut self, index: usize) -> Option<usize> {
        if index == 0 || index >= self.models.len() {
            return None;
        }
        self.swap_models(index, index - 1);
        Some(index - 1)
    }

    /// Swap a model with the one after it (later export precedence).
    ///
    /// Returns the model's new index, or `None` if it was already last.
    pub fn move_model_down(&mut self, index: usize) -> Option<usize> {
        if index + 1 >= self.models.len() {
            return None;
        }
        self.swap_models(index, index + 1);
        Some(index + 1)
    }

    fn swap_models(&mut self, a: usize, b: usize) {
        self.models.swap(a, b);
        self.selected = self.selected.map(|s| {
            if s == a {
                b
            } else if s == b {
                a
            } else {
                s
            }
        });
    }

    /// Drop every model and the selection. The extent is kept.
    pub fn clear(&mut self) {
        self.models.clear();
        self.selected = None;
    }

    /// Select a model by index
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.models.len() {
            return Err(Error::NoSuchModel(index));
        }
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&VoxelGrid> {
        self.selected.and_then(|i| self.models.get(i))
    }

    pub fn selected_mut(&mut self) -> Option<&mut VoxelGrid> {
        self.selected.and_then(|i| self.models.get_mut(i))
    }

    /// Append already-meshed models in order (scene file load)
    pub(crate) fn append_loaded(&mut self, size: UVec3, models: Vec<VoxelGrid>) {
        self.size = size;
        self.models.extend(models);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Voxel;
    use glam::IVec3;

    fn model(name: &str) -> VoxelGrid {
        let mut grid = VoxelGrid::new(name, UVec3::ONE);
        grid.set(0, 0, 0, Voxel::rgb(1, 2, 3));
        grid
    }

    fn names(scene: &Scene) -> Vec<&str> {
        scene.models().iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_default_scene() {
        let scene = Scene::new();
        assert_eq!(scene.size(), UVec3::splat(22));
        assert!(scene.is_empty());
        assert!(scene.selected().is_none());
    }

    #[test]
    fn test_add_model_builds_mesh() {
        let mut scene = Scene::new();
        let idx = scene.add_model(model("a"));
        assert_eq!(idx, 0);
        assert_eq!(scene.model(0).unwrap().mesh().unwrap().quad_count(), 6);
    }

    #[test]
    fn test_set_size_rejects_oversized_axis() {
        let mut scene = Scene::new();
        assert!(scene.set_size(UVec3::new(1, u32::MAX, 1)).is_err());
        assert_eq!(scene.size(), UVec3::splat(22));

        scene.set_size(UVec3::new(4, 5, 6)).unwrap();
        assert_eq!(scene.size(), UVec3::new(4, 5, 6));
    }

    #[test]
    fn test_set_size_rejects_unaddressable_volume() {
        let huge = UVec3::new(1 << 22, 1 << 21, 1 << 21);
        assert!(!Scene::is_valid_size(huge));
        assert!(matches!(Scene::with_size(huge), Err(Error::InvalidSize { .. })));
        assert!(Scene::is_valid_size(UVec3::new(0, i32::MAX as u32, i32::MAX as u32)));
    }

    #[test]
    fn test_remove_adjusts_selection() {
        let mut scene = Scene::new();
        for n in ["a", "b", "c"] {
            scene.add_model(model(n));
        }

        scene.select(2).unwrap();
        scene.remove_model(0);
        assert_eq!(scene.selected().unwrap().name(), "c");

        scene.remove_model(1);
        assert!(scene.selected().is_none());
        assert_eq!(names(&scene), ["b"]);
        assert!(scene.remove_model(5).is_none());
    }

    #[test]
    fn test_reorder_follows_selection() {
        let mut scene = Scene::new();
        for n in ["a", "b", "c"] {
            scene.add_model(model(n));
        }
        scene.select(0).unwrap();

        assert_eq!(scene.move_model_down(0), Some(1));
        assert_eq!(names(&scene), ["b", "a", "c"]);
        assert_eq!(scene.selected_index(), Some(1));

        assert_eq!(scene.move_model_up(2), Some(1));
        assert_eq!(names(&scene), ["b", "c", "a"]);
        assert_eq!(scene.selected_index(), Some(2));

        assert_eq!(scene.move_model_up(0), None);
        assert_eq!(scene.move_model_down(2), None);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut scene = Scene::new();
        assert!(matches!(scene.select(0), Err(Error::NoSuchModel(0))));
    }

    #[test]
    fn test_selected_mut_moves_model() {
        let mut scene = Scene::new();
        scene.add_model(model("a"));
        scene.select(0).unwrap();
        scene.selected_mut().unwrap().translate(IVec3::new(0, 0, -1));
        assert_eq!(scene.model(0).unwrap().placement(), IVec3::new(0, 0, -1));
    }

    #[test]
    fn test_clear_keeps_size() {
        let mut scene = Scene::with_size(UVec3::new(8, 8, 8)).unwrap();
        scene.add_model(model("a"));
        scene.select(0).unwrap();
        scene.clear();
        assert!(scene.is_empty());
        assert!(scene.selected_index().is_none());
        assert_eq!(scene.size(), UVec3::splat(8));
    }
}
