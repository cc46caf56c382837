//! Scene composition, persistence and export

pub mod config;
pub mod flatten;
pub mod material;
pub mod scene;
pub mod store;

pub use config::SceneConfig;
pub use flatten::{export_file, export_merged, flatten_scene, MaterializedCell, MaterializedVolume, EXPORT_EXTENSION};
pub use material::{MaterialCatalog, MATERIAL_EXTENSION};
pub use scene::{Scene, DEFAULT_SCENE_SIZE};
pub use store::{load_scene, load_scene_file, save_scene, save_scene_file, SCENE_EXTENSION};
