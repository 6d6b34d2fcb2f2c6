pub mod animation;
pub mod bounds;
pub mod config;
pub mod constraint;
pub mod editor;
pub mod entity;
pub mod error;
pub mod export;
pub mod history;
pub mod import;
pub mod lights;
pub mod material;
pub mod mesh;
pub mod node;
pub mod ops;
pub mod remote;

pub use bounds::{Aabb, BoundsVolume};
pub use config::ProjectConfig;
pub use constraint::{ConstraintEngine, TransformOutcome, ROOM_SHELL_NAME};
pub use editor::SceneEditor;
pub use entity::{EntityId, LightParams, SceneEntity};
pub use error::EditError;
pub use history::History;
pub use lights::LightDescriptor;
pub use node::{SceneNode, Transform, TransformAxis, TransformField};
