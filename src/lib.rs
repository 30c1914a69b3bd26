//! Floorplan - Gaming-floor layout editor
//! Machines, zones and doors on a snapped, overlap-aware stage, persisted as one JSON value

pub mod catalog;
pub mod codec;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod plan;
pub mod resolver;

pub use catalog::{Catalog, FormField, JsonField, PlanBinding};
pub use codec::{deserialize, serialize};
pub use config::EditorConfig;
pub use editor::{Editor, Effect};
pub use plan::*;
