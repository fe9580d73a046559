//! The in-memory scene document model.
//!
//! A [`SceneDocument`] is the root of the editable graph: an ordered list of
//! [`Actor`]s (each with zero or more [`Component`]s), named
//! [`PathLink`]s between actors, and global [`SceneMetadata`]. Serializers
//! populate and drain this model; the undo/redo command layer and the GUI
//! property layer mutate it through the same surface.

mod actor;
mod component;
mod document;
mod link;
mod metadata;
mod property;

pub use actor::{Actor, ActorId};
pub use component::Component;
pub use document::SceneDocument;
pub use link::PathLink;
pub use metadata::{FogKind, SceneMetadata};
pub use property::{PropertyMap, PropertyValue};
