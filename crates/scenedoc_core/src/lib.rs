//! # Scenedoc Core
//!
//! Scene document model and versioned serialization for the scenedoc
//! editor.
//!
//! This crate provides:
//! - The editable [`SceneDocument`] graph: actors, components, path links,
//!   and global scene metadata
//! - The serializer framework: signature-tagged formats dispatched through
//!   a [`SerializerRegistry`], with version evolution (old documents load
//!   with documented defaults, future versions fail fast)
//! - The [`EditorSession`]: the single owning handle for the open
//!   document, wiring the virtual file system and cancellation checkpoints
//!   into load/save
//!
//! ## Example
//!
//! ```no_run
//! use scenedoc_core::{CancelToken, EditorSession, SerializerRegistry};
//! use scenedoc_vfs::{FolderProvider, LogicalPath, VirtualFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let vfs = Arc::new(VirtualFileSystem::new());
//! let project = FolderProvider::new("project", Path::new("assets")).unwrap();
//! vfs.mount(Arc::new(project), 0);
//!
//! let mut session = EditorSession::new(vfs, SerializerRegistry::with_defaults());
//! let path = LogicalPath::parse("maps/level1.scene").unwrap();
//! let warnings = session.open_document(&path, &CancelToken::new()).unwrap();
//! for warning in warnings {
//!     eprintln!("{warning}");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod error;
mod scene;
mod serial;
mod session;

pub use cancel::CancelToken;
pub use error::{CoreError, CoreResult};
pub use scene::{
    Actor, ActorId, Component, FogKind, PathLink, PropertyMap, PropertyValue, SceneDocument,
    SceneMetadata,
};
pub use serial::{
    EngineSceneSerializer, FormatHeader, LoadOutcome, LoadWarning, SceneDocSerializer,
    SceneSerializer, SerializerDescriptor, SerializerRegistry, ENGINE_SCENE_MAX_VERSION,
    ENGINE_SCENE_MIN_VERSION, ENGINE_SCENE_SIGNATURE, SCENE_DOC_MAX_VERSION,
    SCENE_DOC_MIN_VERSION, SCENE_DOC_SIGNATURE, SIGNATURE_LEN,
};
pub use session::{ActorRef, EditorSession};
