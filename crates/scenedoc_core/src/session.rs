//! The editor session: the single owning handle for the open document.

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::scene::{Actor, ActorId, SceneDocument};
use crate::serial::{LoadWarning, SerializerRegistry, SCENE_DOC_SIGNATURE};
use scenedoc_vfs::{DocStream, LogicalPath, VirtualFileSystem};
use std::sync::Arc;

/// A non-owning reference to an actor, held by panels and other display
/// surfaces.
///
/// The reference is only valid for the document generation it was created
/// in; once the session closes or replaces its document,
/// [`EditorSession::resolve`] returns `None` for stale references instead
/// of pointing into a dead graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRef {
    generation: u64,
    id: ActorId,
}

impl ActorRef {
    /// Returns the referenced actor id.
    #[must_use]
    pub fn id(&self) -> ActorId {
        self.id
    }
}

/// Owns the open scene document and wires together the virtual file
/// system, the serializer registry, and cancellation.
///
/// There is exactly one owning handle per document: this session. Every
/// other subsystem holds [`ActorRef`]s and resolves them through the
/// session, which validates them against a generation counter bumped on
/// every open/close/replace.
pub struct EditorSession {
    vfs: Arc<VirtualFileSystem>,
    registry: SerializerRegistry,
    document: Option<SceneDocument>,
    document_path: Option<LogicalPath>,
    generation: u64,
    dirty: bool,
}

impl EditorSession {
    /// Creates a session over a VFS and a registry built at startup.
    #[must_use]
    pub fn new(vfs: Arc<VirtualFileSystem>, registry: SerializerRegistry) -> Self {
        Self {
            vfs,
            registry,
            document: None,
            document_path: None,
            generation: 0,
            dirty: false,
        }
    }

    /// Returns the VFS this session resolves paths through.
    #[must_use]
    pub fn vfs(&self) -> &Arc<VirtualFileSystem> {
        &self.vfs
    }

    /// Returns the serializer registry.
    #[must_use]
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// Returns the open document, if any.
    #[must_use]
    pub fn document(&self) -> Option<&SceneDocument> {
        self.document.as_ref()
    }

    /// Returns the open document mutably, marking the session dirty.
    pub fn document_mut(&mut self) -> Option<&mut SceneDocument> {
        let doc = self.document.as_mut();
        if doc.is_some() {
            self.dirty = true;
        }
        doc
    }

    /// Returns the path the document was loaded from or last saved to.
    #[must_use]
    pub fn document_path(&self) -> Option<&LogicalPath> {
        self.document_path.as_ref()
    }

    /// Checks whether the document has unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the current document generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the open document with a blank one.
    pub fn new_document(&mut self) {
        self.document = Some(SceneDocument::new());
        self.document_path = None;
        self.generation += 1;
        self.dirty = false;
    }

    /// Closes the open document. Outstanding [`ActorRef`]s go stale.
    pub fn close_document(&mut self) {
        self.document = None;
        self.document_path = None;
        self.generation += 1;
        self.dirty = false;
    }

    /// Loads a document from the VFS, swapping it in only on success.
    ///
    /// The stream's serializer is selected by its header signature. After
    /// the load, every asset reference in the document is resolved against
    /// the VFS; unresolved references become warnings, not failures. The
    /// returned warning list also carries anything the serializer itself
    /// recovered (dangling links, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve, no serializer
    /// matches, the payload is malformed or from a future version, or the
    /// operation is cancelled. On error the previously open document (if
    /// any) remains untouched.
    pub fn open_document(
        &mut self,
        path: &LogicalPath,
        cancel: &CancelToken,
    ) -> CoreResult<Vec<LoadWarning>> {
        cancel.checkpoint()?;

        let mut stream = self.vfs.open_read(path)?;
        let serializer = self.registry.create_for(stream.as_mut())?;
        let mut outcome = serializer.load(stream.as_mut(), cancel)?;
        stream.close()?;

        for asset in outcome.document.asset_references() {
            let resolved = matches!(
                LogicalPath::parse(&asset),
                Ok(p) if self.vfs.exists(&p)
            );
            if !resolved {
                tracing::warn!(asset = %asset, "unresolved asset reference");
                outcome
                    .warnings
                    .push(LoadWarning::UnresolvedAsset { path: asset });
            }
        }

        self.document = Some(outcome.document);
        self.document_path = Some(path.clone());
        self.generation += 1;
        self.dirty = false;
        Ok(outcome.warnings)
    }

    /// Saves the open document to a path through the VFS.
    ///
    /// The write goes through the owning provider's replace-on-close
    /// stream, so a failure at any point leaves the previous on-disk file
    /// intact.
    ///
    /// # Errors
    ///
    /// Returns `NoDocument` if nothing is open, `ReadOnlyMount` if the
    /// target cannot be written, or any serializer/stream error.
    pub fn save_document_as(
        &mut self,
        path: &LogicalPath,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        cancel.checkpoint()?;
        let document = self.document.as_ref().ok_or(CoreError::NoDocument)?;

        let serializer = self.registry.for_save(SCENE_DOC_SIGNATURE)?;
        let mut stream = self.vfs.open_write(path)?;
        serializer.save(document, stream.as_mut(), cancel)?;
        stream.close()?;

        self.document_path = Some(path.clone());
        self.dirty = false;
        Ok(())
    }

    /// Saves the open document to the path it was loaded from.
    ///
    /// # Errors
    ///
    /// Returns `NoDocumentPath` if the document has never had a path, plus
    /// everything [`save_document_as`](Self::save_document_as) can return.
    pub fn save_document(&mut self, cancel: &CancelToken) -> CoreResult<()> {
        let path = self
            .document_path
            .clone()
            .ok_or(CoreError::NoDocumentPath)?;
        self.save_document_as(&path, cancel)
    }

    /// Creates a reference to an actor in the current document.
    #[must_use]
    pub fn actor_ref(&self, id: ActorId) -> Option<ActorRef> {
        let document = self.document.as_ref()?;
        document.contains_actor(id).then_some(ActorRef {
            generation: self.generation,
            id,
        })
    }

    /// Resolves an actor reference, returning `None` when the reference is
    /// stale (from a previous generation) or the actor no longer exists.
    #[must_use]
    pub fn resolve(&self, actor_ref: &ActorRef) -> Option<&Actor> {
        if actor_ref.generation != self.generation {
            return None;
        }
        self.document.as_ref()?.actor(actor_ref.id)
    }
}
