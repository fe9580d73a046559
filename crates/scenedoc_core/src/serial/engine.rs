//! The engine's native scene format.

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::scene::{Actor, ActorId, FogKind, SceneDocument, SceneMetadata};
use crate::serial::wire;
use crate::serial::{FormatHeader, LoadOutcome, SceneSerializer};
use scenedoc_vfs::DocStream;

/// Signature of the native engine scene format.
pub const ENGINE_SCENE_SIGNATURE: [u8; 4] = *b"ESCN";

/// Oldest engine scene version this build can read.
pub const ENGINE_SCENE_MIN_VERSION: u16 = 1;

/// Newest engine scene version this build reads and writes.
///
/// Version history:
/// - 1: scene metadata + actor tree
/// - 2: added editor grid settings (older documents default to grid size
///   8.0 with snap off)
pub const ENGINE_SCENE_MAX_VERSION: u16 = 2;

/// Serializer for the engine's base scene data: metadata and the actor
/// tree with properties. Components and links belong to the document
/// format, which wraps this serializer.
#[derive(Debug, Clone)]
pub struct EngineSceneSerializer {
    version: u16,
}

impl EngineSceneSerializer {
    /// Creates a serializer for a specific format version.
    #[must_use]
    pub fn for_version(version: u16) -> Self {
        Self { version }
    }

    /// Returns the version this serializer reads and writes.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Writes the scene body (everything after the header).
    pub(crate) fn write_body(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        let meta = &document.metadata;
        wire::write_str(stream, &meta.name)?;
        wire::write_f32x4(stream, meta.ambient_light)?;
        wire::write_u8(stream, meta.fog_kind.as_byte())?;
        wire::write_f32x4(stream, meta.fog_color)?;
        wire::write_f32(stream, meta.fog_start)?;
        wire::write_f32(stream, meta.fog_end)?;
        wire::write_f32(stream, meta.fog_density)?;
        wire::write_bool(stream, meta.pixel_fog)?;
        wire::write_bool(stream, meta.range_fog)?;
        if self.version >= 2 {
            wire::write_f32(stream, meta.grid_size)?;
            wire::write_bool(stream, meta.grid_snap)?;
        }

        wire::write_u32(stream, document.next_id())?;

        let actors = document.actors();
        let count = u32::try_from(actors.len()).unwrap_or(u32::MAX);
        wire::write_u32(stream, count)?;
        for actor in actors {
            cancel.checkpoint()?;
            wire::write_u32(stream, actor.id.as_u32())?;
            wire::write_str(stream, &actor.name)?;
            wire::write_str(stream, &actor.kind)?;
            wire::write_property_map(stream, &actor.properties)?;
        }
        Ok(())
    }

    /// Reads the scene body into a scratch document.
    pub(crate) fn read_body(
        &self,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<SceneDocument> {
        let mut meta = SceneMetadata {
            name: wire::read_str(stream)?,
            ambient_light: wire::read_f32x4(stream)?,
            ..SceneMetadata::default()
        };
        let fog_byte = wire::read_u8(stream)?;
        meta.fog_kind = FogKind::from_byte(fog_byte)
            .ok_or_else(|| CoreError::invalid_format(format!("unknown fog kind {fog_byte}")))?;
        meta.fog_color = wire::read_f32x4(stream)?;
        meta.fog_start = wire::read_f32(stream)?;
        meta.fog_end = wire::read_f32(stream)?;
        meta.fog_density = wire::read_f32(stream)?;
        meta.pixel_fog = wire::read_bool(stream)?;
        meta.range_fog = wire::read_bool(stream)?;
        if self.version >= 2 {
            meta.grid_size = wire::read_f32(stream)?;
            meta.grid_snap = wire::read_bool(stream)?;
        }
        // version 1 documents keep the defaults for grid settings

        let next_id = wire::read_u32(stream)?;

        let mut document = SceneDocument::new();
        document.metadata = meta;

        let count = wire::read_u32(stream)?;
        for _ in 0..count {
            cancel.checkpoint()?;
            let id = ActorId::new(wire::read_u32(stream)?);
            let name = wire::read_str(stream)?;
            let kind = wire::read_str(stream)?;
            let mut actor = Actor::new(id, name, kind);
            actor.properties = wire::read_property_map(stream)?;
            document.insert_actor(actor);
        }

        document.restore_next_id(next_id);
        Ok(document)
    }

    /// Validates a consumed header against this format.
    pub(crate) fn check_header(&self, header: FormatHeader) -> CoreResult<()> {
        if header.signature != ENGINE_SCENE_SIGNATURE {
            return Err(CoreError::NoMatchingSerializer {
                signature: header.signature,
            });
        }
        if header.version > ENGINE_SCENE_MAX_VERSION {
            return Err(CoreError::FutureVersion {
                version: header.version,
                max: ENGINE_SCENE_MAX_VERSION,
            });
        }
        Ok(())
    }
}

impl SceneSerializer for EngineSceneSerializer {
    fn load(&self, stream: &mut dyn DocStream, cancel: &CancelToken) -> CoreResult<LoadOutcome> {
        let header = FormatHeader::read(stream)?;
        self.check_header(header)?;

        let reader = Self::for_version(header.version);
        let document = reader.read_body(stream, cancel)?;
        Ok(LoadOutcome {
            document,
            warnings: Vec::new(),
        })
    }

    fn save(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        FormatHeader {
            signature: ENGINE_SCENE_SIGNATURE,
            version: self.version,
        }
        .write(stream)?;
        self.write_body(document, stream, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PropertyValue;
    use scenedoc_vfs::MemoryStream;
    use std::io::SeekFrom;

    fn sample_document() -> SceneDocument {
        let mut doc = SceneDocument::new();
        doc.metadata.name = "courtyard".into();
        doc.metadata.grid_size = 4.0;
        doc.metadata.grid_snap = true;

        let id = doc.spawn_actor("crate01", "mesh");
        let actor = doc.actor_mut(id).unwrap();
        actor.set_property("position", PropertyValue::Vec3([1.0, 0.0, -2.0]));
        actor.set_property("mesh", PropertyValue::AssetRef("models/crate.mesh".into()));
        doc.spawn_actor("sun", "light");
        doc
    }

    fn save_to_bytes(serializer: &EngineSceneSerializer, doc: &SceneDocument) -> Vec<u8> {
        let mut stream = MemoryStream::new();
        serializer
            .save(doc, &mut stream, &CancelToken::new())
            .unwrap();
        stream.into_inner()
    }

    #[test]
    fn roundtrip_current_version() {
        let serializer = EngineSceneSerializer::for_version(ENGINE_SCENE_MAX_VERSION);
        let doc = sample_document();
        let bytes = save_to_bytes(&serializer, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = serializer.load(&mut stream, &CancelToken::new()).unwrap();
        assert_eq!(outcome.document, doc);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn version1_defaults_grid_settings() {
        let v1 = EngineSceneSerializer::for_version(1);
        let doc = sample_document();
        let bytes = save_to_bytes(&v1, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = v1.load(&mut stream, &CancelToken::new()).unwrap();
        // grid settings were not in v1, so documented defaults apply
        assert_eq!(outcome.document.metadata.grid_size, 8.0);
        assert!(!outcome.document.metadata.grid_snap);
        assert_eq!(outcome.document.actors(), doc.actors());
    }

    #[test]
    fn future_version_fails_fast() {
        let serializer = EngineSceneSerializer::for_version(ENGINE_SCENE_MAX_VERSION);
        let doc = sample_document();
        let mut bytes = save_to_bytes(&serializer, &doc);
        bytes[4..6].copy_from_slice(&(ENGINE_SCENE_MAX_VERSION + 1).to_le_bytes());

        let mut stream = MemoryStream::from_vec(bytes);
        assert!(matches!(
            serializer.load(&mut stream, &CancelToken::new()),
            Err(CoreError::FutureVersion { .. })
        ));
    }

    #[test]
    fn repeated_saves_are_byte_identical() {
        let serializer = EngineSceneSerializer::for_version(ENGINE_SCENE_MAX_VERSION);
        let doc = sample_document();
        assert_eq!(save_to_bytes(&serializer, &doc), save_to_bytes(&serializer, &doc));
    }

    #[test]
    fn cancellation_between_actors() {
        let serializer = EngineSceneSerializer::for_version(ENGINE_SCENE_MAX_VERSION);
        let doc = sample_document();
        let bytes = save_to_bytes(&serializer, &doc);

        let cancel = CancelToken::new();
        cancel.cancel();
        let mut stream = MemoryStream::from_vec(bytes);
        stream.seek(SeekFrom::Start(0)).unwrap();
        assert!(matches!(
            serializer.load(&mut stream, &cancel),
            Err(CoreError::Cancelled)
        ));
    }
}
