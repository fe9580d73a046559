//! The editor document format: engine scene data plus components and links.

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::scene::{ActorId, Component, PathLink, SceneDocument};
use crate::serial::engine::EngineSceneSerializer;
use crate::serial::wire;
use crate::serial::{FormatHeader, LoadOutcome, LoadWarning, SceneSerializer};
use scenedoc_vfs::DocStream;

/// Signature of the editor document format.
pub const SCENE_DOC_SIGNATURE: [u8; 4] = *b"SDOC";

/// Oldest document version this build can read.
pub const SCENE_DOC_MIN_VERSION: u16 = 1;

/// Newest document version this build reads and writes.
///
/// Version history:
/// - 1: engine scene body only
/// - 2: added per-actor components (older documents load with none)
/// - 3: added path links (older documents load with none)
pub const SCENE_DOC_MAX_VERSION: u16 = 3;

/// Serializer for the editor's own document format.
///
/// The document format is a superset of the engine scene format: it wraps
/// an [`EngineSceneSerializer`] for the base payload and appends component
/// and link sections after it. Composition keeps the base format owned by
/// one place - this type never re-implements the engine layout.
#[derive(Debug, Clone)]
pub struct SceneDocSerializer {
    version: u16,
    base: EngineSceneSerializer,
}

impl SceneDocSerializer {
    /// Creates a serializer for a specific document version.
    #[must_use]
    pub fn for_version(version: u16) -> Self {
        // v1 predates the grid settings that arrived with engine scene v2.
        let base_version = if version >= 2 { 2 } else { 1 };
        Self {
            version,
            base: EngineSceneSerializer::for_version(base_version),
        }
    }

    /// Returns the version this serializer reads and writes.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    fn read_components(
        &self,
        document: &mut SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        let actor_count = wire::read_u32(stream)?;
        for _ in 0..actor_count {
            cancel.checkpoint()?;
            let id = ActorId::new(wire::read_u32(stream)?);
            let component_count = wire::read_u32(stream)?;

            let actor = document
                .actor_mut(id)
                .ok_or_else(|| CoreError::invalid_format(format!("components for unknown {id}")))?;
            for _ in 0..component_count {
                let kind = wire::read_str(stream)?;
                let mut component = Component::new(kind);
                component.properties = wire::read_property_map(stream)?;
                actor.add_component(component);
            }
        }
        Ok(())
    }

    fn write_components(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        let carriers: Vec<_> = document
            .actors()
            .iter()
            .filter(|a| !a.components.is_empty())
            .collect();
        let count = u32::try_from(carriers.len()).unwrap_or(u32::MAX);
        wire::write_u32(stream, count)?;

        for actor in carriers {
            cancel.checkpoint()?;
            wire::write_u32(stream, actor.id.as_u32())?;
            let component_count = u32::try_from(actor.components.len()).unwrap_or(u32::MAX);
            wire::write_u32(stream, component_count)?;
            for component in &actor.components {
                wire::write_str(stream, &component.kind)?;
                wire::write_property_map(stream, &component.properties)?;
            }
        }
        Ok(())
    }

    fn read_links(
        &self,
        document: &mut SceneDocument,
        stream: &mut dyn DocStream,
        warnings: &mut Vec<LoadWarning>,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        let count = wire::read_u32(stream)?;
        for _ in 0..count {
            cancel.checkpoint()?;
            let name = wire::read_str(stream)?;
            let from = ActorId::new(wire::read_u32(stream)?);
            let to = ActorId::new(wire::read_u32(stream)?);

            if document.contains_actor(from) && document.contains_actor(to) {
                document.insert_link(PathLink::new(name, from, to));
            } else {
                // Dangling links are dropped, not fatal: an actor deleted
                // before the last save leaves its links behind in the file.
                tracing::warn!(link = %name, %from, %to, "dropping dangling path link");
                warnings.push(LoadWarning::DanglingLink { name, from, to });
            }
        }
        Ok(())
    }

    fn write_links(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
    ) -> CoreResult<()> {
        let links = document.links();
        let count = u32::try_from(links.len()).unwrap_or(u32::MAX);
        wire::write_u32(stream, count)?;
        for link in links {
            wire::write_str(stream, &link.name)?;
            wire::write_u32(stream, link.from.as_u32())?;
            wire::write_u32(stream, link.to.as_u32())?;
        }
        Ok(())
    }
}

impl SceneSerializer for SceneDocSerializer {
    fn load(&self, stream: &mut dyn DocStream, cancel: &CancelToken) -> CoreResult<LoadOutcome> {
        let header = FormatHeader::read(stream)?;
        if header.signature != SCENE_DOC_SIGNATURE {
            return Err(CoreError::NoMatchingSerializer {
                signature: header.signature,
            });
        }
        if header.version > SCENE_DOC_MAX_VERSION {
            return Err(CoreError::FutureVersion {
                version: header.version,
                max: SCENE_DOC_MAX_VERSION,
            });
        }

        // Build into a scratch document; nothing escapes on error.
        let reader = Self::for_version(header.version);
        let mut document = reader.base.read_body(stream, cancel)?;
        let mut warnings = Vec::new();

        if header.version >= 2 {
            reader.read_components(&mut document, stream, cancel)?;
        }
        if header.version >= 3 {
            reader.read_links(&mut document, stream, &mut warnings, cancel)?;
        }

        Ok(LoadOutcome { document, warnings })
    }

    fn save(
        &self,
        document: &SceneDocument,
        stream: &mut dyn DocStream,
        cancel: &CancelToken,
    ) -> CoreResult<()> {
        FormatHeader {
            signature: SCENE_DOC_SIGNATURE,
            version: self.version,
        }
        .write(stream)?;

        self.base.write_body(document, stream, cancel)?;
        if self.version >= 2 {
            self.write_components(document, stream, cancel)?;
        }
        if self.version >= 3 {
            self.write_links(document, stream)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PropertyValue;
    use scenedoc_vfs::MemoryStream;

    fn sample_document() -> SceneDocument {
        let mut doc = SceneDocument::new();
        doc.metadata.name = "dock".into();

        let a = doc.spawn_actor("waypoint_a", "path");
        let b = doc.spawn_actor("waypoint_b", "path");
        let door = doc.spawn_actor("door01", "mesh");

        let actor = doc.actor_mut(door).unwrap();
        actor.set_property("mesh", PropertyValue::AssetRef("models/door.mesh".into()));
        let mut script = Component::new("script");
        script.set_property("source", PropertyValue::AssetRef("scripts/door.lua".into()));
        actor.add_component(script);

        doc.add_link("patrol", a, b).unwrap();
        doc
    }

    fn save_to_bytes(serializer: &SceneDocSerializer, doc: &SceneDocument) -> Vec<u8> {
        let mut stream = MemoryStream::new();
        serializer
            .save(doc, &mut stream, &CancelToken::new())
            .unwrap();
        stream.into_inner()
    }

    #[test]
    fn roundtrip_current_version() {
        let serializer = SceneDocSerializer::for_version(SCENE_DOC_MAX_VERSION);
        let doc = sample_document();
        let bytes = save_to_bytes(&serializer, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = serializer.load(&mut stream, &CancelToken::new()).unwrap();
        assert_eq!(outcome.document, doc);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn dangling_link_dropped_with_warning() {
        let mut doc = sample_document();
        let victim = doc.actor_by_name("waypoint_b").unwrap().id;
        doc.remove_actor(victim).unwrap();
        // the stale link is still in the document and gets saved
        assert_eq!(doc.links().len(), 1);

        let serializer = SceneDocSerializer::for_version(SCENE_DOC_MAX_VERSION);
        let bytes = save_to_bytes(&serializer, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = serializer.load(&mut stream, &CancelToken::new()).unwrap();
        assert!(outcome.document.links().is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            LoadWarning::DanglingLink { name, .. } if name == "patrol"
        ));
        // the rest of the graph loaded normally
        assert_eq!(outcome.document.actors().len(), 2);
    }

    #[test]
    fn version1_loads_without_components_or_links() {
        let v1 = SceneDocSerializer::for_version(1);
        let doc = sample_document();
        let bytes = save_to_bytes(&v1, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = v1.load(&mut stream, &CancelToken::new()).unwrap();
        assert!(outcome.document.links().is_empty());
        assert!(outcome
            .document
            .actors()
            .iter()
            .all(|a| a.components.is_empty()));
    }

    #[test]
    fn version2_loads_components_but_no_links() {
        let v2 = SceneDocSerializer::for_version(2);
        let doc = sample_document();
        let bytes = save_to_bytes(&v2, &doc);

        let mut stream = MemoryStream::from_vec(bytes);
        let outcome = v2.load(&mut stream, &CancelToken::new()).unwrap();
        assert!(outcome.document.links().is_empty());
        let door = outcome.document.actor_by_name("door01").unwrap();
        assert_eq!(door.components.len(), 1);
    }

    #[test]
    fn future_version_produces_no_partial_document() {
        let serializer = SceneDocSerializer::for_version(SCENE_DOC_MAX_VERSION);
        let doc = sample_document();
        let mut bytes = save_to_bytes(&serializer, &doc);
        bytes[4..6].copy_from_slice(&(SCENE_DOC_MAX_VERSION + 1).to_le_bytes());

        let mut stream = MemoryStream::from_vec(bytes);
        let result = serializer.load(&mut stream, &CancelToken::new());
        assert!(matches!(result, Err(CoreError::FutureVersion { .. })));
    }

    #[test]
    fn repeated_saves_are_byte_identical() {
        let serializer = SceneDocSerializer::for_version(SCENE_DOC_MAX_VERSION);
        let doc = sample_document();
        assert_eq!(save_to_bytes(&serializer, &doc), save_to_bytes(&serializer, &doc));
    }

    #[test]
    fn truncated_component_section_fails_cleanly() {
        let serializer = SceneDocSerializer::for_version(SCENE_DOC_MAX_VERSION);
        let doc = sample_document();
        let mut bytes = save_to_bytes(&serializer, &doc);
        bytes.truncate(bytes.len() - 10);

        let mut stream = MemoryStream::from_vec(bytes);
        let result = serializer.load(&mut stream, &CancelToken::new());
        assert!(result.is_err());
    }
}
