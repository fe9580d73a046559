//! Serializer registration and dispatch.

use crate::error::{CoreError, CoreResult};
use crate::serial::document::{
    SceneDocSerializer, SCENE_DOC_MAX_VERSION, SCENE_DOC_MIN_VERSION, SCENE_DOC_SIGNATURE,
};
use crate::serial::engine::{
    EngineSceneSerializer, ENGINE_SCENE_MAX_VERSION, ENGINE_SCENE_MIN_VERSION,
    ENGINE_SCENE_SIGNATURE,
};
use crate::serial::{FormatHeader, SceneSerializer};
use scenedoc_vfs::DocStream;

/// Registration record for one (format, version range) pair.
#[derive(Clone)]
pub struct SerializerDescriptor {
    /// Format signature this descriptor matches.
    pub signature: [u8; 4],
    /// Oldest version the serializer can read.
    pub min_version: u16,
    /// Newest version the serializer can read and the version it writes.
    pub max_version: u16,
    /// Builds a serializer configured for a concrete version.
    pub build: fn(u16) -> Box<dyn SceneSerializer>,
}

impl std::fmt::Debug for SerializerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerDescriptor")
            .field("signature", &self.signature)
            .field("min_version", &self.min_version)
            .field("max_version", &self.max_version)
            .finish_non_exhaustive()
    }
}

/// Registry of serializer descriptors.
///
/// Built once at startup and passed by reference to whatever needs format
/// dispatch - deliberately not a process-wide global. The registry is
/// append-only: descriptors register during construction and are never
/// removed at runtime.
#[derive(Debug, Default)]
pub struct SerializerRegistry {
    descriptors: Vec<SerializerDescriptor>,
}

impl SerializerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with both built-in formats registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(SerializerDescriptor {
            signature: ENGINE_SCENE_SIGNATURE,
            min_version: ENGINE_SCENE_MIN_VERSION,
            max_version: ENGINE_SCENE_MAX_VERSION,
            build: |version| Box::new(EngineSceneSerializer::for_version(version)),
        });
        registry.register(SerializerDescriptor {
            signature: SCENE_DOC_SIGNATURE,
            min_version: SCENE_DOC_MIN_VERSION,
            max_version: SCENE_DOC_MAX_VERSION,
            build: |version| Box::new(SceneDocSerializer::for_version(version)),
        });
        registry
    }

    /// Registers a descriptor.
    pub fn register(&mut self, descriptor: SerializerDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Returns the registered descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &[SerializerDescriptor] {
        &self.descriptors
    }

    /// Selects a serializer for the stream by peeking its header.
    ///
    /// The stream position is untouched: the header is read and the
    /// position restored, so the returned serializer consumes the stream
    /// from the top.
    ///
    /// Selection picks, among descriptors matching the signature, the one
    /// with the highest `max_version` whose `min_version` admits the
    /// declared version. A document older than every descriptor resolves to
    /// the lowest-versioned one and loads with documented defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stream has no readable header (`InvalidFormat`)
    /// - No descriptor matches the signature (`NoMatchingSerializer`)
    /// - The declared version exceeds every matching descriptor
    ///   (`FutureVersion`)
    pub fn create_for(&self, stream: &mut dyn DocStream) -> CoreResult<Box<dyn SceneSerializer>> {
        let header = FormatHeader::peek(stream)?;

        let matching: Vec<&SerializerDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| d.signature == header.signature)
            .collect();
        if matching.is_empty() {
            return Err(CoreError::NoMatchingSerializer {
                signature: header.signature,
            });
        }

        let overall_max = matching.iter().map(|d| d.max_version).max().unwrap_or(0);
        if header.version > overall_max {
            return Err(CoreError::FutureVersion {
                version: header.version,
                max: overall_max,
            });
        }

        let chosen = matching
            .iter()
            .filter(|d| d.min_version <= header.version)
            .max_by_key(|d| d.max_version)
            .or_else(|| matching.iter().min_by_key(|d| d.min_version))
            .copied()
            .ok_or(CoreError::NoMatchingSerializer {
                signature: header.signature,
            })?;

        tracing::debug!(
            signature = ?header.signature,
            version = header.version,
            "dispatching serializer"
        );
        Ok((chosen.build)(header.version.max(chosen.min_version)))
    }

    /// Returns the newest-versioned serializer for a signature, as used by
    /// the save path.
    ///
    /// # Errors
    ///
    /// Returns `NoMatchingSerializer` if the signature is not registered.
    pub fn for_save(&self, signature: [u8; 4]) -> CoreResult<Box<dyn SceneSerializer>> {
        let descriptor = self
            .descriptors
            .iter()
            .filter(|d| d.signature == signature)
            .max_by_key(|d| d.max_version)
            .ok_or(CoreError::NoMatchingSerializer { signature })?;
        Ok((descriptor.build)(descriptor.max_version))
    }
}
