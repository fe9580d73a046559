//! Actors: the placeable entities of a scene.

use crate::scene::component::Component;
use crate::scene::property::{PropertyMap, PropertyValue};
use std::fmt;

/// Unique identifier for an actor within one document.
///
/// Ids are allocated by the owning [`SceneDocument`](crate::SceneDocument)
/// from a persisted counter and are never reused within a document's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId(pub u32);

impl ActorId {
    /// Creates an actor ID from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

/// A placeable scene entity.
///
/// Actors carry a `kind` (the scene-node type the renderer instantiates),
/// a typed property bag, and an ordered list of attached components.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    /// Document-unique identifier.
    pub id: ActorId,
    /// Display name, unique per document by convention.
    pub name: String,
    /// Scene-node kind, e.g. `"mesh"`, `"light"`, `"path"`.
    pub kind: String,
    /// Typed properties (transform, colors, asset references, ...).
    pub properties: PropertyMap,
    /// Attached components, in attachment order.
    pub components: Vec<Component>,
}

impl Actor {
    /// Creates an actor with no properties or components.
    #[must_use]
    pub fn new(id: ActorId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
            properties: PropertyMap::new(),
            components: Vec::new(),
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Attaches a component.
    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_id_display() {
        assert_eq!(format!("{}", ActorId::new(7)), "actor:7");
    }

    #[test]
    fn set_and_get_properties() {
        let mut actor = Actor::new(ActorId::new(1), "crate01", "mesh");
        actor.set_property("position", PropertyValue::Vec3([1.0, 2.0, 3.0]));
        actor.set_property("position", PropertyValue::Vec3([4.0, 5.0, 6.0]));

        assert_eq!(
            actor.property("position"),
            Some(&PropertyValue::Vec3([4.0, 5.0, 6.0]))
        );
        assert_eq!(actor.property("missing"), None);
    }
}
