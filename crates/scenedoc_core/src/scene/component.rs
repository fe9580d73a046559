//! Components attached to actors.

use crate::scene::property::{PropertyMap, PropertyValue};

/// A behavior or data block attached to an actor.
///
/// Components are pure property bags tagged with a kind; their meaning is
/// owned by the runtime that consumes the scene (triggers, scripts,
/// emitters, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Component kind, e.g. `"script"`, `"trigger"`.
    pub kind: String,
    /// Typed properties.
    pub properties: PropertyMap,
}

impl Component {
    /// Creates a component with no properties.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: PropertyMap::new(),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_properties() {
        let mut component = Component::new("script");
        component.set_property("source", PropertyValue::AssetRef("scripts/door.lua".into()));
        assert_eq!(
            component.property("source"),
            Some(&PropertyValue::AssetRef("scripts/door.lua".into()))
        );
    }
}
