//! The scene document: root of the editable graph.

use crate::error::{CoreError, CoreResult};
use crate::scene::actor::{Actor, ActorId};
use crate::scene::link::PathLink;
use crate::scene::metadata::SceneMetadata;

/// The root of the editable scene graph.
///
/// A document owns its actors, the links between them, and the global
/// metadata. Actor ids come from a persisted counter so they are never
/// reused within the document's lifetime; actor order is insertion order
/// and is preserved across save/load.
///
/// Only the editor session holds an owning handle to a document. Panels
/// and other display surfaces hold
/// [`ActorRef`](crate::session::ActorRef)s, which are validated against the
/// session's generation counter before every use.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    /// Global scene settings.
    pub metadata: SceneMetadata,
    actors: Vec<Actor>,
    links: Vec<PathLink>,
    next_id: u32,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metadata: SceneMetadata::default(),
            actors: Vec::new(),
            links: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns the next actor id that will be allocated.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Creates a new actor and returns its id.
    pub fn spawn_actor(&mut self, name: impl Into<String>, kind: impl Into<String>) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        self.actors.push(Actor::new(id, name, kind));
        id
    }

    /// Inserts a fully built actor, e.g. while loading.
    ///
    /// The id counter is bumped past the actor's id so later spawns never
    /// collide with restored actors.
    pub fn insert_actor(&mut self, actor: Actor) {
        self.next_id = self.next_id.max(actor.id.as_u32() + 1);
        self.actors.push(actor);
    }

    /// Restores the persisted id counter after a load.
    ///
    /// The counter never moves backwards: deleted actors keep their ids
    /// retired even though no actor carries them any more.
    pub fn restore_next_id(&mut self, next_id: u32) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Removes an actor, returning it if present.
    ///
    /// Links referencing the actor are *not* removed here; they are dropped
    /// with a warning on the next load. This mirrors how the editor always
    /// behaved, so a remove followed by an undo restores the links intact.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let at = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(at))
    }

    /// Returns the actors in insertion order.
    #[must_use]
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Looks up an actor by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// Looks up an actor mutably by id.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// Checks whether an actor exists.
    #[must_use]
    pub fn contains_actor(&self, id: ActorId) -> bool {
        self.actor(id).is_some()
    }

    /// Looks up an actor by display name, case-insensitively.
    #[must_use]
    pub fn actor_by_name(&self, name: &str) -> Option<&Actor> {
        self.actors
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Adds a link between two existing actors.
    ///
    /// # Errors
    ///
    /// Returns `UnknownActor` if either endpoint is not in this document.
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        from: ActorId,
        to: ActorId,
    ) -> CoreResult<()> {
        for id in [from, to] {
            if !self.contains_actor(id) {
                return Err(CoreError::UnknownActor { id });
            }
        }
        self.links.push(PathLink::new(name, from, to));
        Ok(())
    }

    /// Inserts a link without endpoint validation, e.g. while loading a
    /// document whose links are validated separately.
    pub fn insert_link(&mut self, link: PathLink) {
        self.links.push(link);
    }

    /// Returns the links in insertion order.
    #[must_use]
    pub fn links(&self) -> &[PathLink] {
        &self.links
    }

    /// Removes every link with the given name, returning how many matched.
    pub fn remove_links(&mut self, name: &str) -> usize {
        let before = self.links.len();
        self.links.retain(|l| l.name != name);
        before - self.links.len()
    }

    /// Generates a name not yet used by any actor: `base`, `base1`,
    /// `base2`, ...
    #[must_use]
    pub fn unique_name(&self, base: &str) -> String {
        if self.actor_by_name(base).is_none() {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}{n}");
            if self.actor_by_name(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Collects every asset path referenced by actor or component
    /// properties, de-duplicated and sorted.
    #[must_use]
    pub fn asset_references(&self) -> Vec<String> {
        let mut refs: Vec<String> = self
            .actors
            .iter()
            .flat_map(|actor| {
                actor
                    .properties
                    .values()
                    .chain(actor.components.iter().flat_map(|c| c.properties.values()))
                    .filter_map(|v| v.as_asset_ref().map(str::to_string))
            })
            .collect();
        refs.sort();
        refs.dedup();
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::component::Component;
    use crate::scene::property::PropertyValue;

    #[test]
    fn spawn_allocates_fresh_ids() {
        let mut doc = SceneDocument::new();
        let a = doc.spawn_actor("crate01", "mesh");
        let b = doc.spawn_actor("light01", "light");
        assert_ne!(a, b);
        assert_eq!(doc.actors().len(), 2);
        assert_eq!(doc.next_id(), 3);
    }

    #[test]
    fn insert_actor_bumps_counter() {
        let mut doc = SceneDocument::new();
        doc.insert_actor(Actor::new(ActorId::new(41), "late", "mesh"));
        let next = doc.spawn_actor("fresh", "mesh");
        assert_eq!(next, ActorId::new(42));
    }

    #[test]
    fn remove_actor_keeps_links() {
        let mut doc = SceneDocument::new();
        let a = doc.spawn_actor("a", "path");
        let b = doc.spawn_actor("b", "path");
        doc.add_link("route", a, b).unwrap();

        doc.remove_actor(b).unwrap();
        // the dangling link survives in memory; loads drop it with a warning
        assert_eq!(doc.links().len(), 1);
        assert!(!doc.contains_actor(b));
    }

    #[test]
    fn add_link_rejects_unknown_endpoints() {
        let mut doc = SceneDocument::new();
        let a = doc.spawn_actor("a", "path");
        let ghost = ActorId::new(99);
        assert!(matches!(
            doc.add_link("route", a, ghost),
            Err(CoreError::UnknownActor { .. })
        ));
        assert!(doc.links().is_empty());
    }

    #[test]
    fn unique_name_skips_taken_names() {
        let mut doc = SceneDocument::new();
        doc.spawn_actor("crate", "mesh");
        doc.spawn_actor("crate1", "mesh");
        assert_eq!(doc.unique_name("crate"), "crate2");
        assert_eq!(doc.unique_name("light"), "light");
    }

    #[test]
    fn actor_lookup_is_case_insensitive() {
        let mut doc = SceneDocument::new();
        doc.spawn_actor("Crate01", "mesh");
        assert!(doc.actor_by_name("crate01").is_some());
    }

    #[test]
    fn asset_references_cover_components() {
        let mut doc = SceneDocument::new();
        let id = doc.spawn_actor("crate01", "mesh");
        let actor = doc.actor_mut(id).unwrap();
        actor.set_property("mesh", PropertyValue::AssetRef("models/crate.mesh".into()));
        actor.set_property(
            "texture",
            PropertyValue::AssetRef("textures/wood.png".into()),
        );

        let mut script = Component::new("script");
        script.set_property("source", PropertyValue::AssetRef("scripts/open.lua".into()));
        // duplicate reference on purpose
        script.set_property("mesh", PropertyValue::AssetRef("models/crate.mesh".into()));
        actor.add_component(script);

        assert_eq!(
            doc.asset_references(),
            vec![
                "models/crate.mesh".to_string(),
                "scripts/open.lua".to_string(),
                "textures/wood.png".to_string(),
            ]
        );
    }
}
