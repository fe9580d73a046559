//! Named links between actors.

use crate::scene::actor::ActorId;

/// A named relationship between two actors, e.g. a waypoint graph edge.
///
/// Both endpoints must exist in the same document. The invariant is
/// enforced when links are added through
/// [`SceneDocument::add_link`](crate::SceneDocument::add_link) and again at
/// load time, where dangling links are dropped with a warning rather than
/// failing the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLink {
    /// Link name, e.g. `"patrol_route_3"`.
    pub name: String,
    /// Source actor.
    pub from: ActorId,
    /// Target actor.
    pub to: ActorId,
}

impl PathLink {
    /// Creates a link.
    #[must_use]
    pub fn new(name: impl Into<String>, from: ActorId, to: ActorId) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }
}
