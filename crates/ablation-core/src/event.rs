//! Change notifications emitted by the scene.

use crate::node::NodeId;

/// Kind of change an observer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneEvent {
    /// The node was changed through the scene.
    Modified,
    /// The node was removed from the scene.
    Removed,
}

/// Handle returned by [`Scene::add_observer`](crate::scene::Scene::add_observer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverTag(pub(crate) u64);

/// A queued notification for one observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The observer this notification is addressed to.
    pub tag: ObserverTag,
    /// The node that changed.
    pub node: NodeId,
    /// What happened to it.
    pub event: SceneEvent,
}
