//! Scene: owner of all nodes, their attributes and their observers.
//!
//! Nodes are registered with [`Scene::add_node`] (attached) or
//! [`Scene::create_node`] (detached until [`Scene::attach`] is called). Every
//! mutation made through [`Scene::modify`] or [`Scene::modify_node`] queues a
//! [`SceneEvent::Modified`] notification for the node's observers; removal
//! queues [`SceneEvent::Removed`]. Notifications are delivered by polling with
//! [`Scene::take_notifications`], so no particular dispatch loop is assumed.
//! An observer holds at most one undelivered notification: further changes
//! before the next poll are folded into it.

use std::collections::{BTreeMap, HashMap};

use crate::error::{PlannerError, Result};
use crate::event::{Notification, ObserverTag, SceneEvent};
use crate::node::{Node, NodeId};

struct Entry {
    node: Box<dyn Node>,
    attributes: BTreeMap<String, String>,
    attached: bool,
}

#[derive(Debug, Clone)]
struct Observer {
    node: NodeId,
    event: SceneEvent,
}

/// Container for every node the planner reads from or writes to.
#[derive(Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Entry>,
    observers: HashMap<ObserverTag, Observer>,
    pending: Vec<Notification>,
    /// Per type name counter used to build ids such as `ModelNode3`.
    id_counters: HashMap<&'static str, u64>,
    next_tag: u64,
}

impl Scene {
    /// Creates a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, type_name: &'static str) -> NodeId {
        let counter = self.id_counters.entry(type_name).or_insert(0);
        loop {
            *counter += 1;
            let id = NodeId::new(format!("{type_name}{counter}"));
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    fn insert(&mut self, node: Box<dyn Node>, attached: bool) -> NodeId {
        let id = self.next_id(node.type_name());
        log::debug!("scene: created {id} ('{}'), attached={attached}", node.name());
        self.nodes.insert(
            id.clone(),
            Entry {
                node,
                attributes: BTreeMap::new(),
                attached,
            },
        );
        id
    }

    /// Adds a node to the scene and returns its id.
    pub fn add_node(&mut self, node: Box<dyn Node>) -> NodeId {
        self.insert(node, true)
    }

    /// Registers a node without attaching it to the scene.
    ///
    /// Detached nodes can be looked up by id but are skipped by [`Scene::iter`].
    pub fn create_node(&mut self, node: Box<dyn Node>) -> NodeId {
        self.insert(node, false)
    }

    /// Attaches a previously created node. Returns true if it was detached.
    pub fn attach(&mut self, id: &NodeId) -> Result<bool> {
        let entry = self.entry_mut(id)?;
        let was_detached = !entry.attached;
        entry.attached = true;
        Ok(was_detached)
    }

    /// Returns whether the node exists and is attached.
    pub fn is_attached(&self, id: &NodeId) -> bool {
        self.nodes.get(id).is_some_and(|e| e.attached)
    }

    /// Checks if a node with the given id exists, attached or not.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn entry_mut(&mut self, id: &NodeId) -> Result<&mut Entry> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| PlannerError::NodeNotFound(id.to_string()))
    }

    /// Gets a reference to a node by id.
    pub fn get(&self, id: &NodeId) -> Option<&dyn Node> {
        self.nodes.get(id).map(|e| e.node.as_ref())
    }

    /// Gets a node by id, downcast to its concrete type.
    pub fn get_as<T: Node>(&self, id: &NodeId) -> Option<&T> {
        self.get(id)?.as_any().downcast_ref::<T>()
    }

    /// Mutates a node through its trait object and notifies observers.
    pub fn modify_node<R>(&mut self, id: &NodeId, f: impl FnOnce(&mut dyn Node) -> R) -> Result<R> {
        let entry = self.entry_mut(id)?;
        let result = f(entry.node.as_mut());
        self.notify(id, SceneEvent::Modified);
        Ok(result)
    }

    /// Mutates a node of concrete type `T` and notifies observers.
    pub fn modify<T: Node, R>(&mut self, id: &NodeId, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let entry = self.entry_mut(id)?;
        let node = entry.node.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
            PlannerError::NodeTypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            }
        })?;
        let result = f(node);
        self.notify(id, SceneEvent::Modified);
        Ok(result)
    }

    /// Removes a node, notifying and then dropping its observers.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<Box<dyn Node>> {
        let entry = self.nodes.remove(id)?;
        self.notify(id, SceneEvent::Removed);
        self.observers.retain(|_, o| &o.node != id);
        log::debug!("scene: removed {id}");
        Some(entry.node)
    }

    /// Returns an attribute value stored on a node.
    pub fn attribute(&self, id: &NodeId, key: &str) -> Option<&str> {
        self.nodes
            .get(id)
            .and_then(|e| e.attributes.get(key))
            .map(String::as_str)
    }

    /// Stores an attribute on a node.
    pub fn set_attribute(&mut self, id: &NodeId, key: &str, value: &str) -> Result<()> {
        self.entry_mut(id)?
            .attributes
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Removes an attribute from a node, returning the old value.
    pub fn remove_attribute(&mut self, id: &NodeId, key: &str) -> Option<String> {
        self.nodes.get_mut(id)?.attributes.remove(key)
    }

    /// Returns an iterator over attached nodes, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &dyn Node)> {
        self.nodes
            .iter()
            .filter(|(_, e)| e.attached)
            .map(|(id, e)| (id, e.node.as_ref()))
    }

    /// Returns the ids of attached nodes of a given type.
    pub fn ids_of_type(&self, type_name: &str) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.type_name() == type_name)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Finds the first attached node with the given display name.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, n)| n.name() == name)
            .map(|(id, _)| id.clone())
    }

    /// Returns the total number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Subscribes to an event on a node.
    pub fn add_observer(&mut self, id: &NodeId, event: SceneEvent) -> Result<ObserverTag> {
        if !self.contains(id) {
            return Err(PlannerError::NodeNotFound(id.to_string()));
        }
        self.next_tag += 1;
        let tag = ObserverTag(self.next_tag);
        self.observers.insert(
            tag,
            Observer {
                node: id.clone(),
                event,
            },
        );
        Ok(tag)
    }

    /// Unsubscribes an observer and discards its undelivered notifications.
    pub fn remove_observer(&mut self, tag: ObserverTag) -> bool {
        self.pending.retain(|n| n.tag != tag);
        self.observers.remove(&tag).is_some()
    }

    /// Drains the notifications addressed to one observer, oldest first.
    pub fn take_notifications(&mut self, tag: ObserverTag) -> Vec<Notification> {
        let (mine, rest) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|n| n.tag == tag);
        self.pending = rest;
        mine
    }

    /// Number of undelivered notifications for one observer.
    pub fn pending_notifications(&self, tag: ObserverTag) -> usize {
        self.pending.iter().filter(|n| n.tag == tag).count()
    }

    fn notify(&mut self, id: &NodeId, event: SceneEvent) {
        let pending = &self.pending;
        let mut tags: Vec<ObserverTag> = self
            .observers
            .iter()
            .filter(|(_, o)| &o.node == id && o.event == event)
            .map(|(tag, _)| *tag)
            .filter(|tag| !pending.iter().any(|n| n.tag == *tag))
            .collect();
        tags.sort();
        self.pending.extend(tags.into_iter().map(|tag| Notification {
            tag,
            node: id.clone(),
            event,
        }));
    }

    /// Removes all nodes, observers and pending notifications.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.observers.clear();
        self.pending.clear();
    }
}
