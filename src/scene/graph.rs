//! Scene Graph
//!
//! Nodes live in a [`SlotMap`] arena and refer to their children by
//! [`NodeHandle`]. Traversal uses an explicit stack:
//!
//! - visits roots, then children, depth-first in insertion order
//! - composes `world = parent_world * local` on the way down
//! - evaluates keyframed locals at the frame time, never caching the result
//!
//! Adding children performs no cycle detection. Traversal keeps the current
//! root-to-node path and skips, with a logged error, any edge leading back to
//! a node already on it, so a cycle is drawn once around and then cut.
//! Acyclic hierarchies deeper than [`MAX_TRAVERSAL_DEPTH`] are cut the same
//! way.

use std::mem;

use glam::Mat4;
use slotmap::SlotMap;

use crate::input::InputEvent;
use crate::scene::drawable::DrawSink;
use crate::scene::node::{LocalTransform, Node};
use crate::scene::{FrameContext, NodeHandle};

/// Deepest nesting a traversal will follow.
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
    // Reused visit buffer for draw
    scratch: Vec<(NodeHandle, Mat4)>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Stores `node` without attaching it anywhere.
    pub fn create_node(&mut self, node: Node) -> NodeHandle {
        self.nodes.insert(node)
    }

    /// Stores `node` and appends it to the root list.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.roots.push(handle);
        handle
    }

    /// Appends an existing node to the root list.
    pub fn add_root(&mut self, handle: NodeHandle) {
        if self.nodes.contains_key(handle) {
            self.roots.push(handle);
        } else {
            log::error!("add_root: unknown node {handle:?}");
        }
    }

    /// Appends `child` to `parent`'s children.
    ///
    /// No duplicate or cycle detection: a node listed under several parents
    /// is drawn once per listing, with each parent's world transform.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        if !self.nodes.contains_key(child) {
            log::error!("add_child: unknown child {child:?}");
            return;
        }
        match self.nodes.get_mut(parent) {
            Some(p) => p.children.push(child),
            None => log::error!("add_child: unknown parent {parent:?}"),
        }
    }

    /// Stores `node` and appends it to `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeHandle, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.add_child(parent, handle);
        handle
    }

    // ========================================================================
    // Access
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replaces a node's local transform source. Returns false for an
    /// unknown handle.
    pub fn set_local(&mut self, handle: NodeHandle, local: LocalTransform) -> bool {
        match self.nodes.get_mut(handle) {
            Some(node) => {
                node.local = local;
                true
            }
            None => false,
        }
    }

    pub fn set_visible(&mut self, handle: NodeHandle, visible: bool) -> bool {
        match self.nodes.get_mut(handle) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// First node with the given name, in arena order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(handle, _)| handle)
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    fn walk(
        &self,
        parent_world: Mat4,
        time: f32,
        include_hidden: bool,
        out: &mut Vec<(NodeHandle, Mat4)>,
    ) {
        // (node, parent world, depth)
        let mut stack: Vec<(NodeHandle, Mat4, usize)> = Vec::with_capacity(64);
        // path[..depth] holds the ancestors of the node being visited
        let mut path: Vec<NodeHandle> = Vec::with_capacity(32);
        for &root in self.roots.iter().rev() {
            stack.push((root, parent_world, 0));
        }

        while let Some((handle, parent, depth)) = stack.pop() {
            path.truncate(depth);
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if path.contains(&handle) {
                log::error!("Scene graph cycle through '{}'; edge skipped", node.name);
                continue;
            }
            if !include_hidden && !node.visible {
                continue;
            }
            if depth >= MAX_TRAVERSAL_DEPTH {
                log::error!(
                    "Scene graph deeper than {MAX_TRAVERSAL_DEPTH} at '{}'; subtree skipped",
                    node.name
                );
                continue;
            }

            let world = parent * node.local.matrix_at(time);
            out.push((handle, world));
            path.push(handle);

            for &child in node.children.iter().rev() {
                stack.push((child, world, depth + 1));
            }
        }
    }

    /// World transform of every visible node, in visit order.
    ///
    /// Shared nodes appear once per path from a root.
    #[must_use]
    pub fn world_transforms(&self, parent_world: Mat4, time: f32) -> Vec<(NodeHandle, Mat4)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(parent_world, time, false, &mut out);
        out
    }

    /// Draws every visible node depth-first, handing each payload its
    /// world transform.
    pub fn draw(&mut self, parent_world: Mat4, frame: &FrameContext, sink: &mut dyn DrawSink) {
        let mut visits = mem::take(&mut self.scratch);
        visits.clear();
        self.walk(parent_world, frame.time, false, &mut visits);

        for (handle, world) in &visits {
            if let Some(payload) = self.nodes.get_mut(*handle).and_then(Node::payload_mut) {
                payload.draw(world, frame, sink);
            }
        }

        self.scratch = visits;
    }

    /// Broadcasts `event` to every payload, depth-first, hidden nodes
    /// included.
    pub fn dispatch_input(&mut self, event: &InputEvent) {
        let mut visits = mem::take(&mut self.scratch);
        visits.clear();
        self.walk(Mat4::IDENTITY, 0.0, true, &mut visits);

        for (handle, _) in &visits {
            if let Some(payload) = self.nodes.get_mut(*handle).and_then(Node::payload_mut) {
                payload.handle_input(event);
            }
        }

        self.scratch = visits;
    }
}
