//! Node identities and the click-delegation table.
//!
//! Every interactive element the timeline emits gets a [`NodeId`]. The
//! renderer records what a click on that node means in [`Bindings`], and the
//! host forwards raw clicks back as `Event::Activate(node)`. Rendering never
//! wires callbacks itself.
//!
//! Node ids carry the render generation that created them. A full re-render
//! bumps the generation, so clicks or load callbacks that arrive for nodes of
//! an earlier render resolve to nothing instead of acting on the wrong item.

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub generation: u64,
    pub slot: u32,
}

impl NodeId {
    pub fn new(generation: u64, slot: u32) -> Self {
        Self { generation, slot }
    }
}

/// Rendered as the element id, e.g. `n3-17`.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}-{}", self.generation, self.slot)
    }
}

impl maud::Render for NodeId {
    fn render_to(&self, buffer: &mut String) {
        buffer.push_str(&self.to_string());
    }
}

/// What activating a node does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Year header: flip that year's expansion.
    ToggleYear(String),
    /// Image card: open the viewer at this index of the visible subset.
    OpenViewer(usize),
}

/// Hands out node ids for one render and remembers their actions.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    generation: u64,
    next_slot: u32,
    actions: HashMap<NodeId, Action>,
}

impl Bindings {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            next_slot: 0,
            actions: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Allocate a fresh node with no action attached.
    pub fn allocate(&mut self) -> NodeId {
        let node = NodeId::new(self.generation, self.next_slot);
        self.next_slot += 1;
        node
    }

    /// Allocate a node and bind `action` to it.
    pub fn bind(&mut self, action: Action) -> NodeId {
        let node = self.allocate();
        self.actions.insert(node, action);
        node
    }

    /// Look up the action for a node. Nodes from other renders resolve to `None`.
    pub fn resolve(&self, node: NodeId) -> Option<&Action> {
        self.actions.get(&node)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
