//! Deferred image loading.
//!
//! Cards are rendered with a placeholder and a `data-src`. The
//! [`LazyLoader`] registers every card with a single [`VisibilityWatcher`]
//! and hands out a [`Fetch`] the first time a card comes near the viewport.
//! After that the node is no longer watched; its outcome is reported back
//! through [`LazyLoader::on_loaded`] / [`LazyLoader::on_error`], which return
//! a replacement placeholder for that card alone.
//!
//! The watcher is created once by the host and lent to the loader. Re-renders
//! replace every node, so [`LazyLoader::attach`] drops registrations from the
//! previous render and registers the new nodes on the same watcher.

use super::bindings::NodeId;
use super::timeline::TimelineView;
use crate::config::LazyLoadConfig;
use log::debug;
use maud::{Markup, html};
use std::collections::{BTreeSet, HashMap};

/// Something that can report when nodes approach the viewport.
pub trait VisibilityWatcher {
    fn observe(&mut self, node: NodeId);
    fn unobserve(&mut self, node: NodeId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Registered, not yet near the viewport
    Pending,
    /// `src` assigned, bytes in flight
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Pending => "pending",
            LoadState::Loading => "loading",
            LoadState::Loaded => "loaded",
            LoadState::Failed => "failed",
        }
    }
}

/// Placeholder shown behind a card's image for a given load state.
pub fn render_placeholder(state: LoadState) -> Markup {
    html! {
        div.image-placeholder data-state=(state.as_str()) hidden[state == LoadState::Loaded] {
            @if state == LoadState::Failed { "❌" } @else { "📷" }
        }
    }
}

/// Instruction for the host: set this node's `src` to `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetch {
    pub node: NodeId,
    pub url: String,
}

#[derive(Debug)]
struct Slot {
    url: String,
    state: LoadState,
}

pub struct LazyLoader<W> {
    watcher: W,
    slots: HashMap<NodeId, Slot>,
}

impl<W: VisibilityWatcher> LazyLoader<W> {
    pub fn new(watcher: W) -> Self {
        Self {
            watcher,
            slots: HashMap::new(),
        }
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    pub fn watcher_mut(&mut self) -> &mut W {
        &mut self.watcher
    }

    /// Adopt the cards of a fresh render, forgetting every older node.
    pub fn attach(&mut self, view: &TimelineView) {
        let generation = view.generation();
        let stale: Vec<NodeId> = self
            .slots
            .keys()
            .filter(|node| node.generation != generation)
            .copied()
            .collect();
        for node in stale {
            if let Some(slot) = self.slots.remove(&node)
                && slot.state == LoadState::Pending
            {
                self.watcher.unobserve(node);
            }
        }
        for entry in view.entries() {
            self.register(entry.node, &entry.item.url);
        }
    }

    /// Watch `node`. A node is registered at most once.
    pub fn register(&mut self, node: NodeId, url: &str) {
        if self.slots.contains_key(&node) {
            return;
        }
        self.slots.insert(
            node,
            Slot {
                url: url.to_string(),
                state: LoadState::Pending,
            },
        );
        self.watcher.observe(node);
    }

    /// Nodes reported near the viewport. Returns a fetch for each one seen
    /// for the first time and stops watching it.
    pub fn on_visible(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> Vec<Fetch> {
        let mut fetches = Vec::new();
        for node in nodes {
            if let Some(slot) = self.slots.get_mut(&node)
                && slot.state == LoadState::Pending
            {
                slot.state = LoadState::Loading;
                self.watcher.unobserve(node);
                fetches.push(Fetch {
                    node,
                    url: slot.url.clone(),
                });
            }
        }
        fetches
    }

    /// The image for `node` finished loading. Returns its new placeholder.
    pub fn on_loaded(&mut self, node: NodeId) -> Option<Markup> {
        self.settle(node, LoadState::Loaded)
    }

    /// The image for `node` failed. Returns the error placeholder for that card.
    pub fn on_error(&mut self, node: NodeId) -> Option<Markup> {
        self.settle(node, LoadState::Failed)
    }

    fn settle(&mut self, node: NodeId, outcome: LoadState) -> Option<Markup> {
        let Some(slot) = self.slots.get_mut(&node) else {
            debug!("Ignoring load outcome for discarded node {node}");
            return None;
        };
        if slot.state != LoadState::Loading {
            return None;
        }
        slot.state = outcome;
        Some(render_placeholder(outcome))
    }

    pub fn state(&self, node: NodeId) -> Option<LoadState> {
        self.slots.get(&node).map(|slot| slot.state)
    }

    /// Registered nodes still waiting to become visible.
    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.state == LoadState::Pending)
            .count()
    }
}

impl LazyLoader<ViewportWatcher> {
    /// Report a new viewport position and collect the fetches it triggers.
    pub fn scroll(&mut self, viewport: Span) -> Vec<Fetch> {
        let visible = self.watcher.intersecting(viewport);
        self.on_visible(visible)
    }
}

// ============================================================================
// Geometry-based watcher
// ============================================================================

/// A vertical extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatcherOptions {
    /// Grows the viewport by this much above and below
    pub root_margin_px: f32,
    /// Minimum fraction of a node inside the grown viewport
    pub threshold: f32,
}

impl From<&LazyLoadConfig> for WatcherOptions {
    fn from(config: &LazyLoadConfig) -> Self {
        Self {
            root_margin_px: config.root_margin_px as f32,
            threshold: config.threshold,
        }
    }
}

impl Default for WatcherOptions {
    fn default() -> Self {
        Self::from(&LazyLoadConfig::default())
    }
}

/// Watches laid-out nodes against a scrolling viewport.
///
/// The host feeds node positions with [`ViewportWatcher::set_layout`]; nodes
/// without a layout are never reported.
#[derive(Debug, Default)]
pub struct ViewportWatcher {
    options: WatcherOptions,
    observed: BTreeSet<NodeId>,
    layout: HashMap<NodeId, Span>,
}

impl ViewportWatcher {
    pub fn new(options: WatcherOptions) -> Self {
        Self {
            options,
            observed: BTreeSet::new(),
            layout: HashMap::new(),
        }
    }

    pub fn set_layout(&mut self, node: NodeId, span: Span) {
        if self.observed.contains(&node) {
            self.layout.insert(node, span);
        }
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.contains(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Observed nodes that intersect `viewport` grown by the root margin.
    pub fn intersecting(&self, viewport: Span) -> Vec<NodeId> {
        let top = viewport.top - self.options.root_margin_px;
        let bottom = viewport.bottom() + self.options.root_margin_px;
        self.observed
            .iter()
            .filter(|node| {
                self.layout.get(*node).is_some_and(|span| {
                    let ratio = visible_ratio(*span, top, bottom);
                    ratio > 0.0 && ratio >= self.options.threshold
                })
            })
            .copied()
            .collect()
    }
}

fn visible_ratio(span: Span, top: f32, bottom: f32) -> f32 {
    if span.height <= 0.0 {
        return if (top..=bottom).contains(&span.top) { 1.0 } else { 0.0 };
    }
    let overlap = span.bottom().min(bottom) - span.top.max(top);
    overlap.max(0.0) / span.height
}

impl VisibilityWatcher for ViewportWatcher {
    fn observe(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    fn unobserve(&mut self, node: NodeId) {
        self.observed.remove(&node);
        self.layout.remove(&node);
    }
}
