//! The gallery engine.
//!
//! All view state lives in one [`Gallery`] value and changes only through
//! [`Gallery::update`], one [`Event`] at a time. Every state change that
//! affects the timeline rebuilds it from scratch with a new render
//! generation, so handlers can be re-entered freely.
//!
//! ```text
//! Event ──▶ Gallery::update ──▶ Update::{Full, Viewer, Nothing}
//!                                   │
//!                 host calls ◀──────┘
//!         Gallery::render(&mut LazyLoader)   (Full)
//!         Gallery::render_viewer()           (Viewer)
//! ```
//!
//! The host owns exactly one [`LazyLoader`] and lends it to every full
//! render; clicks on rendered nodes come back as [`Event::Activate`] and are
//! resolved through the current render's [`Bindings`](bindings::Bindings).

pub mod bindings;
pub mod filter;
pub mod lazy;
pub mod loader;
pub mod timeline;
pub mod viewer;

use crate::types::MediaItem;
use bindings::{Action, NodeId};
use filter::FilterCriteria;
use lazy::{LazyLoader, VisibilityWatcher};
use loader::{Catalog, LoadError, Stats};
use log::{debug, warn};
use maud::{Markup, html};
use timeline::{ExpansionState, TimelineView};
use viewer::{ClickTarget, Direction, Key, Viewer};

/// Manifest load status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub enum Event {
    /// The manifest fetch finished
    Loaded(Result<Catalog, LoadError>),
    /// Year select changed; `None` or `""` means all years
    SetYear(Option<String>),
    SetMonth(Option<String>),
    SetSearch(String),
    ToggleYear(String),
    /// Open every year group
    ExpandAll,
    /// A click on a rendered timeline node
    Activate(NodeId),
    Open(usize),
    Navigate(Direction),
    Close,
    Key(Key),
    LightboxClick(ClickTarget),
}

/// What the host has to redraw after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Nothing,
    /// Only the lightbox changed
    Viewer,
    /// Timeline, controls and lightbox all need replacing
    Full,
}

#[derive(Debug, Clone)]
pub struct Gallery {
    status: Status,
    items: Vec<MediaItem>,
    stats: Stats,
    criteria: FilterCriteria,
    year_options: Vec<String>,
    month_options: Vec<String>,
    visible: Vec<MediaItem>,
    expansion: ExpansionState,
    viewer: Viewer,
    generation: u64,
    view: TimelineView,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    pub fn new() -> Self {
        let expansion = ExpansionState::default();
        let view = timeline::build(&[], &expansion, 0);
        Self {
            status: Status::Loading,
            items: Vec::new(),
            stats: Stats::default(),
            criteria: FilterCriteria::default(),
            year_options: Vec::new(),
            month_options: Vec::new(),
            visible: Vec::new(),
            expansion,
            viewer: Viewer::default(),
            generation: 0,
            view,
        }
    }

    pub fn update(&mut self, event: Event) -> Update {
        match event {
            Event::Loaded(Ok(catalog)) => {
                debug!("Manifest loaded with {} items", catalog.stats.total);
                self.expansion = ExpansionState::with_latest(catalog.latest_year.as_deref());
                self.year_options = filter::year_options(&catalog.items);
                self.month_options = Vec::new();
                self.criteria = FilterCriteria::default();
                self.items = catalog.items;
                self.stats = catalog.stats;
                self.status = Status::Ready;
                self.refilter();
                Update::Full
            }
            Event::Loaded(Err(err)) => {
                warn!("Failed to load manifest: {err}");
                self.items.clear();
                self.visible.clear();
                self.year_options.clear();
                self.month_options.clear();
                self.stats = Stats::default();
                self.viewer.close();
                self.status = Status::Failed(err.to_string());
                self.rebuild();
                Update::Full
            }
            Event::SetYear(year) => {
                self.criteria.year = filter::normalize(year);
                self.criteria.month = None;
                self.month_options =
                    filter::month_options(&self.items, self.criteria.year.as_deref());
                self.refilter();
                Update::Full
            }
            Event::SetMonth(month) => {
                self.criteria.month =
                    filter::normalize(month).filter(|m| self.month_options.contains(m));
                self.refilter();
                Update::Full
            }
            Event::SetSearch(term) => {
                self.criteria.search = filter::normalize_search(&term);
                self.refilter();
                Update::Full
            }
            Event::ToggleYear(year) => {
                self.expansion.toggle(&year);
                self.rebuild();
                Update::Full
            }
            Event::ExpandAll => {
                self.expansion
                    .expand_all(self.year_options.iter().map(String::as_str));
                self.rebuild();
                Update::Full
            }
            Event::Activate(node) => match self.view.bindings.resolve(node).cloned() {
                Some(Action::ToggleYear(year)) => self.update(Event::ToggleYear(year)),
                Some(Action::OpenViewer(index)) => self.update(Event::Open(index)),
                None => {
                    debug!("Ignoring click on stale node {node}");
                    Update::Nothing
                }
            },
            Event::Open(index) => changed(self.viewer.open(index, self.visible.len())),
            Event::Navigate(direction) => {
                changed(self.viewer.navigate(direction, self.visible.len()))
            }
            Event::Close => {
                let was_open = self.viewer.is_open();
                self.viewer.close();
                changed(was_open)
            }
            Event::Key(key) => changed(self.viewer.handle_key(key, self.visible.len())),
            Event::LightboxClick(target) => changed(self.viewer.handle_click(target)),
        }
    }

    /// Recompute the visible subset and keep the viewer on the same item.
    fn refilter(&mut self) {
        let previous = self.viewer.current(&self.visible).cloned();
        self.visible = filter::apply(&self.items, &self.criteria);
        self.viewer.retarget(previous.as_ref(), &self.visible);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.generation += 1;
        self.view = timeline::build(&self.visible, &self.expansion, self.generation);
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Every loaded item, newest first.
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn visible(&self) -> &[MediaItem] {
        &self.visible
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn year_options(&self) -> &[String] {
        &self.year_options
    }

    pub fn month_options(&self) -> &[String] {
        &self.month_options
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// The current render.
    pub fn timeline(&self) -> &TimelineView {
        &self.view
    }

    /// Full page markup. Hands the new cards to `lazy`, which forgets the
    /// cards of every earlier render.
    pub fn render<W: VisibilityWatcher>(&self, lazy: &mut LazyLoader<W>) -> Markup {
        lazy.attach(&self.view);
        html! {
            div.gallery-app {
                @match &self.status {
                    Status::Loading => {
                        div.loading id="loading" { "Loading image list..." }
                    }
                    Status::Failed(message) => {
                        div.loading.error id="loading" {
                            "❌ Failed to load images"
                            p.error-detail { (message) }
                        }
                    }
                    Status::Ready => {
                        (render_stats(&self.stats))
                        (filter::render_controls(&self.year_options, &self.month_options, &self.criteria))
                        (self.view.render())
                    }
                }
                (self.render_viewer())
            }
        }
    }

    pub fn render_viewer(&self) -> Markup {
        viewer::render(&self.viewer, &self.visible)
    }
}

fn changed(did_change: bool) -> Update {
    if did_change {
        Update::Viewer
    } else {
        Update::Nothing
    }
}

fn render_stats(stats: &Stats) -> Markup {
    html! {
        div.stats {
            div.stat { span.stat-value id="totalCount" { (stats.total) } span.stat-label { "Photos" } }
            div.stat { span.stat-value id="yearCount" { (stats.years) } span.stat-label { "Years" } }
            div.stat { span.stat-value id="monthCount" { (stats.months) } span.stat-label { "Months" } }
        }
    }
}
