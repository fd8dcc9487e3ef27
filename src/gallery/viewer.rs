//! Lightbox viewer over the visible subset.
//!
//! `current_index` always indexes the *visible* items, never the full
//! manifest. Navigation cycles at both ends. Closing keeps the index so the
//! viewer can be reopened where it left off.

use crate::types::MediaItem;
use maud::{Markup, html};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    fn step(self) -> i64 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    /// Map a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" => Key::Escape,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => Key::Other,
        }
    }
}

/// Where a click inside the lightbox landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The dimmed backdrop itself
    Background,
    /// The image, caption or buttons
    Content,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    current_index: usize,
    is_open: bool,
}

impl Viewer {
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Open at `index`. Refuses indices outside the visible subset.
    pub fn open(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.current_index = index;
        self.is_open = true;
        true
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    /// Step one item, wrapping at both ends. Does nothing while closed.
    pub fn navigate(&mut self, direction: Direction, len: usize) -> bool {
        if !self.is_open || len == 0 {
            return false;
        }
        let len = len as i64;
        let mut next = self.current_index as i64 + direction.step();
        if next < 0 {
            next = len - 1;
        }
        if next >= len {
            next = 0;
        }
        self.current_index = next as usize;
        true
    }

    /// Returns whether the key changed anything. Ignored while closed.
    pub fn handle_key(&mut self, key: Key, len: usize) -> bool {
        if !self.is_open {
            return false;
        }
        match key {
            Key::Escape => {
                self.close();
                true
            }
            Key::ArrowLeft => self.navigate(Direction::Backward, len),
            Key::ArrowRight => self.navigate(Direction::Forward, len),
            Key::Other => false,
        }
    }

    /// Clicking the backdrop dismisses; clicks on content do not.
    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        if self.is_open && target == ClickTarget::Background {
            self.close();
            return true;
        }
        false
    }

    /// Follow the item that was showing after the visible subset changed.
    ///
    /// Falls back to the first item when `previous` was filtered out, and
    /// closes when nothing is visible.
    pub fn retarget(&mut self, previous: Option<&MediaItem>, visible: &[MediaItem]) {
        if !self.is_open {
            return;
        }
        if visible.is_empty() {
            self.close();
            return;
        }
        self.current_index = previous
            .and_then(|prev| visible.iter().position(|item| item == prev))
            .unwrap_or(0);
    }

    pub fn current<'a>(&self, visible: &'a [MediaItem]) -> Option<&'a MediaItem> {
        visible.get(self.current_index)
    }
}

/// The lightbox overlay. Content is only emitted while open.
pub fn render(viewer: &Viewer, visible: &[MediaItem]) -> Markup {
    let shown = viewer.current(visible).filter(|_| viewer.is_open());
    html! {
        div.lightbox.active[shown.is_some()] id="lightbox" {
            @if let Some(item) = shown {
                button.lightbox-close data-action="close" title="Close" { "×" }
                button.lightbox-nav.prev data-action="prev" title="Previous" { "‹" }
                div.lightbox-content {
                    img id="lightboxImage" src=(item.url) alt=(item.filename);
                    div.lightbox-info {
                        div id="lightboxFilename" { (item.filename) }
                        div id="lightboxMeta" { (item.date) }
                    }
                }
                button.lightbox-nav.next data-action="next" title="Next" { "›" }
            }
        }
    }
}
