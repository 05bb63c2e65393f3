//! # Selection Overlay
//!
//! Two independent highlight tracks over a [`Surface`]:
//!
//! - **hover** follows the pointer
//! - **selection** changes on click, or when the editor selects by id
//!
//! ## Click race
//!
//! A click starts a processing window. While it is open, pointer moves do
//! not touch hover, so the highlight does not flicker between the click and
//! the selection settling. The window closes on [`Overlay::settle`] once
//! [`SETTLE_WINDOW`] has passed, and unconditionally on any event arriving
//! after [`SAFETY_DEADLINE`].
//!
//! Time is passed in by the caller so the rules are testable without a clock.

use crate::layout::{Point, Rect, SectionMarker, Surface};
use pagewright_document::{SectionId, SectionType};
use std::time::Duration;
use tokio::time::Instant;

pub const SETTLE_WINDOW: Duration = Duration::from_millis(50);
pub const SAFETY_DEADLINE: Duration = Duration::from_millis(300);

/// One highlighted section
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight<E> {
    pub element: E,
    pub section_id: SectionId,
    pub label: SectionType,
    /// Viewport coordinates
    pub geometry: Option<Rect>,
}

#[derive(Debug)]
pub struct Overlay<E> {
    hover: Option<Highlight<E>>,
    selection: Option<Highlight<E>>,
    click_started: Option<Instant>,
}

impl<E> Default for Overlay<E> {
    fn default() -> Self {
        Self {
            hover: None,
            selection: None,
            click_started: None,
        }
    }
}

impl<E: Copy + Eq + std::fmt::Debug> Overlay<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hover(&self) -> Option<&Highlight<E>> {
        self.hover.as_ref()
    }

    pub fn selection(&self) -> Option<&Highlight<E>> {
        self.selection.as_ref()
    }

    pub fn is_processing_click(&self) -> bool {
        self.click_started.is_some()
    }

    /// When the open click window may be settled
    pub fn settle_deadline(&self) -> Option<Instant> {
        self.click_started.map(|started| started + SETTLE_WINDOW)
    }

    pub fn pointer_move<S>(&mut self, surface: &S, point: Point, now: Instant)
    where
        S: Surface<Element = E>,
    {
        self.expire(now);
        if self.click_started.is_some() {
            return;
        }

        match surface.section_at(point) {
            Some(element) => {
                if self.hover.as_ref().map(|h| h.element) != Some(element) {
                    self.hover = highlight(surface, element);
                }
            }
            None => self.hover = None,
        }
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.expire(now);
        if self.click_started.is_none() {
            self.hover = None;
        }
    }

    /// Returns the newly selected section, if the click selected one
    pub fn click<S>(&mut self, surface: &S, point: Point, now: Instant) -> Option<SectionMarker>
    where
        S: Surface<Element = E>,
    {
        self.expire(now);
        self.click_started = Some(now);

        let Some(element) = surface.section_at(point) else {
            self.selection = None;
            return None;
        };

        if self.selection.as_ref().map(|s| s.element) == Some(element) {
            self.selection = None;
            return None;
        }

        self.selection = highlight(surface, element);
        self.hover = None;

        self.selection.as_ref().map(|s| SectionMarker {
            id: s.section_id.clone(),
            section_type: s.label.clone(),
        })
    }

    /// Close the click window if it has run its course
    pub fn settle(&mut self, now: Instant) {
        if let Some(started) = self.click_started {
            if now.duration_since(started) >= SETTLE_WINDOW {
                self.click_started = None;
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if let Some(started) = self.click_started {
            if now.duration_since(started) >= SAFETY_DEADLINE {
                tracing::debug!("click window force-cleared");
                self.click_started = None;
            }
        }
    }

    /// Editor-driven selection. `None` clears.
    pub fn select_section<S>(&mut self, surface: &S, id: Option<&SectionId>)
    where
        S: Surface<Element = E>,
    {
        self.selection = id
            .and_then(|id| surface.find_section(id))
            .and_then(|element| highlight(surface, element));
    }

    /// Editor-driven hover. `None` clears.
    pub fn hover_section<S>(&mut self, surface: &S, id: Option<&SectionId>)
    where
        S: Surface<Element = E>,
    {
        self.hover = id
            .and_then(|id| surface.find_section(id))
            .and_then(|element| highlight(surface, element));
    }

    /// Re-resolve both tracks after scroll, resize or a new layout
    ///
    /// Tracks are found again by section id, so they survive a rebuilt
    /// surface; a track whose section is gone is dropped.
    pub fn refresh<S>(&mut self, surface: &S)
    where
        S: Surface<Element = E>,
    {
        self.hover = self.hover.take().and_then(|h| relocate(surface, h));
        self.selection = self.selection.take().and_then(|s| relocate(surface, s));
    }
}

fn highlight<S: Surface>(surface: &S, element: S::Element) -> Option<Highlight<S::Element>> {
    let marker = surface.marker(element)?;
    Some(Highlight {
        element,
        section_id: marker.id.clone(),
        label: marker.section_type.clone(),
        geometry: surface.geometry(element),
    })
}

fn relocate<S: Surface>(surface: &S, track: Highlight<S::Element>) -> Option<Highlight<S::Element>> {
    match surface.find_section(&track.section_id) {
        Some(element) => highlight(surface, element),
        None => {
            tracing::debug!(section_id = %track.section_id, "highlighted section removed");
            None
        }
    }
}
