//! Hit-testing and the click-outside registry.
//!
//! Each placed entity registers a [`HitRegion`] under its id. A press that
//! lands in no registered region is a click outside every entity, which
//! clears the selection. Regions are either measured by the host (pinned) or
//! estimated from the document on [`HitRegistry::refresh`].

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use std::collections::HashMap;
use std::fmt;

use crate::consts::{RESIZE_HANDLE_PX, TEXT_ADVANCE_EM, TEXT_LINE_HEIGHT_EM};
use crate::doc::{Document, EntityId, InputType, TextEntity, WidthMode};
use crate::geom::{Point, Rect};
use crate::render::{PaintItem, paint_order};

/// A region of the canvas that belongs to one entity.
pub trait HitRegion: fmt::Debug {
    fn contains(&self, pt: Point) -> bool;
}

impl HitRegion for Rect {
    fn contains(&self, pt: Point) -> bool {
        Rect::contains(self, pt)
    }
}

#[derive(Debug)]
struct Entry {
    region: Box<dyn HitRegion>,
    /// Supplied by the host; `refresh` leaves it alone.
    pinned: bool,
}

/// Entity id to hit region.
#[derive(Debug, Default)]
pub struct HitRegistry {
    entries: HashMap<EntityId, Entry>,
}

impl HitRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host-measured region for `id`, replacing any previous one.
    pub fn subscribe(&mut self, id: EntityId, region: Box<dyn HitRegion>) {
        self.entries.insert(id, Entry { region, pinned: true });
    }

    /// Remove the region for `id`. Returns whether one was registered.
    pub fn unsubscribe(&mut self, id: &EntityId) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Bring the registry in line with `doc`: drop regions of entities that
    /// no longer exist and re-estimate every region the host has not pinned.
    pub fn refresh(&mut self, doc: &Document) {
        self.entries.retain(|id, _| doc.contains(id));
        for id in doc.entity_ids() {
            if self.entries.get(id).is_some_and(|e| e.pinned) {
                continue;
            }
            if let Some(bounds) = entity_bounds(doc, id) {
                self.entries.insert(id.clone(), Entry { region: Box::new(bounds), pinned: false });
            }
        }
    }

    /// Drop every region.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_registered(&self, id: &EntityId) -> bool {
        self.entries.contains_key(id)
    }

    /// Whether the region registered for `id` contains `pt`.
    #[must_use]
    pub fn region_contains(&self, id: &EntityId, pt: Point) -> Option<bool> {
        self.entries.get(id).map(|e| e.region.contains(pt))
    }

    /// Whether any registered region contains `pt`.
    #[must_use]
    pub fn contains_point(&self, pt: Point) -> bool {
        self.entries.values().any(|e| e.region.contains(pt))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which part of an entity was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub entity_id: EntityId,
    pub part: HitPart,
}

/// Estimated bounds of an entity in canvas space.
#[must_use]
pub fn entity_bounds(doc: &Document, id: &EntityId) -> Option<Rect> {
    if let Some(c) = doc.character(id) {
        return Some(Rect::at(c.position, c.size));
    }
    doc.text(id).map(text_bounds)
}

#[allow(clippy::cast_precision_loss)]
fn text_bounds(t: &TextEntity) -> Rect {
    let font_size = f64::from(t.font_size);
    let text = t.display_text();
    let lines: Vec<&str> = match t.input_type {
        InputType::Single => vec![text],
        InputType::Multi => text.split('\n').collect(),
    };
    let height = lines.len().max(1) as f64 * font_size * TEXT_LINE_HEIGHT_EM;
    let width = match t.width_mode {
        WidthMode::Fixed => t.width,
        WidthMode::Auto => {
            let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
            longest as f64 * font_size * TEXT_ADVANCE_EM
        }
    };
    Rect::new(t.position.x, t.position.y, width, height)
}

/// The resize handle square at the bottom-right corner of `bounds`.
#[must_use]
pub fn resize_handle(bounds: Rect) -> Rect {
    Rect::new(bounds.right() - RESIZE_HANDLE_PX, bounds.bottom() - RESIZE_HANDLE_PX, RESIZE_HANDLE_PX, RESIZE_HANDLE_PX)
}

/// Whether the entity shows a resize handle: characters always, text blocks
/// only with a fixed width.
#[must_use]
pub fn has_resize_handle(doc: &Document, id: &EntityId) -> bool {
    doc.character(id).is_some() || doc.text(id).is_some_and(|t| t.width_mode == WidthMode::Fixed)
}

/// Find the entity under `pt`. The selected entity's resize handle wins,
/// then bodies are tested topmost first.
#[must_use]
pub fn hit_test(doc: &Document, registry: &HitRegistry, pt: Point) -> Option<Hit> {
    if let Some(selected) = doc.selected_id.as_ref() {
        if has_resize_handle(doc, selected) {
            if let Some(bounds) = entity_bounds(doc, selected) {
                if resize_handle(bounds).contains(pt) {
                    return Some(Hit { entity_id: selected.clone(), part: HitPart::ResizeHandle });
                }
            }
        }
    }

    paint_order(doc).into_iter().rev().find_map(|item| {
        let id = match item {
            PaintItem::Background => return None,
            PaintItem::Character(id) | PaintItem::Text(id) => id,
        };
        let inside = match registry.region_contains(&id, pt) {
            Some(inside) => inside,
            None => entity_bounds(doc, &id).is_some_and(|b| b.contains(pt)),
        };
        inside.then_some(Hit { entity_id: id, part: HitPart::Body })
    })
}
