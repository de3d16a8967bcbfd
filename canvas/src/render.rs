//! Compositing order and image fit geometry.
//!
//! Nothing here touches a drawing surface. The host walks [`paint_order`]
//! bottom to top and, for each character with a loaded image, draws the
//! source rectangle of the image into the destination rectangle computed by
//! [`fit`]. Destination rectangles are relative to the character's box.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::doc::{Document, EntityId, ImageOrder, RenderMode, Size};
use crate::geom::Rect;

/// A compositing layer. Texts are always topmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Background,
    Characters,
    Texts,
}

impl ImageOrder {
    /// Layers from bottom to top for this background order.
    #[must_use]
    pub fn layers(self) -> [Layer; 3] {
        match self {
            ImageOrder::Bottom => [Layer::Background, Layer::Characters, Layer::Texts],
            ImageOrder::Top => [Layer::Characters, Layer::Background, Layer::Texts],
        }
    }
}

/// One thing to paint, in bottom-to-top order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaintItem {
    Background,
    Character(EntityId),
    Text(EntityId),
}

impl PaintItem {
    #[must_use]
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            PaintItem::Background => None,
            PaintItem::Character(id) | PaintItem::Text(id) => Some(id),
        }
    }
}

/// Every item in the document, bottom first. Within a layer, later entries
/// in the document's lists paint on top.
#[must_use]
pub fn paint_order(doc: &Document) -> Vec<PaintItem> {
    let mut items = Vec::with_capacity(1 + doc.characters.len() + doc.texts.len());
    for layer in doc.background.image_order.layers() {
        match layer {
            Layer::Background => items.push(PaintItem::Background),
            Layer::Characters => items.extend(doc.characters.iter().map(|c| PaintItem::Character(c.id.clone()))),
            Layer::Texts => items.extend(doc.texts.iter().map(|t| PaintItem::Text(t.id.clone()))),
        }
    }
    items
}

/// A `drawImage`-style source and destination pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawPlan {
    /// Region of the source image, in image pixels.
    pub source: Rect,
    /// Region of the target box, in box pixels. May extend past the box.
    pub dest: Rect,
}

/// Geometry for drawing an `image`-sized picture into a `target`-sized box.
///
/// Returns `None` when either size is empty, since nothing can be drawn.
#[must_use]
pub fn fit(mode: RenderMode, image: Size, target: Size) -> Option<DrawPlan> {
    if image.width <= 0.0 || image.height <= 0.0 || target.width <= 0.0 || target.height <= 0.0 {
        return None;
    }
    let full_source = Rect::new(0.0, 0.0, image.width, image.height);
    let plan = match mode {
        RenderMode::Contain => {
            let scale = (target.width / image.width).min(target.height / image.height);
            DrawPlan { source: full_source, dest: centered(image.width * scale, image.height * scale, target) }
        }
        RenderMode::Cover => {
            let scale = (target.width / image.width).max(target.height / image.height);
            let crop_w = target.width / scale;
            let crop_h = target.height / scale;
            DrawPlan {
                source: Rect::new((image.width - crop_w) / 2.0, (image.height - crop_h) / 2.0, crop_w, crop_h),
                dest: Rect::new(0.0, 0.0, target.width, target.height),
            }
        }
        RenderMode::Fill => DrawPlan { source: full_source, dest: Rect::new(0.0, 0.0, target.width, target.height) },
        RenderMode::None => DrawPlan { source: full_source, dest: centered(image.width, image.height, target) },
    };
    Some(plan)
}

fn centered(width: f64, height: f64, target: Size) -> Rect {
    Rect::new((target.width - width) / 2.0, (target.height - height) / 2.0, width, height)
}
