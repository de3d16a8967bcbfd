#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{CharacterEntity, ImageOrder, Position, Size, TextEntity};

fn id(s: &str) -> EntityId {
    EntityId::from(s)
}

fn character_at(name: &str, x: f64, y: f64, w: f64, h: f64) -> CharacterEntity {
    let mut c = CharacterEntity::new(id(name));
    c.position = Position::new(x, y);
    c.size = Size::new(w, h);
    c
}

/// Two overlapping characters and a text block on top of both.
fn scene() -> Document {
    let mut doc = Document::default();
    doc.characters.push(character_at("low", 0.0, 0.0, 100.0, 100.0));
    doc.characters.push(character_at("high", 50.0, 50.0, 100.0, 100.0));
    let mut t = TextEntity::new(id("label"));
    t.position = Position::new(60.0, 60.0);
    t.text = "abcd".into();
    t.font_size = 10;
    doc.texts.push(t);
    doc
}

#[derive(Debug)]
struct Circle {
    center: Point,
    radius: f64,
}

impl HitRegion for Circle {
    fn contains(&self, pt: Point) -> bool {
        (pt.x - self.center.x).hypot(pt.y - self.center.y) <= self.radius
    }
}

// =============================================================
// Bounds
// =============================================================

#[test]
fn character_bounds_are_position_and_size() {
    assert_eq!(entity_bounds(&scene(), &id("high")), Some(Rect::new(50.0, 50.0, 100.0, 100.0)));
}

#[test]
fn auto_width_text_bounds_are_estimated() {
    let bounds = entity_bounds(&scene(), &id("label")).unwrap();
    assert_eq!(bounds.x, 60.0);
    assert!((bounds.width - 24.0).abs() < 1e-9);
    assert!((bounds.height - 12.0).abs() < 1e-9);
}

#[test]
fn fixed_width_multiline_text_bounds() {
    let mut t = TextEntity::new(id("t"));
    t.width_mode = WidthMode::Fixed;
    t.width = 180.0;
    t.input_type = InputType::Multi;
    t.text = "one\ntwo\nthree".into();
    t.font_size = 20;
    let mut doc = Document::default();
    doc.texts.push(t);
    let bounds = entity_bounds(&doc, &id("t")).unwrap();
    assert_eq!(bounds.width, 180.0);
    assert!((bounds.height - 72.0).abs() < 1e-9);
}

#[test]
fn missing_entity_has_no_bounds() {
    assert_eq!(entity_bounds(&scene(), &id("ghost")), None);
}

#[test]
fn resize_handle_sits_at_bottom_right() {
    assert_eq!(resize_handle(Rect::new(0.0, 0.0, 100.0, 50.0)), Rect::new(84.0, 34.0, 16.0, 16.0));
}

// =============================================================
// Hit testing
// =============================================================

#[test]
fn topmost_entity_wins() {
    let doc = scene();
    let registry = HitRegistry::new();
    assert_eq!(hit_test(&doc, &registry, Point::new(10.0, 10.0)).unwrap().entity_id, id("low"));
    assert_eq!(hit_test(&doc, &registry, Point::new(120.0, 120.0)).unwrap().entity_id, id("high"));
    assert_eq!(hit_test(&doc, &registry, Point::new(62.0, 62.0)).unwrap().entity_id, id("label"));
    assert_eq!(hit_test(&doc, &registry, Point::new(500.0, 500.0)), None);
}

#[test]
fn background_order_does_not_block_entities() {
    let mut doc = scene();
    doc.background.image_order = ImageOrder::Top;
    assert_eq!(hit_test(&doc, &HitRegistry::new(), Point::new(10.0, 10.0)).unwrap().entity_id, id("low"));
}

#[test]
fn selected_handle_beats_higher_body() {
    let mut doc = scene();
    doc.selected_id = Some(id("low"));
    // (95, 95) is in low's handle and inside high's body.
    let hit = hit_test(&doc, &HitRegistry::new(), Point::new(95.0, 95.0)).unwrap();
    assert_eq!(hit, Hit { entity_id: id("low"), part: HitPart::ResizeHandle });
}

#[test]
fn auto_width_text_has_no_handle() {
    let mut doc = scene();
    doc.selected_id = Some(id("label"));
    assert!(!has_resize_handle(&doc, &id("label")));
    let hit = hit_test(&doc, &HitRegistry::new(), Point::new(83.0, 71.0)).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn registered_region_overrides_estimate() {
    let doc = scene();
    let mut registry = HitRegistry::new();
    registry.subscribe(id("high"), Box::new(Rect::new(140.0, 140.0, 5.0, 5.0)));
    // Inside high's estimated bounds but outside its registered region.
    assert_eq!(hit_test(&doc, &registry, Point::new(90.0, 90.0)).unwrap().entity_id, id("low"));
    assert_eq!(hit_test(&doc, &registry, Point::new(142.0, 142.0)).unwrap().entity_id, id("high"));
}

// =============================================================
// Registry
// =============================================================

#[test]
fn refresh_registers_every_entity() {
    let mut registry = HitRegistry::new();
    registry.refresh(&scene());
    assert_eq!(registry.len(), 3);
    assert!(registry.contains_point(Point::new(10.0, 10.0)));
    assert!(!registry.contains_point(Point::new(400.0, 10.0)));
}

#[test]
fn refresh_tears_down_removed_entities() {
    let mut doc = scene();
    let mut registry = HitRegistry::new();
    registry.subscribe(id("low"), Box::new(Rect::new(0.0, 0.0, 1.0, 1.0)));
    registry.refresh(&doc);
    doc.characters.retain(|c| c.id != id("low"));
    registry.refresh(&doc);
    assert!(!registry.is_registered(&id("low")));
    assert_eq!(registry.len(), 2);
}

#[test]
fn refresh_keeps_pinned_regions() {
    let mut registry = HitRegistry::new();
    registry.subscribe(id("low"), Box::new(Circle { center: Point::new(300.0, 300.0), radius: 5.0 }));
    registry.refresh(&scene());
    assert_eq!(registry.region_contains(&id("low"), Point::new(302.0, 301.0)), Some(true));
    assert_eq!(registry.region_contains(&id("low"), Point::new(10.0, 10.0)), Some(false));
}

#[test]
fn refresh_follows_moved_entities() {
    let mut doc = scene();
    let mut registry = HitRegistry::new();
    registry.refresh(&doc);
    doc.characters[0].position = Position::new(1000.0, 1000.0);
    registry.refresh(&doc);
    assert_eq!(registry.region_contains(&id("low"), Point::new(1010.0, 1010.0)), Some(true));
}

#[test]
fn unsubscribe_reports_presence() {
    let mut registry = HitRegistry::new();
    registry.subscribe(id("a"), Box::new(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert!(registry.unsubscribe(&id("a")));
    assert!(!registry.unsubscribe(&id("a")));
    assert!(registry.is_empty());
}

#[test]
fn clear_empties_registry() {
    let mut registry = HitRegistry::new();
    registry.refresh(&scene());
    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.region_contains(&id("low"), Point::new(1.0, 1.0)), None);
}
