//! Template document model and editor core for the character card editor.
//!
//! The crate owns everything about a card template that is independent of a
//! browser: the document and its reducer, the portable snapshot format,
//! per-entity pointer gestures, hit-testing, compositing order, and image
//! source resolution. A host wires DOM events into [`engine::EditorCore`]
//! and repaints according to the [`engine::Effect`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorCore`]: document owner, dispatch, pointer routing, capture guard |
//! | [`doc`] | Document, entities, patches, and load payloads |
//! | [`action`] | The closed action set and its wire format |
//! | [`reducer`] | `(document, action) -> document` |
//! | [`snapshot`] | Export snapshots and import decoding |
//! | [`ids`] | Entity id generation |
//! | [`input`] | Pointer events and the per-entity gesture state machine |
//! | [`hit`] | Hit-testing and the click-outside registry |
//! | [`render`] | Compositing order and image fit geometry |
//! | [`resolve`] | Image source classification and request supersession |
//! | [`geom`] | Points and rectangles |
//! | [`consts`] | Shared numeric constants (minimum sizes, defaults, handle size) |

pub mod action;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod ids;
pub mod input;
pub mod reducer;
pub mod render;
pub mod resolve;
pub mod snapshot;
