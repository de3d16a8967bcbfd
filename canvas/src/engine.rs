//! The editor core: document ownership, dispatch, and pointer routing.
//!
//! [`EditorCore`] is what a host embeds. It owns the [`Document`] and is the
//! only caller of the reducer. After each dispatch it brings the per-entity
//! interaction controllers, the hit registry, and the image resolver in line
//! with the new document, and reports what the host must repaint.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::action::Action;
use crate::doc::{CharacterEntity, CharacterPatch, Document, EntityId, EntityKind, RenderMode, Size};
use crate::hit::{HitPart, HitRegistry, hit_test};
use crate::ids::{IdSource, RandomIds};
use crate::input::{InteractionController, PointerEvent, UiState};
use crate::reducer::reduce;
use crate::resolve::{ImageResolver, ImageSlot, ImageSource, Ticket, classify_source};
use crate::snapshot::{ImportError, Snapshot, import};

/// Something the host must react to after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// A character's raster is out of date: it is new, or its size, render
    /// mode, or image changed.
    Redraw(EntityId),
    SelectionChanged(Option<EntityId>),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("an export capture is already in progress")]
    InProgress,
}

/// Document owner and event router.
pub struct EditorCore {
    doc: Document,
    ids: Box<dyn IdSource>,
    controllers: HashMap<EntityId, InteractionController>,
    registry: HitRegistry,
    resolver: ImageResolver,
    ui: UiState,
    /// Chrome visibility to restore when the capture ends.
    chrome_before_capture: bool,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorCore {
    /// An empty document with random ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ids(Box::new(RandomIds::new()))
    }

    #[must_use]
    pub fn with_ids(ids: Box<dyn IdSource>) -> Self {
        Self {
            doc: Document::default(),
            ids,
            controllers: HashMap::new(),
            registry: HitRegistry::new(),
            resolver: ImageResolver::new(),
            ui: UiState::default(),
            chrome_before_capture: true,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn selection(&self) -> Option<&EntityId> {
        self.doc.selected_id.as_ref()
    }

    #[must_use]
    pub fn ui(&self) -> UiState {
        self.ui
    }

    #[must_use]
    pub fn controller(&self, id: &EntityId) -> Option<&InteractionController> {
        self.controllers.get(id)
    }

    /// Mutable access, e.g. to turn dragging off for one entity.
    pub fn controller_mut(&mut self, id: &EntityId) -> Option<&mut InteractionController> {
        self.controllers.get_mut(id)
    }

    #[must_use]
    pub fn registry(&self) -> &HitRegistry {
        &self.registry
    }

    /// The host registers measured regions here.
    pub fn registry_mut(&mut self) -> &mut HitRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_document(&self.doc)
    }

    pub fn set_show_unrendered_styles(&mut self, show: bool) {
        self.ui.show_unrendered_styles = show;
    }

    // --- Dispatch ---

    /// Apply one action and report the resulting effects.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let kind = action.kind_name();
        let replaces_document = matches!(action, Action::LoadTemplate(_) | Action::ResetTemplate);
        let rasters = RasterIndex::capture(&self.doc, &action);
        let entities_before: Vec<(EntityId, EntityKind)> =
            self.doc.entities().map(|(id, kind)| (id.clone(), kind)).collect();
        let selected_before = self.doc.selected_id.clone();

        let doc = std::mem::take(&mut self.doc);
        self.doc = reduce(doc, action, self.ids.as_mut());
        tracing::debug!(action = kind, "dispatched");

        let mut effects = rasters.redraws(&self.doc);
        if selected_before != self.doc.selected_id {
            effects.push(Effect::SelectionChanged(self.doc.selected_id.clone()));
        }
        if replaces_document {
            self.resolver.cancel_all();
        }
        self.sync(&entities_before, replaces_document);
        effects
    }

    /// Decode template text and load it.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] when the text cannot be decoded; the document
    /// is left unchanged.
    pub fn import(&mut self, text: &str) -> Result<Vec<Effect>, ImportError> {
        let action = import(text)?;
        Ok(self.dispatch(action))
    }

    /// Tear down state for removed entities and set up state for new ones.
    ///
    /// After a replaced document, controllers whose id changed kind are
    /// rebuilt and the rest go idle.
    fn sync(&mut self, before: &[(EntityId, EntityKind)], replaced: bool) {
        for (id, kind) in before {
            let now = self.doc.kind_of(id);
            if now.is_none() {
                self.controllers.remove(id);
            }
            if *kind == EntityKind::Character && now != Some(EntityKind::Character) {
                self.resolver.cancel(&ImageSlot::Character(id.clone()));
            }
        }
        if replaced {
            let doc = &self.doc;
            self.controllers.retain(|id, c| doc.kind_of(id) == Some(c.kind()));
            self.controllers.values_mut().for_each(InteractionController::cancel);
        }
        for c in &self.doc.characters {
            self.controllers
                .entry(c.id.clone())
                .or_insert_with(|| InteractionController::new(c.id.clone(), EntityKind::Character));
        }
        for t in &self.doc.texts {
            self.controllers
                .entry(t.id.clone())
                .or_insert_with(|| InteractionController::new(t.id.clone(), EntityKind::Text));
        }
        self.registry.refresh(&self.doc);
    }

    // --- Pointer routing ---

    /// Press anywhere on the surface. A press outside every entity clears
    /// the selection.
    pub fn pointer_down(&mut self, ev: PointerEvent) -> Vec<Effect> {
        // A pointer holds at most one capture. A press while it still holds
        // one means the host lost the release.
        if self.release_pointer(ev) {
            tracing::debug!(pointer = ev.pointer_id, "stale capture released on press");
        }
        let Some(hit) = hit_test(&self.doc, &self.registry, ev.point) else {
            if self.doc.selected_id.is_none() {
                return Vec::new();
            }
            return self.dispatch(Action::deselect());
        };
        let Some(controller) = self.controllers.get_mut(&hit.entity_id) else {
            tracing::debug!(id = %hit.entity_id, "hit entity has no controller");
            return Vec::new();
        };
        match hit.part {
            HitPart::ResizeHandle => {
                controller.resize_handle_down(&self.doc, ev);
                Vec::new()
            }
            HitPart::Body => {
                let actions = controller.pointer_down(&self.doc, ev);
                actions.into_iter().flat_map(|a| self.dispatch(a)).collect()
            }
        }
    }

    /// Move. Routed to whichever controller holds this pointer's capture.
    pub fn pointer_move(&mut self, ev: PointerEvent) -> Vec<Effect> {
        let action = self
            .controllers
            .values_mut()
            .find(|c| c.has_capture(ev.pointer_id))
            .and_then(|c| c.pointer_move(ev));
        match action {
            Some(action) => self.dispatch(action),
            None => Vec::new(),
        }
    }

    /// Release. Returns whether a gesture ended.
    pub fn pointer_up(&mut self, ev: PointerEvent) -> bool {
        self.release_pointer(ev)
    }

    /// Pointer left the surface. Returns whether a gesture ended.
    pub fn pointer_leave(&mut self, ev: PointerEvent) -> bool {
        self.controllers.values_mut().fold(false, |ended, c| c.pointer_leave(ev) | ended)
    }

    /// Release every controller captured by this pointer.
    fn release_pointer(&mut self, ev: PointerEvent) -> bool {
        self.controllers.values_mut().fold(false, |ended, c| c.pointer_up(ev) | ended)
    }

    // --- Export capture ---

    /// Enter capture mode: hide selection chrome, clear the selection, and
    /// drop active gestures so the surface is quiet while the host snapshots it.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InProgress`] if a capture is already running.
    pub fn begin_capture(&mut self) -> Result<Vec<Effect>, CaptureError> {
        if self.ui.capturing {
            return Err(CaptureError::InProgress);
        }
        self.ui.capturing = true;
        self.chrome_before_capture = self.ui.show_unrendered_styles;
        self.ui.show_unrendered_styles = false;
        for controller in self.controllers.values_mut() {
            controller.cancel();
        }
        let effects = if self.doc.selected_id.is_some() { self.dispatch(Action::deselect()) } else { Vec::new() };
        tracing::debug!("capture started");
        Ok(effects)
    }

    /// Leave capture mode and restore chrome. Returns false if no capture was active.
    pub fn end_capture(&mut self) -> bool {
        if !self.ui.capturing {
            return false;
        }
        self.ui.capturing = false;
        self.ui.show_unrendered_styles = self.chrome_before_capture;
        tracing::debug!("capture finished");
        true
    }

    // --- Images ---

    /// Set an image source for `slot`. Inline data URIs apply immediately
    /// and return no ticket; anything else returns a ticket for the host to fetch.
    pub fn request_image(&mut self, slot: ImageSlot, src: &str) -> (Option<Ticket>, Vec<Effect>) {
        if let ImageSlot::Character(id) = &slot {
            if !self.doc.contains(id) {
                tracing::debug!(%id, "image request for missing character ignored");
                return (None, Vec::new());
            }
        }
        if classify_source(src) == ImageSource::DataUri {
            self.resolver.cancel(&slot);
            let effects = self.dispatch(image_action(&slot, src.to_owned()));
            return (None, effects);
        }
        (Some(self.resolver.begin(slot, src)), Vec::new())
    }

    /// Report the outcome of a fetch. Stale tickets change nothing.
    pub fn complete_image(&mut self, ticket: &Ticket, outcome: Result<String, String>) -> Vec<Effect> {
        let Some(value) = self.resolver.finish(ticket, outcome) else {
            return Vec::new();
        };
        self.dispatch(image_action(&ticket.slot, value))
    }
}

fn image_action(slot: &ImageSlot, src: String) -> Action {
    match slot {
        ImageSlot::Background => Action::SetBackgroundImage(Some(src)),
        ImageSlot::Character(id) => Action::update_character(id.clone(), CharacterPatch::image(Some(src))),
    }
}

/// What each character's raster depended on before a dispatch.
///
/// Only characters the action can restyle carry a [`RasterKey`]; the rest
/// are recorded by id so that new characters can be told apart.
struct RasterIndex {
    before: HashMap<EntityId, Option<RasterKey>>,
}

impl RasterIndex {
    fn capture(doc: &Document, action: &Action) -> Self {
        let watched = |id: &EntityId| match action {
            Action::UpdateCharacter { id: target, data } => data.affects_raster() && target == id,
            Action::LoadTemplate(_) | Action::ResetTemplate => true,
            _ => false,
        };
        let before = doc
            .characters
            .iter()
            .map(|c| (c.id.clone(), watched(&c.id).then(|| RasterKey::of(c))))
            .collect();
        Self { before }
    }

    /// Characters that are new in `after` or whose raster inputs changed.
    fn redraws(&self, after: &Document) -> Vec<Effect> {
        after
            .characters
            .iter()
            .filter(|c| match self.before.get(&c.id) {
                None => true,
                Some(None) => false,
                Some(Some(key)) => *key != RasterKey::of(c),
            })
            .map(|c| Effect::Redraw(c.id.clone()))
            .collect()
    }
}

/// Raster inputs of one character. The image is kept as a digest so large
/// data URIs are never copied.
#[derive(PartialEq)]
struct RasterKey {
    size: Size,
    mode: RenderMode,
    image: Option<u64>,
}

impl RasterKey {
    fn of(c: &CharacterEntity) -> Self {
        let image = c.image_data_url.as_deref().map(|url| {
            let mut hasher = DefaultHasher::new();
            url.hash(&mut hasher);
            hasher.finish()
        });
        Self { size: c.size, mode: c.image_render_mode, image }
    }
}
