//! Image source resolution.
//!
//! The background and each character have one image slot. Setting a source
//! begins a request and hands the host a [`Ticket`]; the host fetches
//! `ticket.fetch_url` and reports back with [`ImageResolver::finish`]. A
//! newer request for the same slot supersedes older ones, so a slow
//! completion can never overwrite a faster, more recent one.
//!
//! Failures are not errors: a failed slot falls back to the original
//! source string.

#[cfg(test)]
#[path = "resolve_test.rs"]
mod resolve_test;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::doc::EntityId;

static DRIVE_LINK: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"drive\.google\.com/(?:file/d/|open\?id=)([A-Za-z0-9_-]+)"));

const DRIVE_THUMBNAIL_BASE: &str = "https://drive.google.com/thumbnail";

/// Requested width for Drive thumbnails, large enough to act as the original.
const DRIVE_THUMBNAIL_SIZE: &str = "w4000";

/// A resolvable image target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Background,
    Character(EntityId),
}

/// What kind of string an image source is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:` URI; usable as is.
    DataUri,
    /// A Google Drive share link, fetched through the thumbnail endpoint.
    DriveShare { file_id: String },
    /// Any other URL.
    Remote,
}

#[must_use]
pub fn classify_source(src: &str) -> ImageSource {
    let trimmed = src.trim();
    if trimmed.starts_with("data:") {
        return ImageSource::DataUri;
    }
    match drive_file_id(trimmed) {
        Some(file_id) => ImageSource::DriveShare { file_id },
        None => ImageSource::Remote,
    }
}

/// File id from a `drive.google.com/file/d/<id>` or `open?id=<id>` link.
#[must_use]
pub fn drive_file_id(src: &str) -> Option<String> {
    let Ok(re) = DRIVE_LINK.as_ref() else {
        return None;
    };
    re.captures(src).and_then(|c| c.get(1)).map(|m| m.as_str().to_owned())
}

#[must_use]
pub fn drive_thumbnail_url(file_id: &str) -> String {
    format!("{DRIVE_THUMBNAIL_BASE}?id={file_id}&sz={DRIVE_THUMBNAIL_SIZE}")
}

/// The URL to actually fetch for `src`.
#[must_use]
pub fn fetch_url(src: &str) -> String {
    match classify_source(src) {
        ImageSource::DriveShare { file_id } => drive_thumbnail_url(&file_id),
        ImageSource::DataUri | ImageSource::Remote => src.trim().to_owned(),
    }
}

/// Per-slot request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveState {
    Pending,
    /// Loaded; the handle is whatever the host produced (blob URL, data URI).
    Ready(String),
    /// Load failed; the original source is used directly.
    Failed { fallback: String },
}

/// Handle for one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub slot: ImageSlot,
    pub generation: u64,
    /// The source as set by the user.
    pub source: String,
    pub fetch_url: String,
}

#[derive(Debug, Clone)]
struct SlotEntry {
    generation: u64,
    state: ResolveState,
}

/// Tracks the latest request per slot.
#[derive(Debug, Default)]
pub struct ImageResolver {
    next_generation: u64,
    slots: HashMap<ImageSlot, SlotEntry>,
}

impl ImageResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving `src` for `slot`, superseding any earlier request.
    pub fn begin(&mut self, slot: ImageSlot, src: &str) -> Ticket {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(prev) = self.slots.get(&slot) {
            if prev.state == ResolveState::Pending {
                tracing::debug!(?slot, superseded = prev.generation, "image request superseded");
            }
        }
        self.slots.insert(slot.clone(), SlotEntry { generation, state: ResolveState::Pending });
        Ticket { slot, generation, source: src.to_owned(), fetch_url: fetch_url(src) }
    }

    /// Record the outcome of `ticket`. Returns the string to assign to the
    /// slot (the loaded handle, or the original source on failure), or
    /// `None` when the ticket has been superseded or cancelled.
    pub fn finish(&mut self, ticket: &Ticket, outcome: Result<String, String>) -> Option<String> {
        let Some(entry) = self.slots.get_mut(&ticket.slot) else {
            tracing::debug!(slot = ?ticket.slot, "completion for cancelled slot dropped");
            return None;
        };
        if entry.generation != ticket.generation {
            tracing::debug!(
                slot = ?ticket.slot,
                stale = ticket.generation,
                current = entry.generation,
                "stale image completion dropped"
            );
            return None;
        }
        match outcome {
            Ok(handle) => {
                entry.state = ResolveState::Ready(handle.clone());
                Some(handle)
            }
            Err(reason) => {
                tracing::warn!(slot = ?ticket.slot, %reason, "image load failed; using original source");
                entry.state = ResolveState::Failed { fallback: ticket.source.clone() };
                Some(ticket.source.clone())
            }
        }
    }

    /// Forget `slot`; any outstanding ticket for it becomes stale.
    pub fn cancel(&mut self, slot: &ImageSlot) -> bool {
        self.slots.remove(slot).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    #[must_use]
    pub fn state(&self, slot: &ImageSlot) -> Option<&ResolveState> {
        self.slots.get(slot).map(|e| &e.state)
    }
}
