//! Template operations behind the CLI subcommands.
//!
//! Every operation goes through [`EditorCore`] so the command line applies
//! exactly the same reducer, defaults, and import rules as the editor.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use std::io::{self, Read};
use std::path::Path;

use canvas::action::Action;
use canvas::doc::{Document, TemplatePayload};
use canvas::engine::EditorCore;
use canvas::ids::IdSource;
use canvas::snapshot::{ImportError, Snapshot};
use share::{ExportFormat, ShareError};
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read {source_name}: {source}")]
    Read { source_name: String, source: io::Error },
    #[error("failed to import template: {0}")]
    Import(#[from] ImportError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error("link has no `template` parameter")]
    MissingTemplateParam,
    #[error("invalid action on line {line}: {source}")]
    Action { line: usize, source: serde_json::Error },
}

/// Result of replaying an action list.
#[derive(Debug)]
pub struct ReplayReport {
    pub document: Document,
    pub applied: usize,
    /// Actions of an unrecognized type.
    pub skipped: usize,
}

/// Read template text from `-` (stdin), a file path, or the literal text itself.
///
/// # Errors
///
/// [`TemplateError::Read`] when stdin or the file cannot be read.
pub fn read_source(source: &str) -> Result<String, TemplateError> {
    let read_err = |e: io::Error| TemplateError::Read { source_name: source.to_owned(), source: e };
    if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_err)?;
        return Ok(text);
    }
    let path = Path::new(source);
    if path.is_file() {
        return std::fs::read_to_string(path).map_err(read_err);
    }
    Ok(source.to_owned())
}

/// Decode template text (either form) into a document.
///
/// # Errors
///
/// [`TemplateError::Import`] when the text is not a readable template.
pub fn load_document(text: &str) -> Result<Document, TemplateError> {
    let mut core = EditorCore::new();
    core.import(text)?;
    let doc = core.document().clone();
    info!(characters = doc.characters.len(), texts = doc.texts.len(), "template loaded");
    Ok(doc)
}

/// Encode the exportable part of `doc`.
///
/// # Errors
///
/// [`TemplateError::Share`] if encoding fails.
pub fn render(doc: &Document, format: ExportFormat) -> Result<String, TemplateError> {
    Ok(Snapshot::from_document(doc).encode(format)?)
}

/// Build a `?template=` share link for `doc`.
///
/// # Errors
///
/// [`TemplateError::Share`], including when the link exceeds `config.max_link_len`.
pub fn share_link_for(doc: &Document, config: &AppConfig) -> Result<String, TemplateError> {
    let token = Snapshot::from_document(doc).to_compact()?;
    let link = share::share_link(&config.base_url, &token, config.max_link_len)?;
    info!(len = link.len(), "share link built");
    Ok(link)
}

/// Load the template carried by a share link.
///
/// # Errors
///
/// [`TemplateError::MissingTemplateParam`] when the link carries no
/// template, otherwise as [`load_document`].
pub fn open_link(url: &str) -> Result<Document, TemplateError> {
    let token = share::template_param(url.trim()).ok_or(TemplateError::MissingTemplateParam)?;
    load_document(&token)
}

/// Apply newline-delimited JSON actions to `doc`. Blank lines and lines
/// starting with `#` are ignored; actions of unknown type are skipped.
///
/// # Errors
///
/// [`TemplateError::Action`] for a line that is not a well-formed action.
pub fn replay(doc: &Document, actions: &str, ids: Box<dyn IdSource>) -> Result<ReplayReport, TemplateError> {
    let mut core = EditorCore::with_ids(ids);
    core.dispatch(Action::LoadTemplate(TemplatePayload::from(doc)));

    let mut applied = 0_usize;
    let mut skipped = 0_usize;
    for (index, line) in actions.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let action: Action =
            serde_json::from_str(trimmed).map_err(|source| TemplateError::Action { line: index + 1, source })?;
        if action == Action::Unknown {
            warn!(line = index + 1, "skipping action of unknown type");
            skipped += 1;
            continue;
        }
        core.dispatch(action);
        applied += 1;
    }
    info!(applied, skipped, "replay finished");
    Ok(ReplayReport { document: core.document().clone(), applied, skipped })
}
