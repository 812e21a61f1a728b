//! Rich-text input synchronizer.
//!
//! Owns the editing surface's backing markup, a caret into it, and the
//! [`Draft`] derived from it. The draft is always replaced as a whole, so no
//! reader can observe `html` and `text` out of step.

use serde::{Deserialize, Serialize};

use crate::markup::{extract_text, is_visually_empty, plain_text_to_markup};

/// The uncommitted input value: raw markup plus its plain-text projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub html: String,
    pub text: String,
}

impl Draft {
    fn from_markup(html: String) -> Self {
        let text = extract_text(&html);
        Self { html, text }
    }

    /// The draft's text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Clipboard content offered by a paste gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PastePayload {
    /// `text/html` representation, if the source offered one.
    pub html: Option<String>,
    /// `text/plain` representation.
    pub text: Option<String>,
}

impl PastePayload {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            text: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: Some(text.into()),
        }
    }

    /// The markup fragment to insert: rich markup verbatim when present,
    /// otherwise the escaped plain text with explicit line breaks.
    pub fn to_fragment(&self) -> Option<String> {
        if let Some(html) = self.html.as_deref().filter(|h| !h.is_empty()) {
            return Some(html.to_string());
        }
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(plain_text_to_markup)
    }
}

/// Keeps a [`Draft`] consistent with the live editing surface.
#[derive(Debug, Clone)]
pub struct RichInputSynchronizer {
    surface: String,
    caret: usize,
    draft: Draft,
    editable: bool,
}

impl Default for RichInputSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RichInputSynchronizer {
    /// Create a synchronizer over an empty, editable surface.
    pub fn new() -> Self {
        Self {
            surface: String::new(),
            caret: 0,
            draft: Draft::default(),
            editable: true,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// The surface's current backing markup.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Enable or disable the surface. A disabled surface ignores edits and
    /// pastes.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Move the caret, clamped to the surface and snapped back to a char
    /// boundary.
    pub fn set_caret(&mut self, offset: usize) {
        let mut offset = offset.min(self.surface.len());
        while !self.surface.is_char_boundary(offset) {
            offset -= 1;
        }
        self.caret = offset;
    }

    /// The surface content was changed by the user. Replaces the backing
    /// markup, places the caret at the end and captures a new draft.
    ///
    /// Returns false when the surface is not editable.
    pub fn edit(&mut self, markup: impl Into<String>) -> bool {
        if !self.editable {
            tracing::debug!("Edit ignored: input surface is disabled");
            return false;
        }
        self.surface = markup.into();
        self.caret = self.surface.len();
        self.capture();
        true
    }

    /// Insert the paste payload at the caret.
    ///
    /// The draft is left untouched; callers re-run
    /// [`capture`](Self::capture) once the insertion has settled. Returns
    /// false when nothing was inserted.
    pub fn insert_paste(&mut self, payload: &PastePayload) -> bool {
        if !self.editable {
            tracing::debug!("Paste ignored: input surface is disabled");
            return false;
        }
        let Some(fragment) = payload.to_fragment() else {
            return false;
        };
        self.set_caret(self.caret);
        self.surface.insert_str(self.caret, &fragment);
        self.caret += fragment.len();
        tracing::debug!(
            fragment_len = fragment.len(),
            rich = payload.html.is_some(),
            "Paste inserted at caret"
        );
        true
    }

    /// Read the surface and derive the draft from it.
    ///
    /// Visually empty markup collapses both the draft and the surface to the
    /// empty string.
    pub fn capture(&mut self) {
        if is_visually_empty(&self.surface) {
            self.surface.clear();
            self.caret = 0;
            self.draft = Draft::default();
            return;
        }
        self.draft = Draft::from_markup(self.surface.clone());
    }

    /// Reset the draft and the surface to empty.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.caret = 0;
        self.draft = Draft::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::extract_text;

    // ---- Edit ----

    #[test]
    fn test_edit_derives_text() {
        let mut input = RichInputSynchronizer::new();
        assert!(input.edit("<b>Revenue</b> by <i>region</i>"));
        assert_eq!(input.draft().html, "<b>Revenue</b> by <i>region</i>");
        assert_eq!(input.draft().text, "Revenue by region");
        assert_eq!(input.caret(), input.surface().len());
    }

    #[test]
    fn test_edit_visually_empty_collapses() {
        let mut input = RichInputSynchronizer::new();
        input.edit("something");
        input.edit("<div><br></div>");
        assert_eq!(input.draft(), &Draft::default());
        assert_eq!(input.surface(), "");
        assert_eq!(input.caret(), 0);
    }

    #[test]
    fn test_edit_ignored_when_disabled() {
        let mut input = RichInputSynchronizer::new();
        input.edit("keep");
        input.set_editable(false);
        assert!(!input.edit("replace"));
        assert_eq!(input.draft().text, "keep");
    }

    #[test]
    fn test_draft_text_matches_extraction() {
        let mut input = RichInputSynchronizer::new();
        for markup in ["a<br>b", "<p>x</p><ul><li>y</li></ul>", "&amp; plain", "<br>"] {
            input.edit(markup);
            assert_eq!(input.draft().text, extract_text(input.draft().html.as_str()));
        }
    }

    // ---- Paste ----

    #[test]
    fn test_paste_plain_text_inserts_breaks() {
        let mut input = RichInputSynchronizer::new();
        assert!(input.insert_paste(&PastePayload::plain("a\nb")));
        assert_eq!(input.surface(), "a<br>b");
        // Not captured until the insertion settles.
        assert_eq!(input.draft(), &Draft::default());
        input.capture();
        assert_eq!(input.draft().text, "a\nb");
    }

    #[test]
    fn test_paste_prefers_rich_markup() {
        let mut input = RichInputSynchronizer::new();
        let payload = PastePayload {
            html: Some("<table><tr><td>1</td><td>2</td></tr></table>".to_string()),
            text: Some("1\t2".to_string()),
        };
        input.insert_paste(&payload);
        input.capture();
        assert_eq!(input.draft().html, "<table><tr><td>1</td><td>2</td></tr></table>");
        assert_eq!(input.draft().text, "1\t2");
    }

    #[test]
    fn test_paste_inserts_at_caret() {
        let mut input = RichInputSynchronizer::new();
        input.edit("ac");
        input.set_caret(1);
        input.insert_paste(&PastePayload::html("<b>b</b>"));
        assert_eq!(input.surface(), "a<b>b</b>c");
        assert_eq!(input.caret(), "a<b>b</b>".len());
    }

    #[test]
    fn test_paste_empty_payload_is_noop() {
        let mut input = RichInputSynchronizer::new();
        assert!(!input.insert_paste(&PastePayload::default()));
        assert!(!input.insert_paste(&PastePayload::plain("")));
        assert_eq!(input.surface(), "");
    }

    #[test]
    fn test_paste_ignored_when_disabled() {
        let mut input = RichInputSynchronizer::new();
        input.set_editable(false);
        assert!(!input.insert_paste(&PastePayload::plain("x")));
    }

    // ---- Caret ----

    #[test]
    fn test_set_caret_clamps_and_snaps_to_char_boundary() {
        let mut input = RichInputSynchronizer::new();
        input.edit("h\u{00e9}");
        input.set_caret(100);
        assert_eq!(input.caret(), 3);
        input.set_caret(2);
        assert_eq!(input.caret(), 1);
    }

    // ---- Clear ----

    #[test]
    fn test_clear_resets_everything() {
        let mut input = RichInputSynchronizer::new();
        input.edit("<p>draft</p>");
        input.clear();
        assert_eq!(input.surface(), "");
        assert!(input.draft().is_blank());
    }
}
