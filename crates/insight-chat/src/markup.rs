//! Plain-text projection of editor markup.
//!
//! The editing surface produces a small HTML subset: inline formatting
//! (`b`, `i`, `u`, `span`, ...), paragraphs and `div`s, lists, line breaks and
//! tables. [`extract_text`] turns that markup into the text a reader sees:
//!
//! - tags are stripped and entities decoded;
//! - runs of ASCII whitespace collapse to a single space, and whitespace at
//!   the start of a line is dropped;
//! - `<br>` becomes `\n`;
//! - block elements (`p`, `div`, `li`, `tr`, headings, ...) start and end on
//!   their own line;
//! - table cells in the same row are separated by `\t`;
//! - `script`/`style` bodies and comments produce nothing;
//! - leading and trailing line separators are dropped.
//!
//! Unknown tags are treated as inline. A `<` that does not open a well-formed
//! tag is kept as text.

use std::sync::LazyLock;

use regex::Regex;

/// Markup editors leave behind when the user deletes everything.
static VISUALLY_EMPTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:<div>\s*<br\s*/?>\s*</div>|<p>\s*<br\s*/?>\s*</p>|<p>\s*</p>|<br\s*/?>)$")
        .expect("Invalid empty-markup regex")
});

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "dd",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "tfoot",
    "thead",
    "tr",
    "ul",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Returns true when `markup` renders as nothing: blank, or one of the
/// placeholder structures editors insert into an emptied surface.
pub fn is_visually_empty(markup: &str) -> bool {
    let trimmed = markup.trim();
    trimmed.is_empty() || VISUALLY_EMPTY.is_match(trimmed)
}

/// Convert a plain-text clipboard payload into insertable markup.
///
/// Markup-significant characters are escaped and every line terminator
/// (`\r\n`, `\r`, `\n`) becomes `<br>`.
pub fn plain_text_to_markup(text: &str) -> String {
    html_escape::encode_text(text)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

/// Extract the visible text of `markup`.
pub fn extract_text(markup: &str) -> String {
    let mut sink = TextSink::default();
    let mut rest = markup;

    while !rest.is_empty() {
        let Some(pos) = rest.find('<') else {
            sink.push_text(&html_escape::decode_html_entities(rest));
            break;
        };
        if pos > 0 {
            sink.push_text(&html_escape::decode_html_entities(&rest[..pos]));
        }
        rest = &rest[pos..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        match parse_tag(rest) {
            Some((tag, consumed)) => {
                rest = &rest[consumed..];
                if let Tag::Open {
                    ref name,
                    self_closing: false,
                } = tag
                {
                    if RAW_TEXT_TAGS.contains(&name.as_str()) {
                        rest = skip_raw_text(rest, name);
                        continue;
                    }
                }
                sink.apply(&tag);
            }
            None => {
                sink.push_text("<");
                rest = &rest[1..];
            }
        }
    }

    sink.finish()
}

// =============================================================================
// Tag scanning
// =============================================================================

#[derive(Debug, PartialEq)]
enum Tag {
    Open { name: String, self_closing: bool },
    Close { name: String },
    /// `<!DOCTYPE ...>`, `<?xml ...?>` and similar.
    Declaration,
}

/// Parse the tag at the start of `s` (which begins with `<`).
///
/// Returns the tag and the number of bytes it spans, or `None` when `s` does
/// not start a well-formed tag.
fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();

    if matches!(bytes.get(1), Some(b'!') | Some(b'?')) {
        let end = s.find('>')?;
        return Some((Tag::Declaration, end + 1));
    }

    let closing = bytes.get(1) == Some(&b'/');
    let mut i = if closing { 2 } else { 1 };
    if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => break,
            None => {}
        }
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }

    let tag = if closing {
        Tag::Close { name }
    } else {
        Tag::Open {
            name,
            self_closing: bytes[i - 1] == b'/',
        }
    };
    Some((tag, i + 1))
}

/// Skip past the body and closing tag of a raw-text element.
fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let Some(pos) = lower.find(&format!("</{}", name)) else {
        return "";
    };
    match rest[pos..].find('>') {
        Some(gt) => &rest[pos + gt + 1..],
        None => "",
    }
}

// =============================================================================
// TextSink
// =============================================================================

#[derive(Default)]
struct TextSink {
    out: String,
    pending_space: bool,
    row_has_cell: bool,
}

impl TextSink {
    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n') || self.out.ends_with('\t')
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_ascii_whitespace() {
                if !self.at_line_start() {
                    self.pending_space = true;
                }
                continue;
            }
            if self.pending_space {
                self.out.push(' ');
                self.pending_space = false;
            }
            // Non-breaking spaces render as ordinary spaces but never collapse.
            self.out.push(if ch == '\u{a0}' { ' ' } else { ch });
        }
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        self.out.push('\n');
    }

    fn block_boundary(&mut self) {
        self.pending_space = false;
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn cell_boundary(&mut self) {
        self.pending_space = false;
        if self.row_has_cell {
            self.out.push('\t');
        }
        self.row_has_cell = true;
    }

    fn apply(&mut self, tag: &Tag) {
        match tag {
            Tag::Open { name, .. } if name == "br" => self.line_break(),
            Tag::Open { name, .. } if name == "td" || name == "th" => self.cell_boundary(),
            Tag::Open { name, .. } if name == "tr" => {
                self.block_boundary();
                self.row_has_cell = false;
            }
            Tag::Open { name, .. } | Tag::Close { name } if BLOCK_TAGS.contains(&name.as_str()) => {
                self.block_boundary()
            }
            _ => {}
        }
    }

    fn finish(self) -> String {
        self.out
            .trim_start_matches('\n')
            .trim_end_matches(['\n', '\t'])
            .to_string()
    }
}
