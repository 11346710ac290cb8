//! Title and heading selection within a line of XHTML.
//!
//! A line is rewritten in one of two ways, tried in order:
//!
//! - the text after an `epub:type="title"` or `epub:type="subtitle"`
//!   attribute, up to the next tag;
//! - otherwise the content of the first `<hN …>…</hN>` heading, unless the
//!   heading is marked as roman (its numeral must keep its case).
//!
//! Everything outside the selected text is copied through byte for byte.

use std::borrow::Cow;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::recase::Recaser;

static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)epub:type="(?:title|subtitle)">([^<]*)<"#)
        .expect("title pattern is valid")
});

static HEADING_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<h([1-6])([^>]*)>")
        .expect("heading pattern is valid")
});

/// What part of a line gets recased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Content of a title or subtitle element.
    Title(Range<usize>),
    /// Content of a heading element.
    Heading(Range<usize>),
    /// A roman-numeral heading, kept as is.
    Roman,
    None,
}

fn find_heading(line: &str) -> Option<(Range<usize>, bool)> {
    for caps in HEADING_START.captures_iter(line) {
        let (Some(open), Some(level), Some(attrs)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        // Byte offsets survive ASCII lowercasing.
        let close = format!("</h{}>", level.as_str());
        let Some(len) = line[open.end()..].to_ascii_lowercase().find(&close) else {
            continue;
        };
        let is_roman = attrs.as_str().to_ascii_lowercase().contains("roman");
        return Some((open.end()..open.end() + len, is_roman));
    }
    None
}

/// Decide which part of `line` to recase.
pub fn select(line: &str) -> Selection {
    if let Some(inner) = TITLE.captures(line).and_then(|caps| caps.get(1)) {
        return Selection::Title(inner.range());
    }
    match find_heading(line) {
        Some((_, true)) => Selection::Roman,
        Some((inner, false)) => Selection::Heading(inner),
        None => Selection::None,
    }
}

/// Recase the title or heading text of `line`, if it has any.
pub fn recase_line<'l>(line: &'l str, recaser: &Recaser<'_>) -> Result<Cow<'l, str>> {
    let range = match select(line) {
        Selection::Title(range) | Selection::Heading(range) => range,
        Selection::Roman => {
            debug!(line = line.trim(), "skipping roman numeral heading");
            return Ok(Cow::Borrowed(line));
        }
        Selection::None => return Ok(Cow::Borrowed(line)),
    };

    let cased = recaser.recase(&line[range.clone()])?;
    let mut out = String::with_capacity(line.len());
    out.push_str(&line[..range.start]);
    out.push_str(&cased);
    out.push_str(&line[range.end..]);
    Ok(Cow::Owned(out))
}
