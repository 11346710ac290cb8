//! Tag-skipping text extraction and splicing.
//!
//! Markup is never parsed into a tree. A string is read as a flat alternation
//! of tag regions (`<` through `>`, delimiters included) and text regions, by
//! a two-state scanner. Unbalanced delimiters are tolerated: a string whose
//! first `>` precedes its first `<` is taken to start inside a tag opened by
//! context we cannot see, e.g. `h3>A TITLE</h3`.

use memchr::memchr;

use crate::error::AlignmentError;

/* ============================ Tag detection ============================ */

/// True if position 0 of `s` already sits inside an open tag.
///
/// A missing delimiter compares as lying past the end of the string, so a
/// string without any `>` is never pre-tagged.
pub fn is_pre_tagged(s: &str) -> bool {
    let bytes = s.as_bytes();
    let gt = memchr(b'>', bytes).unwrap_or(usize::MAX);
    let lt = memchr(b'<', bytes).unwrap_or(usize::MAX);
    gt < lt
}

/* ============================ Region scanner =========================== */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    InTag,
    OutOfTag,
}

/// A maximal run of either tag or text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Region<'a> {
    /// Opaque tag text, delimiters included where present.
    Tag(&'a str),
    Text(&'a str),
}

/// Splits a tagged string into regions, left to right.
pub(crate) struct Regions<'a> {
    src: &'a str,
    pos: usize,
    state: State,
}

impl<'a> Regions<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        let state = if is_pre_tagged(src) {
            State::InTag
        } else {
            State::OutOfTag
        };
        Regions { src, pos: 0, state }
    }
}

impl<'a> Iterator for Regions<'a> {
    type Item = Region<'a>;

    fn next(&mut self) -> Option<Region<'a>> {
        let src = self.src;
        loop {
            let rest = &src[self.pos..];
            if rest.is_empty() {
                return None;
            }
            match self.state {
                State::OutOfTag => {
                    let end = memchr(b'<', rest.as_bytes()).unwrap_or(rest.len());
                    self.state = State::InTag;
                    if end == 0 {
                        continue;
                    }
                    self.pos += end;
                    return Some(Region::Text(&rest[..end]));
                }
                State::InTag => {
                    // An unterminated tag runs to the end of the string.
                    let end = memchr(b'>', rest.as_bytes()).map_or(rest.len(), |i| i + 1);
                    self.state = State::OutOfTag;
                    self.pos += end;
                    return Some(Region::Tag(&rest[..end]));
                }
            }
        }
    }
}

/* ============================== Stripping ============================== */

/// Concatenation of all text regions, untrimmed.
pub(crate) fn untagged_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for region in Regions::new(s) {
        if let Region::Text(text) = region {
            out.push_str(text);
        }
    }
    out
}

/// Split `s` into (leading whitespace, trimmed body, trailing whitespace).
pub(crate) fn split_margins(s: &str) -> (&str, &str, &str) {
    let body_start = s.len() - s.trim_start().len();
    let body_end = s.trim_end().len().max(body_start);
    (&s[..body_start], &s[body_start..body_end], &s[body_end..])
}

/// Text content of `s` with all tags removed and surrounding whitespace trimmed.
pub fn strip_tags(s: &str) -> String {
    let untagged = untagged_text(s);
    let (_, body, _) = split_margins(&untagged);
    body.to_owned()
}

/* =============================== Splicing ============================== */

/// Number of characters of `s` that lie outside tags.
pub fn text_len(s: &str) -> usize {
    Regions::new(s)
        .map(|region| match region {
            Region::Text(text) => text.chars().count(),
            Region::Tag(_) => 0,
        })
        .sum()
}

/// Rebuild `s` with its text characters replaced, one for one, by `cased`.
///
/// Tags are copied verbatim. `cased` must hold exactly as many characters as
/// `s` has outside its tags, including any edge whitespace.
pub fn splice_cased(s: &str, cased: &str) -> Result<String, AlignmentError> {
    let expected = text_len(s);
    let actual = cased.chars().count();
    if expected != actual {
        return Err(AlignmentError { expected, actual });
    }

    let mut out = String::with_capacity(s.len() + cased.len());
    let mut cased_chars = cased.chars();
    for region in Regions::new(s) {
        match region {
            Region::Tag(tag) => out.push_str(tag),
            Region::Text(text) => {
                out.extend(cased_chars.by_ref().take(text.chars().count()));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(s: &str) -> Vec<&str> {
        Regions::new(s)
            .filter_map(|region| match region {
                Region::Tag(tag) => Some(tag),
                Region::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn detects_string_starting_inside_a_tag() {
        assert!(is_pre_tagged("h3>A TITLE</h3"));
        assert!(is_pre_tagged("class=\"x\">Text<b>"));
        assert!(!is_pre_tagged("<h3>A TITLE</h3>"));
        assert!(!is_pre_tagged("A TITLE</h3>"));
    }

    #[test]
    fn missing_close_delimiter_is_not_pre_tagged() {
        assert!(!is_pre_tagged("some <i text"));
        assert!(!is_pre_tagged("no markup"));
    }

    #[test]
    fn regions_cover_the_whole_string() {
        let s = "a<b>c</b>d";
        let joined: String = Regions::new(s)
            .map(|region| match region {
                Region::Tag(t) | Region::Text(t) => t,
            })
            .collect();
        assert_eq!(joined, s);
        assert_eq!(tags(s), vec!["<b>", "</b>"]);
    }

    #[test]
    fn strips_well_formed_markup() {
        let s =
            r#"<h2>My favorite book is <i epub:type="se:name.book">the great gatsby</i></h2>"#;
        assert_eq!(strip_tags(s), "My favorite book is the great gatsby");
    }

    #[test]
    fn strips_malformed_markup() {
        assert_eq!(strip_tags("h3>A TITLE</h3"), "A TITLE");
        assert_eq!(strip_tags("dangling <i"), "dangling");
    }

    #[test]
    fn strip_trims_only_the_edges() {
        assert_eq!(strip_tags("  <b> one  two </b>\n"), "one  two");
    }

    #[test]
    fn split_margins_of_blank_text() {
        assert_eq!(split_margins("   "), ("   ", "", ""));
        assert_eq!(split_margins(" x "), (" ", "x", " "));
    }

    #[test]
    fn splice_replaces_text_and_keeps_tags() {
        let s = "<h2>hello <abbr>mr.</abbr> smith</h2>";
        let cased = untagged_text(s).to_uppercase();
        let out = splice_cased(s, &cased).unwrap();
        assert_eq!(out, "<h2>HELLO <abbr>MR.</abbr> SMITH</h2>");
        assert_eq!(tags(&out), tags(s));
    }

    #[test]
    fn splice_tolerates_malformed_markup() {
        let s = "h3>a title</h3";
        assert_eq!(splice_cased(s, "A TITLE").unwrap(), "h3>A TITLE</h3");
    }

    #[test]
    fn splice_aligns_multibyte_characters() {
        let s = "<i>café</i> ünd";
        assert_eq!(splice_cased(s, "CAFÉ ÜND").unwrap(), "<i>CAFÉ</i> ÜND");
    }

    #[test]
    fn splice_rejects_short_cased_text() {
        let err = splice_cased("<b>abc</b>", "AB").unwrap_err();
        assert_eq!(err, AlignmentError { expected: 3, actual: 2 });
    }

    #[test]
    fn splice_rejects_long_cased_text() {
        let err = splice_cased("<b>abc</b>", "ABCD").unwrap_err();
        assert_eq!(err, AlignmentError { expected: 3, actual: 4 });
    }

    #[test]
    fn text_len_ignores_tags() {
        assert_eq!(text_len("<p>ab<br/>c</p>"), 3);
        assert_eq!(text_len("h3>ab</h3"), 2);
    }
}
