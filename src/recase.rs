//! Recasing of tagged strings.
//!
//! The text outside tags is stripped out, cased as one unit, and spliced back
//! into place. In title mode, every embedded work title
//! (`<i epub:type="se:name.…">…</i>`) is then re-cased again as a unit of its
//! own, so that e.g. a leading "The" inside a book title is capitalised even
//! mid-sentence. A title's content may carry markup of its own and goes
//! through the whole pipeline recursively.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::case::{select_strategy, CaseMode, Strategy};
use crate::error::Result;
use crate::markup::{splice_cased, split_margins, untagged_text};
use crate::oracle::Titlecaser;

static SEMANTIC_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<i epub:type="se:name\.(.*?)"(.*?)>(.*?)</i>"#)
        .expect("semantic title pattern is valid")
});

/// Recases tagged strings with one strategy.
#[derive(Clone, Copy)]
pub struct Recaser<'a> {
    strategy: Strategy<'a>,
}

impl<'a> Recaser<'a> {
    pub fn new(mode: CaseMode, oracle: &'a dyn Titlecaser) -> Self {
        Recaser {
            strategy: select_strategy(mode, oracle),
        }
    }

    pub fn mode(&self) -> CaseMode {
        self.strategy.mode()
    }

    /// Recase `input`, leaving every tag exactly as it was.
    pub fn recase(&self, input: &str) -> Result<String> {
        if !input.contains('<') {
            return self.strategy.apply(input);
        }

        // The oracle never sees edge whitespace, so put it back before splicing.
        let untagged = untagged_text(input);
        let (leading, plain, trailing) = split_margins(&untagged);
        let cased = self.strategy.apply(plain)?;
        let result = splice_cased(input, &format!("{leading}{cased}{trailing}"))?;

        if self.mode() == CaseMode::Title {
            self.recase_work_titles(&result)
        } else {
            Ok(result)
        }
    }

    /// Re-case the content of each work title in `cased`, in place.
    fn recase_work_titles(&self, cased: &str) -> Result<String> {
        let mut out = String::with_capacity(cased.len());
        let mut last = 0;
        for caps in SEMANTIC_TITLE.captures_iter(cased) {
            let Some(span) = caps.get(0) else {
                continue;
            };
            let (subtype, extra, inner) = (&caps[1], &caps[2], &caps[3]);
            debug!(subtype, inner, "recasing work title");

            let inner_cased = self.recase(inner)?;
            out.push_str(&cased[last..span.start()]);
            out.push_str(&format!(
                r#"<i epub:type="se:name.{subtype}"{extra}>{inner_cased}</i>"#
            ));
            last = span.end();
        }
        out.push_str(&cased[last..]);
        Ok(out)
    }
}

/// Recase `input` under `mode`, titlecasing through `oracle`.
pub fn recase(input: &str, mode: CaseMode, oracle: &dyn Titlecaser) -> Result<String> {
    Recaser::new(mode, oracle).recase(input)
}
