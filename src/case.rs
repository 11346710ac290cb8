//! Case strategies.

use clap::ValueEnum;

use crate::error::Result;
use crate::markup::split_margins;
use crate::oracle::Titlecaser;

/// Which transformation to apply to text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CaseMode {
    Lower,
    Upper,
    #[default]
    Title,
}

/// Uppercase `c` if it maps to exactly one character, else keep it.
pub fn simple_upper(c: char) -> char {
    let mut mapped = c.to_uppercase();
    match (mapped.next(), mapped.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Lowercase `c` if it maps to exactly one character, else keep it.
pub fn simple_lower(c: char) -> char {
    let mut mapped = c.to_lowercase();
    match (mapped.next(), mapped.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// A case transformation bound to its mode, selected once per top-level call.
///
/// Every strategy keeps the character count of its input: lower and upper
/// use one-to-one case mapping, and title re-attaches the edge whitespace the
/// oracle trims.
#[derive(Clone, Copy)]
pub struct Strategy<'a> {
    mode: CaseMode,
    oracle: &'a dyn Titlecaser,
}

/// Bind `mode` to the oracle used for title case.
pub fn select_strategy(mode: CaseMode, oracle: &dyn Titlecaser) -> Strategy<'_> {
    Strategy { mode, oracle }
}

impl<'a> Strategy<'a> {
    pub fn mode(&self) -> CaseMode {
        self.mode
    }

    /// Transform plain, tag-free text.
    pub fn apply(&self, text: &str) -> Result<String> {
        match self.mode {
            CaseMode::Lower => Ok(text.chars().map(simple_lower).collect()),
            CaseMode::Upper => Ok(text.chars().map(simple_upper).collect()),
            CaseMode::Title => {
                let (leading, body, trailing) = split_margins(text);
                if body.is_empty() {
                    return Ok(text.to_owned());
                }
                let cased = self.oracle.titlecase(body)?;
                Ok(format!("{leading}{}{trailing}", cased.trim()))
            }
        }
    }
}
