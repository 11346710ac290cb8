//! Titlecasing oracles.
//!
//! The linguistic decision of which words to capitalise lives behind the
//! [`Titlecaser`] trait. [`CommandTitlecaser`] shells out to an external
//! program (by default `se titlecase`, from the Standard Ebooks toolset), one
//! independent process per call. [`BuiltinTitlecaser`] is an in-process
//! fallback with a fixed small-word list.

use std::io::{self, Read};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::case::{simple_lower, simple_upper};
use crate::error::{Error, Result};

/// Something that can titlecase plain, tag-free text.
///
/// The reply must keep the character count of the input (edge whitespace
/// aside) or the result cannot be spliced back into its markup.
pub trait Titlecaser: Send + Sync {
    fn titlecase(&self, text: &str) -> Result<String>;
}

/* =========================== External program ========================== */

pub const DEFAULT_PROGRAM: &str = "se";
/// `--` keeps a title that starts with a dash from being read as an option.
pub const DEFAULT_ARGS: &[&str] = &["titlecase", "--"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs `<program> <args>... <text>` and reads the titlecased text from stdout.
///
/// The text is passed as a single argument, never through a shell.
#[derive(Clone, Debug)]
pub struct CommandTitlecaser {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for CommandTitlecaser {
    fn default() -> Self {
        CommandTitlecaser::new(DEFAULT_PROGRAM, DEFAULT_ARGS.iter().copied())
    }
}

impl CommandTitlecaser {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandTitlecaser {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn failure(text: &str, reason: impl ToString) -> Error {
        Error::Oracle {
            input: text.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Poll `child` until it exits or the deadline passes.
    ///
    /// Its output pipes must already be drained, or a child writing more than
    /// a pipe buffer blocks and never exits.
    fn wait_until(&self, child: &mut Child, text: &str) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return Ok(()),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::OracleTimeout {
                        input: text.to_owned(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(Self::failure(text, e)),
            }
        }
    }
}

impl Titlecaser for CommandTitlecaser {
    fn titlecase(&self, text: &str) -> Result<String> {
        debug!(program = %self.program, input = text, "invoking titlecase oracle");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::failure(text, format!("cannot run {}: {e}", self.program)))?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        self.wait_until(&mut child, text)?;
        let status = child.wait().map_err(|e| Self::failure(text, e))?;
        let stdout = collect(stdout).map_err(|e| Self::failure(text, e))?;
        let stderr = collect(stderr).map_err(|e| Self::failure(text, e))?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let reason = match stderr.trim() {
                "" => status.to_string(),
                msg => format!("{status}: {msg}"),
            };
            return Err(Self::failure(text, reason));
        }

        let stdout = String::from_utf8(stdout).map_err(|e| Self::failure(text, e))?;
        Ok(stdout.trim().to_owned())
    }
}

/// Read a child's pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked"))),
        None => Ok(Vec::new()),
    }
}

/* =============================== Builtin =============================== */

const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "nor", "of", "on", "or",
    "per", "the", "to", "v", "via", "vs",
];

fn is_small_word(word: &str) -> bool {
    let core = word.trim_matches(|c: char| !c.is_alphanumeric());
    SMALL_WORDS.iter().any(|s| core.eq_ignore_ascii_case(s))
}

/// In-process titlecaser.
///
/// Capitalises the first letter of every word and of every hyphenated part,
/// and lowercases small words unless they open or close the text or follow a
/// colon. Other letters are left as they are. Never changes the character
/// count.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinTitlecaser;

impl BuiltinTitlecaser {
    fn capitalize(word: &str, out: &mut String) {
        let mut at_part_start = true;
        for c in word.chars() {
            if at_part_start && c.is_alphabetic() {
                out.push(simple_upper(c));
                at_part_start = false;
            } else {
                out.push(c);
                if c == '-' {
                    at_part_start = true;
                }
            }
        }
    }
}

impl Titlecaser for BuiltinTitlecaser {
    fn titlecase(&self, text: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let last = words.len().saturating_sub(1);

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut after_colon = false;
        for (i, word) in words.iter().enumerate() {
            // Copy the whitespace in front of the word untouched.
            let start = rest.find(word).unwrap_or(0);
            out.push_str(&rest[..start]);
            rest = &rest[start + word.len()..];

            if i != 0 && i != last && !after_colon && is_small_word(word) {
                out.extend(word.chars().map(simple_lower));
            } else {
                Self::capitalize(word, &mut out);
            }
            after_colon = word.ends_with(':');
        }
        out.push_str(rest);
        Ok(out)
    }
}
