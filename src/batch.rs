//! Batch drivers.
//!
//! Two ways of feeding many units through a [`Recaser`]:
//!
//! - [`recase_tree`]: every matching file under a directory, rewritten in
//!   place. The unit is the file: a file with any failing line is left
//!   untouched.
//! - [`recase_lines`]: one file, line by line. The unit is the line: a failing
//!   line is written through unchanged.
//!
//! Units are independent and run on the rayon thread pool. Failures are
//! logged and counted; they never stop the remaining units.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::lines::recase_line;
use crate::recase::Recaser;

/// Front and back matter whose headings are generated, never recased.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "colophon.xhtml",
    "imprint.xhtml",
    "uncopyright.xhtml",
    "titlepage.xhtml",
    "toc.xhtml",
];

pub const DEFAULT_EXTENSION: &str = "xhtml";

/// Outcome of a batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Units that went through without error.
    pub processed: usize,
    /// Of those, units whose text changed.
    pub changed: usize,
    pub failed: usize,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Count one unit: `Some(changed)` on success, `None` on failure.
    fn record(&mut self, outcome: Option<bool>) {
        match outcome {
            Some(changed) => {
                self.processed += 1;
                self.changed += usize::from(changed);
            }
            None => self.failed += 1,
        }
    }
}

fn matches_ignore_ascii_case(name: &str, set: &[String]) -> bool {
    set.iter().any(|s| name.eq_ignore_ascii_case(s))
}

/* ============================== Discovery ============================== */

/// All files below `root` with the given extension, minus excluded file names.
///
/// Sorted, so runs are reproducible.
pub fn discover(root: &Path, extension: &str, excludes: &[String]) -> Result<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{root}/**/*.{extension}");

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("skipping unreadable path: {err}");
                continue;
            }
        };
        let excluded = path
            .file_name()
            .is_some_and(|name| matches_ignore_ascii_case(&name.to_string_lossy(), excludes));
        if path.is_file() && !excluded {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/* =============================== Documents ============================= */

/// Recase every title and heading line of `text`.
///
/// Fails on the first failing line; nothing of a failed text is returned.
pub fn recase_text(text: &str, recaser: &Recaser<'_>) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split_inclusive('\n').enumerate() {
        let cased = recase_line(line, recaser).map_err(|err| err.at_line(i + 1))?;
        out.push_str(&cased);
    }
    Ok(out)
}

/// Recase one file in place. Returns whether its content changed.
pub fn recase_file(path: &Path, recaser: &Recaser<'_>) -> Result<bool> {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    info!("processing {name}");

    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let cased = recase_text(&text, recaser)?;
    if cased == text {
        return Ok(false);
    }
    fs::write(path, cased).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Recase every file in `files` in place, in parallel.
pub fn recase_tree(files: &[PathBuf], recaser: &Recaser<'_>) -> Report {
    let outcomes: Vec<Result<bool>> = files
        .par_iter()
        .map(|path| {
            recase_file(path, recaser).inspect_err(|err| {
                error!(path = %path.display(), "{err}");
            })
        })
        .collect();

    let mut report = Report::default();
    for outcome in &outcomes {
        report.record(outcome.as_ref().ok().copied());
    }
    info!(
        processed = report.processed,
        changed = report.changed,
        failed = report.failed,
        "tree done"
    );
    report
}

/* ================================ Lines ================================ */

/// Recase `input` line by line and write the result to `output`.
///
/// Lines that fail are logged and copied through unchanged. I/O failures on
/// either file abort the run.
pub fn recase_lines(input: &Path, output: &Path, recaser: &Recaser<'_>) -> Result<Report> {
    let text = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let outcomes: Vec<Result<Cow<'_, str>>> = lines
        .par_iter()
        .enumerate()
        .map(|(i, line)| {
            recase_line(line, recaser)
                .map_err(|err| err.at_line(i + 1))
                .inspect_err(|err| error!(path = %input.display(), "{err}"))
        })
        .collect();

    let mut report = Report::default();
    let mut out = String::with_capacity(text.len());
    for (line, outcome) in lines.iter().zip(outcomes) {
        match outcome {
            Ok(cased) => {
                report.record(Some(cased != *line));
                out.push_str(&cased);
            }
            Err(_) => {
                report.record(None);
                out.push_str(line);
            }
        }
    }
    fs::write(output, out).map_err(|e| Error::io(output, e))?;

    info!(
        processed = report.processed,
        changed = report.changed,
        failed = report.failed,
        "lines done"
    );
    Ok(report)
}
