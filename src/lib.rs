//! Recase the text of XHTML titles and headings without touching their markup.
//!
//! The core works on "tagged strings": text interleaved with inline tags,
//! possibly malformed or cut off mid-tag. [`Recaser::recase`] strips the
//! tags, cases the remaining text as one unit through a [`Strategy`], and
//! splices the cased characters back into their original positions. In title
//! mode, embedded work titles are then recased again on their own.
//!
//! ```
//! use titlecaser::{recase, BuiltinTitlecaser, CaseMode};
//!
//! let out = recase(
//!     r#"<h2>My favorite book is <i epub:type="se:name.book">the great gatsby</i></h2>"#,
//!     CaseMode::Title,
//!     &BuiltinTitlecaser,
//! )
//! .unwrap();
//! assert_eq!(
//!     out,
//!     r#"<h2>My Favorite Book Is <i epub:type="se:name.book">The Great Gatsby</i></h2>"#
//! );
//! ```

pub mod batch;
pub mod case;
pub mod error;
pub mod lines;
pub mod markup;
pub mod oracle;
pub mod recase;

pub use case::{select_strategy, CaseMode, Strategy};
pub use error::{AlignmentError, Error, Result};
pub use markup::{is_pre_tagged, splice_cased, strip_tags};
pub use oracle::{BuiltinTitlecaser, CommandTitlecaser, Titlecaser};
pub use recase::{recase, Recaser};
