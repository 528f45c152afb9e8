//! `javadoc2adoc_core` turns the doc-comments of Java source files into
//! [AsciiDoc](https://asciidoc.org) sections that mirror the nesting of the
//! declarations they document.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Java source unit
//!   -> Scanner (splits the text into code, comment and literal spans)
//!   -> Locator (finds declarations, builds the nesting tree, attaches doc-comments)
//!   -> Tag parser (description plus block and inline tags)
//!   -> Renderer (asciidoc section per declaration)
//!   -> Assembler (parents before children, siblings in source order)
//! ```
//!
//! Malformed input never aborts a run. Unterminated comments, unbalanced
//! braces and broken inline tags are reported as [`ParseDiagnostic`]s next to
//! whatever could still be extracted.
//!
//! ## Quick Start
//!
//! ```rust
//! use javadoc2adoc_core::RenderOptions;
//! use javadoc2adoc_core::SourceUnit;
//! use javadoc2adoc_core::extract;
//!
//! let source = "/** A calculator. */\npublic class Calc {}\n";
//! let extraction = extract(SourceUnit::new("Calc.java", source), &RenderOptions::default())?;
//!
//! assert_eq!(extraction.document(), "[[Calc]]\n= Calc\n\nA calculator.\n");
//! # Ok::<(), javadoc2adoc_core::DocError>(())
//! ```

pub use assembler::*;
pub use config::*;
pub use declaration::*;
pub use diagnostic::*;
pub use error::*;
pub use extract::*;
pub use locator::*;
pub use position::*;
pub use project::*;
pub use render::*;
pub use scanner::*;
pub use tags::*;

mod assembler;
pub mod config;
mod declaration;
mod diagnostic;
#[allow(unused_assignments)]
mod error;
mod extract;
mod locator;
mod position;
pub mod project;
mod render;
mod scanner;
mod tags;

#[cfg(test)]
mod __fixtures;
