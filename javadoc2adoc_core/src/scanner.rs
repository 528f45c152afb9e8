//! Coarse lexical scanning of Java source text.
//!
//! The scanner splits a source unit into [`SourceSpan`]s: code, line
//! comments, block comments, doc-comments and literals. The spans cover the
//! input without gaps or overlaps, so concatenating every span's text yields
//! the input again.

use std::fmt;
use std::ops::Range;

use logos::Lexer;
use logos::Logos;
use serde::Deserialize;
use serde::Serialize;

/// The coarse classification of a [`SourceSpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
	Code,
	LineComment,
	BlockComment,
	DocComment,
	Literal,
}

impl fmt::Display for SpanKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Code => "code",
			Self::LineComment => "line comment",
			Self::BlockComment => "block comment",
			Self::DocComment => "doc comment",
			Self::Literal => "literal",
		};
		write!(f, "{name}")
	}
}

/// A contiguous range of source text with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan<'a> {
	pub kind: SpanKind,
	pub text: &'a str,
	/// Byte range of `text` within the source unit.
	pub range: Range<usize>,
	/// Brace depth of the scanner's normal mode at the start of the span.
	/// For a closing brace this is the depth after it closed.
	pub depth: usize,
	/// `false` when a comment or literal ran into end-of-input (or, for
	/// single-line literals, end-of-line) without its closing delimiter.
	pub terminated: bool,
}

impl SourceSpan<'_> {
	/// Whether this span is the single structural punctuation character `c`.
	/// The scanner emits `{`, `}`, `;` and `,` as their own code spans.
	pub fn is_punct(&self, c: char) -> bool {
		self.kind == SpanKind::Code && self.text.len() == 1 && self.text.starts_with(c)
	}
}

/// Raw tokens recognized in normal mode. Everything between a comment or
/// literal opener and its terminator is skipped by bumping the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
	#[token("/**/")]
	EmptyBlockComment,
	#[token("/**")]
	DocCommentOpen,
	#[token("/*")]
	BlockCommentOpen,
	#[token("//")]
	LineCommentOpen,
	#[token("\"\"\"")]
	TextBlockQuote,
	#[token("\"")]
	DoubleQuote,
	#[token("'")]
	SingleQuote,
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token(";")]
	Semicolon,
	#[token(",")]
	Comma,
	#[token("/")]
	Slash,
	#[regex(r#"[^/"'{};,]+"#)]
	Text,
}

/// Lazily scans a source unit into [`SourceSpan`]s.
///
/// Scanning is a single forward pass without backtracking. Cloning the
/// scanner (or calling [`scan`] again) restarts from the same state.
#[derive(Clone)]
pub struct Scanner<'a> {
	source: &'a str,
	lexer: Lexer<'a, RawToken>,
	/// Current brace depth in normal mode.
	depth: usize,
	/// Start offset of the code span being accumulated.
	code_start: Option<usize>,
	/// Brace depth at `code_start`.
	code_depth: usize,
	/// A span that was produced while a pending code span still had to be
	/// flushed first.
	queued: Option<SourceSpan<'a>>,
}

/// Scan `source` into a lazy sequence of [`SourceSpan`]s.
pub fn scan(source: &str) -> Scanner<'_> {
	Scanner::new(source)
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		Self {
			source,
			lexer: RawToken::lexer(source),
			depth: 0,
			code_start: None,
			code_depth: 0,
			queued: None,
		}
	}

	fn span(
		&self,
		kind: SpanKind,
		range: Range<usize>,
		depth: usize,
		terminated: bool,
	) -> SourceSpan<'a> {
		SourceSpan {
			kind,
			text: &self.source[range.clone()],
			range,
			depth,
			terminated,
		}
	}

	/// Flush the pending code span, ending it at `end`.
	fn take_code(&mut self, end: usize) -> Option<SourceSpan<'a>> {
		let start = self.code_start.take()?;
		(start < end).then(|| self.span(SpanKind::Code, start..end, self.code_depth, true))
	}

	/// Consume a comment or literal whose opening delimiter spans
	/// `start..after`, moving the lexer past its terminator.
	fn delimited(&mut self, token: RawToken, start: usize, after: usize) -> SourceSpan<'a> {
		let (kind, (end, terminated)) = match token {
			RawToken::EmptyBlockComment => (SpanKind::BlockComment, (after, true)),
			RawToken::DocCommentOpen => (SpanKind::DocComment, comment_end(self.source, after)),
			RawToken::BlockCommentOpen => (SpanKind::BlockComment, comment_end(self.source, after)),
			RawToken::LineCommentOpen => (SpanKind::LineComment, line_end(self.source, after)),
			RawToken::TextBlockQuote => (SpanKind::Literal, text_block_end(self.source, after)),
			RawToken::DoubleQuote => (SpanKind::Literal, literal_end(self.source, after, '"')),
			RawToken::SingleQuote => (SpanKind::Literal, literal_end(self.source, after, '\'')),
			_ => (SpanKind::Code, (after, true)),
		};

		if end > after {
			self.lexer.bump(end - after);
		}

		self.span(kind, start..end, self.depth, terminated)
	}
}

impl<'a> Iterator for Scanner<'a> {
	type Item = SourceSpan<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(span) = self.queued.take() {
			return Some(span);
		}

		loop {
			let Some(token) = self.lexer.next() else {
				return self.take_code(self.source.len());
			};
			let range = self.lexer.span();

			let span = match token {
				Ok(
					token @ (RawToken::EmptyBlockComment
					| RawToken::DocCommentOpen
					| RawToken::BlockCommentOpen
					| RawToken::LineCommentOpen
					| RawToken::TextBlockQuote
					| RawToken::DoubleQuote
					| RawToken::SingleQuote),
				) => self.delimited(token, range.start, range.end),
				Ok(RawToken::BraceOpen) => {
					let span = self.span(SpanKind::Code, range, self.depth, true);
					self.depth += 1;
					span
				}
				Ok(RawToken::BraceClose) => {
					self.depth = self.depth.saturating_sub(1);
					self.span(SpanKind::Code, range, self.depth, true)
				}
				Ok(RawToken::Semicolon | RawToken::Comma) => {
					self.span(SpanKind::Code, range, self.depth, true)
				}
				Ok(RawToken::Text | RawToken::Slash) | Err(()) => {
					if self.code_start.is_none() {
						self.code_start = Some(range.start);
						self.code_depth = self.depth;
					}
					continue;
				}
			};

			return match self.take_code(span.range.start) {
				Some(code) => {
					self.queued = Some(span);
					Some(code)
				}
				None => Some(span),
			};
		}
	}
}

/// Find the first occurrence of `needle` in `haystack`.
pub(crate) fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

/// End of a block or doc comment whose body starts at `from`. The first `*/`
/// ends the comment; comments do not nest.
fn comment_end(source: &str, from: usize) -> (usize, bool) {
	match memstr(&source.as_bytes()[from..], b"*/") {
		Some(index) => (from + index + 2, true),
		None => (source.len(), false),
	}
}

/// A line comment stops before the newline that ends it.
fn line_end(source: &str, from: usize) -> (usize, bool) {
	match source[from..].find('\n') {
		Some(index) => (from + index, true),
		None => (source.len(), true),
	}
}

/// End of a single-line string or character literal. A backslash escapes the
/// next character; a raw newline ends the literal unterminated.
fn literal_end(source: &str, from: usize, quote: char) -> (usize, bool) {
	let mut chars = source[from..].char_indices();

	while let Some((index, c)) = chars.next() {
		match c {
			'\\' => {
				if let Some((escaped, '\n')) = chars.next() {
					return (from + escaped, false);
				}
			}
			'\n' => return (from + index, false),
			c if c == quote => return (from + index + c.len_utf8(), true),
			_ => {}
		}
	}

	(source.len(), false)
}

/// End of a `"""` text block.
fn text_block_end(source: &str, from: usize) -> (usize, bool) {
	let bytes = source.as_bytes();
	let mut index = from;

	while index < bytes.len() {
		match bytes[index] {
			b'\\' => index += 2,
			b'"' if bytes[index..].starts_with(b"\"\"\"") => return (index + 3, true),
			_ => index += 1,
		}
	}

	(source.len(), false)
}
