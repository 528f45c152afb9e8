use std::fmt;

use serde::Serialize;

use crate::Point;
use crate::SpanKind;

/// A non-fatal notice produced while extracting one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
	/// Identifier of the source unit, usually its path.
	pub source: String,
	pub kind: DiagnosticKind,
	/// 1-indexed line.
	pub line: usize,
	/// 1-indexed column.
	pub column: usize,
	/// 0-indexed byte offset.
	pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
	/// A comment or literal ran to end-of-input (or end-of-line for
	/// single-line literals) without its closing delimiter.
	UnterminatedSpan { kind: SpanKind },
	/// A declaration was never closed, or a closing brace had nothing to
	/// close (`declaration` is `None`).
	UnresolvedNesting { declaration: Option<String> },
	/// An inline tag such as `{@link Foo` is missing its closing `}`.
	MalformedInlineTag { name: String },
}

impl ParseDiagnostic {
	pub fn new(source: impl Into<String>, kind: DiagnosticKind, point: Point) -> Self {
		Self {
			source: source.into(),
			kind,
			line: point.line,
			column: point.column,
			offset: point.offset,
		}
	}

	pub fn point(&self) -> Point {
		Point::new(self.line, self.column, self.offset)
	}

	/// Human-readable description of the diagnostic.
	pub fn message(&self) -> String {
		match &self.kind {
			DiagnosticKind::UnterminatedSpan { kind } => {
				format!("unterminated {kind} runs to the end of its scope")
			}
			DiagnosticKind::UnresolvedNesting {
				declaration: Some(name),
			} => format!("declaration `{name}` is never closed"),
			DiagnosticKind::UnresolvedNesting { declaration: None } => {
				"closing brace has no matching opening brace".to_string()
			}
			DiagnosticKind::MalformedInlineTag { name } => {
				format!("inline tag `{{@{name}` is missing its closing `}}`")
			}
		}
	}

	/// Stable diagnostic code.
	pub fn code(&self) -> &'static str {
		match self.kind {
			DiagnosticKind::UnterminatedSpan { .. } => "javadoc2adoc::unterminated_span",
			DiagnosticKind::UnresolvedNesting { .. } => "javadoc2adoc::unresolved_nesting",
			DiagnosticKind::MalformedInlineTag { .. } => "javadoc2adoc::malformed_inline_tag",
		}
	}

	pub fn help(&self) -> String {
		match &self.kind {
			DiagnosticKind::UnterminatedSpan { kind } => {
				format!("close the {kind}; everything after it was read as part of it")
			}
			DiagnosticKind::UnresolvedNesting { .. } => {
				"check the braces around this point; declarations after it may be misplaced"
					.to_string()
			}
			DiagnosticKind::MalformedInlineTag { .. } => {
				"add the closing `}`; the tag was kept as plain text".to_string()
			}
		}
	}
}

impl fmt::Display for ParseDiagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}:{}: {}",
			self.source,
			self.line,
			self.column,
			self.message()
		)
	}
}
