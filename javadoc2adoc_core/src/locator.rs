//! Pairs doc-comments with the declarations they document.
//!
//! The locator consumes [`SourceSpan`]s in a single forward pass. Code text
//! between structural punctuation (`{`, `}`, `;`, `,`) accumulates into a
//! declaration header which is classified when its terminator arrives.
//! Scopes are opened and closed with the brace depth the scanner already
//! tracked, so nothing is re-parsed.

use std::ops::Range;

use logos::Logos;
use tracing::debug;
use tracing::instrument;
use tracing::trace;

use crate::DeclId;
use crate::Declaration;
use crate::DeclarationKind;
use crate::DeclarationTree;
use crate::DetachedDoc;
use crate::DiagnosticKind;
use crate::DocComment;
use crate::LineTable;
use crate::ParseDiagnostic;
use crate::SourceSpan;
use crate::SpanKind;

/// The declarations of one source unit together with stray doc-comments and
/// any nesting diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Located {
	pub tree: DeclarationTree,
	pub detached: Vec<DetachedDoc>,
	pub diagnostics: Vec<ParseDiagnostic>,
}

/// Locate the declarations in `source` and attach their doc-comments.
#[instrument(skip_all, fields(source = source_id))]
pub fn locate<'a>(
	source_id: &str,
	source: &'a str,
	spans: impl IntoIterator<Item = SourceSpan<'a>>,
) -> Located {
	let mut locator = Locator::new(source_id, source);
	for span in spans {
		locator.process(&span);
	}
	locator.finish()
}

const TYPE_KEYWORDS: [&str; 4] = ["class", "interface", "enum", "record"];

const MODIFIERS: [&str; 13] = [
	"public",
	"protected",
	"private",
	"static",
	"final",
	"abstract",
	"synchronized",
	"native",
	"transient",
	"volatile",
	"default",
	"strictfp",
	"sealed",
];

/// Words that can precede `(` without naming a method.
const NON_METHOD_KEYWORDS: [&str; 16] = [
	"if",
	"for",
	"while",
	"switch",
	"catch",
	"synchronized",
	"return",
	"new",
	"throw",
	"super",
	"this",
	"try",
	"else",
	"do",
	"assert",
	"case",
];

/// Statements that never declare anything.
const STATEMENT_KEYWORDS: [&str; 3] = ["package", "import", "module"];

/// Tokens of a declaration header. Anything unrecognized (operators, numbers,
/// literal placeholders) is an error token and ignored.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum HeaderToken {
	#[regex(r"[A-Za-z_$\x{80}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{10FFFF}]*")]
	Ident,
	#[token("@")]
	At,
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[token("<")]
	AngleOpen,
	#[token(">")]
	AngleClose,
	#[token("[")]
	BracketOpen,
	#[token("]")]
	BracketClose,
	#[token(".")]
	Dot,
	#[token(",")]
	Comma,
	#[token("=")]
	Assign,
}

/// What a declaration header turned out to declare.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeaderKind {
	Type {
		name: String,
		is_enum: bool,
		is_record: bool,
	},
	Method { name: String },
	Field { name: String },
	Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Classified {
	kind: HeaderKind,
	signature: String,
	/// The header contains a top-level `=`, so a following `{` belongs to an
	/// initializer expression rather than a declaration body.
	has_initializer: bool,
}

/// Classify a declaration header.
fn classify(text: &str) -> Classified {
	let tokens = header_tokens(text);
	let nothing = |has_initializer| {
		Classified {
			kind: HeaderKind::Nothing,
			signature: String::new(),
			has_initializer,
		}
	};

	let start = skip_prelude(&tokens, text);
	let body = &tokens[start..];
	let slice = |index: usize| &text[body[index].1.clone()];

	let Some((_, first)) = body.first() else {
		return nothing(false);
	};
	if STATEMENT_KEYWORDS.contains(&&text[first.clone()]) {
		return nothing(false);
	}

	let (mut paren, mut angle, mut bracket) = (0usize, 0usize, 0usize);
	let mut type_keyword = None;
	let mut first_paren = None;
	let mut assign = None;
	let mut comma = None;

	for (index, (token, _)) in body.iter().enumerate() {
		let top = paren == 0 && angle == 0 && bracket == 0;
		match token {
			HeaderToken::ParenOpen => {
				if top && first_paren.is_none() {
					first_paren = Some(index);
				}
				paren += 1;
			}
			HeaderToken::ParenClose => paren = paren.saturating_sub(1),
			HeaderToken::AngleOpen if paren == 0 => angle += 1,
			HeaderToken::AngleClose if paren == 0 => angle = angle.saturating_sub(1),
			HeaderToken::BracketOpen => bracket += 1,
			HeaderToken::BracketClose => bracket = bracket.saturating_sub(1),
			HeaderToken::Assign if top => {
				assign = Some(index);
				break;
			}
			HeaderToken::Comma if top && comma.is_none() => comma = Some(index),
			HeaderToken::Ident
				if top
					&& type_keyword.is_none()
					&& is_type_keyword(body, text, index) =>
			{
				type_keyword = Some(index);
			}
			_ => {}
		}
	}

	let has_initializer = assign.is_some();
	let limit = assign.unwrap_or(body.len());

	if let Some(keyword) = type_keyword.filter(|keyword| *keyword < limit) {
		return match body.get(keyword + 1) {
			Some((HeaderToken::Ident, range)) => {
				let name = text[range.clone()].to_string();
				Classified {
					signature: name.clone(),
					kind: HeaderKind::Type {
						name,
						is_enum: slice(keyword) == "enum",
						is_record: slice(keyword) == "record",
					},
					has_initializer,
				}
			}
			_ => nothing(has_initializer),
		};
	}

	if let Some(paren_index) = first_paren.filter(|index| *index > 0 && *index < limit) {
		let (token, range) = &body[paren_index - 1];
		let name = &text[range.clone()];
		if *token == HeaderToken::Ident && !NON_METHOD_KEYWORDS.contains(&name) {
			let end = matching_paren(body, paren_index).map_or(text.len(), |index| body[index].1.end);
			return Classified {
				kind: HeaderKind::Method {
					name: name.to_string(),
				},
				signature: normalize_whitespace(&text[body[0].1.start..end]),
				has_initializer,
			};
		}
	}

	let declarator_end = comma.map_or(limit, |comma| comma.min(limit));
	let mut angle = 0usize;
	let idents: Vec<&Range<usize>> = body[..declarator_end]
		.iter()
		.filter_map(|(token, range)| {
			match token {
				HeaderToken::AngleOpen => angle += 1,
				HeaderToken::AngleClose => angle = angle.saturating_sub(1),
				HeaderToken::Ident if angle == 0 => return Some(range),
				_ => {}
			}
			None
		})
		.collect();

	if first_paren.is_none_or(|index| index >= limit) && idents.len() >= 2 {
		if let Some(name) = idents.last() {
			return Classified {
				kind: HeaderKind::Field {
					name: text[(*name).clone()].to_string(),
				},
				signature: normalize_whitespace(&text[body[0].1.start..name.end]),
				has_initializer,
			};
		}
	}

	nothing(has_initializer)
}

fn header_tokens(text: &str) -> Vec<(HeaderToken, Range<usize>)> {
	HeaderToken::lexer(text)
		.spanned()
		.filter_map(|(token, range)| token.ok().map(|token| (token, range)))
		.collect()
}

/// Whether the identifier at `index` introduces a type. `record` is only a
/// keyword when a name and a component list or type parameters follow it.
fn is_type_keyword(body: &[(HeaderToken, Range<usize>)], text: &str, index: usize) -> bool {
	let word = &text[body[index].1.clone()];
	if !TYPE_KEYWORDS.contains(&word) {
		return false;
	}
	if index > 0 && body[index - 1].0 == HeaderToken::Dot {
		return false;
	}
	if word != "record" {
		return true;
	}

	matches!(
		(body.get(index + 1), body.get(index + 2)),
		(
			Some((HeaderToken::Ident, _)),
			Some((HeaderToken::ParenOpen | HeaderToken::AngleOpen, _))
		)
	)
}

/// Index of the first token after leading annotations and modifiers.
fn skip_prelude(tokens: &[(HeaderToken, Range<usize>)], text: &str) -> usize {
	let mut index = 0;

	while let Some((token, range)) = tokens.get(index) {
		match token {
			HeaderToken::At => {
				match tokens.get(index + 1) {
					Some((HeaderToken::Ident, name)) if &text[name.clone()] != "interface" => {}
					_ => break,
				}
				index += 2;
				while let (Some((HeaderToken::Dot, _)), Some((HeaderToken::Ident, _))) =
					(tokens.get(index), tokens.get(index + 1))
				{
					index += 2;
				}
				if let Some((HeaderToken::ParenOpen, _)) = tokens.get(index) {
					index = matching_paren(tokens, index).map_or(tokens.len(), |close| close + 1);
				}
			}
			HeaderToken::Ident if MODIFIERS.contains(&&text[range.clone()]) => index += 1,
			_ => break,
		}
	}

	index
}

fn matching_paren(tokens: &[(HeaderToken, Range<usize>)], open: usize) -> Option<usize> {
	let mut depth = 0usize;
	for (index, (token, _)) in tokens.iter().enumerate().skip(open) {
		match token {
			HeaderToken::ParenOpen => depth += 1,
			HeaderToken::ParenClose => {
				depth = depth.saturating_sub(1);
				if depth == 0 {
					return Some(index);
				}
			}
			_ => {}
		}
	}
	None
}

fn normalize_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Code text accumulated since the last structural boundary.
#[derive(Debug, Default)]
struct Header {
	text: String,
	/// Offset of the first non-whitespace character.
	start: Option<usize>,
	end: usize,
	/// Unbalanced `(` count; `{`, `;` and `,` inside parentheses belong to
	/// annotation arguments, not to declarations.
	paren: usize,
}

impl Header {
	fn push(&mut self, text: &str, range: &Range<usize>) {
		if self.start.is_none() {
			let leading = text.len() - text.trim_start().len();
			if leading < text.len() {
				self.start = Some(range.start + leading);
			}
		}
		for c in text.chars() {
			match c {
				'(' => self.paren += 1,
				')' => self.paren = self.paren.saturating_sub(1),
				_ => {}
			}
		}
		self.text.push_str(text);
		self.end = range.end;
	}

	fn is_blank(&self) -> bool {
		self.start.is_none()
	}

	fn range(&self) -> Range<usize> {
		self.start.unwrap_or(self.end)..self.end
	}
}

#[derive(Debug, Clone, Copy)]
enum Scope {
	/// The body of a type; declarations inside it are recognized.
	Type {
		id: DeclId,
		depth: usize,
		open: usize,
		/// Inside an enum body, before the first `;`.
		enum_constants: bool,
		record: bool,
	},
	/// A method body, initializer or initializer expression; skipped.
	Body {
		depth: usize,
		open: usize,
		owner: Option<DeclId>,
		/// The enclosing statement continues after the closing brace, as
		/// for `Runnable r = () -> { ... };`.
		resumes_statement: bool,
	},
}

impl Scope {
	fn depth(&self) -> usize {
		match self {
			Self::Type { depth, .. } | Self::Body { depth, .. } => *depth,
		}
	}
}

struct Locator<'s> {
	source_id: &'s str,
	lines: LineTable,
	tree: DeclarationTree,
	detached: Vec<DetachedDoc>,
	diagnostics: Vec<ParseDiagnostic>,
	scopes: Vec<Scope>,
	header: Header,
	pending_doc: Option<DocComment>,
}

impl<'s> Locator<'s> {
	fn new(source_id: &'s str, source: &str) -> Self {
		Self {
			source_id,
			lines: LineTable::new(source),
			tree: DeclarationTree::default(),
			detached: Vec::new(),
			diagnostics: Vec::new(),
			scopes: Vec::new(),
			header: Header::default(),
			pending_doc: None,
		}
	}

	fn process(&mut self, span: &SourceSpan<'_>) {
		trace!(kind = %span.kind, start = span.range.start, depth = span.depth, "span");

		if !span.terminated {
			self.report(
				span.range.start,
				DiagnosticKind::UnterminatedSpan { kind: span.kind },
			);
		}

		if matches!(self.scopes.last(), Some(Scope::Body { .. })) {
			match span.kind {
				SpanKind::DocComment => {
					let doc = self.doc_comment(span);
					self.detach(doc);
				}
				SpanKind::Code if span.is_punct('}') => self.close(span),
				_ => {}
			}
			return;
		}

		match span.kind {
			SpanKind::DocComment => {
				let doc = self.doc_comment(span);
				if let Some(previous) = self.pending_doc.replace(doc) {
					self.detach(previous);
				}
			}
			SpanKind::LineComment | SpanKind::BlockComment => {}
			SpanKind::Literal => self.header.push(" \"\" ", &span.range),
			SpanKind::Code if span.is_punct('{') => self.open(span),
			SpanKind::Code if span.is_punct('}') => self.close(span),
			SpanKind::Code if span.is_punct(';') => self.end_statement(span),
			SpanKind::Code if span.is_punct(',') => self.comma(span),
			SpanKind::Code => self.header.push(span.text, &span.range),
		}
	}

	fn doc_comment(&self, span: &SourceSpan<'_>) -> DocComment {
		DocComment {
			text: span.text.to_string(),
			position: self.lines.position(&span.range),
		}
	}

	fn report(&mut self, offset: usize, kind: DiagnosticKind) {
		let diagnostic = ParseDiagnostic::new(self.source_id, kind, self.lines.point(offset));
		debug!(%diagnostic, "diagnostic");
		self.diagnostics.push(diagnostic);
	}

	/// The innermost enclosing type.
	fn owner(&self) -> Option<DeclId> {
		self.scopes.iter().rev().find_map(|scope| {
			match scope {
				Scope::Type { id, .. } => Some(*id),
				Scope::Body { .. } => None,
			}
		})
	}

	fn in_enum_constants(&self) -> bool {
		matches!(
			self.scopes.last(),
			Some(Scope::Type {
				enum_constants: true,
				..
			})
		)
	}

	fn detach(&mut self, doc: DocComment) {
		let owner = self.owner();
		debug!(line = doc.position.start.line, "detached doc comment");
		self.detached.push(DetachedDoc { owner, doc });
	}

	fn detach_pending(&mut self) {
		if let Some(doc) = self.pending_doc.take() {
			self.detach(doc);
		}
	}

	fn open(&mut self, span: &SourceSpan<'_>) {
		let depth = span.depth;
		let open = span.range.start;

		if self.header.paren > 0 {
			self.scopes.push(Scope::Body {
				depth,
				open,
				owner: self.owner(),
				resumes_statement: true,
			});
			return;
		}

		if self.in_enum_constants() {
			let owner = self.finish_enum_constant().or_else(|| self.owner());
			self.scopes.push(Scope::Body {
				depth,
				open,
				owner,
				resumes_statement: false,
			});
			return;
		}

		let classified = classify(&self.header.text);
		match classified.kind {
			HeaderKind::Type {
				name,
				is_enum,
				is_record,
			} if !classified.has_initializer => {
				let id = self.declare(DeclarationKind::Type, name, classified.signature);
				self.header = Header::default();
				self.scopes.push(Scope::Type {
					id,
					depth,
					open,
					enum_constants: is_enum,
					record: is_record,
				});
			}
			HeaderKind::Method { name } if !classified.has_initializer => {
				let id = self.declare(DeclarationKind::Method, name, classified.signature);
				self.header = Header::default();
				self.scopes.push(Scope::Body {
					depth,
					open,
					owner: Some(id),
					resumes_statement: false,
				});
			}
			_ if classified.has_initializer => {
				self.scopes.push(Scope::Body {
					depth,
					open,
					owner: self.owner(),
					resumes_statement: true,
				});
			}
			_ => {
				let owner = match self.compact_constructor() {
					Some(name) => Some(self.declare(DeclarationKind::Method, name.clone(), name)),
					None => {
						self.detach_pending();
						self.owner()
					}
				};
				self.header = Header::default();
				self.scopes.push(Scope::Body {
					depth,
					open,
					owner,
					resumes_statement: false,
				});
			}
		}
	}

	fn close(&mut self, span: &SourceSpan<'_>) {
		match self.scopes.last().copied() {
			Some(scope) if scope.depth() == span.depth => {
				match scope {
					Scope::Type { enum_constants, .. } => {
						if enum_constants {
							self.finish_enum_constant();
						}
						self.detach_pending();
						self.header = Header::default();
					}
					Scope::Body {
						resumes_statement, ..
					} => {
						if !resumes_statement {
							self.header = Header::default();
						}
					}
				}
				self.scopes.pop();
			}
			Some(Scope::Body { .. }) => {}
			_ => {
				self.report(
					span.range.start,
					DiagnosticKind::UnresolvedNesting { declaration: None },
				);
			}
		}
	}

	fn end_statement(&mut self, span: &SourceSpan<'_>) {
		if self.header.paren > 0 {
			self.header.push(span.text, &span.range);
			return;
		}

		if self.in_enum_constants() {
			self.finish_enum_constant();
			if let Some(Scope::Type { enum_constants, .. }) = self.scopes.last_mut() {
				*enum_constants = false;
			}
			return;
		}

		if !self.header.is_blank() {
			let classified = classify(&self.header.text);
			match classified.kind {
				HeaderKind::Method { name } => {
					self.declare(DeclarationKind::Method, name, classified.signature);
				}
				HeaderKind::Field { name } => {
					self.declare(DeclarationKind::Field, name, classified.signature);
				}
				HeaderKind::Type { .. } | HeaderKind::Nothing => self.detach_pending(),
			}
		}

		self.header = Header::default();
	}

	fn comma(&mut self, span: &SourceSpan<'_>) {
		if self.header.paren == 0 && self.in_enum_constants() {
			self.finish_enum_constant();
		} else {
			self.header.push(span.text, &span.range);
		}
	}

	/// The name of the compact canonical constructor the header opens, as in
	/// `Point { ... }` inside `record Point(int x, int y)`.
	fn compact_constructor(&self) -> Option<String> {
		let Some(Scope::Type {
			id, record: true, ..
		}) = self.scopes.last()
		else {
			return None;
		};
		let record = self.tree.get(*id)?;
		let tokens = header_tokens(&self.header.text);
		let start = skip_prelude(&tokens, &self.header.text);

		match &tokens[start..] {
			[(HeaderToken::Ident, range)] if self.header.text[range.clone()] == record.name => {
				Some(record.name.clone())
			}
			_ => None,
		}
	}

	/// Record the enum constant held in the header, if any.
	fn finish_enum_constant(&mut self) -> Option<DeclId> {
		let tokens = header_tokens(&self.header.text);
		let start = skip_prelude(&tokens, &self.header.text);
		let name = match tokens.get(start) {
			Some((HeaderToken::Ident, range)) => Some(self.header.text[range.clone()].to_string()),
			_ => None,
		};

		let id = name.map(|name| self.declare(DeclarationKind::Field, name.clone(), name));
		self.header = Header::default();
		id
	}

	fn declare(&mut self, kind: DeclarationKind, name: String, signature: String) -> DeclId {
		let parent = self.owner();
		let kind = match (kind, parent) {
			(DeclarationKind::Type, Some(_)) => DeclarationKind::NestedType,
			(kind, _) => kind,
		};
		let qualified_name = match parent.and_then(|parent| self.tree.get(parent)) {
			Some(parent) => format!("{}.{name}", parent.qualified_name),
			None => name.clone(),
		};
		let doc = self.pending_doc.take();
		let id = self.tree.next_id();

		debug!(
			%qualified_name,
			%kind,
			documented = doc.is_some(),
			"declaration"
		);

		self.tree.push(Declaration {
			id,
			kind,
			name,
			signature,
			qualified_name,
			depth: self.scopes.len(),
			parent,
			doc,
			position: self.lines.position(&self.header.range()),
		})
	}

	fn finish(mut self) -> Located {
		self.detach_pending();

		let unclosed: Vec<Scope> = self.scopes.drain(..).rev().collect();
		let mut reported = Vec::new();
		for scope in unclosed {
			let (open, owner) = match scope {
				Scope::Type { id, open, .. } => (open, Some(id)),
				Scope::Body { open, owner, .. } => (open, owner),
			};
			let Some(id) = owner.filter(|id| !reported.contains(id)) else {
				continue;
			};
			reported.push(id);
			let declaration = self
				.tree
				.get(id)
				.map(|declaration| declaration.qualified_name.clone());
			self.report(open, DiagnosticKind::UnresolvedNesting { declaration });
		}

		self.diagnostics.sort_by_key(|diagnostic| diagnostic.offset);

		Located {
			tree: self.tree,
			detached: self.detached,
			diagnostics: self.diagnostics,
		}
	}
}
