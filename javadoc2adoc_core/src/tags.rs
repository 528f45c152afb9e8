//! Decomposes the raw text of a doc-comment into a description and block
//! tags, each made of [`InlineRun`]s.

use serde::Serialize;
use tracing::debug;

/// A piece of description or tag body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InlineRun {
	Text(String),
	Tag(InlineTag),
}

/// An inline `{@name ...}` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineTag {
	/// `{@link target label}`
	Link {
		target: String,
		label: Option<String>,
	},
	/// `{@linkplain target label}`
	LinkPlain {
		target: String,
		label: Option<String>,
	},
	/// `{@code text}`, kept whole.
	Code { text: String },
	/// `{@literal text}`, kept whole.
	Literal { text: String },
	/// Any other inline tag, passed through as text.
	Unknown { name: String, body: String },
}

impl InlineTag {
	pub fn name(&self) -> &str {
		match self {
			Self::Link { .. } => "link",
			Self::LinkPlain { .. } => "linkplain",
			Self::Code { .. } => "code",
			Self::Literal { .. } => "literal",
			Self::Unknown { name, .. } => name,
		}
	}
}

/// A block tag line such as `@param name description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockTag {
	Param {
		name: String,
		body: Vec<InlineRun>,
	},
	Return {
		body: Vec<InlineRun>,
	},
	/// `@throws` and its synonym `@exception`.
	Throws {
		exception: String,
		body: Vec<InlineRun>,
	},
	See {
		body: Vec<InlineRun>,
	},
	Author {
		body: Vec<InlineRun>,
	},
	Since {
		body: Vec<InlineRun>,
	},
	Version {
		body: Vec<InlineRun>,
	},
	Deprecated {
		body: Vec<InlineRun>,
	},
	/// An unrecognized tag. Name and body are kept verbatim.
	Unknown {
		name: String,
		body: String,
	},
}

impl BlockTag {
	/// The tag name as written after `@`.
	pub fn name(&self) -> &str {
		match self {
			Self::Param { .. } => "param",
			Self::Return { .. } => "return",
			Self::Throws { .. } => "throws",
			Self::See { .. } => "see",
			Self::Author { .. } => "author",
			Self::Since { .. } => "since",
			Self::Version { .. } => "version",
			Self::Deprecated { .. } => "deprecated",
			Self::Unknown { name, .. } => name,
		}
	}
}

/// The structured form of one doc-comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDoc {
	pub description: Vec<InlineRun>,
	/// Block tags in source order.
	pub tags: Vec<BlockTag>,
}

impl ParsedDoc {
	/// A doc-comment with no description and no tags, e.g. `/** */`.
	pub fn is_empty(&self) -> bool {
		self.description.is_empty() && self.tags.is_empty()
	}
}

/// Problems found while parsing a doc-comment. Parsing always recovers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagDiagnostic {
	/// `{@name` without a closing `}`. `line` is the 0-indexed line within
	/// the raw comment.
	MalformedInlineTag { name: String, line: usize },
}

/// Parse a doc-comment, discarding diagnostics.
pub fn parse_doc(raw: &str) -> ParsedDoc {
	parse_doc_with_diagnostics(raw).0
}

/// Parse a doc-comment and collect diagnostics for malformed inline tags.
pub fn parse_doc_with_diagnostics(raw: &str) -> (ParsedDoc, Vec<TagDiagnostic>) {
	let lines = strip_comment(raw);
	let mut diagnostics = Vec::new();

	let split = lines
		.iter()
		.position(|line| block_tag_start(&line.text).is_some())
		.unwrap_or(lines.len());

	let mut description_end = split;
	while description_end > 0 && lines[description_end - 1].text.is_empty() {
		description_end -= 1;
	}

	let (description, description_lines) = LineMap::join(
		lines[..description_end]
			.iter()
			.map(|line| (line.text.as_str(), line.index)),
		"\n",
	);
	let description = parse_inline(&description, &description_lines, 0, &mut diagnostics);

	let mut tags = Vec::new();
	let mut current: Option<(&str, Vec<(&str, usize)>)> = None;

	for line in &lines[split..] {
		if let Some((name, rest)) = block_tag_start(&line.text) {
			if let Some((name, body)) = current.take() {
				tags.push(block_tag(name, &body, &mut diagnostics));
			}
			let body = if rest.is_empty() {
				vec![]
			} else {
				vec![(rest, line.index)]
			};
			current = Some((name, body));
		} else if let Some((_, body)) = current.as_mut() {
			if !line.text.is_empty() {
				body.push((line.text.as_str(), line.index));
			}
		}
	}

	if let Some((name, body)) = current {
		tags.push(block_tag(name, &body, &mut diagnostics));
	}

	(ParsedDoc { description, tags }, diagnostics)
}

/// One content line of a doc-comment after stripping.
#[derive(Debug)]
struct Line {
	text: String,
	/// 0-indexed line within the raw comment.
	index: usize,
}

/// Remove the comment delimiters, the leading `*` decoration and `<p>`
/// markers. Blank lines become single empty lines (paragraph breaks);
/// leading and trailing blank lines are dropped.
fn strip_comment(raw: &str) -> Vec<Line> {
	let inner = raw.strip_prefix("/**").unwrap_or(raw);
	let inner = inner.strip_suffix("*/").unwrap_or(inner);
	let mut lines: Vec<Line> = Vec::new();

	for (index, line) in inner.split('\n').enumerate() {
		let line = line.trim_start().trim_start_matches('*');
		let starts_paragraph = line
			.trim_start()
			.get(..3)
			.is_some_and(|start| start.eq_ignore_ascii_case("<p>"));
		let text = remove_paragraph_markers(line).trim().to_string();

		if starts_paragraph && !ends_blank(&lines) {
			lines.push(Line {
				text: String::new(),
				index,
			});
		}

		if text.is_empty() && ends_blank(&lines) {
			continue;
		}

		lines.push(Line { text, index });
	}

	while lines.last().is_some_and(|line| line.text.is_empty()) {
		lines.pop();
	}

	lines
}

fn ends_blank(lines: &[Line]) -> bool {
	lines.last().is_none_or(|line| line.text.is_empty())
}

/// Comment lines joined into one text, remembering which comment line each
/// byte came from.
#[derive(Debug)]
struct LineMap {
	/// `(offset, line)` pairs ascending by offset.
	starts: Vec<(usize, usize)>,
}

impl LineMap {
	fn join<'a>(
		lines: impl IntoIterator<Item = (&'a str, usize)>,
		separator: &str,
	) -> (String, Self) {
		let mut text = String::new();
		let mut starts = Vec::new();

		for (position, (line, index)) in lines.into_iter().enumerate() {
			if position > 0 {
				text.push_str(separator);
			}
			starts.push((text.len(), index));
			text.push_str(line);
		}

		(text, Self { starts })
	}

	/// The comment line `offset` of the joined text came from.
	fn line(&self, offset: usize) -> usize {
		let after = self.starts.partition_point(|&(start, _)| start <= offset);
		after
			.checked_sub(1)
			.map_or(0, |position| self.starts[position].1)
	}
}

fn remove_paragraph_markers(line: &str) -> String {
	let mut text = line.to_string();
	for marker in ["<p>", "<P>", "</p>", "</P>"] {
		text = text.replace(marker, "");
	}
	text
}

/// Split a block tag line into its name and the rest of the line. The line
/// must start with `@`, a run of letters, and then a non-letter or the end.
fn block_tag_start(line: &str) -> Option<(&str, &str)> {
	let after = line.strip_prefix('@')?;
	let end = after
		.find(|c: char| !c.is_alphabetic())
		.unwrap_or(after.len());
	if end == 0 {
		return None;
	}

	Some((&after[..end], after[end..].trim()))
}

fn block_tag(
	name: &str,
	lines: &[(&str, usize)],
	diagnostics: &mut Vec<TagDiagnostic>,
) -> BlockTag {
	let (body, line_map) = LineMap::join(lines.iter().copied(), " ");
	let mut inline =
		|text: &str, offset: usize| parse_inline(text, &line_map, offset, diagnostics);

	match name {
		"param" => {
			let (name, rest, offset) = split_first_word(&body);
			BlockTag::Param {
				name: name.to_string(),
				body: inline(rest, offset),
			}
		}
		"return" => BlockTag::Return {
			body: inline(&body, 0),
		},
		"throws" | "exception" => {
			let (exception, rest, offset) = split_first_word(&body);
			BlockTag::Throws {
				exception: exception.to_string(),
				body: inline(rest, offset),
			}
		}
		"see" => BlockTag::See {
			body: inline(&body, 0),
		},
		"author" => BlockTag::Author {
			body: inline(&body, 0),
		},
		"since" => BlockTag::Since {
			body: inline(&body, 0),
		},
		"version" => BlockTag::Version {
			body: inline(&body, 0),
		},
		"deprecated" => BlockTag::Deprecated {
			body: inline(&body, 0),
		},
		_ => {
			debug!(tag = name, "unknown block tag");
			BlockTag::Unknown {
				name: name.to_string(),
				body,
			}
		}
	}
}

/// The first word of `text`, the trimmed rest, and the offset the rest
/// starts at.
fn split_first_word(text: &str) -> (&str, &str, usize) {
	match text.find(char::is_whitespace) {
		Some(end) => {
			let rest = &text[end..];
			let offset = end + rest.len() - rest.trim_start().len();
			(&text[..end], rest.trim(), offset)
		}
		None => (text, "", text.len()),
	}
}

/// Split text into plain runs and inline tags. Inline tags may contain
/// balanced braces; one without its closing brace is kept as text. `text`
/// starts at `offset` of the joined text `line_map` describes.
fn parse_inline(
	text: &str,
	line_map: &LineMap,
	offset: usize,
	diagnostics: &mut Vec<TagDiagnostic>,
) -> Vec<InlineRun> {
	let mut runs = Vec::new();
	let mut plain = String::new();
	let mut rest = text;

	while let Some(open) = rest.find("{@") {
		let after = &rest[open + 2..];
		let name_len = after
			.find(|c: char| !c.is_ascii_alphabetic())
			.unwrap_or(after.len());

		if name_len == 0 {
			plain.push_str(&rest[..open + 2]);
			rest = after;
			continue;
		}

		let name = &after[..name_len];
		let Some(close) = closing_brace(&after[name_len..]) else {
			diagnostics.push(TagDiagnostic::MalformedInlineTag {
				name: name.to_string(),
				line: line_map.line(offset + text.len() - rest.len() + open),
			});
			break;
		};

		plain.push_str(&rest[..open]);
		if !plain.is_empty() {
			runs.push(InlineRun::Text(std::mem::take(&mut plain)));
		}

		let argument = after[name_len..name_len + close].trim();
		runs.push(InlineRun::Tag(inline_tag(name, argument)));
		rest = &after[name_len + close + 1..];
	}

	plain.push_str(rest);
	if !plain.is_empty() {
		runs.push(InlineRun::Text(plain));
	}

	runs
}

fn closing_brace(text: &str) -> Option<usize> {
	let mut depth = 0usize;
	for (index, c) in text.char_indices() {
		match c {
			'{' => depth += 1,
			'}' if depth == 0 => return Some(index),
			'}' => depth -= 1,
			_ => {}
		}
	}
	None
}

fn inline_tag(name: &str, argument: &str) -> InlineTag {
	match name {
		"link" => {
			let (target, label) = split_reference(argument);
			InlineTag::Link { target, label }
		}
		"linkplain" => {
			let (target, label) = split_reference(argument);
			InlineTag::LinkPlain { target, label }
		}
		"code" => InlineTag::Code {
			text: argument.to_string(),
		},
		"literal" => InlineTag::Literal {
			text: argument.to_string(),
		},
		_ => InlineTag::Unknown {
			name: name.to_string(),
			body: argument.to_string(),
		},
	}
}

/// Split a reference into its target and optional label at the first
/// whitespace outside parentheses, so `#of(int, int) label` keeps its
/// parameter list.
pub(crate) fn split_reference(argument: &str) -> (String, Option<String>) {
	let mut depth = 0usize;
	for (index, c) in argument.char_indices() {
		match c {
			'(' => depth += 1,
			')' => depth = depth.saturating_sub(1),
			c if c.is_whitespace() && depth == 0 => {
				let label = argument[index..].trim();
				return (
					argument[..index].to_string(),
					(!label.is_empty()).then(|| label.to_string()),
				);
			}
			_ => {}
		}
	}

	(argument.to_string(), None)
}
