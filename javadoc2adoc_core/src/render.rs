//! Renders parsed doc-comments as asciidoc.

use std::mem;

use serde::Serialize;

use crate::BlockTag;
use crate::Declaration;
use crate::DeclarationTree;
use crate::InlineRun;
use crate::InlineTag;
use crate::LabelKey;
use crate::ParsedDoc;
use crate::RenderOptions;
use crate::tags::split_reference;

/// Asciidoc supports section levels 0 to 5.
const MAX_SECTION_MARKERS: usize = 6;

/// Characters that start a block-level construct when they begin a line.
const BLOCK_MARKERS: [char; 10] = ['=', '*', '-', '.', '/', ':', '|', '>', '[', '\''];

/// Prefix that neutralizes a block marker at the start of a line.
const EMPTY_ATTRIBUTE: &str = "{empty}";

/// Rendered output for one declaration or stray doc-comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedFragment {
	/// Qualified name of the owning declaration; empty for stray comments at
	/// the root.
	pub qualified_name: String,
	pub depth: usize,
	pub text: String,
	/// Source offsets from the outermost enclosing declaration down to this
	/// fragment. Used to order fragments.
	#[serde(skip)]
	pub path: Vec<usize>,
}

/// Maps parsed doc-comments to asciidoc. Rendering is a pure function of its
/// inputs.
#[derive(Debug, Clone, Copy)]
pub struct AsciidocRenderer<'o> {
	options: &'o RenderOptions,
}

impl<'o> AsciidocRenderer<'o> {
	pub fn new(options: &'o RenderOptions) -> Self {
		Self { options }
	}

	/// Render a declaration's section: anchor, heading and, when present, its
	/// doc-comment.
	pub fn render_declaration(
		&self,
		declaration: &Declaration,
		doc: Option<&ParsedDoc>,
		tree: &DeclarationTree,
	) -> RenderedFragment {
		let context = tree
			.enclosing_type(declaration.id)
			.map_or("", |owner| owner.qualified_name.as_str());
		let title = if declaration.kind.is_type() {
			&declaration.qualified_name
		} else {
			&declaration.signature
		};
		let markers = "=".repeat((declaration.depth + 1).min(MAX_SECTION_MARKERS));

		let mut text = String::new();
		if self.options.anchors {
			text.push_str(&format!("[[{}]]\n", anchor_id(&declaration.qualified_name)));
		}
		text.push_str(&format!("{markers} {}\n", self.escape_text(title, false)));

		if let Some(doc) = doc {
			let body = self.render_doc(doc, context);
			if !body.is_empty() {
				text.push('\n');
				text.push_str(&body);
				text.push('\n');
			}
		}

		RenderedFragment {
			qualified_name: declaration.qualified_name.clone(),
			depth: declaration.depth,
			text,
			path: tree.path(declaration.id),
		}
	}

	/// Render a stray doc-comment found at `offset` inside `owner` (or at the
	/// root). Returns `None` when there is nothing to show.
	pub fn render_detached(
		&self,
		doc: &ParsedDoc,
		owner: Option<&Declaration>,
		tree: &DeclarationTree,
		offset: usize,
	) -> Option<RenderedFragment> {
		let context = owner.map_or("", |owner| owner.qualified_name.as_str());
		let body = self.render_doc(doc, context);
		if body.is_empty() {
			return None;
		}

		let mut path = owner.map(|owner| tree.path(owner.id)).unwrap_or_default();
		path.push(offset);

		Some(RenderedFragment {
			qualified_name: context.to_string(),
			depth: owner.map_or(0, |owner| owner.depth + 1),
			text: format!("{body}\n"),
			path,
		})
	}

	/// Render the description and block tags of a doc-comment. `context` is
	/// the qualified name of the type that `#member` references resolve
	/// against.
	pub fn render_doc(&self, doc: &ParsedDoc, context: &str) -> String {
		let mut blocks = Vec::new();

		let description = self.render_runs(&doc.description, context, true);
		if !description.trim().is_empty() {
			blocks.push(description);
		}

		let mut index = 0;
		while index < doc.tags.len() {
			let tag = &doc.tags[index];
			let run = doc.tags[index..]
				.iter()
				.take_while(|next| mem::discriminant(*next) == mem::discriminant(tag))
				.count();

			match tag {
				BlockTag::Param { .. } | BlockTag::Throws { .. } => {
					blocks.push(self.render_list(&doc.tags[index..index + run], context));
					index += run;
				}
				_ => {
					blocks.push(self.render_labeled(tag, context));
					index += 1;
				}
			}
		}

		blocks.join("\n\n")
	}

	/// A titled description list for a run of `@param` or `@throws` tags.
	fn render_list(&self, tags: &[BlockTag], context: &str) -> String {
		let mut lines = Vec::with_capacity(tags.len() + 1);

		for tag in tags {
			let (key, term, body) = match tag {
				BlockTag::Param { name, body } => (LabelKey::Param, name, body),
				BlockTag::Throws { exception, body } => (LabelKey::Throws, exception, body),
				_ => continue,
			};
			if lines.is_empty() {
				lines.push(format!(".{}", self.options.label(key)));
			}

			let term = self.escape_text(term, false);
			let body = self.render_runs(body, context, false);
			if body.is_empty() {
				lines.push(format!("{term}::"));
			} else {
				lines.push(format!("{term}:: {body}"));
			}
		}

		lines.join("\n")
	}

	/// A `*Label:* body` paragraph.
	fn render_labeled(&self, tag: &BlockTag, context: &str) -> String {
		let runs = |body: &[InlineRun]| self.render_runs(body, context, false);
		let label = |key: LabelKey| self.options.label(key);

		let (label, body) = match tag {
			BlockTag::Return { body } => (label(LabelKey::Return), runs(body)),
			BlockTag::See { body } => (label(LabelKey::See), self.render_see(body, context)),
			BlockTag::Author { body } => (label(LabelKey::Author), runs(body)),
			BlockTag::Since { body } => (label(LabelKey::Since), runs(body)),
			BlockTag::Version { body } => (label(LabelKey::Version), runs(body)),
			BlockTag::Deprecated { body } => (label(LabelKey::Deprecated), runs(body)),
			BlockTag::Unknown { name, body } => (name.as_str(), self.escape_text(body, false)),
			BlockTag::Param { name, body } => (name.as_str(), runs(body)),
			BlockTag::Throws { exception, body } => (exception.as_str(), runs(body)),
		};

		if body.is_empty() {
			format!("*{label}:*")
		} else {
			format!("*{label}:* {body}")
		}
	}

	/// `@see Type#member label` becomes a cross-reference; quoted strings and
	/// html links stay text.
	fn render_see(&self, body: &[InlineRun], context: &str) -> String {
		if let [InlineRun::Text(text)] = body {
			let text = text.trim();
			if text.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == '$' || c == '#') {
				let (target, label) = split_reference(text);
				return self.render_reference(&target, label.as_deref(), context);
			}
		}

		self.render_runs(body, context, false)
	}

	/// Render inline runs. `line_start` tells whether the first run begins a
	/// line of output.
	pub fn render_runs(&self, runs: &[InlineRun], context: &str, line_start: bool) -> String {
		let mut output = String::new();
		let mut at_line_start = line_start;

		for run in runs {
			match run {
				InlineRun::Text(text) => {
					output.push_str(&self.escape_text(text, at_line_start));
					at_line_start = text.ends_with('\n');
				}
				InlineRun::Tag(tag) => {
					output.push_str(&self.render_inline_tag(tag, context));
					at_line_start = false;
				}
			}
		}

		output
	}

	fn render_inline_tag(&self, tag: &InlineTag, context: &str) -> String {
		match tag {
			InlineTag::Link { target, label } | InlineTag::LinkPlain { target, label } => {
				self.render_reference(target, label.as_deref(), context)
			}
			InlineTag::Code { text } => format!("`+{text}+`"),
			InlineTag::Literal { text } => self.escape_text(text, false),
			InlineTag::Unknown { name, body } => {
				let raw = if body.is_empty() {
					format!("{{@{name}}}")
				} else {
					format!("{{@{name} {body}}}")
				};
				self.escape_text(&raw, false)
			}
		}
	}

	/// A cross-reference `<<anchor,label>>`. Without a label the target is
	/// shown, minus a leading `#`.
	fn render_reference(&self, target: &str, label: Option<&str>, context: &str) -> String {
		let label = label.unwrap_or_else(|| target.strip_prefix('#').unwrap_or(target));
		format!(
			"<<{},{}>>",
			reference_anchor(target, context),
			self.escape_text(label, false)
		)
	}

	/// Escape text for asciidoc according to the options.
	pub fn escape_text(&self, text: &str, line_start: bool) -> String {
		if self.options.escape {
			escape(text, &self.options.escape_chars, line_start)
		} else {
			text.to_string()
		}
	}
}

/// Escape `text` so asciidoc shows it literally.
///
/// A character from `chars` gets a backslash when it could open or close a
/// formatting mark. Characters inside a word (`MAX_VALUE`) and characters
/// standing alone between spaces (`2 * 3`) are left alone, since asciidoc
/// keeps the backslash of an escape that matches nothing. The edge of the
/// text counts as neither, because a neighbouring run may continue the word.
/// A line beginning with a block marker is prefixed with `{empty}`.
/// `line_start` tells whether the first line of `text` begins an output
/// line.
pub fn escape(text: &str, chars: &str, line_start: bool) -> String {
	let mut output = String::with_capacity(text.len());

	for (index, line) in text.split('\n').enumerate() {
		if index > 0 {
			output.push('\n');
		}
		if (index > 0 || line_start) && starts_block(line) {
			output.push_str(EMPTY_ATTRIBUTE);
		}

		let characters: Vec<char> = line.chars().collect();
		for (position, &c) in characters.iter().enumerate() {
			if chars.contains(c) {
				let before = position.checked_sub(1).map(|previous| characters[previous]);
				let after = characters.get(position + 1).copied();
				let in_word = before.is_some_and(char::is_alphanumeric)
					&& after.is_some_and(char::is_alphanumeric);
				let standalone = before.is_some_and(char::is_whitespace)
					&& after.is_some_and(char::is_whitespace);
				if !in_word && !standalone {
					output.push('\\');
				}
			}
			output.push(c);
		}
	}

	output
}

/// Undo [`escape`].
pub fn unescape(text: &str, chars: &str) -> String {
	let mut output = String::with_capacity(text.len());

	for (index, line) in text.split('\n').enumerate() {
		if index > 0 {
			output.push('\n');
		}

		let line = line.strip_prefix(EMPTY_ATTRIBUTE).unwrap_or(line);
		let mut characters = line.chars().peekable();
		while let Some(c) = characters.next() {
			if c == '\\' {
				if let Some(&next) = characters.peek() {
					if chars.contains(next) {
						continue;
					}
				}
			}
			output.push(c);
		}
	}

	output
}

fn starts_block(line: &str) -> bool {
	if line.starts_with(BLOCK_MARKERS) {
		return true;
	}

	let digits = line.chars().take_while(char::is_ascii_digit).count();
	digits > 0 && line[digits..].starts_with('.')
}

/// A valid asciidoc id for a qualified name.
pub fn anchor_id(name: &str) -> String {
	let mut id: String = name
		.chars()
		.map(|c| {
			if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') {
				c
			} else {
				'_'
			}
		})
		.collect();

	if !id.starts_with(|c: char| c.is_alphabetic() || c == '_' || c == ':') {
		id.insert(0, '_');
	}

	id
}

/// The anchor a javadoc reference points to. `Type#member(args)` maps to
/// `Type.member`; a bare `#member` resolves against `context`.
pub fn reference_anchor(reference: &str, context: &str) -> String {
	let reference = reference.find('(').map_or(reference, |index| &reference[..index]);
	let name = match reference.split_once('#') {
		Some(("", member)) if context.is_empty() => member.to_string(),
		Some(("", member)) => format!("{context}.{member}"),
		Some((owner, member)) => format!("{owner}.{member}"),
		None => reference.to_string(),
	};

	anchor_id(&name)
}
