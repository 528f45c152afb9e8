use serde::Serialize;
use tracing::debug;
use tracing::instrument;

use crate::AsciidocRenderer;
use crate::DeclarationTree;
use crate::DiagnosticKind;
use crate::DocComment;
use crate::DocError;
use crate::DocResult;
use crate::LineTable;
use crate::Located;
use crate::ParseDiagnostic;
use crate::ParsedDoc;
use crate::RenderOptions;
use crate::RenderedFragment;
use crate::TagDiagnostic;
use crate::assemble;
use crate::join_fragments;
use crate::locate;
use crate::parse_doc_with_diagnostics;
use crate::scan;

/// One unit of input: the text of a source file and an identifier for it.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
	pub id: &'a str,
	pub text: &'a str,
}

impl<'a> SourceUnit<'a> {
	pub fn new(id: &'a str, text: &'a str) -> Self {
		Self { id, text }
	}
}

/// The result of extracting one source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
	pub source_id: String,
	/// Rendered fragments, parents before descendants, in source order.
	pub fragments: Vec<RenderedFragment>,
	/// Non-fatal notices ordered by position.
	pub diagnostics: Vec<ParseDiagnostic>,
}

impl Extraction {
	/// All fragments joined into one asciidoc document.
	pub fn document(&self) -> String {
		join_fragments(&self.fragments)
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}
}

/// Run the whole pipeline on one source unit: scan, locate declarations,
/// parse their doc-comments, render and assemble.
///
/// Malformed source never fails the call; problems are reported as
/// diagnostics. Only an empty source identifier is rejected.
#[instrument(skip_all, fields(source = unit.id))]
pub fn extract(unit: SourceUnit<'_>, options: &RenderOptions) -> DocResult<Extraction> {
	if unit.id.is_empty() {
		return Err(DocError::EmptySourceId);
	}

	let Located {
		tree,
		detached,
		mut diagnostics,
	} = locate(unit.id, unit.text, scan(unit.text));
	let lines = LineTable::new(unit.text);
	let renderer = AsciidocRenderer::new(options);
	let sections = sections_to_render(&tree, options.include_undocumented);
	let mut fragments = Vec::new();

	for declaration in tree.iter() {
		if !sections[declaration.id.0] {
			continue;
		}

		let parsed = declaration
			.doc
			.as_ref()
			.map(|doc| parse_comment(unit.id, doc, &lines, &mut diagnostics));
		fragments.push(renderer.render_declaration(declaration, parsed.as_ref(), &tree));
	}

	for stray in &detached {
		let parsed = parse_comment(unit.id, &stray.doc, &lines, &mut diagnostics);
		let owner = stray.owner.and_then(|id| tree.get(id));
		if let Some(fragment) =
			renderer.render_detached(&parsed, owner, &tree, stray.doc.position.start.offset)
		{
			fragments.push(fragment);
		}
	}

	let fragments = assemble(fragments);
	diagnostics.sort_by_key(|diagnostic| diagnostic.offset);

	debug!(
		declarations = tree.len(),
		fragments = fragments.len(),
		diagnostics = diagnostics.len(),
		"extracted"
	);

	Ok(Extraction {
		source_id: unit.id.to_string(),
		fragments,
		diagnostics,
	})
}

/// Which declarations get a section: documented ones, every ancestor of a
/// documented one (so headings stay nested), or all when
/// `include_undocumented` is set.
fn sections_to_render(tree: &DeclarationTree, include_undocumented: bool) -> Vec<bool> {
	let mut sections: Vec<bool> = tree
		.iter()
		.map(|declaration| include_undocumented || declaration.doc.is_some())
		.collect();

	for declaration in tree.iter().rev() {
		if sections[declaration.id.0] {
			if let Some(parent) = declaration.parent {
				sections[parent.0] = true;
			}
		}
	}

	sections
}

fn parse_comment(
	source_id: &str,
	doc: &DocComment,
	lines: &LineTable,
	diagnostics: &mut Vec<ParseDiagnostic>,
) -> ParsedDoc {
	let (parsed, tag_diagnostics) = parse_doc_with_diagnostics(&doc.text);

	for diagnostic in tag_diagnostics {
		match diagnostic {
			TagDiagnostic::MalformedInlineTag { name, line } => {
				let relative = match line {
					0 => 0,
					line => {
						doc.text
							.match_indices('\n')
							.nth(line - 1)
							.map_or(0, |(index, _)| index + 1)
					}
				};
				let point = lines.point(doc.position.start.offset + relative);
				diagnostics.push(ParseDiagnostic::new(
					source_id,
					DiagnosticKind::MalformedInlineTag { name },
					point,
				));
			}
		}
	}

	parsed
}
