use crate::RenderedFragment;

/// Order fragments so every parent precedes its descendants and siblings
/// keep their source order. The sort is stable.
pub fn assemble(mut fragments: Vec<RenderedFragment>) -> Vec<RenderedFragment> {
	fragments.sort_by(|a, b| a.path.cmp(&b.path));
	fragments
}

/// Join assembled fragments into one document, separated by blank lines.
pub fn join_fragments(fragments: &[RenderedFragment]) -> String {
	fragments
		.iter()
		.map(|fragment| fragment.text.as_str())
		.collect::<Vec<_>>()
		.join("\n")
}
