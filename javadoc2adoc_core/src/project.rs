use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use tracing::debug;
use tracing::instrument;
use tracing::trace;

use crate::DocError;
use crate::DocResult;
use crate::InputConfig;

/// Directories that never hold sources worth converting.
const IGNORED_DIRECTORIES: [&str; 4] = ["target", "build", "out", "node_modules"];

/// Discover the sources under `root` that match the `include` globs of
/// `input`. Paths matched by `.gitignore` (unless disabled) or by the
/// `exclude` patterns are skipped. The result is sorted.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn collect_sources(root: &Path, input: &InputConfig) -> DocResult<Vec<PathBuf>> {
	let include = build_glob_set(&input.include)?;
	let gitignore = if input.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let exclude = build_exclude_matcher(root, &input.exclude)?;

	let mut walker = Walker {
		root,
		include: &include,
		gitignore: &gitignore,
		exclude: &exclude,
		visited: HashSet::new(),
		files: Vec::new(),
	};
	walker.walk(root)?;

	let mut files = walker.files;
	files.sort();
	debug!(count = files.len(), "collected sources");

	Ok(files)
}

/// Normalize CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// `*` and `?` stop at path separators; only `**` crosses directories.
fn build_glob_set(patterns: &[String]) -> DocResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = GlobBuilder::new(pattern)
			.literal_separator(true)
			.build()
			.map_err(|e| invalid_pattern(pattern, &e))?;
		builder.add(glob);
	}

	builder.build().map_err(|e| {
		DocError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

fn build_exclude_matcher(root: &Path, patterns: &[String]) -> DocResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder
			.add_line(None, pattern)
			.map_err(|e| invalid_pattern(pattern, &e))?;
	}

	builder.build().map_err(|e| {
		DocError::InvalidPattern {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// The project root's `.gitignore`, or an empty matcher when there is none or
/// it cannot be read.
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.is_file() {
		if let Some(error) = builder.add(&gitignore_path) {
			debug!(%error, "ignoring unreadable .gitignore");
		}
	}

	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn invalid_pattern(pattern: &str, error: &impl std::fmt::Display) -> DocError {
	DocError::InvalidPattern {
		pattern: pattern.to_string(),
		reason: error.to_string(),
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || IGNORED_DIRECTORIES.contains(&name)
}

struct Walker<'w> {
	root: &'w Path,
	include: &'w GlobSet,
	gitignore: &'w Gitignore,
	exclude: &'w Gitignore,
	visited: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Walker<'_> {
	fn walk(&mut self, dir: &Path) -> DocResult<()> {
		// Symlinked directories may loop back on themselves.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited.insert(canonical) {
			trace!(dir = %dir.display(), "already visited");
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			let is_dir = path.is_dir();

			if is_dir
				&& path
					.file_name()
					.and_then(|name| name.to_str())
					.is_some_and(is_ignored_directory_name)
			{
				continue;
			}

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				self.walk(&path)?;
				continue;
			}

			let relative = path.strip_prefix(self.root).unwrap_or(&path);
			if self.include.is_match(relative) {
				self.files.push(path);
			}
		}

		Ok(())
	}
}
