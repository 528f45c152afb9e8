use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use javadoc2adoc_core::DocError;
use javadoc2adoc_core::DocResult;
use javadoc2adoc_core::InputConfig;
use javadoc2adoc_core::Locale;
use javadoc2adoc_core::OutputFormat;
use javadoc2adoc_core::collect_sources;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Convert the javadoc comments of Java sources into asciidoc documents.",
	long_about = "javadoc2adoc reads Java source files, finds the doc-comments attached to \
	              classes, interfaces, enums, records, fields and methods, and renders them as \
	              asciidoc sections nested the same way the declarations are.\n\nInputs may be \
	              files, directories or glob patterns. Without inputs the `include` patterns of \
	              javadoc2adoc.toml (default `**/*.java`) are used.\n\nExamples:\n  javadoc2adoc \
	              -o docs/api\n  javadoc2adoc --stdout src/main/java/Calc.java\n  javadoc2adoc \
	              -l de --format json -o build/docs 'src/**/*.java'"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Javadoc2AdocCli {
	/// Java files, directories or glob patterns to convert, relative to the
	/// project root.
	pub inputs: Vec<String>,

	/// Path to the project root directory.
	#[arg(long, short)]
	pub path: Option<PathBuf>,

	/// Directory the converted documents are written to. Overrides `dir`
	/// under `[output]`.
	#[arg(long, short)]
	pub output: Option<PathBuf>,

	/// Language of the section labels.
	#[arg(long, short, value_enum)]
	pub locale: Option<LocaleArg>,

	/// Output format.
	#[arg(long, value_enum)]
	pub format: Option<FormatArg>,

	/// Print the converted documents instead of writing files.
	#[arg(long, default_value_t = false)]
	pub stdout: bool,

	/// Render a section for every declaration, documented or not.
	#[arg(long, default_value_t = false)]
	pub include_undocumented: bool,

	/// Exit with status 1 when any source produced a diagnostic.
	#[arg(long, default_value_t = false)]
	pub deny_warnings: bool,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocaleArg {
	En,
	De,
}

impl From<LocaleArg> for Locale {
	fn from(value: LocaleArg) -> Self {
		match value {
			LocaleArg::En => Locale::En,
			LocaleArg::De => Locale::De,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
	/// One asciidoc document per source file.
	Adoc,
	/// The extraction with fragments and diagnostics as JSON.
	Json,
}

impl From<FormatArg> for OutputFormat {
	fn from(value: FormatArg) -> Self {
		match value {
			FormatArg::Adoc => OutputFormat::Adoc,
			FormatArg::Json => OutputFormat::Json,
		}
	}
}

/// Where the document converted from `file` is written: the same relative
/// path under `out_dir` with `extension`. Root, prefix and `..` components
/// of `file` are dropped so the result always stays inside `out_dir`.
pub fn output_path(file: &Path, out_dir: &Path, extension: &str) -> PathBuf {
	let relative: PathBuf = file
		.components()
		.filter(|component| matches!(component, Component::Normal(_)))
		.collect();

	out_dir.join(relative).with_extension(extension)
}

/// `file` relative to `root` when it lies inside it.
pub fn relative_to<'a>(root: &Path, file: &'a Path) -> &'a Path {
	file.strip_prefix(root).unwrap_or(file)
}

/// Expand the command line inputs into a sorted, deduplicated list of
/// source files. Without inputs the configured `include` patterns apply.
pub fn resolve_inputs(
	root: &Path,
	inputs: &[String],
	input: &InputConfig,
) -> DocResult<Vec<PathBuf>> {
	let mut files = if inputs.is_empty() {
		collect_sources(root, input)?
	} else {
		let mut files = Vec::new();
		for argument in inputs {
			files.extend(resolve_input(root, argument, input)?);
		}
		files
	};

	files.sort();
	files.dedup();

	if files.is_empty() {
		return Err(DocError::NoInputs);
	}

	Ok(files)
}

fn resolve_input(root: &Path, argument: &str, input: &InputConfig) -> DocResult<Vec<PathBuf>> {
	let path = root.join(argument);

	if path.is_file() {
		return Ok(vec![path]);
	}

	if path.is_dir() {
		let walk = InputConfig {
			include: vec!["**/*.java".to_string()],
			..input.clone()
		};
		return collect_sources(&path, &walk);
	}

	let pattern = relative_to(root, Path::new(argument))
		.to_string_lossy()
		.replace('\\', "/");
	let walk = InputConfig {
		include: vec![pattern],
		..input.clone()
	};

	collect_sources(root, &walk)
}
