use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use javadoc2adoc_cli::Javadoc2AdocCli;
use javadoc2adoc_cli::output_path;
use javadoc2adoc_cli::relative_to;
use javadoc2adoc_cli::resolve_inputs;
use javadoc2adoc_core::AnyResult;
use javadoc2adoc_core::Config;
use javadoc2adoc_core::DocError;
use javadoc2adoc_core::DocResult;
use javadoc2adoc_core::Extraction;
use javadoc2adoc_core::OutputFormat;
use javadoc2adoc_core::ParseDiagnostic;
use javadoc2adoc_core::RenderOptions;
use javadoc2adoc_core::SourceUnit;
use javadoc2adoc_core::extract;
use javadoc2adoc_core::normalize_line_endings;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

/// One source file after extraction, before anything is written.
#[derive(Debug)]
struct Converted {
	relative: PathBuf,
	content: String,
	extraction: Extraction,
}

/// Counts reported in the closing summary line.
#[derive(Debug, Default)]
struct Summary {
	written: usize,
	skipped: usize,
	warnings: usize,
}

fn main() {
	let args = Javadoc2AdocCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	USE_COLOR.store(use_color, Ordering::Relaxed);

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	match run(&args) {
		Ok(summary) => {
			if args.deny_warnings && summary.warnings > 0 {
				eprintln!(
					"{} {} warning(s) with --deny-warnings",
					colored!("error:", red),
					summary.warnings
				);
				process::exit(1);
			}
		}
		Err(e) => {
			// Core errors carry codes and help text, so render them through
			// miette.
			match e.downcast::<DocError>() {
				Ok(doc_err) => {
					let report: miette::Report = (*doc_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("javadoc2adoc=debug,javadoc2adoc_cli=debug,javadoc2adoc_core=debug")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &Javadoc2AdocCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run(args: &Javadoc2AdocCli) -> AnyResult<Summary> {
	let root = resolve_root(args);
	let mut config = Config::load(&root)?.unwrap_or_default();

	if let Some(locale) = args.locale {
		config.render.locale = locale.into();
	}
	if let Some(format) = args.format {
		config.output.format = format.into();
	}
	if args.include_undocumented {
		config.render.include_undocumented = true;
	}

	let out_dir = match (&args.output, &config.output.dir) {
		(Some(dir), _) => Some(dir.clone()),
		(None, Some(dir)) => Some(root.join(dir)),
		(None, None) => None,
	};
	if out_dir.is_none() && !args.stdout {
		return Err(DocError::MissingOutputDir.into());
	}

	let files = resolve_inputs(&root, &args.inputs, &config.input)?;
	debug!(
		count = files.len(),
		threads = rayon::current_num_threads(),
		root = %root.display(),
		"converting"
	);

	// Extraction runs in parallel; reporting and writing keep input order.
	let converted = files
		.par_iter()
		.map(|file| convert(&root, file, &config.render))
		.collect::<DocResult<Vec<_>>>()?;

	let mut summary = Summary::default();
	for Converted {
		relative,
		content,
		extraction,
	} in &converted
	{
		for diagnostic in &extraction.diagnostics {
			eprintln!("{:?}", diagnostic_report(diagnostic, content));
		}
		summary.warnings += extraction.diagnostics.len();

		if extraction.is_empty() && config.output.skip_empty {
			debug!(source = %extraction.source_id, "nothing to convert");
			summary.skipped += 1;
			continue;
		}

		let output = render_output(extraction, config.output.format)?;
		match &out_dir {
			Some(out_dir) if !args.stdout => {
				let target = output_path(relative, out_dir, config.output.format.extension());
				write_output(&target, &output)?;
				if args.verbose {
					println!("  {} {}", colored!("wrote", green), target.display());
				}
			}
			_ => print!("{output}"),
		}
		summary.written += 1;
	}

	print_summary(&summary, args.stdout);

	Ok(summary)
}

fn convert(root: &Path, file: &Path, options: &RenderOptions) -> DocResult<Converted> {
	let relative = relative_to(root, file).to_path_buf();
	let source_id = relative.to_string_lossy().replace('\\', "/");
	let content = normalize_line_endings(&std::fs::read_to_string(file)?);
	let extraction = extract(SourceUnit::new(&source_id, &content), options)?;

	Ok(Converted {
		relative,
		content,
		extraction,
	})
}

fn render_output(extraction: &Extraction, format: OutputFormat) -> AnyResult<String> {
	let output = match format {
		OutputFormat::Adoc => extraction.document(),
		OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(extraction)?),
	};

	Ok(output)
}

fn write_output(target: &Path, output: &str) -> AnyResult<()> {
	if let Some(parent) = target.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(target, output)?;

	Ok(())
}

/// The summary goes to stderr when stdout carries the documents.
fn print_summary(summary: &Summary, to_stderr: bool) {
	let status = if summary.warnings > 0 {
		colored!("done with warnings:", yellow)
	} else {
		colored!("done:", green)
	};
	let line = format!(
		"{status} {} written, {} skipped, {} warning(s)",
		summary.written, summary.skipped, summary.warnings
	);

	if to_stderr {
		eprintln!("{line}");
	} else {
		println!("{line}");
	}
}

/// A miette warning pointing at the diagnostic's location in `content`.
fn diagnostic_report(diagnostic: &ParseDiagnostic, content: &str) -> miette::Report {
	let message = format!(
		"[{}:{}:{}] {}",
		diagnostic.source,
		diagnostic.line,
		diagnostic.column,
		diagnostic.message()
	);
	let diag_value = miette::MietteDiagnostic::new(message)
		.with_code(diagnostic.code())
		.with_help(diagnostic.help())
		.with_severity(miette::Severity::Warning)
		.with_label(miette::LabeledSpan::at_offset(diagnostic.offset, "here"));

	miette::Report::new(diag_value).with_source_code(miette::NamedSource::new(
		&diagnostic.source,
		content.to_string(),
	))
}
