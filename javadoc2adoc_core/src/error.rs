use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocError {
	#[error(transparent)]
	#[diagnostic(code(javadoc2adoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("source identifier must not be empty")]
	#[diagnostic(
		code(javadoc2adoc::empty_source_id),
		help("pass the file path (or any non-empty name) the source text was read from")
	)]
	EmptySourceId,

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(javadoc2adoc::config_parse),
		help("check that javadoc2adoc.toml is valid TOML with [input], [output] and/or [render] sections")
	)]
	ConfigParse(String),

	#[error("unknown label key: `{0}`")]
	#[diagnostic(
		code(javadoc2adoc::unknown_label),
		help("available label keys: param, return, throws, see, author, since, version, deprecated")
	)]
	UnknownLabel(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(javadoc2adoc::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("no java sources found")]
	#[diagnostic(
		code(javadoc2adoc::no_inputs),
		help("pass files, directories or glob patterns, or set `include` under [input] in javadoc2adoc.toml")
	)]
	NoInputs,

	#[error("no output directory configured")]
	#[diagnostic(
		code(javadoc2adoc::missing_output_dir),
		help("pass `--output <dir>`, set `dir` under [output] in javadoc2adoc.toml, or use `--stdout`")
	)]
	MissingOutputDir,
}

pub type DocResult<T> = Result<T, DocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
