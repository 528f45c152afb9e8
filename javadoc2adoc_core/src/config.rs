use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DocError;
use crate::DocResult;

/// Config file names searched for, in order, under the project root.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"javadoc2adoc.toml",
	".javadoc2adoc.toml",
	".config/javadoc2adoc.toml",
];

/// Default characters escaped in rendered text.
pub const DEFAULT_ESCAPE_CHARS: &str = "*_`#^~{";

/// Project configuration loaded from `javadoc2adoc.toml`.
///
/// ```toml
/// [input]
/// include = ["src/**/*.java"]
/// exclude = ["**/generated/**"]
///
/// [output]
/// dir = "docs/api"
/// format = "adoc"
///
/// [render]
/// locale = "de"
/// include_undocumented = false
///
/// [render.labels]
/// param = "Arguments"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub input: InputConfig,
	#[serde(default)]
	pub output: OutputConfig,
	#[serde(default)]
	pub render: RenderOptions,
}

impl Config {
	/// Find the first config file that exists under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is none.
	pub fn load(root: &Path) -> DocResult<Option<Config>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	/// Parse and validate config file contents.
	pub fn parse(content: &str) -> DocResult<Config> {
		let config: Config =
			toml::from_str(content).map_err(|e| DocError::ConfigParse(e.to_string()))?;
		config.render.validate()?;

		Ok(config)
	}
}

/// Which files to convert.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
	/// Glob patterns, relative to the project root, of sources to convert.
	#[serde(default = "default_include")]
	pub include: Vec<String>,
	/// Gitignore-style patterns of paths to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// When true, `.gitignore` is not consulted while walking.
	#[serde(default)]
	pub disable_gitignore: bool,
}

impl Default for InputConfig {
	fn default() -> Self {
		Self {
			include: default_include(),
			exclude: Vec::new(),
			disable_gitignore: false,
		}
	}
}

fn default_include() -> Vec<String> {
	vec!["**/*.java".to_string()]
}

/// Where and how converted documents are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
	/// Output directory, relative to the project root.
	#[serde(default)]
	pub dir: Option<PathBuf>,
	#[serde(default)]
	pub format: OutputFormat,
	/// Skip sources that produce no fragments instead of writing empty files.
	#[serde(default = "default_true")]
	pub skip_empty: bool,
}

impl Default for OutputConfig {
	fn default() -> Self {
		Self {
			dir: None,
			format: OutputFormat::default(),
			skip_empty: true,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
	/// One asciidoc document per source file.
	#[default]
	Adoc,
	/// The full extraction (fragments and diagnostics) as JSON.
	Json,
}

impl OutputFormat {
	pub fn extension(self) -> &'static str {
		match self {
			Self::Adoc => "adoc",
			Self::Json => "json",
		}
	}
}

/// Options controlling the markup renderer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderOptions {
	/// Language of the fixed section labels.
	#[serde(default)]
	pub locale: Locale,
	/// Emit a `[[qualified.name]]` anchor before each section heading.
	#[serde(default = "default_true")]
	pub anchors: bool,
	/// Escape characters that are significant in asciidoc.
	#[serde(default = "default_true")]
	pub escape: bool,
	/// The characters escaped with a backslash when `escape` is on.
	#[serde(default = "default_escape_chars")]
	pub escape_chars: String,
	/// Render sections for declarations without a doc-comment.
	#[serde(default)]
	pub include_undocumented: bool,
	/// Label overrides keyed by [`LabelKey`] name.
	#[serde(default)]
	pub labels: BTreeMap<String, String>,
}

impl Default for RenderOptions {
	fn default() -> Self {
		Self {
			locale: Locale::default(),
			anchors: true,
			escape: true,
			escape_chars: default_escape_chars(),
			include_undocumented: false,
			labels: BTreeMap::new(),
		}
	}
}

impl RenderOptions {
	/// Reject label overrides for keys that do not exist.
	pub fn validate(&self) -> DocResult<()> {
		for key in self.labels.keys() {
			if LabelKey::from_key(key).is_none() {
				return Err(DocError::UnknownLabel(key.clone()));
			}
		}
		Ok(())
	}

	/// The label for `key`, honoring overrides.
	pub fn label(&self, key: LabelKey) -> &str {
		self.labels
			.get(key.as_str())
			.map_or_else(|| key.default_label(self.locale), String::as_str)
	}
}

fn default_true() -> bool {
	true
}

fn default_escape_chars() -> String {
	DEFAULT_ESCAPE_CHARS.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
	#[default]
	En,
	De,
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::En => write!(f, "en"),
			Self::De => write!(f, "de"),
		}
	}
}

/// The labeled block tag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKey {
	Param,
	Return,
	Throws,
	See,
	Author,
	Since,
	Version,
	Deprecated,
}

impl LabelKey {
	pub const ALL: [LabelKey; 8] = [
		Self::Param,
		Self::Return,
		Self::Throws,
		Self::See,
		Self::Author,
		Self::Since,
		Self::Version,
		Self::Deprecated,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Param => "param",
			Self::Return => "return",
			Self::Throws => "throws",
			Self::See => "see",
			Self::Author => "author",
			Self::Since => "since",
			Self::Version => "version",
			Self::Deprecated => "deprecated",
		}
	}

	pub fn from_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|label| label.as_str() == key)
	}

	pub fn default_label(self, locale: Locale) -> &'static str {
		match (locale, self) {
			(Locale::En, Self::Param) => "Parameters",
			(Locale::En, Self::Return) => "Returns",
			(Locale::En, Self::Throws) => "Throws",
			(Locale::En, Self::See) => "See also",
			(Locale::En, Self::Author) => "Author",
			(Locale::En, Self::Since) => "Since",
			(Locale::En, Self::Version) => "Version",
			(Locale::En, Self::Deprecated) => "Deprecated",
			(Locale::De, Self::Param) => "Parameter",
			(Locale::De, Self::Return) => "Rückgabe",
			(Locale::De, Self::Throws) => "Wirft",
			(Locale::De, Self::See) => "Siehe auch",
			(Locale::De, Self::Author) => "Autor",
			(Locale::De, Self::Since) => "Seit",
			(Locale::De, Self::Version) => "Version",
			(Locale::De, Self::Deprecated) => "Veraltet",
		}
	}
}
