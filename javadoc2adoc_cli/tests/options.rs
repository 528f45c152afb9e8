use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use javadoc2adoc_cli::FormatArg;
use javadoc2adoc_cli::Javadoc2AdocCli;
use javadoc2adoc_cli::LocaleArg;
use javadoc2adoc_cli::output_path;
use javadoc2adoc_cli::resolve_inputs;
use javadoc2adoc_core::AnyEmptyResult;
use javadoc2adoc_core::DocError;
use javadoc2adoc_core::InputConfig;
use javadoc2adoc_core::Locale;
use javadoc2adoc_core::OutputFormat;
use rstest::rstest;
use similar_asserts::assert_eq;

#[rstest]
#[case::relative("src/demo/Calc.java", "adoc", "out/src/demo/Calc.adoc")]
#[case::json("Calc.java", "json", "out/Calc.json")]
#[case::absolute("/home/dev/Calc.java", "adoc", "out/home/dev/Calc.adoc")]
#[case::parent_dirs("../shared/Calc.java", "adoc", "out/shared/Calc.adoc")]
fn output_paths(#[case] file: &str, #[case] extension: &str, #[case] expected: &str) {
	assert_eq!(
		output_path(Path::new(file), Path::new("out"), extension),
		PathBuf::from(expected)
	);
}

#[test]
fn parses_flags() -> AnyEmptyResult {
	let args = Javadoc2AdocCli::try_parse_from([
		"javadoc2adoc",
		"-p",
		"project",
		"-o",
		"docs",
		"-l",
		"de",
		"--format",
		"json",
		"--include-undocumented",
		"--deny-warnings",
		"src/A.java",
		"lib",
	])?;

	assert_eq!(args.path, Some(PathBuf::from("project")));
	assert_eq!(args.output, Some(PathBuf::from("docs")));
	assert_eq!(args.locale, Some(LocaleArg::De));
	assert_eq!(args.format, Some(FormatArg::Json));
	assert!(args.include_undocumented);
	assert!(args.deny_warnings);
	assert!(!args.stdout);
	assert_eq!(args.inputs, vec!["src/A.java".to_string(), "lib".to_string()]);

	assert_eq!(Locale::from(LocaleArg::De), Locale::De);
	assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);

	Ok(())
}

#[test]
fn rejects_unknown_locale() {
	assert!(Javadoc2AdocCli::try_parse_from(["javadoc2adoc", "--locale", "fr"]).is_err());
}

#[test]
fn resolves_files_directories_and_globs() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let root = tmp.path();
	std::fs::create_dir_all(root.join("src/a"))?;
	std::fs::create_dir_all(root.join("lib"))?;
	for file in ["src/a/A.java", "src/B.java", "lib/C.java", "lib/readme.md"] {
		std::fs::write(root.join(file), "class X {}")?;
	}

	let input = InputConfig::default();
	let files = resolve_inputs(
		root,
		&["lib".to_string(), "src/*.java".to_string(), "src/B.java".to_string()],
		&input,
	)?;

	assert_eq!(files, vec![root.join("lib/C.java"), root.join("src/B.java")]);
	assert_eq!(resolve_inputs(root, &[], &input)?.len(), 3);

	let missing = resolve_inputs(root, &["nothing/*.java".to_string()], &input);
	assert!(matches!(missing, Err(DocError::NoInputs)));

	Ok(())
}
