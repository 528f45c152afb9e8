mod common;

use common::SUPER_HERO;
use javadoc2adoc_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use similar_asserts::assert_eq;

const SUPER_HERO_DOCUMENT: &str = "[[SuperHero]]
= SuperHero

A costumed member of the league.

*Author:* Ada

[[SuperHero.power]]
== int power

How strong the hero is, from 0 to 100.

[[SuperHero.SuperHero]]
== SuperHero(int power)

Creates a hero.

.Parameters
power:: the starting power

[[SuperHero.fight]]
== boolean fight(String villain)

Fights a villain.

.Parameters
villain:: who to fight

*Returns:* `+true+` when the hero wins

.Throws
IllegalStateException:: if the hero has no power left

[[SuperHero.Base]]
== SuperHero.Base

Where heroes meet.

[[SuperHero.Base.address]]
=== String address

The street address.
";

fn hero_project() -> std::io::Result<tempfile::TempDir> {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("src/league"))?;
	std::fs::write(tmp.path().join("src/league/SuperHero.java"), SUPER_HERO)?;
	Ok(tmp)
}

#[test]
fn converts_the_project_into_the_output_directory() -> AnyEmptyResult {
	let tmp = hero_project()?;
	let out = tmp.path().join("docs");

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&out)
		.assert()
		.success()
		.stdout(predicates::str::contains("1 written, 0 skipped, 0 warning(s)"));

	let document = std::fs::read_to_string(out.join("src/league/SuperHero.adoc"))?;
	assert_eq!(document, SUPER_HERO_DOCUMENT);

	Ok(())
}

#[test]
fn prints_to_stdout() -> AnyEmptyResult {
	let tmp = hero_project()?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("src/league/SuperHero.java")
		.assert()
		.success()
		.stdout(SUPER_HERO_DOCUMENT)
		.stderr(predicates::str::contains("1 written"));

	assert!(!tmp.path().join("docs").exists());

	Ok(())
}

#[test]
fn german_labels() -> AnyEmptyResult {
	let tmp = hero_project()?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("--locale")
		.arg("de")
		.assert()
		.success()
		.stdout(
			predicates::str::contains(".Parameter\nvillain:: who to fight")
				.and(predicates::str::contains("*Rückgabe:* `+true+` when the hero wins"))
				.and(predicates::str::contains(".Wirft"))
				.and(predicates::str::contains("*Autor:* Ada")),
		);

	Ok(())
}

#[test]
fn json_output() -> AnyEmptyResult {
	let tmp = hero_project()?;

	let output = common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("--format")
		.arg("json")
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["source_id"], "src/league/SuperHero.java");
	assert_eq!(json["fragments"][0]["qualified_name"], "SuperHero");
	assert_eq!(json["fragments"][5]["depth"], 2);
	assert_eq!(json["diagnostics"], Value::Array(vec![]));

	Ok(())
}

#[test]
fn directories_and_globs_select_sources() -> AnyEmptyResult {
	let tmp = hero_project()?;
	std::fs::create_dir_all(tmp.path().join("other"))?;
	std::fs::write(
		tmp.path().join("other/Note.java"),
		"/** A note. */\nclass Note {}\n",
	)?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("other")
		.assert()
		.success()
		.stdout("[[Note]]\n= Note\n\nA note.\n");

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("src/**/*.java")
		.assert()
		.success()
		.stdout(SUPER_HERO_DOCUMENT);

	Ok(())
}

#[test]
fn reads_the_config_file() -> AnyEmptyResult {
	let tmp = hero_project()?;
	std::fs::write(
		tmp.path().join("javadoc2adoc.toml"),
		"[output]\ndir = \"api\"\n\n[render]\nlocale = \"de\"\nanchors = false\n\n[render.labels]\nparam = \"Argumente\"\n",
	)?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let document = std::fs::read_to_string(tmp.path().join("api/src/league/SuperHero.adoc"))?;
	assert!(document.starts_with("= SuperHero\n"));
	assert!(document.contains(".Argumente\npower:: the starting power"));
	assert!(!document.contains("[["));

	Ok(())
}

#[test]
fn invalid_config_is_an_error() -> AnyEmptyResult {
	let tmp = hero_project()?;
	std::fs::write(
		tmp.path().join("javadoc2adoc.toml"),
		"[render.labels]\nparams = \"x\"\n",
	)?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown label key"));

	Ok(())
}

#[test]
fn sources_without_doc_comments_are_skipped() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("Plain.java"), "class Plain { void m() {} }\n")?;
	let out = tmp.path().join("docs");

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--output")
		.arg(&out)
		.assert()
		.success()
		.stdout(predicates::str::contains("0 written, 1 skipped"));

	assert!(!out.join("Plain.adoc").exists());

	Ok(())
}

#[test]
fn diagnostics_are_warnings_unless_denied() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("Broken.java"),
		"/** Doc. */\nclass Broken {\n\tvoid m() {}\n",
	)?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.assert()
		.success()
		.stdout(predicates::str::contains("= Broken"))
		.stderr(
			predicates::str::contains("declaration `Broken` is never closed")
				.and(predicates::str::contains("1 warning(s)")),
		);

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.arg("--deny-warnings")
		.assert()
		.code(1)
		.stderr(predicates::str::contains("--deny-warnings"));

	Ok(())
}

#[test]
fn missing_output_directory_is_an_error() -> AnyEmptyResult {
	let tmp = hero_project()?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no output directory configured"));

	Ok(())
}

#[test]
fn no_sources_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no java sources found"));

	Ok(())
}

#[test]
fn crlf_sources_convert_like_lf() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("Win.java"),
		"/**\r\n * Windows.\r\n */\r\nclass Win {}\r\n",
	)?;

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.assert()
		.success()
		.stdout("[[Win]]\n= Win\n\nWindows.\n");

	Ok(())
}

#[test]
fn many_sources_print_in_path_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let mut expected = String::new();
	for index in 0..24 {
		let name = format!("Unit{index:02}");
		std::fs::write(
			tmp.path().join(format!("{name}.java")),
			format!("/** Unit number {index}. */\nclass {name} {{}}\n"),
		)?;
		expected.push_str(&format!("[[{name}]]\n= {name}\n\nUnit number {index}.\n"));
	}

	common::cli_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("--stdout")
		.assert()
		.success()
		.stdout(expected)
		.stderr(predicates::str::contains("24 written, 0 skipped"));

	Ok(())
}
