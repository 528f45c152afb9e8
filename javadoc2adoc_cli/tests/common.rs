use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const SUPER_HERO: &str = include_str!("fixtures/SuperHero.java");

pub fn cli_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("javadoc2adoc"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
