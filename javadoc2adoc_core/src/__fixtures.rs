use crate::RenderOptions;

pub const CALCULATOR: &str = r#"package demo;

import java.util.List;

/**
 * A small calculator.
 */
public class Calc {
	/** The default value. */
	public static final int DEFAULT = 0;

	/**
	 * Returns X.
	 * @param a the value
	 * @return the result
	 */
	public int compute(int a) {
		return a * 2;
	}

	/** Modes. */
	enum Mode {
		/** Fast. */
		FAST,
		SLOW;
	}
}
"#;

pub const CALCULATOR_DOCUMENT: &str = r"[[Calc]]
= Calc

A small calculator.

[[Calc.DEFAULT]]
== int DEFAULT

The default value.

[[Calc.compute]]
== int compute(int a)

Returns X.

.Parameters
a:: the value

*Returns:* the result

[[Calc.Mode]]
== Calc.Mode

Modes.

[[Calc.Mode.FAST]]
=== FAST

Fast.
";

/// A character sheet with nested types, generics, annotations and a lambda
/// field initializer.
pub const HERO: &str = r#"package league;

import java.util.function.Supplier;

/**
 * A member of the league.
 * <p>
 * Every hero has a {@code codename} and at most one {@link Sidekick}.
 *
 * @author Ada
 * @since 1.0
 */
public class Hero implements Comparable<Hero> {
	/** Rendered when no codename is known. */
	private static final String UNKNOWN = "?{";

	private final Supplier<String> motto = () -> {
		return "onward";
	};

	/**
	 * Creates a hero.
	 *
	 * @param codename the public name
	 * @param power the power level,
	 *        between 0 and 100
	 * @throws IllegalArgumentException if {@code power} is negative
	 */
	@SuppressWarnings({"unused", "rawtypes"})
	public Hero(String codename, int power) {
		if (power < 0) {
			throw new IllegalArgumentException("negative");
		}
	}

	/**
	 * Compares by power.
	 *
	 * @see #power()
	 * @see Comparable#compareTo(Object) natural order
	 */
	@Override
	public <T extends Hero> int compareTo(T other) {
		return 0;
	}

	/** The hero's sidekick. */
	public static final class Sidekick {
		/** Loyalty, from 0 to 10. */
		int loyalty;
	}

	/** Powers a hero can have. */
	public interface Power {
		/**
		 * Activate the power.
		 * @return whether it worked
		 */
		boolean activate();
	}
}
"#;

pub fn default_options() -> RenderOptions {
	RenderOptions::default()
}

/// `depth` classes nested inside each other. Only the innermost is
/// documented.
pub fn nested_classes(depth: usize) -> String {
	let mut source = String::new();
	for level in 0..depth {
		if level + 1 == depth {
			source.push_str("/** Deepest. */\n");
		}
		source.push_str(&format!("class C{level} {{\n"));
	}
	for _ in 0..depth {
		source.push_str("}\n");
	}
	source
}
