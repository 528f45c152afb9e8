use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A location in a source unit. `line` and `column` are 1-indexed, `offset` is
/// the 0-indexed byte offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
	pub start: Point,
	pub end: Point,
}

impl Position {
	pub fn new(start: Point, end: Point) -> Self {
		Self { start, end }
	}
}

/// Pre-computed table of line-start byte offsets for efficient offset-to-point
/// conversion. Built once per source unit (O(n)); each lookup is a binary
/// search (O(log n)).
#[derive(Debug, Clone)]
pub struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	/// Convert a byte offset to a [`Point`].
	pub fn point(&self, offset: usize) -> Point {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};
		let line = line_idx + 1;
		let column = offset - self.line_starts[line_idx] + 1;

		Point::new(line, column, offset)
	}

	pub fn position(&self, range: &std::ops::Range<usize>) -> Position {
		Position::new(self.point(range.start), self.point(range.end))
	}
}
