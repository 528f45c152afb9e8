use std::fmt;

use derive_more::Deref;
use serde::Deserialize;
use serde::Serialize;

use crate::Position;

/// Index of a [`Declaration`] inside its [`DeclarationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
	/// A top-level class, interface, enum, record or annotation type.
	Type,
	/// A type declared inside another type.
	NestedType,
	/// A field or enum constant.
	Field,
	/// A method or constructor.
	Method,
}

impl DeclarationKind {
	/// Types open a lexical scope that owns further declarations.
	pub fn is_type(self) -> bool {
		matches!(self, Self::Type | Self::NestedType)
	}
}

impl fmt::Display for DeclarationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Type => "type",
			Self::NestedType => "nested type",
			Self::Field => "field",
			Self::Method => "method",
		};
		write!(f, "{name}")
	}
}

/// The raw text of one `/** ... */` block, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
	pub text: String,
	pub position: Position,
}

/// A named construct that can own a doc-comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
	pub id: DeclId,
	pub kind: DeclarationKind,
	/// The simple name, e.g. `getImage`.
	pub name: String,
	/// The whitespace-normalized declaration head: the name for types,
	/// `type name` for fields and `type name(params)` for methods.
	pub signature: String,
	/// Enclosing type names and the simple name joined by `.`.
	pub qualified_name: String,
	/// Number of enclosing types.
	pub depth: usize,
	/// The enclosing type. `None` stands for the synthetic root.
	pub parent: Option<DeclId>,
	pub doc: Option<DocComment>,
	pub position: Position,
}

/// A doc-comment that precedes no declaration, kept so it is not lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachedDoc {
	/// The innermost type the comment appeared in, `None` at the root.
	pub owner: Option<DeclId>,
	pub doc: DocComment,
}

/// Flat arena of declarations in source order. Parents always precede their
/// children and the only links are parent indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize, Deserialize)]
pub struct DeclarationTree(Vec<Declaration>);

impl DeclarationTree {
	pub fn get(&self, id: DeclId) -> Option<&Declaration> {
		self.0.get(id.0)
	}

	pub(crate) fn next_id(&self) -> DeclId {
		DeclId(self.0.len())
	}

	pub(crate) fn push(&mut self, declaration: Declaration) -> DeclId {
		let id = declaration.id;
		self.0.push(declaration);
		id
	}

	pub fn parent(&self, id: DeclId) -> Option<&Declaration> {
		self.get(id)?.parent.and_then(|parent| self.get(parent))
	}

	/// Direct children of `parent`, or the top-level declarations when
	/// `parent` is `None`.
	pub fn children(&self, parent: Option<DeclId>) -> impl Iterator<Item = &Declaration> + '_ {
		self.0.iter().filter(move |declaration| declaration.parent == parent)
	}

	/// Enclosing declarations from the innermost outwards.
	pub fn ancestors(&self, id: DeclId) -> impl Iterator<Item = &Declaration> + '_ {
		std::iter::successors(self.parent(id), |declaration| self.parent(declaration.id))
	}

	/// The type a declaration belongs to: itself for types, its parent for
	/// members.
	pub fn enclosing_type(&self, id: DeclId) -> Option<&Declaration> {
		let declaration = self.get(id)?;
		if declaration.kind.is_type() {
			Some(declaration)
		} else {
			self.parent(id)
		}
	}

	/// Source offsets from the outermost enclosing declaration down to `id`.
	/// Comparing paths orders a parent before its descendants and siblings
	/// by source position.
	pub fn path(&self, id: DeclId) -> Vec<usize> {
		let mut path: Vec<usize> = self
			.ancestors(id)
			.map(|declaration| declaration.position.start.offset)
			.collect();
		path.reverse();
		if let Some(declaration) = self.get(id) {
			path.push(declaration.position.start.offset);
		}
		path
	}

	pub fn into_inner(self) -> Vec<Declaration> {
		self.0
	}
}
