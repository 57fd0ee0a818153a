//! Grammar artifact ABI.
//!
//! A grammar binding exposes a [`LanguageFn`] that hands out a static
//! [`RawLanguage`]. The host runtime turns that artifact into a validated
//! language handle. Nothing in this crate validates anything: a
//! `RawLanguage` is plain data and may be malformed.
//!
//! # Layout
//!
//! * Symbol `0` is always the end-of-input symbol ([`Definition::End`]).
//! * Tokens are either anonymous literals or named patterns.
//! * Nonterminals are described by a [`Rule`] tree, or by an
//!   [`ExpressionTable`] for left-recursive operator grammars.
//! * Symbols whose `hidden` flag is set never become tree nodes; their
//!   children are inlined into the parent.

/// Newest artifact version understood by the runtime.
pub const LANGUAGE_VERSION: u32 = 1;

/// Oldest artifact version the runtime still accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 1;

/// Index into [`RawLanguage::symbols`].
pub type Symbol = u16;

/// A compiled grammar artifact.
#[derive(Debug, Clone, Copy)]
pub struct RawLanguage {
	/// Artifact format version, checked against [`LANGUAGE_VERSION`].
	pub abi_version: u32,
	/// Human readable grammar name.
	pub name: &'static str,
	/// Symbol table.
	pub symbols: &'static [SymbolInfo],
	/// Start symbol.
	pub root: Symbol,
	/// Tokens allowed between any two tokens (comments).
	pub extras: &'static [Symbol],
	/// Tokens that end a skipped region during error recovery.
	pub recovery: &'static [Symbol],
}

impl RawLanguage {
	/// Zero-valued artifact. Never loadable.
	pub const EMPTY: RawLanguage = RawLanguage {
		abi_version: 0,
		name: "",
		symbols: &[],
		root: 0,
		extras: &[],
		recovery: &[],
	};
}

/// A single entry of the symbol table.
#[derive(Debug, Clone, Copy)]
pub struct SymbolInfo {
	/// Node kind name.
	pub name: &'static str,
	/// Named nodes show up in S-expressions; anonymous tokens do not.
	pub named: bool,
	/// Hidden rules are inlined into their parent.
	pub hidden: bool,
	pub definition: Definition,
}

impl SymbolInfo {
	/// Symbol 0 of every artifact.
	pub const fn end() -> Self {
		Self {
			name: "end",
			named: false,
			hidden: true,
			definition: Definition::End,
		}
	}

	/// Anonymous token matching `text` exactly.
	pub const fn literal(text: &'static str) -> Self {
		Self {
			name: text,
			named: false,
			hidden: false,
			definition: Definition::Literal(text),
		}
	}

	/// Named token matching a regular expression.
	pub const fn pattern(name: &'static str, regex: &'static str) -> Self {
		Self {
			name,
			named: true,
			hidden: false,
			definition: Definition::Pattern(regex),
		}
	}

	/// Named nonterminal. Names starting with `_` are hidden.
	pub const fn rule(name: &'static str, rule: Rule) -> Self {
		Self {
			name,
			named: true,
			hidden: is_hidden_name(name),
			definition: Definition::Rule(rule),
		}
	}

	/// Nonterminal parsed with an operator precedence table.
	pub const fn expression(name: &'static str, table: &'static ExpressionTable) -> Self {
		Self {
			name,
			named: true,
			hidden: is_hidden_name(name),
			definition: Definition::Expression(table),
		}
	}

	/// Node built by an expression table.
	pub const fn derived(name: &'static str) -> Self {
		Self {
			name,
			named: true,
			hidden: false,
			definition: Definition::Derived,
		}
	}

	/// Whether this symbol is produced directly by the lexer.
	pub const fn is_token(&self) -> bool {
		matches!(
			self.definition,
			Definition::Literal(_) | Definition::Pattern(_)
		)
	}
}

const fn is_hidden_name(name: &str) -> bool {
	matches!(name.as_bytes().first(), Some(&b'_'))
}

/// How a symbol is recognised.
#[derive(Debug, Clone, Copy)]
pub enum Definition {
	/// End of input.
	End,
	/// Exact text.
	Literal(&'static str),
	/// Regular expression, matched at the current position.
	Pattern(&'static str),
	/// Nonterminal.
	Rule(Rule),
	/// Operator precedence grammar.
	Expression(&'static ExpressionTable),
	/// Built by an [`ExpressionTable`] entry; never parsed on its own.
	Derived,
}

/// Grammar rule tree.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
	Symbol(Symbol),
	Seq(&'static [Rule]),
	/// Ordered choice: the first alternative that matches wins.
	Choice(&'static [Rule]),
	Repeat(&'static Rule),
	Repeat1(&'static Rule),
	Optional(&'static Rule),
}

/// Operator precedence description of a left-recursive expression rule.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionTable {
	/// Non-operator alternatives (literals, identifiers, closures).
	pub operand: Rule,
	pub prefix: &'static [PrefixOperator],
	pub infix: &'static [InfixOperator],
	pub postfix: &'static [PostfixRule],
}

/// `op expr`
#[derive(Debug, Clone, Copy)]
pub struct PrefixOperator {
	/// Literal token symbol.
	pub operator: Symbol,
	pub precedence: u8,
	/// Node kind to build.
	pub node: Symbol,
}

/// `expr op expr`
#[derive(Debug, Clone, Copy)]
pub struct InfixOperator {
	/// Literal token symbol.
	pub operator: Symbol,
	pub precedence: u8,
	pub associativity: Associativity,
	/// Node kind to build.
	pub node: Symbol,
}

/// `expr rule`, e.g. a call's argument list.
#[derive(Debug, Clone, Copy)]
pub struct PostfixRule {
	pub rule: Rule,
	pub precedence: u8,
	/// Node kind to build.
	pub node: Symbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
	Left,
	Right,
}

/// Zero-argument accessor exposed by a grammar binding.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct LanguageFn(fn() -> &'static RawLanguage);

impl LanguageFn {
	/// Wraps a binding accessor.
	pub const fn from_raw(f: fn() -> &'static RawLanguage) -> Self {
		Self(f)
	}

	/// Returns the wrapped accessor.
	pub const fn into_raw(self) -> fn() -> &'static RawLanguage {
		self.0
	}

	/// Calls the accessor.
	pub fn raw(self) -> &'static RawLanguage {
		(self.0)()
	}
}

impl std::fmt::Debug for LanguageFn {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("LanguageFn").finish_non_exhaustive()
	}
}
