//! Rule interpreter.
//!
//! Rules are matched top-down with ordered choice and backtracking over the
//! token stream. Nonterminal results are memoised per position, which keeps
//! failed alternatives from re-parsing the same input over and over.
//! Expression tables use precedence climbing.

use ponos_abi::{Associativity, Definition, ExpressionTable, Rule, Symbol};
use rustc_hash::FxHashMap;

use crate::language::{ERROR_SYMBOL, Language};
use crate::lexer::Token;

/// Owned syntax tree produced by the engine, later flattened into a
/// [`Tree`](super::Tree).
#[derive(Debug, Clone)]
pub(crate) struct Subtree {
	pub symbol: Symbol,
	pub start: usize,
	pub end: usize,
	pub children: Vec<Subtree>,
	pub extra: bool,
}

impl Subtree {
	fn leaf(token: &Token) -> Self {
		Self {
			symbol: token.symbol,
			start: token.start,
			end: token.end,
			children: Vec::new(),
			extra: false,
		}
	}

	/// Spans its children; empty nodes sit at `at`.
	fn node(symbol: Symbol, children: Vec<Subtree>, at: usize) -> Self {
		Self {
			symbol,
			start: children.first().map_or(at, |c| c.start),
			end: children.last().map_or(at, |c| c.end),
			children,
			extra: false,
		}
	}
}

/// Tokens past the skip position a resume check may look at. Bounds the
/// work per skipped token, so recovery stays linear in the input.
const RESUME_WINDOW: usize = 512;

type MemoKey = (Symbol, usize, u8);
type MemoEntry = Option<(usize, Vec<Subtree>)>;

pub(crate) struct Engine<'a> {
	language: &'a Language,
	tokens: &'a [Token],
	source_len: usize,
	max_depth: usize,
	depth: usize,
	memo: FxHashMap<MemoKey, MemoEntry>,
	/// Set once the depth limit cut a rule short.
	pub(crate) truncated: bool,
	/// Nonterminal evaluations, including resume checks.
	pub(crate) steps: usize,
}

impl<'a> Engine<'a> {
	pub(crate) fn new(
		language: &'a Language,
		tokens: &'a [Token],
		source_len: usize,
		max_depth: usize,
	) -> Self {
		Self {
			language,
			tokens,
			source_len,
			max_depth,
			depth: 0,
			memo: FxHashMap::default(),
			truncated: false,
			steps: 0,
		}
	}

	/// Parses the whole token stream.
	///
	/// Whenever the root rule stops early, tokens are skipped into an `ERROR`
	/// node until a recovery token has been consumed or the root rule can
	/// make progress again. The root always spans the entire source.
	pub(crate) fn parse_root(&mut self) -> Subtree {
		let raw = self.language.raw();
		let root = raw.root;
		let Definition::Rule(rule) = raw.symbols[root as usize].definition else {
			unreachable!("root symbol is validated to be a rule");
		};

		let mut children = Vec::new();
		let mut pos = 0;
		loop {
			pos = self.rule(rule, pos, &mut children).unwrap_or(pos);
			if pos >= self.tokens.len() {
				break;
			}
			let (error, next) = self.recover(rule, pos);
			children.push(error);
			pos = next;
		}

		Subtree {
			symbol: root,
			start: 0,
			end: self.source_len,
			children,
			extra: false,
		}
	}

	fn recover(&mut self, rule: Rule, start: usize) -> (Subtree, usize) {
		let resume = match rule {
			Rule::Repeat(inner) | Rule::Repeat1(inner) => *inner,
			other => other,
		};

		let tokens = self.tokens;
		let mut skipped = Vec::new();
		let mut pos = start;
		while let Some(token) = tokens.get(pos) {
			pos += 1;
			if token.symbol != ERROR_SYMBOL {
				skipped.push(Subtree::leaf(token));
			}
			if self.language.is_recovery(token.symbol) || self.can_resume(resume, pos) {
				break;
			}
		}

		let error = Subtree {
			symbol: ERROR_SYMBOL,
			start: tokens[start].start,
			end: tokens[pos - 1].end,
			children: skipped,
			extra: false,
		};
		(error, pos)
	}

	/// Whether `rule` makes progress at `pos` within [`RESUME_WINDOW`]
	/// tokens. Runs on a separate engine so the windowed view never reaches
	/// the main memo.
	fn can_resume(&mut self, rule: Rule, pos: usize) -> bool {
		let tokens = self.tokens;
		if pos >= tokens.len() {
			return false;
		}
		let window = &tokens[..tokens.len().min(pos + RESUME_WINDOW)];
		let mut probe = Engine::new(self.language, window, self.source_len, self.max_depth);
		let mut scratch = Vec::new();
		let resumed = matches!(probe.rule(rule, pos, &mut scratch), Some(next) if next > pos);
		self.steps += probe.steps;
		resumed
	}

	/// Byte offset of token `pos`, or the end of input.
	fn offset(&self, pos: usize) -> usize {
		self.tokens.get(pos).map_or(self.source_len, |t| t.start)
	}

	/// Matches `rule` at `pos`, appending results to `out`.
	///
	/// On failure `out` is left exactly as it was.
	fn rule(&mut self, rule: Rule, pos: usize, out: &mut Vec<Subtree>) -> Option<usize> {
		match rule {
			Rule::Symbol(symbol) => self.symbol(symbol, pos, out),
			Rule::Seq(rules) => {
				let mark = out.len();
				let mut pos = pos;
				for &rule in rules {
					match self.rule(rule, pos, out) {
						Some(next) => pos = next,
						None => {
							out.truncate(mark);
							return None;
						}
					}
				}
				Some(pos)
			}
			Rule::Choice(rules) => rules
				.iter()
				.find_map(|&rule| self.rule(rule, pos, out)),
			Rule::Optional(inner) => self.rule(*inner, pos, out).or(Some(pos)),
			Rule::Repeat(inner) => Some(self.repeat(*inner, pos, out)),
			Rule::Repeat1(inner) => {
				let first = self.rule(*inner, pos, out)?;
				Some(self.repeat(*inner, first, out))
			}
		}
	}

	fn repeat(&mut self, rule: Rule, mut pos: usize, out: &mut Vec<Subtree>) -> usize {
		loop {
			let mark = out.len();
			match self.rule(rule, pos, out) {
				Some(next) if next > pos => pos = next,
				Some(_) => {
					out.truncate(mark);
					return pos;
				}
				None => return pos,
			}
		}
	}

	fn symbol(&mut self, symbol: Symbol, pos: usize, out: &mut Vec<Subtree>) -> Option<usize> {
		match self.language.symbol(symbol)?.definition {
			Definition::Literal(_) | Definition::Pattern(_) => {
				let token = self.tokens.get(pos).filter(|t| t.symbol == symbol)?;
				out.push(Subtree::leaf(token));
				Some(pos + 1)
			}
			Definition::Rule(_) | Definition::Expression(_) => self.nonterminal(symbol, pos, 0, out),
			Definition::End | Definition::Derived => None,
		}
	}

	/// Memoised, depth-limited nonterminal match. Hidden symbols splice
	/// their children into `out`; visible ones push a single node.
	fn nonterminal(
		&mut self,
		symbol: Symbol,
		pos: usize,
		min_precedence: u8,
		out: &mut Vec<Subtree>,
	) -> Option<usize> {
		let key = (symbol, pos, min_precedence);
		if let Some(entry) = self.memo.get(&key) {
			let (next, subtrees) = entry.as_ref()?;
			out.extend(subtrees.iter().cloned());
			return Some(*next);
		}

		if self.depth >= self.max_depth {
			self.truncated = true;
			return None;
		}

		let info = self.language.symbol(symbol)?;
		let mut children = Vec::new();
		self.steps += 1;
		self.depth += 1;
		let result = match info.definition {
			Definition::Rule(rule) => self.rule(rule, pos, &mut children),
			Definition::Expression(table) => {
				self.expression(symbol, table, min_precedence, pos, &mut children)
			}
			_ => None,
		};
		self.depth -= 1;

		let entry = result.map(|next| {
			let subtrees = if info.hidden {
				children
			} else {
				vec![Subtree::node(symbol, children, self.offset(pos))]
			};
			(next, subtrees)
		});
		if let Some((_, subtrees)) = &entry {
			out.extend(subtrees.iter().cloned());
		}
		self.memo.insert(key, entry);
		result
	}

	/// Precedence climbing over an [`ExpressionTable`].
	///
	/// Postfix rules and infix operators bind while their precedence is at
	/// least `min_precedence`. Prefix operators always apply in operand
	/// position and parse their operand at their own precedence.
	fn expression(
		&mut self,
		symbol: Symbol,
		table: &'static ExpressionTable,
		min_precedence: u8,
		pos: usize,
		out: &mut Vec<Subtree>,
	) -> Option<usize> {
		let tokens = self.tokens;
		let (mut lhs, mut pos) = self.operand(symbol, table, pos)?;

		loop {
			if let Some((node, rest, next)) = self.postfix(table, min_precedence, pos) {
				lhs.extend(rest);
				let at = self.offset(pos);
				lhs = vec![Subtree::node(node, lhs, at)];
				pos = next;
				continue;
			}

			let Some(token) = tokens.get(pos) else {
				break;
			};
			let Some(op) = table
				.infix
				.iter()
				.find(|op| op.operator == token.symbol && op.precedence >= min_precedence)
			else {
				break;
			};

			let rhs_precedence = match op.associativity {
				Associativity::Left => op.precedence.saturating_add(1),
				Associativity::Right => op.precedence,
			};
			let mut rhs = Vec::new();
			let Some(next) = self.nonterminal(symbol, pos + 1, rhs_precedence, &mut rhs) else {
				break;
			};

			lhs.push(Subtree::leaf(token));
			lhs.extend(rhs);
			let at = self.offset(pos);
			lhs = vec![Subtree::node(op.node, lhs, at)];
			pos = next;
		}

		out.extend(lhs);
		Some(pos)
	}

	fn operand(
		&mut self,
		symbol: Symbol,
		table: &'static ExpressionTable,
		pos: usize,
	) -> Option<(Vec<Subtree>, usize)> {
		let tokens = self.tokens;
		let prefix = tokens
			.get(pos)
			.and_then(|token| table.prefix.iter().find(|op| op.operator == token.symbol));

		let mut children = Vec::new();
		match prefix {
			Some(op) => {
				children.push(Subtree::leaf(&tokens[pos]));
				let next = self.nonterminal(symbol, pos + 1, op.precedence, &mut children)?;
				let at = self.offset(pos);
				Some((vec![Subtree::node(op.node, children, at)], next))
			}
			None => {
				let next = self.rule(table.operand, pos, &mut children)?;
				Some((children, next))
			}
		}
	}

	fn postfix(
		&mut self,
		table: &'static ExpressionTable,
		min_precedence: u8,
		pos: usize,
	) -> Option<(Symbol, Vec<Subtree>, usize)> {
		for postfix in table.postfix {
			if postfix.precedence < min_precedence {
				continue;
			}
			let mut children = Vec::new();
			if let Some(next) = self.rule(postfix.rule, pos, &mut children)
				&& next > pos
			{
				return Some((postfix.node, children, next));
			}
		}
		None
	}
}

/// Places each extra under the deepest node whose range contains it.
pub(crate) fn attach_extras(root: &mut Subtree, extras: &[Token]) {
	for token in extras {
		let mut extra = Subtree::leaf(token);
		extra.extra = true;
		insert_extra(root, extra);
	}
}

fn insert_extra(node: &mut Subtree, extra: Subtree) {
	// Tokens never overlap, so only nonterminals and ERROR nodes can contain it.
	let container = node
		.children
		.iter()
		.position(|child| child.start <= extra.start && extra.end <= child.end);
	match container {
		Some(idx) => insert_extra(&mut node.children[idx], extra),
		None => {
			let idx = node
				.children
				.partition_point(|child| child.start <= extra.start);
			node.children.insert(idx, extra);
		}
	}
}
