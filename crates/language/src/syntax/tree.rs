use std::fmt;
use std::ops;

use ponos_abi::Symbol;

use super::engine::Subtree;
use crate::language::{ERROR_SYMBOL, Language};

/// Zero-based row and byte column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
	pub row: usize,
	pub column: usize,
}

impl Point {
	pub const fn new(row: usize, column: usize) -> Self {
		Self { row, column }
	}
}

impl fmt::Display for Point {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.row, self.column)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
	pub start_byte: usize,
	pub end_byte: usize,
	pub start_point: Point,
	pub end_point: Point,
}

#[derive(Debug, Clone, Copy)]
struct NodeData {
	symbol: Symbol,
	start: usize,
	end: usize,
	parent: Option<u32>,
	first_child: u32,
	child_count: u32,
	extra: bool,
	has_error: bool,
}

/// An immutable syntax tree.
///
/// Nodes live in a single arena in breadth-first order, so the children of
/// any node occupy a contiguous slice.
#[derive(Clone)]
pub struct Tree {
	language: Language,
	nodes: Vec<NodeData>,
	line_starts: Vec<usize>,
}

impl Tree {
	pub(crate) fn build(language: Language, root: Subtree, text: &str) -> Self {
		let mut nodes = vec![NodeData {
			symbol: root.symbol,
			start: root.start,
			end: root.end,
			parent: None,
			first_child: 0,
			child_count: 0,
			extra: root.extra,
			has_error: root.symbol == ERROR_SYMBOL,
		}];

		let mut queue = std::collections::VecDeque::from([(0u32, root.children)]);
		while let Some((parent, children)) = queue.pop_front() {
			let first_child = nodes.len() as u32;
			nodes[parent as usize].first_child = first_child;
			nodes[parent as usize].child_count = children.len() as u32;
			for child in children {
				let id = nodes.len() as u32;
				nodes.push(NodeData {
					symbol: child.symbol,
					start: child.start,
					end: child.end,
					parent: Some(parent),
					first_child: 0,
					child_count: 0,
					extra: child.extra,
					has_error: child.symbol == ERROR_SYMBOL,
				});
				if !child.children.is_empty() {
					queue.push_back((id, child.children));
				}
			}
		}

		// Children always follow their parent.
		for id in (1..nodes.len()).rev() {
			if nodes[id].has_error
				&& let Some(parent) = nodes[id].parent
			{
				nodes[parent as usize].has_error = true;
			}
		}

		let line_starts = std::iter::once(0)
			.chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
			.collect();

		Self {
			language,
			nodes,
			line_starts,
		}
	}

	pub fn root_node(&self) -> Node<'_> {
		Node { tree: self, id: 0 }
	}

	pub fn language(&self) -> &Language {
		&self.language
	}

	/// Iterates over every node in pre-order.
	pub fn walk(&self) -> impl Iterator<Item = Node<'_>> {
		self.root_node().descendants()
	}

	fn point(&self, byte: usize) -> Point {
		let row = self.line_starts.partition_point(|&start| start <= byte) - 1;
		Point {
			row,
			column: byte - self.line_starts[row],
		}
	}
}

impl fmt::Debug for Tree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{Tree {:?}}}", self.root_node())
	}
}

/// A node within a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'tree> {
	tree: &'tree Tree,
	id: u32,
}

impl<'tree> Node<'tree> {
	fn data(&self) -> &'tree NodeData {
		&self.tree.nodes[self.id as usize]
	}

	fn at(&self, id: u32) -> Node<'tree> {
		Node {
			tree: self.tree,
			id,
		}
	}

	pub fn kind(&self) -> &'static str {
		self.tree
			.language
			.node_kind_for_id(self.data().symbol)
			.unwrap_or("")
	}

	pub fn kind_id(&self) -> Symbol {
		self.data().symbol
	}

	pub fn is_named(&self) -> bool {
		self.tree.language.node_kind_is_named(self.data().symbol)
	}

	pub fn is_extra(&self) -> bool {
		self.data().extra
	}

	pub fn is_error(&self) -> bool {
		self.data().symbol == ERROR_SYMBOL
	}

	/// Whether this node is, or contains, an `ERROR` node.
	pub fn has_error(&self) -> bool {
		self.data().has_error
	}

	pub fn start_byte(&self) -> usize {
		self.data().start
	}

	pub fn end_byte(&self) -> usize {
		self.data().end
	}

	pub fn byte_range(&self) -> ops::Range<usize> {
		self.start_byte()..self.end_byte()
	}

	pub fn start_position(&self) -> Point {
		self.tree.point(self.start_byte())
	}

	pub fn end_position(&self) -> Point {
		self.tree.point(self.end_byte())
	}

	pub fn range(&self) -> Range {
		Range {
			start_byte: self.start_byte(),
			end_byte: self.end_byte(),
			start_point: self.start_position(),
			end_point: self.end_position(),
		}
	}

	pub fn child_count(&self) -> usize {
		self.data().child_count as usize
	}

	pub fn child(&self, index: usize) -> Option<Node<'tree>> {
		let data = self.data();
		(index < data.child_count as usize).then(|| self.at(data.first_child + index as u32))
	}

	pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'tree>> + use<'tree> {
		let data = self.data();
		let tree = self.tree;
		(data.first_child..data.first_child + data.child_count).map(move |id| Node { tree, id })
	}

	pub fn named_child_count(&self) -> usize {
		self.named_children().count()
	}

	pub fn named_child(&self, index: usize) -> Option<Node<'tree>> {
		self.named_children().nth(index)
	}

	pub fn named_children(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
		self.children().filter(Node::is_named)
	}

	pub fn parent(&self) -> Option<Node<'tree>> {
		self.data().parent.map(|id| self.at(id))
	}

	pub fn next_sibling(&self) -> Option<Node<'tree>> {
		let parent = self.parent()?.data();
		(self.id + 1 < parent.first_child + parent.child_count).then(|| self.at(self.id + 1))
	}

	pub fn prev_sibling(&self) -> Option<Node<'tree>> {
		let parent = self.parent()?.data();
		(self.id > parent.first_child).then(|| self.at(self.id - 1))
	}

	/// This node and all of its descendants, in pre-order.
	pub fn descendants(&self) -> impl Iterator<Item = Node<'tree>> + use<'tree> {
		let mut stack = vec![*self];
		std::iter::from_fn(move || {
			let node = stack.pop()?;
			let data = node.data();
			stack.extend(
				(data.first_child..data.first_child + data.child_count)
					.rev()
					.map(|id| node.at(id)),
			);
			Some(node)
		})
	}

	/// Smallest node that spans `start..end`.
	pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Node<'tree>> {
		if start < self.start_byte() || end > self.end_byte() {
			return None;
		}
		let mut node = *self;
		'descend: loop {
			for child in node.children() {
				if child.start_byte() <= start && end <= child.end_byte() {
					node = child;
					continue 'descend;
				}
			}
			return Some(node);
		}
	}

	/// Text of this node within `source`, which must be the parsed text.
	pub fn utf8_text<'a>(&self, source: &'a [u8]) -> Result<&'a str, std::str::Utf8Error> {
		std::str::from_utf8(&source[self.start_byte()..self.end_byte()])
	}

	/// S-expression over the named nodes below and including this one.
	pub fn to_sexp(&self) -> String {
		let mut out = String::new();
		self.write_sexp(&mut out);
		out
	}

	fn write_sexp(&self, out: &mut String) {
		out.push('(');
		out.push_str(self.kind());
		for child in self.named_children() {
			out.push(' ');
			child.write_sexp(out);
		}
		out.push(')');
	}
}

impl PartialEq for Node<'_> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.tree, other.tree) && self.id == other.id
	}
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{{Node {} {} - {}}}",
			self.kind(),
			self.start_position(),
			self.end_position()
		)
	}
}
