//! Ponos grammar tables.
//!
//! Keywords are Russian words; operators follow the usual C-like precedence
//! with `и` / `или` as the logical connectives.

use ponos_abi::{
	Associativity, ExpressionTable, InfixOperator, LANGUAGE_VERSION, PostfixRule,
	PrefixOperator, RawLanguage, Rule, SymbolInfo,
};

use crate::GRAMMAR_NAME;

/// Symbol ids. Order must match [`SYMBOLS`].
mod sym {
	use ponos_abi::Symbol;

	pub const KW_VAR: Symbol = 1;
	pub const EQ: Symbol = 2;
	pub const SEMICOLON: Symbol = 3;
	pub const KW_RETURN: Symbol = 4;
	pub const KW_FUNC: Symbol = 5;
	pub const KW_END: Symbol = 6;
	pub const LPAREN: Symbol = 7;
	pub const RPAREN: Symbol = 8;
	pub const COMMA: Symbol = 9;
	pub const KW_IF: Symbol = 10;
	pub const KW_ELSE: Symbol = 11;
	pub const KW_WHILE: Symbol = 12;
	pub const KW_CLASS: Symbol = 13;
	pub const KW_EXTENDS: Symbol = 14;
	pub const KW_IMPLEMENTS: Symbol = 15;
	pub const MINUS: Symbol = 16;
	pub const BANG: Symbol = 17;
	pub const STAR: Symbol = 18;
	pub const SLASH: Symbol = 19;
	pub const PLUS: Symbol = 20;
	pub const LT: Symbol = 21;
	pub const LE: Symbol = 22;
	pub const GT: Symbol = 23;
	pub const GE: Symbol = 24;
	pub const KW_AND: Symbol = 25;
	pub const KW_OR: Symbol = 26;
	pub const DOT: Symbol = 27;
	pub const KW_TRUE: Symbol = 28;
	pub const KW_FALSE: Symbol = 29;
	pub const COMMENT: Symbol = 30;
	pub const IDENTIFIER: Symbol = 31;
	pub const NUMBER: Symbol = 32;
	pub const STRING: Symbol = 33;
	pub const SOURCE_FILE: Symbol = 34;
	pub const STATEMENT: Symbol = 35;
	pub const VAR_STATEMENT: Symbol = 36;
	pub const RETURN_STATEMENT: Symbol = 37;
	pub const FUNCTION_DECLARATION: Symbol = 38;
	pub const PARAMS_LIST: Symbol = 39;
	pub const ASSIGNMENT_STATEMENT: Symbol = 40;
	pub const IF_STATEMENT: Symbol = 41;
	pub const WHILE_STATEMENT: Symbol = 42;
	pub const CLASS_DECLARATION: Symbol = 43;
	pub const MEMBERS_LIST: Symbol = 44;
	pub const EXPRESSION_STATEMENT: Symbol = 45;
	pub const EXPRESSION: Symbol = 46;
	pub const UNARY_EXPRESSION: Symbol = 47;
	pub const BINARY_EXPRESSION: Symbol = 48;
	pub const CALL_EXPRESSION: Symbol = 49;
	pub const FIELD_EXPRESSION: Symbol = 50;
	pub const ARGUMENTS: Symbol = 51;
	pub const CLOSURE_EXPRESSION: Symbol = 52;
	pub const LITERAL: Symbol = 53;
	pub const BOOL: Symbol = 54;

	pub const COUNT: usize = 55;
}

macro_rules! s {
	($name:ident) => {
		Rule::Symbol(sym::$name)
	};
}

macro_rules! binary {
	($operator:ident, $precedence:ident) => {
		InfixOperator {
			operator: sym::$operator,
			precedence: prec::$precedence,
			associativity: Associativity::Left,
			node: sym::BINARY_EXPRESSION,
		}
	};
}

mod prec {
	pub const CALL: u8 = 8;
	pub const FIELD: u8 = 7;
	pub const UNARY: u8 = 6;
	pub const MULTIPLICATIVE: u8 = 5;
	pub const ADDITIVE: u8 = 4;
	pub const COMPARATIVE: u8 = 3;
	pub const AND: u8 = 2;
	pub const OR: u8 = 1;
}

pub(crate) static PONOS: RawLanguage = RawLanguage {
	abi_version: LANGUAGE_VERSION,
	name: GRAMMAR_NAME,
	symbols: &SYMBOLS,
	root: sym::SOURCE_FILE,
	extras: &[sym::COMMENT],
	recovery: &[sym::SEMICOLON, sym::KW_END],
};

static SYMBOLS: [SymbolInfo; sym::COUNT] = [
	SymbolInfo::end(),
	SymbolInfo::literal("пер"),
	SymbolInfo::literal("="),
	SymbolInfo::literal(";"),
	SymbolInfo::literal("возврат"),
	SymbolInfo::literal("функ"),
	SymbolInfo::literal("конец"),
	SymbolInfo::literal("("),
	SymbolInfo::literal(")"),
	SymbolInfo::literal(","),
	SymbolInfo::literal("если"),
	SymbolInfo::literal("иначе"),
	SymbolInfo::literal("пока"),
	SymbolInfo::literal("класс"),
	SymbolInfo::literal("наследует"),
	SymbolInfo::literal("реализует"),
	SymbolInfo::literal("-"),
	SymbolInfo::literal("!"),
	SymbolInfo::literal("*"),
	SymbolInfo::literal("/"),
	SymbolInfo::literal("+"),
	SymbolInfo::literal("<"),
	SymbolInfo::literal("<="),
	SymbolInfo::literal(">"),
	SymbolInfo::literal(">="),
	SymbolInfo::literal("и"),
	SymbolInfo::literal("или"),
	SymbolInfo::literal("."),
	SymbolInfo::literal("истина"),
	SymbolInfo::literal("ложь"),
	SymbolInfo::pattern("comment", r"//.*"),
	SymbolInfo::pattern("identifier", r"[\p{XID_Start}_][\p{XID_Continue}_]*"),
	SymbolInfo::pattern("number", r"[0-9]+(\.[0-9]+)?"),
	// Escapes may contain any character except a newline.
	SymbolInfo::pattern("string", r#""([^"\\\n]|\\.)*""#),
	SymbolInfo::rule("source_file", Rule::Repeat(&s!(STATEMENT))),
	SymbolInfo::rule(
		"_statement",
		Rule::Choice(&[
			s!(VAR_STATEMENT),
			s!(RETURN_STATEMENT),
			s!(FUNCTION_DECLARATION),
			s!(ASSIGNMENT_STATEMENT),
			s!(IF_STATEMENT),
			s!(WHILE_STATEMENT),
			s!(EXPRESSION_STATEMENT),
			s!(CLASS_DECLARATION),
		]),
	),
	SymbolInfo::rule(
		"var_statement",
		Rule::Seq(&[
			s!(KW_VAR),
			s!(IDENTIFIER),
			s!(EQ),
			s!(EXPRESSION),
			s!(SEMICOLON),
		]),
	),
	SymbolInfo::rule(
		"return_statement",
		Rule::Seq(&[
			s!(KW_RETURN),
			Rule::Optional(&s!(EXPRESSION)),
			s!(SEMICOLON),
		]),
	),
	SymbolInfo::rule(
		"function_declaration_statement",
		Rule::Seq(&[
			s!(KW_FUNC),
			s!(IDENTIFIER),
			s!(PARAMS_LIST),
			Rule::Repeat(&s!(STATEMENT)),
			s!(KW_END),
		]),
	),
	SymbolInfo::rule(
		"params_list",
		Rule::Seq(&[
			s!(LPAREN),
			Rule::Optional(&Rule::Seq(&[
				s!(IDENTIFIER),
				Rule::Repeat(&Rule::Seq(&[s!(COMMA), s!(IDENTIFIER)])),
			])),
			s!(RPAREN),
		]),
	),
	SymbolInfo::rule(
		"assigment_statement",
		Rule::Seq(&[s!(IDENTIFIER), s!(EQ), s!(EXPRESSION), s!(SEMICOLON)]),
	),
	SymbolInfo::rule(
		"if_statement",
		Rule::Seq(&[
			s!(KW_IF),
			s!(EXPRESSION),
			Rule::Repeat(&s!(STATEMENT)),
			Rule::Optional(&Rule::Seq(&[s!(KW_ELSE), Rule::Repeat(&s!(STATEMENT))])),
			s!(KW_END),
		]),
	),
	SymbolInfo::rule(
		"while_statement",
		Rule::Seq(&[
			s!(KW_WHILE),
			s!(EXPRESSION),
			Rule::Repeat(&s!(STATEMENT)),
			s!(KW_END),
		]),
	),
	SymbolInfo::rule(
		"class_declaration_statement",
		Rule::Seq(&[
			s!(KW_CLASS),
			s!(IDENTIFIER),
			Rule::Optional(&Rule::Seq(&[s!(KW_EXTENDS), s!(IDENTIFIER)])),
			Rule::Optional(&Rule::Seq(&[s!(KW_IMPLEMENTS), s!(IDENTIFIER)])),
			Rule::Optional(&s!(MEMBERS_LIST)),
			s!(KW_END),
		]),
	),
	SymbolInfo::rule(
		"members_list",
		Rule::Repeat1(&Rule::Choice(&[s!(FUNCTION_DECLARATION), s!(IDENTIFIER)])),
	),
	SymbolInfo::rule(
		"expression_statement",
		Rule::Seq(&[s!(EXPRESSION), s!(SEMICOLON)]),
	),
	SymbolInfo::expression("_expression", &EXPRESSION),
	SymbolInfo::derived("unary_expression"),
	SymbolInfo::derived("binary_expression"),
	SymbolInfo::derived("call_expression"),
	SymbolInfo::derived("field_expression"),
	SymbolInfo::rule(
		"arguments",
		Rule::Seq(&[
			s!(LPAREN),
			Rule::Optional(&Rule::Seq(&[
				s!(EXPRESSION),
				Rule::Repeat(&Rule::Seq(&[s!(COMMA), s!(EXPRESSION)])),
			])),
			Rule::Optional(&s!(COMMA)),
			s!(RPAREN),
		]),
	),
	SymbolInfo::rule(
		"closure_expression",
		Rule::Seq(&[
			s!(KW_FUNC),
			s!(PARAMS_LIST),
			Rule::Repeat(&s!(STATEMENT)),
			s!(KW_END),
		]),
	),
	SymbolInfo::rule(
		"_literal",
		Rule::Choice(&[s!(NUMBER), s!(BOOL), s!(STRING)]),
	),
	SymbolInfo::rule("bool", Rule::Choice(&[s!(KW_TRUE), s!(KW_FALSE)])),
];

static EXPRESSION: ExpressionTable = ExpressionTable {
	operand: Rule::Choice(&[s!(LITERAL), s!(IDENTIFIER), s!(CLOSURE_EXPRESSION)]),
	prefix: &[
		PrefixOperator {
			operator: sym::MINUS,
			precedence: prec::UNARY,
			node: sym::UNARY_EXPRESSION,
		},
		PrefixOperator {
			operator: sym::BANG,
			precedence: prec::UNARY,
			node: sym::UNARY_EXPRESSION,
		},
	],
	infix: &[
		binary!(STAR, MULTIPLICATIVE),
		binary!(SLASH, MULTIPLICATIVE),
		binary!(PLUS, ADDITIVE),
		binary!(MINUS, ADDITIVE),
		binary!(LT, COMPARATIVE),
		binary!(LE, COMPARATIVE),
		binary!(GT, COMPARATIVE),
		binary!(GE, COMPARATIVE),
		binary!(KW_AND, AND),
		binary!(KW_OR, OR),
	],
	postfix: &[
		PostfixRule {
			rule: s!(ARGUMENTS),
			precedence: prec::CALL,
			node: sym::CALL_EXPRESSION,
		},
		PostfixRule {
			rule: Rule::Seq(&[s!(DOT), s!(IDENTIFIER)]),
			precedence: prec::FIELD,
			node: sym::FIELD_EXPRESSION,
		},
	],
};
