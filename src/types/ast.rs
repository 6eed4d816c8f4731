//! AST representing a parsed template.
//!
//! Identifiers and raw text are stored as spans into the original source,
//! string literals carry their decoded contents.

use crate::compile::lex::Symbol;
use crate::types::span::Span;

#[cfg_attr(test, derive(Debug))]
pub struct Template {
    pub extends: Option<Ident>,
    pub blocks: Vec<Block>,
    pub macros: Vec<Macro>,
    pub body: Scope,
    pub span: Span,
}

/// A body with its own variable binding frame.
///
/// `vars` lists the names bound in this scope: loop pattern names, macro
/// arguments and `set` targets.
#[cfg_attr(test, derive(Debug))]
pub struct Scope {
    pub vars: Vec<Ident>,
    pub body: Vec<Placeable>,
    pub span: Span,
}

/// Anything that contributes to a scope body.
#[cfg_attr(test, derive(Debug))]
pub enum Placeable {
    Text(Text),
    PutValue(PutValue),
    Case(Case),
    For(ForLoop),
    MacroCall(MacroCall),
    CallBlock(CallBlock),
    FilterBlock(FilterBlock),
    Assign(Assign),
}

/// Raw template text, stored as a span into the source.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Text {
    pub span: Span,
}

/// A value emission, e.g. `{{ user.name | upper }}`.
#[cfg_attr(test, derive(Debug))]
pub struct PutValue {
    pub value: Expr,
    pub filters: Vec<Expr>,
    pub span: Span,
}

/// An `if`/`elif`/`else` chain. An `else` clause is represented as a final
/// arm whose condition is a `true` literal.
#[cfg_attr(test, derive(Debug))]
pub struct Case {
    pub arms: Vec<Arm>,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Arm {
    pub cond: Expr,
    pub body: Vec<Placeable>,
    pub span: Span,
}

/// A `for` loop. The body is a fresh scope, the `else` alternative is a
/// flat list evaluated in the enclosing scope.
#[cfg_attr(test, derive(Debug))]
pub struct ForLoop {
    pub pattern: Pattern,
    pub iterable: Expr,
    pub filter: Option<Expr>,
    pub body: Scope,
    pub alternative: Option<Vec<Placeable>>,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Macro {
    pub name: Ident,
    pub args: Vec<Argument>,
    pub body: Scope,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Argument {
    pub name: Ident,
    pub default: Option<Number>,
    pub span: Span,
}

/// A `{% call m(...) %} ... {% endcall %}` invocation.
#[cfg_attr(test, derive(Debug))]
pub struct MacroCall {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub caller: Option<Scope>,
    pub span: Span,
}

/// The render site of a named block.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct CallBlock {
    pub name: Ident,
    pub span: Span,
}

/// A named block definition, registered on the template and rendered in
/// place through a [`CallBlock`].
#[cfg_attr(test, derive(Debug))]
pub struct Block {
    pub name: Ident,
    pub body: Scope,
    pub span: Span,
}

/// A `{% filter expr %} ... {% endfilter %}` section.
#[cfg_attr(test, derive(Debug))]
pub struct FilterBlock {
    pub filter: Expr,
    pub body: Scope,
    pub span: Span,
}

/// A `{% set pattern = expr %}` statement.
#[cfg_attr(test, derive(Debug))]
pub struct Assign {
    pub pattern: Pattern,
    pub value: Expr,
    pub span: Span,
}

/// The target of a `for` loop or a `set` statement.
#[cfg_attr(test, derive(Debug))]
pub enum Pattern {
    Single(Ident),
    Unpack(Unpack),
}

#[cfg_attr(test, derive(Debug))]
pub struct Unpack {
    pub names: Vec<Ident>,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub enum Expr {
    Var(Ident),
    Number(Number),
    Str(Str),
    Boolean(Boolean),
    BinOp(Box<BinOp>),
    Member(Box<Member>),
    Call(Box<Call>),
    Filter(Box<Filter>),
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Ident {
    pub span: Span,
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Number {
    pub value: f64,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Str {
    pub value: String,
    pub span: Span,
}

#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Boolean {
    pub value: bool,
    pub span: Span,
}

/// An operator, kept as a distinct node with its own span.
#[derive(Clone, Copy)]
#[cfg_attr(test, derive(Debug))]
pub struct Op {
    pub symbol: Symbol,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct BinOp {
    pub op: Op,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Member {
    pub object: Expr,
    pub property: Expr,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Call {
    pub function: Expr,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[cfg_attr(test, derive(Debug))]
pub struct Filter {
    pub value: Expr,
    pub filter: Expr,
    pub span: Span,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Var(ident) => ident.span,
            Self::Number(number) => number.span,
            Self::Str(string) => string.span,
            Self::Boolean(boolean) => boolean.span,
            Self::BinOp(binop) => binop.span,
            Self::Member(member) => member.span,
            Self::Call(call) => call.span,
            Self::Filter(filter) => filter.span,
        }
    }
}

impl Placeable {
    pub fn span(&self) -> Span {
        match self {
            Self::Text(text) => text.span,
            Self::PutValue(put) => put.span,
            Self::Case(case) => case.span,
            Self::For(for_loop) => for_loop.span,
            Self::MacroCall(call) => call.span,
            Self::CallBlock(block) => block.span,
            Self::FilterBlock(filter) => filter.span,
            Self::Assign(assign) => assign.span,
        }
    }
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Self::Single(ident) => ident.span,
            Self::Unpack(unpack) => unpack.span,
        }
    }

    /// The bound names, in declaration order.
    pub fn idents(&self) -> &[Ident] {
        match self {
            Self::Single(ident) => std::slice::from_ref(ident),
            Self::Unpack(unpack) => &unpack.names,
        }
    }
}
