//! A shunting yard that parses infix expressions inside tags.
//!
//! Two stacks are maintained: `out` collects finished values and `stack`
//! holds pending operators. A synthetic call operator is pushed whenever a
//! `(` follows a value-producing token, with a guard sentinel on the output
//! stack marking the bottom of the argument list.

use crate::compile::lex::{Symbol, Token, TokenKind};
use crate::compile::parse::Parser;
use crate::types::ast;
use crate::types::span::{Position, Span};
use crate::{Error, Result};

/// The set of tokens that end an expression: symbols and keyword-like
/// identifiers, checked only at parenthesis depth zero.
#[derive(Clone, Copy)]
pub(crate) struct Terminators {
    pub symbols: &'static [Symbol],
    pub keywords: &'static [&'static str],
}

/// Binding strength of the call operator: between `**` and `.`.
const CALL_PRECEDENCE: u16 = 550;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// The operator table. A higher precedence binds tighter.
fn precedence(symbol: Symbol) -> Option<(u16, Assoc)> {
    let entry = match symbol {
        Symbol::Eq => (100, Assoc::Left),
        Symbol::Pipe => (50, Assoc::Left),
        Symbol::BangEq
        | Symbol::EqEq
        | Symbol::Lt
        | Symbol::LtEq
        | Symbol::Gt
        | Symbol::GtEq => (200, Assoc::Left),
        Symbol::Plus | Symbol::Minus => (300, Assoc::Left),
        Symbol::Star | Symbol::Slash | Symbol::Percent => (400, Assoc::Left),
        Symbol::StarStar => (500, Assoc::Right),
        Symbol::Dot => (600, Assoc::Left),
        _ => return None,
    };
    Some(entry)
}

enum Item {
    Expr(ast::Expr),
    /// Marks the bottom of a call argument list.
    Guard,
}

enum StackOp {
    Op(ast::Op),
    /// A synthetic function call application.
    Call(Span),
    /// The `(` sentinel; never popped by precedence.
    Paren(Span),
}

impl StackOp {
    fn precedence(&self) -> (u16, Assoc) {
        match self {
            Self::Op(op) => precedence(op.symbol).unwrap(),
            Self::Call(_) => (CALL_PRECEDENCE, Assoc::Left),
            Self::Paren(_) => (0, Assoc::Left),
        }
    }
}

/// Parses one expression, leaving the terminating token in the stream.
pub(crate) fn parse(parser: &mut Parser<'_>, until: Terminators) -> Result<ast::Expr> {
    let mut yard = Yard::new(parser);
    loop {
        let tok = yard.parser.peek(true);
        match &tok.kind {
            TokenKind::Eos => break,
            TokenKind::Symbol(symbol)
                if yard.depth == 0 && until.symbols.contains(symbol) =>
            {
                break;
            }
            TokenKind::Ident
                if yard.depth == 0
                    && until
                        .keywords
                        .iter()
                        .any(|kw| *kw == &yard.parser.source()[tok.span]) =>
            {
                break;
            }
            _ => {}
        }
        let tok = yard.parser.next(true);
        yard.shift(tok)?;
    }
    let stop = yard.parser.peek(true).span;
    yard.finish(stop)
}

struct Yard<'a, 'source> {
    parser: &'a mut Parser<'source>,
    out: Vec<Item>,
    stack: Vec<StackOp>,
    /// Whether the last written token may be called, i.e. a following `(`
    /// is a function call rather than a grouping.
    state: bool,
    /// Open parenthesis depth.
    depth: usize,
    /// End position of the last `)`, used for call spans.
    end: Position,
}

impl<'a, 'source> Yard<'a, 'source> {
    fn new(parser: &'a mut Parser<'source>) -> Self {
        let end = parser.peek(true).span.end;
        Self {
            parser,
            out: Vec::new(),
            stack: Vec::new(),
            state: false,
            depth: 0,
            end,
        }
    }

    fn shift(&mut self, tok: Token) -> Result<()> {
        match tok.kind {
            TokenKind::Ident => {
                self.out
                    .push(Item::Expr(ast::Expr::Var(ast::Ident { span: tok.span })));
                self.state = true;
            }
            TokenKind::Number(value) => {
                self.out.push(Item::Expr(ast::Expr::Number(ast::Number {
                    value,
                    span: tok.span,
                })));
                self.state = false;
            }
            TokenKind::Str(value) => {
                self.out.push(Item::Expr(ast::Expr::Str(ast::Str {
                    value,
                    span: tok.span,
                })));
                self.state = false;
            }
            TokenKind::Symbol(Symbol::LParen) => {
                if self.state {
                    self.write_operator(StackOp::Call(tok.span))?;
                    self.out.push(Item::Guard);
                }
                self.stack.push(StackOp::Paren(tok.span));
                self.depth += 1;
                self.state = false;
            }
            TokenKind::Symbol(Symbol::RParen) => {
                self.end = tok.span.end;
                loop {
                    match self.stack.pop() {
                        Some(StackOp::Paren(_)) => break,
                        Some(op) => self.write_pop(op)?,
                        None => {
                            return Err(Error::syntax(
                                "unmatched parenthesis",
                                self.parser.source(),
                                tok.span,
                            ));
                        }
                    }
                }
                self.depth -= 1;
                // a call ends at its closing parenthesis
                if let Some(StackOp::Call(_)) = self.stack.last() {
                    let op = self.stack.pop().unwrap();
                    self.write_pop(op)?;
                }
                self.state = true;
            }
            TokenKind::Symbol(Symbol::Comma) => {
                loop {
                    match self.stack.pop() {
                        Some(paren @ StackOp::Paren(_)) => {
                            self.stack.push(paren);
                            break;
                        }
                        Some(op) => self.write_pop(op)?,
                        None => {
                            return Err(Error::syntax(
                                "unexpected `,` outside a call",
                                self.parser.source(),
                                tok.span,
                            ));
                        }
                    }
                }
                self.state = false;
            }
            TokenKind::Symbol(symbol) => match precedence(symbol) {
                Some(_) => {
                    self.write_operator(StackOp::Op(ast::Op {
                        symbol,
                        span: tok.span,
                    }))?;
                    self.state = false;
                }
                None => {
                    return Err(Error::syntax(
                        format!("unexpected `{}`", symbol.as_str()),
                        self.parser.source(),
                        tok.span,
                    ));
                }
            },
            TokenKind::Character(c) => {
                return Err(Error::syntax(
                    format!("unexpected character `{c}`"),
                    self.parser.source(),
                    tok.span,
                ));
            }
            TokenKind::Eos => unreachable!("EOS is handled by the caller"),
        }
        Ok(())
    }

    /// Pops every pending operator that binds at least as tight, then
    /// pushes the operator.
    fn write_operator(&mut self, op: StackOp) -> Result<()> {
        let (prec, assoc) = op.precedence();
        while let Some(top) = self.stack.last() {
            let (top_prec, _) = top.precedence();
            if top_prec > prec || (top_prec == prec && assoc == Assoc::Left) {
                let top = self.stack.pop().unwrap();
                self.write_pop(top)?;
            } else {
                break;
            }
        }
        self.stack.push(op);
        Ok(())
    }

    /// Builds the AST node for a popped operator.
    fn write_pop(&mut self, op: StackOp) -> Result<()> {
        let expr = match op {
            StackOp::Op(op) if op.symbol == Symbol::Dot => {
                let property = self.pop_value(op)?;
                let object = self.pop_value(op)?;
                let span = object.span().combine(property.span());
                ast::Expr::Member(Box::new(ast::Member {
                    object,
                    property,
                    span,
                }))
            }
            StackOp::Op(op) if op.symbol == Symbol::Pipe => {
                let filter = self.pop_value(op)?;
                let value = self.pop_value(op)?;
                let span = value.span().combine(filter.span());
                ast::Expr::Filter(Box::new(ast::Filter {
                    value,
                    filter,
                    span,
                }))
            }
            StackOp::Op(op) => {
                let right = self.pop_value(op)?;
                let left = self.pop_value(op)?;
                let span = left.span().combine(right.span());
                ast::Expr::BinOp(Box::new(ast::BinOp {
                    op,
                    left,
                    right,
                    span,
                }))
            }
            StackOp::Call(at) => {
                let mut args = Vec::new();
                let function = loop {
                    match self.out.pop() {
                        Some(Item::Expr(expr)) => args.push(expr),
                        Some(Item::Guard) => match self.out.pop() {
                            Some(Item::Expr(function)) => break function,
                            _ => {
                                return Err(Error::syntax(
                                    "expected a function value",
                                    self.parser.source(),
                                    at,
                                ));
                            }
                        },
                        None => {
                            return Err(Error::syntax(
                                "expected a function value",
                                self.parser.source(),
                                at,
                            ));
                        }
                    }
                };
                args.reverse();
                let span = Span {
                    start: function.span().start,
                    end: self.end,
                };
                ast::Expr::Call(Box::new(ast::Call {
                    function,
                    args,
                    span,
                }))
            }
            StackOp::Paren(span) => {
                return Err(Error::syntax(
                    "unmatched parenthesis",
                    self.parser.source(),
                    span,
                ));
            }
        };
        self.out.push(Item::Expr(expr));
        Ok(())
    }

    fn pop_value(&mut self, op: ast::Op) -> Result<ast::Expr> {
        match self.out.pop() {
            Some(Item::Expr(expr)) => Ok(expr),
            _ => Err(Error::syntax(
                format!("missing operand for `{}`", op.symbol.as_str()),
                self.parser.source(),
                op.span,
            )),
        }
    }

    /// Drains the operator stack and checks that exactly one value is left.
    fn finish(mut self, stop: Span) -> Result<ast::Expr> {
        while let Some(op) = self.stack.pop() {
            self.write_pop(op)?;
        }
        let expr = match self.out.pop() {
            Some(Item::Expr(expr)) => expr,
            _ => {
                return Err(Error::syntax(
                    "expected an expression",
                    self.parser.source(),
                    stop,
                ));
            }
        };
        if !self.out.is_empty() {
            return Err(Error::syntax(
                "expression produced more than one value",
                self.parser.source(),
                expr.span(),
            ));
        }
        Ok(expr)
    }
}
