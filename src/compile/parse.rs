//! A parser that constructs a template AST from the token stream.
//!
//! The parser is driven by a stack of open constructs. The base context is
//! the top-level scope; each block-opening tag (`if`, `for`, `block`,
//! `macro`, `call`, `filter`) pushes a new entry and the matching closing
//! tag pops it and attaches the assembled subtree to its parent's body.
//! Mid keywords (`elif`, `else`) rewrite the top entry in place.

use std::fmt::Display;
use std::mem;

use crate::compile::lex::{Lexer, Symbol, Token, TokenKind};
use crate::compile::yard::{self, Terminators};
use crate::types::ast;
use crate::types::span::{Position, Span};
use crate::{Error, Result};

/// Expressions inside a `{% ... %}` tag run to the closing `%}`.
const BLOCK_TERM: Terminators = Terminators {
    symbols: &[Symbol::EndBlock],
    keywords: &[],
};

/// A `for` iterable additionally stops at the `if` filter keyword.
const ITERABLE_TERM: Terminators = Terminators {
    symbols: &[Symbol::EndBlock],
    keywords: &["if"],
};

/// A `{{ ... }}` value stops at the filter pipe or the closing `}}`.
const VALUE_TERM: Terminators = Terminators {
    symbols: &[Symbol::Pipe, Symbol::EndExpr],
    keywords: &[],
};

pub struct Parser<'source> {
    /// A lexer that tokenizes the template source.
    tokens: Lexer<'source>,

    /// Tokens pushed back onto the stream, last in first out. A peek is a
    /// `next` followed by a putback, so the `strings` flag passed to a peek
    /// determines how the following `next` lexes.
    putback: Vec<Token>,
}

/// Stores the state of an open construct during parsing.
enum State {
    /// A partial `if` statement. `cond` is the condition of the arm whose
    /// body is currently being collected.
    If {
        arms: Vec<ast::Arm>,
        cond: ast::Expr,
        span: Span,
    },

    /// A partial `for` statement. `body` is filled in when an `else`
    /// clause is reached; the body accumulator then collects the
    /// alternative, which shares the enclosing scope.
    For {
        pattern: ast::Pattern,
        iterable: ast::Expr,
        filter: Option<ast::Expr>,
        vars: Vec<ast::Ident>,
        body: Option<ast::Scope>,
        scope_start: Position,
        span: Span,
    },

    /// A partial `macro` definition.
    Macro {
        name: ast::Ident,
        args: Vec<ast::Argument>,
        vars: Vec<ast::Ident>,
        scope_start: Position,
        span: Span,
    },

    /// A partial `call` statement.
    Call {
        name: ast::Ident,
        args: Vec<ast::Expr>,
        vars: Vec<ast::Ident>,
        scope_start: Position,
        span: Span,
    },

    /// A partial `filter` section.
    Filter {
        filter: ast::Expr,
        vars: Vec<ast::Ident>,
        scope_start: Position,
        span: Span,
    },

    /// A partial `block` definition.
    Block {
        name: ast::Ident,
        vars: Vec<ast::Ident>,
        scope_start: Position,
        span: Span,
    },
}

/// A parsed `{% ... %}` tag, before it is resolved against the stack of
/// open constructs.
enum Stmt {
    If(ast::Expr),
    ElseIf(ast::Expr),
    Else,
    EndIf,
    For {
        pattern: ast::Pattern,
        iterable: ast::Expr,
        filter: Option<ast::Expr>,
    },
    EndFor,
    Macro {
        name: ast::Ident,
        args: Vec<ast::Argument>,
    },
    EndMacro,
    Call {
        name: ast::Ident,
        args: Vec<ast::Expr>,
    },
    EndCall,
    Filter(ast::Expr),
    EndFilter,
    Block(ast::Ident),
    EndBlock,
    Set {
        pattern: ast::Pattern,
        value: ast::Expr,
    },
    Extends(ast::Ident),
}

/// A keyword in the template syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    If,
    Elif,
    Else,
    EndIf,
    For,
    In,
    EndFor,
    Block,
    EndBlock,
    Macro,
    EndMacro,
    Call,
    EndCall,
    Filter,
    EndFilter,
    Set,
    Extends,
}

impl<'source> Parser<'source> {
    /// Construct a new parser.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: Lexer::new(source),
            putback: Vec::new(),
        }
    }

    /// Parses a template.
    ///
    /// The driver walks the raw token stream, collecting all runs outside
    /// `{% ... %}` and `{{ ... }}` tags as text. Tags are parsed with the
    /// `strings` flag enabled and resolved against the stack of open
    /// constructs.
    pub fn parse_template(mut self) -> Result<ast::Template> {
        let mut stack: Vec<State> = Vec::new();
        let mut bodies: Vec<Vec<ast::Placeable>> = vec![Vec::new()];
        let mut root_vars: Vec<ast::Ident> = Vec::new();
        let mut blocks: Vec<ast::Block> = Vec::new();
        let mut macros: Vec<ast::Macro> = Vec::new();
        let mut extends: Option<ast::Ident> = None;

        // start of the raw text run currently being collected
        let mut text: Option<Position> = None;
        let eof;

        loop {
            let tok = self.next(false);

            match tok.kind {
                TokenKind::Eos
                | TokenKind::Symbol(Symbol::BeginExpr)
                | TokenKind::Symbol(Symbol::BeginBlock)
                | TokenKind::Symbol(Symbol::BeginComment) => {
                    if let Some(start) = text.take() {
                        let span = Span {
                            start,
                            end: tok.span.start,
                        };
                        bodies
                            .last_mut()
                            .unwrap()
                            .push(ast::Placeable::Text(ast::Text { span }));
                    }
                }
                _ => {
                    text.get_or_insert(tok.span.start);
                    continue;
                }
            }

            match tok.kind {
                TokenKind::Eos => {
                    eof = tok.span.start;
                    break;
                }

                // A value emission, e.g. `{{ user.name | upper }}`
                TokenKind::Symbol(Symbol::BeginExpr) => {
                    let put = self.parse_put_value(tok.span)?;
                    bodies
                        .last_mut()
                        .unwrap()
                        .push(ast::Placeable::PutValue(put));
                }

                // A comment, e.g. `{# ... #}`; skipped entirely
                TokenKind::Symbol(Symbol::BeginComment) => loop {
                    match self.next(false).kind {
                        TokenKind::Symbol(Symbol::EndComment) | TokenKind::Eos => break,
                        _ => {}
                    }
                },

                // A statement, e.g. `{% if cond %}`
                TokenKind::Symbol(Symbol::BeginBlock) => {
                    let stmt = self.parse_stmt()?;
                    let end = self.expect_symbol(Symbol::EndBlock)?;
                    let span = tok.span.combine(end);

                    match stmt {
                        Stmt::If(cond) => {
                            stack.push(State::If {
                                arms: Vec::new(),
                                cond,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        Stmt::ElseIf(cond) => match stack.last_mut() {
                            Some(State::If { arms, cond: open, .. }) => {
                                let body = bodies.pop().unwrap();
                                let prev = mem::replace(open, cond);
                                arms.push(arm(prev, body));
                                bodies.push(Vec::new());
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `elif` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Else => match stack.last_mut() {
                            Some(State::If { arms, cond: open, .. }) => {
                                let body = bodies.pop().unwrap();
                                // the else arm tests a `true` literal with a
                                // zero-width span at the closing `%}`
                                let lit = ast::Expr::Boolean(ast::Boolean {
                                    value: true,
                                    span: Span::empty(end.start),
                                });
                                let prev = mem::replace(open, lit);
                                arms.push(arm(prev, body));
                                bodies.push(Vec::new());
                            }
                            Some(State::For {
                                vars,
                                body: for_body @ None,
                                scope_start,
                                ..
                            }) => {
                                let placeables = bodies.pop().unwrap();
                                *for_body = Some(ast::Scope {
                                    vars: mem::take(vars),
                                    body: placeables,
                                    span: Span {
                                        start: *scope_start,
                                        end: span.start,
                                    },
                                });
                                bodies.push(Vec::new());
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `else` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::EndIf => match stack.pop() {
                            Some(State::If {
                                mut arms,
                                cond,
                                span: if_span,
                            }) => {
                                let body = bodies.pop().unwrap();
                                arms.push(arm(cond, body));
                                bodies.last_mut().unwrap().push(ast::Placeable::Case(
                                    ast::Case {
                                        arms,
                                        span: if_span.combine(span),
                                    },
                                ));
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endif` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::For {
                            pattern,
                            iterable,
                            filter,
                        } => {
                            let vars = pattern.idents().to_vec();
                            stack.push(State::For {
                                pattern,
                                iterable,
                                filter,
                                vars,
                                body: None,
                                scope_start: span.end,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        Stmt::EndFor => match stack.pop() {
                            Some(State::For {
                                pattern,
                                iterable,
                                filter,
                                vars,
                                body,
                                scope_start,
                                span: for_span,
                            }) => {
                                let placeables = bodies.pop().unwrap();
                                let (body, alternative) = match body {
                                    Some(scope) => (scope, Some(placeables)),
                                    None => (
                                        ast::Scope {
                                            vars,
                                            body: placeables,
                                            span: Span {
                                                start: scope_start,
                                                end: span.start,
                                            },
                                        },
                                        None,
                                    ),
                                };
                                bodies.last_mut().unwrap().push(ast::Placeable::For(
                                    ast::ForLoop {
                                        pattern,
                                        iterable,
                                        filter,
                                        body,
                                        alternative,
                                        span: for_span.combine(span),
                                    },
                                ));
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endfor` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Macro { name, args } => {
                            let vars = args.iter().map(|a| a.name).collect();
                            stack.push(State::Macro {
                                name,
                                args,
                                vars,
                                scope_start: span.end,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        Stmt::EndMacro => match stack.pop() {
                            Some(State::Macro {
                                name,
                                args,
                                vars,
                                scope_start,
                                span: macro_span,
                            }) => {
                                let body = bodies.pop().unwrap();
                                let scope = ast::Scope {
                                    vars,
                                    body,
                                    span: Span {
                                        start: scope_start,
                                        end: span.start,
                                    },
                                };
                                insert_macro(
                                    self.source(),
                                    &mut macros,
                                    ast::Macro {
                                        name,
                                        args,
                                        body: scope,
                                        span: macro_span.combine(span),
                                    },
                                );
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endmacro` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Call { name, args } => {
                            stack.push(State::Call {
                                name,
                                args,
                                vars: Vec::new(),
                                scope_start: span.end,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        Stmt::EndCall => match stack.pop() {
                            Some(State::Call {
                                name,
                                args,
                                vars,
                                scope_start,
                                span: call_span,
                            }) => {
                                let body = bodies.pop().unwrap();
                                let caller = ast::Scope {
                                    vars,
                                    body,
                                    span: Span {
                                        start: scope_start,
                                        end: span.start,
                                    },
                                };
                                bodies.last_mut().unwrap().push(ast::Placeable::MacroCall(
                                    ast::MacroCall {
                                        name,
                                        args,
                                        caller: Some(caller),
                                        span: call_span.combine(span),
                                    },
                                ));
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endcall` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Filter(filter) => {
                            stack.push(State::Filter {
                                filter,
                                vars: Vec::new(),
                                scope_start: span.end,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        Stmt::EndFilter => match stack.pop() {
                            Some(State::Filter {
                                filter,
                                vars,
                                scope_start,
                                span: filter_span,
                            }) => {
                                let body = bodies.pop().unwrap();
                                let scope = ast::Scope {
                                    vars,
                                    body,
                                    span: Span {
                                        start: scope_start,
                                        end: span.start,
                                    },
                                };
                                bodies.last_mut().unwrap().push(ast::Placeable::FilterBlock(
                                    ast::FilterBlock {
                                        filter,
                                        body: scope,
                                        span: filter_span.combine(span),
                                    },
                                ));
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endfilter` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Block(name) => {
                            stack.push(State::Block {
                                name,
                                vars: Vec::new(),
                                scope_start: span.end,
                                span,
                            });
                            bodies.push(Vec::new());
                        }

                        // A block is registered on the template and also
                        // rendered in place through a `CallBlock` reference.
                        Stmt::EndBlock => match stack.pop() {
                            Some(State::Block {
                                name,
                                vars,
                                scope_start,
                                span: block_span,
                            }) => {
                                let body = bodies.pop().unwrap();
                                let scope = ast::Scope {
                                    vars,
                                    body,
                                    span: Span {
                                        start: scope_start,
                                        end: span.start,
                                    },
                                };
                                let full = block_span.combine(span);
                                insert_block(
                                    self.source(),
                                    &mut blocks,
                                    ast::Block {
                                        name,
                                        body: scope,
                                        span: full,
                                    },
                                );
                                bodies.last_mut().unwrap().push(ast::Placeable::CallBlock(
                                    ast::CallBlock { name, span: full },
                                ));
                            }
                            _ => {
                                return Err(Error::syntax(
                                    "unexpected `endblock` block",
                                    self.source(),
                                    span,
                                ));
                            }
                        },

                        Stmt::Set { pattern, value } => {
                            let src = self.source();
                            let vars = scope_vars(&mut stack, &mut root_vars);
                            for name in pattern.idents() {
                                if !vars.iter().any(|v| src[v.span] == src[name.span]) {
                                    vars.push(*name);
                                }
                            }
                            bodies.last_mut().unwrap().push(ast::Placeable::Assign(
                                ast::Assign {
                                    pattern,
                                    value,
                                    span,
                                },
                            ));
                        }

                        Stmt::Extends(name) => {
                            extends = Some(name);
                        }
                    }
                }

                _ => unreachable!("raw text is collected above"),
            }
        }

        if let Some(state) = stack.first() {
            let (msg, span) = match state {
                State::If { span, .. } => ("unclosed `if` block", span),
                State::For { span, .. } => ("unclosed `for` block", span),
                State::Macro { span, .. } => ("unclosed `macro` block", span),
                State::Call { span, .. } => ("unclosed `call` block", span),
                State::Filter { span, .. } => ("unclosed `filter` block", span),
                State::Block { span, .. } => ("unclosed `block`", span),
            };
            return Err(Error::syntax(msg, self.source(), *span));
        }

        assert!(
            bodies.len() == 1,
            "parser bug: we should end with a single scope"
        );

        let span = Span {
            start: Position::origin(),
            end: eof,
        };
        Ok(ast::Template {
            extends,
            blocks,
            macros,
            body: ast::Scope {
                vars: root_vars,
                body: bodies.remove(0),
                span,
            },
            span,
        })
    }

    /// Parses a value emission after the opening `{{`.
    ///
    ///   {{ user.name | lower | truncate(8) }}
    ///
    fn parse_put_value(&mut self, begin: Span) -> Result<ast::PutValue> {
        let value = yard::parse(self, VALUE_TERM)?;
        let mut filters = Vec::new();
        while self.is_next_symbol(Symbol::Pipe) {
            self.next(true);
            filters.push(yard::parse(self, VALUE_TERM)?);
        }
        let end = self.expect_symbol(Symbol::EndExpr)?;
        Ok(ast::PutValue {
            value,
            filters,
            span: begin.combine(end),
        })
    }

    /// Parses a single statement tag after the opening `{%`. All of the
    /// following are valid statements.
    ///
    ///   if user.enabled
    ///
    ///   for uid, user in users if user.age > 21
    ///
    ///   macro greet(name, mark=1)
    ///
    ///   set width = 80
    ///
    ///   endfor
    ///
    fn parse_stmt(&mut self) -> Result<Stmt> {
        let tok = self.next(true);
        let span = tok.span;
        if tok.kind != TokenKind::Ident {
            return Err(self.err_unexpected_token("identifier", &tok));
        }
        let word = &self.source()[span];
        let kw = match Keyword::from_str(word) {
            Some(kw) => kw,
            None => {
                return Err(Error::syntax(
                    format!("unexpected keyword `{word}`"),
                    self.source(),
                    span,
                ));
            }
        };

        match kw {
            Keyword::If => Ok(Stmt::If(yard::parse(self, BLOCK_TERM)?)),
            Keyword::Elif => Ok(Stmt::ElseIf(yard::parse(self, BLOCK_TERM)?)),
            Keyword::Else => Ok(Stmt::Else),
            Keyword::EndIf => Ok(Stmt::EndIf),

            Keyword::For => {
                let pattern = self.parse_pattern()?;
                self.expect_keyword(Keyword::In)?;
                let iterable = yard::parse(self, ITERABLE_TERM)?;
                let filter = if self.is_next_keyword(Keyword::If) {
                    self.next(true);
                    Some(yard::parse(self, BLOCK_TERM)?)
                } else {
                    None
                };
                Ok(Stmt::For {
                    pattern,
                    iterable,
                    filter,
                })
            }
            Keyword::In => Err(Error::syntax(
                "unexpected keyword `in`",
                self.source(),
                span,
            )),
            Keyword::EndFor => Ok(Stmt::EndFor),

            Keyword::Macro => {
                let name = self.parse_ident()?;
                self.expect_symbol(Symbol::LParen)?;
                let mut args = Vec::new();
                if !self.is_next_symbol(Symbol::RParen) {
                    loop {
                        let name = self.parse_ident()?;
                        let mut span = name.span;
                        // only number literals are accepted as defaults
                        let default = if self.is_next_symbol(Symbol::Eq) {
                            self.next(true);
                            let tok = self.next(true);
                            match tok.kind {
                                TokenKind::Number(value) => {
                                    span = span.combine(tok.span);
                                    Some(ast::Number {
                                        value,
                                        span: tok.span,
                                    })
                                }
                                _ => {
                                    return Err(
                                        self.err_unexpected_token("a number literal", &tok)
                                    );
                                }
                            }
                        } else {
                            None
                        };
                        args.push(ast::Argument {
                            name,
                            default,
                            span,
                        });
                        if !self.is_next_symbol(Symbol::Comma) {
                            break;
                        }
                        self.next(true);
                    }
                }
                self.expect_symbol(Symbol::RParen)?;
                Ok(Stmt::Macro { name, args })
            }
            Keyword::EndMacro => Ok(Stmt::EndMacro),

            // the whole `name(args...)` is parsed as one expression and
            // must reduce to a call of a plain variable
            Keyword::Call => {
                let expr = yard::parse(self, BLOCK_TERM)?;
                match expr {
                    ast::Expr::Call(call) => {
                        let call = *call;
                        match call.function {
                            ast::Expr::Var(name) => Ok(Stmt::Call {
                                name,
                                args: call.args,
                            }),
                            other => Err(Error::syntax(
                                "expected a macro name",
                                self.source(),
                                other.span(),
                            )),
                        }
                    }
                    other => Err(Error::syntax(
                        "expected a macro call",
                        self.source(),
                        other.span(),
                    )),
                }
            }
            Keyword::EndCall => Ok(Stmt::EndCall),

            Keyword::Filter => Ok(Stmt::Filter(yard::parse(self, BLOCK_TERM)?)),
            Keyword::EndFilter => Ok(Stmt::EndFilter),

            Keyword::Block => Ok(Stmt::Block(self.parse_ident()?)),
            Keyword::EndBlock => Ok(Stmt::EndBlock),

            Keyword::Set => {
                let pattern = self.parse_pattern()?;
                self.expect_symbol(Symbol::Eq)?;
                let value = yard::parse(self, BLOCK_TERM)?;
                Ok(Stmt::Set { pattern, value })
            }

            Keyword::Extends => Ok(Stmt::Extends(self.parse_ident()?)),
        }
    }

    /// Parses one or more comma separated identifiers.
    ///
    ///   item
    ///
    ///   key, value
    ///
    fn parse_pattern(&mut self) -> Result<ast::Pattern> {
        let first = self.parse_ident()?;
        if !self.is_next_symbol(Symbol::Comma) {
            return Ok(ast::Pattern::Single(first));
        }
        let mut names = vec![first];
        while self.is_next_symbol(Symbol::Comma) {
            self.next(true);
            names.push(self.parse_ident()?);
        }
        let span = names.first().unwrap().span.combine(names.last().unwrap().span);
        Ok(ast::Pattern::Unpack(ast::Unpack { names, span }))
    }

    /// Parses an identifier.
    fn parse_ident(&mut self) -> Result<ast::Ident> {
        let tok = self.next(true);
        match tok.kind {
            TokenKind::Ident => Ok(ast::Ident { span: tok.span }),
            _ => Err(self.err_unexpected_token("identifier", &tok)),
        }
    }

    /// Parses the specified symbol and returns its span.
    fn expect_symbol(&mut self, symbol: Symbol) -> Result<Span> {
        let tok = self.next(true);
        match tok.kind {
            TokenKind::Symbol(s) if s == symbol => Ok(tok.span),
            _ => Err(self.err_unexpected_token(format!("`{}`", symbol.as_str()), &tok)),
        }
    }

    /// Parses the specified keyword.
    fn expect_keyword(&mut self, kw: Keyword) -> Result<Span> {
        let tok = self.next(true);
        if tok.kind == TokenKind::Ident
            && Keyword::from_str(&self.source()[tok.span]) == Some(kw)
        {
            Ok(tok.span)
        } else {
            Err(self.err_unexpected_token(format!("keyword `{}`", kw.human()), &tok))
        }
    }

    /// Returns `true` if the next token is the given symbol.
    fn is_next_symbol(&mut self, symbol: Symbol) -> bool {
        self.peek(true).kind == TokenKind::Symbol(symbol)
    }

    /// Returns `true` if the next token is the given keyword.
    fn is_next_keyword(&mut self, kw: Keyword) -> bool {
        let tok = self.peek(true);
        tok.kind == TokenKind::Ident && Keyword::from_str(&self.source()[tok.span]) == Some(kw)
    }

    /// Returns a copy of the next token without affecting the result of
    /// the following `.next()` call.
    pub(crate) fn peek(&mut self, strings: bool) -> Token {
        let tok = self.next(strings);
        self.putback.push(tok.clone());
        tok
    }

    /// Returns the next token in the stream.
    pub(crate) fn next(&mut self, strings: bool) -> Token {
        match self.putback.pop() {
            Some(tok) => tok,
            None => self.tokens.next(strings),
        }
    }

    pub(crate) fn source(&self) -> &'source str {
        self.tokens.source
    }

    fn err_unexpected_token(&self, exp: impl Display, tok: &Token) -> Error {
        Error::syntax(
            format!("expected {exp}, found {}", tok.kind.human()),
            self.source(),
            tok.span,
        )
    }
}

/// Closes an arm of an `if` chain.
fn arm(cond: ast::Expr, body: Vec<ast::Placeable>) -> ast::Arm {
    let mut span = cond.span();
    if let Some(last) = body.last() {
        span = span.combine(last.span());
    }
    ast::Arm { cond, body, span }
}

/// The variable list of the innermost scope-owning construct. `if` arms
/// and a loop's `else` alternative share the enclosing scope.
fn scope_vars<'a>(
    stack: &'a mut [State],
    root: &'a mut Vec<ast::Ident>,
) -> &'a mut Vec<ast::Ident> {
    for state in stack.iter_mut().rev() {
        match state {
            State::If { .. } => continue,
            State::For { body: Some(_), .. } => continue,
            State::For { vars, .. }
            | State::Macro { vars, .. }
            | State::Call { vars, .. }
            | State::Filter { vars, .. }
            | State::Block { vars, .. } => return vars,
        }
    }
    root
}

/// Registers a macro; a later definition with the same name replaces the
/// earlier one in place.
fn insert_macro(source: &str, macros: &mut Vec<ast::Macro>, mac: ast::Macro) {
    let name = &source[mac.name.span];
    match macros.iter().position(|m| &source[m.name.span] == name) {
        Some(i) => macros[i] = mac,
        None => macros.push(mac),
    }
}

/// Registers a block; a later definition with the same name replaces the
/// earlier one in place.
fn insert_block(source: &str, blocks: &mut Vec<ast::Block>, block: ast::Block) {
    let name = &source[block.name.span];
    match blocks.iter().position(|b| &source[b.name.span] == name) {
        Some(i) => blocks[i] = block,
        None => blocks.push(block),
    }
}

impl Keyword {
    const fn human(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::EndIf => "endif",
            Self::For => "for",
            Self::In => "in",
            Self::EndFor => "endfor",
            Self::Block => "block",
            Self::EndBlock => "endblock",
            Self::Macro => "macro",
            Self::EndMacro => "endmacro",
            Self::Call => "call",
            Self::EndCall => "endcall",
            Self::Filter => "filter",
            Self::EndFilter => "endfilter",
            Self::Set => "set",
            Self::Extends => "extends",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        let kw = match s {
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "endif" => Self::EndIf,
            "for" => Self::For,
            "in" => Self::In,
            "endfor" => Self::EndFor,
            "block" => Self::Block,
            "endblock" => Self::EndBlock,
            "macro" => Self::Macro,
            "endmacro" => Self::EndMacro,
            "call" => Self::Call,
            "endcall" => Self::EndCall,
            "filter" => Self::Filter,
            "endfilter" => Self::EndFilter,
            "set" => Self::Set,
            "extends" => Self::Extends,
            _ => return None,
        };
        Some(kw)
    }
}
