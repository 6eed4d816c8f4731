//! A builder for the ES syntax tree handed to the code printer.
//!
//! Every node serializes as ESTree-shaped JSON: an internally tagged
//! `type`, ESTree field names and an optional `loc` carrying the template
//! source name and 1-based line / 0-based column positions. The split into
//! [`Expr`], [`Stmt`] and [`Pat`] is the expression / statement / pattern
//! classification; inserting an expression where a statement belongs goes
//! through the `From` conversion which wraps it in an
//! `ExpressionStatement`.

use serde::Serialize;

use crate::types::span::Span;

/// A 1-based line and 0-based column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// A source location attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub start: LineColumn,
    pub end: LineColumn,
}

impl Loc {
    pub fn new(span: Span, source: Option<&str>) -> Self {
        Self {
            source: source.map(str::to_owned),
            start: LineColumn {
                line: span.start.line,
                column: span.start.column,
            },
            end: LineColumn {
                line: span.end.line,
                column: span.end.column,
            },
        }
    }
}

/// The root node of the produced module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    #[serde(rename = "type")]
    node_type: &'static str,
    #[serde(rename = "sourceType")]
    pub source_type: &'static str,
    pub body: Vec<Stmt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
}

impl Program {
    /// A program with `sourceType: "module"`.
    pub fn module(body: Vec<Stmt>) -> Self {
        Self {
            node_type: "Program",
            source_type: "module",
            body,
            loc: None,
        }
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = Some(loc);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    #[serde(flatten)]
    pub kind: StmtKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StmtKind {
    ExpressionStatement {
        expression: Box<Expr>,
    },
    BlockStatement {
        body: Vec<Stmt>,
    },
    VariableDeclaration {
        kind: DeclKind,
        declarations: Vec<Declarator>,
    },
    IfStatement {
        test: Box<Expr>,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    SwitchStatement {
        discriminant: Box<Expr>,
        cases: Vec<SwitchCase>,
    },
    ForStatement {
        init: Option<ForInit>,
        test: Option<Box<Expr>>,
        update: Option<Box<Expr>>,
        body: Box<Stmt>,
    },
    ReturnStatement {
        argument: Option<Box<Expr>>,
    },
    BreakStatement {},
    ContinueStatement {},
    ExportDefaultDeclaration {
        declaration: Box<Expr>,
    },
}

/// The init slot of a `for` statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    Declaration(Box<Stmt>),
    Expression(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    #[serde(rename = "type")]
    node_type: &'static str,
    pub id: Pat,
    pub init: Option<Expr>,
}

impl Declarator {
    pub fn new(id: Pat, init: Option<Expr>) -> Self {
        Self {
            node_type: "VariableDeclarator",
            id,
            init,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    #[serde(rename = "type")]
    node_type: &'static str,
    pub test: Option<Expr>,
    pub consequent: Vec<Stmt>,
}

impl SwitchCase {
    pub fn new(test: Option<Expr>, consequent: Vec<Stmt>) -> Self {
        Self {
            node_type: "SwitchCase",
            test,
            consequent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    Identifier {
        name: String,
    },
    Literal {
        value: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        raw: Option<String>,
    },
    FunctionExpression {
        params: Vec<Pat>,
        body: Box<Stmt>,
        generator: bool,
    },
    ArrowFunctionExpression {
        params: Vec<Pat>,
        body: Box<Stmt>,
        generator: bool,
        expression: bool,
    },
    CallExpression {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    MemberExpression {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    BinaryExpression {
        operator: &'static str,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryExpression {
        operator: &'static str,
        argument: Box<Expr>,
        prefix: bool,
    },
    AssignmentExpression {
        operator: &'static str,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UpdateExpression {
        operator: &'static str,
        argument: Box<Expr>,
        prefix: bool,
    },
    YieldExpression {
        argument: Option<Box<Expr>>,
        delegate: bool,
    },
    ObjectExpression {
        properties: Vec<Property>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    #[serde(rename = "type")]
    node_type: &'static str,
    pub key: Expr,
    pub value: Expr,
    pub kind: &'static str,
    pub computed: bool,
    pub shorthand: bool,
}

impl Property {
    /// An `init` property with an identifier key.
    pub fn init(key: impl Into<String>, value: Expr) -> Self {
        Self {
            node_type: "Property",
            key: Expr::ident(key),
            value,
            kind: "init",
            computed: false,
            shorthand: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pat {
    #[serde(flatten)]
    pub kind: PatKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PatKind {
    Identifier {
        name: String,
    },
    ObjectPattern {
        properties: Vec<Property>,
    },
    AssignmentPattern {
        left: Box<Pat>,
        right: Box<Expr>,
    },
}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self { kind, loc: None }
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Identifier { name: name.into() })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Literal {
            value: serde_json::Value::String(value.into()),
            raw: None,
        })
    }

    pub fn number(value: f64) -> Self {
        Self::new(ExprKind::Literal {
            value: serde_json::json!(value),
            raw: None,
        })
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::Literal {
            value: serde_json::Value::Bool(value),
            raw: None,
        })
    }

    pub fn null() -> Self {
        Self::new(ExprKind::Literal {
            value: serde_json::Value::Null,
            raw: None,
        })
    }

    /// Attaches the original lexeme to a literal.
    pub fn raw(mut self, raw: impl Into<String>) -> Self {
        if let ExprKind::Literal { raw: slot, .. } = &mut self.kind {
            *slot = Some(raw.into());
        }
        self
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Self::new(ExprKind::CallExpression {
            callee: Box::new(callee),
            arguments,
        })
    }

    /// A member access; `computed` is derived from the property: anything
    /// other than an identifier subscripts with brackets.
    pub fn member(object: Expr, property: Expr) -> Self {
        let computed = !matches!(property.kind, ExprKind::Identifier { .. });
        Self::new(ExprKind::MemberExpression {
            object: Box::new(object),
            property: Box::new(property),
            computed,
        })
    }

    pub fn binary(operator: &'static str, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(operator: &'static str, argument: Expr) -> Self {
        Self::new(ExprKind::UnaryExpression {
            operator,
            argument: Box::new(argument),
            prefix: true,
        })
    }

    pub fn assign(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::AssignmentExpression {
            operator: "=",
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn update(operator: &'static str, argument: Expr) -> Self {
        Self::new(ExprKind::UpdateExpression {
            operator,
            argument: Box::new(argument),
            prefix: true,
        })
    }

    pub fn yield_(argument: Option<Expr>, delegate: bool) -> Self {
        Self::new(ExprKind::YieldExpression {
            argument: argument.map(Box::new),
            delegate,
        })
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Self::new(ExprKind::ObjectExpression { properties })
    }

    pub fn function(params: Vec<Pat>, body: Stmt, generator: bool) -> Self {
        Self::new(ExprKind::FunctionExpression {
            params,
            body: Box::new(body),
            generator,
        })
    }

    /// A `function* (params) { ... }` expression.
    pub fn generator(params: Vec<Pat>, body: Stmt) -> Self {
        Self::function(params, body, true)
    }

    pub fn arrow(params: Vec<Pat>, body: Stmt, generator: bool) -> Self {
        Self::new(ExprKind::ArrowFunctionExpression {
            params,
            body: Box::new(body),
            generator,
            expression: false,
        })
    }
}

impl Stmt {
    fn new(kind: StmtKind) -> Self {
        Self { kind, loc: None }
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn block(body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::BlockStatement { body })
    }

    pub fn if_(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Self {
        Self::new(StmtKind::IfStatement {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        })
    }

    pub fn for_(
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Stmt,
    ) -> Self {
        Self::new(StmtKind::ForStatement {
            init,
            test: test.map(Box::new),
            update: update.map(Box::new),
            body: Box::new(body),
        })
    }

    pub fn ret(argument: Option<Expr>) -> Self {
        Self::new(StmtKind::ReturnStatement {
            argument: argument.map(Box::new),
        })
    }

    pub fn break_() -> Self {
        Self::new(StmtKind::BreakStatement {})
    }

    pub fn continue_() -> Self {
        Self::new(StmtKind::ContinueStatement {})
    }

    pub fn decl(kind: DeclKind, declarations: Vec<Declarator>) -> Self {
        Self::new(StmtKind::VariableDeclaration { kind, declarations })
    }

    /// A `let name = init;` declaration.
    pub fn let_(name: impl Into<String>, init: Expr) -> Self {
        Self::decl(
            DeclKind::Let,
            vec![Declarator::new(Pat::ident(name), Some(init))],
        )
    }

    /// A `const name = init;` declaration.
    pub fn const_(name: impl Into<String>, init: Expr) -> Self {
        Self::decl(
            DeclKind::Const,
            vec![Declarator::new(Pat::ident(name), Some(init))],
        )
    }

    pub fn switch(discriminant: Expr, cases: Vec<SwitchCase>) -> Self {
        Self::new(StmtKind::SwitchStatement {
            discriminant: Box::new(discriminant),
            cases,
        })
    }

    pub fn export_default(declaration: Expr) -> Self {
        Self::new(StmtKind::ExportDefaultDeclaration {
            declaration: Box::new(declaration),
        })
    }
}

impl From<Expr> for Stmt {
    /// Wraps an expression in an `ExpressionStatement`.
    fn from(expr: Expr) -> Self {
        let loc = expr.loc.clone();
        Self {
            kind: StmtKind::ExpressionStatement {
                expression: Box::new(expr),
            },
            loc,
        }
    }
}

impl Pat {
    pub fn ident(name: impl Into<String>) -> Self {
        Self {
            kind: PatKind::Identifier { name: name.into() },
            loc: None,
        }
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Self {
            kind: PatKind::ObjectPattern { properties },
            loc: None,
        }
    }

    /// A parameter with a default value.
    pub fn with_default(self, right: Expr) -> Self {
        Self {
            kind: PatKind::AssignmentPattern {
                left: Box::new(self),
                right: Box::new(right),
            },
            loc: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_shape() {
        let value = serde_json::to_value(Expr::ident("ctx")).unwrap();
        assert_eq!(value, json!({ "type": "Identifier", "name": "ctx" }));
    }

    #[test]
    fn member_computed_is_derived() {
        let plain = Expr::member(Expr::ident("a"), Expr::ident("b"));
        assert!(matches!(
            plain.kind,
            ExprKind::MemberExpression { computed: false, .. }
        ));
        let subscript = Expr::member(Expr::ident("a"), Expr::number(0.0));
        assert!(matches!(
            subscript.kind,
            ExprKind::MemberExpression { computed: true, .. }
        ));
    }

    #[test]
    fn expression_statement_auto_wrap() {
        let stmt = Stmt::from(Expr::ident("a"));
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(value["type"], "ExpressionStatement");
        assert_eq!(value["expression"]["type"], "Identifier");
    }

    #[test]
    fn generator_shape() {
        let f = Expr::generator(vec![Pat::ident("ctx")], Stmt::block(Vec::new()));
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "FunctionExpression",
                "params": [{ "type": "Identifier", "name": "ctx" }],
                "body": { "type": "BlockStatement", "body": [] },
                "generator": true,
            })
        );
    }

    #[test]
    fn declaration_shape() {
        let stmt = Stmt::let_("x", Expr::number(1.0));
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "VariableDeclaration",
                "kind": "let",
                "declarations": [{
                    "type": "VariableDeclarator",
                    "id": { "type": "Identifier", "name": "x" },
                    "init": { "type": "Literal", "value": 1.0 },
                }],
            })
        );
    }

    #[test]
    fn patterns_shape() {
        let pat = Pat::ident("ctx").with_default(Expr::object(Vec::new()));
        let value = serde_json::to_value(&pat).unwrap();
        assert_eq!(value["type"], "AssignmentPattern");
        assert_eq!(value["left"]["type"], "Identifier");
        assert_eq!(value["right"]["type"], "ObjectExpression");

        let pat = Pat::object(vec![Property::init("a", Expr::ident("b"))]);
        let value = serde_json::to_value(&pat).unwrap();
        assert_eq!(value["type"], "ObjectPattern");
        assert_eq!(value["properties"][0]["type"], "Property");
    }

    #[test]
    fn arrow_shape() {
        let f = Expr::arrow(vec![], Stmt::block(Vec::new()), false);
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["type"], "ArrowFunctionExpression");
        assert_eq!(value["generator"], false);
        assert_eq!(value["expression"], false);
    }

    #[test]
    fn switch_shape() {
        let stmt = Stmt::switch(
            Expr::ident("x"),
            vec![SwitchCase::new(Some(Expr::number(1.0)), Vec::new())],
        );
        let value = serde_json::to_value(&stmt).unwrap();
        assert_eq!(value["type"], "SwitchStatement");
        assert_eq!(value["cases"][0]["type"], "SwitchCase");
    }

    #[test]
    fn loc_shape() {
        use crate::types::span::{Position, Span};
        let span = Span {
            start: Position {
                offset: 0,
                line: 1,
                column: 0,
            },
            end: Position {
                offset: 2,
                line: 1,
                column: 2,
            },
        };
        let expr = Expr::ident("ab").at(Loc::new(span, Some("page.html")));
        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            value["loc"],
            json!({
                "source": "page.html",
                "start": { "line": 1, "column": 0 },
                "end": { "line": 1, "column": 2 },
            })
        );
    }
}
