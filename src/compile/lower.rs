//! Lowers the template AST into the target syntax tree.
//!
//! The produced module default-exports an object with three fields:
//! `macros` maps each macro name to a generator function, `generate` is a
//! generator yielding the rendered fragments and `render` joins them into
//! a string.
//!
//! Variable bindings are reified as context objects. The lowerer keeps a
//! stack of context identifiers (`__j_ctx_<N>`); a scope that declares at
//! least one variable allocates a fresh context cloned from its parent,
//! a scope without declarations introduces no frame. Macro bodies use
//! their context parameter directly.

use crate::compile::lex::Symbol;
use crate::types::ast;
use crate::types::js;
use crate::types::span::Span;
use crate::{Error, Result};

/// Lowers a parsed template into an ES module program.
pub(crate) fn template<'a>(
    template: &'a ast::Template,
    source: &'a str,
    name: Option<&'a str>,
) -> Result<js::Program> {
    Lower {
        source,
        name,
        template,
        frames: Vec::new(),
        next_id: 0,
    }
    .run()
}

struct Lower<'a> {
    source: &'a str,
    name: Option<&'a str>,
    template: &'a ast::Template,

    /// Context identifiers, innermost last.
    frames: Vec<String>,

    /// Counter for generated identifiers.
    next_id: usize,
}

impl<'a> Lower<'a> {
    fn run(mut self) -> Result<js::Program> {
        let template = self.template;

        // generate: function* (ctx) { ... }
        let ctx = self.fresh_ctx();
        self.frames.push(ctx.clone());
        let mut body = Vec::new();
        if !template.macros.is_empty() {
            body.push(js::Stmt::const_(
                "__j_macros",
                js::Expr::member(js::Expr::ident("this"), js::Expr::ident("macros")),
            ));
        }
        let entered = self.enter_scope(&template.body, &mut body);
        self.lower_placeables(&template.body.body, &mut body)?;
        self.exit_scope(entered);
        self.frames.pop();
        let generate = js::Expr::generator(vec![js::Pat::ident(ctx)], js::Stmt::block(body));

        let mut props = Vec::new();
        for mac in &template.macros {
            let name = self.ident_name(mac.name);
            let function = self.lower_macro(mac)?;
            props.push(js::Property::init(name, function));
        }
        let macros = js::Expr::object(props);

        let object = js::Expr::object(vec![
            js::Property::init("macros", macros),
            js::Property::init("generate", generate),
            js::Property::init("render", render()),
        ]);

        let loc = self.loc(template.span);
        Ok(js::Program::module(vec![js::Stmt::export_default(object)]).at(loc))
    }

    /// Lowers a macro into `function* (ctx, __j_macros) { ... }`. The
    /// context arrives as the call's argument object, so no frame is
    /// allocated for the body scope.
    fn lower_macro(&mut self, mac: &'a ast::Macro) -> Result<js::Expr> {
        let ctx = self.fresh_ctx();
        self.frames.push(ctx.clone());
        let mut body = Vec::new();
        self.lower_placeables(&mac.body.body, &mut body)?;
        self.frames.pop();
        Ok(js::Expr::generator(
            vec![js::Pat::ident(ctx), js::Pat::ident("__j_macros")],
            js::Stmt::block(body),
        )
        .at(self.loc(mac.span)))
    }

    fn lower_placeables(
        &mut self,
        placeables: &'a [ast::Placeable],
        stmts: &mut Vec<js::Stmt>,
    ) -> Result<()> {
        for placeable in placeables {
            self.lower_placeable(placeable, stmts)?;
        }
        Ok(())
    }

    fn lower_placeable(
        &mut self,
        placeable: &'a ast::Placeable,
        stmts: &mut Vec<js::Stmt>,
    ) -> Result<()> {
        match placeable {
            ast::Placeable::Text(text) => {
                let loc = self.loc(text.span);
                let lit = js::Expr::string(&self.source[text.span]).at(loc.clone());
                stmts.push(js::Stmt::from(js::Expr::yield_(Some(lit), false).at(loc)));
            }

            // the filter chain wraps the value left to right
            ast::Placeable::PutValue(put) => {
                let mut value = self.lower_expr(&put.value)?;
                for filter in &put.filters {
                    let callee = self.lower_expr(filter)?;
                    value = js::Expr::call(callee, vec![value]);
                }
                let loc = self.loc(put.span);
                stmts.push(js::Stmt::from(js::Expr::yield_(Some(value), false).at(loc)));
            }

            ast::Placeable::Case(case) => {
                let mut alternate: Option<js::Stmt> = None;
                for arm in case.arms.iter().rev() {
                    let mut body = Vec::new();
                    self.lower_placeables(&arm.body, &mut body)?;
                    let test = self.lower_expr(&arm.cond)?;
                    alternate = Some(js::Stmt::if_(test, js::Stmt::block(body), alternate.take()));
                }
                // arms are never empty
                stmts.push(alternate.unwrap().at(self.loc(case.span)));
            }

            ast::Placeable::For(for_loop) => self.lower_for(for_loop, stmts)?,

            ast::Placeable::MacroCall(call) => self.lower_macro_call(call, stmts)?,

            ast::Placeable::CallBlock(call) => {
                let template = self.template;
                let name = &self.source[call.name.span];
                let block = match template
                    .blocks
                    .iter()
                    .find(|b| &self.source[b.name.span] == name)
                {
                    Some(block) => block,
                    None => {
                        return Err(Error::syntax(
                            format!("undefined block `{name}`"),
                            self.source,
                            call.span,
                        ));
                    }
                };
                let mut body = Vec::new();
                let entered = self.enter_scope(&block.body, &mut body);
                self.lower_placeables(&block.body.body, &mut body)?;
                self.exit_scope(entered);
                let iife = js::Expr::call(
                    js::Expr::generator(Vec::new(), js::Stmt::block(body)),
                    Vec::new(),
                );
                stmts.push(js::Stmt::from(
                    js::Expr::yield_(Some(iife), true).at(self.loc(call.span)),
                ));
            }

            // yield* filter((function* () { ... })())
            ast::Placeable::FilterBlock(filter) => {
                let mut body = Vec::new();
                let entered = self.enter_scope(&filter.body, &mut body);
                self.lower_placeables(&filter.body.body, &mut body)?;
                self.exit_scope(entered);
                let inner = js::Expr::call(
                    js::Expr::generator(Vec::new(), js::Stmt::block(body)),
                    Vec::new(),
                );
                let wrapped = js::Expr::call(self.lower_expr(&filter.filter)?, vec![inner]);
                stmts.push(js::Stmt::from(
                    js::Expr::yield_(Some(wrapped), true).at(self.loc(filter.span)),
                ));
            }

            ast::Placeable::Assign(assign) => {
                let value = self.lower_expr(&assign.value)?;
                match &assign.pattern {
                    ast::Pattern::Single(_) => {
                        self.assign_pattern(&assign.pattern, value, stmts);
                    }
                    ast::Pattern::Unpack(_) => {
                        // evaluate once, then assign by index
                        let tmp = format!("__j_tmp_{}", self.fresh_id());
                        stmts.push(js::Stmt::let_(tmp.clone(), value));
                        self.assign_pattern(&assign.pattern, js::Expr::ident(tmp), stmts);
                    }
                }
            }
        }
        Ok(())
    }

    fn lower_for(&mut self, for_loop: &'a ast::ForLoop, stmts: &mut Vec<js::Stmt>) -> Result<()> {
        let id = self.fresh_id();
        let loop_var = format!("__j_loop_{id}");
        let count = format!("__j_count_{id}");
        let item = format!("__j_item_{id}");

        // for (let loop = iter[Symbol.iterator](), count = 0;; ++count)
        let iter = js::Expr::call(
            js::Expr::member(
                self.lower_expr(&for_loop.iterable)?,
                js::Expr::member(js::Expr::ident("Symbol"), js::Expr::ident("iterator")),
            ),
            Vec::new(),
        );
        let init = js::Stmt::decl(
            js::DeclKind::Let,
            vec![
                js::Declarator::new(js::Pat::ident(loop_var.clone()), Some(iter)),
                js::Declarator::new(js::Pat::ident(count.clone()), Some(js::Expr::number(0.0))),
            ],
        );

        let mut body = Vec::new();
        body.push(js::Stmt::let_(
            item.clone(),
            js::Expr::call(
                js::Expr::member(js::Expr::ident(loop_var), js::Expr::ident("next")),
                Vec::new(),
            ),
        ));
        body.push(js::Stmt::if_(
            js::Expr::member(js::Expr::ident(item.clone()), js::Expr::ident("done")),
            js::Stmt::break_(),
            None,
        ));

        let entered = self.enter_scope(&for_loop.body, &mut body);
        let value = js::Expr::member(js::Expr::ident(item), js::Expr::ident("value"));
        self.assign_pattern(&for_loop.pattern, value, &mut body);
        if let Some(filter) = &for_loop.filter {
            let test = js::Expr::unary("!", self.lower_expr(filter)?);
            body.push(js::Stmt::if_(test, js::Stmt::continue_(), None));
        }
        self.lower_placeables(&for_loop.body.body, &mut body)?;
        self.exit_scope(entered);

        stmts.push(
            js::Stmt::for_(
                Some(js::ForInit::Declaration(Box::new(init))),
                None,
                Some(js::Expr::update("++", js::Expr::ident(count.clone()))),
                js::Stmt::block(body),
            )
            .at(self.loc(for_loop.span)),
        );

        // the alternative runs when the loop produced no iterations; it
        // shares the enclosing scope
        if let Some(alternative) = &for_loop.alternative {
            let mut body = Vec::new();
            self.lower_placeables(alternative, &mut body)?;
            stmts.push(js::Stmt::if_(
                js::Expr::binary("===", js::Expr::ident(count), js::Expr::number(0.0)),
                js::Stmt::block(body),
                None,
            ));
        }
        Ok(())
    }

    /// Lowers `{% call m(...) %}` into
    /// `yield* __j_macros.m({ arg: expr, ... }, __j_macros)`. Positional
    /// arguments zip against the macro's declared parameters; a missing
    /// argument falls back to the declared default and is otherwise
    /// omitted, excess arguments are dropped.
    fn lower_macro_call(
        &mut self,
        call: &'a ast::MacroCall,
        stmts: &mut Vec<js::Stmt>,
    ) -> Result<()> {
        let template = self.template;
        let name = self.ident_name(call.name);
        let mac = match template
            .macros
            .iter()
            .find(|m| self.source[m.name.span] == *name)
        {
            Some(mac) => mac,
            None => {
                return Err(Error::syntax(
                    format!("call of undefined macro `{name}`"),
                    self.source,
                    call.span,
                ));
            }
        };

        let mut props = Vec::new();
        for (i, param) in mac.args.iter().enumerate() {
            let key = self.ident_name(param.name);
            match call.args.get(i) {
                Some(arg) => props.push(js::Property::init(key, self.lower_expr(arg)?)),
                None => {
                    if let Some(default) = param.default {
                        props.push(js::Property::init(
                            key,
                            js::Expr::number(default.value).raw(&self.source[default.span]),
                        ));
                    }
                }
            }
        }
        if let Some(caller) = &call.caller {
            if !caller.body.is_empty() {
                let mut body = Vec::new();
                let entered = self.enter_scope(caller, &mut body);
                self.lower_placeables(&caller.body, &mut body)?;
                self.exit_scope(entered);
                props.push(js::Property::init(
                    "caller",
                    js::Expr::generator(Vec::new(), js::Stmt::block(body)),
                ));
            }
        }

        let callee = js::Expr::member(js::Expr::ident("__j_macros"), js::Expr::ident(name));
        let invoke = js::Expr::call(
            callee,
            vec![js::Expr::object(props), js::Expr::ident("__j_macros")],
        );
        stmts.push(js::Stmt::from(
            js::Expr::yield_(Some(invoke), true).at(self.loc(call.span)),
        ));
        Ok(())
    }

    fn lower_expr(&mut self, expr: &ast::Expr) -> Result<js::Expr> {
        let lowered = match expr {
            ast::Expr::Var(ident) => self.var(*ident),
            ast::Expr::Number(number) => js::Expr::number(number.value)
                .raw(&self.source[number.span])
                .at(self.loc(number.span)),
            ast::Expr::Str(string) => js::Expr::string(&string.value)
                .raw(&self.source[string.span])
                .at(self.loc(string.span)),
            ast::Expr::Boolean(boolean) => {
                js::Expr::bool(boolean.value).at(self.loc(boolean.span))
            }
            ast::Expr::BinOp(binop) => {
                let left = self.lower_expr(&binop.left)?;
                let right = self.lower_expr(&binop.right)?;
                js::Expr::binary(operator(binop.op.symbol), left, right)
                    .at(self.loc(binop.span))
            }
            ast::Expr::Member(member) => {
                let object = self.lower_expr(&member.object)?;
                let property = match &member.property {
                    // a plain name on the right of `.` stays a bare
                    // identifier, anything else subscripts
                    ast::Expr::Var(ident) => {
                        js::Expr::ident(self.ident_name(*ident)).at(self.loc(ident.span))
                    }
                    other => self.lower_expr(other)?,
                };
                js::Expr::member(object, property).at(self.loc(member.span))
            }
            ast::Expr::Call(call) => {
                let callee = self.lower_expr(&call.function)?;
                let mut args = Vec::new();
                for arg in &call.args {
                    args.push(self.lower_expr(arg)?);
                }
                js::Expr::call(callee, args).at(self.loc(call.span))
            }
            ast::Expr::Filter(filter) => {
                let callee = self.lower_expr(&filter.filter)?;
                let value = self.lower_expr(&filter.value)?;
                js::Expr::call(callee, vec![value]).at(self.loc(filter.span))
            }
        };
        Ok(lowered)
    }

    /// A variable is a property lookup on the current context.
    fn var(&mut self, ident: ast::Ident) -> js::Expr {
        let ctx = self.frames.last().unwrap().clone();
        js::Expr::member(js::Expr::ident(ctx), js::Expr::ident(self.ident_name(ident)))
            .at(self.loc(ident.span))
    }

    /// Assigns `value` to the pattern on the current context; unpack
    /// targets assign by numeric index.
    fn assign_pattern(
        &mut self,
        pattern: &ast::Pattern,
        value: js::Expr,
        stmts: &mut Vec<js::Stmt>,
    ) {
        match pattern {
            ast::Pattern::Single(ident) => {
                let target = self.var(*ident);
                stmts.push(js::Stmt::from(js::Expr::assign(target, value)));
            }
            ast::Pattern::Unpack(unpack) => {
                for (i, ident) in unpack.names.iter().enumerate() {
                    let target = self.var(*ident);
                    let item = js::Expr::member(value.clone(), js::Expr::number(i as f64));
                    stmts.push(js::Stmt::from(js::Expr::assign(target, item)));
                }
            }
        }
    }

    /// Allocates a context for a scope that declares variables. Each
    /// declared variable starts from the parent's value and the parent is
    /// spliced over the fresh object.
    fn enter_scope(&mut self, scope: &ast::Scope, stmts: &mut Vec<js::Stmt>) -> bool {
        if scope.vars.is_empty() {
            return false;
        }
        let parent = self.frames.last().cloned();
        let ctx = self.fresh_ctx();
        let mut props = Vec::new();
        for var in &scope.vars {
            let name = self.ident_name(*var);
            let init = match &parent {
                Some(parent) => js::Expr::member(
                    js::Expr::ident(parent.clone()),
                    js::Expr::ident(name.clone()),
                ),
                None => js::Expr::null(),
            };
            props.push(js::Property::init(name, init));
        }
        let init = match parent {
            Some(parent) => js::Expr::call(
                js::Expr::member(js::Expr::ident("Object"), js::Expr::ident("assign")),
                vec![js::Expr::object(props), js::Expr::ident(parent)],
            ),
            None => js::Expr::object(props),
        };
        stmts.push(js::Stmt::let_(ctx.clone(), init));
        self.frames.push(ctx);
        true
    }

    fn exit_scope(&mut self, entered: bool) {
        if entered {
            self.frames.pop();
        }
    }

    fn fresh_ctx(&mut self) -> String {
        format!("__j_ctx_{}", self.fresh_id())
    }

    fn fresh_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ident_name(&self, ident: ast::Ident) -> String {
        self.source[ident.span].to_owned()
    }

    fn loc(&self, span: Span) -> js::Loc {
        js::Loc::new(span, self.name)
    }
}

/// `render(context)` joins the generated fragments.
fn render() -> js::Expr {
    let generate = js::Expr::call(
        js::Expr::member(js::Expr::ident("this"), js::Expr::ident("generate")),
        vec![js::Expr::ident("context")],
    );
    let array = js::Expr::call(
        js::Expr::member(js::Expr::ident("Array"), js::Expr::ident("from")),
        vec![generate],
    );
    let join = js::Expr::call(
        js::Expr::member(array, js::Expr::ident("join")),
        vec![js::Expr::string("")],
    );
    js::Expr::function(
        vec![js::Pat::ident("context")],
        js::Stmt::block(vec![js::Stmt::ret(Some(join))]),
        false,
    )
}

/// Equality operators harden to their strict forms, everything else maps
/// verbatim.
fn operator(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::EqEq => "===",
        Symbol::BangEq => "!==",
        symbol => symbol.as_str(),
    }
}
