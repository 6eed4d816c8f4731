//! Structural tests over the produced ES syntax tree, asserted through
//! its ESTree JSON serialization.

use serde_json::Value;

#[track_caller]
fn compile_json(source: &str) -> Value {
    serde_json::to_value(jingle::compile(source, None).unwrap()).unwrap()
}

/// The object default-exported by the module.
fn export<'a>(program: &'a Value) -> &'a Value {
    assert_eq!(program["type"], "Program");
    assert_eq!(program["sourceType"], "module");
    let export = &program["body"][0];
    assert_eq!(export["type"], "ExportDefaultDeclaration");
    &export["declaration"]
}

#[track_caller]
fn prop<'a>(object: &'a Value, name: &str) -> &'a Value {
    assert_eq!(object["type"], "ObjectExpression");
    let prop = object["properties"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["key"]["name"] == name)
        .unwrap_or_else(|| panic!("no property `{name}`"));
    &prop["value"]
}

/// The statements of the `generate` generator.
fn generate<'a>(program: &'a Value) -> &'a Value {
    let generate = prop(export(program), "generate");
    assert_eq!(generate["type"], "FunctionExpression");
    assert_eq!(generate["generator"], true);
    &generate["body"]["body"]
}

#[test]
fn module_skeleton() {
    let program = compile_json("");
    let object = export(&program);

    assert_eq!(prop(object, "macros")["type"], "ObjectExpression");

    let generate = prop(object, "generate");
    assert_eq!(generate["params"][0]["name"], "__j_ctx_0");
    assert_eq!(generate["body"]["body"], serde_json::json!([]));

    // render(context) { return Array.from(this.generate(context)).join("") }
    let render = prop(object, "render");
    assert_eq!(render["type"], "FunctionExpression");
    assert_eq!(render["generator"], false);
    assert_eq!(render["params"][0]["name"], "context");
    let ret = &render["body"]["body"][0];
    assert_eq!(ret["type"], "ReturnStatement");
    let join = &ret["argument"];
    assert_eq!(join["type"], "CallExpression");
    assert_eq!(join["callee"]["property"]["name"], "join");
    let from = &join["callee"]["object"];
    assert_eq!(from["callee"]["object"]["name"], "Array");
    assert_eq!(from["callee"]["property"]["name"], "from");
    let this_generate = &from["arguments"][0];
    assert_eq!(this_generate["callee"]["object"]["name"], "this");
    assert_eq!(this_generate["callee"]["property"]["name"], "generate");

    assert_eq!(program["loc"]["start"]["line"], 1);
    assert_eq!(program["loc"]["start"]["column"], 0);
}

#[test]
fn lower_text() {
    let program = compile_json("hi");
    let body = generate(&program);
    let stmt = &body[0];
    assert_eq!(stmt["type"], "ExpressionStatement");
    let yields = &stmt["expression"];
    assert_eq!(yields["type"], "YieldExpression");
    assert_eq!(yields["delegate"], false);
    assert_eq!(yields["argument"]["type"], "Literal");
    assert_eq!(yields["argument"]["value"], "hi");
}

#[test]
fn lower_variable_is_context_lookup() {
    let program = compile_json("{{ x }}");
    let body = generate(&program);
    let arg = &body[0]["expression"]["argument"];
    assert_eq!(arg["type"], "MemberExpression");
    assert_eq!(arg["computed"], false);
    assert_eq!(arg["object"]["name"], "__j_ctx_0");
    assert_eq!(arg["property"]["name"], "x");
}

#[test]
fn lower_member_subscripts_non_identifiers() {
    let program = compile_json("{{ a.b.0 }}");
    let body = generate(&program);
    let arg = &body[0]["expression"]["argument"];
    assert_eq!(arg["type"], "MemberExpression");
    assert_eq!(arg["computed"], true);
    assert_eq!(arg["property"]["type"], "Literal");
    let inner = &arg["object"];
    assert_eq!(inner["computed"], false);
    assert_eq!(inner["property"]["name"], "b");
}

#[test]
fn lower_operator_mapping() {
    let program = compile_json("{{ a == b }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    assert_eq!(arg["type"], "BinaryExpression");
    assert_eq!(arg["operator"], "===");

    let program = compile_json("{{ a != b }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    assert_eq!(arg["operator"], "!==");

    let program = compile_json("{{ a + b }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    assert_eq!(arg["operator"], "+");
}

#[test]
fn lower_literals_keep_raw() {
    let program = compile_json("{{ 3.14 }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    assert_eq!(arg["value"], serde_json::json!(3.14));
    assert_eq!(arg["raw"], "3.14");

    let program = compile_json("{{ 'hi' }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    assert_eq!(arg["value"], "hi");
    assert_eq!(arg["raw"], "'hi'");
}

#[test]
fn lower_filters_wrap_left_to_right() {
    let program = compile_json("{{ x | f | g }}");
    let arg = &generate(&program)[0]["expression"]["argument"];
    // g(f(x))
    assert_eq!(arg["type"], "CallExpression");
    assert_eq!(arg["callee"]["property"]["name"], "g");
    let inner = &arg["arguments"][0];
    assert_eq!(inner["callee"]["property"]["name"], "f");
    assert_eq!(inner["arguments"][0]["property"]["name"], "x");
}

#[test]
fn lower_if_chain() {
    let program = compile_json("{% if a %}x{% elif b %}y{% else %}z{% endif %}");
    let body = generate(&program);
    let first = &body[0];
    assert_eq!(first["type"], "IfStatement");
    assert_eq!(first["test"]["property"]["name"], "a");
    assert_eq!(first["consequent"]["type"], "BlockStatement");
    let second = &first["alternate"];
    assert_eq!(second["type"], "IfStatement");
    assert_eq!(second["test"]["property"]["name"], "b");
    let third = &second["alternate"];
    assert_eq!(third["type"], "IfStatement");
    assert_eq!(third["test"]["type"], "Literal");
    assert_eq!(third["test"]["value"], true);
    assert_eq!(third["alternate"], Value::Null);
}

#[test]
fn lower_for_loop() {
    let program = compile_json("{% for i in xs %}{{ i }}{% endfor %}");
    let body = generate(&program);
    let stmt = &body[0];
    assert_eq!(stmt["type"], "ForStatement");

    // for (let __j_loop_1 = ctx.xs[Symbol.iterator](), __j_count_1 = 0;; ++__j_count_1)
    let init = &stmt["init"];
    assert_eq!(init["type"], "VariableDeclaration");
    assert_eq!(init["kind"], "let");
    let decls = init["declarations"].as_array().unwrap();
    assert_eq!(decls.len(), 2);
    assert_eq!(decls[0]["id"]["name"], "__j_loop_1");
    let iter = &decls[0]["init"];
    assert_eq!(iter["type"], "CallExpression");
    assert_eq!(iter["callee"]["computed"], true);
    assert_eq!(iter["callee"]["object"]["property"]["name"], "xs");
    assert_eq!(iter["callee"]["property"]["object"]["name"], "Symbol");
    assert_eq!(decls[1]["id"]["name"], "__j_count_1");
    assert_eq!(stmt["test"], Value::Null);
    assert_eq!(stmt["update"]["type"], "UpdateExpression");
    assert_eq!(stmt["update"]["operator"], "++");

    let inner = stmt["body"]["body"].as_array().unwrap();
    // let __j_item_1 = __j_loop_1.next();
    assert_eq!(inner[0]["declarations"][0]["id"]["name"], "__j_item_1");
    // if (__j_item_1.done) break;
    assert_eq!(inner[1]["type"], "IfStatement");
    assert_eq!(inner[1]["test"]["property"]["name"], "done");
    assert_eq!(inner[1]["consequent"]["type"], "BreakStatement");
    // let __j_ctx_2 = Object.assign({ i: __j_ctx_0.i }, __j_ctx_0);
    assert_eq!(inner[2]["declarations"][0]["id"]["name"], "__j_ctx_2");
    let assign = &inner[2]["declarations"][0]["init"];
    assert_eq!(assign["callee"]["object"]["name"], "Object");
    assert_eq!(assign["callee"]["property"]["name"], "assign");
    assert_eq!(assign["arguments"][0]["type"], "ObjectExpression");
    assert_eq!(assign["arguments"][1]["name"], "__j_ctx_0");
    // __j_ctx_2.i = __j_item_1.value;
    let pattern = &inner[3]["expression"];
    assert_eq!(pattern["type"], "AssignmentExpression");
    assert_eq!(pattern["left"]["object"]["name"], "__j_ctx_2");
    assert_eq!(pattern["left"]["property"]["name"], "i");
    assert_eq!(pattern["right"]["property"]["name"], "value");
    // yield __j_ctx_2.i;
    assert_eq!(inner[4]["expression"]["argument"]["object"]["name"], "__j_ctx_2");
}

#[test]
fn lower_for_loop_filter() {
    let program = compile_json("{% for i in xs if i %}{{ i }}{% endfor %}");
    let inner = &compile_inner_for(&program)[4];
    // if (!(ctx.i)) continue;
    assert_eq!(inner["type"], "IfStatement");
    assert_eq!(inner["test"]["type"], "UnaryExpression");
    assert_eq!(inner["test"]["operator"], "!");
    assert_eq!(inner["consequent"]["type"], "ContinueStatement");
}

#[test]
fn lower_for_loop_unpack() {
    let program = compile_json("{% for k, v in d %}{{ k }}{% endfor %}");
    let inner = compile_inner_for(&program);
    // ctx.k = item.value[0]; ctx.v = item.value[1];
    let first = &inner[3]["expression"];
    assert_eq!(first["left"]["property"]["name"], "k");
    assert_eq!(first["right"]["computed"], true);
    assert_eq!(first["right"]["property"]["value"], serde_json::json!(0.0));
    let second = &inner[4]["expression"];
    assert_eq!(second["left"]["property"]["name"], "v");
    assert_eq!(second["right"]["property"]["value"], serde_json::json!(1.0));
}

fn compile_inner_for(program: &Value) -> &Vec<Value> {
    let body = generate(program);
    assert_eq!(body[0]["type"], "ForStatement");
    body[0]["body"]["body"].as_array().unwrap()
}

#[test]
fn lower_for_else() {
    let program = compile_json("{% for i in xs %}a{% else %}b{% endfor %}");
    let body = generate(&program);
    // the alternative trails the loop behind a zero-count check
    let tail = &body[1];
    assert_eq!(tail["type"], "IfStatement");
    assert_eq!(tail["test"]["type"], "BinaryExpression");
    assert_eq!(tail["test"]["operator"], "===");
    assert_eq!(tail["test"]["left"]["name"], "__j_count_1");
    assert_eq!(tail["test"]["right"]["value"], serde_json::json!(0.0));
    let alt = &tail["consequent"]["body"][0];
    assert_eq!(alt["expression"]["argument"]["value"], "b");
}

#[test]
fn lower_macros_and_call() {
    let source = "{% macro m(a, b=2) %}{{ a }}{% endmacro %}{% call m(1) %}{% endcall %}";
    let program = compile_json(source);
    let object = export(&program);

    // macros.m = function* (__j_ctx_1, __j_macros) { yield __j_ctx_1.a; }
    let m = prop(prop(object, "macros"), "m");
    assert_eq!(m["type"], "FunctionExpression");
    assert_eq!(m["generator"], true);
    assert_eq!(m["params"][0]["name"], "__j_ctx_1");
    assert_eq!(m["params"][1]["name"], "__j_macros");
    let yielded = &m["body"]["body"][0]["expression"]["argument"];
    assert_eq!(yielded["object"]["name"], "__j_ctx_1");
    assert_eq!(yielded["property"]["name"], "a");

    let body = generate(&program);
    // const __j_macros = this.macros;
    assert_eq!(body[0]["type"], "VariableDeclaration");
    assert_eq!(body[0]["kind"], "const");
    assert_eq!(body[0]["declarations"][0]["id"]["name"], "__j_macros");
    assert_eq!(body[0]["declarations"][0]["init"]["object"]["name"], "this");

    // yield* __j_macros.m({ a: 1, b: 2 }, __j_macros);
    let yields = &body[1]["expression"];
    assert_eq!(yields["type"], "YieldExpression");
    assert_eq!(yields["delegate"], true);
    let call = &yields["argument"];
    assert_eq!(call["callee"]["object"]["name"], "__j_macros");
    assert_eq!(call["callee"]["property"]["name"], "m");
    let args = &call["arguments"];
    assert_eq!(prop(&args[0], "a")["value"], serde_json::json!(1.0));
    // the missing argument falls back to the declared default
    assert_eq!(prop(&args[0], "b")["value"], serde_json::json!(2.0));
    assert_eq!(args[1]["name"], "__j_macros");
}

#[test]
fn lower_call_with_caller() {
    let source = "{% macro m() %}x{% endmacro %}{% call m() %}y{% endcall %}";
    let program = compile_json(source);
    let body = generate(&program);
    let call = &body[1]["expression"]["argument"];
    let caller = prop(&call["arguments"][0], "caller");
    assert_eq!(caller["type"], "FunctionExpression");
    assert_eq!(caller["generator"], true);
    assert_eq!(
        caller["body"]["body"][0]["expression"]["argument"]["value"],
        "y"
    );
}

#[test]
fn lower_block_renders_in_place() {
    let program = compile_json("{% block h %}x{% endblock %}");
    let body = generate(&program);
    // yield* (function* () { yield "x"; })();
    let yields = &body[0]["expression"];
    assert_eq!(yields["delegate"], true);
    let iife = &yields["argument"];
    assert_eq!(iife["type"], "CallExpression");
    assert_eq!(iife["arguments"], serde_json::json!([]));
    assert_eq!(iife["callee"]["type"], "FunctionExpression");
    assert_eq!(iife["callee"]["generator"], true);
    assert_eq!(
        iife["callee"]["body"]["body"][0]["expression"]["argument"]["value"],
        "x"
    );
}

#[test]
fn lower_filter_section() {
    let program = compile_json("{% filter upper %}x{% endfilter %}");
    let body = generate(&program);
    // yield* ctx.upper((function* () { yield "x"; })());
    let yields = &body[0]["expression"];
    assert_eq!(yields["delegate"], true);
    let call = &yields["argument"];
    assert_eq!(call["callee"]["property"]["name"], "upper");
    let inner = &call["arguments"][0];
    assert_eq!(inner["callee"]["generator"], true);
}

#[test]
fn lower_set_allocates_scope() {
    let program = compile_json("{% set x = 1 %}{{ x }}");
    let body = generate(&program);
    // let __j_ctx_1 = Object.assign({ x: __j_ctx_0.x }, __j_ctx_0);
    assert_eq!(body[0]["type"], "VariableDeclaration");
    assert_eq!(body[0]["declarations"][0]["id"]["name"], "__j_ctx_1");
    let init = &body[0]["declarations"][0]["init"];
    let seed = prop(&init["arguments"][0], "x");
    assert_eq!(seed["object"]["name"], "__j_ctx_0");
    // __j_ctx_1.x = 1;
    let assign = &body[1]["expression"];
    assert_eq!(assign["type"], "AssignmentExpression");
    assert_eq!(assign["left"]["object"]["name"], "__j_ctx_1");
    // yield __j_ctx_1.x;
    assert_eq!(body[2]["expression"]["argument"]["object"]["name"], "__j_ctx_1");
}

#[test]
fn lower_set_unpack_evaluates_once() {
    let program = compile_json("{% set a, b = pair %}");
    let body = generate(&program);
    // let __j_tmp_2 = __j_ctx_1.pair; then index assignments
    assert_eq!(body[1]["declarations"][0]["id"]["name"], "__j_tmp_2");
    let first = &body[2]["expression"];
    assert_eq!(first["right"]["object"]["name"], "__j_tmp_2");
    assert_eq!(first["right"]["computed"], true);
}

#[test]
fn lower_loc_carries_source_name() {
    let program = jingle::compile("{{ x }}", Some("t.html")).unwrap();
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["loc"]["source"], "t.html");
    let arg = &json["body"][0]["declaration"]["properties"][1]["value"]["body"]["body"][0]
        ["expression"]["argument"];
    assert_eq!(arg["loc"]["start"]["line"], 1);
    assert_eq!(arg["loc"]["start"]["column"], 3);
    assert_eq!(arg["loc"]["source"], "t.html");
}
