use jingle::{compile, Plugin};

#[test]
fn compile_empty() {
    compile("", None).unwrap();
}

#[test]
fn compile_raw() {
    compile("lorem ipsum dolor sit amet", None).unwrap();
}

#[test]
fn compile_comment() {
    compile("lorem {# ipsum dolor #} sit amet", None).unwrap();
}

#[test]
fn compile_inline_expr() {
    compile("lorem {{ ipsum.dolor | fn | another }} sit amet", None).unwrap();
}

#[test]
fn compile_inline_expr_operators() {
    let tests = [
        "a + b * c - d / e % f",
        "a ** b ** c",
        "a == b != c < d <= e > f >= g",
        "fn(a, b)(c).d",
        "(a | upper)(b)",
        "\"a string\" == other",
        "'single' != 'double'",
        "d.items().0",
    ];
    for test in tests {
        compile(&format!("{{{{ {test} }}}}"), None).unwrap();
    }
}

#[test]
fn compile_if_statement() {
    compile("lorem {% if ipsum %} dolor {% endif %} sit", None).unwrap();
}

#[test]
fn compile_if_elif_else_statement() {
    compile(
        "lorem {% if a %} b {% elif c %} d {% else %} e {% endif %} amet",
        None,
    )
    .unwrap();
}

#[test]
fn compile_nested_if_statement() {
    compile(
        "{% if a %}{% if b %}x{% else %}y{% endif %}{% endif %}",
        None,
    )
    .unwrap();
}

#[test]
fn compile_for_statement() {
    compile("lorem {% for ipsum in dolor %}{{ ipsum }}{% endfor %}", None).unwrap();
}

#[test]
fn compile_for_statement_unpack() {
    compile("{% for k, v in d.items() %}{{ k }}={{ v }}{% endfor %}", None).unwrap();
}

#[test]
fn compile_for_statement_filter_and_else() {
    compile(
        "{% for i in xs if i > 2 %}{{ i }}{% else %}none{% endfor %}",
        None,
    )
    .unwrap();
}

#[test]
fn compile_macro_and_call() {
    compile(
        "{% macro m(a, b=2) %}{{ a + b }}{% endmacro %}{% call m(1) %}x{% endcall %}",
        None,
    )
    .unwrap();
}

#[test]
fn compile_block() {
    compile("{% block header %}lorem{% endblock %} ipsum", None).unwrap();
}

#[test]
fn compile_filter_section() {
    compile("{% filter upper %}lorem{% endfilter %}", None).unwrap();
}

#[test]
fn compile_set() {
    compile("{% set width = cols * 8 %}{{ width }}", None).unwrap();
    compile("{% set a, b = pair %}{{ a }}{{ b }}", None).unwrap();
}

#[test]
fn compile_extends() {
    compile("{% extends base %}{% block body %}x{% endblock %}", None).unwrap();
}

#[test]
fn compile_err_display() {
    let err = compile("lorem {{ ipsum | }}", None).unwrap_err();
    assert_eq!(err.to_string(), "(1:17) expected an expression");
    assert_eq!(err.offset(), 17);
    let location = err.location();
    assert_eq!(location.start.line, 1);
    assert_eq!(location.start.column, 17);
    assert_eq!(location.end.offset, 19);
}

#[test]
fn compile_err_display_second_line() {
    let err = compile("a\n{% if %}", None).unwrap_err();
    assert_eq!(err.to_string(), "(2:6) expected an expression");
}

#[test]
fn compile_err_pretty() {
    let err = compile("lorem {{ ipsum | }}", None).unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "
  --> 1:17
   |
 1 | lorem {{ ipsum | }}
   |                  ^^ expected an expression
"
    );
}

#[test]
fn compile_err_pretty_named() {
    let err = compile("lorem {{ ipsum | }}", Some("page.html")).unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "
  --> page.html:1:17
   |
 1 | lorem {{ ipsum | }}
   |                  ^^ expected an expression
"
    );
}

#[test]
fn compile_err_eof() {
    let err = compile("text {%", None).unwrap_err();
    assert_eq!(err.to_string(), "(1:7) expected identifier, found EOF");
}

#[test]
fn compile_err_unclosed() {
    let err = compile("{% if cond %}lorem", None).unwrap_err();
    assert_eq!(err.to_string(), "(1:0) unclosed `if` block");
}

#[test]
fn compile_err_mismatched_end() {
    let err = compile("{% for i in xs %}{% endif %}", None).unwrap_err();
    assert_eq!(err.to_string(), "(1:17) unexpected `endif` block");
}

#[test]
fn plugin_filters_ids() {
    let plugin = Plugin::new(|id: &str| id.ends_with(".html"));
    assert_eq!(plugin.name(), "jingle");

    assert!(plugin.transform("lorem", "mod.js").is_none());

    let program = plugin
        .transform("Hello {{ name }}!", "hello.html")
        .unwrap()
        .unwrap();
    let json = serde_json::to_value(&program).unwrap();
    assert_eq!(json["loc"]["source"], "hello.html");

    let err = plugin.transform("{{", "broken.html").unwrap().unwrap_err();
    assert_eq!(err.offset(), 2);
}
