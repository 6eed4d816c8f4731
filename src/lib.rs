//! A compiler front-end for Jinja-style templates targeting ES modules.
//!
//! # Overview
//!
//! ## Syntax
//!
//! - Expressions: `{{ user.name | capitalize }}`
//! - Conditionals: `{% if user.enabled %} ... {% elif ... %} ... {% endif %}`
//! - Loops: `{% for k, v in d.items() if v %} ... {% else %} ... {% endfor %}`
//! - Macros: `{% macro greet(name, mark=1) %} ... {% endmacro %}` and
//!   `{% call greet(user.name) %} ... {% endcall %}`
//! - Blocks: `{% block header %} ... {% endblock %}`
//! - Assignments: `{% set width = cols * 8 %}`
//! - Filter sections: `{% filter upper %} ... {% endfilter %}`
//! - Comments: `{# ... #}`
//!
//! ## Compiler
//!
//! [`compile`] turns a template source into an ES-style syntax tree: a
//! module whose default export is an object with a `generate` generator
//! yielding the rendered fragments, a `render(context)` function joining
//! them, and a `macros` table. Emitting concrete source text from the
//! returned tree is the job of a downstream printer; every node serializes
//! to ESTree-shaped JSON via [`serde`].
//!
//! ```
//! let program = jingle::compile("Hello {{ name }}!", Some("hello.html"))?;
//!
//! let json = serde_json::to_value(&program)?;
//! assert_eq!(json["type"], "Program");
//! assert_eq!(json["sourceType"], "module");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Errors display as `(line:column) message` and carry the offending
//! region; the alternate form renders an annotated source excerpt.
//!
//! ```
//! let err = jingle::compile("{% if %}", None).unwrap_err();
//! assert!(err.to_string().starts_with("(1:"));
//! ```
//!
//! # Features
//!
//! - **unicode** _(enabled by default)_ — Uses the
//!   [`unicode-width`][unicode_width] crate to size error annotations. If
//!   disabled then `.chars().count()` is used instead.

mod compile;
mod error;
mod types;

pub use crate::error::Error;
pub use crate::types::js;
pub use crate::types::span::{Position, Span};

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Compiles a template into the syntax tree of an ES module.
///
/// The optional `name` identifies the template in error messages and in
/// the `loc.source` field of the produced nodes.
pub fn compile(source: &str, name: Option<&str>) -> Result<js::Program> {
    let result = compile::module(source, name);
    match name {
        Some(name) => result.map_err(|e| e.with_template_name(name)),
        None => result,
    }
}

/// The build-tool integration boundary.
///
/// A plugin wraps an include/exclude filter over module ids. The caller
/// hands every `(source, id)` pair to [`transform`][Plugin::transform],
/// serializes the returned tree through its printer and reports syntax
/// errors at [`Error::offset`].
pub struct Plugin<F> {
    filter: F,
}

impl<F> Plugin<F>
where
    F: Fn(&str) -> bool,
{
    /// Construct a new plugin with the given id filter.
    pub fn new(filter: F) -> Self {
        Self { filter }
    }

    /// The plugin name to report to the build tool.
    pub fn name(&self) -> &'static str {
        "jingle"
    }

    /// Compiles `source` when `id` passes the filter, otherwise `None`.
    pub fn transform(&self, source: &str, id: &str) -> Option<Result<js::Program>> {
        if !(self.filter)(id) {
            return None;
        }
        Some(compile(source, Some(id)))
    }
}
