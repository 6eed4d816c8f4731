use std::cmp::max;

use crate::types::span::Span;

/// An error describing invalid template syntax.
///
/// Displays as `(<line>:<column>) <message>`; the alternate form (`{:#}`)
/// renders an annotated excerpt of the offending source line.
pub struct Error {
    /// What went wrong.
    reason: String,

    /// Optional template name.
    name: Option<String>,

    /// The location of the offending token.
    span: Span,

    /// Pretty information showing the location in the template of the
    /// reason for the error.
    pretty: Option<Pretty>,
}

impl Error {
    /// Constructs a new syntax error.
    pub(crate) fn syntax(reason: impl Into<String>, source: &str, span: Span) -> Self {
        Self {
            reason: reason.into(),
            name: None,
            span,
            pretty: Some(Pretty::build(source, span)),
        }
    }

    /// Attaches a template name to the error, if it is not already set.
    pub(crate) fn with_template_name(mut self, name: &str) -> Self {
        self.name.get_or_insert_with(|| name.into());
        self
    }

    /// The region of the template source that caused the error. The start
    /// position points at the first character of the offending token.
    pub fn location(&self) -> Span {
        self.span
    }

    /// The byte offset of the first offending character, as expected by
    /// build-tool error reporting.
    pub fn offset(&self) -> usize {
        self.span.start.offset
    }
}

impl std::error::Error for Error {}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("span", &self.span)
            .finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.pretty {
            Some(pretty) if f.alternate() => {
                pretty.fmt_with_reason(f, self.name.as_deref(), &self.reason)
            }
            _ => write!(
                f,
                "({}:{}) {}",
                self.span.start.line, self.span.start.column, self.reason
            ),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Pretty
////////////////////////////////////////////////////////////////////////////////

/// Holds the information necessary for prettily displaying the error.
struct Pretty {
    /// 1-based line number.
    line: usize,
    /// 0-based column number.
    column: usize,
    /// The number of characters to highlight after `column`.
    width: usize,
    /// The relevant section of template (a single line).
    text: String,
}

impl Pretty {
    fn build(source: &str, span: Span) -> Self {
        let text = source
            .split('\n')
            .nth(span.start.line - 1)
            .unwrap_or("")
            .to_owned();
        let fragment = &source[span.start.offset..span.end.offset];
        let fragment = fragment.split('\n').next().unwrap_or("");
        Self {
            line: span.start.line,
            column: span.start.column,
            width: max(1, display_width(fragment)),
            text,
        }
    }

    fn fmt_with_reason(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        name: Option<&str>,
        reason: &str,
    ) -> std::fmt::Result {
        let num = self.line.to_string();
        let pad = display_width(&num);
        let align = self.column + self.width;

        let z = "";
        let pipe = "|";
        let underline = "^".repeat(self.width);
        let text = &self.text;
        let location = match name {
            Some(name) => format!("{name}:{}:{}", self.line, self.column),
            None => format!("{}:{}", self.line, self.column),
        };

        write!(
            f,
            "\n {z:pad$}--> {location}\
             \n {z:pad$} {pipe}\
             \n {num:>} {pipe} {text}\
             \n {z:pad$} {pipe} {underline:>align$} {reason}\n",
        )
    }
}

#[cfg(feature = "unicode")]
fn display_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn display_width(s: &str) -> usize {
    s.chars().count()
}
