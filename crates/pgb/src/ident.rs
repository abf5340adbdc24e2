//! SQL identifier quoting.
//!
//! Every table, column and constraint name passes through [`sanitize`] before it
//! is embedded in generated SQL. Unlike a validating parser, sanitizing never
//! fails: any input becomes a syntactically valid quoted identifier.
//!
//! - Dotted names (`schema.table`) are split on `.` and each part is quoted on
//!   its own; the separator stays unquoted.
//! - NUL characters are stripped.
//! - `"` is escaped as `""`.
//!
//! # Example
//! ```ignore
//! use pgb::ident::sanitize;
//!
//! assert_eq!(sanitize("public.users"), r#""public"."users""#);
//! assert_eq!(sanitize(r#"we"ird"#), r#""we""ird""#);
//! ```

use std::fmt;

/// Quote an identifier, treating every `.` as a part separator.
pub fn sanitize(ident: &str) -> String {
    // Two quotes per part plus the separators; escapes may add more.
    let parts = ident.matches('.').count() + 1;
    let mut out = String::with_capacity(ident.len() + parts * 2);
    write_sanitized(&mut out, ident);
    out
}

/// Append the quoted form of `ident` to `out`.
pub(crate) fn write_sanitized(out: &mut String, ident: &str) {
    for (i, part) in ident.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        write_part(out, part);
    }
}

fn write_part(out: &mut String, part: &str) {
    out.push('"');
    for ch in part.chars() {
        match ch {
            '\0' => {}
            '"' => out.push_str("\"\""),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// A borrowed identifier that displays in its quoted form.
///
/// Handy with `write!` and `format!`:
/// ```ignore
/// let sql = format!("SELECT * FROM {}", pgb::Ident("public.users"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'a>(pub &'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&sanitize(self.0))
    }
}
