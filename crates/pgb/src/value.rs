//! Field values and bound parameters.
//!
//! A record is turned into a [`FieldMap`] by the caller's mapper. Each entry is a
//! [`Value`], which tells the builder how to emit that column:
//!
//! - [`Value::Param`]: bound as `$n` and appended to the argument list
//! - [`Value::Raw`]: copied into the statement verbatim (not escaped!)
//! - [`Value::Excluded`]: `EXCLUDED."col"`, for `ON CONFLICT DO UPDATE` only
//! - [`Value::Null`]: SQL `NULL`
//!
//! # Example
//! ```ignore
//! use pgb::{fields, Value};
//!
//! let row = fields! {
//!     "username" => "alice",
//!     "age" => 30i32,
//!     "created_at" => Value::raw("now()"),
//! };
//! ```

use bytes::BytesMut;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// Field name to value mapping produced for every record.
///
/// Iteration order does not matter: the builder always sorts keys.
pub type FieldMap = HashMap<String, Value>;

/// Build a [`FieldMap`] from `key => value` pairs.
///
/// Values go through `Value::from`, so plain Rust values, `Option`s, and
/// explicit [`Value`]s can be mixed.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::FieldMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FieldMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        map
    }};
}

/// How a parameter is spelled when it has to appear as a literal.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Literal {
    /// Rendered inside single quotes.
    Text(String),
    /// Rendered as-is.
    Plain(String),
    Null,
}

/// A clone-friendly bound parameter.
///
/// The value is kept behind an `Arc<dyn ToSql>` so it can be passed straight to
/// `tokio-postgres`; its literal form is captured at construction for
/// `ON CONFLICT DO UPDATE` assignments and debug rendering.
#[derive(Clone)]
pub struct Param {
    value: Arc<dyn ToSql + Send + Sync>,
    literal: Literal,
}

impl Param {
    /// Create a parameter whose literal form is its `Display` output.
    pub fn new<T>(value: T) -> Self
    where
        T: ToSql + fmt::Display + Send + Sync + 'static,
    {
        let literal = Literal::Plain(value.to_string());
        Param {
            value: Arc::new(value),
            literal,
        }
    }

    /// Create a parameter whose literal form is single-quoted.
    pub fn text<T>(value: T) -> Self
    where
        T: ToSql + fmt::Display + Send + Sync + 'static,
    {
        let literal = Literal::Text(value.to_string());
        Param {
            value: Arc::new(value),
            literal,
        }
    }

    fn float<T>(value: T) -> Self
    where
        T: ToSql + fmt::Display + Into<f64> + Copy + Send + Sync + 'static,
    {
        let wide: f64 = value.into();
        let literal = if wide.is_nan() {
            Literal::Text("NaN".to_string())
        } else if wide.is_infinite() {
            let name = if wide > 0.0 { "Infinity" } else { "-Infinity" };
            Literal::Text(name.to_string())
        } else {
            Literal::Plain(value.to_string())
        };
        Param {
            value: Arc::new(value),
            literal,
        }
    }

    /// A NULL parameter that binds to a column of any type.
    pub fn null() -> Self {
        Param {
            value: Arc::new(SqlNull),
            literal: Literal::Null,
        }
    }

    /// Check if this parameter binds SQL NULL.
    pub fn is_null(&self) -> bool {
        self.literal == Literal::Null
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.value as &(dyn ToSql + Sync)
    }

    /// Literal for SQL that will be executed: single quotes inside text are doubled.
    pub(crate) fn write_sql_literal(&self, out: &mut String) {
        match &self.literal {
            Literal::Text(s) => {
                out.push('\'');
                for ch in s.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
                out.push('\'');
            }
            Literal::Plain(s) => out.push_str(s),
            Literal::Null => out.push_str("NULL"),
        }
    }

    /// Literal for debug output only. Text is quoted but never escaped.
    pub(crate) fn write_debug_literal(&self, out: &mut String) {
        match &self.literal {
            Literal::Text(s) => {
                out.push('\'');
                out.push_str(s);
                out.push('\'');
            }
            Literal::Plain(s) => out.push_str(s),
            Literal::Null => out.push_str("NULL"),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut literal = String::new();
        self.write_debug_literal(&mut literal);
        f.debug_tuple("Param").field(&literal).finish()
    }
}

/// Binds NULL regardless of the target column type.
#[derive(Debug)]
struct SqlNull;

impl ToSql for SqlNull {
    fn to_sql(
        &self,
        _ty: &Type,
        _out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// A single field value.
#[derive(Clone, Debug)]
pub enum Value {
    /// Bound parameter (`$n`).
    Param(Param),
    /// Raw SQL expression, inserted verbatim.
    ///
    /// **Warning**: This bypasses parameterization. Only use with trusted SQL.
    Raw(String),
    /// Column whose proposed value is referenced as `EXCLUDED."col"`.
    Excluded(String),
    /// SQL `NULL`.
    Null,
}

impl Value {
    /// Bound parameter rendered via `Display` in literal positions.
    pub fn param<T>(value: T) -> Self
    where
        T: ToSql + fmt::Display + Send + Sync + 'static,
    {
        Value::Param(Param::new(value))
    }

    /// Raw SQL expression, e.g. `now()`.
    pub fn raw(expr: impl Into<String>) -> Self {
        Value::Raw(expr.into())
    }

    /// `EXCLUDED.<column>` reference for conflict updates.
    pub fn excluded(column: impl Into<String>) -> Self {
        Value::Excluded(column.into())
    }

    /// Check if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Param(p) => p.is_null(),
            Value::Raw(_) | Value::Excluded(_) => false,
        }
    }
}

impl From<Param> for Value {
    fn from(param: Param) -> Self {
        Value::Param(param)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Param(Param::text(value.to_string()))
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::Param(Param::text(value.clone()))
    }
}

/// Types whose SQL literal is a bare token (integers, booleans).
macro_rules! impl_from_plain {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Param(Param::new(value))
                }
            }
        )*
    };
}

/// Types whose SQL literal is a quoted string.
macro_rules! impl_from_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Param(Param::text(value))
                }
            }
        )*
    };
}

impl_from_plain!(bool, i16, i32, i64);

/// Floats whose SQL literal is a bare number, or a quoted special value
/// (`'NaN'`, `'Infinity'`, `'-Infinity'`) when not finite.
macro_rules! impl_from_float {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Param(Param::float(value))
                }
            }
        )*
    };
}

impl_from_float!(f32, f64);

impl_from_text!(
    String,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_literal(value: Value) -> String {
        let Value::Param(p) = value else {
            panic!("expected a bound parameter");
        };
        let mut out = String::new();
        p.write_sql_literal(&mut out);
        out
    }

    #[test]
    fn strings_are_quoted() {
        assert_eq!(sql_literal(Value::from("abc")), "'abc'");
        assert_eq!(sql_literal(Value::from(String::from("abc"))), "'abc'");
    }

    #[test]
    fn sql_literal_doubles_single_quotes() {
        assert_eq!(sql_literal(Value::from("it's")), "'it''s'");
    }

    #[test]
    fn debug_literal_is_not_escaped() {
        let Value::Param(p) = Value::from("it's") else {
            panic!("expected a bound parameter");
        };
        let mut out = String::new();
        p.write_debug_literal(&mut out);
        assert_eq!(out, "'it's'");
    }

    #[test]
    fn numbers_and_bools_are_bare() {
        assert_eq!(sql_literal(Value::from(1i32)), "1");
        assert_eq!(sql_literal(Value::from(-7i64)), "-7");
        assert_eq!(sql_literal(Value::from(1.5f64)), "1.5");
        assert_eq!(sql_literal(Value::from(true)), "true");
        assert_eq!(sql_literal(Value::param(42i64)), "42");
    }

    #[test]
    fn non_finite_floats_are_quoted() {
        assert_eq!(sql_literal(Value::from(f64::NAN)), "'NaN'");
        assert_eq!(sql_literal(Value::from(f64::INFINITY)), "'Infinity'");
        assert_eq!(sql_literal(Value::from(f32::NEG_INFINITY)), "'-Infinity'");
        assert_eq!(sql_literal(Value::from(2.5f32)), "2.5");
    }

    #[test]
    fn typed_text_values_are_quoted() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(sql_literal(Value::from(date)), "'2024-01-02'");

        let id = uuid::Uuid::nil();
        assert_eq!(
            sql_literal(Value::from(id)),
            "'00000000-0000-0000-0000-000000000000'"
        );

        let json = serde_json::json!({"k": 1});
        assert_eq!(sql_literal(Value::from(json)), r#"'{"k":1}'"#);
    }

    #[test]
    fn option_none_is_null() {
        assert!(matches!(Value::from(None::<i32>), Value::Null));
        assert!(matches!(Value::from(Some(3i32)), Value::Param(_)));
        assert!(Value::from(None::<String>).is_null());
    }

    #[test]
    fn null_param_accepts_any_type() {
        let p = Param::null();
        assert!(p.is_null());
        assert!(<SqlNull as ToSql>::accepts(&Type::INT4));
        assert!(<SqlNull as ToSql>::accepts(&Type::TEXT));
        assert_eq!(format!("{p:?}"), r#"Param("NULL")"#);
    }

    #[test]
    fn fields_macro_builds_map() {
        let map = crate::fields! {
            "a" => "x",
            "b" => 2i64,
            "c" => Value::raw("now()"),
            "d" => None::<i32>,
        };
        assert_eq!(map.len(), 4);
        assert!(matches!(map.get("c"), Some(Value::Raw(s)) if s == "now()"));
        assert!(matches!(map.get("d"), Some(Value::Null)));

        let empty: FieldMap = crate::fields! {};
        assert!(empty.is_empty());
    }
}
