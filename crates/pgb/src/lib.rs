//! # pgb
//!
//! A small PostgreSQL INSERT statement builder.
//!
//! Given a slice of records and a mapper from a record to a [`FieldMap`], `pgb`
//! produces a deterministic multi-row `INSERT` with `$n` placeholders, the
//! matching argument list, and optional `ON CONFLICT ON CONSTRAINT` and
//! `RETURNING` clauses.
//!
//! ## Features
//!
//! - **Deterministic**: columns and conflict assignments are sorted, so the same
//!   input always yields byte-identical SQL
//! - **Safe identifiers**: every table/column/constraint name is quoted via [`sanitize`]
//! - **Explicit values**: [`Value`] distinguishes bound params, raw SQL,
//!   `EXCLUDED` references and `NULL`
//! - **Build once**: the statement is generated on first use and cached
//! - **tokio-postgres ready**: [`Statement::params_ref`] plugs into `Client::query`
//!
//! ```ignore
//! use pgb::{fields, Value};
//!
//! let stmt = pgb::insert("public.test", &rows, |r| {
//!     fields! { "a" => &r.a, "b" => &r.b, "c" => Value::raw("now()") }
//! })
//! .on_conflict_do_update(
//!     "constraint_name",
//!     fields! { "b" => Value::excluded("b"), "updated_at" => Value::raw("now()") },
//! )
//! .returning(["b", "c"]);
//!
//! let built = stmt.build()?;
//! client.query(built.sql(), &built.params_ref()).await?;
//! ```

pub mod error;
pub mod ident;
pub mod insert;
pub mod value;

pub use error::{PgbError, PgbResult};
pub use ident::{Ident, sanitize};
pub use insert::{InsertBuilder, InsertOptions, Statement, insert};
pub use value::{FieldMap, Param, Value};
