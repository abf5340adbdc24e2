//! Multi-row INSERT statement builder.
//!
//! [`InsertBuilder`] turns a slice of records into a single
//! `INSERT INTO ... VALUES (...), (...)` statement using a caller-supplied
//! mapper `Fn(&T) -> FieldMap`. Output is deterministic:
//!
//! - columns come from the first row's field map, sorted lexicographically
//! - placeholders are numbered `$1, $2, ...` across all rows and never reset
//! - `ON CONFLICT DO UPDATE SET` assignments are sorted by column
//!
//! The statement is generated once, on the first [`InsertBuilder::build`], and
//! cached for the life of the builder.
//!
//! # Example
//! ```ignore
//! use pgb::{fields, Value};
//!
//! let users = vec![User { name: "alice".into() }, User { name: "bob".into() }];
//!
//! let builder = pgb::insert("public.users", &users, |u| {
//!     fields! { "name" => &u.name, "created_at" => Value::raw("now()") }
//! })
//! .on_conflict_do_update("users_name_key", fields! { "updated_at" => Value::raw("now()") })
//! .returning(["id"]);
//!
//! let stmt = builder.build()?;
//! let rows = client.query(stmt.sql(), &stmt.params_ref()).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod statement;


pub use config::InsertOptions;
pub use statement::Statement;

use crate::error::{PgbError, PgbResult};
use crate::value::{FieldMap, Param, Value};
use statement::StatementWriter;
use std::sync::OnceLock;
use tracing::Level;

/// Builder for a multi-row `INSERT` with optional `ON CONFLICT` and `RETURNING`.
///
/// Configuration methods consume the builder, so they must all be applied
/// before the first [`build`](Self::build). `build` takes `&self` and may be
/// called from several threads: generation runs exactly once.
#[must_use]
pub struct InsertBuilder<'a, T, F> {
    table: String,
    rows: &'a [T],
    mapper: F,
    constraint: Option<String>,
    update: FieldMap,
    returning: Vec<String>,
    options: InsertOptions,
    built: OnceLock<PgbResult<Statement>>,
}

impl<'a, T, F> InsertBuilder<'a, T, F>
where
    F: Fn(&T) -> FieldMap,
{
    /// Create a builder for `table` (may be dotted, e.g. `public.users`).
    pub fn new(table: impl Into<String>, rows: &'a [T], mapper: F) -> Self {
        Self {
            table: table.into(),
            rows,
            mapper,
            constraint: None,
            update: FieldMap::new(),
            returning: Vec::new(),
            options: InsertOptions::default(),
            built: OnceLock::new(),
        }
    }

    /// `ON CONFLICT ON CONSTRAINT <constraint> DO NOTHING`.
    pub fn on_conflict_do_nothing(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self.update = FieldMap::new();
        self
    }

    /// `ON CONFLICT ON CONSTRAINT <constraint> DO UPDATE SET ...`.
    ///
    /// An empty `update` map renders `DO NOTHING`. Bound parameters in the map
    /// are written as literals, not placeholders.
    pub fn on_conflict_do_update(
        mut self,
        constraint: impl Into<String>,
        update: FieldMap,
    ) -> Self {
        self.constraint = Some(constraint.into());
        self.update = update;
        self
    }

    /// Set RETURNING columns, kept in the given order.
    pub fn returning<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning = cols.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the validation and logging options.
    pub fn options(mut self, options: InsertOptions) -> Self {
        self.options = options;
        self
    }

    /// Generate the statement on first call; later calls return the cached result.
    pub fn build(&self) -> PgbResult<&Statement> {
        self.built
            .get_or_init(|| self.generate())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Get the built SQL string.
    pub fn to_sql(&self) -> PgbResult<String> {
        Ok(self.build()?.sql().to_string())
    }

    /// Render the statement with literals in place of placeholders (debug only).
    ///
    /// See [`Statement::raw_sql`].
    pub fn raw_sql(&self) -> PgbResult<String> {
        Ok(self.build()?.raw_sql())
    }

    fn generate(&self) -> PgbResult<Statement> {
        let result = self.render();
        if let Err(err) = &result {
            tracing::warn!(
                target: "pgb.sql",
                table = %self.table,
                rows = self.rows.len(),
                error = %err,
                "failed to build INSERT"
            );
        }
        result
    }

    fn render(&self) -> PgbResult<Statement> {
        let maps: Vec<FieldMap> = self.rows.iter().map(|row| (self.mapper)(row)).collect();

        let Some(first) = maps.first() else {
            return Err(PgbError::EmptyRows {
                table: self.table.clone(),
            });
        };
        let mut columns: Vec<&str> = first.keys().map(String::as_str).collect();
        columns.sort_unstable();

        if self.options.validate_columns {
            check_columns(&columns, &maps)?;
        }

        let mut w = StatementWriter::with_capacity(
            64 + maps.len() * columns.len() * 6,
            maps.len() * columns.len(),
        );

        w.push("INSERT INTO ").push_ident(&self.table).push(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(col);
        }
        w.push(") VALUES ");

        for (r, map) in maps.iter().enumerate() {
            w.push(if r == 0 { "(" } else { ", (" });
            for (i, col) in columns.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                match map.get(*col) {
                    Some(Value::Raw(expr)) => {
                        w.push(expr);
                    }
                    Some(Value::Param(p)) => {
                        w.push_bind(p.clone());
                    }
                    Some(Value::Null) | None => {
                        w.push_bind(Param::null());
                    }
                    Some(Value::Excluded(_)) => {
                        return Err(PgbError::ExcludedInValues {
                            column: (*col).to_string(),
                        });
                    }
                }
            }
            w.push(")");
        }

        if let Some(constraint) = &self.constraint {
            self.write_conflict(&mut w, constraint);
        }

        if !self.returning.is_empty() {
            w.push(" RETURNING ");
            for (i, col) in self.returning.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.push_ident(col);
            }
        }

        let stmt = w.finish();
        self.log_built(&stmt, maps.len(), columns.len());
        Ok(stmt)
    }

    fn write_conflict(&self, w: &mut StatementWriter, constraint: &str) {
        w.push(" ON CONFLICT ON CONSTRAINT ")
            .push_ident(constraint)
            .push(" DO ");

        if self.update.is_empty() {
            w.push("NOTHING");
            return;
        }

        w.push("UPDATE SET ");
        let mut assignments: Vec<(&String, &Value)> = self.update.iter().collect();
        assignments.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (i, (col, value)) in assignments.into_iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_ident(col).push(" = ");
            match value {
                Value::Null => {
                    w.push("NULL");
                }
                Value::Excluded(excluded) => {
                    w.push("EXCLUDED.").push_ident(excluded);
                }
                Value::Raw(expr) => {
                    w.push(expr);
                }
                Value::Param(p) => {
                    w.push_literal(p);
                }
            }
        }
    }

    fn log_built(&self, stmt: &Statement, rows: usize, columns: usize) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.options.truncate_sql(stmt.sql());
        emit_at_level!(
            self.options.log_level,
            target: "pgb.sql",
            table = %self.table,
            rows,
            columns,
            args = stmt.args().len(),
            conflict = self.constraint.is_some(),
            sql = %sql,
            "built INSERT"
        );
    }
}

/// Every row must carry exactly the first row's keys.
fn check_columns(columns: &[&str], maps: &[FieldMap]) -> PgbResult<()> {
    for (row, map) in maps.iter().enumerate().skip(1) {
        let same = map.len() == columns.len() && columns.iter().all(|c| map.contains_key(*c));
        if !same {
            let mut found: Vec<String> = map.keys().cloned().collect();
            found.sort_unstable();
            return Err(PgbError::ColumnMismatch {
                row,
                expected: columns.iter().map(|c| (*c).to_string()).collect(),
                found,
            });
        }
    }
    Ok(())
}

/// Create an INSERT builder for `table` over `rows`.
///
/// # Example
/// ```ignore
/// let stmt = pgb::insert("users", &users, |u| pgb::fields! { "name" => &u.name });
/// ```
pub fn insert<'a, T, F>(
    table: impl Into<String>,
    rows: &'a [T],
    mapper: F,
) -> InsertBuilder<'a, T, F>
where
    F: Fn(&T) -> FieldMap,
{
    InsertBuilder::new(table, rows, mapper)
}
