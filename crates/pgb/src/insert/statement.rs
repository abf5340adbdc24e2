use crate::ident::write_sanitized;
use crate::value::Param;
use std::fmt::Write as _;
use tokio_postgres::types::ToSql;

/// A rendered piece of SQL.
#[derive(Clone, Debug)]
enum Part {
    Raw(String),
    Param,
}

/// A generated statement: SQL text with `$1, $2, ...` placeholders and the
/// arguments to bind to them, in order.
///
/// Besides the final SQL, the statement remembers where each placeholder sits,
/// so [`Statement::raw_sql`] can substitute literals without scanning the text.
#[derive(Clone, Debug)]
pub struct Statement {
    sql: String,
    args: Vec<Param>,
    parts: Vec<Part>,
}

impl Statement {
    /// SQL text with numbered placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Arguments, where `args()[i]` binds to `$i+1`.
    pub fn args(&self) -> &[Param] {
        &self.args
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(Param::as_ref).collect()
    }

    /// Consume the statement into its `(sql, args)` pair.
    pub fn into_parts(self) -> (String, Vec<Param>) {
        (self.sql, self.args)
    }

    /// Render the SQL with every placeholder replaced by its argument literal.
    ///
    /// Strings are single-quoted but **not escaped**. The output is meant for
    /// logs and tests and must never be executed.
    pub fn raw_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut args = self.args.iter();
        for part in &self.parts {
            match part {
                Part::Raw(s) => out.push_str(s),
                Part::Param => {
                    if let Some(arg) = args.next() {
                        arg.write_debug_literal(&mut out);
                    }
                }
            }
        }
        out
    }
}

/// Accumulates SQL text and bound parameters while a statement is generated.
pub(crate) struct StatementWriter {
    parts: Vec<Part>,
    current: String,
    args: Vec<Param>,
}

impl StatementWriter {
    pub(crate) fn with_capacity(sql: usize, args: usize) -> Self {
        Self {
            parts: Vec::new(),
            current: String::with_capacity(sql),
            args: Vec::with_capacity(args),
        }
    }

    /// Append raw SQL.
    pub(crate) fn push(&mut self, sql: &str) -> &mut Self {
        self.current.push_str(sql);
        self
    }

    /// Append a quoted identifier.
    pub(crate) fn push_ident(&mut self, ident: &str) -> &mut Self {
        write_sanitized(&mut self.current, ident);
        self
    }

    /// Append a parameter's literal form (escaped, safe to execute).
    pub(crate) fn push_literal(&mut self, param: &Param) -> &mut Self {
        param.write_sql_literal(&mut self.current);
        self
    }

    /// Append a placeholder and bind its value.
    pub(crate) fn push_bind(&mut self, param: Param) -> &mut Self {
        self.flush();
        self.parts.push(Part::Param);
        self.args.push(param);
        self
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.parts.push(Part::Raw(std::mem::take(&mut self.current)));
        }
    }

    /// Render placeholders and freeze the statement.
    pub(crate) fn finish(mut self) -> Statement {
        self.flush();

        let cap = self.parts.iter().fold(0, |cap, part| match part {
            Part::Raw(s) => cap + s.len(),
            Part::Param => cap + 4,
        });
        let mut sql = String::with_capacity(cap);
        let mut idx: usize = 0;
        for part in &self.parts {
            match part {
                Part::Raw(s) => sql.push_str(s),
                Part::Param => {
                    idx += 1;
                    // Writing to a String cannot fail.
                    let _ = write!(sql, "${idx}");
                }
            }
        }

        Statement {
            sql,
            args: self.args,
            parts: self.parts,
        }
    }
}
