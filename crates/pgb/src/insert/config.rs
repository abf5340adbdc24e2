use tracing::Level;

/// Options controlling validation and logging for [`InsertBuilder`](super::InsertBuilder).
#[derive(Debug, Clone)]
pub struct InsertOptions {
    /// Reject rows whose field map keys differ from the first row's.
    ///
    /// When disabled, a missing column binds NULL and extra keys are ignored.
    pub validate_columns: bool,
    /// Tracing event level for built statements.
    pub log_level: Level,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_log_sql_length: Option<usize>,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            validate_columns: true,
            log_level: Level::DEBUG,
            max_log_sql_length: Some(200),
        }
    }
}

impl InsertOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the per-row column check.
    pub fn validate_columns(mut self, enabled: bool) -> Self {
        self.validate_columns = enabled;
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_log_sql_length(mut self, len: usize) -> Self {
        self.max_log_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_log_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql<'s>(&self, sql: &'s str) -> std::borrow::Cow<'s, str> {
        match self.max_log_sql_length {
            Some(max) if sql.len() > max => {
                let mut end = max;
                while end > 0 && !sql.is_char_boundary(end) {
                    end -= 1;
                }
                format!("{}...", &sql[..end]).into()
            }
            _ => sql.into(),
        }
    }
}
