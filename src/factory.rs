use std::sync::Arc;

use crate::builder::{parse_sql, IndexBuffer};
use crate::index::convert_index_buffer;
use crate::logging::LogConfig;
use crate::query::{PositionalQuery, PreparedQuery};
use crate::statement::{NamedStatement, PositionalStatement};

/// Creates statements that share one [`LogConfig`].
///
/// Build one at startup and keep it around; cloning is cheap.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{LogConfig, StatementFactory};
///
/// let factory = StatementFactory::new(LogConfig::log_facade(false));
/// let mut query = factory.prepare("SELECT * FROM users WHERE id = :id OR parent_id = :id")?;
/// query.bind("id", 42)?;
/// assert_eq!(query.sql(), "SELECT * FROM users WHERE id = ? OR parent_id = ?");
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementFactory {
    log: Arc<LogConfig>,
}

impl StatementFactory {
    pub fn new(log: LogConfig) -> Self {
        Self { log: Arc::new(log) }
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log
    }

    /// Prepares `sql` for MySQL through SQLx.
    ///
    /// # Errors
    ///
    /// Returns an error if `sql` is empty or blank.
    pub fn prepare(&self, sql: &str) -> crate::Result<PreparedQuery> {
        self.prepare_with(sql, |positional, count| {
            Ok(PositionalQuery::new(positional, count))
        })
    }

    /// Prepares `sql` with a custom positional backend.
    ///
    /// `prepare` receives the rewritten SQL text and its number of positional
    /// placeholders. Its errors are passed through unchanged.
    pub fn prepare_with<S, F>(&self, sql: &str, prepare: F) -> crate::Result<NamedStatement<S>>
    where
        S: PositionalStatement,
        F: FnOnce(&str, usize) -> crate::Result<S>,
    {
        let mut index_buffer = IndexBuffer::new();
        let positional = parse_sql(sql, &mut index_buffer)?;
        let index = convert_index_buffer(index_buffer);
        let count = index.placeholder_count();
        log::debug!(
            "prepared statement with {} placeholder(s) for {} name(s): {}",
            count,
            index.len(),
            positional
        );
        let inner = prepare(&positional, count)?;
        Ok(NamedStatement::from_parts(
            sql.to_owned(),
            inner,
            index,
            Arc::clone(&self.log),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_prepare_rejects_blank() {
        let factory = StatementFactory::default();
        assert!(matches!(
            factory.prepare(""),
            Err(Error::InvalidArgument { name: "sql", .. })
        ));
        assert!(matches!(
            factory.prepare(" "),
            Err(Error::InvalidArgument { name: "sql", .. })
        ));
    }

    #[test]
    fn test_prepare_with_passes_backend_errors() {
        let factory = StatementFactory::default();
        let result = factory.prepare_with("SELECT :a FROM t", |_, _| {
            Err::<PositionalQuery, _>(Error::Database(sqlx::Error::PoolClosed))
        });
        assert!(matches!(
            result,
            Err(Error::Database(sqlx::Error::PoolClosed))
        ));
    }

    #[test]
    fn test_statements_share_config() {
        let factory = StatementFactory::new(LogConfig::new(|_| {}, || true, false));
        let first = factory.prepare("SELECT * FROM t WHERE a = :a").unwrap();
        let second = factory.prepare("SELECT * FROM t WHERE b = :b").unwrap();
        assert!(first.is_logging_enabled());
        assert!(second.is_logging_enabled());
        assert!(Arc::ptr_eq(&first.log, &second.log));
    }
}
