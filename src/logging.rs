//! Statement logging.
//!
//! A [`LogConfig`] is built once at startup and shared by every statement
//! created through the same [`StatementFactory`](crate::StatementFactory).
//! While its check function returns `true`, statements remember the values
//! bound to them and hand them to the logger on each executing operation.

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use crate::value::{SqlType, Value};

/// Log target used by [`LogConfig::log_facade`].
pub const STATEMENT_TARGET: &str = "sqlx_named_params::statement";

/// Receives one [`StatementLog`] per logged operation.
pub type StatementLogger = dyn Fn(&StatementLog<'_>) + Send + Sync;

/// Decides whether logging data is collected at all. Consulted on nearly
/// every operation, so it has to be cheap.
pub type LogCheck = dyn Fn() -> bool + Send + Sync;

/// What a logged operation hands to the [`StatementLogger`].
#[derive(Debug)]
pub struct StatementLog<'a> {
    /// Name of the operation, e.g. `execute()` or `add_batch() #2`.
    pub operation: &'a str,
    /// The statement text with the named placeholders.
    pub statement: &'a str,
    /// Sorted `name [TYPE]: value` entries of the current bindings.
    pub values: &'a [String],
    /// Present only when the config asks for backtraces.
    pub backtrace: Option<&'a Backtrace>,
}

/// The last value bound to a parameter, as far as logging is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundValue {
    pub name: String,
    pub sql_type: Option<SqlType>,
    pub text: String,
}

impl BoundValue {
    pub fn new(name: impl Into<String>, value: &Value) -> Self {
        Self {
            name: name.into(),
            sql_type: value.sql_type(),
            text: value.log_text(),
        }
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql_type = self.sql_type.map_or("NULL", |sql_type| sql_type.name());
        write!(f, "{} [{}]: {}", self.name, sql_type, self.text)
    }
}

/// Logger, check function and backtrace flag for statement logging.
#[derive(Clone)]
pub struct LogConfig {
    logger: Option<Arc<StatementLogger>>,
    check: Arc<LogCheck>,
    add_backtrace: bool,
}

impl LogConfig {
    /// Logging that never collects anything.
    pub fn disabled() -> Self {
        Self {
            logger: None,
            check: Arc::new(|| false),
            add_backtrace: false,
        }
    }

    /// Custom logger and check function.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlx_named_params::LogConfig;
    ///
    /// let config = LogConfig::new(
    ///     |log| println!("{} {} {:?}", log.operation, log.statement, log.values),
    ///     || true,
    ///     false,
    /// );
    /// assert!(config.is_enabled());
    /// ```
    pub fn new<L, C>(logger: L, check: C, add_backtrace: bool) -> Self
    where
        L: Fn(&StatementLog<'_>) + Send + Sync + 'static,
        C: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            logger: Some(Arc::new(logger)),
            check: Arc::new(check),
            add_backtrace,
        }
    }

    /// Forwards statement logs to the `log` facade at debug level, under the
    /// [`STATEMENT_TARGET`] target. Collection is on whenever that target is
    /// enabled for debug output.
    pub fn log_facade(add_backtrace: bool) -> Self {
        Self::new(
            |entry| match entry.backtrace {
                Some(backtrace) => log::debug!(
                    target: STATEMENT_TARGET,
                    "{}: {} {:?}\n{}",
                    entry.operation,
                    entry.statement,
                    entry.values,
                    backtrace
                ),
                None => log::debug!(
                    target: STATEMENT_TARGET,
                    "{}: {} {:?}",
                    entry.operation,
                    entry.statement,
                    entry.values
                ),
            },
            || log::log_enabled!(target: STATEMENT_TARGET, log::Level::Debug),
            add_backtrace,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.logger.is_some() && (self.check)()
    }

    pub fn add_backtrace(&self) -> bool {
        self.add_backtrace
    }

    /// Formats, sorts and hands the values to the logger.
    pub(crate) fn emit<'a>(
        &self,
        operation: &str,
        statement: &str,
        values: impl IntoIterator<Item = &'a BoundValue>,
    ) {
        let Some(logger) = &self.logger else {
            return;
        };
        let mut values: Vec<String> = values.into_iter().map(ToString::to_string).collect();
        values.sort();
        let backtrace = self.add_backtrace.then(Backtrace::force_capture);
        logger(&StatementLog {
            operation,
            statement,
            values: &values,
            backtrace: backtrace.as_ref(),
        });
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl fmt::Debug for LogConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogConfig")
            .field("logger", &self.logger.is_some())
            .field("add_backtrace", &self.add_backtrace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_disabled() {
        let config = LogConfig::disabled();
        assert!(!config.is_enabled());
        assert!(!LogConfig::default().is_enabled());
    }

    #[test]
    fn test_check_is_consulted() {
        let config = LogConfig::new(|_| {}, || false, false);
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_bound_value_format() {
        let value = BoundValue::new("key", &Value::from("abc"));
        assert_eq!(value.to_string(), "key [VARCHAR]: abc");
        let value = BoundValue::new("missing", &Value::Null(None));
        assert_eq!(value.to_string(), "missing [NULL]: NULL");
    }

    #[test]
    fn test_emit_sorts_values() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = LogConfig::new(
            move |log| {
                assert!(log.backtrace.is_none());
                sink.lock().unwrap().push((
                    log.operation.to_owned(),
                    log.statement.to_owned(),
                    log.values.to_vec(),
                ));
            },
            || true,
            false,
        );
        let values = [
            BoundValue::new("b", &Value::from(2)),
            BoundValue::new("a", &Value::from(1)),
        ];
        config.emit("execute()", "SELECT :a, :b", &values);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "execute()");
        assert_eq!(seen[0].1, "SELECT :a, :b");
        assert_eq!(seen[0].2, vec!["a [INTEGER]: 1", "b [INTEGER]: 2"]);
    }

    #[test]
    fn test_emit_with_backtrace() {
        let captured = Arc::new(Mutex::new(false));
        let sink = Arc::clone(&captured);
        let config = LogConfig::new(
            move |log| *sink.lock().unwrap() = log.backtrace.is_some(),
            || true,
            true,
        );
        config.emit("execute()", "SELECT 1", []);
        assert!(*captured.lock().unwrap());
    }
}
