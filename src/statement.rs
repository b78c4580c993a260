use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, AbortRegistration, Abortable};

use crate::error::Error;
use crate::index::ParameterIndex;
use crate::logging::{BoundValue, LogConfig};
use crate::metadata::{ParameterInfo, ParameterMetaData};
use crate::value::{SqlType, Value};

/// A statement that only knows positional parameters.
///
/// This is what a [`NamedStatement`] binds through. Positions are 1-based.
pub trait PositionalStatement {
    /// Number of positional placeholders in the statement.
    fn parameter_count(&self) -> usize;

    /// Sets the value at `position`.
    ///
    /// # Errors
    ///
    /// [`Error::PositionOutOfRange`] if `position` is not in
    /// `1..=parameter_count()`; implementations may add their own.
    fn set_value(&mut self, position: usize, value: &Value) -> crate::Result<()>;

    /// Whether `position` currently holds a value.
    fn is_set(&self, position: usize) -> bool;

    fn clear_parameters(&mut self);

    /// Adds the current values as one row of the batch.
    fn add_batch(&mut self) -> crate::Result<()>;

    fn clear_batch(&mut self);
}

/// Cancels whatever a statement is running right now.
///
/// Cloneable and usable from any thread or task. Cancelling while nothing
/// runs does nothing, and does not affect the next operation.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    running: Arc<Mutex<Option<AbortHandle>>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        if let Ok(mut running) = self.running.lock() {
            if let Some(handle) = running.take() {
                handle.abort();
            }
        }
    }

    fn register(&self) -> AbortRegistration {
        let (handle, registration) = AbortHandle::new_pair();
        if let Ok(mut running) = self.running.lock() {
            *running = Some(handle);
        }
        registration
    }

    fn finish(&self) {
        if let Ok(mut running) = self.running.lock() {
            *running = None;
        }
    }
}

/// A prepared statement with named placeholders.
///
/// Created from SQL text such as `SELECT * FROM t WHERE a = :a OR b = :a`.
/// The text is rewritten to positional form once; afterwards a value bound to
/// `a` is set at every position `a` occupies.
///
/// Not meant for concurrent use; only the [`CancelHandle`] crosses threads.
pub struct NamedStatement<S> {
    pub(crate) source: String,
    pub(crate) inner: S,
    pub(crate) index: ParameterIndex,
    pub(crate) log: Arc<LogConfig>,
    pub(crate) values: HashMap<String, BoundValue>,
    pub(crate) batch_counter: usize,
    pub(crate) cancel: CancelHandle,
}

impl<S: PositionalStatement> NamedStatement<S> {
    pub(crate) fn from_parts(
        source: String,
        inner: S,
        index: ParameterIndex,
        log: Arc<LogConfig>,
    ) -> Self {
        Self {
            source,
            inner,
            index,
            log,
            values: HashMap::new(),
            batch_counter: 0,
            cancel: CancelHandle::default(),
        }
    }

    /// Binds `value` to every position of `name`, in ascending order.
    ///
    /// `name` may be given with or without its leading colon.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownParameter`] if the statement has no placeholder `name`,
    /// [`Error::PositionOutOfRange`] if one of its positions is beyond the
    /// positional statement; nothing is bound in either case. Errors of the
    /// positional statement are passed through.
    pub fn bind<V: Into<Value>>(&mut self, name: &str, value: V) -> crate::Result<()> {
        let value = value.into();
        let positions = self.index.positions(name)?;
        let count = self.inner.parameter_count();
        if let Some(&position) = positions
            .iter()
            .find(|&&position| position == 0 || position > count)
        {
            return Err(Error::PositionOutOfRange { position, count });
        }
        for &position in positions {
            self.inner.set_value(position, &value)?;
        }
        log::trace!("bound '{}' at positions {:?}", name, positions);
        self.record(name, &value);
        Ok(())
    }

    /// Binds a typed SQL NULL to every position of `name`.
    pub fn bind_null(&mut self, name: &str, sql_type: SqlType) -> crate::Result<()> {
        self.bind(name, Value::Null(Some(sql_type)))
    }

    pub fn clear_parameters(&mut self) {
        self.inner.clear_parameters();
        self.values.clear();
    }

    /// Adds the current values as a row of the batch.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundPlaceholder`] if a placeholder has no value.
    pub fn add_batch(&mut self) -> crate::Result<()> {
        self.ensure_bound()?;
        self.log_operation(&format!("add_batch() #{}", self.batch_counter));
        self.inner.add_batch()?;
        self.batch_counter += 1;
        Ok(())
    }

    pub fn clear_batch(&mut self) {
        self.inner.clear_batch();
        self.batch_counter = 0;
    }

    /// Rows added since the batch was last executed or cleared.
    pub fn batch_size(&self) -> usize {
        self.batch_counter
    }

    /// The statement text with the named placeholders.
    pub fn source_statement(&self) -> &str {
        &self.source
    }

    pub fn parameter_index(&self) -> &ParameterIndex {
        &self.index
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.index.names().collect()
    }

    /// Positions of `name` in the rewritten statement.
    pub fn parameter_indexes(&self, name: &str) -> crate::Result<&[usize]> {
        self.index.positions(name)
    }

    /// Metadata per parameter name, given what is known per position.
    pub fn parameter_metadata(&self, parameters: Vec<ParameterInfo>) -> ParameterMetaData<'_> {
        ParameterMetaData::new(&self.index, parameters)
    }

    pub fn is_logging_enabled(&self) -> bool {
        self.log.is_enabled()
    }

    /// Handle to cancel the running operation from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub(crate) fn ensure_bound(&self) -> crate::Result<()> {
        for (name, positions) in self.index.iter() {
            if positions.iter().any(|&position| !self.inner.is_set(position)) {
                return Err(Error::UnboundPlaceholder(name.to_owned()));
            }
        }
        Ok(())
    }

    pub(crate) fn log_operation(&self, operation: &str) {
        if self.log.is_enabled() {
            self.log.emit(operation, &self.source, self.values.values());
        }
    }

    /// Runs `operation` so that the [`CancelHandle`] can abort it.
    pub(crate) async fn cancellable<F, T>(&self, operation: F) -> crate::Result<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let registration = self.cancel.register();
        let outcome = Abortable::new(operation, registration).await;
        self.cancel.finish();
        match outcome {
            Ok(result) => Ok(result?),
            Err(_aborted) => {
                self.log_operation("cancel()");
                Err(Error::Cancelled)
            }
        }
    }

    fn record(&mut self, name: &str, value: &Value) {
        if !self.log.is_enabled() {
            return;
        }
        let name = name.strip_prefix(':').unwrap_or(name);
        self.values
            .insert(name.to_owned(), BoundValue::new(name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::StatementFactory;
    use crate::logging::StatementLog;

    /// Positional statement that keeps every call for inspection.
    #[derive(Debug, Default)]
    struct RecordingStatement {
        pub sql: String,
        pub slots: Vec<Option<Value>>,
        pub calls: Vec<(usize, Value)>,
        pub batch: Vec<Vec<Value>>,
    }

    impl RecordingStatement {
        pub fn prepare(sql: &str, count: usize) -> crate::Result<Self> {
            Ok(Self {
                sql: sql.to_owned(),
                slots: vec![None; count],
                ..Self::default()
            })
        }
    }

    impl PositionalStatement for RecordingStatement {
        fn parameter_count(&self) -> usize {
            self.slots.len()
        }

        fn set_value(&mut self, position: usize, value: &Value) -> crate::Result<()> {
            let count = self.slots.len();
            let slot = position
                .checked_sub(1)
                .and_then(|i| self.slots.get_mut(i))
                .ok_or(Error::PositionOutOfRange { position, count })?;
            *slot = Some(value.clone());
            self.calls.push((position, value.clone()));
            Ok(())
        }

        fn is_set(&self, position: usize) -> bool {
            matches!(self.slots.get(position.wrapping_sub(1)), Some(Some(_)))
        }

        fn clear_parameters(&mut self) {
            self.slots.iter_mut().for_each(|slot| *slot = None);
        }

        fn add_batch(&mut self) -> crate::Result<()> {
            let row = self
                .slots
                .iter()
                .enumerate()
                .map(|(i, slot)| slot.clone().ok_or(Error::UnboundPosition(i + 1)))
                .collect::<crate::Result<Vec<_>>>()?;
            self.batch.push(row);
            Ok(())
        }

        fn clear_batch(&mut self) {
            self.batch.clear();
        }
    }

    type Logged = Arc<Mutex<Vec<(String, Vec<String>)>>>;

    fn logging_factory(enabled: bool) -> (StatementFactory, Logged) {
        let logged: Logged = Arc::default();
        let sink = Arc::clone(&logged);
        let config = LogConfig::new(
            move |log: &StatementLog<'_>| {
                sink.lock()
                    .unwrap()
                    .push((log.operation.to_owned(), log.values.to_vec()))
            },
            move || enabled,
            false,
        );
        (StatementFactory::new(config), logged)
    }

    fn prepare(sql: &str) -> NamedStatement<RecordingStatement> {
        StatementFactory::default()
            .prepare_with(sql, RecordingStatement::prepare)
            .unwrap()
    }

    #[test]
    fn test_prepare_rewrites_statement() {
        let statement = prepare("SELECT * FROM table WHERE key = :key");
        assert_eq!(statement.inner().sql, "SELECT * FROM table WHERE key = ?");
        assert_eq!(statement.inner().parameter_count(), 1);
        assert_eq!(statement.source_statement(), "SELECT * FROM table WHERE key = :key");
        assert_eq!(statement.parameter_indexes("key").unwrap(), &[1]);
    }

    #[test]
    fn test_bind_fans_out_in_ascending_order() {
        let mut statement = prepare("SELECT * FROM t WHERE a > :x AND b < :y AND c = :x");
        statement.bind("x", 10).unwrap();
        statement.bind(":y", "abc").unwrap();
        assert_eq!(
            statement.inner().calls,
            vec![
                (1, Value::Int(10)),
                (3, Value::Int(10)),
                (2, Value::Text("abc".to_owned())),
            ]
        );
        assert!(statement.ensure_bound().is_ok());
    }

    #[test]
    fn test_rebind_replaces_every_position() {
        let mut statement = prepare("UPDATE t SET a = :v WHERE b = :v OR c = :v");
        statement.bind("v", 1).unwrap();
        statement.bind("v", 2).unwrap();
        assert_eq!(
            statement.inner().slots,
            vec![Some(Value::Int(2)), Some(Value::Int(2)), Some(Value::Int(2))]
        );
    }

    #[test]
    fn test_bind_unknown_name() {
        let mut statement = prepare("SELECT * FROM table WHERE key = :key");
        let error = statement.bind(":value", "key").unwrap_err();
        assert_eq!(error.to_string(), "Parameter name ':value' unknown");
        assert!(statement.inner().calls.is_empty());
        statement.bind(":key", "key").unwrap();
        assert_eq!(statement.inner().calls.len(), 1);
    }

    #[test]
    fn test_bind_beyond_backend_sets_nothing() {
        let mut statement = StatementFactory::default()
            .prepare_with("SELECT * FROM t WHERE a = :x AND b = :x", |sql, _| {
                RecordingStatement::prepare(sql, 1)
            })
            .unwrap();
        let error = statement.bind("x", 5).unwrap_err();
        assert!(matches!(error, Error::PositionOutOfRange { position: 2, count: 1 }));
        assert!(statement.inner().calls.is_empty());
        assert!(!statement.inner().is_set(1));
    }

    #[test]
    fn test_bind_blank_name() {
        let mut statement = prepare("SELECT * FROM table WHERE key = :key");
        assert!(matches!(
            statement.bind("", 1),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            statement.bind(" ", 1),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_statement_without_params() {
        let mut statement = prepare("SELECT * FROM table");
        assert_eq!(statement.inner().sql, "SELECT * FROM table");
        assert!(statement.parameter_names().is_empty());
        let error = statement.bind(":key", "key").unwrap_err();
        assert!(matches!(error, Error::UnknownParameter(ref name) if name == ":key"));
    }

    #[test]
    fn test_bind_null() {
        let mut statement = prepare("SELECT * FROM t WHERE a = :a");
        statement.bind_null("a", SqlType::Integer).unwrap();
        assert_eq!(
            statement.inner().slots,
            vec![Some(Value::Null(Some(SqlType::Integer)))]
        );
    }

    #[test]
    fn test_unbound_placeholder() {
        let mut statement = prepare("SELECT * FROM t WHERE a = :a AND b = :b");
        statement.bind("a", 1).unwrap();
        let error = statement.ensure_bound().unwrap_err();
        assert!(matches!(error, Error::UnboundPlaceholder(ref name) if name == "b"));
        assert!(statement.add_batch().is_err());
    }

    #[test]
    fn test_clear_parameters() {
        let mut statement = prepare("SELECT * FROM t WHERE a = :a");
        statement.bind("a", 1).unwrap();
        statement.clear_parameters();
        assert!(statement.ensure_bound().is_err());
    }

    #[test]
    fn test_batch_counter() {
        let mut statement = prepare("INSERT INTO t SET a = :a, b = :a");
        statement.bind("a", 1).unwrap();
        statement.add_batch().unwrap();
        statement.bind("a", 2).unwrap();
        statement.add_batch().unwrap();
        assert_eq!(statement.batch_size(), 2);
        assert_eq!(
            statement.inner().batch,
            vec![
                vec![Value::Int(1), Value::Int(1)],
                vec![Value::Int(2), Value::Int(2)],
            ]
        );
        statement.clear_batch();
        assert_eq!(statement.batch_size(), 0);
        assert!(statement.inner().batch.is_empty());
    }

    #[test]
    fn test_logging_records_values() {
        let (factory, logged) = logging_factory(true);
        let mut statement = factory
            .prepare_with("SELECT * FROM t WHERE b = :b AND a = :a", RecordingStatement::prepare)
            .unwrap();
        statement.bind("b", "x").unwrap();
        statement.bind(":a", 1).unwrap();
        statement.bind("a", Value::blob(vec![0; 16])).unwrap();
        statement.add_batch().unwrap();

        let logged = logged.lock().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].0, "add_batch() #0");
        assert_eq!(logged[0].1, vec!["a [BLOB]: BLOB (16 bytes)", "b [VARCHAR]: x"]);
    }

    #[test]
    fn test_logging_disabled_keeps_nothing() {
        let (factory, logged) = logging_factory(false);
        let mut statement = factory
            .prepare_with("SELECT * FROM t WHERE a = :a", RecordingStatement::prepare)
            .unwrap();
        statement.bind("a", 1).unwrap();
        statement.add_batch().unwrap();
        assert!(!statement.is_logging_enabled());
        assert!(statement.values.is_empty());
        assert!(logged.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clear_parameters_drops_logged_values() {
        let (factory, _logged) = logging_factory(true);
        let mut statement = factory
            .prepare_with("SELECT * FROM t WHERE a = :a", RecordingStatement::prepare)
            .unwrap();
        statement.bind("a", 1).unwrap();
        assert_eq!(statement.values.len(), 1);
        statement.clear_parameters();
        assert!(statement.values.is_empty());
    }

    #[tokio::test]
    async fn test_cancellable_completes() {
        let statement = prepare("SELECT * FROM t WHERE a = :a");
        let result = statement.cancellable(async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancellable_passes_driver_errors() {
        let statement = prepare("SELECT * FROM t WHERE a = :a");
        let result = statement
            .cancellable(async { Err::<(), _>(sqlx::Error::RowNotFound) })
            .await;
        assert!(matches!(result, Err(Error::Database(sqlx::Error::RowNotFound))));
    }

    #[tokio::test]
    async fn test_cancel_from_other_task() {
        let (factory, logged) = logging_factory(true);
        let statement = factory
            .prepare_with("SELECT * FROM t WHERE a = :a", RecordingStatement::prepare)
            .unwrap();
        let handle = statement.cancel_handle();
        let (result, ()) = tokio::join!(
            statement.cancellable(futures::future::pending::<Result<(), sqlx::Error>>()),
            async move {
                tokio::task::yield_now().await;
                handle.cancel();
            }
        );
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(logged.lock().unwrap()[0].0, "cancel()");
    }

    #[tokio::test]
    async fn test_cancel_while_idle_is_ignored() {
        let statement = prepare("SELECT * FROM t WHERE a = :a");
        statement.cancel();
        let result = statement.cancellable(async { Ok::<_, sqlx::Error>(()) }).await;
        assert!(result.is_ok());
    }
}
