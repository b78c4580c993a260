use sqlx::mysql::{MySqlArguments, MySqlQueryResult};
use sqlx::query::Query;
use sqlx::{Acquire, Executor, MySql, TypeInfo};

use crate::error::Error;
use crate::factory::StatementFactory;
use crate::metadata::{ParameterInfo, ParameterMetaData};
use crate::statement::{NamedStatement, PositionalStatement};
use crate::value::Value;

/// Type alias for SQLx Query with MySQL arguments
pub type Q<'q> = Query<'q, MySql, MySqlArguments>;

/// A named-parameter statement executed through SQLx against MySQL.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_named_params::PreparedQuery;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let mut query = PreparedQuery::new(
///     "UPDATE users SET name = :name WHERE id = :id OR parent_id = :id",
/// )?;
/// query.bind("id", 42)?;
/// query.bind("name", "Jane Doe")?;
///
/// let result = query.execute(&pool).await?;
/// println!("Updated {} rows", result.rows_affected());
/// # Ok(())
/// # }
/// ```
pub type PreparedQuery = NamedStatement<PositionalQuery>;

/// Binds one [`Value`] to a SQLx `Query` or `QueryAs`.
macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            Value::Null(_) => $query.bind(None::<&str>),
            Value::Bool(v) => $query.bind(*v),
            Value::TinyInt(v) => $query.bind(*v),
            Value::SmallInt(v) => $query.bind(*v),
            Value::Int(v) => $query.bind(*v),
            Value::BigInt(v) => $query.bind(*v),
            Value::Float(v) => $query.bind(*v),
            Value::Double(v) => $query.bind(*v),
            Value::Decimal(v) => $query.bind(*v),
            Value::Text(v) | Value::Clob(v) => $query.bind(v.as_str()),
            Value::Bytes(v) | Value::Blob(v) => $query.bind(v.as_slice()),
            Value::Date(v) => $query.bind(*v),
            Value::Time(v) => $query.bind(*v),
            Value::Timestamp(v) => $query.bind(*v),
        }
    };
}

pub(crate) use bind_value;

/// Positional side of a [`PreparedQuery`]: the rewritten SQL, one value slot
/// per `?`, and the batched rows.
///
/// A fresh SQLx `Query` is built from these on every execution.
#[derive(Debug, Clone)]
pub struct PositionalQuery {
    sql: String,
    slots: Vec<Option<Value>>,
    batch: Vec<Vec<Value>>,
}

impl PositionalQuery {
    pub fn new(sql: impl Into<String>, parameter_count: usize) -> Self {
        Self {
            sql: sql.into(),
            slots: vec![None; parameter_count],
            batch: Vec::new(),
        }
    }

    /// The rewritten SQL text with positional placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values of the current slots, in position order.
    pub fn values(&self) -> crate::Result<Vec<&Value>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| slot.as_ref().ok_or(Error::UnboundPosition(i + 1)))
            .collect()
    }

    /// Builds a SQLx query with the current values bound.
    pub fn query(&self) -> crate::Result<Q<'_>> {
        Ok(bind_all(&self.sql, self.values()?))
    }

    pub fn batch(&self) -> &[Vec<Value>] {
        &self.batch
    }
}

fn bind_all<'q>(sql: &'q str, values: impl IntoIterator<Item = &'q Value>) -> Q<'q> {
    let mut query = sqlx::query::<MySql>(sql);
    for value in values {
        query = bind_value!(query, value);
    }
    query
}

impl PositionalStatement for PositionalQuery {
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
        Ok(())
    }

    fn is_set(&self, position: usize) -> bool {
        position
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .is_some_and(Option::is_some)
    }

    fn clear_parameters(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn add_batch(&mut self) -> crate::Result<()> {
        let row = self.values()?.into_iter().cloned().collect();
        self.batch.push(row);
        Ok(())
    }

    fn clear_batch(&mut self) {
        self.batch.clear();
    }
}

impl NamedStatement<PositionalQuery> {
    /// Creates a new `PreparedQuery` from an SQL template without statement
    /// logging.
    ///
    /// The SQL template can contain named placeholders in the format `:name`.
    /// Use a [`StatementFactory`] to share a logging configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is empty or blank.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sqlx_named_params::PreparedQuery;
    ///
    /// let mut query = PreparedQuery::new("SELECT * FROM users WHERE id = :id")?;
    /// query.bind("id", 42)?;
    /// assert_eq!(query.sql(), "SELECT * FROM users WHERE id = ?");
    /// # Ok::<(), sqlx_named_params::Error>(())
    /// ```
    pub fn new<T>(template: T) -> crate::Result<Self>
    where
        T: AsRef<str>,
    {
        StatementFactory::default().prepare(template.as_ref())
    }

    /// The rewritten SQL text that is sent to the server.
    pub fn sql(&self) -> &str {
        self.inner.sql()
    }

    /// Executes the statement with the current values.
    ///
    /// A fresh `Query` is constructed on each call. It works with any SQLx
    /// `Executor`, including `MySqlPool`, `Transaction`, and connections.
    ///
    /// # Errors
    ///
    /// [`Error::UnboundPlaceholder`] if a placeholder has no value,
    /// [`Error::Cancelled`] if the [`CancelHandle`](crate::CancelHandle)
    /// fired, [`Error::Database`] for anything the driver reports.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::MySqlPool;
    /// use sqlx_named_params::PreparedQuery;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let mut query = PreparedQuery::new("DELETE FROM users WHERE id = :id")?;
    /// query.bind("id", 42)?;
    ///
    /// let result = query.execute(&pool).await?;
    /// println!("Deleted {} rows", result.rows_affected());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<'e, E>(&self, executor: E) -> crate::Result<MySqlQueryResult>
    where
        E: Executor<'e, Database = MySql>,
    {
        self.ensure_bound()?;
        self.log_operation("execute()");
        let query = self.inner.query()?;
        self.cancellable(query.execute(executor)).await
    }

    /// Executes every batched row, in order, on one connection and returns
    /// the affected row count per row. The batch is empty afterwards, also
    /// when a row fails.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::MySqlPool;
    /// use sqlx_named_params::PreparedQuery;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let mut query = PreparedQuery::new("INSERT INTO tags SET name = :name, label = :name")?;
    /// for name in ["red", "green", "blue"] {
    ///     query.bind("name", name)?;
    ///     query.add_batch()?;
    /// }
    /// let counts = query.execute_batch(&pool).await?;
    /// assert_eq!(counts.len(), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute_batch<'c, A>(&mut self, connection: A) -> crate::Result<Vec<u64>>
    where
        A: Acquire<'c, Database = MySql>,
    {
        self.log_operation("execute_batch()");
        let rows = std::mem::take(&mut self.inner.batch);
        self.batch_counter = 0;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sql = self.inner.sql();
        self.cancellable(async move {
            let mut connection = connection.acquire().await?;
            let mut affected = Vec::with_capacity(rows.len());
            for row in &rows {
                let result = bind_all(sql, row).execute(&mut *connection).await?;
                affected.push(result.rows_affected());
            }
            Ok::<_, sqlx::Error>(affected)
        })
        .await
    }

    /// Lets the server prepare the rewritten statement and checks that it sees
    /// as many parameters as the rewrite produced.
    ///
    /// MySQL only reports the number of parameters, never their types or
    /// nullability. Every per-name query on the returned
    /// [`ParameterMetaData`] therefore answers `None` or
    /// [`Nullability::Unknown`](crate::Nullability::Unknown); use
    /// [`parameter_metadata`](NamedStatement::parameter_metadata) to supply
    /// what is known from elsewhere.
    ///
    /// # Errors
    ///
    /// [`Error::ParameterCountMismatch`] if the server counts a different
    /// number of parameters, [`Error::Database`] if it rejects the statement.
    pub async fn describe<'e, E>(&self, executor: E) -> crate::Result<ParameterMetaData<'_>>
    where
        E: Executor<'e, Database = MySql>,
    {
        let description = executor.describe(self.inner.sql()).await?;
        let reported = description.parameters().map(|parameters| {
            parameters.either(
                |types| {
                    ReportedParameters::Types(
                        types
                            .iter()
                            .map(|type_info| ParameterInfo::from_mysql_type_name(type_info.name()))
                            .collect(),
                    )
                },
                ReportedParameters::Count,
            )
        });
        let parameters = reported_parameters(reported, self.index.placeholder_count())?;
        Ok(self.parameter_metadata(parameters))
    }
}

/// Parameters of a statement as the server describes them.
#[derive(Debug)]
enum ReportedParameters {
    Types(Vec<ParameterInfo>),
    Count(usize),
}

/// Checks what the server reported against the `expected` number of
/// positional parameters. A bare count carries no per-position info.
fn reported_parameters(
    reported: Option<ReportedParameters>,
    expected: usize,
) -> crate::Result<Vec<ParameterInfo>> {
    let (count, parameters) = match reported {
        None => return Ok(Vec::new()),
        Some(ReportedParameters::Count(count)) => (count, Vec::new()),
        Some(ReportedParameters::Types(parameters)) => (parameters.len(), parameters),
    };
    if count != expected {
        return Err(Error::ParameterCountMismatch {
            expected,
            reported: count,
        });
    }
    Ok(parameters)
}
