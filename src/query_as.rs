use sqlx::{
    mysql::{MySqlArguments, MySqlRow},
    query::QueryAs,
    Executor, FromRow, MySql,
};

use crate::query::{bind_value, PositionalQuery};
use crate::statement::NamedStatement;
use crate::value::Value;

/// Type alias for SQLx QueryAs with MySQL arguments
pub type QA<'q, R> = QueryAs<'q, MySql, R, MySqlArguments>;

impl PositionalQuery {
    /// Builds a typed SQLx query with the current values bound.
    pub fn query_as<R>(&self) -> crate::Result<QA<'_, R>>
    where
        for<'row> R: FromRow<'row, MySqlRow>,
    {
        let mut query = sqlx::query_as::<MySql, R>(self.sql());
        for value in self.values()? {
            query = bind_value!(query, value);
        }
        Ok(query)
    }
}

/// Typed results, via SQLx's `FromRow`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::{MySqlPool, FromRow};
/// use sqlx_named_params::PreparedQuery;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let mut query = PreparedQuery::new(
///     "SELECT id, name FROM users WHERE id = :id OR manager_id = :id",
/// )?;
/// query.bind("id", 42)?;
///
/// let users: Vec<User> = query.fetch_all(&pool).await?;
/// for user in users {
///     println!("User: {} ({})", user.name, user.id);
/// }
/// # Ok(())
/// # }
/// ```
impl NamedStatement<PositionalQuery> {
    /// Executes the query and returns all matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder is unbound, the query fails, or any
    /// row cannot be converted to type `R`.
    pub async fn fetch_all<'e, R, E>(&self, executor: E) -> crate::Result<Vec<R>>
    where
        for<'row> R: FromRow<'row, MySqlRow> + Send + Unpin,
        E: Executor<'e, Database = MySql>,
    {
        self.ensure_bound()?;
        self.log_operation("fetch_all()");
        let query = self.inner.query_as::<R>()?;
        self.cancellable(query.fetch_all(executor)).await
    }

    /// Executes the query and returns exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No rows are found
    /// - A placeholder is unbound
    /// - The query fails
    /// - The row cannot be converted to type `R`
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::{MySqlPool, FromRow};
    /// use sqlx_named_params::PreparedQuery;
    ///
    /// #[derive(FromRow)]
    /// struct User {
    ///     id: i32,
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let mut query = PreparedQuery::new("SELECT id, name FROM users WHERE id = :id")?;
    /// query.bind("id", 42)?;
    ///
    /// let user: User = query.fetch_one(&pool).await?;
    /// println!("Found user: {}", user.name);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_one<'e, R, E>(&self, executor: E) -> crate::Result<R>
    where
        for<'row> R: FromRow<'row, MySqlRow> + Send + Unpin,
        E: Executor<'e, Database = MySql>,
    {
        self.ensure_bound()?;
        self.log_operation("fetch_one()");
        let query = self.inner.query_as::<R>()?;
        self.cancellable(query.fetch_one(executor)).await
    }

    /// Executes the query and returns at most one row.
    ///
    /// Returns `Some(row)` for the first matching row, `None` if no rows
    /// match.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use sqlx::{MySqlPool, FromRow};
    /// use sqlx_named_params::PreparedQuery;
    ///
    /// #[derive(FromRow)]
    /// struct User {
    ///     id: i32,
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
    /// let mut query = PreparedQuery::new("SELECT id, name FROM users WHERE email = :email")?;
    /// query.bind("email", "user@example.com")?;
    ///
    /// match query.fetch_optional::<User, _>(&pool).await? {
    ///     Some(user) => println!("Found user: {}", user.name),
    ///     None => println!("User not found"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_optional<'e, R, E>(&self, executor: E) -> crate::Result<Option<R>>
    where
        for<'row> R: FromRow<'row, MySqlRow> + Send + Unpin,
        E: Executor<'e, Database = MySql>,
    {
        self.ensure_bound()?;
        self.log_operation("fetch_optional()");
        let query = self.inner.query_as::<R>()?;
        self.cancellable(query.fetch_optional(executor)).await
    }
}
