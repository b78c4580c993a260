//! # sqlx-named-params
//!
//! Named placeholders for SQLx prepared statements. Write `:name` instead of
//! `?`, repeat a name as often as the statement needs it, and bind its value
//! once.
//!
//! ## Features
//!
//! - **Named Placeholders**: Use `:param` instead of `?` in your SQL statements
//! - **Bind Once**: A value bound to a repeated name is set at every position of that name
//! - **Generic Executor Support**: Works with `MySqlPool`, `Transaction`, and any SQLx `Executor`
//! - **Type-Safe Results**: `fetch_all`, `fetch_one` and `fetch_optional` via `FromRow`
//! - **Batches and Cancellation**: Collect rows with `add_batch`, abort a running statement from another task
//! - **Statement Logging**: Optional logging of statement text and bound values, configured once
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! sqlx-named-params = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Basic Query Execution
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_named_params::PreparedQuery;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let mut query = PreparedQuery::new(
//!     "INSERT INTO users (id, name, display_name) VALUES ( :id, :name, :name)",
//! )?;
//! query.bind("id", 42)?;
//! query.bind("name", "John Doe")?;
//!
//! let result = query.execute(&pool).await?;
//! println!("Inserted {} rows", result.rows_affected());
//! # Ok(())
//! # }
//! ```
//!
//! ### Typed Query Results
//!
//! ```rust,no_run
//! use sqlx::{MySqlPool, FromRow};
//! use sqlx_named_params::PreparedQuery;
//!
//! #[derive(FromRow)]
//! struct User {
//!     id: i32,
//!     name: String,
//!     email: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let mut query = PreparedQuery::new(
//!     "SELECT id, name, email FROM users WHERE age >= :min_age",
//! )?;
//! query.bind("min_age", 18)?;
//!
//! let users: Vec<User> = query.fetch_all(&pool).await?;
//! for user in users {
//!     println!("{}: {}", user.name, user.email);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Statement Logging
//!
//! ```rust
//! use sqlx_named_params::{LogConfig, StatementFactory};
//!
//! let factory = StatementFactory::new(LogConfig::new(
//!     |log| eprintln!("{}: {} {:?}", log.operation, log.statement, log.values),
//!     || cfg!(debug_assertions),
//!     false,
//! ));
//! let mut query = factory.prepare("SELECT * FROM accounts WHERE owner = :owner")?;
//! query.bind("owner", "alice")?;
//! # Ok::<(), sqlx_named_params::Error>(())
//! ```
//!
//! ## How It Works
//!
//! 1. **Parse**: Every `:name` is replaced by `?` and its position is recorded under `name`
//! 2. **Index**: The recorded positions become an immutable [`ParameterIndex`]
//! 3. **Bind**: `bind(name, value)` sets the value at every position of `name`
//! 4. **Execute**: A fresh SQLx `Query` is built from the positional values on each execution
//!
//! ## Limitations
//!
//! - Currently only supports MySQL
//! - Placeholder names must match `[a-zA-Z][a-zA-Z0-9]*`; `:user_id` is the placeholder `:user` followed by `_id`
//! - A placeholder must be preceded by a character other than `:`, and that
//!   character is replaced together with the placeholder. Put a space in front
//!   of each placeholder: `( :a, :b)`, not `(:a, :b)`
//! - Quoted strings and comments are not skipped
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod builder;
pub mod error;
pub mod factory;
pub mod index;
pub mod logging;
pub mod metadata;
pub mod query;
pub mod query_as;
pub mod statement;
pub mod value;

pub use error::{Error, Result};
pub use factory::StatementFactory;
pub use index::ParameterIndex;
pub use logging::{LogConfig, StatementLog};
pub use metadata::{Nullability, ParameterInfo, ParameterMetaData};
pub use query::{PositionalQuery, PreparedQuery};
pub use statement::{CancelHandle, NamedStatement, PositionalStatement};
pub use value::{SqlType, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{LogConfig, PreparedQuery, SqlType, StatementFactory, Value};
}
