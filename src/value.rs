use std::fmt;

use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};

/// Declared SQL type of a bound value or of a statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    LongVarchar,
    Binary,
    Varbinary,
    LongVarbinary,
    Blob,
    Clob,
    Date,
    Time,
    Timestamp,
    Json,
    Null,
    Other,
}

impl SqlType {
    pub fn name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::Binary => "BINARY",
            SqlType::Varbinary => "VARBINARY",
            SqlType::LongVarbinary => "LONGVARBINARY",
            SqlType::Blob => "BLOB",
            SqlType::Clob => "CLOB",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Json => "JSON",
            SqlType::Null => "NULL",
            SqlType::Other => "OTHER",
        }
    }

    /// Maps a MySQL column type name, as reported by the server, to a
    /// [`SqlType`]. Unsigned variants map to the same type as the signed ones.
    pub fn from_mysql_name(name: &str) -> SqlType {
        let upper = name.to_ascii_uppercase();
        let base = upper.strip_suffix(" UNSIGNED").unwrap_or(&upper);
        match base {
            "BOOLEAN" => SqlType::Boolean,
            "TINYINT" => SqlType::TinyInt,
            "SMALLINT" | "YEAR" => SqlType::SmallInt,
            "MEDIUMINT" | "INT" | "INTEGER" => SqlType::Integer,
            "BIGINT" => SqlType::BigInt,
            "FLOAT" => SqlType::Real,
            "DOUBLE" => SqlType::Double,
            "DECIMAL" | "NUMERIC" => SqlType::Numeric,
            "CHAR" => SqlType::Char,
            "VARCHAR" | "ENUM" | "SET" => SqlType::Varchar,
            "TINYTEXT" | "TEXT" | "MEDIUMTEXT" => SqlType::LongVarchar,
            "LONGTEXT" => SqlType::Clob,
            "BINARY" => SqlType::Binary,
            "VARBINARY" | "BIT" => SqlType::Varbinary,
            "TINYBLOB" | "BLOB" | "MEDIUMBLOB" => SqlType::LongVarbinary,
            "LONGBLOB" => SqlType::Blob,
            "DATE" => SqlType::Date,
            "TIME" => SqlType::Time,
            "DATETIME" | "TIMESTAMP" => SqlType::Timestamp,
            "JSON" => SqlType::Json,
            "NULL" => SqlType::Null,
            _ => SqlType::Other,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can be bound to a named parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL, optionally with its declared type.
    Null(Option<SqlType>),
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    /// Large binary object; only its size shows up in statement logs.
    Blob(Vec<u8>),
    /// Large character object; only its size shows up in statement logs.
    Clob(String),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
}

impl Value {
    pub fn blob(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Blob(bytes.into())
    }

    pub fn clob(text: impl Into<String>) -> Self {
        Value::Clob(text.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    /// The declared SQL type; `None` for an untyped NULL.
    pub fn sql_type(&self) -> Option<SqlType> {
        let sql_type = match self {
            Value::Null(sql_type) => return *sql_type,
            Value::Bool(_) => SqlType::Boolean,
            Value::TinyInt(_) => SqlType::TinyInt,
            Value::SmallInt(_) => SqlType::SmallInt,
            Value::Int(_) => SqlType::Integer,
            Value::BigInt(_) => SqlType::BigInt,
            Value::Float(_) => SqlType::Real,
            Value::Double(_) => SqlType::Double,
            Value::Decimal(_) => SqlType::Numeric,
            Value::Text(_) => SqlType::Varchar,
            Value::Bytes(_) => SqlType::Varbinary,
            Value::Blob(_) => SqlType::Blob,
            Value::Clob(_) => SqlType::Clob,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::Timestamp(_) => SqlType::Timestamp,
        };
        Some(sql_type)
    }

    /// Text used for the value in statement logs. Binary and large values are
    /// shown by type and size only.
    pub fn log_text(&self) -> String {
        match self {
            Value::Null(_) => "NULL".to_owned(),
            Value::Bool(v) => v.to_string(),
            Value::TinyInt(v) => v.to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Text(v) => v.clone(),
            Value::Bytes(v) => format!("{} ({} bytes)", SqlType::Varbinary, v.len()),
            Value::Blob(v) => format!("{} ({} bytes)", SqlType::Blob, v.len()),
            Value::Clob(v) => format!("{} ({} chars)", SqlType::Clob, v.chars().count()),
            Value::Date(v) => v.to_string(),
            Value::Time(v) => v.to_string(),
            Value::Timestamp(v) => v.to_string(),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Date => Date,
    Time => Time,
    PrimitiveDateTime => Timestamp,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null(None), Into::into)
    }
}
