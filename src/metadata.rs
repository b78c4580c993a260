use crate::index::ParameterIndex;
use crate::value::SqlType;

/// Whether a parameter accepts NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    NoNulls,
    Nullable,
    #[default]
    Unknown,
}

/// What the driver reports about one positional parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterInfo {
    pub sql_type: Option<SqlType>,
    pub type_name: Option<String>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub signed: Option<bool>,
    pub nullability: Nullability,
}

impl ParameterInfo {
    /// Info derived from a MySQL type name such as `BIGINT UNSIGNED`.
    pub fn from_mysql_type_name(name: &str) -> Self {
        let sql_type = SqlType::from_mysql_name(name);
        let signed = match sql_type {
            SqlType::TinyInt
            | SqlType::SmallInt
            | SqlType::Integer
            | SqlType::BigInt
            | SqlType::Real
            | SqlType::Double
            | SqlType::Numeric => Some(!name.to_ascii_uppercase().ends_with("UNSIGNED")),
            _ => None,
        };
        Self {
            sql_type: Some(sql_type),
            type_name: Some(name.to_owned()),
            signed,
            ..Self::default()
        }
    }
}

/// Per-name view on the parameter metadata of a statement.
///
/// Type, precision, scale and signedness come from the first position of a
/// name; all positions of one name are assumed to share them. Nullability is
/// checked across all positions.
#[derive(Debug, Clone)]
pub struct ParameterMetaData<'a> {
    index: &'a ParameterIndex,
    parameters: Vec<ParameterInfo>,
}

impl<'a> ParameterMetaData<'a> {
    /// `parameters[i]` describes position `i + 1`. Missing entries count as
    /// unknown.
    pub fn new(index: &'a ParameterIndex, parameters: Vec<ParameterInfo>) -> Self {
        Self { index, parameters }
    }

    /// Number of distinct parameter names.
    pub fn parameter_count(&self) -> usize {
        self.index.len()
    }

    pub fn parameter_names(&self) -> Vec<&'a str> {
        self.index.names().collect()
    }

    pub fn parameter_indexes(&self, name: &str) -> crate::Result<&'a [usize]> {
        self.index.positions(name)
    }

    pub fn parameter_type(&self, name: &str) -> crate::Result<Option<SqlType>> {
        Ok(self.first(name)?.and_then(|info| info.sql_type))
    }

    pub fn parameter_type_name(&self, name: &str) -> crate::Result<Option<String>> {
        Ok(self.first(name)?.and_then(|info| info.type_name.clone()))
    }

    pub fn precision(&self, name: &str) -> crate::Result<Option<u32>> {
        Ok(self.first(name)?.and_then(|info| info.precision))
    }

    pub fn scale(&self, name: &str) -> crate::Result<Option<u32>> {
        Ok(self.first(name)?.and_then(|info| info.scale))
    }

    pub fn is_signed(&self, name: &str) -> crate::Result<Option<bool>> {
        Ok(self.first(name)?.and_then(|info| info.signed))
    }

    /// Nullability of `name`; [`Nullability::Unknown`] as soon as two of its
    /// positions disagree.
    pub fn is_nullable(&self, name: &str) -> crate::Result<Nullability> {
        let mut nullability = None;
        for &position in self.index.positions(name)? {
            let current = self.info(position).map_or(Nullability::Unknown, |info| info.nullability);
            match nullability {
                None => nullability = Some(current),
                Some(previous) if previous != current => return Ok(Nullability::Unknown),
                Some(_) => {}
            }
        }
        Ok(nullability.unwrap_or_default())
    }

    fn info(&self, position: usize) -> Option<&ParameterInfo> {
        position.checked_sub(1).and_then(|i| self.parameters.get(i))
    }

    fn first(&self, name: &str) -> crate::Result<Option<&ParameterInfo>> {
        let positions = self.index.positions(name)?;
        Ok(positions.first().and_then(|&position| self.info(position)))
    }
}
