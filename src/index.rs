use std::collections::HashMap;

use crate::builder::IndexBuffer;
use crate::error::Error;

/// Immutable mapping from parameter name to the positions it occupies in the
/// rewritten statement.
///
/// Positions are 1-based and kept in the order they were found. Names are
/// stored without the leading colon, but every lookup accepts either form, so
/// `"key"` and `":key"` address the same parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterIndex {
    positions: HashMap<String, Box<[usize]>>,
}

/// Converts an index buffer into a [`ParameterIndex`].
///
/// Keys and the exact order and multiplicity of positions per key are kept.
pub fn convert_index_buffer(index_buffer: IndexBuffer) -> ParameterIndex {
    let positions = index_buffer
        .into_iter()
        .map(|(name, positions)| (name, positions.into_boxed_slice()))
        .collect();
    ParameterIndex { positions }
}

impl From<IndexBuffer> for ParameterIndex {
    fn from(index_buffer: IndexBuffer) -> Self {
        convert_index_buffer(index_buffer)
    }
}

impl ParameterIndex {
    /// Returns the positions of `name`, or `None` if the statement has no such
    /// placeholder.
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        let name = name.strip_prefix(':').unwrap_or(name);
        self.positions.get(name).map(|positions| &**positions)
    }

    /// Returns the positions of `name`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a blank name, [`Error::UnknownParameter`]
    /// if the name does not occur in the statement. The error quotes `name`
    /// exactly as given.
    pub fn positions(&self, name: &str) -> crate::Result<&[usize]> {
        if name.trim().is_empty() {
            return Err(Error::blank("name"));
        }
        self.get(name)
            .ok_or_else(|| Error::UnknownParameter(name.to_owned()))
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Total number of placeholder occurrences, i.e. the highest position.
    pub fn placeholder_count(&self) -> usize {
        self.positions.values().map(|positions| positions.len()).sum()
    }

    /// Iterates over the parameter names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    /// Iterates over the names with their positions, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.positions
            .iter()
            .map(|(name, positions)| (name.as_str(), &**positions))
    }
}
