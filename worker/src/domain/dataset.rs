//! Dataset names and the warehouse tables derived from them.

use std::fmt;

use thiserror::Error;

/// Schema holding raw, text-typed tables loaded from CSV.
pub const STAGING_SCHEMA: &str = "staging";
/// Schema the transformation tool materialises cleaned models into.
pub const WAREHOUSE_SCHEMA: &str = "warehouse";
/// Suffix appended to the dataset name for the generated model and its table.
pub const MODEL_SUFFIX: &str = "_clean";

/// Longest dataset name, in bytes, that still leaves room for
/// [`MODEL_SUFFIX`] inside PostgreSQL's 63-byte identifier limit.
pub const MAX_DATASET_NAME_LEN: usize = 63 - MODEL_SUFFIX.len();

/// Validation failures for [`DatasetName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetNameValidationError {
    /// The name is empty.
    #[error("dataset name must not be empty")]
    Empty,
    /// The name starts or ends with whitespace.
    #[error("dataset name must not start or end with whitespace")]
    SurroundingWhitespace,
    /// The name is longer than [`MAX_DATASET_NAME_LEN`] bytes.
    #[error("dataset name must be at most {max} bytes")]
    TooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The name contains a path separator or control character.
    #[error("dataset name must not contain {character:?}")]
    InvalidCharacter {
        /// Offending character.
        character: char,
    },
    /// The name is `.` or `..`.
    #[error("dataset name must not be a relative path component")]
    Reserved,
}

/// Logical dataset name shared by the staging table, the generated model
/// file and the materialised warehouse table.
///
/// # Examples
/// ```
/// use worker::domain::DatasetName;
///
/// let name = DatasetName::new("orders").expect("valid name");
/// assert_eq!(name.as_ref(), "orders");
/// assert!(DatasetName::new("../orders").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetName(String);

impl DatasetName {
    /// Validate and wrap a dataset name.
    ///
    /// # Errors
    /// Returns [`DatasetNameValidationError`] when the name is empty, padded
    /// with whitespace, too long, a relative path component, or contains a
    /// path separator or control character.
    pub fn new(raw: impl Into<String>) -> Result<Self, DatasetNameValidationError> {
        let value: String = raw.into();
        if value.is_empty() {
            return Err(DatasetNameValidationError::Empty);
        }
        if value.trim() != value {
            return Err(DatasetNameValidationError::SurroundingWhitespace);
        }
        if value.len() > MAX_DATASET_NAME_LEN {
            return Err(DatasetNameValidationError::TooLong {
                max: MAX_DATASET_NAME_LEN,
            });
        }
        if let Some(character) = value
            .chars()
            .find(|c| matches!(c, '/' | '\\') || c.is_control())
        {
            return Err(DatasetNameValidationError::InvalidCharacter { character });
        }
        if matches!(value.as_str(), "." | "..") {
            return Err(DatasetNameValidationError::Reserved);
        }
        Ok(Self(value))
    }

    /// Name of the transformed model and its warehouse table.
    #[must_use]
    pub fn model_name(&self) -> String {
        format!("{}{MODEL_SUFFIX}", self.0)
    }
}

impl AsRef<str> for DatasetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote `name` as a PostgreSQL identifier, doubling embedded quotes.
///
/// # Examples
/// ```
/// use worker::domain::quote_identifier;
///
/// assert_eq!(quote_identifier("orders"), "\"orders\"");
/// assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
/// ```
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified table. Displays as `schema."table"`, the form used in
/// SQL statements and dispatch messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedTable {
    schema: &'static str,
    name: String,
}

impl QualifiedTable {
    /// Raw staging table for `dataset`.
    #[must_use]
    pub fn staging(dataset: &DatasetName) -> Self {
        Self {
            schema: STAGING_SCHEMA,
            name: dataset.as_ref().to_owned(),
        }
    }

    /// Warehouse table materialised from the generated model for `dataset`.
    #[must_use]
    pub fn transformed(dataset: &DatasetName) -> Self {
        Self {
            schema: WAREHOUSE_SCHEMA,
            name: dataset.model_name(),
        }
    }

    /// Unquoted schema name.
    #[must_use]
    pub const fn schema(&self) -> &'static str {
        self.schema
    }

    /// Unquoted table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for QualifiedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, quote_identifier(&self.name))
    }
}
