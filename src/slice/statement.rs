//! Coded statement records as handed over by the network exporter.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Value of a statement-level variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Short or long text.
    Text(String),
    /// Integer scale value.
    Integer(i64),
    /// Boolean flag, such as agreement.
    Boolean(bool),
}

impl Value {
    /// String form used as a bucket index, following the declared data type.
    ///
    /// Booleans render as `"1"`/`"0"`; integers declared boolean render as
    /// `"1"` when non-zero.
    pub fn render(&self, data_type: DataType) -> String {
        match (self, data_type) {
            (Value::Boolean(b), _) => (if *b { "1" } else { "0" }).to_string(),
            (Value::Integer(i), DataType::Boolean) => (if *i != 0 { "1" } else { "0" }).to_string(),
            (Value::Integer(i), _) => i.to_string(),
            (Value::Text(s), _) => s.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Declared data type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// `"short text"`
    #[default]
    ShortText,
    /// `"long text"`
    LongText,
    /// `"integer"`
    Integer,
    /// `"boolean"`
    Boolean,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::ShortText => "short text",
            DataType::LongText => "long text",
            DataType::Integer => "integer",
            DataType::Boolean => "boolean",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "short text" => Ok(DataType::ShortText),
            "long text" => Ok(DataType::LongText),
            "integer" => Ok(DataType::Integer),
            "boolean" => Ok(DataType::Boolean),
            other => Err(Error::UnknownName {
                kind: "data type",
                name: other.to_string(),
            }),
        }
    }
}

/// Reference to a variable, either on the statement or on its document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VariableRef {
    /// Variable name.
    pub name: String,
    /// True for document-level fields (author, source, section, type, ...).
    pub document_level: bool,
}

impl VariableRef {
    /// Statement-level variable.
    pub fn statement(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_level: false,
        }
    }

    /// Document-level field.
    pub fn document(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_level: true,
        }
    }
}

/// One filtered, time-stamped coded statement.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Statement {
    /// Statement identifier.
    pub id: u64,
    /// Time stamp (of the statement's document).
    pub time: NaiveDateTime,
    /// Statement type name.
    pub statement_type: String,
    /// Document-level fields.
    pub document: BTreeMap<String, String>,
    /// Statement-level variables.
    pub values: BTreeMap<String, Value>,
}

impl Statement {
    /// Statement without variables.
    pub fn new(id: u64, time: NaiveDateTime, statement_type: impl Into<String>) -> Self {
        Self {
            id,
            time,
            statement_type: statement_type.into(),
            document: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Set a statement-level variable.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Set a document-level field.
    pub fn with_document_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.document.insert(name.into(), value.into());
        self
    }

    /// Rendered value of `variable`, or `None` if the statement lacks it.
    pub fn render(&self, variable: &VariableRef, data_type: DataType) -> Option<String> {
        if variable.document_level {
            self.document.get(&variable.name).cloned()
        } else {
            self.values.get(&variable.name).map(|v| v.render(data_type))
        }
    }
}
