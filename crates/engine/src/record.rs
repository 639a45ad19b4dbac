//! Records and their on-disk encoding
//!
//! Callers declare up front whether a dataset holds structured values or
//! raw byte blobs ([`RecordFormat`]), and every record carries the matching
//! [`Record`] variant. Raw blobs bypass the serializer entirely, so a blob
//! is never encoded twice.

use pail_core::{Error, Result, Value};
use pail_storage::Serializer;
use std::fmt;
use std::str::FromStr;

/// Payload kind stored by a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordFormat {
    /// Structured values, encoded by the dataset's serializer
    #[default]
    Structured,
    /// Opaque byte blobs, stored as-is
    Binary,
}

impl RecordFormat {
    /// Name recorded in the dataset MANIFEST
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Structured => "structured",
            RecordFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "structured" => Ok(RecordFormat::Structured),
            "binary" => Ok(RecordFormat::Binary),
            other => Err(Error::Config(format!("unknown record format '{}'", other))),
        }
    }
}

/// One record written to or read from a dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A structured value
    Structured(Value),
    /// A raw byte blob
    Raw(Vec<u8>),
}

impl Record {
    /// Format this record belongs to
    pub fn format(&self) -> RecordFormat {
        match self {
            Record::Structured(_) => RecordFormat::Structured,
            Record::Raw(_) => RecordFormat::Binary,
        }
    }

    /// The structured value, if any
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Record::Structured(v) => Some(v),
            Record::Raw(_) => None,
        }
    }

    /// The raw bytes, if any
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Record::Raw(b) => Some(b),
            Record::Structured(_) => None,
        }
    }

    /// Encode for storage
    ///
    /// # Errors
    ///
    /// `Error::InvalidUsage` if the variant does not match `format`;
    /// `Error::Serialization` if the serializer rejects the value.
    pub fn encode(&self, format: RecordFormat, serializer: &dyn Serializer) -> Result<Vec<u8>> {
        match (self, format) {
            (Record::Structured(v), RecordFormat::Structured) => Ok(serializer.encode(v)?),
            (Record::Raw(b), RecordFormat::Binary) => Ok(b.clone()),
            (record, format) => Err(Error::invalid_usage(format!(
                "{} record written to a {} dataset",
                record.format(),
                format
            ))),
        }
    }

    /// Decode a stored blob
    pub fn decode(
        data: Vec<u8>,
        format: RecordFormat,
        serializer: &dyn Serializer,
    ) -> Result<Self> {
        match format {
            RecordFormat::Structured => Ok(Record::Structured(serializer.decode(&data)?)),
            RecordFormat::Binary => Ok(Record::Raw(data)),
        }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Record::Structured(value)
    }
}

impl From<Vec<u8>> for Record {
    fn from(bytes: Vec<u8>) -> Self {
        Record::Raw(bytes)
    }
}

/// A record read back from a version, with its relative key
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Path of the record inside the version (`<category>/<leaf>`)
    pub key: String,
    /// Decoded record
    pub record: Record,
}
