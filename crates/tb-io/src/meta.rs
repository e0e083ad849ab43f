//! JSON schema ("meta") files
//!
//! A meta file is an ordered list of `{name, kind}` column descriptions. It
//! travels next to a CSV file and drives typed ingestion.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tb_core::table::{Frame, FrameConfig, ValueKind};

use crate::IoResult;

/// One named, typed column of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub kind: ValueKind,
}

/// Ordered column descriptions for a frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build from (name, kind) pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, ValueKind)>,
        S: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, kind)| Field {
                    name: name.into(),
                    kind,
                })
                .collect(),
        }
    }

    /// Describe an existing frame
    pub fn of_frame(frame: &Frame) -> Self {
        Self::from_pairs(frame.header().iter().map(|(n, k)| (n.to_string(), k)))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    /// Parse from meta-file JSON
    pub fn from_json(text: &str) -> IoResult<Schema> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to meta-file JSON
    pub fn to_json(&self) -> IoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> IoResult<Schema> {
        Schema::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> IoResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Pre-create an empty frame with this schema's columns
    pub fn make_frame(&self, config: FrameConfig) -> IoResult<Frame> {
        Ok(Frame::from_schema(
            self.fields.iter().map(|f| (f.name.clone(), f.kind)),
            config,
        )?)
    }
}
