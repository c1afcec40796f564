//! Schema Capability - Fallible Structural Parsing
//!
//! Everything untrusted enters the engine through a `Schema`.
//! A schema either proves a JSON value has the expected shape or explains why not.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A structural contract violation
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{schema}: {message}")]
pub struct SchemaViolation {
    pub schema: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            message: message.into(),
        }
    }
}

/// Schema trait - parses untrusted values into typed ones
pub trait Schema {
    type Output;

    fn name(&self) -> &str;

    fn parse(&self, value: &Value) -> Result<Self::Output, SchemaViolation>;
}

/// Schema backed by a serde `Deserialize` impl
pub struct SerdeSchema<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeSchema<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SerdeSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerdeSchema").field("name", &self.name).finish()
    }
}

impl<T: DeserializeOwned> Schema for SerdeSchema<T> {
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, value: &Value) -> Result<T, SchemaViolation> {
        T::deserialize(value).map_err(|e| SchemaViolation::new(self.name.as_str(), e.to_string()))
    }
}
