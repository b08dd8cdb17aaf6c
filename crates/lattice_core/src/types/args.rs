//! Positional/keyword call arguments.

use super::error::LookupError;
use super::value::Value;
use std::collections::BTreeMap;

/// Arguments of a formula call: an ordered positional list plus keywords.
///
/// # Examples
///
/// ```
/// use lattice_core::types::{Args, Value};
///
/// let args = Args::new()
///     .with_positional(1.0)
///     .with_keyword("rate", 0.05);
///
/// assert_eq!(args.number_at(0).unwrap(), 1.0);
/// assert_eq!(args.number("rate").unwrap(), 0.05);
/// assert!(args.keyword("missing").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl Args {
    /// Empty call.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from an existing positional list and keyword map.
    pub fn from_parts(positional: Vec<Value>, keyword: BTreeMap<String, Value>) -> Self {
        Self {
            positional,
            keyword,
        }
    }

    /// Appends a positional argument (builder style).
    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a keyword argument (builder style).
    pub fn with_keyword(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(key.into(), value.into());
        self
    }

    /// Appends a positional argument.
    pub fn push_positional(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    /// Sets a keyword argument, replacing any previous value.
    pub fn insert_keyword(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.keyword.insert(key.into(), value.into());
    }

    /// Positional arguments in call order.
    #[inline]
    pub fn positional_values(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments.
    #[inline]
    pub fn keyword_values(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }

    /// True when there are no arguments of either kind.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Splits into the positional list and keyword map.
    pub fn into_parts(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        (self.positional, self.keyword)
    }

    /// Returns positional argument `index`.
    ///
    /// # Errors
    ///
    /// `LookupError::MissingPositional` if `index` is out of range.
    pub fn positional(&self, index: usize) -> Result<&Value, LookupError> {
        self.positional
            .get(index)
            .ok_or(LookupError::MissingPositional {
                index,
                len: self.positional.len(),
            })
    }

    /// Returns keyword argument `key`.
    ///
    /// # Errors
    ///
    /// `LookupError::MissingKeyword` if `key` was not supplied.
    pub fn keyword(&self, key: &str) -> Result<&Value, LookupError> {
        self.keyword
            .get(key)
            .ok_or_else(|| LookupError::MissingKeyword {
                key: key.to_string(),
            })
    }

    /// Returns positional argument `index` as a number.
    pub fn number_at(&self, index: usize) -> Result<f64, LookupError> {
        let value = self.positional(index)?;
        value.as_number().ok_or_else(|| LookupError::NotANumber {
            argument: format!("#{}", index),
            found: value.kind(),
        })
    }

    /// Returns keyword argument `key` as a number.
    pub fn number(&self, key: &str) -> Result<f64, LookupError> {
        let value = self.keyword(key)?;
        value.as_number().ok_or_else(|| LookupError::NotANumber {
            argument: format!("'{}'", key),
            found: value.kind(),
        })
    }

    /// Returns `map[inner]` for the map held in keyword argument `key`.
    pub fn inner(&self, key: &str, inner: &str) -> Result<&Value, LookupError> {
        let value = self.keyword(key)?;
        let map = value.as_map().ok_or_else(|| LookupError::NotAMap {
            argument: format!("'{}'", key),
            found: value.kind(),
        })?;
        map.get(inner).ok_or_else(|| LookupError::MissingInnerKey {
            argument: format!("'{}'", key),
            key: inner.to_string(),
        })
    }

    /// Returns `map[inner]` as a number for the map held in keyword argument `key`.
    pub fn inner_number(&self, key: &str, inner: &str) -> Result<f64, LookupError> {
        let value = self.inner(key, inner)?;
        value.as_number().ok_or_else(|| LookupError::NotANumber {
            argument: format!("'{}'['{}']", key, inner),
            found: value.kind(),
        })
    }
}
