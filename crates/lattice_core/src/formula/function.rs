//! Formula: a pure computation with optional argument adaptation.

use super::adapter::{AdapterOptions, AdapterSpec, ArgumentAdapter};
use crate::types::{AdapterError, Args, FormulaError, Value};
use std::fmt;
use std::sync::Arc;

/// Signature of the wrapped computation.
///
/// `Send + Sync` so a formula can be evaluated from rayon workers during
/// level-parallel propagation.
pub type FormulaFn = dyn Fn(&Args) -> Result<Value, FormulaError> + Send + Sync;

/// Adapter given to [`Formula::with_adapter`].
///
/// Either an adapter that has already been validated, or a raw spec table
/// that is validated exactly once when the formula is built.
#[derive(Debug, Clone)]
pub enum AdapterSource {
    /// Already validated adapter, used as is.
    Validated(ArgumentAdapter),
    /// Spec table plus options, validated on formula construction.
    Raw {
        /// Spec table
        spec: AdapterSpec,
        /// Validation toggles
        options: AdapterOptions,
    },
}

impl AdapterSource {
    fn resolve(self) -> Result<ArgumentAdapter, AdapterError> {
        match self {
            AdapterSource::Validated(adapter) => Ok(adapter),
            AdapterSource::Raw { spec, options } => ArgumentAdapter::new(spec, options),
        }
    }
}

impl From<ArgumentAdapter> for AdapterSource {
    fn from(adapter: ArgumentAdapter) -> Self {
        AdapterSource::Validated(adapter)
    }
}

/// A pure computation, optionally preceded by an [`ArgumentAdapter`].
///
/// Cloning is cheap: the function is reference counted.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::Formula;
/// use lattice_core::types::{Args, Value};
///
/// let double = Formula::new(|args: &Args| Ok(Value::from(2.0 * args.number_at(0)?)));
/// let out = double.call(&Args::new().with_positional(21.0)).unwrap();
/// assert_eq!(out, Value::Number(42.0));
/// ```
#[derive(Clone)]
pub struct Formula {
    function: Arc<FormulaFn>,
    adapter: Option<ArgumentAdapter>,
}

impl Formula {
    /// Wraps `function` with no adapter; calls pass straight through.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&Args) -> Result<Value, FormulaError> + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            adapter: None,
        }
    }

    /// Wraps `function` behind an adapter.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError` if `adapter` is a raw spec that fails validation.
    pub fn with_adapter<F>(function: F, adapter: impl Into<AdapterSource>) -> Result<Self, AdapterError>
    where
        F: Fn(&Args) -> Result<Value, FormulaError> + Send + Sync + 'static,
    {
        let adapter = adapter.into().resolve()?;
        Ok(Self {
            function: Arc::new(function),
            adapter: Some(adapter),
        })
    }

    /// Wraps `function` behind an adapter whose every rule reads a key out of
    /// a map argument (node data).
    ///
    /// # Errors
    ///
    /// Returns `AdapterError` if `spec` fails validation, in particular
    /// `InnerKeyRequired` for a rule without an inner key.
    pub fn on_maps<F>(function: F, spec: AdapterSpec) -> Result<Self, AdapterError>
    where
        F: Fn(&Args) -> Result<Value, FormulaError> + Send + Sync + 'static,
    {
        Self::with_adapter(
            function,
            AdapterSource::Raw {
                spec,
                options: AdapterOptions::default().require_inner_keys(),
            },
        )
    }

    /// The adapter, if any.
    #[inline]
    pub fn adapter(&self) -> Option<&ArgumentAdapter> {
        self.adapter.as_ref()
    }

    /// Evaluates the formula: adapter transform first (if any), then the function.
    ///
    /// # Errors
    ///
    /// `FormulaError::Lookup` for a failed adapter lookup, otherwise whatever
    /// the function returns.
    pub fn call(&self, args: &Args) -> Result<Value, FormulaError> {
        match &self.adapter {
            Some(adapter) => {
                let adapted = adapter.transform(args)?;
                (self.function)(&adapted)
            }
            None => (self.function)(args),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("adapter", &self.adapter)
            .finish_non_exhaustive()
    }
}
