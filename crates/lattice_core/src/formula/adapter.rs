//! Declarative argument adaptation.
//!
//! An [`ArgumentAdapter`] translates one positional/keyword call into
//! another. Each entry of its spec table maps an output slot to a
//! [`SourceRule`] saying where the value comes from in the original call:
//!
//! | Output slot | Source kind | Source | Inner key | Result |
//! |-------------|-------------|--------|-----------|--------|
//! | `0` | positional | `1` | none | `new[0] = pos[1]` |
//! | `"up"` | keyword | `"right"` | `"value"` | `new["up"] = kw["right"]["value"]` |
//!
//! The table is validated once, in [`ArgumentAdapter::new`]. `transform`
//! only fails on call-time lookups.

use crate::types::{AdapterError, Args, LookupError, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Largest output position a spec table may name.
///
/// Positional output is materialised as a dense list, so this bounds the
/// allocation made per call when gaps are null-filled.
pub const MAX_OUTPUT_POSITION: usize = 1 << 16;

// =============================================================================
// Spec table types
// =============================================================================

/// Where an extracted value lands in the transformed call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputSlot {
    /// Position in the new positional list.
    Position(usize),
    /// Key in the new keyword map (non-empty).
    Key(String),
}

impl fmt::Display for OutputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSlot::Position(i) => write!(f, "#{}", i),
            OutputSlot::Key(k) => write!(f, "'{}'", k),
        }
    }
}

impl From<usize> for OutputSlot {
    fn from(i: usize) -> Self {
        OutputSlot::Position(i)
    }
}

impl From<&str> for OutputSlot {
    fn from(k: &str) -> Self {
        OutputSlot::Key(k.to_string())
    }
}

impl From<String> for OutputSlot {
    fn from(k: String) -> Self {
        OutputSlot::Key(k)
    }
}

/// Which side of the original call a value is read from.
///
/// Spec tables written as text name the kind by label; `FromStr` is the
/// entry point for those and keeps the first-letter leniency of such tables.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::{SourceKind, SourceRef, SourceRule};
///
/// // Row `0 <- posarg 1` of a textual table.
/// let kind: SourceKind = "posarg".parse().unwrap();
/// let rule = SourceRule::new(kind, SourceRef::Index(1), None);
/// assert_eq!(rule.kind(), SourceKind::Positional);
///
/// assert!("value".parse::<SourceKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Read from the positional list.
    Positional,
    /// Read from the keyword map.
    Keyword,
}

impl SourceKind {
    fn label(self) -> &'static str {
        match self {
            SourceKind::Positional => "positional",
            SourceKind::Keyword => "keyword",
        }
    }
}

impl FromStr for SourceKind {
    type Err = AdapterError;

    /// Accepts any label starting with `p` or `k` (case-insensitive), so
    /// `"posarg"`, `"P"` and `"keyword"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('p') => Ok(SourceKind::Positional),
            Some('k') => Ok(SourceKind::Keyword),
            _ => Err(AdapterError::UnknownSourceKind(s.to_string())),
        }
    }
}

/// Index or key into the original call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceRef {
    /// Positional index.
    Index(usize),
    /// Keyword name.
    Key(String),
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Index(i) => write!(f, "#{}", i),
            SourceRef::Key(k) => write!(f, "'{}'", k),
        }
    }
}

/// Extraction rule for one output slot.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::SourceRule;
///
/// // kwargs["right"]["value"]
/// let rule = SourceRule::keyword("right").inner("value");
/// assert_eq!(rule.inner_key(), Some("value"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    kind: SourceKind,
    source: SourceRef,
    inner_key: Option<String>,
}

impl SourceRule {
    /// Raw rule, as read from a spec table. Consistency between `kind` and
    /// `source` is checked by [`ArgumentAdapter::new`].
    pub fn new(kind: SourceKind, source: SourceRef, inner_key: Option<String>) -> Self {
        Self {
            kind,
            source,
            inner_key,
        }
    }

    /// Reads positional argument `index`.
    pub fn positional(index: usize) -> Self {
        Self::new(SourceKind::Positional, SourceRef::Index(index), None)
    }

    /// Reads keyword argument `key`.
    pub fn keyword(key: impl Into<String>) -> Self {
        Self::new(SourceKind::Keyword, SourceRef::Key(key.into()), None)
    }

    /// Reads `inner_key` from the (map) argument instead of the bare argument.
    pub fn inner(mut self, inner_key: impl Into<String>) -> Self {
        self.inner_key = Some(inner_key.into());
        self
    }

    /// Side of the call the value is read from.
    #[inline]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Index or key read.
    #[inline]
    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    /// Key read inside the argument, if it is a map.
    #[inline]
    pub fn inner_key(&self) -> Option<&str> {
        self.inner_key.as_deref()
    }

    fn extract(&self, args: &Args) -> Result<Value, LookupError> {
        let outer = match &self.source {
            SourceRef::Index(i) => args.positional(*i)?,
            SourceRef::Key(k) => args.keyword(k)?,
        };
        let Some(inner) = &self.inner_key else {
            return Ok(outer.clone());
        };
        let map = outer.as_map().ok_or_else(|| LookupError::NotAMap {
            argument: self.source.to_string(),
            found: outer.kind(),
        })?;
        map.get(inner)
            .cloned()
            .ok_or_else(|| LookupError::MissingInnerKey {
                argument: self.source.to_string(),
                key: inner.clone(),
            })
    }
}

/// Spec table: output slot to extraction rule, in declaration order.
pub type AdapterSpec = Vec<(OutputSlot, SourceRule)>;

// =============================================================================
// Validation toggles
// =============================================================================

/// Independent validation toggles, all off by default.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::AdapterOptions;
///
/// let options = AdapterOptions::default()
///     .fill_gaps_with_null()
///     .forbid_cross_influence();
/// assert!(options.fill_gaps_with_null);
/// assert!(!options.forbid_mixed_inputs);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Missing output positions become `Value::Null` instead of failing.
    pub fill_gaps_with_null: bool,
    /// Inputs may not mix positional and keyword sources.
    pub forbid_mixed_inputs: bool,
    /// Outputs may not mix positions and keys.
    pub forbid_mixed_outputs: bool,
    /// Positions only read positional inputs; keys only read keyword inputs.
    pub forbid_cross_influence: bool,
    /// Every rule reads an inner key (all inputs are maps).
    pub require_inner_keys: bool,
    /// No rule reads an inner key (all inputs are scalars).
    pub forbid_inner_keys: bool,
}

impl AdapterOptions {
    /// Turns on the `fill_gaps_with_null` toggle.
    pub fn fill_gaps_with_null(mut self) -> Self {
        self.fill_gaps_with_null = true;
        self
    }

    /// Turns on the `forbid_mixed_inputs` toggle.
    pub fn forbid_mixed_inputs(mut self) -> Self {
        self.forbid_mixed_inputs = true;
        self
    }

    /// Turns on the `forbid_mixed_outputs` toggle.
    pub fn forbid_mixed_outputs(mut self) -> Self {
        self.forbid_mixed_outputs = true;
        self
    }

    /// Turns on the `forbid_cross_influence` toggle.
    pub fn forbid_cross_influence(mut self) -> Self {
        self.forbid_cross_influence = true;
        self
    }

    /// Turns on the `require_inner_keys` toggle.
    pub fn require_inner_keys(mut self) -> Self {
        self.require_inner_keys = true;
        self
    }

    /// Turns on the `forbid_inner_keys` toggle.
    pub fn forbid_inner_keys(mut self) -> Self {
        self.forbid_inner_keys = true;
        self
    }
}

// =============================================================================
// ArgumentAdapter
// =============================================================================

/// A validated argument translation rule.
///
/// # Examples
///
/// ```
/// use lattice_core::formula::{AdapterOptions, ArgumentAdapter, OutputSlot, SourceRule};
/// use lattice_core::types::{Args, Value};
///
/// let adapter = ArgumentAdapter::new(
///     vec![
///         (OutputSlot::from(0), SourceRule::keyword("node").inner("spot")),
///         (OutputSlot::from("rate"), SourceRule::keyword("extra").inner("rate")),
///     ],
///     AdapterOptions::default(),
/// )
/// .unwrap();
///
/// let args = Args::new()
///     .with_keyword("node", Value::map([("spot", 100.0)]))
///     .with_keyword("extra", Value::map([("rate", 0.05)]));
///
/// let out = adapter.transform(&args).unwrap();
/// assert_eq!(out.number_at(0).unwrap(), 100.0);
/// assert_eq!(out.number("rate").unwrap(), 0.05);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentAdapter {
    rules: AdapterSpec,
    options: AdapterOptions,
    positional_arity: usize,
}

impl ArgumentAdapter {
    /// Validates `spec` against `options` and builds the adapter.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`] found, in table order, then the
    /// whole-table checks (mixed inputs, mixed outputs, position gaps).
    pub fn new(spec: AdapterSpec, options: AdapterOptions) -> Result<Self, AdapterError> {
        let positional_arity = validate(&spec, &options).map_err(|e| {
            debug!("Rejected adapter spec: {}", e);
            e
        })?;
        Ok(Self {
            rules: spec,
            options,
            positional_arity,
        })
    }

    /// Validated spec table, in declaration order.
    #[inline]
    pub fn rules(&self) -> &[(OutputSlot, SourceRule)] {
        &self.rules
    }

    /// Toggles the table was validated against.
    #[inline]
    pub fn options(&self) -> AdapterOptions {
        self.options
    }

    /// Length of the transformed positional list (largest position + 1).
    #[inline]
    pub fn positional_arity(&self) -> usize {
        self.positional_arity
    }

    /// Applies the validated table to a call.
    ///
    /// # Errors
    ///
    /// `LookupError` if an index, key or inner key is missing from `args`, or
    /// an inner key is read from a non-map value.
    pub fn transform(&self, args: &Args) -> Result<Args, LookupError> {
        let mut positional = vec![Value::Null; self.positional_arity];
        let mut keyword = BTreeMap::new();

        for (slot, rule) in &self.rules {
            let value = rule.extract(args)?;
            match slot {
                OutputSlot::Position(i) => positional[*i] = value,
                OutputSlot::Key(k) => {
                    keyword.insert(k.clone(), value);
                }
            }
        }

        Ok(Args::from_parts(positional, keyword))
    }
}

/// Checks the table and returns the positional arity.
fn validate(spec: &AdapterSpec, options: &AdapterOptions) -> Result<usize, AdapterError> {
    if options.require_inner_keys && options.forbid_inner_keys {
        return Err(AdapterError::ConflictingInnerKeyPolicies);
    }

    let mut seen: HashSet<&OutputSlot> = HashSet::with_capacity(spec.len());
    let mut positional_inputs = 0usize;
    let mut keyword_inputs = 0usize;
    let mut keyword_outputs = 0usize;
    let mut positions: Vec<usize> = Vec::new();

    for (slot, rule) in spec {
        let name = slot.to_string();

        match slot {
            OutputSlot::Key(k) if k.is_empty() => return Err(AdapterError::EmptyOutputKey),
            OutputSlot::Key(_) => keyword_outputs += 1,
            OutputSlot::Position(i) => positions.push(*i),
        }
        if !seen.insert(slot) {
            return Err(AdapterError::DuplicateSlot { slot: name });
        }

        match (rule.kind, &rule.source) {
            (SourceKind::Positional, SourceRef::Index(_)) => positional_inputs += 1,
            (SourceKind::Keyword, SourceRef::Key(k)) if k.is_empty() => {
                return Err(AdapterError::EmptySourceKey { slot: name });
            }
            (SourceKind::Keyword, SourceRef::Key(_)) => keyword_inputs += 1,
            (SourceKind::Positional, SourceRef::Key(_)) => {
                return Err(AdapterError::SourceKindMismatch {
                    slot: name,
                    kind: SourceKind::Positional.label(),
                    expected: "an index",
                });
            }
            (SourceKind::Keyword, SourceRef::Index(_)) => {
                return Err(AdapterError::SourceKindMismatch {
                    slot: name,
                    kind: SourceKind::Keyword.label(),
                    expected: "a key",
                });
            }
        }

        if options.forbid_cross_influence {
            let crosses = matches!(
                (slot, rule.kind),
                (OutputSlot::Position(_), SourceKind::Keyword)
                    | (OutputSlot::Key(_), SourceKind::Positional)
            );
            if crosses {
                return Err(AdapterError::CrossInfluence { slot: name });
            }
        }

        match rule.inner_key.as_deref() {
            Some("") => return Err(AdapterError::EmptyInnerKey { slot: name }),
            Some(_) if options.forbid_inner_keys => {
                return Err(AdapterError::InnerKeyForbidden { slot: name });
            }
            None if options.require_inner_keys => {
                return Err(AdapterError::InnerKeyRequired { slot: name });
            }
            _ => {}
        }
    }

    if options.forbid_mixed_inputs && positional_inputs > 0 && keyword_inputs > 0 {
        return Err(AdapterError::MixedInputs);
    }
    if options.forbid_mixed_outputs && !positions.is_empty() && keyword_outputs > 0 {
        return Err(AdapterError::MixedOutputs);
    }

    if let Some(&position) = positions.iter().find(|&&p| p > MAX_OUTPUT_POSITION) {
        return Err(AdapterError::PositionTooLarge {
            position,
            max: MAX_OUTPUT_POSITION,
        });
    }
    let arity = positions.iter().max().map_or(0, |max| max + 1);
    if !options.fill_gaps_with_null && arity != positions.len() {
        return Err(AdapterError::NonContiguousPositions {
            max: arity - 1,
            count: positions.len(),
        });
    }

    Ok(arity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots_0_and_2() -> AdapterSpec {
        vec![
            (OutputSlot::from(0), SourceRule::positional(0)),
            (OutputSlot::from(2), SourceRule::positional(1)),
        ]
    }

    #[test]
    fn test_gap_rejected_without_fill() {
        let err = ArgumentAdapter::new(slots_0_and_2(), AdapterOptions::default()).unwrap_err();
        assert_eq!(err, AdapterError::NonContiguousPositions { max: 2, count: 2 });
    }

    #[test]
    fn test_gap_filled_with_null() {
        let adapter =
            ArgumentAdapter::new(slots_0_and_2(), AdapterOptions::default().fill_gaps_with_null())
                .unwrap();
        assert_eq!(adapter.positional_arity(), 3);

        let args = Args::new().with_positional(1.0).with_positional(3.0);
        let out = adapter.transform(&args).unwrap();
        assert_eq!(
            out.positional_values(),
            &[Value::Number(1.0), Value::Null, Value::Number(3.0)]
        );
    }

    #[test]
    fn test_oversized_position_rejected_at_construction() {
        for position in [usize::MAX, 1 << 40, MAX_OUTPUT_POSITION + 1] {
            let spec = vec![(OutputSlot::Position(position), SourceRule::positional(0))];
            for options in [
                AdapterOptions::default(),
                AdapterOptions::default().fill_gaps_with_null(),
            ] {
                assert_eq!(
                    ArgumentAdapter::new(spec.clone(), options),
                    Err(AdapterError::PositionTooLarge {
                        position,
                        max: MAX_OUTPUT_POSITION
                    })
                );
            }
        }

        let edge = vec![(
            OutputSlot::Position(MAX_OUTPUT_POSITION),
            SourceRule::positional(0),
        )];
        let adapter =
            ArgumentAdapter::new(edge, AdapterOptions::default().fill_gaps_with_null()).unwrap();
        assert_eq!(adapter.positional_arity(), MAX_OUTPUT_POSITION + 1);
    }

    #[test]
    fn test_duplicate_slot_rejected_at_construction() {
        let spec = vec![
            (OutputSlot::from("x"), SourceRule::keyword("a")),
            (OutputSlot::from("x"), SourceRule::keyword("b")),
        ];
        assert_eq!(
            ArgumentAdapter::new(spec, AdapterOptions::default()),
            Err(AdapterError::DuplicateSlot {
                slot: "'x'".to_string()
            })
        );
    }

    #[test]
    fn test_empty_keys_rejected() {
        let spec = vec![(OutputSlot::from(""), SourceRule::keyword("a"))];
        assert_eq!(
            ArgumentAdapter::new(spec, AdapterOptions::default()),
            Err(AdapterError::EmptyOutputKey)
        );

        let spec = vec![(OutputSlot::from("x"), SourceRule::keyword(""))];
        assert!(matches!(
            ArgumentAdapter::new(spec, AdapterOptions::default()),
            Err(AdapterError::EmptySourceKey { .. })
        ));

        let spec = vec![(OutputSlot::from("x"), SourceRule::keyword("a").inner(""))];
        assert!(matches!(
            ArgumentAdapter::new(spec, AdapterOptions::default()),
            Err(AdapterError::EmptyInnerKey { .. })
        ));
    }

    #[test]
    fn test_source_kind_mismatch() {
        let rule = SourceRule::new(SourceKind::Positional, SourceRef::Key("a".into()), None);
        let err = ArgumentAdapter::new(vec![(OutputSlot::from(0), rule)], AdapterOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            AdapterError::SourceKindMismatch {
                slot: "#0".to_string(),
                kind: "positional",
                expected: "an index",
            }
        );
    }

    #[test]
    fn test_source_kind_parsing() {
        assert_eq!("posarg".parse::<SourceKind>().unwrap(), SourceKind::Positional);
        assert_eq!("K".parse::<SourceKind>().unwrap(), SourceKind::Keyword);
        assert!(matches!(
            "x".parse::<SourceKind>(),
            Err(AdapterError::UnknownSourceKind(_))
        ));
        assert!("".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_mixed_inputs_and_outputs() {
        let spec = vec![
            (OutputSlot::from(0), SourceRule::positional(0)),
            (OutputSlot::from("k"), SourceRule::keyword("a")),
        ];

        assert!(ArgumentAdapter::new(spec.clone(), AdapterOptions::default()).is_ok());
        assert_eq!(
            ArgumentAdapter::new(spec.clone(), AdapterOptions::default().forbid_mixed_inputs()),
            Err(AdapterError::MixedInputs)
        );
        assert_eq!(
            ArgumentAdapter::new(spec, AdapterOptions::default().forbid_mixed_outputs()),
            Err(AdapterError::MixedOutputs)
        );
    }

    #[test]
    fn test_cross_influence() {
        let spec = vec![(OutputSlot::from(0), SourceRule::keyword("a"))];
        assert!(ArgumentAdapter::new(spec.clone(), AdapterOptions::default()).is_ok());
        assert!(matches!(
            ArgumentAdapter::new(spec, AdapterOptions::default().forbid_cross_influence()),
            Err(AdapterError::CrossInfluence { .. })
        ));

        let spec = vec![(OutputSlot::from("k"), SourceRule::positional(0))];
        assert!(matches!(
            ArgumentAdapter::new(spec, AdapterOptions::default().forbid_cross_influence()),
            Err(AdapterError::CrossInfluence { .. })
        ));
    }

    #[test]
    fn test_inner_key_policies() {
        let bare = vec![(OutputSlot::from(0), SourceRule::positional(0))];
        let inner = vec![(OutputSlot::from(0), SourceRule::positional(0).inner("v"))];

        assert!(matches!(
            ArgumentAdapter::new(bare.clone(), AdapterOptions::default().require_inner_keys()),
            Err(AdapterError::InnerKeyRequired { .. })
        ));
        assert!(ArgumentAdapter::new(inner.clone(), AdapterOptions::default().require_inner_keys())
            .is_ok());

        assert!(matches!(
            ArgumentAdapter::new(inner, AdapterOptions::default().forbid_inner_keys()),
            Err(AdapterError::InnerKeyForbidden { .. })
        ));
        assert!(ArgumentAdapter::new(bare.clone(), AdapterOptions::default().forbid_inner_keys())
            .is_ok());

        assert_eq!(
            ArgumentAdapter::new(
                bare,
                AdapterOptions::default()
                    .require_inner_keys()
                    .forbid_inner_keys()
            ),
            Err(AdapterError::ConflictingInnerKeyPolicies)
        );
    }

    #[test]
    fn test_transform_lookup_errors() {
        let adapter = ArgumentAdapter::new(
            vec![(OutputSlot::from("v"), SourceRule::keyword("node").inner("spot"))],
            AdapterOptions::default(),
        )
        .unwrap();

        let missing = Args::new();
        assert_eq!(
            adapter.transform(&missing),
            Err(LookupError::MissingKeyword {
                key: "node".to_string()
            })
        );

        let scalar = Args::new().with_keyword("node", 1.0);
        assert!(matches!(
            adapter.transform(&scalar),
            Err(LookupError::NotAMap { found: "number", .. })
        ));

        let no_inner = Args::new().with_keyword("node", Value::map([("other", 1.0)]));
        assert!(matches!(
            adapter.transform(&no_inner),
            Err(LookupError::MissingInnerKey { .. })
        ));
    }

    #[test]
    fn test_empty_spec_is_identity_of_nothing() {
        let adapter = ArgumentAdapter::new(Vec::new(), AdapterOptions::default()).unwrap();
        let out = adapter.transform(&Args::new().with_positional(1.0)).unwrap();
        assert!(out.is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn test_reversal_spec_permutes_positions(values in prop::collection::vec(-1e6f64..1e6, 1..16)) {
                let n = values.len();
                let spec: AdapterSpec = (0..n)
                    .map(|i| (OutputSlot::from(i), SourceRule::positional(n - 1 - i)))
                    .collect();
                let adapter = ArgumentAdapter::new(spec, AdapterOptions::default()).unwrap();

                let args = Args::from_parts(values.iter().copied().map(Value::from).collect(), BTreeMap::new());
                let out = adapter.transform(&args).unwrap();
                for i in 0..n {
                    prop_assert_eq!(out.number_at(i).unwrap(), values[n - 1 - i]);
                }
            }

            #[test]
            fn test_gaps_fail_unless_filled(positions in prop::collection::btree_set(0usize..12, 1..8)) {
                let spec: AdapterSpec = positions
                    .iter()
                    .map(|&p| (OutputSlot::from(p), SourceRule::positional(0)))
                    .collect();
                let max = *positions.iter().max().unwrap();
                let dense = max + 1 == positions.len();

                prop_assert_eq!(ArgumentAdapter::new(spec.clone(), AdapterOptions::default()).is_ok(), dense);

                let filled = ArgumentAdapter::new(spec, AdapterOptions::default().fill_gaps_with_null()).unwrap();
                let out = filled.transform(&Args::new().with_positional(5.0)).unwrap();
                prop_assert_eq!(out.positional_values().len(), max + 1);
                for i in 0..=max {
                    prop_assert_eq!(out.positional(i).unwrap().is_null(), !positions.contains(&i));
                }
            }
        }
    }
}
