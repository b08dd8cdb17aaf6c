//! Integration tests for module exports.
//!
//! Verify that public modules and types are reachable via absolute paths and
//! behave consistently when used together from outside the crate.

/// Value model and argument types via absolute path.
#[test]
fn test_types_module_exports() {
    use lattice_core::types::args::Args;
    use lattice_core::types::value::{NodeData, Value};

    let mut node = NodeData::new();
    node.insert("spot".to_string(), Value::from(100.0));

    let args = Args::new()
        .with_positional(1.0)
        .with_keyword("node", node.clone());
    assert_eq!(args.number_at(0).unwrap(), 1.0);
    assert_eq!(args.inner_number("node", "spot").unwrap(), 100.0);
    assert_eq!(args.keyword("node").unwrap().as_map(), Some(&node));
}

/// Error hierarchy via absolute path, with conversions into the umbrella type.
#[test]
fn test_error_module_exports() {
    use lattice_core::types::error::{
        AdapterError, FormulaError, LatticeError, LookupError, StructureError,
    };

    let lattice: LatticeError = StructureError::NoRoot.into();
    assert!(matches!(lattice, LatticeError::Structure(_)));

    let lattice: LatticeError = AdapterError::MixedInputs.into();
    assert_eq!(
        lattice.to_string(),
        "Positional and keyword inputs cannot coexist"
    );

    let formula: FormulaError = LookupError::MissingPositional { index: 2, len: 1 }.into();
    assert!(matches!(formula, FormulaError::Lookup(_)));
}

/// Formula and adapter via absolute path, raw spec validated at construction.
#[test]
fn test_formula_module_exports() {
    use lattice_core::formula::{
        AdapterOptions, AdapterSource, Formula, OutputSlot, SourceKind, SourceRef, SourceRule,
    };
    use lattice_core::types::{AdapterError, Args, Value};

    let kind: SourceKind = "posargs".parse().unwrap();
    assert_eq!(kind, SourceKind::Positional);
    assert!("values".parse::<SourceKind>().is_err());

    let swap = Formula::with_adapter(
        |args: &Args| Ok(Value::from(args.number_at(0)? - args.number_at(1)?)),
        AdapterSource::Raw {
            spec: vec![
                (OutputSlot::from(0), SourceRule::positional(1)),
                (OutputSlot::from(1), SourceRule::positional(0)),
            ],
            options: AdapterOptions::default().forbid_mixed_inputs(),
        },
    )
    .unwrap();
    let out = swap
        .call(&Args::new().with_positional(1.0).with_positional(5.0))
        .unwrap();
    assert_eq!(out, Value::Number(4.0));

    // A rule whose declared kind disagrees with its reference.
    let bad = Formula::with_adapter(
        |_: &Args| Ok(Value::Null),
        AdapterSource::Raw {
            spec: vec![(
                OutputSlot::from(0),
                SourceRule::new(SourceKind::Keyword, SourceRef::Index(0), None),
            )],
            options: AdapterOptions::default(),
        },
    );
    assert!(matches!(bad, Err(AdapterError::SourceKindMismatch { .. })));
}

/// Node maps survive a JSON round trip untagged.
#[test]
fn test_value_serde_shape() {
    use lattice_core::types::Value;

    let node = Value::map([("spot", Value::from(100.0)), ("side", Value::from("L"))]);
    let json = serde_json::to_string(&node).unwrap();
    assert_eq!(json, r#"{"side":"L","spot":100.0}"#);
}
