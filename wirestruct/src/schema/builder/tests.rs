use super::*;
use crate::readers;

fn steps(steps: &[Step]) -> Vec<(usize, Phase)> {
    steps.iter().map(|step| (step.field(), step.phase())).collect()
}

fn names(fields: &[FieldDescriptor]) -> Vec<&str> {
    fields.iter().map(FieldDescriptor::name).collect()
}

fn base() -> Builder {
    let mut builder = Builder::new("Base");
    builder
        .scalar("a", WireFormat::UINT8, FieldOptions::new())
        .and_then(|builder| builder.scalar("b", WireFormat::UINT16BE, FieldOptions::new()))
        .and_then(|builder| builder.scalar("c", WireFormat::UINT32LE, FieldOptions::new()))
        .expect("should declare the fields");
    builder
}

#[test]
fn finalize_twice() {
    let mut builder = base();
    assert!(builder.finalize().is_ok());
    assert!(builder.is_finalized());
    assert_eq!(
        builder.finalize().unwrap_err(),
        Error::Finalized(String::from("Base"))
    );
}

#[test]
fn declare_after_finalize() {
    let mut builder = base();
    builder.finalize().expect("should finalize");
    assert_eq!(
        builder
            .scalar("d", WireFormat::UINT8, FieldOptions::new())
            .unwrap_err(),
        Error::Finalized(String::from("Base"))
    );
    assert_eq!(
        builder.reader(|_, _| Ok(())).unwrap_err(),
        Error::Finalized(String::from("Base"))
    );
    assert_eq!(builder.fields().len(), 3);
}

#[test]
fn declaration_order() {
    let builder = base();
    assert_eq!(names(builder.fields()), ["a", "b", "c"]);
    assert_eq!(
        steps(builder.steps()),
        [(0, Phase::Write), (1, Phase::Write), (2, Phase::Write)]
    );
}

#[test]
fn duplicate_field() {
    let mut builder = base();
    assert_eq!(
        builder
            .string("b", FieldOptions::new())
            .unwrap_err(),
        Error::DuplicateField(String::from("b"))
    );
    assert_eq!(names(builder.fields()), ["a", "b", "c"]);
}

#[test]
fn redeclare_inherited_moves_to_end() {
    let parent = base().finalize().expect("should finalize");
    let mut child = parent.extend("Child");
    child
        .scalar("a", WireFormat::INT64BE, FieldOptions::new())
        .expect("should re-declare the field");
    assert_eq!(names(child.fields()), ["b", "c", "a"]);
    assert_eq!(
        child.fields()[2].kind(),
        FieldKind::Scalar(WireFormat::INT64BE)
    );
    assert_eq!(
        steps(child.steps()),
        [(0, Phase::Write), (1, Phase::Write), (2, Phase::Write)]
    );

    // Only once.
    assert_eq!(
        child
            .scalar("a", WireFormat::UINT8, FieldOptions::new())
            .unwrap_err(),
        Error::DuplicateField(String::from("a"))
    );
}

#[test]
fn extend_copies_a_snapshot() {
    let parent = base().finalize().expect("should finalize");
    let mut child = parent.extend("Child");
    child
        .stringz("d", FieldOptions::new())
        .expect("should declare the field");
    let child = child.finalize().expect("should finalize");

    assert_eq!(names(parent.fields()), ["a", "b", "c"]);
    assert_eq!(names(child.fields()), ["a", "b", "c", "d"]);
    assert_eq!(child.name(), "Child");
}

#[test]
fn derive_copies_a_snapshot() {
    let mut parent = base();
    let mut child = parent.derive("Child").expect("should derive");
    parent
        .scalar("p", WireFormat::UINT8, FieldOptions::new())
        .expect("should declare the field");
    child
        .scalar("q", WireFormat::UINT8, FieldOptions::new())
        .expect("should declare the field");

    assert_eq!(names(parent.fields()), ["a", "b", "c", "p"]);
    assert_eq!(names(child.fields()), ["a", "b", "c", "q"]);
}

#[test]
fn length_prefix_steps() {
    let mut builder = Builder::new("Framed");
    builder
        .scalar("head", WireFormat::UINT8, FieldOptions::new())
        .and_then(|builder| {
            builder.length_prefixed("len", WireFormat::UINT16BE, FieldOptions::new(), |inner| {
                inner
                    .scalar("x", WireFormat::UINT8, FieldOptions::new())?
                    .scalar("y", WireFormat::UINT8, FieldOptions::new())?;
                Ok(())
            })
        })
        .and_then(|builder| builder.scalar("tail", WireFormat::UINT8, FieldOptions::new()))
        .expect("should declare the fields");

    assert_eq!(names(builder.fields()), ["head", "len", "x", "y", "tail"]);
    assert_eq!(builder.fields()[1].group(), 2);
    assert!(builder.fields()[1].is_length_prefix());
    assert_eq!(
        steps(builder.steps()),
        [
            (0, Phase::Write),
            (1, Phase::Before),
            (1, Phase::Write),
            (2, Phase::Write),
            (3, Phase::Write),
            (1, Phase::After),
            (4, Phase::Write),
        ]
    );
}

#[test]
fn nested_length_prefixes() {
    let mut builder = Builder::new("Nested");
    builder
        .length_prefixed("outer", WireFormat::UINT32LE, FieldOptions::new(), |outer| {
            outer
                .scalar("x", WireFormat::UINT8, FieldOptions::new())?
                .length_prefixed("inner", WireFormat::UINT8, FieldOptions::new(), |inner| {
                    inner.scalar("y", WireFormat::UINT8, FieldOptions::new())?;
                    Ok(())
                })?;
            Ok(())
        })
        .expect("should declare the fields");

    assert_eq!(builder.fields()[0].group(), 3);
    assert_eq!(builder.fields()[2].group(), 1);
    assert_eq!(
        steps(builder.steps()),
        [
            (0, Phase::Before),
            (0, Phase::Write),
            (1, Phase::Write),
            (2, Phase::Before),
            (2, Phase::Write),
            (3, Phase::Write),
            (2, Phase::After),
            (0, Phase::After),
        ]
    );
}

#[test]
fn failed_length_prefix_rolls_back() {
    let mut builder = base();
    let result = builder.length_prefixed("len", WireFormat::UINT8, FieldOptions::new(), |inner| {
        inner.scalar("x", WireFormat::UINT8, FieldOptions::new())?;
        inner.scalar("a", WireFormat::UINT8, FieldOptions::new())?;
        Ok(())
    });
    assert_eq!(result.unwrap_err(), Error::DuplicateField(String::from("a")));
    assert_eq!(names(builder.fields()), ["a", "b", "c"]);
    assert_eq!(builder.steps().len(), 3);

    builder
        .scalar("len", WireFormat::UINT8, FieldOptions::new())
        .expect("should declare the field");
    assert!(builder.finalize().is_ok());
}

#[test]
fn failed_length_prefix_restores_inherited_field() {
    let parent = base().finalize().expect("should finalize");
    let mut child = parent.extend("Child");
    let result = child.length_prefixed("b", WireFormat::UINT8, FieldOptions::new(), |inner| {
        inner.scalar("x", WireFormat::UINT8, FieldOptions::new())?;
        inner.scalar("x", WireFormat::UINT8, FieldOptions::new())?;
        Ok(())
    });
    assert_eq!(result.unwrap_err(), Error::DuplicateField(String::from("x")));
    assert_eq!(names(child.fields()), ["a", "b", "c"]);
    assert_eq!(
        child.fields()[1].kind(),
        FieldKind::Scalar(WireFormat::UINT16BE)
    );
    assert_eq!(
        steps(child.steps()),
        [(0, Phase::Write), (1, Phase::Write), (2, Phase::Write)]
    );

    // Still inherited, so it can be re-declared.
    child
        .scalar("b", WireFormat::UINT8, FieldOptions::new())
        .expect("should re-declare the field");
    assert_eq!(names(child.fields()), ["a", "c", "b"]);
}

#[test]
fn redeclare_inside_length_prefix() {
    let parent = base().finalize().expect("should finalize");
    let mut child = parent.extend("Child");
    let result = child.length_prefixed("len", WireFormat::UINT8, FieldOptions::new(), |inner| {
        inner.scalar("a", WireFormat::UINT8, FieldOptions::new())?;
        Ok(())
    });
    assert!(matches!(
        result.unwrap_err(),
        Error::InvalidDeclaration { field, .. } if field == "a"
    ));
    assert_eq!(names(child.fields()), ["a", "b", "c"]);
}

#[test]
fn redeclare_shrinks_enclosing_groups() {
    let mut builder = Builder::new("Base");
    builder
        .length_prefixed("len", WireFormat::UINT8, FieldOptions::new(), |inner| {
            inner
                .scalar("a", WireFormat::UINT8, FieldOptions::new())?
                .scalar("b", WireFormat::UINT8, FieldOptions::new())?;
            Ok(())
        })
        .and_then(|builder| builder.scalar("c", WireFormat::UINT8, FieldOptions::new()))
        .expect("should declare the fields");
    let parent = builder.finalize().expect("should finalize");

    let mut child = parent.extend("Child");
    child
        .scalar("a", WireFormat::UINT16LE, FieldOptions::new())
        .expect("should re-declare the field");
    assert_eq!(names(child.fields()), ["len", "b", "c", "a"]);
    assert_eq!(child.fields()[0].group(), 1);
    assert_eq!(
        steps(child.steps()),
        [
            (0, Phase::Before),
            (0, Phase::Write),
            (1, Phase::Write),
            (0, Phase::After),
            (2, Phase::Write),
            (3, Phase::Write),
        ]
    );

    assert!(matches!(
        child
            .scalar("len", WireFormat::UINT8, FieldOptions::new())
            .unwrap_err(),
        Error::InvalidDeclaration { field, .. } if field == "len"
    ));
}

#[test]
fn conflicting_options() {
    let mut builder = Builder::new("Conflicts");
    let conflicts = [
        builder
            .scalar(
                "both",
                WireFormat::UINT8,
                FieldOptions::new().default_value(1u8).always(2u8),
            )
            .map(|_| ()),
        builder
            .scalar("inclusive", WireFormat::UINT8, FieldOptions::new().inclusive())
            .map(|_| ()),
        builder
            .length_prefixed(
                "always",
                WireFormat::UINT8,
                FieldOptions::new().always(0u8),
                |_| Ok(()),
            )
            .map(|_| ()),
        builder
            .length_prefixed("float", WireFormat::FLOAT32BE, FieldOptions::new(), |_| Ok(()))
            .map(|_| ()),
        builder
            .length_prefixed("array", WireFormat::UINT8, FieldOptions::new().array(), |_| {
                Ok(())
            })
            .map(|_| ()),
    ];
    for result in conflicts {
        assert!(matches!(result, Err(Error::InvalidDeclaration { .. })));
    }
    assert!(builder.fields().is_empty());
    assert!(builder.steps().is_empty());
}

#[test]
fn array_option_declares_an_array() {
    let mut builder = Builder::new("Arrays");
    builder
        .scalar("values", WireFormat::INT16BE, FieldOptions::new().array())
        .expect("should declare the field");
    assert_eq!(
        builder.fields()[0].kind(),
        FieldKind::Array(WireFormat::INT16BE)
    );
    assert!(!builder.fields()[0].has_reader());
}

#[test]
fn finalize_inside_length_prefix() {
    let mut builder = Builder::new("Open");
    let result = builder.length_prefixed("len", WireFormat::UINT8, FieldOptions::new(), |inner| {
        inner.finalize().map(|_| ())
    });
    assert!(matches!(result, Err(Error::InvalidDeclaration { .. })));
    assert!(!builder.is_finalized());
    assert!(builder.finalize().is_ok());
}

#[test]
fn derive_inside_length_prefix() {
    let mut builder = Builder::new("Open");
    let result = builder.length_prefixed("len", WireFormat::UINT8, FieldOptions::new(), |inner| {
        inner.derive("Copy").map(|_| ())
    });
    assert!(matches!(result, Err(Error::InvalidDeclaration { .. })));
}

#[test]
fn require_readers() {
    let mut builder = Builder::new("Strict");
    builder
        .require_readers()
        .string("name", FieldOptions::new())
        .expect("should declare the field");
    assert_eq!(
        builder.finalize().unwrap_err(),
        Error::NotImplemented {
            type_name: String::from("Strict"),
            field: String::from("name"),
            operation: "deserialize",
        }
    );

    let mut builder = Builder::new("Strict");
    builder
        .require_readers()
        .string("name", FieldOptions::new().reader(readers::remaining()))
        .and_then(|builder| builder.stringz("magic", FieldOptions::new().always("MAGIC")))
        .expect("should declare the fields");
    assert!(builder.finalize().is_ok());
}

#[test]
fn lenient_by_default() {
    let mut builder = Builder::new("Lenient");
    builder
        .array("values", WireFormat::UINT8, FieldOptions::new())
        .expect("should declare the field");
    assert!(builder.finalize().is_ok());
}
