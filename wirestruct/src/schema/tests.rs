use super::*;
use crate::{FieldOptions, WireFormat};

fn point() -> MessageType {
    let mut builder = MessageType::builder("Point");
    builder
        .scalar("x", WireFormat::INT32BE, FieldOptions::new())
        .and_then(|builder| builder.scalar("y", WireFormat::INT32BE, FieldOptions::new()))
        .expect("should declare the fields");
    builder.finalize().expect("should finalize")
}

#[test]
fn lookup_fields() {
    let point = point();
    assert_eq!(point.name(), "Point");
    assert_eq!(point.fields().len(), 2);
    assert_eq!(point.steps().len(), 2);
    assert_eq!(point.field("y").map(FieldDescriptor::name), Some("y"));
    assert!(point.field("z").is_none());
}

#[test]
fn clones_share_the_schema() {
    let point = point();
    assert_eq!(point.clone(), point);
    assert_ne!(point, self::point());
}

#[test]
fn instances_belong_to_the_type() {
    let point = point();
    assert_eq!(point.instance().message_type(), &point);
}

#[test]
fn subtypes_inherit_the_message_reader() {
    let mut builder = MessageType::builder("Opaque");
    builder
        .reader(|_, de| {
            de.read_remaining();
            Ok(())
        })
        .expect("should install the reader");
    let opaque = builder.finalize().expect("should finalize");
    assert!(opaque.has_custom_reader());

    let child = opaque.extend("Child").finalize().expect("should finalize");
    assert!(child.has_custom_reader());
    assert!(!point().has_custom_reader());
}

#[test]
fn debug_names_the_type() {
    let debug = format!("{:?}", point());
    assert!(debug.starts_with("MessageType { name: \"Point\""));
}
