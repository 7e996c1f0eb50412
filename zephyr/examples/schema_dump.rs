//! Prints a schema description in source form.
//!
//! Run with: `cargo run --example schema_dump`

use zephyr::prelude::*;

fn type_name(schema: &Schema, field_type: FieldType) -> String {
    match field_type {
        FieldType::Builtin(builtin) => builtin.schema_name().to_string(),
        FieldType::Reference(index) => schema.definition_name(index).unwrap_or_default(),
    }
}

fn dump(schema: &Schema) {
    for definition in schema.definitions() {
        println!(
            "{} {} {{",
            definition.kind.keyword(),
            String::from_utf8_lossy(schema.name(definition.name))
        );
        for field in &definition.fields {
            let name = String::from_utf8_lossy(schema.name(field.name));
            let value = field.shape.value;
            if definition.kind == DefinitionKind::Enum {
                println!("  {name} = {value};");
                continue;
            }
            let ty = type_name(schema, field.shape.field_type);
            let ty = match field.repetition() {
                Repetition::Single => ty,
                Repetition::Array => format!("{ty}[]"),
                Repetition::FixedArray(size) => format!("{ty}[{size}]"),
                Repetition::Map(key) => format!("map<{}, {ty}>", type_name(schema, key)),
            };
            if definition.kind == DefinitionKind::Message {
                println!("  {ty} {name} = {value};");
            } else {
                println!("  {ty} {name};");
            }
        }
        println!("}}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut builder = SchemaBuilder::new();
    let kind = builder.definition("NodeKind", DefinitionKind::Enum);
    let vec3 = builder.definition("Vec3", DefinitionKind::Struct);
    let node = builder.definition("Node", DefinitionKind::Message);
    builder
        .field(kind, FieldSpec::variant("GROUP", 0))
        .field(kind, FieldSpec::variant("MESH", 1))
        .field(vec3, FieldSpec::new("xyz", BuiltinType::Float32, 0).fixed_array(3))
        .field(node, FieldSpec::new("kind", FieldType::Reference(kind), 1))
        .field(node, FieldSpec::new("position", FieldType::Reference(vec3), 2))
        .field(node, FieldSpec::new("children", FieldType::Reference(node), 3).array())
        .field(
            node,
            FieldSpec::new("props", BuiltinType::Bytes, 4).map(BuiltinType::String),
        );

    let bytes = builder.to_bytes();
    let schema = Schema::from_bytes(&bytes)?;
    tracing::info!(bytes = bytes.len(), definitions = schema.definition_count(), "schema loaded");
    dump(&schema);
    Ok(())
}
