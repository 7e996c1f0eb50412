//! Reads one field of a message and skips every other field by schema.
//!
//! Run with: `RUST_LOG=debug cargo run --example partial_decode`

use zephyr::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut builder = SchemaBuilder::new();
    let side = builder.definition("Side", DefinitionKind::Enum);
    let level = builder.definition("Level", DefinitionKind::Struct);
    let order = builder.definition("Order", DefinitionKind::Message);
    builder
        .field(side, FieldSpec::variant("BUY", 0))
        .field(side, FieldSpec::variant("SELL", 1))
        .field(level, FieldSpec::new("price", BuiltinType::Double, 0))
        .field(level, FieldSpec::new("qty", BuiltinType::Uint64, 0))
        .field(order, FieldSpec::new("id", BuiltinType::Uint64, 1))
        .field(order, FieldSpec::new("side", FieldType::Reference(side), 2))
        .field(order, FieldSpec::new("levels", FieldType::Reference(level), 3).array())
        .field(
            order,
            FieldSpec::new("notes", BuiltinType::String, 4).map(BuiltinType::String),
        )
        .field(order, FieldSpec::new("symbol", BuiltinType::String, 5));
    let schema = Schema::from_bytes(&builder.to_bytes())?;

    let level_value = |price: f64, qty: u64| {
        Value::Struct(vec![
            ("price".into(), price.into()),
            ("qty".into(), qty.into()),
        ])
    };
    let mut wire = ByteBuffer::new();
    schema.encode_message(
        &mut wire,
        order,
        &[
            ("id".into(), Value::Uint64(42)),
            (
                "side".into(),
                Value::Enum {
                    value: 0,
                    name: Some("SELL".into()),
                },
            ),
            (
                "levels".into(),
                Value::Array(vec![level_value(101.5, 10), level_value(101.25, 300)]),
            ),
            (
                "notes".into(),
                Value::Map(vec![(Value::from("desk"), Value::from("emea"))]),
            ),
            ("symbol".into(), Value::from("ZPHR")),
        ],
    )?;
    println!("encoded order: {} bytes", wire.len());

    let order_def = schema.definition(order).ok_or("order definition missing")?;
    let mut reader = wire.reader();
    loop {
        let id = reader.read_var_uint()?;
        if id == 0 {
            break;
        }
        let field = order_def.field_by_value(id).ok_or("undeclared field id")?;
        let name = String::from_utf8_lossy(schema.name(field.name)).into_owned();
        if name == "symbol" {
            println!("symbol = {}", reader.read_str()?);
        } else {
            let start = reader.position();
            schema.skip_field(&mut reader, order, id)?;
            println!("skipped {name} ({} bytes)", reader.position() - start);
        }
    }

    let full = schema.decode(&mut wire.reader(), order)?;
    println!("full decode: {full:?}");
    Ok(())
}
