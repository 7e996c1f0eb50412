//! Shared schema and message fixtures for the benches.

use zephyr_core::{BuiltinType, ByteBuffer};
use zephyr_schema::{
    DefinitionIndex, DefinitionKind, FieldSpec, FieldType, Schema, SchemaBuilder, Value,
};

/// Schema with a message mixing every repetition and a nested struct.
pub struct TradeFixture {
    /// Parsed schema.
    pub schema: Schema,
    /// Index of the `Trade` message.
    pub trade: DefinitionIndex,
    /// One encoded `Trade`.
    pub wire: Vec<u8>,
}

/// Builds the `Trade` fixture with `levels` book levels in the message.
///
/// # Panics
/// Panics if the fixture schema fails to build, which would be a bug here.
#[must_use]
pub fn trade_fixture(levels: usize) -> TradeFixture {
    let mut builder = SchemaBuilder::new();
    let side = builder.definition("Side", DefinitionKind::Enum);
    let level = builder.definition("Level", DefinitionKind::Struct);
    let trade = builder.definition("Trade", DefinitionKind::Message);
    builder
        .field(side, FieldSpec::variant("BUY", 0))
        .field(side, FieldSpec::variant("SELL", 1))
        .field(level, FieldSpec::new("price", BuiltinType::Double, 0))
        .field(level, FieldSpec::new("qty", BuiltinType::Uint64, 0))
        .field(trade, FieldSpec::new("id", BuiltinType::Uint64, 1))
        .field(trade, FieldSpec::new("side", FieldType::Reference(side), 2))
        .field(trade, FieldSpec::new("levels", FieldType::Reference(level), 3).array())
        .field(
            trade,
            FieldSpec::new("tags", BuiltinType::String, 4).map(BuiltinType::String),
        )
        .field(trade, FieldSpec::new("venue", BuiltinType::String, 5));
    let schema = builder.build().expect("fixture schema");

    let levels = (0..levels)
        .map(|i| {
            Value::Struct(vec![
                ("price".into(), Value::Double(100.0 + i as f64 * 0.25)),
                ("qty".into(), Value::Uint64(10 * i as u64 + 1)),
            ])
        })
        .collect();
    let mut buffer = ByteBuffer::new();
    schema
        .encode_message(
            &mut buffer,
            trade,
            &[
                ("id".into(), Value::Uint64(981_223)),
                ("side".into(), Value::Uint(1)),
                ("levels".into(), Value::Array(levels)),
                (
                    "tags".into(),
                    Value::Map(vec![
                        (Value::from("desk"), Value::from("emea")),
                        (Value::from("algo"), Value::from("twap")),
                    ]),
                ),
                ("venue".into(), Value::from("XLON")),
            ],
        )
        .expect("fixture message");

    TradeFixture {
        schema,
        trade,
        wire: buffer.into_vec(),
    }
}

/// Reads the `venue` field of an encoded `Trade`, skipping everything else.
///
/// # Errors
/// Propagates skip and read failures.
pub fn read_venue(fixture: &TradeFixture, reader: &mut ByteBuffer<'_>) -> zephyr_schema::Result<usize> {
    loop {
        let id = reader.read_var_uint()?;
        match id {
            0 => return Ok(0),
            5 => return Ok(reader.read_string()?.len()),
            _ => fixture.schema.skip_field(reader, fixture.trade, id)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_venue_skips_to_last_field() {
        let fixture = trade_fixture(8);
        let mut reader = ByteBuffer::read_only(&fixture.wire);
        assert_eq!(read_venue(&fixture, &mut reader), Ok(4));
        assert_eq!(reader.read_var_uint(), Ok(0));
        assert_eq!(reader.remaining(), 0);
    }
}
