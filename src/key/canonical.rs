//! Canonical byte encoding of call arguments.
//!
//! Layout (version 1): one version byte, then the positional arguments encoded
//! as a list, then the keyword arguments encoded as a map. Every value is a tag
//! byte followed by a fixed-width or length-prefixed payload; all integers are
//! big-endian. Map entries are emitted in byte-wise key order.

use super::args::{ArgValue, CallArgs, BYPASS_KEYWORD};
use crate::{Error, ErrorContext, Result};

pub const ENCODING_VERSION: u8 = 1;

const TAG_NULL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_INT: u8 = 0x03;
const TAG_UINT: u8 = 0x04;
const TAG_FLOAT: u8 = 0x05;
const TAG_STR: u8 = 0x06;
const TAG_BYTES: u8 = 0x07;
const TAG_LIST: u8 = 0x08;
const TAG_MAP: u8 = 0x09;

/// Encode the hashed material of a call: positional args plus keyword args
/// without the bypass keyword.
pub fn encode_call(args: &CallArgs) -> Result<Vec<u8>> {
    let mut out = vec![ENCODING_VERSION];

    out.push(TAG_LIST);
    write_len(&mut out, args.positional().len());
    for (i, value) in args.positional().iter().enumerate() {
        encode_value(&mut out, value, &|| format!("args.positional[{}]", i))?;
    }

    let keyword: Vec<_> = args
        .keyword()
        .iter()
        .filter(|(name, _)| name.as_str() != BYPASS_KEYWORD)
        .collect();
    out.push(TAG_MAP);
    write_len(&mut out, keyword.len());
    for (name, value) in keyword {
        write_bytes(&mut out, name.as_bytes());
        encode_value(&mut out, value, &|| format!("args.keyword.{}", name))?;
    }

    Ok(out)
}

/// Encode a single value.
pub fn encode(value: &ArgValue) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_value(&mut out, value, &|| "value".to_string())?;
    Ok(out)
}

fn encode_value(
    out: &mut Vec<u8>,
    value: &ArgValue,
    path: &dyn Fn() -> String,
) -> Result<()> {
    match value {
        ArgValue::Null => out.push(TAG_NULL),
        ArgValue::Bool(false) => out.push(TAG_FALSE),
        ArgValue::Bool(true) => out.push(TAG_TRUE),
        ArgValue::Int(i) => {
            out.push(TAG_INT);
            out.extend_from_slice(&i.to_be_bytes());
        }
        ArgValue::UInt(u) => match i64::try_from(*u) {
            Ok(i) => {
                out.push(TAG_INT);
                out.extend_from_slice(&i.to_be_bytes());
            }
            Err(_) => {
                out.push(TAG_UINT);
                out.extend_from_slice(&u.to_be_bytes());
            }
        },
        ArgValue::Float(f) => {
            if f.is_nan() {
                return Err(Error::serialization_with_context(
                    "NaN has no canonical encoding",
                    ErrorContext::new()
                        .with_field_path(path())
                        .with_source("key_deriver"),
                ));
            }
            // -0.0 == 0.0, so both must hash alike
            let normalized = if *f == 0.0 { 0.0f64 } else { *f };
            out.push(TAG_FLOAT);
            out.extend_from_slice(&normalized.to_bits().to_be_bytes());
        }
        ArgValue::Str(s) => {
            out.push(TAG_STR);
            write_bytes(out, s.as_bytes());
        }
        ArgValue::Bytes(b) => {
            out.push(TAG_BYTES);
            write_bytes(out, b);
        }
        ArgValue::List(items) => {
            out.push(TAG_LIST);
            write_len(out, items.len());
            for (i, item) in items.iter().enumerate() {
                encode_value(out, item, &|| format!("{}[{}]", path(), i))?;
            }
        }
        ArgValue::Map(map) => {
            out.push(TAG_MAP);
            write_len(out, map.len());
            for (key, item) in map {
                write_bytes(out, key.as_bytes());
                encode_value(out, item, &|| format!("{}.{}", path(), key))?;
            }
        }
    }
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_be_bytes());
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_len(out, bytes.len());
    out.extend_from_slice(bytes);
}
