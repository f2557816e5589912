//! ABI encoding

use alloy::primitives::U256;

use super::error::{AbiError, AbiResult};
use super::function::FunctionSpec;
use super::types::{AbiType, WORD};
use super::value::AbiValue;

/// Encode values against their declared types using the head/tail layout.
///
/// Offsets written for dynamic values are relative to the start of the
/// returned buffer.
pub fn encode_values(types: &[AbiType], values: &[AbiValue]) -> AbiResult<Vec<u8>> {
    if types.len() != values.len() {
        return Err(AbiError::ArgumentCountMismatch {
            function: String::new(),
            expected: types.len(),
            actual: values.len(),
        });
    }

    encode_sequence(types, values).map_err(|(index, ty)| AbiError::TypeMismatch { index, ty })
}

/// Encode a complete call: `selector || arguments`.
pub fn encode_call(function: &FunctionSpec, values: &[AbiValue]) -> AbiResult<Vec<u8>> {
    if function.inputs.len() != values.len() {
        return Err(AbiError::ArgumentCountMismatch {
            function: function.name.clone(),
            expected: function.inputs.len(),
            actual: values.len(),
        });
    }

    let types: Vec<AbiType> = function.inputs.iter().map(|p| p.ty.clone()).collect();
    let mut data = function.selector.to_vec();
    data.extend(encode_values(&types, values)?);
    Ok(data)
}

/// On a type mismatch, yields the index and type of the offending value.
fn encode_sequence(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, (usize, String)> {
    let head_size = types
        .iter()
        .fold(0usize, |total, ty| total.saturating_add(ty.head_size()));

    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (index, (ty, value)) in types.iter().zip(values).enumerate() {
        let encoded = encode_value(ty, value).ok_or_else(|| (index, ty.to_string()))?;
        if ty.is_dynamic() {
            head.extend(encode_usize(head_size.saturating_add(tail.len())));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &AbiValue) -> Option<Vec<u8>> {
    match (ty, value) {
        (AbiType::Address, AbiValue::Address(addr)) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            Some(word.to_vec())
        }
        (AbiType::Bool, AbiValue::Bool(b)) => Some(encode_u256(U256::from(*b as u8))),
        (AbiType::Uint(bits), AbiValue::Uint(n)) if n.bit_len() <= *bits => Some(encode_u256(*n)),
        (AbiType::Int(bits), AbiValue::Int(n)) if fits_signed(n.into_raw(), *bits) => {
            Some(encode_u256(n.into_raw()))
        }
        (AbiType::FixedBytes(size), AbiValue::FixedBytes(bytes)) if bytes.len() <= *size => {
            let mut word = [0u8; WORD];
            word[..bytes.len()].copy_from_slice(bytes);
            Some(word.to_vec())
        }
        (AbiType::Bytes, AbiValue::Bytes(bytes)) => Some(encode_bytes(bytes)),
        (AbiType::String, AbiValue::String(s)) => Some(encode_bytes(s.as_bytes())),
        (AbiType::Array(inner), AbiValue::Array(items)) => {
            let types = vec![(**inner).clone(); items.len()];
            let mut out = encode_usize(items.len());
            out.extend(encode_sequence(&types, items).ok()?);
            Some(out)
        }
        (AbiType::FixedArray(inner, size), AbiValue::Array(items)) if items.len() == *size => {
            let types = vec![(**inner).clone(); *size];
            encode_sequence(&types, items).ok()
        }
        (AbiType::Tuple(members), AbiValue::Tuple(items)) if members.len() == items.len() => {
            encode_sequence(members, items).ok()
        }
        _ => None,
    }
}

/// True when sign-extending the low `bits` bits reproduces `raw`.
fn fits_signed(raw: U256, bits: usize) -> bool {
    super::decode::sign_extend(raw, bits) == raw
}

fn encode_u256(value: U256) -> Vec<u8> {
    value.to_be_bytes::<32>().to_vec()
}

fn encode_usize(value: usize) -> Vec<u8> {
    encode_u256(U256::from(value))
}

/// Length word followed by the content, zero-padded to a word boundary.
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = encode_usize(data.len());
    let padded_len = data.len().div_ceil(WORD) * WORD;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    out.extend(padded);
    out
}
