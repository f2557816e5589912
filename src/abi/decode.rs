//! ABI decoding

use alloy::primitives::{Address, I256, U256};

use super::error::{AbiError, AbiResult};
use super::function::Parameter;
use super::types::{AbiType, MAX_TYPE_DEPTH, WORD};
use super::value::{AbiValue, NamedValues};

/// Values a decode may produce per word of input.
///
/// A well-formed encoding yields at most one value per nesting level for
/// every word it contains. Overlapping offsets can make a short input
/// expand into far more, and those are rejected once the budget runs out.
const VALUES_PER_WORD: usize = MAX_TYPE_DEPTH + 1;

struct Budget {
    remaining: usize,
}

impl Budget {
    fn for_data(data: &[u8]) -> Self {
        Self {
            remaining: (data.len() / WORD + 1).saturating_mul(VALUES_PER_WORD),
        }
    }

    fn take(&mut self) -> Result<(), String> {
        match self.remaining.checked_sub(1) {
            Some(remaining) => {
                self.remaining = remaining;
                Ok(())
            }
            None => Err("decoded values exceed what the input can encode".to_string()),
        }
    }
}

/// Decode `data` against an ordered parameter list, keying each value by its
/// parameter name (`output_<index>` when unnamed).
pub fn unpack(params: &[Parameter], data: &[u8]) -> AbiResult<NamedValues> {
    let mut budget = Budget::for_data(data);
    let mut entries = Vec::with_capacity(params.len());
    let mut cursor = 0usize;

    for (index, param) in params.iter().enumerate() {
        let value = decode_at(&param.ty, data, cursor, &mut budget)
            .map_err(|reason| AbiError::Unpack { index, reason })?;
        entries.push((param.display_name(index), value));
        cursor = cursor.saturating_add(param.ty.head_size());
    }

    Ok(NamedValues::new(entries))
}

/// Decode an unnamed sequence of values.
pub fn decode_values(types: &[AbiType], data: &[u8]) -> AbiResult<Vec<AbiValue>> {
    let mut budget = Budget::for_data(data);
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = 0usize;

    for (index, ty) in types.iter().enumerate() {
        let value = decode_at(ty, data, cursor, &mut budget)
            .map_err(|reason| AbiError::Unpack { index, reason })?;
        values.push(value);
        cursor = cursor.saturating_add(ty.head_size());
    }

    Ok(values)
}

/// Decode the value whose head starts at `cursor` within `block`.
///
/// `block` is the enclosing encoding that offsets of dynamic values are
/// relative to.
fn decode_at(
    ty: &AbiType,
    block: &[u8],
    cursor: usize,
    budget: &mut Budget,
) -> Result<AbiValue, String> {
    budget.take()?;
    if ty.is_dynamic() {
        let offset = read_usize(block, cursor)?;
        if offset > block.len() {
            return Err(format!(
                "offset {} points outside of {} bytes of data",
                offset,
                block.len()
            ));
        }
        decode_tail(ty, &block[offset..], budget)
    } else {
        decode_static(ty, block, cursor, budget)
    }
}

fn decode_static(
    ty: &AbiType,
    block: &[u8],
    cursor: usize,
    budget: &mut Budget,
) -> Result<AbiValue, String> {
    match ty {
        AbiType::Address => {
            let word = read_word(block, cursor)?;
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            let word = read_word(block, cursor)?;
            match U256::from_be_slice(word) {
                v if v.is_zero() => Ok(AbiValue::Bool(false)),
                v if v == U256::from(1u8) => Ok(AbiValue::Bool(true)),
                v => Err(format!("invalid boolean value {v}")),
            }
        }
        AbiType::Uint(bits) => {
            let word = read_word(block, cursor)?;
            Ok(AbiValue::Uint(truncate(U256::from_be_slice(word), *bits)))
        }
        AbiType::Int(bits) => {
            let word = read_word(block, cursor)?;
            Ok(AbiValue::Int(I256::from_raw(sign_extend(
                U256::from_be_slice(word),
                *bits,
            ))))
        }
        AbiType::FixedBytes(size) => {
            let word = read_word(block, cursor)?;
            Ok(AbiValue::FixedBytes(word[..*size].to_vec()))
        }
        AbiType::FixedArray(inner, size) => {
            let inline = block.get(cursor..).unwrap_or_default();
            decode_repeated(inner, *size, inline, budget).map(AbiValue::Array)
        }
        AbiType::Tuple(members) => {
            let inline = block.get(cursor..).unwrap_or_default();
            decode_sequence(members, inline, budget).map(AbiValue::Tuple)
        }
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => {
            Err(format!("type {ty} is not static"))
        }
    }
}

/// Decode a dynamic value from the region its offset word points at.
fn decode_tail(ty: &AbiType, tail: &[u8], budget: &mut Budget) -> Result<AbiValue, String> {
    match ty {
        AbiType::Bytes => read_length_prefixed(tail).map(|b| AbiValue::Bytes(b.to_vec())),
        AbiType::String => {
            let bytes = read_length_prefixed(tail)?;
            String::from_utf8(bytes.to_vec())
                .map(AbiValue::String)
                .map_err(|e| format!("invalid UTF-8 string: {e}"))
        }
        AbiType::Array(inner) => {
            let len = read_usize(tail, 0)?;
            decode_repeated(inner, len, &tail[WORD..], budget).map(AbiValue::Array)
        }
        AbiType::FixedArray(inner, size) => {
            decode_repeated(inner, *size, tail, budget).map(AbiValue::Array)
        }
        AbiType::Tuple(members) => decode_sequence(members, tail, budget).map(AbiValue::Tuple),
        _ => decode_static(ty, tail, 0, budget),
    }
}

/// Decode `count` consecutive elements of one type laid out in `block`.
fn decode_repeated(
    inner: &AbiType,
    count: usize,
    block: &[u8],
    budget: &mut Budget,
) -> Result<Vec<AbiValue>, String> {
    // Every element takes at least one word of head space
    if count > block.len() / WORD {
        return Err(format!(
            "array length {} exceeds the {} bytes remaining",
            count,
            block.len()
        ));
    }

    let step = inner.head_size();
    let mut values = Vec::with_capacity(count);
    let mut cursor = 0usize;
    for _ in 0..count {
        values.push(decode_at(inner, block, cursor, budget)?);
        cursor = cursor.saturating_add(step);
    }
    Ok(values)
}

fn decode_sequence(
    types: &[AbiType],
    block: &[u8],
    budget: &mut Budget,
) -> Result<Vec<AbiValue>, String> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = 0usize;
    for ty in types {
        values.push(decode_at(ty, block, cursor, budget)?);
        cursor = cursor.saturating_add(ty.head_size());
    }
    Ok(values)
}

fn read_length_prefixed(tail: &[u8]) -> Result<&[u8], String> {
    let len = read_usize(tail, 0)?;
    let content = &tail[WORD..];
    if len > content.len() {
        return Err(format!(
            "length {} exceeds the {} bytes remaining",
            len,
            content.len()
        ));
    }
    Ok(&content[..len])
}

fn read_word(data: &[u8], cursor: usize) -> Result<&[u8], String> {
    cursor
        .checked_add(WORD)
        .and_then(|end| data.get(cursor..end))
        .ok_or_else(|| {
            format!(
                "need 32 bytes at position {}, only {} bytes available",
                cursor,
                data.len()
            )
        })
}

/// Read a word that must hold an offset or length.
fn read_usize(data: &[u8], cursor: usize) -> Result<usize, String> {
    let word = read_word(data, cursor)?;
    if word[..24].iter().any(|b| *b != 0) {
        return Err(format!(
            "offset or length 0x{} is too large",
            hex::encode(word)
        ));
    }
    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(tail)).map_err(|e| e.to_string())
}

fn mask(bits: usize) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << bits) - U256::from(1u8)
    }
}

/// Keep only the low `bits` bits.
pub(crate) fn truncate(value: U256, bits: usize) -> U256 {
    value & mask(bits)
}

/// Interpret the low `bits` bits as two's complement and widen to 256 bits.
pub(crate) fn sign_extend(value: U256, bits: usize) -> U256 {
    if bits >= 256 {
        return value;
    }
    let low = value & mask(bits);
    if low.bit(bits - 1) {
        low | !mask(bits)
    } else {
        low
    }
}
