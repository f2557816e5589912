//! Solidity ABI type model

use std::fmt;

use super::error::{AbiError, AbiResult};

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;

/// Deepest array/tuple nesting accepted from an ABI.
pub const MAX_TYPE_DEPTH: usize = 16;

/// A Solidity parameter type as understood by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    /// 20-byte account address
    Address,
    /// Boolean
    Bool,
    /// Unsigned integer with bit width (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit width (8, 16, ..., 256)
    Int(usize),
    /// Fixed-size byte array (1..=32)
    FixedBytes(usize),
    /// Dynamic bytes
    Bytes,
    /// UTF-8 string
    String,
    /// Dynamic array `T[]`
    Array(Box<AbiType>),
    /// Fixed-size array `T[k]`
    FixedArray(Box<AbiType>, usize),
    /// Tuple of component types
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parse a type string such as `uint256`, `bytes32[]` or `tuple[2]`.
    ///
    /// `components` supplies the member types when the base type is `tuple`.
    pub fn parse(ty: &str, components: Option<Vec<AbiType>>) -> AbiResult<Self> {
        let ty = ty.trim();

        if ty.matches('[').count() > MAX_TYPE_DEPTH {
            return Err(AbiError::UnsupportedType(ty.to_string()));
        }

        if let Some(open) = ty.strip_suffix(']').and_then(|rest| rest.rfind('[')) {
            let inner = Self::parse(&ty[..open], components)?;
            let dim = &ty[open + 1..ty.len() - 1];
            if dim.is_empty() {
                return Ok(AbiType::Array(Box::new(inner)));
            }
            let size: usize = dim
                .parse()
                .map_err(|_| AbiError::UnsupportedType(ty.to_string()))?;
            let array = AbiType::FixedArray(Box::new(inner), size);
            // The static head of the array must be addressable
            if size == 0 || array.checked_head_size().is_none() {
                return Err(AbiError::UnsupportedType(ty.to_string()));
            }
            return Ok(array);
        }

        match ty {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "tuple" => {
                let tuple = components
                    .map(AbiType::Tuple)
                    .ok_or_else(|| AbiError::MalformedAbi("tuple type without components".into()))?;
                if tuple.depth() > MAX_TYPE_DEPTH || tuple.checked_head_size().is_none() {
                    return Err(AbiError::UnsupportedType(tuple.to_string()));
                }
                return Ok(tuple);
            }
            _ => {}
        }

        if let Some(rest) = ty.strip_prefix("uint") {
            return parse_int_width(rest, ty).map(AbiType::Uint);
        }
        if let Some(rest) = ty.strip_prefix("int") {
            return parse_int_width(rest, ty).map(AbiType::Int);
        }
        if let Some(rest) = ty.strip_prefix("bytes") {
            return match rest.parse::<usize>() {
                Ok(size) if (1..=32).contains(&size) => Ok(AbiType::FixedBytes(size)),
                _ => Err(AbiError::UnsupportedType(ty.to_string())),
            };
        }

        Err(AbiError::UnsupportedType(ty.to_string()))
    }

    /// Dynamic types are stored out of line and referenced by an offset word.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(members) => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Number of bytes this type occupies in the head of an encoding.
    ///
    /// Saturates at `usize::MAX` for types whose head is not addressable;
    /// [`AbiType::parse`] never produces those.
    pub fn head_size(&self) -> usize {
        self.checked_head_size().unwrap_or(usize::MAX)
    }

    fn checked_head_size(&self) -> Option<usize> {
        match self {
            AbiType::FixedArray(inner, size) if !inner.is_dynamic() => {
                inner.checked_head_size()?.checked_mul(*size)
            }
            AbiType::Tuple(members) if !self.is_dynamic() => members
                .iter()
                .try_fold(0usize, |total, member| total.checked_add(member.checked_head_size()?)),
            _ => Some(WORD),
        }
    }

    /// Array and tuple nesting level, 0 for elementary types.
    pub fn depth(&self) -> usize {
        match self {
            AbiType::Array(inner) | AbiType::FixedArray(inner, _) => inner.depth() + 1,
            AbiType::Tuple(members) => members.iter().map(AbiType::depth).max().unwrap_or(0) + 1,
            _ => 0,
        }
    }
}

fn parse_int_width(rest: &str, ty: &str) -> AbiResult<usize> {
    if rest.is_empty() {
        return Ok(256);
    }
    match rest.parse::<usize>() {
        Ok(bits) if bits > 0 && bits <= 256 && bits % 8 == 0 => Ok(bits),
        _ => Err(AbiError::UnsupportedType(ty.to_string())),
    }
}

/// Renders the canonical form used in function signatures.
impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::FixedBytes(size) => write!(f, "bytes{size}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::FixedArray(inner, size) => write!(f, "{inner}[{size}]"),
            AbiType::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}
