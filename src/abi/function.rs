//! Function descriptions and selectors

use std::fmt;

use alloy::primitives::keccak256;
use serde::{Deserialize, Serialize};

use super::decode::unpack;
use super::error::AbiResult;
use super::types::AbiType;
use super::value::NamedValues;

/// A typed, possibly unnamed, function input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: AbiType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Name used as the key in decoded results; unnamed parameters become
    /// `output_<index>`.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("output_{index}")
        } else {
            self.name.clone()
        }
    }
}

/// `"<type> <name>"`, or just the type when unnamed.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.ty)
        } else {
            write!(f, "{} {}", self.ty, self.name)
        }
    }
}

/// Declared state mutability of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl Mutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutability::Pure => "pure",
            Mutability::View => "view",
            Mutability::NonPayable => "nonpayable",
            Mutability::Payable => "payable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(Mutability::Pure),
            "view" => Some(Mutability::View),
            "nonpayable" => Some(Mutability::NonPayable),
            "payable" => Some(Mutability::Payable),
            _ => None,
        }
    }

    /// Pure and view functions can be served by `eth_call` alone.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Mutability::Pure | Mutability::View)
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callable contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub mutability: Mutability,
    pub selector: [u8; 4],
}

impl FunctionSpec {
    /// Build a function and compute its selector from the canonical signature.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
        mutability: Mutability,
    ) -> Self {
        let name = name.into();
        let selector = function_selector(&signature(&name, &inputs));
        Self {
            name,
            inputs,
            outputs,
            mutability,
            selector,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// Bytes required by the head of the input encoding.
    pub fn min_input_len(&self) -> usize {
        self.inputs
            .iter()
            .fold(0usize, |total, p| total.saturating_add(p.ty.head_size()))
    }

    /// Decode the raw return data of a call to this function.
    pub fn decode_outputs(&self, data: &[u8]) -> AbiResult<NamedValues> {
        unpack(&self.outputs, data)
    }
}

fn signature(name: &str, inputs: &[Parameter]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.ty.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

/// First four bytes of `keccak256(signature)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}
