//! Parsing of JSON contract ABIs into a searchable function catalogue

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::decode::unpack;
use super::error::{AbiError, AbiResult};
use super::function::{FunctionSpec, Mutability, Parameter};
use super::types::AbiType;
use super::value::NamedValues;

/// How a function is located by name when encoding a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionLookup {
    /// Exact name first, then the first function whose name contains the query
    #[default]
    ExactThenSubstring,
    Exact,
    Substring,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability")]
    state_mutability: Option<String>,
    constant: Option<bool>,
    payable: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    components: Option<Vec<RawParam>>,
}

impl RawParam {
    fn resolve_type(&self) -> AbiResult<AbiType> {
        let components = self
            .components
            .as_ref()
            .map(|members| {
                members
                    .iter()
                    .map(RawParam::resolve_type)
                    .collect::<AbiResult<Vec<_>>>()
            })
            .transpose()?;
        AbiType::parse(&self.ty, components)
    }

    fn into_parameter(self) -> AbiResult<Parameter> {
        let ty = self.resolve_type()?;
        Ok(Parameter::new(self.name, ty))
    }
}

/// Decoded call data: which function was called and with what arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall<'a> {
    pub function: &'a FunctionSpec,
    pub args: NamedValues,
}

/// Every function declared by a contract ABI, indexed by selector.
#[derive(Debug, Clone, Default)]
pub struct AbiCatalogue {
    functions: Vec<FunctionSpec>,
    by_selector: HashMap<[u8; 4], usize>,
    collisions: HashMap<[u8; 4], Vec<usize>>,
}

impl AbiCatalogue {
    /// Parse a JSON ABI document.
    ///
    /// Accepts either the standard array of entries or an object carrying it
    /// under an `abi` key (compiler artifacts). Entries other than functions
    /// are ignored.
    pub fn parse(json: &str) -> AbiResult<Self> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| AbiError::MalformedAbi(format!("invalid JSON: {e}")))?;

        let entries = match document {
            Value::Array(entries) => entries,
            Value::Object(mut obj) => match obj.remove("abi") {
                Some(Value::Array(entries)) => entries,
                _ => {
                    return Err(AbiError::MalformedAbi(
                        "expected a JSON array of ABI entries".into(),
                    ))
                }
            },
            _ => {
                return Err(AbiError::MalformedAbi(
                    "expected a JSON array of ABI entries".into(),
                ))
            }
        };

        let mut catalogue = Self::default();
        for (position, entry) in entries.into_iter().enumerate() {
            // A missing `type` means `function`
            let kind = entry.get("type").and_then(Value::as_str).unwrap_or("function");
            if kind != "function" {
                continue;
            }

            let raw: RawFunction = serde_json::from_value(entry).map_err(|e| {
                AbiError::MalformedAbi(format!("function entry #{position}: {e}"))
            })?;
            catalogue.insert(raw_to_spec(raw)?);
        }

        debug!(
            "Parsed ABI with {} functions ({} ambiguous selectors)",
            catalogue.functions.len(),
            catalogue.collisions.len()
        );
        Ok(catalogue)
    }

    /// Build a catalogue from already constructed functions.
    pub fn from_functions(functions: impl IntoIterator<Item = FunctionSpec>) -> Self {
        let mut catalogue = Self::default();
        for function in functions {
            catalogue.insert(function);
        }
        catalogue
    }

    fn insert(&mut self, function: FunctionSpec) {
        let index = self.functions.len();
        let selector = function.selector;

        match self.by_selector.get(&selector) {
            Some(&first) => {
                warn!(
                    "Selector 0x{} of '{}' collides with '{}'",
                    hex::encode(selector),
                    function.signature(),
                    self.functions[first].signature()
                );
                self.collisions
                    .entry(selector)
                    .or_insert_with(|| vec![first])
                    .push(index);
            }
            None => {
                self.by_selector.insert(selector, index);
            }
        }
        self.functions.push(function);
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions with the given mutability, or all of them for `None`.
    pub fn functions_with(&self, mutability: Option<Mutability>) -> Vec<&FunctionSpec> {
        self.functions
            .iter()
            .filter(|f| mutability.map_or(true, |m| f.mutability == m))
            .collect()
    }

    /// First function declared with this selector.
    pub fn by_selector(&self, selector: [u8; 4]) -> Option<&FunctionSpec> {
        self.by_selector.get(&selector).map(|&i| &self.functions[i])
    }

    /// Whether more than one entry hashes to this selector.
    pub fn is_ambiguous(&self, selector: [u8; 4]) -> bool {
        self.collisions.contains_key(&selector)
    }

    /// Find the function an encode request refers to.
    pub fn find_function(&self, query: &str, lookup: FunctionLookup) -> AbiResult<&FunctionSpec> {
        let exact = || self.functions.iter().find(|f| f.name == query);
        let partial = || self.functions.iter().find(|f| f.name.contains(query));

        let found = match lookup {
            FunctionLookup::Exact => exact(),
            FunctionLookup::Substring => partial(),
            FunctionLookup::ExactThenSubstring => exact().or_else(|| {
                let found = partial();
                if let Some(f) = found {
                    debug!("No exact match for '{}', using '{}'", query, f.name);
                }
                found
            }),
        };

        found.ok_or_else(|| AbiError::FunctionNotFound(query.to_string()))
    }

    /// Match the selector at the start of `data` and decode the arguments.
    pub fn decode_call(&self, data: &[u8]) -> AbiResult<DecodedCall<'_>> {
        if data.len() < 4 {
            return Err(AbiError::DataTooShort {
                required: 4,
                actual: data.len(),
            });
        }

        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        let payload = &data[4..];

        let function = self
            .by_selector(selector)
            .ok_or(AbiError::NoMatchingFunction(selector))?;

        if let Some(indices) = self.collisions.get(&selector) {
            return Err(AbiError::AmbiguousSelector {
                selector,
                functions: indices
                    .iter()
                    .map(|&i| self.functions[i].signature())
                    .collect(),
            });
        }

        let required = function.min_input_len();
        if payload.len() < required {
            return Err(AbiError::DataTooShort {
                required: required.saturating_add(4),
                actual: data.len(),
            });
        }

        let args = unpack(&function.inputs, payload)?;
        Ok(DecodedCall { function, args })
    }
}

fn raw_to_spec(raw: RawFunction) -> AbiResult<FunctionSpec> {
    let mutability = match raw.state_mutability.as_deref() {
        Some(s) => Mutability::parse(s)
            .ok_or_else(|| AbiError::MalformedAbi(format!("unknown stateMutability '{s}'")))?,
        None if raw.payable == Some(true) => Mutability::Payable,
        None if raw.constant == Some(true) => Mutability::View,
        None => Mutability::NonPayable,
    };

    let inputs = raw
        .inputs
        .into_iter()
        .map(RawParam::into_parameter)
        .collect::<AbiResult<Vec<_>>>()?;
    let outputs = raw
        .outputs
        .into_iter()
        .map(RawParam::into_parameter)
        .collect::<AbiResult<Vec<_>>>()?;

    Ok(FunctionSpec::new(raw.name, inputs, outputs, mutability))
}
