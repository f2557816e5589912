//! Typed ABI values and their JSON rendering

use alloy::primitives::{Address, I256, U256};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A value carried by (or decoded from) an ABI encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    /// Fixed-size bytes, exactly as wide as the declared `bytesN`
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Render the value as JSON: addresses and byte strings as `0x`-hex,
    /// integers as decimal strings so no precision is lost.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            AbiValue::Address(addr) => Value::String(format!("0x{}", hex::encode(addr.as_slice()))),
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::Uint(n) => Value::String(n.to_string()),
            AbiValue::Int(n) => Value::String(n.to_string()),
            AbiValue::FixedBytes(bytes) | AbiValue::Bytes(bytes) => {
                Value::String(format!("0x{}", hex::encode(bytes)))
            }
            AbiValue::String(s) => Value::String(s.clone()),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                Value::Array(items.iter().map(AbiValue::to_json).collect())
            }
        }
    }
}

impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AbiValue::Bool(b) => serializer.serialize_bool(*b),
            AbiValue::String(s) => serializer.serialize_str(s),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => match other.to_json() {
                serde_json::Value::String(s) => serializer.serialize_str(&s),
                value => value.serialize(serializer),
            },
        }
    }
}

/// Decoded parameters keyed by name, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedValues(Vec<(String, AbiValue)>);

impl NamedValues {
    pub fn new(entries: Vec<(String, AbiValue)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbiValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &AbiValue> {
        self.0.iter().map(|(_, v)| v)
    }
}

impl Serialize for NamedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_json_rendering() {
        let addr: Address = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d".parse().unwrap();
        assert_eq!(
            AbiValue::Address(addr).to_json(),
            json!("0x742d35cc6634c0532925a3b844bc9e7595f0ab3d")
        );
        assert_eq!(AbiValue::Uint(U256::from(1000u64)).to_json(), json!("1000"));
        assert_eq!(AbiValue::Int(I256::try_from(-5i64).unwrap()).to_json(), json!("-5"));
        assert_eq!(AbiValue::FixedBytes(vec![0xab, 0xcd]).to_json(), json!("0xabcd"));
        assert_eq!(AbiValue::Bool(true).to_json(), json!(true));
        assert_eq!(
            AbiValue::Tuple(vec![AbiValue::String("hi".into()), AbiValue::Bytes(vec![])]).to_json(),
            json!(["hi", "0x"])
        );
    }

    #[test]
    fn test_named_values_serialize_in_declaration_order() {
        let values = NamedValues::new(vec![
            ("to".to_string(), AbiValue::Address(Address::ZERO)),
            ("amount".to_string(), AbiValue::Uint(U256::from(7u8))),
        ]);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"to":"0x0000000000000000000000000000000000000000","amount":"7"}"#
        );
        assert_eq!(values.get("amount"), Some(&AbiValue::Uint(U256::from(7u8))));
        assert!(values.get("missing").is_none());
    }
}
