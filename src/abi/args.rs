//! Conversion of human-supplied string arguments into typed ABI values

use alloy::primitives::{Address, I256, U256};
use serde::{Deserialize, Serialize};

use super::catalogue::{AbiCatalogue, FunctionLookup};
use super::encode::encode_call;
use super::error::{AbiError, AbiResult};
use super::function::FunctionSpec;
use super::types::AbiType;
use super::value::AbiValue;

/// How a string argument for a `bytesN` parameter becomes bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedBytesInput {
    /// Copy the string's UTF-8 bytes, left-aligned, truncated to N bytes
    #[default]
    Raw,
    /// Hex-decode the string (`0x` optional); must fit in N bytes
    Hex,
}

/// Options controlling [`encode_from_strings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    #[serde(default)]
    pub fixed_bytes_input: FixedBytesInput,
    #[serde(default)]
    pub function_lookup: FunctionLookup,
}

/// Look up `function` in the catalogue and encode a call to it from string
/// arguments. Returns the matched function together with the call data.
pub fn encode_from_strings<'a, S: AsRef<str>>(
    catalogue: &'a AbiCatalogue,
    function: &str,
    args: &[S],
    options: EncodeOptions,
) -> AbiResult<(&'a FunctionSpec, Vec<u8>)> {
    let spec = catalogue.find_function(function, options.function_lookup)?;

    if args.len() != spec.inputs.len() {
        return Err(AbiError::ArgumentCountMismatch {
            function: spec.name.clone(),
            expected: spec.inputs.len(),
            actual: args.len(),
        });
    }

    let values = spec
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            parse_argument(index, &param.ty, arg.as_ref(), options.fixed_bytes_input)
        })
        .collect::<AbiResult<Vec<_>>>()?;

    let data = encode_call(spec, &values)?;
    Ok((spec, data))
}

/// Convert one string argument into a value of type `ty`.
pub fn parse_argument(
    index: usize,
    ty: &AbiType,
    input: &str,
    fixed_bytes: FixedBytesInput,
) -> AbiResult<AbiValue> {
    match ty {
        AbiType::Address => parse_address(input)
            .map(AbiValue::Address)
            .ok_or_else(|| AbiError::InvalidAddress {
                index,
                value: input.to_string(),
            }),
        AbiType::Uint(bits) => {
            let invalid = || AbiError::InvalidInteger {
                index,
                ty: ty.to_string(),
                value: input.to_string(),
            };
            let digits = input.trim();
            if !is_decimal(digits) {
                return Err(invalid());
            }
            let value = U256::from_str_radix(digits, 10).map_err(|_| invalid())?;
            if value.bit_len() > *bits {
                return Err(invalid());
            }
            Ok(AbiValue::Uint(value))
        }
        AbiType::Int(bits) => {
            let invalid = || AbiError::InvalidInteger {
                index,
                ty: ty.to_string(),
                value: input.to_string(),
            };
            let trimmed = input.trim();
            if !is_decimal(trimmed.strip_prefix('-').unwrap_or(trimmed)) {
                return Err(invalid());
            }
            let value = I256::from_dec_str(trimmed).map_err(|_| invalid())?;
            let raw = value.into_raw();
            if super::decode::sign_extend(raw, *bits) != raw {
                return Err(invalid());
            }
            Ok(AbiValue::Int(value))
        }
        AbiType::Bool => match input.trim() {
            "true" => Ok(AbiValue::Bool(true)),
            "false" => Ok(AbiValue::Bool(false)),
            _ => Err(AbiError::InvalidBool {
                index,
                value: input.to_string(),
            }),
        },
        AbiType::FixedBytes(size) => {
            parse_fixed_bytes(input, *size, fixed_bytes).map_err(|reason| {
                AbiError::InvalidFixedBytes {
                    index,
                    ty: ty.to_string(),
                    reason,
                }
            })
        }
        AbiType::String => Ok(AbiValue::String(input.to_string())),
        AbiType::Bytes | AbiType::Array(_) | AbiType::FixedArray(..) | AbiType::Tuple(_) => {
            Err(AbiError::UnsupportedEncodeType {
                index,
                ty: ty.to_string(),
            })
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a 20-byte hex address, with or without `0x`.
pub fn parse_address(input: &str) -> Option<Address> {
    let input = input.trim();
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.len() != 40 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some(Address::from_slice(&bytes))
}

fn parse_fixed_bytes(input: &str, size: usize, mode: FixedBytesInput) -> Result<AbiValue, String> {
    let bytes = match mode {
        FixedBytesInput::Raw => {
            let raw = input.as_bytes();
            let mut bytes = vec![0u8; size];
            let len = raw.len().min(size);
            bytes[..len].copy_from_slice(&raw[..len]);
            bytes
        }
        FixedBytesInput::Hex => {
            let digits = input.trim();
            let digits = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
                .unwrap_or(digits);
            let decoded = hex::decode(digits).map_err(|e| format!("invalid hex: {e}"))?;
            if decoded.len() > size {
                return Err(format!(
                    "{} bytes do not fit in bytes{}",
                    decoded.len(),
                    size
                ));
            }
            let mut bytes = vec![0u8; size];
            bytes[..decoded.len()].copy_from_slice(&decoded);
            bytes
        }
    };
    Ok(AbiValue::FixedBytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_ABI: &str = r#"[
        {"type":"function","name":"balanceOf","inputs":[{"name":"account","type":"address"}],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"transferFrom","inputs":[{"name":"from","type":"address"},{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"setLabel","inputs":[{"name":"key","type":"bytes32"},{"name":"label","type":"string"},{"name":"delta","type":"int64"},{"name":"enabled","type":"bool"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"batch","inputs":[{"name":"targets","type":"address[]"}],"outputs":[],"stateMutability":"nonpayable"}
    ]"#;

    const HOLDER: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0aB3d";

    fn catalogue() -> AbiCatalogue {
        AbiCatalogue::parse(TOKEN_ABI).unwrap()
    }

    #[test]
    fn test_encode_balance_of() {
        let catalogue = catalogue();
        let options = EncodeOptions::default();
        let (function, data) =
            encode_from_strings(&catalogue, "balanceOf", &[HOLDER], options).unwrap();
        assert_eq!(function.name, "balanceOf");
        assert_eq!(
            hex::encode(&data),
            "70a08231000000000000000000000000742d35cc6634c0532925a3b844bc9e7595f0ab3d"
        );
    }

    #[test]
    fn test_default_lookup_is_exact_first() {
        let catalogue = catalogue();
        let (function, data) = encode_from_strings(
            &catalogue,
            "transfer",
            &[HOLDER, "1000"],
            EncodeOptions::default(),
        )
        .unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

        // No exact "From" function: substring fallback picks transferFrom
        let (function, _) = encode_from_strings(
            &catalogue,
            "From",
            &[HOLDER, HOLDER, "1"],
            EncodeOptions::default(),
        )
        .unwrap();
        assert_eq!(function.name, "transferFrom");
    }

    #[test]
    fn test_function_not_found() {
        let catalogue = catalogue();
        let err =
            encode_from_strings(&catalogue, "mint", &["1"], EncodeOptions::default()).unwrap_err();
        assert_eq!(err, AbiError::FunctionNotFound("mint".into()));
    }

    #[test]
    fn test_argument_count_mismatch_before_conversion() {
        let catalogue = catalogue();
        // The bad address would fail conversion, but the count is checked first
        let args = ["not-an-address"];
        let err = encode_from_strings(&catalogue, "transfer", &args, EncodeOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            AbiError::ArgumentCountMismatch {
                function: "transfer".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_invalid_address() {
        for bad in ["0x123", "0xgg2d35Cc6435C9c1c72c5E7b18BaB7e1DB7a5d6e", ""] {
            let err = parse_argument(0, &AbiType::Address, bad, FixedBytesInput::Raw).unwrap_err();
            assert!(matches!(err, AbiError::InvalidAddress { index: 0, .. }), "{bad}");
        }
        // The prefix is optional
        assert!(parse_argument(0, &AbiType::Address, &HOLDER[2..], FixedBytesInput::Raw).is_ok());
    }

    #[test]
    fn test_invalid_integer() {
        for bad in ["-1", "abc", "0x10", "", "1.5"] {
            let err =
                parse_argument(1, &AbiType::Uint(256), bad, FixedBytesInput::Raw).unwrap_err();
            assert!(matches!(err, AbiError::InvalidInteger { index: 1, .. }), "{bad}");
        }
        // Out of range for the declared width
        assert!(parse_argument(0, &AbiType::Uint(8), "256", FixedBytesInput::Raw).is_err());
        assert_eq!(
            parse_argument(0, &AbiType::Uint(8), "255", FixedBytesInput::Raw).unwrap(),
            AbiValue::Uint(U256::from(255u64))
        );
        assert!(parse_argument(0, &AbiType::Int(8), "-129", FixedBytesInput::Raw).is_err());
        assert!(parse_argument(0, &AbiType::Int(8), "128", FixedBytesInput::Raw).is_err());
        assert_eq!(
            parse_argument(0, &AbiType::Int(8), "-128", FixedBytesInput::Raw).unwrap(),
            AbiValue::Int(I256::try_from(-128i64).unwrap())
        );
    }

    #[test]
    fn test_fixed_bytes_default_copies_raw_string_bytes() {
        let value =
            parse_argument(0, &AbiType::FixedBytes(32), "abc", FixedBytesInput::default()).unwrap();
        let mut expected = vec![0u8; 32];
        expected[..3].copy_from_slice(b"abc");
        assert_eq!(value, AbiValue::FixedBytes(expected));

        // A hex-looking string is still copied verbatim in raw mode
        let value =
            parse_argument(0, &AbiType::FixedBytes(4), "0x12345678", FixedBytesInput::Raw).unwrap();
        assert_eq!(value, AbiValue::FixedBytes(b"0x12".to_vec()));
    }

    #[test]
    fn test_fixed_bytes_hex_mode() {
        let value =
            parse_argument(0, &AbiType::FixedBytes(4), "0xdeadbeef", FixedBytesInput::Hex).unwrap();
        assert_eq!(value, AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef]));

        let value = parse_argument(0, &AbiType::FixedBytes(4), "ab", FixedBytesInput::Hex).unwrap();
        assert_eq!(value, AbiValue::FixedBytes(vec![0xab, 0, 0, 0]));

        assert!(matches!(
            parse_argument(0, &AbiType::FixedBytes(2), "0xdeadbeef", FixedBytesInput::Hex),
            Err(AbiError::InvalidFixedBytes { .. })
        ));
        assert!(matches!(
            parse_argument(0, &AbiType::FixedBytes(2), "zz", FixedBytesInput::Hex),
            Err(AbiError::InvalidFixedBytes { .. })
        ));
    }

    #[test]
    fn test_unsupported_encode_types() {
        let catalogue = catalogue();
        let options = EncodeOptions::default();
        let err = encode_from_strings(&catalogue, "batch", &[HOLDER], options).unwrap_err();
        assert_eq!(
            err,
            AbiError::UnsupportedEncodeType {
                index: 0,
                ty: "address[]".into()
            }
        );
        assert!(matches!(
            parse_argument(2, &AbiType::Bytes, "0x00", FixedBytesInput::Raw),
            Err(AbiError::UnsupportedEncodeType { index: 2, .. })
        ));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let catalogue = catalogue();
        let label = "a label long enough to span more than one 32-byte word";
        let args = ["tag", label, "-42", "true"];
        let (_, data) =
            encode_from_strings(&catalogue, "setLabel", &args, EncodeOptions::default()).unwrap();

        let decoded = catalogue.decode_call(&data).unwrap();
        assert_eq!(decoded.function.name, "setLabel");
        let mut key = vec![0u8; 32];
        key[..3].copy_from_slice(b"tag");
        assert_eq!(decoded.args.get("key"), Some(&AbiValue::FixedBytes(key)));
        assert_eq!(decoded.args.get("label"), Some(&AbiValue::String(label.into())));
        assert_eq!(
            decoded.args.get("delta"),
            Some(&AbiValue::Int(I256::try_from(-42i64).unwrap()))
        );
        assert_eq!(decoded.args.get("enabled"), Some(&AbiValue::Bool(true)));
    }

    #[test]
    fn test_empty_string_round_trip() {
        let catalogue = catalogue();
        let args = ["", "", "0", "false"];
        let (_, data) =
            encode_from_strings(&catalogue, "setLabel", &args, EncodeOptions::default()).unwrap();
        // selector + 4 head words + length word of the empty string
        assert_eq!(data.len(), 4 + 5 * 32);
        let decoded = catalogue.decode_call(&data).unwrap();
        assert_eq!(decoded.args.get("label"), Some(&AbiValue::String(String::new())));
    }

    #[test]
    fn test_static_round_trip() {
        let catalogue = catalogue();
        let max = U256::MAX.to_string();
        let args = [HOLDER, "0x0000000000000000000000000000000000000001", max.as_str()];
        let (_, data) =
            encode_from_strings(&catalogue, "transferFrom", &args, EncodeOptions::default())
                .unwrap();
        let decoded = catalogue.decode_call(&data).unwrap();
        let rendered = serde_json::to_value(&decoded.args).unwrap();
        assert_eq!(rendered["from"], "0x742d35cc6634c0532925a3b844bc9e7595f0ab3d");
        assert_eq!(rendered["to"], "0x0000000000000000000000000000000000000001");
        assert_eq!(decoded.args.get("amount"), Some(&AbiValue::Uint(U256::MAX)));
    }
}
