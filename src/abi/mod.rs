//! Contract ABI model and call-data codec
//!
//! - [`AbiCatalogue`] parses a JSON ABI and indexes its functions by selector
//! - [`AbiCatalogue::decode_call`] turns raw call data back into named values
//! - [`encode_from_strings`] packs human-supplied arguments into call data
//! - [`FunctionSpec::decode_outputs`] unpacks the return data of a call
//!
//! The codec is pure: a catalogue is built per request and never mutated.

mod args;
mod catalogue;
mod decode;
mod encode;
mod error;
mod function;
mod types;
mod value;

pub use args::{encode_from_strings, parse_address, parse_argument, EncodeOptions, FixedBytesInput};
pub use catalogue::{AbiCatalogue, DecodedCall, FunctionLookup};
pub use decode::{decode_values, unpack};
pub use encode::{encode_call, encode_values};
pub use error::{AbiError, AbiResult};
pub use function::{function_selector, FunctionSpec, Mutability, Parameter};
pub use types::AbiType;
pub use value::{AbiValue, NamedValues};
