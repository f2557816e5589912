use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Validates and normalizes an Ethereum address
pub fn validate_address(address: &str) -> Result<Address> {
    let address = address.trim();

    if address.is_empty() {
        return Err(anyhow!("Address cannot be empty"));
    }

    if !address.starts_with("0x") && !address.starts_with("0X") {
        return Err(anyhow!(
            "Invalid address format: '{}'. Ethereum addresses must start with '0x'",
            address
        ));
    }

    if address.len() != 42 {
        return Err(anyhow!(
            "Invalid address length: '{}'. Ethereum addresses must be exactly 42 characters (0x + 40 hex characters)",
            address
        ));
    }

    let hex_part = &address[2..];
    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "Invalid address format: '{}'. Contains non-hexadecimal characters",
            address
        ));
    }

    Address::from_str(hex_part)
        .map_err(|e| anyhow!("Invalid Ethereum address: '{}'. Error: {}", address, e))
}

/// Validates a 32-byte transaction hash, `0x` prefix optional
pub fn validate_hash(hash: &str) -> Result<B256> {
    let hash = hash.trim();
    let hex_part = hash
        .strip_prefix("0x")
        .or_else(|| hash.strip_prefix("0X"))
        .unwrap_or(hash);

    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "Invalid transaction hash: '{}'. Expected 32 bytes as 64 hex characters",
            hash
        ));
    }

    B256::from_str(hex_part).map_err(|e| anyhow!("Invalid transaction hash '{}': {}", hash, e))
}

/// Validates function name
pub fn validate_function_name(function_name: &str) -> Result<()> {
    let Some(first) = function_name.chars().next() else {
        return Err(anyhow!("Function name cannot be empty"));
    };

    if !first.is_ascii_alphabetic() && first != '_' && first != '$' {
        return Err(anyhow!(
            "Invalid function name: '{}'. Function names must start with a letter or underscore",
            function_name
        ));
    }

    if !function_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return Err(anyhow!(
            "Invalid function name: '{}'. Function names can only contain letters, numbers, and underscores",
            function_name
        ));
    }

    Ok(())
}

/// Parses a hex private key, `0x` prefix optional
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner> {
    let private_key = private_key.trim();
    let private_key = private_key.strip_prefix("0x").unwrap_or(private_key);

    if private_key.is_empty() {
        return Err(anyhow!("Private key cannot be empty"));
    }

    // Never echo the key itself
    PrivateKeySigner::from_str(private_key).map_err(|_| {
        anyhow!("Invalid private key: expected 32 bytes of hex (64 characters, 0x prefix optional)")
    })
}

/// Creates user-friendly error messages for common RPC errors
pub fn interpret_rpc_error(error: &str) -> String {
    if error.contains("execution reverted") {
        "Call failed: The contract function reverted execution. This usually means the function's requirements were not met or an assertion failed.".to_string()
    } else if error.contains("insufficient funds") {
        "Transaction failed: Insufficient funds to cover gas costs. Make sure your account has enough ETH for gas fees.".to_string()
    } else if error.contains("intrinsic gas too low")
        || error.contains("gas required exceeds allowance")
    {
        "Transaction failed: Gas limit too low. Increase default_gas_limit in the [node] configuration."
            .to_string()
    } else if error.contains("nonce too low") {
        "Transaction failed: Nonce too low. This usually means another transaction was already mined with this nonce.".to_string()
    } else if error.contains("replacement transaction underpriced") {
        "Transaction failed: Gas price too low to replace pending transaction.".to_string()
    } else if error.contains("connection refused")
        || error.contains("network unreachable")
        || error.contains("error sending request")
    {
        "Network error: Cannot connect to the node. Check the X-Node-Address header or default_rpc_url configuration.".to_string()
    } else if error.contains("rate limit") {
        "Rate limit error: Too many requests to the node. Try again in a few moments or use a different endpoint.".to_string()
    } else if error.contains("method not found") {
        "RPC error: The requested method is not supported by this node.".to_string()
    } else {
        format!("RPC error: {}", error)
    }
}
