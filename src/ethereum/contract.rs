use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, B256, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use anyhow::{anyhow, Context, Result};

use super::provider::ChainClient;
use super::{DecodedCallData, EthCallResult, MethodInfo};
use crate::abi::{
    encode_from_strings, AbiCatalogue, AbiResult, EncodeOptions, FunctionSpec, Mutability,
};

/// Decode hex call data (`0x` optional) against a JSON ABI.
pub fn decode_call_data(contract_abi: &str, input_data: &str) -> AbiResult<DecodedCallData> {
    let input_data = input_data.trim();
    let hex_part = input_data.strip_prefix("0x").unwrap_or(input_data);
    let data = hex::decode(hex_part)?;

    let catalogue = AbiCatalogue::parse(contract_abi)?;
    let decoded = catalogue.decode_call(&data)?;

    Ok(DecodedCallData {
        function_name: decoded.function.name.clone(),
        args: decoded.args,
    })
}

pub fn describe_method(function: &FunctionSpec) -> MethodInfo {
    MethodInfo {
        name: function.name.clone(),
        state_mutability: function.mutability.to_string(),
        selector: format!("0x{}", hex::encode(function.selector)),
        signature: function.signature(),
        inputs: function.inputs.iter().map(ToString::to_string).collect(),
        outputs: function.outputs.iter().map(ToString::to_string).collect(),
    }
}

/// List the functions of an ABI, optionally only those with one mutability.
pub fn list_methods(contract_abi: &str, filter: Option<Mutability>) -> AbiResult<Vec<MethodInfo>> {
    let catalogue = AbiCatalogue::parse(contract_abi)?;
    Ok(catalogue
        .functions_with(filter)
        .into_iter()
        .map(describe_method)
        .collect())
}

/// A contract method invocation described by string arguments.
#[derive(Debug, Clone, Copy)]
pub struct ContractCall<'a> {
    pub contract: Address,
    pub contract_abi: &'a str,
    pub method: &'a str,
    pub args: &'a [String],
}

impl ContractCall<'_> {
    fn encode<'c>(
        &self,
        catalogue: &'c AbiCatalogue,
        options: EncodeOptions,
    ) -> AbiResult<(&'c FunctionSpec, Vec<u8>)> {
        encode_from_strings(catalogue, self.method, self.args, options).map_err(|e| {
            tracing::error!("Failed to encode call to '{}': {}", self.method, e);
            e
        })
    }
}

/// Encode a call from string arguments, run it with `eth_call` and decode
/// the returned data against the function's outputs.
pub async fn eth_call(
    client: &dyn ChainClient,
    call: ContractCall<'_>,
    options: EncodeOptions,
) -> Result<EthCallResult> {
    let catalogue = AbiCatalogue::parse(call.contract_abi)?;
    let (function, data) = call.encode(&catalogue, options)?;

    tracing::debug!("eth_call {} on {}", function.signature(), call.contract);
    let output = client
        .call_contract(call.contract, data)
        .await
        .with_context(|| format!("eth_call to {} failed", function.signature()))?;

    let decoded = function.decode_outputs(&output).map_err(|e| {
        tracing::error!("Failed to decode output of '{}': {}", function.name, e);
        e
    })?;

    Ok(EthCallResult {
        raw_response: format!("0x{}", hex::encode(&output)),
        decoded,
    })
}

/// Parameters of a legacy contract-call transaction with zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyCall {
    pub to: Address,
    pub data: Vec<u8>,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub chain_id: u64,
}

/// Sign a legacy transaction with EIP-155 replay protection. Returns the
/// transaction hash and its raw encoding.
pub async fn sign_legacy_transaction(
    signer: PrivateKeySigner,
    call: LegacyCall,
) -> Result<(B256, Vec<u8>)> {
    let wallet = EthereumWallet::from(signer);

    let request = TransactionRequest::default()
        .with_to(call.to)
        .with_nonce(call.nonce)
        .with_gas_price(call.gas_price)
        .with_gas_limit(call.gas_limit)
        .with_chain_id(call.chain_id)
        .with_value(U256::ZERO)
        .with_input(call.data);

    let envelope = request
        .build(&wallet)
        .await
        .map_err(|e| anyhow!("Failed to sign transaction: {}", e))?;

    Ok((*envelope.tx_hash(), envelope.encoded_2718()))
}

/// Settings applied to every transaction the gateway signs.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSettings {
    pub gas_limit: u64,
    /// Used when the node reports chain id 0
    pub fallback_chain_id: u64,
}

/// Encode a contract call, sign it as a legacy transaction and broadcast it.
pub async fn send_transaction(
    client: &dyn ChainClient,
    signer: PrivateKeySigner,
    call: ContractCall<'_>,
    options: EncodeOptions,
    settings: TransactionSettings,
) -> Result<B256> {
    let catalogue = AbiCatalogue::parse(call.contract_abi)?;
    let (function, data) = call.encode(&catalogue, options)?;
    let contract = call.contract;

    let from = signer.address();
    let nonce = client
        .pending_nonce_at(from)
        .await
        .context("Failed to fetch pending nonce")?;
    let gas_price = client
        .suggest_gas_price()
        .await
        .context("Failed to fetch gas price")?;
    let chain_id = match client.chain_id().await.context("Failed to fetch chain id")? {
        0 => {
            tracing::warn!(
                "Node reported chain id 0, using configured chain id {}",
                settings.fallback_chain_id
            );
            settings.fallback_chain_id
        }
        id => id,
    };

    let call = LegacyCall {
        to: contract,
        data,
        nonce,
        gas_price,
        gas_limit: settings.gas_limit,
        chain_id,
    };
    let (hash, raw) = sign_legacy_transaction(signer, call).await?;

    tracing::info!(
        "Sending {} from {} to {} (nonce {}, chain {})",
        function.signature(),
        from,
        contract,
        nonce,
        chain_id
    );

    let sent = client
        .send_raw_transaction(&raw)
        .await
        .context("Failed to broadcast transaction")?;
    if sent != hash {
        tracing::warn!("Node reported hash {} for transaction {}", sent, hash);
    }

    Ok(hash)
}
