use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{ApiError, ApiResult, NodeAddress, ServerState};
use crate::abi::Mutability;
use crate::ethereum::{
    blocks::{self, BlockRange},
    contract::{self, ContractCall, TransactionSettings},
    transaction, utils, BlocksResponse, DecodedCallData, EthCallResult, MethodInfo,
    SentTransaction, Transaction,
};

#[derive(Debug, Deserialize)]
pub struct BlocksQuery {
    number_of_blocks: Option<String>,
    block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecodeCallDataRequest {
    contract_abi: String,
    input_data: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseAbiRequest {
    contract_abi: String,
    #[serde(default)]
    state_mutability_filter: Option<String>,
}

#[derive(Debug, serde::Serialize, Deserialize)]
pub struct MethodsResponse {
    methods: Vec<MethodInfo>,
}

#[derive(Debug, Deserialize)]
pub struct EthCallRequest {
    method: String,
    contract_address: String,
    contract_abi: String,
    #[serde(default)]
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendTransactionRequest {
    method: String,
    contract_address: String,
    contract_abi: String,
    private_key: String,
    #[serde(default)]
    input: Vec<String>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(request)| request)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn bad_request(err: anyhow::Error) -> ApiError {
    ApiError::BadRequest(err.to_string())
}

pub async fn get_blocks(
    State(state): State<Arc<ServerState>>,
    NodeAddress(node): NodeAddress,
    Query(query): Query<BlocksQuery>,
) -> ApiResult<Json<BlocksResponse>> {
    let range = BlockRange::from_query(
        query.number_of_blocks.as_deref(),
        query.block_number.as_deref(),
        state.config.node.max_blocks_per_request,
    );

    let client = state.clients.client(&node).await?;
    let response = blocks::get_blocks(client.as_ref(), range).await?;
    Ok(Json(response))
}

pub async fn get_transaction(
    State(state): State<Arc<ServerState>>,
    NodeAddress(node): NodeAddress,
    Path(hash): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let hash = utils::validate_hash(&hash).map_err(bad_request)?;

    let client = state.clients.client(&node).await?;
    transaction::get_transaction(client.as_ref(), hash)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Transaction {} not found", hash)))
}

pub async fn decode_contract_call_data(
    payload: Result<Json<DecodeCallDataRequest>, JsonRejection>,
) -> ApiResult<Json<DecodedCallData>> {
    let request = body(payload)?;

    let decoded = contract::decode_call_data(&request.contract_abi, &request.input_data)
        .map_err(|e| {
            tracing::error!("Failed to decode call data: {}", e);
            e
        })?;
    Ok(Json(decoded))
}

pub async fn parse_contract_abi(
    payload: Result<Json<ParseAbiRequest>, JsonRejection>,
) -> ApiResult<Json<MethodsResponse>> {
    let request = body(payload)?;

    // An empty filter lists every method
    let filter = match request.state_mutability_filter.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(Mutability::parse(value).ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Unknown state_mutability_filter '{}'. Expected pure, view, nonpayable or payable",
                value
            ))
        })?),
    };

    let methods = contract::list_methods(&request.contract_abi, filter)?;
    Ok(Json(MethodsResponse { methods }))
}

pub async fn eth_call(
    State(state): State<Arc<ServerState>>,
    NodeAddress(node): NodeAddress,
    payload: Result<Json<EthCallRequest>, JsonRejection>,
) -> ApiResult<Json<EthCallResult>> {
    let request = body(payload)?;
    utils::validate_function_name(&request.method).map_err(bad_request)?;
    let contract = utils::validate_address(&request.contract_address).map_err(bad_request)?;

    let call = ContractCall {
        contract,
        contract_abi: &request.contract_abi,
        method: &request.method,
        args: &request.input,
    };

    let client = state.clients.client(&node).await?;
    let options = state.config.codec.encode_options();
    let result = contract::eth_call(client.as_ref(), call, options).await?;
    Ok(Json(result))
}

pub async fn send_transaction(
    State(state): State<Arc<ServerState>>,
    NodeAddress(node): NodeAddress,
    payload: Result<Json<SendTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<SentTransaction>> {
    let request = body(payload)?;
    utils::validate_function_name(&request.method).map_err(bad_request)?;
    let contract = utils::validate_address(&request.contract_address).map_err(bad_request)?;
    let signer = utils::parse_private_key(&request.private_key).map_err(bad_request)?;

    let call = ContractCall {
        contract,
        contract_abi: &request.contract_abi,
        method: &request.method,
        args: &request.input,
    };
    let settings = TransactionSettings {
        gas_limit: state.config.node.default_gas_limit,
        fallback_chain_id: state.config.node.default_chain_id,
    };

    let client = state.clients.client(&node).await?;
    let hash = contract::send_transaction(
        client.as_ref(),
        signer,
        call,
        state.config.codec.encode_options(),
        settings,
    )
    .await?;

    tracing::info!("Transaction {} broadcast", hash);
    Ok(Json(SentTransaction {
        transaction_hash: hash.to_string(),
    }))
}
