use std::sync::Arc;

use axum::{Json, extract::State, response::Html};

use crate::wallet_browser::{
    app::contents,
    state::BrowserWalletState,
    types::{
        BrowserApiResponse, BrowserTransaction, ChainUpdate, Connection, TransactionResponse,
        UnavailableReport,
    },
};

pub(crate) async fn serve_index(State(state): State<Arc<BrowserWalletState>>) -> Html<String> {
    Html(contents::INDEX_HTML.replace(contents::SESSION_TOKEN_PLACEHOLDER, &state.session_token()))
}

pub(crate) async fn get_connection_info(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<Option<Connection>>> {
    Json(BrowserApiResponse::Ok(state.get_connection()))
}

pub(crate) async fn post_connection_update(
    State(state): State<Arc<BrowserWalletState>>,
    Json(connection): Json<Option<Connection>>,
) -> Json<BrowserApiResponse> {
    match &connection {
        Some(Connection { address, chain_id }) => {
            info!(%address, %chain_id, "browser wallet connected");
        }
        None => info!("browser wallet disconnected"),
    }
    state.set_connection(connection);
    Json(BrowserApiResponse::ok())
}

pub(crate) async fn post_chain_update(
    State(state): State<Arc<BrowserWalletState>>,
    Json(update): Json<ChainUpdate>,
) -> Json<BrowserApiResponse> {
    debug!(chain_id = %update.chain_id, "browser wallet switched chain");
    state.set_chain(update.chain_id);
    Json(BrowserApiResponse::ok())
}

pub(crate) async fn post_unavailable(
    State(state): State<Arc<BrowserWalletState>>,
    Json(report): Json<UnavailableReport>,
) -> Json<BrowserApiResponse> {
    warn!(message = %report.message, "browser has no wallet");
    state.set_unavailable(report.message);
    Json(BrowserApiResponse::ok())
}

pub(crate) async fn get_next_transaction_request(
    State(state): State<Arc<BrowserWalletState>>,
) -> Json<BrowserApiResponse<BrowserTransaction>> {
    match state.read_next_transaction_request() {
        Some(tx) => Json(BrowserApiResponse::Ok(tx)),
        None => Json(BrowserApiResponse::error("No pending transaction")),
    }
}

pub(crate) async fn post_transaction_response(
    State(state): State<Arc<BrowserWalletState>>,
    Json(response): Json<TransactionResponse>,
) -> Json<BrowserApiResponse> {
    if !state.has_transaction_request(&response.id) {
        return Json(BrowserApiResponse::error("Unknown transaction id"));
    }
    state.add_transaction_response(response);
    Json(BrowserApiResponse::ok())
}
