//! Browser wallet support.
//!
//! A local HTTP server bridges this process and a wallet injected into a browser page
//! ([EIP-1193](https://eips.ethereum.org/EIPS/eip-1193)):
//! 1. the server starts and the user opens its page
//! 2. the page connects to `window.ethereum` and reports account and chain changes
//! 3. transactions are queued and picked up by the page, which signs and sends them
//! 4. results are posted back and collected by polling

pub mod error;
pub mod provider;
pub mod server;
pub mod types;

mod app;
mod handlers;
mod queue;
mod router;
mod state;

pub use router::SESSION_TOKEN_HEADER;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::{Address, TxHash, TxKind, U256, address};
    use alloy_rpc_types::TransactionRequest;
    use tokio::task::JoinHandle;
    use uuid::Uuid;

    use crate::{
        error::WalletError,
        provider::{ProviderError, ProviderEvent, TransactionSender, WalletProvider},
        session::WalletSession,
        wallet_browser::{
            error::BrowserWalletError,
            provider::BrowserProvider,
            router::SESSION_TOKEN_HEADER,
            server::BrowserWalletServer,
            types::{
                BrowserApiResponse, BrowserTransaction, ChainUpdate, Connection,
                TransactionResponse, UnavailableReport,
            },
        },
    };

    const ALICE: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const BOB: Address = address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8");

    #[tokio::test]
    async fn test_setup_server() {
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));

        // Check initial state
        assert!(!server.is_connected());
        assert!(!server.is_running());
        assert!(server.timeout() == Duration::from_secs(5));

        // Start server
        server.start().await.unwrap();
        assert!(server.is_running());
        assert_ne!(server.port(), 0);

        // Check that the transaction request queue is empty
        check_transaction_request_queue_empty(&server).await;

        // Stop server
        server.stop().await.unwrap();
        assert!(!server.is_running());
        assert!(matches!(server.stop().await, Err(BrowserWalletError::NotRunning)));
    }

    #[tokio::test]
    async fn test_page_embeds_session_token() {
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));
        server.start().await.unwrap();

        let page = reqwest::get(server.url()).await.unwrap().text().await.unwrap();
        assert!(page.contains(server.session_token().as_str()));
        assert!(!page.contains("__SESSION_TOKEN__"));

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_api_requires_session_token() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));
        server.start().await.unwrap();

        let resp = client
            .get(format!("http://localhost:{}/api/connection", server.port()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);

        let resp = client
            .post(format!("http://localhost:{}/api/connection", server.port()))
            .header(SESSION_TOKEN_HEADER, "not-the-token")
            .json(&Connection::new(ALICE, "0x1"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        assert!(!server.is_connected());

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_disconnect_wallet() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));
        server.start().await.unwrap();
        let mut events = server.subscribe();

        // Connect Alice's wallet
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // Check connection state
        let Connection { address, chain_id } =
            server.get_connection().expect("expected an active wallet connection");
        assert_eq!(address, ALICE);
        assert_eq!(chain_id, "0x1");

        // Fetch it back through the API
        let api: BrowserApiResponse<Option<Connection>> = client
            .get(format!("http://localhost:{}/api/connection", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(api, BrowserApiResponse::Ok(Some(Connection::new(ALICE, "0x1"))));

        // Disconnect wallet
        disconnect_wallet(&client, &server).await;

        // Check disconnected state
        assert!(!server.is_connected());

        // Connect Bob's wallet
        connect_wallet(&client, &server, Connection::new(BOB, "0x2a")).await;

        // Check connection state
        let Connection { address, chain_id } =
            server.get_connection().expect("expected an active wallet connection");
        assert_eq!(address, BOB);
        assert_eq!(chain_id, "0x2a");

        // Subscribers saw every change in order
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                ProviderEvent::AccountsChanged(ALICE),
                ProviderEvent::ChainChanged("0x1".to_string()),
                ProviderEvent::Disconnected,
                ProviderEvent::AccountsChanged(BOB),
                ProviderEvent::ChainChanged("0x2a".to_string()),
            ]
        );

        // Stop server
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_chain_change_keeps_account() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));
        server.start().await.unwrap();

        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;
        let mut events = server.subscribe();

        let resp = client
            .post(format!("http://localhost:{}/api/chain", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .json(&ChainUpdate { chain_id: "0x45c".to_string() })
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        assert_eq!(server.get_connection(), Some(Connection::new(ALICE, "0x45c")));
        assert_eq!(events.try_recv().unwrap(), ProviderEvent::ChainChanged("0x45c".to_string()));

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_send_transaction_client_accept() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(1));
        server.start().await.unwrap();

        // Connect Alice's wallet
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // Create a browser transaction request
        let (tx_request_id, tx_request) = create_browser_transaction();

        // Spawn the signing flow in the background
        let handle = wait_for_signing(&server, tx_request).await;

        // Check transaction request
        check_transaction_request_content(&server, tx_request_id).await;

        // Simulate the wallet accepting and signing the tx
        let hash = TxHash::random();
        let resp = post_transaction_response(
            &client,
            &server,
            &TransactionResponse { id: tx_request_id, hash: Some(hash), error: None },
        )
        .await;
        assert_eq!(resp, BrowserApiResponse::ok());

        // The join handle should now return the tx hash
        let res = handle.await.expect("task panicked");
        match res {
            Ok(got) => assert_eq!(got, hash),
            other => panic!("expected success, got {other:?}"),
        }

        // Answered requests leave the queue
        check_transaction_request_queue_empty(&server).await;
    }

    #[tokio::test]
    async fn test_send_transaction_client_not_requested() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(1));
        server.start().await.unwrap();

        // Connect Alice's wallet
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // Simulate the wallet sending a response for an unknown request
        let api = post_transaction_response(
            &client,
            &server,
            &TransactionResponse { id: Uuid::new_v4(), hash: Some(TxHash::random()), error: None },
        )
        .await;

        // Assert that no transaction without a matching request is accepted
        match api {
            BrowserApiResponse::Error { message } => {
                assert_eq!(message, "Unknown transaction id");
            }
            _ => panic!("expected error response"),
        }
    }

    #[tokio::test]
    async fn test_send_transaction_invalid_response_format() {
        let client = reqwest::Client::new();

        let mut server = BrowserWalletServer::new(0, Duration::from_secs(1));
        server.start().await.unwrap();

        // Connect Alice's wallet
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // Simulate the wallet sending a response with an invalid UUID
        let resp = client
            .post(format!("http://localhost:{}/api/transaction/response", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .body(
                r#"{
                "id": "invalid-uuid",
                "hash": "invalid-hash",
                "error": null
            }"#,
            )
            .header("Content-Type", "application/json")
            .send()
            .await
            .unwrap();

        // The server should respond with a 422 Unprocessable Entity status
        assert_eq!(resp.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_send_transaction_client_reject() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(1));
        server.start().await.unwrap();

        // Connect Alice's wallet
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // Create a browser transaction request
        let (tx_request_id, tx_request) = create_browser_transaction();

        // Spawn the signing flow in the background
        let handle = wait_for_signing(&server, tx_request).await;

        // Check transaction request
        check_transaction_request_content(&server, tx_request_id).await;

        // Simulate the wallet rejecting the tx
        post_transaction_response(
            &client,
            &server,
            &TransactionResponse {
                id: tx_request_id,
                hash: None,
                error: Some("User rejected the transaction".into()),
            },
        )
        .await;

        // The join handle should now return a rejection error
        let res = handle.await.expect("task panicked");
        match res {
            Err(BrowserWalletError::Rejected { operation, reason }) => {
                assert_eq!(operation, "Transaction");
                assert_eq!(reason, "User rejected the transaction");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_transaction_timeout_withdraws_request() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_millis(300));
        server.start().await.unwrap();
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        let (_, tx_request) = create_browser_transaction();
        let res = server.request_transaction(tx_request).await;
        assert!(matches!(res, Err(BrowserWalletError::Timeout { operation: "Transaction", .. })));

        check_transaction_request_queue_empty(&server).await;
    }

    #[tokio::test]
    async fn test_dropped_transaction_request_is_withdrawn() {
        let client = reqwest::Client::new();
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(5));
        server.start().await.unwrap();
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        // The caller gives up long before the bridge would
        let (tx_request_id, tx_request) = create_browser_transaction();
        let res = tokio::time::timeout(
            Duration::from_millis(200),
            server.request_transaction(tx_request),
        )
        .await;
        assert!(res.is_err());

        // Nothing is left for the page to send
        check_transaction_request_queue_empty(&server).await;
        let api = post_transaction_response(
            &client,
            &server,
            &TransactionResponse { id: tx_request_id, hash: Some(TxHash::random()), error: None },
        )
        .await;
        assert_eq!(api, BrowserApiResponse::error("Unknown transaction id"));
    }

    #[tokio::test]
    async fn test_send_transaction_requires_connection() {
        let mut server = BrowserWalletServer::new(0, Duration::from_secs(1));
        server.start().await.unwrap();

        let (_, tx_request) = create_browser_transaction();
        let res = server.request_transaction(tx_request).await;
        assert!(matches!(res, Err(BrowserWalletError::NotConnected)));
    }

    #[tokio::test]
    async fn test_provider_connects_session() {
        let client = reqwest::Client::new();
        let provider = BrowserProvider::spawn(0, Duration::from_secs(5)).await.unwrap();
        let session = WalletSession::default();

        // The page reports the wallet while the session waits
        let server = provider.server().clone();
        let page = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            connect_wallet(&client, &server, Connection::new(ALICE, "0x45a")).await;
        });

        let address = session.connect(&provider).await.unwrap();
        page.await.unwrap();

        assert_eq!(address, ALICE);
        assert_eq!(session.chain_id(), 1114);
        assert!(session.is_ready());

        provider.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_provider_connect_is_bounded_by_session() {
        let client = reqwest::Client::new();
        // Requests to the page time out quickly, connecting must not
        let provider = BrowserProvider::spawn(0, Duration::from_millis(50)).await.unwrap();
        let session = WalletSession::new(Duration::from_secs(5));

        let server = provider.server().clone();
        let page = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(400)).await;
            connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;
        });

        assert_eq!(session.connect(&provider).await.unwrap(), ALICE);
        page.await.unwrap();

        // Without a page the session's own bound applies
        let idle = BrowserProvider::spawn(0, Duration::from_secs(5)).await.unwrap();
        let session = WalletSession::new(Duration::from_millis(300));
        let err = session.connect(&idle).await.unwrap_err();
        assert!(
            matches!(err, WalletError::Timeout { operation: "wallet connection", .. }),
            "{err:?}"
        );

        provider.shutdown().await.unwrap();
        idle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_provider_reports_missing_wallet() {
        let client = reqwest::Client::new();
        let provider = BrowserProvider::spawn(0, Duration::from_secs(5)).await.unwrap();

        let resp = client
            .post(format!("http://localhost:{}/api/unavailable", provider.server().port()))
            .header(SESSION_TOKEN_HEADER, provider.server().session_token().as_str())
            .json(&UnavailableReport {
                message: "Metamask is not available, please install it".to_string(),
            })
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let err = provider.enable().await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::Unavailable("Metamask is not available, please install it".to_string())
        );

        provider.shutdown().await.unwrap();
        let err = provider.enable().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_provider_send_rejected() {
        let client = reqwest::Client::new();
        let provider = BrowserProvider::spawn(0, Duration::from_secs(2)).await.unwrap();
        let server = provider.server().clone();
        connect_wallet(&client, &server, Connection::new(ALICE, "0x1")).await;

        let sender = provider.clone();
        let handle = tokio::spawn(async move {
            sender
                .send_transaction(TransactionRequest {
                    from: Some(ALICE),
                    to: Some(TxKind::Call(BOB)),
                    ..Default::default()
                })
                .await
        });

        // Answer whatever the page picks up
        let pending = loop {
            if let BrowserApiResponse::Ok(tx) = next_transaction_request(&server).await {
                break tx;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        };
        post_transaction_response(
            &client,
            &server,
            &TransactionResponse {
                id: pending.id,
                hash: None,
                error: Some("User denied transaction signature.".into()),
            },
        )
        .await;

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(err, ProviderError::Rejected("User denied transaction signature.".to_string()));
    }

    /// Helper to connect a wallet to the server.
    async fn connect_wallet(
        client: &reqwest::Client,
        server: &BrowserWalletServer,
        connection: Connection,
    ) {
        let resp = client
            .post(format!("http://localhost:{}/api/connection", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .json(&connection)
            .send();
        assert!(resp.await.is_ok());
    }

    /// Helper to disconnect a wallet from the server.
    async fn disconnect_wallet(client: &reqwest::Client, server: &BrowserWalletServer) {
        let resp = client
            .post(format!("http://localhost:{}/api/connection", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .json(&Option::<Connection>::None)
            .send();
        assert!(resp.await.is_ok());
    }

    /// Helper to post a wallet response.
    async fn post_transaction_response(
        client: &reqwest::Client,
        server: &BrowserWalletServer,
        response: &TransactionResponse,
    ) -> BrowserApiResponse {
        let resp = client
            .post(format!("http://localhost:{}/api/transaction/response", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .json(response)
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        resp.json().await.unwrap()
    }

    /// Helper to fetch the next pending transaction, as the page does.
    async fn next_transaction_request(
        server: &BrowserWalletServer,
    ) -> BrowserApiResponse<BrowserTransaction> {
        reqwest::Client::new()
            .get(format!("http://localhost:{}/api/transaction/request", server.port()))
            .header(SESSION_TOKEN_HEADER, server.session_token().as_str())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Spawn the signing flow in the background and return the join handle.
    async fn wait_for_signing(
        server: &BrowserWalletServer,
        tx_request: BrowserTransaction,
    ) -> JoinHandle<Result<TxHash, BrowserWalletError>> {
        // Spawn the signing flow in the background
        let browser_server = server.clone();
        let join_handle =
            tokio::spawn(async move { browser_server.request_transaction(tx_request).await });
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        join_handle
    }

    /// Create a simple browser transaction request.
    fn create_browser_transaction() -> (Uuid, BrowserTransaction) {
        let id = Uuid::new_v4();
        let tx = BrowserTransaction {
            id,
            request: TransactionRequest {
                from: Some(ALICE),
                to: Some(TxKind::Call(BOB)),
                value: Some(U256::from(1000)),
                ..Default::default()
            },
        };
        (id, tx)
    }

    /// Check that the transaction request queue is empty, if not panic.
    async fn check_transaction_request_queue_empty(server: &BrowserWalletServer) {
        let BrowserApiResponse::Error { message } = next_transaction_request(server).await else {
            panic!("expected BrowserApiResponse::Error (no pending transaction), but got Ok");
        };

        assert_eq!(message, "No pending transaction");
    }

    /// Check that the transaction request matches the expected request ID and fields.
    async fn check_transaction_request_content(server: &BrowserWalletServer, tx_request_id: Uuid) {
        let BrowserApiResponse::Ok(pending_tx) = next_transaction_request(server).await else {
            panic!("expected BrowserApiResponse::Ok with a pending transaction");
        };

        assert_eq!(pending_tx.id, tx_request_id);
        assert_eq!(pending_tx.request.from, Some(ALICE));
        assert_eq!(pending_tx.request.to, Some(TxKind::Call(BOB)));
        assert_eq!(pending_tx.request.value, Some(U256::from(1000)));
    }
}
