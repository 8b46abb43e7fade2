use crate::error::{PrivateKeyError, WalletSignerError};
use alloy_primitives::{B256, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;
use url::Url;

fn ensure_pk_not_env(pk: &str) -> Result<(), PrivateKeyError> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        return Err(PrivateKeyError::ExistsAsEnvVar(pk.to_string()));
    }
    Ok(())
}

/// Validates and sanitizes a raw private key, returning the local signer for it.
pub fn create_private_key_signer(private_key_str: &str) -> Result<PrivateKeySigner, PrivateKeyError> {
    let private_key_str = private_key_str.trim();
    let private_key = match B256::from_hex(private_key_str) {
        Ok(private_key) => private_key,
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            return Err(err.into());
        }
    };
    match PrivateKeySigner::from_bytes(&private_key) {
        Ok(pk) => Ok(pk),
        Err(err) => {
            ensure_pk_not_env(private_key_str)?;
            Err(PrivateKeyError::Invalid(err.to_string()))
        }
    }
}

/// Parses an RPC endpoint, prepending `http://` to bare `localhost:<port>` urls.
pub fn parse_rpc_url(url: &str) -> Result<Url, WalletSignerError> {
    let url = url.trim();
    let owned;
    let url = if url.starts_with("localhost:") {
        owned = format!("http://{url}");
        owned.as_str()
    } else {
        url
    };
    Url::parse(url)
        .map_err(|source| WalletSignerError::InvalidRpcUrl { url: url.to_string(), source })
}
