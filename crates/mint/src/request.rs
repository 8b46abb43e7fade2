use alloy_primitives::{Address, Bytes, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use portal_wallets::WalletError;

use crate::contract::IPortalNft;

/// One mint attempt for a completed level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintRequest {
    /// The account the token is minted to.
    pub player: Address,
    pub level_id: U256,
    /// Passed to the contract untouched.
    pub metadata_uri: String,
}

impl MintRequest {
    /// Builds a request, parsing `level_id` as a non-negative decimal integer.
    pub fn new(
        player: Address,
        level_id: &str,
        metadata_uri: impl Into<String>,
    ) -> Result<Self, WalletError> {
        Ok(Self { player, level_id: parse_level_id(level_id)?, metadata_uri: metadata_uri.into() })
    }

    /// ABI encoded `mintNFT(player, levelId, metadataURI)`.
    pub fn calldata(&self) -> Bytes {
        IPortalNft::mintNFTCall {
            player: self.player,
            levelId: self.level_id,
            metadataURI: self.metadata_uri.clone(),
        }
        .abi_encode()
        .into()
    }

    /// The transaction sending this mint to `contract` from the player.
    pub fn to_transaction(&self, contract: Address) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.player),
            to: Some(TxKind::Call(contract)),
            input: TransactionInput::new(self.calldata()),
            ..Default::default()
        }
    }
}

/// Parses a decimal level id. Signs, hex and surrounding text are rejected.
pub fn parse_level_id(value: &str) -> Result<U256, WalletError> {
    let invalid = |reason: &str| WalletError::InvalidLevelId {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let digits = value.trim();
    if digits.is_empty() {
        return Err(invalid("empty"));
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a non-negative decimal integer"));
    }
    U256::from_str_radix(digits, 10).map_err(|err| invalid(&err.to_string()))
}
