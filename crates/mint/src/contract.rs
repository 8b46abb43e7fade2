//! ABI of the portal reward contract.

use alloy_sol_types::sol;

sol! {
    /// The reward contract every mint and query goes to.
    interface IPortalNft {
        #[derive(Debug, PartialEq, Eq)]
        function mintNFT(address player, uint256 levelId, string metadataURI) external returns (uint256);
        #[derive(Debug, PartialEq, Eq)]
        function getNFTsOfPlayer(address player) external view returns (uint256[]);
    }
}
