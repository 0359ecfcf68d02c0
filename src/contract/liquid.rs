//! Per-validator Liquid Newton contracts.

use alloy::primitives::{Address, U256};
use alloy::sol;

use crate::blockchain::{BlockchainResult, ChainClient};
use crate::contract::{read, ContractCall};

sol! {
    interface ILiquid {
        function claimRewards() external;

        function balanceOf(address _account) external view returns (uint256);
        function lockedBalanceOf(address _account) external view returns (uint256);
        function unlockedBalanceOf(address _account) external view returns (uint256);
        function unclaimedRewards(address _account) external view returns (uint256 _unclaimedATN, uint256 _unclaimedNTN);
    }
}

/// Rewards accrued to a delegator and not yet claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclaimedRewards {
    /// Fee rewards, in wei.
    pub atn: U256,
    /// Inflation rewards, in Newton base units.
    pub ntn: U256,
}

/// Handle on a validator's Liquid Newton contract.
///
/// The address comes from the validator record (`liquidStateContract`).
#[derive(Debug, Clone, Copy)]
pub struct LiquidContract {
    address: Address,
}

impl LiquidContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Claim all rewards owed to the sender.
    pub fn claim_rewards(&self) -> ContractCall {
        ContractCall::new(self.address, &ILiquid::claimRewardsCall {})
    }

    /// Liquid Newton held by `account`, locked or not.
    pub async fn balance_of<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<U256> {
        read(client, self.address, ILiquid::balanceOfCall { _account: account }).await
    }

    pub async fn locked_balance_of<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<U256> {
        read(client, self.address, ILiquid::lockedBalanceOfCall { _account: account }).await
    }

    pub async fn unlocked_balance_of<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<U256> {
        read(client, self.address, ILiquid::unlockedBalanceOfCall { _account: account }).await
    }

    pub async fn unclaimed_rewards<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<UnclaimedRewards> {
        let rewards =
            read(client, self.address, ILiquid::unclaimedRewardsCall { _account: account }).await?;
        Ok(UnclaimedRewards {
            atn: rewards._unclaimedATN,
            ntn: rewards._unclaimedNTN,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_claim_rewards_is_selector_only() {
        let call = LiquidContract::new(Address::repeat_byte(0x44)).claim_rewards();
        assert_eq!(call.to, Address::repeat_byte(0x44));
        assert_eq!(call.data.as_ref(), ILiquid::claimRewardsCall::SELECTOR.as_slice());
    }

    #[test]
    fn test_balance_query_signatures() {
        assert_eq!(ILiquid::lockedBalanceOfCall::SIGNATURE, "lockedBalanceOf(address)");
        assert_eq!(ILiquid::unlockedBalanceOfCall::SIGNATURE, "unlockedBalanceOf(address)");
        assert_eq!(ILiquid::unclaimedRewardsCall::SIGNATURE, "unclaimedRewards(address)");
        assert_eq!(
            ILiquid::balanceOfCall::SELECTOR,
            crate::contract::erc20::IERC20::balanceOfCall::SELECTOR
        );
    }
}
