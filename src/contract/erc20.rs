//! Generic ERC20 tokens.

use alloy::primitives::{Address, U256};
use alloy::sol;

use crate::blockchain::{BlockchainResult, ChainClient};
use crate::contract::{read, ContractCall};

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// Handle on an ERC20 token contract.
#[derive(Debug, Clone, Copy)]
pub struct Erc20Contract {
    address: Address,
}

impl Erc20Contract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// `amount` is in the token's base units.
    pub fn transfer(&self, to: Address, amount: U256) -> ContractCall {
        ContractCall::new(self.address, &IERC20::transferCall { to, amount })
    }

    pub async fn balance_of<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IERC20::balanceOfCall { account }).await
    }

    pub async fn decimals<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<u8> {
        read(client, self.address, IERC20::decimalsCall {}).await
    }

    pub async fn symbol<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<String> {
        read(client, self.address, IERC20::symbolCall {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_transfer_encoding() {
        let token = Erc20Contract::new(Address::repeat_byte(0xaa));
        let call = token.transfer(Address::repeat_byte(0xbb), U256::from(312_345));

        assert_eq!(call.to, Address::repeat_byte(0xaa));
        // transfer(address,uint256)
        assert_eq!(&call.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);

        let decoded = IERC20::transferCall::abi_decode(&call.data).unwrap();
        assert_eq!(decoded.to, Address::repeat_byte(0xbb));
        assert_eq!(decoded.amount, U256::from(312_345));
    }
}
