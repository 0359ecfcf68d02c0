//! The Autonity protocol contract.
//!
//! Besides governance and staking, the contract is the ERC20 face of the
//! Newton (NTN) token, so `transfer`, `balanceOf` and `totalSupply` live here.

use alloy::primitives::{address, Address, Bytes, U256};
use alloy::sol;
use serde_json::json;

use crate::blockchain::{BlockchainResult, ChainClient};
use crate::contract::{read, ContractCall};
use crate::value::format_newton_quantity;

/// Fixed address of the Autonity contract on every Autonity network.
pub const AUTONITY_CONTRACT_ADDRESS: Address = address!("bd770416a3345f91e4b34576cb804a576fa48eb1");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Validator {
        address treasury;
        address nodeAddress;
        address oracleAddress;
        string enode;
        uint256 commissionRate;
        uint256 bondedStake;
        uint256 unbondingStake;
        uint256 unbondingShares;
        uint256 selfBondedStake;
        uint256 selfUnbondingStake;
        uint256 selfUnbondingShares;
        uint256 selfUnbondingStakeLocked;
        address liquidStateContract;
        uint256 liquidSupply;
        uint256 registrationBlock;
        uint256 totalSlashed;
        uint256 jailReleaseBlock;
        bytes consensusKey;
        uint8 state;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct CommitteeMember {
        address addr;
        uint256 votingPower;
        bytes consensusKey;
    }

    interface IAutonity {
        function bond(address _validator, uint256 _amount) external payable returns (uint256);
        function unbond(address _validator, uint256 _amount) external returns (uint256);
        function registerValidator(string _enode, address _oracleAddress, bytes _consensusKey, bytes _signatures) external;
        function pauseValidator(address _address) external;
        function activateValidator(address _address) external;
        function changeCommissionRate(address _validator, uint256 _rate) external;
        function updateEnode(address _nodeAddress, string _enode) external;
        function transfer(address _recipient, uint256 _amount) external returns (bool);

        function balanceOf(address _addr) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function epochID() external view returns (uint256);
        function lastEpochTime() external view returns (uint256);
        function epochTotalBondedStake() external view returns (uint256);
        function getValidators() external view returns (address[]);
        function getValidator(address _addr) external view returns (Validator);
        function getMaxCommitteeSize() external view returns (uint256);
        function getOperator() external view returns (address);
        function getTreasuryAccount() external view returns (address);
        function getMinimumBaseFee() external view returns (uint256);
        function getCommittee() external view returns (CommitteeMember[]);
        function getCommitteeEnodes() external view returns (string[]);
        function getEpochPeriod() external view returns (uint256);
        function getBlockPeriod() external view returns (uint256);
        function getUnbondingPeriod() external view returns (uint256);
        function getLastEpochBlock() external view returns (uint256);
        function getTreasuryFee() external view returns (uint256);
        function getVersion() external view returns (uint256);
        function getEpochFromBlock(uint256 _block) external view returns (uint256);
    }
}

/// Handle on the Autonity contract.
#[derive(Debug, Clone, Copy)]
pub struct AutonityContract {
    address: Address,
}

impl Default for AutonityContract {
    fn default() -> Self {
        Self {
            address: AUTONITY_CONTRACT_ADDRESS,
        }
    }
}

impl AutonityContract {
    /// Contract deployed at a non-standard address (test networks).
    pub fn at(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn encode<T: alloy::sol_types::SolCall>(&self, call: T) -> ContractCall {
        ContractCall::new(self.address, &call)
    }

    // State-mutating calls

    pub fn bond(&self, validator: Address, amount: U256) -> ContractCall {
        self.encode(IAutonity::bondCall {
            _validator: validator,
            _amount: amount,
        })
    }

    pub fn unbond(&self, validator: Address, amount: U256) -> ContractCall {
        self.encode(IAutonity::unbondCall {
            _validator: validator,
            _amount: amount,
        })
    }

    pub fn register_validator(
        &self,
        enode: String,
        oracle: Address,
        consensus_key: Bytes,
        proof: Bytes,
    ) -> ContractCall {
        self.encode(IAutonity::registerValidatorCall {
            _enode: enode,
            _oracleAddress: oracle,
            _consensusKey: consensus_key,
            _signatures: proof,
        })
    }

    pub fn pause_validator(&self, validator: Address) -> ContractCall {
        self.encode(IAutonity::pauseValidatorCall { _address: validator })
    }

    pub fn activate_validator(&self, validator: Address) -> ContractCall {
        self.encode(IAutonity::activateValidatorCall { _address: validator })
    }

    /// `rate` is fixed point out of the commission precision.
    pub fn change_commission_rate(&self, validator: Address, rate: u64) -> ContractCall {
        self.encode(IAutonity::changeCommissionRateCall {
            _validator: validator,
            _rate: U256::from(rate),
        })
    }

    pub fn update_enode(&self, validator: Address, enode: String) -> ContractCall {
        self.encode(IAutonity::updateEnodeCall {
            _nodeAddress: validator,
            _enode: enode,
        })
    }

    /// Transfer Newton.
    pub fn transfer(&self, recipient: Address, amount: U256) -> ContractCall {
        self.encode(IAutonity::transferCall {
            _recipient: recipient,
            _amount: amount,
        })
    }

    // Read-only calls

    pub async fn balance_of<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        account: Address,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::balanceOfCall { _addr: account }).await
    }

    pub async fn total_supply<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::totalSupplyCall {}).await
    }

    pub async fn epoch_id<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::epochIDCall {}).await
    }

    pub async fn last_epoch_time<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::lastEpochTimeCall {}).await
    }

    pub async fn epoch_total_bonded_stake<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::epochTotalBondedStakeCall {}).await
    }

    pub async fn validators<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<Vec<Address>> {
        read(client, self.address, IAutonity::getValidatorsCall {}).await
    }

    /// Fails with a contract error when `validator` is not registered.
    pub async fn validator<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        validator: Address,
    ) -> BlockchainResult<Validator> {
        read(client, self.address, IAutonity::getValidatorCall { _addr: validator }).await
    }

    pub async fn max_committee_size<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getMaxCommitteeSizeCall {}).await
    }

    pub async fn operator<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<Address> {
        read(client, self.address, IAutonity::getOperatorCall {}).await
    }

    pub async fn treasury_account<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<Address> {
        read(client, self.address, IAutonity::getTreasuryAccountCall {}).await
    }

    pub async fn minimum_base_fee<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getMinimumBaseFeeCall {}).await
    }

    /// Members of the current consensus committee.
    pub async fn committee<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<Vec<CommitteeMember>> {
        read(client, self.address, IAutonity::getCommitteeCall {}).await
    }

    pub async fn committee_enodes<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<Vec<String>> {
        read(client, self.address, IAutonity::getCommitteeEnodesCall {}).await
    }

    /// Epoch length in blocks.
    pub async fn epoch_period<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getEpochPeriodCall {}).await
    }

    /// Target block interval in seconds.
    pub async fn block_period<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getBlockPeriodCall {}).await
    }

    /// Unbonding delay in blocks.
    pub async fn unbonding_period<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getUnbondingPeriodCall {}).await
    }

    pub async fn last_epoch_block<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getLastEpochBlockCall {}).await
    }

    /// Treasury share of transaction fees, fixed point out of 10^18.
    pub async fn treasury_fee<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getTreasuryFeeCall {}).await
    }

    pub async fn version<C: ChainClient + ?Sized>(&self, client: &C) -> BlockchainResult<U256> {
        read(client, self.address, IAutonity::getVersionCall {}).await
    }

    pub async fn epoch_from_block<C: ChainClient + ?Sized>(
        &self,
        client: &C,
        block: u64,
    ) -> BlockchainResult<U256> {
        let call = IAutonity::getEpochFromBlockCall {
            _block: U256::from(block),
        };
        read(client, self.address, call).await
    }

    /// Protocol parameters gathered from the individual getters.
    pub async fn config<C: ChainClient + ?Sized>(
        &self,
        client: &C,
    ) -> BlockchainResult<serde_json::Value> {
        Ok(json!({
            "operator_account": self.operator(client).await?.to_string(),
            "treasury_account": self.treasury_account(client).await?.to_string(),
            "treasury_fee": self.treasury_fee(client).await?.to_string(),
            "min_basefee": self.minimum_base_fee(client).await?.to_string(),
            "committee_size": self.max_committee_size(client).await?.to_string(),
            "epoch_period": self.epoch_period(client).await?.to_string(),
            "block_period": self.block_period(client).await?.to_string(),
            "unbonding_period": self.unbonding_period(client).await?.to_string(),
            "contract_version": self.version(client).await?.to_string(),
        }))
    }
}

/// Display form of a validator record.
pub fn validator_json(validator: &Validator) -> serde_json::Value {
    json!({
        "treasury": validator.treasury.to_string(),
        "node_address": validator.nodeAddress.to_string(),
        "oracle_address": validator.oracleAddress.to_string(),
        "enode": validator.enode,
        "commission_rate": validator.commissionRate.to_string(),
        "bonded_stake": format_newton_quantity(validator.bondedStake),
        "unbonding_stake": format_newton_quantity(validator.unbondingStake),
        "unbonding_shares": validator.unbondingShares.to_string(),
        "self_bonded_stake": format_newton_quantity(validator.selfBondedStake),
        "self_unbonding_stake": format_newton_quantity(validator.selfUnbondingStake),
        "self_unbonding_shares": validator.selfUnbondingShares.to_string(),
        "self_unbonding_stake_locked": format_newton_quantity(validator.selfUnbondingStakeLocked),
        "liquid_state_contract": validator.liquidStateContract.to_string(),
        "liquid_supply": format_newton_quantity(validator.liquidSupply),
        "registration_block": validator.registrationBlock.to_string(),
        "total_slashed": format_newton_quantity(validator.totalSlashed),
        "jail_release_block": validator.jailReleaseBlock.to_string(),
        "consensus_key": validator.consensusKey.to_string(),
        "state": validator.state,
    })
}

/// Display form of the committee.
pub fn committee_json(members: &[CommitteeMember]) -> serde_json::Value {
    members
        .iter()
        .map(|member| {
            json!({
                "address": member.addr.to_string(),
                "voting_power": format_newton_quantity(member.votingPower),
                "consensus_key": member.consensusKey.to_string(),
            })
        })
        .collect()
}
