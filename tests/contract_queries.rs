//! Read-only contract queries against a mock node.

use alloy::primitives::{address, Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

use aut_cli::cli::account::lntn_balances;
use aut_cli::cli::validator::liquid_contract;
use aut_cli::contract::autonity::{IAutonity, Validator};
use aut_cli::contract::liquid::ILiquid;
use aut_cli::contract::{AutonityContract, UnclaimedRewards, AUTONITY_CONTRACT_ADDRESS};
use aut_cli::error::CliError;

mod common;
use common::MockChain;

const VALIDATOR: Address = address!("3333333333333333333333333333333333333333");
const LIQUID: Address = address!("4444444444444444444444444444444444444444");
const DELEGATOR: Address = address!("5555555555555555555555555555555555555555");

fn validator_record(liquid: Address) -> Validator {
    Validator {
        treasury: Address::repeat_byte(0x01),
        nodeAddress: VALIDATOR,
        oracleAddress: Address::repeat_byte(0x02),
        enode: "enode://abc@127.0.0.1:30303".to_string(),
        commissionRate: U256::from(1_000),
        bondedStake: U256::from(10),
        unbondingStake: U256::ZERO,
        unbondingShares: U256::ZERO,
        selfBondedStake: U256::from(10),
        selfUnbondingStake: U256::ZERO,
        selfUnbondingShares: U256::ZERO,
        selfUnbondingStakeLocked: U256::ZERO,
        liquidStateContract: liquid,
        liquidSupply: U256::from(10),
        registrationBlock: U256::from(1),
        totalSlashed: U256::ZERO,
        jailReleaseBlock: U256::ZERO,
        consensusKey: Bytes::from(vec![0xaa; 48]),
        state: 0,
    }
}

/// Node with one registered validator whose liquid contract is `LIQUID`.
fn staking_chain() -> MockChain {
    MockChain::default()
        .with_call_result(
            AUTONITY_CONTRACT_ADDRESS,
            IAutonity::getValidatorsCall::SELECTOR,
            vec![VALIDATOR].abi_encode(),
        )
        .with_call_result(
            AUTONITY_CONTRACT_ADDRESS,
            IAutonity::getValidatorCall::SELECTOR,
            validator_record(LIQUID).abi_encode(),
        )
}

#[tokio::test]
async fn test_unclaimed_rewards_from_validator_liquid_contract() {
    let chain = staking_chain().with_call_result(
        LIQUID,
        ILiquid::unclaimedRewardsCall::SELECTOR,
        (U256::from(7u64), U256::from(9u64)).abi_encode_params(),
    );

    let liquid = liquid_contract(&chain, VALIDATOR).await.unwrap();
    assert_eq!(liquid.address(), LIQUID);

    let rewards = liquid.unclaimed_rewards(&chain, DELEGATOR).await.unwrap();
    assert_eq!(
        rewards,
        UnclaimedRewards {
            atn: U256::from(7u64),
            ntn: U256::from(9u64),
        }
    );
}

#[tokio::test]
async fn test_locked_and_unlocked_balances() {
    let chain = staking_chain()
        .with_call_result(
            LIQUID,
            ILiquid::lockedBalanceOfCall::SELECTOR,
            U256::from(3u64).abi_encode(),
        )
        .with_call_result(
            LIQUID,
            ILiquid::unlockedBalanceOfCall::SELECTOR,
            U256::from(4u64).abi_encode(),
        );

    let liquid = liquid_contract(&chain, VALIDATOR).await.unwrap();
    assert_eq!(liquid.locked_balance_of(&chain, DELEGATOR).await.unwrap(), U256::from(3u64));
    assert_eq!(liquid.unlocked_balance_of(&chain, DELEGATOR).await.unwrap(), U256::from(4u64));
}

#[tokio::test]
async fn test_lntn_balances_skip_empty_holdings() {
    let holding = staking_chain().with_call_result(
        LIQUID,
        ILiquid::balanceOfCall::SELECTOR,
        U256::from(25u64).abi_encode(),
    );
    let balances = lntn_balances(&holding, DELEGATOR).await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances.get(&VALIDATOR), Some(&U256::from(25u64)));

    let empty = staking_chain().with_call_result(
        LIQUID,
        ILiquid::balanceOfCall::SELECTOR,
        U256::ZERO.abi_encode(),
    );
    assert!(lntn_balances(&empty, DELEGATOR).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_validator_is_a_contract_error() {
    // No answer for getValidator: the empty return data does not decode.
    let chain = MockChain::default();
    let err = liquid_contract(&chain, VALIDATOR).await.unwrap_err();
    assert!(matches!(err, CliError::Blockchain(_)), "{err:?}");
}

#[tokio::test]
async fn test_committee_and_periods() {
    let committee = vec![(VALIDATOR, U256::from(10u64), Bytes::from(vec![0xbb; 48]))];
    let chain = MockChain::default()
        .with_call_result(
            AUTONITY_CONTRACT_ADDRESS,
            IAutonity::getCommitteeCall::SELECTOR,
            committee.abi_encode(),
        )
        .with_call_result(
            AUTONITY_CONTRACT_ADDRESS,
            IAutonity::getEpochPeriodCall::SELECTOR,
            U256::from(1_800u64).abi_encode(),
        )
        .with_call_result(
            AUTONITY_CONTRACT_ADDRESS,
            IAutonity::getCommitteeEnodesCall::SELECTOR,
            vec!["enode://abc@127.0.0.1:30303".to_string()].abi_encode(),
        );
    let autonity = AutonityContract::default();

    let members = autonity.committee(&chain).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].addr, VALIDATOR);
    assert_eq!(members[0].votingPower, U256::from(10u64));

    assert_eq!(autonity.epoch_period(&chain).await.unwrap(), U256::from(1_800u64));
    assert_eq!(
        autonity.committee_enodes(&chain).await.unwrap(),
        vec!["enode://abc@127.0.0.1:30303".to_string()]
    );
}
