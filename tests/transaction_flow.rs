//! Builder and finalizer behavior against a mock node.

use alloy::primitives::{address, Address, Bytes, U256};

use aut_cli::blockchain::{
    build_contract_transaction, build_transaction, finalize_transaction, BlockchainError,
    GasEstimatePolicy, TxOptions,
};
use aut_cli::contract::AutonityContract;
use aut_cli::value::{parse_fee_factor, parse_newton_amount, ValueError};

mod common;
use common::MockChain;

const FROM: Address = address!("1111111111111111111111111111111111111111");
const TO: Address = address!("2222222222222222222222222222222222222222");

#[tokio::test]
async fn test_empty_transaction_rejected() {
    let chain = MockChain::default();
    let err = build_transaction(Some(&chain), Some(FROM), Some(TO), None, None, &TxOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::EmptyTransaction));

    // Empty call data does not count as data.
    let err = build_transaction(
        Some(&chain),
        Some(FROM),
        Some(TO),
        None,
        Some(Bytes::new()),
        &TxOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, BlockchainError::EmptyTransaction));
}

#[tokio::test]
async fn test_fee_factor_without_client() {
    let opts = TxOptions {
        fee_factor: Some(parse_fee_factor("1.5").unwrap()),
        ..Default::default()
    };
    let err = build_transaction::<MockChain>(None, Some(FROM), Some(TO), Some("1aut"), None, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::FeeFactorRequiresConnection(_)));
}

#[tokio::test]
async fn test_zero_fee_factor_rejected() {
    let chain = MockChain::default();
    for zero in ["0", "0.0", "0e5"] {
        let opts = TxOptions {
            fee_factor: Some(parse_fee_factor(zero).unwrap()),
            ..Default::default()
        };
        let err = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1aut"), None, &opts)
            .await
            .unwrap_err();
        assert!(
            matches!(err, BlockchainError::Value(ValueError::InvalidAmount(_))),
            "{zero}: {err:?}"
        );
    }
}

#[tokio::test]
async fn test_fee_factor_without_base_fee() {
    let chain = MockChain::legacy();
    let opts = TxOptions {
        fee_factor: Some(parse_fee_factor("2").unwrap()),
        ..Default::default()
    };
    let err = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1aut"), None, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::FeeFactorRequiresConnection(_)));
}

#[tokio::test]
async fn test_fee_factor_scales_base_fee_and_wins() {
    let chain = MockChain::default();
    let opts = TxOptions {
        fee_factor: Some(parse_fee_factor("1.25").unwrap()),
        max_fee_per_gas: Some(1),
        ..Default::default()
    };
    let tx = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1aut"), None, &opts)
        .await
        .unwrap();
    assert_eq!(tx.max_fee_per_gas, Some(12_500_000_000));
    assert_eq!(tx.value, Some(U256::from(10u64).pow(U256::from(18u64))));
}

#[tokio::test]
async fn test_conflicting_fee_models() {
    let chain = MockChain::default();
    let opts = TxOptions {
        gas_price: Some(1),
        max_priority_fee_per_gas: Some(1),
        ..Default::default()
    };
    let err = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1"), None, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::ConflictingFeeModels(_)));

    let opts = TxOptions {
        legacy: true,
        fee_factor: Some(parse_fee_factor("2").unwrap()),
        ..Default::default()
    };
    let err = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1"), None, &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::ConflictingFeeModels(_)));
}

#[tokio::test]
async fn test_finalize_fills_eip1559_fields() {
    let chain = MockChain::default();
    let tx = build_transaction(Some(&chain), None, Some(TO), Some("2gwei"), None, &TxOptions::default())
        .await
        .unwrap();
    let tx = finalize_transaction(Some(&chain), tx, Some(FROM), GasEstimatePolicy::Strict)
        .await
        .unwrap();

    assert_eq!(tx.from, Some(FROM));
    assert_eq!(tx.chain_id, Some(common::CHAIN_ID));
    assert_eq!(tx.nonce, Some(7));
    assert_eq!(tx.gas, Some(common::GAS_ESTIMATE));
    assert_eq!(tx.max_priority_fee_per_gas, Some(common::PRIORITY_FEE));
    assert_eq!(tx.max_fee_per_gas, Some(2 * 10_000_000_000 + common::PRIORITY_FEE));
    assert!(tx.gas_price.is_none());
    assert!(tx.is_complete());
}

#[tokio::test]
async fn test_finalize_legacy_chain_uses_gas_price() {
    let chain = MockChain::legacy();
    let tx = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1"), None, &TxOptions::default())
        .await
        .unwrap();
    let tx = finalize_transaction(Some(&chain), tx, None, GasEstimatePolicy::Strict)
        .await
        .unwrap();

    assert_eq!(tx.gas_price, Some(common::GAS_PRICE));
    assert!(tx.max_fee_per_gas.is_none());
    assert!(tx.max_priority_fee_per_gas.is_none());
}

#[tokio::test]
async fn test_finalize_never_mixes_fee_models() {
    let chain = MockChain::default();
    let cases = [
        TxOptions::default(),
        TxOptions {
            legacy: true,
            ..Default::default()
        },
        TxOptions {
            gas_price: Some(3),
            ..Default::default()
        },
        TxOptions {
            max_priority_fee_per_gas: Some(3),
            ..Default::default()
        },
        TxOptions {
            fee_factor: Some(parse_fee_factor("3").unwrap()),
            ..Default::default()
        },
    ];

    for opts in cases {
        let tx = build_transaction(Some(&chain), Some(FROM), Some(TO), Some("1"), None, &opts)
            .await
            .unwrap();
        let tx = finalize_transaction(Some(&chain), tx, None, GasEstimatePolicy::Strict)
            .await
            .unwrap();
        assert!(
            !(tx.gas_price.is_some() && tx.max_fee_per_gas.is_some()),
            "mixed fee models for {opts:?}"
        );
    }
}

#[tokio::test]
async fn test_gas_estimate_policy() {
    let chain = MockChain {
        estimate_fails: true,
        ..Default::default()
    };
    let call = AutonityContract::default().bond(TO, parse_newton_amount("1").unwrap());

    let tx = build_contract_transaction(Some(&chain), Some(FROM), call.clone(), &TxOptions::default())
        .await
        .unwrap();
    let err = finalize_transaction(Some(&chain), tx, None, GasEstimatePolicy::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::Rpc(_)));

    let tx = build_contract_transaction(Some(&chain), Some(FROM), call, &TxOptions::default())
        .await
        .unwrap();
    let tx = finalize_transaction(Some(&chain), tx, None, GasEstimatePolicy::Fallback(300_000))
        .await
        .unwrap();
    assert_eq!(tx.gas, Some(300_000));
}

#[tokio::test]
async fn test_offline_finalize_reports_missing_field() {
    let tx = build_transaction::<MockChain>(None, Some(FROM), Some(TO), Some("1"), None, &TxOptions::default())
        .await
        .unwrap();
    let err = finalize_transaction::<MockChain>(None, tx, None, GasEstimatePolicy::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::IncompleteTransaction(_)));
}

#[tokio::test]
async fn test_nonce_needs_sender() {
    let chain = MockChain::default();
    let tx = build_transaction(Some(&chain), None, Some(TO), Some("1"), None, &TxOptions::default())
        .await
        .unwrap();
    let err = finalize_transaction(Some(&chain), tx, None, GasEstimatePolicy::Strict)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockchainError::IncompleteTransaction(_)));
}
