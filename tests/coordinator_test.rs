mod common;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::{SolEvent, SolValue};
use common::{dummy_receipt, execution_log, MockProvider};
use stencil::execute::IDeploymentModule;
use stencil::{
    AttemptOutcome, DeploymentAttempt, DeploymentContext, DeploymentExecutionCoordinator, Error,
    ExecutionMode, Network, NetworkRunStatus, NetworkTarget, NullProgress, RootState,
};

const MODULE: Address = address!("5555555555555555555555555555555555555555");
const SAFE: Address = address!("6666666666666666666666666666666666666666");

fn test_signer() -> PrivateKeySigner {
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
        .parse()
        .unwrap()
}

/// Replays a fixed queue of outcomes and records what it was asked to do.
/// The record handles are shared so tests can inspect them after the
/// coordinator consumes the attempt.
struct ScriptedAttempt {
    outcomes: Mutex<VecDeque<AttemptOutcome>>,
    attempted: Arc<Mutex<Vec<Network>>>,
    signature_counts: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedAttempt {
    fn new(outcomes: Vec<AttemptOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            attempted: Arc::new(Mutex::new(Vec::new())),
            signature_counts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait::async_trait]
impl DeploymentAttempt for ScriptedAttempt {
    async fn attempt(&self, ctx: &DeploymentContext) -> anyhow::Result<AttemptOutcome> {
        self.attempted.lock().unwrap().push(ctx.network);
        self.signature_counts
            .lock()
            .unwrap()
            .push(ctx.signatures.len());
        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("attempted more networks than scripted"))?)
    }
}

fn target(network: Network, root_state: RootState) -> (NetworkTarget, Arc<MockProvider>) {
    let provider = Arc::new(MockProvider::new(network.chain_id(), false));
    *provider.call_handler.lock().unwrap() = Some(Box::new(move |_request| {
        Ok(Bytes::from(U256::from(root_state as u8).abi_encode()))
    }));
    let target = NetworkTarget {
        network,
        provider: provider.clone(),
        module_address: MODULE,
        safe_address: SAFE,
    };
    (target, provider)
}

#[tokio::test]
async fn test_successful_run_carries_one_signature_per_network() {
    let root = B256::repeat_byte(0x11);
    let (eth, _) = target(Network::Ethereum, RootState::Approved);
    let (opt, _) = target(Network::Optimism, RootState::Approved);

    let attempt = ScriptedAttempt::new(vec![
        AttemptOutcome::Success {
            receipts: vec![dummy_receipt(B256::repeat_byte(0xaa))],
        },
        AttemptOutcome::Success {
            receipts: vec![dummy_receipt(B256::repeat_byte(0xbb))],
        },
    ]);
    let signature_counts = attempt.signature_counts.clone();
    let coordinator =
        DeploymentExecutionCoordinator::new(attempt, test_signer(), ExecutionMode::LiveNetworkCli);

    let results = coordinator
        .run(root, &[eth, opt], &NullProgress)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].network, Network::Ethereum);
    assert_eq!(results[0].status, NetworkRunStatus::Succeeded);
    assert_eq!(results[0].receipts.len(), 1);
    assert_eq!(results[1].network, Network::Optimism);
    assert_eq!(results[1].status, NetworkRunStatus::Succeeded);
    assert_eq!(signature_counts.lock().unwrap().as_slice(), &[1, 1]);
}

#[tokio::test]
async fn test_success_without_receipts_is_fatal() {
    let root = B256::repeat_byte(0x22);
    let (eth, _) = target(Network::Ethereum, RootState::Approved);

    let coordinator = DeploymentExecutionCoordinator::new(
        ScriptedAttempt::new(vec![AttemptOutcome::Success { receipts: vec![] }]),
        test_signer(),
        ExecutionMode::LiveNetworkCli,
    );

    let err = coordinator
        .run(root, &[eth], &NullProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedState(_)));
}

#[tokio::test]
async fn test_already_executed_recovers_receipts_without_broadcasting() {
    let root = B256::repeat_byte(0x33);
    let (eth, provider) = target(Network::Ethereum, RootState::Completed);

    let tx_hash = B256::repeat_byte(0xcc);
    let topics = vec![IDeploymentModule::RootActionExecuted::SIGNATURE_HASH, root];
    {
        let mut logs = provider.logs.lock().unwrap();
        logs.push(execution_log(MODULE, topics.clone(), tx_hash));
        // A second action in the same transaction must not double-count it.
        logs.push(execution_log(MODULE, topics, tx_hash));
    }
    provider
        .receipts
        .lock()
        .unwrap()
        .insert(tx_hash, dummy_receipt(tx_hash));

    let coordinator = DeploymentExecutionCoordinator::new(
        ScriptedAttempt::new(vec![AttemptOutcome::AlreadyExecuted]),
        test_signer(),
        ExecutionMode::LiveNetworkCli,
    );

    let results = coordinator.run(root, &[eth], &NullProgress).await.unwrap();

    assert_eq!(results[0].status, NetworkRunStatus::AlreadyExecuted);
    assert_eq!(results[0].receipts.len(), 1);
    assert_eq!(results[0].receipts[0].transaction_hash, tx_hash);
    assert_eq!(provider.sent_count(), 0);
}

#[tokio::test]
async fn test_already_executed_with_empty_log_is_fatal() {
    let root = B256::repeat_byte(0x44);
    let (eth, _) = target(Network::Ethereum, RootState::Completed);

    let coordinator = DeploymentExecutionCoordinator::new(
        ScriptedAttempt::new(vec![AttemptOutcome::AlreadyExecuted]),
        test_signer(),
        ExecutionMode::LiveNetworkCli,
    );

    let err = coordinator
        .run(root, &[eth], &NullProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedState(_)));
}

#[tokio::test]
async fn test_fatal_failure_aborts_before_later_networks() {
    let root = B256::repeat_byte(0x55);
    let (eth, _) = target(Network::Ethereum, RootState::Approved);
    let (opt, _) = target(Network::Optimism, RootState::Approved);
    let (arb, _) = target(Network::Arbitrum, RootState::Approved);

    let attempt = ScriptedAttempt::new(vec![
        AttemptOutcome::Success {
            receipts: vec![dummy_receipt(B256::repeat_byte(0xdd))],
        },
        AttemptOutcome::ExecutionFailed {
            reason: "action 3 reverted".to_string(),
        },
        AttemptOutcome::Success {
            receipts: vec![dummy_receipt(B256::repeat_byte(0xee))],
        },
    ]);
    let attempted = attempt.attempted.clone();
    let coordinator =
        DeploymentExecutionCoordinator::new(attempt, test_signer(), ExecutionMode::LiveNetworkCli);

    let err = coordinator
        .run(root, &[eth, opt, arb], &NullProgress)
        .await
        .unwrap_err();

    match err {
        Error::ExecutionFailure { reason } => assert_eq!(reason, "action 3 reverted"),
        other => panic!("expected execution failure, got {other:?}"),
    }
    // The third network was never attempted.
    assert_eq!(
        attempted.lock().unwrap().as_slice(),
        &[Network::Ethereum, Network::Optimism]
    );
}

#[tokio::test]
async fn test_attempt_error_surfaces_as_deployment_error() {
    let root = B256::repeat_byte(0x66);
    let (eth, _) = target(Network::Ethereum, RootState::Approved);

    let coordinator = DeploymentExecutionCoordinator::new(
        ScriptedAttempt::new(vec![AttemptOutcome::Error {
            message: "provider unreachable".to_string(),
        }]),
        test_signer(),
        ExecutionMode::LiveNetworkCli,
    );

    let err = coordinator
        .run(root, &[eth], &NullProgress)
        .await
        .unwrap_err();
    match err {
        Error::Deployment(message) => assert_eq!(message, "provider unreachable"),
        other => panic!("expected deployment error, got {other:?}"),
    }
}
