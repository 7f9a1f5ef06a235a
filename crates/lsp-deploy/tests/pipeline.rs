//! End-to-end runs of the deployment pipeline against the in-memory chain.

use alloy_primitives::{address, Address, Bytes, B256};
use alloy_sol_types::SolValue;
use lsp_deploy::{
    constants::{LINKED_CONTRACTS_FACTORY_ADDRESS, UNIVERSAL_FACTORY_ADDRESS},
    predict,
    test_utils::{owned_payload, profile_plan, InMemoryChain, MockVerifier},
    DeployError, DeploymentMode, DeploymentOutcome, DeploymentStrategy, LinkedDeploymentRequest,
    LinkedRoute, NetworkConfig, NoopVerifier, Pipeline, SingleDeployment, VerificationOutcome,
    VerificationTarget,
};

const OWNER: Address = address!("0x42f61368744ca0079e9c6bdfb520c92031eecfdc");
const DEPLOYER: Address = address!("0x000000000000000000000000000000000000d3d3");

fn single(verification: Option<VerificationTarget>) -> SingleDeployment {
    SingleDeployment {
        factory: UNIVERSAL_FACTORY_ADDRESS,
        payload: owned_payload(OWNER),
        salt: B256::repeat_byte(0x01),
        mode: DeploymentMode::Create2,
        verification,
    }
}

fn target(contract: &str) -> VerificationTarget {
    VerificationTarget {
        contract: contract.to_string(),
        constructor_values: vec![OWNER.to_string()],
    }
}

#[tokio::test]
async fn test_single_run_reports_and_verifies() {
    let chain = InMemoryChain::new(4201);
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let pipeline =
        Pipeline::new(chain, MockVerifier::succeeding(), NetworkConfig::lukso_testnet());

    let deployment = single(Some(target("contracts/Foo.sol:Foo")));
    let report = pipeline.run(&DeploymentStrategy::Single(deployment.clone())).await.unwrap();

    let predicted = predict(
        UNIVERSAL_FACTORY_ADDRESS,
        &deployment.payload,
        deployment.salt,
        &deployment.mode,
    );
    let DeploymentOutcome::Single { predicted: reported, receipt } = report.outcome else {
        panic!("expected a single deployment, got {:?}", report.outcome);
    };
    assert_eq!(reported, predicted);
    assert_eq!(receipt.address, predicted);
    assert_eq!(report.network, "lukso_testnet");
    assert_eq!(report.chain_id, 4201);
    assert_eq!(
        report.explorer_urls,
        [format!("https://explorer.execution.testnet.lukso.network/address/{predicted}")]
    );

    assert_eq!(report.verification.len(), 1);
    assert_eq!(report.verification[0].outcome, VerificationOutcome::Verified);
    assert_eq!(report.verification[0].contract, "contracts/Foo.sol:Foo");
    assert_eq!(report.verification[0].address, predicted);
}

#[tokio::test]
async fn test_verifier_receives_constructor_arguments() {
    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let verifier = MockVerifier::succeeding();
    let pipeline = Pipeline::new(chain, &verifier, NetworkConfig::localhost());

    let report = pipeline
        .run(&DeploymentStrategy::Single(single(Some(target("contracts/Foo.sol:Foo")))))
        .await
        .unwrap();

    let requests = verifier.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].address, report.outcome.addresses()[0]);
    assert_eq!(requests[0].network, "localhost");
    assert_eq!(requests[0].constructor_args, Bytes::from(OWNER.abi_encode()));
    assert_eq!(requests[0].constructor_values, [OWNER.to_string()]);
    // Localhost has no explorer.
    assert!(report.explorer_urls.is_empty());
}

#[tokio::test]
async fn test_verification_failure_keeps_receipt() {
    let deployment = single(Some(target("contracts/Foo.sol:Foo")));
    let strategy = DeploymentStrategy::Single(deployment);

    let reference = InMemoryChain::default();
    reference.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let expected = Pipeline::new(reference, NoopVerifier, NetworkConfig::localhost())
        .run(&strategy)
        .await
        .unwrap();

    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let verifier = MockVerifier::failing("explorer unavailable");
    let report =
        Pipeline::new(chain, verifier, NetworkConfig::localhost()).run(&strategy).await.unwrap();

    assert_eq!(report.outcome, expected.outcome);
    assert!(matches!(
        &report.verification[0].outcome,
        VerificationOutcome::Failed { reason } if reason.contains("explorer unavailable")
    ));
}

#[tokio::test]
async fn test_deployment_error_skips_verification() {
    let chain = InMemoryChain::default();
    let verifier = MockVerifier::succeeding();
    let pipeline = Pipeline::new(chain, &verifier, NetworkConfig::localhost());

    let err = pipeline
        .run(&DeploymentStrategy::Single(single(Some(target("contracts/Foo.sol:Foo")))))
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::FactoryUnavailable { .. }));
    assert!(verifier.requests().is_empty());
}

#[tokio::test]
async fn test_linked_run() {
    let chain = InMemoryChain::default();
    chain.install_linked_factory(LINKED_CONTRACTS_FACTORY_ADDRESS);
    chain.install_orchestrator(DEPLOYER, LINKED_CONTRACTS_FACTORY_ADDRESS, profile_plan());
    let verifier = MockVerifier::succeeding();
    let pipeline = Pipeline::new(chain, &verifier, NetworkConfig::lukso());

    let request = LinkedDeploymentRequest {
        factory: LINKED_CONTRACTS_FACTORY_ADDRESS,
        route: LinkedRoute::Orchestrator { deployer: DEPLOYER },
        salt: B256::ZERO,
        check_ownership: true,
        primary_verification: Some(target("contracts/Profile.sol:Profile")),
        controller_verification: Some(VerificationTarget {
            contract: "contracts/KeyManager.sol:KeyManager".to_string(),
            constructor_values: Vec::new(),
        }),
    };
    let report = pipeline.run(&DeploymentStrategy::Linked(request)).await.unwrap();

    let DeploymentOutcome::Linked { deployment } = report.outcome else {
        panic!("expected a linked deployment, got {:?}", report.outcome);
    };
    assert_ne!(deployment.primary, deployment.controller);
    assert_eq!(report.explorer_urls.len(), 2);
    assert_eq!(pipeline.client().owner_of(deployment.primary), Some(deployment.controller));

    let requests = verifier.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].address, deployment.primary);
    assert!(requests[0].constructor_args.is_empty());
    assert_eq!(requests[1].address, deployment.controller);
    assert_eq!(requests[1].constructor_args, Bytes::from(deployment.primary.abi_encode()));
    assert_eq!(requests[1].constructor_values, [deployment.primary.to_string()]);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let report = Pipeline::new(chain, NoopVerifier, NetworkConfig::localhost())
        .run(&DeploymentStrategy::Single(single(None)))
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["strategy"], "single");
    assert_eq!(json["outcome"]["receipt"]["confirmations"], 1);
    assert_eq!(json["verification"], serde_json::json!([]));
}
