//! Argument parsing and command execution against the in-memory chain.

use alloy_primitives::{address, Address, B256, U256};
use clap::Parser;
use lsp_deploy::{
    compute_linked_addresses, constants::UNIVERSAL_FACTORY_ADDRESS, predict,
    predict_minimal_proxy,
    test_utils::{owned_payload, sample_creation_code, InMemoryChain, MockVerifier},
    DeployError, DeploymentLedger, DeploymentMode, DeploymentOutcome, LedgerError, NetworkConfig,
    NoopVerifier, Pipeline, VerificationOutcome,
};
use lsp_deployer::{
    common::{CliError, VerifierKind},
    MainCmd,
};
use rstest::rstest;

const OWNER: Address = address!("0x42f61368744ca0079e9c6bdfb520c92031eecfdc");
const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

fn parse(args: &[&str]) -> MainCmd {
    MainCmd::try_parse_from(std::iter::once("lsp-deployer").chain(args.iter().copied()))
        .unwrap()
}

fn deploy_cmd(args: &[&str]) -> lsp_deployer::deploy::Cmd {
    match parse(args) {
        MainCmd::Deploy(cmd) => cmd,
        other => panic!("expected deploy, got {other:?}"),
    }
}

fn deploy_args(code: &str, owner: &str, salt: &str) -> Vec<String> {
    [
        "deploy",
        "--contract",
        "contracts/Foo.sol:Foo",
        "--bytecode",
        code,
        "--constructor",
        "address",
        "--arg",
        owner,
        "--salt",
        salt,
        "--network",
        "localhost",
        "--private-key",
        ANVIL_KEY,
    ]
    .map(String::from)
    .to_vec()
}

#[rstest]
#[case::predict(&["predict", "--bytecode", "0x6080"], "predict")]
#[case::deploy(
    &[
        "deploy",
        "--contract",
        "Foo",
        "--bytecode",
        "0x6080",
        "--private-key",
        "0x01",
    ],
    "deploy"
)]
#[case::deploy_linked(
    &[
        "deploy-linked",
        "--deployer",
        "0x000000000000000000000000000000000000d3d3",
        "--private-key",
        "0x01",
    ],
    "deploy-linked"
)]
#[case::verify(
    &[
        "verify",
        "0x000000000000000000000000000000000000d3d3",
        "--contract",
        "Foo",
        "--verifier",
        "command",
    ],
    "verify"
)]
fn test_subcommands_parse(#[case] args: &[&str], #[case] expected: &str) {
    let name = match parse(args) {
        MainCmd::Predict(_) => "predict",
        MainCmd::Deploy(_) => "deploy",
        MainCmd::DeployLinked(_) => "deploy-linked",
        MainCmd::Verify(_) => "verify",
    };
    assert_eq!(name, expected);
}

#[rstest]
#[case::bytecode_and_proxy(
    &[
        "predict",
        "--bytecode",
        "0x6080",
        "--proxy-of",
        "0x00000000000000000000000000000000000000aa",
    ]
)]
#[case::proxy_with_constructor(
    &[
        "predict",
        "--proxy-of",
        "0x00000000000000000000000000000000000000aa",
        "--constructor",
        "address",
    ]
)]
#[case::bad_salt(&["predict", "--bytecode", "0x6080", "--salt", "0x1234"])]
#[case::unknown_verifier(
    &[
        "verify",
        "0x000000000000000000000000000000000000d3d3",
        "--contract",
        "Foo",
        "--verifier",
        "sourcify",
    ]
)]
#[case::linked_deployer_and_code(
    &[
        "deploy-linked",
        "--deployer",
        "0x000000000000000000000000000000000000d3d3",
        "--primary-bytecode",
        "0x6080",
        "--private-key",
        "0x01",
    ]
)]
fn test_invalid_arguments_are_rejected(#[case] args: &[&str]) {
    let args = std::iter::once("lsp-deployer").chain(args.iter().copied());
    assert!(MainCmd::try_parse_from(args).is_err());
}

#[rstest]
#[case::plain(None, DeploymentMode::Create2)]
#[case::initialize(
    Some("0xc4d66de8"),
    DeploymentMode::Create2AndInitialize { calldata: alloy_primitives::bytes!("c4d66de8") }
)]
fn test_predict_matches_library(#[case] initialize: Option<&str>, #[case] mode: DeploymentMode) {
    let code = sample_creation_code().to_string();
    let owner = OWNER.to_string();
    let salt = B256::repeat_byte(0x01).to_string();
    let mut args = vec![
        "predict",
        "--bytecode",
        code.as_str(),
        "--constructor",
        "address",
        "--arg",
        owner.as_str(),
        "--salt",
        salt.as_str(),
    ];
    if let Some(calldata) = initialize {
        args.extend(["--initialize", calldata]);
    }
    let MainCmd::Predict(cmd) = parse(&args) else { panic!("expected predict") };

    let expected =
        predict(UNIVERSAL_FACTORY_ADDRESS, &owned_payload(OWNER), B256::repeat_byte(0x01), &mode);
    assert_eq!(cmd.predicted_address().unwrap(), expected);
}

#[test]
fn test_predict_minimal_proxy() {
    let implementation = address!("0x00000000000000000000000000000000000000aa");
    let proxy_of = implementation.to_string();
    let MainCmd::Predict(cmd) = parse(&["predict", "--proxy-of", proxy_of.as_str()]) else {
        panic!("expected predict")
    };

    assert_eq!(
        cmd.predicted_address().unwrap(),
        predict_minimal_proxy(
            UNIVERSAL_FACTORY_ADDRESS,
            implementation,
            B256::ZERO,
            &DeploymentMode::Create2
        )
    );
}

#[test]
fn test_predict_without_bytecode_is_invalid_input() {
    let MainCmd::Predict(cmd) = parse(&["predict"]) else { panic!("expected predict") };
    assert!(matches!(cmd.predicted_address(), Err(CliError::InvalidInput(_))));
}

#[test]
fn test_private_key_and_network_resolution() {
    let cmd = deploy_cmd(&[
        "deploy",
        "--contract",
        "Foo",
        "--bytecode",
        "0x6080",
        "--private-key",
        ANVIL_KEY,
        "--network",
        "lukso",
        "--rpc",
        "http://127.0.0.1:8545",
    ]);

    assert_eq!(
        cmd.key_args.signer().unwrap().address(),
        address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
    );
    let network = cmd.network_args.resolve().unwrap();
    assert_eq!(network.chain_id, 42);
    assert_eq!(network.rpc_url, "http://127.0.0.1:8545");
    assert_eq!(
        cmd.ledger_path(&network),
        std::path::PathBuf::from("deployments").join("lukso.json")
    );
}

#[test]
fn test_invalid_private_key() {
    let cmd = deploy_cmd(&[
        "deploy",
        "--contract",
        "Foo",
        "--bytecode",
        "0x6080",
        "--private-key",
        "not-a-key",
    ]);
    assert!(matches!(cmd.key_args.signer(), Err(CliError::InvalidKey(_))));
}

#[test]
fn test_explorer_verifier_needs_an_explorer() {
    let cmd = deploy_cmd(&[
        "deploy",
        "--contract",
        "Foo",
        "--bytecode",
        "0x6080",
        "--private-key",
        ANVIL_KEY,
        "--verifier",
        "explorer",
    ]);
    assert_eq!(cmd.verifier_args.verifier, VerifierKind::Explorer);
    assert!(matches!(
        cmd.verifier_args.build(&NetworkConfig::localhost()),
        Err(CliError::InvalidInput(_))
    ));
    // An explorer exists on the testnet, but no sources were given.
    assert!(matches!(
        cmd.verifier_args.build(&NetworkConfig::lukso_testnet()),
        Err(CliError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_deploy_records_ledger_and_verifies() {
    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let verifier = MockVerifier::succeeding();
    let pipeline = Pipeline::new(chain, &verifier, NetworkConfig::localhost());

    let code = sample_creation_code().to_string();
    let salt = B256::repeat_byte(0x05);
    let mut args = deploy_args(&code, &OWNER.to_string(), &salt.to_string());
    args.extend(["--verifier".to_string(), "command".to_string()]);
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();
    let cmd = deploy_cmd(&args);

    let mut ledger = DeploymentLedger::default();
    let report = cmd.execute(&pipeline, &mut ledger).await.unwrap();

    let DeploymentOutcome::Single { predicted, receipt } = report.outcome else {
        panic!("expected a single deployment")
    };
    assert_eq!(receipt.address, predicted);
    let entry = ledger.get("contracts/Foo.sol:Foo").unwrap();
    assert_eq!(entry.address, receipt.address);
    assert_eq!(entry.salt, salt);
    assert_eq!(entry.payload_hash, owned_payload(OWNER).hash());

    assert_eq!(report.verification[0].outcome, VerificationOutcome::Verified);
    assert_eq!(verifier.requests()[0].constructor_values, [OWNER.to_string()]);
}

#[tokio::test]
async fn test_deploy_refuses_salt_reuse_for_changed_payload() {
    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let pipeline = Pipeline::new(chain, NoopVerifier, NetworkConfig::localhost());
    let code = sample_creation_code().to_string();
    let salt = B256::repeat_byte(0x06).to_string();
    let mut ledger = DeploymentLedger::default();

    let first = deploy_args(&code, &OWNER.to_string(), &salt);
    let first = first.iter().map(String::as_str).collect::<Vec<_>>();
    deploy_cmd(&first).execute(&pipeline, &mut ledger).await.unwrap();

    let other_owner = Address::repeat_byte(0x77).to_string();
    let second = deploy_args(&code, &other_owner, &salt);
    let second = second.iter().map(String::as_str).collect::<Vec<_>>();
    let err = deploy_cmd(&second).execute(&pipeline, &mut ledger).await.unwrap_err();

    assert!(matches!(err, CliError::Deploy(DeployError::PredictionMismatch { .. })));
    assert_eq!(pipeline.client().sent_transactions().len(), 1);
}

#[tokio::test]
async fn test_deploy_linked_direct_route() {
    let chain = InMemoryChain::default();
    chain.install_linked_factory(lsp_deploy::constants::LINKED_CONTRACTS_FACTORY_ADDRESS);
    let pipeline = Pipeline::new(chain, NoopVerifier, NetworkConfig::localhost());

    let MainCmd::DeployLinked(cmd) = parse(&[
        "deploy-linked",
        "--primary-bytecode",
        "0x608060405260aa",
        "--controller-bytecode",
        "0x608060405260bb",
        "--add-primary-address",
        "--primary-funding",
        "3",
        "--private-key",
        ANVIL_KEY,
    ]) else {
        panic!("expected deploy-linked")
    };

    let request = cmd.request().unwrap();
    let lsp_deploy::LinkedRoute::Direct(plan) = &request.route else {
        panic!("expected the direct route")
    };
    assert_eq!(plan.total_funding(), U256::from(3));
    assert!(request.check_ownership);
    let expected = compute_linked_addresses(request.factory, plan, B256::ZERO);

    let report = cmd.execute(&pipeline).await.unwrap();
    assert_eq!(report.outcome.addresses(), [expected.primary, expected.controller]);
    assert!(report.verification.is_empty());
}

#[test]
fn test_deploy_linked_requires_bytecode_without_deployer() {
    let MainCmd::DeployLinked(cmd) = parse(&["deploy-linked", "--private-key", ANVIL_KEY]) else {
        panic!("expected deploy-linked")
    };
    assert!(matches!(cmd.request(), Err(CliError::InvalidInput(_))));
}

#[tokio::test]
async fn test_verify_sends_encoded_arguments() {
    let owner = OWNER.to_string();
    let MainCmd::Verify(cmd) = parse(&[
        "verify",
        "0x000000000000000000000000000000000000d3d3",
        "--contract",
        "contracts/Foo.sol:Foo",
        "--constructor",
        "address",
        "--arg",
        owner.as_str(),
        "--verifier",
        "command",
        "--network",
        "lukso_testnet",
    ]) else {
        panic!("expected verify")
    };
    let verifier = MockVerifier::succeeding();

    let network = cmd.network_args.resolve().unwrap();
    let outcome = cmd.execute(&verifier, &network).await.unwrap();

    assert_eq!(outcome, VerificationOutcome::Verified);
    let request = &verifier.requests()[0];
    assert_eq!(request.network, "lukso_testnet");
    assert_eq!(&request.constructor_args[..], owned_payload(OWNER).constructor_args());
}

#[tokio::test]
async fn test_verify_failure_is_reported_as_outcome() {
    let MainCmd::Verify(cmd) = parse(&[
        "verify",
        "0x000000000000000000000000000000000000d3d3",
        "--contract",
        "contracts/Foo.sol:Foo",
        "--verifier",
        "command",
    ]) else {
        panic!("expected verify")
    };

    let outcome = cmd
        .execute(&MockVerifier::failing("bytecode mismatch"), &NetworkConfig::lukso_testnet())
        .await
        .unwrap();
    assert!(
        matches!(outcome, VerificationOutcome::Failed { reason } if reason.contains("mismatch"))
    );
}

#[tokio::test]
async fn test_report_survives_failed_ledger_save() {
    let chain = InMemoryChain::default();
    chain.install_universal_factory(UNIVERSAL_FACTORY_ADDRESS);
    let pipeline = Pipeline::new(chain, NoopVerifier, NetworkConfig::localhost());
    let code = sample_creation_code().to_string();
    let args = deploy_args(&code, &OWNER.to_string(), &B256::repeat_byte(0x08).to_string());
    let args = args.iter().map(String::as_str).collect::<Vec<_>>();
    let cmd = deploy_cmd(&args);

    let mut ledger = DeploymentLedger::default();
    let report = cmd.execute(&pipeline, &mut ledger).await.unwrap();
    let DeploymentOutcome::Single { receipt, .. } = &report.outcome else {
        panic!("expected a single deployment")
    };

    // The ledger's parent directory is a regular file.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("deployments");
    std::fs::write(&blocker, "").unwrap();
    let mut out = Vec::new();
    let err = cmd.finish(&report, &ledger, &blocker.join("localhost.json"), &mut out).unwrap_err();

    assert!(matches!(err, CliError::Ledger(LedgerError::Io(_))));
    let printed = String::from_utf8(out).unwrap().to_lowercase();
    assert!(printed.contains(&receipt.tx_hash.to_string()));
    assert!(printed.contains(&receipt.address.to_string().to_lowercase()));
}
