//! Properties of offline address prediction.

use alloy_primitives::{Address, Bytes, B256};
use lsp_deploy::{
    compute_linked_addresses,
    constants::{LINKED_CONTRACTS_FACTORY_ADDRESS, UNIVERSAL_FACTORY_ADDRESS},
    predict, DeploymentMode, InitPayload, LinkedDeploymentPlan,
};
use proptest::{prelude::*, sample::Index};

fn arb_code() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 1..512)
}

fn arb_mode() -> impl Strategy<Value = DeploymentMode> {
    prop_oneof![
        Just(DeploymentMode::Create2),
        proptest::collection::vec(any::<u8>(), 0..64).prop_map(|calldata| {
            DeploymentMode::Create2AndInitialize { calldata: calldata.into() }
        }),
    ]
}

proptest! {
    /// Repeated predictions of the same triple agree.
    #[test]
    fn prediction_is_deterministic(
        code in arb_code(),
        salt in any::<[u8; 32]>(),
        mode in arb_mode(),
    ) {
        let payload = InitPayload::from_creation_code(&code).unwrap();
        let salt = B256::from(salt);
        let first = predict(UNIVERSAL_FACTORY_ADDRESS, &payload, salt, &mode);
        let second = predict(UNIVERSAL_FACTORY_ADDRESS, &payload.clone(), salt, &mode.clone());
        prop_assert_eq!(first, second);
        prop_assert_ne!(first, Address::ZERO);
    }

    /// Changing a single payload byte moves the address.
    #[test]
    fn single_byte_change_moves_address(
        code in arb_code(),
        index in any::<Index>(),
        flip in 1u8..=255,
        salt in any::<[u8; 32]>(),
    ) {
        let salt = B256::from(salt);
        let original = InitPayload::from_creation_code(&code).unwrap();

        let mut changed = code.clone();
        let at = index.index(changed.len());
        changed[at] ^= flip;
        let changed = InitPayload::from_creation_code(&changed).unwrap();

        prop_assert_ne!(
            predict(UNIVERSAL_FACTORY_ADDRESS, &original, salt, &DeploymentMode::Create2),
            predict(UNIVERSAL_FACTORY_ADDRESS, &changed, salt, &DeploymentMode::Create2)
        );
    }

    /// Different salts give different addresses for the same payload.
    #[test]
    fn salt_differentiates(code in arb_code(), a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        prop_assume!(a != b);
        let payload = InitPayload::from_creation_code(&code).unwrap();
        prop_assert_ne!(
            predict(UNIVERSAL_FACTORY_ADDRESS, &payload, a.into(), &DeploymentMode::Create2),
            predict(UNIVERSAL_FACTORY_ADDRESS, &payload, b.into(), &DeploymentMode::Create2)
        );
    }

    /// A linked pair is always two distinct non-zero addresses.
    #[test]
    fn linked_pair_is_distinct(
        primary in arb_code(),
        controller in arb_code(),
        add_primary_address in any::<bool>(),
        salt in any::<[u8; 32]>(),
    ) {
        let plan = LinkedDeploymentPlan {
            primary_bytecode: Bytes::from(primary),
            controller_bytecode: Bytes::from(controller),
            add_primary_address,
            ..Default::default()
        };
        let pair = compute_linked_addresses(LINKED_CONTRACTS_FACTORY_ADDRESS, &plan, salt.into());
        prop_assert_ne!(pair.primary, pair.controller);
        prop_assert_ne!(pair.primary, Address::ZERO);
        prop_assert_ne!(pair.controller, Address::ZERO);
    }
}
