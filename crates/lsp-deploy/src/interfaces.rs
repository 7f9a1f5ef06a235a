//! Solidity bindings for the factories this crate talks to.

#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// LSP16 Universal Factory.
    interface ILSP16UniversalFactory {
        event ContractCreated(
            address indexed createdContract,
            bytes32 indexed providedSalt,
            bytes32 generatedSalt,
            bool indexed initialized,
            bytes initializeCalldata
        );

        function computeAddress(
            bytes32 creationBytecodeHash,
            bytes32 providedSalt,
            bool initializable,
            bytes calldata initializeCalldata
        ) external view returns (address);

        function generateSalt(
            bytes32 providedSalt,
            bool initializable,
            bytes memory initializeCallData
        ) external pure returns (bytes32);

        function deployCreate2(bytes calldata creationBytecode, bytes32 providedSalt)
            external
            payable
            returns (address);

        function deployCreate2AndInitialize(
            bytes calldata creationBytecode,
            bytes32 providedSalt,
            bytes calldata initializeCalldata,
            uint256 constructorMsgValue,
            uint256 initializeCalldataMsgValue
        ) external payable returns (address);
    }

    /// LSP23 Linked Contracts Factory.
    interface ILSP23LinkedContractsFactory {
        struct PrimaryContractDeployment {
            bytes32 salt;
            uint256 fundingAmount;
            bytes creationBytecode;
        }

        struct SecondaryContractDeployment {
            uint256 fundingAmount;
            bytes creationBytecode;
            bool addPrimaryContractAddress;
            bytes extraConstructorParams;
        }

        event DeployedContracts(
            address indexed primaryContract,
            address indexed secondaryContract,
            PrimaryContractDeployment primaryContractDeployment,
            SecondaryContractDeployment secondaryContractDeployment,
            address postDeploymentModule,
            bytes postDeploymentModuleCalldata
        );

        function deployContracts(
            PrimaryContractDeployment calldata primaryContractDeployment,
            SecondaryContractDeployment calldata secondaryContractDeployment,
            address postDeploymentModule,
            bytes calldata postDeploymentModuleCalldata
        )
            external
            payable
            returns (address primaryContractAddress, address secondaryContractAddress);

        function computeAddresses(
            PrimaryContractDeployment calldata primaryContractDeployment,
            SecondaryContractDeployment calldata secondaryContractDeployment,
            address postDeploymentModule,
            bytes calldata postDeploymentModuleCalldata
        )
            external
            view
            returns (address primaryContractAddress, address secondaryContractAddress);
    }

    /// A deployer contract that forwards a fixed primary/controller pair to the LSP23 factory.
    interface ILinkedDeployer {
        function deploy(bytes32 salt)
            external
            returns (address primaryContract, address secondaryContract);
    }

    /// Ownership read on the primary contract.
    interface IOwnable {
        function owner() external view returns (address);
    }
}
