//! Init payload assembly: creation code, constructor arguments and compiler artifacts.

use std::{fs, path::Path};

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{hex, keccak256, Address, Bytes, B256};
use serde::Deserialize;

use crate::constants::{MINIMAL_PROXY_LEN, MINIMAL_PROXY_PREFIX, MINIMAL_PROXY_SUFFIX};

/// Errors raised while forming an init payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The payload has no creation code
    #[error("init payload has no creation code")]
    Empty,

    /// Failed to read an artifact or bytecode file
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that could not be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or lacks a bytecode field
    #[error("invalid compiler artifact: {0}")]
    Artifact(#[from] serde_json::Error),

    /// Bytecode or argument hex could not be decoded
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A constructor type or value could not be parsed
    #[error("constructor argument encoding failed: {0}")]
    Abi(#[from] alloy_dyn_abi::Error),

    /// The number of values does not match the constructor signature
    #[error("constructor takes {expected} argument(s), {actual} given")]
    Arity {
        /// Number of types in the signature
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
}

/// `creationCode ++ abiEncode(constructorArgs)`, immutable once formed.
///
/// The boundary between code and arguments is remembered so the encoded arguments can be handed
/// to the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitPayload {
    bytes: Bytes,
    args_offset: usize,
}

impl InitPayload {
    /// Concatenates creation code and already ABI-encoded constructor arguments.
    pub fn new(creation_code: &[u8], constructor_args: &[u8]) -> Result<Self, PayloadError> {
        if creation_code.is_empty() {
            return Err(PayloadError::Empty);
        }
        let mut bytes = Vec::with_capacity(creation_code.len() + constructor_args.len());
        bytes.extend_from_slice(creation_code);
        bytes.extend_from_slice(constructor_args);
        Ok(Self { bytes: bytes.into(), args_offset: creation_code.len() })
    }

    /// A payload with no constructor arguments.
    pub fn from_creation_code(creation_code: &[u8]) -> Result<Self, PayloadError> {
        Self::new(creation_code, &[])
    }

    /// The ERC-1167 minimal proxy creation code forwarding every call to `implementation`.
    pub fn minimal_proxy(implementation: Address) -> Self {
        let mut bytes = Vec::with_capacity(MINIMAL_PROXY_LEN);
        bytes.extend_from_slice(&MINIMAL_PROXY_PREFIX);
        bytes.extend_from_slice(implementation.as_slice());
        bytes.extend_from_slice(&MINIMAL_PROXY_SUFFIX);
        Self { bytes: bytes.into(), args_offset: MINIMAL_PROXY_LEN }
    }

    /// The full payload as sent to the factory.
    pub const fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// The creation code part.
    pub fn creation_code(&self) -> &[u8] {
        &self.bytes[..self.args_offset]
    }

    /// The ABI-encoded constructor arguments part.
    pub fn constructor_args(&self) -> &[u8] {
        &self.bytes[self.args_offset..]
    }

    /// `keccak256` of the full payload, the value CREATE2 commits to.
    pub fn hash(&self) -> B256 {
        keccak256(&self.bytes)
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty. The constructors never produce one.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for InitPayload {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// ABI-encodes constructor arguments from a type list such as `address,uint256` (parentheses
/// optional) and their string values.
pub fn encode_constructor_args(types: &str, values: &[String]) -> Result<Bytes, PayloadError> {
    let types = types.trim();
    if types.is_empty() || types == "()" {
        if !values.is_empty() {
            return Err(PayloadError::Arity { expected: 0, actual: values.len() });
        }
        return Ok(Bytes::new());
    }

    let signature =
        if types.starts_with('(') { types.to_string() } else { format!("({types})") };
    let element_types = match DynSolType::parse(&signature)? {
        DynSolType::Tuple(types) => types,
        single => vec![single],
    };
    if element_types.len() != values.len() {
        return Err(PayloadError::Arity { expected: element_types.len(), actual: values.len() });
    }

    let tokens = element_types
        .iter()
        .zip(values)
        .map(|(ty, value)| ty.coerce_str(value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DynSolValue::Tuple(tokens).abi_encode_params().into())
}

/// Bytecode as found in Hardhat (`"0x…"`) and Foundry (`{"object": "0x…"}`) artifacts.
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    Hex(String),
    Object { object: String },
}

#[derive(Deserialize)]
struct Artifact {
    bytecode: ArtifactBytecode,
}

/// Loads creation code from a compiler artifact (`.json`) or a raw hex file.
pub fn load_creation_code(path: &Path) -> Result<Bytes, PayloadError> {
    let content = fs::read_to_string(path)
        .map_err(|source| PayloadError::Read { path: path.display().to_string(), source })?;

    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let hex_code = if is_json {
        match serde_json::from_str::<Artifact>(&content)?.bytecode {
            ArtifactBytecode::Hex(code) | ArtifactBytecode::Object { object: code } => code,
        }
    } else {
        content
    };

    Ok(hex::decode(hex_code.trim())?.into())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_payload_keeps_argument_boundary() {
        let payload = InitPayload::new(&[0x60, 0x80], &[0xaa; 32]).unwrap();
        assert_eq!(payload.len(), 34);
        assert_eq!(payload.creation_code(), &[0x60, 0x80]);
        assert_eq!(payload.constructor_args(), &[0xaa; 32]);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(matches!(InitPayload::new(&[], &[]), Err(PayloadError::Empty)));
        assert!(matches!(InitPayload::new(&[], &[0xaa; 32]), Err(PayloadError::Empty)));
        assert!(InitPayload::new(&[0x60], &[]).is_ok());
    }

    #[test]
    fn test_minimal_proxy_layout() {
        let implementation = address!("0xbebebebebebebebebebebebebebebebebebebebe");
        let payload = InitPayload::minimal_proxy(implementation);
        assert_eq!(payload.len(), 55);
        assert_eq!(&payload.bytes()[20..40], implementation.as_slice());
        assert!(payload.constructor_args().is_empty());
        assert_eq!(
            payload.bytes()[..],
            hex!(
                "3d602d80600a3d3981f3363d3d373d3d3d363d73"
                "bebebebebebebebebebebebebebebebebebebebe"
                "5af43d82803e903d91602b57fd5bf3"
            )
        );
    }

    #[test]
    fn test_encode_single_address_argument() {
        let owner = "0x42f61368744CA0079E9c6BdFb520c92031EEcFDc".to_string();
        let encoded = encode_constructor_args("address", &[owner]).unwrap();
        assert_eq!(
            encoded[..],
            hex!("00000000000000000000000042f61368744ca0079e9c6bdfb520c92031eecfdc")
        );
    }

    #[test]
    fn test_encode_multiple_arguments() {
        let encoded = encode_constructor_args(
            "(address,uint256)",
            &["0x0000000000000000000000000000000000000001".to_string(), "7".to_string()],
        )
        .unwrap();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 1);
        assert_eq!(encoded[63], 7);
    }

    #[test]
    fn test_encode_arity_mismatch() {
        let err = encode_constructor_args("address,uint256", &["0x01".to_string()]).unwrap_err();
        assert!(matches!(err, PayloadError::Arity { expected: 2, actual: 1 }));
        assert!(encode_constructor_args("", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_load_hardhat_and_foundry_artifacts() {
        let dir = tempfile::tempdir().unwrap();

        let hardhat = dir.path().join("Hardhat.json");
        fs::File::create(&hardhat)
            .unwrap()
            .write_all(br#"{"contractName":"C","bytecode":"0x6080604052","abi":[]}"#)
            .unwrap();
        assert_eq!(load_creation_code(&hardhat).unwrap()[..], hex!("6080604052"));

        let foundry = dir.path().join("Foundry.json");
        fs::File::create(&foundry)
            .unwrap()
            .write_all(br#"{"bytecode":{"object":"0x60016002","linkReferences":{}}}"#)
            .unwrap();
        assert_eq!(load_creation_code(&foundry).unwrap()[..], hex!("60016002"));

        let raw = dir.path().join("code.hex");
        fs::write(&raw, "0x6001\n").unwrap();
        assert_eq!(load_creation_code(&raw).unwrap()[..], hex!("6001"));
    }
}
