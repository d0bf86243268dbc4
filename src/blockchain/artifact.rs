//! Contract build artifacts (truffle JSON).

use std::path::Path;

use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::blockchain::types::{ChainError, ChainResult};

#[derive(Debug, Deserialize)]
struct Artifact {
    #[serde(rename = "contractName", default)]
    contract_name: Option<String>,
    bytecode: String,
}

/// Parse the creation bytecode out of an artifact document.
pub fn parse_bytecode(json: &str) -> ChainResult<Bytes> {
    let artifact: Artifact =
        serde_json::from_str(json).map_err(|e| ChainError::Artifact(format!("invalid artifact: {}", e)))?;

    let bytecode: Bytes = artifact
        .bytecode
        .parse()
        .map_err(|e| ChainError::Artifact(format!("invalid bytecode hex: {}", e)))?;

    if bytecode.is_empty() {
        return Err(ChainError::Artifact(format!(
            "artifact {} has no bytecode",
            artifact.contract_name.as_deref().unwrap_or("<unnamed>")
        )));
    }
    Ok(bytecode)
}

/// Load the creation bytecode from an artifact file.
pub fn load_bytecode(path: &Path) -> ChainResult<Bytes> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| ChainError::Artifact(format!("{}: {}", path.display(), e)))?;
    parse_bytecode(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytecode() {
        let bytecode = parse_bytecode(r#"{"contractName":"Session","abi":[],"bytecode":"0x6080604052"}"#).unwrap();
        assert_eq!(bytecode.len(), 5);
        assert_eq!(bytecode[0], 0x60);
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let err = parse_bytecode(r#"{"contractName":"Session","bytecode":"0x"}"#).unwrap_err();
        assert!(err.to_string().contains("Session has no bytecode"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_bytecode(Path::new("/nonexistent/Session.json")).unwrap_err();
        assert!(matches!(err, ChainError::Artifact(_)));
    }
}
