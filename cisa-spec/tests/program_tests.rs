//! Program container and configuration tests

use cisa_spec::{CondIsaError, IsaConfig, Program};

#[test]
fn test_empty_program_bytes() {
    let program = Program::new();
    assert!(program.to_bytes().is_empty());
    assert_eq!(Program::from_bytes("", &[]).unwrap(), program);
}

#[test]
fn test_bytes_keep_word_order() {
    let program = Program::from_words("p", (0..16).collect());
    let bytes = program.to_bytes();
    assert_eq!(bytes.len(), 64);
    for (i, chunk) in bytes.chunks(4).enumerate() {
        assert_eq!(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]), i as u32);
    }
}

#[test]
fn test_corrupt_snapshot_is_reported() {
    let err = Program::from_bincode(&[0xFF]).unwrap_err();
    assert!(matches!(err, CondIsaError::Snapshot(_)));
    assert!(!err.is_misuse());
}

#[test]
fn test_config_error_converts() {
    let err: CondIsaError = IsaConfig::new(0, 0, 0, 20).unwrap_err().into();
    assert!(err.to_string().starts_with("Invalid configuration"));
}
