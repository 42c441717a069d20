use super::{linear_cost, Precompile};
use crate::core::prelude::*;
use core::cmp::min;
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Public key recovery, `0x01`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ECRecover;

impl Precompile for ECRecover {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 3000, 0)
    }

    fn execute(&self, i: &[u8]) -> Vec<u8> {
        let mut input = [0u8; 128];
        input[..min(i.len(), 128)].copy_from_slice(&i[..min(i.len(), 128)]);

        // v is a full word and must be exactly 27 or 28.
        let v = U256::from_big_endian(&input[32..64]);
        if v != U256::from(27) && v != U256::from(28) {
            return Vec::new();
        }

        let Ok(message) = libsecp256k1::Message::parse_slice(&input[0..32]) else {
            return Vec::new();
        };
        // Rejects r or s at or above the curve order.
        let Ok(signature) = libsecp256k1::Signature::parse_standard_slice(&input[64..128]) else {
            return Vec::new();
        };
        let Ok(recovery_id) = libsecp256k1::RecoveryId::parse(input[63] - 27) else {
            return Vec::new();
        };
        let Ok(public_key) = libsecp256k1::recover(&message, &signature, &recovery_id) else {
            return Vec::new();
        };

        // Address of the raw 64-byte key, left padded to a word.
        let hash = Keccak256::digest(&public_key.serialize()[1..]);
        let mut output = vec![0u8; 32];
        output[12..].copy_from_slice(&hash[12..]);
        output
    }
}

/// SHA-256, `0x02`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256;

impl Precompile for Sha256 {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 60, 12)
    }

    fn execute(&self, input: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(input).to_vec()
    }
}

/// RIPEMD-160, `0x03`. The 20-byte digest is left padded to a word.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ripemd160;

impl Precompile for Ripemd160 {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 600, 120)
    }

    fn execute(&self, input: &[u8]) -> Vec<u8> {
        let mut ret = vec![0u8; 32];
        let hash = ripemd::Ripemd160::digest(input);
        ret[12..32].copy_from_slice(&hash);
        ret
    }
}

/// Identity, `0x04`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Precompile for Identity {
    fn required_gas(&self, input: &[u8]) -> u64 {
        linear_cost(input.len(), 15, 3)
    }

    fn execute(&self, input: &[u8]) -> Vec<u8> {
        input.to_vec()
    }
}
