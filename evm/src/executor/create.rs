use super::{ExecutionResult, Executor, Message};
use crate::config::CreateScheme;
use crate::core::prelude::*;
use crate::core::utils::{U256_ONE, U256_ZERO};
use crate::core::{ExitError, ExitReason};
use crate::external::ExternalContext;
use crate::gasometer;
use log::debug;
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// Outcome of a contract creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateResult {
    /// Why execution stopped.
    pub reason: ExitReason,
    /// Gas not consumed, after paying the code deposit.
    pub gas_left: u64,
    /// Address of the new contract, `None` if creation failed.
    pub address: Option<H160>,
    /// Reverted data. Empty on success, the output became the code.
    pub output: Vec<u8>,
}

/// Address of a contract created by `sender`.
///
/// `nonce` is the sender nonce before the creation bumped it and
/// `init_code` the creation code; each scheme uses only one of them.
#[must_use]
pub fn create_address(scheme: CreateScheme, sender: H160, nonce: U256, init_code: &[u8]) -> H160 {
    match scheme {
        CreateScheme::Legacy => {
            let mut stream = rlp::RlpStream::new_list(2);
            stream.append(&sender);
            stream.append(&nonce);
            H256::from_slice(Keccak256::digest(&stream.out()).as_slice()).into()
        }
        CreateScheme::Hashed => {
            let mut hasher = Keccak256::new();
            hasher.update(sender.as_bytes());
            hasher.update(init_code);
            H256::from_slice(hasher.finalize().as_slice()).into()
        }
    }
}

impl<E: ExternalContext> Executor<'_, '_, E> {
    /// Create a contract running `msg.data` as init code.
    ///
    /// The sender nonce is bumped unless the sender is the transaction
    /// origin, and stays bumped whatever the outcome. On success the init
    /// code output is stored as the contract code after paying
    /// `G_CONTRACTBYTE` per byte.
    pub fn create(&mut self, mut msg: Message) -> CreateResult {
        if msg.sender != self.context.origin() {
            if let Err(e) = self.context.increment_nonce(msg.sender) {
                return CreateResult {
                    reason: e.into(),
                    gas_left: 0,
                    address: None,
                    output: Vec::new(),
                };
            }
        }
        let nonce = self.context.nonce(msg.sender).saturating_sub(U256_ONE);
        let address = create_address(self.config.create_scheme, msg.sender, nonce, &msg.data);
        debug!(target: "evm::executor", "create {:?} by {:?}", address, msg.sender);

        msg.to = address;
        msg.code_address = address;
        msg.is_create = true;
        let init_code = core::mem::take(&mut msg.data);

        let snapshot = self.context.snapshot();
        if self.context.exists(address) {
            // Only the balance survives a collision.
            self.context.set_nonce(address, U256_ZERO);
            self.context.set_code(address, Vec::new());
            self.context.reset_storage(address);
        }

        let ExecutionResult {
            reason,
            gas_left,
            output,
        } = self.apply_message_with_code(&msg, init_code);
        if !reason.is_succeed() {
            self.context.revert(snapshot);
            return CreateResult {
                reason,
                gas_left,
                address: None,
                output,
            };
        }

        let mut gas_left = gas_left;
        let mut code = output;
        if !code.is_empty() {
            match gasometer::code_deposit_gas(code.len()) {
                Ok(cost) if cost <= gas_left => gas_left -= cost,
                _ if self.config.create_code_deposit_oog_fails => {
                    debug!(target: "evm::executor", "code deposit of {} bytes failed", code.len());
                    self.context.revert(snapshot);
                    return CreateResult {
                        reason: ExitError::OutOfGas.into(),
                        gas_left: 0,
                        address: None,
                        output: Vec::new(),
                    };
                }
                _ => code = Vec::new(),
            }
        }

        self.context.set_code(address, code);
        CreateResult {
            reason,
            gas_left,
            address: Some(address),
            output: Vec::new(),
        }
    }
}
