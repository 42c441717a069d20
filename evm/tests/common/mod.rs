#![allow(dead_code)]

use evm_engine::backend::{MemoryAccount, MemoryBackend, MemoryVicinity};
use evm_engine::{Config, ExecutionResult, Executor, Message, PrecompileSet};
use hex_literal::hex;
use primitive_types::{H160, U256};
use std::collections::BTreeMap;

pub const ORIGIN: H160 = H160(hex!("1000000000000000000000000000000000000001"));
pub const CONTRACT: H160 = H160(hex!("2000000000000000000000000000000000000002"));
pub const OTHER: H160 = H160(hex!("3000000000000000000000000000000000000003"));

/// `PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN`: return the top of the stack.
pub const RETURN_TOP: [u8; 8] = hex!("60005260206000f3");

pub fn vicinity() -> MemoryVicinity {
    MemoryVicinity {
        gas_price: U256::from(1),
        origin: ORIGIN,
        block_number: U256::from(100),
        block_gas_limit: U256::from(30_000_000),
        ..Default::default()
    }
}

pub fn account(code: &[u8], balance: u64) -> MemoryAccount {
    MemoryAccount {
        balance: U256::from(balance),
        code: code.to_vec(),
        ..Default::default()
    }
}

pub fn backend<'a>(vicinity: &'a MemoryVicinity, accounts: &[(H160, MemoryAccount)]) -> MemoryBackend<'a> {
    let mut state = BTreeMap::new();
    state.insert(ORIGIN, account(&[], 1_000_000));
    for (address, account) in accounts {
        state.insert(*address, account.clone());
    }
    MemoryBackend::new(vicinity, state)
}

pub fn call(
    backend: &mut MemoryBackend<'_>,
    config: &Config,
    to: H160,
    value: U256,
    data: Vec<u8>,
    gas: u64,
) -> ExecutionResult {
    let precompiles = PrecompileSet::frontier();
    let mut executor = Executor::new(backend, config, &precompiles);
    executor.apply_message(&Message::call(ORIGIN, to, value, gas, data))
}

/// Run `ops` followed by [`RETURN_TOP`] on a fresh Homestead state.
pub fn eval_word(ops: &[u8]) -> U256 {
    let vicinity = vicinity();
    let mut code = ops.to_vec();
    code.extend_from_slice(&RETURN_TOP);
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        1_000_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    U256::from_big_endian(&result.output)
}
