mod common;

use common::{account, backend, call, vicinity, CONTRACT, ORIGIN, OTHER};
use evm_engine::backend::MemoryBackend;
use evm_engine::{
    create_address, run_with_call_stack, ChunkCache, Config, CreateScheme, ExitError, ExitReason,
    Executor, ExternalContext, Message, Opcode, PrecompileSet,
};
use hex_literal::hex;
use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

/// `PUSH2 0x03e8 PUSH1 0 RETURN`: returns 1000 zero bytes.
const RETURN_1000_BYTES: [u8; 6] = hex!("6103e86000f3");
/// Init code returning the two byte runtime code `PUSH1 0`.
///
/// `PUSH2 0x6000 PUSH1 0 MSTORE PUSH1 2 PUSH1 30 RETURN`
const INIT_CODE: [u8; 11] = hex!("616000600052 6002601ef3");

/// Factory running `CREATE` on [`INIT_CODE`] and storing the result in
/// slot 0.
///
/// `PUSH11 <init> PUSH1 0 MSTORE PUSH1 11 PUSH1 21 PUSH1 0 CREATE PUSH1 0 SSTORE`
fn factory() -> Vec<u8> {
    let mut code = vec![0x6a];
    code.extend_from_slice(&INIT_CODE);
    code.extend_from_slice(&hex!("600052 600b 6015 6000 f0 6000 55"));
    code
}

fn word_to_address(word: H256) -> H160 {
    H160::from(word)
}

#[test]
fn identity_through_call() {
    // PUSH3 "abc" PUSH1 0 MSTORE
    // CALL(gas 1000, to 4, value 0, in 29..32, out 0..3)
    // PUSH1 3 PUSH1 0 RETURN
    let code = hex!(
        "62616263600052"
        "6003 6000 6003 601d 6000 6004 6103e8 f1"
        "60036000f3"
    );
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    assert_eq!(result.output, b"abc".to_vec());
}

#[test]
fn precompile_out_of_gas_fails_the_call() {
    // CALL(gas 17, to 4, value 0, in 0..32, out 0..0), status is returned.
    let code = hex!(
        "6000600060206000600060046011 f1"
        "60005260206000f3"
    );
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success());
    assert_eq!(U256::from_big_endian(&result.output), U256::zero());
    // The requested gas is lost along with the new account surcharge.
    assert_eq!(result.gas_left, 100_000 - 61 - 3 - 25_000 - 17 - 12);
}

#[test]
fn nested_call_depth_limit() {
    // mem[0] = calldata[0] + 1
    // CALL(gas - 0x5000, self, 0, in 0..32, out 0..0)
    // storage[calldata[0]] = status + 1
    let code = hex!(
        "600035 600101 600052"
        "6000 6000 6020 6000 6000 30 62005000 5a 03 f1"
        "600101 600035 55 00"
    );

    // Runs from the default sized test thread.
    let slots = run_with_call_stack(move || {
        let vicinity = vicinity();
        let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);
        let result = call(
            &mut backend,
            &Config::homestead(),
            CONTRACT,
            U256::zero(),
            vec![0; 32],
            30_000_000,
        );
        assert!(result.is_success(), "{:?}", result.reason);

        (0..=1025u64)
            .map(|depth| backend.storage(CONTRACT, H256::from_low_u64_be(depth)))
            .collect::<Vec<_>>()
    })
    .unwrap();

    // Depths 0 to 1023 call successfully, the call at depth 1024 fails softly.
    for slot in &slots[..1024] {
        assert_eq!(*slot, H256::from_low_u64_be(2));
    }
    assert_eq!(slots[1024], H256::from_low_u64_be(1));
    assert_eq!(slots[1025], H256::zero());
}

#[test]
fn call_stack_limit_is_configurable() {
    // CALL(gas - 0x5000, self, ...) then storage[0] += status
    let code = hex!(
        "6000 6000 6000 6000 6000 30 62005000 5a 03 f1"
        "600054 01 600055"
    );
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);
    let result = call(
        &mut backend,
        &Config::homestead().with_call_stack_limit(3),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        1_000_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    // Frames at depth 0, 1 and 2 made a successful call.
    assert_eq!(
        backend.storage(CONTRACT, H256::zero()),
        H256::from_low_u64_be(3)
    );
}

#[test]
fn insufficient_balance_fails_softly() {
    // CALL(gas 0x1000, OTHER, value 1, in 0..0, out 0..0), status is returned.
    let mut code = hex!("6000600060006000 6001 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("611000 f1 60005260206000f3"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[(CONTRACT, account(&code, 0)), (OTHER, account(&[], 0))],
    );

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success());
    assert_eq!(U256::from_big_endian(&result.output), U256::zero());
    // Value surcharge minus the stipend.
    assert_eq!(result.gas_left, 100_000 - 61 - 6_700 - 15);
    assert_eq!(backend.balance(OTHER), U256::zero());
}

#[test]
fn value_call_forwards_stipend() {
    // Callee: GAS, RETURN_TOP
    let callee = hex!("5a60005260206000f3");
    // CALL(gas 0, OTHER, value 5, in 0..0, out 0..32), RETURN(0, 32)
    let mut code = hex!("6020600060006000 6005 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("6000 f1 60206000f3"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[(CONTRACT, account(&code, 10)), (OTHER, account(&callee, 0))],
    );

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    assert_eq!(U256::from_big_endian(&result.output), U256::from(2300 - 2));
    assert_eq!(backend.balance(OTHER), U256::from(5));
    assert_eq!(backend.balance(CONTRACT), U256::from(5));
}

#[test]
fn all_but_one_64th_cap() {
    // Callee: GAS, RETURN_TOP
    let callee = hex!("5a60005260206000f3");
    // CALL(gas 2^256 - 1, OTHER, 0, in 0..0, out 0..32), RETURN(0, 32)
    let mut code = hex!("6020600060006000 6000 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("600019 f1 60206000f3"));
    let vicinity = vicinity();

    let mut backend = backend(
        &vicinity,
        &[(CONTRACT, account(&code, 0)), (OTHER, account(&callee, 0))],
    );
    let result = call(
        &mut backend,
        &Config::tangerine(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    let available = 100_000 - 64 - 3 - 660;
    let forwarded = available - available / 64;
    assert_eq!(
        U256::from_big_endian(&result.output),
        U256::from(forwarded - 2)
    );

    // Without the cap the same request cannot be paid.
    let mut backend = common::backend(
        &vicinity,
        &[(CONTRACT, account(&code, 0)), (OTHER, account(&callee, 0))],
    );
    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert_eq!(result.reason, ExitReason::Error(ExitError::OutOfGas));
}

#[test]
fn failed_child_is_reverted_and_reverting_child_refunds() {
    // Child: PUSH1 1 PUSH1 0 SSTORE PUSH1 0xaa PUSH1 0 MSTORE8 PUSH1 1 PUSH1 0 REVERT
    let child = hex!("6001600055 60aa600053 60016000fd");
    // CALL(gas 50000, OTHER, 0, in 0..0, out 0..1), storage[1] = status,
    // RETURN(0, 1)
    let mut code = hex!("6001600060006000 6000 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("61c350 f1 600155 60016000f3"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[(CONTRACT, account(&code, 0)), (OTHER, account(&child, 0))],
    );

    let result = call(
        &mut backend,
        &Config::homestead().with_revert(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        100_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);
    assert_eq!(result.output, vec![0xaa]);
    assert_eq!(backend.storage(OTHER, H256::zero()), H256::zero());
    assert_eq!(backend.storage(CONTRACT, H256::from_low_u64_be(1)), H256::zero());
    // The child used 20024 gas and handed back the rest.
    assert!(result.gas_left > 100_000 - 50_000);
}

#[test]
fn create_stores_code_and_returns_address() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&factory(), 0))]);

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        1_000_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);

    let expected = create_address(CreateScheme::Legacy, CONTRACT, U256::zero(), &[]);
    let stored = word_to_address(backend.storage(CONTRACT, H256::zero()));
    assert_eq!(stored, expected);
    assert_eq!(backend.code(expected), hex!("6000").to_vec());
    assert_eq!(backend.nonce(CONTRACT), U256::one());
}

#[test]
fn create_with_hashed_scheme() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&factory(), 0))]);

    let config = Config::homestead().with_create_scheme(CreateScheme::Hashed);
    let result = call(
        &mut backend,
        &config,
        CONTRACT,
        U256::zero(),
        Vec::new(),
        1_000_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);

    let mut preimage = CONTRACT.as_bytes().to_vec();
    preimage.extend_from_slice(&INIT_CODE);
    let hash = Keccak256::digest(&preimage);
    let expected = H160::from_slice(&hash[12..]);

    assert_eq!(word_to_address(backend.storage(CONTRACT, H256::zero())), expected);
    assert_eq!(backend.code(expected), hex!("6000").to_vec());
}

#[test]
fn create_deposit_out_of_gas_only_bumps_nonce() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&[], 0))]);
    let before = backend.state().clone();
    let precompiles = PrecompileSet::frontier();
    let config = Config::homestead();

    let result = {
        let mut executor = Executor::new(&mut backend, &config, &precompiles);
        executor.create(Message::create(
            CONTRACT,
            U256::zero(),
            100_000,
            RETURN_1000_BYTES.to_vec(),
        ))
    };
    assert_eq!(result.reason, ExitReason::Error(ExitError::OutOfGas));
    assert_eq!(result.gas_left, 0);
    assert_eq!(result.address, None);

    let address = create_address(CreateScheme::Legacy, CONTRACT, U256::zero(), &[]);
    assert!(!backend.exists(address));
    assert_eq!(backend.nonce(CONTRACT), U256::one());
    let mut after = backend.state().clone();
    if let Some(account) = after.get_mut(&CONTRACT) {
        account.nonce = U256::zero();
    }
    assert_eq!(after, before);
}

#[test]
fn frontier_deposit_out_of_gas_leaves_empty_code() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&[], 0))]);
    let precompiles = PrecompileSet::frontier();
    let config = Config::frontier();

    let result = {
        let mut executor = Executor::new(&mut backend, &config, &precompiles);
        executor.create(Message::create(
            CONTRACT,
            U256::zero(),
            100_000,
            RETURN_1000_BYTES.to_vec(),
        ))
    };
    let address = create_address(CreateScheme::Legacy, CONTRACT, U256::zero(), &[]);
    assert!(result.reason.is_succeed());
    assert_eq!(result.address, Some(address));
    // Init code: six static gas and 32 words of memory.
    assert_eq!(result.gas_left, 100_000 - 6 - 98);
    assert!(backend.exists(address));
    assert!(backend.code(address).is_empty());
}

#[test]
fn create_by_origin_keeps_nonce() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[]);
    backend.set_nonce(ORIGIN, U256::from(5));
    let precompiles = PrecompileSet::frontier();
    let config = Config::homestead();

    let result = {
        let mut executor = Executor::new(&mut backend, &config, &precompiles);
        executor.create(Message::create(
            ORIGIN,
            U256::from(10),
            100_000,
            INIT_CODE.to_vec(),
        ))
    };
    let address = create_address(CreateScheme::Legacy, ORIGIN, U256::from(4), &[]);
    assert_eq!(result.address, Some(address));
    assert_eq!(backend.nonce(ORIGIN), U256::from(5));
    assert_eq!(backend.balance(address), U256::from(10));
    assert_eq!(backend.code(address), hex!("6000").to_vec());
}

#[test]
fn create_collision_keeps_balance_only() {
    let vicinity = vicinity();
    let address = create_address(CreateScheme::Legacy, CONTRACT, U256::zero(), &[]);
    let mut existing = account(&hex!("00"), 7);
    existing.nonce = U256::from(3);
    existing
        .storage
        .insert(H256::repeat_byte(1), H256::repeat_byte(2));
    let mut backend = backend(
        &vicinity,
        &[(CONTRACT, account(&[], 0)), (address, existing)],
    );
    let precompiles = PrecompileSet::frontier();
    let config = Config::homestead();

    let result = {
        let mut executor = Executor::new(&mut backend, &config, &precompiles);
        executor.create(Message::create(
            CONTRACT,
            U256::zero(),
            100_000,
            INIT_CODE.to_vec(),
        ))
    };
    assert_eq!(result.address, Some(address));
    assert_eq!(backend.balance(address), U256::from(7));
    assert_eq!(backend.nonce(address), U256::zero());
    assert_eq!(backend.code(address), hex!("6000").to_vec());
    assert_eq!(
        backend.storage(address, H256::repeat_byte(1)),
        H256::zero()
    );
}

/// Stores `CALLER`, `CALLVALUE` and `ADDRESS` in slots 0, 1 and 2.
///
/// `CALLER PUSH1 0 SSTORE CALLVALUE PUSH1 1 SSTORE ADDRESS PUSH1 2 SSTORE STOP`
const RECORD_CONTEXT: [u8; 13] = hex!("33600055 34600155 30600255 00");

fn slot(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

#[test]
fn delegatecall_keeps_caller_context() {
    // DELEGATECALL(gas 100000, OTHER, in 0..0, out 0..0) STOP
    let mut code = hex!("6000600060006000 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("620186a0 f4 00"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[
            (CONTRACT, account(&code, 0)),
            (OTHER, account(&RECORD_CONTEXT, 0)),
        ],
    );

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::from(7),
        Vec::new(),
        300_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);

    assert_eq!(backend.storage(CONTRACT, slot(0)), H256::from(ORIGIN));
    assert_eq!(backend.storage(CONTRACT, slot(1)), slot(7));
    assert_eq!(backend.storage(CONTRACT, slot(2)), H256::from(CONTRACT));
    for n in 0..3 {
        assert_eq!(backend.storage(OTHER, slot(n)), H256::zero());
    }
    // Only the top-level value moved.
    assert_eq!(backend.balance(CONTRACT), U256::from(7));
    assert_eq!(backend.balance(OTHER), U256::zero());
}

#[test]
fn callcode_runs_on_caller_with_passed_value() {
    // CALLCODE(gas 100000, OTHER, value 5, in 0..0, out 0..0) STOP
    let mut code = hex!("6000600060006000 6005 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("620186a0 f2 00"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[
            (CONTRACT, account(&code, 100)),
            (OTHER, account(&RECORD_CONTEXT, 0)),
        ],
    );

    let result = call(
        &mut backend,
        &Config::homestead(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        300_000,
    );
    assert!(result.is_success(), "{:?}", result.reason);

    assert_eq!(backend.storage(CONTRACT, slot(0)), H256::from(CONTRACT));
    assert_eq!(backend.storage(CONTRACT, slot(1)), slot(5));
    assert_eq!(backend.storage(CONTRACT, slot(2)), H256::from(CONTRACT));
    assert_eq!(backend.storage(OTHER, slot(1)), H256::zero());
    // The value is sent to the caller itself.
    assert_eq!(backend.balance(CONTRACT), U256::from(100));
    assert_eq!(backend.balance(OTHER), U256::zero());
}

#[test]
fn delegatecall_is_inactive_before_homestead() {
    let mut code = hex!("6000600060006000 73").to_vec();
    code.extend_from_slice(OTHER.as_bytes());
    code.extend_from_slice(&hex!("620186a0 f4 00"));
    let vicinity = vicinity();
    let mut backend = backend(
        &vicinity,
        &[
            (CONTRACT, account(&code, 0)),
            (OTHER, account(&RECORD_CONTEXT, 0)),
        ],
    );

    let result = call(
        &mut backend,
        &Config::frontier(),
        CONTRACT,
        U256::zero(),
        Vec::new(),
        300_000,
    );
    assert_eq!(
        result.reason,
        ExitReason::Error(ExitError::OpcodeInactive(Opcode::DelegateCall))
    );
    assert_eq!(result.gas_left, 0);
    assert_eq!(backend.storage(CONTRACT, slot(0)), H256::zero());
}

#[test]
fn cache_is_handed_between_executors() {
    let code = hex!("600260030160005260206000f3");
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&code, 0))]);
    let config = Config::homestead();
    let precompiles = PrecompileSet::frontier();
    let msg = Message::call(ORIGIN, CONTRACT, U256::zero(), 100_000, Vec::new());
    let hash = H256::from_slice(Keccak256::digest(code).as_slice());

    let mut first = Executor::with_cache(&mut backend, &config, &precompiles, ChunkCache::new(4));
    assert!(first.apply_message(&msg).is_success());
    let (_, cache) = first.into_parts();
    assert!(cache.contains(&hash));

    let mut second = Executor::with_cache(&mut backend, &config, &precompiles, cache);
    assert!(second.apply_message(&msg).is_success());
    assert_eq!(second.cache().len(), 1);
    assert_eq!(second.cache().capacity(), 4);
}

#[test]
fn hashed_create_twice_resets_first_contract() {
    let vicinity = vicinity();
    let mut backend = backend(&vicinity, &[(CONTRACT, account(&[], 0))]);
    let precompiles = PrecompileSet::frontier();
    let config = Config::homestead().with_create_scheme(CreateScheme::Hashed);
    let create = |backend: &mut MemoryBackend<'_>| {
        let mut executor = Executor::new(backend, &config, &precompiles);
        executor.create(Message::create(
            CONTRACT,
            U256::zero(),
            100_000,
            INIT_CODE.to_vec(),
        ))
    };

    let first = create(&mut backend).address;
    let address = first.unwrap();
    backend.set_storage(address, H256::repeat_byte(1), H256::repeat_byte(2));
    backend.set_balance(address, U256::from(9));

    let second = create(&mut backend).address;
    assert_eq!(second, first);
    assert_eq!(backend.code(address), hex!("6000").to_vec());
    assert_eq!(backend.balance(address), U256::from(9));
    assert_eq!(backend.storage(address, H256::repeat_byte(1)), H256::zero());
    assert_eq!(backend.nonce(CONTRACT), U256::from(2));
}
