//! Call-family semantics, creation edge cases and access pricing, driven
//! end-to-end.

use cinder::{
    bytecode::{opcode, Bytecode},
    primitives::{
        address, Address, Bytes, CfgEnv, Env, ExecutionResult, SpecId, TransactTo, TxEnv, U256,
    },
    state::AccountInfo,
    Evm, InMemoryDb,
};

const CALLER: Address = address!("0x1000000000000000000000000000000000000aaa");
const PARENT: Address = address!("0x2000000000000000000000000000000000000bbb");
const CHILD: Address = address!("0x3000000000000000000000000000000000000ccc");

fn env_with(spec_id: SpecId, transact_to: TransactTo) -> Env {
    Env {
        cfg: CfgEnv {
            spec_id,
            ..Default::default()
        },
        block: Default::default(),
        tx: TxEnv {
            caller: CALLER,
            gas_limit: 1_000_000,
            gas_price: U256::ZERO,
            transact_to,
            data: Bytes::new(),
            ..Default::default()
        },
    }
}

fn install(db: &mut InMemoryDb, address: Address, balance: u64, code: Vec<u8>) {
    db.insert_account_info(
        address,
        AccountInfo::new(U256::from(balance), 1, Bytecode::new_raw(code.into())),
    );
}

/// Pushes the zero memory operands shared by the call opcodes, then the
/// target and a gas word.
fn push_call_tail(code: &mut Vec<u8>, with_value: bool, target: Address) {
    code.extend_from_slice(&[
        opcode::PUSH1,
        0, // retSize
        opcode::PUSH1,
        0, // retOffset
        opcode::PUSH1,
        0, // argsSize
        opcode::PUSH1,
        0, // argsOffset
    ]);
    if with_value {
        code.extend_from_slice(&[opcode::PUSH1, 0]);
    }
    code.push(opcode::PUSH20);
    code.extend_from_slice(target.as_slice());
    code.extend_from_slice(&[opcode::PUSH3, 0x01, 0x00, 0x00]);
}

#[test]
fn delegatecall_preserves_caller_value_and_storage_home() {
    // The delegate stores CALLER at slot 0 and CALLVALUE at slot 1.
    let delegate_code = vec![
        opcode::CALLER,
        opcode::PUSH1,
        0,
        opcode::SSTORE,
        opcode::CALLVALUE,
        opcode::PUSH1,
        1,
        opcode::SSTORE,
        opcode::STOP,
    ];
    let mut parent_code = Vec::new();
    push_call_tail(&mut parent_code, false, CHILD);
    parent_code.extend_from_slice(&[opcode::DELEGATECALL, opcode::POP, opcode::STOP]);

    let mut db = InMemoryDb::default();
    db.insert_account_info(CALLER, AccountInfo::from_balance(U256::from(1_000)));
    install(&mut db, PARENT, 0, parent_code);
    install(&mut db, CHILD, 0, delegate_code);

    let mut env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    env.tx.value = U256::from(123);
    let out = Evm::new(env, db).transact().unwrap();
    assert!(out.result.is_success(), "{:?}", out.result);

    // Writes landed in the parent's storage, with the parent's context.
    let parent = out.state.get(&PARENT).unwrap();
    assert_eq!(
        parent.storage.get(&U256::ZERO).unwrap().present_value,
        U256::from_be_bytes(CALLER.into_word().0)
    );
    assert_eq!(
        parent.storage.get(&U256::from(1)).unwrap().present_value,
        U256::from(123)
    );
    // The delegate's own storage is untouched.
    assert!(out
        .state
        .get(&CHILD)
        .map(|account| account.storage.is_empty())
        .unwrap_or(true));
}

#[test]
fn callcode_runs_foreign_code_against_own_storage() {
    let foreign_code = vec![
        opcode::PUSH1,
        0x77,
        opcode::PUSH1,
        0,
        opcode::SSTORE,
        opcode::STOP,
    ];
    let mut parent_code = Vec::new();
    push_call_tail(&mut parent_code, true, CHILD);
    parent_code.extend_from_slice(&[opcode::CALLCODE, opcode::POP, opcode::STOP]);

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, parent_code);
    install(&mut db, CHILD, 0, foreign_code);

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    assert!(out.result.is_success(), "{:?}", out.result);

    let parent = out.state.get(&PARENT).unwrap();
    assert_eq!(
        parent.storage.get(&U256::ZERO).unwrap().present_value,
        U256::from(0x77)
    );
    assert!(out
        .state
        .get(&CHILD)
        .map(|account| account.storage.is_empty())
        .unwrap_or(true));
}

#[test]
fn create_collision_pushes_zero() {
    // CREATE with empty init code; the derived address is occupied.
    let parent_code = vec![
        opcode::PUSH1,
        0, // size
        opcode::PUSH1,
        0, // offset
        opcode::PUSH1,
        0, // value
        opcode::CREATE,
        // Return the pushed address word so the test can see it.
        opcode::PUSH1,
        0,
        opcode::MSTORE,
        opcode::PUSH1,
        32,
        opcode::PUSH1,
        0,
        opcode::RETURN,
    ];

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, parent_code);
    // Parent nonce is 1, so the creation lands here.
    let occupied = PARENT.create(1);
    db.insert_account_info(
        occupied,
        AccountInfo {
            nonce: 7,
            ..Default::default()
        },
    );

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    let ExecutionResult::Success { output, .. } = out.result else {
        panic!("expected success, got {:?}", out.result);
    };
    assert_eq!(output.data().as_ref(), &[0u8; 32]);

    // The collision did not disturb the occupant, but the creator's nonce
    // still moved.
    assert_eq!(out.state.get(&occupied).unwrap().info.nonce, 7);
    assert_eq!(out.state.get(&PARENT).unwrap().info.nonce, 2);
}

#[test]
fn deployed_code_starting_with_ef_is_rejected_after_london() {
    // Init code returning a single 0xEF byte.
    let init = [
        opcode::PUSH1,
        0xEF,
        opcode::PUSH1,
        0,
        opcode::MSTORE8,
        opcode::PUSH1,
        1,
        opcode::PUSH1,
        0,
        opcode::RETURN,
    ];
    // Store the init code and CREATE it.
    let mut parent_code = vec![opcode::PUSH32];
    let mut word = [0u8; 32];
    word[..init.len()].copy_from_slice(&init);
    parent_code.extend_from_slice(&word);
    parent_code.extend_from_slice(&[
        opcode::PUSH1,
        0,
        opcode::MSTORE,
        opcode::PUSH1,
        init.len() as u8, // size
        opcode::PUSH1,
        0, // offset
        opcode::PUSH1,
        0, // value
        opcode::CREATE,
        opcode::PUSH1,
        0,
        opcode::MSTORE,
        opcode::PUSH1,
        32,
        opcode::PUSH1,
        0,
        opcode::RETURN,
    ]);

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, parent_code);

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    let ExecutionResult::Success { output, .. } = out.result else {
        panic!("expected success, got {:?}", out.result);
    };
    // The creation failed: the pushed address word is zero.
    assert_eq!(output.data().as_ref(), &[0u8; 32]);

    let created = PARENT.create(1);
    if let Some(account) = out.state.get(&created) {
        assert!(!account.is_created());
        assert_eq!(account.info.nonce, 0);
    }
}

#[test]
fn selfdestruct_of_a_preexisting_account_moves_balance_only_on_cancun() {
    let mut code = vec![opcode::PUSH20];
    code.extend_from_slice(CHILD.as_slice());
    code.push(opcode::SELFDESTRUCT);

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 500, code.clone());

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    assert!(out.result.is_success(), "{:?}", out.result);

    // EIP-6780: the account survives with its balance drained.
    let parent = out.state.get(&PARENT).unwrap();
    assert_eq!(parent.info.balance, U256::ZERO);
    assert_eq!(out.state.get(&CHILD).unwrap().info.balance, U256::from(500));

    // Before Cancun the account is removed outright.
    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 500, code);
    let env = env_with(SpecId::SHANGHAI, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    assert!(out.result.is_success(), "{:?}", out.result);
    assert!(!out.state.contains_key(&PARENT));
    assert_eq!(out.state.get(&CHILD).unwrap().info.balance, U256::from(500));
}

#[test]
fn second_sload_of_a_slot_is_warm() {
    let code = vec![
        opcode::PUSH1,
        5,
        opcode::SLOAD,
        opcode::POP,
        opcode::PUSH1,
        5,
        opcode::SLOAD,
        opcode::POP,
        opcode::STOP,
    ];
    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, code);

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    // Cold then warm: 2100 + 100, plus two pushes and two pops.
    assert_eq!(out.result.gas_used(), 21000 + (3 + 2100 + 2) + (3 + 100 + 2));
}

#[test]
fn access_list_pre_warms_the_slot() {
    let code = vec![
        opcode::PUSH1,
        5,
        opcode::SLOAD,
        opcode::POP,
        opcode::STOP,
    ];
    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, code);

    let mut env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    env.tx.access_list = vec![(PARENT, vec![U256::from(5)])];
    let out = Evm::new(env, db).transact().unwrap();
    // Intrinsic: 21000 + 2400 (address) + 1900 (key). The load itself is
    // warm.
    assert_eq!(out.result.gas_used(), 21000 + 2400 + 1900 + (3 + 100 + 2));
}

#[test]
fn logs_survive_success_and_die_with_reverts() {
    // Child emits a log, then reverts.
    let child_code = vec![
        opcode::PUSH1,
        0,
        opcode::PUSH1,
        0,
        opcode::LOG0,
        opcode::PUSH1,
        0,
        opcode::PUSH1,
        0,
        opcode::REVERT,
    ];
    // Parent emits a log, calls the child, stops.
    let mut parent_code = vec![
        opcode::PUSH1,
        0,
        opcode::PUSH1,
        0,
        opcode::LOG0,
    ];
    push_call_tail(&mut parent_code, true, CHILD);
    parent_code.extend_from_slice(&[opcode::CALL, opcode::POP, opcode::STOP]);

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 0, parent_code);
    install(&mut db, CHILD, 0, child_code);

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    let logs = out.result.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].address, PARENT);
}

#[test]
fn call_stipend_lets_the_callee_run_without_forwarded_gas() {
    // Parent calls the child with value and an explicit gas word of zero;
    // the 2300 stipend still lets the child STOP.
    let mut parent_code = vec![
        opcode::PUSH1,
        0, // retSize
        opcode::PUSH1,
        0, // retOffset
        opcode::PUSH1,
        0, // argsSize
        opcode::PUSH1,
        0, // argsOffset
        opcode::PUSH1,
        1, // value
        opcode::PUSH20,
    ];
    parent_code.extend_from_slice(CHILD.as_slice());
    parent_code.extend_from_slice(&[
        opcode::PUSH1,
        0, // zero gas forwarded
        opcode::CALL,
        // Return the success flag.
        opcode::PUSH1,
        0,
        opcode::MSTORE,
        opcode::PUSH1,
        32,
        opcode::PUSH1,
        0,
        opcode::RETURN,
    ]);

    let mut db = InMemoryDb::default();
    install(&mut db, PARENT, 10, parent_code);
    install(&mut db, CHILD, 0, vec![opcode::STOP]);

    let env = env_with(SpecId::CANCUN, TransactTo::Call(PARENT));
    let out = Evm::new(env, db).transact().unwrap();
    let ExecutionResult::Success { output, .. } = out.result else {
        panic!("expected success, got {:?}", out.result);
    };
    assert_eq!(output.data()[31], 1);
    assert_eq!(out.state.get(&CHILD).unwrap().info.balance, U256::from(1));
}
