use super::Control;
use crate::core::prelude::*;
use crate::core::utils::USIZE_MAX;
use crate::core::{ExitError, ExitReason, ExitRevert, ExitSucceed, Machine};
use crate::gasometer;
use primitive_types::{H256, U256};
use sha3::{Digest, Keccak256};

pub fn exp(machine: &mut Machine) -> Result<Control, ExitReason> {
    let base = machine.stack.pop()?;
    let power = machine.stack.pop()?;
    machine.record_cost(gasometer::exp_gas(power))?;
    machine.stack.push(super::arithmetic::exp(base, power))?;
    Ok(Control::Continue)
}

pub fn sha3(machine: &mut Machine) -> Result<Control, ExitReason> {
    let offset = machine.stack.pop()?;
    let size = machine.stack.pop()?;
    let data = machine.read_memory(offset, size)?;
    machine.record_cost(gasometer::sha3_gas(data.len())?)?;

    let ret = Keccak256::digest(data.as_slice());
    machine.stack.push_h256(H256::from_slice(ret.as_slice()))?;
    Ok(Control::Continue)
}

/// Word of `data` at the popped offset, zero padded past its end.
pub fn calldataload(machine: &mut Machine, data: &[u8]) -> Result<Control, ExitReason> {
    let index = machine.stack.pop()?;

    let mut load = [0u8; 32];
    if index <= USIZE_MAX {
        let index = index.as_usize();
        for (i, byte) in load.iter_mut().enumerate() {
            if let Some(value) = index.checked_add(i).and_then(|p| data.get(p)) {
                *byte = *value;
            }
        }
    }

    machine.stack.push_h256(H256(load))?;
    Ok(Control::Continue)
}

pub fn calldatacopy(machine: &mut Machine, data: &[u8]) -> Result<Control, ExitReason> {
    let memory_offset = machine.stack.pop()?;
    let data_offset = machine.stack.pop()?;
    let len = machine.stack.pop()?;
    copy_into_memory(machine, memory_offset, data_offset, len, data)?;
    Ok(Control::Continue)
}

pub fn codecopy(machine: &mut Machine) -> Result<Control, ExitReason> {
    let memory_offset = machine.stack.pop()?;
    let code_offset = machine.stack.pop()?;
    let len = machine.stack.pop()?;
    let code = Rc::clone(&machine.code);
    copy_into_memory(machine, memory_offset, code_offset, len, &code)?;
    Ok(Control::Continue)
}

/// Shared tail of the `*COPY` opcodes: grow memory, charge per copied
/// word, then copy with zero padding.
pub fn copy_into_memory(
    machine: &mut Machine,
    memory_offset: U256,
    data_offset: U256,
    len: U256,
    data: &[u8],
) -> Result<(), ExitError> {
    machine.grow_memory(memory_offset, len)?;
    if len.is_zero() {
        return Ok(());
    }
    let len = len.as_usize();
    machine.record_cost(gasometer::copy_gas(len)?)?;
    machine
        .memory
        .copy_data(memory_offset.as_usize(), data_offset, len, data)
}

pub fn mload(machine: &mut Machine) -> Result<Control, ExitReason> {
    let index = machine.stack.pop()?;
    machine.grow_memory(index, U256::from(32))?;
    let value = machine.memory.get_h256(index.as_usize());
    machine.stack.push_h256(value)?;
    Ok(Control::Continue)
}

pub fn mstore(machine: &mut Machine) -> Result<Control, ExitReason> {
    let index = machine.stack.pop()?;
    let value = machine.stack.pop_h256()?;
    machine.write_memory(index, value.as_bytes(), U256::from(32))?;
    Ok(Control::Continue)
}

pub fn mstore8(machine: &mut Machine) -> Result<Control, ExitReason> {
    let index = machine.stack.pop()?;
    let value = machine.stack.pop()?;
    machine.write_memory(index, &[value.byte(0)], U256::from(1))?;
    Ok(Control::Continue)
}

fn jump_destination(machine: &Machine, dest: U256) -> Result<usize, ExitError> {
    if dest > USIZE_MAX {
        return Err(ExitError::InvalidJump);
    }
    let dest = dest.as_usize();
    if machine.chunks.is_jump_destination(dest) {
        Ok(dest)
    } else {
        Err(ExitError::InvalidJump)
    }
}

pub fn jump(machine: &mut Machine) -> Result<Control, ExitReason> {
    let dest = machine.stack.pop()?;
    Ok(Control::Jump(jump_destination(machine, dest)?))
}

pub fn jumpi(machine: &mut Machine) -> Result<Control, ExitReason> {
    let dest = machine.stack.pop()?;
    let value = machine.stack.pop()?;

    if value.is_zero() {
        Ok(Control::Continue)
    } else {
        Ok(Control::Jump(jump_destination(machine, dest)?))
    }
}

pub fn ret(machine: &mut Machine) -> Result<Control, ExitReason> {
    let offset = machine.stack.pop()?;
    let size = machine.stack.pop()?;
    let output = machine.read_memory(offset, size)?;
    machine.set_output(output);
    Ok(Control::Exit(ExitSucceed::Returned.into()))
}

pub fn revert(machine: &mut Machine) -> Result<Control, ExitReason> {
    let offset = machine.stack.pop()?;
    let size = machine.stack.pop()?;
    let output = machine.read_memory(offset, size)?;
    machine.set_output(output);
    Ok(Control::Exit(ExitRevert::Reverted.into()))
}
