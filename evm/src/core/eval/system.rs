use super::misc::copy_into_memory;
use super::Control;
use crate::core::prelude::*;
use crate::core::utils::{U256_ONE, U256_ZERO};
use crate::core::{ExitError, ExitFatal, ExitReason, ExitSucceed, Machine};
use crate::executor::{Executor, Message};
use crate::external::ExternalContext;
use crate::gasometer::{self, consts};
use core::cmp::min;
use primitive_types::{H160, H256, U256};

/// Flavour of a message call opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallScheme {
    /// Run the target's code on the target.
    Call,
    /// Run the target's code on the current account.
    CallCode,
    /// Like `CallCode`, also keeping the current sender and value.
    DelegateCall,
}

pub fn balance<E: ExternalContext>(
    machine: &mut Machine,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let address = H160::from(machine.stack.pop_h256()?);
    machine.record_cost(executor.config().gas_balance_supplemental)?;
    machine.stack.push(executor.context().balance(address))?;
    Ok(Control::Continue)
}

pub fn extcodesize<E: ExternalContext>(
    machine: &mut Machine,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let address = H160::from(machine.stack.pop_h256()?);
    machine.record_cost(executor.config().gas_ext_code_supplemental)?;
    let size = executor.context().code(address).len();
    machine.stack.push(U256::from(size))?;
    Ok(Control::Continue)
}

pub fn extcodecopy<E: ExternalContext>(
    machine: &mut Machine,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let address = H160::from(machine.stack.pop_h256()?);
    let memory_offset = machine.stack.pop()?;
    let code_offset = machine.stack.pop()?;
    let len = machine.stack.pop()?;
    machine.record_cost(executor.config().gas_ext_code_supplemental)?;

    let code = executor.context().code(address);
    copy_into_memory(machine, memory_offset, code_offset, len, &code)?;
    Ok(Control::Continue)
}

/// Only the 256 most recent ancestors are visible; anything else is zero.
pub fn blockhash<E: ExternalContext>(
    machine: &mut Machine,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let number = machine.stack.pop()?;
    let current = executor.context().block_number();

    let hash = if number < current && current - number <= U256::from(256) {
        executor.context().block_hash(number)
    } else {
        H256::zero()
    };
    machine.stack.push_h256(hash)?;
    Ok(Control::Continue)
}

pub fn sload<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let index = machine.stack.pop_h256()?;
    machine.record_cost(executor.config().gas_sload_supplemental)?;
    let value = executor.context().storage(msg.to, index);
    machine.stack.push_h256(value)?;
    Ok(Control::Continue)
}

pub fn sstore<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let index = machine.stack.pop_h256()?;
    let value = machine.stack.pop_h256()?;

    let current = executor.context().storage(msg.to, index);
    let (cost, refund) = gasometer::sstore_cost(current, value);
    machine.record_cost(cost)?;
    if refund > 0 {
        executor.context_mut().add_refund(refund);
    }
    executor.context_mut().set_storage(msg.to, index, value);
    Ok(Control::Continue)
}

pub fn log<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
    n: usize,
) -> Result<Control, ExitReason> {
    let offset = machine.stack.pop()?;
    let size = machine.stack.pop()?;
    let mut topics = Vec::with_capacity(n);
    for _ in 0..n {
        topics.push(machine.stack.pop_h256()?);
    }

    let data = machine.read_memory(offset, size)?;
    machine.record_cost(gasometer::log_gas(data.len())?)?;
    executor.context_mut().log(msg.to, topics, data);
    Ok(Control::Continue)
}

pub fn selfdestruct<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let beneficiary = H160::from(machine.stack.pop_h256()?);

    let mut cost = executor.config().gas_suicide_supplemental;
    if !executor.context().exists(beneficiary) {
        cost = cost.saturating_add(executor.config().gas_suicide_new_account);
    }
    machine.record_cost(cost)?;

    let context = executor.context_mut();
    let balance = context.balance(msg.to);
    let target_balance = context
        .balance(beneficiary)
        .checked_add(balance)
        .ok_or_else(|| ExitFatal::Other(Cow::from("balance overflow")))?;
    context.set_balance(beneficiary, target_balance);
    // Applied after the credit, so a self beneficiary burns the balance.
    context.set_balance(msg.to, U256_ZERO);
    context.mark_delete(msg.to);

    Ok(Control::Exit(ExitSucceed::Suicided.into()))
}

pub fn call<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
    scheme: CallScheme,
) -> Result<Control, ExitReason> {
    let requested = machine.stack.pop()?;
    let to = H160::from(machine.stack.pop_h256()?);
    let value = match scheme {
        CallScheme::Call | CallScheme::CallCode => machine.stack.pop()?,
        CallScheme::DelegateCall => U256_ZERO,
    };
    let in_offset = machine.stack.pop()?;
    let in_size = machine.stack.pop()?;
    let out_offset = machine.stack.pop()?;
    let out_size = machine.stack.pop()?;

    let input = machine.read_memory(in_offset, in_size)?;
    machine.grow_memory(out_offset, out_size)?;

    let config = executor.config();
    let mut extra = config.gas_call_supplemental;
    if !value.is_zero() {
        extra += consts::G_CALLVALUETRANSFER;
    }
    if scheme == CallScheme::Call && !executor.context().exists(to) {
        extra += consts::G_CALLNEWACCOUNT;
    }

    let gas = machine.gas();
    let forwarded = if config.call_l64_after_gas {
        if gas < extra {
            return Err(ExitError::OutOfGas.into());
        }
        let cap = gasometer::all_but_one_64th(gas - extra);
        if requested > U256::from(cap) {
            cap
        } else {
            requested.as_u64()
        }
    } else {
        if U256::from(gas) < requested.saturating_add(U256::from(extra)) {
            return Err(ExitError::OutOfGas.into());
        }
        requested.as_u64()
    };
    let stipend = if value.is_zero() {
        0
    } else {
        consts::G_STIPEND
    };

    if executor.context().balance(msg.to) < value || msg.depth >= config.call_stack_limit {
        machine.record_cost(extra - stipend)?;
        machine.stack.push(U256_ZERO)?;
        return Ok(Control::Continue);
    }
    machine.record_cost(forwarded + extra)?;

    let child = match scheme {
        CallScheme::Call => Message {
            sender: msg.to,
            to,
            code_address: to,
            value,
            gas: forwarded.saturating_add(stipend),
            data: input,
            depth: msg.depth + 1,
            is_create: false,
            transfers_value: true,
        },
        CallScheme::CallCode => Message {
            sender: msg.to,
            to: msg.to,
            code_address: to,
            value,
            gas: forwarded.saturating_add(stipend),
            data: input,
            depth: msg.depth + 1,
            is_create: false,
            transfers_value: true,
        },
        CallScheme::DelegateCall => Message {
            sender: msg.sender,
            to: msg.to,
            code_address: to,
            value: msg.value,
            gas: forwarded,
            data: input,
            depth: msg.depth + 1,
            is_create: false,
            transfers_value: false,
        },
    };

    let result = executor.apply_message(&child);
    if result.is_success() || result.is_revert() {
        machine.refund_gas(result.gas_left);
        let len = min(U256::from(result.output.len()), out_size);
        machine.write_memory(out_offset, &result.output, len)?;
    }
    let status = if result.is_success() {
        U256_ONE
    } else {
        U256_ZERO
    };
    machine.stack.push(status)?;
    Ok(Control::Continue)
}

pub fn create<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    let value = machine.stack.pop()?;
    let offset = machine.stack.pop()?;
    let size = machine.stack.pop()?;
    let init_code = machine.read_memory(offset, size)?;

    let config = executor.config();
    if executor.context().balance(msg.to) < value || msg.depth >= config.call_stack_limit {
        machine.stack.push(U256_ZERO)?;
        return Ok(Control::Continue);
    }

    let gas = if config.call_l64_after_gas {
        gasometer::all_but_one_64th(machine.gas())
    } else {
        machine.gas()
    };
    machine.record_cost(gas)?;

    let child = Message {
        sender: msg.to,
        to: H160::zero(),
        code_address: H160::zero(),
        value,
        gas,
        data: init_code,
        depth: msg.depth + 1,
        is_create: true,
        transfers_value: true,
    };

    let result = executor.create(child);
    if result.reason.is_succeed() || result.reason.is_revert() {
        machine.refund_gas(result.gas_left);
    }
    match result.address {
        Some(address) if result.reason.is_succeed() => {
            machine.stack.push_h256(address.into())?;
        }
        _ => machine.stack.push(U256_ZERO)?,
    }
    Ok(Control::Continue)
}
