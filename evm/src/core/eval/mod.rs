//! Chunk dispatch loop and opcode semantics.

mod arithmetic;
mod bitwise;
mod misc;
mod system;

use super::{ExitError, ExitReason, ExitSucceed, Instruction, Machine, Opcode};
use crate::executor::{Executor, Message};
use crate::external::ExternalContext;
use log::trace;
use primitive_types::{H256, U256};

/// What the loop does after an instruction.
pub enum Control {
    Continue,
    /// Continue at the chunk starting at this offset.
    Jump(usize),
    Exit(ExitReason),
}

/// Run `machine` until it halts.
///
/// Each chunk is validated before any of its instructions run: it must
/// start at the program counter, its static fee must be affordable and the
/// stack height must stay within its bounds. The static fee is then charged
/// in one go and only dynamic costs are charged per instruction.
pub fn run<E: ExternalContext>(
    machine: &mut Machine,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> ExitReason {
    let chunks = machine.chunks();

    loop {
        let Some(chunk) = chunks.get(machine.pc()) else {
            return ExitError::InvalidStartPoint.into();
        };
        let height = machine.stack.len();
        trace!(
            target: "evm::machine",
            "chunk {} gas {}/{} stack {}",
            machine.pc(),
            chunk.gas,
            machine.gas(),
            height
        );

        if machine.gas() < chunk.gas {
            return ExitError::OutOfGas.into();
        }
        if chunk.underflows(height) {
            return ExitError::StackUnderflow.into();
        }
        if chunk.overflows(height) {
            return ExitError::StackOverflow.into();
        }
        if let Err(e) = machine.record_cost(chunk.gas) {
            return e.into();
        }
        machine.set_pc(chunk.end);

        for instruction in &chunk.instructions {
            #[cfg(feature = "force-debug")]
            trace!(
                target: "evm::machine",
                "{} at {} gas {} stack {:?}",
                instruction.opcode,
                instruction.position,
                machine.gas(),
                machine.stack.data()
            );

            match eval(machine, instruction, msg, executor) {
                Ok(Control::Continue) => {}
                Ok(Control::Jump(dest)) => {
                    machine.set_pc(dest);
                    break;
                }
                Ok(Control::Exit(reason)) | Err(reason) => return reason,
            }
        }
    }
}

#[inline]
fn op1(machine: &mut Machine, f: fn(U256) -> U256) -> Result<Control, ExitReason> {
    let op1 = machine.stack.pop()?;
    machine.stack.push(f(op1))?;
    Ok(Control::Continue)
}

#[inline]
fn op2(machine: &mut Machine, f: fn(U256, U256) -> U256) -> Result<Control, ExitReason> {
    let op1 = machine.stack.pop()?;
    let op2 = machine.stack.pop()?;
    machine.stack.push(f(op1, op2))?;
    Ok(Control::Continue)
}

#[inline]
fn op3(machine: &mut Machine, f: fn(U256, U256, U256) -> U256) -> Result<Control, ExitReason> {
    let op1 = machine.stack.pop()?;
    let op2 = machine.stack.pop()?;
    let op3 = machine.stack.pop()?;
    machine.stack.push(f(op1, op2, op3))?;
    Ok(Control::Continue)
}

#[inline]
fn push(machine: &mut Machine, value: U256) -> Result<Control, ExitReason> {
    machine.stack.push(value)?;
    Ok(Control::Continue)
}

#[inline]
fn push_h256(machine: &mut Machine, value: H256) -> Result<Control, ExitReason> {
    machine.stack.push_h256(value)?;
    Ok(Control::Continue)
}

fn eval<E: ExternalContext>(
    machine: &mut Machine,
    instruction: &Instruction,
    msg: &Message,
    executor: &mut Executor<'_, '_, E>,
) -> Result<Control, ExitReason> {
    match instruction.opcode {
        Opcode::Stop => Ok(Control::Exit(ExitSucceed::Stopped.into())),
        Opcode::Add => op2(machine, |a, b| a.overflowing_add(b).0),
        Opcode::Mul => op2(machine, |a, b| a.overflowing_mul(b).0),
        Opcode::Sub => op2(machine, |a, b| a.overflowing_sub(b).0),
        Opcode::Div => op2(machine, arithmetic::div),
        Opcode::SDiv => op2(machine, arithmetic::sdiv),
        Opcode::Mod => op2(machine, arithmetic::rem),
        Opcode::SMod => op2(machine, arithmetic::srem),
        Opcode::AddMod => op3(machine, arithmetic::addmod),
        Opcode::MulMod => op3(machine, arithmetic::mulmod),
        Opcode::Exp => misc::exp(machine),
        Opcode::SignExtend => op2(machine, arithmetic::signextend),

        Opcode::Lt => op2(machine, bitwise::lt),
        Opcode::Gt => op2(machine, bitwise::gt),
        Opcode::SLt => op2(machine, bitwise::slt),
        Opcode::SGt => op2(machine, bitwise::sgt),
        Opcode::Eq => op2(machine, bitwise::eq),
        Opcode::IsZero => op1(machine, bitwise::iszero),
        Opcode::And => op2(machine, |a, b| a & b),
        Opcode::Or => op2(machine, |a, b| a | b),
        Opcode::Xor => op2(machine, |a, b| a ^ b),
        Opcode::Not => op1(machine, bitwise::not),
        Opcode::Byte => op2(machine, bitwise::byte),

        Opcode::Sha3 => misc::sha3(machine),

        Opcode::Address => push_h256(machine, msg.to.into()),
        Opcode::Balance => system::balance(machine, executor),
        Opcode::Origin => push_h256(machine, executor.context().origin().into()),
        Opcode::Caller => push_h256(machine, msg.sender.into()),
        Opcode::CallValue => push(machine, msg.value),
        Opcode::CallDataLoad => misc::calldataload(machine, &msg.data),
        Opcode::CallDataSize => push(machine, U256::from(msg.data.len())),
        Opcode::CallDataCopy => misc::calldatacopy(machine, &msg.data),
        Opcode::CodeSize => {
            let size = U256::from(machine.code.len());
            push(machine, size)
        }
        Opcode::CodeCopy => misc::codecopy(machine),
        Opcode::GasPrice => push(machine, executor.context().gas_price()),
        Opcode::ExtCodeSize => system::extcodesize(machine, executor),
        Opcode::ExtCodeCopy => system::extcodecopy(machine, executor),

        Opcode::BlockHash => system::blockhash(machine, executor),
        Opcode::Coinbase => push_h256(machine, executor.context().block_coinbase().into()),
        Opcode::Timestamp => push(machine, executor.context().block_timestamp()),
        Opcode::Number => push(machine, executor.context().block_number()),
        Opcode::Difficulty => push(machine, executor.context().block_difficulty()),
        Opcode::GasLimit => push(machine, executor.context().block_gas_limit()),

        Opcode::Pop => {
            machine.stack.pop()?;
            Ok(Control::Continue)
        }
        Opcode::MLoad => misc::mload(machine),
        Opcode::MStore => misc::mstore(machine),
        Opcode::MStore8 => misc::mstore8(machine),
        Opcode::SLoad => system::sload(machine, msg, executor),
        Opcode::SStore => system::sstore(machine, msg, executor),
        Opcode::Jump => misc::jump(machine),
        Opcode::JumpI => misc::jumpi(machine),
        Opcode::PC => push(machine, U256::from(instruction.position)),
        Opcode::MSize => {
            let size = U256::from(machine.memory.len());
            push(machine, size)
        }
        Opcode::Gas => {
            let gas = U256::from(machine.gas());
            push(machine, gas)
        }
        Opcode::JumpDest => Ok(Control::Continue),

        Opcode::Push(_) => push(machine, instruction.immediate),
        Opcode::Dup(n) => {
            machine.stack.dup(usize::from(n))?;
            Ok(Control::Continue)
        }
        Opcode::Swap(n) => {
            machine.stack.swap(usize::from(n))?;
            Ok(Control::Continue)
        }
        Opcode::Log(n) => system::log(machine, msg, executor, usize::from(n)),

        Opcode::Create => system::create(machine, msg, executor),
        Opcode::Call => system::call(machine, msg, executor, system::CallScheme::Call),
        Opcode::CallCode => system::call(machine, msg, executor, system::CallScheme::CallCode),
        Opcode::Return => misc::ret(machine),
        Opcode::DelegateCall if executor.config().has_delegate_call => {
            system::call(machine, msg, executor, system::CallScheme::DelegateCall)
        }
        Opcode::Revert if executor.config().has_revert => misc::revert(machine),
        Opcode::DelegateCall | Opcode::Revert => {
            Err(ExitError::OpcodeInactive(instruction.opcode).into())
        }
        Opcode::Invalid(_) => Err(ExitError::InvalidCode(instruction.opcode).into()),
        Opcode::SelfDestruct => system::selfdestruct(machine, msg, executor),
    }
}
