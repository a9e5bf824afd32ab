//! Quiesce and re-activate every head stream of a model
//!
//! The program walks the head stream id array. For each stream it selects
//! the stream in the FSM select register and polls until the hardware
//! reports that stream idle, then looks the stream up in the register block
//! table. An enabled stream must be drained (head == tail) and is disabled;
//! either way its head goes back to 0, its activation counter is bumped and
//! it is activated again.
//!
//! Register use across the fragments:
//!
//! | reg | holds                                   |
//! |-----|-----------------------------------------|
//! | r2  | index into the head stream array        |
//! | r3  | current stream id                       |
//! | r4  | FSM state, then the stream register block |
//! | r1  | scratch, enable flag, head/tail xor     |
//! | r5  | scratch and relay register              |
//!
//! The fragment emitters are public so that other programs can reuse the
//! same sequences; they all expect the register state above.

use super::{build_with, narrow, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{
    AXI_USER_VA_MASK, SQ_ENABLE_SHIFT_LEFT, SQ_ENABLE_SHIFT_RIGHT, SQ_FSM_STATE_MASK, SQ_FSM_STATE_SHIFT,
    SQ_POINTER_SHIFT,
};
use crate::error::Result;
use crate::fragments::{error_exit, load_pa_window, zero_extend};
use crate::layout::Layout;
use crate::ops::{active_r, add, addi, andi, goto_r, ldr, sd, sh, slli, srli, sw, xor};
use crate::params::ModelExecuteParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelExecuteLabel {
    Scan,
    FsmPoll,
    GotoHead,
    AddrInvalid,
    NotDrained,
    FsmBusy,
    End,
}

use ModelExecuteLabel::*;

/// Stream register offsets checked against the 12-bit load and store fields
struct Offsets {
    head: u16,
    tail: u16,
    enable: u16,
}

impl Offsets {
    fn new(params: &ModelExecuteParams) -> Result<Self> {
        Ok(Self {
            head: narrow("sq_head_offset", params.sq_head_offset as u64, 12)?,
            tail: narrow("sq_tail_offset", params.sq_tail_offset as u64, 12)?,
            enable: narrow("sq_enable_offset", params.sq_enable_offset as u64, 12)?,
        })
    }
}

/// Reset the index, then load the next stream id into r3 or finish
pub fn emit_scan(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) {
    l.emit(addi(R2, R0, 0));

    l.label(Scan);
    l.load_imm64(R1, params.head_sq_array_addr);
    l.load_imm64(R4, params.head_sq_count);
    l.branch(R2, R4, BranchCond::Geu, End, R5);
    l.emit(slli(R3, R2, 3));
    l.emit(add(R4, R1, R3));
    l.emit(ldr(R3, R4, 0));
}

/// Select stream r3 and wait until the hardware reports it idle
///
/// Polls until the select register echoes r3 and the state bits read idle,
/// leaving the state in r4. The branch to `FsmBusy` after the poll only
/// guards the exit condition and is not taken on a stream that goes idle.
pub fn emit_check_fsm(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) {
    let config = *l.config();

    l.label(FsmPoll);
    l.load_imm64(R4, params.sq_fsm_sel_addr);
    load_pa_window(l, R1, AXI_USER_VA_MASK, |l| {
        l.emit(sw(R4, R3, 0));
        l.emit(ldr(R4, R4, 0));
    });

    // wait for the select register to echo the stream id
    l.emit(addi(R1, R4, 0));
    l.emit(andi(R1, R1, config.rtsq_id_mask));
    l.emit(xor(R1, R1, R3));
    l.loop_to(R1, config.fsm_poll_delay, FsmPoll, R5);

    // then for the state bits to clear
    l.emit(srli(R4, R4, SQ_FSM_STATE_SHIFT));
    l.emit(andi(R4, R4, SQ_FSM_STATE_MASK));
    l.loop_to(R4, config.fsm_poll_delay, FsmPoll, R1);
    l.branch(R4, R0, BranchCond::Ne, FsmBusy, R1);
}

/// Look up the register block of stream r3 into r4
///
/// A missing block is an error; a disabled stream skips straight to the
/// head reset.
pub fn emit_check_disable(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) -> Result<()> {
    let offsets = Offsets::new(params)?;

    l.emit(slli(R5, R3, 3));
    l.load_imm64(R4, params.sq_virtual_addr_table);
    l.emit(add(R4, R4, R5));
    l.emit(ldr(R4, R4, 0));
    l.branch(R4, R0, BranchCond::Eq, AddrInvalid, R5);

    l.emit(ldr(R1, R4, offsets.head));
    l.emit(slli(R1, R1, SQ_ENABLE_SHIFT_LEFT));
    l.emit(srli(R1, R1, SQ_ENABLE_SHIFT_RIGHT));
    l.branch(R1, R0, BranchCond::Eq, GotoHead, R5);
    Ok(())
}

/// Require head == tail on the enabled stream at r4
pub fn emit_check_head_tail(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) -> Result<()> {
    let offsets = Offsets::new(params)?;

    l.emit(ldr(R5, R4, offsets.head));
    zero_extend(l, R5, SQ_POINTER_SHIFT);
    l.emit(ldr(R1, R4, offsets.tail));
    zero_extend(l, R1, SQ_POINTER_SHIFT);
    l.emit(xor(R1, R1, R5));
    l.branch(R1, R0, BranchCond::Ne, NotDrained, R5);
    Ok(())
}

/// Disable the stream, then move its head back to 0
pub fn emit_deactivate(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) -> Result<()> {
    let offsets = Offsets::new(params)?;

    l.emit(sw(R4, R0, offsets.enable));
    l.label(GotoHead);
    l.emit(goto_r(R4, R3));
    Ok(())
}

/// Bump the activation counter of the stream, activate it and scan on
pub fn emit_active_sq(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) {
    l.emit(slli(R5, R2, 3));
    l.emit(addi(R2, R2, 1));
    l.load_imm64(R4, params.stream_svm_array_addr);
    l.emit(add(R5, R4, R5));
    l.emit(ldr(R4, R5, 0));
    l.emit(ldr(R5, R4, 0));
    l.emit(addi(R5, R5, 1));
    l.emit(sh(R4, R5, 0));
    l.emit(active_r(R5, R3));
    l.jump(Scan, R4);
}

/// Error exits and the terminal Nop
pub fn emit_exits(l: &mut Layout<ModelExecuteLabel>, params: &ModelExecuteParams) {
    l.label(AddrInvalid);
    l.load_imm64(R5, params.dfx_addr);
    l.emit(sd(R5, R4, 0));
    error_exit(l, DiagCode::SqAddrInvalid, R5);

    l.label(NotDrained);
    l.load_imm64(R5, params.dfx_addr);
    l.emit(sw(R5, R1, 8));
    error_exit(l, DiagCode::SqNotDrained, R5);

    l.label(FsmBusy);
    error_exit(l, DiagCode::SqFsmBusy, R1);

    l.label(End);
    l.emit(Instruction::Nop);
}

impl ProgramBuilder for ModelExecuteParams {
    type Label = ModelExecuteLabel;
    const BEHAVIOR: Behavior = Behavior::ModelExecute;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<ModelExecuteLabel>> {
        let mut l = ctx.layout(Self::BEHAVIOR);

        emit_scan(&mut l, self);
        emit_check_fsm(&mut l, self);
        emit_check_disable(&mut l, self)?;
        emit_check_head_tail(&mut l, self)?;
        emit_deactivate(&mut l, self)?;
        emit_active_sq(&mut l, self);
        emit_exits(&mut l, self);
        Ok(l)
    }
}

/// Build the model execute program
pub fn build_model_execute(params: &ModelExecuteParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
