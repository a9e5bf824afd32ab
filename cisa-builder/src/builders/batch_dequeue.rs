//! Pop one handle from every notified queue into a two-slot handle cache
//!
//! Cache entry layout: slot 0 at +0, slot 1 at +4, a 16-bit fill count at
//! `cnt_offset`. A new handle always lands in slot 0; the previous slot 0
//! moves to slot 1. When the cache was already full the handle pushed out
//! of slot 1 goes back to its pool.

use super::{build_with, narrow, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{AXI_USER_VA_MASK, GQM_CMD_POP, GQM_RET_CODE_SHIFT, HANDLE_VALID_BITS};
use crate::error::Result;
use crate::fragments::{error_exit, load_pa_window, pa_window, zero_extend};
use crate::layout::Layout;
use crate::ops::{add, addi, and, gqm, ldr, sh, sll, slli, srli, sw};
use crate::params::BatchDequeueParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

/// Handles a cache entry holds
const CACHE_SLOTS: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchDequeueLabel {
    Loop,
    NotFull,
    FreeEvicted,
    Next,
    PopError,
    HandleError,
    End,
}

impl ProgramBuilder for BatchDequeueParams {
    type Label = BatchDequeueLabel;
    const BEHAVIOR: Behavior = Behavior::BatchDequeue;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<BatchDequeueLabel>> {
        use BatchDequeueLabel::*;
        let stride = narrow("cache_stride", self.cache_stride, 12)?;
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R2, self.gqm_addr);
        l.load_imm64(R3, self.handle_cache_addr);
        l.load_imm64(R4, self.free_reg_addr);
        l.emit(addi(R7, R0, 0));

        // skip the queue unless its notify bit is set
        l.label(Loop);
        l.load_imm64(R1, AXI_USER_VA_MASK);
        l.load_imm64(R8, GQM_CMD_POP);
        l.load_imm64(R5, self.notify_read_addr);
        pa_window(&mut l, R1, |l| l.emit(ldr(R5, R5, 0)));
        zero_extend(&mut l, R5, 32);
        l.load_imm64(R6, self.queue_count);
        l.emit(addi(R10, R0, 1));
        l.emit(sll(R10, R10, R7));
        l.emit(and(R10, R10, R5));
        l.branch(R10, R0, BranchCond::Eq, Next, R9);

        l.load_imm64(R9, self.notify_clear_addr);
        pa_window(&mut l, R1, |l| l.emit(sw(R9, R10, 0)));

        // pop: status to r5, handle to r6
        l.emit(ldr(R10, R2, 0));
        l.emit(gqm(R5, R8, R10));
        l.load_imm64(R10, self.dfx_addr);
        l.emit(sw(R10, R5, 0));
        l.emit(slli(R5, R5, GQM_RET_CODE_SHIFT));
        l.branch(R0, R5, BranchCond::Ne, PopError, R9);
        l.emit(sw(R10, R6, 4));
        l.emit(srli(R9, R6, HANDLE_VALID_BITS));
        l.branch(R0, R9, BranchCond::Ne, HandleError, R5);

        // r5 = fill count of the entry at r10
        l.emit(addi(R10, R3, 0));
        l.load_imm64(R5, self.cnt_offset);
        l.emit(add(R5, R10, R5));
        l.emit(ldr(R5, R5, 0));
        zero_extend(&mut l, R5, 48);
        l.branch(R5, R0, BranchCond::Eq, NotFull, R1);

        // slot 0 -> slot 1, r8 = handle pushed out of slot 1
        l.emit(ldr(R1, R10, 0));
        zero_extend(&mut l, R1, 32);
        l.emit(addi(R9, R10, 4));
        l.emit(ldr(R8, R9, 0));
        zero_extend(&mut l, R8, 32);
        l.emit(sw(R9, R1, 0));
        l.emit(addi(R9, R0, CACHE_SLOTS));
        l.branch(R5, R9, BranchCond::Ne, NotFull, R1);
        l.emit(sw(R10, R6, 0));
        l.jump(FreeEvicted, R1);

        l.label(NotFull);
        l.load_imm64(R1, self.cnt_offset);
        l.emit(add(R1, R1, R10));
        l.emit(addi(R5, R5, 1));
        l.emit(sh(R1, R5, 0));
        l.emit(sw(R10, R6, 0));
        l.jump(Next, R9);

        l.label(FreeEvicted);
        l.emit(ldr(R5, R4, 0));
        load_pa_window(&mut l, R1, AXI_USER_VA_MASK, |l| l.emit(sw(R5, R8, 0)));

        l.label(Next);
        l.emit(addi(R2, R2, 8));
        l.emit(addi(R3, R3, stride));
        l.emit(addi(R4, R4, 8));
        l.emit(addi(R7, R7, 1));
        l.load_imm64(R6, self.queue_count);
        l.branch(R7, R6, BranchCond::Ltu, Loop, R1);
        l.jump(End, R9);

        l.label(PopError);
        error_exit(&mut l, DiagCode::GqmEmpty, R9);

        // hand the invalid handle back before reporting it
        l.label(HandleError);
        l.emit(ldr(R5, R4, 0));
        load_pa_window(&mut l, R1, AXI_USER_VA_MASK, |l| l.emit(sw(R5, R6, 0)));
        error_exit(&mut l, DiagCode::MbufInvalid, R9);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the batch dequeue program
pub fn build_batch_dequeue(params: &BatchDequeueParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
