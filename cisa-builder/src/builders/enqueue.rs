//! Enqueue output handles, handling the overwrite status of each queue

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{
    AXI_USER_VA_MASK, HANDLE_POOL_BLOCK_MASK, OW_STATUS_OW_NOT_ENABLE, OW_STATUS_QUEUE_NOT_ENABLE,
};
use crate::error::Result;
use crate::fragments::{error_exit, extract_status, pa_window};
use crate::layout::Layout;
use crate::ops::{addi, and, ldr, slli, srli, sw};
use crate::params::EnqueueParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnqueueLabel {
    Loop,
    Enqueue,
    QueueNotEnable,
    OverwriteNotEnable,
    End,
}

impl ProgramBuilder for EnqueueParams {
    type Label = EnqueueLabel;
    const BEHAVIOR: Behavior = Behavior::Enqueue;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<EnqueueLabel>> {
        use EnqueueLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.emit(addi(R10, R0, 0));
        l.load_imm64(R1, self.overwrite_status_addr);
        l.load_imm64(R2, self.handle_array_addr);
        l.load_imm64(R3, self.enqueue_reg_addr);
        l.load_imm64(R9, self.free_reg_addr);
        l.load_imm64(R4, self.queue_count);

        l.label(Loop);
        l.emit(ldr(R5, R1, 0));
        l.emit(ldr(R5, R5, 0));
        extract_status(&mut l, R6, R5);
        l.emit(addi(R7, R0, OW_STATUS_QUEUE_NOT_ENABLE));
        l.branch(R7, R6, BranchCond::Eq, QueueNotEnable, R8);
        l.emit(addi(R8, R0, OW_STATUS_OW_NOT_ENABLE));
        l.branch(R8, R6, BranchCond::Eq, OverwriteNotEnable, R7);
        l.branch(R0, R6, BranchCond::Ne, Enqueue, R7);

        // status 0: the overwrite pushed a handle out, return it to its pool
        l.emit(ldr(R7, R9, 0));
        l.load_imm64(R8, HANDLE_POOL_BLOCK_MASK);
        l.emit(and(R8, R5, R8));
        l.load_imm64(R5, AXI_USER_VA_MASK);
        pa_window(&mut l, R5, |l| l.emit(sw(R7, R8, 0)));

        l.label(Enqueue);
        l.emit(ldr(R6, R2, 0));
        l.emit(slli(R5, R6, 32));
        l.emit(srli(R5, R5, 32));
        l.emit(ldr(R7, R3, 0));
        l.emit(sw(R7, R5, 0));

        l.emit(addi(R1, R1, 8));
        l.emit(addi(R2, R2, 4));
        l.emit(addi(R3, R3, 8));
        l.emit(addi(R9, R9, 8));
        l.emit(addi(R10, R10, 1));
        l.branch(R10, R4, BranchCond::Lt, Loop, R8);
        l.jump(End, R6);

        l.label(QueueNotEnable);
        error_exit(&mut l, DiagCode::QueueNotEnable, R7);
        l.label(OverwriteNotEnable);
        error_exit(&mut l, DiagCode::OverwriteNotEnable, R8);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the enqueue program
pub fn build_enqueue(params: &EnqueueParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_layout() {
        let params = EnqueueParams { queue_count: 3, ..Default::default() };
        let table = params.layout(&BuildContext::default()).unwrap().resolve().unwrap();

        // the loop-back and the jumps to the error exits are out of inline reach
        assert!(table.far_jumps() >= 2);
        let end = table.slot(EnqueueLabel::End).unwrap();
        assert_eq!(end + 1, table.len());
        assert!(table.slot(EnqueueLabel::QueueNotEnable).unwrap() < table.slot(EnqueueLabel::OverwriteNotEnable).unwrap());
    }
}
