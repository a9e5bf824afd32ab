//! Consume one completion queue entry and forward a handle

use super::{build_with, narrow, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{HANDLE_POOL_BLOCK_MASK, OW_STATUS_QUEUE_NOT_ENABLE};
use crate::error::{BuilderError, Result};
use crate::fragments::{error_exit, extract_status};
use crate::layout::Layout;
use crate::ops::{add, addi, and, andi, ldr, mul, sd, sw};
use crate::params::AdspcParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdspcLabel {
    Copy,
    Enqueue,
    CqEmpty,
    QueueNotEnable,
    End,
}

impl ProgramBuilder for AdspcParams {
    type Label = AdspcLabel;
    const BEHAVIOR: Behavior = Behavior::Adspc;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<AdspcLabel>> {
        use AdspcLabel::*;
        let mask = narrow("head_tail_mask", self.head_tail_mask, 12)?;
        let size = narrow("cqe_size", self.cqe_size, 12)?;
        if size == 0 || size % 8 != 0 {
            return Err(BuilderError::InvalidParameter {
                name: "cqe_size",
                value: self.cqe_size,
                reason: "entries are copied as whole double words",
            });
        }
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r2 = head, r3 = tail
        l.load_imm64(R1, self.cq_head_reg_addr);
        l.emit(ldr(R2, R1, 0));
        l.emit(andi(R2, R2, mask));
        l.load_imm64(R3, self.cq_tail_reg_addr);
        l.emit(ldr(R3, R3, 0));
        l.emit(andi(R3, R3, mask));
        l.load_imm64(R8, self.dfx_addr);
        l.emit(sw(R8, R2, 0));
        l.emit(sw(R8, R3, 4));
        l.branch(R2, R3, BranchCond::Eq, CqEmpty, R4);

        // r3 = entry address, copied 8 bytes at a time
        l.load_imm64(R3, self.cqe_base_addr);
        l.load_imm64(R4, self.cqe_size);
        l.emit(mul(R4, R2, R4));
        l.emit(add(R3, R3, R4));
        l.emit(addi(R4, R0, 0));
        l.emit(addi(R5, R0, size));
        l.load_imm64(R6, self.cqe_copy_addr);
        l.label(Copy);
        l.emit(ldr(R7, R3, 0));
        l.emit(sd(R6, R7, 0));
        l.emit(addi(R3, R3, 8));
        l.emit(addi(R6, R6, 8));
        l.emit(addi(R4, R4, 8));
        l.branch(R4, R5, BranchCond::Ltu, Copy, R7);

        l.emit(addi(R2, R2, 1));
        l.emit(andi(R2, R2, mask));
        l.emit(sd(R1, R2, 0));

        // forward the handle, handling the overwrite status of the queue
        l.load_imm64(R1, self.overwrite_reg_addr);
        l.emit(ldr(R1, R1, 0));
        l.emit(sw(R8, R1, 8));
        extract_status(&mut l, R2, R1);
        l.emit(addi(R3, R0, OW_STATUS_QUEUE_NOT_ENABLE));
        l.branch(R2, R3, BranchCond::Eq, QueueNotEnable, R4);
        l.branch(R0, R2, BranchCond::Ne, Enqueue, R7);

        l.load_imm64(R3, self.free_reg_addr);
        l.load_imm64(R4, HANDLE_POOL_BLOCK_MASK);
        l.emit(and(R4, R1, R4));
        l.emit(sw(R3, R4, 0));

        l.label(Enqueue);
        l.load_imm64(R5, self.handle);
        l.load_imm64(R6, self.enqueue_reg_addr);
        l.emit(sw(R6, R5, 0));
        l.jump(End, R7);

        l.label(CqEmpty);
        error_exit(&mut l, DiagCode::CqEmpty, R4);
        l.label(QueueNotEnable);
        error_exit(&mut l, DiagCode::QueueNotEnable, R4);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the completion queue consumer program
pub fn build_adspc(params: &AdspcParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
