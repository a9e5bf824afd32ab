//! Allocate output mbufs and copy the input private info into each

use super::{build_with, narrow, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{
    ALLOC_ERROR_MASK, HANDLE_BLOCK_ID_MASK, HANDLE_BLOCK_ID_SHIFT, HANDLE_POOL_BLOCK_MASK, PRIVATE_INFO_DWORDS,
};
use crate::error::Result;
use crate::fragments::{error_exit, zero_extend};
use crate::layout::Layout;
use crate::ops::{add, addi, and, ldr, mul, sd, slli, srli, sw};
use crate::params::PrepareOutParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrepareOutLabel {
    Alloc,
    Copy,
    AllocFail,
    End,
}

impl ProgramBuilder for PrepareOutParams {
    type Label = PrepareOutLabel;
    const BEHAVIOR: Behavior = Behavior::PrepareOut;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<PrepareOutLabel>> {
        use PrepareOutLabel::*;
        let count = narrow("output_queue_count", self.output_queue_count, 12)?;
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r1 = input private info = head block size * block id + head base
        l.load_imm64(R1, self.input_handle_addr);
        l.emit(ldr(R1, R1, 0));
        l.load_imm64(R2, HANDLE_BLOCK_ID_MASK);
        l.emit(and(R2, R1, R2));
        l.emit(srli(R2, R2, HANDLE_BLOCK_ID_SHIFT));
        l.load_imm64(R1, self.input_head_block_size_addr);
        l.emit(ldr(R1, R1, 0));
        zero_extend(&mut l, R1, 32);
        l.emit(mul(R1, R1, R2));
        l.load_imm64(R2, self.input_head_base_addr);
        l.emit(ldr(R2, R2, 0));
        l.emit(add(R1, R1, R2));

        // r2 = output index, r3 = output count
        l.emit(addi(R2, R0, 0));
        l.emit(addi(R3, R0, count));

        l.label(Alloc);
        l.load_imm64(R4, self.output_alloc_addr);
        l.emit(slli(R5, R2, 3));
        l.emit(add(R4, R4, R5));
        l.emit(ldr(R4, R4, 0));
        // reading the allocation register allocates
        l.emit(ldr(R4, R4, 0));
        l.load_imm64(R5, ALLOC_ERROR_MASK);
        l.emit(and(R5, R4, R5));
        l.load_imm64(R6, self.dfx_alloc_result_addr);
        l.emit(sw(R6, R5, 0));
        l.load_imm64(R6, self.dfx_alloc_pool_idx_addr);
        l.emit(sw(R6, R2, 0));
        l.branch(R5, R0, BranchCond::Ne, AllocFail, R6);

        l.load_imm64(R5, HANDLE_POOL_BLOCK_MASK);
        l.emit(and(R4, R4, R5));
        l.load_imm64(R5, self.output_handle_addr);
        l.emit(slli(R6, R2, 2));
        l.emit(add(R5, R5, R6));
        l.emit(sw(R5, R4, 0));

        // r4 = output private info = head block size[i] * block id + head base[i]
        l.load_imm64(R5, self.output_head_block_size_addr);
        l.emit(add(R5, R5, R6));
        l.emit(ldr(R5, R5, 0));
        zero_extend(&mut l, R5, 32);
        l.load_imm64(R7, self.output_head_base_addr);
        l.emit(add(R7, R7, R6));
        l.emit(ldr(R7, R7, 0));
        l.load_imm64(R8, HANDLE_BLOCK_ID_MASK);
        l.emit(and(R4, R4, R8));
        l.emit(srli(R4, R4, HANDLE_BLOCK_ID_SHIFT));
        l.emit(mul(R4, R4, R5));
        l.emit(add(R4, R4, R7));

        l.emit(addi(R5, R0, 0));
        l.emit(addi(R6, R0, PRIVATE_INFO_DWORDS));
        l.emit(add(R7, R0, R1));
        l.label(Copy);
        l.emit(ldr(R8, R7, 0));
        l.emit(sd(R4, R8, 0));
        l.emit(addi(R4, R4, 8));
        l.emit(addi(R7, R7, 8));
        l.emit(addi(R5, R5, 1));
        l.branch(R5, R6, BranchCond::Ltu, Copy, R8);

        l.emit(addi(R2, R2, 1));
        l.branch(R2, R3, BranchCond::Ltu, Alloc, R8);
        l.jump(End, R8);

        l.label(AllocFail);
        error_exit(&mut l, DiagCode::MbufAllocFail, R6);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the output preparation program
pub fn build_prepare_out(params: &PrepareOutParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
