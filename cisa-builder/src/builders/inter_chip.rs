//! Programs around a cross-chip SDMA transfer
//!
//! The pre-processing program allocates the destination mbuf on the peer
//! chip and fills the head and data descriptors. The post-processing
//! program enqueues the transferred handle on the peer and frees the
//! source. Every peer access runs under the inter-chip PA mask.

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{
    AXI_USER_INTER_CHIP_MASK, HANDLE_BLOCK_ID_MASK, HANDLE_BLOCK_ID_SHIFT, HANDLE_POOL_BLOCK_MASK,
    OW_STATUS_OW_NOT_ENABLE, OW_STATUS_QUEUE_NOT_ENABLE,
};
use crate::error::Result;
use crate::fragments::{error_exit, extract_status, load_pa_window, raw_error_exit, zero_extend};
use crate::layout::Layout;
use crate::ops::{add, addi, and, ldr, mul, sd, srli, sw};
use crate::params::{InterChipPostProcParams, InterChipPreProcParams};
use cisa_spec::Register::{self, *};
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

/// Bits of an allocated handle kept before it is published
const HANDLE_KEEP_SHIFT: u8 = 47;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterChipLabel {
    Enqueue,
    QueueNotEnable,
    OverwriteNotEnable,
    AllocError,
    End,
}

impl ProgramBuilder for InterChipPreProcParams {
    type Label = InterChipLabel;
    const BEHAVIOR: Behavior = Behavior::InterChipPreProc;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<InterChipLabel>> {
        use InterChipLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r1 = handle from the peer allocation register
        l.load_imm64(R1, self.dst_alloc_addr);
        l.emit(ldr(R1, R1, 0));
        load_pa_window(&mut l, R6, AXI_USER_INTER_CHIP_MASK, |l| l.emit(ldr(R1, R1, 0)));
        extract_status(&mut l, R2, R1);
        l.branch(R2, R0, BranchCond::Ne, AllocError, R7);

        zero_extend(&mut l, R1, HANDLE_KEEP_SHIFT);
        l.load_imm64(R2, self.dst_handle_addr);
        l.emit(sw(R2, R1, 0));
        l.load_imm64(R3, HANDLE_BLOCK_ID_MASK);
        l.emit(and(R4, R1, R3));
        l.emit(srli(R4, R4, HANDLE_BLOCK_ID_SHIFT));

        descriptor(&mut l, self.dst_head_base_addr, self.dst_head_block_size_addr, self.head_sdma_sqe_addr);
        descriptor(&mut l, self.dst_data_base_addr, self.dst_data_block_size_addr, self.data_sdma_sqe_addr);
        l.jump(End, R7);

        // the raw allocation status is the diagnostic
        l.label(AllocError);
        raw_error_exit(&mut l, R2);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// `*sqe = block_size * block_id + base`, block id in r4
fn descriptor(l: &mut Layout<InterChipLabel>, base_addr: u64, block_size_addr: u64, sqe_addr: u64) {
    l.load_imm64(R3, base_addr);
    l.emit(ldr(R3, R3, 0));
    l.load_imm64(R2, block_size_addr);
    l.emit(ldr(R2, R2, 0));
    zero_extend(l, R2, 32);
    l.emit(mul(R5, R2, R4));
    l.emit(add(R2, R5, R3));
    l.load_imm64(R6, sqe_addr);
    l.emit(sd(R6, R2, 0));
}

impl ProgramBuilder for InterChipPostProcParams {
    type Label = InterChipLabel;
    const BEHAVIOR: Behavior = Behavior::InterChipPostProc;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<InterChipLabel>> {
        use InterChipLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r5 = peer overwrite word, r1 = its status
        l.load_imm64(R5, self.dst_overwrite_addr);
        l.emit(ldr(R5, R5, 0));
        load_pa_window(&mut l, R4, AXI_USER_INTER_CHIP_MASK, |l| l.emit(ldr(R5, R5, 0)));
        extract_status(&mut l, R1, R5);
        l.emit(addi(R2, R0, OW_STATUS_QUEUE_NOT_ENABLE));
        l.emit(addi(R3, R0, OW_STATUS_OW_NOT_ENABLE));
        l.branch(R2, R1, BranchCond::Eq, QueueNotEnable, R6);
        l.branch(R3, R1, BranchCond::Eq, OverwriteNotEnable, R6);
        l.branch(R0, R1, BranchCond::Ne, Enqueue, R6);

        // free the handle the overwrite pushed out
        l.load_imm64(R2, self.dst_free_addr);
        l.emit(ldr(R2, R2, 0));
        l.load_imm64(R3, HANDLE_POOL_BLOCK_MASK);
        l.emit(and(R3, R5, R3));
        peer_store(&mut l, R2, R3);

        l.label(Enqueue);
        l.load_imm64(R1, self.dst_handle_addr);
        l.emit(ldr(R1, R1, 0));
        l.load_imm64(R2, self.dst_queue_addr);
        l.emit(ldr(R2, R2, 0));
        peer_store(&mut l, R2, R1);

        l.load_imm64(R3, self.src_handle_addr);
        l.emit(ldr(R3, R3, 0));
        l.load_imm64(R1, self.src_free_addr);
        l.emit(ldr(R1, R1, 0));
        peer_store(&mut l, R1, R3);
        l.jump(End, R6);

        l.label(QueueNotEnable);
        error_exit(&mut l, DiagCode::QueueNotEnable, R2);
        l.label(OverwriteNotEnable);
        error_exit(&mut l, DiagCode::OverwriteNotEnable, R3);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

fn peer_store(l: &mut Layout<InterChipLabel>, base: Register, value: Register) {
    load_pa_window(l, R4, AXI_USER_INTER_CHIP_MASK, |l| l.emit(sw(base, value, 0)));
}

/// Build the cross-chip pre-processing program
pub fn build_inter_chip_pre_proc(params: &InterChipPreProcParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

/// Build the cross-chip post-processing program
pub fn build_inter_chip_post_proc(params: &InterChipPostProcParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cisa_spec::encoding::{extract_csr, extract_funct3, extract_opcode, extract_rs1};

    #[test]
    fn test_pre_proc_error_reports_raw_status() {
        let params = InterChipPreProcParams {
            dst_alloc_addr: 0x1000,
            dst_handle_addr: 0x1008,
            dst_head_base_addr: 0x1010,
            dst_head_block_size_addr: 0x1018,
            dst_data_base_addr: 0x1020,
            dst_data_block_size_addr: 0x1028,
            head_sdma_sqe_addr: 0x1030,
            data_sdma_sqe_addr: 0x1038,
        };
        let mut program = Program::new();
        build_inter_chip_pre_proc(&params, &mut program).unwrap();
        let words = program.words();
        let err = words.iter().position(|w| *w == 0).unwrap();
        let status = words[err - 1];
        assert_eq!(extract_opcode(status), 0x73);
        assert_eq!(extract_csr(status), 0x801);
        assert_eq!(extract_rs1(status), 2);
    }

    #[test]
    fn test_post_proc_windows_use_inter_chip_mask() {
        let mut program = Program::new();
        build_inter_chip_post_proc(&InterChipPostProcParams::default(), &mut program).unwrap();
        let words = program.words();
        let clears: Vec<usize> = (0..words.len())
            .filter(|&i| extract_opcode(words[i]) == 0x73 && extract_csr(words[i]) == 0x800 && extract_funct3(words[i]) == 3)
            .collect();
        // overwrite read, free, enqueue, source free
        assert_eq!(clears.len(), 4);
        for i in clears {
            // mask pair right before every window
            assert_eq!(words[i - 1], 0x0000_0009);
        }
    }
}
