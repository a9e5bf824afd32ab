//! Patch data buffer addresses into descriptors without copying data

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{HANDLE_BLOCK_ID_MASK, HANDLE_BLOCK_ID_SHIFT};
use crate::error::Result;
use crate::fragments::zero_extend;
use crate::layout::Layout;
use crate::ops::{add, addi, and, ldr, mul, slli, srli, sw};
use crate::params::ZeroCopyParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZeroCopyLabel {
    Body,
    Cond,
}

impl ProgramBuilder for ZeroCopyParams {
    type Label = ZeroCopyLabel;
    const BEHAVIOR: Behavior = Behavior::ZeroCopy;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<ZeroCopyLabel>> {
        use ZeroCopyLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r1 = data base = block size * block id + pool base
        l.load_imm64(R1, self.block_size_addr);
        l.emit(ldr(R1, R1, 0));
        zero_extend(&mut l, R1, 32);
        l.load_imm64(R2, self.handle_addr);
        l.emit(ldr(R2, R2, 0));
        zero_extend(&mut l, R2, 32);
        l.load_imm64(R3, HANDLE_BLOCK_ID_MASK);
        l.emit(and(R4, R2, R3));
        l.emit(srli(R4, R4, HANDLE_BLOCK_ID_SHIFT));
        l.emit(mul(R3, R1, R4));
        l.load_imm64(R4, self.pool_base_addr);
        l.emit(ldr(R4, R4, 0));
        l.emit(add(R1, R3, R4));

        l.load_imm64(R5, self.count);
        l.emit(add(R6, R0, R0));
        l.jump(Cond, R7);

        l.label(Body);
        l.emit(slli(R8, R6, 3));
        l.load_imm64(R2, self.offset_addr);
        l.emit(add(R2, R2, R8));
        l.emit(ldr(R2, R2, 0));
        l.load_imm64(R3, self.dest_addr);
        l.emit(add(R3, R3, R8));
        l.emit(ldr(R3, R3, 0));
        l.emit(add(R4, R2, R1));

        // the device reads the two halves in the order it expects them
        let (first, second) = if self.is_low_first { (0, 4) } else { (4, 0) };
        l.emit(sw(R3, R4, first));
        l.emit(srli(R4, R4, 32));
        l.emit(sw(R3, R4, second));
        l.emit(addi(R6, R6, 1));

        l.label(Cond);
        l.branch(R6, R5, BranchCond::Ltu, Body, R7);

        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the zero copy program
pub fn build_zero_copy(params: &ZeroCopyParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RELAY_WORDS;

    #[test]
    fn test_loop_is_top_tested() {
        let params = ZeroCopyParams { count: 0, ..Default::default() };
        let table = params.layout(&BuildContext::default()).unwrap().resolve().unwrap();
        let body = table.slot(ZeroCopyLabel::Body).unwrap();
        let cond = table.slot(ZeroCopyLabel::Cond).unwrap();
        assert!(body < cond);
        // the body is longer than the inline reach both ways
        assert_eq!(table.far_jumps(), 2);
        assert_eq!(cond + RELAY_WORDS + 2, table.len());
    }
}
