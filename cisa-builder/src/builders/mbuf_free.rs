//! Return one mbuf handle to each pool

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::AXI_USER_VA_MASK;
use crate::error::Result;
use crate::fragments::pa_window;
use crate::layout::Layout;
use crate::ops::{addi, ldr, sw};
use crate::params::MbufFreeParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MbufFreeLabel {
    Loop,
}

impl ProgramBuilder for MbufFreeParams {
    type Label = MbufFreeLabel;
    const BEHAVIOR: Behavior = Behavior::MbufFree;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<MbufFreeLabel>> {
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r8 = PA mask, r6 = pool index
        l.load_imm64(R8, AXI_USER_VA_MASK);
        l.emit(addi(R6, R0, 0));
        l.load_imm64(R1, self.pool_register_addr);
        l.load_imm64(R2, self.handle_array_addr);
        l.load_imm64(R3, self.pool_index_max);

        l.label(MbufFreeLabel::Loop);
        l.emit(ldr(R4, R2, 0));
        pa_window(&mut l, R8, |l| l.emit(sw(R1, R4, 0)));
        l.emit(addi(R2, R2, 4));
        l.emit(addi(R1, R1, 8));
        l.emit(addi(R6, R6, 1));
        l.branch(R6, R3, BranchCond::Lt, MbufFreeLabel::Loop, R7);

        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the mbuf free program
pub fn build_mbuf_free(params: &MbufFreeParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cisa_spec::encoding::{extract_jump_offset, extract_opcode};

    #[test]
    fn test_mbuf_free_shape() {
        let params = MbufFreeParams {
            pool_register_addr: 0x2000,
            handle_array_addr: 0x3000,
            pool_index_max: 4,
        };
        let mut program = Program::new();
        build_mbuf_free(&params, &mut program).unwrap();

        let words = program.words();
        // 4 pairs (12) + addi + loop body (8) + nop
        assert_eq!(words.len(), 22);
        assert_eq!(program.name(), "mbuf_free");
        // loop bound in the extension word of r3's LLWI
        assert_eq!(words[12], 4);
        assert_eq!(extract_opcode(words[20]), 0x63);
        assert_eq!(extract_jump_offset(words[20]), -7);
        assert_eq!(words[21], 0x13);
    }
}
