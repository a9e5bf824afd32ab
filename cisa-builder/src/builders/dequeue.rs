//! Pop a handle from a queue manager queue

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{GQM_CMD_POP, GQM_RET_CODE_SHIFT, GQM_WAKE_UP, HANDLE_VALID_BITS};
use crate::error::Result;
use crate::fragments::error_exit;
use crate::layout::Layout;
use crate::ops::{gqm, ldr, slli, srli, sw};
use crate::params::{DequeueParams, GqmInitParams};
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DequeueLabel {
    GqmEmpty,
    MbufInvalid,
    End,
}

impl ProgramBuilder for DequeueParams {
    type Label = DequeueLabel;
    const BEHAVIOR: Behavior = Behavior::Dequeue;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<DequeueLabel>> {
        use DequeueLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R1, GQM_CMD_POP);
        l.load_imm64(R2, self.gqm_addr);
        l.load_imm64(R8, self.handle_addr);
        l.emit(ldr(R3, R2, 0));
        // status to r6, handle to r7
        l.emit(gqm(R6, R1, R3));

        l.load_imm64(R3, self.dfx_addr);
        l.emit(sw(R3, R6, 0));
        l.emit(slli(R6, R6, GQM_RET_CODE_SHIFT));
        l.branch(R0, R6, BranchCond::Ne, GqmEmpty, R5);

        l.emit(sw(R3, R7, 4));
        l.emit(srli(R9, R7, HANDLE_VALID_BITS));
        l.branch(R0, R9, BranchCond::Ne, MbufInvalid, R5);

        l.emit(sw(R8, R7, 0));
        l.jump(End, R5);

        l.label(GqmEmpty);
        error_exit(&mut l, DiagCode::GqmEmpty, R4);
        l.label(MbufInvalid);
        error_exit(&mut l, DiagCode::MbufInvalid, R4);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GqmInitLabel {
    GqmEmpty,
    End,
}

impl ProgramBuilder for GqmInitParams {
    type Label = GqmInitLabel;
    const BEHAVIOR: Behavior = Behavior::GqmInit;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<GqmInitLabel>> {
        use GqmInitLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R1, GQM_CMD_POP | GQM_WAKE_UP);
        l.load_imm64(R2, self.gqm_addr);
        l.emit(ldr(R3, R2, 0));
        l.emit(gqm(R6, R1, R3));

        l.load_imm64(R3, self.dfx_addr);
        l.emit(sw(R3, R6, 0));
        l.emit(slli(R6, R6, GQM_RET_CODE_SHIFT));
        l.branch(R0, R6, BranchCond::Ne, GqmEmpty, R5);
        l.jump(End, R5);

        l.label(GqmEmpty);
        error_exit(&mut l, DiagCode::GqmEmpty, R4);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the dequeue program
pub fn build_dequeue(params: &DequeueParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

/// Build the queue manager wake-up program
pub fn build_gqm_init(params: &GqmInitParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cisa_spec::encoding::{extract_opcode, extract_rd};

    #[test]
    fn test_dequeue_is_all_near() {
        let params = DequeueParams { gqm_addr: 0x10, handle_addr: 0x20, dfx_addr: 0x30 };
        let table = params.layout(&BuildContext::default()).unwrap().resolve().unwrap();
        assert_eq!(table.far_jumps(), 0);

        let mut program = Program::new();
        build_dequeue(&params, &mut program).unwrap();
        let gqm_word = program.words().iter().find(|w| extract_opcode(**w) == 0x7B).copied().unwrap();
        assert_eq!(extract_rd(gqm_word), 6);
    }

    #[test]
    fn test_gqm_init_sets_wake_up() {
        let mut program = Program::new();
        build_gqm_init(&GqmInitParams::default(), &mut program).unwrap();
        // r1 = POP | wake-up in the first LLWI extension word
        assert_eq!(program.words()[2], 0b100_0101);
    }
}
