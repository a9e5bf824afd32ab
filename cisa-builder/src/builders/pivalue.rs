//! Add each pending increment to the producer index field of a pi value
//!
//! Only bits 47:32 of a pi value change; the sum wraps inside the field.

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{PI_FIELD_MASK, PI_INCREMENT_OFFSET};
use crate::error::Result;
use crate::layout::Layout;
use crate::ops::{add, addi, and, ldr, or, sd, slli};
use crate::params::PivalueModifyParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PivalueLabel {
    Loop,
    End,
}

impl ProgramBuilder for PivalueModifyParams {
    type Label = PivalueLabel;
    const BEHAVIOR: Behavior = Behavior::PivalueModify;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<PivalueLabel>> {
        use PivalueLabel::*;
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.emit(addi(R2, R0, 0));

        // r1 and r4 are reused as scratch in the body, reload them every pass
        l.label(Loop);
        l.load_imm64(R1, self.pi_value_array_addr);
        l.load_imm64(R4, self.pi_value_count);
        l.branch(R2, R4, BranchCond::Geu, End, R5);

        // r5 = address of the pi value, r3 = its current value
        l.emit(slli(R3, R2, 3));
        l.emit(add(R4, R1, R3));
        l.emit(ldr(R5, R4, 0));
        l.load_imm64(R4, self.dfx_addr);
        l.emit(add(R4, R4, R3));
        l.emit(ldr(R3, R5, 0));
        l.emit(sd(R4, R3, 0));

        // r4 = bits outside the field, r1 = the field
        l.load_imm64(R1, !PI_FIELD_MASK);
        l.emit(and(R4, R3, R1));
        l.load_imm64(R1, PI_FIELD_MASK);
        l.emit(and(R1, R3, R1));

        l.emit(ldr(R3, R5, PI_INCREMENT_OFFSET));
        l.emit(add(R3, R1, R3));
        l.load_imm64(R1, PI_FIELD_MASK);
        l.emit(and(R3, R3, R1));
        l.emit(or(R3, R3, R4));
        l.emit(sd(R5, R3, 0));

        l.emit(addi(R2, R2, 1));
        l.jump(Loop, R4);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the pi value update program
pub fn build_pivalue_modify(params: &PivalueModifyParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
