//! Copy a block of double words when a flag is set, then clear the flag
//!
//! The copy is unrolled, so the program shape depends on the word count.

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::CONDITION_COPY_MAX;
use crate::error::{BuilderError, Result};
use crate::fragments::error_exit;
use crate::layout::Layout;
use crate::ops::{addi, ldr, sd};
use crate::params::ConditionCopyParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, DiagCode, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCopyLabel {
    InvalidCondition,
    End,
}

impl ProgramBuilder for ConditionCopyParams {
    type Label = ConditionCopyLabel;
    const BEHAVIOR: Behavior = Behavior::ConditionCopy;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<ConditionCopyLabel>> {
        use ConditionCopyLabel::*;
        if self.count > CONDITION_COPY_MAX {
            return Err(BuilderError::InvalidParameter {
                name: "count",
                value: self.count as u64,
                reason: "at most 511 double words",
            });
        }
        let mut l = ctx.layout(Self::BEHAVIOR);

        // flag 0: nothing to do, flag 1: copy, anything else is an error
        l.load_imm64(R1, self.condition_addr);
        l.emit(ldr(R2, R1, 0));
        l.branch(R2, R0, BranchCond::Eq, End, R6);
        l.emit(addi(R4, R0, 1));
        l.branch(R2, R4, BranchCond::Ne, InvalidCondition, R6);

        l.load_imm64(R4, self.src_addr);
        l.load_imm64(R6, self.dst_addr);
        for i in 0..self.count as u16 {
            l.emit(ldr(R5, R4, i * 8));
            l.emit(sd(R6, R5, i * 8));
        }
        l.emit(sd(R1, R0, 0));
        l.jump(End, R6);

        l.label(InvalidCondition);
        error_exit(&mut l, DiagCode::InvalidCondition, R7);

        l.label(End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the condition copy program
///
/// The slot table is fixed for a given `count`; addresses never change it.
pub fn build_condition_copy(params: &ConditionCopyParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
