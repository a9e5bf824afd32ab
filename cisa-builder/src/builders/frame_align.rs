//! Re-run the own stream until a result flag is set

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::error::Result;
use crate::layout::Layout;
use crate::ops::{goto_i, ldr};
use crate::params::FrameAlignParams;
use cisa_spec::Register::*;
use cisa_spec::{BranchCond, Instruction, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameAlignLabel {
    End,
}

impl ProgramBuilder for FrameAlignParams {
    type Label = FrameAlignLabel;
    const BEHAVIOR: Behavior = Behavior::FrameAlign;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<FrameAlignLabel>> {
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R1, self.result_flag_addr);
        l.emit(ldr(R1, R1, 0));
        l.branch(R1, R0, BranchCond::Ne, FrameAlignLabel::End, R2);
        // not ready: restart this stream from its first word
        l.emit(goto_i(R2, self.sq_id, 0));

        l.label(FrameAlignLabel::End);
        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the frame align program
pub fn build_frame_align(params: &FrameAlignParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
