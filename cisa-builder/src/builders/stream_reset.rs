//! Disable a stream and move its head back to 0

use super::{build_with, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::AXI_USER_VA_MASK;
use crate::error::Result;
use crate::fragments::load_pa_window;
use crate::layout::Layout;
use crate::ops::{goto_i, sw};
use crate::params::StreamResetParams;
use cisa_spec::Register::*;
use cisa_spec::{Instruction, Program};

impl ProgramBuilder for StreamResetParams {
    type Label = ();
    const BEHAVIOR: Behavior = Behavior::StreamReset;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<()>> {
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R1, self.sq_enable_reg_addr);
        load_pa_window(&mut l, R2, AXI_USER_VA_MASK, |l| l.emit(sw(R1, R0, 0)));
        l.emit(goto_i(R3, self.sq_id, 0));

        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the stream reset program
pub fn build_stream_reset(params: &StreamResetParams, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
