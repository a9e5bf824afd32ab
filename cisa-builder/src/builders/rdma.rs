//! RDMA doorbell in two halves
//!
//! The first program computes the producer index into r1; the second,
//! queued right after it on the same stream, rings the doorbell with it.

use super::{build_with, narrow, BuildContext, ProgramBuilder};
use crate::behavior::Behavior;
use crate::device::{AXI_USER_VA_MASK, RDMA_PI_MASK, RDMA_PI_SHIFT};
use crate::error::{BuilderError, Result};
use crate::fragments::load_pa_window;
use crate::layout::Layout;
use crate::ops::{addi, and, ld_imm, or, sd, slli};
use crate::params::{RdmaSink1Params, RdmaSink2Params};
use cisa_spec::Register::*;
use cisa_spec::{Instruction, LoadImmWidth, Program};

/// Largest queue depth exponent that keeps the shift meaningful
const MAX_DEPTH_BITS: u8 = 16;

impl ProgramBuilder for RdmaSink1Params {
    type Label = ();
    const BEHAVIOR: Behavior = Behavior::RdmaSink1;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<()>> {
        let pi_init = narrow("pi_init", self.pi_init, 12)?;
        if self.sq_depth_bits > MAX_DEPTH_BITS {
            return Err(BuilderError::InvalidParameter {
                name: "sq_depth_bits",
                value: self.sq_depth_bits as u64,
                reason: "at most 16",
            });
        }
        let mut l = ctx.layout(Self::BEHAVIOR);

        // r1 = (((activations << depth_bits) + pi_init) & 0xFFFF) << 32
        l.emit(ld_imm(R1, self.svm_addr, LoadImmWidth::Lhu));
        l.emit(slli(R1, R1, self.sq_depth_bits));
        l.emit(addi(R1, R1, pi_init));
        l.load_imm64(R2, RDMA_PI_MASK);
        l.emit(and(R1, R1, R2));
        l.emit(slli(R1, R1, RDMA_PI_SHIFT));

        l.emit(Instruction::Nop);
        Ok(l)
    }
}

impl ProgramBuilder for RdmaSink2Params {
    type Label = ();
    const BEHAVIOR: Behavior = Behavior::RdmaSink2;

    fn layout(&self, ctx: &BuildContext) -> Result<Layout<()>> {
        let mut l = ctx.layout(Self::BEHAVIOR);

        l.load_imm64(R3, self.doorbell_info);
        l.emit(or(R3, R3, R1));
        l.load_imm64(R4, self.doorbell_addr);
        load_pa_window(&mut l, R5, AXI_USER_VA_MASK, |l| l.emit(sd(R4, R3, 0)));

        l.emit(Instruction::Nop);
        Ok(l)
    }
}

/// Build the producer index half of the RDMA doorbell
pub fn build_rdma_sink1(params: &RdmaSink1Params, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}

/// Build the doorbell half of the RDMA doorbell
pub fn build_rdma_sink2(params: &RdmaSink2Params, out: &mut Program) -> Result<()> {
    build_with(&BuildContext::default(), params, out)
}
