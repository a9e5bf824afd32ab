//! Program builders, one module per program kind
//!
//! Every parameter struct implements [`ProgramBuilder`]. The `build_*`
//! functions build with the default [`IsaConfig`]; [`build_with`] takes an
//! explicit [`BuildContext`].

mod adspc;
mod batch_dequeue;
mod condition_copy;
mod dequeue;
mod enqueue;
mod frame_align;
mod inter_chip;
mod mbuf_free;
pub mod model_execute;
mod pivalue;
mod prepare_out;
mod rdma;
mod stream_reset;
mod zero_copy;

pub use adspc::{build_adspc, AdspcLabel};
pub use batch_dequeue::{build_batch_dequeue, BatchDequeueLabel};
pub use condition_copy::{build_condition_copy, ConditionCopyLabel};
pub use dequeue::{build_dequeue, build_gqm_init, DequeueLabel, GqmInitLabel};
pub use enqueue::{build_enqueue, EnqueueLabel};
pub use frame_align::{build_frame_align, FrameAlignLabel};
pub use inter_chip::{build_inter_chip_post_proc, build_inter_chip_pre_proc, InterChipLabel};
pub use mbuf_free::{build_mbuf_free, MbufFreeLabel};
pub use model_execute::{build_model_execute, ModelExecuteLabel};
pub use pivalue::{build_pivalue_modify, PivalueLabel};
pub use prepare_out::{build_prepare_out, PrepareOutLabel};
pub use rdma::{build_rdma_sink1, build_rdma_sink2};
pub use stream_reset::build_stream_reset;
pub use zero_copy::{build_zero_copy, ZeroCopyLabel};

use crate::behavior::Behavior;
use crate::error::{BuilderError, Result};
use crate::layout::{LabelKey, Layout};
use cisa_spec::encoding::fits_unsigned;
use cisa_spec::{CondIsaError, IsaConfig, Program};

/// Settings shared by every build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub config: IsaConfig,
}

impl BuildContext {
    /// Create a context from a validated configuration
    pub fn new(config: IsaConfig) -> Result<Self> {
        config.validate().map_err(CondIsaError::from)?;
        Ok(Self { config })
    }

    /// Empty layout named after `behavior`
    pub fn layout<L: LabelKey>(&self, behavior: Behavior) -> Layout<L> {
        Layout::new(behavior.name(), self.config)
    }
}

/// A parameter struct that knows how to lay out its program
pub trait ProgramBuilder {
    /// Jump targets of the program
    type Label: LabelKey;

    const BEHAVIOR: Behavior;

    /// Emit the symbolic program for these parameters
    fn layout(&self, ctx: &BuildContext) -> Result<Layout<Self::Label>>;
}

/// Build `params` into `out` under `ctx`
///
/// `out` is replaced on success and left untouched on failure.
pub fn build_with<P: ProgramBuilder>(ctx: &BuildContext, params: &P, out: &mut Program) -> Result<()> {
    let layout = params.layout(ctx)?;
    layout.write_program(out)?;
    tracing::debug!(behavior = P::BEHAVIOR.name(), words = out.len(), "program built");
    Ok(())
}

/// Check that a parameter fits an unsigned immediate field
pub(crate) fn narrow(name: &'static str, value: u64, bits: u32) -> Result<u16> {
    if fits_unsigned(value, bits) {
        Ok(value as u16)
    } else {
        Err(BuilderError::field_overflow(name, value, bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow() {
        assert_eq!(narrow("stride", 0xFFF, 12).unwrap(), 0xFFF);
        assert!(matches!(
            narrow("stride", 0x1000, 12),
            Err(BuilderError::InvalidParameter { name: "stride", value: 0x1000, .. })
        ));
    }

    #[test]
    fn test_context_rejects_bad_config() {
        let config = IsaConfig { near_jump_reach: 0, ..IsaConfig::DEFAULT };
        assert!(matches!(
            BuildContext::new(config),
            Err(BuilderError::Encoding(CondIsaError::InvalidConfig(_)))
        ));
        assert_eq!(BuildContext::new(IsaConfig::DEFAULT).unwrap(), BuildContext::default());
    }
}
