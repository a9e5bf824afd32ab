//! Program kinds and typed dispatch

use crate::builders::{build_with, BuildContext};
use crate::error::Result;
use crate::params::*;
use cisa_spec::Program;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every program kind the builders produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    MbufFree,
    Enqueue,
    Dequeue,
    BatchDequeue,
    PrepareOut,
    ZeroCopy,
    ConditionCopy,
    InterChipPreProc,
    InterChipPostProc,
    Adspc,
    FrameAlign,
    ModelExecute,
    PivalueModify,
    GqmInit,
    RdmaSink1,
    RdmaSink2,
    StreamReset,
}

impl Behavior {
    pub const ALL: [Behavior; 17] = [
        Behavior::MbufFree,
        Behavior::Enqueue,
        Behavior::Dequeue,
        Behavior::BatchDequeue,
        Behavior::PrepareOut,
        Behavior::ZeroCopy,
        Behavior::ConditionCopy,
        Behavior::InterChipPreProc,
        Behavior::InterChipPostProc,
        Behavior::Adspc,
        Behavior::FrameAlign,
        Behavior::ModelExecute,
        Behavior::PivalueModify,
        Behavior::GqmInit,
        Behavior::RdmaSink1,
        Behavior::RdmaSink2,
        Behavior::StreamReset,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Behavior::MbufFree => "mbuf_free",
            Behavior::Enqueue => "enqueue",
            Behavior::Dequeue => "dequeue",
            Behavior::BatchDequeue => "batch_dequeue",
            Behavior::PrepareOut => "prepare_out",
            Behavior::ZeroCopy => "zero_copy",
            Behavior::ConditionCopy => "condition_copy",
            Behavior::InterChipPreProc => "inter_chip_pre_proc",
            Behavior::InterChipPostProc => "inter_chip_post_proc",
            Behavior::Adspc => "adspc",
            Behavior::FrameAlign => "frame_align",
            Behavior::ModelExecute => "model_execute",
            Behavior::PivalueModify => "pivalue_modify",
            Behavior::GqmInit => "gqm_init",
            Behavior::RdmaSink1 => "rdma_sink1",
            Behavior::RdmaSink2 => "rdma_sink2",
            Behavior::StreamReset => "stream_reset",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of any program kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorParams {
    MbufFree(MbufFreeParams),
    Enqueue(EnqueueParams),
    Dequeue(DequeueParams),
    BatchDequeue(BatchDequeueParams),
    PrepareOut(PrepareOutParams),
    ZeroCopy(ZeroCopyParams),
    ConditionCopy(ConditionCopyParams),
    InterChipPreProc(InterChipPreProcParams),
    InterChipPostProc(InterChipPostProcParams),
    Adspc(AdspcParams),
    FrameAlign(FrameAlignParams),
    ModelExecute(ModelExecuteParams),
    PivalueModify(PivalueModifyParams),
    GqmInit(GqmInitParams),
    RdmaSink1(RdmaSink1Params),
    RdmaSink2(RdmaSink2Params),
    StreamReset(StreamResetParams),
}

impl BehaviorParams {
    pub fn behavior(&self) -> Behavior {
        match self {
            BehaviorParams::MbufFree(_) => Behavior::MbufFree,
            BehaviorParams::Enqueue(_) => Behavior::Enqueue,
            BehaviorParams::Dequeue(_) => Behavior::Dequeue,
            BehaviorParams::BatchDequeue(_) => Behavior::BatchDequeue,
            BehaviorParams::PrepareOut(_) => Behavior::PrepareOut,
            BehaviorParams::ZeroCopy(_) => Behavior::ZeroCopy,
            BehaviorParams::ConditionCopy(_) => Behavior::ConditionCopy,
            BehaviorParams::InterChipPreProc(_) => Behavior::InterChipPreProc,
            BehaviorParams::InterChipPostProc(_) => Behavior::InterChipPostProc,
            BehaviorParams::Adspc(_) => Behavior::Adspc,
            BehaviorParams::FrameAlign(_) => Behavior::FrameAlign,
            BehaviorParams::ModelExecute(_) => Behavior::ModelExecute,
            BehaviorParams::PivalueModify(_) => Behavior::PivalueModify,
            BehaviorParams::GqmInit(_) => Behavior::GqmInit,
            BehaviorParams::RdmaSink1(_) => Behavior::RdmaSink1,
            BehaviorParams::RdmaSink2(_) => Behavior::RdmaSink2,
            BehaviorParams::StreamReset(_) => Behavior::StreamReset,
        }
    }

    /// Default parameters of a program kind
    pub fn default_for(behavior: Behavior) -> Self {
        match behavior {
            Behavior::MbufFree => BehaviorParams::MbufFree(Default::default()),
            Behavior::Enqueue => BehaviorParams::Enqueue(Default::default()),
            Behavior::Dequeue => BehaviorParams::Dequeue(Default::default()),
            Behavior::BatchDequeue => BehaviorParams::BatchDequeue(Default::default()),
            Behavior::PrepareOut => BehaviorParams::PrepareOut(Default::default()),
            Behavior::ZeroCopy => BehaviorParams::ZeroCopy(Default::default()),
            Behavior::ConditionCopy => BehaviorParams::ConditionCopy(Default::default()),
            Behavior::InterChipPreProc => BehaviorParams::InterChipPreProc(Default::default()),
            Behavior::InterChipPostProc => BehaviorParams::InterChipPostProc(Default::default()),
            Behavior::Adspc => BehaviorParams::Adspc(Default::default()),
            Behavior::FrameAlign => BehaviorParams::FrameAlign(Default::default()),
            Behavior::ModelExecute => BehaviorParams::ModelExecute(Default::default()),
            Behavior::PivalueModify => BehaviorParams::PivalueModify(Default::default()),
            Behavior::GqmInit => BehaviorParams::GqmInit(Default::default()),
            Behavior::RdmaSink1 => BehaviorParams::RdmaSink1(Default::default()),
            Behavior::RdmaSink2 => BehaviorParams::RdmaSink2(Default::default()),
            Behavior::StreamReset => BehaviorParams::StreamReset(Default::default()),
        }
    }
}

/// Build any program kind with the default configuration
pub fn build(params: &BehaviorParams, out: &mut Program) -> Result<()> {
    build_in(&BuildContext::default(), params, out)
}

/// Build any program kind under `ctx`
pub fn build_in(ctx: &BuildContext, params: &BehaviorParams, out: &mut Program) -> Result<()> {
    match params {
        BehaviorParams::MbufFree(p) => build_with(ctx, p, out),
        BehaviorParams::Enqueue(p) => build_with(ctx, p, out),
        BehaviorParams::Dequeue(p) => build_with(ctx, p, out),
        BehaviorParams::BatchDequeue(p) => build_with(ctx, p, out),
        BehaviorParams::PrepareOut(p) => build_with(ctx, p, out),
        BehaviorParams::ZeroCopy(p) => build_with(ctx, p, out),
        BehaviorParams::ConditionCopy(p) => build_with(ctx, p, out),
        BehaviorParams::InterChipPreProc(p) => build_with(ctx, p, out),
        BehaviorParams::InterChipPostProc(p) => build_with(ctx, p, out),
        BehaviorParams::Adspc(p) => build_with(ctx, p, out),
        BehaviorParams::FrameAlign(p) => build_with(ctx, p, out),
        BehaviorParams::ModelExecute(p) => build_with(ctx, p, out),
        BehaviorParams::PivalueModify(p) => build_with(ctx, p, out),
        BehaviorParams::GqmInit(p) => build_with(ctx, p, out),
        BehaviorParams::RdmaSink1(p) => build_with(ctx, p, out),
        BehaviorParams::RdmaSink2(p) => build_with(ctx, p, out),
        BehaviorParams::StreamReset(p) => build_with(ctx, p, out),
    }
}
