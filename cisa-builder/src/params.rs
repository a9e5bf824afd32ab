//! Parameter structs, one per program kind
//!
//! Addresses are device virtual addresses unless noted. Builders only read
//! these; nothing is retained after a build.

use serde::{Deserialize, Serialize};

/// Return mbuf handles to their pools
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MbufFreeParams {
    /// First pool free register; the registers are contiguous, 8 bytes apart
    pub pool_register_addr: u64,
    /// Array of 32-bit handles, one per pool
    pub handle_array_addr: u64,
    /// Number of pools
    pub pool_index_max: u64,
}

/// Enqueue output handles, freeing what an overwrite pushed out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueParams {
    /// Array of overwrite status register addresses, 8 bytes apart
    pub overwrite_status_addr: u64,
    /// Array of 32-bit handles to enqueue
    pub handle_array_addr: u64,
    /// Array of enqueue register addresses
    pub enqueue_reg_addr: u64,
    /// Array of free register addresses
    pub free_reg_addr: u64,
    pub queue_count: u64,
}

/// Pop one handle from a queue manager queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DequeueParams {
    /// Holds the address of the queue
    pub gqm_addr: u64,
    /// Where the popped handle is stored
    pub handle_addr: u64,
    /// Status at +0, raw handle at +4
    pub dfx_addr: u64,
}

/// Pop one handle from every notified queue into a two-slot cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDequeueParams {
    /// Array of queue address holders, 8 bytes apart
    pub gqm_addr: u64,
    /// First cache entry; slot 0 at +0, slot 1 at +4
    pub handle_cache_addr: u64,
    /// Array of free register addresses, 8 bytes apart
    pub free_reg_addr: u64,
    /// Notify bitmap register (physical)
    pub notify_read_addr: u64,
    /// Notify clear register (physical)
    pub notify_clear_addr: u64,
    pub dfx_addr: u64,
    pub queue_count: u64,
    /// Byte offset of the 16-bit fill count inside a cache entry
    pub cnt_offset: u64,
    /// Bytes between cache entries; must fit in 12 bits
    pub cache_stride: u64,
}

/// Allocate output mbufs and copy the input private info into each
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareOutParams {
    pub input_handle_addr: u64,
    pub input_head_block_size_addr: u64,
    pub input_head_base_addr: u64,
    /// Array of allocation register address holders, 8 bytes apart
    pub output_alloc_addr: u64,
    /// Array of 32-bit output handles
    pub output_handle_addr: u64,
    /// Array of 32-bit head block sizes
    pub output_head_block_size_addr: u64,
    /// Array of 32-bit head base holders
    pub output_head_base_addr: u64,
    pub dfx_alloc_result_addr: u64,
    pub dfx_alloc_pool_idx_addr: u64,
    /// Must fit in 12 bits
    pub output_queue_count: u64,
}

/// Patch buffer addresses into descriptors without copying data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroCopyParams {
    pub block_size_addr: u64,
    pub handle_addr: u64,
    pub pool_base_addr: u64,
    /// Array of 64-bit data offsets
    pub offset_addr: u64,
    /// Array of destination address holders
    pub dest_addr: u64,
    pub count: u64,
    /// Write the low half of the address before the high half
    pub is_low_first: bool,
}

/// Copy a block of double words when a flag is set, then clear the flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionCopyParams {
    pub condition_addr: u64,
    pub src_addr: u64,
    pub dst_addr: u64,
    /// Double words to copy (at most 511)
    pub count: u32,
}

/// Allocate a destination mbuf on a peer chip and fill the SDMA descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterChipPreProcParams {
    pub dst_alloc_addr: u64,
    pub dst_handle_addr: u64,
    pub dst_head_base_addr: u64,
    pub dst_head_block_size_addr: u64,
    pub dst_data_base_addr: u64,
    pub dst_data_block_size_addr: u64,
    pub head_sdma_sqe_addr: u64,
    pub data_sdma_sqe_addr: u64,
}

/// Enqueue the transferred handle on the peer chip and free the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterChipPostProcParams {
    pub dst_overwrite_addr: u64,
    pub dst_free_addr: u64,
    pub dst_handle_addr: u64,
    pub dst_queue_addr: u64,
    pub src_handle_addr: u64,
    pub src_free_addr: u64,
}

/// Consume one completion entry and forward a handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdspcParams {
    pub cq_head_reg_addr: u64,
    pub cq_tail_reg_addr: u64,
    /// Must fit in 12 bits
    pub head_tail_mask: u64,
    pub cqe_base_addr: u64,
    /// Entry size in bytes; a multiple of 8 that fits in 12 bits
    pub cqe_size: u64,
    pub cqe_copy_addr: u64,
    /// Head at +0, tail at +4, overwrite word at +8
    pub dfx_addr: u64,
    pub overwrite_reg_addr: u64,
    pub free_reg_addr: u64,
    pub enqueue_reg_addr: u64,
    pub handle: u64,
}

impl Default for AdspcParams {
    fn default() -> Self {
        Self {
            cq_head_reg_addr: 0,
            cq_tail_reg_addr: 0,
            head_tail_mask: 0,
            cqe_base_addr: 0,
            cqe_size: 8,
            cqe_copy_addr: 0,
            dfx_addr: 0,
            overwrite_reg_addr: 0,
            free_reg_addr: 0,
            enqueue_reg_addr: 0,
            handle: 0,
        }
    }
}

/// Re-run the own stream until a result flag is set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameAlignParams {
    pub result_flag_addr: u64,
    pub sq_id: u16,
}

/// Quiesce and re-activate every stream of a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelExecuteParams {
    /// Array of 64-bit stream ids
    pub head_sq_array_addr: u64,
    pub head_sq_count: u64,
    /// FSM select register (physical)
    pub sq_fsm_sel_addr: u64,
    /// Array of per-stream register block addresses, indexed by stream id
    pub sq_virtual_addr_table: u64,
    pub sq_head_offset: u16,
    pub sq_tail_offset: u16,
    pub sq_enable_offset: u16,
    /// Array of per-stream activation counters, parallel to the stream ids
    pub stream_svm_array_addr: u64,
    /// Register block address at +0, head/tail difference at +8
    pub dfx_addr: u64,
}

/// Add each pending increment to its producer index field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivalueModifyParams {
    /// Array of pi value addresses
    pub pi_value_array_addr: u64,
    pub pi_value_count: u64,
    /// Receives a copy of each original pi value
    pub dfx_addr: u64,
}

/// Pop with wake-up so the queue manager notifies on the next push
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GqmInitParams {
    pub gqm_addr: u64,
    pub dfx_addr: u64,
}

/// Compute the RDMA producer index into r1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdmaSink1Params {
    /// 16-bit activation counter of the stream
    pub svm_addr: u64,
    /// Must fit in 12 bits
    pub pi_init: u64,
    /// log2 of the RDMA queue depth
    pub sq_depth_bits: u8,
}

/// Ring the RDMA doorbell with the producer index left in r1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdmaSink2Params {
    pub doorbell_addr: u64,
    pub doorbell_info: u64,
}

/// Disable a stream and move its head back to 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamResetParams {
    pub sq_id: u16,
    /// Enable register of the stream (physical)
    pub sq_enable_reg_addr: u64,
}
