//! Device contract constants shared by the builders

/// AXI_USER bits cleared to switch loads and stores to physical addressing
pub const AXI_USER_VA_MASK: u64 = 0x1_0000_0001;

/// AXI_USER bits for physical accesses that cross chips
pub const AXI_USER_INTER_CHIP_MASK: u64 = 0x9_0000_0009;

/// Pool and block id bits of an mbuf handle
pub const HANDLE_POOL_BLOCK_MASK: u64 = 0x1FFFF;

/// Block id bits of an mbuf handle
pub const HANDLE_BLOCK_ID_MASK: u64 = 0x1FC00;
pub const HANDLE_BLOCK_ID_SHIFT: u8 = 10;

/// Error bits of a word returned by an allocation register
pub const ALLOC_ERROR_MASK: u64 = 0xE000_0000;

/// `(word << 32) >> 61` leaves the 3-bit overwrite or allocation status
pub const STATUS_SHIFT_LEFT: u8 = 32;
pub const STATUS_SHIFT_RIGHT: u8 = 61;

/// Overwrite status: destination queue is not enabled
pub const OW_STATUS_QUEUE_NOT_ENABLE: u16 = 2;

/// Overwrite status: overwrite is not enabled on the queue
pub const OW_STATUS_OW_NOT_ENABLE: u16 = 3;

/// GQM command codes (bits 5:0 of the command word)
pub const GQM_CMD_PUSH: u64 = 0b000100;
pub const GQM_CMD_POP: u64 = 0b000101;

/// Wake-up bit of the GQM command word
pub const GQM_WAKE_UP: u64 = 1 << 6;

/// `status << 56` keeps only the 8-bit return code of a POP status word
pub const GQM_RET_CODE_SHIFT: u8 = 56;

/// A popped handle with any bit above 16 set is invalid
pub const HANDLE_VALID_BITS: u8 = 17;

/// Private info copied per output mbuf, in double words
pub const PRIVATE_INFO_DWORDS: u16 = 32;

/// Largest unrolled copy a condition-copy program accepts, in double words
pub const CONDITION_COPY_MAX: u32 = 511;

/// Run-time stream enable flag: `(word << 31) >> 63`
pub const SQ_ENABLE_SHIFT_LEFT: u8 = 31;
pub const SQ_ENABLE_SHIFT_RIGHT: u8 = 63;

/// Run-time stream head and tail are 16 bits: `(word << 48) >> 48`
pub const SQ_POINTER_SHIFT: u8 = 48;

/// Run-time stream FSM state sits in bits 35:32 of the FSM select register
pub const SQ_FSM_STATE_SHIFT: u8 = 32;
pub const SQ_FSM_STATE_MASK: u16 = 0xF;

/// Producer index field of a pi value, bits 47:32
pub const PI_FIELD_MASK: u64 = 0x0000_FFFF_0000_0000;

/// Byte offset of the increment that accompanies a pi value
pub const PI_INCREMENT_OFFSET: u16 = 16;

/// RDMA producer index is 16 bits
pub const RDMA_PI_MASK: u64 = 0xFFFF;

/// RDMA producer index lands in bits 47:32 of the doorbell
pub const RDMA_PI_SHIFT: u8 = 32;
