//! Instruction sequences shared by several programs

use crate::device::{STATUS_SHIFT_LEFT, STATUS_SHIFT_RIGHT};
use crate::layout::{LabelKey, Layout};
use crate::ops::{csr, slli, srli};
use cisa_spec::{Csr, CsrMode, DiagCode, Instruction, Register};

/// Run `body` with physical addressing
///
/// `mask` must already hold the AXI_USER bits to clear. The bits are set
/// again after the body, so every window restores virtual addressing.
pub fn pa_window<L: LabelKey>(layout: &mut Layout<L>, mask: Register, body: impl FnOnce(&mut Layout<L>)) {
    layout.emit(csr(Csr::AxiUser, CsrMode::ReadClear, mask));
    body(layout);
    layout.emit(csr(Csr::AxiUser, CsrMode::ReadSet, mask));
}

/// Load `mask_value` into `mask`, then run `body` with physical addressing
pub fn load_pa_window<L: LabelKey>(
    layout: &mut Layout<L>,
    mask: Register,
    mask_value: u64,
    body: impl FnOnce(&mut Layout<L>),
) {
    layout.load_imm64(mask, mask_value);
    pa_window(layout, mask, body);
}

/// Report `code` through CSQ_STATUS and stop with the error sentinel
pub fn error_exit<L: LabelKey>(layout: &mut Layout<L>, code: DiagCode, code_reg: Register) {
    layout.load_imm64(code_reg, code.value());
    raw_error_exit(layout, code_reg);
}

/// Report whatever `code_reg` holds through CSQ_STATUS and stop
pub fn raw_error_exit<L: LabelKey>(layout: &mut Layout<L>, code_reg: Register) {
    layout.emit(csr(Csr::CsqStatus, CsrMode::ReadWrite, code_reg));
    layout.emit(Instruction::Error);
}

/// `status = (word << 32) >> 61`
pub fn extract_status<L: LabelKey>(layout: &mut Layout<L>, status: Register, word: Register) {
    layout.emit(slli(status, word, STATUS_SHIFT_LEFT));
    layout.emit(srli(status, status, STATUS_SHIFT_RIGHT));
}

/// Keep the low `64 - shift` bits of `reg`
pub fn zero_extend<L: LabelKey>(layout: &mut Layout<L>, reg: Register, shift: u8) {
    layout.emit(slli(reg, reg, shift));
    layout.emit(srli(reg, reg, shift));
}
