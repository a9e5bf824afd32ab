//! Instruction shorthands used by the program builders
//!
//! Operand order follows the assembly listing: destination first, then
//! sources. Stores take the base register first and the value second.

use cisa_spec::{
    Csr, CsrMode, ImmOp, Instruction, LoadImmWidth, LoadWidth, RegOp, Register, ShiftOp, StoreWidth, StreamOp,
};

pub fn ldr(rd: Register, rs1: Register, offset: u16) -> Instruction {
    Instruction::Load { rd, rs1, offset, width: LoadWidth::Double }
}

pub fn ld_imm(rd: Register, addr: u64, width: LoadImmWidth) -> Instruction {
    Instruction::LoadImm { rd, addr, width }
}

pub fn sh(base: Register, value: Register, offset: u16) -> Instruction {
    Instruction::Store { rs1: base, rs2: value, offset, width: StoreWidth::Half }
}

pub fn sw(base: Register, value: Register, offset: u16) -> Instruction {
    Instruction::Store { rs1: base, rs2: value, offset, width: StoreWidth::Word }
}

pub fn sd(base: Register, value: Register, offset: u16) -> Instruction {
    Instruction::Store { rs1: base, rs2: value, offset, width: StoreWidth::Double }
}

pub fn addi(rd: Register, rs1: Register, imm: u16) -> Instruction {
    Instruction::OpImm { rd, rs1, imm, op: ImmOp::Addi }
}

pub fn andi(rd: Register, rs1: Register, imm: u16) -> Instruction {
    Instruction::OpImm { rd, rs1, imm, op: ImmOp::Andi }
}

pub fn slli(rd: Register, rs1: Register, shamt: u8) -> Instruction {
    Instruction::ShiftImm { rd, rs1, shamt, op: ShiftOp::Slli }
}

pub fn srli(rd: Register, rs1: Register, shamt: u8) -> Instruction {
    Instruction::ShiftImm { rd, rs1, shamt, op: ShiftOp::Srli }
}

fn op(rd: Register, rs1: Register, rs2: Register, op: RegOp) -> Instruction {
    Instruction::Op { rd, rs1, rs2, op }
}

pub fn add(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::Add)
}

pub fn and(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::And)
}

pub fn or(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::Or)
}

pub fn xor(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::Xor)
}

pub fn sll(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::Sll)
}

pub fn mul(rd: Register, rs1: Register, rs2: Register) -> Instruction {
    op(rd, rs1, rs2, RegOp::Mul)
}

/// CSR access that discards the old value
pub fn csr(csr: Csr, mode: CsrMode, rs1: Register) -> Instruction {
    Instruction::Csr { rd: None, rs1, csr, mode }
}

pub fn gqm(rd: Register, cmd: Register, queue: Register) -> Instruction {
    Instruction::Gqm { rd, rs1: cmd, rs2: queue }
}

pub fn goto_i(rd: Register, sq_id: u16, head: u32) -> Instruction {
    Instruction::Stream { rd, op: StreamOp::GotoI { sq_id, head } }
}

pub fn goto_r(rd: Register, sq: Register) -> Instruction {
    Instruction::Stream { rd, op: StreamOp::GotoR { rs1: sq } }
}

pub fn active_r(rd: Register, sq: Register) -> Instruction {
    Instruction::Stream { rd, op: StreamOp::ActivateR { rs1: sq } }
}
