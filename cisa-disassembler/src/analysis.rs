//! Static control-flow checker
//!
//! Builds the successor graph of a decoded program and reports paths that
//! do not end in a terminal. Jump targets follow the same rules as the
//! device: an inline offset is relative to the branch, while a branch
//! right after a JUMP_PC relay goes to `(relay << 4) | offset`.
//! Stream control instructions fall through.

use crate::decoder::{decode_program, Slot};
use crate::error::Result;
use cisa_spec::encoding::join_u64;
use cisa_spec::{BranchCond, Csr, CsrMode, Instruction, Program, Register};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

/// Bits of a relayed target carried by the branch offset field
const RELAY_LOW_BITS: u32 = 4;

/// Problem found on a reachable path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Finding {
    /// No terminal can be reached from this slot
    UnreachableTerminal { slot: usize },
    /// Execution can run past the last word
    FallsOffEnd { slot: usize },
    /// An error sentinel with no CSQ_STATUS write right before it
    UndiagnosedError { slot: usize },
    /// A jump lands inside a two-word instruction
    MisalignedTarget { slot: usize, target: usize },
}

impl Finding {
    pub fn kind(&self) -> &'static str {
        match self {
            Finding::UnreachableTerminal { .. } => "unreachable_terminal",
            Finding::FallsOffEnd { .. } => "falls_off_end",
            Finding::UndiagnosedError { .. } => "undiagnosed_error",
            Finding::MisalignedTarget { .. } => "misaligned_target",
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::UnreachableTerminal { slot }
            | Finding::FallsOffEnd { slot }
            | Finding::UndiagnosedError { slot } => write!(f, "{} at 0x{:04X}", self.kind(), slot),
            Finding::MisalignedTarget { slot, target } => {
                write!(f, "{} at 0x{:04X} (target 0x{:04X})", self.kind(), slot, target)
            }
        }
    }
}

/// Where control can go after a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successors {
    /// Next instruction, unless the slot never falls through
    pub fall_through: Option<usize>,
    /// Jump target of a branch or loop
    pub target: Option<usize>,
    /// The target came from a JUMP_PC relay
    pub relayed: bool,
}

impl Successors {
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.fall_through.into_iter().chain(self.target)
    }
}

/// Result of checking one program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Word index of every slot reachable from word 0
    pub reachable: BTreeSet<usize>,
    /// Every terminal reachable from word 0
    pub terminals: BTreeSet<usize>,
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Value the three slots before `slots[pos]` load into JUMP_PC, if they form a relay
pub fn relay_value(slots: &[Slot], pos: usize) -> Option<u64> {
    if pos < 3 {
        return None;
    }
    match (slots[pos - 3].instr, slots[pos - 2].instr, slots[pos - 1].instr) {
        (
            Instruction::Lhwi { rd: high_rd, imm: high },
            Instruction::Llwi { rd: low_rd, imm: low },
            Instruction::Csr { rs1, csr: Csr::JumpPc, mode: CsrMode::ReadWrite, .. },
        ) if high_rd == low_rd && low_rd == rs1 => Some(join_u64(high, low)),
        _ => None,
    }
}

/// Successors of `slots[pos]`
pub fn successors(slots: &[Slot], pos: usize) -> Successors {
    let slot = slots[pos];
    let next = Some(slot.next());

    let (offset, fall_through) = match slot.instr {
        Instruction::Nop | Instruction::Error => {
            return Successors { fall_through: None, target: None, relayed: false };
        }
        Instruction::Branch { rs1, rs2, cond, offset } => match same_operands(rs1, rs2, cond) {
            Some(true) => (offset, None),
            Some(false) => return Successors { fall_through: next, target: None, relayed: false },
            None => (offset, next),
        },
        Instruction::Loop { offset, .. } => (offset, next),
        _ => return Successors { fall_through: next, target: None, relayed: false },
    };

    let (target, relayed) = match relay_value(slots, pos) {
        Some(high) => ((high << RELAY_LOW_BITS) as i64 | (offset as i64 & 0xF), true),
        None => (slot.index as i64 + offset as i64, false),
    };
    Successors { fall_through, target: usize::try_from(target).ok(), relayed }
}

/// Outcome of a branch comparing a register with itself
fn same_operands(rs1: Register, rs2: Register, cond: BranchCond) -> Option<bool> {
    (rs1 == rs2).then(|| cond.holds(0, 0))
}

/// Check a program's word stream
pub fn check(words: &[u32]) -> Result<Report> {
    let slots = decode_program(words)?;
    let positions: HashMap<usize, usize> = slots.iter().enumerate().map(|(pos, s)| (s.index, pos)).collect();
    let mut report = Report::default();
    if slots.is_empty() {
        return Ok(report);
    }

    // forward walk from the first word
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    let mut seen = vec![false; slots.len()];
    let mut queue = VecDeque::from([0usize]);
    seen[0] = true;

    while let Some(pos) = queue.pop_front() {
        let slot = slots[pos];
        report.reachable.insert(slot.index);

        match slot.instr {
            Instruction::Nop => {
                report.terminals.insert(slot.index);
            }
            Instruction::Error => {
                report.terminals.insert(slot.index);
                let diagnosed = pos > 0
                    && matches!(
                        slots[pos - 1].instr,
                        Instruction::Csr { csr: Csr::CsqStatus, mode: CsrMode::ReadWrite, .. }
                    );
                if !diagnosed {
                    report.findings.push(Finding::UndiagnosedError { slot: slot.index });
                }
            }
            _ => {}
        }

        for target in successors(&slots, pos).iter() {
            if target >= words.len() {
                report.findings.push(Finding::FallsOffEnd { slot: slot.index });
                continue;
            }
            let Some(&next) = positions.get(&target) else {
                report.findings.push(Finding::MisalignedTarget { slot: slot.index, target });
                continue;
            };
            edges[pos].push(next);
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }

    // backward walk from every terminal
    let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); slots.len()];
    for (from, tos) in edges.iter().enumerate() {
        for &to in tos {
            reverse[to].push(from);
        }
    }
    let mut ends = vec![false; slots.len()];
    let mut queue: VecDeque<usize> = (0..slots.len())
        .filter(|&pos| seen[pos] && slots[pos].instr.is_terminal())
        .collect();
    for &pos in &queue {
        ends[pos] = true;
    }
    while let Some(pos) = queue.pop_front() {
        for &prev in &reverse[pos] {
            if !ends[prev] {
                ends[prev] = true;
                queue.push_back(prev);
            }
        }
    }
    for pos in 0..slots.len() {
        if seen[pos] && !ends[pos] {
            report.findings.push(Finding::UnreachableTerminal { slot: slots[pos].index });
        }
    }

    report.findings.sort();
    report.findings.dedup();
    Ok(report)
}

/// Check a built program
pub fn check_program(program: &Program) -> Result<Report> {
    check(program.words())
}
