//! Symbolic program layout and jump resolution
//!
//! A builder appends instructions, label definitions and jump requests to a
//! [`Layout`]. [`Layout::resolve`] assigns every label its word index. Jumps
//! start near and are relaxed to the JUMP_PC relay when the distance exceeds
//! the inline reach; relaxation only goes near to far, so it terminates.
//!
//! A far jump is emitted as
//! `LHWI scratch, target>>4` / `LLWI scratch, target>>4` /
//! `CSRRW JUMP_PC, scratch` followed by the branch or loop with
//! `target & 0xF` in its offset field.

use crate::error::{BuilderError, Result};
use crate::encoder::encode_into;
use cisa_spec::encoding::split_u64;
use cisa_spec::{BranchCond, Csr, CsrMode, Instruction, IsaConfig, Program, Register};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Words added in front of a jump that goes through JUMP_PC
pub const RELAY_WORDS: usize = 4;

/// Bits of the target held in the branch's own offset field on a far jump
const RELAY_LOW_BITS: u32 = 4;

/// Label type a layout can be keyed by
pub trait LabelKey: Copy + Eq + Hash + fmt::Debug {}

impl<T: Copy + Eq + Hash + fmt::Debug> LabelKey for T {}

/// Jump flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Branch { rs1: Register, rs2: Register, cond: BranchCond },
    Loop { rs1: Register, delay: u16 },
}

impl JumpKind {
    fn with_offset(self, offset: i8) -> Instruction {
        match self {
            JumpKind::Branch { rs1, rs2, cond } => Instruction::Branch { rs1, rs2, cond, offset },
            JumpKind::Loop { rs1, delay } => Instruction::Loop { rs1, delay, offset },
        }
    }
}

#[derive(Debug, Clone)]
enum Item<L> {
    Instr(Instruction),
    Label(L),
    Jump { kind: JumpKind, target: L, scratch: Register },
}

/// Resolved label positions of one layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable<L: LabelKey> {
    labels: HashMap<L, usize>,
    far: Vec<bool>,
    len: usize,
}

impl<L: LabelKey> SlotTable<L> {
    /// Word index of a label
    pub fn slot(&self, label: L) -> Option<usize> {
        self.labels.get(&label).copied()
    }

    /// Total program length in words
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Near/far decision for each jump, in emission order
    pub fn jump_kinds(&self) -> &[bool] {
        &self.far
    }

    /// Number of jumps that go through the JUMP_PC relay
    pub fn far_jumps(&self) -> usize {
        self.far.iter().filter(|far| **far).count()
    }
}

/// Symbolic instruction list for one program
#[derive(Debug, Clone)]
pub struct Layout<L> {
    behavior: &'static str,
    config: IsaConfig,
    items: Vec<Item<L>>,
}

impl<L: LabelKey> Layout<L> {
    pub fn new(behavior: &'static str, config: IsaConfig) -> Self {
        Self { behavior, config, items: Vec::new() }
    }

    /// Program name carried into logs and the output [`Program`]
    pub fn behavior(&self) -> &'static str {
        self.behavior
    }

    pub fn config(&self) -> &IsaConfig {
        &self.config
    }

    /// Append one instruction
    pub fn emit(&mut self, instr: Instruction) {
        self.items.push(Item::Instr(instr));
    }

    /// Load a 64-bit value into `rd` through an LHWI/LLWI pair
    pub fn load_imm64(&mut self, rd: Register, value: u64) {
        let (high, low) = split_u64(value);
        self.emit(Instruction::Lhwi { rd, imm: high });
        self.emit(Instruction::Llwi { rd, imm: low });
    }

    /// Define `label` at the next emitted word
    pub fn label(&mut self, label: L) {
        self.items.push(Item::Label(label));
    }

    /// Conditional branch to `target`; `scratch` carries the relay value if the jump is far
    pub fn branch(&mut self, rs1: Register, rs2: Register, cond: BranchCond, target: L, scratch: Register) {
        self.items.push(Item::Jump {
            kind: JumpKind::Branch { rs1, rs2, cond },
            target,
            scratch,
        });
    }

    /// Unconditional jump, encoded as `BEQ r0, r0`
    pub fn jump(&mut self, target: L, scratch: Register) {
        self.branch(Register::R0, Register::R0, BranchCond::Eq, target, scratch);
    }

    /// Bottom-tested loop: while `rs1 != 0`, wait `delay` cycles and jump to `target`
    pub fn loop_to(&mut self, rs1: Register, delay: u16, target: L, scratch: Register) {
        self.items.push(Item::Jump {
            kind: JumpKind::Loop { rs1, delay },
            target,
            scratch,
        });
    }

    /// Compute every label position, relaxing jumps until none changes
    pub fn resolve(&self) -> Result<SlotTable<L>> {
        self.check_pairs()?;

        let jump_count = self.items.iter().filter(|item| matches!(item, Item::Jump { .. })).count();
        let mut far = vec![false; jump_count];
        let reach = self.config.near_jump_reach as i64;

        loop {
            let (labels, branch_slots, len) = self.place(&far)?;
            let mut changed = false;

            let jumps = self.items.iter().filter_map(|item| match item {
                Item::Jump { target, .. } => Some(*target),
                _ => None,
            });
            for (index, target) in jumps.enumerate() {
                if far[index] {
                    continue;
                }
                let slot = *labels
                    .get(&target)
                    .ok_or_else(|| BuilderError::UndefinedLabel(format!("{target:?}")))?;
                let distance = slot as i64 - branch_slots[index] as i64;
                if distance.abs() > reach {
                    tracing::trace!(
                        behavior = self.behavior,
                        jump = index,
                        distance,
                        "jump to {target:?} relaxed to JUMP_PC relay"
                    );
                    far[index] = true;
                    changed = true;
                }
            }

            if !changed {
                return Ok(SlotTable { labels, far, len });
            }
        }
    }

    /// Resolve and encode into words
    pub fn encode(&self) -> Result<Vec<u32>> {
        let table = self.resolve()?;
        let max_target = self.config.max_jump_target();
        let mut words = Vec::with_capacity(table.len());
        let mut jump_index = 0;

        for item in &self.items {
            match item {
                Item::Instr(instr) => encode_into(instr, &mut words)?,
                Item::Label(_) => {}
                Item::Jump { kind, target, scratch } => {
                    let slot = table
                        .slot(*target)
                        .ok_or_else(|| BuilderError::UndefinedLabel(format!("{target:?}")))?;
                    let instr = if table.far[jump_index] {
                        if slot as u64 > max_target {
                            return Err(BuilderError::JumpTargetOutOfRange { target: slot, max: max_target });
                        }
                        let (high, low) = split_u64((slot >> RELAY_LOW_BITS) as u64);
                        encode_into(&Instruction::Lhwi { rd: *scratch, imm: high }, &mut words)?;
                        encode_into(&Instruction::Llwi { rd: *scratch, imm: low }, &mut words)?;
                        encode_into(
                            &Instruction::Csr {
                                rd: None,
                                rs1: *scratch,
                                csr: Csr::JumpPc,
                                mode: CsrMode::ReadWrite,
                            },
                            &mut words,
                        )?;
                        kind.with_offset((slot & 0xF) as i8)
                    } else {
                        kind.with_offset((slot as i64 - words.len() as i64) as i8)
                    };
                    encode_into(&instr, &mut words)?;
                    jump_index += 1;
                }
            }
        }

        for (i, word) in words.iter().enumerate() {
            tracing::debug!("{} instr[{i}]=0x{word:08x}", self.behavior);
        }
        Ok(words)
    }

    /// Resolve, encode and write into `out`, replacing its previous contents
    ///
    /// `out` is left untouched if encoding fails.
    pub fn write_program(&self, out: &mut Program) -> Result<()> {
        let words = self.encode()?;
        out.reset(self.behavior);
        for word in words {
            out.push(word);
        }
        Ok(())
    }

    /// Label positions, branch word positions and total length for a near/far assignment
    fn place(&self, far: &[bool]) -> Result<(HashMap<L, usize>, Vec<usize>, usize)> {
        let mut labels = HashMap::new();
        let mut branch_slots = Vec::with_capacity(far.len());
        let mut pos = 0usize;

        for item in &self.items {
            match item {
                Item::Instr(instr) => pos += instr.word_count(),
                Item::Label(label) => {
                    if labels.insert(*label, pos).is_some() {
                        return Err(BuilderError::DuplicateLabel(format!("{label:?}")));
                    }
                }
                Item::Jump { .. } => {
                    if far[branch_slots.len()] {
                        pos += RELAY_WORDS;
                    }
                    branch_slots.push(pos);
                    pos += 1;
                }
            }
        }

        Ok((labels, branch_slots, pos))
    }

    /// LHWI must be directly followed by LLWI on the same register
    fn check_pairs(&self) -> Result<()> {
        let mut word = 0usize;
        let mut pending: Option<(usize, Register)> = None;

        for item in &self.items {
            match item {
                Item::Label(_) => continue,
                Item::Instr(Instruction::Llwi { rd, .. }) => match pending.take() {
                    Some((_, high)) if high == *rd => {}
                    Some((at, high)) => {
                        return Err(cisa_spec::CondIsaError::PairRegisterMismatch { word: at, high, low: *rd }.into())
                    }
                    None => return Err(cisa_spec::CondIsaError::UnpairedLowImmediate(word).into()),
                },
                _ => {
                    if let Some((at, _)) = pending {
                        return Err(cisa_spec::CondIsaError::UnpairedHighImmediate(at).into());
                    }
                    if let Item::Instr(Instruction::Lhwi { rd, .. }) = item {
                        pending = Some((word, *rd));
                    }
                }
            }
            word += match item {
                Item::Instr(instr) => instr.word_count(),
                _ => 1,
            };
        }

        match pending {
            Some((at, _)) => Err(cisa_spec::CondIsaError::UnpairedHighImmediate(at).into()),
            None => Ok(()),
        }
    }
}
