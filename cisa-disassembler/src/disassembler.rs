//! Program listings

use crate::analysis::successors;
use crate::decoder::{decode_at, Slot};
use crate::error::Result;
use crate::formatter::{format, format_ext, format_line};
use cisa_spec::Program;
use std::fmt::Write;

/// Disassemble a program into listing text
///
/// Words that do not decode are listed with the decoder error and the
/// listing continues at the next word.
pub fn disassemble(program: &Program) -> Result<String> {
    let words = program.words();
    let mut output = String::new();

    let _ = writeln!(output, "; {}", program.name());
    let _ = writeln!(output, "; {} words", words.len());
    output.push('\n');

    let mut slots: Vec<Slot> = Vec::with_capacity(words.len());
    let mut index = 0;
    while index < words.len() {
        let slot = match decode_at(words, index) {
            Ok(slot) => slot,
            Err(e) => {
                output.push_str(&format_line(index, words[index], &format!("; ERROR: {}", e)));
                output.push('\n');
                slots.clear();
                index += 1;
                continue;
            }
        };

        let mut text = format(&slot.instr);
        if slot.instr.is_jump() {
            slots.push(slot);
            if let Some(target) = successors(&slots, slots.len() - 1).target {
                let _ = write!(text, "  ; -> 0x{:04X}", target);
            }
        } else {
            slots.push(slot);
        }

        output.push_str(&format_line(index, words[index], &text));
        output.push('\n');
        for ext in index + 1..slot.next() {
            output.push_str(&format_ext(ext, words[ext]));
            output.push('\n');
        }
        index = slot.next();
    }

    Ok(output)
}

/// Disassemble a little-endian word image
pub fn disassemble_bytes(name: &str, bytes: &[u8]) -> Result<String> {
    let program = Program::from_bytes(name, bytes)?;
    disassemble(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_simple() {
        // bne r1, r0, +2; nop; error
        let program = Program::from_words("demo", vec![0x63 | (2 << 7) | (1 << 12) | (1 << 15), 0x13, 0]);
        let asm = disassemble(&program).unwrap();

        assert!(asm.starts_with("; demo\n; 3 words\n"));
        assert!(asm.contains("0x0000:  "));
        assert!(asm.contains("; -> 0x0002"));
        assert!(asm.contains("nop"));
        assert!(asm.contains("error"));
    }

    #[test]
    fn test_extension_lines() {
        // llwi r1, 5; nop
        let program = Program::from_words("ext", vec![0x0B | (1 << 7) | (1 << 12), 5, 0x13]);
        let asm = disassemble(&program).unwrap();
        assert!(asm.contains("0x0001:  00000005  .ext"));
        assert!(asm.contains("0x0002:  00000013  nop"));
    }

    #[test]
    fn test_bytes_must_be_whole_words() {
        assert!(disassemble_bytes("image", &[0x13, 0, 0, 0]).unwrap().contains("nop"));
        assert!(matches!(
            disassemble_bytes("image", &[0x13, 0, 0]),
            Err(crate::error::DisassemblerError::Spec(_))
        ));
    }

    #[test]
    fn test_bad_word_continues() {
        let program = Program::from_words("bad", vec![0x7F, 0x13]);
        let asm = disassemble(&program).unwrap();
        assert!(asm.contains("; ERROR:"));
        assert!(asm.contains("0x0001:  00000013  nop"));
    }
}
