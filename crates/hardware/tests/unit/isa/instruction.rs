//! Instruction and Program Tests.
//!
//! Covers opcode parsing and port classification, disassembly, and the id/pc
//! numbering a program assigns.

use pipesim_core::SimError;
use pipesim_core::isa::{Instruction, Opcode, Program};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Opcodes
// ══════════════════════════════════════════════════════════

#[rstest]
#[case("ADD", Opcode::Add)]
#[case("sub", Opcode::Sub)]
#[case("Load", Opcode::Load)]
#[case("STORE", Opcode::Store)]
#[case("beq", Opcode::Beq)]
#[case("BnE", Opcode::Bne)]
#[case("nop", Opcode::Nop)]
#[case("HALT", Opcode::Halt)]
fn mnemonics_parse_ignoring_case(#[case] text: &str, #[case] expected: Opcode) {
    assert_eq!(text.parse::<Opcode>().ok(), Some(expected));
}

#[test]
fn unknown_mnemonic_is_rejected() {
    let err = "JAL".parse::<Opcode>();
    assert!(matches!(err, Err(SimError::UnknownOpcode(ref m)) if m == "JAL"));
}

#[test]
fn opcode_classification() {
    let writers: Vec<_> = Opcode::ALL
        .into_iter()
        .filter(|op| op.writes_register())
        .collect();
    assert_eq!(writers, [Opcode::Add, Opcode::Sub, Opcode::Load]);

    let branches: Vec<_> = Opcode::ALL.into_iter().filter(|op| op.is_branch()).collect();
    assert_eq!(branches, [Opcode::Beq, Opcode::Bne]);

    assert!(Opcode::Load.reads_rs1() && !Opcode::Load.reads_rs2());
    assert!(Opcode::Store.reads_rs1() && Opcode::Store.reads_rs2());
    assert!(!Opcode::Nop.reads_rs1() && !Opcode::Halt.reads_rs2());
    assert!(!Opcode::Nop.retires() && !Opcode::Halt.retires());
    assert!(Opcode::Store.retires());
}

// ══════════════════════════════════════════════════════════
// 2. Operand helpers
// ══════════════════════════════════════════════════════════

#[test]
fn dest_only_for_register_writers() {
    assert_eq!(Instruction::add(4, 1, 2).dest(), Some(4));
    assert_eq!(Instruction::load(7, 1, 0).dest(), Some(7));
    assert_eq!(Instruction::store(7, 1, 0).dest(), None);
    assert_eq!(Instruction::beq(1, 2, 0).dest(), None);
    // A stray rd on a branch does not make it a producer.
    let odd = Instruction {
        rd: Some(3),
        ..Instruction::bne(1, 2, 0)
    };
    assert_eq!(odd.dest(), None);
}

#[test]
fn branch_target_is_relative_to_the_next_instruction() {
    let program = Program::new([
        Instruction::nop(),
        Instruction::nop(),
        Instruction::beq(0, 0, -2),
    ]);
    let branch = program.instructions()[2];
    assert_eq!(branch.fall_through(), 3);
    assert_eq!(branch.branch_target(), 1);
    assert_eq!(Instruction::bne(0, 1, -5).branch_target(), -4);
}

#[rstest]
#[case::far_forward(i64::MAX, i64::MAX)]
#[case::far_backward(i64::MIN, i64::MIN + 1)]
fn extreme_displacements_clamp_instead_of_overflowing(#[case] imm: i64, #[case] expected: i64) {
    let branch = Instruction::beq(0, 0, imm);
    assert_eq!(branch.fall_through(), 1);
    assert_eq!(branch.branch_target(), expected);
}

// ══════════════════════════════════════════════════════════
// 3. Disassembly
// ══════════════════════════════════════════════════════════

#[test]
fn display_matches_trace_syntax() {
    let program = Program::new([
        Instruction::add(1, 2, 3),
        Instruction::load(1, 2, 4),
        Instruction::store(3, 2, -8),
        Instruction::beq(1, 2, -2),
        Instruction::halt(),
    ]);
    let text: Vec<String> = program.iter().map(ToString::to_string).collect();
    assert_eq!(
        text,
        [
            "#0 PC=0 ADD r1 r2 r3",
            "#1 PC=1 LOAD r1 [r2+4]",
            "#2 PC=2 STORE r3 [r2-8]",
            "#3 PC=3 BEQ r1 r2 -2",
            "#4 PC=4 HALT",
        ]
    );
}

#[test]
fn display_marks_missing_operands() {
    let odd = Instruction {
        op: Opcode::Add,
        ..Instruction::default()
    };
    assert_eq!(odd.to_string(), "#0 PC=0 ADD r? r? r?");
}

// ══════════════════════════════════════════════════════════
// 4. Programs
// ══════════════════════════════════════════════════════════

#[test]
fn program_numbers_in_fetch_order() {
    let program: Program = [Instruction::halt(); 4].into_iter().collect();
    assert_eq!(program.len(), 4);
    for (idx, inst) in program.iter().enumerate() {
        assert_eq!(inst.pc, idx);
        assert_eq!(inst.id, idx as u64);
    }
}

#[rstest]
#[case(-1)]
#[case(2)]
#[case(i64::MAX)]
fn fetch_out_of_range_is_none(#[case] addr: i64) {
    let program = Program::new([Instruction::nop(), Instruction::halt()]);
    assert_eq!(program.fetch(addr), None);
}

#[test]
fn fetch_in_range() {
    let program = Program::new([Instruction::nop(), Instruction::halt()]);
    assert_eq!(program.fetch(1).map(|inst| inst.op), Some(Opcode::Halt));
    assert!(Program::default().is_empty());
}
