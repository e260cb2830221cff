//! Data Forwarding Tests.
//!
//! Verifies RAW stall behavior with forwarding disabled (every producer in
//! EX, MEM or WB blocks ID) against forwarding enabled (only the load-use
//! case blocks), both at the detector and over whole programs.

use pipesim_core::core::pipeline::hazards::{HazardDecision, depends_on, detect_hazard};
use pipesim_core::core::pipeline::latches::Latch;
use pipesim_core::isa::Instruction;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::ProgramBuilder;
use crate::common::harness::{TEST_MAX_CYCLES, run};

const EMPTY: Latch = Latch::Empty;

// ══════════════════════════════════════════════════════════
// 1. Dependency predicate
// ══════════════════════════════════════════════════════════

#[test]
fn store_and_branches_are_never_producers() {
    let consumer = Instruction::add(3, 1, 2);
    for producer in [
        Instruction::store(1, 2, 0),
        Instruction::beq(1, 2, 0),
        Instruction::bne(1, 2, 0),
        Instruction::nop(),
        Instruction::halt(),
    ] {
        assert!(!depends_on(&consumer, &producer), "{producer}");
    }
}

#[test]
fn load_only_reads_its_base_register() {
    let producer = Instruction::add(1, 2, 3);
    assert!(depends_on(&Instruction::load(4, 1, 0), &producer));
    // A stray rs2 on a LOAD is not an operand port.
    let odd_load = Instruction {
        rs2: Some(1),
        ..Instruction::load(4, 9, 0)
    };
    assert!(!depends_on(&odd_load, &producer));
}

#[test]
fn store_reads_data_and_base() {
    let producer = Instruction::sub(7, 2, 3);
    assert!(depends_on(&Instruction::store(7, 1, 0), &producer));
    assert!(depends_on(&Instruction::store(1, 7, 0), &producer));
}

// ══════════════════════════════════════════════════════════
// 2. Detector matrix
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::in_ex(0, true, false)]
#[case::in_mem(1, true, false)]
#[case::in_wb(2, true, false)]
fn alu_producer_position(
    #[case] position: usize,
    #[case] stalls_without_forwarding: bool,
    #[case] stalls_with_forwarding: bool,
) {
    let id = Latch::Valid(Instruction::add(3, 1, 4));
    let mut ahead = [EMPTY; 3];
    ahead[position] = Latch::Valid(Instruction::add(1, 2, 2));
    let [ex, mem, wb] = ahead;

    assert_eq!(
        detect_hazard(&id, &ex, &mem, &wb, false).stall,
        stalls_without_forwarding
    );
    assert_eq!(
        detect_hazard(&id, &ex, &mem, &wb, true).stall,
        stalls_with_forwarding
    );
}

#[test]
fn independent_producers_never_stall() {
    let id = Latch::Valid(Instruction::add(3, 1, 4));
    let other = Latch::Valid(Instruction::load(9, 2, 0));
    assert_eq!(
        detect_hazard(&id, &other, &other, &other, false),
        HazardDecision::CLEAR
    );
}

// ══════════════════════════════════════════════════════════
// 3. Engine: stalls by producer distance
// ══════════════════════════════════════════════════════════

/// Producer at position 0, consumer `distance` instructions later.
fn distance_program(distance: usize) -> pipesim_core::isa::Program {
    ProgramBuilder::new()
        .add(1, 2, 3)
        .nops(distance - 1)
        .add(4, 1, 5)
        .halt()
        .build()
}

#[rstest]
#[case(1, 3)]
#[case(2, 2)]
#[case(3, 1)]
#[case(4, 0)]
fn stalls_without_forwarding_by_distance(#[case] distance: usize, #[case] expected: u64) {
    let result = run(&distance_program(distance), false, None, TEST_MAX_CYCLES);
    assert_eq!(result.metrics().stalls.raw, expected);
    assert!(result.summary.halted);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn alu_chains_never_stall_with_forwarding(#[case] distance: usize) {
    let result = run(&distance_program(distance), true, None, TEST_MAX_CYCLES);
    assert_eq!(result.metrics().stalls.raw, 0);
}

#[test]
fn dependent_pair_cpi_with_and_without_forwarding() {
    let program = ProgramBuilder::new().add(1, 2, 3).add(4, 1, 5).halt().build();

    let on = run(&program, true, None, TEST_MAX_CYCLES).metrics();
    let off = run(&program, false, None, TEST_MAX_CYCLES).metrics();

    assert_eq!(on.stalls.raw, 0);
    assert_eq!(on.cycles, 7);
    assert_eq!(on.retired, 2);
    assert!((on.cpi() - on.cycles as f64 / 2.0).abs() < 1e-12);

    assert_eq!(off.stalls.raw, 3);
    assert_eq!(off.cycles, 10);
    assert_eq!(off.retired, on.retired);
    assert!(off.cpi() > on.cpi());
}

#[test]
fn stalled_consumer_waits_in_id() {
    let program = ProgramBuilder::new().add(1, 2, 3).add(4, 1, 5).halt().build();
    let rows = run(&program, false, None, TEST_MAX_CYCLES).rows();

    let expected: Vec<Vec<&str>> = vec![
        vec!["ADD#0", "-", "-", "-", "-"],
        vec!["ADD#1", "ADD#0", "-", "-", "-"],
        vec!["ADD#1", "stall", "ADD#0", "-", "-"],
        vec!["ADD#1", "stall", "stall", "ADD#0", "-"],
        vec!["ADD#1", "stall", "stall", "stall", "ADD#0"],
        vec!["HALT#2", "ADD#1", "stall", "stall", "stall"],
        vec!["-", "HALT#2", "ADD#1", "stall", "stall"],
        vec!["-", "-", "HALT#2", "ADD#1", "stall"],
        vec!["-", "-", "-", "HALT#2", "ADD#1"],
        vec!["-", "-", "-", "-", "HALT#2"],
    ];
    assert_eq!(rows, expected);
}
