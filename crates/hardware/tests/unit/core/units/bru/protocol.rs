//! Predict/Update Protocol Tests.
//!
//! Uses a mock predictor to verify how the pipeline drives any
//! `BranchPredictor`: one `predict` when the branch leaves ID, one `update`
//! with the ground truth when it resolves in EX, both under the same tag, and
//! one `withdraw` for a predicted branch squashed on the wrong path.

use mockall::{Sequence, predicate::eq};
use pipesim_core::core::pipeline::Pipeline;
use pipesim_core::core::units::bru::{BranchPredictor, BranchTag};

use crate::common::builder::ProgramBuilder;
use crate::common::mocks::MockPredictor;

fn run_to_halt(pipeline: &mut Pipeline<'_>) {
    while pipeline.step().is_some() {}
}

#[test]
fn one_predict_then_one_update_per_branch() {
    let program = ProgramBuilder::new().beq(0, 0, 1).halt().build();

    let mut mock = MockPredictor::new();
    let mut seq = Sequence::new();
    let _ = mock
        .expect_predict()
        .with(eq(BranchTag::new(0, 0)))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(false);
    let _ = mock
        .expect_update()
        .with(eq(BranchTag::new(0, 0)), eq(false))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    {
        let bp: &mut dyn BranchPredictor = &mut mock;
        let mut pipeline = Pipeline::new(&program, true, Some(bp));
        run_to_halt(&mut pipeline);

        let m = pipeline.metrics();
        assert_eq!(m.cycles, 6);
        assert_eq!(m.bp_predictions, 1);
        assert_eq!(m.bp_mispredictions, 0);
    }
    mock.checkpoint();
}

#[test]
fn stalled_branch_is_predicted_once() {
    // The BEQ waits a cycle in ID behind the load; it must not be predicted
    // until it actually advances.
    let program = ProgramBuilder::new().load(1, 2, 0).beq(1, 0, 1).halt().build();

    let mut mock = MockPredictor::new();
    let _ = mock
        .expect_predict()
        .with(eq(BranchTag::new(1, 0)))
        .times(1)
        .return_const(false);
    let _ = mock
        .expect_update()
        .with(eq(BranchTag::new(1, 0)), eq(false))
        .times(1)
        .return_const(());

    let bp: &mut dyn BranchPredictor = &mut mock;
    let mut pipeline = Pipeline::new(&program, true, Some(bp));
    run_to_halt(&mut pipeline);
    assert_eq!(pipeline.metrics().stalls.raw, 1);
}

#[test]
fn wrong_guess_is_trained_with_ground_truth() {
    let program = ProgramBuilder::new().beq(0, 0, 1).add(1, 2, 3).halt().build();

    let mut mock = MockPredictor::new();
    let _ = mock.expect_predict().times(1).return_const(true);
    let _ = mock
        .expect_update()
        .with(eq(BranchTag::new(0, 0)), eq(false))
        .times(1)
        .return_const(());

    let bp: &mut dyn BranchPredictor = &mut mock;
    let mut pipeline = Pipeline::new(&program, true, Some(bp));
    run_to_halt(&mut pipeline);

    let m = pipeline.metrics();
    assert_eq!(m.bp_mispredictions, 1);
    assert_eq!(m.retired, 2);
}

#[test]
fn squashed_branch_is_never_resolved() {
    // BEQ#0 is guessed taken and jumps onto BNE#2; both the wrong-path BNE and
    // the HALT behind it are squashed when BEQ#0 resolves not-taken. The BNE
    // is predicted twice under different tags: the wrong-path occurrence is
    // withdrawn and only the correct-path one is updated.
    let program = ProgramBuilder::new()
        .beq(0, 0, 1)
        .nops(1)
        .bne(0, 0, 0)
        .halt()
        .build();

    let mut mock = MockPredictor::new();
    let beq = BranchTag::new(0, 0);
    let wrong_path_bne = BranchTag::new(2, 1);
    let bne = BranchTag::new(2, 2);
    let _ = mock.expect_predict().with(eq(beq)).times(1).return_const(true);
    let _ = mock
        .expect_predict()
        .with(eq(wrong_path_bne))
        .times(1)
        .return_const(false);
    let _ = mock.expect_predict().with(eq(bne)).times(1).return_const(false);
    let _ = mock
        .expect_withdraw()
        .with(eq(wrong_path_bne))
        .times(1)
        .return_const(());
    let _ = mock
        .expect_update()
        .with(eq(beq), eq(false))
        .times(1)
        .return_const(());
    let _ = mock
        .expect_update()
        .with(eq(bne), eq(false))
        .times(1)
        .return_const(());

    let bp: &mut dyn BranchPredictor = &mut mock;
    let mut pipeline = Pipeline::new(&program, true, Some(bp));
    run_to_halt(&mut pipeline);

    let m = pipeline.metrics();
    assert_eq!(m.bp_predictions, 2);
    assert_eq!(m.bp_mispredictions, 1);
    assert_eq!(pipeline.in_flight_predictions(), 0);
}
