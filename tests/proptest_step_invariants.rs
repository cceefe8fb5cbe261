//! Property-based invariant tests for the step progress bar.
//!
//! 1. After any sequence of mutations the steps are sorted and unique.
//! 2. Every step position lies in 0..=100.
//! 3. `percent_of` is pure.
//! 4. At most one step is the next step, and it is the nearest above the
//!    current value.
//! 5. Every rendered step has exactly three live nodes, nothing else leaks.

use proptest::prelude::*;
use step_progress::memory::MemorySurface;
use step_progress::percent::percent_of;
use step_progress::progressbar::{new, with_current_value, with_steps, Model};
use step_progress::step::Step;

#[derive(Debug, Clone)]
enum Op {
    Add(i32),
    Remove(i32),
    SetCurrent(Option<i32>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-20i32..=20).prop_map(Op::Add),
        (-20i32..=20).prop_map(Op::Remove),
        proptest::option::of(-25i32..=25).prop_map(Op::SetCurrent),
    ]
}

fn build(initial: &[i32], current: Option<i32>) -> Model<MemorySurface> {
    new(
        MemorySurface::new(),
        &[
            with_steps(initial.iter().map(|v| Step::new(f64::from(*v))).collect()),
            with_current_value(current.map(f64::from)),
        ],
    )
    .expect("finite values")
}

fn apply(bar: &mut Model<MemorySurface>, op: &Op) {
    match op {
        Op::Add(v) => bar.add_step(Step::new(f64::from(*v))).expect("finite"),
        Op::Remove(v) => {
            bar.remove_step(f64::from(*v));
        }
        Op::SetCurrent(v) => bar.set_current_value(v.map(f64::from)).expect("finite"),
    }
}

fn opt_f64() -> impl Strategy<Value = Option<f64>> {
    proptest::option::of(-1.0e6f64..1.0e6)
}

proptest! {
    #[test]
    fn steps_sorted_and_unique(
        initial in proptest::collection::vec(-20i32..=20, 0..12),
        current in proptest::option::of(-25i32..=25),
        ops in proptest::collection::vec(op_strategy(), 0..20),
    ) {
        let mut bar = build(&initial, current);
        for op in &ops {
            apply(&mut bar, op);
            let values: Vec<f64> = bar.steps().iter().map(Step::value).collect();
            prop_assert!(
                values.windows(2).all(|w| w[0] < w[1]),
                "not strictly ascending: {:?}", values
            );
        }
    }

    #[test]
    fn step_positions_in_range(
        initial in proptest::collection::vec(-1000i32..=1000, 1..12),
        current in proptest::option::of(-2000i32..=2000),
    ) {
        let bar = build(&initial, current);
        for step in bar.steps() {
            let percent = step.progress_percent();
            prop_assert!(percent.is_some());
            let percent = percent.unwrap_or_default();
            prop_assert!((0.0..=100.0).contains(&percent), "{}", percent);
        }
        let bar_percent = bar.bar_percent();
        prop_assert!((0.0..=100.0).contains(&bar_percent));
    }

    #[test]
    fn percent_of_is_pure(value in opt_f64(), min in opt_f64(), max in opt_f64()) {
        prop_assert_eq!(percent_of(value, min, max), percent_of(value, min, max));
    }

    #[test]
    fn single_nearest_next_step(
        initial in proptest::collection::vec(-20i32..=20, 0..12),
        current in -25i32..=25,
    ) {
        let bar = build(&initial, Some(current));
        let flagged: Vec<f64> = bar
            .steps()
            .iter()
            .filter(|s| s.is_next_step())
            .map(Step::value)
            .collect();
        let expected = bar
            .steps()
            .iter()
            .map(Step::value)
            .find(|v| *v > f64::from(current));
        prop_assert_eq!(flagged.first().copied(), expected);
        prop_assert!(flagged.len() <= 1);
    }

    #[test]
    fn nodes_track_steps(
        initial in proptest::collection::vec(-20i32..=20, 0..12),
        ops in proptest::collection::vec(op_strategy(), 0..20),
    ) {
        let mut bar = build(&initial, Some(0));
        for op in &ops {
            apply(&mut bar, op);
        }
        let surface = bar.surface();
        // One bar fill plus three nodes per step.
        prop_assert_eq!(surface.live_count(), 1 + 3 * bar.steps().len());
        for step in bar.steps() {
            for handle in step.handles().attached() {
                prop_assert!(surface.node(handle).is_some());
                prop_assert_eq!(surface.removal_count(handle), 0);
            }
        }
    }
}
