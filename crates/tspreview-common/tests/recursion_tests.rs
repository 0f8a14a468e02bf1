use super::*;

// ===================================================================
// RecursionProfile tests
// ===================================================================

#[test]
fn profile_type_resolution_limits() {
    let p = RecursionProfile::TypeResolution;
    assert_eq!(p.max_depth(), 64);
    assert_eq!(p.max_iterations(), 50_000);
}

#[test]
fn profile_value_synthesis_limits() {
    let p = RecursionProfile::ValueSynthesis;
    assert_eq!(p.max_depth(), 32);
    assert_eq!(p.max_iterations(), 20_000);
}

#[test]
fn profile_custom_limits() {
    let p = RecursionProfile::Custom {
        max_depth: 7,
        max_iterations: 42,
    };
    assert_eq!(p.max_depth(), 7);
    assert_eq!(p.max_iterations(), 42);
}

// ===================================================================
// RecursionGuard tests
// ===================================================================

#[test]
fn enter_and_leave_tracks_depth() {
    let mut guard = RecursionGuard::<String>::with_profile(RecursionProfile::TypeResolution);
    assert_eq!(guard.enter("Tree".to_string()), RecursionResult::Entered);
    assert_eq!(guard.depth(), 1);
    assert!(guard.is_visiting(&"Tree".to_string()));
    guard.leave(&"Tree".to_string());
    assert_eq!(guard.depth(), 0);
    assert!(!guard.is_visiting(&"Tree".to_string()));
}

#[test]
fn reentering_a_visiting_key_is_a_cycle() {
    let mut guard = RecursionGuard::<&str>::new(10, 100);
    assert!(guard.enter("Node").is_entered());
    assert!(guard.enter("Node").is_cycle());
    // A cycle does not consume depth and is not an "exceeded" condition.
    assert_eq!(guard.depth(), 1);
    assert!(!guard.is_exceeded());
    guard.leave(&"Node");
}

#[test]
fn depth_limit_is_reported_and_sticky() {
    let mut guard = RecursionGuard::<u32>::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    assert!(guard.is_exceeded());
    guard.leave(&2);
    guard.leave(&1);
    assert!(guard.is_exceeded());
    guard.reset();
    assert!(!guard.is_exceeded());
}

#[test]
fn iteration_limit_bounds_total_work() {
    let mut guard = RecursionGuard::<u32>::new(10, 3);
    for key in 0..3 {
        assert!(guard.enter(key).is_entered());
        guard.leave(&key);
    }
    assert_eq!(guard.enter(99), RecursionResult::IterationExceeded);
    assert!(guard.enter(100).is_exceeded());
}

// ===================================================================
// DepthCounter tests
// ===================================================================

#[test]
fn depth_counter_refuses_past_limit() {
    let mut counter = DepthCounter::new(1);
    assert!(counter.enter());
    assert!(!counter.enter());
    assert!(counter.is_exceeded());
    counter.leave();
    assert_eq!(counter.depth(), 0);
}
