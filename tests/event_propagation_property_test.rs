use std::cell::RefCell;
use std::rc::Rc;

use headless_dom::{Event, EventCallback, EventInit, EventPhase, Harness, NodeId};
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const PROPAGATION_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/event_propagation_property_test.txt";
const DEFAULT_PROPAGATION_PROPTEST_CASES: u32 = 128;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListenerAction {
    Record,
    PreventDefault,
    StopPropagation,
    StopImmediatePropagation,
}

#[derive(Clone, Debug)]
struct ListenerPlan {
    capture: bool,
    action: ListenerAction,
}

#[derive(Clone, Debug)]
struct Scenario {
    /// Listeners per chain element, outermost first.
    chain: Vec<Vec<ListenerPlan>>,
    target_depth: usize,
    bubbles: bool,
    cancelable: bool,
}

#[derive(Clone, Copy, Debug)]
enum LegacyOp {
    SetReturnValue(bool),
    PreventDefault,
    SetCancelBubble(bool),
    StopPropagation,
}

fn env_proptest_cases(var_name: &str, default_cases: u32) -> u32 {
    std::env::var(var_name)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default_cases)
}

fn propagation_proptest_cases() -> u32 {
    std::env::var("HEADLESS_DOM_PROPAGATION_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or_else(|| {
            env_proptest_cases(
                "HEADLESS_DOM_PROPTEST_CASES",
                DEFAULT_PROPAGATION_PROPTEST_CASES,
            )
        })
}

fn listener_plan_strategy() -> BoxedStrategy<ListenerPlan> {
    let action = prop_oneof![
        6 => Just(ListenerAction::Record),
        2 => Just(ListenerAction::PreventDefault),
        1 => Just(ListenerAction::StopPropagation),
        1 => Just(ListenerAction::StopImmediatePropagation),
    ];
    (any::<bool>(), action)
        .prop_map(|(capture, action)| ListenerPlan { capture, action })
        .boxed()
}

fn scenario_strategy() -> BoxedStrategy<Scenario> {
    vec(vec(listener_plan_strategy(), 0..=3), 1..=6)
        .prop_flat_map(|chain| {
            let depth = chain.len();
            (Just(chain), 0..depth, any::<bool>(), any::<bool>())
        })
        .prop_map(|(chain, target_depth, bubbles, cancelable)| Scenario {
            chain,
            target_depth,
            bubbles,
            cancelable,
        })
        .boxed()
}

fn legacy_ops_strategy() -> BoxedStrategy<Vec<LegacyOp>> {
    vec(
        prop_oneof![
            any::<bool>().prop_map(LegacyOp::SetReturnValue),
            Just(LegacyOp::PreventDefault),
            any::<bool>().prop_map(LegacyOp::SetCancelBubble),
            Just(LegacyOp::StopPropagation),
        ],
        0..=12,
    )
    .boxed()
}

fn chain_html(depth: usize) -> String {
    let mut html = String::new();
    for index in 0..depth {
        html.push_str(&format!("<div id='n{index}'>"));
    }
    for _ in 0..depth {
        html.push_str("</div>");
    }
    html
}

fn phase_label(phase: EventPhase) -> &'static str {
    match phase {
        EventPhase::Capturing => "capturing",
        EventPhase::AtTarget => "at_target",
        EventPhase::Bubbling => "bubbling",
        EventPhase::None => "none",
    }
}

/// Reference walk: returns the expected log and whether the event ends up
/// not cancelled.
fn expected_walk(scenario: &Scenario) -> (Vec<String>, bool) {
    let target = scenario.target_depth;
    let mut plan = Vec::new();
    for depth in 0..target {
        plan.push((depth, EventPhase::Capturing));
    }
    plan.push((target, EventPhase::AtTarget));
    if scenario.bubbles {
        for depth in (0..target).rev() {
            plan.push((depth, EventPhase::Bubbling));
        }
    }

    let mut log = Vec::new();
    let mut stopped = false;
    let mut prevented = false;
    for (depth, phase) in plan {
        if stopped {
            break;
        }
        for (slot, plan) in scenario.chain[depth].iter().enumerate() {
            let runs = match phase {
                EventPhase::Capturing => plan.capture,
                EventPhase::Bubbling => !plan.capture,
                EventPhase::AtTarget => true,
                EventPhase::None => false,
            };
            if !runs {
                continue;
            }
            log.push(format!("n{depth}.{slot}:{}", phase_label(phase)));
            match plan.action {
                ListenerAction::Record => {}
                ListenerAction::PreventDefault => prevented |= scenario.cancelable,
                ListenerAction::StopPropagation => stopped = true,
                ListenerAction::StopImmediatePropagation => {
                    stopped = true;
                    break;
                }
            }
        }
    }
    (log, !prevented)
}

fn fail(err: headless_dom::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn assert_walk_matches_model(scenario: &Scenario) -> TestCaseResult {
    let mut harness = Harness::from_html(&chain_html(scenario.chain.len())).map_err(fail)?;
    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let mut nodes: Vec<NodeId> = Vec::new();

    for (depth, listeners) in scenario.chain.iter().enumerate() {
        let node = harness.by_id(&format!("n{depth}")).map_err(fail)?;
        nodes.push(node);
        for (slot, plan) in listeners.iter().enumerate() {
            let log = Rc::clone(&log);
            let action = plan.action;
            let label = format!("n{depth}.{slot}");
            let callback = EventCallback::new(move |_h, event, _this| {
                log.borrow_mut()
                    .push(format!("{label}:{}", phase_label(event.phase())));
                match action {
                    ListenerAction::Record => {}
                    ListenerAction::PreventDefault => event.prevent_default(),
                    ListenerAction::StopPropagation => event.stop_propagation(),
                    ListenerAction::StopImmediatePropagation => event.stop_immediate_propagation(),
                }
                Ok(())
            });
            harness
                .add_event_listener(node, "signal", callback, plan.capture)
                .map_err(fail)?;
        }
    }

    let mut event = Event::new(
        "signal",
        EventInit {
            bubbles: scenario.bubbles,
            cancelable: scenario.cancelable,
            composed: false,
        },
    );
    let target = nodes[scenario.target_depth];
    let not_cancelled = harness.dispatch_event(target, &mut event).map_err(fail)?;

    let (expected_log, expected_not_cancelled) = expected_walk(scenario);
    prop_assert_eq!(log.borrow().clone(), expected_log, "scenario={:?}", scenario);
    prop_assert_eq!(not_cancelled, expected_not_cancelled);
    prop_assert_eq!(event.default_prevented(), !expected_not_cancelled);
    prop_assert_eq!(event.phase(), EventPhase::None);
    prop_assert_eq!(event.current_target(), None);
    prop_assert_eq!(event.target(), Some(target));
    prop_assert!(!event.propagation_stopped());
    prop_assert!(harness.take_handler_errors().is_empty());
    Ok(())
}

fn assert_legacy_views_agree(cancelable: bool, ops: &[LegacyOp]) -> TestCaseResult {
    let mut event = Event::new(
        "signal",
        EventInit {
            bubbles: true,
            cancelable,
            composed: false,
        },
    );
    let mut prevented = false;
    let mut stopped = false;
    for op in ops {
        match op {
            LegacyOp::SetReturnValue(value) => {
                event.set_return_value(*value);
                prevented |= !value && cancelable;
            }
            LegacyOp::PreventDefault => {
                event.prevent_default();
                prevented |= cancelable;
            }
            LegacyOp::SetCancelBubble(value) => {
                event.set_cancel_bubble(*value);
                stopped |= *value;
            }
            LegacyOp::StopPropagation => {
                event.stop_propagation();
                stopped = true;
            }
        }
        prop_assert_eq!(event.default_prevented(), prevented, "ops={:?}", ops);
        prop_assert_eq!(event.return_value(), !prevented);
        prop_assert_eq!(event.cancel_bubble(), stopped);
        prop_assert_eq!(event.propagation_stopped(), stopped);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: propagation_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(PROPAGATION_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn dispatch_order_and_stops_match_reference_walk(scenario in scenario_strategy()) {
        assert_walk_matches_model(&scenario)?;
    }

    #[test]
    fn legacy_return_value_and_cancel_bubble_track_canonical_flags(
        cancelable in any::<bool>(),
        ops in legacy_ops_strategy(),
    ) {
        assert_legacy_views_agree(cancelable, &ops)?;
    }
}
