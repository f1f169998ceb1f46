use super::*;

const NESTED_HTML: &str = r#"
    <div id='outer'>
      <div id='inner'>
        <span id='leaf'>x</span>
      </div>
    </div>
    "#;

fn nested() -> Result<(Harness, NodeId, NodeId, NodeId)> {
    let h = Harness::from_html(NESTED_HTML)?;
    let outer = h.by_id("outer")?;
    let inner = h.by_id("inner")?;
    let leaf = h.by_id("leaf")?;
    Ok((h, outer, inner, leaf))
}

#[test]
fn capture_target_bubble_order_matches_fixed_trace() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    h.add_event_listener(outer, "ping", recorder(&log, "outer-b"), false)?;
    h.add_event_listener(outer, "ping", recorder(&log, "outer-c"), true)?;
    h.add_event_listener(inner, "ping", recorder(&log, "inner-b"), false)?;
    h.add_event_listener(inner, "ping", recorder(&log, "inner-c"), true)?;
    h.add_event_listener(leaf, "ping", recorder(&log, "leaf-b"), false)?;
    h.add_event_listener(leaf, "ping", recorder(&log, "leaf-c"), true)?;

    let mut event = Event::new("ping", EventInit::bubbling_cancelable());
    assert!(h.dispatch_event(leaf, &mut event)?);

    assert_eq!(
        entries(&log),
        vec![
            "outer-c:capturing",
            "inner-c:capturing",
            "leaf-b:at_target",
            "leaf-c:at_target",
            "inner-b:bubbling",
            "outer-b:bubbling",
        ]
    );
    Ok(())
}

#[test]
fn non_bubbling_event_skips_bubbling_phase() -> Result<()> {
    let (mut h, outer, _inner, leaf) = nested()?;
    let log = new_log();
    h.add_event_listener(outer, "ping", recorder(&log, "outer-b"), false)?;
    h.add_event_listener(outer, "ping", recorder(&log, "outer-c"), true)?;
    h.add_event_listener(leaf, "ping", recorder(&log, "leaf-b"), false)?;

    let mut event = Event::new("ping", EventInit::default());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["outer-c:capturing", "leaf-b:at_target"]);
    Ok(())
}

#[test]
fn document_root_sees_capture_and_bubble() -> Result<()> {
    let (mut h, _outer, _inner, leaf) = nested()?;
    let log = new_log();
    let root = h.document();
    h.add_event_listener(root, "ping", recorder(&log, "doc-c"), true)?;
    h.add_event_listener(root, "ping", recorder(&log, "doc-b"), false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["doc-c:capturing", "doc-b:bubbling"]);
    Ok(())
}

#[test]
fn stop_propagation_lets_remaining_listeners_on_node_run() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let stopper = {
        let log = Rc::clone(&log);
        EventCallback::new(move |_h, event, _this| {
            log.borrow_mut().push("inner-stop".into());
            event.stop_propagation();
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", stopper, false)?;
    h.add_event_listener(inner, "ping", marker(&log, "inner-after"), false)?;
    h.add_event_listener(outer, "ping", marker(&log, "outer"), false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["inner-stop", "inner-after"]);
    Ok(())
}

#[test]
fn stop_immediate_propagation_also_skips_rest_of_node() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let stopper = {
        let log = Rc::clone(&log);
        EventCallback::new(move |_h, event, _this| {
            log.borrow_mut().push("inner-stop".into());
            event.stop_immediate_propagation();
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", stopper, false)?;
    h.add_event_listener(inner, "ping", marker(&log, "inner-after"), false)?;
    h.add_event_listener(outer, "ping", marker(&log, "outer"), false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["inner-stop"]);
    Ok(())
}

#[test]
fn stop_propagation_during_capture_skips_target_and_bubbling() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let stopper = {
        let log = Rc::clone(&log);
        EventCallback::new(move |_h, event, _this| {
            log.borrow_mut().push("outer-c".into());
            event.stop_propagation();
            Ok(())
        })
    };
    h.add_event_listener(outer, "ping", stopper, true)?;
    h.add_event_listener(inner, "ping", marker(&log, "inner-c"), true)?;
    h.add_event_listener(leaf, "ping", marker(&log, "leaf"), false)?;
    h.add_event_listener(outer, "ping", marker(&log, "outer-b"), false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["outer-c"]);
    Ok(())
}

#[test]
fn dispatch_resets_phase_and_current_target() -> Result<()> {
    let (mut h, _outer, inner, leaf) = nested()?;
    let seen = new_log();
    let logger = {
        let seen = Rc::clone(&seen);
        EventCallback::new(move |h, event, this| {
            seen.borrow_mut().push(format!(
                "{}|{}|{}",
                id_of(h, event.target()),
                id_of(h, event.current_target()),
                id_of(h, Some(this))
            ));
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", logger, false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&seen), vec!["leaf|inner|inner"]);
    assert_eq!(event.phase(), EventPhase::None);
    assert_eq!(event.current_target(), None);
    assert_eq!(event.target(), Some(leaf));
    assert!(!event.is_dispatching());
    Ok(())
}

#[test]
fn listener_added_to_current_node_during_dispatch_waits_for_next_walk() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let late_inner = marker(&log, "late-inner");
    let late_outer = marker(&log, "late-outer");
    let adder = {
        let log = Rc::clone(&log);
        EventCallback::new(move |h, _event, this| {
            log.borrow_mut().push("adder".into());
            h.add_event_listener(this, "ping", late_inner.clone(), false)?;
            h.add_event_listener(outer, "ping", late_outer.clone(), false)?;
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", adder, false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;
    assert_eq!(entries(&log), vec!["adder", "late-outer"]);

    let mut again = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut again)?;
    assert_eq!(
        entries(&log),
        vec!["adder", "late-outer", "adder", "late-inner", "late-outer"]
    );
    Ok(())
}

#[test]
fn listener_removed_during_dispatch_does_not_run() -> Result<()> {
    let (mut h, _outer, inner, leaf) = nested()?;
    let log = new_log();
    let victim = marker(&log, "victim");
    let remover = {
        let log = Rc::clone(&log);
        let victim = victim.clone();
        EventCallback::new(move |h, _event, this| {
            log.borrow_mut().push("remover".into());
            h.remove_event_listener(this, "ping", &victim, false);
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", remover, false)?;
    h.add_event_listener(inner, "ping", victim, false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["remover"]);
    Ok(())
}

#[test]
fn detaching_during_dispatch_keeps_fixed_path_but_lookups_see_live_tree() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let detacher = EventCallback::new(move |h, _event, _this| {
        h.dom_mut().remove_child(outer, inner)?;
        Ok(())
    });
    let observer = {
        let log = Rc::clone(&log);
        EventCallback::new(move |h, _event, _this| {
            log.borrow_mut().push(format!(
                "outer sees inner={} leaf_connected={}",
                h.dom().by_id("inner").is_some(),
                h.dom().is_connected(leaf)
            ));
            Ok(())
        })
    };
    h.add_event_listener(leaf, "ping", detacher, false)?;
    h.add_event_listener(outer, "ping", observer, false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(
        entries(&log),
        vec!["outer sees inner=false leaf_connected=false"]
    );
    assert!(h.take_handler_errors().is_empty());
    Ok(())
}

#[test]
fn nested_dispatch_completes_before_outer_walk_continues() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    let nested_trigger = {
        let log = Rc::clone(&log);
        EventCallback::new(move |h, _event, _this| {
            log.borrow_mut().push("inner-ping".into());
            let mut pong = Event::new("pong", EventInit::bubbling());
            h.dispatch_event(leaf, &mut pong)?;
            log.borrow_mut().push("inner-ping-after".into());
            Ok(())
        })
    };
    h.add_event_listener(inner, "ping", nested_trigger, false)?;
    h.add_event_listener(outer, "ping", marker(&log, "outer-ping"), false)?;
    h.add_event_listener(outer, "pong", marker(&log, "outer-pong"), false)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(
        entries(&log),
        vec!["inner-ping", "outer-pong", "inner-ping-after", "outer-ping"]
    );
    Ok(())
}

#[test]
fn detached_subtree_dispatches_along_its_own_path() -> Result<()> {
    let (mut h, outer, inner, leaf) = nested()?;
    let log = new_log();
    h.add_event_listener(inner, "ping", marker(&log, "inner"), false)?;
    h.add_event_listener(outer, "ping", marker(&log, "outer"), false)?;
    h.dom_mut().remove_node(inner)?;

    let mut event = Event::new("ping", EventInit::bubbling());
    h.dispatch_event(leaf, &mut event)?;

    assert_eq!(entries(&log), vec!["inner"]);
    Ok(())
}
