use super::*;

fn focus_logger(log: &Log) -> EventCallback {
    let log = Rc::clone(log);
    EventCallback::new(move |h, event, _this| {
        log.borrow_mut()
            .push(format!("{}:{}", id_of(h, event.target()), event.event_type()));
        Ok(())
    })
}

#[test]
fn moving_focus_blurs_previous_element_first() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'><input id='b'>")?;
    let a = h.by_id("a")?;
    let b = h.by_id("b")?;
    let root = h.document();
    let log = new_log();
    let logger = focus_logger(&log);
    for event_type in ["focus", "focusin", "blur", "focusout"] {
        h.add_event_listener(root, event_type, logger.clone(), true)?;
    }

    h.focus(a)?;
    h.focus(b)?;

    assert_eq!(
        entries(&log),
        vec![
            "a:focus",
            "a:focusin",
            "a:blur",
            "a:focusout",
            "b:focus",
            "b:focusin",
        ]
    );
    h.assert_focused(Some("b"))?;
    Ok(())
}

#[test]
fn focus_event_carries_previous_element_as_related_target() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'><input id='b'>")?;
    let a = h.by_id("a")?;
    let b = h.by_id("b")?;
    let log = new_log();
    let logger = {
        let log = Rc::clone(&log);
        EventCallback::new(move |h, event, _this| {
            log.borrow_mut().push(format!(
                "related={} bubbles={}",
                id_of(h, event.detail().related_target),
                event.bubbles()
            ));
            Ok(())
        })
    };
    h.add_event_listener(b, "focus", logger, false)?;

    h.focus(a)?;
    h.focus(b)?;

    assert_eq!(entries(&log), vec!["related=a bubbles=false"]);
    Ok(())
}

#[test]
fn focusing_the_focused_element_again_fires_nothing() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'>")?;
    let a = h.by_id("a")?;
    let log = new_log();
    h.add_event_listener(a, "focus", marker(&log, "focus"), false)?;

    h.focus(a)?;
    h.focus(a)?;

    assert_eq!(entries(&log), vec!["focus"]);
    Ok(())
}

#[test]
fn unfocusable_elements_are_ignored() -> Result<()> {
    let mut h = Harness::from_html(
        r#"
        <input id='off' disabled>
        <input id='secret' type='hidden'>
        <div id='plain'>text</div>
        <div id='tabbable' tabindex='0'>tab</div>
        <a id='bare'>bare</a>
        <fieldset disabled><button id='nested'>x</button></fieldset>
        "#,
    )?;
    for id in ["off", "secret", "plain", "bare", "nested"] {
        let node = h.by_id(id)?;
        h.focus(node)?;
        h.assert_focused(None)?;
    }
    let tabbable = h.by_id("tabbable")?;
    h.focus(tabbable)?;
    h.assert_focused(Some("tabbable"))?;
    Ok(())
}

#[test]
fn detached_element_cannot_take_focus() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'>")?;
    let a = h.by_id("a")?;
    h.dom_mut().remove_node(a)?;
    h.focus(a)?;
    assert_eq!(h.focused(), None);
    Ok(())
}

#[test]
fn typed_value_fires_input_then_change_on_blur() -> Result<()> {
    let mut h = Harness::from_html("<input id='name' value='old'>")?;
    let name = h.by_id("name")?;
    let log = new_log();
    for event_type in ["input", "change", "blur"] {
        h.add_event_listener(name, event_type, marker(&log, event_type), false)?;
    }
    let data = new_log();
    let data_logger = {
        let data = Rc::clone(&data);
        EventCallback::new(move |_h, event, _this| {
            data.borrow_mut()
                .push(event.detail().data.clone().unwrap_or_default());
            Ok(())
        })
    };
    h.add_event_listener(name, "input", data_logger, false)?;

    h.type_text(name, "new")?;
    h.assert_focused(Some("name"))?;
    h.assert_value("name", "new")?;
    assert_eq!(entries(&log), vec!["input"]);

    h.blur(name)?;
    assert_eq!(entries(&log), vec!["input", "change", "blur"]);
    assert_eq!(entries(&data), vec!["new"]);
    h.assert_focused(None)?;
    Ok(())
}

#[test]
fn blur_without_value_change_skips_change() -> Result<()> {
    let mut h = Harness::from_html("<input id='name' value='same'>")?;
    let name = h.by_id("name")?;
    let log = new_log();
    h.add_event_listener(name, "change", marker(&log, "change"), false)?;

    h.type_text(name, "other")?;
    h.type_text(name, "same")?;
    h.blur(name)?;

    assert!(entries(&log).is_empty());
    Ok(())
}

#[test]
fn type_text_rejects_non_text_controls_and_skips_readonly() -> Result<()> {
    let mut h = Harness::from_html(
        "<input id='cb' type='checkbox'><input id='ro' value='fixed' readonly><textarea id='ta'></textarea>",
    )?;
    let cb = h.by_id("cb")?;
    let ro = h.by_id("ro")?;
    let ta = h.by_id("ta")?;

    assert!(matches!(
        h.type_text(cb, "x"),
        Err(Error::TypeMismatch { .. })
    ));
    h.type_text(ro, "changed")?;
    h.assert_value("ro", "fixed")?;
    h.type_text(ta, "multi\nline")?;
    h.assert_value("ta", "multi\nline")?;
    Ok(())
}

#[test]
fn enter_in_only_field_submits_form() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        "<form id='form' action='/search'><input id='q' name='q' value='rust'></form>",
    )?;
    let q = h.by_id("q")?;
    let log = new_log();
    for event_type in ["keydown", "keypress", "keyup"] {
        h.add_event_listener(q, event_type, marker(&log, event_type), false)?;
    }

    h.press_enter(q)?;

    assert_eq!(entries(&log), vec!["keydown", "keypress", "keyup"]);
    let navigations = h.take_navigations();
    assert_eq!(navigations.len(), 1);
    assert_eq!(navigations[0].url, "https://app.local/search?q=rust");
    Ok(())
}

#[test]
fn enter_with_two_fields_clicks_the_default_button() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        r#"
        <form id='form' action='/login'>
          <input id='user' name='user' value='ann'>
          <input id='pass' name='pass' type='password' value='pw'>
          <button type='button' id='other'>Other</button>
          <button id='go' name='go' value='1'>Go</button>
        </form>
        "#,
    )?;
    let user = h.by_id("user")?;
    let go = h.by_id("go")?;
    let log = new_log();
    h.add_event_listener(go, "click", marker(&log, "go clicked"), false)?;

    h.press_enter(user)?;

    assert_eq!(entries(&log), vec!["go clicked"]);
    let navigations = h.take_navigations();
    assert_eq!(navigations.len(), 1);
    assert_eq!(
        navigations[0].url,
        "https://app.local/login?user=ann&pass=pw&go=1"
    );
    Ok(())
}

#[test]
fn enter_with_two_fields_and_no_button_does_not_submit() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        "<form id='form' action='/x'><input id='a' name='a'><input id='b' name='b'></form>",
    )?;
    let a = h.by_id("a")?;
    h.press_enter(a)?;
    assert!(h.take_navigations().is_empty());
    Ok(())
}

#[test]
fn cancelled_keydown_suppresses_keypress_and_submission() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        "<form id='form' action='/search'><input id='q' name='q'></form>",
    )?;
    let q = h.by_id("q")?;
    let log = new_log();
    h.add_event_listener(
        q,
        "keydown",
        EventCallback::new(|_h, event, _this| {
            event.prevent_default();
            Ok(())
        }),
        false,
    )?;
    for event_type in ["keydown", "keypress", "keyup"] {
        h.add_event_listener(q, event_type, marker(&log, event_type), false)?;
    }

    h.press_enter(q)?;

    assert_eq!(entries(&log), vec!["keydown", "keyup"]);
    assert!(h.take_navigations().is_empty());
    Ok(())
}

#[test]
fn enter_on_link_follows_it() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        "<a id='link' href='/docs'>docs</a>",
    )?;
    h.set_mock_page("https://app.local/docs", "<h1 id='title'>Docs</h1>");
    let link = h.by_id("link")?;
    let log = new_log();
    let logger = {
        let log = Rc::clone(&log);
        EventCallback::new(move |_h, event, _this| {
            log.borrow_mut().push(format!(
                "{} key={} code={}",
                event.event_type(),
                event.detail().key.clone().unwrap_or_default(),
                event.detail().key_code
            ));
            Ok(())
        })
    };
    h.add_event_listener(link, "keydown", logger, false)?;

    h.press_enter(link)?;

    assert_eq!(entries(&log), vec!["keydown key=Enter code=13"]);
    assert_eq!(h.document_url(), "https://app.local/docs");
    h.assert_text("title", "Docs")?;
    h.assert_focused(None)?;
    Ok(())
}

#[test]
fn keypress_from_script_is_not_an_enter_activation() -> Result<()> {
    let mut h = Harness::from_html_with_url(
        "https://app.local/",
        "<form action='/search'><input id='q' name='q'></form>",
    )?;
    let q = h.by_id("q")?;
    let mut event = Event::new("keypress", EventInit::bubbling_cancelable());
    event.detail_mut().key = Some("Enter".into());
    h.dispatch_event(q, &mut event)?;
    assert!(h.take_navigations().is_empty());
    Ok(())
}
