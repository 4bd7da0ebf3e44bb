use super::*;

#[test]
fn type_text_sets_the_value_and_fires_input() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    let count = Rc::new(Cell::new(0u32));

    h.add_event_listener("#field", "input", false, counting_listener(&count))?;
    h.type_text("#field", "hello")?;

    assert_eq!(h.value("#field")?, "hello");
    assert_eq!(count.get(), 1);
    Ok(())
}

#[test]
fn type_text_is_ignored_on_disabled_and_readonly_controls() -> Result<()> {
    let mut h = Harness::from_html(
        "<input id='off' value='keep' disabled><input id='ro' value='keep' readonly>",
    )?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#off", "input", false, counting_listener(&count))?;
    h.add_event_listener("#ro", "input", false, counting_listener(&count))?;

    h.type_text("#off", "nope")?;
    h.type_text("#ro", "nope")?;

    assert_eq!(h.value("#off")?, "keep");
    assert_eq!(h.value("#ro")?, "keep");
    assert_eq!(count.get(), 0);
    Ok(())
}

#[test]
fn type_text_rejects_non_text_controls() -> Result<()> {
    let mut h = Harness::from_html("<div id='box'></div>")?;
    match h.type_text("#box", "hello") {
        Err(Error::TypeMismatch { actual, .. }) => assert_eq!(actual, "div"),
        other => panic!("expected type mismatch, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn set_checked_fires_input_and_change_once_per_transition() -> Result<()> {
    let mut h = Harness::from_html("<input id='flag' type='checkbox'>")?;
    let change_count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#flag", "change", false, counting_listener(&change_count))?;

    h.set_checked("#flag", true)?;
    assert!(h.checked("#flag")?);
    assert_eq!(change_count.get(), 1);

    // Already checked, no transition, no events.
    h.set_checked("#flag", true)?;
    assert_eq!(change_count.get(), 1);

    h.set_checked("#flag", false)?;
    assert!(!h.checked("#flag")?);
    assert_eq!(change_count.get(), 2);
    Ok(())
}

#[test]
fn set_checked_rejects_text_inputs() -> Result<()> {
    let mut h = Harness::from_html("<input id='field' type='text'>")?;
    assert!(matches!(
        h.set_checked("#field", true),
        Err(Error::TypeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn set_checked_on_a_radio_unchecks_its_group() -> Result<()> {
    let mut h = Harness::from_html(
        r#"
        <form>
          <input id='a' type='radio' name='pick' checked>
          <input id='b' type='radio' name='pick'>
        </form>
        "#,
    )?;

    h.set_checked("#b", true)?;
    assert!(h.checked("#b")?);
    assert!(!h.checked("#a")?);
    Ok(())
}

#[test]
fn focus_and_blur_fire_their_event_pairs_in_order() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    let log = Rc::new(RefCell::new(Vec::new()));

    h.add_event_listener("#field", "focusin", false, type_recording_listener(&log))?;
    h.add_event_listener("#field", "focus", false, type_recording_listener(&log))?;
    h.add_event_listener("#field", "focusout", false, type_recording_listener(&log))?;
    h.add_event_listener("#field", "blur", false, type_recording_listener(&log))?;

    h.focus("#field")?;
    assert_eq!(*log.borrow(), ["focusin", "focus"]);

    h.blur("#field")?;
    assert_eq!(*log.borrow(), ["focusin", "focus", "focusout", "blur"]);
    Ok(())
}

#[test]
fn refocusing_the_active_element_fires_nothing() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#field", "focus", false, counting_listener(&count))?;

    h.focus("#field")?;
    h.focus("#field")?;
    assert_eq!(count.get(), 1);
    Ok(())
}

#[test]
fn focusing_another_element_blurs_the_previous_one() -> Result<()> {
    let mut h = Harness::from_html("<input id='a'><input id='b'>")?;
    let log = Rc::new(RefCell::new(Vec::new()));

    h.add_event_listener("#a", "blur", false, recording_listener(&log, "a-blur"))?;
    h.add_event_listener("#b", "focus", false, recording_listener(&log, "b-focus"))?;

    h.focus("#a")?;
    h.focus("#b")?;
    assert_eq!(*log.borrow(), ["a-blur", "b-focus"]);
    Ok(())
}

#[test]
fn focus_is_ignored_on_disabled_controls() -> Result<()> {
    let mut h = Harness::from_html("<input id='field' disabled>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#field", "focus", false, counting_listener(&count))?;

    h.focus("#field")?;
    assert_eq!(count.get(), 0);
    Ok(())
}

#[test]
fn blur_on_an_unfocused_element_fires_nothing() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#field", "blur", false, counting_listener(&count))?;

    h.blur("#field")?;
    assert_eq!(count.get(), 0);
    Ok(())
}

#[test]
fn submit_resolves_the_owning_form_from_a_control() -> Result<()> {
    let mut h = Harness::from_html(
        "<form id='form'><input id='field' name='q'></form>",
    )?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#form", "submit", false, counting_listener(&count))?;

    h.submit("#field")?;
    assert_eq!(count.get(), 1);

    h.submit("#form")?;
    assert_eq!(count.get(), 2);
    Ok(())
}

#[test]
fn click_helper_runs_the_full_click_path() -> Result<()> {
    let mut h = Harness::from_html("<input id='flag' type='checkbox'>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#flag", "click", false, counting_listener(&count))?;

    h.click("#flag")?;
    assert_eq!(count.get(), 1);
    assert!(h.checked("#flag")?);
    Ok(())
}

#[test]
fn trace_records_event_lines_when_enabled() -> Result<()> {
    let mut h = Harness::from_html("<button id='btn'>go</button>")?;
    h.enable_trace(true);
    h.set_trace_stderr(false);

    h.add_event_listener("#btn", "click", false, |_event| {})?;
    h.fire_event("#btn", "click", EventInit::default())?;

    let logs = h.take_trace_logs();
    assert!(!logs.is_empty());
    assert!(logs.iter().all(|line| line.starts_with("[event]")));
    assert!(logs.iter().any(|line| line.contains("click")));
    assert!(logs.iter().any(|line| line.contains("outcome=completed")));

    // Logs are drained on take.
    assert!(h.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_log_limit_keeps_only_the_newest_entries() -> Result<()> {
    let mut h = Harness::from_html("<button id='btn'>go</button>")?;
    h.enable_trace(true);
    h.set_trace_stderr(false);
    h.set_trace_log_limit(3)?;

    for _ in 0..5 {
        h.fire_event("#btn", "click", EventInit::default())?;
    }
    assert_eq!(h.take_trace_logs().len(), 3);

    assert!(h.set_trace_log_limit(0).is_err());
    Ok(())
}
