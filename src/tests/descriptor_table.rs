use super::*;

use crate::event_table::{EVENT_TABLE, descriptor};

#[test]
fn every_descriptor_name_reaches_exactly_one_listener() -> Result<()> {
    for entry in EVENT_TABLE {
        let mut h = Harness::from_html(
            r#"
            <form id='form'><input id='field'></form>
            <video id='media'></video>
            <div id='box'></div>
            "#,
        )?;

        let selector = match entry.kind {
            EventKind::Media => "#media",
            EventKind::Form if matches!(entry.native_type, "submit" | "reset") => "#form",
            EventKind::Form
            | EventKind::Input
            | EventKind::Composition
            | EventKind::Keyboard
            | EventKind::Focus
            | EventKind::Clipboard => "#field",
            _ => "#box",
        };

        let count = Rc::new(Cell::new(0u32));
        h.add_event_listener(selector, entry.native_type, false, counting_listener(&count))?;
        h.fire_event(selector, entry.name, EventInit::default())?;
        assert_eq!(
            count.get(),
            1,
            "firing {} should invoke the {} listener exactly once",
            entry.name,
            entry.native_type
        );
    }
    Ok(())
}

#[test]
fn double_click_aliases_deliver_native_dblclick() -> Result<()> {
    let mut h = Harness::from_html("<button id='btn'>go</button>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#btn", "dblclick", false, counting_listener(&count))?;

    h.fire_event("#btn", "dblClick", EventInit::default())?;
    assert_eq!(count.get(), 1);

    h.fire_event("#btn", "doubleClick", EventInit::default())?;
    assert_eq!(count.get(), 2);
    Ok(())
}

#[test]
fn unknown_event_name_fails_fast() -> Result<()> {
    let mut h = Harness::from_html("<div id='box'></div>")?;
    match h.fire_event("#box", "explode", EventInit::default()) {
        Err(Error::UnknownEventName(name)) => assert_eq!(name, "explode"),
        other => panic!("expected unknown event name error, got: {other:?}"),
    }
    Ok(())
}

#[test]
fn descriptor_names_are_case_sensitive() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    // The table key is keyDown; the native lowercase spelling is not a key.
    assert!(matches!(
        h.fire_event("#field", "keydown", EventInit::default()),
        Err(Error::UnknownEventName(_))
    ));
    assert!(h.fire_event("#field", "keyDown", EventInit::default())?);
    Ok(())
}

#[test]
fn descriptor_names_are_unique_and_native_types_lowercase() {
    let mut seen = HashSet::new();
    for entry in EVENT_TABLE {
        assert!(seen.insert(entry.name), "duplicate descriptor: {}", entry.name);
        assert_eq!(
            entry.native_type,
            entry.native_type.to_ascii_lowercase(),
            "native type for {} must be lowercase",
            entry.name
        );
    }
}

#[test]
fn bubbling_defaults_follow_native_semantics() {
    let focus = descriptor("focus").expect("focus descriptor");
    assert!(!focus.bubbles);
    assert!(!focus.cancelable);

    let focus_in = descriptor("focusIn").expect("focusIn descriptor");
    assert!(focus_in.bubbles);

    let change = descriptor("change").expect("change descriptor");
    assert!(change.bubbles);
    assert!(!change.cancelable);

    let click = descriptor("click").expect("click descriptor");
    assert!(click.bubbles);
    assert!(click.cancelable);

    let mouse_enter = descriptor("mouseEnter").expect("mouseEnter descriptor");
    assert!(!mouse_enter.bubbles);
}
