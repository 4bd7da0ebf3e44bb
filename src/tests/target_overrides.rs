use super::*;

#[test]
fn change_with_value_override_updates_value_and_fires_once() -> Result<()> {
    let mut h = Harness::from_html("<input id='field'>")?;
    let count = Rc::new(Cell::new(0u32));

    h.add_event_listener("#field", "change", false, counting_listener(&count))?;
    h.fire_event("#field", "change", EventInit::value("a"))?;

    assert_eq!(count.get(), 1);
    assert_eq!(h.value("#field")?, "a");
    Ok(())
}

#[test]
fn value_override_without_value_setter_reports_the_fixed_message() -> Result<()> {
    let mut h = Harness::from_html("<div id='box'></div>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#box", "change", false, counting_listener(&count))?;

    let err = h
        .fire_event("#box", "change", EventInit::value("a"))
        .expect_err("a div has no value setter");
    assert_eq!(err, Error::NoValueSetter);
    assert_eq!(
        err.to_string(),
        "The given element does not have a value setter"
    );
    // The override fails before any listener runs.
    assert_eq!(count.get(), 0);
    Ok(())
}

#[test]
fn files_override_sets_the_files_property() -> Result<()> {
    let mut h = Harness::from_html("<input id='upload' type='file'>")?;
    let count = Rc::new(Cell::new(0u32));
    h.add_event_listener("#upload", "change", false, counting_listener(&count))?;

    let file = FileData::new("notes.txt", "text/plain", b"hello");
    h.fire_event("#upload", "change", EventInit::files(vec![file.clone()]))?;

    assert_eq!(count.get(), 1);
    assert_eq!(h.files("#upload")?, vec![file]);
    Ok(())
}

#[test]
fn checked_override_sets_the_checked_property() -> Result<()> {
    let mut h = Harness::from_html("<input id='flag' type='checkbox'>")?;
    h.fire_event("#flag", "change", EventInit::checked(true))?;
    assert!(h.checked("#flag")?);
    Ok(())
}

#[test]
fn select_value_override_marks_the_matching_option() -> Result<()> {
    let mut h = Harness::from_html(
        r#"
        <select id='pick'>
          <option id='opt-a' value='a'>A</option>
          <option id='opt-b' value='b'>B</option>
        </select>
        "#,
    )?;
    assert_eq!(h.value("#pick")?, "a");

    h.fire_event("#pick", "change", EventInit::value("b"))?;
    assert_eq!(h.value("#pick")?, "b");
    assert_eq!(h.attr("#opt-b", "selected")?, Some("true".to_string()));
    assert_eq!(h.attr("#opt-a", "selected")?, None);
    Ok(())
}

#[test]
fn textarea_value_initializes_from_text_and_accepts_overrides() -> Result<()> {
    let mut h = Harness::from_html("<textarea id='note'>draft</textarea>")?;
    assert_eq!(h.value("#note")?, "draft");

    h.fire_event("#note", "change", EventInit::value("final"))?;
    assert_eq!(h.value("#note")?, "final");
    Ok(())
}

#[test]
fn option_without_value_attr_uses_its_text() -> Result<()> {
    let h = Harness::from_html(
        "<select id='pick'><option id='opt'>plain</option></select>",
    )?;
    assert_eq!(h.value("#pick")?, "plain");
    Ok(())
}
