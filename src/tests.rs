use super::*;

use std::cell::Cell;

mod descriptor_table;
mod harness_actions;
mod target_overrides;

fn counting_listener(count: &Rc<Cell<u32>>) -> impl FnMut(&mut FiredEvent) + 'static {
    let count = Rc::clone(count);
    move |_event| count.set(count.get() + 1)
}

fn recording_listener(
    log: &Rc<RefCell<Vec<String>>>,
    label: &str,
) -> impl FnMut(&mut FiredEvent) + 'static {
    let log = Rc::clone(log);
    let label = label.to_string();
    move |_event| log.borrow_mut().push(label.clone())
}

fn type_recording_listener(
    log: &Rc<RefCell<Vec<String>>>,
) -> impl FnMut(&mut FiredEvent) + 'static {
    let log = Rc::clone(log);
    move |event: &mut FiredEvent| log.borrow_mut().push(event.event_type().to_string())
}
