use super::*;

/// Construction family of an event. Selects which detail payload the event
/// value carries; plain events carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Plain,
    Clipboard,
    Composition,
    Keyboard,
    Focus,
    Form,
    Input,
    Mouse,
    Drag,
    Pointer,
    Touch,
    Wheel,
    Media,
    Animation,
    Transition,
}

/// Static descriptor for one supported event name. `name` is the public,
/// case-sensitive camelCase key; `native_type` is the lowercase type the
/// event is delivered as and listeners are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EventDescriptor {
    pub(crate) name: &'static str,
    pub(crate) native_type: &'static str,
    pub(crate) kind: EventKind,
    pub(crate) bubbles: bool,
    pub(crate) cancelable: bool,
}

const fn entry(
    name: &'static str,
    native_type: &'static str,
    kind: EventKind,
    bubbles: bool,
    cancelable: bool,
) -> EventDescriptor {
    EventDescriptor {
        name,
        native_type,
        kind,
        bubbles,
        cancelable,
    }
}

pub(crate) const EVENT_TABLE: &[EventDescriptor] = &[
    // Clipboard.
    entry("copy", "copy", EventKind::Clipboard, true, true),
    entry("cut", "cut", EventKind::Clipboard, true, true),
    entry("paste", "paste", EventKind::Clipboard, true, true),
    // Composition.
    entry(
        "compositionStart",
        "compositionstart",
        EventKind::Composition,
        true,
        true,
    ),
    entry(
        "compositionUpdate",
        "compositionupdate",
        EventKind::Composition,
        true,
        false,
    ),
    entry(
        "compositionEnd",
        "compositionend",
        EventKind::Composition,
        true,
        false,
    ),
    // Keyboard.
    entry("keyDown", "keydown", EventKind::Keyboard, true, true),
    entry("keyPress", "keypress", EventKind::Keyboard, true, true),
    entry("keyUp", "keyup", EventKind::Keyboard, true, true),
    // Focus.
    entry("focus", "focus", EventKind::Focus, false, false),
    entry("blur", "blur", EventKind::Focus, false, false),
    entry("focusIn", "focusin", EventKind::Focus, true, false),
    entry("focusOut", "focusout", EventKind::Focus, true, false),
    // Forms.
    entry("change", "change", EventKind::Form, true, false),
    entry("input", "input", EventKind::Input, true, false),
    entry("invalid", "invalid", EventKind::Form, false, true),
    entry("submit", "submit", EventKind::Form, true, true),
    entry("reset", "reset", EventKind::Form, true, true),
    entry("select", "select", EventKind::Form, true, false),
    // Mouse.
    entry("click", "click", EventKind::Mouse, true, true),
    entry("contextMenu", "contextmenu", EventKind::Mouse, true, true),
    // Public double-click names alias the native dblclick type.
    entry("dblClick", "dblclick", EventKind::Mouse, true, true),
    entry("doubleClick", "dblclick", EventKind::Mouse, true, true),
    entry("mouseDown", "mousedown", EventKind::Mouse, true, true),
    entry("mouseEnter", "mouseenter", EventKind::Mouse, false, false),
    entry("mouseLeave", "mouseleave", EventKind::Mouse, false, false),
    entry("mouseMove", "mousemove", EventKind::Mouse, true, true),
    entry("mouseOut", "mouseout", EventKind::Mouse, true, true),
    entry("mouseOver", "mouseover", EventKind::Mouse, true, true),
    entry("mouseUp", "mouseup", EventKind::Mouse, true, true),
    // Drag and drop.
    entry("drag", "drag", EventKind::Drag, true, true),
    entry("dragEnd", "dragend", EventKind::Drag, true, false),
    entry("dragEnter", "dragenter", EventKind::Drag, true, true),
    entry("dragExit", "dragexit", EventKind::Drag, true, false),
    entry("dragLeave", "dragleave", EventKind::Drag, true, false),
    entry("dragOver", "dragover", EventKind::Drag, true, true),
    entry("dragStart", "dragstart", EventKind::Drag, true, true),
    entry("drop", "drop", EventKind::Drag, true, true),
    // Pointer.
    entry("pointerOver", "pointerover", EventKind::Pointer, true, true),
    entry("pointerEnter", "pointerenter", EventKind::Pointer, false, false),
    entry("pointerDown", "pointerdown", EventKind::Pointer, true, true),
    entry("pointerMove", "pointermove", EventKind::Pointer, true, true),
    entry("pointerUp", "pointerup", EventKind::Pointer, true, true),
    entry("pointerCancel", "pointercancel", EventKind::Pointer, true, false),
    entry("pointerOut", "pointerout", EventKind::Pointer, true, true),
    entry("pointerLeave", "pointerleave", EventKind::Pointer, false, false),
    entry(
        "gotPointerCapture",
        "gotpointercapture",
        EventKind::Pointer,
        true,
        false,
    ),
    entry(
        "lostPointerCapture",
        "lostpointercapture",
        EventKind::Pointer,
        true,
        false,
    ),
    // Touch.
    entry("touchCancel", "touchcancel", EventKind::Touch, true, false),
    entry("touchEnd", "touchend", EventKind::Touch, true, true),
    entry("touchMove", "touchmove", EventKind::Touch, true, true),
    entry("touchStart", "touchstart", EventKind::Touch, true, true),
    // Scrolling and wheel.
    entry("scroll", "scroll", EventKind::Plain, false, false),
    entry("wheel", "wheel", EventKind::Wheel, true, true),
    // Media.
    entry("abort", "abort", EventKind::Media, false, false),
    entry("canPlay", "canplay", EventKind::Media, false, false),
    entry(
        "canPlayThrough",
        "canplaythrough",
        EventKind::Media,
        false,
        false,
    ),
    entry(
        "durationChange",
        "durationchange",
        EventKind::Media,
        false,
        false,
    ),
    entry("emptied", "emptied", EventKind::Media, false, false),
    entry("encrypted", "encrypted", EventKind::Media, false, false),
    entry("ended", "ended", EventKind::Media, false, false),
    entry("loadedData", "loadeddata", EventKind::Media, false, false),
    entry(
        "loadedMetadata",
        "loadedmetadata",
        EventKind::Media,
        false,
        false,
    ),
    entry("loadStart", "loadstart", EventKind::Media, false, false),
    entry("pause", "pause", EventKind::Media, false, false),
    entry("play", "play", EventKind::Media, false, false),
    entry("playing", "playing", EventKind::Media, false, false),
    entry("progress", "progress", EventKind::Media, false, false),
    entry("rateChange", "ratechange", EventKind::Media, false, false),
    entry("seeked", "seeked", EventKind::Media, false, false),
    entry("seeking", "seeking", EventKind::Media, false, false),
    entry("stalled", "stalled", EventKind::Media, false, false),
    entry("suspend", "suspend", EventKind::Media, false, false),
    entry("timeUpdate", "timeupdate", EventKind::Media, false, false),
    entry("volumeChange", "volumechange", EventKind::Media, false, false),
    entry("waiting", "waiting", EventKind::Media, false, false),
    // Animation and transition.
    entry(
        "animationStart",
        "animationstart",
        EventKind::Animation,
        true,
        false,
    ),
    entry(
        "animationEnd",
        "animationend",
        EventKind::Animation,
        true,
        false,
    ),
    entry(
        "animationIteration",
        "animationiteration",
        EventKind::Animation,
        true,
        false,
    ),
    entry(
        "transitionCancel",
        "transitioncancel",
        EventKind::Transition,
        true,
        false,
    ),
    entry(
        "transitionEnd",
        "transitionend",
        EventKind::Transition,
        true,
        true,
    ),
    entry(
        "transitionRun",
        "transitionrun",
        EventKind::Transition,
        true,
        false,
    ),
    entry(
        "transitionStart",
        "transitionstart",
        EventKind::Transition,
        true,
        false,
    ),
    // Window lifecycle.
    entry("load", "load", EventKind::Plain, false, false),
    entry("error", "error", EventKind::Plain, false, false),
    entry("resize", "resize", EventKind::Plain, false, false),
    entry("offline", "offline", EventKind::Plain, false, false),
    entry("online", "online", EventKind::Plain, false, false),
    entry("popState", "popstate", EventKind::Plain, true, false),
    entry("pageHide", "pagehide", EventKind::Plain, false, false),
    entry("pageShow", "pageshow", EventKind::Plain, false, false),
    entry(
        "selectionChange",
        "selectionchange",
        EventKind::Plain,
        false,
        false,
    ),
];

pub(crate) fn descriptor(name: &str) -> Option<&'static EventDescriptor> {
    EVENT_TABLE.iter().find(|descriptor| descriptor.name == name)
}

/// Optional fields for mouse-family events (mouse, drag, pointer).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MouseInit {
    pub button: i32,
    pub buttons: i32,
    pub client_x: f64,
    pub client_y: f64,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Optional fields for keyboard events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardInit {
    pub key: String,
    pub code: String,
    pub repeat: bool,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

/// Optional fields for input and composition events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputInit {
    pub data: Option<String>,
    pub input_type: String,
}

/// Optional fields for wheel events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelInit {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_mode: u32,
}

/// Optional fields for media events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInit {
    pub current_time: Option<f64>,
    pub volume: Option<f64>,
    pub playback_rate: Option<f64>,
}

/// Kind-specific payload attached to a fired event. Plain events carry
/// `None`; the variant does not have to match the descriptor kind, callers
/// may omit the payload entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventDetail {
    #[default]
    None,
    Mouse(MouseInit),
    Keyboard(KeyboardInit),
    Input(InputInit),
    Wheel(WheelInit),
    Media(MediaInit),
}
