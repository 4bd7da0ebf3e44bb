use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

mod event_table;
mod selector;

pub use event_table::{
    EventDetail, EventKind, InputInit, KeyboardInit, MediaInit, MouseInit, WheelInit,
};

use event_table::{EventDescriptor, descriptor};
use selector::{
    SelectorAttrCondition, SelectorCombinator, SelectorPart, SelectorStep, parse_selector_groups,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    UnknownEventName(String),
    NoValueSetter,
    InvalidTarget(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::UnknownEventName(name) => write!(f, "unknown event name: {name}"),
            Self::NoValueSetter => {
                write!(f, "The given element does not have a value setter")
            }
            Self::InvalidTarget(msg) => write!(f, "invalid event target: {msg}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
        }
    }
}

impl StdError for Error {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A dispatch target: either a DOM node or the window-global. Both go
/// through the same dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Node(NodeId),
}

/// Simulated file value for file-upload events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl FileData {
    pub fn new(name: &str, mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) readonly: bool,
    pub(crate) required: bool,
    pub(crate) files: Vec<FileData>,
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) id_index: HashMap<String, NodeId>,
}

impl Dom {
    fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let disabled = attrs.contains_key("disabled");
        let readonly = attrs.contains_key("readonly");
        let required = attrs.contains_key("required");
        let element = Element {
            tag_name,
            attrs,
            value,
            checked,
            disabled,
            readonly,
            required,
            files: Vec::new(),
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    fn text_content(&self, node_id: NodeId) -> String {
        match &self.nodes[node_id.0].node_type {
            NodeType::Document | NodeType::Element(_) => {
                let mut out = String::new();
                for child in &self.nodes[node_id.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
            NodeType::Text(text) => text.clone(),
        }
    }

    fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::InvalidTarget("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self
            .tag_name(node_id)
            .map(|tag| tag == "select")
            .unwrap_or(false)
        {
            return self.set_select_value(node_id, value);
        }

        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::InvalidTarget("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    // Select values resolve against option children: the matching option is
    // marked selected, all others unselected, and a missing match clears.
    fn set_select_value(&mut self, select_node: NodeId, requested: &str) -> Result<()> {
        let mut options = Vec::new();
        self.collect_select_options(select_node, &mut options);

        let mut option_values = Vec::with_capacity(options.len());
        for option in options {
            option_values.push((option, self.option_effective_value(option)?));
        }

        let matched = option_values
            .iter()
            .find(|(_, value)| value == requested)
            .map(|(node, value)| (*node, value.clone()));

        for (option, _) in &option_values {
            let option_element = self.element_mut(*option).ok_or_else(|| {
                Error::InvalidTarget("option target is not an element".into())
            })?;
            if Some(*option) == matched.as_ref().map(|(node, _)| *node) {
                option_element
                    .attrs
                    .insert("selected".to_string(), "true".to_string());
            } else {
                option_element.attrs.remove("selected");
            }
        }

        let element = self
            .element_mut(select_node)
            .ok_or_else(|| Error::InvalidTarget("select target is not an element".into()))?;
        element.value = matched.map(|(_, value)| value).unwrap_or_default();
        Ok(())
    }

    fn sync_select_value(&mut self, select_node: NodeId) -> Result<()> {
        let mut options = Vec::new();
        self.collect_select_options(select_node, &mut options);

        let value = if options.is_empty() {
            String::new()
        } else {
            let selected = options
                .iter()
                .copied()
                .find(|option| self.attr(*option, "selected").is_some())
                .unwrap_or(options[0]);
            self.option_effective_value(selected)?
        };

        let element = self
            .element_mut(select_node)
            .ok_or_else(|| Error::InvalidTarget("select target is not an element".into()))?;
        element.value = value;
        Ok(())
    }

    fn collect_select_options(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node.0].children {
            if self
                .tag_name(*child)
                .map(|tag| tag == "option")
                .unwrap_or(false)
            {
                out.push(*child);
            }
            self.collect_select_options(*child, out);
        }
    }

    fn option_effective_value(&self, option_node: NodeId) -> Result<String> {
        let element = self
            .element(option_node)
            .ok_or_else(|| Error::InvalidTarget("option target is not an element".into()))?;
        if let Some(value) = element.attrs.get("value") {
            return Ok(value.clone());
        }
        Ok(self.text_content(option_node))
    }

    fn initialize_form_control_values(&mut self) -> Result<()> {
        for node in self.all_element_nodes() {
            match self.tag_name(node) {
                Some("textarea") => {
                    let text = self.text_content(node);
                    let element = self.element_mut(node).ok_or_else(|| {
                        Error::InvalidTarget("textarea target is not an element".into())
                    })?;
                    element.value = text;
                }
                Some("select") => self.sync_select_value(node)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn checked(&self, node_id: NodeId) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::InvalidTarget("checked target is not an element".into()))?;
        Ok(element.checked)
    }

    fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::InvalidTarget("checked target is not an element".into()))?;
        element.checked = checked;
        Ok(())
    }

    fn files(&self, node_id: NodeId) -> Result<Vec<FileData>> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::InvalidTarget("files target is not an element".into()))?;
        Ok(element.files.clone())
    }

    fn set_files(&mut self, node_id: NodeId, files: Vec<FileData>) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::InvalidTarget("files target is not an element".into()))?;
        element.files = files;
        Ok(())
    }

    fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.disabled).unwrap_or(false)
    }

    fn readonly(&self, node_id: NodeId) -> bool {
        self.element(node_id).map(|e| e.readonly).unwrap_or(false)
    }

    fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|e| e.attrs.get(name).cloned())
    }

    fn find_ancestor_by_tag(&self, node_id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
            {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for candidate in ids {
            if groups
                .iter()
                .any(|steps| self.matches_selector_chain(candidate, steps))
                && seen.insert(candidate)
            {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    fn collect_elements_dfs(&self, node_id: NodeId, out: &mut Vec<NodeId>) {
        if matches!(self.nodes[node_id.0].node_type, NodeType::Element(_)) {
            out.push(node_id);
        }
        for child in &self.nodes[node_id.0].children {
            self.collect_elements_dfs(*child, out);
        }
    }

    fn all_element_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements_dfs(self.root, &mut out);
        out
    }

    fn matches_selector_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        if steps.is_empty() {
            return false;
        }
        if !self.matches_step(node_id, &steps[steps.len() - 1].step) {
            return false;
        }

        let mut current = node_id;
        for idx in (1..steps.len()).rev() {
            let prev_step = &steps[idx - 1].step;
            let combinator = steps[idx]
                .combinator
                .unwrap_or(SelectorCombinator::Descendant);

            let matched = match combinator {
                SelectorCombinator::Child => {
                    let Some(parent) = self.parent(current) else {
                        return false;
                    };
                    if self.matches_step(parent, prev_step) {
                        Some(parent)
                    } else {
                        None
                    }
                }
                SelectorCombinator::Descendant => {
                    let mut cursor = self.parent(current);
                    let mut found = None;
                    while let Some(parent) = cursor {
                        if self.matches_step(parent, prev_step) {
                            found = Some(parent);
                            break;
                        }
                        cursor = self.parent(parent);
                    }
                    found
                }
            };

            let Some(matched) = matched else {
                return false;
            };
            current = matched;
        }

        true
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !has_class(element, class_name))
        {
            return false;
        }

        for condition in &step.attrs {
            match condition {
                SelectorAttrCondition::Exists { key } => {
                    if !element.attrs.contains_key(key) {
                        return false;
                    }
                }
                SelectorAttrCondition::Eq { key, value } => {
                    if element.attrs.get(key) != Some(value) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// Caller-supplied options for a fired event: overrides of the descriptor's
/// bubbling defaults, a kind-specific detail payload, and special-cased
/// target property overrides applied to the node before dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventInit {
    pub bubbles: Option<bool>,
    pub cancelable: Option<bool>,
    pub detail: EventDetail,
    pub target: Option<TargetInit>,
}

impl EventInit {
    pub fn value(value: &str) -> Self {
        Self {
            target: Some(TargetInit {
                value: Some(value.to_string()),
                ..TargetInit::default()
            }),
            ..Self::default()
        }
    }

    pub fn files(files: Vec<FileData>) -> Self {
        Self {
            target: Some(TargetInit {
                files: Some(files),
                ..TargetInit::default()
            }),
            ..Self::default()
        }
    }

    pub fn checked(checked: bool) -> Self {
        Self {
            target: Some(TargetInit {
                checked: Some(checked),
                ..TargetInit::default()
            }),
            ..Self::default()
        }
    }

    pub fn detail(detail: EventDetail) -> Self {
        Self {
            detail,
            ..Self::default()
        }
    }
}

/// Target property overrides. These are not copied onto the event value;
/// they mutate the node itself before the event is delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetInit {
    pub value: Option<String>,
    pub files: Option<Vec<FileData>>,
    pub checked: Option<bool>,
}

/// The event value delivered to listeners.
#[derive(Debug, Clone)]
pub struct FiredEvent {
    event_type: String,
    kind: EventKind,
    bubbles: bool,
    cancelable: bool,
    target: EventTarget,
    current_target: EventTarget,
    detail: EventDetail,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl FiredEvent {
    fn from_descriptor(descriptor: &EventDescriptor, target: EventTarget, init: &EventInit) -> Self {
        Self {
            event_type: descriptor.native_type.to_string(),
            kind: descriptor.kind,
            bubbles: init.bubbles.unwrap_or(descriptor.bubbles),
            cancelable: init.cancelable.unwrap_or(descriptor.cancelable),
            target,
            current_target: target,
            detail: init.detail.clone(),
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn target(&self) -> EventTarget {
        self.target
    }

    pub fn current_target(&self) -> EventTarget {
        self.current_target
    }

    pub fn detail(&self) -> &EventDetail {
        &self.detail
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// No-op when the event is not cancelable, standard dispatch semantics.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

type Handler = Rc<RefCell<dyn FnMut(&mut FiredEvent)>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Listener {
    id: ListenerId,
    capture: bool,
    handler: Handler,
}

#[derive(Default, Clone)]
struct ListenerStore {
    map: HashMap<EventTarget, HashMap<String, Vec<Listener>>>,
    next_id: u64,
}

impl ListenerStore {
    fn add(&mut self, target: EventTarget, event: String, capture: bool, handler: Handler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.map
            .entry(target)
            .or_default()
            .entry(event)
            .or_default()
            .push(Listener {
                id,
                capture,
                handler,
            });
        id
    }

    // Closures have no usable equality, so removal is by the id handed out
    // at registration.
    fn remove(&mut self, id: ListenerId) -> bool {
        let mut found = false;
        for events in self.map.values_mut() {
            for listeners in events.values_mut() {
                if let Some(pos) = listeners.iter().position(|listener| listener.id == id) {
                    listeners.remove(pos);
                    found = true;
                    break;
                }
            }
            if found {
                events.retain(|_, listeners| !listeners.is_empty());
                break;
            }
        }
        if found {
            self.map.retain(|_, events| !events.is_empty());
        }
        found
    }

    fn get(&self, target: EventTarget, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&target)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub struct Harness {
    dom: Dom,
    listeners: ListenerStore,
    active_element: Option<NodeId>,
    trace: bool,
    trace_events: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            active_element: None,
            trace: false,
            trace_events: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidTarget(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn node(&self, selector: &str) -> Result<NodeId> {
        self.select_one(selector)
    }

    pub fn add_event_listener(
        &mut self,
        selector: &str,
        event_type: &str,
        capture: bool,
        handler: impl FnMut(&mut FiredEvent) + 'static,
    ) -> Result<ListenerId> {
        let target = self.select_one(selector)?;
        let handler: Handler = Rc::new(RefCell::new(handler));
        Ok(self
            .listeners
            .add(EventTarget::Node(target), event_type.to_string(), capture, handler))
    }

    pub fn add_window_event_listener(
        &mut self,
        event_type: &str,
        capture: bool,
        handler: impl FnMut(&mut FiredEvent) + 'static,
    ) -> ListenerId {
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.listeners
            .add(EventTarget::Window, event_type.to_string(), capture, handler)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Fire the named event on the node addressed by `selector`. Returns
    /// `true` when the event's default action was not prevented, the
    /// standard dispatch return value.
    pub fn fire_event(&mut self, selector: &str, event_name: &str, init: EventInit) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.fire_event_on(EventTarget::Node(target), event_name, init)
    }

    /// Same dispatch path, window-global target.
    pub fn fire_event_on_window(&mut self, event_name: &str, init: EventInit) -> Result<bool> {
        self.fire_event_on(EventTarget::Window, event_name, init)
    }

    fn fire_event_on(
        &mut self,
        target: EventTarget,
        event_name: &str,
        init: EventInit,
    ) -> Result<bool> {
        let descriptor = descriptor(event_name)
            .ok_or_else(|| Error::UnknownEventName(event_name.to_string()))?;

        if let EventTarget::Node(node) = target {
            if let Some(overrides) = &init.target {
                self.apply_target_overrides(node, overrides)?;
            }

            if is_activation_click(descriptor) && self.click_suppressed_by_disabled(node) {
                let label = self.node_label(target);
                self.trace_event_line(format!(
                    "[event] {} suppressed target={label} reason=disabled",
                    descriptor.native_type
                ));
                return Ok(true);
            }
        }

        let mut event = FiredEvent::from_descriptor(descriptor, target, &init);
        self.dispatch_fired_event(&mut event);

        if let EventTarget::Node(node) = target {
            if descriptor.native_type == "click" && !event.default_prevented {
                self.run_click_default_action(node)?;
            }
        }

        Ok(!event.default_prevented)
    }

    fn apply_target_overrides(&mut self, node: NodeId, overrides: &TargetInit) -> Result<()> {
        if let Some(value) = &overrides.value {
            let has_setter = self
                .dom
                .tag_name(node)
                .map(has_value_setter)
                .unwrap_or(false);
            if !has_setter {
                return Err(Error::NoValueSetter);
            }
            self.dom.set_value(node, value)?;
        }
        if let Some(files) = &overrides.files {
            self.dom.set_files(node, files.clone())?;
        }
        if let Some(checked) = overrides.checked {
            self.dom.set_checked(node, checked)?;
        }
        Ok(())
    }

    // A click is suppressed when the target, or any ancestor whose element
    // kind is capable of being disabled, carries the disabled state. A
    // `disabled` attribute on an incapable ancestor (e.g. a div) has no
    // effect.
    fn click_suppressed_by_disabled(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let capable = self
                .dom
                .tag_name(current)
                .map(can_be_disabled)
                .unwrap_or(false);
            if capable && self.dom.disabled(current) {
                return true;
            }
            cursor = self.dom.parent(current);
        }
        false
    }

    fn run_click_default_action(&mut self, target: NodeId) -> Result<()> {
        if is_checkbox_input(&self.dom, target) {
            let current = self.dom.checked(target)?;
            self.dom.set_checked(target, !current)?;
            self.fire_named(target, "input")?;
            self.fire_named(target, "change")?;
            return Ok(());
        }

        if is_radio_input(&self.dom, target) {
            if !self.dom.checked(target)? {
                self.uncheck_other_radios_in_group(target)?;
                self.dom.set_checked(target, true)?;
                self.fire_named(target, "input")?;
                self.fire_named(target, "change")?;
            }
            return Ok(());
        }

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.form_owner(target) {
                self.fire_named(form, "submit")?;
            }
        }

        Ok(())
    }

    fn fire_named(&mut self, node: NodeId, event_name: &str) -> Result<bool> {
        self.fire_event_on(EventTarget::Node(node), event_name, EventInit::default())
    }

    fn dispatch_fired_event(&mut self, event: &mut FiredEvent) {
        // Propagation path, outermost first: window, document, ancestors,
        // then the target itself.
        let mut path = Vec::new();
        if let EventTarget::Node(node) = event.target {
            let mut chain = vec![EventTarget::Node(node)];
            let mut cursor = self.dom.parent(node);
            while let Some(parent) = cursor {
                chain.push(EventTarget::Node(parent));
                cursor = self.dom.parent(parent);
            }
            chain.push(EventTarget::Window);
            chain.reverse();
            path = chain;
        } else {
            path.push(EventTarget::Window);
        }

        // Capture phase.
        if path.len() >= 2 {
            for target in &path[..path.len() - 1] {
                event.current_target = *target;
                self.invoke_listeners(*target, event, true);
                if event.propagation_stopped {
                    self.trace_event_done(event, "propagation_stopped");
                    return;
                }
            }
        }

        // Target phase: capture listeners first, then bubble listeners.
        event.current_target = event.target;
        self.invoke_listeners(event.target, event, true);
        if event.propagation_stopped {
            self.trace_event_done(event, "propagation_stopped");
            return;
        }

        self.invoke_listeners(event.target, event, false);
        if event.propagation_stopped {
            self.trace_event_done(event, "propagation_stopped");
            return;
        }

        // Bubble phase, only for bubbling events.
        if event.bubbles && path.len() >= 2 {
            for target in path[..path.len() - 1].iter().rev() {
                event.current_target = *target;
                self.invoke_listeners(*target, event, false);
                if event.propagation_stopped {
                    self.trace_event_done(event, "propagation_stopped");
                    return;
                }
            }
        }

        self.trace_event_done(event, "completed");
    }

    fn invoke_listeners(&mut self, target: EventTarget, event: &mut FiredEvent, capture: bool) {
        let listeners = self.listeners.get(target, &event.event_type, capture);
        for listener in listeners {
            if self.trace {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.node_label(event.target);
                let current_label = self.node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            (&mut *listener.handler.borrow_mut())(event);
            if event.immediate_propagation_stopped {
                break;
            }
        }
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.fire_event_on(EventTarget::Node(target), "click", EventInit::default())?;
        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if self.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_string();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.fire_named(target, "input")?;
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_string();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: tag,
            });
        }

        let kind = self
            .dom
            .attr(target, "type")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase();
        if kind != "checkbox" && kind != "radio" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: format!("input[type={kind}]"),
            });
        }

        let current = self.dom.checked(target)?;
        if current != checked {
            if kind == "radio" && checked {
                self.uncheck_other_radios_in_group(target)?;
            }
            self.dom.set_checked(target, checked)?;
            self.fire_named(target, "input")?;
            self.fire_named(target, "change")?;
        }

        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .dom
            .tag_name(target)
            .map(|t| t == "form")
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.form_owner(target)
        };

        if let Some(form_id) = form {
            self.fire_named(form_id, "submit")?;
        }

        Ok(())
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn checked(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.dom.checked(target)
    }

    pub fn files(&self, selector: &str) -> Result<Vec<FileData>> {
        let target = self.select_one(selector)?;
        self.dom.files(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn text_content(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) {
            return Ok(());
        }

        if self.active_element == Some(node) {
            return Ok(());
        }

        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }

        self.active_element = Some(node);
        self.fire_named(node, "focusIn")?;
        self.fire_named(node, "focus")?;
        Ok(())
    }

    fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }

        self.fire_named(node, "focusOut")?;
        self.fire_named(node, "blur")?;
        self.active_element = None;
        Ok(())
    }

    fn form_owner(&self, node_id: NodeId) -> Option<NodeId> {
        if self
            .dom
            .tag_name(node_id)
            .map(|t| t == "form")
            .unwrap_or(false)
        {
            Some(node_id)
        } else {
            self.dom.find_ancestor_by_tag(node_id, "form")
        }
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let target_name = self.dom.attr(target, "name").unwrap_or_default();
        if target_name.is_empty() {
            return Ok(());
        }
        let target_form = self.form_owner(target);

        for node in self.dom.all_element_nodes() {
            if node == target {
                continue;
            }
            if !is_radio_input(&self.dom, node) {
                continue;
            }
            if self.dom.attr(node, "name").unwrap_or_default() != target_name {
                continue;
            }
            if self.form_owner(node) != target_form {
                continue;
            }
            if self.dom.checked(node)? {
                self.dom.set_checked(node, false)?;
            }
        }

        Ok(())
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_label(&self, target: EventTarget) -> String {
        match target {
            EventTarget::Window => "window".to_string(),
            EventTarget::Node(node) => match self.dom.element(node) {
                Some(element) => match element.attrs.get("id") {
                    Some(id) => format!("{}#{id}", element.tag_name),
                    None => element.tag_name.clone(),
                },
                None => "document".to_string(),
            },
        }
    }

    fn trace_event_done(&mut self, event: &FiredEvent, outcome: &str) {
        if !self.trace {
            return;
        }
        let target_label = self.node_label(event.target);
        let current_label = self.node_label(event.current_target);
        self.trace_event_line(format!(
            "[event] done {} target={} current={} outcome={} default_prevented={} propagation_stopped={} immediate_stopped={}",
            event.event_type,
            target_label,
            current_label,
            outcome,
            event.default_prevented,
            event.propagation_stopped,
            event.immediate_propagation_stopped
        ));
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}

fn is_activation_click(descriptor: &EventDescriptor) -> bool {
    matches!(descriptor.native_type, "click" | "dblclick")
}

// Element kinds whose value property has a setter. Assigning a value to
// anything else fails with Error::NoValueSetter.
fn has_value_setter(tag: &str) -> bool {
    matches!(
        tag,
        "button"
            | "data"
            | "input"
            | "li"
            | "meter"
            | "option"
            | "output"
            | "param"
            | "progress"
            | "select"
            | "textarea"
    )
}

// Element kinds capable of carrying the disabled state.
fn can_be_disabled(tag: &str) -> bool {
    matches!(
        tag,
        "button" | "fieldset" | "input" | "optgroup" | "option" | "select" | "textarea"
    )
}

fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type_is(dom, node_id, "checkbox")
}

fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    input_type_is(dom, node_id, "radio")
}

fn input_type_is(dom: &Dom, node_id: NodeId, expected: &str) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };
    if element.tag_name != "input" {
        return false;
    }
    element
        .attrs
        .get("type")
        .map(|kind| kind.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(element) = dom.element(node_id) else {
        return false;
    };

    if element.tag_name == "button" {
        let kind = element
            .attrs
            .get("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_else(|| "submit".into());
        return kind == "submit";
    }

    if element.tag_name == "input" {
        let kind = element
            .attrs
            .get("type")
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();
        return kind == "submit" || kind == "image";
    }

    false
}

fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();

    let mut stack = vec![dom.root];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;

                while stack.len() > 1 {
                    let top = *stack
                        .last()
                        .ok_or_else(|| Error::HtmlParse("invalid stack state".into()))?;
                    let top_tag = dom.tag_name(top).unwrap_or("");
                    stack.pop();
                    if top_tag.eq_ignore_ascii_case(&tag) {
                        break;
                    }
                }
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            let parent = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            let node = dom.create_element(parent, tag.clone(), attrs);

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text_start = i;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if let Some(text) = html.get(text_start..i) {
            if !text.is_empty() {
                let parent = *stack
                    .last()
                    .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
                dom.create_text(parent, text.to_string());
            }
        }
    }

    dom.initialize_form_control_values()?;
    Ok(dom)
}

fn parse_start_tag(
    html: &str,
    at: usize,
) -> Result<(String, HashMap<String, String>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;
    if bytes.get(i) != Some(&b'<') {
        return Err(Error::HtmlParse("expected '<'".into()));
    }
    i += 1;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid tag name".into()))?
        .to_ascii_lowercase();

    if tag.is_empty() {
        return Err(Error::HtmlParse("empty tag name".into()));
    }

    let mut attrs = HashMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed start tag".into()));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'>' {
            self_closing = true;
            i += 2;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }

        let name = html
            .get(name_start..i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute name".into()))?
            .to_ascii_lowercase();

        if name.is_empty() {
            return Err(Error::HtmlParse("invalid attribute name".into()));
        }

        skip_ws(bytes, &mut i);

        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, bytes, &mut i)?
        } else {
            "true".to_string()
        };

        attrs.insert(name, value);
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;

    if !(bytes.get(i) == Some(&b'<') && bytes.get(i + 1) == Some(&b'/')) {
        return Err(Error::HtmlParse("expected end tag".into()));
    }
    i += 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid end tag".into()))?
        .to_ascii_lowercase();

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::HtmlParse("unclosed end tag".into()));
    }

    Ok((tag, i + 1))
}

fn parse_attr_value(html: &str, bytes: &[u8], i: &mut usize) -> Result<String> {
    if *i >= bytes.len() {
        return Err(Error::HtmlParse("missing attribute value".into()));
    }

    if bytes[*i] == b'\'' || bytes[*i] == b'"' {
        let quote = bytes[*i];
        *i += 1;
        let start = *i;
        while *i < bytes.len() && bytes[*i] != quote {
            *i += 1;
        }
        if *i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed quoted attribute value".into()));
        }
        let value = html
            .get(start..*i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
            .to_string();
        *i += 1;
        return Ok(value);
    }

    let start = *i;
    while *i < bytes.len()
        && !bytes[*i].is_ascii_whitespace()
        && bytes[*i] != b'>'
        && !(bytes[*i] == b'/' && *i + 1 < bytes.len() && bytes[*i + 1] == b'>')
    {
        *i += 1;
    }

    let value = html
        .get(start..*i)
        .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
        .to_string();
    Ok(value)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    if at + needle.len() > bytes.len() {
        return false;
    }
    &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || from > bytes.len() {
        return None;
    }

    let mut i = from;
    while i + needle.len() <= bytes.len() {
        if &bytes[i..i + needle.len()] == needle {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests;
