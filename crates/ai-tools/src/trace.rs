use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One diagnostic record emitted by an agent.
///
/// `tag` names the event (`goap.plan.result`, `goap.action.start`, ...), `detail` carries the
/// human-readable payload such as an action name or a rendered plan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub agent: u64,
    pub tag: Cow<'static, str>,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn new(tick: u64, agent: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            agent,
            tag: tag.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|e| e.tag.as_ref())
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }
}

impl TraceSink for TraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// A `TraceLog` that the caller keeps a handle to after giving a clone to an agent.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog(Rc<RefCell<TraceLog>>);

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> TraceLog {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}
