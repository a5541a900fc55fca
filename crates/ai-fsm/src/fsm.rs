use std::collections::BTreeMap;

use ai_core::TickContext;
use tracing::debug;

use crate::{FsmAction, FsmContext, FsmError};

/// Upper bound on transitions triggered by enter hooks within one call.
pub const MAX_CHAINED_TRANSITIONS: usize = 32;

/// Arena index of a state inside its machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsmEvent(pub &'static str);

struct FsmState<C> {
    name: String,
    actions: Vec<Box<dyn FsmAction<C>>>,
    transitions: BTreeMap<FsmEvent, StateId>,
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Enter,
    Update,
    Exit,
}

pub struct FsmBuilder<C> {
    name: String,
    states: Vec<FsmState<C>>,
    delayed: bool,
}

impl<C: 'static> FsmBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            delayed: false,
        }
    }

    /// Defer every transition to the start of the next `update()`.
    pub fn delayed_transitions(mut self, delayed: bool) -> Self {
        self.delayed = delayed;
        self
    }

    pub fn add_state(&mut self, name: impl Into<String>) -> Result<StateId, FsmError> {
        let name = name.into();
        if self.states.iter().any(|s| s.name == name) {
            return Err(FsmError::DuplicateState(name));
        }
        self.states.push(FsmState {
            name,
            actions: Vec::new(),
            transitions: BTreeMap::new(),
        });
        Ok(StateId(self.states.len() - 1))
    }

    pub fn add_action(
        &mut self,
        state: StateId,
        action: impl FsmAction<C>,
    ) -> Result<(), FsmError> {
        self.state_mut(state)?.actions.push(Box::new(action));
        Ok(())
    }

    pub fn add_transition(
        &mut self,
        from: StateId,
        event: FsmEvent,
        to: StateId,
    ) -> Result<(), FsmError> {
        if to.0 >= self.states.len() {
            return Err(FsmError::UnknownState(to.0));
        }
        let state = self.state_mut(from)?;
        if state.transitions.contains_key(&event) {
            return Err(FsmError::DuplicateTransition {
                state: state.name.clone(),
                event: event.0,
            });
        }
        state.transitions.insert(event, to);
        Ok(())
    }

    pub fn build(self, start: StateId) -> Result<Fsm<C>, FsmError> {
        if start.0 >= self.states.len() {
            return Err(FsmError::UnknownState(start.0));
        }
        Ok(Fsm {
            name: self.name,
            states: self.states,
            current: start,
            pending: None,
            started: false,
            delayed: self.delayed,
        })
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut FsmState<C>, FsmError> {
        self.states.get_mut(id.0).ok_or(FsmError::UnknownState(id.0))
    }
}

/// A built state machine. `C` is the data its actions operate on, passed in on every call.
pub struct Fsm<C> {
    name: String,
    states: Vec<FsmState<C>>,
    current: StateId,
    pending: Option<StateId>,
    started: bool,
    delayed: bool,
}

impl<C: 'static> Fsm<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        &self.states[self.current.0].name
    }

    /// Target recorded by a delayed transition, applied on the next `update()`.
    pub fn pending_state(&self) -> Option<StateId> {
        self.pending
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name == name)
            .map(StateId)
    }

    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.0).map(|s| s.name.as_str())
    }

    pub fn has_transition(&self, from: StateId, event: FsmEvent) -> bool {
        self.states
            .get(from.0)
            .is_some_and(|s| s.transitions.contains_key(&event))
    }

    pub fn is_delayed(&self) -> bool {
        self.delayed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Enter the start state. Later calls are no-ops; `update` and `send_event` start lazily.
    pub fn start(&mut self, data: &mut C, tick: &TickContext) -> Result<(), FsmError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let events = self.run_hooks(self.current, Hook::Enter, data, tick);
        self.dispatch_all(events, data, tick, 0)
    }

    /// Apply a pending delayed transition, then update the current state's actions.
    pub fn update(&mut self, data: &mut C, tick: &TickContext) -> Result<(), FsmError> {
        self.start(data, tick)?;
        if let Some(target) = self.pending.take() {
            self.change_state(target, data, tick, 0)?;
        }
        let events = self.run_hooks(self.current, Hook::Update, data, tick);
        self.dispatch_all(events, data, tick, 0)
    }

    /// Returns whether the current state had a transition for `event`.
    pub fn send_event(
        &mut self,
        event: FsmEvent,
        data: &mut C,
        tick: &TickContext,
    ) -> Result<bool, FsmError> {
        self.start(data, tick)?;
        self.dispatch(event, data, tick, 0)
    }

    fn dispatch(
        &mut self,
        event: FsmEvent,
        data: &mut C,
        tick: &TickContext,
        depth: usize,
    ) -> Result<bool, FsmError> {
        let Some(target) = self.states[self.current.0].transitions.get(&event).copied() else {
            debug!(
                fsm = %self.name,
                state = %self.current_state_name(),
                event = event.0,
                "no transition for event; ignored"
            );
            return Ok(false);
        };

        if self.delayed {
            debug!(
                fsm = %self.name,
                state = %self.current_state_name(),
                event = event.0,
                target = %self.states[target.0].name,
                "transition deferred to next update"
            );
            self.pending = Some(target);
            return Ok(true);
        }

        self.change_state(target, data, tick, depth)?;
        Ok(true)
    }

    fn dispatch_all(
        &mut self,
        events: Vec<FsmEvent>,
        data: &mut C,
        tick: &TickContext,
        depth: usize,
    ) -> Result<(), FsmError> {
        for event in events {
            self.dispatch(event, data, tick, depth)?;
        }
        Ok(())
    }

    fn change_state(
        &mut self,
        target: StateId,
        data: &mut C,
        tick: &TickContext,
        depth: usize,
    ) -> Result<(), FsmError> {
        if depth >= MAX_CHAINED_TRANSITIONS {
            return Err(FsmError::TransitionLimit {
                limit: MAX_CHAINED_TRANSITIONS,
            });
        }

        let from = self.current;
        let exit_events = self.run_hooks(from, Hook::Exit, data, tick);
        let exiting = &self.states[from.0];
        for event in exit_events {
            if exiting.transitions.contains_key(&event) {
                return Err(FsmError::TransitionDuringExit {
                    state: exiting.name.clone(),
                    event: event.0,
                });
            }
            debug!(fsm = %self.name, event = event.0, "event sent while exiting; ignored");
        }

        debug!(
            fsm = %self.name,
            from = %exiting.name,
            to = %self.states[target.0].name,
            "state changed"
        );
        self.current = target;

        let enter_events = self.run_hooks(target, Hook::Enter, data, tick);
        self.dispatch_all(enter_events, data, tick, depth + 1)
    }

    fn run_hooks(
        &mut self,
        state: StateId,
        hook: Hook,
        data: &mut C,
        tick: &TickContext,
    ) -> Vec<FsmEvent> {
        let mut outbox = Vec::new();
        let FsmState { name, actions, .. } = &mut self.states[state.0];
        for action in actions.iter_mut() {
            let mut ctx = FsmContext::new(&mut *data, tick, name.as_str(), &mut outbox);
            match hook {
                Hook::Enter => action.enter(&mut ctx),
                Hook::Update => action.update(&mut ctx),
                Hook::Exit => action.exit(&mut ctx),
            }
        }
        outbox
    }
}
