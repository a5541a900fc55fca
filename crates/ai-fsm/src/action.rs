use ai_core::TickContext;

use crate::FsmEvent;

/// What a state action sees while one of its hooks runs.
pub struct FsmContext<'a, C> {
    pub data: &'a mut C,
    pub tick: &'a TickContext,
    state: &'a str,
    outbox: &'a mut Vec<FsmEvent>,
}

impl<'a, C> FsmContext<'a, C> {
    pub(crate) fn new(
        data: &'a mut C,
        tick: &'a TickContext,
        state: &'a str,
        outbox: &'a mut Vec<FsmEvent>,
    ) -> Self {
        Self {
            data,
            tick,
            state,
            outbox,
        }
    }

    pub fn state_name(&self) -> &str {
        self.state
    }

    /// Queue an event for the machine. It is dispatched once the current hook returns.
    pub fn send_event(&mut self, event: FsmEvent) {
        self.outbox.push(event);
    }
}

/// Behaviour attached to a state.
pub trait FsmAction<C>: 'static {
    fn enter(&mut self, _ctx: &mut FsmContext<'_, C>) {}

    fn update(&mut self, _ctx: &mut FsmContext<'_, C>) {}

    /// Must not request a transition; see [`crate::FsmError::TransitionDuringExit`].
    fn exit(&mut self, _ctx: &mut FsmContext<'_, C>) {}
}

/// Sends `event` once `duration` seconds of tick time have passed in the owning state.
#[derive(Debug, Clone)]
pub struct TimedEvent {
    duration: f32,
    event: FsmEvent,
    elapsed: f32,
    fired: bool,
}

impl TimedEvent {
    pub fn new(duration: f32, event: FsmEvent) -> Self {
        Self {
            duration,
            event,
            elapsed: 0.0,
            fired: false,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl<C> FsmAction<C> for TimedEvent {
    fn enter(&mut self, ctx: &mut FsmContext<'_, C>) {
        self.elapsed = 0.0;
        self.fired = false;
        if self.duration <= 0.0 {
            self.fired = true;
            ctx.send_event(self.event);
        }
    }

    fn update(&mut self, ctx: &mut FsmContext<'_, C>) {
        if self.fired {
            return;
        }
        self.elapsed += ctx.tick.dt_seconds;
        if self.elapsed >= self.duration {
            self.fired = true;
            ctx.send_event(self.event);
        }
    }
}
