use ai_core::TickContext;
use ai_fsm::{Fsm, FsmAction, FsmBuilder, FsmContext, FsmError, FsmEvent, TimedEvent};

const FINISHED: FsmEvent = FsmEvent("Finished");
const NEXT: FsmEvent = FsmEvent("Next");
const BACK: FsmEvent = FsmEvent("Back");

#[derive(Debug, Default)]
struct Speaker {
    active: bool,
    playing: Option<&'static str>,
    log: Vec<String>,
}

struct PlayClip {
    clip: &'static str,
}

impl FsmAction<Speaker> for PlayClip {
    fn enter(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.playing = Some(self.clip);
        ctx.data.log.push(format!("{}: play {}", ctx.state_name(), self.clip));
    }

    fn exit(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.playing = None;
        ctx.data.log.push(format!("{}: stop", ctx.state_name()));
    }
}

struct Deactivate;

impl FsmAction<Speaker> for Deactivate {
    fn enter(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.active = false;
        ctx.data.log.push(format!("{}: deactivate", ctx.state_name()));
    }
}

/// Logs every hook and optionally sends an event from one of them.
struct Probe {
    label: &'static str,
    send_on_update: Option<FsmEvent>,
    send_on_exit: Option<FsmEvent>,
}

impl Probe {
    fn quiet(label: &'static str) -> Self {
        Self {
            label,
            send_on_update: None,
            send_on_exit: None,
        }
    }
}

impl FsmAction<Speaker> for Probe {
    fn enter(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.log.push(format!("{}.enter", self.label));
    }

    fn update(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.log.push(format!("{}.update", self.label));
        if let Some(event) = self.send_on_update {
            ctx.send_event(event);
        }
    }

    fn exit(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
        ctx.data.log.push(format!("{}.exit", self.label));
        if let Some(event) = self.send_on_exit {
            ctx.send_event(event);
        }
    }
}

fn tick(n: u64) -> TickContext {
    TickContext::new(n, 0.25)
}

fn speaker_fsm(clip_length: f32) -> Fsm<Speaker> {
    let mut builder = FsmBuilder::new("speaker");
    let playing = builder.add_state("Playing").unwrap();
    let killed = builder.add_state("Killed").unwrap();
    builder
        .add_action(playing, PlayClip { clip: "explosion" })
        .unwrap();
    builder
        .add_action(playing, TimedEvent::new(clip_length, FINISHED))
        .unwrap();
    builder.add_action(killed, Deactivate).unwrap();
    builder.add_transition(playing, FINISHED, killed).unwrap();
    builder.build(playing).unwrap()
}

#[test]
fn playing_state_kills_object_after_clip_length() {
    let mut fsm = speaker_fsm(1.0);
    let mut speaker = Speaker {
        active: true,
        ..Default::default()
    };

    for n in 0..3 {
        fsm.update(&mut speaker, &tick(n)).unwrap();
        assert_eq!(fsm.current_state_name(), "Playing");
        assert_eq!(speaker.playing, Some("explosion"));
        assert!(speaker.active);
    }

    fsm.update(&mut speaker, &tick(3)).unwrap();
    assert_eq!(fsm.current_state_name(), "Killed");
    assert!(!speaker.active);
    assert_eq!(speaker.playing, None);
    assert_eq!(
        speaker.log,
        vec!["Playing: play explosion", "Playing: stop", "Killed: deactivate"]
    );
}

#[test]
fn delayed_mode_defers_transition_to_next_update() {
    let mut builder = FsmBuilder::new("delayed").delayed_transitions(true);
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder.add_action(a, Probe::quiet("a")).unwrap();
    builder.add_action(b, Probe::quiet("b")).unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    let mut fsm = builder.build(a).unwrap();
    assert!(fsm.is_delayed());

    let mut data = Speaker::default();
    fsm.start(&mut data, &tick(0)).unwrap();

    assert!(fsm.send_event(NEXT, &mut data, &tick(0)).unwrap());
    assert_eq!(fsm.current_state(), a);
    assert_eq!(fsm.pending_state(), Some(b));
    assert_eq!(data.log, vec!["a.enter"]);

    fsm.update(&mut data, &tick(1)).unwrap();
    assert_eq!(fsm.current_state(), b);
    assert_eq!(fsm.pending_state(), None);
    assert_eq!(data.log, vec!["a.enter", "a.exit", "b.enter", "b.update"]);
}

#[test]
fn delayed_mode_defers_events_sent_by_actions() {
    let mut builder = FsmBuilder::new("delayed").delayed_transitions(true);
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder
        .add_action(
            a,
            Probe {
                label: "a",
                send_on_update: Some(NEXT),
                send_on_exit: None,
            },
        )
        .unwrap();
    builder.add_action(a, Probe::quiet("a2")).unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    let mut fsm = builder.build(a).unwrap();

    let mut data = Speaker::default();
    fsm.update(&mut data, &tick(0)).unwrap();
    // the second action of A still updates in the same frame
    assert_eq!(fsm.current_state_name(), "A");
    assert_eq!(data.log, vec!["a.enter", "a2.enter", "a.update", "a2.update"]);

    fsm.update(&mut data, &tick(1)).unwrap();
    assert_eq!(fsm.current_state_name(), "B");
}

#[test]
fn immediate_mode_transitions_synchronously() {
    let mut builder = FsmBuilder::new("immediate");
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder.add_action(a, Probe::quiet("a")).unwrap();
    builder.add_action(b, Probe::quiet("b")).unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    let mut fsm = builder.build(a).unwrap();

    let mut data = Speaker::default();
    assert!(fsm.send_event(NEXT, &mut data, &tick(0)).unwrap());
    assert_eq!(fsm.current_state(), b);
    assert_eq!(data.log, vec!["a.enter", "a.exit", "b.enter"]);
}

#[test]
fn unhandled_event_is_ignored() {
    let mut fsm = speaker_fsm(1.0);
    let mut speaker = Speaker::default();
    fsm.update(&mut speaker, &tick(0)).unwrap();

    assert!(!fsm.send_event(BACK, &mut speaker, &tick(0)).unwrap());
    assert_eq!(fsm.current_state_name(), "Playing");
    assert_eq!(fsm.pending_state(), None);
}

#[test]
fn transition_requested_from_exit_is_an_invariant_violation() {
    let mut builder = FsmBuilder::new("reentrant");
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder
        .add_action(
            a,
            Probe {
                label: "a",
                send_on_update: None,
                send_on_exit: Some(BACK),
            },
        )
        .unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    builder.add_transition(a, BACK, a).unwrap();
    let mut fsm = builder.build(a).unwrap();

    let mut data = Speaker::default();
    let err = fsm.send_event(NEXT, &mut data, &tick(0)).unwrap_err();
    assert_eq!(
        err,
        FsmError::TransitionDuringExit {
            state: "A".to_string(),
            event: "Back",
        }
    );
}

#[test]
fn unmatched_event_from_exit_is_harmless() {
    let mut builder = FsmBuilder::new("exit-noise");
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder
        .add_action(
            a,
            Probe {
                label: "a",
                send_on_update: None,
                send_on_exit: Some(FINISHED),
            },
        )
        .unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    let mut fsm = builder.build(a).unwrap();

    let mut data = Speaker::default();
    fsm.send_event(NEXT, &mut data, &tick(0)).unwrap();
    assert_eq!(fsm.current_state_name(), "B");
}

#[test]
fn builder_rejects_duplicates_and_unknown_states() {
    let mut builder = FsmBuilder::<Speaker>::new("bad");
    let a = builder.add_state("A").unwrap();
    assert_eq!(
        builder.add_state("A").unwrap_err(),
        FsmError::DuplicateState("A".to_string())
    );

    builder.add_transition(a, NEXT, a).unwrap();
    assert!(matches!(
        builder.add_transition(a, NEXT, a),
        Err(FsmError::DuplicateTransition { event: "Next", .. })
    ));

    let other = FsmBuilder::<Speaker>::new("other")
        .build(a)
        .err()
        .unwrap();
    assert_eq!(other, FsmError::UnknownState(0));
}

#[test]
fn enter_loops_hit_the_transition_limit() {
    struct Bounce;

    impl FsmAction<Speaker> for Bounce {
        fn enter(&mut self, ctx: &mut FsmContext<'_, Speaker>) {
            ctx.send_event(NEXT);
        }
    }

    let mut builder = FsmBuilder::new("loop");
    let a = builder.add_state("A").unwrap();
    let b = builder.add_state("B").unwrap();
    builder.add_action(b, Bounce).unwrap();
    builder.add_action(a, Bounce).unwrap();
    builder.add_transition(a, NEXT, b).unwrap();
    builder.add_transition(b, NEXT, a).unwrap();
    let mut fsm = builder.build(a).unwrap();

    let mut data = Speaker::default();
    let err = fsm.update(&mut data, &tick(0)).unwrap_err();
    assert!(matches!(err, FsmError::TransitionLimit { .. }));
}
