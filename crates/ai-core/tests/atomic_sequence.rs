use ai_core::{
    ActionStatus, AtomicAction, AtomicSequence, ConditionStore, SequenceStep, TickContext,
    WorldView,
};

#[derive(Default)]
struct LogWorld {
    log: Vec<String>,
}

impl WorldView for LogWorld {
    type Agent = u64;
}

/// Runs for `ticks` updates, then finishes with `result`.
struct Scripted {
    name: &'static str,
    ticks: u32,
    result: ActionStatus,
}

impl Scripted {
    fn new(name: &'static str, ticks: u32, result: ActionStatus) -> Self {
        Self {
            name,
            ticks,
            result,
        }
    }

    fn advance(&mut self) -> ActionStatus {
        if self.ticks == 0 {
            return self.result;
        }
        self.ticks -= 1;
        ActionStatus::Running
    }
}

impl AtomicAction<LogWorld> for Scripted {
    fn start(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut LogWorld,
        _beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        world.log.push(format!("{}.start", self.name));
        self.advance()
    }

    fn update(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut LogWorld,
        _beliefs: &mut ConditionStore,
    ) -> ActionStatus {
        world.log.push(format!("{}.update", self.name));
        self.advance()
    }

    fn exit(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        world: &mut LogWorld,
        _beliefs: &mut ConditionStore,
    ) {
        world.log.push(format!("{}.exit", self.name));
    }
}

fn ctx() -> TickContext {
    TickContext::new(0, 0.1)
}

#[test]
fn sequence_runs_one_lifecycle_call_per_step() {
    let mut world = LogWorld::default();
    let mut beliefs = ConditionStore::new();
    let steps: Vec<Box<dyn AtomicAction<LogWorld>>> = vec![
        Box::new(Scripted::new("a", 0, ActionStatus::Success)),
        Box::new(Scripted::new("b", 2, ActionStatus::Success)),
    ];
    let mut seq = AtomicSequence::new(steps);

    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Advanced);
    assert_eq!(seq.current_index(), 1);
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Running);
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Running);
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Completed);
    assert!(seq.is_finished());

    assert_eq!(
        world.log,
        vec!["a.start", "a.exit", "b.start", "b.update", "b.update", "b.exit"]
    );
}

#[test]
fn failure_exits_the_failed_step_and_stops() {
    let mut world = LogWorld::default();
    let mut beliefs = ConditionStore::new();
    let steps: Vec<Box<dyn AtomicAction<LogWorld>>> = vec![
        Box::new(Scripted::new("a", 1, ActionStatus::Failed)),
        Box::new(Scripted::new("b", 0, ActionStatus::Success)),
    ];
    let mut seq = AtomicSequence::new(steps);

    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Running);
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Failed);
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Failed);
    assert_eq!(world.log, vec!["a.start", "a.update", "a.exit"]);
}

#[test]
fn abort_exits_only_an_active_step() {
    let mut world = LogWorld::default();
    let mut beliefs = ConditionStore::new();
    let steps: Vec<Box<dyn AtomicAction<LogWorld>>> =
        vec![Box::new(Scripted::new("wait", 10, ActionStatus::Success))];
    let mut seq = AtomicSequence::new(steps);

    seq.abort(&ctx(), 1, &mut world, &mut beliefs);
    assert!(world.log.is_empty());

    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Running);
    assert!(seq.is_active());
    seq.abort(&ctx(), 1, &mut world, &mut beliefs);
    seq.abort(&ctx(), 1, &mut world, &mut beliefs);
    assert_eq!(world.log, vec!["wait.start", "wait.exit"]);
}

#[test]
fn empty_sequence_completes_immediately() {
    let mut world = LogWorld::default();
    let mut beliefs = ConditionStore::new();
    let mut seq = AtomicSequence::<LogWorld>::new(Vec::new());
    assert!(seq.is_empty());
    assert_eq!(seq.step(&ctx(), 1, &mut world, &mut beliefs), SequenceStep::Completed);
}

#[test]
fn rng_streams_are_deterministic_per_agent() {
    use ai_core::DeterministicRng;

    let tick = TickContext::new(7, 0.1).with_seed(42);
    let mut a = tick.rng_for_agent(1u64, 3);
    let mut b = tick.rng_for_agent(1u64, 3);
    let mut other = tick.rng_for_agent(2u64, 3);
    let first = a.next_u64();
    assert_eq!(first, b.next_u64());
    assert_ne!(first, other.next_u64());

    assert!(a.chance(1.0));
    assert!(!a.chance(0.0));
}
