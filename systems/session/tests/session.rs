use std::{cell::RefCell, rc::Rc};

use deepdelve_core::{
    ArchetypeId, AttackStyle, Command, Event, Movement, PartyMemberSpec, PlayerAction, TurnPhase,
};
use deepdelve_rendering::{DrawInstruction, PlaceholderAssets, Viewport};
use deepdelve_system_session::{
    AudioCue, AudioSink, CollaboratorError, MemoryPersistence, Session, SessionConfig,
    SessionObserver,
};
use deepdelve_world::{query, GameSnapshot, World};

fn start(seed: u64, persistence: MemoryPersistence) -> Session<MemoryPersistence> {
    let mut session = Session::new(SessionConfig::default(), seed, persistence);
    let _ = session.dispatch(Command::StartGame {
        party: vec![PartyMemberSpec::new("Vesna", ArchetypeId::Knight)],
    });
    session
}

fn melee() -> Command {
    Command::Player(PlayerAction::Attack(AttackStyle::Melee))
}

#[derive(Default)]
struct Recorded {
    events: Vec<Event>,
    state_changes: usize,
}

struct Recorder(Rc<RefCell<Recorded>>);

impl SessionObserver for Recorder {
    fn on_event(&mut self, event: &Event) {
        self.0.borrow_mut().events.push(event.clone());
    }

    fn on_state_changed(&mut self, _world: &World) {
        self.0.borrow_mut().state_changes += 1;
    }
}

struct Speaker(Rc<RefCell<Vec<AudioCue>>>);

impl AudioSink for Speaker {
    fn play(&mut self, cue: AudioCue) -> Result<(), CollaboratorError> {
        self.0.borrow_mut().push(cue);
        Ok(())
    }
}

struct BrokenSpeaker;

impl AudioSink for BrokenSpeaker {
    fn play(&mut self, _cue: AudioCue) -> Result<(), CollaboratorError> {
        Err("no audio device".into())
    }
}

#[test]
fn dispatch_runs_the_whole_enemy_pass() {
    let mut session = start(3, MemoryPersistence::new());
    let events = session.dispatch(melee());

    let phases: Vec<TurnPhase> = events
        .iter()
        .filter_map(|event| match event {
            Event::TurnPhaseChanged { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases.first(), Some(&TurnPhase::Enemy));
    let last = phases.last().copied();
    assert!(matches!(
        last,
        Some(TurnPhase::Player) | Some(TurnPhase::GameOver)
    ));
    assert_eq!(session.accepts_input(), last == Some(TurnPhase::Player));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ActionRejected { .. })));
}

#[test]
fn observers_see_every_event_and_one_state_change_per_command() {
    let mut session = start(5, MemoryPersistence::new());
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    session.add_observer(Box::new(Recorder(Rc::clone(&recorded))));

    let first = session.dispatch(Command::Player(PlayerAction::Move(Movement::TurnLeft)));
    let second = session.dispatch(melee());

    let recorded = recorded.borrow();
    let mut expected = first;
    expected.extend(second);
    assert_eq!(recorded.events, expected);
    assert_eq!(recorded.state_changes, 2);
}

#[test]
fn attacks_play_the_weapon_cue_first() {
    let cues = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::new(SessionConfig::default(), 8, MemoryPersistence::new())
        .with_audio(Box::new(Speaker(Rc::clone(&cues))));
    let _ = session.dispatch(Command::StartGame {
        party: vec![PartyMemberSpec::new("Vesna", ArchetypeId::Knight)],
    });
    cues.borrow_mut().clear();

    let _ = session.dispatch(melee());
    assert_eq!(cues.borrow().first(), Some(&AudioCue::Melee));
}

#[test]
fn audio_failures_do_not_interrupt_play() {
    let mut session = Session::new(SessionConfig::default(), 8, MemoryPersistence::new())
        .with_audio(Box::new(BrokenSpeaker));
    let _ = session.dispatch(Command::StartGame {
        party: vec![PartyMemberSpec::new("Vesna", ArchetypeId::Knight)],
    });

    let events = session.dispatch(melee());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TurnPhaseChanged { .. })));
}

#[test]
fn saved_games_resume_in_a_new_session() {
    let mut first = start(21, MemoryPersistence::new());
    let _ = first.dispatch(Command::Player(PlayerAction::Move(Movement::TurnRight)));
    let _ = first.dispatch(melee());
    first.save().expect("memory store accepts saves");
    let before = first.world();
    let record = first
        .persistence()
        .record()
        .cloned()
        .expect("record stored");

    let mut resumed = Session::new(
        SessionConfig::default(),
        0,
        MemoryPersistence::with_record(record),
    );
    assert!(resumed.resume());

    let after = resumed.world();
    assert_eq!(query::party(after), query::party(before));
    assert_eq!(query::pose(after), query::pose(before));
    assert_eq!(query::map(after), query::map(before));
    assert_eq!(query::dungeon_level(after), query::dungeon_level(before));
    assert_eq!(query::enemy_view(after), query::enemy_view(before));
    assert_eq!(resumed.accepts_input(), first.accepts_input());
}

#[test]
fn corrupt_saves_are_discarded_without_touching_the_game() {
    let source = start(4, MemoryPersistence::new());
    let mut value = serde_json::to_value(source.snapshot()).expect("snapshot serializes");
    value["version"] = serde_json::json!(9);
    let corrupt: GameSnapshot = serde_json::from_value(value).expect("shape is intact");

    let mut session = start(6, MemoryPersistence::with_record(corrupt));
    let before = session.snapshot();

    assert!(!session.resume());
    assert!(session.persistence().record().is_none());
    assert_eq!(session.snapshot(), before);
}

#[test]
fn frames_draw_background_then_walls() {
    let mut session = start(12, MemoryPersistence::new());
    let viewport = Viewport::new(320, 200).expect("positive viewport");
    let frame = session.frame(viewport, &PlaceholderAssets);

    assert!(frame.is_layered());
    let instructions = frame.instructions();
    assert!(matches!(instructions[0], DrawInstruction::Background { .. }));
    assert!(matches!(instructions[1], DrawInstruction::Background { .. }));
    assert!(instructions[2..]
        .iter()
        .any(|instruction| matches!(instruction, DrawInstruction::FlatWall { .. })));
}
