#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command and notification surface of a Deepdelve game.
//!
//! A [`Session`] owns the world and the systems that react to it. Every
//! [`Session::dispatch`] applies one command and then runs the complete enemy
//! pass before returning, so observers and frames never see a half-applied
//! turn. Persistence and audio are external collaborators reached through
//! the [`Persistence`] and [`AudioSink`] traits.

mod audio;
mod persistence;

use std::time::Duration;

use deepdelve_core::{Command, DungeonConfig, Event, TurnPhase};
use deepdelve_rendering::{AssetProvider, Frame, Viewport};
use deepdelve_system_enemy_ai::EnemyAi;
use deepdelve_system_projection::{Projection, ProjectionConfig, ScreenSprite};
use deepdelve_system_raycaster::{RaySweep, RaycastConfig, Raycaster};
use deepdelve_world::{self as world, query, derive_level_seed, GameSnapshot, World};
use thiserror::Error;

pub use audio::{AudioCue, AudioSink};
pub use persistence::{MemoryPersistence, Persistence};

/// Error type reported by external collaborators.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

const AI_STREAM: u64 = 0x6a09_e667_f3bc_c908;

/// Failures surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The persistence provider refused to store the snapshot.
    #[error("failed to save the game")]
    Save(#[source] CollaboratorError),
    /// The persistence provider could not remove the stored record.
    #[error("failed to clear the saved game")]
    Clear(#[source] CollaboratorError),
}

/// Receives world events after each dispatched command.
pub trait SessionObserver {
    /// Called once per event, in emission order.
    fn on_event(&mut self, event: &Event);

    /// Called once after a command produced at least one event.
    fn on_state_changed(&mut self, world: &World);
}

/// Tunables of every subsystem a session drives.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Dungeon generation and rule constants.
    pub dungeon: DungeonConfig,
    /// Ray sweep tunables.
    pub raycast: RaycastConfig,
    /// Projection constants.
    pub projection: ProjectionConfig,
    /// Whether descending saves the game automatically.
    pub autosave: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dungeon: DungeonConfig::default(),
            raycast: RaycastConfig::default(),
            projection: ProjectionConfig::default(),
            autosave: true,
        }
    }
}

/// A running game together with its systems and collaborators.
pub struct Session<P: Persistence> {
    world: World,
    ai: EnemyAi,
    raycaster: Raycaster,
    sweep: RaySweep,
    projection: Projection,
    sprites: Vec<ScreenSprite>,
    persistence: P,
    audio: Option<Box<dyn AudioSink>>,
    observers: Vec<Box<dyn SessionObserver>>,
    commands: Vec<Command>,
    autosave: bool,
}

impl<P: Persistence> Session<P> {
    /// Creates an idle session. Dispatch [`Command::StartGame`] to begin.
    #[must_use]
    pub fn new(config: SessionConfig, seed: u64, persistence: P) -> Self {
        Self {
            world: World::new(config.dungeon, seed),
            ai: EnemyAi::new(seed ^ AI_STREAM),
            raycaster: Raycaster::new(config.raycast),
            sweep: RaySweep::default(),
            projection: Projection::new(config.raycast, config.projection),
            sprites: Vec::new(),
            persistence,
            audio: None,
            observers: Vec::new(),
            commands: Vec::new(),
            autosave: config.autosave,
        }
    }

    /// Attaches the audio collaborator.
    #[must_use]
    pub fn with_audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    /// Registers an observer notified after every dispatch.
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    /// Read access to the world; use [`deepdelve_world::query`] on it.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The persistence collaborator.
    #[must_use]
    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Consumes the session and hands back the persistence collaborator.
    #[must_use]
    pub fn into_persistence(self) -> P {
        self.persistence
    }

    /// Reports whether the party may act right now.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        query::accepts_input(&self.world)
    }

    /// Applies a command, runs the enemy pass it may trigger and notifies
    /// observers. Returns every event produced, in order.
    pub fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.reseed_ai(&events);
        self.run_enemy_pass(&mut events);
        self.publish(&events);
        events
    }

    /// Advances the play clock.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        self.dispatch(Command::Tick { dt })
    }

    /// Persistable projection of the current game.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        query::snapshot(&self.world)
    }

    /// Stores the current game through the persistence collaborator.
    pub fn save(&mut self) -> Result<(), SessionError> {
        let snapshot = self.snapshot();
        self.persistence.save(&snapshot).map_err(SessionError::Save)?;
        tracing::info!(
            dungeon_level = snapshot.dungeon_level(),
            "game saved"
        );
        Ok(())
    }

    /// Replaces the world with the stored game.
    ///
    /// Returns `false` when nothing was stored or the record is unusable.
    /// Unusable records are cleared and the current world stays untouched.
    pub fn resume(&mut self) -> bool {
        let snapshot = match self.persistence.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return false,
            Err(error) => {
                tracing::warn!(%error, "saved game could not be read");
                self.discard_corrupt_record();
                return false;
            }
        };

        let restored = match World::restore(snapshot) {
            Ok(restored) => restored,
            Err(error) => {
                tracing::warn!(%error, "saved game rejected");
                self.discard_corrupt_record();
                return false;
            }
        };

        self.world = restored;
        self.ai = EnemyAi::new(self.level_ai_seed(query::dungeon_level(&self.world)));
        tracing::info!(
            dungeon_level = query::dungeon_level(&self.world),
            "game loaded"
        );

        // A record captured mid-pass resumes the enemy pass.
        let mut events = Vec::new();
        if query::phase(&self.world) == TurnPhase::Enemy {
            events.push(Event::TurnPhaseChanged {
                phase: TurnPhase::Enemy,
            });
            self.run_enemy_pass(&mut events);
            self.publish(&events);
        } else {
            for observer in &mut self.observers {
                observer.on_state_changed(&self.world);
            }
        }
        true
    }

    /// Removes the stored game.
    pub fn clear_save(&mut self) -> Result<(), SessionError> {
        self.persistence.clear().map_err(SessionError::Clear)
    }

    /// Renders the current view into a fresh frame.
    pub fn frame(&mut self, viewport: Viewport, assets: &dyn AssetProvider) -> Frame {
        let pose = query::pose(&self.world);
        let map = query::map(&self.world);
        self.raycaster.cast(&pose, map, &mut self.sweep);
        self.projection.prepare_sprites(
            &pose,
            &query::enemy_view(&self.world),
            &query::floor_items(&self.world),
            map,
            query::explored(&self.world),
            viewport,
            &mut self.sprites,
        );

        let mut frame = Frame::new(viewport);
        self.projection
            .compose(&self.sweep, &self.sprites, assets, &mut frame);
        frame
    }

    fn level_ai_seed(&self, dungeon_level: u32) -> u64 {
        derive_level_seed(query::seed(&self.world), dungeon_level) ^ AI_STREAM
    }

    fn reseed_ai(&mut self, events: &[Event]) {
        for event in events {
            if let Event::GameStarted { dungeon_level } | Event::DungeonDescended { dungeon_level } =
                event
            {
                self.ai = EnemyAi::new(self.level_ai_seed(*dungeon_level));
            }
        }
    }

    /// Feeds events to the enemy AI until it stops issuing commands.
    fn run_enemy_pass(&mut self, events: &mut Vec<Event>) {
        let mut fresh = events.clone();
        loop {
            self.ai.handle(
                &fresh,
                &query::enemy_view(&self.world),
                &query::party_view(&self.world),
                &query::pose(&self.world),
                query::map(&self.world),
                &mut self.commands,
            );
            if self.commands.is_empty() {
                return;
            }

            fresh.clear();
            for command in self.commands.drain(..) {
                world::apply(&mut self.world, command, &mut fresh);
            }
            events.extend(fresh.iter().cloned());
        }
    }

    fn publish(&mut self, events: &[Event]) {
        if events.is_empty() {
            return;
        }

        for event in events {
            for observer in &mut self.observers {
                observer.on_event(event);
            }
            if let Some(sink) = self.audio.as_mut() {
                for cue in AudioCue::for_event(event) {
                    if let Err(error) = sink.play(*cue) {
                        tracing::warn!(cue = cue.id(), %error, "audio playback failed");
                    }
                }
            }
        }

        for observer in &mut self.observers {
            observer.on_state_changed(&self.world);
        }

        let descended = events
            .iter()
            .any(|event| matches!(event, Event::DungeonDescended { .. }));
        if descended && self.autosave {
            if let Err(error) = self.save() {
                tracing::warn!(%error, "autosave failed");
            }
        }
    }

    fn discard_corrupt_record(&mut self) {
        if let Err(error) = self.persistence.clear() {
            tracing::warn!(%error, "corrupt saved game could not be cleared");
        }
    }
}
