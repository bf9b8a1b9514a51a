use deepdelve_core::{AttackStyle, Event};

use crate::CollaboratorError;

/// Sound effects the session asks the audio collaborator to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Footstep on stone.
    Move,
    /// Weapon swing.
    Melee,
    /// Bow shot.
    Ranged,
    /// Spell cast.
    Spell,
    /// An enemy was struck.
    EnemyHit,
    /// An enemy died.
    EnemyDefeated,
    /// An item went into an inventory.
    ItemPickup,
    /// A door swung open.
    DoorOpen,
    /// A door swung shut.
    DoorClose,
    /// A chest was opened.
    ChestOpen,
    /// A party member gained a level.
    LevelUp,
    /// A potion was consumed.
    PotionDrink,
}

impl AudioCue {
    /// Stable sound identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Move => "player_move_stone",
            Self::Melee => "player_attack_sword",
            Self::Ranged => "player_attack_bow",
            Self::Spell => "player_spell_cast",
            Self::EnemyHit => "enemy_hit",
            Self::EnemyDefeated => "enemy_death_generic",
            Self::ItemPickup => "item_pickup",
            Self::DoorOpen => "door_open_wood",
            Self::DoorClose => "door_close_wood",
            Self::ChestOpen => "chest_open",
            Self::LevelUp => "level_up",
            Self::PotionDrink => "potion_drink",
        }
    }

    /// Cues accompanying a world event, in playback order.
    #[must_use]
    pub fn for_event(event: &Event) -> &'static [AudioCue] {
        match event {
            Event::PartyMoved { .. } => &[Self::Move],
            Event::AttackMissed { style, .. } => match style {
                AttackStyle::Melee => &[Self::Melee],
                AttackStyle::Ranged => &[Self::Ranged],
                AttackStyle::Magic => &[Self::Spell],
            },
            Event::EnemyDamaged { style, .. } => match style {
                AttackStyle::Melee => &[Self::Melee, Self::EnemyHit],
                AttackStyle::Ranged => &[Self::Ranged, Self::EnemyHit],
                AttackStyle::Magic => &[Self::Spell, Self::EnemyHit],
            },
            Event::EnemyDefeated { .. } => &[Self::EnemyDefeated],
            Event::ItemPickedUp { .. } => &[Self::ItemPickup],
            Event::DoorToggled { open: true, .. } => &[Self::DoorOpen],
            Event::DoorToggled { open: false, .. } => &[Self::DoorClose],
            Event::ChestOpened { .. } => &[Self::ChestOpen],
            Event::LeveledUp { .. } => &[Self::LevelUp],
            Event::ItemUsed { .. } => &[Self::PotionDrink],
            _ => &[],
        }
    }
}

/// Audio playback collaborator. Failures are logged by the session and
/// otherwise ignored.
pub trait AudioSink {
    /// Plays a cue.
    fn play(&mut self, cue: AudioCue) -> Result<(), CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use deepdelve_core::{EnemyId, TileCoord};

    use super::*;

    #[test]
    fn strikes_play_the_weapon_then_the_impact() {
        let event = Event::EnemyDamaged {
            enemy: EnemyId::new(1),
            attacker: 0,
            style: AttackStyle::Ranged,
            damage: 4,
            remaining_hp: 10,
        };
        assert_eq!(
            AudioCue::for_event(&event),
            &[AudioCue::Ranged, AudioCue::EnemyHit]
        );
    }

    #[test]
    fn doors_pick_the_cue_from_their_new_state() {
        let tile = TileCoord::new(3, 3);
        let opened = Event::DoorToggled { tile, open: true };
        let closed = Event::DoorToggled { tile, open: false };
        assert_eq!(AudioCue::for_event(&opened), &[AudioCue::DoorOpen]);
        assert_eq!(AudioCue::for_event(&closed), &[AudioCue::DoorClose]);
        assert_eq!(AudioCue::DoorOpen.id(), "door_open_wood");
    }

    #[test]
    fn silent_events_have_no_cues() {
        let event = Event::ActiveCharacterChanged { index: 1 };
        assert!(AudioCue::for_event(&event).is_empty());
    }
}
