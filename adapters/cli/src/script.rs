use std::time::Duration;

use deepdelve_core::{
    ArchetypeId, AttackStyle, Command, EquipSlot, Movement, PartyMemberSpec, PlayerAction,
};
use thiserror::Error;

/// Errors raised while reading party and action scripts.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The token names no known action.
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    /// An action argument was missing or malformed.
    #[error("action '{action}' has an invalid argument '{argument}'")]
    InvalidArgument {
        /// Action being parsed.
        action: String,
        /// Offending argument.
        argument: String,
    },
    /// The party entry names no known class.
    #[error("unknown archetype '{0}'")]
    UnknownArchetype(String),
    /// The party entry is not `name:archetype`.
    #[error("party member '{0}' must be written as name:archetype")]
    MalformedMember(String),
}

/// Parses `name:archetype` entries separated by commas.
pub(crate) fn parse_party(value: &str) -> Result<Vec<PartyMemberSpec>, ScriptError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, archetype) = entry
                .split_once(':')
                .ok_or_else(|| ScriptError::MalformedMember(entry.to_owned()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(ScriptError::MalformedMember(entry.to_owned()));
            }
            Ok(PartyMemberSpec::new(name, parse_archetype(archetype.trim())?))
        })
        .collect()
}

fn parse_archetype(value: &str) -> Result<ArchetypeId, ScriptError> {
    match value.to_ascii_lowercase().as_str() {
        "warrior" => Ok(ArchetypeId::Warrior),
        "mage" => Ok(ArchetypeId::Mage),
        "ranger" => Ok(ArchetypeId::Ranger),
        "knight" => Ok(ArchetypeId::Knight),
        "rogue" => Ok(ArchetypeId::Rogue),
        "cleric" => Ok(ArchetypeId::Cleric),
        _ => Err(ScriptError::UnknownArchetype(value.to_owned())),
    }
}

/// Parses whitespace or comma separated action tokens.
///
/// Tokens are `f`, `b`, `l`, `r`, `i`, `melee`, `ranged`, `magic`,
/// `step:dx:dy`, `select:n`, `use:n:slot`, `equip:n:slot`,
/// `unequip:n:equip_slot`, `drop:n:slot` and `tick:millis`.
pub(crate) fn parse_actions(script: &str) -> Result<Vec<Command>, ScriptError> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_action)
        .collect()
}

fn parse_action(token: &str) -> Result<Command, ScriptError> {
    let mut parts = token.split(':');
    let action = parts.next().unwrap_or_default().to_ascii_lowercase();
    let arguments: Vec<&str> = parts.collect();
    let argument = |index: usize| -> Result<&str, ScriptError> {
        arguments
            .get(index)
            .copied()
            .ok_or_else(|| ScriptError::InvalidArgument {
                action: action.clone(),
                argument: String::new(),
            })
    };
    let number = |index: usize| -> Result<i64, ScriptError> {
        let raw = argument(index)?;
        raw.parse().map_err(|_| ScriptError::InvalidArgument {
            action: action.clone(),
            argument: raw.to_owned(),
        })
    };
    let index = |position: usize| -> Result<usize, ScriptError> {
        let value = number(position)?;
        usize::try_from(value).map_err(|_| ScriptError::InvalidArgument {
            action: action.clone(),
            argument: value.to_string(),
        })
    };
    let delta = |position: usize| -> Result<i32, ScriptError> {
        let value = number(position)?;
        i32::try_from(value).map_err(|_| ScriptError::InvalidArgument {
            action: action.clone(),
            argument: value.to_string(),
        })
    };

    let command = match action.as_str() {
        "f" | "forward" => Command::Player(PlayerAction::Move(Movement::Forward)),
        "b" | "back" => Command::Player(PlayerAction::Move(Movement::Backward)),
        "l" | "left" => Command::Player(PlayerAction::Move(Movement::TurnLeft)),
        "r" | "right" => Command::Player(PlayerAction::Move(Movement::TurnRight)),
        "i" | "interact" => Command::Player(PlayerAction::Interact),
        "melee" => Command::Player(PlayerAction::Attack(AttackStyle::Melee)),
        "ranged" => Command::Player(PlayerAction::Attack(AttackStyle::Ranged)),
        "magic" => Command::Player(PlayerAction::Attack(AttackStyle::Magic)),
        "step" => Command::Player(PlayerAction::Move(Movement::Step {
            dx: delta(0)?,
            dy: delta(1)?,
        })),
        "select" => Command::SelectCharacter { index: index(0)? },
        "use" => Command::UseItem {
            character: index(0)?,
            slot: index(1)?,
        },
        "equip" => Command::EquipItem {
            character: index(0)?,
            slot: index(1)?,
        },
        "unequip" => Command::UnequipItem {
            character: index(0)?,
            slot: parse_equip_slot(&action, argument(1)?)?,
        },
        "drop" => Command::DropItem {
            character: index(0)?,
            slot: index(1)?,
        },
        "tick" => {
            let millis = u64::try_from(number(0)?).map_err(|_| ScriptError::InvalidArgument {
                action: action.clone(),
                argument: arguments.first().copied().unwrap_or_default().to_owned(),
            })?;
            Command::Tick {
                dt: Duration::from_millis(millis),
            }
        }
        _ => return Err(ScriptError::UnknownAction(token.to_owned())),
    };
    Ok(command)
}

fn parse_equip_slot(action: &str, value: &str) -> Result<EquipSlot, ScriptError> {
    let slot = match value.to_ascii_lowercase().as_str() {
        "main_hand" => EquipSlot::MainHand,
        "off_hand" => EquipSlot::OffHand,
        "body" => EquipSlot::Body,
        "head" => EquipSlot::Head,
        "feet" => EquipSlot::Feet,
        "amulet" => EquipSlot::Amulet,
        "ring1" => EquipSlot::Ring1,
        "ring2" => EquipSlot::Ring2,
        _ => {
            return Err(ScriptError::InvalidArgument {
                action: action.to_owned(),
                argument: value.to_owned(),
            })
        }
    };
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_entries_accept_any_case() {
        let party = parse_party("Odo:Knight, Lio:mage").expect("party parses");
        assert_eq!(
            party,
            vec![
                PartyMemberSpec::new("Odo", ArchetypeId::Knight),
                PartyMemberSpec::new("Lio", ArchetypeId::Mage),
            ]
        );
    }

    #[test]
    fn malformed_party_entries_are_reported() {
        assert_eq!(
            parse_party("Odo"),
            Err(ScriptError::MalformedMember("Odo".to_owned()))
        );
        assert_eq!(
            parse_party("Odo:bard"),
            Err(ScriptError::UnknownArchetype("bard".to_owned()))
        );
    }

    #[test]
    fn actions_mix_short_and_argument_forms() {
        let commands = parse_actions("f l,melee step:1:-1 unequip:0:main_hand tick:250")
            .expect("script parses");
        assert_eq!(
            commands,
            vec![
                Command::Player(PlayerAction::Move(Movement::Forward)),
                Command::Player(PlayerAction::Move(Movement::TurnLeft)),
                Command::Player(PlayerAction::Attack(AttackStyle::Melee)),
                Command::Player(PlayerAction::Move(Movement::Step { dx: 1, dy: -1 })),
                Command::UnequipItem {
                    character: 0,
                    slot: EquipSlot::MainHand
                },
                Command::Tick {
                    dt: Duration::from_millis(250)
                },
            ]
        );
    }

    #[test]
    fn bad_tokens_name_the_culprit() {
        assert_eq!(
            parse_actions("f dance"),
            Err(ScriptError::UnknownAction("dance".to_owned()))
        );
        assert_eq!(
            parse_actions("use:0:x"),
            Err(ScriptError::InvalidArgument {
                action: "use".to_owned(),
                argument: "x".to_owned()
            })
        );
        assert_eq!(
            parse_actions("select:-1"),
            Err(ScriptError::InvalidArgument {
                action: "select".to_owned(),
                argument: "-1".to_owned()
            })
        );
    }
}
