#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Deepdelve engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`GridMap`] and [`EnemyView`], and respond exclusively with
//! new command batches.

pub mod catalog;
mod map;

use std::{ops::RangeInclusive, time::Duration};

use serde::{Deserialize, Serialize};

pub use catalog::{
    AiBehavior, Archetype, ArchetypeId, EnemyBase, EnemyBaseId, EquipSlot, Grip, ItemBase,
    ItemBaseId, ItemBonuses, ItemKind, PotionEffect, Stats,
};
pub use map::{normalize_angle, ExploredGrid, GridMap, MapShapeError, Pose, Room, Tile, TileCoord};

/// Phase of the turn state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// No game has been started yet.
    Uninitialized,
    /// Party members choose actions.
    Player,
    /// Enemies resolve their moves and attacks.
    Enemy,
    /// Every party member has fallen. Terminal.
    GameOver,
}

/// Relative or explicit movement requested by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// One tile along the heading.
    Forward,
    /// One tile against the heading.
    Backward,
    /// Quarter turn counter-clockwise. Never consumes the turn.
    TurnLeft,
    /// Quarter turn clockwise. Never consumes the turn.
    TurnRight,
    /// Explicit tile delta, independent of heading.
    Step {
        /// Column delta.
        dx: i32,
        /// Row delta.
        dy: i32,
    },
}

/// Offensive options available to a party member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStyle {
    /// Weapon strike against the tile in front.
    Melee,
    /// Shot from a ranged main-hand weapon.
    Ranged,
    /// Spell costing a fixed amount of mana.
    Magic,
}

/// Action performed by the active party member during the player phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Walk or turn.
    Move(Movement),
    /// Use whatever lies in front (door, chest) or the stairs underfoot.
    Interact,
    /// Attack the enemy directly in front.
    Attack(AttackStyle),
}

/// Party member requested when a new game starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMemberSpec {
    /// Display name.
    pub name: String,
    /// Class template.
    pub archetype: ArchetypeId,
}

impl PartyMemberSpec {
    /// Creates a party member request.
    #[must_use]
    pub fn new<T>(name: T, archetype: ArchetypeId) -> Self
    where
        T: Into<String>,
    {
        Self {
            name: name.into(),
            archetype,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Forms the party, generates the first level and enters the player phase.
    StartGame {
        /// Requested party, truncated to the configured maximum size.
        party: Vec<PartyMemberSpec>,
    },
    /// Advances the elapsed play time while the game is active.
    Tick {
        /// Duration of real time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Performs an action with the active party member.
    Player(PlayerAction),
    /// Makes another living party member the active one.
    SelectCharacter {
        /// Party index of the member to activate.
        index: usize,
    },
    /// Drinks the potion in an inventory slot. Consumes the turn.
    UseItem {
        /// Party index of the acting member.
        character: usize,
        /// Inventory slot holding the item.
        slot: usize,
    },
    /// Equips the item in an inventory slot. Consumes the turn.
    EquipItem {
        /// Party index of the acting member.
        character: usize,
        /// Inventory slot holding the item.
        slot: usize,
    },
    /// Moves an equipped item back to the inventory. Consumes the turn.
    UnequipItem {
        /// Party index of the acting member.
        character: usize,
        /// Equipment slot to vacate.
        slot: EquipSlot,
    },
    /// Drops an inventory item on the party's tile. Free action.
    DropItem {
        /// Party index of the owner.
        character: usize,
        /// Inventory slot holding the item.
        slot: usize,
    },
    /// Requests that an enemy strike a party member.
    EnemyAttack {
        /// Attacking enemy.
        enemy: EnemyId,
        /// Party index of the target.
        target: usize,
        /// Random damage multiplier in `[0.75, 1.25)`.
        multiplier: f32,
    },
    /// Requests that an enemy step onto a neighbouring tile.
    EnemyStep {
        /// Moving enemy.
        enemy: EnemyId,
        /// Destination tile.
        to: TileCoord,
    },
    /// Closes the enemy phase once every enemy has acted.
    EndEnemyTurn,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new game began on the provided dungeon level.
    GameStarted {
        /// Dungeon level the party starts on.
        dungeon_level: u32,
    },
    /// Elapsed play time advanced.
    TimeAdvanced {
        /// Duration added.
        dt: Duration,
    },
    /// The turn state machine entered a new phase.
    TurnPhaseChanged {
        /// Phase that became active.
        phase: TurnPhase,
    },
    /// A different party member became the active one.
    ActiveCharacterChanged {
        /// Party index of the newly active member.
        index: usize,
    },
    /// A command was refused without mutating any state.
    ActionRejected {
        /// Why the command was refused.
        reason: RejectionReason,
    },
    /// The party walked onto a new tile.
    PartyMoved {
        /// Tile left behind.
        from: TileCoord,
        /// Tile now occupied.
        to: TileCoord,
    },
    /// The party turned in place.
    PartyTurned {
        /// New heading in radians.
        angle: f32,
    },
    /// The party is standing on the stairs down.
    StairsFound {
        /// Tile holding the stairs.
        tile: TileCoord,
    },
    /// A door changed state.
    DoorToggled {
        /// Door tile.
        tile: TileCoord,
        /// Whether the door is now open.
        open: bool,
    },
    /// A chest was opened.
    ChestOpened {
        /// Chest tile.
        tile: TileCoord,
        /// Number of items rolled from it.
        loot_count: u32,
    },
    /// A party member received an item.
    ItemPickedUp {
        /// Party index of the recipient.
        character: usize,
        /// Item received.
        item: ItemId,
        /// Template of the item.
        base: ItemBaseId,
    },
    /// An item could not be carried and stays on (or was placed on) the floor.
    ItemLeftOnFloor {
        /// Item concerned.
        item: ItemId,
        /// Tile where it lies.
        tile: TileCoord,
    },
    /// An item was placed on the floor.
    ItemDropped {
        /// Item dropped.
        item: ItemId,
        /// Template of the item.
        base: ItemBaseId,
        /// Tile where it landed.
        tile: TileCoord,
    },
    /// A potion was consumed.
    ItemUsed {
        /// Party index of the drinker.
        character: usize,
        /// Template of the potion.
        base: ItemBaseId,
    },
    /// An item moved from the inventory into an equipment slot.
    ItemEquipped {
        /// Party index of the wearer.
        character: usize,
        /// Item equipped.
        item: ItemId,
        /// Slot it now occupies.
        slot: EquipSlot,
    },
    /// An item left an equipment slot.
    ItemUnequipped {
        /// Party index of the former wearer.
        character: usize,
        /// Item removed.
        item: ItemId,
        /// Slot it vacated.
        slot: EquipSlot,
    },
    /// A party member attacked but nothing stood in front of them.
    AttackMissed {
        /// Party index of the attacker.
        character: usize,
        /// Attack used.
        style: AttackStyle,
    },
    /// Mana was spent casting a spell.
    ManaSpent {
        /// Party index of the caster.
        character: usize,
        /// Mana consumed.
        amount: i32,
    },
    /// An enemy took damage from a party member.
    EnemyDamaged {
        /// Enemy struck.
        enemy: EnemyId,
        /// Party index of the attacker.
        attacker: usize,
        /// Attack used.
        style: AttackStyle,
        /// Hit points removed.
        damage: i32,
        /// Hit points left, never negative.
        remaining_hp: i32,
    },
    /// An enemy was slain and removed from the level.
    EnemyDefeated {
        /// Enemy slain.
        enemy: EnemyId,
        /// Template of the enemy.
        base: EnemyBaseId,
        /// Tile it died on.
        tile: TileCoord,
        /// Experience awarded to the party.
        xp: i32,
        /// Gold awarded to the party leader.
        gold: i32,
    },
    /// An enemy moved one tile.
    EnemyMoved {
        /// Enemy that moved.
        enemy: EnemyId,
        /// Tile left behind.
        from: TileCoord,
        /// Tile now occupied.
        to: TileCoord,
    },
    /// A party member took damage from an enemy.
    CharacterDamaged {
        /// Party index of the victim.
        character: usize,
        /// Attacking enemy.
        enemy: EnemyId,
        /// Hit points removed.
        damage: i32,
        /// Hit points left, never negative.
        remaining_hp: i32,
    },
    /// A party member's hit points or mana were restored.
    CharacterRestored {
        /// Party index of the member.
        character: usize,
        /// Hit points restored.
        hp: i32,
        /// Mana restored.
        mp: i32,
    },
    /// A party member fell.
    CharacterDefeated {
        /// Party index of the fallen member.
        character: usize,
    },
    /// A party member earned experience.
    ExperienceGained {
        /// Party index of the member.
        character: usize,
        /// Experience gained.
        amount: i32,
    },
    /// A party member reached a new level.
    LeveledUp {
        /// Party index of the member.
        character: usize,
        /// Level reached.
        level: u32,
    },
    /// Gold was added to a party member's purse.
    GoldGained {
        /// Party index of the recipient.
        character: usize,
        /// Gold gained.
        amount: i32,
    },
    /// The party descended to a freshly generated level.
    DungeonDescended {
        /// New dungeon level.
        dungeon_level: u32,
    },
}

/// Reasons a command may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No game is running, or the game has ended.
    GameInactive,
    /// A new game needs at least one party member.
    EmptyParty,
    /// The command is not valid during the current turn phase.
    WrongPhase,
    /// The party index does not exist.
    UnknownCharacter,
    /// The member is dead or already acted this round.
    CharacterUnavailable,
    /// The destination tile is solid or void.
    Blocked,
    /// Nothing in front to interact with and no stairs underfoot.
    NothingToInteract,
    /// Ranged attacks need a ranged main-hand weapon.
    NoRangedWeapon,
    /// Not enough mana for the spell.
    InsufficientMana,
    /// The inventory slot is empty.
    EmptySlot,
    /// The item cannot be used or equipped this way.
    NotUsable,
    /// The enemy does not exist or the requested move is illegal.
    InvalidEnemyAction,
}

/// Unique identifier assigned to an enemy instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a new item identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single enemy used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Template the enemy was stamped from.
    pub base: EnemyBaseId,
    /// Tile currently occupied.
    pub tile: TileCoord,
    /// Current hit points.
    pub hp: i32,
    /// Hit points at spawn.
    pub max_hp: i32,
    /// Behaviour tag.
    pub behavior: AiBehavior,
}

/// Read-only snapshot describing all enemies on the level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Enemy standing on the tile, if any.
    #[must_use]
    pub fn at(&self, tile: TileCoord) -> Option<&EnemySnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.tile == tile)
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Item lying on the floor of the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorItemSnapshot {
    /// Item identity.
    pub id: ItemId,
    /// Template of the item.
    pub base: ItemBaseId,
    /// Tile the item lies on.
    pub tile: TileCoord,
}

/// Party member summary used by systems that pick targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartyMemberSnapshot {
    /// Index within the party.
    pub index: usize,
    /// Whether the member still stands.
    pub alive: bool,
    /// Current hit points.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
}

/// Tunable rules for dungeon generation, party limits and combat constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    /// Inclusive range of rooms attempted per level.
    pub room_count: RangeInclusive<u32>,
    /// Inclusive range of room edge lengths.
    pub room_size: RangeInclusive<u32>,
    /// Placement attempts for each room before giving up on it.
    pub room_attempts: u32,
    /// Chance that an eligible room-border wall becomes a closed door.
    pub door_chance: f32,
    /// Maximum number of party members.
    pub max_party_size: usize,
    /// Inventory slots per character.
    pub inventory_slots: usize,
    /// Gold carried by the party leader at the start.
    pub initial_gold: i32,
    /// Experience required for the first level up.
    pub base_next_level_xp: i32,
    /// Growth factor applied to the threshold on every level up.
    pub xp_multiplier: f64,
    /// Mana spent by a magic attack.
    pub magic_cost: i32,
    /// Flat bonus added to magic power by a magic attack.
    pub magic_damage_bonus: i32,
    /// Chance that a slain enemy drops an item.
    pub drop_chance: f32,
    /// Placement attempts per enemy or item when populating a level.
    pub spawn_attempts: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            map_width: 25,
            map_height: 25,
            room_count: 6..=10,
            room_size: 4..=8,
            room_attempts: 8,
            door_chance: 0.3,
            max_party_size: 4,
            inventory_slots: 16,
            initial_gold: 100,
            base_next_level_xp: 100,
            xp_multiplier: 1.65,
            magic_cost: 10,
            magic_damage_bonus: 10,
            drop_chance: 0.3,
            spawn_attempts: 15,
        }
    }
}
