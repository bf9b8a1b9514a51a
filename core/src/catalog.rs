//! Immutable template catalog: playable archetypes, item bases and enemy bases.
//!
//! Templates never change at runtime. The world stamps fresh instances from
//! them with level-scaled numbers and a unique identity.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Primary character statistics. Growth is fractional, so values are `f32`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Hit point pool.
    pub hp: f32,
    /// Mana pool.
    pub mp: f32,
    /// Physical attack power.
    pub attack: f32,
    /// Physical damage reduction.
    pub defense: f32,
    /// Spell power.
    pub magic: f32,
    /// Magical damage reduction.
    pub resistance: f32,
    /// Initiative.
    pub speed: f32,
}

impl Stats {
    /// All-zero statistics.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// Creates a stat block.
    #[must_use]
    pub const fn new(
        hp: f32,
        mp: f32,
        attack: f32,
        defense: f32,
        magic: f32,
        resistance: f32,
        speed: f32,
    ) -> Self {
        Self {
            hp,
            mp,
            attack,
            defense,
            magic,
            resistance,
            speed,
        }
    }

    /// Scales every field by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(
            self.hp * factor,
            self.mp * factor,
            self.attack * factor,
            self.defense * factor,
            self.magic * factor,
            self.resistance * factor,
            self.speed * factor,
        )
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        Stats::new(
            self.hp + other.hp,
            self.mp + other.mp,
            self.attack + other.attack,
            self.defense + other.defense,
            self.magic + other.magic,
            self.resistance + other.resistance,
            self.speed + other.speed,
        )
    }
}

/// Playable class identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeId {
    /// Balanced melee fighter.
    Warrior,
    /// Fragile spellcaster.
    Mage,
    /// Archer.
    Ranger,
    /// Heavily armoured defender.
    Knight,
    /// Fast striker.
    Rogue,
    /// Holy caster with a shield.
    Cleric,
}

impl ArchetypeId {
    /// Every archetype in catalog order.
    pub const ALL: [ArchetypeId; 6] = [
        Self::Warrior,
        Self::Mage,
        Self::Ranger,
        Self::Knight,
        Self::Rogue,
        Self::Cleric,
    ];

    /// Stable lowercase key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Ranger => "ranger",
            Self::Knight => "knight",
            Self::Rogue => "rogue",
            Self::Cleric => "cleric",
        }
    }

    /// Parses a lowercase key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|archetype| archetype.key().eq_ignore_ascii_case(key))
    }

    /// Template describing the archetype.
    #[must_use]
    pub fn template(self) -> &'static Archetype {
        match self {
            Self::Warrior => &WARRIOR,
            Self::Mage => &MAGE,
            Self::Ranger => &RANGER,
            Self::Knight => &KNIGHT,
            Self::Rogue => &ROGUE,
            Self::Cleric => &CLERIC,
        }
    }
}

/// Immutable playable class template.
#[derive(Debug, PartialEq)]
pub struct Archetype {
    /// Display name.
    pub name: &'static str,
    /// Level 1 statistics.
    pub base_stats: Stats,
    /// Increments gained on every level beyond the first.
    pub level_bonuses: Stats,
    /// Gear equipped at party formation.
    pub starting_equipment: &'static [ItemBaseId],
    /// Whether the class is primarily a spellcaster.
    pub spellcaster: bool,
}

static WARRIOR: Archetype = Archetype {
    name: "Warrior",
    base_stats: Stats::new(120.0, 20.0, 12.0, 10.0, 3.0, 5.0, 8.0),
    level_bonuses: Stats::new(15.0, 2.0, 2.0, 1.5, 0.2, 0.5, 0.3),
    starting_equipment: &[ItemBaseId::ShortswordBasic, ItemBaseId::LeatherJerkinBasic],
    spellcaster: false,
};

static MAGE: Archetype = Archetype {
    name: "Mage",
    base_stats: Stats::new(70.0, 80.0, 5.0, 4.0, 15.0, 8.0, 7.0),
    level_bonuses: Stats::new(8.0, 10.0, 0.5, 0.3, 2.5, 1.0, 0.2),
    starting_equipment: &[ItemBaseId::StaffApprentice, ItemBaseId::RobesNovice],
    spellcaster: true,
};

static RANGER: Archetype = Archetype {
    name: "Ranger",
    base_stats: Stats::new(95.0, 40.0, 10.0, 6.0, 5.0, 6.0, 10.0),
    level_bonuses: Stats::new(10.0, 4.0, 1.5, 0.8, 0.5, 0.7, 0.5),
    starting_equipment: &[ItemBaseId::ShortbowHunting, ItemBaseId::StuddedLeatherBasic],
    spellcaster: false,
};

static KNIGHT: Archetype = Archetype {
    name: "Knight",
    base_stats: Stats::new(150.0, 15.0, 10.0, 15.0, 2.0, 10.0, 5.0),
    level_bonuses: Stats::new(18.0, 1.0, 1.2, 2.0, 0.1, 1.2, 0.1),
    starting_equipment: &[
        ItemBaseId::LongswordBasic,
        ItemBaseId::ChainmailFull,
        ItemBaseId::ShieldHeater,
    ],
    spellcaster: false,
};

static ROGUE: Archetype = Archetype {
    name: "Rogue",
    base_stats: Stats::new(85.0, 30.0, 11.0, 5.0, 4.0, 4.0, 12.0),
    level_bonuses: Stats::new(9.0, 3.0, 1.8, 0.6, 0.3, 0.4, 0.8),
    starting_equipment: &[ItemBaseId::DaggerSharp, ItemBaseId::LeatherShadow],
    spellcaster: false,
};

static CLERIC: Archetype = Archetype {
    name: "Cleric",
    base_stats: Stats::new(90.0, 65.0, 8.0, 7.0, 10.0, 9.0, 6.0),
    level_bonuses: Stats::new(10.0, 7.0, 0.8, 1.0, 1.5, 1.2, 0.2),
    starting_equipment: &[
        ItemBaseId::MaceBlessed,
        ItemBaseId::ScaleMailHoly,
        ItemBaseId::ShieldRoundHoly,
    ],
    spellcaster: true,
};

/// Named equipment slots carried by every character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Primary weapon hand.
    MainHand,
    /// Shield hand.
    OffHand,
    /// Body armour.
    Body,
    /// Helmet.
    Head,
    /// Boots.
    Feet,
    /// Neck.
    Amulet,
    /// First ring finger.
    Ring1,
    /// Second ring finger.
    Ring2,
}

impl EquipSlot {
    /// Every slot in display order.
    pub const ALL: [EquipSlot; 8] = [
        Self::MainHand,
        Self::OffHand,
        Self::Body,
        Self::Head,
        Self::Feet,
        Self::Amulet,
        Self::Ring1,
        Self::Ring2,
    ];
}

/// How a weapon is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grip {
    /// Leaves the off hand free.
    OneHanded,
    /// Occupies both hands.
    TwoHanded,
}

/// Consumable effect applied by potions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotionEffect {
    /// Restores hit points.
    Heal(i32),
    /// Restores mana.
    RestoreMana(i32),
}

/// Category of an item; decides where it can be equipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Wielded weapon.
    Weapon {
        /// Hands occupied.
        grip: Grip,
        /// Whether the weapon can attack at range.
        ranged: bool,
    },
    /// Body armour.
    Armor,
    /// Off-hand shield.
    Shield,
    /// Neck jewellery.
    Amulet,
    /// Single-use consumable.
    Potion(PotionEffect),
}

impl ItemKind {
    /// Slot the item occupies when equipped, if it can be equipped at all.
    #[must_use]
    pub const fn equip_slot(self) -> Option<EquipSlot> {
        match self {
            Self::Weapon { .. } => Some(EquipSlot::MainHand),
            Self::Armor => Some(EquipSlot::Body),
            Self::Shield => Some(EquipSlot::OffHand),
            Self::Amulet => Some(EquipSlot::Amulet),
            Self::Potion(_) => None,
        }
    }

    /// Reports whether the item occupies both hands.
    #[must_use]
    pub const fn is_two_handed(self) -> bool {
        matches!(
            self,
            Self::Weapon {
                grip: Grip::TwoHanded,
                ..
            }
        )
    }

    /// Reports whether the item enables ranged attacks.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Weapon { ranged: true, .. })
    }
}

/// Flat bonuses granted by an item while equipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemBonuses {
    /// Added to attack.
    pub attack: i32,
    /// Added to defense.
    pub defense: i32,
    /// Added to magic.
    pub magic: i32,
    /// Added to maximum hit points.
    pub hp: i32,
    /// Added to maximum mana.
    pub mp: i32,
    /// Added to resistance.
    pub resistance: i32,
}

impl ItemBonuses {
    const fn new(attack: i32, defense: i32, magic: i32, hp: i32, mp: i32, resistance: i32) -> Self {
        Self {
            attack,
            defense,
            magic,
            hp,
            mp,
            resistance,
        }
    }
}

/// Item base identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemBaseId {
    /// Sharp dagger.
    DaggerSharp,
    /// Basic shortsword.
    ShortswordBasic,
    /// Basic longsword.
    LongswordBasic,
    /// Apprentice staff.
    StaffApprentice,
    /// Hunting shortbow.
    ShortbowHunting,
    /// Blessed mace.
    MaceBlessed,
    /// Novice robes.
    RobesNovice,
    /// Basic leather jerkin.
    LeatherJerkinBasic,
    /// Studded leather.
    StuddedLeatherBasic,
    /// Full chainmail.
    ChainmailFull,
    /// Holy scale mail.
    ScaleMailHoly,
    /// Shadow leather.
    LeatherShadow,
    /// Heater shield.
    ShieldHeater,
    /// Holy round shield.
    ShieldRoundHoly,
    /// Minor healing potion.
    PotionMinorHealing,
    /// Minor mana potion.
    PotionMinorMana,
}

impl ItemBaseId {
    /// Every item base; loot rolls pick uniformly from this list.
    pub const ALL: [ItemBaseId; 16] = [
        Self::DaggerSharp,
        Self::ShortswordBasic,
        Self::LongswordBasic,
        Self::StaffApprentice,
        Self::ShortbowHunting,
        Self::MaceBlessed,
        Self::RobesNovice,
        Self::LeatherJerkinBasic,
        Self::StuddedLeatherBasic,
        Self::ChainmailFull,
        Self::ScaleMailHoly,
        Self::LeatherShadow,
        Self::ShieldHeater,
        Self::ShieldRoundHoly,
        Self::PotionMinorHealing,
        Self::PotionMinorMana,
    ];

    /// Template describing the item base.
    #[must_use]
    pub fn template(self) -> &'static ItemBase {
        match self {
            Self::DaggerSharp => &ITEM_BASES[0],
            Self::ShortswordBasic => &ITEM_BASES[1],
            Self::LongswordBasic => &ITEM_BASES[2],
            Self::StaffApprentice => &ITEM_BASES[3],
            Self::ShortbowHunting => &ITEM_BASES[4],
            Self::MaceBlessed => &ITEM_BASES[5],
            Self::RobesNovice => &ITEM_BASES[6],
            Self::LeatherJerkinBasic => &ITEM_BASES[7],
            Self::StuddedLeatherBasic => &ITEM_BASES[8],
            Self::ChainmailFull => &ITEM_BASES[9],
            Self::ScaleMailHoly => &ITEM_BASES[10],
            Self::LeatherShadow => &ITEM_BASES[11],
            Self::ShieldHeater => &ITEM_BASES[12],
            Self::ShieldRoundHoly => &ITEM_BASES[13],
            Self::PotionMinorHealing => &ITEM_BASES[14],
            Self::PotionMinorMana => &ITEM_BASES[15],
        }
    }
}

/// Immutable item template.
#[derive(Debug, PartialEq)]
pub struct ItemBase {
    /// Display name.
    pub name: &'static str,
    /// Category, resolving the equip slot.
    pub kind: ItemKind,
    /// Unscaled bonuses.
    pub bonuses: ItemBonuses,
    /// Unscaled gold value.
    pub value: i32,
    /// Sprite drawn when the item lies on the floor.
    pub sprite: &'static str,
}

const ONE_HANDED: ItemKind = ItemKind::Weapon {
    grip: Grip::OneHanded,
    ranged: false,
};

static ITEM_BASES: [ItemBase; 16] = [
    ItemBase {
        name: "Sharp Dagger",
        kind: ONE_HANDED,
        bonuses: ItemBonuses::new(5, 0, 0, 0, 0, 0),
        value: 20,
        sprite: "icon-dagger",
    },
    ItemBase {
        name: "Basic Shortsword",
        kind: ONE_HANDED,
        bonuses: ItemBonuses::new(8, 0, 0, 0, 0, 0),
        value: 35,
        sprite: "icon-sword",
    },
    ItemBase {
        name: "Basic Longsword",
        kind: ONE_HANDED,
        bonuses: ItemBonuses::new(12, 0, 0, 0, 0, 0),
        value: 60,
        sprite: "icon-longsword",
    },
    ItemBase {
        name: "Apprentice Staff",
        kind: ItemKind::Weapon {
            grip: Grip::TwoHanded,
            ranged: false,
        },
        bonuses: ItemBonuses::new(4, 0, 3, 0, 10, 0),
        value: 50,
        sprite: "icon-staff",
    },
    ItemBase {
        name: "Hunting Shortbow",
        kind: ItemKind::Weapon {
            grip: Grip::TwoHanded,
            ranged: true,
        },
        bonuses: ItemBonuses::new(7, 0, 0, 0, 0, 0),
        value: 45,
        sprite: "icon-bow",
    },
    ItemBase {
        name: "Blessed Mace",
        kind: ONE_HANDED,
        bonuses: ItemBonuses::new(9, 0, 0, 0, 0, 0),
        value: 70,
        sprite: "icon-mace",
    },
    ItemBase {
        name: "Novice Robes",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 2, 0, 0, 0, 3),
        value: 25,
        sprite: "icon-robes",
    },
    ItemBase {
        name: "Basic Leather Jerkin",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 5, 0, 0, 0, 0),
        value: 40,
        sprite: "icon-leather-armor",
    },
    ItemBase {
        name: "Studded Leather",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 7, 0, 0, 0, 0),
        value: 65,
        sprite: "icon-studded-armor",
    },
    ItemBase {
        name: "Full Chainmail",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 12, 0, 0, 0, 0),
        value: 150,
        sprite: "icon-chainmail",
    },
    ItemBase {
        name: "Holy Scale Mail",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 10, 0, 0, 0, 5),
        value: 120,
        sprite: "icon-scalemail",
    },
    ItemBase {
        name: "Shadow Leather",
        kind: ItemKind::Armor,
        bonuses: ItemBonuses::new(0, 6, 0, 0, 0, 0),
        value: 80,
        sprite: "icon-shadow-armor",
    },
    ItemBase {
        name: "Heater Shield",
        kind: ItemKind::Shield,
        bonuses: ItemBonuses::new(0, 4, 0, 0, 0, 0),
        value: 50,
        sprite: "icon-shield-heater",
    },
    ItemBase {
        name: "Holy Round Shield",
        kind: ItemKind::Shield,
        bonuses: ItemBonuses::new(0, 3, 0, 0, 0, 2),
        value: 60,
        sprite: "icon-shield-round",
    },
    ItemBase {
        name: "Minor Healing Potion",
        kind: ItemKind::Potion(PotionEffect::Heal(25)),
        bonuses: ItemBonuses::new(0, 0, 0, 0, 0, 0),
        value: 15,
        sprite: "icon-potion-health",
    },
    ItemBase {
        name: "Minor Mana Potion",
        kind: ItemKind::Potion(PotionEffect::RestoreMana(20)),
        bonuses: ItemBonuses::new(0, 0, 0, 0, 0, 0),
        value: 20,
        sprite: "icon-potion-mana",
    },
];

/// Enemy base identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyBaseId {
    /// Goblin grunt.
    GoblinGrunt,
    /// Skeleton warrior.
    SkeletonWarrior,
    /// Cave spider.
    CaveSpider,
}

impl EnemyBaseId {
    /// Every enemy base; level population picks uniformly from this list.
    pub const ALL: [EnemyBaseId; 3] = [Self::GoblinGrunt, Self::SkeletonWarrior, Self::CaveSpider];

    /// Template describing the enemy base.
    #[must_use]
    pub fn template(self) -> &'static EnemyBase {
        match self {
            Self::GoblinGrunt => &GOBLIN_GRUNT,
            Self::SkeletonWarrior => &SKELETON_WARRIOR,
            Self::CaveSpider => &CAVE_SPIDER,
        }
    }
}

/// Behaviour tag attached to enemies. Every tag currently shares one policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiBehavior {
    /// Charges the party.
    MeleeAggressive,
    /// Holds ground near its spawn.
    MeleeDefender,
    /// Waits for the party to come close.
    MeleeAmbusher,
}

/// Immutable enemy template with level 1 numbers.
#[derive(Debug, PartialEq, Eq)]
pub struct EnemyBase {
    /// Display name.
    pub name: &'static str,
    /// Hit points.
    pub hp: i32,
    /// Attack power.
    pub attack: i32,
    /// Defense.
    pub defense: i32,
    /// Initiative.
    pub speed: i32,
    /// Experience awarded on defeat.
    pub xp: i32,
    /// Gold awarded on defeat.
    pub gold: i32,
    /// Billboard sprite.
    pub sprite: &'static str,
    /// Behaviour tag.
    pub behavior: AiBehavior,
}

static GOBLIN_GRUNT: EnemyBase = EnemyBase {
    name: "Goblin Grunt",
    hp: 30,
    attack: 8,
    defense: 4,
    speed: 9,
    xp: 15,
    gold: 5,
    sprite: "enemy-goblin",
    behavior: AiBehavior::MeleeAggressive,
};

static SKELETON_WARRIOR: EnemyBase = EnemyBase {
    name: "Skeleton Warrior",
    hp: 50,
    attack: 10,
    defense: 8,
    speed: 6,
    xp: 25,
    gold: 10,
    sprite: "enemy-skeleton",
    behavior: AiBehavior::MeleeDefender,
};

static CAVE_SPIDER: EnemyBase = EnemyBase {
    name: "Cave Spider",
    hp: 40,
    attack: 7,
    defense: 3,
    speed: 10,
    xp: 20,
    gold: 3,
    sprite: "enemy-spider",
    behavior: AiBehavior::MeleeAmbusher,
};

/// Scales a template number by `per_level` for every level beyond the first.
#[must_use]
pub fn scale_for_level(value: i32, level: u32, per_level: f32) -> i32 {
    let levels_beyond_first = level.saturating_sub(1) as f32;
    (value as f32 * (1.0 + levels_beyond_first * per_level)).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_resolve_from_item_kind() {
        assert_eq!(
            ItemBaseId::LongswordBasic.template().kind.equip_slot(),
            Some(EquipSlot::MainHand)
        );
        assert_eq!(
            ItemBaseId::ChainmailFull.template().kind.equip_slot(),
            Some(EquipSlot::Body)
        );
        assert_eq!(
            ItemBaseId::ShieldHeater.template().kind.equip_slot(),
            Some(EquipSlot::OffHand)
        );
        assert_eq!(
            ItemBaseId::PotionMinorMana.template().kind.equip_slot(),
            None
        );
    }

    #[test]
    fn bow_is_two_handed_and_ranged() {
        let kind = ItemBaseId::ShortbowHunting.template().kind;
        assert!(kind.is_two_handed());
        assert!(kind.is_ranged());
        assert!(!ItemBaseId::DaggerSharp.template().kind.is_ranged());
    }

    #[test]
    fn item_base_table_matches_identifier_order() {
        let names: Vec<&str> = ItemBaseId::ALL
            .iter()
            .map(|id| id.template().name)
            .collect();
        assert_eq!(names.first(), Some(&"Sharp Dagger"));
        assert_eq!(names.last(), Some(&"Minor Mana Potion"));
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn level_scaling_is_linear_and_rounded() {
        assert_eq!(scale_for_level(30, 1, 0.2), 30);
        assert_eq!(scale_for_level(30, 3, 0.2), 42);
        assert_eq!(scale_for_level(8, 2, 0.15), 9);
        assert_eq!(scale_for_level(0, 9, 0.5), 0);
    }

    #[test]
    fn archetype_keys_round_trip() {
        for archetype in ArchetypeId::ALL {
            assert_eq!(ArchetypeId::from_key(archetype.key()), Some(archetype));
        }
        assert_eq!(ArchetypeId::from_key("Knight"), Some(ArchetypeId::Knight));
        assert_eq!(ArchetypeId::from_key("bard"), None);
    }

    #[test]
    fn stats_add_fieldwise() {
        let total = Stats::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0)
            + Stats::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(total, Stats::new(2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0));
    }
}
