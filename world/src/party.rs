//! Party members, item instances and the pure stat derivation rules.

use deepdelve_core::{
    ArchetypeId, EquipSlot, ItemBaseId, ItemBonuses, ItemId, ItemKind, PotionEffect, Stats,
};
use serde::{Deserialize, Serialize};

use deepdelve_core::catalog::scale_for_level;

const ITEM_POWER_PER_LEVEL: f32 = 0.10;
const ITEM_VALUE_PER_LEVEL: f32 = 0.15;

/// Concrete item stamped from an [`ItemBaseId`] template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    base: ItemBaseId,
    kind: ItemKind,
    slot: Option<EquipSlot>,
    bonuses: ItemBonuses,
    value: i32,
}

impl Item {
    /// Stamps a new instance with attack, defense and value scaled to `level`.
    #[must_use]
    pub fn instantiate(base: ItemBaseId, level: u32, id: ItemId) -> Self {
        let template = base.template();
        let mut bonuses = template.bonuses;
        bonuses.attack = scale_for_level(bonuses.attack, level, ITEM_POWER_PER_LEVEL);
        bonuses.defense = scale_for_level(bonuses.defense, level, ITEM_POWER_PER_LEVEL);

        Self {
            id,
            base,
            kind: template.kind,
            slot: template.kind.equip_slot(),
            bonuses,
            value: scale_for_level(template.value, level, ITEM_VALUE_PER_LEVEL),
        }
    }

    /// Identity of this instance.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Template the item was stamped from.
    #[must_use]
    pub const fn base(&self) -> ItemBaseId {
        self.base
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.base.template().name
    }

    /// Category of the item.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Slot the item occupies when equipped.
    #[must_use]
    pub const fn slot(&self) -> Option<EquipSlot> {
        self.slot
    }

    /// Level-scaled bonuses.
    #[must_use]
    pub const fn bonuses(&self) -> ItemBonuses {
        self.bonuses
    }

    /// Level-scaled gold value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.value
    }
}

/// Fixed named equipment slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    main_hand: Option<Item>,
    off_hand: Option<Item>,
    body: Option<Item>,
    head: Option<Item>,
    feet: Option<Item>,
    amulet: Option<Item>,
    ring1: Option<Item>,
    ring2: Option<Item>,
}

impl Equipment {
    fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<Item> {
        match slot {
            EquipSlot::MainHand => &mut self.main_hand,
            EquipSlot::OffHand => &mut self.off_hand,
            EquipSlot::Body => &mut self.body,
            EquipSlot::Head => &mut self.head,
            EquipSlot::Feet => &mut self.feet,
            EquipSlot::Amulet => &mut self.amulet,
            EquipSlot::Ring1 => &mut self.ring1,
            EquipSlot::Ring2 => &mut self.ring2,
        }
    }

    /// Item occupying the slot.
    #[must_use]
    pub fn get(&self, slot: EquipSlot) -> Option<&Item> {
        match slot {
            EquipSlot::MainHand => self.main_hand.as_ref(),
            EquipSlot::OffHand => self.off_hand.as_ref(),
            EquipSlot::Body => self.body.as_ref(),
            EquipSlot::Head => self.head.as_ref(),
            EquipSlot::Feet => self.feet.as_ref(),
            EquipSlot::Amulet => self.amulet.as_ref(),
            EquipSlot::Ring1 => self.ring1.as_ref(),
            EquipSlot::Ring2 => self.ring2.as_ref(),
        }
    }

    fn take(&mut self, slot: EquipSlot) -> Option<Item> {
        self.slot_mut(slot).take()
    }

    fn put(&mut self, slot: EquipSlot, item: Item) {
        *self.slot_mut(slot) = Some(item);
    }

    /// Iterator over occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        EquipSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|item| (slot, item)))
    }

    fn bonus_totals(&self) -> ItemBonuses {
        self.iter()
            .fold(ItemBonuses::default(), |mut total, (_, item)| {
                let bonuses = item.bonuses();
                total.attack += bonuses.attack;
                total.defense += bonuses.defense;
                total.magic += bonuses.magic;
                total.hp += bonuses.hp;
                total.mp += bonuses.mp;
                total.resistance += bonuses.resistance;
                total
            })
    }
}

/// Statistics after applying level growth and equipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Combined statistics.
    pub stats: Stats,
    /// Hit point ceiling.
    pub max_hp: i32,
    /// Mana ceiling.
    pub max_mp: i32,
}

/// Derives effective statistics from an archetype, a level and worn gear.
///
/// Level growth is `level_bonuses * (level - 1)` on top of the archetype's
/// level 1 statistics, so the result depends only on its inputs.
#[must_use]
pub fn recalculate_stats(
    archetype: ArchetypeId,
    level: u32,
    equipment: &Equipment,
) -> EffectiveStats {
    let template = archetype.template();
    let growth = template
        .level_bonuses
        .scaled(level.saturating_sub(1) as f32);
    let gear = equipment.bonus_totals();
    let stats = template.base_stats
        + growth
        + Stats::new(
            gear.hp as f32,
            gear.mp as f32,
            gear.attack as f32,
            gear.defense as f32,
            gear.magic as f32,
            gear.resistance as f32,
            0.0,
        );

    EffectiveStats {
        stats,
        max_hp: (stats.hp.floor() as i32).max(1),
        max_mp: (stats.mp.floor() as i32).max(0),
    }
}

/// Result of subtracting hit points from a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Hit points actually removed.
    pub dealt: i32,
    /// Hit points left.
    pub remaining: i32,
    /// Whether this hit felled the character.
    pub defeated: bool,
}

/// Result of equipping an inventory item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquipOutcome {
    /// Identity of the equipped item.
    pub item: ItemId,
    /// Slot it now occupies.
    pub slot: EquipSlot,
    /// Items moved out of their slots, paired with the slot they left.
    pub displaced: Vec<(EquipSlot, ItemId)>,
    /// Displaced items that did not fit in the inventory.
    pub overflow: Vec<Item>,
}

/// Where an unequipped item ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stowed {
    /// Returned to the inventory.
    Inventory(ItemId),
    /// Inventory was full; the caller must place the item on the floor.
    Floor(Item),
}

/// Why an inventory operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InventoryError {
    /// No item in the requested slot.
    EmptySlot,
    /// The item cannot be used in the requested way.
    NotUsable,
}

/// Member of the adventuring party.
///
/// Effective statistics are derived from archetype, level and equipment.
/// They are neither persisted nor part of equality.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Character {
    name: String,
    archetype: ArchetypeId,
    level: u32,
    xp: i32,
    next_level_xp: i32,
    #[serde(skip)]
    effective: EffectiveStats,
    current_hp: i32,
    current_mp: i32,
    inventory: Vec<Item>,
    equipment: Equipment,
    gold: i32,
    alive: bool,
    acted: bool,
}

impl PartialEq for Character {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.archetype == other.archetype
            && self.level == other.level
            && self.xp == other.xp
            && self.next_level_xp == other.next_level_xp
            && self.current_hp == other.current_hp
            && self.current_mp == other.current_mp
            && self.inventory == other.inventory
            && self.equipment == other.equipment
            && self.gold == other.gold
            && self.alive == other.alive
            && self.acted == other.acted
    }
}

impl Character {
    /// Forms a level 1 character wearing the archetype's starting gear.
    pub fn from_archetype<F>(
        name: String,
        archetype: ArchetypeId,
        next_level_xp: i32,
        mut allocate: F,
    ) -> Self
    where
        F: FnMut() -> ItemId,
    {
        let mut equipment = Equipment::default();
        for base in archetype.template().starting_equipment {
            let item = Item::instantiate(*base, 1, allocate());
            if let Some(slot) = item.slot() {
                equipment.put(slot, item);
            }
        }

        let effective = recalculate_stats(archetype, 1, &equipment);
        Self {
            name,
            archetype,
            level: 1,
            xp: 0,
            next_level_xp,
            effective,
            current_hp: effective.max_hp,
            current_mp: effective.max_mp,
            inventory: Vec::new(),
            equipment,
            gold: 0,
            alive: true,
            acted: false,
        }
    }

    /// Re-derives effective statistics and clamps hp and mp into range.
    pub fn recalculate(&mut self) {
        self.effective = recalculate_stats(self.archetype, self.level, &self.equipment);
        self.current_hp = self.current_hp.clamp(0, self.effective.max_hp);
        self.current_mp = self.current_mp.clamp(0, self.effective.max_mp);
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class template.
    #[must_use]
    pub const fn archetype(&self) -> ArchetypeId {
        self.archetype
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn xp(&self) -> i32 {
        self.xp
    }

    /// Experience threshold for the next level.
    #[must_use]
    pub const fn next_level_xp(&self) -> i32 {
        self.next_level_xp
    }

    /// Derived statistics.
    #[must_use]
    pub const fn stats(&self) -> &EffectiveStats {
        &self.effective
    }

    /// Current hit points.
    #[must_use]
    pub const fn current_hp(&self) -> i32 {
        self.current_hp
    }

    /// Current mana.
    #[must_use]
    pub const fn current_mp(&self) -> i32 {
        self.current_mp
    }

    /// Carried items in slot order.
    #[must_use]
    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    /// Worn items.
    #[must_use]
    pub const fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    /// Gold carried.
    #[must_use]
    pub const fn gold(&self) -> i32 {
        self.gold
    }

    /// Whether the character still stands.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the character already acted this round.
    #[must_use]
    pub const fn has_acted(&self) -> bool {
        self.acted
    }

    /// Whether the main hand holds a ranged weapon.
    #[must_use]
    pub fn has_ranged_weapon(&self) -> bool {
        self.equipment
            .get(EquipSlot::MainHand)
            .map_or(false, |item| item.kind().is_ranged())
    }

    pub(crate) fn can_act(&self) -> bool {
        self.alive && !self.acted
    }

    pub(crate) fn set_acted(&mut self, acted: bool) {
        self.acted = acted;
    }

    pub(crate) fn add_gold(&mut self, amount: i32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Removes hit points, felling the character at zero.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome {
                dealt: 0,
                remaining: 0,
                defeated: false,
            };
        }

        let before = self.current_hp;
        self.current_hp = (self.current_hp - amount.max(0)).clamp(0, self.effective.max_hp);
        let defeated = self.current_hp == 0;
        if defeated {
            self.alive = false;
            self.acted = true;
        }

        DamageOutcome {
            dealt: before - self.current_hp,
            remaining: self.current_hp,
            defeated,
        }
    }

    /// Restores hit points and mana up to their ceilings. Returns the amounts gained.
    pub fn restore(&mut self, hp: i32, mp: i32) -> (i32, i32) {
        if !self.alive {
            return (0, 0);
        }
        let hp_before = self.current_hp;
        let mp_before = self.current_mp;
        self.current_hp = (self.current_hp + hp.max(0)).clamp(0, self.effective.max_hp);
        self.current_mp = (self.current_mp + mp.max(0)).clamp(0, self.effective.max_mp);
        (self.current_hp - hp_before, self.current_mp - mp_before)
    }

    /// Spends mana if enough is available.
    pub fn spend_mana(&mut self, amount: i32) -> bool {
        if self.current_mp < amount {
            return false;
        }
        self.current_mp -= amount;
        true
    }

    /// Adds experience and applies every level up it pays for.
    ///
    /// Returns the levels reached, in order. Each level up fully restores hp
    /// and mana to the new ceilings.
    pub fn gain_xp(&mut self, amount: i32, multiplier: f64) -> Vec<u32> {
        let mut reached = Vec::new();
        if !self.alive || amount <= 0 {
            return reached;
        }

        self.xp = self.xp.saturating_add(amount);
        while self.alive && self.next_level_xp > 0 && self.xp >= self.next_level_xp {
            self.level += 1;
            self.xp -= self.next_level_xp;
            self.next_level_xp = (f64::from(self.next_level_xp) * multiplier).floor() as i32;
            self.recalculate();
            self.current_hp = self.effective.max_hp;
            self.current_mp = self.effective.max_mp;
            reached.push(self.level);
        }
        reached
    }

    /// Reports whether another item fits in the inventory.
    #[must_use]
    pub fn has_room(&self, capacity: usize) -> bool {
        self.inventory.len() < capacity
    }

    /// Adds an item if there is room, handing it back otherwise.
    pub fn stow(&mut self, item: Item, capacity: usize) -> Result<ItemId, Item> {
        if !self.has_room(capacity) {
            return Err(item);
        }
        let id = item.id();
        self.inventory.push(item);
        Ok(id)
    }

    /// Removes and returns the item in an inventory slot.
    pub fn remove_from_inventory(&mut self, slot: usize) -> Result<Item, InventoryError> {
        if slot >= self.inventory.len() {
            return Err(InventoryError::EmptySlot);
        }
        Ok(self.inventory.remove(slot))
    }

    /// Drinks the potion in an inventory slot.
    pub fn use_item(&mut self, slot: usize) -> Result<(ItemBaseId, i32, i32), InventoryError> {
        let item = self.inventory.get(slot).ok_or(InventoryError::EmptySlot)?;
        let ItemKind::Potion(effect) = item.kind() else {
            return Err(InventoryError::NotUsable);
        };
        let base = item.base();
        let _ = self.inventory.remove(slot);
        let (hp, mp) = match effect {
            PotionEffect::Heal(amount) => self.restore(amount, 0),
            PotionEffect::RestoreMana(amount) => self.restore(0, amount),
        };
        Ok((base, hp, mp))
    }

    /// Equips the item in an inventory slot into the slot its kind resolves to.
    ///
    /// A two-handed weapon vacates the off hand; an off-hand item vacates a
    /// two-handed main hand. Displaced items return to the inventory, and
    /// anything that does not fit is handed back in
    /// [`EquipOutcome::overflow`].
    pub fn equip(&mut self, slot: usize, capacity: usize) -> Result<EquipOutcome, InventoryError> {
        let item = self.inventory.get(slot).ok_or(InventoryError::EmptySlot)?;
        let target = item.slot().ok_or(InventoryError::NotUsable)?;
        let two_handed = item.kind().is_two_handed();
        let item = self.inventory.remove(slot);
        let item_id = item.id();

        let mut vacate = vec![target];
        if two_handed {
            vacate.push(EquipSlot::OffHand);
        }
        if target == EquipSlot::OffHand
            && self
                .equipment
                .get(EquipSlot::MainHand)
                .map_or(false, |held| held.kind().is_two_handed())
        {
            vacate.push(EquipSlot::MainHand);
        }

        let mut displaced = Vec::new();
        let mut overflow = Vec::new();
        for vacated in vacate {
            if let Some(previous) = self.equipment.take(vacated) {
                displaced.push((vacated, previous.id()));
                if let Err(previous) = self.stow(previous, capacity) {
                    overflow.push(previous);
                }
            }
        }

        self.equipment.put(target, item);
        self.recalculate();

        Ok(EquipOutcome {
            item: item_id,
            slot: target,
            displaced,
            overflow,
        })
    }

    /// Removes the item in an equipment slot.
    pub fn unequip(&mut self, slot: EquipSlot, capacity: usize) -> Result<Stowed, InventoryError> {
        let item = self.equipment.take(slot).ok_or(InventoryError::EmptySlot)?;
        let stowed = match self.stow(item, capacity) {
            Ok(id) => Stowed::Inventory(id),
            Err(item) => Stowed::Floor(item),
        };
        self.recalculate();
        Ok(stowed)
    }

    #[cfg(test)]
    pub(crate) fn set_current_hp(&mut self, hp: i32) {
        self.current_hp = hp.clamp(0, self.effective.max_hp);
    }

    #[cfg(test)]
    pub(crate) fn set_xp(&mut self, xp: i32) {
        self.xp = xp;
    }

    #[cfg(test)]
    pub(crate) fn strip_equipment(&mut self) {
        self.equipment = Equipment::default();
        self.recalculate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allocator() -> impl FnMut() -> ItemId {
        let mut next = 0;
        move || {
            next += 1;
            ItemId::new(next)
        }
    }

    fn warrior() -> Character {
        Character::from_archetype("Brakka".into(), ArchetypeId::Warrior, 100, allocator())
    }

    #[test]
    fn starting_gear_feeds_effective_stats() {
        let warrior = warrior();
        let stats = warrior.stats();
        assert_eq!(stats.max_hp, 120);
        assert!((stats.stats.attack - 20.0).abs() < f32::EPSILON);
        assert!((stats.stats.defense - 15.0).abs() < f32::EPSILON);
        assert_eq!(warrior.current_hp(), 120);
    }

    #[test]
    fn json_round_trip_compares_equal_before_recalculation() {
        let warrior = warrior();
        let json = serde_json::to_string(&warrior).expect("character serializes");
        assert!(!json.contains("effective"));

        let mut parsed: Character = serde_json::from_str(&json).expect("character parses");
        assert_eq!(parsed, warrior);
        parsed.recalculate();
        assert_eq!(parsed, warrior);
        assert_eq!(*parsed.stats(), *warrior.stats());
    }

    #[test]
    fn recalculate_is_idempotent() {
        let mut mage =
            Character::from_archetype("Ilsa".into(), ArchetypeId::Mage, 100, allocator());
        mage.recalculate();
        let first = *mage.stats();
        let hp = mage.current_hp();
        mage.recalculate();
        assert_eq!(*mage.stats(), first);
        assert_eq!(mage.current_hp(), hp);
    }

    #[test]
    fn single_level_up_restores_pools() {
        let mut warrior = warrior();
        warrior.set_xp(95);
        let _ = warrior.take_damage(50);
        let reached = warrior.gain_xp(10, 1.65);
        assert_eq!(reached, vec![2]);
        assert_eq!(warrior.xp(), 5);
        assert_eq!(warrior.next_level_xp(), 165);
        assert_eq!(warrior.current_hp(), warrior.stats().max_hp);
        assert_eq!(warrior.current_mp(), warrior.stats().max_mp);
        assert_eq!(warrior.stats().max_hp, 135);
    }

    #[test]
    fn large_xp_gain_levels_repeatedly() {
        let mut warrior = warrior();
        let reached = warrior.gain_xp(300, 1.65);
        assert_eq!(reached, vec![2, 3]);
        assert_eq!(warrior.xp(), 35);
    }

    #[test]
    fn lethal_damage_clamps_and_fells() {
        let mut warrior = warrior();
        warrior.set_current_hp(10);
        let outcome = warrior.take_damage(15);
        assert_eq!(
            outcome,
            DamageOutcome {
                dealt: 10,
                remaining: 0,
                defeated: true
            }
        );
        assert!(!warrior.is_alive());
        assert!(warrior.has_acted());
        assert_eq!(warrior.gain_xp(500, 1.65), Vec::<u32>::new());
    }

    #[test]
    fn potions_clamp_to_ceiling() {
        let mut warrior = warrior();
        let _ = warrior.take_damage(10);
        let _ = warrior.stow(
            Item::instantiate(ItemBaseId::PotionMinorHealing, 1, ItemId::new(90)),
            16,
        );
        let (base, hp, mp) = warrior.use_item(0).expect("potion is usable");
        assert_eq!(base, ItemBaseId::PotionMinorHealing);
        assert_eq!((hp, mp), (10, 0));
        assert_eq!(warrior.current_hp(), 120);
        assert!(warrior.inventory().is_empty());
    }

    #[test]
    fn armour_cannot_be_drunk() {
        let mut warrior = warrior();
        let _ = warrior.stow(
            Item::instantiate(ItemBaseId::ChainmailFull, 1, ItemId::new(91)),
            16,
        );
        assert_eq!(warrior.use_item(0), Err(InventoryError::NotUsable));
        assert_eq!(warrior.use_item(4), Err(InventoryError::EmptySlot));
        assert_eq!(warrior.inventory().len(), 1);
    }

    #[test]
    fn two_handed_weapon_vacates_off_hand() {
        let mut knight =
            Character::from_archetype("Odo".into(), ArchetypeId::Knight, 100, allocator());
        assert!(knight.equipment().get(EquipSlot::OffHand).is_some());
        let _ = knight.stow(
            Item::instantiate(ItemBaseId::StaffApprentice, 1, ItemId::new(50)),
            16,
        );

        let outcome = knight.equip(0, 16).expect("staff equips");
        assert_eq!(outcome.slot, EquipSlot::MainHand);
        assert_eq!(outcome.displaced.len(), 2);
        assert!(outcome.overflow.is_empty());
        assert!(knight.equipment().get(EquipSlot::OffHand).is_none());
        assert_eq!(knight.inventory().len(), 2);
    }

    #[test]
    fn shield_vacates_two_handed_main_hand() {
        let mut mage =
            Character::from_archetype("Ilsa".into(), ArchetypeId::Mage, 100, allocator());
        let _ = mage.stow(
            Item::instantiate(ItemBaseId::ShieldHeater, 1, ItemId::new(60)),
            16,
        );
        let outcome = mage.equip(0, 16).expect("shield equips");
        assert_eq!(outcome.displaced.len(), 1);
        assert_eq!(outcome.displaced[0].0, EquipSlot::MainHand);
        assert!(mage.equipment().get(EquipSlot::MainHand).is_none());
    }

    #[test]
    fn displaced_items_overflow_when_inventory_is_full() {
        let mut knight =
            Character::from_archetype("Odo".into(), ArchetypeId::Knight, 100, allocator());
        for id in 0..2 {
            let _ = knight.stow(
                Item::instantiate(ItemBaseId::PotionMinorMana, 1, ItemId::new(100 + id)),
                2,
            );
        }
        let _ = knight.remove_from_inventory(1);
        let _ = knight.stow(
            Item::instantiate(ItemBaseId::ShortbowHunting, 1, ItemId::new(200)),
            2,
        );

        let outcome = knight.equip(1, 2).expect("bow equips");
        assert_eq!(outcome.displaced.len(), 2);
        assert_eq!(outcome.overflow.len(), 1);
        assert_eq!(knight.inventory().len(), 2);
        assert!(knight.has_ranged_weapon());
    }

    #[test]
    fn unequip_with_full_inventory_goes_to_floor() {
        let mut warrior = warrior();
        let stowed = warrior
            .unequip(EquipSlot::MainHand, 0)
            .expect("main hand is occupied");
        assert!(matches!(stowed, Stowed::Floor(_)));
        assert!((warrior.stats().stats.attack - 12.0).abs() < f32::EPSILON);
        assert_eq!(
            warrior.unequip(EquipSlot::MainHand, 16),
            Err(InventoryError::EmptySlot)
        );
    }

    #[test]
    fn item_scaling_rounds_power_and_value() {
        let sword = Item::instantiate(ItemBaseId::LongswordBasic, 3, ItemId::new(1));
        assert_eq!(sword.bonuses().attack, 14);
        assert_eq!(sword.value(), 78);
        assert_eq!(sword.slot(), Some(EquipSlot::MainHand));
    }
}
