//! Turn state machine: party actions, enemy actions and phase transitions.

use std::f32::consts::FRAC_PI_2;

use deepdelve_core::{
    AttackStyle, EnemyId, EquipSlot, Event, ExploredGrid, Movement, PartyMemberSpec, PlayerAction,
    Pose, RejectionReason, Room, Tile, TileCoord, TurnPhase,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    combat::{enemy_damage, magic_damage, physical_damage},
    derive_labeled_seed, derive_level_seed,
    generation::{generate_map, populate, random_item_base, IdAllocator},
    party::{Character, InventoryError, Item, Stowed},
    FloorItem, World, GAMEPLAY_STREAM,
};

const START_STREAM: &str = "start";
const MAX_CHEST_LOOT: u32 = 3;

impl From<InventoryError> for RejectionReason {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::EmptySlot => RejectionReason::EmptySlot,
            InventoryError::NotUsable => RejectionReason::NotUsable,
        }
    }
}

impl World {
    pub(crate) fn start_game(&mut self, party: Vec<PartyMemberSpec>, out_events: &mut Vec<Event>) {
        if party.is_empty() {
            reject(out_events, RejectionReason::EmptyParty);
            return;
        }
        if party.len() > self.config.max_party_size {
            tracing::warn!(
                requested = party.len(),
                max = self.config.max_party_size,
                "party truncated to the maximum size"
            );
        }

        self.ids = IdAllocator::default();
        self.members = party
            .into_iter()
            .take(self.config.max_party_size.max(1))
            .map(|member| {
                Character::from_archetype(
                    member.name,
                    member.archetype,
                    self.config.base_next_level_xp,
                    || self.ids.next_item(),
                )
            })
            .collect();
        if let Some(leader) = self.members.first_mut() {
            leader.add_gold(self.config.initial_gold);
        }

        self.dungeon_level = 1;
        self.elapsed = std::time::Duration::ZERO;
        self.active = true;

        let mut start_rng =
            ChaCha8Rng::seed_from_u64(derive_labeled_seed(self.seed, START_STREAM));
        let angle = start_rng.gen_range(0..4_u8) as f32 * FRAC_PI_2;
        self.build_level(angle);

        tracing::info!(
            seed = self.seed,
            party = self.members.len(),
            "game started"
        );
        out_events.push(Event::GameStarted {
            dungeon_level: self.dungeon_level,
        });
        self.enter_player_phase(out_events);
    }

    fn build_level(&mut self, angle: f32) {
        let level_seed = derive_level_seed(self.seed, self.dungeon_level);
        let mut layout_rng = ChaCha8Rng::seed_from_u64(level_seed);
        let mut map = generate_map(&self.config, &mut layout_rng);
        let entrance = map
            .rooms()
            .first()
            .map(Room::center)
            .unwrap_or_else(|| TileCoord::new(1, 1));
        let population = populate(
            &mut map,
            self.dungeon_level,
            entrance,
            &self.config,
            &mut self.ids,
            &mut layout_rng,
        );

        tracing::debug!(
            dungeon_level = self.dungeon_level,
            rooms = map.rooms().len(),
            enemies = population.enemies.len(),
            items = population.items.len(),
            chests = population.chests.len(),
            "level generated"
        );

        self.explored = ExploredGrid::new(map.width(), map.height());
        self.explored.reveal_around(entrance);
        self.map = map;
        self.enemies = population.enemies;
        self.floor_items = population.items;
        self.pose = Pose::centered_on(entrance, angle);
        self.rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(level_seed, GAMEPLAY_STREAM));
    }

    /// Resolves the member allowed to act right now.
    fn acting_member(&self) -> Result<usize, RejectionReason> {
        if !self.active {
            return Err(RejectionReason::GameInactive);
        }
        if self.phase != TurnPhase::Player {
            return Err(RejectionReason::WrongPhase);
        }
        match self.members.get(self.active_index) {
            Some(member) if member.can_act() => Ok(self.active_index),
            _ => Err(RejectionReason::CharacterUnavailable),
        }
    }

    /// Like [`World::acting_member`] but also requires `character` to be that member.
    fn acting_as(&self, character: usize) -> Result<usize, RejectionReason> {
        let acting = self.acting_member()?;
        if character >= self.members.len() {
            return Err(RejectionReason::UnknownCharacter);
        }
        if character != acting {
            return Err(RejectionReason::CharacterUnavailable);
        }
        Ok(acting)
    }

    pub(crate) fn player_action(&mut self, action: PlayerAction, out_events: &mut Vec<Event>) {
        let actor = match self.acting_member() {
            Ok(actor) => actor,
            Err(reason) => {
                reject(out_events, reason);
                return;
            }
        };
        tracing::debug!(actor, ?action, "player action");

        let outcome = match action {
            PlayerAction::Move(movement) => self.move_party(movement, actor, out_events),
            PlayerAction::Interact => self.interact(actor, out_events),
            PlayerAction::Attack(style) => self.attack(style, actor, out_events),
        };

        match outcome {
            Ok(Turn::Consumed) => self.consume_turn(actor, out_events),
            Ok(Turn::Free) => {}
            Err(reason) => reject(out_events, reason),
        }
    }

    fn move_party(
        &mut self,
        movement: Movement,
        actor: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<Turn, RejectionReason> {
        let from = self.pose.tile();
        let destination = match movement {
            Movement::TurnLeft | Movement::TurnRight => {
                let delta = if movement == Movement::TurnLeft {
                    -FRAC_PI_2
                } else {
                    FRAC_PI_2
                };
                self.pose = self.pose.rotated(delta);
                out_events.push(Event::PartyTurned {
                    angle: self.pose.angle(),
                });
                return Ok(Turn::Free);
            }
            Movement::Forward | Movement::Backward => {
                let sign = if movement == Movement::Forward { 1.0 } else { -1.0 };
                let (dx, dy) = self.pose.heading();
                self.pose.translated(dx * sign, dy * sign).tile()
            }
            Movement::Step { dx, dy } => {
                if (dx, dy) == (0, 0) || dx.abs() > 1 || dy.abs() > 1 {
                    return Err(RejectionReason::Blocked);
                }
                from.offset(dx, dy)
            }
        };

        if !self.map.is_walkable(destination) || self.enemy_index_at(destination).is_some() {
            return Err(RejectionReason::Blocked);
        }

        self.pose = Pose::centered_on(destination, self.pose.angle());
        self.explored.reveal_around(destination);
        out_events.push(Event::PartyMoved {
            from,
            to: destination,
        });
        if self.map.tile_at(destination) == Tile::StairsDown {
            out_events.push(Event::StairsFound { tile: destination });
        }
        self.pick_up_items(actor, destination, out_events);
        Ok(Turn::Consumed)
    }

    fn pick_up_items(&mut self, actor: usize, tile: TileCoord, out_events: &mut Vec<Event>) {
        let capacity = self.config.inventory_slots;
        let mut index = 0;
        while index < self.floor_items.len() {
            if self.floor_items[index].tile != tile {
                index += 1;
                continue;
            }
            if !self.members[actor].has_room(capacity) {
                out_events.push(Event::ItemLeftOnFloor {
                    item: self.floor_items[index].item.id(),
                    tile,
                });
                index += 1;
                continue;
            }

            let floor_item = self.floor_items.remove(index);
            let base = floor_item.item.base();
            match self.members[actor].stow(floor_item.item, capacity) {
                Ok(item) => out_events.push(Event::ItemPickedUp {
                    character: actor,
                    item,
                    base,
                }),
                Err(item) => {
                    self.floor_items.insert(index, FloorItem { item, tile });
                    index += 1;
                }
            }
        }
    }

    fn interact(
        &mut self,
        actor: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<Turn, RejectionReason> {
        let front = self.pose.facing_tile();
        let tile = self.map.tile_at(front);

        if let Some(toggled) = tile.toggled_door() {
            if !toggled.is_open() && self.enemies.iter().any(|enemy| enemy.tile == front) {
                return Err(RejectionReason::Blocked);
            }
            let _ = self.map.set_tile(front, toggled);
            out_events.push(Event::DoorToggled {
                tile: front,
                open: toggled.is_open(),
            });
            return Ok(Turn::Consumed);
        }

        if tile == Tile::ChestClosed {
            let _ = self.map.set_tile(front, Tile::ChestOpen);
            let loot_count = self.rng.gen_range(1..=MAX_CHEST_LOOT);
            for _ in 0..loot_count {
                let base = random_item_base(&mut self.rng);
                let item = Item::instantiate(base, self.dungeon_level, self.ids.next_item());
                match self.members[actor].stow(item, self.config.inventory_slots) {
                    Ok(item) => out_events.push(Event::ItemPickedUp {
                        character: actor,
                        item,
                        base,
                    }),
                    Err(item) => {
                        out_events.push(Event::ItemLeftOnFloor {
                            item: item.id(),
                            tile: front,
                        });
                        self.place_on_floor(item, front);
                    }
                }
            }
            out_events.push(Event::ChestOpened {
                tile: front,
                loot_count,
            });
            return Ok(Turn::Consumed);
        }

        if self.map.tile_at(self.pose.tile()) == Tile::StairsDown {
            self.descend(out_events);
            return Ok(Turn::Free);
        }

        Err(RejectionReason::NothingToInteract)
    }

    fn attack(
        &mut self,
        style: AttackStyle,
        actor: usize,
        out_events: &mut Vec<Event>,
    ) -> Result<Turn, RejectionReason> {
        match style {
            AttackStyle::Ranged if !self.members[actor].has_ranged_weapon() => {
                return Err(RejectionReason::NoRangedWeapon);
            }
            AttackStyle::Magic => {
                let cost = self.config.magic_cost;
                if !self.members[actor].spend_mana(cost) {
                    return Err(RejectionReason::InsufficientMana);
                }
                out_events.push(Event::ManaSpent {
                    character: actor,
                    amount: cost,
                });
            }
            AttackStyle::Melee | AttackStyle::Ranged => {}
        }

        let Some(target) = self.enemy_index_at(self.pose.facing_tile()) else {
            out_events.push(Event::AttackMissed {
                character: actor,
                style,
            });
            return Ok(Turn::Consumed);
        };

        let stats = self.members[actor].stats().stats;
        let damage = match style {
            AttackStyle::Magic => magic_damage(stats.magic, self.config.magic_damage_bonus),
            AttackStyle::Melee | AttackStyle::Ranged => {
                physical_damage(stats.attack, self.enemies[target].defense as f32)
            }
        };

        let enemy = &mut self.enemies[target];
        let defeated = enemy.take_damage(damage);
        out_events.push(Event::EnemyDamaged {
            enemy: enemy.id,
            attacker: actor,
            style,
            damage,
            remaining_hp: enemy.hp,
        });
        if defeated {
            self.defeat_enemy(target, out_events);
        }
        Ok(Turn::Consumed)
    }

    fn defeat_enemy(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let enemy = self.enemies.remove(index);
        tracing::debug!(enemy = enemy.id.get(), base = ?enemy.base, "enemy defeated");
        out_events.push(Event::EnemyDefeated {
            enemy: enemy.id,
            base: enemy.base,
            tile: enemy.tile,
            xp: enemy.xp,
            gold: enemy.gold,
        });

        let living = self.living_members();
        if living > 0 {
            let share = enemy.xp / living as i32;
            let multiplier = self.config.xp_multiplier;
            for (character, member) in self.members.iter_mut().enumerate() {
                if !member.is_alive() {
                    continue;
                }
                out_events.push(Event::ExperienceGained {
                    character,
                    amount: share,
                });
                for level in member.gain_xp(share, multiplier) {
                    tracing::info!(character, level, "level up");
                    out_events.push(Event::LeveledUp { character, level });
                }
            }
        }

        if let Some(leader) = self.members.first_mut() {
            leader.add_gold(enemy.gold);
            out_events.push(Event::GoldGained {
                character: 0,
                amount: enemy.gold,
            });
        }

        if self.rng.gen::<f32>() < self.config.drop_chance {
            let base = random_item_base(&mut self.rng);
            let item = Item::instantiate(base, self.dungeon_level, self.ids.next_item());
            out_events.push(Event::ItemDropped {
                item: item.id(),
                base,
                tile: enemy.tile,
            });
            self.place_on_floor(item, enemy.tile);
        }
    }

    fn descend(&mut self, out_events: &mut Vec<Event>) {
        self.dungeon_level += 1;
        self.build_level(FRAC_PI_2);
        tracing::info!(dungeon_level = self.dungeon_level, "descended");
        out_events.push(Event::DungeonDescended {
            dungeon_level: self.dungeon_level,
        });
        self.enter_player_phase(out_events);
    }

    fn consume_turn(&mut self, actor: usize, out_events: &mut Vec<Event>) {
        if let Some(member) = self.members.get_mut(actor) {
            member.set_acted(true);
        }

        let count = self.members.len();
        let next = (1..=count)
            .map(|offset| (actor + offset) % count)
            .find(|index| self.members[*index].can_act());
        match next {
            Some(index) => {
                self.active_index = index;
                out_events.push(Event::ActiveCharacterChanged { index });
            }
            None => self.enter_enemy_phase(out_events),
        }
    }

    fn enter_player_phase(&mut self, out_events: &mut Vec<Event>) {
        for member in &mut self.members {
            if member.is_alive() {
                member.set_acted(false);
            }
        }
        self.phase = TurnPhase::Player;
        out_events.push(Event::TurnPhaseChanged {
            phase: TurnPhase::Player,
        });

        if let Some(index) = self.members.iter().position(Character::is_alive) {
            self.active_index = index;
            out_events.push(Event::ActiveCharacterChanged { index });
        }
    }

    fn enter_enemy_phase(&mut self, out_events: &mut Vec<Event>) {
        self.phase = TurnPhase::Enemy;
        out_events.push(Event::TurnPhaseChanged {
            phase: TurnPhase::Enemy,
        });
    }

    fn enter_game_over(&mut self, out_events: &mut Vec<Event>) {
        self.phase = TurnPhase::GameOver;
        self.active = false;
        tracing::info!(dungeon_level = self.dungeon_level, "party defeated");
        out_events.push(Event::TurnPhaseChanged {
            phase: TurnPhase::GameOver,
        });
    }

    pub(crate) fn select_character(&mut self, index: usize, out_events: &mut Vec<Event>) {
        if !self.active {
            reject(out_events, RejectionReason::GameInactive);
            return;
        }
        if self.phase != TurnPhase::Player {
            reject(out_events, RejectionReason::WrongPhase);
            return;
        }
        match self.members.get(index) {
            None => reject(out_events, RejectionReason::UnknownCharacter),
            Some(member) if !member.can_act() => {
                reject(out_events, RejectionReason::CharacterUnavailable)
            }
            Some(_) => {
                self.active_index = index;
                out_events.push(Event::ActiveCharacterChanged { index });
            }
        }
    }

    pub(crate) fn use_item(&mut self, character: usize, slot: usize, out_events: &mut Vec<Event>) {
        let result = self.acting_as(character).and_then(|actor| {
            self.members[actor]
                .use_item(slot)
                .map_err(RejectionReason::from)
        });
        match result {
            Ok((base, hp, mp)) => {
                out_events.push(Event::ItemUsed { character, base });
                out_events.push(Event::CharacterRestored { character, hp, mp });
                self.consume_turn(character, out_events);
            }
            Err(reason) => reject(out_events, reason),
        }
    }

    pub(crate) fn equip_item(
        &mut self,
        character: usize,
        slot: usize,
        out_events: &mut Vec<Event>,
    ) {
        let capacity = self.config.inventory_slots;
        let result = self.acting_as(character).and_then(|actor| {
            self.members[actor]
                .equip(slot, capacity)
                .map_err(RejectionReason::from)
        });
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(reason) => {
                reject(out_events, reason);
                return;
            }
        };

        for (vacated, item) in &outcome.displaced {
            out_events.push(Event::ItemUnequipped {
                character,
                item: *item,
                slot: *vacated,
            });
        }
        out_events.push(Event::ItemEquipped {
            character,
            item: outcome.item,
            slot: outcome.slot,
        });
        let tile = self.pose.tile();
        for item in outcome.overflow {
            out_events.push(Event::ItemLeftOnFloor {
                item: item.id(),
                tile,
            });
            self.place_on_floor(item, tile);
        }
        self.consume_turn(character, out_events);
    }

    pub(crate) fn unequip_item(
        &mut self,
        character: usize,
        slot: EquipSlot,
        out_events: &mut Vec<Event>,
    ) {
        let capacity = self.config.inventory_slots;
        let result = self.acting_as(character).and_then(|actor| {
            self.members[actor]
                .unequip(slot, capacity)
                .map_err(RejectionReason::from)
        });
        match result {
            Ok(Stowed::Inventory(item)) => {
                out_events.push(Event::ItemUnequipped {
                    character,
                    item,
                    slot,
                });
            }
            Ok(Stowed::Floor(item)) => {
                let tile = self.pose.tile();
                out_events.push(Event::ItemUnequipped {
                    character,
                    item: item.id(),
                    slot,
                });
                out_events.push(Event::ItemLeftOnFloor {
                    item: item.id(),
                    tile,
                });
                self.place_on_floor(item, tile);
            }
            Err(reason) => {
                reject(out_events, reason);
                return;
            }
        }
        self.consume_turn(character, out_events);
    }

    pub(crate) fn drop_item(&mut self, character: usize, slot: usize, out_events: &mut Vec<Event>) {
        if !self.active {
            reject(out_events, RejectionReason::GameInactive);
            return;
        }
        if self.phase != TurnPhase::Player {
            reject(out_events, RejectionReason::WrongPhase);
            return;
        }
        let Some(member) = self.members.get_mut(character) else {
            reject(out_events, RejectionReason::UnknownCharacter);
            return;
        };
        if !member.is_alive() {
            reject(out_events, RejectionReason::CharacterUnavailable);
            return;
        }

        match member.remove_from_inventory(slot) {
            Ok(item) => {
                let tile = self.pose.tile();
                out_events.push(Event::ItemDropped {
                    item: item.id(),
                    base: item.base(),
                    tile,
                });
                self.place_on_floor(item, tile);
            }
            Err(error) => reject(out_events, error.into()),
        }
    }

    pub(crate) fn enemy_attack(
        &mut self,
        enemy: EnemyId,
        target: usize,
        multiplier: f32,
        out_events: &mut Vec<Event>,
    ) {
        let attacker = self.enemies.iter().find(|candidate| candidate.id == enemy);
        let valid = self.phase == TurnPhase::Enemy
            && attacker.map_or(false, |attacker| {
                attacker.tile.chebyshev_distance(self.pose.tile()) <= 1
            })
            && self
                .members
                .get(target)
                .map_or(false, Character::is_alive);
        let Some(attack) = attacker.map(|attacker| attacker.attack).filter(|_| valid) else {
            reject(out_events, RejectionReason::InvalidEnemyAction);
            return;
        };

        let member = &mut self.members[target];
        let damage = enemy_damage(attack, member.stats().stats.defense, multiplier);
        let outcome = member.take_damage(damage);
        out_events.push(Event::CharacterDamaged {
            character: target,
            enemy,
            damage: outcome.dealt,
            remaining_hp: outcome.remaining,
        });

        if outcome.defeated {
            tracing::debug!(character = target, "party member fell");
            out_events.push(Event::CharacterDefeated { character: target });
            if self.living_members() == 0 {
                self.enter_game_over(out_events);
            }
        }
    }

    pub(crate) fn enemy_step(&mut self, enemy: EnemyId, to: TileCoord, out_events: &mut Vec<Event>) {
        let index = self.enemies.iter().position(|candidate| candidate.id == enemy);
        let valid = self.phase == TurnPhase::Enemy
            && index.map_or(false, |index| self.enemies[index].tile.chebyshev_distance(to) == 1)
            && self.map.is_walkable(to)
            && self.enemy_index_at(to).is_none()
            && to != self.pose.tile();
        let Some(index) = index.filter(|_| valid) else {
            reject(out_events, RejectionReason::InvalidEnemyAction);
            return;
        };

        let from = self.enemies[index].tile;
        self.enemies[index].tile = to;
        out_events.push(Event::EnemyMoved { enemy, from, to });
    }

    pub(crate) fn end_enemy_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != TurnPhase::Enemy {
            reject(out_events, RejectionReason::InvalidEnemyAction);
            return;
        }
        self.enter_player_phase(out_events);
    }
}

/// Whether an accepted action used up the actor's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Turn {
    Consumed,
    Free,
}

fn reject(out_events: &mut Vec<Event>, reason: RejectionReason) {
    tracing::debug!(?reason, "command rejected");
    out_events.push(Event::ActionRejected { reason });
}
