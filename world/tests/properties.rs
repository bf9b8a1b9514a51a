use std::collections::VecDeque;

use deepdelve_core::{
    ArchetypeId, AttackStyle, Command, DungeonConfig, Event, GridMap, ItemId, Movement,
    PartyMemberSpec, PlayerAction, TileCoord, TurnPhase,
};
use deepdelve_world::{self as world, query, Character, GameSnapshot, World};
use proptest::prelude::*;

fn start(seed: u64, party: &[ArchetypeId]) -> World {
    let mut world = World::new(DungeonConfig::default(), seed);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartGame {
            party: party
                .iter()
                .map(|archetype| PartyMemberSpec::new(archetype.key(), *archetype))
                .collect(),
        },
        &mut events,
    );
    world
}

fn reachable(map: &GridMap, start: TileCoord) -> Vec<bool> {
    let width = map.width() as i32;
    let index = |tile: TileCoord| (tile.row() * width + tile.column()) as usize;
    let mut seen = vec![false; map.tiles().len()];
    seen[index(start)] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(tile) = queue.pop_front() {
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = tile.offset(dx, dy);
            if map.is_walkable(next) && !seen[index(next)] {
                seen[index(next)] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

fn allocator() -> impl FnMut() -> ItemId {
    let mut next = 1_000;
    move || {
        next += 1;
        ItemId::new(next)
    }
}

proptest! {
    #[test]
    fn every_room_floor_is_reachable(seed in any::<u64>()) {
        let world = start(seed, &[ArchetypeId::Warrior]);
        let map = query::map(&world);
        let seen = reachable(map, query::pose(&world).tile());
        for room in map.rooms() {
            for tile in room.tiles() {
                let index = (tile.row() * map.width() as i32 + tile.column()) as usize;
                prop_assert!(seen[index], "{:?} unreachable", tile);
            }
        }
    }

    #[test]
    fn hp_and_mp_stay_clamped(
        archetype in prop::sample::select(ArchetypeId::ALL.to_vec()),
        changes in prop::collection::vec((-200_i32..200, -200_i32..200), 1..40),
    ) {
        let mut member = Character::from_archetype("probe".into(), archetype, 100, allocator());
        for (hp, mp) in changes {
            if hp < 0 {
                let _ = member.take_damage(-hp);
            } else {
                let _ = member.restore(hp, 0);
            }
            if mp < 0 {
                let _ = member.spend_mana(-mp);
            } else {
                let _ = member.restore(0, mp);
            }
            prop_assert!((0..=member.stats().max_hp).contains(&member.current_hp()));
            prop_assert!((0..=member.stats().max_mp).contains(&member.current_mp()));
        }
    }

    #[test]
    fn enemy_phase_ignores_player_actions(seed in 0_u64..64, choice in 0_usize..6) {
        let mut world = start(seed, &[ArchetypeId::Rogue]);
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Player(PlayerAction::Attack(AttackStyle::Melee)),
            &mut events,
        );
        prop_assert_eq!(query::phase(&world), TurnPhase::Enemy);

        let action = [
            PlayerAction::Move(Movement::Forward),
            PlayerAction::Move(Movement::Backward),
            PlayerAction::Move(Movement::TurnLeft),
            PlayerAction::Interact,
            PlayerAction::Attack(AttackStyle::Melee),
            PlayerAction::Attack(AttackStyle::Magic),
        ][choice];
        let before = query::snapshot(&world);
        events.clear();
        world::apply(&mut world, Command::Player(action), &mut events);
        prop_assert_eq!(query::snapshot(&world), before);
        prop_assert_eq!(events.len(), 1);
        let is_rejection = matches!(events[0], Event::ActionRejected { .. });
        prop_assert!(is_rejection);
    }
}

#[test]
fn recalculate_twice_is_stable() {
    let mut member = Character::from_archetype("Vey".into(), ArchetypeId::Cleric, 100, allocator());
    member.recalculate();
    let once = *member.stats();
    member.recalculate();
    assert_eq!(*member.stats(), once);
}

#[test]
fn single_level_up_at_the_threshold() {
    let mut member =
        Character::from_archetype("Brakka".into(), ArchetypeId::Warrior, 100, allocator());
    assert!(member.gain_xp(95, 1.65).is_empty());
    let _ = member.take_damage(40);
    let _ = member.spend_mana(5);

    assert_eq!(member.gain_xp(10, 1.65), vec![2]);
    assert_eq!(member.level(), 2);
    assert_eq!(member.xp(), 5);
    assert_eq!(member.next_level_xp(), 165);
    assert_eq!(member.current_hp(), member.stats().max_hp);
    assert_eq!(member.current_mp(), member.stats().max_mp);
}

#[test]
fn snapshot_round_trip_preserves_progress() {
    let mut world = start(2024, &[ArchetypeId::Knight, ArchetypeId::Mage, ArchetypeId::Ranger]);
    let mut events = Vec::new();
    for action in [
        PlayerAction::Move(Movement::TurnLeft),
        PlayerAction::Attack(AttackStyle::Melee),
        PlayerAction::Attack(AttackStyle::Magic),
    ] {
        world::apply(&mut world, Command::Player(action), &mut events);
    }

    let snapshot = query::snapshot(&world);
    let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
    let parsed: GameSnapshot = serde_json::from_str(&json).expect("snapshot parses");
    assert_eq!(parsed, snapshot);

    let restored = World::restore(parsed).expect("snapshot restores");
    assert_eq!(query::party(&restored), query::party(&world));
    assert_eq!(query::dungeon_level(&restored), query::dungeon_level(&world));
    assert_eq!(query::explored(&restored), query::explored(&world));
    assert_eq!(query::map(&restored), query::map(&world));
    assert_eq!(query::pose(&restored), query::pose(&world));
    assert_eq!(query::phase(&restored), query::phase(&world));
    assert_eq!(query::floor_items(&restored), query::floor_items(&world));
    assert_eq!(
        query::enemy_view(&restored).iter().collect::<Vec<_>>(),
        query::enemy_view(&world).iter().collect::<Vec<_>>()
    );
}

#[test]
fn identical_seeds_replay_identically() {
    let script = [
        PlayerAction::Move(Movement::Forward),
        PlayerAction::Move(Movement::TurnRight),
        PlayerAction::Move(Movement::Forward),
        PlayerAction::Interact,
    ];
    let play = || {
        let mut world = start(7, &[ArchetypeId::Warrior, ArchetypeId::Rogue]);
        let mut log = Vec::new();
        for action in script {
            world::apply(&mut world, Command::Player(action), &mut log);
        }
        (log, query::snapshot(&world))
    };

    assert_eq!(play(), play());
}
