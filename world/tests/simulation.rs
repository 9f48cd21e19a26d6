use delve_core::{CellCoord, Command, Direction, Event, ItemKind};
use delve_world::{self as world, query, Config, World};

fn pump(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn replay_script() -> Vec<Command> {
    let mut script = Vec::new();
    for round in 0..40u32 {
        let direction = match round % 4 {
            0 => Direction::East,
            1 => Direction::South,
            2 => Direction::West,
            _ => Direction::North,
        };
        script.push(Command::Move { direction });
        script.push(Command::Tick);
    }
    script
}

#[test]
fn level_one_spawns_the_expected_population() {
    let world = World::new(Config::new(40, 30, 1));

    assert_eq!(query::level(&world), 1);
    assert_eq!(query::enemy_view(&world).len(), 7, "5 + 2 x level");

    let items = query::item_view(&world);
    assert_eq!(items.len(), 10, "8 + level pickups plus the stairs");
    let stairs = items
        .iter()
        .filter(|item| item.kind == ItemKind::Stairs)
        .count();
    assert_eq!(stairs, 1);
}

#[test]
fn every_entity_spawns_on_a_floor_cell() {
    for seed in 0..16 {
        let world = World::new(Config::new(40, 30, seed));

        assert!(!query::is_wall(&world, query::player(&world).cell));
        for enemy in query::enemy_view(&world).iter() {
            assert!(!query::is_wall(&world, enemy.cell));
        }
        for item in query::item_view(&world).iter() {
            assert!(!query::is_wall(&world, item.cell));
        }
    }
}

#[test]
fn enemy_snapshots_expose_the_level_one_formulas() {
    let world = World::new(Config::new(40, 30, 5));
    for enemy in query::enemy_view(&world).iter() {
        assert_eq!(enemy.max_health.get(), 30);
        assert_eq!(enemy.damage, 7);
        assert_eq!(enemy.speed, 4);
        assert_eq!(enemy.health, enemy.max_health);
    }
}

#[test]
fn replays_are_deterministic_for_the_same_seed() {
    let mut first = World::new(Config::new(40, 30, 0xfeed));
    let mut second = World::new(Config::new(40, 30, 0xfeed));

    let first_events = pump(&mut first, replay_script());
    let second_events = pump(&mut second, replay_script());

    assert_eq!(first_events, second_events);
    assert_eq!(query::player(&first), query::player(&second));
    assert_eq!(
        query::enemy_view(&first).into_vec(),
        query::enemy_view(&second).into_vec(),
    );
    assert_eq!(
        query::item_view(&first).into_vec(),
        query::item_view(&second).into_vec(),
    );
}

#[test]
fn different_seeds_diverge() {
    let first = World::new(Config::new(40, 30, 1));
    let second = World::new(Config::new(40, 30, 2));

    // Grids are overwhelmingly unlikely to coincide; entity placement even
    // less so. Comparing the wall bitmaps keeps the assertion cheap.
    assert_ne!(query::grid(&first).cells(), query::grid(&second).cells());
}

#[test]
fn out_of_grid_queries_report_walls() {
    let world = World::new(Config::default());
    assert!(query::is_wall(&world, CellCoord::new(40, 0)));
    assert!(query::is_wall(&world, CellCoord::new(0, 30)));
    assert!(query::is_wall(&world, CellCoord::new(u32::MAX, u32::MAX)));
}

#[test]
fn hunger_decay_matches_the_tick_cadence() {
    let mut world = World::new(Config::new(40, 30, 3));

    // Ten decay intervals of ten ticks each.
    let mut decays = 0;
    for _ in 0..100 {
        let events = pump(&mut world, vec![Command::Tick]);
        decays += events
            .iter()
            .filter(|event| matches!(event, Event::HungerDecayed { .. }))
            .count();
        if query::is_game_over(&world) {
            // An unlucky spawn can end the run early; the decay cadence up to
            // that point is still the property under test.
            break;
        }
    }
    let hunger = query::player(&world).hunger;
    assert_eq!(u32::try_from(decays).expect("count fits"), 100 - hunger);
}

#[test]
fn viewport_configuration_reclamps_the_camera() {
    let mut world = World::new(Config::new(40, 30, 4));
    let _ = pump(
        &mut world,
        vec![Command::ConfigureViewport {
            columns: 12.0,
            rows: 9.0,
        }],
    );

    let target = query::camera_target(&world);
    assert!(target.column() >= 0.0 && target.column() <= 28.0);
    assert!(target.row() >= 0.0 && target.row() <= 21.0);
}
