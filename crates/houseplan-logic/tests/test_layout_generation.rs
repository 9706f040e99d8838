//! Integration tests for the full layout generation pipeline.
//!
//! Exercises: Catalog → request validation → LayoutEngine → finalized grid
//! → layout validation.
//!
//! All tests are pure logic, seeded through `StdRng`.

use std::collections::{BTreeMap, HashSet};

use houseplan_logic::catalog::{Catalog, RoomPrefab, RoomType};
use houseplan_logic::config::{GeneratorConfig, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use houseplan_logic::engine::{GenerationError, LayoutEngine};
use houseplan_logic::geometry::{DoorSocket, Edge, Point};
use houseplan_logic::grid::CellKind;
use houseplan_logic::layout::PlacedLayout;
use houseplan_logic::placement::bake_walls;
use houseplan_logic::request::{resolve_counts, CountRange, RequestError, RequiredCounts};
use houseplan_logic::validation::validate_all;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ────────────────────────────────────────────────────────────

fn counts(pairs: &[(&str, u32)]) -> RequiredCounts {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn hall_and_rooms() -> Catalog {
    Catalog::new(
        vec![
            RoomType::new("Hall", "#94a3b8", 0, &["Room"]),
            RoomType::new("Room", "#60a5fa", 1, &["Hall", "Room"]),
        ],
        vec![
            RoomPrefab::with_centred_sockets("Hall", 3, 3),
            RoomPrefab::with_centred_sockets("Room", 4, 3),
        ],
    )
}

fn small_house() -> Catalog {
    Catalog::new(
        vec![
            RoomType::new("Hall", "#94a3b8", 0, &["Hall", "Room", "Kitchen"]),
            RoomType::new("Kitchen", "#f97316", 1, &["Hall", "Room"]),
            RoomType::new("Room", "#60a5fa", 2, &["Hall", "Room", "Kitchen"]),
        ],
        vec![
            RoomPrefab::new(
                "Hall",
                3,
                7,
                vec![
                    DoorSocket::new(Edge::North, 1),
                    DoorSocket::new(Edge::South, 1),
                    DoorSocket::new(Edge::East, 1),
                    DoorSocket::new(Edge::East, 5),
                    DoorSocket::new(Edge::West, 1),
                    DoorSocket::new(Edge::West, 5),
                ],
            ),
            RoomPrefab::with_centred_sockets("Hall", 3, 3),
            RoomPrefab::with_centred_sockets("Kitchen", 5, 4),
            RoomPrefab::with_centred_sockets("Room", 4, 3),
            RoomPrefab::with_centred_sockets("Room", 3, 5),
        ],
    )
}

fn generate(catalog: &Catalog, required: &RequiredCounts, seed: u64) -> PlacedLayout {
    let engine = LayoutEngine::new(catalog, GeneratorConfig::default());
    let mut rng = StdRng::seed_from_u64(seed);
    match engine.generate(required, &mut rng) {
        Ok(layout) => layout,
        Err(e) => panic!("seed {}: {}", seed, e),
    }
}

// ── Pipeline tests ─────────────────────────────────────────────────────

#[test]
fn hall_with_two_rooms() {
    let catalog = hall_and_rooms();
    let required = counts(&[("Hall", 1), ("Room", 2)]);
    let layout = generate(&catalog, &required, 42);

    assert_eq!(layout.room_count(), 3);
    assert_eq!(layout.connections.len(), 2);
    let root = layout.root().unwrap();
    assert_eq!(root.type_id, "Hall");
    assert_eq!(root.origin, Point::ORIGIN);
    assert_eq!(layout.grid.count(CellKind::Door), 2);
    assert_eq!(layout.grid.count(CellKind::Interior), 9 + 12 + 12);
}

#[test]
fn every_seed_passes_layout_validation() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Kitchen", 1), ("Room", 5)]);
    for seed in 0..30 {
        let layout = generate(&catalog, &required, seed);
        let errors = validate_all(&layout, &required);
        assert!(
            errors.is_empty(),
            "seed {}: {:?}\n{}",
            seed,
            errors,
            layout.ascii_dump()
        );
    }
}

#[test]
fn exact_counts_per_type() {
    let catalog = small_house();
    let required = counts(&[("Hall", 1), ("Kitchen", 2), ("Room", 3)]);
    for seed in 0..20 {
        let layout = generate(&catalog, &required, seed);
        assert_eq!(layout.count_by_type(), required, "seed {}", seed);
        assert_eq!(layout.room_count(), 6);
        assert_eq!(layout.connections.len(), 5, "one connection per non-root room");
    }
}

#[test]
fn room_ids_are_unique() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Room", 6)]);
    for seed in 0..10 {
        let layout = generate(&catalog, &required, seed);
        let ids: HashSet<u32> = layout.rooms.iter().map(|r| r.room.id).collect();
        assert_eq!(ids.len(), layout.room_count());
    }
}

#[test]
fn connections_join_opposite_edges_of_compatible_types() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Kitchen", 1), ("Room", 4)]);
    for seed in 0..20 {
        let layout = generate(&catalog, &required, seed);
        for c in &layout.connections {
            assert_eq!(c.source_edge.opposite(), c.target_edge);
            let source = layout.room(c.source_room).unwrap();
            let target = layout.room(c.target_room).unwrap();
            assert!(catalog.allows_connection(&source.type_id, &target.type_id));
            assert_eq!(source.door_position(c.source_socket), Some(c.door));
            assert_eq!(target.door_position(c.target_socket), Some(c.door));
        }
    }
}

#[test]
fn rooms_are_walled_off_from_each_other() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Room", 5)]);
    for seed in 0..20 {
        let layout = generate(&catalog, &required, seed);
        for (i, a) in layout.rooms.iter().enumerate() {
            for b in &layout.rooms[i + 1..] {
                assert!(
                    !a.room.rect().expanded().intersects(&b.room.rect()),
                    "seed {}: {} touches {}",
                    seed,
                    a.room.label(),
                    b.room.label()
                );
            }
        }
    }
}

#[test]
fn deterministic_output() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Kitchen", 1), ("Room", 4)]);
    let first = generate(&catalog, &required, 7);
    let second = generate(&catalog, &required, 7);
    assert_eq!(first, second);
}

#[test]
fn different_seeds_give_different_layouts() {
    let catalog = small_house();
    let required = counts(&[("Hall", 2), ("Kitchen", 1), ("Room", 4)]);
    let layouts: Vec<PlacedLayout> = (0..5).map(|s| generate(&catalog, &required, s)).collect();
    assert!(layouts.windows(2).any(|w| w[0] != w[1]));
}

#[test]
fn wall_baking_is_idempotent() {
    let catalog = small_house();
    let required = counts(&[("Hall", 1), ("Room", 4)]);
    let layout = generate(&catalog, &required, 3);
    let mut grid = layout.grid.clone();
    assert_eq!(bake_walls(&mut grid, &layout.rooms, "#4b5563"), 0);
    assert_eq!(grid, layout.grid);
}

#[test]
fn grid_keeps_configured_size() {
    let catalog = hall_and_rooms();
    let layout = generate(&catalog, &counts(&[("Hall", 1), ("Room", 3)]), 0);
    assert_eq!(layout.grid.width(), DEFAULT_GRID_WIDTH as i32);
    assert_eq!(layout.grid.height(), DEFAULT_GRID_HEIGHT as i32);
}

// ── Failure modes ──────────────────────────────────────────────────────

#[test]
fn requested_type_without_prefabs_fails_validation() {
    let catalog = Catalog::new(
        vec![
            RoomType::new("Hall", "#94a3b8", 0, &["Room", "Garage"]),
            RoomType::new("Room", "#60a5fa", 1, &["Hall"]),
            RoomType::new("Garage", "#525252", 2, &["Hall"]),
        ],
        vec![
            RoomPrefab::with_centred_sockets("Hall", 3, 3),
            RoomPrefab::with_centred_sockets("Room", 4, 3),
        ],
    );
    let engine = LayoutEngine::new(&catalog, GeneratorConfig::default());
    let mut rng = StdRng::seed_from_u64(0);
    let err = engine
        .generate(&counts(&[("Hall", 1), ("Garage", 1)]), &mut rng)
        .unwrap_err();
    assert_eq!(err.kind(), "validation-failed");
    assert_eq!(
        err,
        GenerationError::InvalidRequest(vec![RequestError::NoPrefabs("Garage".into())])
    );
}

#[test]
fn crowded_grid_exhausts_retries() {
    let catalog = hall_and_rooms();
    let engine = LayoutEngine::new(&catalog, GeneratorConfig::with_grid(12, 12));
    let mut rng = StdRng::seed_from_u64(0);
    // 20 rooms of 12 cells can never fit in 144 cells.
    let err = engine
        .generate(&counts(&[("Hall", 1), ("Room", 20)]), &mut rng)
        .unwrap_err();
    match err {
        GenerationError::ExhaustedRetries { attempts, failures } => {
            assert_eq!(attempts, 10);
            assert_eq!(failures.len(), 10);
            assert!(failures.iter().all(|f| f.kind() == "stuck-no-placement"));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
}

// ── Count ranges ───────────────────────────────────────────────────────

#[test]
fn ranged_request_generates_resolved_counts() {
    let catalog = small_house();
    let mut ranges = BTreeMap::new();
    ranges.insert("Hall".to_string(), CountRange::new(1, 2));
    ranges.insert("Kitchen".to_string(), CountRange::exactly(1));
    ranges.insert("Room".to_string(), CountRange::new(2, 5));

    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let required = resolve_counts(&catalog, &ranges, &mut rng).unwrap();
        let engine = LayoutEngine::new(&catalog, GeneratorConfig::default());
        let layout = engine.generate(&required, &mut rng).unwrap();
        assert_eq!(layout.count_by_type(), required);
        assert!(validate_all(&layout, &required).is_empty());
    }
}

// ── Catalog data ───────────────────────────────────────────────────────

#[test]
fn catalog_from_json() {
    let types: Vec<RoomType> = serde_json::from_str(
        r##"[
            {"typeID": "Hall", "color": "#94a3b8", "allowedNeighborTypeIDs": ["Room"], "order": 0},
            {"typeID": "Room", "color": "#60a5fa", "allowedNeighborTypeIDs": ["Hall", "Room"], "order": 1}
        ]"##,
    )
    .unwrap();
    let prefabs: Vec<RoomPrefab> = serde_json::from_str(
        r#"[
            {"typeID": "Hall", "width": 3, "height": 3, "doorSockets": [
                {"edge": "N", "offset": 1}, {"edge": "E", "offset": 1},
                {"edge": "S", "offset": 1}, {"edge": "W", "offset": 1}
            ]},
            {"typeID": "Room", "width": 4, "height": 3, "doorSockets": [
                {"edge": "W", "offset": 1}, {"edge": "E", "offset": 1}, {"edge": "N", "offset": 2}
            ]}
        ]"#,
    )
    .unwrap();
    let catalog = Catalog::new(types, prefabs);
    let required = counts(&[("Hall", 1), ("Room", 3)]);
    let layout = generate(&catalog, &required, 11);
    assert!(validate_all(&layout, &required).is_empty());
}

#[test]
fn layout_serializes_to_json() {
    let catalog = hall_and_rooms();
    let layout = generate(&catalog, &counts(&[("Hall", 1), ("Room", 1)]), 5);
    let value = serde_json::to_value(layout.summaries()).unwrap();
    let summaries = value.as_array().unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0]["type_id"], "Hall");
    assert_eq!(summaries[0]["origin"]["x"], 0);
}
