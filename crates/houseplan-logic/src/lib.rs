//! Procedural house layout generation.
//!
//! This crate contains the layout generator independent of any renderer,
//! asset loader or UI. Functions take plain catalog data and a caller-owned
//! random source, and return a placed layout plus a finalized cell grid,
//! making them unit-testable and deterministic under a fixed seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Room types (adjacency rules, order) and prefabs (size, door sockets) |
//! | [`config`] | Generator configuration: grid bounds, retry bound, colours |
//! | [`engine`] | Layout engine: root selection, frontier expansion, retries |
//! | [`geometry`] | Points, room rectangles, door-socket math |
//! | [`grid`] | Fixed-size cell store addressed in world coordinates |
//! | [`layout`] | Placed rooms, connections and the finished layout |
//! | [`placement`] | Collision check, room stamping, socket markings, wall baking |
//! | [`request`] | Required counts, count ranges, request validation |
//! | [`validation`] | Layout invariant checks (overlap, doors, walls, connectivity) |
//!
//! # Example
//!
//! ```
//! use houseplan_logic::catalog::{Catalog, RoomPrefab, RoomType};
//! use houseplan_logic::config::GeneratorConfig;
//! use houseplan_logic::engine::LayoutEngine;
//! use houseplan_logic::request::RequiredCounts;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let catalog = Catalog::new(
//!     vec![
//!         RoomType::new("Hall", "#94a3b8", 0, &["Room"]),
//!         RoomType::new("Room", "#60a5fa", 1, &["Hall", "Room"]),
//!     ],
//!     vec![
//!         RoomPrefab::with_centred_sockets("Hall", 3, 3),
//!         RoomPrefab::with_centred_sockets("Room", 4, 3),
//!     ],
//! );
//! let engine = LayoutEngine::new(&catalog, GeneratorConfig::default());
//!
//! let mut required = RequiredCounts::new();
//! required.insert("Hall".into(), 1);
//! required.insert("Room".into(), 2);
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let layout = engine.generate(&required, &mut rng).unwrap();
//! assert_eq!(layout.room_count(), 3);
//! assert_eq!(layout.root().unwrap().type_id, "Hall");
//! assert!(houseplan_logic::validation::validate_all(&layout, &required).is_empty());
//! ```

pub mod catalog;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod placement;
pub mod request;
pub mod validation;
