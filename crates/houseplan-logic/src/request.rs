//! Generation requests: how many rooms of each type, and the catalog checks
//! that must pass before any attempt is made.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::MAX_GRID_SIDE;
use crate::geometry::DoorSocket;

/// Exact number of rooms wanted per type ID.
pub type RequiredCounts = BTreeMap<String, u32>;

/// Inclusive count range for one type; resolved to a concrete count per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exactly(count: u32) -> Self {
        Self {
            min: count,
            max: count,
        }
    }
}

/// Catalog or request problem. Always fatal for the generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("room type {0} has no neighbor definitions")]
    MissingNeighborList(String),
    #[error("room type {0} is not in the catalog")]
    UnknownType(String),
    #[error("room type {0} is requested but has no prefabs")]
    NoPrefabs(String),
    #[error("request asks for zero rooms")]
    EmptyRequest,
    #[error("room type {type_id} has min > max ({min} > {max})")]
    InvertedRange { type_id: String, min: u32, max: u32 },
    #[error("prefab of {type_id} has invalid size {width}x{height} (sides must be 1..={max})", max = MAX_GRID_SIDE)]
    InvalidPrefab {
        type_id: String,
        width: i32,
        height: i32,
    },
    #[error("prefab of {type_id} has socket {socket:?} outside its edge")]
    MisplacedSocket { type_id: String, socket: DoorSocket },
}

/// Largest prefab side accepted; keeps door and buffer arithmetic in range.
const MAX_PREFAB_SIDE: i32 = MAX_GRID_SIDE as i32;

/// Check a request against the catalog, returning all errors found.
///
/// Every catalog type must declare a neighbour list; every type with a
/// positive count must exist and have at least one prefab, each sized
/// within `1..=MAX_GRID_SIDE` with every socket on its edge; at least one
/// count must be positive.
pub fn validate_request(catalog: &Catalog, required: &RequiredCounts) -> Vec<RequestError> {
    let mut errors = Vec::new();

    for room_type in catalog.list_types() {
        if room_type.allowed_neighbor_type_ids.is_none() {
            errors.push(RequestError::MissingNeighborList(
                room_type.type_id.clone(),
            ));
        }
    }

    for (type_id, &count) in required {
        if count == 0 {
            continue;
        }
        if catalog.room_type(type_id).is_none() {
            errors.push(RequestError::UnknownType(type_id.clone()));
        } else if catalog.prefabs_for_type(type_id).next().is_none() {
            errors.push(RequestError::NoPrefabs(type_id.clone()));
        } else {
            for prefab in catalog.prefabs_for_type(type_id) {
                let in_range = |side: i32| (1..=MAX_PREFAB_SIDE).contains(&side);
                if !in_range(prefab.width) || !in_range(prefab.height) {
                    errors.push(RequestError::InvalidPrefab {
                        type_id: type_id.clone(),
                        width: prefab.width,
                        height: prefab.height,
                    });
                    continue;
                }
                for socket in prefab.misplaced_sockets() {
                    errors.push(RequestError::MisplacedSocket {
                        type_id: type_id.clone(),
                        socket,
                    });
                }
            }
        }
    }

    if required.values().all(|&c| c == 0) {
        errors.push(RequestError::EmptyRequest);
    }

    errors
}

/// Draw a concrete count for each ranged type, uniformly in `[min, max]`.
///
/// Types are visited in catalog order so a seeded `rng` gives repeatable
/// counts. Zero-count types are kept in the result.
pub fn resolve_counts<R: Rng + ?Sized>(
    catalog: &Catalog,
    ranges: &BTreeMap<String, CountRange>,
    rng: &mut R,
) -> Result<RequiredCounts, Vec<RequestError>> {
    let mut errors = Vec::new();
    for (type_id, range) in ranges {
        if catalog.room_type(type_id).is_none() {
            errors.push(RequestError::UnknownType(type_id.clone()));
        }
        if range.min > range.max {
            errors.push(RequestError::InvertedRange {
                type_id: type_id.clone(),
                min: range.min,
                max: range.max,
            });
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut counts = RequiredCounts::new();
    for room_type in catalog.list_types() {
        if let Some(range) = ranges.get(&room_type.type_id) {
            counts.insert(
                room_type.type_id.clone(),
                rng.gen_range(range.min..=range.max),
            );
        }
    }
    Ok(counts)
}

/// Total rooms requested.
pub fn total_rooms(required: &RequiredCounts) -> u64 {
    required.values().map(|&n| u64::from(n)).sum()
}
