//! Layout engine: seeds a root room at the world origin, then grows the
//! layout one socket-to-socket connection at a time until every requested
//! count is met exactly.
//!
//! # Attempt flow
//!
//! 1. Validate config and request (fatal, never retried)
//! 2. Pick the root type: lowest `order` among requested types, ties random
//! 3. Place a random prefab of that type at (0,0)
//! 4. Expand the frontier: collect unused sockets, build the candidate list
//!    (still-needed prefabs reachable from those sockets, grouped by
//!    ascending order and shuffled within each group), place the first
//!    candidate that fits, then recompute the frontier
//! 5. Stop once all counts match; fail the attempt if a full pass places
//!    nothing
//!
//! Dead ends are not backtracked: a failed attempt is discarded and the next
//! one starts from an empty grid, up to `max_attempts` times. On success
//! unused socket markings are cleared and walls are baked.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::catalog::{Catalog, RoomPrefab, RoomType};
use crate::config::{validate_config, ConfigError, GeneratorConfig};
use crate::geometry::{origin_from_door, Edge, Point, Rect};
use crate::grid::Grid;
use crate::layout::{Connection, PlacedLayout, PlacedRoom, RoomInstance};
use crate::placement::{
    bake_walls, can_place_room, mark_door_sockets, place_room, remove_unused_door_sockets,
};
use crate::request::{total_rooms, validate_request, RequestError, RequiredCounts};

/// Hooks invoked synchronously while a layout is being built.
///
/// All methods default to no-ops. `on_room_placed` fires for the root and
/// for every connected room, with the grid as it stands right after the
/// placement (socket markings included).
pub trait LayoutObserver {
    fn on_attempt_started(&mut self, _attempt: u32) {}
    fn on_room_placed(&mut self, _room: &PlacedRoom, _grid: &Grid) {}
    fn on_attempt_failed(&mut self, _attempt: u32, _failure: &AttemptFailure) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LayoutObserver for NoopObserver {}

/// Why a single attempt was abandoned. Recovered by retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptFailure {
    #[error("root room {type_id} ({width}x{height}) does not fit the grid")]
    RootDoesNotFit {
        type_id: String,
        width: i32,
        height: i32,
    },
    #[error("no reachable compatible room fits ({placed} placed, still needed: {remaining:?})")]
    Stuck {
        placed: usize,
        remaining: BTreeMap<String, u32>,
    },
}

impl AttemptFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::RootDoesNotFit { .. } => "root-does-not-fit",
            AttemptFailure::Stuck { .. } => "stuck-no-placement",
        }
    }
}

/// Terminal generation failure. No partial layout is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("invalid generator config: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),
    #[error("catalog validation failed: {}", join(.0))]
    InvalidRequest(Vec<RequestError>),
    #[error("generation did not succeed after {attempts} attempts")]
    ExhaustedRetries {
        attempts: u32,
        failures: Vec<AttemptFailure>,
    },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidConfig(_) | GenerationError::InvalidRequest(_) => {
                "validation-failed"
            }
            GenerationError::ExhaustedRetries { .. } => "exhausted-retries",
        }
    }
}

fn join<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// An unused socket on a placed room.
#[derive(Debug, Clone, Copy)]
struct AvailableDoor {
    room_index: usize,
    socket_index: usize,
    edge: Edge,
    position: Point,
}

/// Where and how a candidate joins an existing room.
#[derive(Debug, Clone, Copy)]
struct Placement {
    source_index: usize,
    source_socket: usize,
    source_edge: Edge,
    target_socket: usize,
    target_edge: Edge,
    origin: Point,
    door: Point,
}

/// Everything one attempt owns. Dropped wholesale when the attempt fails.
struct AttemptState {
    grid: Grid,
    rooms: Vec<PlacedRoom>,
    connections: Vec<Connection>,
    confirmed_doors: HashSet<Point>,
    placed_counts: BTreeMap<String, u32>,
    next_id: u32,
}

impl AttemptState {
    fn new(grid: Grid) -> Self {
        Self {
            grid,
            rooms: Vec::new(),
            connections: Vec::new(),
            confirmed_doors: HashSet::new(),
            placed_counts: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn placed(&self, type_id: &str) -> u32 {
        self.placed_counts.get(type_id).copied().unwrap_or(0)
    }

    fn remaining(&self, required: &RequiredCounts, type_id: &str) -> u32 {
        required
            .get(type_id)
            .copied()
            .unwrap_or(0)
            .saturating_sub(self.placed(type_id))
    }

    fn remaining_counts(&self, required: &RequiredCounts) -> BTreeMap<String, u32> {
        required
            .keys()
            .map(|t| (t.clone(), self.remaining(required, t)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    fn is_complete(&self, required: &RequiredCounts) -> bool {
        required.iter().all(|(t, &n)| self.placed(t) == n)
    }

    /// Unused, unconfirmed sockets across all placed rooms, shuffled.
    fn collect_available_doors<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<AvailableDoor> {
        let mut doors = Vec::new();
        for (room_index, placed) in self.rooms.iter().enumerate() {
            for socket_index in placed.unused_sockets() {
                let socket = placed.room.door_sockets[socket_index];
                let position = placed.room.rect().door_position(socket);
                if self.confirmed_doors.contains(&position) {
                    continue;
                }
                doors.push(AvailableDoor {
                    room_index,
                    socket_index,
                    edge: socket.edge,
                    position,
                });
            }
        }
        doors.shuffle(rng);
        doors
    }

    /// Stamp `room` onto the grid and record it, consuming both sockets of
    /// `placement` when it joins an existing room.
    fn commit(&mut self, room: RoomInstance, placement: Option<&Placement>, config: &GeneratorConfig) {
        let door = placement.map(|p| p.door);
        place_room(
            &mut self.grid,
            room.rect(),
            &room.color,
            door,
            &config.door_color,
        );

        let mut placed = PlacedRoom::new(room);
        if let Some(p) = placement {
            self.confirmed_doors.insert(p.door);
            placed.used_sockets.insert(p.target_socket);
            let source = &mut self.rooms[p.source_index];
            source.used_sockets.insert(p.source_socket);
            log::debug!(
                "Connected {} to {} using sockets {}→{}",
                placed.room.label(),
                source.room.label(),
                p.source_socket,
                p.target_socket
            );
            self.connections.push(Connection {
                source_room: source.room.id,
                source_socket: p.source_socket,
                source_edge: p.source_edge,
                target_room: placed.room.id,
                target_socket: p.target_socket,
                target_edge: p.target_edge,
                door: p.door,
            });
        }

        mark_door_sockets(&mut self.grid, &placed, &config.door_color);
        *self
            .placed_counts
            .entry(placed.room.type_id.clone())
            .or_insert(0) += 1;
        self.next_id += 1;
        self.rooms.push(placed);
    }
}

/// Builds layouts from a catalog. Holds no per-run state: every
/// [`generate`](Self::generate) call owns its own grid.
#[derive(Debug, Clone)]
pub struct LayoutEngine<'a> {
    catalog: &'a Catalog,
    config: GeneratorConfig,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(catalog: &'a Catalog, config: GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a layout with exactly `required` rooms per type.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        required: &RequiredCounts,
        rng: &mut R,
    ) -> Result<PlacedLayout, GenerationError> {
        self.generate_with_observer(required, rng, &mut NoopObserver)
    }

    /// [`generate`](Self::generate), reporting progress to `observer`.
    pub fn generate_with_observer<R: Rng + ?Sized>(
        &self,
        required: &RequiredCounts,
        rng: &mut R,
        observer: &mut dyn LayoutObserver,
    ) -> Result<PlacedLayout, GenerationError> {
        let config_errors = validate_config(&self.config);
        if !config_errors.is_empty() {
            log::error!("Generator config invalid: {}", join(&config_errors));
            return Err(GenerationError::InvalidConfig(config_errors));
        }
        let request_errors = validate_request(self.catalog, required);
        if !request_errors.is_empty() {
            log::error!("Feasibility check failed: {}", join(&request_errors));
            return Err(GenerationError::InvalidRequest(request_errors));
        }

        let root_candidates = self.root_candidates(required);
        log::info!(
            "Generating layout: {} rooms across {} types on a {}x{} grid",
            total_rooms(required),
            required.values().filter(|&&n| n > 0).count(),
            self.config.grid_width,
            self.config.grid_height
        );

        let max_attempts = self.config.max_attempts;
        let mut failures = Vec::new();
        for attempt in 1..=max_attempts {
            observer.on_attempt_started(attempt);
            match self.run_attempt(required, &root_candidates, rng, observer) {
                Ok(state) => {
                    let layout = self.finalize(state, attempt);
                    log::info!(
                        "Generation complete on attempt {}: {} rooms, {} doors",
                        attempt,
                        layout.rooms.len(),
                        layout.connections.len()
                    );
                    log::debug!("{}", layout.ascii_dump());
                    return Ok(layout);
                }
                Err(failure) => {
                    log::warn!("Attempt {}/{} failed: {}", attempt, max_attempts, failure);
                    observer.on_attempt_failed(attempt, &failure);
                    failures.push(failure);
                }
            }
        }

        log::warn!("Generation did not succeed after {} attempts", max_attempts);
        Err(GenerationError::ExhaustedRetries {
            attempts: max_attempts,
            failures,
        })
    }

    /// Requested types sharing the lowest `order`, in catalog order.
    fn root_candidates(&self, required: &RequiredCounts) -> Vec<&'a RoomType> {
        let catalog = self.catalog;
        let requested: Vec<&'a RoomType> = catalog
            .list_types()
            .iter()
            .filter(|t| required.get(&t.type_id).copied().unwrap_or(0) > 0)
            .collect();
        let Some(min_order) = requested.iter().map(|t| t.order).min() else {
            return Vec::new();
        };
        requested
            .into_iter()
            .filter(|t| t.order == min_order)
            .collect()
    }

    fn run_attempt<R: Rng + ?Sized>(
        &self,
        required: &RequiredCounts,
        root_candidates: &[&'a RoomType],
        rng: &mut R,
        observer: &mut dyn LayoutObserver,
    ) -> Result<AttemptState, AttemptFailure> {
        let mut state = AttemptState::new(Grid::new(
            self.config.grid_width,
            self.config.grid_height,
            self.config.empty_color.as_str(),
        ));

        let root_type = root_candidates.choose(rng).copied();
        let root_prefabs: Vec<&RoomPrefab> = root_type
            .map(|t| self.catalog.prefabs_for_type(&t.type_id).collect())
            .unwrap_or_default();
        let (Some(root_type), Some(prefab)) = (root_type, root_prefabs.choose(rng).copied()) else {
            return Err(AttemptFailure::Stuck {
                placed: 0,
                remaining: state.remaining_counts(required),
            });
        };

        let root = RoomInstance::from_prefab(state.next_id, prefab, &root_type.color, Point::ORIGIN);
        if !can_place_room(&state.grid, root.rect(), None) {
            return Err(AttemptFailure::RootDoesNotFit {
                type_id: root.type_id,
                width: root.width,
                height: root.height,
            });
        }
        log::debug!("Placed root room {} at (0,0)", root.label());
        state.commit(root, None, &self.config);
        if let Some(last) = state.rooms.last() {
            observer.on_room_placed(last, &state.grid);
        }

        while !state.is_complete(required) {
            let doors = state.collect_available_doors(rng);
            let reachable: BTreeSet<&str> = doors
                .iter()
                .filter_map(|d| self.catalog.room_type(&state.rooms[d.room_index].room.type_id))
                .flat_map(|t| t.neighbors().iter().map(String::as_str))
                .collect();
            let candidates = self.candidate_prefabs(&state, required, &reachable, rng);

            let mut progressed = false;
            for prefab in candidates {
                let color = self.catalog.color_of(&prefab.type_id).unwrap_or_default();
                let candidate =
                    RoomInstance::from_prefab(state.next_id, prefab, color, Point::ORIGIN);
                if let Some(placement) = self.find_placement_for_room(&state, &candidate, &doors, rng)
                {
                    state.commit(candidate.at(placement.origin), Some(&placement), &self.config);
                    if let Some(last) = state.rooms.last() {
                        observer.on_room_placed(last, &state.grid);
                    }
                    progressed = true;
                    break;
                }
            }

            if !progressed {
                return Err(AttemptFailure::Stuck {
                    placed: state.rooms.len(),
                    remaining: state.remaining_counts(required),
                });
            }
        }

        Ok(state)
    }

    /// Still-needed prefabs whose type is reachable from the frontier:
    /// ascending `order`, shuffled within each order group.
    fn candidate_prefabs<R: Rng + ?Sized>(
        &self,
        state: &AttemptState,
        required: &RequiredCounts,
        reachable: &BTreeSet<&str>,
        rng: &mut R,
    ) -> Vec<&'a RoomPrefab> {
        let catalog = self.catalog;
        let mut by_order: BTreeMap<i32, Vec<&'a RoomPrefab>> = BTreeMap::new();
        for room_type in catalog.list_types() {
            if state.remaining(required, &room_type.type_id) == 0
                || !reachable.contains(room_type.type_id.as_str())
            {
                continue;
            }
            by_order
                .entry(room_type.order)
                .or_default()
                .extend(catalog.prefabs_for_type(&room_type.type_id));
        }

        let mut ordered = Vec::new();
        for (_, mut group) in by_order {
            group.shuffle(rng);
            ordered.extend(group);
        }
        ordered
    }

    /// First (door, socket) pair that joins `room` flush to a mutually
    /// compatible placed room without collisions. Greedy, no lookahead.
    fn find_placement_for_room<R: Rng + ?Sized>(
        &self,
        state: &AttemptState,
        room: &RoomInstance,
        doors: &[AvailableDoor],
        rng: &mut R,
    ) -> Option<Placement> {
        for door in doors {
            let source = &state.rooms[door.room_index].room;
            if !self.catalog.allows_connection(&source.type_id, &room.type_id) {
                continue;
            }

            let mut sockets: Vec<usize> = (0..room.door_sockets.len()).collect();
            sockets.shuffle(rng);
            for target_socket in sockets {
                let socket = room.door_sockets[target_socket];
                if socket.edge != door.edge.opposite() {
                    continue;
                }
                let origin = origin_from_door(room.width, room.height, socket, door.position);
                let rect = Rect::new(origin, room.width, room.height);
                if can_place_room(&state.grid, rect, Some(door.position)) {
                    return Some(Placement {
                        source_index: door.room_index,
                        source_socket: door.socket_index,
                        source_edge: door.edge,
                        target_socket,
                        target_edge: socket.edge,
                        origin,
                        door: door.position,
                    });
                }
            }
        }
        None
    }

    fn finalize(&self, mut state: AttemptState, attempt: u32) -> PlacedLayout {
        let cleared =
            remove_unused_door_sockets(&mut state.grid, &state.rooms, &state.confirmed_doors);
        let walls = bake_walls(&mut state.grid, &state.rooms, &self.config.wall_color);
        log::debug!(
            "Finalized layout: cleared {} unused sockets, baked {} wall cells",
            cleared,
            walls
        );
        PlacedLayout {
            rooms: state.rooms,
            connections: state.connections,
            grid: state.grid,
            attempts: attempt,
        }
    }
}
