//! Placed-room records and the finished layout returned by the engine.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::RoomPrefab;
use crate::geometry::{DoorSocket, Edge, Point, Rect};
use crate::grid::{CellKind, Grid};

/// A room chosen from a prefab, positioned at `origin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInstance {
    /// Unique within one generation run.
    pub id: u32,
    pub type_id: String,
    pub color: String,
    pub width: i32,
    pub height: i32,
    pub door_sockets: Vec<DoorSocket>,
    pub origin: Point,
}

impl RoomInstance {
    pub fn from_prefab(id: u32, prefab: &RoomPrefab, color: &str, origin: Point) -> Self {
        Self {
            id,
            type_id: prefab.type_id.clone(),
            color: color.to_string(),
            width: prefab.width,
            height: prefab.height,
            door_sockets: prefab.door_sockets.clone(),
            origin,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.origin, self.width, self.height)
    }

    /// Same room moved to `origin`.
    pub fn at(&self, origin: Point) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    /// Door cell of socket `index` at the current origin.
    pub fn door_position(&self, index: usize) -> Option<Point> {
        self.door_sockets
            .get(index)
            .map(|&s| self.rect().door_position(s))
    }

    /// Display label, e.g. `Kitchen-3`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.type_id, self.id)
    }
}

/// A room committed to the grid, with the socket indices already consumed
/// by confirmed connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedRoom {
    pub room: RoomInstance,
    pub used_sockets: BTreeSet<usize>,
}

impl PlacedRoom {
    pub fn new(room: RoomInstance) -> Self {
        Self {
            room,
            used_sockets: BTreeSet::new(),
        }
    }

    /// Socket indices not yet consumed, in prefab order.
    pub fn unused_sockets(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.room.door_sockets.len()).filter(|i| !self.used_sockets.contains(i))
    }
}

/// A confirmed socket-to-socket link; `door` is the shared door cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub source_room: u32,
    pub source_socket: usize,
    pub source_edge: Edge,
    pub target_room: u32,
    pub target_socket: usize,
    pub target_edge: Edge,
    pub door: Point,
}

/// Per-room output record for callers that only need placement data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub room_id: u32,
    pub type_id: String,
    pub origin: Point,
    pub width: i32,
    pub height: i32,
    pub color: String,
}

/// Successful generation: rooms in placement order (root first), the
/// connections between them, and the finalized grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedLayout {
    pub rooms: Vec<PlacedRoom>,
    pub connections: Vec<Connection>,
    pub grid: Grid,
    /// 1-based attempt that succeeded.
    pub attempts: u32,
}

impl PlacedLayout {
    pub fn root(&self) -> Option<&RoomInstance> {
        self.rooms.first().map(|r| &r.room)
    }

    pub fn room(&self, id: u32) -> Option<&RoomInstance> {
        self.rooms.iter().map(|r| &r.room).find(|r| r.id == id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn count_by_type(&self) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for placed in &self.rooms {
            *counts.entry(placed.room.type_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms
            .iter()
            .map(|p| RoomSummary {
                room_id: p.room.id,
                type_id: p.room.type_id.clone(),
                origin: p.room.origin,
                width: p.room.width,
                height: p.room.height,
                color: p.room.color.clone(),
            })
            .collect()
    }

    /// Text rendering, north at the top: rooms as `A`..`Z` by placement
    /// index, `#` wall, `+` door, `.` empty.
    pub fn ascii_dump(&self) -> String {
        let mut letters: HashMap<Point, char> = HashMap::new();
        for (i, placed) in self.rooms.iter().enumerate() {
            let ch = (b'A' + (i % 26) as u8) as char;
            for p in placed.room.rect().cells() {
                letters.insert(p, ch);
            }
        }

        let min = self.grid.min_world();
        let max = self.grid.max_world();
        let mut dump = format!(
            "Layout ({}x{}, {} rooms, {} doors, attempt {}):\n",
            self.grid.width(),
            self.grid.height(),
            self.rooms.len(),
            self.connections.len(),
            self.attempts
        );
        for y in (min.y..=max.y).rev() {
            let mut row = String::with_capacity(self.grid.width() as usize);
            for x in min.x..=max.x {
                let p = Point::new(x, y);
                let ch = match self.grid.kind_at(p) {
                    Some(CellKind::Interior) => letters.get(&p).copied().unwrap_or('?'),
                    Some(CellKind::Wall) => '#',
                    Some(CellKind::Door) => '+',
                    _ => '.',
                };
                row.push(ch);
            }
            // Skip rows with nothing on them.
            if row.chars().any(|c| c != '.') {
                dump.push_str(&row);
                dump.push('\n');
            }
        }
        dump
    }
}
