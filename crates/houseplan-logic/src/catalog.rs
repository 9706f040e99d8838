//! Room catalog: room types with their adjacency rules, and the concrete
//! prefabs (geometry + door sockets) available for each type.
//!
//! Catalog data is immutable once loaded. Field names follow the JSON the
//! catalog is authored in (`typeID`, `allowedNeighborTypeIDs`, `doorSockets`).

use serde::{Deserialize, Serialize};

use crate::geometry::{DoorSocket, Edge};

/// A category of room, e.g. "Kitchen".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomType {
    #[serde(rename = "typeID")]
    pub type_id: String,
    pub color: String,
    /// Types this one may connect to. `None` means the catalog entry never
    /// declared a list, which makes the whole catalog unusable.
    #[serde(rename = "allowedNeighborTypeIDs", default)]
    pub allowed_neighbor_type_ids: Option<Vec<String>>,
    /// Lower orders are placed first and seed the layout root.
    #[serde(default)]
    pub order: i32,
}

impl RoomType {
    pub fn new(type_id: &str, color: &str, order: i32, neighbors: &[&str]) -> Self {
        Self {
            type_id: type_id.to_string(),
            color: color.to_string(),
            allowed_neighbor_type_ids: Some(neighbors.iter().map(|n| n.to_string()).collect()),
            order,
        }
    }

    /// Whether this type lists `other` as an allowed neighbour.
    pub fn allows(&self, other: &str) -> bool {
        self.allowed_neighbor_type_ids
            .as_deref()
            .is_some_and(|ids| ids.iter().any(|id| id == other))
    }

    pub fn neighbors(&self) -> &[String] {
        self.allowed_neighbor_type_ids.as_deref().unwrap_or(&[])
    }
}

/// Concrete room geometry belonging to one [`RoomType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPrefab {
    #[serde(rename = "typeID")]
    pub type_id: String,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub door_sockets: Vec<DoorSocket>,
}

impl RoomPrefab {
    pub fn new(type_id: &str, width: i32, height: i32, door_sockets: Vec<DoorSocket>) -> Self {
        Self {
            type_id: type_id.to_string(),
            width,
            height,
            door_sockets,
        }
    }

    /// A prefab with one socket centred on each edge.
    pub fn with_centred_sockets(type_id: &str, width: i32, height: i32) -> Self {
        let sockets = Edge::ALL
            .iter()
            .map(|&edge| {
                let len = match edge {
                    Edge::North | Edge::South => width,
                    Edge::East | Edge::West => height,
                };
                DoorSocket::new(edge, len / 2)
            })
            .collect();
        Self::new(type_id, width, height, sockets)
    }

    /// Sockets whose offset falls outside the edge they sit on.
    pub fn misplaced_sockets(&self) -> Vec<DoorSocket> {
        self.door_sockets
            .iter()
            .copied()
            .filter(|s| {
                let len = match s.edge {
                    Edge::North | Edge::South => self.width,
                    Edge::East | Edge::West => self.height,
                };
                s.offset < 0 || s.offset >= len
            })
            .collect()
    }
}

/// Room types plus the prefab pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    types: Vec<RoomType>,
    prefabs: Vec<RoomPrefab>,
}

impl Catalog {
    pub fn new(types: Vec<RoomType>, prefabs: Vec<RoomPrefab>) -> Self {
        Self { types, prefabs }
    }

    /// Every room type, in catalog order.
    pub fn list_types(&self) -> &[RoomType] {
        &self.types
    }

    pub fn prefabs(&self) -> &[RoomPrefab] {
        &self.prefabs
    }

    pub fn room_type(&self, type_id: &str) -> Option<&RoomType> {
        self.types.iter().find(|t| t.type_id == type_id)
    }

    /// Prefabs of `type_id`, in catalog order.
    pub fn prefabs_for_type<'a>(&'a self, type_id: &'a str) -> impl Iterator<Item = &'a RoomPrefab> {
        self.prefabs.iter().filter(move |p| p.type_id == type_id)
    }

    /// Adjacency must be permitted in both directions.
    pub fn allows_connection(&self, a: &str, b: &str) -> bool {
        match (self.room_type(a), self.room_type(b)) {
            (Some(ta), Some(tb)) => ta.allows(b) && tb.allows(a),
            _ => false,
        }
    }

    pub fn color_of(&self, type_id: &str) -> Option<&str> {
        self.room_type(type_id).map(|t| t.color.as_str())
    }
}
