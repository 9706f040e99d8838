//! Integer grid geometry: points, room rectangles, door-socket math.
//!
//! World coordinates are y-up: a room's `N` edge is the row just above its
//! top interior row (`origin.y + height`), its `S` edge the row just below
//! `origin.y`.

use serde::{Deserialize, Serialize};

/// A world-space grid cell coordinate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Edge of a room that a door socket sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Edge {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::North, Edge::South, Edge::East, Edge::West];

    /// The edge a neighbouring room must use to sit flush against this one.
    pub const fn opposite(self) -> Edge {
        match self {
            Edge::North => Edge::South,
            Edge::South => Edge::North,
            Edge::East => Edge::West,
            Edge::West => Edge::East,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Edge::North => 'N',
            Edge::South => 'S',
            Edge::East => 'E',
            Edge::West => 'W',
        }
    }
}

/// A connection point on a prefab's perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoorSocket {
    pub edge: Edge,
    /// Cells along the edge, measured from the room origin's column (N/S)
    /// or row (E/W).
    pub offset: i32,
}

impl DoorSocket {
    pub const fn new(edge: Edge, offset: i32) -> Self {
        Self { edge, offset }
    }
}

/// Axis-aligned room interior: `width × height` cells starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(origin: Point, width: i32, height: i32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub const fn min_x(&self) -> i32 {
        self.origin.x
    }

    pub const fn min_y(&self) -> i32 {
        self.origin.y
    }

    /// Exclusive upper x bound.
    pub const fn max_x(&self) -> i32 {
        self.origin.x + self.width
    }

    /// Exclusive upper y bound.
    pub const fn max_y(&self) -> i32 {
        self.origin.y + self.height
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x < self.max_x() && p.y >= self.min_y() && p.y < self.max_y()
    }

    /// True when the interiors share at least one cell.
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// The interior grown by one cell on every side.
    pub const fn expanded(&self) -> Rect {
        Rect {
            origin: self.origin.offset(-1, -1),
            width: self.width + 2,
            height: self.height + 2,
        }
    }

    /// Every interior cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = Point> {
        let (min_y, max_y) = (self.min_y(), self.max_y());
        (self.min_x()..self.max_x()).flat_map(move |x| (min_y..max_y).map(move |y| Point::new(x, y)))
    }

    /// Cells orthogonally adjacent to the interior: the 1-cell ring around
    /// it without its four corners.
    pub fn perimeter(&self) -> impl Iterator<Item = Point> {
        let inner = *self;
        self.expanded()
            .cells()
            .filter(move |p| !inner.contains(*p) && !inner.is_corner_of_ring(*p))
    }

    /// Diagonal corner cells of the 1-cell ring.
    pub fn ring_corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x() - 1, self.min_y() - 1),
            Point::new(self.max_x(), self.min_y() - 1),
            Point::new(self.min_x() - 1, self.max_y()),
            Point::new(self.max_x(), self.max_y()),
        ]
    }

    const fn is_corner_of_ring(&self, p: Point) -> bool {
        (p.x == self.min_x() - 1 || p.x == self.max_x())
            && (p.y == self.min_y() - 1 || p.y == self.max_y())
    }

    /// World cell a socket's door occupies when this rectangle is placed.
    pub const fn door_position(&self, socket: DoorSocket) -> Point {
        let o = self.origin;
        match socket.edge {
            Edge::North => Point::new(o.x + socket.offset, o.y + self.height),
            Edge::South => Point::new(o.x + socket.offset, o.y - 1),
            Edge::East => Point::new(o.x + self.width, o.y + socket.offset),
            Edge::West => Point::new(o.x - 1, o.y + socket.offset),
        }
    }
}

/// Origin a `width × height` room must take so that `socket` lands on `door`.
///
/// Inverse of [`Rect::door_position`].
pub const fn origin_from_door(width: i32, height: i32, socket: DoorSocket, door: Point) -> Point {
    match socket.edge {
        Edge::North => Point::new(door.x - socket.offset, door.y - height),
        Edge::South => Point::new(door.x - socket.offset, door.y + 1),
        Edge::East => Point::new(door.x - width, door.y - socket.offset),
        Edge::West => Point::new(door.x + 1, door.y - socket.offset),
    }
}
