//! Validation for generated house layouts.
//!
//! Pure functions that take a finished [`PlacedLayout`] and return
//! validation errors. Used by the test suite and the simtest harness to
//! check the layout invariants independently of the engine that built them.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::geometry::Point;
use crate::grid::CellKind;
use crate::layout::{PlacedLayout, RoomInstance};
use crate::request::RequiredCounts;

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn rooms(layout: &PlacedLayout) -> impl Iterator<Item = &RoomInstance> {
    layout.rooms.iter().map(|p| &p.room)
}

// ── A. Room geometry (per-room) ─────────────────────────────────────────

/// Check that no room has zero or negative dimensions.
pub fn check_room_dimensions(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms(layout) {
        if r.width <= 0 || r.height <= 0 {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Error,
                message: format!(
                    "Room {} has non-positive dimensions: {}×{}",
                    r.label(),
                    r.width,
                    r.height
                ),
            });
        }
    }
    errors
}

/// Check that room aspect ratios are reasonable (<= 10:1).
pub fn check_room_aspect_ratios(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms(layout) {
        if r.width <= 0 || r.height <= 0 {
            continue; // caught by dimension check
        }
        let (long, short) = if r.width > r.height {
            (r.width, r.height)
        } else {
            (r.height, r.width)
        };
        let ratio = f64::from(long) / f64::from(short);
        if ratio > 10.0 {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Warning,
                message: format!(
                    "Room {} has extreme aspect ratio {:.1}:1 ({}×{})",
                    r.label(),
                    ratio,
                    r.width,
                    r.height
                ),
            });
        }
    }
    errors
}

/// Check every interior cell lies inside the grid.
pub fn check_rooms_within_grid(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms(layout) {
        if !r.rect().cells().all(|p| layout.grid.is_inside(p)) {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Error,
                message: format!(
                    "Room {} extends outside grid: origin ({},{}) size {}×{}",
                    r.label(),
                    r.origin.x,
                    r.origin.y,
                    r.width,
                    r.height
                ),
            });
        }
    }
    errors
}

// ── B. Room-to-room (pairwise) ──────────────────────────────────────────

/// Check no two interiors overlap, and no interior sits inside another
/// room's 1-cell perimeter.
pub fn check_room_overlaps(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let all: Vec<&RoomInstance> = rooms(layout).collect();

    for i in 0..all.len() {
        for j in (i + 1)..all.len() {
            let a = all[i];
            let b = all[j];
            if a.rect().intersects(&b.rect()) {
                errors.push(ValidationError {
                    category: "room_overlap",
                    severity: Severity::Error,
                    message: format!("Rooms {} and {} overlap", a.label(), b.label()),
                });
            } else if a.rect().expanded().intersects(&b.rect()) {
                errors.push(ValidationError {
                    category: "room_overlap",
                    severity: Severity::Error,
                    message: format!(
                        "Rooms {} and {} touch with no wall between them",
                        a.label(),
                        b.label()
                    ),
                });
            }
        }
    }
    errors
}

// ── C. Door validity ────────────────────────────────────────────────────

/// Check each connection's door cell matches both sockets and that the
/// sockets sit on opposite edges.
pub fn check_door_sockets(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let by_id: HashMap<u32, &RoomInstance> = rooms(layout).map(|r| (r.id, r)).collect();

    for c in &layout.connections {
        let (Some(source), Some(target)) = (by_id.get(&c.source_room), by_id.get(&c.target_room))
        else {
            errors.push(ValidationError {
                category: "door_validity",
                severity: Severity::Error,
                message: format!(
                    "Door at ({},{}) references a missing room ({} or {})",
                    c.door.x, c.door.y, c.source_room, c.target_room
                ),
            });
            continue;
        };

        if source.door_position(c.source_socket) != Some(c.door)
            || target.door_position(c.target_socket) != Some(c.door)
        {
            errors.push(ValidationError {
                category: "door_validity",
                severity: Severity::Error,
                message: format!(
                    "Door at ({},{}) does not match sockets {}#{} / {}#{}",
                    c.door.x,
                    c.door.y,
                    source.label(),
                    c.source_socket,
                    target.label(),
                    c.target_socket
                ),
            });
        }
        if c.source_edge.opposite() != c.target_edge {
            errors.push(ValidationError {
                category: "door_validity",
                severity: Severity::Error,
                message: format!(
                    "Door {}→{} joins edges {} and {}, which are not opposite",
                    source.label(),
                    target.label(),
                    c.source_edge.symbol(),
                    c.target_edge.symbol()
                ),
            });
        }
    }
    errors
}

/// Check every confirmed door is a door cell, no door cell exists without
/// a connection, and no door cell is shared by two connections.
pub fn check_door_cells(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut confirmed: HashSet<Point> = HashSet::new();

    for c in &layout.connections {
        if !confirmed.insert(c.door) {
            errors.push(ValidationError {
                category: "door_validity",
                severity: Severity::Error,
                message: format!("Door cell ({},{}) used by two connections", c.door.x, c.door.y),
            });
        }
        if layout.grid.kind_at(c.door) != Some(CellKind::Door) {
            errors.push(ValidationError {
                category: "door_validity",
                severity: Severity::Error,
                message: format!(
                    "Confirmed door ({},{}) is {:?} on the grid",
                    c.door.x,
                    c.door.y,
                    layout.grid.kind_at(c.door)
                ),
            });
        }
    }

    let stray = layout
        .grid
        .positions_of(CellKind::Door)
        .into_iter()
        .filter(|p| !confirmed.contains(p))
        .count();
    if stray > 0 {
        errors.push(ValidationError {
            category: "door_validity",
            severity: Severity::Error,
            message: format!("{} door cells are not part of any connection", stray),
        });
    }
    errors
}

/// Check every in-bounds cell orthogonally next to a room is wall or door.
/// Ring corners are not checked.
pub fn check_walls_enclose(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms(layout) {
        let gaps = r
            .rect()
            .perimeter()
            .filter(|&p| {
                matches!(
                    layout.grid.kind_at(p),
                    Some(CellKind::Empty) | Some(CellKind::Interior)
                )
            })
            .count();
        if gaps > 0 {
            errors.push(ValidationError {
                category: "walls",
                severity: Severity::Error,
                message: format!("Room {} has {} perimeter cells without wall", r.label(), gaps),
            });
        }
    }
    errors
}

// ── D. Connectivity (graph-level) ───────────────────────────────────────

/// Check every room is reachable from the root via confirmed doors.
pub fn check_connectivity(layout: &PlacedLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let Some(root) = layout.root() else {
        return errors;
    };

    let mut adj: HashMap<u32, Vec<u32>> = HashMap::new();
    for c in &layout.connections {
        adj.entry(c.source_room).or_default().push(c.target_room);
        adj.entry(c.target_room).or_default().push(c.source_room);
    }

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(root.id);
    queue.push_back(root.id);

    while let Some(current) = queue.pop_front() {
        if let Some(neighbors) = adj.get(&current) {
            for &next in neighbors {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    let unreached: Vec<String> = rooms(layout)
        .filter(|r| !visited.contains(&r.id))
        .map(|r| r.label())
        .collect();

    if !unreached.is_empty() {
        errors.push(ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: format!(
                "{} of {} rooms unreachable from root {} (e.g. {})",
                unreached.len(),
                layout.rooms.len(),
                root.label(),
                unreached[0]
            ),
        });
    }
    errors
}

/// Check the placed count per type equals the request exactly.
pub fn check_type_counts(layout: &PlacedLayout, required: &RequiredCounts) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let placed = layout.count_by_type();

    for (type_id, &want) in required {
        let got = placed.get(type_id).copied().unwrap_or(0);
        if got != want {
            errors.push(ValidationError {
                category: "counts",
                severity: Severity::Error,
                message: format!("{}: requested {}, placed {}", type_id, want, got),
            });
        }
    }
    for (type_id, &got) in &placed {
        if !required.contains_key(type_id) {
            errors.push(ValidationError {
                category: "counts",
                severity: Severity::Error,
                message: format!("{}: not requested, placed {}", type_id, got),
            });
        }
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_all(layout: &PlacedLayout, required: &RequiredCounts) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_room_dimensions(layout));
    all.extend(check_room_aspect_ratios(layout));
    all.extend(check_rooms_within_grid(layout));
    all.extend(check_room_overlaps(layout));
    all.extend(check_door_sockets(layout));
    all.extend(check_door_cells(layout));
    all.extend(check_walls_enclose(layout));
    all.extend(check_connectivity(layout));
    all.extend(check_type_counts(layout, required));
    all
}
