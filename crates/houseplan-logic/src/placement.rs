//! Grid-level placement primitives: collision check, stamping a room,
//! door-socket markings and the final wall-baking pass.

use std::collections::HashSet;

use crate::geometry::{Point, Rect};
use crate::grid::{CellKind, Grid, GridCell};
use crate::layout::PlacedRoom;

/// Whether a room with interior `rect` can be stamped onto `grid`.
///
/// - no in-bounds cell of the interior plus its 1-cell perimeter is already
///   interior (perimeters may overlap other perimeters and doors),
/// - every interior cell is inside the grid and empty,
/// - `door`, when given, is inside the grid and not interior.
pub fn can_place_room(grid: &Grid, rect: Rect, door: Option<Point>) -> bool {
    let buffer_clear = rect
        .expanded()
        .cells()
        .all(|p| grid.kind_at(p) != Some(CellKind::Interior));
    if !buffer_clear {
        return false;
    }

    let interior_free = rect
        .cells()
        .all(|p| grid.kind_at(p) == Some(CellKind::Empty));
    if !interior_free {
        return false;
    }

    match door {
        Some(d) => matches!(grid.kind_at(d), Some(kind) if kind != CellKind::Interior),
        None => true,
    }
}

/// Fill `rect` with interior cells and, when given, mark the door cell.
pub fn place_room(grid: &mut Grid, rect: Rect, color: &str, door: Option<Point>, door_color: &str) {
    for p in rect.cells() {
        grid.set_cell(p, GridCell::new(CellKind::Interior, color));
    }
    if let Some(d) = door {
        grid.set_cell(d, GridCell::new(CellKind::Door, door_color));
    }
}

/// Mark every unconsumed socket of `placed` as a door cell so the open
/// frontier is visible. Cells outside the grid or already interior are left
/// alone.
pub fn mark_door_sockets(grid: &mut Grid, placed: &PlacedRoom, door_color: &str) {
    for index in placed.unused_sockets() {
        let Some(p) = placed.room.door_position(index) else {
            continue;
        };
        if matches!(grid.kind_at(p), Some(CellKind::Empty)) {
            grid.set_cell(p, GridCell::new(CellKind::Door, door_color));
        }
    }
}

/// Clear door markings of sockets that never joined a confirmed connection.
///
/// Returns the number of cells cleared.
pub fn remove_unused_door_sockets(
    grid: &mut Grid,
    rooms: &[PlacedRoom],
    confirmed_doors: &HashSet<Point>,
) -> usize {
    let mut removed = 0;
    for placed in rooms {
        for index in placed.unused_sockets() {
            let Some(p) = placed.room.door_position(index) else {
                continue;
            };
            if confirmed_doors.contains(&p) {
                continue;
            }
            if grid.kind_at(p) == Some(CellKind::Door) {
                grid.clear_cell(p);
                removed += 1;
            }
        }
    }
    removed
}

/// Turn every empty cell orthogonally next to a room's interior into wall.
/// Diagonal corner cells are left alone.
///
/// Only `empty` cells change, so running it again is a no-op. Returns the
/// number of walls added.
pub fn bake_walls(grid: &mut Grid, rooms: &[PlacedRoom], wall_color: &str) -> usize {
    let mut baked = 0;
    for placed in rooms {
        for p in placed.room.rect().perimeter() {
            if grid.kind_at(p) == Some(CellKind::Empty) {
                grid.set_cell(p, GridCell::new(CellKind::Wall, wall_color));
                baked += 1;
            }
        }
    }
    baked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RoomPrefab;
    use crate::geometry::{origin_from_door, DoorSocket, Edge};
    use crate::layout::RoomInstance;

    const DOOR: &str = "#f59e0b";

    fn test_room() -> RoomPrefab {
        RoomPrefab::new(
            "TestRoom",
            4,
            3,
            vec![
                DoorSocket::new(Edge::North, 1),
                DoorSocket::new(Edge::South, 1),
                DoorSocket::new(Edge::East, 1),
                DoorSocket::new(Edge::West, 1),
            ],
        )
    }

    #[test]
    fn test_placement_smoke() {
        let mut grid = Grid::new(40, 30, "#fff");
        let prefab = test_room();
        let root = Rect::new(Point::ORIGIN, prefab.width, prefab.height);
        assert!(can_place_room(&grid, root, None), "root should be placeable");
        place_room(&mut grid, root, "#000", None, DOOR);

        let east_door = root.door_position(prefab.door_sockets[2]);
        let east = Rect::new(
            origin_from_door(4, 3, prefab.door_sockets[3], east_door),
            4,
            3,
        );
        assert!(can_place_room(&grid, east, Some(east_door)), "east room should be placeable");
        place_room(&mut grid, east, "#000", Some(east_door), DOOR);

        let north_door = root.door_position(prefab.door_sockets[0]);
        let north = Rect::new(
            origin_from_door(4, 3, prefab.door_sockets[1], north_door),
            4,
            3,
        );
        assert!(can_place_room(&grid, north, Some(north_door)), "north room should be placeable");
        place_room(&mut grid, north, "#000", Some(north_door), DOOR);

        assert_eq!(grid.count(CellKind::Interior), 4 * 3 * 3);
        assert_eq!(grid.count(CellKind::Door), 2);
    }

    #[test]
    fn test_overlapping_interior_rejected() {
        let mut grid = Grid::new(20, 20, "#fff");
        place_room(&mut grid, Rect::new(Point::ORIGIN, 3, 3), "#000", None, DOOR);
        assert!(!can_place_room(&grid, Rect::new(Point::new(2, 2), 3, 3), None));
    }

    #[test]
    fn test_touching_interiors_rejected() {
        // Interiors directly adjacent would leave no room for a wall.
        let mut grid = Grid::new(20, 20, "#fff");
        place_room(&mut grid, Rect::new(Point::ORIGIN, 3, 3), "#000", None, DOOR);
        assert!(!can_place_room(&grid, Rect::new(Point::new(3, 0), 3, 3), None));
        // Diagonal contact counts too.
        assert!(!can_place_room(&grid, Rect::new(Point::new(3, 3), 3, 3), None));
        // One cell of shared perimeter is fine.
        assert!(can_place_room(&grid, Rect::new(Point::new(4, 0), 3, 3), None));
    }

    #[test]
    fn test_out_of_bounds_interior_rejected() {
        let grid = Grid::new(6, 6, "#fff");
        // World x spans -3..=2.
        assert!(can_place_room(&grid, Rect::new(Point::new(-3, -3), 6, 6), None));
        assert!(!can_place_room(&grid, Rect::new(Point::new(0, 0), 4, 2), None));
    }

    #[test]
    fn test_perimeter_may_leave_grid() {
        let grid = Grid::new(4, 4, "#fff");
        assert!(can_place_room(&grid, Rect::new(Point::new(-2, -2), 4, 4), None));
    }

    #[test]
    fn test_door_checks() {
        let mut grid = Grid::new(10, 10, "#fff");
        place_room(&mut grid, Rect::new(Point::ORIGIN, 2, 2), "#000", None, DOOR);
        let far = Rect::new(Point::new(-4, -4), 2, 2);
        assert!(can_place_room(&grid, far, Some(Point::new(-2, -4))));
        assert!(!can_place_room(&grid, far, Some(Point::new(0, 0))));
        assert!(!can_place_room(&grid, far, Some(Point::new(50, 0))));
    }

    #[test]
    fn test_socket_markings_and_cleanup() {
        let mut grid = Grid::new(20, 20, "#fff");
        let prefab = test_room();
        let mut placed = PlacedRoom::new(RoomInstance::from_prefab(1, &prefab, "#000", Point::ORIGIN));
        place_room(&mut grid, placed.room.rect(), "#000", None, DOOR);
        placed.used_sockets.insert(2);
        let confirmed_door = placed.room.door_position(2).unwrap();
        grid.set_cell(confirmed_door, GridCell::new(CellKind::Door, DOOR));

        mark_door_sockets(&mut grid, &placed, DOOR);
        assert_eq!(grid.count(CellKind::Door), 4);

        let confirmed: HashSet<Point> = [confirmed_door].into_iter().collect();
        let removed = remove_unused_door_sockets(&mut grid, std::slice::from_ref(&placed), &confirmed);
        assert_eq!(removed, 3);
        assert_eq!(grid.positions_of(CellKind::Door), vec![confirmed_door]);
    }

    #[test]
    fn test_bake_walls_encloses_and_is_idempotent() {
        let mut grid = Grid::new(20, 20, "#fff");
        let prefab = test_room();
        let mut placed = PlacedRoom::new(RoomInstance::from_prefab(1, &prefab, "#000", Point::ORIGIN));
        placed.used_sockets.insert(0);
        place_room(&mut grid, placed.room.rect(), "#000", placed.room.door_position(0), DOOR);

        let rooms = vec![placed];
        let baked = bake_walls(&mut grid, &rooms, "#333");
        // Four sides of a 4x3 room minus one door cell.
        assert_eq!(baked, 2 * (4 + 3) - 1);
        assert_eq!(grid.count(CellKind::Door), 1);
        assert_eq!(grid.count(CellKind::Interior), 12);

        let once = grid.clone();
        assert_eq!(bake_walls(&mut grid, &rooms, "#333"), 0);
        assert_eq!(grid, once);
    }
}
