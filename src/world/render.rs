//! Text maps of the dungeon for logs and the CLI
//!
//! Each room is one character; exits between horizontally or vertically
//! adjacent rooms are drawn as `-` and `|` in the gaps between cells.

use super::dungeon::{Dungeon, RoomPos};
use super::location::DungeonLocation;
use super::Point;

/// Room glyph: `<` leads up, `>` leads down, `X` both, `#` neither
fn room_glyph(room: &DungeonLocation) -> char {
    let (mut up, mut down) = (false, false);
    for address in room.exits().iter().filter_map(|exit| exit.decode()) {
        if address.depth + 1 == room.depth {
            up = true;
        } else if address.depth == room.depth + 1 {
            down = true;
        }
    }
    // A link to the town entrance also leads up
    if room.exits().iter().any(|exit| !exit.is_dungeon()) {
        up = true;
    }
    match (up, down) {
        (true, true) => 'X',
        (true, false) => '<',
        (false, true) => '>',
        (false, false) => '#',
    }
}

fn render_window(
    dungeon: &Dungeon,
    depth: usize,
    origin: Point,
    size: Point,
    glyph: impl Fn(&DungeonLocation) -> Option<char>,
) -> String {
    let shown = |point: Point| {
        dungeon
            .location(RoomPos::new(depth, point))
            .and_then(|room| glyph(room).map(|c| (room, c)))
    };

    let mut out = String::new();
    for y in 0..size.y {
        let mut cells = String::new();
        let mut links = String::new();
        for x in 0..size.x {
            let point = origin + Point::new(x, y);
            let here = shown(point);
            cells.push(here.map_or('.', |(_, c)| c));

            let east = point + Point::new(1, 0);
            let south = point + Point::new(0, 1);
            let linked = |other: Point| {
                here.is_some()
                    && shown(other).is_some()
                    && dungeon.is_linked(RoomPos::new(depth, point), RoomPos::new(depth, other))
            };
            if x + 1 < size.x {
                cells.push(if linked(east) { '-' } else { ' ' });
            }
            links.push(if y + 1 < size.y && linked(south) { '|' } else { ' ' });
            if x + 1 < size.x {
                links.push(' ');
            }
        }
        out.push_str(cells.trim_end());
        out.push('\n');
        if y + 1 < size.y {
            out.push_str(links.trim_end());
            out.push('\n');
        }
    }
    out
}

/// Draw the rooms of one floor within its own window
pub fn render_floor(dungeon: &Dungeon, floor_index: usize) -> String {
    let Some(floor) = dungeon.floors.get(floor_index) else {
        return String::new();
    };
    let header = format!(
        "{} (depth {}, {} rooms)\n",
        floor.definition.name, floor.depth, floor.room_count
    );
    header
        + &render_window(dungeon, floor.depth, floor.offset, floor.size, |room| {
            (room.floor == floor_index).then(|| room_glyph(room))
        })
}

/// Draw every room of a depth. Rooms are lettered by floor (`a`, `b`, ...)
/// with vertical exits shown by the glyphs of [`render_floor`].
pub fn render_depth(dungeon: &Dungeon, depth: usize) -> String {
    let (width, height) = dungeon.dims(depth);
    let floors: Vec<usize> = dungeon
        .floors
        .iter()
        .enumerate()
        .filter(|(_, floor)| floor.depth == depth)
        .map(|(index, _)| index)
        .collect();

    let mut out = format!("Depth {}\n", depth);
    for (ordinal, &index) in floors.iter().enumerate() {
        out.push_str(&format!(
            "  {} = {}\n",
            floor_letter(ordinal),
            dungeon.floors[index].definition.name
        ));
    }
    out + &render_window(
        dungeon,
        depth,
        Point::ORIGIN,
        Point::new(width as i32, height as i32),
        |room| {
            let ordinal = floors.iter().position(|&index| index == room.floor)?;
            Some(match room_glyph(room) {
                '#' => floor_letter(ordinal),
                other => other,
            })
        },
    )
}

fn floor_letter(ordinal: usize) -> char {
    (b'a' + (ordinal % 26) as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::dungeon::FloorInstance;
    use crate::world::generation::FloorCatalogue;
    use crate::world::location::{Location, LocationId};

    fn two_rooms() -> Dungeon {
        let definition = FloorCatalogue::standard().definitions()[0].clone();
        let mut dungeon = Dungeon::new();
        dungeon.resize_depth(0, 3, 2);
        dungeon.floors.push(FloorInstance {
            definition,
            depth: 0,
            size: Point::new(3, 2),
            offset: Point::ORIGIN,
            room_count: 2,
        });
        for point in [Point::new(0, 0), Point::new(1, 0)] {
            dungeon
                .insert(DungeonLocation {
                    location: Location::new(LocationId::dungeon("mossy_cellars", point, 0), "Cellar"),
                    floor: 0,
                    depth: 0,
                    global: point,
                    local: point,
                })
                .unwrap();
        }
        dungeon.link(RoomPos::new(0, Point::new(0, 0)), RoomPos::new(0, Point::new(1, 0)));
        dungeon
    }

    #[test]
    fn test_render_floor() {
        let text = render_floor(&two_rooms(), 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Mossy Cellars (depth 0, 2 rooms)");
        assert_eq!(lines[1], "#-# .");
        assert_eq!(lines[3], ". . .");
    }

    #[test]
    fn test_render_depth_letters_floors() {
        let text = render_depth(&two_rooms(), 0);
        assert!(text.starts_with("Depth 0\n  a = Mossy Cellars\n"));
        assert!(text.contains("a-a ."));
    }

    #[test]
    fn test_render_missing_floor() {
        assert!(render_floor(&Dungeon::new(), 3).is_empty());
    }
}
