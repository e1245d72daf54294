use crate::color::{lighten_color, Rgb, NEUTRAL_JOIN_COLOR};
use crate::grid::{GRID_COLUMNS, TOTAL_TILES};
use crate::model::{Activity, Tile};

const JOIN_LIGHTEN_RATIO: f64 = 0.3;

/// How a tile relates to its neighbours in the 12×12 grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileLinks {
    pub connected_left: bool,
    pub connected_right: bool,
    pub connected_up: bool,
    pub connected_down: bool,
    /// Only set when tile connection is enabled.
    pub joined_right: bool,
    pub joined_down: bool,
    pub join_color: Option<Rgb>,
}

impl TileLinks {
    pub fn has_neighbour(&self) -> bool {
        self.connected_left || self.connected_right || self.connected_up || self.connected_down
    }
}

/// Two tiles belong together when both carry the same activity and the same comment.
/// A tile without an activity never matches anything.
pub fn is_same_meta(a: &Tile, b: &Tile) -> bool {
    match (a.activity_id.as_deref(), b.activity_id.as_deref()) {
        (Some(x), Some(y)) => !x.is_empty() && x == y && a.comment == b.comment,
        _ => false,
    }
}

/// Computes links for every tile of a day. Always recomputed from scratch.
pub fn resolve(tiles: &[Tile], activities: &[Activity], connect_tiles: bool) -> Vec<TileLinks> {
    let same = |i: usize, j: usize| match (tiles.get(i), tiles.get(j)) {
        (Some(a), Some(b)) => is_same_meta(a, b),
        _ => false,
    };

    (0..tiles.len().min(TOTAL_TILES))
        .map(|i| {
            let col = i % GRID_COLUMNS;
            let mut links = TileLinks {
                connected_left: col != 0 && same(i, i - 1),
                connected_right: col != GRID_COLUMNS - 1 && same(i, i + 1),
                connected_up: i >= GRID_COLUMNS && same(i, i - GRID_COLUMNS),
                connected_down: i + GRID_COLUMNS < TOTAL_TILES && same(i, i + GRID_COLUMNS),
                ..TileLinks::default()
            };
            if connect_tiles {
                links.joined_right = links.connected_right;
                links.joined_down = links.connected_down;
                if links.has_neighbour() {
                    links.join_color = Some(join_color(&tiles[i], activities));
                }
            }
            links
        })
        .collect()
}

fn join_color(tile: &Tile, activities: &[Activity]) -> Rgb {
    tile.activity_id
        .as_deref()
        .and_then(|id| activities.iter().find(|a| a.id == id))
        .map(|a| lighten_color(&a.color, JOIN_LIGHTEN_RATIO))
        .unwrap_or(NEUTRAL_JOIN_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Day;

    fn activity(id: &str, color: &str) -> Activity {
        Activity {
            id: id.into(),
            name: id.into(),
            color: color.into(),
            group_id: None,
        }
    }

    fn day_with(painted: &[(usize, &str, &str)]) -> Day {
        let mut day = Day::default();
        for (index, id, comment) in painted {
            *day.tile_mut(*index).unwrap() = Tile::painted(id, comment);
        }
        day
    }

    #[test]
    fn same_meta_rules() {
        let blank = Tile::default();
        assert!(!is_same_meta(&blank, &blank));
        assert!(!is_same_meta(&Tile::painted("a", ""), &blank));
        assert!(is_same_meta(&Tile::painted("a", ""), &Tile::painted("a", "")));
        assert!(is_same_meta(&Tile::painted("a", "x"), &Tile::painted("a", "x")));
        assert!(!is_same_meta(&Tile::painted("a", "x"), &Tile::painted("a", "y")));
        assert!(!is_same_meta(&Tile::painted("a", ""), &Tile::painted("b", "")));
        let commented_blank = Tile {
            activity_id: None,
            comment: "x".into(),
        };
        assert!(!is_same_meta(&commented_blank, &commented_blank));
    }

    #[test]
    fn horizontal_links_stop_at_row_edges() {
        let day = day_with(&[(11, "a", ""), (12, "a", "")]);
        let links = resolve(day.tiles(), &[activity("a", "#000000")], true);
        assert!(!links[11].connected_right);
        assert!(!links[12].connected_left);
        assert_eq!(links[11].join_color, None);
    }

    #[test]
    fn neighbours_in_all_directions() {
        let day = day_with(&[(13, "a", ""), (14, "a", ""), (25, "a", ""), (1, "a", "")]);
        let links = resolve(day.tiles(), &[activity("a", "#000000")], true);
        let centre = links[13];
        assert!(centre.connected_right && centre.joined_right);
        assert!(centre.connected_down && centre.joined_down);
        assert!(centre.connected_up);
        assert!(!centre.connected_left);
        assert_eq!(centre.join_color, Some(Rgb::new(77, 77, 77)));
        assert!(links[14].connected_left && !links[14].joined_right);
        assert!(links[25].connected_up && !links[25].joined_down);
    }

    #[test]
    fn connect_setting_only_controls_joins() {
        let day = day_with(&[(0, "a", "n"), (1, "a", "n")]);
        let links = resolve(day.tiles(), &[activity("a", "#0000FF")], false);
        assert!(links[0].connected_right);
        assert!(links[1].connected_left);
        assert!(!links[0].joined_right);
        assert_eq!(links[0].join_color, None);
    }

    #[test]
    fn join_color_falls_back_for_unknown_activity() {
        let day = day_with(&[(0, "ghost", ""), (12, "ghost", "")]);
        let links = resolve(day.tiles(), &[], true);
        assert!(links[0].joined_down);
        assert_eq!(links[0].join_color, Some(NEUTRAL_JOIN_COLOR));
    }

    #[test]
    fn bottom_row_has_no_down_link() {
        let day = day_with(&[(132, "a", ""), (143, "a", "")]);
        let links = resolve(day.tiles(), &[activity("a", "#ffffff")], true);
        assert_eq!(links.len(), TOTAL_TILES);
        assert!(!links[132].connected_down);
        assert!(!links[143].connected_right);
    }
}
