use crate::model::{string_or_null, ActivityId, Day, State, Tile};
use serde::{Deserialize, Serialize};

/// What the next tile click or drag-paint writes.
///
/// Persisted as `{"type": "activity" | "erase" | "copy", ...}`; no brush is `null`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Brush {
    /// Paints the activity and leaves the tile's comment alone.
    Activity {
        #[serde(rename = "activityId", default)]
        activity_id: Option<ActivityId>,
    },
    /// Clears both activity and comment.
    Erase,
    /// Stamps an activity together with a comment picked up from a tile.
    Copy {
        #[serde(rename = "activityId", default)]
        activity_id: Option<ActivityId>,
        #[serde(default, deserialize_with = "string_or_null")]
        comment: String,
    },
}

impl Brush {
    pub fn activity(id: &str) -> Self {
        Brush::Activity {
            activity_id: Some(id.to_string()),
        }
    }

    pub fn copy_of(tile: &Tile) -> Option<Self> {
        let id = tile.activity_id.as_deref().filter(|id| !id.is_empty())?;
        Some(Brush::Copy {
            activity_id: Some(id.to_string()),
            comment: tile.comment.clone(),
        })
    }

    pub fn activity_id(&self) -> Option<&str> {
        match self {
            Brush::Activity { activity_id } | Brush::Copy { activity_id, .. } => {
                activity_id.as_deref()
            }
            Brush::Erase => None,
        }
    }

    /// Erase is always usable; the other brushes need an activity to paint with.
    pub fn is_active(&self) -> bool {
        match self {
            Brush::Erase => true,
            _ => self.activity_id().is_some_and(|id| !id.is_empty()),
        }
    }

    /// Writes this brush onto a tile. Inactive brushes leave it untouched.
    pub fn paint(&self, tile: &mut Tile) -> bool {
        if !self.is_active() {
            return false;
        }
        match self {
            Brush::Erase => tile.clear(),
            Brush::Activity { activity_id } => tile.activity_id = activity_id.clone(),
            Brush::Copy {
                activity_id,
                comment,
            } => {
                tile.activity_id = activity_id.clone();
                tile.comment = comment.clone();
            }
        }
        true
    }
}

/// Selecting the brush that is already selected deselects it.
fn toggle(current: &mut Option<Brush>, candidate: Brush) {
    if current.as_ref() == Some(&candidate) {
        *current = None;
    } else {
        *current = Some(candidate);
    }
}

pub fn is_brush_active(brush: Option<&Brush>) -> bool {
    brush.is_some_and(Brush::is_active)
}

pub fn apply_brush(brush: Option<&Brush>, day: &mut Day, index: usize) -> bool {
    match (brush, day.tile_mut(index)) {
        (Some(brush), Some(tile)) => brush.paint(tile),
        _ => false,
    }
}

impl State {
    pub fn select_activity_brush(&mut self, id: &str) -> bool {
        if self.activity(id).is_none() {
            return false;
        }
        toggle(&mut self.selected_brush, Brush::activity(id));
        true
    }

    pub fn select_erase_brush(&mut self) {
        toggle(&mut self.selected_brush, Brush::Erase);
    }

    /// Picks up a tile's activity and comment. Tiles without an activity cannot be copied.
    pub fn select_copy_brush(&mut self, tile: &Tile) -> bool {
        match Brush::copy_of(tile) {
            Some(brush) => {
                toggle(&mut self.selected_brush, brush);
                true
            }
            None => false,
        }
    }

    pub fn select_copy_brush_from_selection(&mut self) -> bool {
        let Some((_, tile)) = self.selected_tile() else {
            return false;
        };
        let tile = tile.clone();
        self.select_copy_brush(&tile)
    }

    /// True when the copy brush currently holds exactly this tile's content.
    pub fn is_copying(&self, tile: &Tile) -> bool {
        matches!(
            (&self.selected_brush, Brush::copy_of(tile)),
            (Some(current), Some(candidate)) if *current == candidate
        )
    }

    pub fn is_brush_active(&self) -> bool {
        is_brush_active(self.selected_brush.as_ref())
    }

    /// Applies the selected brush to a tile of the selected day.
    pub fn apply_brush(&mut self, index: usize) -> bool {
        let brush = self.selected_brush.clone();
        apply_brush(brush.as_ref(), self.selected_day_mut(), index)
    }

    /// A click moves the panel selection and paints with the active brush, if any.
    pub fn click_tile(&mut self, index: usize) -> bool {
        if self.select_tile(index).is_err() {
            return false;
        }
        self.apply_brush(index);
        true
    }
}
