use crate::brush::Brush;
use crate::color::DEFAULT_ACTIVITY_COLOR;
use crate::grid::TOTAL_TILES;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub type ActivityId = String;
pub type GroupId = String;

pub const DEFAULT_ACTIVITY_NAME: &str = "Новая активность";
pub const DEFAULT_GROUP_NAME: &str = "Новая группа";
pub const UNGROUPED_LABEL: &str = "Без группы";
pub const NO_ACTIVITY_LABEL: &str = "Без активности";
pub const UNSET_ACTIVITY_LABEL: &str = "Не задана";
pub const TODAY_LABEL: &str = "Сегодня";

const ID_LEN: usize = 7;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    #[serde(default)]
    pub activity_id: Option<ActivityId>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub comment: String,
}

impl Tile {
    pub fn painted(activity_id: &str, comment: &str) -> Self {
        Tile {
            activity_id: Some(activity_id.to_string()),
            comment: comment.to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.activity_id = None;
        self.comment.clear();
    }
}

/// The 144 tiles of one calendar day, serialized as a bare array.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Day {
    tiles: Vec<Tile>,
}

impl Default for Day {
    fn default() -> Self {
        Day {
            tiles: vec![Tile::default(); TOTAL_TILES],
        }
    }
}

impl Day {
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Tile> {
        self.tiles.iter_mut()
    }

    pub fn is_blank(&self) -> bool {
        self.tiles
            .iter()
            .all(|t| t.activity_id.is_none() && t.comment.is_empty())
    }

    /// Forces exactly `TOTAL_TILES` tiles and drops empty-string activity ids.
    fn repair(&mut self) -> bool {
        let mut changed = self.tiles.len() != TOTAL_TILES;
        self.tiles.resize_with(TOTAL_TILES, Tile::default);
        for tile in &mut self.tiles {
            if tile.activity_id.as_deref() == Some("") {
                tile.activity_id = None;
                changed = true;
            }
        }
        changed
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "Option<SettingsRecord>")]
pub struct Settings {
    pub show_time_labels: bool,
    pub dark_mode: bool,
    pub dim_past_tiles: bool,
    pub show_activity_labels: bool,
    pub connect_tiles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_time_labels: true,
            dark_mode: false,
            dim_past_tiles: true,
            show_activity_labels: true,
            connect_tiles: true,
        }
    }
}

/// Stored settings as read from disk: absent and `null` flags both fall back to defaults.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord {
    show_time_labels: Option<bool>,
    dark_mode: Option<bool>,
    dim_past_tiles: Option<bool>,
    show_activity_labels: Option<bool>,
    connect_tiles: Option<bool>,
}

impl From<Option<SettingsRecord>> for Settings {
    fn from(record: Option<SettingsRecord>) -> Self {
        let record = record.unwrap_or_default();
        let defaults = Settings::default();
        Settings {
            show_time_labels: record.show_time_labels.unwrap_or(defaults.show_time_labels),
            dark_mode: record.dark_mode.unwrap_or(defaults.dark_mode),
            dim_past_tiles: record.dim_past_tiles.unwrap_or(defaults.dim_past_tiles),
            show_activity_labels: record
                .show_activity_labels
                .unwrap_or(defaults.show_activity_labels),
            connect_tiles: record.connect_tiles.unwrap_or(defaults.connect_tiles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    TimeLabels,
    DarkMode,
    DimPastTiles,
    ActivityLabels,
    ConnectTiles,
}

impl Setting {
    pub fn label(&self) -> &'static str {
        match self {
            Setting::TimeLabels => "time labels",
            Setting::DarkMode => "dark mode",
            Setting::DimPastTiles => "dim past tiles",
            Setting::ActivityLabels => "activity labels",
            Setting::ConnectTiles => "connect tiles",
        }
    }
}

impl Settings {
    pub fn get(&self, setting: Setting) -> bool {
        match setting {
            Setting::TimeLabels => self.show_time_labels,
            Setting::DarkMode => self.dark_mode,
            Setting::DimPastTiles => self.dim_past_tiles,
            Setting::ActivityLabels => self.show_activity_labels,
            Setting::ConnectTiles => self.connect_tiles,
        }
    }

    pub fn set(&mut self, setting: Setting, value: bool) {
        let slot = match setting {
            Setting::TimeLabels => &mut self.show_time_labels,
            Setting::DarkMode => &mut self.dark_mode,
            Setting::DimPastTiles => &mut self.dim_past_tiles,
            Setting::ActivityLabels => &mut self.show_activity_labels,
            Setting::ConnectTiles => &mut self.connect_tiles,
        };
        *slot = value;
    }

    /// Flips a flag and returns its new value.
    pub fn toggle(&mut self, setting: Setting) -> bool {
        let value = !self.get(setting);
        self.set(setting, value);
        value
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("activity not found: {0}")]
    ActivityNotFound(String),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("day not found: {0}")]
    DayNotFound(String),
    #[error("tile {0} is outside the day (0..{max})", max = TOTAL_TILES - 1)]
    TileOutOfRange(usize),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub selected_day: String,
    #[serde(default)]
    pub selected_tile: Option<usize>,
    #[serde(default)]
    pub selected_brush: Option<Brush>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub days: BTreeMap<String, Day>,
}

impl State {
    pub fn new(today: &str) -> Self {
        let mut days = BTreeMap::new();
        days.insert(today.to_string(), Day::default());
        State {
            settings: Settings::default(),
            selected_day: today.to_string(),
            selected_tile: None,
            selected_brush: None,
            groups: Vec::new(),
            activities: Vec::new(),
            days,
        }
    }

    /// Creates the day if it does not exist yet. Returns true when it was created.
    pub fn ensure_day(&mut self, key: &str) -> bool {
        if self.days.contains_key(key) {
            return false;
        }
        debug!(day = key, "creating day");
        self.days.insert(key.to_string(), Day::default());
        true
    }

    /// Guarantees today's day exists and that the selected day points at an existing day.
    pub fn ensure_today(&mut self, today: &str) {
        self.ensure_day(today);
        if !self.days.contains_key(&self.selected_day) {
            self.selected_day = today.to_string();
        }
    }

    /// Normalizes a decoded record: tile counts, empty ids, dangling selections.
    pub fn repair(&mut self, today: &str) -> bool {
        let mut changed = false;
        for day in self.days.values_mut() {
            changed |= day.repair();
        }
        for activity in &mut self.activities {
            if activity.group_id.as_deref() == Some("") {
                activity.group_id = None;
                changed = true;
            }
        }
        if self.selected_tile.is_some_and(|i| i >= TOTAL_TILES) {
            self.selected_tile = None;
            changed = true;
        }
        let selected_before = self.selected_day.clone();
        let days_before = self.days.len();
        self.ensure_today(today);
        changed |= selected_before != self.selected_day || days_before != self.days.len();
        changed
    }

    pub fn selected_day(&self) -> Option<&Day> {
        self.days.get(&self.selected_day)
    }

    pub fn selected_day_mut(&mut self) -> &mut Day {
        self.days.entry(self.selected_day.clone()).or_default()
    }

    pub fn day(&self, key: &str) -> Result<&Day, StateError> {
        self.days
            .get(key)
            .ok_or_else(|| StateError::DayNotFound(key.to_string()))
    }

    pub fn select_day(&mut self, key: &str) -> bool {
        if !self.days.contains_key(key) {
            return false;
        }
        self.selected_day = key.to_string();
        self.selected_tile = None;
        true
    }

    /// Day keys newest first; days after `today` are kept in storage but not listed.
    pub fn listed_days(&self, today: &str) -> Vec<&str> {
        self.days
            .keys()
            .rev()
            .map(String::as_str)
            .filter(|key| *key <= today)
            .collect()
    }

    pub fn selected_tile(&self) -> Option<(usize, &Tile)> {
        let index = self.selected_tile?;
        self.selected_day()?.tile(index).map(|tile| (index, tile))
    }

    pub fn select_tile(&mut self, index: usize) -> Result<(), StateError> {
        if index >= TOTAL_TILES {
            return Err(StateError::TileOutOfRange(index));
        }
        self.selected_tile = Some(index);
        Ok(())
    }

    pub fn clear_selected_tile(&mut self) -> bool {
        let Some(index) = self.selected_tile else {
            return false;
        };
        match self.selected_day_mut().tile_mut(index) {
            Some(tile) => {
                tile.clear();
                true
            }
            None => false,
        }
    }

    pub fn set_selected_comment(&mut self, comment: &str) -> bool {
        let Some(index) = self.selected_tile else {
            return false;
        };
        self.set_comment(index, comment).is_ok()
    }

    pub fn set_comment(&mut self, index: usize, comment: &str) -> Result<(), StateError> {
        let tile = self
            .selected_day_mut()
            .tile_mut(index)
            .ok_or(StateError::TileOutOfRange(index))?;
        tile.comment = comment.to_string();
        Ok(())
    }

    pub fn activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Looks an activity up by id, then by exact name.
    pub fn find_activity(&self, needle: &str) -> Result<&Activity, StateError> {
        self.activity(needle)
            .or_else(|| self.activities.iter().find(|a| a.name == needle))
            .ok_or_else(|| StateError::ActivityNotFound(needle.to_string()))
    }

    pub fn find_group(&self, needle: &str) -> Result<&Group, StateError> {
        self.group(needle)
            .or_else(|| self.groups.iter().find(|g| g.name == needle))
            .ok_or_else(|| StateError::GroupNotFound(needle.to_string()))
    }

    /// Members of a group (or the ungrouped bucket for `None`) in list order.
    pub fn activities_in<'a>(
        &'a self,
        group_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Activity> + 'a {
        self.activities
            .iter()
            .filter(move |a| a.group_id.as_deref() == group_id)
    }

    pub fn create_activity(
        &mut self,
        group_id: Option<GroupId>,
        color: Option<&str>,
    ) -> ActivityId {
        let id = self.generate_id();
        self.activities.push(Activity {
            id: id.clone(),
            name: DEFAULT_ACTIVITY_NAME.to_string(),
            color: color.unwrap_or(DEFAULT_ACTIVITY_COLOR).to_string(),
            group_id,
        });
        id
    }

    pub fn add_group(&mut self, name: Option<&str>, color: &str) -> GroupId {
        let id = self.generate_id();
        self.groups.push(Group {
            id: id.clone(),
            name: name.unwrap_or(DEFAULT_GROUP_NAME).to_string(),
            color: color.to_string(),
        });
        id
    }

    pub fn update_activity<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Activity),
    {
        match self.activities.iter_mut().find(|a| a.id == id) {
            Some(activity) => {
                f(activity);
                true
            }
            None => false,
        }
    }

    pub fn update_group<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Group),
    {
        match self.groups.iter_mut().find(|g| g.id == id) {
            Some(group) => {
                f(group);
                true
            }
            None => false,
        }
    }

    /// Removes an activity, unpaints it from every tile of every day and drops a brush
    /// that refers to it.
    pub fn delete_activity(&mut self, id: &str) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        if self.activities.len() == before {
            return false;
        }
        let mut cleared = 0usize;
        for day in self.days.values_mut() {
            for tile in day.iter_mut() {
                if tile.activity_id.as_deref() == Some(id) {
                    tile.activity_id = None;
                    cleared += 1;
                }
            }
        }
        if self
            .selected_brush
            .as_ref()
            .is_some_and(|b| b.activity_id() == Some(id))
        {
            self.selected_brush = None;
        }
        debug!(activity = id, tiles = cleared, "deleted activity");
        true
    }

    /// Removes a group; its activities stay in place and become ungrouped.
    pub fn delete_group(&mut self, id: &str) -> bool {
        if self.group(id).is_none() {
            return false;
        }
        for activity in &mut self.activities {
            if activity.group_id.as_deref() == Some(id) {
                activity.group_id = None;
            }
        }
        self.groups.retain(|g| g.id != id);
        true
    }

    /// Moves an activity into `target_group` and re-inserts it in the ordered list.
    ///
    /// Without a target activity it lands after the last member of the destination group
    /// (or at the very end when that group is empty). With one it lands right before or
    /// after the target, whichever group the target belongs to.
    pub fn move_activity(
        &mut self,
        id: &str,
        target_group: Option<&str>,
        target_activity: Option<&str>,
        place_before: bool,
    ) -> bool {
        if target_activity == Some(id) {
            return false;
        }
        let Some(source) = self.activities.iter().position(|a| a.id == id) else {
            return false;
        };
        let mut item = self.activities.remove(source);
        item.group_id = target_group.map(str::to_string);

        let insert_at = match target_activity {
            None => self
                .activities
                .iter()
                .rposition(|a| a.group_id.as_deref() == target_group)
                .map(|last| last + 1),
            Some(target) => self
                .activities
                .iter()
                .position(|a| a.id == target)
                .map(|idx| if place_before { idx } else { idx + 1 }),
        };
        match insert_at {
            Some(idx) => self.activities.insert(idx, item),
            None => self.activities.push(item),
        }
        true
    }

    fn generate_id(&self) -> String {
        loop {
            let id: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(ID_LEN)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            if self.activity(&id).is_none() && self.group(&id).is_none() {
                return id;
            }
        }
    }
}

pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: &str = "2026-10-19";

    fn activity(id: &str, group: Option<&str>) -> Activity {
        Activity {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: "#22c55e".to_string(),
            group_id: group.map(str::to_string),
        }
    }

    fn state_with(activities: Vec<Activity>) -> State {
        let mut state = State::new(TODAY);
        state.groups = vec![
            Group {
                id: "g1".into(),
                name: "Work".into(),
                color: "#ef4444".into(),
            },
            Group {
                id: "g2".into(),
                name: "Home".into(),
                color: "#3b82f6".into(),
            },
        ];
        state.activities = activities;
        state
    }

    fn order(state: &State) -> Vec<&str> {
        state.activities.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn new_state_has_only_today() {
        let state = State::new(TODAY);
        assert_eq!(state.selected_day, TODAY);
        assert_eq!(state.days.len(), 1);
        assert_eq!(state.days[TODAY].tiles().len(), TOTAL_TILES);
        assert!(state.days[TODAY].is_blank());
        assert_eq!(state.settings, Settings::default());
    }

    #[test]
    fn ensure_day_is_idempotent() {
        let mut state = State::new(TODAY);
        state.days.get_mut(TODAY).unwrap().tile_mut(3).unwrap().comment = "keep".into();
        assert!(!state.ensure_day(TODAY));
        assert_eq!(state.days[TODAY].tile(3).unwrap().comment, "keep");
        assert!(state.ensure_day("2026-10-20"));
        assert_eq!(state.days.len(), 2);
    }

    #[test]
    fn ensure_today_reselects_missing_day() {
        let mut state = State::new("2026-10-18");
        state.selected_day = "1999-01-01".into();
        state.ensure_today(TODAY);
        assert_eq!(state.selected_day, TODAY);
        assert!(state.days.contains_key("2026-10-18"));

        state.selected_day = "2026-10-18".into();
        state.ensure_today(TODAY);
        assert_eq!(state.selected_day, "2026-10-18");
    }

    #[test]
    fn listed_days_hide_the_future() {
        let mut state = State::new(TODAY);
        state.ensure_day("2026-10-17");
        state.ensure_day("2026-10-25");
        assert_eq!(state.listed_days(TODAY), vec![TODAY, "2026-10-17"]);
        assert!(state.days.contains_key("2026-10-25"));
    }

    #[test]
    fn select_day_clears_tile_selection() {
        let mut state = State::new(TODAY);
        state.ensure_day("2026-10-17");
        state.selected_tile = Some(5);
        assert!(state.select_day("2026-10-17"));
        assert_eq!(state.selected_tile, None);
        assert!(!state.select_day("2000-01-01"));
        assert_eq!(state.selected_day, "2026-10-17");
    }

    #[test]
    fn delete_activity_cascades_to_tiles_and_brush() {
        let mut state = state_with(vec![activity("a", None), activity("b", None)]);
        state.ensure_day("2026-10-18");
        state.days.get_mut(TODAY).unwrap().tile_mut(0).unwrap().activity_id = Some("a".into());
        state.days.get_mut(TODAY).unwrap().tile_mut(0).unwrap().comment = "note".into();
        state.days.get_mut("2026-10-18").unwrap().tile_mut(9).unwrap().activity_id =
            Some("a".into());
        state.days.get_mut(TODAY).unwrap().tile_mut(1).unwrap().activity_id = Some("b".into());
        state.selected_brush = Some(Brush::Copy {
            activity_id: Some("a".into()),
            comment: "note".into(),
        });

        assert!(state.delete_activity("a"));

        assert_eq!(order(&state), vec!["b"]);
        let today = &state.days[TODAY];
        assert_eq!(today.tile(0).unwrap().activity_id, None);
        assert_eq!(today.tile(0).unwrap().comment, "note");
        assert_eq!(today.tile(1).unwrap().activity_id.as_deref(), Some("b"));
        assert_eq!(state.days["2026-10-18"].tile(9).unwrap().activity_id, None);
        assert_eq!(state.selected_brush, None);
    }

    #[test]
    fn delete_activity_keeps_unrelated_brush() {
        let mut state = state_with(vec![activity("a", None), activity("b", None)]);
        state.selected_brush = Some(Brush::Erase);
        assert!(state.delete_activity("a"));
        assert_eq!(state.selected_brush, Some(Brush::Erase));
        assert!(!state.delete_activity("missing"));
    }

    #[test]
    fn delete_group_ungroups_members() {
        let mut state = state_with(vec![
            activity("a", Some("g1")),
            activity("b", Some("g2")),
            activity("c", Some("g1")),
        ]);
        assert!(state.delete_group("g1"));
        assert_eq!(state.groups.len(), 1);
        assert_eq!(order(&state), vec!["a", "b", "c"]);
        assert_eq!(state.activities_in(None).count(), 2);
        assert_eq!(state.activity("b").unwrap().group_id.as_deref(), Some("g2"));
        assert!(!state.delete_group("g1"));
    }

    #[test]
    fn move_into_empty_group_without_target() {
        let mut state = state_with(vec![activity("a", None), activity("b", Some("g1"))]);
        assert!(state.move_activity("a", Some("g2"), None, true));
        let members: Vec<_> = state.activities_in(Some("g2")).map(|a| a.id.as_str()).collect();
        assert_eq!(members, vec!["a"]);
        assert_eq!(order(&state), vec!["b", "a"]);
    }

    #[test]
    fn move_without_target_lands_after_last_member() {
        let mut state = state_with(vec![
            activity("a", Some("g1")),
            activity("b", None),
            activity("c", Some("g1")),
            activity("d", None),
            activity("e", Some("g2")),
        ]);
        assert!(state.move_activity("e", Some("g1"), None, true));
        assert_eq!(order(&state), vec!["a", "b", "c", "e", "d"]);
        assert_eq!(state.activity("e").unwrap().group_id.as_deref(), Some("g1"));
    }

    #[test]
    fn move_relative_to_target() {
        let mut state = state_with(vec![
            activity("a", None),
            activity("b", None),
            activity("c", None),
        ]);
        assert!(state.move_activity("c", None, Some("a"), true));
        assert_eq!(order(&state), vec!["c", "a", "b"]);
        assert!(state.move_activity("c", None, Some("b"), false));
        assert_eq!(order(&state), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_trusts_target_over_group() {
        let mut state = state_with(vec![activity("a", Some("g1")), activity("b", None)]);
        assert!(state.move_activity("b", Some("g2"), Some("a"), true));
        assert_eq!(order(&state), vec!["b", "a"]);
        assert_eq!(state.activity("b").unwrap().group_id.as_deref(), Some("g2"));
    }

    #[test]
    fn move_onto_itself_or_unknown_is_noop() {
        let mut state = state_with(vec![activity("a", None), activity("b", None)]);
        let before = state.clone();
        assert!(!state.move_activity("a", None, Some("a"), true));
        assert!(!state.move_activity("zzz", Some("g1"), None, true));
        assert_eq!(state, before);
    }

    #[test]
    fn move_with_missing_target_appends() {
        let mut state = state_with(vec![activity("a", None), activity("b", None)]);
        assert!(state.move_activity("a", None, Some("gone"), true));
        assert_eq!(order(&state), vec!["b", "a"]);
    }

    #[test]
    fn created_activities_append_with_defaults() {
        let mut state = state_with(vec![activity("a", None)]);
        let id = state.create_activity(Some("g1".into()), None);
        let created = state.activities.last().unwrap();
        assert_eq!(created.id, id);
        assert_eq!(created.name, DEFAULT_ACTIVITY_NAME);
        assert_eq!(created.color, DEFAULT_ACTIVITY_COLOR);
        assert_eq!(created.group_id.as_deref(), Some("g1"));
        assert_eq!(id.len(), ID_LEN);

        let group = state.add_group(None, "#f97316");
        assert_eq!(state.group(&group).unwrap().name, DEFAULT_GROUP_NAME);
    }

    #[test]
    fn repair_pads_days_and_drops_dangling_selection() {
        let mut state: State = serde_json::from_str(
            r##"{"selectedDay":"2026-10-01","selectedTile":500,
                "activities":[{"id":"a","name":"A","color":"#000000","groupId":""}],
                "days":{"2026-10-01":[{"activityId":"a","comment":null},{"activityId":""}]}}"##,
        )
        .unwrap();
        assert!(state.repair(TODAY));
        assert_eq!(state.days["2026-10-01"].tiles().len(), TOTAL_TILES);
        assert_eq!(state.days["2026-10-01"].tile(0).unwrap().comment, "");
        assert_eq!(state.days["2026-10-01"].tile(1).unwrap().activity_id, None);
        assert_eq!(state.activities[0].group_id, None);
        assert_eq!(state.selected_tile, None);
        assert_eq!(state.selected_day, "2026-10-01");
        assert!(state.days.contains_key(TODAY));
        assert!(!state.repair(TODAY));
    }

    #[test]
    fn selected_tile_panel_operations() {
        let mut state = State::new(TODAY);
        assert!(!state.clear_selected_tile());
        assert!(!state.set_selected_comment("x"));
        state.select_tile(7).unwrap();
        assert!(state.set_selected_comment("lunch"));
        state.selected_day_mut().tile_mut(7).unwrap().activity_id = Some("a".into());
        assert_eq!(state.selected_tile().unwrap().1.comment, "lunch");
        assert!(state.clear_selected_tile());
        assert_eq!(state.selected_tile().unwrap().1, &Tile::default());
        assert_eq!(state.select_tile(144), Err(StateError::TileOutOfRange(144)));
    }

    #[test]
    fn settings_toggle_round_trip() {
        let mut settings = Settings::default();
        assert!(!settings.toggle(Setting::ConnectTiles));
        assert!(!settings.connect_tiles);
        assert!(settings.toggle(Setting::DarkMode));
        assert!(settings.get(Setting::DarkMode));
    }

    #[test]
    fn lookup_by_name_or_id() {
        let state = state_with(vec![activity("a", None)]);
        assert_eq!(state.find_activity("A").unwrap().id, "a");
        assert_eq!(state.find_activity("a").unwrap().id, "a");
        assert!(state.find_activity("nope").is_err());
        assert_eq!(state.find_group("Home").unwrap().id, "g2");
    }
}
