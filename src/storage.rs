use crate::model::State;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::Value;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PROJECT_DIR: &str = ".daytiles";
const STATE_FILE: &str = "state.json";
const LOG_FILE: &str = "daytiles.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateScope {
    Project,
    Global,
    Explicit,
}

impl StateScope {
    pub fn label(&self) -> &'static str {
        match self {
            StateScope::Project => "project",
            StateScope::Global => "global",
            StateScope::Explicit => "explicit",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StateLocation {
    pub path: PathBuf,
    pub scope: StateScope,
}

impl StateLocation {
    pub fn log_path(&self) -> PathBuf {
        self.path
            .parent()
            .map(|p| p.join(LOG_FILE))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE))
    }
}

pub fn init_project_state(today: &str) -> Result<StateLocation> {
    let cwd = env::current_dir()?;
    let dir = cwd.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .daytiles directory")?;
    let location = StateLocation {
        path: dir.join(STATE_FILE),
        scope: StateScope::Project,
    };
    if !location.path.exists() {
        save_state(&location, &State::new(today))?;
    }
    Ok(location)
}

/// An explicit path wins, then the nearest `.daytiles/state.json` walking up from
/// `start`, then the per-user data directory.
pub fn locate_state(start: &Path, explicit: Option<&Path>) -> Result<StateLocation> {
    if let Some(path) = explicit {
        return Ok(StateLocation {
            path: path.to_path_buf(),
            scope: StateScope::Explicit,
        });
    }
    if let Some(project_path) = find_project_state(start) {
        return Ok(StateLocation {
            path: project_path,
            scope: StateScope::Project,
        });
    }
    Ok(StateLocation {
        path: global_state_path()?,
        scope: StateScope::Global,
    })
}

/// Loads, migrates and repairs the persisted record. A missing or unreadable record
/// yields a fresh state; only I/O failures are reported.
pub fn load_state(location: &StateLocation, today: &str) -> Result<State> {
    if !location.path.exists() {
        info!(path = %location.path.display(), "no saved state, starting fresh");
        let state = State::new(today);
        save_state(location, &state)?;
        return Ok(state);
    }
    let data = fs::read_to_string(&location.path)
        .with_context(|| format!("reading {:?}", location.path))?;
    match decode_state(&data, today) {
        Some(state) => Ok(state),
        None => {
            warn!(path = %location.path.display(), "discarding corrupt state");
            let state = State::new(today);
            save_state(location, &state)?;
            Ok(state)
        }
    }
}

pub fn decode_state(raw: &str, today: &str) -> Option<State> {
    let mut value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "state is not valid JSON");
            return None;
        }
    };
    migrate_legacy_brush(&mut value);
    let mut state: State = match serde_json::from_value(value) {
        Ok(state) => state,
        Err(err) => {
            debug!(%err, "state does not match the schema");
            return None;
        }
    };
    if state.repair(today) {
        debug!("repaired loaded state");
    }
    Some(state)
}

/// Older records stored only the id of an activity brush under `selectedBrushId`.
fn migrate_legacy_brush(value: &mut Value) {
    let Some(record) = value.as_object_mut() else {
        return;
    };
    let legacy = record.remove("selectedBrushId");
    if record.contains_key("selectedBrush") {
        return;
    }
    let brush = match legacy {
        Some(Value::String(id)) if !id.is_empty() => {
            serde_json::json!({ "type": "activity", "activityId": id })
        }
        _ => Value::Null,
    };
    record.insert("selectedBrush".to_string(), brush);
}

pub fn save_state(location: &StateLocation, state: &State) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_json::to_string_pretty(state).context("serializing state")?;
    atomic_write(&location.path, &serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    debug!(path = %location.path.display(), "saved state");
    Ok(())
}

fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    fs::rename(&tmp_path, path)
}

fn find_project_state(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(STATE_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_state_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "daytiles").context("locating data directory")?;
    Ok(dirs.data_dir().join(STATE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::Brush;
    use crate::model::{Settings, Tile};
    use std::time::SystemTime;

    const TODAY: &str = "2026-10-19";

    fn unique_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        PathBuf::from(format!("/tmp/{}_{}", prefix, now))
    }

    fn location_in(dir: &Path) -> StateLocation {
        StateLocation {
            path: dir.join(STATE_FILE),
            scope: StateScope::Explicit,
        }
    }

    #[test]
    fn state_round_trips_through_disk() {
        let dir = unique_dir("daytiles_roundtrip");
        let location = location_in(&dir);
        let mut state = State::new(TODAY);
        let group = state.add_group(Some("Work"), "#ef4444");
        let id = state.create_activity(Some(group), None);
        state.ensure_day("2026-10-18");
        *state.selected_day_mut().tile_mut(12).unwrap() = Tile::painted(&id, "deep work");
        state.selected_tile = Some(12);
        state.selected_brush = Some(Brush::Copy {
            activity_id: Some(id.clone()),
            comment: "deep work".into(),
        });
        state.settings.dark_mode = true;

        save_state(&location, &state).unwrap();
        let loaded = load_state(&location, TODAY).unwrap();
        assert_eq!(loaded, state);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_file_starts_fresh_and_persists() {
        let dir = unique_dir("daytiles_missing");
        let location = location_in(&dir);
        let state = load_state(&location, TODAY).unwrap();
        assert_eq!(state, State::new(TODAY));
        assert!(location.path.exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_file_is_replaced_with_defaults() {
        let dir = unique_dir("daytiles_corrupt");
        fs::create_dir_all(&dir).unwrap();
        let location = location_in(&dir);
        fs::write(&location.path, "{ not json").unwrap();
        let state = load_state(&location, TODAY).unwrap();
        assert_eq!(state, State::new(TODAY));
        let rewritten = fs::read_to_string(&location.path).unwrap();
        assert!(decode_state(&rewritten, TODAY).is_some());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn wrong_shape_is_treated_as_corrupt() {
        assert!(decode_state(r#"{"activities": 3}"#, TODAY).is_none());
        assert!(decode_state("42", TODAY).is_none());
    }

    #[test]
    fn missing_settings_are_backfilled_without_touching_others() {
        let raw = r#"{
            "settings": {"showTimeLabels": false, "darkMode": true, "dimPastTiles": false},
            "selectedDay": "2026-10-19",
            "selectedTile": null,
            "selectedBrush": null,
            "groups": [],
            "activities": [],
            "days": {}
        }"#;
        let state = decode_state(raw, TODAY).unwrap();
        assert!(state.settings.connect_tiles);
        assert!(state.settings.show_activity_labels);
        assert!(!state.settings.show_time_labels);
        assert!(state.settings.dark_mode);
        assert!(!state.settings.dim_past_tiles);
        assert!(state.days.contains_key(TODAY));
    }

    #[test]
    fn null_settings_take_defaults_and_keep_the_record() {
        let raw = r##"{
            "settings": {"showTimeLabels": false, "darkMode": true, "connectTiles": null},
            "selectedDay": "2026-10-19",
            "activities": [{"id": "a", "name": "Code", "color": "#3b82f6", "groupId": null}],
            "days": {"2026-10-19": [{"activityId": "a", "comment": "focus"}]}
        }"##;
        let state = decode_state(raw, TODAY).unwrap();
        assert!(state.settings.connect_tiles);
        assert!(state.settings.dim_past_tiles);
        assert!(!state.settings.show_time_labels);
        assert!(state.settings.dark_mode);
        assert_eq!(state.activities.len(), 1);
        let tile = state.day(TODAY).unwrap().tile(0).unwrap();
        assert_eq!(tile.activity_id.as_deref(), Some("a"));
        assert_eq!(tile.comment, "focus");

        let raw = r#"{"settings": null, "selectedDay": "2026-10-19"}"#;
        assert_eq!(decode_state(raw, TODAY).unwrap().settings, Settings::default());
    }

    #[test]
    fn legacy_brush_id_is_migrated() {
        let raw = r#"{"selectedDay": "2026-10-19", "selectedBrushId": "abc", "days": {}}"#;
        let state = decode_state(raw, TODAY).unwrap();
        assert_eq!(state.selected_brush, Some(Brush::activity("abc")));

        let raw = r#"{"selectedDay": "2026-10-19", "selectedBrushId": null}"#;
        assert_eq!(decode_state(raw, TODAY).unwrap().selected_brush, None);
    }

    #[test]
    fn explicit_brush_wins_over_legacy_id() {
        let raw = r#"{"selectedBrush": {"type": "erase"}, "selectedBrushId": "abc"}"#;
        let state = decode_state(raw, TODAY).unwrap();
        assert_eq!(state.selected_brush, Some(Brush::Erase));
        assert_eq!(state.selected_day, TODAY);

        let raw = r#"{"selectedBrush": null, "selectedBrushId": "abc"}"#;
        assert_eq!(decode_state(raw, TODAY).unwrap().selected_brush, None);
    }

    #[test]
    fn saved_record_uses_camel_case_keys() {
        let state = State::new(TODAY);
        let json = serde_json::to_value(&state).unwrap();
        for key in [
            "settings",
            "selectedDay",
            "selectedTile",
            "selectedBrush",
            "groups",
            "activities",
            "days",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["days"][TODAY].as_array().unwrap().len(), 144);
        assert_eq!(json["settings"]["connectTiles"], Value::Bool(true));
        assert_eq!(json["days"][TODAY][0]["activityId"], Value::Null);
    }

    #[test]
    fn locate_prefers_explicit_then_project() {
        let dir = unique_dir("daytiles_locate");
        let nested = dir.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir_all(dir.join(PROJECT_DIR)).unwrap();
        fs::write(dir.join(PROJECT_DIR).join(STATE_FILE), "{}").unwrap();

        let found = locate_state(&nested, None).unwrap();
        assert_eq!(found.scope, StateScope::Project);
        assert_eq!(found.path, dir.join(PROJECT_DIR).join(STATE_FILE));

        let explicit = dir.join("custom.json");
        let found = locate_state(&nested, Some(&explicit)).unwrap();
        assert_eq!(found.scope, StateScope::Explicit);
        assert_eq!(found.path, explicit);
        assert_eq!(found.log_path(), dir.join(LOG_FILE));

        fs::remove_dir_all(dir).ok();
    }
}
