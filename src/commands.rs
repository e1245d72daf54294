use crate::adjacency::is_same_meta;
use crate::brush::{apply_brush, Brush};
use crate::cli::{ActivityCommand, DayArg, GroupCommand, SettingArg};
use crate::color::{palette_color, Rgb};
use crate::grid::{self, parse_day_key, tile_range, time_to_tile, Rounding, TOTAL_TILES};
use crate::model::{Setting, State, Tile, NO_ACTIVITY_LABEL, TODAY_LABEL, UNGROUPED_LABEL};
use crate::storage::{init_project_state, load_state, save_state, StateLocation};
use crate::ui;
use anyhow::{bail, Context, Result};
use chrono::Local;
use std::fs;
use std::io::{self, Read};
use std::ops::Range;
use std::path::PathBuf;

pub fn today() -> String {
    grid::day_key(Local::now().date_naive())
}

pub fn init() -> Result<()> {
    let location = init_project_state(&today())?;
    println!("Initialized day planner at {}", location.path.display());
    Ok(())
}

pub fn show(location: &StateLocation, day: DayArg) -> Result<()> {
    let mut state = load_state(location, &today())?;
    let key = select_day(&mut state, &day)?;
    let day = state.day(&key)?;
    let tiles = day.tiles();
    println!("{} ({})", grid::format_day(&key), key);

    if day.is_blank() {
        println!("  (empty)");
    } else {
        let mut start = 0;
        while start < tiles.len() {
            let mut end = start + 1;
            while end < tiles.len() && is_same_meta(&tiles[start], &tiles[end]) {
                end += 1;
            }
            print_run(&state, start..end, &tiles[start]);
            start = end;
        }
    }
    if let Some(brush) = &state.selected_brush {
        println!();
        println!("brush: {}", describe_brush(&state, brush));
    }
    save_state(location, &state)?;
    Ok(())
}

pub fn days(location: &StateLocation) -> Result<()> {
    let today = today();
    let state = load_state(location, &today)?;
    for key in state.listed_days(&today) {
        let label = if key == today {
            TODAY_LABEL.to_string()
        } else {
            grid::format_day(key)
        };
        let marker = if key == state.selected_day { "*" } else { " " };
        let painted = state
            .days
            .get(key)
            .map(|d| d.tiles().iter().filter(|t| t.activity_id.is_some()).count())
            .unwrap_or(0);
        println!("{} {} ({})  {} tile(s)", marker, label, key, painted);
    }
    Ok(())
}

pub fn paint(
    location: &StateLocation,
    activity: String,
    from: String,
    to: String,
    day: DayArg,
) -> Result<()> {
    let mut state = load_state(location, &today())?;
    select_day(&mut state, &day)?;
    let activity = state.find_activity(&activity)?;
    let (id, name) = (activity.id.clone(), activity.name.clone());
    let range = parse_range(&from, &to)?;
    let painted = paint_range(&mut state, &Brush::activity(&id), range.clone());
    save_state(location, &state)?;
    println!(
        "Painted {} tile(s) {} with {}",
        painted,
        describe_range(&range),
        name
    );
    Ok(())
}

pub fn erase(location: &StateLocation, from: String, to: String, day: DayArg) -> Result<()> {
    let mut state = load_state(location, &today())?;
    select_day(&mut state, &day)?;
    let range = parse_range(&from, &to)?;
    let erased = paint_range(&mut state, &Brush::Erase, range.clone());
    save_state(location, &state)?;
    println!("Erased {} tile(s) {}", erased, describe_range(&range));
    Ok(())
}

pub fn comment(location: &StateLocation, at: String, text: String, day: DayArg) -> Result<()> {
    let mut state = load_state(location, &today())?;
    select_day(&mut state, &day)?;
    let index = time_to_tile(&at, Rounding::Floor)?;
    state.set_comment(index, &text)?;
    save_state(location, &state)?;
    println!("Comment set on {}", grid::tile_range_label(index));
    Ok(())
}

pub fn import(location: &StateLocation, file: Option<PathBuf>, day: DayArg) -> Result<()> {
    let text = match file {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading meetings from stdin")?;
            buf
        }
    };
    let mut state = load_state(location, &today())?;
    let key = select_day(&mut state, &day)?;
    let summary = state.import_meetings(&text);
    save_state(location, &state)?;
    println!(
        "Imported {} meeting(s) into {} ({} tile(s)), skipped {} line(s)",
        summary.matched, key, summary.tiles_written, summary.skipped
    );
    if summary.created_activity {
        println!("Created the meeting activity");
    }
    Ok(())
}

pub fn activity(location: &StateLocation, command: ActivityCommand) -> Result<()> {
    let mut state = load_state(location, &today())?;
    match command {
        ActivityCommand::List => {
            print_activities(&state);
            return Ok(());
        }
        ActivityCommand::Add { name, color, group } => {
            let group = match group {
                Some(g) => Some(state.find_group(&g)?.clone()),
                None => None,
            };
            let color = match color {
                Some(c) => parse_color(&c)?,
                None => group
                    .as_ref()
                    .map(|g| g.color.clone())
                    .unwrap_or_else(|| palette_color(state.activities.len()).to_string()),
            };
            let id = state.create_activity(group.map(|g| g.id), Some(&color));
            if let Some(name) = name {
                state.update_activity(&id, |a| a.name = name);
            }
            println!("Added activity {}", id);
        }
        ActivityCommand::Rm { activity } => {
            let id = state.find_activity(&activity)?.id.clone();
            state.delete_activity(&id);
            println!("Deleted activity {}", id);
        }
        ActivityCommand::Rename { activity, name } => {
            let id = state.find_activity(&activity)?.id.clone();
            state.update_activity(&id, |a| a.name = name);
            println!("Renamed activity {}", id);
        }
        ActivityCommand::Recolor { activity, color } => {
            let id = state.find_activity(&activity)?.id.clone();
            let color = parse_color(&color)?;
            state.update_activity(&id, |a| a.color = color);
            println!("Recolored activity {}", id);
        }
        ActivityCommand::Mv {
            activity,
            group,
            before,
            after,
        } => {
            let id = state.find_activity(&activity)?.id.clone();
            let group_id = match group {
                Some(g) => Some(state.find_group(&g)?.id.clone()),
                None => None,
            };
            let (target, place_before) = match (before, after) {
                (Some(t), _) => (Some(state.find_activity(&t)?.id.clone()), true),
                (None, Some(t)) => (Some(state.find_activity(&t)?.id.clone()), false),
                (None, None) => (None, true),
            };
            if !state.move_activity(&id, group_id.as_deref(), target.as_deref(), place_before) {
                bail!("cannot move {} relative to itself", id);
            }
            println!("Moved activity {}", id);
        }
    }
    save_state(location, &state)?;
    Ok(())
}

pub fn group(location: &StateLocation, command: GroupCommand) -> Result<()> {
    let mut state = load_state(location, &today())?;
    match command {
        GroupCommand::Add { name, color } => {
            let color = match color {
                Some(c) => parse_color(&c)?,
                None => palette_color(state.groups.len()).to_string(),
            };
            let id = state.add_group(name.as_deref(), &color);
            println!("Added group {}", id);
        }
        GroupCommand::Rm { group } => {
            let id = state.find_group(&group)?.id.clone();
            state.delete_group(&id);
            println!("Deleted group {}", id);
        }
        GroupCommand::Rename { group, name } => {
            let id = state.find_group(&group)?.id.clone();
            state.update_group(&id, |g| g.name = name);
            println!("Renamed group {}", id);
        }
        GroupCommand::Recolor { group, color } => {
            let id = state.find_group(&group)?.id.clone();
            let color = parse_color(&color)?;
            state.update_group(&id, |g| g.color = color);
            println!("Recolored group {}", id);
        }
    }
    save_state(location, &state)?;
    Ok(())
}

pub fn toggle(location: &StateLocation, setting: SettingArg) -> Result<()> {
    let mut state = load_state(location, &today())?;
    let setting = Setting::from(setting);
    let value = state.settings.toggle(setting);
    save_state(location, &state)?;
    println!("{}: {}", setting.label(), if value { "on" } else { "off" });
    Ok(())
}

pub fn tui(location: StateLocation) -> Result<()> {
    let state = load_state(&location, &today())?;
    ui::run(state, location)
}

impl From<SettingArg> for Setting {
    fn from(arg: SettingArg) -> Self {
        match arg {
            SettingArg::TimeLabels => Setting::TimeLabels,
            SettingArg::DarkMode => Setting::DarkMode,
            SettingArg::DimPast => Setting::DimPastTiles,
            SettingArg::ActivityLabels => Setting::ActivityLabels,
            SettingArg::ConnectTiles => Setting::ConnectTiles,
        }
    }
}

/// Switches to the requested day, creating it if needed. Returns the day key in use.
fn select_day(state: &mut State, day: &DayArg) -> Result<String> {
    if let Some(key) = &day.day {
        parse_day_key(key)?;
        state.ensure_day(key);
        state.select_day(key);
    }
    Ok(state.selected_day.clone())
}

/// `from` rounds down and `to` rounds up, the same way imported meetings do.
fn parse_range(from: &str, to: &str) -> Result<Range<usize>> {
    let start = time_to_tile(from, Rounding::Floor)?;
    let end = time_to_tile(to, Rounding::Ceil)?.min(TOTAL_TILES);
    if end <= start {
        bail!("empty range {}-{}", from, to);
    }
    Ok(start..end)
}

fn paint_range(state: &mut State, brush: &Brush, range: Range<usize>) -> usize {
    let day = state.selected_day_mut();
    range
        .filter(|&index| apply_brush(Some(brush), day, index))
        .count()
}

fn parse_color(input: &str) -> Result<String> {
    match Rgb::parse_hex(input.trim()) {
        Some(color) => Ok(color.to_string()),
        None => bail!("invalid color (use #rrggbb): {}", input),
    }
}

fn describe_range(range: &Range<usize>) -> String {
    let (start, _) = tile_range(range.start);
    let (_, end) = tile_range(range.end.saturating_sub(1));
    format!("{}-{}", start, end)
}

fn describe_brush(state: &State, brush: &Brush) -> String {
    let name = |id: Option<&str>| {
        id.and_then(|id| state.activity(id))
            .map(|a| a.name.clone())
            .unwrap_or_else(|| "?".to_string())
    };
    match brush {
        Brush::Erase => "erase".to_string(),
        Brush::Activity { activity_id } => format!("paint {}", name(activity_id.as_deref())),
        Brush::Copy {
            activity_id,
            comment,
        } => format!("copy {} \"{}\"", name(activity_id.as_deref()), comment),
    }
}

fn print_run(state: &State, range: Range<usize>, tile: &Tile) {
    let activity = tile
        .activity_id
        .as_deref()
        .and_then(|id| state.activity(id));
    if activity.is_none() && tile.comment.is_empty() {
        return;
    }
    let name = activity
        .map(|a| a.name.as_str())
        .unwrap_or(NO_ACTIVITY_LABEL);
    print!("  {}  {}", describe_range(&range), name);
    if !tile.comment.is_empty() {
        print!(": {}", tile.comment);
    }
    println!();
}

fn print_activities(state: &State) {
    let print_members = |group: Option<&str>| {
        let mut any = false;
        for activity in state.activities_in(group) {
            any = true;
            println!("  - {}: {} {}", activity.id, activity.name, activity.color);
        }
        if !any {
            println!("  (empty)");
        }
    };
    println!("{}", UNGROUPED_LABEL);
    print_members(None);
    for group in &state.groups {
        println!();
        println!("{} [{}] {}", group.name, group.id, group.color);
        print_members(Some(&group.id));
    }
}
