use crate::color::same_color;
use crate::grid::{time_to_tile, Rounding, TOTAL_TILES};
use crate::model::{Activity, ActivityId, State, Tile};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

pub const MEETING_NAME: &str = "Встреча";
pub const MEETING_COLOR: &str = "#0000FF";

/// One `HH:MM-HH:MM Title` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingLine<'a> {
    pub start: &'a str,
    pub end: &'a str,
    pub title: &'a str,
}

impl MeetingLine<'_> {
    /// Tile range covered by the meeting. Empty when the end is not after the start.
    pub fn tiles(&self) -> std::ops::Range<usize> {
        let start = time_to_tile(self.start, Rounding::Floor).unwrap_or(TOTAL_TILES);
        let end = time_to_tile(self.end, Rounding::Ceil)
            .unwrap_or(0)
            .min(TOTAL_TILES);
        start..end.max(start)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub activity_id: Option<ActivityId>,
    pub created_activity: bool,
    pub matched: usize,
    pub skipped: usize,
    pub tiles_written: usize,
}

/// The title stops at every line terminator, not only `\n`.
static MEETING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}:[0-9]{2})-([0-9]{2}:[0-9]{2})\s+([^\r\n\x{2028}\x{2029}]+)$")
        .expect("valid meeting line regex")
});

/// Matches one trimmed `HH:MM-HH:MM Title` line.
pub fn parse_line(line: &str) -> Option<MeetingLine<'_>> {
    let caps = MEETING_LINE.captures(line)?;
    let (_, [start, end, title]) = caps.extract();
    Some(MeetingLine { start, end, title })
}

pub fn parse_meetings(text: &str) -> (Vec<MeetingLine<'_>>, usize) {
    let mut skipped = 0;
    let meetings = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() {
                debug!(line, "skipping unrecognised import line");
                skipped += 1;
            }
            parsed
        })
        .collect();
    (meetings, skipped)
}

impl State {
    /// The meeting activity is recognised by its exact name and its blue color.
    pub fn meeting_activity(&self) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.name == MEETING_NAME && same_color(&a.color, MEETING_COLOR))
    }

    fn ensure_meeting_activity(&mut self) -> (ActivityId, bool) {
        if let Some(existing) = self.meeting_activity() {
            return (existing.id.clone(), false);
        }
        let id = self.create_activity(None, Some(MEETING_COLOR));
        self.update_activity(&id, |a| a.name = MEETING_NAME.to_string());
        (id, true)
    }

    /// Stamps every recognised line onto the selected day. Later lines overwrite earlier
    /// ones where they overlap. Unrecognised lines are skipped.
    pub fn import_meetings(&mut self, text: &str) -> ImportSummary {
        let (meetings, skipped) = parse_meetings(text);
        let mut summary = ImportSummary {
            skipped,
            matched: meetings.len(),
            ..ImportSummary::default()
        };
        if meetings.is_empty() {
            return summary;
        }

        let (meeting_id, created) = self.ensure_meeting_activity();
        let day = self.selected_day_mut();
        for meeting in &meetings {
            for index in meeting.tiles() {
                if let Some(tile) = day.tile_mut(index) {
                    *tile = Tile::painted(&meeting_id, meeting.title);
                    summary.tiles_written += 1;
                }
            }
        }
        info!(
            matched = summary.matched,
            skipped = summary.skipped,
            tiles = summary.tiles_written,
            "imported meetings"
        );
        summary.activity_id = Some(meeting_id);
        summary.created_activity = created;
        summary
    }
}
