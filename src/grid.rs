use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

pub const TOTAL_TILES: usize = 144;
pub const TILE_MINUTES: u32 = 10;
pub const GRID_COLUMNS: usize = 12;

const MINUTES_PER_DAY: u32 = 24 * 60;
const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid time (use HH:MM): {0}")]
    InvalidTime(String),
    #[error("invalid day (use YYYY-MM-DD): {0}")]
    InvalidDayKey(String),
}

/// How a clock time that falls inside a tile is mapped to a tile boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// The tile containing the time. Used for range starts.
    Floor,
    /// The first tile boundary at or after the time. Used for range ends.
    Ceil,
}

pub fn tile_index_of_clock_time(hour: u32, minute: u32) -> usize {
    ((hour * 60 + minute) / TILE_MINUTES) as usize
}

pub fn current_tile_index(time: NaiveTime) -> usize {
    tile_index_of_clock_time(time.hour(), time.minute())
}

/// Start and end clock labels of a tile, wrapping at midnight.
pub fn tile_range(index: usize) -> (String, String) {
    let start = index as u32 * TILE_MINUTES;
    (minutes_to_clock(start), minutes_to_clock(start + TILE_MINUTES))
}

pub fn tile_range_label(index: usize) -> String {
    let (start, end) = tile_range(index);
    format!("{}-{}", start, end)
}

pub fn minutes_to_clock(total_minutes: u32) -> String {
    let normalized = total_minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", normalized / 60, normalized % 60)
}

/// Parses a strict `HH:MM` string into minutes past midnight.
///
/// Only the shape is checked: `25:70` parses to 1570 minutes and the caller decides
/// what an out-of-day index means.
pub fn parse_clock(text: &str) -> Result<u32, GridError> {
    let invalid = || GridError::InvalidTime(text.to_string());
    let (hours, minutes) = text.split_once(':').ok_or_else(invalid)?;
    if !is_two_digits(hours) || !is_two_digits(minutes) {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    Ok(hours * 60 + minutes)
}

pub fn time_to_tile(text: &str, rounding: Rounding) -> Result<usize, GridError> {
    let minutes = parse_clock(text)?;
    let index = match rounding {
        Rounding::Floor => minutes / TILE_MINUTES,
        Rounding::Ceil => minutes.div_ceil(TILE_MINUTES),
    };
    Ok(index as usize)
}

pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate, GridError> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
        .map_err(|_| GridError::InvalidDayKey(key.to_string()))
}

/// Short Russian label for a day key, e.g. `пн, 19 окт.`. Falls back to the key itself.
pub fn format_day(key: &str) -> String {
    let Ok(date) = parse_day_key(key) else {
        return key.to_string();
    };
    let weekday = match date.weekday() {
        Weekday::Mon => "пн",
        Weekday::Tue => "вт",
        Weekday::Wed => "ср",
        Weekday::Thu => "чт",
        Weekday::Fri => "пт",
        Weekday::Sat => "сб",
        Weekday::Sun => "вс",
    };
    const MONTHS: [&str; 12] = [
        "янв.", "февр.", "мар.", "апр.", "мая", "июн.", "июл.", "авг.", "сент.",
        "окт.", "нояб.", "дек.",
    ];
    format!("{}, {} {}", weekday, date.day(), MONTHS[date.month0() as usize])
}

pub fn row_col(index: usize) -> (usize, usize) {
    (index / GRID_COLUMNS, index % GRID_COLUMNS)
}

fn is_two_digits(part: &str) -> bool {
    part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit())
}
