use crate::grid::{current_tile_index, day_key, TILE_MINUTES};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use std::time::Duration;
use tracing::info;

const TILE_MS: u64 = TILE_MINUTES as u64 * 60 * 1000;
/// Lands the wake-up just past the boundary rather than just before it.
const BOUNDARY_SLACK_MS: u64 = 50;

/// Remembers the last observed day and tile so a poller can tell when either moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverWatch {
    last_day: String,
    last_tile: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    None,
    Tile,
    Day,
}

impl RolloverWatch {
    pub fn new(now: NaiveDateTime) -> Self {
        RolloverWatch {
            last_day: day_key(now.date()),
            last_tile: current_tile_index(now.time()),
        }
    }

    pub fn today(&self) -> &str {
        &self.last_day
    }

    pub fn current_tile(&self) -> usize {
        self.last_tile
    }

    pub fn observe(&mut self, now: NaiveDateTime) -> Rollover {
        let day = day_key(now.date());
        let tile = current_tile_index(now.time());
        let change = if day != self.last_day {
            info!(from = %self.last_day, to = %day, "day rollover");
            Rollover::Day
        } else if tile != self.last_tile {
            Rollover::Tile
        } else {
            Rollover::None
        };
        self.last_day = day;
        self.last_tile = tile;
        change
    }
}

/// Time left until the next tile boundary, plus a little slack.
pub fn until_next_tile(now: NaiveTime) -> Duration {
    let since_hour = (u64::from(now.minute()) * 60 + u64::from(now.second())) * 1000
        + u64::from(now.nanosecond() / 1_000_000).min(999);
    Duration::from_millis(TILE_MS - since_hour % TILE_MS + BOUNDARY_SLACK_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn detects_tile_and_day_changes() {
        let mut watch = RolloverWatch::new(at(19, 9, 0, 0));
        assert_eq!(watch.current_tile(), 54);
        assert_eq!(watch.observe(at(19, 9, 9, 59)), Rollover::None);
        assert_eq!(watch.observe(at(19, 9, 10, 0)), Rollover::Tile);
        assert_eq!(watch.observe(at(19, 9, 10, 1)), Rollover::None);
        assert_eq!(watch.observe(at(20, 9, 10, 1)), Rollover::Day);
        assert_eq!(watch.today(), "2026-10-20");
    }

    #[test]
    fn sleeps_until_the_next_boundary() {
        let t = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(until_next_tile(t), Duration::from_millis(600_050));
        let t = NaiveTime::from_hms_milli_opt(9, 19, 59, 500).unwrap();
        assert_eq!(until_next_tile(t), Duration::from_millis(550));
        let t = NaiveTime::from_hms_opt(23, 55, 0).unwrap();
        assert_eq!(until_next_tile(t), Duration::from_millis(300_050));
    }
}
