use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daytiles", version, about = "Paint your day in 10-minute tiles")]
pub struct Cli {
    /// Use this state file instead of the project or global one
    #[arg(long, global = true, env = "DAYTILES_STATE")]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Clone)]
pub struct DayArg {
    /// Day to operate on (YYYY-MM-DD, defaults to the selected day)
    #[arg(long)]
    pub day: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project-local state file in the current directory
    Init,
    /// Print the tiles of a day
    Show {
        #[command(flatten)]
        day: DayArg,
    },
    /// List days up to today, newest first
    Days,
    /// Paint an activity over a time range
    Paint {
        /// Activity id or name
        activity: String,
        /// Range start (HH:MM)
        from: String,
        /// Range end (HH:MM, exclusive)
        to: String,
        #[command(flatten)]
        day: DayArg,
    },
    /// Clear activity and comment over a time range
    Erase {
        /// Range start (HH:MM)
        from: String,
        /// Range end (HH:MM, exclusive)
        to: String,
        #[command(flatten)]
        day: DayArg,
    },
    /// Set the comment of the tile containing a time
    Comment {
        /// Time inside the tile (HH:MM)
        at: String,
        /// Comment text (empty clears it)
        text: String,
        #[command(flatten)]
        day: DayArg,
    },
    /// Import meetings from `HH:MM-HH:MM Title` lines
    Import {
        /// Read lines from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        day: DayArg,
    },
    /// Manage activities
    #[command(subcommand)]
    Activity(ActivityCommand),
    /// Manage groups
    #[command(subcommand)]
    Group(GroupCommand),
    /// Flip a display setting
    Toggle {
        #[arg(value_enum)]
        setting: SettingArg,
    },
    /// Launch the interactive TUI
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum ActivityCommand {
    /// List activities by group
    List,
    /// Add an activity
    Add {
        /// Name of the activity
        #[arg(long)]
        name: Option<String>,
        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,
        /// Group id or name
        #[arg(long)]
        group: Option<String>,
    },
    /// Delete an activity and unpaint it everywhere
    Rm {
        /// Activity id or name
        activity: String,
    },
    /// Rename an activity
    Rename {
        /// Activity id or name
        activity: String,
        /// New name
        name: String,
    },
    /// Change the color of an activity
    Recolor {
        /// Activity id or name
        activity: String,
        /// Color as #rrggbb
        color: String,
    },
    /// Move an activity to a group and/or next to another activity
    Mv {
        /// Activity id or name
        activity: String,
        /// Destination group id or name (ungrouped when omitted)
        #[arg(long)]
        group: Option<String>,
        /// Place right before this activity
        #[arg(long, conflicts_with = "after")]
        before: Option<String>,
        /// Place right after this activity
        #[arg(long)]
        after: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Add a group
    Add {
        /// Name of the group
        #[arg(long)]
        name: Option<String>,
        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a group; its activities become ungrouped
    Rm {
        /// Group id or name
        group: String,
    },
    /// Rename a group
    Rename {
        /// Group id or name
        group: String,
        /// New name
        name: String,
    },
    /// Change the color of a group
    Recolor {
        /// Group id or name
        group: String,
        /// Color as #rrggbb
        color: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SettingArg {
    TimeLabels,
    DarkMode,
    DimPast,
    ActivityLabels,
    ConnectTiles,
}
