//! Command palette and menu registration for the host UI.
//!
//! The repair commands are wired into the host's command palette by name;
//! the host owns dispatch, rendering, and the keyboard handling itself.

use serde::{Deserialize, Serialize};

/// Handle for a submenu created via [`CommandPalette::insert_submenu`].
pub type MenuId = u32;

/// Title of the submenu the repair commands live under.
pub const FIX_MENU_TITLE: &str = "Fix";

/// The operator commands exposed by the repair engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Flag the current selection as the trouble candidate pool
    LoadTroubleTrajectories,
    /// Resolve the selected trajectory against the pool and merge
    FixTroubleTrajectory,
    /// Clear the candidate pool
    UnloadTroubleTrajectories,
}

impl Command {
    /// Stable registration name used in the host's command palette.
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoadTroubleTrajectories => "load_trouble_trajectories",
            Command::FixTroubleTrajectory => "fix_trouble_trajectory",
            Command::UnloadTroubleTrajectories => "unload_trouble_trajectories",
        }
    }

    /// Human-readable menu label.
    pub fn menu_label(&self) -> &'static str {
        match self {
            Command::LoadTroubleTrajectories => "Load trouble trajectories",
            Command::FixTroubleTrajectory => "Fix selected trajectory",
            Command::UnloadTroubleTrajectories => "Unload trouble trajectories",
        }
    }

    /// Returns all commands in menu order.
    pub fn all() -> [Command; 3] {
        [
            Command::LoadTroubleTrajectories,
            Command::UnloadTroubleTrajectories,
            Command::FixTroubleTrajectory,
        ]
    }
}

/// A keyboard accelerator binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accelerator {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: char,
}

/// Registration surface of the host's command palette.
pub trait CommandPalette {
    /// Registers a named command.
    fn add_command(&mut self, name: &str, command: Command);

    /// Inserts a new top-level submenu and returns its handle.
    fn insert_submenu(&mut self, title: &str) -> MenuId;

    /// Adds an item to a submenu, bound to a registered command name.
    fn add_menu_item(&mut self, menu: MenuId, label: &str, command_name: &str);

    /// Binds a keyboard accelerator to a registered command name.
    fn set_accelerator(&mut self, accelerator: Accelerator, command_name: &str);
}

/// Wires the repair commands into the host palette: a "Fix" submenu with one
/// item per command, plus Ctrl+Shift+X for the fix command itself.
pub fn register_menu<P: CommandPalette>(palette: &mut P) {
    for command in Command::all() {
        palette.add_command(command.name(), command);
    }

    let menu = palette.insert_submenu(FIX_MENU_TITLE);
    for command in Command::all() {
        palette.add_menu_item(menu, command.menu_label(), command.name());
    }

    palette.set_accelerator(
        Accelerator {
            ctrl: true,
            alt: false,
            shift: true,
            key: 'x',
        },
        Command::FixTroubleTrajectory.name(),
    );
}
