//! Mobile navigation menu state.

use serde::{Deserialize, Serialize};

/// Whether the navigation menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationState {
    #[default]
    Closed,
    Open,
}

/// Shopper interactions with the navigation menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationCommand {
    /// The menu button was pressed.
    Open,
    /// The close button was pressed.
    Close,
    /// A link inside the menu was followed; the menu closes behind it.
    FollowLink,
}

impl NavigationState {
    /// Returns the state after handling `command`. Every command is idempotent.
    pub fn handle(self, command: NavigationCommand) -> Self {
        match command {
            NavigationCommand::Open => NavigationState::Open,
            NavigationCommand::Close | NavigationCommand::FollowLink => NavigationState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, NavigationState::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationState::Closed => "closed",
            NavigationState::Open => "open",
        }
    }
}

impl std::fmt::Display for NavigationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NavigationCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(NavigationCommand::Open),
            "close" => Ok(NavigationCommand::Close),
            "follow-link" => Ok(NavigationCommand::FollowLink),
            other => Err(format!("unknown navigation action: {other}")),
        }
    }
}
