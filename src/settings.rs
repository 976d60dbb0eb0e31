//! User preferences and sanitizing of settings-form input.

use crate::models::Goals;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const REPLY_GOAL_MAX: u32 = 100;
pub const POST_GOAL_MAX: u32 = 50;
pub const RETWEET_GOAL_MAX: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Matrix,
    Casio,
    #[default]
    Minimal,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Matrix, Theme::Casio, Theme::Minimal];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Matrix => "matrix",
            Theme::Casio => "casio",
            Theme::Minimal => "minimal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Theme::Matrix => "Dark theme with green accents",
            Theme::Casio => "Retro calculator style",
            Theme::Minimal => "Clean, simple interface",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "matrix" => Ok(Theme::Matrix),
            "casio" => Ok(Theme::Casio),
            "minimal" => Ok(Theme::Minimal),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    pub floating_window: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            floating_window: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Preferences {
    pub theme: Theme,
    pub notifications: NotificationSettings,
}

/// Features the host platform offers, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub floating_window: bool,
}

/// Everything the settings form saves in one go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub goals: Goals,
    pub theme: Theme,
    pub notifications: NotificationSettings,
}

/// Raw settings form fields as submitted by the browser.
#[derive(Debug, Deserialize, Default)]
pub struct SettingsForm {
    #[serde(default)]
    pub reply_goal: String,
    #[serde(default)]
    pub post_goal: String,
    #[serde(default)]
    pub retweet_goal: String,
    #[serde(default)]
    pub theme: String,
    pub notifications: Option<String>,
    pub floating_window: Option<String>,
    pub reset: Option<String>,
}

impl SettingsForm {
    /// Turns submitted fields into a valid update. Checkboxes are present
    /// only when ticked.
    pub fn into_update(self) -> SettingsUpdate {
        if self.reset.is_some() {
            return SettingsUpdate::default();
        }

        SettingsUpdate {
            goals: Goals {
                reply_goal: sanitize_goal(&self.reply_goal, REPLY_GOAL_MAX),
                post_goal: sanitize_goal(&self.post_goal, POST_GOAL_MAX),
                retweet_goal: sanitize_goal(&self.retweet_goal, RETWEET_GOAL_MAX),
            },
            theme: self.theme.parse().unwrap_or_default(),
            notifications: NotificationSettings {
                enabled: self.notifications.is_some(),
                floating_window: self.floating_window.is_some(),
            },
        }
    }
}

/// Parses a goal entry. Anything non-numeric or below 1 becomes 1; values
/// above `max` are clamped.
pub fn sanitize_goal(raw: &str, max: u32) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(value) => value.clamp(1, i64::from(max)) as u32,
        Err(_) => 1,
    }
}

/// Caps typed goals at the form maximums. Zero is left for the manager to reject.
pub fn cap_goals(goals: Goals) -> Goals {
    Goals {
        reply_goal: goals.reply_goal.min(REPLY_GOAL_MAX),
        post_goal: goals.post_goal.min(POST_GOAL_MAX),
        retweet_goal: goals.retweet_goal.min(RETWEET_GOAL_MAX),
    }
}

/// Settings as reported to the settings view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub goals: Goals,
    pub theme: Theme,
    pub notifications: NotificationSettings,
    pub capabilities: Capabilities,
}
