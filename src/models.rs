use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One of the three tracked engagement counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Replies,
    Posts,
    Retweets,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Replies, Metric::Posts, Metric::Retweets];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Replies => "replies",
            Metric::Posts => "posts",
            Metric::Retweets => "retweets",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Replies => "Replies",
            Metric::Posts => "Posts",
            Metric::Retweets => "Retweets",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "replies" | "reply" => Ok(Metric::Replies),
            "posts" | "post" => Ok(Metric::Posts),
            "retweets" | "retweet" => Ok(Metric::Retweets),
            other => Err(format!("unknown metric '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngagementCounters {
    pub replies: u64,
    pub posts: u64,
    pub retweets: u64,
}

impl EngagementCounters {
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Replies => self.replies,
            Metric::Posts => self.posts,
            Metric::Retweets => self.retweets,
        }
    }

    pub fn set(&mut self, metric: Metric, count: u64) {
        match metric {
            Metric::Replies => self.replies = count,
            Metric::Posts => self.posts = count,
            Metric::Retweets => self.retweets = count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub reply_goal: u32,
    pub post_goal: u32,
    pub retweet_goal: u32,
}

impl Goals {
    pub fn get(&self, metric: Metric) -> u32 {
        match metric {
            Metric::Replies => self.reply_goal,
            Metric::Posts => self.post_goal,
            Metric::Retweets => self.retweet_goal,
        }
    }

    /// True when every counter has reached its goal.
    pub fn met_by(&self, counters: &EngagementCounters) -> bool {
        Metric::ALL
            .iter()
            .all(|&metric| counters.get(metric) >= u64::from(self.get(metric)))
    }
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            reply_goal: 10,
            post_goal: 3,
            retweet_goal: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySnapshot {
    pub date: String,
    pub replies: u64,
    pub posts: u64,
    pub retweets: u64,
    pub goals_completed: bool,
}

impl DaySnapshot {
    pub fn empty(label: &str) -> Self {
        Self {
            date: label.to_string(),
            replies: 0,
            posts: 0,
            retweets: 0,
            goals_completed: false,
        }
    }

    pub fn counters(&self) -> EngagementCounters {
        EngagementCounters {
            replies: self.replies,
            posts: self.posts,
            retweets: self.retweets,
        }
    }

    pub fn set(&mut self, metric: Metric, count: u64) {
        match metric {
            Metric::Replies => self.replies = count,
            Metric::Posts => self.posts = count,
            Metric::Retweets => self.retweets = count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeekTotals {
    pub replies: u64,
    pub posts: u64,
    pub retweets: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WeekComparison {
    pub replies: i64,
    pub posts: i64,
    pub retweets: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAggregate {
    pub days: [DaySnapshot; 7],
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_replies: u64,
    pub total_posts: u64,
    pub total_retweets: u64,
    pub comparison_to_previous_week: WeekComparison,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_week: Option<WeekTotals>,
}

impl WeeklyAggregate {
    pub fn totals(&self) -> WeekTotals {
        WeekTotals {
            replies: self.total_replies,
            posts: self.total_posts,
            retweets: self.total_retweets,
        }
    }

    pub fn total(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Replies => self.total_replies,
            Metric::Posts => self.total_posts,
            Metric::Retweets => self.total_retweets,
        }
    }
}

impl Default for WeeklyAggregate {
    fn default() -> Self {
        Self {
            days: WEEKDAY_LABELS.map(DaySnapshot::empty),
            current_streak: 0,
            longest_streak: 0,
            total_replies: 0,
            total_posts: 0,
            total_retweets: 0,
            comparison_to_previous_week: WeekComparison::default(),
            previous_week: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityState {
    pub today: EngagementCounters,
    pub goals: Goals,
    pub last_updated: DateTime<Local>,
    pub weekly: WeeklyAggregate,
}

impl ActivityState {
    pub fn new_at(now: DateTime<Local>) -> Self {
        Self {
            today: EngagementCounters::default(),
            goals: Goals::default(),
            last_updated: now,
            weekly: WeeklyAggregate::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CountRequest {
    pub count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsRequest {
    pub reply_goal: u32,
    pub post_goal: u32,
    pub retweet_goal: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub logged_in: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub logged_in: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub state: ActivityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricProgress {
    pub metric: Metric,
    pub count: u64,
    pub goal: u32,
    pub percentage: f64,
    pub goal_met: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub date: String,
    pub replies_height: f64,
    pub posts_height: f64,
    pub retweets_height: f64,
    pub goals_completed: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub today: Vec<MetricProgress>,
    pub overall_percentage: u32,
    pub chart: Vec<ChartBar>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub totals: WeekTotals,
    pub comparison_to_previous_week: WeekComparison,
}
