use crate::models::{
    ActivityState, ChartBar, DaySnapshot, Metric, MetricProgress, SummaryResponse, WeekComparison,
    WeekTotals, WeeklyAggregate,
};
use chrono::{Datelike, NaiveDate};

const REPLY_BAR_HEIGHT: f64 = 100.0;
const SECONDARY_BAR_HEIGHT: f64 = 50.0;

/// Slot of `date` in the weekly record, Monday = 0 through Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    a.iso_week() == b.iso_week()
}

pub fn sum_days(days: &[DaySnapshot]) -> WeekTotals {
    days.iter().fold(WeekTotals::default(), |acc, day| WeekTotals {
        replies: acc.replies.saturating_add(day.replies),
        posts: acc.posts.saturating_add(day.posts),
        retweets: acc.retweets.saturating_add(day.retweets),
    })
}

/// Recomputes the weekly totals and the comparison against the previous week.
pub fn refresh_totals(weekly: &mut WeeklyAggregate) {
    let totals = sum_days(&weekly.days);
    weekly.total_replies = totals.replies;
    weekly.total_posts = totals.posts;
    weekly.total_retweets = totals.retweets;
    weekly.comparison_to_previous_week = match weekly.previous_week {
        Some(previous) => WeekComparison {
            replies: delta(totals.replies, previous.replies),
            posts: delta(totals.posts, previous.posts),
            retweets: delta(totals.retweets, previous.retweets),
        },
        None => WeekComparison::default(),
    };
}

/// Recomputes the streak counters for the week, as seen from `today_index`.
///
/// The current streak ends at today when today's goals are met, otherwise at
/// yesterday, so an unfinished day does not break a running streak.
pub fn refresh_streaks(weekly: &mut WeeklyAggregate, today_index: usize) {
    let today_index = today_index.min(weekly.days.len() - 1);
    let end = if weekly.days[today_index].goals_completed {
        Some(today_index)
    } else {
        today_index.checked_sub(1)
    };

    let current = end.map_or(0, |end| {
        weekly.days[..=end]
            .iter()
            .rev()
            .take_while(|day| day.goals_completed)
            .count() as u32
    });

    let mut longest_run = 0u32;
    let mut run = 0u32;
    for day in &weekly.days {
        if day.goals_completed {
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }

    weekly.current_streak = current;
    weekly.longest_streak = weekly.longest_streak.max(longest_run).max(current);
}

/// Progress towards a goal, capped at 100.
pub fn percentage(count: u64, goal: u32) -> f64 {
    let goal = f64::from(goal.max(1));
    (count as f64 / goal * 100.0).min(100.0)
}

pub fn goal_met(count: u64, goal: u32) -> bool {
    count >= u64::from(goal)
}

pub fn build_summary(state: &ActivityState) -> SummaryResponse {
    let today: Vec<MetricProgress> = Metric::ALL
        .iter()
        .map(|&metric| {
            let count = state.today.get(metric);
            let goal = state.goals.get(metric);
            MetricProgress {
                metric,
                count,
                goal,
                percentage: percentage(count, goal),
                goal_met: goal_met(count, goal),
            }
        })
        .collect();

    let overall = today.iter().map(|progress| progress.percentage).sum::<f64>() / today.len() as f64;

    SummaryResponse {
        overall_percentage: overall.round() as u32,
        today,
        chart: build_chart(&state.weekly),
        current_streak: state.weekly.current_streak,
        longest_streak: state.weekly.longest_streak,
        totals: state.weekly.totals(),
        comparison_to_previous_week: state.weekly.comparison_to_previous_week,
    }
}

pub fn build_chart(weekly: &WeeklyAggregate) -> Vec<ChartBar> {
    let max_of = |metric: Metric| {
        weekly
            .days
            .iter()
            .map(|day| day.counters().get(metric))
            .max()
            .unwrap_or(0)
    };
    let max_replies = max_of(Metric::Replies);
    let max_posts = max_of(Metric::Posts);
    let max_retweets = max_of(Metric::Retweets);

    weekly
        .days
        .iter()
        .map(|day| ChartBar {
            date: day.date.clone(),
            replies_height: scaled(day.replies, max_replies, REPLY_BAR_HEIGHT),
            posts_height: scaled(day.posts, max_posts, SECONDARY_BAR_HEIGHT),
            retweets_height: scaled(day.retweets, max_retweets, SECONDARY_BAR_HEIGHT),
            goals_completed: day.goals_completed,
        })
        .collect()
}

fn scaled(value: u64, max: u64, height: f64) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64 * height
    }
}

fn delta(current: u64, previous: u64) -> i64 {
    let diff = i128::from(current) - i128::from(previous);
    diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
