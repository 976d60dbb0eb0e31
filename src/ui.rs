use crate::models::{ChartBar, Metric, MetricProgress, SummaryResponse};
use crate::settings::{
    POST_GOAL_MAX, REPLY_GOAL_MAX, RETWEET_GOAL_MAX, SettingsResponse, Theme,
};

pub fn render_index(summary: &SummaryResponse, theme: Theme, warning: Option<&str>) -> String {
    let trackers: String = summary.today.iter().map(render_tracker).collect();
    let bars: String = summary.chart.iter().map(render_bar).collect();
    let warning = warning
        .map(|text| format!(r#"<p class="warning">{}</p>"#, escape_html(text)))
        .unwrap_or_default();

    let body = INDEX_BODY
        .replace("{{WARNING}}", &warning)
        .replace("{{TRACKERS}}", &trackers)
        .replace("{{OVERALL}}", &summary.overall_percentage.to_string())
        .replace("{{BARS}}", &bars)
        .replace("{{TOTAL_REPLIES}}", &summary.totals.replies.to_string())
        .replace("{{TOTAL_POSTS}}", &summary.totals.posts.to_string())
        .replace("{{TOTAL_RETWEETS}}", &summary.totals.retweets.to_string())
        .replace("{{CMP_REPLIES}}", &signed(summary.comparison_to_previous_week.replies))
        .replace("{{CMP_POSTS}}", &signed(summary.comparison_to_previous_week.posts))
        .replace("{{CMP_RETWEETS}}", &signed(summary.comparison_to_previous_week.retweets))
        .replace("{{CURRENT_STREAK}}", &summary.current_streak.to_string())
        .replace("{{LONGEST_STREAK}}", &summary.longest_streak.to_string());

    page("Activity Tracker", theme, &body)
}

pub fn render_login(error: Option<&str>) -> String {
    let error = error
        .map(|text| format!(r#"<p class="warning">{}</p>"#, escape_html(text)))
        .unwrap_or_default();
    page("Sign in", Theme::default(), &LOGIN_BODY.replace("{{ERROR}}", &error))
}

pub fn render_settings(settings: &SettingsResponse) -> String {
    let themes: String = Theme::ALL
        .iter()
        .map(|&theme| {
            format!(
                r#"<label class="choice"><input type="radio" name="theme" value="{value}"{checked} /> <strong>{value}</strong> <span>{description}</span></label>"#,
                value = theme.as_str(),
                checked = checked(theme == settings.theme),
                description = theme.description(),
            )
        })
        .collect();

    let platform = if settings.capabilities.floating_window {
        format!(
            r#"<fieldset><legend>Platform</legend><label class="choice"><input type="checkbox" name="floating_window"{} /> Floating window mode</label></fieldset>"#,
            checked(settings.notifications.floating_window)
        )
    } else {
        String::new()
    };

    let body = SETTINGS_BODY
        .replace("{{REPLY_GOAL}}", &settings.goals.reply_goal.to_string())
        .replace("{{POST_GOAL}}", &settings.goals.post_goal.to_string())
        .replace("{{RETWEET_GOAL}}", &settings.goals.retweet_goal.to_string())
        .replace("{{REPLY_MAX}}", &REPLY_GOAL_MAX.to_string())
        .replace("{{POST_MAX}}", &POST_GOAL_MAX.to_string())
        .replace("{{RETWEET_MAX}}", &RETWEET_GOAL_MAX.to_string())
        .replace("{{THEMES}}", &themes)
        .replace("{{NOTIFICATIONS}}", checked(settings.notifications.enabled))
        .replace("{{PLATFORM}}", &platform);

    page("Settings", settings.theme, &body)
}

fn render_tracker(progress: &MetricProgress) -> String {
    let metric = progress.metric;
    let badge = if progress.goal_met {
        r#"<span class="badge">Goal met</span>"#
    } else {
        ""
    };
    let disabled = if progress.count == 0 { " disabled" } else { "" };

    format!(
        r#"<article class="tracker{met}">
  <header><h2>{label}</h2>{badge}</header>
  <p class="count">{count} <small>of {goal}</small></p>
  <div class="meter"><span style="width: {percent:.0}%"></span></div>
  <div class="actions">
    <form method="post" action="/track/{slug}/sub"><button type="submit"{disabled}>-</button></form>
    <form method="post" action="/track/{slug}/add"><button type="submit" class="primary">Add {singular}</button></form>
  </div>
</article>
"#,
        met = if progress.goal_met { " met" } else { "" },
        label = metric.label(),
        count = progress.count,
        goal = progress.goal,
        percent = progress.percentage,
        slug = metric.as_str(),
        singular = singular(metric),
    )
}

fn render_bar(bar: &ChartBar) -> String {
    format!(
        r#"<div class="day{done}">
  <div class="bars">
    <span class="bar replies" style="height: {replies:.0}px"></span>
    <span class="bar posts" style="height: {posts:.0}px"></span>
    <span class="bar retweets" style="height: {retweets:.0}px"></span>
  </div>
  <span class="label">{date}</span>
</div>
"#,
        done = if bar.goals_completed { " done" } else { "" },
        replies = bar.replies_height,
        posts = bar.posts_height,
        retweets = bar.retweets_height,
        date = escape_html(&bar.date),
    )
}

fn page(title: &str, theme: Theme, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", title)
        .replace("{{THEME}}", theme.as_str())
        .replace("{{BODY}}", body)
}

fn singular(metric: Metric) -> &'static str {
    match metric {
        Metric::Replies => "Reply",
        Metric::Posts => "Post",
        Metric::Retweets => "Retweet",
    }
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f6f6f4;
      --ink: #1f2328;
      --muted: #6a6f76;
      --accent: #1d9bf0;
      --done: #22a06b;
      --card: #ffffff;
      --shadow: 0 12px 32px rgba(31, 35, 40, 0.08);
    }

    body.matrix {
      --bg: #020b02;
      --ink: #7dff7d;
      --muted: #3fa33f;
      --accent: #00ff41;
      --done: #b6ff00;
      --card: #061806;
      font-family: "Courier New", monospace;
    }

    body.casio {
      --bg: #c9cdb8;
      --ink: #222418;
      --muted: #5d6150;
      --accent: #3b5b92;
      --done: #8c3b2f;
      --card: #dfe3cd;
      font-family: "Lucida Console", monospace;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Helvetica Neue", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    main {
      width: min(920px, 100%);
      display: grid;
      gap: 24px;
    }

    .top {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .top nav {
      display: flex;
      gap: 12px;
      align-items: center;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 18px;
    }

    .tracker, .card {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    .tracker header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .tracker h2 {
      margin: 0;
      font-size: 1.1rem;
    }

    .tracker.met .count {
      color: var(--done);
    }

    .count {
      font-size: 2.4rem;
      font-weight: 600;
      margin: 12px 0;
    }

    .count small, .muted {
      color: var(--muted);
      font-size: 0.95rem;
    }

    .badge {
      background: var(--done);
      color: var(--card);
      border-radius: 999px;
      padding: 2px 10px;
      font-size: 0.8rem;
    }

    .meter {
      height: 10px;
      background: rgba(128, 128, 128, 0.2);
      border-radius: 999px;
      overflow: hidden;
    }

    .meter span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .actions {
      display: flex;
      gap: 10px;
      margin-top: 16px;
    }

    form {
      margin: 0;
    }

    button {
      border: 1px solid var(--muted);
      background: transparent;
      color: var(--ink);
      border-radius: 10px;
      padding: 8px 14px;
      font: inherit;
      cursor: pointer;
    }

    button.primary {
      background: var(--accent);
      border-color: var(--accent);
      color: var(--card);
    }

    button:disabled {
      opacity: 0.4;
      cursor: not-allowed;
    }

    .chart {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 8px;
      align-items: end;
      min-height: 140px;
    }

    .day {
      display: grid;
      justify-items: center;
      gap: 6px;
    }

    .day.done .label {
      color: var(--done);
      font-weight: 600;
    }

    .bars {
      display: flex;
      gap: 3px;
      align-items: end;
      height: 110px;
    }

    .bar {
      width: 8px;
      border-radius: 4px 4px 0 0;
    }

    .bar.replies { background: var(--accent); }
    .bar.posts { background: var(--done); }
    .bar.retweets { background: var(--muted); }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stats strong {
      display: block;
      font-size: 1.6rem;
    }

    .warning {
      background: #fff4ce;
      color: #5c4400;
      border-radius: 12px;
      padding: 12px 16px;
      margin: 0;
    }

    fieldset {
      border: 1px solid rgba(128, 128, 128, 0.3);
      border-radius: 12px;
      padding: 16px;
      display: grid;
      gap: 10px;
    }

    .choice span {
      color: var(--muted);
    }

    input[type="number"] {
      font: inherit;
      padding: 6px 10px;
      width: 100px;
    }
  </style>
</head>
<body class="{{THEME}}">
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;

const INDEX_BODY: &str = r#"<div class="top">
  <h1>Today</h1>
  <nav>
    <a href="/settings">Settings</a>
    <form method="post" action="/reset"><button type="submit">Reset today</button></form>
    <form method="post" action="/logout"><button type="submit">Log out</button></form>
  </nav>
</div>
{{WARNING}}
<section class="grid">
{{TRACKERS}}
</section>
<section class="card">
  <p>Daily progress: <strong>{{OVERALL}}% Complete</strong></p>
  <div class="meter"><span style="width: {{OVERALL}}%"></span></div>
</section>
<section class="card">
  <h2>This week</h2>
  <div class="chart">
{{BARS}}
  </div>
</section>
<section class="card stats">
  <div><span class="muted">Replies</span><strong>{{TOTAL_REPLIES}}</strong><span class="muted">{{CMP_REPLIES}} vs last week</span></div>
  <div><span class="muted">Posts</span><strong>{{TOTAL_POSTS}}</strong><span class="muted">{{CMP_POSTS}} vs last week</span></div>
  <div><span class="muted">Retweets</span><strong>{{TOTAL_RETWEETS}}</strong><span class="muted">{{CMP_RETWEETS}} vs last week</span></div>
  <div><span class="muted">Current streak</span><strong>{{CURRENT_STREAK}}</strong><span class="muted">days</span></div>
  <div><span class="muted">Longest streak</span><strong>{{LONGEST_STREAK}}</strong><span class="muted">days</span></div>
</section>"#;

const LOGIN_BODY: &str = r#"<section class="card">
  <h1>Activity Tracker</h1>
  <p class="muted">Track your daily engagement habits and build consistency.</p>
  {{ERROR}}
  <form method="post" action="/login"><button type="submit" class="primary">Sign in</button></form>
</section>"#;

const SETTINGS_BODY: &str = r#"<div class="top">
  <h1>Settings</h1>
  <nav><a href="/">Back</a></nav>
</div>
<form method="post" action="/settings" class="card">
  <fieldset>
    <legend>Daily goals</legend>
    <label>Replies <input type="number" name="reply_goal" min="1" max="{{REPLY_MAX}}" value="{{REPLY_GOAL}}" /></label>
    <label>Posts <input type="number" name="post_goal" min="1" max="{{POST_MAX}}" value="{{POST_GOAL}}" /></label>
    <label>Retweets <input type="number" name="retweet_goal" min="1" max="{{RETWEET_MAX}}" value="{{RETWEET_GOAL}}" /></label>
  </fieldset>
  <fieldset>
    <legend>Appearance</legend>
    {{THEMES}}
  </fieldset>
  <fieldset>
    <legend>Notifications</legend>
    <label class="choice"><input type="checkbox" name="notifications"{{NOTIFICATIONS}} /> Receive reminders to complete your daily goals</label>
  </fieldset>
  {{PLATFORM}}
  <div class="actions">
    <button type="submit" name="reset" value="1">Reset to defaults</button>
    <button type="submit" class="primary">Save changes</button>
  </div>
</form>"#;
