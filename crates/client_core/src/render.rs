//! Pure text renderers for the view model. Nothing here performs I/O; hosts
//! decide where the text goes.

use std::{collections::BTreeMap, fmt::Write as _};

use shared::{
    domain::ExerciseKind,
    metrics::{estimate_one_rep_max, format_number, format_pace, OneRepMaxFormula},
    protocol::{
        display_date, CardioInsight, CardioProgressPoint, Goal, GoalType, Insight, IntensityPoint,
        PersonalRecord, SessionDetail, SessionEntry, StrengthInsight, StrengthTrend, TrendSeries,
    },
};

use crate::view::{Region, RegionPayload, RegionState, ViewModel};

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn render_view(view: &ViewModel) -> String {
    let mut out = String::new();
    if let Some(notice) = view.notice() {
        let _ = writeln!(out, "! {}", notice.message());
    }
    if let Some(selection) = view.selection() {
        let _ = writeln!(out, "== {selection} ==");
    }
    for (region, state) in view.regions() {
        let body = render_region(region, state, view.kind());
        if body.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n[{}]", region.title());
        out.push_str(&body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

pub fn render_region(region: Region, state: &RegionState, kind: ExerciseKind) -> String {
    match state {
        RegionState::Idle => String::new(),
        RegionState::Loading { .. } => match region {
            Region::Insight => format!("Analyzing your {kind} sessions..."),
            other => format!("Loading {}...", other.label()),
        },
        RegionState::Errored { .. } => format!("Error loading {}.", region.label()),
        RegionState::Rendered { payload, .. } => render_payload(payload),
    }
}

pub fn render_payload(payload: &RegionPayload) -> String {
    match payload {
        RegionPayload::Trend(trend) => render_trend(trend),
        RegionPayload::PersonalRecords(records) => render_personal_records(records),
        RegionPayload::Sessions(sessions) => render_sessions(sessions),
        RegionPayload::Insight(insight) => render_insight(insight),
        RegionPayload::Goals(goals) => render_goals(goals),
    }
}

pub fn render_trend(trend: &TrendSeries) -> String {
    if trend.is_empty() {
        return "No trend data available.".to_string();
    }
    match trend {
        TrendSeries::Strength(strength) => render_strength_trend(strength),
        TrendSeries::Cardio(points) => render_cardio_trend(points),
    }
}

fn render_strength_trend(trend: &StrengthTrend) -> String {
    let mut out = String::new();
    if !trend.one_rep_max.is_empty() {
        out.push_str("Estimated 1RM (lbs):\n");
        for point in &trend.one_rep_max {
            let _ = writeln!(
                out,
                "  {}: {}",
                display_date(&point.date),
                format_number(point.estimated_1rm)
            );
        }
    }
    if !trend.volume.is_empty() {
        out.push_str("Volume (lbs):\n");
        for point in &trend.volume {
            let _ = writeln!(
                out,
                "  {}: {}",
                display_date(&point.date),
                format_number(point.volume)
            );
        }
    }
    if !trend.intensity.is_empty() {
        out.push_str("Relative Intensity (%1RM):\n");
        for (label, point) in intensity_labels(&trend.intensity)
            .into_iter()
            .zip(&trend.intensity)
        {
            let zone = point
                .zone
                .as_deref()
                .map(|zone| format!(" [{zone}]"))
                .unwrap_or_default();
            let set = match (point.reps, point.weight) {
                (Some(reps), Some(weight)) => {
                    format!(" ({reps} reps @ {} lbs)", format_number(weight))
                }
                _ => String::new(),
            };
            let _ = writeln!(
                out,
                "  {label}: {}%{zone}{set}",
                format_number(point.relative_intensity)
            );
        }
    }
    out
}

/// A set #1 starts a new session; dates with several sessions get a
/// `(Session n)` suffix.
pub fn intensity_labels(points: &[IntensityPoint]) -> Vec<String> {
    let mut sessions_per_date: BTreeMap<&str, u32> = BTreeMap::new();
    points
        .iter()
        .map(|point| {
            if point.set_number == 1 {
                *sessions_per_date.entry(point.date.as_str()).or_insert(0) += 1;
            }
            let count = sessions_per_date
                .get(point.date.as_str())
                .copied()
                .unwrap_or(1);
            let suffix = if count > 1 {
                format!(" (Session {count})")
            } else {
                String::new()
            };
            format!(
                "{} Set #{}{suffix}",
                display_date(&point.date),
                point.set_number
            )
        })
        .collect()
}

fn render_cardio_trend(points: &[CardioProgressPoint]) -> String {
    let mut out = String::from("Distance / Duration / Pace:\n");
    for point in points {
        let distance = point
            .distance
            .map(|d| format!("{} mi", format_number(d)))
            .unwrap_or_else(|| "-".into());
        let duration = point
            .duration
            .map(|d| format!("{} min", format_number(d)))
            .unwrap_or_else(|| "-".into());
        let pace = point
            .pace()
            .map(|p| format!("{} min/mi", format_pace(p)))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "  {}: {distance}, {duration}, {pace}",
            display_date(&point.date)
        );
    }
    out
}

fn record_value(record: &PersonalRecord) -> String {
    match record.units.as_deref() {
        Some("min/mi") if record.field == "pace" => {
            format!("{} min/mi", format_pace(record.value))
        }
        Some(units) => format!("{} {units}", format_number(record.value)),
        None => format_number(record.value),
    }
}

pub fn render_personal_records(records: &[PersonalRecord]) -> String {
    let mut out = String::new();
    let latest: Vec<&PersonalRecord> = records.iter().filter(|pr| pr.is_latest).collect();
    if latest.is_empty() {
        out.push_str("No records found.\n");
    } else {
        for record in latest {
            let _ = writeln!(
                out,
                "* {}: {} (Set on {})",
                record.field.to_uppercase(),
                record_value(record),
                display_date(&record.datetime)
            );
        }
    }

    let mut by_field: BTreeMap<&str, Vec<&PersonalRecord>> = BTreeMap::new();
    for record in records.iter().filter(|pr| pr.value.is_finite()) {
        by_field.entry(record.field.as_str()).or_default().push(record);
    }
    for (field, mut history) in by_field {
        history.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        let units = history[0].units.as_deref().unwrap_or("Value");
        let entries: Vec<String> = history
            .iter()
            .map(|pr| format!("{} {}", display_date(&pr.datetime), format_number(pr.value)))
            .collect();
        let _ = writeln!(out, "  {field} history ({units}): {}", entries.join(", "));
    }
    out
}

fn entry_details(entry: &SessionEntry) -> String {
    match entry.entry_type.as_str() {
        "strength" if entry.sets.is_empty() => "No set data".to_string(),
        "strength" => entry
            .sets
            .iter()
            .map(|set| {
                let reps = set
                    .reps
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".into());
                let weight = set
                    .weight
                    .map(format_number)
                    .unwrap_or_else(|| "-".into());
                let estimate = match (set.reps, set.weight) {
                    (Some(reps), Some(weight)) => {
                        estimate_one_rep_max(reps, weight, OneRepMaxFormula::Epley)
                            .map(|e| format!(" (est. 1RM {})", format_number(e)))
                            .unwrap_or_default()
                    }
                    _ => String::new(),
                };
                format!("Set {}: {reps} reps @ {weight} lbs{estimate}", set.set_number)
            })
            .collect::<Vec<_>>()
            .join("; "),
        "cardio" => {
            let distance = entry
                .distance
                .map(format_number)
                .unwrap_or_else(|| "-".into());
            let duration = entry
                .duration
                .map(format_number)
                .unwrap_or_else(|| "-".into());
            let pace = entry
                .pace
                .or_else(|| {
                    shared::metrics::pace_minutes_per_mile(entry.distance?, entry.duration?)
                })
                .map(|p| format!(" ({} min/mi)", format_pace(p)))
                .unwrap_or_default();
            format!("{distance} mi in {duration} min{pace}")
        }
        _ => String::new(),
    }
}

pub fn render_sessions(sessions: &[SessionDetail]) -> String {
    if sessions.iter().all(|session| session.entries.is_empty()) {
        return "No session data available.".to_string();
    }
    let mut out = String::from("Date | Exercise | Type | Details | Notes\n");
    for session in sessions {
        let date = display_date(&session.date);
        for entry in &session.entries {
            let notes = entry
                .notes
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or("-");
            let _ = writeln!(
                out,
                "{date} | {} | {} | {} | {notes}",
                entry.exercise,
                entry.entry_type,
                entry_details(entry)
            );
        }
    }
    out
}

pub fn render_insight(insight: &Insight) -> String {
    match insight {
        Insight::Strength(_) if !insight.is_available() => {
            "AI insights not available for this exercise.".to_string()
        }
        Insight::Cardio(_) if !insight.is_available() => {
            "AI insights not available for this cardio exercise.".to_string()
        }
        Insight::Strength(strength) => render_strength_insight(strength),
        Insight::Cardio(cardio) => render_cardio_insight(cardio),
    }
}

fn render_strength_insight(insight: &StrengthInsight) -> String {
    let mut out = String::from("Suggested Progression Scheme\nTry aiming for the following:\n");
    for set in &insight.recommended_sets {
        let weight = set
            .weight
            .map(|w| format!(", Weight: {} lbs", format_number(w)))
            .unwrap_or_default();
        let _ = writeln!(out, "  Set {}: Reps: {}{weight}", set.set_number, set.reps);
    }
    if let Some(rationale) = &insight.rationale {
        let _ = writeln!(out, "Why this scheme? {rationale}");
    }
    out
}

fn render_cardio_insight(insight: &CardioInsight) -> String {
    let mut out = String::from(
        "Suggested Improvements\n\
         Here's how you can progress in your next sessions, one step at a time:\n",
    );
    for rec in &insight.recommendations {
        let session = &rec.recommended_session;
        let pill = match rec.improved_metric.as_str() {
            "distance" => session
                .distance_miles
                .map(|d| format!("Distance: {d:.2} miles")),
            "duration" => session
                .duration_minutes
                .map(|d| format!("Duration: {} min", format_number(d))),
            "pace" => session
                .target_pace_min_per_mile
                .map(|p| format!("Target Pace: {} min/mile", format_number(p))),
            _ => None,
        };
        match pill {
            Some(pill) => {
                let _ = writeln!(out, "  {pill}");
            }
            None => {
                let _ = writeln!(out, "  {}", rec.improved_metric);
            }
        }
        let _ = writeln!(out, "    {}", rec.rationale);
    }
    out
}

pub fn render_goals(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return "No active goals for this exercise.".to_string();
    }
    goals
        .iter()
        .map(render_goal_card)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_goal_card(goal: &Goal) -> String {
    let mut out = String::new();
    let status = if goal.is_complete {
        "complete"
    } else if goal.is_expired {
        "expired"
    } else {
        "active"
    };
    let _ = writeln!(out, "{} [{status}]", goal.name);

    let subject = goal
        .exercise_name
        .as_deref()
        .or(goal.exercise_type.as_deref())
        .unwrap_or("general");
    let kind = match goal.goal_type {
        GoalType::SingleSession => "Single Session Goal",
        GoalType::Aggregate => "Aggregate Goal",
    };
    let _ = writeln!(out, "  {subject} - {kind}");

    for progress in goal.metric_progress() {
        let metric = progress.metric;
        let units = metric.units();
        let label = metric.as_str().to_uppercase();
        let achieved = format_number(progress.achieved);
        let target = format_number(progress.target);
        if goal.uses_checkbox(metric) {
            let mark = if progress.is_complete() { "x" } else { " " };
            let detail = if metric == shared::protocol::Metric::Pace {
                format!("{target} {units}")
            } else {
                format!("{achieved} / {target} {units}")
            };
            let _ = writeln!(out, "  [{mark}] {label}: {detail}");
        } else {
            let percent = progress.percent();
            let filled = ((percent / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(PROGRESS_BAR_WIDTH - filled)
            );
            let _ = writeln!(
                out,
                "  {label} {achieved} / {target} {units} [{bar}] {percent:.0}%"
            );
        }
    }

    let _ = writeln!(
        out,
        "  From {} to {}",
        goal.start_date,
        goal.end_date.as_deref().unwrap_or("ongoing")
    );
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
