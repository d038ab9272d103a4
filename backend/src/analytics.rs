// backend/src/analytics.rs
//
// Flow metrics over issue status histories:
//  - lead time:  created -> first arrival in a done status
//  - cycle time: first arrival in an in-progress status -> next arrival in done
//  - throughput: done arrivals per ISO week
//  - WIP:        issues in progress at the end of each day
//  - CFD:        issues per workflow status at the end of each day
//
// "In progress" and "done" come from the workflow's start/end markers; statuses
// the workflow does not know are ignored.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use cycletime_shared::workflow::Workflow;
use cycletime_shared::{
    CfdPoint, CfdSeries, DurationSeries, ThroughputPoint, ThroughputSeries, WipPoint, WipSeries,
    WorkflowState,
};
use std::collections::BTreeMap;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub at: DateTime<Utc>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueHistory {
    pub key: String,
    pub created: DateTime<Utc>,
    /// Status the issue was created in.
    pub initial_status: String,
    /// Ascending by `at`.
    pub transitions: Vec<StatusTransition>,
}

impl IssueHistory {
    /// Status at instant `t`; `None` before the issue existed.
    pub fn status_at(&self, t: DateTime<Utc>) -> Option<&str> {
        if t < self.created {
            return None;
        }
        let status = self
            .transitions
            .iter()
            .take_while(|tr| tr.at <= t)
            .last()
            .map(|tr| tr.to.as_str())
            .unwrap_or(self.initial_status.as_str());
        Some(status)
    }

    /// Every (instant, status) the issue entered, starting with its creation.
    fn entries(&self) -> impl Iterator<Item = (DateTime<Utc>, &str)> {
        std::iter::once((self.created, self.initial_status.as_str()))
            .chain(self.transitions.iter().map(|t| (t.at, t.to.as_str())))
    }

    pub fn done_at(&self, wf: &Workflow<'_>) -> Option<DateTime<Utc>> {
        self.entries()
            .find(|(_, status)| wf.is_done(status))
            .map(|(at, _)| at)
    }

    pub fn started_at(&self, wf: &Workflow<'_>) -> Option<DateTime<Utc>> {
        self.entries()
            .find(|(_, status)| wf.is_in_progress(status))
            .map(|(at, _)| at)
    }
}

/// Inclusive day range the metrics are reported over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` days ending at `end`, inclusive.
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let start = end
            .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
            .unwrap_or(end);
        Self { start, end }
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start && d <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

fn end_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
        .and_utc()
}

fn week_start(d: NaiveDate) -> NaiveDate {
    let back = u64::from(d.weekday().num_days_from_monday());
    d.checked_sub_days(Days::new(back)).unwrap_or(d)
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let days = (to - from).num_seconds().max(0) as f64 / SECONDS_PER_DAY;
    (days * 100.0).round() / 100.0
}

pub fn lead_time(issues: &[IssueHistory], workflow: &[WorkflowState], range: DateRange) -> DurationSeries {
    let wf = Workflow::new(workflow);
    let data = issues
        .iter()
        .filter_map(|i| {
            let done = i.done_at(&wf)?;
            range
                .contains(done.date_naive())
                .then(|| days_between(i.created, done))
        })
        .collect();
    DurationSeries::from_durations(data)
}

pub fn cycle_time(issues: &[IssueHistory], workflow: &[WorkflowState], range: DateRange) -> DurationSeries {
    let wf = Workflow::new(workflow);
    let data = issues
        .iter()
        .filter_map(|i| {
            let started = i.started_at(&wf)?;
            let done = i
                .entries()
                .find(|(at, status)| *at >= started && wf.is_done(status))
                .map(|(at, _)| at)?;
            range
                .contains(done.date_naive())
                .then(|| days_between(started, done))
        })
        .collect();
    DurationSeries::from_durations(data)
}

pub fn throughput(issues: &[IssueHistory], workflow: &[WorkflowState], range: DateRange) -> ThroughputSeries {
    let wf = Workflow::new(workflow);

    let mut weeks: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut week = week_start(range.start);
    while week <= range.end {
        weeks.insert(week, 0);
        week = match week.checked_add_days(Days::new(7)) {
            Some(next) => next,
            None => break,
        };
    }

    for done in issues.iter().filter_map(|i| i.done_at(&wf)) {
        let day = done.date_naive();
        if range.contains(day) {
            *weeks.entry(week_start(day)).or_insert(0) += 1;
        }
    }

    ThroughputSeries::from_points(
        weeks
            .into_iter()
            .map(|(period_start, count)| ThroughputPoint { period_start, count })
            .collect(),
    )
}

pub fn wip(issues: &[IssueHistory], workflow: &[WorkflowState], range: DateRange) -> WipSeries {
    let wf = Workflow::new(workflow);
    let data = range
        .days()
        .map(|date| {
            let t = end_of_day(date);
            let count = issues
                .iter()
                .filter_map(|i| i.status_at(t))
                .filter(|s| wf.is_in_progress(s))
                .count() as u32;
            WipPoint { date, count }
        })
        .collect();
    WipSeries::from_points(data)
}

pub fn cfd(issues: &[IssueHistory], workflow: &[WorkflowState], range: DateRange) -> CfdSeries {
    let wf = Workflow::new(workflow);
    let statuses: Vec<String> = workflow.iter().map(|s| s.name.clone()).collect();

    let data = range
        .days()
        .map(|date| {
            let t = end_of_day(date);
            let mut counts: BTreeMap<String, u32> =
                statuses.iter().map(|s| (s.clone(), 0)).collect();
            for status in issues.iter().filter_map(|i| i.status_at(t)) {
                if let Some(pos) = wf.position(status) {
                    *counts.entry(statuses[pos].clone()).or_insert(0) += 1;
                }
            }
            CfdPoint { date, counts }
        })
        .collect();

    CfdSeries {
        data,
        statuses,
        error: None,
    }
}
