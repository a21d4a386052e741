//! Temporal classification and aggregate statistics over task lists.
//!
//! Every view that needs "what's due when" or "how is this project going"
//! goes through here, so the boundary rules (inclusive horizon, overdue as a
//! derived flag rather than a bucket) live in exactly one place. Functions
//! in this module are pure and total: they never touch a port, and they
//! accept whatever statuses and due dates are already in storage.

use crate::domain::task::{Task, TaskStatus};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Number of days after `today` still counted as "this week"
const THIS_WEEK_WINDOW_DAYS: i64 = 7;

/// The four mutually exclusive agenda categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskBucket {
    Unscheduled,
    DueToday,
    DueThisWeek,
    Later,
}

/// Buckets a due date relative to `today`. Rules apply in a fixed order:
/// no date, then an exact match on today, then the inclusive seven-day
/// horizon, then everything else. Past-due dates satisfy the horizon check
/// and therefore land in [TaskBucket::DueThisWeek] - overdue is a separate
/// derived flag ([is_overdue]), not a fifth bucket.
pub fn bucket_for(due_date: Option<NaiveDate>, today: NaiveDate) -> TaskBucket {
    let horizon = today + Duration::days(THIS_WEEK_WINDOW_DAYS);

    match due_date {
        None => TaskBucket::Unscheduled,
        Some(due) if due == today => TaskBucket::DueToday,
        Some(due) if due <= horizon => TaskBucket::DueThisWeek,
        Some(_) => TaskBucket::Later,
    }
}

/// A task list split into the four agenda buckets. Within a bucket, tasks
/// keep the order they arrived in.
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct Agenda {
    pub unscheduled: Vec<Task>,
    pub due_today: Vec<Task>,
    pub due_this_week: Vec<Task>,
    pub later: Vec<Task>,
}

/// Partitions a task list into the four agenda buckets. Every input task
/// lands in exactly one bucket.
pub fn partition(tasks: Vec<Task>, today: NaiveDate) -> Agenda {
    let mut agenda = Agenda {
        unscheduled: Vec::new(),
        due_today: Vec::new(),
        due_this_week: Vec::new(),
        later: Vec::new(),
    };

    for task in tasks {
        match bucket_for(task.due_date, today) {
            TaskBucket::Unscheduled => agenda.unscheduled.push(task),
            TaskBucket::DueToday => agenda.due_today.push(task),
            TaskBucket::DueThisWeek => agenda.due_this_week.push(task),
            TaskBucket::Later => agenda.later.push(task),
        }
    }

    agenda
}

/// A task is overdue when it has a due date in the past and isn't completed.
/// Statuses outside the canonical set count as not-completed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    let Some(due) = task.due_date else {
        return false;
    };

    due < today && TaskStatus::parse(&task.status) != Some(TaskStatus::Completed)
}

/// Aggregate counts for dashboard and portfolio views.
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct TaskStats {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub overdue: u32,
    /// completed / total as a percentage, one decimal place, 0.0 for an
    /// empty task list
    pub completion_percentage: f64,
}

/// Computes aggregate statistics over a task list. A status outside the
/// canonical set still counts toward `total` but toward none of the named
/// status counters; bad legacy data skews a dashboard, it doesn't take the
/// page down.
pub fn aggregate(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let mut stats = TaskStats {
        total: 0,
        completed: 0,
        pending: 0,
        in_progress: 0,
        overdue: 0,
        completion_percentage: 0.0,
    };

    for task in tasks {
        stats.total += 1;
        match TaskStatus::parse(&task.status) {
            Some(TaskStatus::Completed) => stats.completed += 1,
            Some(TaskStatus::Pending) => stats.pending += 1,
            Some(TaskStatus::InProgress) => stats.in_progress += 1,
            None => {}
        }
        if is_overdue(task, today) {
            stats.overdue += 1;
        }
    }

    if stats.total > 0 {
        let ratio = f64::from(stats.completed) / f64::from(stats.total);
        stats.completion_percentage = (ratio * 1000.0).round() / 10.0;
    }

    stats
}

/// One point of the "open tasks per day" series.
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct DueDateCount {
    pub due_date: Option<NaiveDate>,
    pub count: u32,
}

/// Counts non-completed tasks per distinct due date, ascending, with the
/// undated group last (present only when undated open tasks exist).
pub fn tasks_per_day(tasks: &[Task]) -> Vec<DueDateCount> {
    let mut per_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    let mut undated: u32 = 0;

    for task in tasks {
        if TaskStatus::parse(&task.status) == Some(TaskStatus::Completed) {
            continue;
        }
        match task.due_date {
            Some(due) => *per_date.entry(due).or_insert(0) += 1,
            None => undated += 1,
        }
    }

    let mut series: Vec<DueDateCount> = per_date
        .into_iter()
        .map(|(due_date, count)| DueDateCount {
            due_date: Some(due_date),
            count,
        })
        .collect();
    if undated > 0 {
        series.push(DueDateCount {
            due_date: None,
            count: undated,
        });
    }

    series
}

/// One point of the priority breakdown shown on portfolio details.
#[derive(Debug, PartialEq)]
#[cfg_attr(test, derive(Clone))]
pub struct PriorityCount {
    pub priority: Option<String>,
    pub count: u32,
}

/// Counts tasks per distinct priority label, alphabetical, with the
/// no-priority group last (present only when unprioritized tasks exist).
pub fn priority_distribution(tasks: &[Task]) -> Vec<PriorityCount> {
    let mut per_priority: BTreeMap<&str, u32> = BTreeMap::new();
    let mut unprioritized: u32 = 0;

    for task in tasks {
        match task.priority {
            Some(ref priority) => *per_priority.entry(priority.as_str()).or_insert(0) += 1,
            None => unprioritized += 1,
        }
    }

    let mut distribution: Vec<PriorityCount> = per_priority
        .into_iter()
        .map(|(priority, count)| PriorityCount {
            priority: Some(priority.to_owned()),
            count,
        })
        .collect();
    if unprioritized > 0 {
        distribution.push(PriorityCount {
            priority: None,
            count: unprioritized,
        });
    }

    distribution
}
