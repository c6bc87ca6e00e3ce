use std::collections::HashSet;

use chrono::{Days, Months, NaiveDate};
use tracing::{debug, warn};

use crate::event::CalendarEvent;
use crate::task::{MAX_RECURRENCE_COUNT, Recurrence, Task};

/// Expand `task` into exactly `max(1, count)` dated instances.
///
/// The recurrence count is the only iteration bound. `horizon_end` marks the
/// caller's visible window and only feeds the trace output.
#[tracing::instrument(skip(task), fields(id = %task.id, recurrence = ?task.recurrence, count = task.recurrence_count))]
pub fn expand_task(task: &Task, horizon_end: NaiveDate) -> Vec<CalendarEvent> {
    let anchor = task.anchor_date();
    let count = task.instance_count();
    let mut events = Vec::with_capacity(count.min(MAX_RECURRENCE_COUNT as u32) as usize);

    for index in 0..count {
        let Some(date) = instance_date(anchor, task.recurrence, index) else {
            warn!(index, %anchor, "recurrence instance out of calendar range; stopping");
            break;
        };
        events.push(CalendarEvent::task_instance(task, index, date));
    }

    let beyond = events.iter().filter(|e| e.date > horizon_end).count();
    debug!(generated = events.len(), beyond, "expanded task");
    events
}

/// Expand every task in order, dropping events whose id was already seen.
pub fn expand_tasks(tasks: &[Task], horizon_end: NaiveDate) -> Vec<CalendarEvent> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for task in tasks {
        for event in expand_task(task, horizon_end) {
            if seen.insert(event.id.clone()) {
                out.push(event);
            } else {
                warn!(event_id = %event.id, "duplicate event id; skipping");
            }
        }
    }
    out
}

fn instance_date(anchor: NaiveDate, recurrence: Recurrence, index: u32) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::None => Some(anchor),
        Recurrence::Daily => anchor.checked_add_days(Days::new(u64::from(index))),
        Recurrence::Weekly => anchor.checked_add_days(Days::new(7 * u64::from(index))),
        // chrono clamps to the last day of shorter months.
        Recurrence::Monthly => anchor.checked_add_months(Months::new(index)),
    }
}
