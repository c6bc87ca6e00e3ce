use tracing::trace;

use crate::event::CalendarEvent;
use crate::grid::CalendarDayCell;
use crate::occasions::OccasionTable;

/// Fill each cell with the events falling on its date, then its occasions.
///
/// Existing cell events are replaced, so projecting twice gives the same
/// grid.
pub fn project_events(grid: &mut [CalendarDayCell], events: &[CalendarEvent], occasions: &OccasionTable) {
    for cell in grid.iter_mut() {
        let date = cell.date();
        let mut cell_events: Vec<CalendarEvent> = events.iter().filter(|e| e.date == date).cloned().collect();

        for (n, (label, source)) in occasions.occasions_on(&cell.hijri).into_iter().enumerate() {
            cell_events.push(CalendarEvent::occasion(
                format!("occasion-{}-{}", date.format("%Y-%m-%d"), n),
                label,
                date,
                source,
            ));
        }

        trace!(%date, count = cell_events.len(), "projected cell");
        cell.events = cell_events;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone};

    use super::project_events;
    use crate::event::{CalendarEvent, OccasionSource};
    use crate::grid::generate_month_grid;
    use crate::occasions::OccasionTable;
    use crate::recurrence::expand_tasks;
    use crate::task::{Recurrence, Task};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn tasks_come_before_occasions() {
        let mut grid = generate_month_grid(1447, 0, ymd(2025, 7, 1)).expect("grid");
        let created = Local
            .with_ymd_and_hms(2025, 6, 27, 8, 0, 0)
            .single()
            .expect("valid local");
        let task = Task::new("صلاة".to_string(), created);
        let events = expand_tasks(&[task.clone()], ymd(2025, 8, 2));

        project_events(&mut grid, &events, &OccasionTable::default());

        // 2025-06-27 is 1 Muharram, the sixth cell.
        let cell = &grid[5];
        assert_eq!(cell.events.len(), 2);
        assert_eq!(cell.events[0].id, task.id);
        assert!(cell.events[0].is_task());
        assert_eq!(cell.events[1].title, "رأس السنة الهجرية");
        assert_eq!(cell.events[1].completed(), None);
        assert_eq!(cell.events[1].id, "occasion-2025-06-27-0");

        // 10 Muharram is Ashura.
        let ashura = grid.iter().find(|c| c.is_in_target_month && c.hijri.day == 10).expect("ashura cell");
        assert!(ashura.events.iter().any(|e| e.title == "يوم عاشوراء"));
    }

    #[test]
    fn events_land_only_on_matching_dates() {
        let mut grid = generate_month_grid(1447, 0, ymd(2025, 7, 1)).expect("grid");
        let created = Local
            .with_ymd_and_hms(2025, 7, 3, 23, 30, 0)
            .single()
            .expect("valid local");
        let task = Task::new("t".to_string(), created).with_recurrence(Recurrence::Weekly, 3);
        let events = expand_tasks(&[task], ymd(2025, 8, 2));
        project_events(&mut grid, &events, &OccasionTable::default().with_national(vec![]));

        let hits: Vec<NaiveDate> = grid
            .iter()
            .filter(|c| c.events.iter().any(CalendarEvent::is_task))
            .map(|c| c.date())
            .collect();
        assert_eq!(hits, vec![ymd(2025, 7, 3), ymd(2025, 7, 10), ymd(2025, 7, 17)]);
    }

    #[test]
    fn projection_is_idempotent() {
        let mut grid = generate_month_grid(1447, 8, ymd(2026, 2, 1)).expect("grid");
        let table = OccasionTable::default();
        project_events(&mut grid, &[], &table);
        let first = grid.clone();
        project_events(&mut grid, &[], &table);
        assert_eq!(first, grid);

        let national: Vec<_> = grid
            .iter()
            .flat_map(|c| c.events.iter())
            .filter(|e| matches!(e.kind, crate::event::EventKind::Occasion { source: OccasionSource::National }))
            .collect();
        // Founding day, 22 February, is inside the Ramadan 1447 grid.
        assert_eq!(national.len(), 1);
        assert_eq!(national[0].date, ymd(2026, 2, 22));
    }
}
