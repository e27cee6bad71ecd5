use chrono::{Datelike, NaiveDate};

use crate::model::task::Task;

/// One month of the calendar view. Weeks start on Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 (0 = the 1st is a Sunday)
    pub leading_blanks: u32,
    pub days_in_month: u32,
    /// Tasks due on each day; index 0 is the 1st
    pub due_counts: Vec<usize>,
}

/// A single cell of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub due: usize,
}

impl CalendarMonth {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn due_on(&self, day: u32) -> usize {
        day.checked_sub(1)
            .and_then(|i| self.due_counts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Week rows of seven cells; `None` pads before the 1st and after the
    /// last day.
    pub fn weeks(&self) -> Vec<[Option<DayCell>; 7]> {
        let mut weeks = Vec::new();
        let mut day: i64 = 1 - self.leading_blanks as i64;
        while day <= self.days_in_month as i64 {
            let mut row = [None; 7];
            for cell in row.iter_mut() {
                if day >= 1 && day <= self.days_in_month as i64 {
                    let d = day as u32;
                    *cell = Some(DayCell {
                        day: d,
                        due: self.due_on(d),
                    });
                }
                day += 1;
            }
            weeks.push(row);
        }
        weeks
    }

    pub fn total_due(&self) -> usize {
        self.due_counts.iter().sum()
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = shift_month(year, month, 1);
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((next - first).num_days() as u32)
}

/// Move `delta` months from `year`/`month`, rolling the year over
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Build the calendar for one month, counting tasks whose due date falls on
/// each day. Returns `None` for an invalid month.
pub fn calendar_month(tasks: &[Task], year: i32, month: u32) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;
    let mut due_counts = vec![0usize; days as usize];
    for task in tasks {
        if let Some(due) = task.due_date
            && due.year() == year
            && due.month() == month
        {
            due_counts[(due.day() - 1) as usize] += 1;
        }
    }
    Some(CalendarMonth {
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days_in_month: days,
        due_counts,
    })
}
