//! Read-only projections of the habit list for whatever draws it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{
    day::DateKey,
    habit::{Habit, HabitId},
};

pub const CHART_DAYS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerView {
    pub today: DateKey,
    pub is_empty: bool,
    pub longest_streak: u32,
    pub habits: Vec<HabitRow>,
    pub calendar: Option<MonthCalendar>,
    pub weekly_chart: WeeklyChart,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitRow {
    pub id: HabitId,
    pub name: String,
    pub streak: u32,
    pub longest_streak: u32,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub title: String,
    /// Monday-first weeks, seven cells each. `None` pads days outside the
    /// month.
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub day: DateKey,
    pub day_of_month: u32,
    pub any_completed: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyChart {
    pub bars: Vec<ChartBar>,
    pub max_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub day: DateKey,
    pub label: String,
    pub count: usize,
}

pub fn project(habits: &[Habit], today: DateKey) -> TrackerView {
    let date = today.date();
    TrackerView {
        today,
        is_empty: habits.is_empty(),
        longest_streak: longest_streak_across_all(habits),
        habits: habits.iter().map(|habit| habit_row(habit, today)).collect(),
        calendar: month_calendar(habits, date.year(), date.month(), today),
        weekly_chart: weekly_chart(habits, today),
    }
}

pub fn habit_row(habit: &Habit, today: DateKey) -> HabitRow {
    HabitRow {
        id: habit.id,
        name: habit.name.clone(),
        streak: habit.streak,
        longest_streak: habit.longest_streak,
        completed_today: habit.completed.is_completed(today),
    }
}

pub fn longest_streak_across_all(habits: &[Habit]) -> u32 {
    habits
        .iter()
        .map(|habit| habit.longest_streak)
        .max()
        .unwrap_or(0)
}

pub fn completions_on(habits: &[Habit], day: DateKey) -> usize {
    habits
        .iter()
        .filter(|habit| habit.completed.is_completed(day))
        .count()
}

/// Grid for one month. `None` if `year`/`month` is not a real month.
pub fn month_calendar(
    habits: &[Habit],
    year: i32,
    month: u32,
    today: DateKey,
) -> Option<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days_in_month = days_in_month(first)?;
    let leading = first.weekday().num_days_from_monday() as usize;

    let mut cells: Vec<Option<CalendarDay>> = vec![None; leading];
    for day_of_month in 1..=days_in_month {
        let day = DateKey::from_date(first.with_day(day_of_month)?);
        cells.push(Some(CalendarDay {
            day,
            day_of_month,
            any_completed: completions_on(habits, day) > 0,
            is_today: day == today,
        }));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    Some(MonthCalendar {
        year,
        month,
        title: first.format("%B %Y").to_string(),
        weeks: cells.chunks(7).map(|week| week.to_vec()).collect(),
    })
}

/// Completion counts for the last [`CHART_DAYS`] days, oldest first.
pub fn weekly_chart(habits: &[Habit], today: DateKey) -> WeeklyChart {
    let mut days = Vec::with_capacity(CHART_DAYS);
    let mut day = today;
    for _ in 0..CHART_DAYS {
        days.push(day);
        day = day.day_before();
    }
    days.reverse();

    let bars: Vec<ChartBar> = days
        .into_iter()
        .map(|day| ChartBar {
            day,
            label: day.date().format("%a").to_string(),
            count: completions_on(habits, day),
        })
        .collect();
    let max_count = bars.iter().map(|bar| bar.count).max().unwrap_or(0);

    WeeklyChart { bars, max_count }
}

fn days_in_month(first: NaiveDate) -> Option<u32> {
    let (year, month) = if first.month() == 12 {
        (first.year().checked_add(1)?, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let last = NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()?;
    Some(last.day())
}
