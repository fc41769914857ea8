//! Plain-text drawing of the tracker view model.

use std::fmt::Write;

use habit_core::view::{CalendarDay, MonthCalendar, TrackerView, WeeklyChart};

const BAR_WIDTH: usize = 24;
const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

pub fn render_list(view: &TrackerView) -> String {
    if view.is_empty {
        return "No habits yet. Add one with `habits add <name>`.\n".to_string();
    }

    let name_width = view
        .habits
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    let id_width = view
        .habits
        .iter()
        .map(|row| row.id.to_string().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in &view.habits {
        let mark = if row.completed_today { "[x]" } else { "[ ]" };
        let _ = writeln!(
            out,
            "{mark} {id:>id_width$}  {name:<name_width$}  streak {streak} (best {best})",
            id = row.id,
            name = row.name,
            streak = days(row.streak),
            best = days(row.longest_streak),
        );
    }
    let _ = writeln!(out, "\nLongest streak: {}", days(view.longest_streak));
    out
}

pub fn render_calendar(calendar: &MonthCalendar) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:^28}", calendar.title);
    let header: String = WEEKDAYS.iter().map(|day| format!("{day:>3} ")).collect();
    let _ = writeln!(out, "{}", header.trim_end());

    for week in &calendar.weeks {
        let line: String = week
            .iter()
            .map(|cell| match cell {
                Some(day) => format!("{:>3}{}", day.day_of_month, marker(day)),
                None => "    ".to_string(),
            })
            .collect();
        let _ = writeln!(out, "{}", line.trim_end());
    }
    let _ = writeln!(out, "\n* done   + done today   . today");
    out
}

pub fn render_chart(chart: &WeeklyChart) -> String {
    let mut out = String::new();
    for bar in &chart.bars {
        let length = scaled(bar.count, chart.max_count);
        let _ = writeln!(
            out,
            "{} {} | {:<width$} {}",
            bar.label,
            bar.day.date().format("%m-%d"),
            "#".repeat(length),
            bar.count,
            width = BAR_WIDTH,
        );
    }
    out
}

fn marker(day: &CalendarDay) -> char {
    match (day.any_completed, day.is_today) {
        (true, true) => '+',
        (true, false) => '*',
        (false, true) => '.',
        (false, false) => ' ',
    }
}

/// Bar length, rounded up so that any non-zero count stays visible.
fn scaled(count: usize, max: usize) -> usize {
    if max == 0 {
        return 0;
    }
    (count * BAR_WIDTH).div_ceil(max)
}

fn days(count: u32) -> String {
    if count == 1 {
        "1 day".to_string()
    } else {
        format!("{count} days")
    }
}
