use crate::util::{format_instant, short_id};
use chrono_tz::Tz;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, Table};
use dayplan_core::models::{GoalView, Label, LabelKind, RecoveredWork, WorkView};

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn works_table(works: &[WorkView], tz: Tz) -> Table {
    let mut table = base_table(&["ID", "Name", "Start", "End", "Status", "Type", "Category", "Flags"]);
    for work in works {
        let mut flags = Vec::new();
        if work.draft.is_some() {
            flags.push("draft");
        }
        if work.overdue.is_some() {
            flags.push("overdue");
        }
        table.add_row(vec![
            Cell::new(short_id(&work.id)),
            Cell::new(&work.name),
            Cell::new(format_instant(work.start_date, tz)),
            Cell::new(format_instant(Some(work.end_date), tz)),
            Cell::new(&work.status.name),
            Cell::new(&work.work_type.name),
            Cell::new(&work.category.name),
            Cell::new(flags.join(",")),
        ]);
    }
    table
}

pub fn recovered_table(items: &[RecoveredWork], tz: Tz) -> Table {
    let mut table = base_table(&["ID", "Name", "Start", "End", "Conflict"]);
    for item in items {
        let conflict = if item.is_conflict {
            Cell::new("CONFLICT").fg(Color::Red)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(item.work.id.to_string()),
            Cell::new(&item.work.name),
            Cell::new(format_instant(item.work.start_date, tz)),
            Cell::new(format_instant(Some(item.work.end_date), tz)),
            conflict,
        ]);
    }
    table
}

pub fn labels_table(groups: &[(LabelKind, Vec<Label>)]) -> Table {
    let mut table = base_table(&["Slot", "Key", "Name", "Meaning"]);
    for (kind, labels) in groups {
        for label in labels {
            table.add_row(vec![
                Cell::new(kind.to_string()),
                Cell::new(&label.key),
                Cell::new(&label.name),
                Cell::new(label.meaning.as_deref().unwrap_or("")),
            ]);
        }
    }
    table
}

pub fn goals_table(goals: &[GoalView], tz: Tz) -> Table {
    let mut table = base_table(&["ID", "Name", "Start", "End", "Status", "Priority", "Flags"]);
    for goal in goals {
        let flags = if goal.overdue.is_some() { "overdue" } else { "" };
        table.add_row(vec![
            Cell::new(short_id(&goal.id)),
            Cell::new(&goal.name),
            Cell::new(format_instant(goal.start_date, tz)),
            Cell::new(format_instant(goal.end_date, tz)),
            Cell::new(&goal.status.name),
            Cell::new(&goal.priority.name),
            Cell::new(flags),
        ]);
    }
    table
}
