use sheetpush_core::{PendingEntry, Project, PushReport};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PendingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Description")]
    desc: String,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "Project")]
    project: String,
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "Alias")]
    alias: String,
}

#[derive(Tabled)]
struct CellRow {
    #[tabled(rename = "Cell")]
    cell: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn show_pending(entries: &[PendingEntry]) {
    if entries.is_empty() {
        println!("No pending entries.");
        return;
    }

    let total: f64 = entries.iter().map(|p| p.entry.duration).sum();
    let rows = entries
        .iter()
        .map(|p| PendingRow {
            id: p.id.to_string()[..8].to_string(),
            date: p.entry.date.format("%Y-%m-%d (%a)").to_string(),
            alias: p.entry.alias.clone(),
            hours: format!("{:.2}", p.entry.duration),
            desc: p.entry.description.clone(),
        })
        .collect();
    print_table::<PendingRow>(rows);
    println!("{} entries, {:.2}h total", entries.len(), total);
}

pub fn show_projects(projects: &[Project]) {
    let mut rows = Vec::new();
    for project in projects {
        for (i, activity) in project.activities.iter().enumerate() {
            // Project name only on its first row.
            let project_col = if i == 0 {
                format!("{} ({})", project.name, project.id)
            } else {
                String::new()
            };
            rows.push(ProjectRow {
                project: project_col,
                column: activity.column.clone(),
                activity: activity.name.clone(),
                alias: activity.alias.clone(),
            });
        }
    }
    print_table(rows);
}

pub fn show_report(report: &PushReport) {
    if report.entries == 0 {
        println!("Nothing to push.");
        return;
    }

    let rows: Vec<CellRow> = report
        .cells
        .iter()
        .map(|(cell, value)| CellRow {
            cell: cell.to_string(),
            value: value.clone(),
        })
        .collect();
    print_table(rows);

    if report.dry_run {
        println!("Dry run: {} entries would update {} cells.", report.entries, report.cells.len());
    } else {
        println!("Pushed {} entries ({} cells).", report.entries, report.cells.len());
    }
}
