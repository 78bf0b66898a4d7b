//! Product template selection and tabular payloads.
//!
//! The renderer collaborator receives the rows verbatim; what the template
//! contains is decided here so every backend renders the same artifact.

use trendforge_core::ProductKind;

/// Pick a template family from the keyword text.
#[must_use]
pub fn kind_for_keyword(keyword: &str) -> ProductKind {
    if keyword.contains("planner") {
        ProductKind::Planner
    } else if keyword.contains("budget") || keyword.contains("finance") || keyword.contains("tracker")
    {
        ProductKind::Tracker
    } else {
        ProductKind::Generic
    }
}

/// Human-facing product name: the keyword in title case.
#[must_use]
pub fn product_name(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The tabular layout for a template kind.
#[must_use]
pub fn template_rows(kind: ProductKind) -> Vec<Vec<String>> {
    match kind {
        ProductKind::Planner => planner_rows(),
        ProductKind::Tracker => tracker_rows(),
        ProductKind::Generic => generic_rows(),
    }
}

/// Daily planner: a header and an hourly grid from 06:00 to 21:00.
fn planner_rows() -> Vec<Vec<String>> {
    let mut rows = vec![
        row(&["Daily Planner", "Date: ___________"]),
        Vec::new(),
        row(&["Time", "Task", "Notes"]),
    ];
    for hour in 6..22 {
        rows.push(vec![format!("{hour}:00"), String::new(), String::new()]);
    }
    rows
}

/// Budget tracker: an income block and a planned/actual expense block.
fn tracker_rows() -> Vec<Vec<String>> {
    vec![
        row(&["Monthly Budget Tracker"]),
        Vec::new(),
        row(&["Income Source", "Amount"]),
        row(&["Salary", "0"]),
        row(&["Side Hustle", "0"]),
        row(&["Total", "=SUM(B4:B5)"]),
        Vec::new(),
        row(&["Expense Category", "Planned", "Actual", "Difference"]),
        row(&["Rent", "1000", "1000", "=B9-C9"]),
        row(&["Groceries", "300", "0", "=B10-C10"]),
    ]
}

fn generic_rows() -> Vec<Vec<String>> {
    vec![row(&["Title", "Description"])]
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(ToString::to_string).collect()
}
