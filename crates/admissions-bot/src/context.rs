use crate::model::Record;

/// Maximum number of ranked programs rendered into one prompt.
pub const MAX_CONTEXT_RECORDS: usize = 5;
pub const NO_CONTEXT: &str = "No specific program information available.";
pub const PLACEHOLDER: &str = "N/A";

/// Render ranked programs as labeled text blocks for the prompt.
///
/// The four core labels are always written, with [`PLACEHOLDER`] for missing or blank
/// values, so the generator sees the same layout for every program. Additional
/// requirements, entry test streams and notes appear only when they carry something.
pub fn format_context(records: &[&Record]) -> String {
    let kept = &records[..records.len().min(MAX_CONTEXT_RECORDS)];
    if kept.is_empty() {
        return NO_CONTEXT.to_string();
    }

    let mut lines = Vec::new();
    for (i, record) in kept.iter().enumerate() {
        lines.push(format!("Program {}:", i + 1));
        lines.push(format!("Program Name: {}", or_placeholder(&record.name)));
        lines.push(format!("Faculty/College: {}", or_placeholder(&record.category)));
        lines.push(format!("Schedule: {}", or_placeholder(&record.schedule)));
        lines.push(format!(
            "Eligibility Criteria: {}",
            or_placeholder(&record.eligibility)
        ));

        if let Some(extra) = present(&record.additional_requirements) {
            lines.push(format!("Additional Requirements: {extra}"));
        }

        let streams: Vec<&str> = record
            .tags
            .iter()
            .flatten()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !streams.is_empty() {
            lines.push(format!("Entry Test Streams: {}", streams.join(", ")));
        }

        if let Some(notes) = present(&record.notes) {
            lines.push(format!("Notes: {notes}"));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn or_placeholder(field: &Option<String>) -> &str {
    present(field).unwrap_or(PLACEHOLDER)
}
