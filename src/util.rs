use chrono::{DateTime, Utc};

use crate::accessors::guests::GuestStats;
use crate::accessors::itinerary::preparations;
use crate::accessors::timeline::Completion;
use crate::accessors::todos::{TodoDetail, TodoStats};
use crate::entities::{
    beverage_calculation, guest, itinerary_item, party, pizza_calculation, timeline_task,
};
use crate::templates::{ItineraryTemplate, TodoTemplate};
use crate::transfer::ImportResult;

fn has_text(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}

fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_party_line(party: &party::Model, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let date = party.date.as_deref().unwrap_or("no date");
    format!(
        "{marker} {}: {} ({date}, {} guests, {}, {}h)",
        party.id, party.name, party.guest_count, party.party_type, party.duration
    )
}

pub fn format_party_detail(party: &party::Model) -> String {
    let mut output = String::new();
    output.push_str(&format!("Party ID: {}\n", party.id));
    output.push_str(&format!("Name: {}\n", party.name));
    output.push_str(&format!(
        "Date: {}\n",
        party.date.as_deref().unwrap_or("(not set)")
    ));
    output.push_str(&format!("Guests: {}\n", party.guest_count));
    output.push_str(&format!("Type: {}\n", party.party_type));
    output.push_str(&format!("Duration: {}h\n", party.duration));
    if has_text(&party.theme) {
        output.push_str(&format!("Theme: {}\n", party.theme.as_deref().unwrap_or("")));
    }
    if has_text(&party.notes) {
        output.push_str(&format!("Notes: {}\n", party.notes.as_deref().unwrap_or("")));
    }
    output.push_str(&format!("Created: {}\n", format_datetime(party.created_at)));
    output.push_str(&format!("Updated: {}\n", format_datetime(party.updated_at)));
    output.trim_end().to_string()
}

pub fn format_guest_line(guest: &guest::Model) -> String {
    let mut line = format!("{}: {} [{}]", guest.id, guest.name, guest.rsvp);
    if guest.additional_guests > 0 {
        line.push_str(&format!(" +{}", guest.additional_guests));
    }
    if let Some(email) = guest.email.as_deref() {
        line.push_str(&format!(" <{email}>"));
    }
    if let Some(dietary) = guest.dietary_restrictions.as_deref() {
        line.push_str(&format!(" diet: {dietary}"));
    }
    line
}

pub fn format_guest_stats(stats: &GuestStats) -> String {
    format!(
        "Invited: {}\nConfirmed: {}\nDeclined: {}\nPending: {}\nAdditional guests: {}\nTotal attending: {}",
        stats.total_invited,
        stats.confirmed,
        stats.declined,
        stats.pending,
        stats.additional_guests,
        stats.total_attending
    )
}

pub fn format_timeline(groups: &[(&str, Vec<&timeline_task::Model>)]) -> String {
    if groups.is_empty() {
        return "No timeline tasks.".to_string();
    }
    let mut output = String::new();
    for (frame, tasks) in groups {
        output.push_str(&format!("{frame}:\n"));
        for task in tasks {
            output.push_str(&format!(
                "  {} {}: {} ({})\n",
                checkbox(task.completed),
                task.id,
                task.task,
                task.category
            ));
        }
    }
    output.trim_end().to_string()
}

pub fn format_completion(completion: &Completion) -> String {
    format!(
        "{}/{} tasks complete ({}%)",
        completion.completed, completion.total, completion.percentage
    )
}

pub fn format_todo_line(detail: &TodoDetail) -> String {
    let todo = &detail.todo;
    let mut line = format!(
        "{} {}: {} ({}, {})",
        checkbox(todo.completed),
        todo.id,
        todo.title,
        todo.priority,
        todo.category
    );
    if let Some(due) = todo.due_date.as_deref() {
        line.push_str(&format!(" due {due}"));
    }
    if !detail.subtasks.is_empty() {
        let done = detail.subtasks.iter().filter(|s| s.completed).count();
        line.push_str(&format!(" [{done}/{} subtasks]", detail.subtasks.len()));
    }
    line
}

pub fn format_todo_detail(detail: &TodoDetail) -> String {
    let todo = &detail.todo;
    let mut output = String::new();
    output.push_str(&format!("Todo ID: {}\n", todo.id));
    output.push_str(&format!("Title: {}\n", todo.title));
    output.push_str(&format!("Category: {}\n", todo.category));
    output.push_str(&format!("Priority: {}\n", todo.priority));
    output.push_str(&format!(
        "Status: {}\n",
        if todo.completed { "done" } else { "open" }
    ));
    if let Some(completed_at) = todo.completed_at {
        output.push_str(&format!("Completed: {}\n", format_datetime(completed_at)));
    }
    if let Some(due) = todo.due_date.as_deref() {
        output.push_str(&format!("Due: {due}\n"));
    }
    if let Some(minutes) = todo.estimated_time {
        output.push_str(&format!("Estimated time: {minutes} min\n"));
    }
    if let Some(cost) = todo.estimated_cost {
        output.push_str(&format!("Estimated cost: {cost:.2}\n"));
    }
    if let Some(cost) = todo.actual_cost {
        output.push_str(&format!("Actual cost: {cost:.2}\n"));
    }
    for (label, value) in [
        ("Description", &todo.description),
        ("Assigned to", &todo.assigned_to),
        ("Location", &todo.location),
        ("Notes", &todo.notes),
    ] {
        if has_text(value) {
            output.push_str(&format!("{label}: {}\n", value.as_deref().unwrap_or("")));
        }
    }
    if !detail.dependencies.is_empty() {
        let ids: Vec<String> = detail.dependencies.iter().map(i64::to_string).collect();
        output.push_str(&format!("Waits on: {}\n", ids.join(", ")));
    }
    if !detail.subtasks.is_empty() {
        output.push_str("Subtasks:\n");
        for subtask in &detail.subtasks {
            output.push_str(&format!(
                "- {} {} (subtask id {})\n",
                checkbox(subtask.completed),
                subtask.title,
                subtask.id
            ));
        }
    }
    if !detail.attachments.is_empty() {
        output.push_str("Attachments:\n");
        for attachment in &detail.attachments {
            output.push_str(&format!(
                "- {} [{}] {} (attachment id {})\n",
                attachment.name, attachment.kind, attachment.url, attachment.id
            ));
        }
    }
    output.trim_end().to_string()
}

pub fn format_todo_stats(stats: &TodoStats) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Todos: {} ({} done, {} open, {} overdue)\n",
        stats.total, stats.completed, stats.pending, stats.overdue
    ));
    output.push_str(&format!("Completion: {}%\n", stats.completion_rate));
    output.push_str(&format!("Total cost: {:.2}\n", stats.total_cost));
    output.push_str(&format!(
        "Remaining time: {}h {}m\n",
        stats.remaining_minutes / 60,
        stats.remaining_minutes % 60
    ));
    for (label, counts) in [("By category", &stats.by_category), ("By priority", &stats.by_priority)] {
        if counts.is_empty() {
            continue;
        }
        let parts: Vec<String> = counts.iter().map(|(key, n)| format!("{key} {n}")).collect();
        output.push_str(&format!("{label}: {}\n", parts.join(", ")));
    }
    output.trim_end().to_string()
}

pub fn format_itinerary(items: &[itinerary_item::Model]) -> String {
    if items.is_empty() {
        return "No itinerary items.".to_string();
    }
    let mut output = String::new();
    for item in items {
        output.push_str(&format!(
            "{} {}-{} {}: {} ({})\n",
            checkbox(item.completed),
            item.start_time,
            item.end_time,
            item.id,
            item.title,
            item.category
        ));
        if let Some(location) = item.location.as_deref() {
            output.push_str(&format!("    at {location}\n"));
        }
        if let Some(responsible) = item.responsible.as_deref() {
            output.push_str(&format!("    by {responsible}\n"));
        }
        for prep in preparations(item) {
            output.push_str(&format!("    - {prep}\n"));
        }
    }
    output.trim_end().to_string()
}

pub fn format_itinerary_templates(templates: &[ItineraryTemplate]) -> String {
    let mut output = String::new();
    for template in templates {
        let origin = if template.is_default { "built-in" } else { "saved" };
        output.push_str(&format!(
            "{}: {} ({} slots, {origin})\n",
            template.id,
            template.name,
            template.slots.len()
        ));
    }
    output.trim_end().to_string()
}

pub fn format_todo_templates(templates: &[TodoTemplate]) -> String {
    let mut output = String::new();
    for template in templates {
        let origin = if template.is_default { "built-in" } else { "saved" };
        output.push_str(&format!(
            "{}: {} ({} todos, {origin})\n",
            template.id,
            template.name,
            template.items.len()
        ));
    }
    output.trim_end().to_string()
}

pub fn format_pizza_line(row: &pizza_calculation::Model) -> String {
    format!(
        "{}: {} guests -> {} pizzas ({})",
        row.id,
        row.guest_count,
        row.pizzas_needed,
        format_datetime(row.calculated_at)
    )
}

pub fn format_beverage_line(row: &beverage_calculation::Model) -> String {
    let mut line = format!(
        "{}: {} guests, {}h, {} -> water {}, soft drinks {}",
        row.id, row.guest_count, row.duration, row.party_type, row.water_bottles, row.soft_drinks
    );
    if row.include_alcohol {
        line.push_str(&format!(
            ", beer {}, wine {}, cocktails {}",
            row.beer_bottles, row.wine_bottles, row.cocktail_servings
        ));
    }
    line.push_str(&format!(" ({})", format_datetime(row.calculated_at)));
    line
}

pub fn format_import_result(result: &ImportResult) -> String {
    if !result.success {
        return result.message.clone();
    }
    format!(
        "{}\nParties: {}\nGuests: {}\nTimeline tasks: {}",
        result.message, result.imported_parties, result.imported_guests, result.imported_tasks
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_party() -> party::Model {
        let at = Utc.with_ymd_and_hms(2025, 5, 1, 18, 30, 0).unwrap();
        party::Model {
            id: 4,
            name: "Garden party".to_string(),
            date: Some("2025-06-30".to_string()),
            guest_count: 20,
            party_type: "casual".to_string(),
            duration: 3,
            theme: Some("  ".to_string()),
            notes: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn party_line_marks_the_selection() {
        let party = sample_party();
        assert_eq!(
            format_party_line(&party, true),
            "* 4: Garden party (2025-06-30, 20 guests, casual, 3h)"
        );
        assert!(format_party_line(&party, false).starts_with("  4:"));
    }

    #[test]
    fn party_detail_skips_blank_text() {
        let detail = format_party_detail(&sample_party());
        assert!(detail.contains("Created: 2025-05-01 18:30"));
        assert!(!detail.contains("Theme:"));
    }

    #[test]
    fn failed_import_prints_only_the_message() {
        let result = ImportResult {
            message: "Invalid JSON data".to_string(),
            ..ImportResult::default()
        };
        assert_eq!(format_import_result(&result), "Invalid JSON data");
    }
}
