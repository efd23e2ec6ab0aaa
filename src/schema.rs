//! Baseline table and index definitions.
//!
//! The statements below describe the version-0 layout and are all
//! `IF NOT EXISTS`, so running them against an already-initialized database is a
//! no-op. Later shape changes live in [`crate::migrate`] and are applied on top.

use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::error::AppError;
use crate::model::{TaskCategory, TimeFrame};

pub const BASELINE_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS parties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        date TEXT,
        guest_count INTEGER DEFAULT 0,
        party_type TEXT DEFAULT 'mixed',
        duration INTEGER DEFAULT 3,
        theme TEXT,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS guests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        email TEXT,
        rsvp TEXT DEFAULT 'pending',
        dietary_restrictions TEXT,
        plus_one BOOLEAN DEFAULT FALSE,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS timeline_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        task TEXT NOT NULL,
        time_frame TEXT NOT NULL,
        category TEXT NOT NULL,
        completed BOOLEAN DEFAULT FALSE,
        is_custom BOOLEAN DEFAULT TRUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS pizza_calculations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        guest_count INTEGER NOT NULL,
        pizzas_needed INTEGER NOT NULL,
        calculated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS beverage_calculations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        guest_count INTEGER NOT NULL,
        duration INTEGER NOT NULL,
        party_type TEXT NOT NULL,
        include_alcohol BOOLEAN NOT NULL,
        water_bottles INTEGER,
        soft_drinks INTEGER,
        beer_bottles INTEGER,
        wine_bottles INTEGER,
        cocktail_servings INTEGER,
        calculated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS itinerary_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        category TEXT NOT NULL,
        location TEXT,
        responsible TEXT,
        preparations TEXT,
        notes TEXT,
        completed BOOLEAN DEFAULT FALSE,
        order_index INTEGER,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS itinerary_templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        party_type TEXT,
        duration INTEGER,
        description TEXT,
        template_data TEXT,
        is_default BOOLEAN DEFAULT FALSE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE TABLE IF NOT EXISTS todo_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        party_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        category TEXT NOT NULL,
        priority TEXT DEFAULT 'medium',
        due_date TEXT,
        estimated_time INTEGER,
        completed BOOLEAN DEFAULT FALSE,
        assigned_to TEXT,
        location TEXT,
        estimated_cost REAL,
        actual_cost REAL,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        completed_at DATETIME,
        FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS todo_dependencies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id INTEGER NOT NULL,
        depends_on_id INTEGER NOT NULL,
        FOREIGN KEY (todo_id) REFERENCES todo_items (id) ON DELETE CASCADE,
        FOREIGN KEY (depends_on_id) REFERENCES todo_items (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS todo_subtasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        completed BOOLEAN DEFAULT FALSE,
        order_index INTEGER,
        FOREIGN KEY (todo_id) REFERENCES todo_items (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS todo_attachments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        type TEXT NOT NULL,
        url TEXT NOT NULL,
        FOREIGN KEY (todo_id) REFERENCES todo_items (id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS todo_templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        party_type TEXT,
        guest_count_range TEXT,
        template_data TEXT,
        is_default BOOLEAN DEFAULT FALSE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )",
    "CREATE INDEX IF NOT EXISTS idx_guests_party_id ON guests(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_timeline_tasks_party_id ON timeline_tasks(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_pizza_calculations_party_id ON pizza_calculations(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_beverage_calculations_party_id ON beverage_calculations(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_itinerary_items_party_id ON itinerary_items(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_todo_items_party_id ON todo_items(party_id)",
    "CREATE INDEX IF NOT EXISTS idx_todo_dependencies_todo_id ON todo_dependencies(todo_id)",
    "CREATE INDEX IF NOT EXISTS idx_todo_subtasks_todo_id ON todo_subtasks(todo_id)",
    "CREATE INDEX IF NOT EXISTS idx_todo_attachments_todo_id ON todo_attachments(todo_id)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultTask {
    pub task: &'static str,
    pub time_frame: TimeFrame,
    pub category: TaskCategory,
}

const fn default_task(task: &'static str, time_frame: TimeFrame, category: TaskCategory) -> DefaultTask {
    DefaultTask {
        task,
        time_frame,
        category,
    }
}

/// Seeded into every new party, in this order.
pub const DEFAULT_TIMELINE_TASKS: &[DefaultTask] = &[
    default_task("Set party date and theme", TimeFrame::FourToSixWeeks, TaskCategory::Planning),
    default_task("Create guest list", TimeFrame::FourToSixWeeks, TaskCategory::Planning),
    default_task("Book venue (if needed)", TimeFrame::FourToSixWeeks, TaskCategory::Planning),
    default_task("Send invitations", TimeFrame::TwoToThreeWeeks, TaskCategory::Planning),
    default_task("Plan menu and drinks", TimeFrame::TwoToThreeWeeks, TaskCategory::Planning),
    default_task(
        "Order special items/decorations",
        TimeFrame::TwoToThreeWeeks,
        TaskCategory::Shopping,
    ),
    default_task("Confirm RSVPs", TimeFrame::OneWeek, TaskCategory::Planning),
    default_task("Finalize headcount", TimeFrame::OneWeek, TaskCategory::Planning),
    default_task("Create shopping list", TimeFrame::OneWeek, TaskCategory::Planning),
    default_task("Clean and prep space", TimeFrame::OneWeek, TaskCategory::Preparation),
    default_task("Shop for non-perishables", TimeFrame::TwoToThreeDays, TaskCategory::Shopping),
    default_task("Prep decorations", TimeFrame::TwoToThreeDays, TaskCategory::Preparation),
    default_task("Prepare make-ahead dishes", TimeFrame::TwoToThreeDays, TaskCategory::Preparation),
    default_task("Shop for perishables", TimeFrame::DayBefore, TaskCategory::Shopping),
    default_task(
        "Prep food that can be done ahead",
        TimeFrame::DayBefore,
        TaskCategory::Preparation,
    ),
    default_task("Set up decorations", TimeFrame::DayBefore, TaskCategory::Setup),
    default_task("Chill beverages", TimeFrame::DayBefore, TaskCategory::Preparation),
    default_task("Final food preparation", TimeFrame::DayOf, TaskCategory::DayOf),
    default_task("Set up serving areas", TimeFrame::DayOf, TaskCategory::DayOf),
    default_task("Set up music/entertainment", TimeFrame::DayOf, TaskCategory::DayOf),
    default_task("Final cleanup and setup", TimeFrame::DayOf, TaskCategory::DayOf),
];

pub async fn ensure_schema<C: ConnectionTrait>(db: &C) -> Result<(), AppError> {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await?;

    for ddl in BASELINE_SCHEMA {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, *ddl))
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tasks_cover_every_time_frame_in_order() {
        assert_eq!(DEFAULT_TIMELINE_TASKS.len(), 21);
        let mut last_rank = 0;
        for task in DEFAULT_TIMELINE_TASKS {
            let rank = task.time_frame.rank();
            assert!(rank >= last_rank, "{} is out of order", task.task);
            last_rank = rank;
        }
        for frame in TimeFrame::ALL {
            assert!(DEFAULT_TIMELINE_TASKS
                .iter()
                .any(|task| task.time_frame == *frame));
        }
    }
}
