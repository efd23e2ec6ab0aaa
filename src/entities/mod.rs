pub mod beverage_calculation;
pub mod guest;
pub mod itinerary_item;
pub mod itinerary_template;
pub mod migration;
pub mod party;
pub mod pizza_calculation;
pub mod timeline_task;
pub mod todo_attachment;
pub mod todo_dependency;
pub mod todo_item;
pub mod todo_subtask;
pub mod todo_template;
