mod accessors;
mod calc;
mod cli;
mod db;
mod entities;
mod error;
mod logging;
mod migrate;
mod model;
mod schema;
mod session;
mod storage;
mod templates;
mod transfer;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::accessors::calculations::CalculationLog;
use crate::accessors::guests::GuestList;
use crate::accessors::itinerary::ItineraryPlan;
use crate::accessors::parties::PartyList;
use crate::accessors::timeline::TimelineTaskList;
use crate::accessors::todos::TodoList;
use crate::cli::{
    AttachmentTypeArg, CalcBeverages, CalcCommand, CalcPizza, Cli, Command, DataCommand,
    DataExport, DataImport, GuestAdd, GuestCommand, GuestRsvp, GuestUpdate, ItineraryAdd,
    ItineraryApplyTemplate, ItineraryCategoryArg, ItineraryCommand, ItinerarySaveTemplate,
    ItineraryUpdate, PartyAdd, PartyCommand, PartyTypeArg, PartyUpdate, RsvpArg, SubtaskAdd,
    SubtaskUpdate, TaskCategoryArg, TimelineAdd, TimelineCommand, TimelineUpdate, TodoAdd,
    TodoApplyTemplate, TodoAttach, TodoCategoryArg, TodoCommand, TodoPriorityArg,
    TodoSaveTemplate, TodoUpdate,
};
use crate::db::{Config, Database};
use crate::error::AppError;
use crate::model::{
    parse_date, AttachmentInput, AttachmentType, GuestChanges, GuestInput, ItineraryCategory,
    ItineraryChanges, ItineraryInput, PartyChanges, PartyInput, PartyType, Rsvp,
    SubTaskChanges, TaskCategory, TimelineTaskChanges, TimelineTaskInput, TodoCategory,
    TodoChanges, TodoInput, TodoPriority,
};
use crate::session::Session;
use crate::storage::{ensure_dir, FileStore, KeyValueStore};
use crate::util::{
    format_beverage_line, format_completion, format_guest_line, format_guest_stats,
    format_import_result, format_itinerary, format_itinerary_templates, format_party_detail,
    format_party_line, format_pizza_line, format_timeline, format_todo_detail,
    format_todo_line, format_todo_stats, format_todo_templates,
};

const DATA_DIR_ENV: &str = "PARTYPLAN_HOME";
const DEFAULT_DATA_DIR: &str = ".partyplan";

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let Cli {
        data_dir,
        party,
        verbose,
        command,
    } = Cli::parse();
    logging::init(verbose);

    let data_dir = resolve_data_dir(data_dir)?;
    ensure_dir(&data_dir)?;
    let mut lock = db::open_lock(&data_dir)?;
    let _guard = lock.write()?;

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));
    let mut database = Database::open(store, Config::default()).await?;
    let mut session = Session::restore(&database).await?;

    let result = {
        let mut context = Context {
            db: &database,
            session: &mut session,
            party_override: party,
        };
        dispatch(&mut context, command).await
    };

    let persisted = session.persist(database.store().as_ref());
    let closed = database.close().await;
    result?;
    persisted?;
    closed
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(AppError::InvalidInput("--data-dir is empty".to_string()));
        }
        return Ok(path);
    }
    if let Ok(home) = std::env::var(DATA_DIR_ENV) {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return Ok(PathBuf::from(home).join(DEFAULT_DATA_DIR));
    }
    Err(AppError::InvalidInput(format!(
        "unable to resolve a data directory; pass --data-dir or set {DATA_DIR_ENV}"
    )))
}

struct Context<'a> {
    db: &'a Database,
    session: &'a mut Session,
    party_override: Option<i64>,
}

impl Context<'_> {
    fn party_id(&self) -> Result<i64, AppError> {
        match self.party_override {
            Some(id) => Ok(id),
            None => self.session.require_party(),
        }
    }
}

async fn dispatch(context: &mut Context<'_>, command: Command) -> Result<(), AppError> {
    match command {
        Command::Party(command) => handle_party(context, command).await,
        Command::Guest(command) => handle_guest(context, command).await,
        Command::Timeline(command) => handle_timeline(context, command).await,
        Command::Todo(command) => handle_todo(context, command).await,
        Command::Itinerary(command) => handle_itinerary(context, command).await,
        Command::Calc(command) => handle_calc(context, command).await,
        Command::Data(command) => handle_data(context, command).await,
    }
}

async fn handle_party(context: &mut Context<'_>, command: PartyCommand) -> Result<(), AppError> {
    let mut parties = PartyList::new(context.db);
    match command {
        PartyCommand::Add(args) => handle_party_add(context, &mut parties, args).await,
        PartyCommand::List => {
            let selected = context.session.current_party_id;
            let list = parties.load().await?;
            if list.is_empty() {
                println!("No parties.");
            }
            for party in list {
                println!("{}", format_party_line(party, selected == Some(party.id)));
            }
            Ok(())
        }
        PartyCommand::Show(args) => {
            let id = match args.id {
                Some(id) => id,
                None => context.party_id()?,
            };
            let party = parties.get(id).await?;
            println!("{}", format_party_detail(&party));
            Ok(())
        }
        PartyCommand::Update(args) => handle_party_update(&mut parties, args).await,
        PartyCommand::Remove(args) => {
            parties.delete(args.id).await?;
            if context.session.current_party_id == Some(args.id) {
                context.session.clear();
            }
            println!("Deleted party ID: {}", args.id);
            Ok(())
        }
        PartyCommand::Select(args) => {
            let party = parties.get(args.id).await?;
            context.session.select(party.id);
            println!("Selected party ID: {}: {}", party.id, party.name);
            Ok(())
        }
        PartyCommand::Selected => {
            match context.session.current_party_id {
                Some(id) => println!("{}", format_party_detail(&parties.get(id).await?)),
                None => println!("No party selected."),
            }
            Ok(())
        }
        PartyCommand::Deselect => {
            context.session.clear();
            println!("Selection cleared.");
            Ok(())
        }
    }
}

async fn handle_party_add(
    context: &mut Context<'_>,
    parties: &mut PartyList<'_>,
    args: PartyAdd,
) -> Result<(), AppError> {
    let party = parties
        .create(PartyInput {
            name: args.name,
            date: args.date,
            guest_count: args.guests,
            party_type: party_type_from_arg(args.party_type),
            duration: args.duration,
            theme: args.theme,
            notes: args.notes,
        })
        .await?;
    println!("Created party ID: {}: {}", party.id, party.name);
    if args.select || context.session.current_party_id.is_none() {
        context.session.select(party.id);
        println!("Selected party ID: {}", party.id);
    }
    Ok(())
}

async fn handle_party_update(parties: &mut PartyList<'_>, args: PartyUpdate) -> Result<(), AppError> {
    let party = parties
        .update(
            args.id,
            PartyChanges {
                name: args.name,
                date: args.date,
                guest_count: args.guests,
                party_type: args.party_type.map(party_type_from_arg),
                duration: args.duration,
                theme: args.theme,
                notes: args.notes,
            },
        )
        .await?;
    println!("Updated party ID: {}: {}", party.id, party.name);
    Ok(())
}

async fn handle_guest(context: &mut Context<'_>, command: GuestCommand) -> Result<(), AppError> {
    let mut guests = GuestList::new(context.db, context.party_id()?);
    match command {
        GuestCommand::Add(args) => handle_guest_add(&mut guests, args).await,
        GuestCommand::List => {
            let list = guests.load().await?;
            if list.is_empty() {
                println!("No guests.");
            }
            for guest in list {
                println!("{}", format_guest_line(guest));
            }
            Ok(())
        }
        GuestCommand::Update(args) => handle_guest_update(&mut guests, args).await,
        GuestCommand::Rsvp(GuestRsvp { id, rsvp }) => {
            let guest = guests.set_rsvp(id, rsvp_from_arg(rsvp)).await?;
            println!("Updated guest ID: {}: {} [{}]", guest.id, guest.name, guest.rsvp);
            Ok(())
        }
        GuestCommand::Remove(args) => {
            guests.delete(args.id).await?;
            println!("Deleted guest ID: {}", args.id);
            Ok(())
        }
        GuestCommand::Stats => {
            guests.load().await?;
            println!("{}", format_guest_stats(&guests.stats()));
            Ok(())
        }
    }
}

async fn handle_guest_add(guests: &mut GuestList<'_>, args: GuestAdd) -> Result<(), AppError> {
    let guest = guests
        .add(GuestInput {
            name: args.name,
            email: args.email,
            rsvp: rsvp_from_arg(args.rsvp),
            dietary_restrictions: args.dietary,
            additional_guests: args.additional,
            notes: args.notes,
        })
        .await?;
    println!("Created guest ID: {}: {}", guest.id, guest.name);
    Ok(())
}

async fn handle_guest_update(guests: &mut GuestList<'_>, args: GuestUpdate) -> Result<(), AppError> {
    let guest = guests
        .update(
            args.id,
            GuestChanges {
                name: args.name,
                email: args.email,
                rsvp: args.rsvp.map(rsvp_from_arg),
                dietary_restrictions: args.dietary,
                additional_guests: args.additional,
                notes: args.notes,
            },
        )
        .await?;
    println!("Updated guest ID: {}: {}", guest.id, guest.name);
    Ok(())
}

async fn handle_timeline(context: &mut Context<'_>, command: TimelineCommand) -> Result<(), AppError> {
    let mut timeline = TimelineTaskList::new(context.db, context.party_id()?);
    match command {
        TimelineCommand::Add(TimelineAdd {
            task,
            frame,
            category,
        }) => {
            let task = timeline
                .add(TimelineTaskInput {
                    task,
                    time_frame: frame,
                    category: task_category_from_arg(category),
                })
                .await?;
            println!("Created timeline task ID: {}: {}", task.id, task.task);
            Ok(())
        }
        TimelineCommand::List => {
            timeline.load().await?;
            println!("{}", format_timeline(&timeline.by_time_frame()));
            println!();
            println!("{}", format_completion(&timeline.completion()));
            Ok(())
        }
        TimelineCommand::Update(TimelineUpdate {
            id,
            task,
            frame,
            category,
            completed,
        }) => {
            let task = timeline
                .update(
                    id,
                    TimelineTaskChanges {
                        task,
                        time_frame: frame,
                        category: category.map(task_category_from_arg),
                        completed,
                    },
                )
                .await?;
            println!("Updated timeline task ID: {}: {}", task.id, task.task);
            Ok(())
        }
        TimelineCommand::Toggle(args) => {
            let task = timeline.toggle(args.id).await?;
            let state = if task.completed { "done" } else { "open" };
            println!("Timeline task ID: {} is {state}", task.id);
            Ok(())
        }
        TimelineCommand::Remove(args) => {
            timeline.delete(args.id).await?;
            println!("Deleted timeline task ID: {}", args.id);
            Ok(())
        }
        TimelineCommand::Progress => {
            timeline.load().await?;
            println!("{}", format_completion(&timeline.completion()));
            Ok(())
        }
    }
}

async fn handle_todo(context: &mut Context<'_>, command: TodoCommand) -> Result<(), AppError> {
    let mut todos = TodoList::new(context.db, context.party_id()?);
    match command {
        TodoCommand::Add(args) => handle_todo_add(&mut todos, args).await,
        TodoCommand::List => {
            let list = todos.load().await?;
            if list.is_empty() {
                println!("No todos.");
            }
            for detail in list {
                println!("{}", format_todo_line(detail));
            }
            Ok(())
        }
        TodoCommand::Show(args) => {
            todos.load().await?;
            let detail = todos
                .find(args.id)
                .ok_or_else(|| AppError::NotFound(format!("todo id {}", args.id)))?;
            println!("{}", format_todo_detail(detail));
            Ok(())
        }
        TodoCommand::Update(args) => handle_todo_update(&mut todos, args).await,
        TodoCommand::Toggle(args) => {
            let todo = todos.toggle(args.id).await?;
            let state = if todo.completed { "done" } else { "open" };
            println!("Todo ID: {} is {state}", todo.id);
            Ok(())
        }
        TodoCommand::Remove(args) => {
            todos.delete(args.id).await?;
            println!("Deleted todo ID: {}", args.id);
            Ok(())
        }
        TodoCommand::SubtaskAdd(SubtaskAdd { todo_id, title }) => {
            let subtask = todos.add_subtask(todo_id, &title).await?;
            println!("Created subtask ID: {} for todo ID: {}", subtask.id, todo_id);
            Ok(())
        }
        TodoCommand::SubtaskUpdate(SubtaskUpdate {
            id,
            title,
            completed,
            order,
        }) => {
            let subtask = todos
                .update_subtask(
                    id,
                    SubTaskChanges {
                        title,
                        completed,
                        order_index: order,
                    },
                )
                .await?;
            println!("Updated subtask ID: {}: {}", subtask.id, subtask.title);
            Ok(())
        }
        TodoCommand::SubtaskRemove(args) => {
            todos.delete_subtask(args.id).await?;
            println!("Deleted subtask ID: {}", args.id);
            Ok(())
        }
        TodoCommand::Depend(args) => {
            todos.add_dependency(args.todo_id, args.depends_on).await?;
            println!("Todo ID: {} now waits on {}", args.todo_id, args.depends_on);
            Ok(())
        }
        TodoCommand::Undepend(args) => {
            todos.remove_dependency(args.todo_id, args.depends_on).await?;
            println!("Todo ID: {} no longer waits on {}", args.todo_id, args.depends_on);
            Ok(())
        }
        TodoCommand::Attach(TodoAttach {
            todo_id,
            name,
            url,
            kind,
        }) => {
            let attachment = todos
                .add_attachment(
                    todo_id,
                    AttachmentInput {
                        name,
                        kind: attachment_type_from_arg(kind),
                        url,
                    },
                )
                .await?;
            println!("Created attachment ID: {}: {}", attachment.id, attachment.name);
            Ok(())
        }
        TodoCommand::Detach(args) => {
            todos.delete_attachment(args.id).await?;
            println!("Deleted attachment ID: {}", args.id);
            Ok(())
        }
        TodoCommand::Templates => {
            println!("{}", format_todo_templates(&todos.templates().await?));
            Ok(())
        }
        TodoCommand::SaveTemplate(TodoSaveTemplate {
            name,
            party_type,
            guests,
        }) => {
            let template = todos.save_template(&name, party_type, guests).await?;
            println!(
                "Saved todo template ID: {}: {} ({} todos)",
                template.id,
                template.name,
                template.items.len()
            );
            Ok(())
        }
        TodoCommand::ApplyTemplate(TodoApplyTemplate {
            template,
            reference,
        }) => {
            let reference = reference
                .map(|value| parse_date("reference date", &value))
                .transpose()?;
            let added = todos.apply_template(&template, reference).await?;
            println!("Added {added} todos from template {template}");
            Ok(())
        }
        TodoCommand::Stats => {
            todos.load().await?;
            println!("{}", format_todo_stats(&todos.stats()));
            Ok(())
        }
    }
}

async fn handle_todo_add(todos: &mut TodoList<'_>, args: TodoAdd) -> Result<(), AppError> {
    let todo = todos
        .add(TodoInput {
            title: args.title,
            description: args.description,
            category: todo_category_from_arg(args.category),
            priority: todo_priority_from_arg(args.priority),
            due_date: args.due,
            estimated_time: args.minutes,
            completed: false,
            assigned_to: args.assigned,
            location: args.location,
            estimated_cost: args.estimated_cost,
            actual_cost: args.actual_cost,
            notes: args.notes,
        })
        .await?;
    println!("Created todo ID: {}: {}", todo.id, todo.title);
    Ok(())
}

async fn handle_todo_update(todos: &mut TodoList<'_>, args: TodoUpdate) -> Result<(), AppError> {
    let todo = todos
        .update(
            args.id,
            TodoChanges {
                title: args.title,
                description: args.description,
                category: args.category.map(todo_category_from_arg),
                priority: args.priority.map(todo_priority_from_arg),
                due_date: args.due,
                estimated_time: args.minutes,
                completed: args.completed,
                assigned_to: args.assigned,
                location: args.location,
                estimated_cost: args.estimated_cost,
                actual_cost: args.actual_cost,
                notes: args.notes,
            },
        )
        .await?;
    println!("Updated todo ID: {}: {}", todo.id, todo.title);
    Ok(())
}

async fn handle_itinerary(context: &mut Context<'_>, command: ItineraryCommand) -> Result<(), AppError> {
    let mut plan = ItineraryPlan::new(context.db, context.party_id()?);
    match command {
        ItineraryCommand::Add(args) => handle_itinerary_add(&mut plan, args).await,
        ItineraryCommand::List => {
            println!("{}", format_itinerary(plan.load().await?));
            Ok(())
        }
        ItineraryCommand::Update(args) => handle_itinerary_update(&mut plan, args).await,
        ItineraryCommand::Remove(args) => {
            plan.delete(args.id).await?;
            println!("Deleted itinerary item ID: {}", args.id);
            Ok(())
        }
        ItineraryCommand::Duplicate(args) => {
            let copy = plan.duplicate(args.id).await?;
            println!("Created itinerary item ID: {}: {}", copy.id, copy.title);
            Ok(())
        }
        ItineraryCommand::Reorder(args) => {
            plan.reorder(&args.ids).await?;
            println!("{}", format_itinerary(plan.items()));
            Ok(())
        }
        ItineraryCommand::Templates => {
            println!("{}", format_itinerary_templates(&plan.templates().await?));
            Ok(())
        }
        ItineraryCommand::SaveTemplate(ItinerarySaveTemplate {
            name,
            party_type,
            description,
        }) => {
            let template = plan.save_template(&name, party_type, description).await?;
            println!(
                "Saved itinerary template ID: {}: {} ({} slots)",
                template.id,
                template.name,
                template.slots.len()
            );
            Ok(())
        }
        ItineraryCommand::ApplyTemplate(ItineraryApplyTemplate { template, start }) => {
            let count = plan.apply_template(&template, start.as_deref()).await?;
            println!("Replaced itinerary with {count} items from template {template}");
            Ok(())
        }
    }
}

async fn handle_itinerary_add(plan: &mut ItineraryPlan<'_>, args: ItineraryAdd) -> Result<(), AppError> {
    let item = plan
        .add(ItineraryInput {
            description: args.description,
            location: args.location,
            responsible: args.responsible,
            preparations: args.preparations,
            notes: args.notes,
            ..ItineraryInput::new(
                args.start,
                args.end,
                args.title,
                itinerary_category_from_arg(args.category),
            )
        })
        .await?;
    println!("Created itinerary item ID: {}: {}", item.id, item.title);
    Ok(())
}

async fn handle_itinerary_update(
    plan: &mut ItineraryPlan<'_>,
    args: ItineraryUpdate,
) -> Result<(), AppError> {
    let preparations = if args.clear_preps {
        Some(Vec::new())
    } else {
        args.preparations
    };
    let item = plan
        .update(
            args.id,
            ItineraryChanges {
                start_time: args.start,
                end_time: args.end,
                title: args.title,
                description: args.description,
                category: args.category.map(itinerary_category_from_arg),
                location: args.location,
                responsible: args.responsible,
                preparations,
                notes: args.notes,
                completed: args.completed,
            },
        )
        .await?;
    println!("Updated itinerary item ID: {}: {}", item.id, item.title);
    Ok(())
}

async fn handle_calc(context: &mut Context<'_>, command: CalcCommand) -> Result<(), AppError> {
    let party_id = context.party_id()?;
    let mut log = CalculationLog::new(context.db, party_id);
    match command {
        CalcCommand::Pizza(CalcPizza { guests }) => {
            let guests = match guests {
                Some(guests) => guests,
                None => party_guest_count(context, party_id).await?,
            };
            let row = log.record_pizza(guests).await?;
            println!("{}", format_pizza_line(&row));
            Ok(())
        }
        CalcCommand::Beverages(args) => handle_calc_beverages(context, &mut log, party_id, args).await,
        CalcCommand::History => {
            log.load().await?;
            println!("Pizza:");
            if log.pizzas().is_empty() {
                println!("  (none)");
            }
            for row in log.pizzas() {
                println!("  {}", format_pizza_line(row));
            }
            println!("Beverages:");
            if log.beverages().is_empty() {
                println!("  (none)");
            }
            for row in log.beverages() {
                println!("  {}", format_beverage_line(row));
            }
            Ok(())
        }
        CalcCommand::RemovePizza(args) => {
            log.delete_pizza(args.id).await?;
            println!("Deleted pizza calculation ID: {}", args.id);
            Ok(())
        }
        CalcCommand::RemoveBeverage(args) => {
            log.delete_beverage(args.id).await?;
            println!("Deleted beverage calculation ID: {}", args.id);
            Ok(())
        }
    }
}

async fn party_guest_count(context: &Context<'_>, party_id: i64) -> Result<u32, AppError> {
    let party = PartyList::new(context.db).get(party_id).await?;
    u32::try_from(party.guest_count)
        .map_err(|_| AppError::InvalidInput(format!("guest count {} is negative", party.guest_count)))
}

async fn handle_calc_beverages(
    context: &Context<'_>,
    log: &mut CalculationLog<'_>,
    party_id: i64,
    args: CalcBeverages,
) -> Result<(), AppError> {
    let party = PartyList::new(context.db).get(party_id).await?;
    let guests = match args.guests {
        Some(guests) => guests,
        None => u32::try_from(party.guest_count).unwrap_or(0),
    };
    let hours = match args.hours {
        Some(hours) => hours,
        None => u32::try_from(party.duration).unwrap_or(0),
    };
    let party_type = match args.party_type {
        Some(arg) => party_type_from_arg(arg),
        None => PartyType::parse(&party.party_type).unwrap_or(PartyType::Mixed),
    };
    let row = log
        .record_beverages(guests, hours, party_type, args.alcohol)
        .await?;
    println!("{}", format_beverage_line(&row));
    Ok(())
}

async fn handle_data(context: &mut Context<'_>, command: DataCommand) -> Result<(), AppError> {
    match command {
        DataCommand::Export(DataExport { all, out }) => {
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            ensure_dir(&dir)?;
            let path = if all {
                transfer::export_all_to(context.db, &dir).await?
            } else {
                transfer::export_party_to(context.db, context.party_id()?, &dir).await?
            };
            println!("Exported to {}", path.display());
            Ok(())
        }
        DataCommand::Import(DataImport { path, json }) => {
            let result = match (path, json) {
                (_, Some(text)) => transfer::import_from_json(context.db, &text).await,
                (Some(path), None) => transfer::import_from_path(context.db, &path).await,
                (None, None) => {
                    return Err(AppError::InvalidInput(
                        "pass a file path or --json".to_string(),
                    ))
                }
            };
            if !result.success {
                return Err(AppError::ImportValidation(result.message));
            }
            println!("{}", format_import_result(&result));
            Ok(())
        }
    }
}

fn party_type_from_arg(arg: PartyTypeArg) -> PartyType {
    match arg {
        PartyTypeArg::Casual => PartyType::Casual,
        PartyTypeArg::Formal => PartyType::Formal,
        PartyTypeArg::Mixed => PartyType::Mixed,
    }
}

fn rsvp_from_arg(arg: RsvpArg) -> Rsvp {
    match arg {
        RsvpArg::Pending => Rsvp::Pending,
        RsvpArg::Yes => Rsvp::Yes,
        RsvpArg::No => Rsvp::No,
    }
}

fn task_category_from_arg(arg: TaskCategoryArg) -> TaskCategory {
    match arg {
        TaskCategoryArg::Planning => TaskCategory::Planning,
        TaskCategoryArg::Shopping => TaskCategory::Shopping,
        TaskCategoryArg::Preparation => TaskCategory::Preparation,
        TaskCategoryArg::Setup => TaskCategory::Setup,
        TaskCategoryArg::DayOf => TaskCategory::DayOf,
    }
}

fn todo_category_from_arg(arg: TodoCategoryArg) -> TodoCategory {
    match arg {
        TodoCategoryArg::Planning => TodoCategory::Planning,
        TodoCategoryArg::Shopping => TodoCategory::Shopping,
        TodoCategoryArg::Preparation => TodoCategory::Preparation,
        TodoCategoryArg::Coordination => TodoCategory::Coordination,
        TodoCategoryArg::Booking => TodoCategory::Booking,
    }
}

fn todo_priority_from_arg(arg: TodoPriorityArg) -> TodoPriority {
    match arg {
        TodoPriorityArg::Low => TodoPriority::Low,
        TodoPriorityArg::Medium => TodoPriority::Medium,
        TodoPriorityArg::High => TodoPriority::High,
        TodoPriorityArg::Critical => TodoPriority::Critical,
    }
}

fn itinerary_category_from_arg(arg: ItineraryCategoryArg) -> ItineraryCategory {
    match arg {
        ItineraryCategoryArg::Arrival => ItineraryCategory::Arrival,
        ItineraryCategoryArg::Activity => ItineraryCategory::Activity,
        ItineraryCategoryArg::Food => ItineraryCategory::Food,
        ItineraryCategoryArg::Entertainment => ItineraryCategory::Entertainment,
        ItineraryCategoryArg::Cleanup => ItineraryCategory::Cleanup,
    }
}

fn attachment_type_from_arg(arg: AttachmentTypeArg) -> AttachmentType {
    match arg {
        AttachmentTypeArg::Link => AttachmentType::Link,
        AttachmentTypeArg::Image => AttachmentType::Image,
        AttachmentTypeArg::Document => AttachmentType::Document,
    }
}
