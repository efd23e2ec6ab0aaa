use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "partyplan",
    version,
    about = "Plan parties: guests, timelines, todos, itineraries and supply estimates"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Data directory (defaults to $PARTYPLAN_HOME, then ~/.partyplan)"
    )]
    pub data_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        value_name = "ID",
        help = "Party to act on instead of the selected one"
    )]
    pub party: Option<i64>,
    #[arg(long, short, global = true, help = "Log debug output to stderr")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Party(PartyCommand),
    #[command(subcommand)]
    Guest(GuestCommand),
    #[command(subcommand)]
    Timeline(TimelineCommand),
    #[command(subcommand)]
    Todo(TodoCommand),
    #[command(subcommand)]
    Itinerary(ItineraryCommand),
    #[command(subcommand)]
    Calc(CalcCommand),
    #[command(subcommand)]
    Data(DataCommand),
}

#[derive(Subcommand, Debug)]
pub enum PartyCommand {
    Add(PartyAdd),
    List,
    Show(PartyShow),
    Update(PartyUpdate),
    Remove(IdArg),
    Select(IdArg),
    #[command(name = "show-selected")]
    Selected,
    Deselect,
}

#[derive(Subcommand, Debug)]
pub enum GuestCommand {
    Add(GuestAdd),
    List,
    Update(GuestUpdate),
    Rsvp(GuestRsvp),
    Remove(IdArg),
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    Add(TimelineAdd),
    List,
    Update(TimelineUpdate),
    Toggle(IdArg),
    Remove(IdArg),
    Progress,
}

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    Add(TodoAdd),
    List,
    Show(IdArg),
    Update(TodoUpdate),
    Toggle(IdArg),
    Remove(IdArg),
    #[command(name = "subtask-add")]
    SubtaskAdd(SubtaskAdd),
    #[command(name = "subtask-update")]
    SubtaskUpdate(SubtaskUpdate),
    #[command(name = "subtask-remove")]
    SubtaskRemove(IdArg),
    Depend(TodoDepend),
    Undepend(TodoDepend),
    Attach(TodoAttach),
    Detach(IdArg),
    Templates,
    #[command(name = "save-template")]
    SaveTemplate(TodoSaveTemplate),
    #[command(name = "apply-template")]
    ApplyTemplate(TodoApplyTemplate),
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ItineraryCommand {
    Add(ItineraryAdd),
    List,
    Update(ItineraryUpdate),
    Remove(IdArg),
    Duplicate(IdArg),
    Reorder(ItineraryReorder),
    Templates,
    #[command(name = "save-template")]
    SaveTemplate(ItinerarySaveTemplate),
    #[command(name = "apply-template")]
    ApplyTemplate(ItineraryApplyTemplate),
}

#[derive(Subcommand, Debug)]
pub enum CalcCommand {
    Pizza(CalcPizza),
    Beverages(CalcBeverages),
    History,
    #[command(name = "remove-pizza")]
    RemovePizza(IdArg),
    #[command(name = "remove-beverage")]
    RemoveBeverage(IdArg),
}

#[derive(Subcommand, Debug)]
pub enum DataCommand {
    Export(DataExport),
    Import(DataImport),
}

#[derive(Args, Debug)]
pub struct IdArg {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct PartyAdd {
    pub name: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub guests: i32,
    #[arg(long = "type", value_enum, default_value = "mixed")]
    pub party_type: PartyTypeArg,
    #[arg(long, value_name = "HOURS", default_value_t = 3)]
    pub duration: i32,
    #[arg(long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, help = "Make the new party the selected one")]
    pub select: bool,
}

#[derive(Args, Debug)]
pub struct PartyShow {
    #[arg(help = "Defaults to the selected party")]
    pub id: Option<i64>,
}

#[derive(Args, Debug)]
pub struct PartyUpdate {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, value_name = "YYYY-MM-DD", help = "Pass an empty value to clear")]
    pub date: Option<String>,
    #[arg(long)]
    pub guests: Option<i32>,
    #[arg(long = "type", value_enum)]
    pub party_type: Option<PartyTypeArg>,
    #[arg(long, value_name = "HOURS")]
    pub duration: Option<i32>,
    #[arg(long)]
    pub theme: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct GuestAdd {
    pub name: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_enum, default_value = "pending")]
    pub rsvp: RsvpArg,
    #[arg(long)]
    pub dietary: Option<String>,
    #[arg(long, value_name = "COUNT", default_value_t = 0)]
    pub additional: i32,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct GuestUpdate {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_enum)]
    pub rsvp: Option<RsvpArg>,
    #[arg(long)]
    pub dietary: Option<String>,
    #[arg(long, value_name = "COUNT")]
    pub additional: Option<i32>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct GuestRsvp {
    pub id: i64,
    #[arg(value_enum)]
    pub rsvp: RsvpArg,
}

#[derive(Args, Debug)]
pub struct TimelineAdd {
    pub task: String,
    #[arg(long, value_name = "TEXT", help = "e.g. \"1 week before\"; free text is allowed")]
    pub frame: String,
    #[arg(long, value_enum, default_value = "planning")]
    pub category: TaskCategoryArg,
}

#[derive(Args, Debug)]
pub struct TimelineUpdate {
    pub id: i64,
    #[arg(long)]
    pub task: Option<String>,
    #[arg(long, value_name = "TEXT")]
    pub frame: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<TaskCategoryArg>,
    #[arg(long, value_name = "BOOL")]
    pub completed: Option<bool>,
}

#[derive(Args, Debug)]
pub struct TodoAdd {
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum, default_value = "planning")]
    pub category: TodoCategoryArg,
    #[arg(long, value_enum, default_value = "medium")]
    pub priority: TodoPriorityArg,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due: Option<String>,
    #[arg(long, value_name = "MINUTES")]
    pub minutes: Option<i32>,
    #[arg(long)]
    pub assigned: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_name = "AMOUNT")]
    pub estimated_cost: Option<f64>,
    #[arg(long, value_name = "AMOUNT")]
    pub actual_cost: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct TodoUpdate {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<TodoCategoryArg>,
    #[arg(long, value_enum)]
    pub priority: Option<TodoPriorityArg>,
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub due: Option<String>,
    #[arg(long, value_name = "MINUTES")]
    pub minutes: Option<i32>,
    #[arg(long, value_name = "BOOL")]
    pub completed: Option<bool>,
    #[arg(long)]
    pub assigned: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, value_name = "AMOUNT")]
    pub estimated_cost: Option<f64>,
    #[arg(long, value_name = "AMOUNT")]
    pub actual_cost: Option<f64>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct SubtaskAdd {
    pub todo_id: i64,
    pub title: String,
}

#[derive(Args, Debug)]
pub struct SubtaskUpdate {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub completed: Option<bool>,
    #[arg(long, value_name = "INDEX")]
    pub order: Option<i32>,
}

#[derive(Args, Debug)]
pub struct TodoDepend {
    pub todo_id: i64,
    #[arg(help = "The todo that must be finished first")]
    pub depends_on: i64,
}

#[derive(Args, Debug)]
pub struct TodoAttach {
    pub todo_id: i64,
    pub name: String,
    pub url: String,
    #[arg(long = "type", value_enum, default_value = "link")]
    pub kind: AttachmentTypeArg,
}

#[derive(Args, Debug)]
pub struct TodoSaveTemplate {
    pub name: String,
    #[arg(long)]
    pub party_type: Option<String>,
    #[arg(long, value_name = "RANGE", help = "e.g. 10-30")]
    pub guests: Option<String>,
}

#[derive(Args, Debug)]
pub struct TodoApplyTemplate {
    pub template: String,
    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        help = "Date due dates count back from (defaults to the party date, then today)"
    )]
    pub reference: Option<String>,
}

#[derive(Args, Debug)]
pub struct ItineraryAdd {
    #[arg(value_name = "START")]
    pub start: String,
    #[arg(value_name = "END")]
    pub end: String,
    pub title: String,
    #[arg(long, value_enum, default_value = "activity")]
    pub category: ItineraryCategoryArg,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub responsible: Option<String>,
    #[arg(long = "prep", value_name = "TEXT")]
    pub preparations: Vec<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct ItineraryUpdate {
    pub id: i64,
    #[arg(long, value_name = "HH:MM")]
    pub start: Option<String>,
    #[arg(long, value_name = "HH:MM")]
    pub end: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<ItineraryCategoryArg>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub responsible: Option<String>,
    #[arg(long = "prep", value_name = "TEXT", help = "Replaces the whole list")]
    pub preparations: Option<Vec<String>>,
    #[arg(long, help = "Remove every preparation", conflicts_with = "preparations")]
    pub clear_preps: bool,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub completed: Option<bool>,
}

#[derive(Args, Debug)]
pub struct ItineraryReorder {
    #[arg(required = true, num_args = 1.., value_name = "ID")]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct ItinerarySaveTemplate {
    pub name: String,
    #[arg(long)]
    pub party_type: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ItineraryApplyTemplate {
    pub template: String,
    #[arg(long, value_name = "HH:MM", help = "Shift every slot to start from this time")]
    pub start: Option<String>,
}

#[derive(Args, Debug)]
pub struct CalcPizza {
    #[arg(help = "Defaults to the party's guest count")]
    pub guests: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CalcBeverages {
    #[arg(help = "Defaults to the party's guest count")]
    pub guests: Option<u32>,
    #[arg(long, value_name = "HOURS", help = "Defaults to the party's duration")]
    pub hours: Option<u32>,
    #[arg(long = "type", value_enum, help = "Defaults to the party's type")]
    pub party_type: Option<PartyTypeArg>,
    #[arg(long)]
    pub alcohol: bool,
}

#[derive(Args, Debug)]
pub struct DataExport {
    #[arg(long, help = "Back up every party instead of the selected one")]
    pub all: bool,
    #[arg(long, value_name = "DIR", help = "Defaults to the current directory")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DataImport {
    #[arg(value_name = "FILE", required_unless_present = "json")]
    pub path: Option<PathBuf>,
    #[arg(long, value_name = "TEXT", conflicts_with = "path")]
    pub json: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PartyTypeArg {
    Casual,
    Formal,
    Mixed,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RsvpArg {
    Pending,
    Yes,
    No,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TaskCategoryArg {
    Planning,
    Shopping,
    Preparation,
    Setup,
    DayOf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TodoCategoryArg {
    Planning,
    Shopping,
    Preparation,
    Coordination,
    Booking,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TodoPriorityArg {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ItineraryCategoryArg {
    Arrival,
    Activity,
    Food,
    Entertainment,
    Cleanup,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum AttachmentTypeArg {
    Link,
    Image,
    Document,
}
