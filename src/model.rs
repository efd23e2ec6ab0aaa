use std::fmt;

use chrono::NaiveDate;

use crate::error::AppError;

/// Declares an enum persisted as a fixed set of text values.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|item| item.as_str().eq_ignore_ascii_case(value))
            }

            pub fn from_input(label: &str, value: &str) -> Result<Self, AppError> {
                Self::parse(value).ok_or_else(|| {
                    let allowed: Vec<&str> = Self::ALL.iter().map(|item| item.as_str()).collect();
                    AppError::InvalidInput(format!(
                        "{label} must be one of: {} (got '{}')",
                        allowed.join(", "),
                        value.trim()
                    ))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(PartyType {
    Casual => "casual",
    Formal => "formal",
    Mixed => "mixed",
});

text_enum!(Rsvp {
    Pending => "pending",
    Yes => "yes",
    No => "no",
});

text_enum!(TaskCategory {
    Planning => "planning",
    Shopping => "shopping",
    Preparation => "preparation",
    Setup => "setup",
    DayOf => "day-of",
});

text_enum!(
    /// Timeline buckets, declared from furthest out to the day itself.
    TimeFrame {
        FourToSixWeeks => "4-6 weeks before",
        TwoToThreeWeeks => "2-3 weeks before",
        OneWeek => "1 week before",
        TwoToThreeDays => "2-3 days before",
        DayBefore => "Day before",
        DayOf => "Day of party",
    }
);

impl TimeFrame {
    pub fn rank(&self) -> usize {
        Self::ALL
            .iter()
            .position(|frame| frame == self)
            .unwrap_or(Self::ALL.len())
    }

    /// Sort key for a stored bucket label; custom labels sort after the known ones.
    pub fn rank_of(label: &str) -> usize {
        Self::parse(label)
            .map(|frame| frame.rank())
            .unwrap_or(Self::ALL.len())
    }
}

text_enum!(ItineraryCategory {
    Arrival => "arrival",
    Activity => "activity",
    Food => "food",
    Entertainment => "entertainment",
    Cleanup => "cleanup",
});

text_enum!(TodoCategory {
    Planning => "planning",
    Shopping => "shopping",
    Preparation => "preparation",
    Coordination => "coordination",
    Booking => "booking",
});

text_enum!(TodoPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

impl TodoPriority {
    pub fn rank(&self) -> i32 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }
}

text_enum!(AttachmentType {
    Link => "link",
    Image => "image",
    Document => "document",
});

#[derive(Clone, Debug)]
pub struct PartyInput {
    pub name: String,
    pub date: Option<String>,
    pub guest_count: i32,
    pub party_type: PartyType,
    pub duration: i32,
    pub theme: Option<String>,
    pub notes: Option<String>,
}

impl PartyInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
            guest_count: 0,
            party_type: PartyType::Mixed,
            duration: 3,
            theme: None,
            notes: None,
        }
    }
}

/// Optional text fields in the `*Changes` structs clear the column when set to an
/// empty string.
#[derive(Clone, Debug, Default)]
pub struct PartyChanges {
    pub name: Option<String>,
    pub date: Option<String>,
    pub guest_count: Option<i32>,
    pub party_type: Option<PartyType>,
    pub duration: Option<i32>,
    pub theme: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GuestInput {
    pub name: String,
    pub email: Option<String>,
    pub rsvp: Rsvp,
    pub dietary_restrictions: Option<String>,
    pub additional_guests: i32,
    pub notes: Option<String>,
}

impl GuestInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            rsvp: Rsvp::Pending,
            dietary_restrictions: None,
            additional_guests: 0,
            notes: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GuestChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub rsvp: Option<Rsvp>,
    pub dietary_restrictions: Option<String>,
    pub additional_guests: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TimelineTaskInput {
    pub task: String,
    pub time_frame: String,
    pub category: TaskCategory,
}

#[derive(Clone, Debug, Default)]
pub struct TimelineTaskChanges {
    pub task: Option<String>,
    pub time_frame: Option<String>,
    pub category: Option<TaskCategory>,
    pub completed: Option<bool>,
}

#[derive(Clone, Debug)]
pub struct TodoInput {
    pub title: String,
    pub description: Option<String>,
    pub category: TodoCategory,
    pub priority: TodoPriority,
    pub due_date: Option<String>,
    pub estimated_time: Option<i32>,
    pub completed: bool,
    pub assigned_to: Option<String>,
    pub location: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub notes: Option<String>,
}

impl TodoInput {
    pub fn new(title: impl Into<String>, category: TodoCategory) -> Self {
        Self {
            title: title.into(),
            description: None,
            category,
            priority: TodoPriority::Medium,
            due_date: None,
            estimated_time: None,
            completed: false,
            assigned_to: None,
            location: None,
            estimated_cost: None,
            actual_cost: None,
            notes: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<TodoCategory>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<String>,
    pub estimated_time: Option<i32>,
    pub completed: Option<bool>,
    pub assigned_to: Option<String>,
    pub location: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub notes: Option<String>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.estimated_time.is_none()
            && self.completed.is_none()
            && self.assigned_to.is_none()
            && self.location.is_none()
            && self.estimated_cost.is_none()
            && self.actual_cost.is_none()
            && self.notes.is_none()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SubTaskChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub order_index: Option<i32>,
}

#[derive(Clone, Debug)]
pub struct AttachmentInput {
    pub name: String,
    pub kind: AttachmentType,
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct ItineraryInput {
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    pub description: Option<String>,
    pub category: ItineraryCategory,
    pub location: Option<String>,
    pub responsible: Option<String>,
    pub preparations: Vec<String>,
    pub notes: Option<String>,
    pub completed: bool,
}

impl ItineraryInput {
    pub fn new(
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        title: impl Into<String>,
        category: ItineraryCategory,
    ) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
            title: title.into(),
            description: None,
            category,
            location: None,
            responsible: None,
            preparations: Vec::new(),
            notes: None,
            completed: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ItineraryChanges {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<ItineraryCategory>,
    pub location: Option<String>,
    pub responsible: Option<String>,
    pub preparations: Option<Vec<String>>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

pub fn ensure_non_empty(label: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{label} cannot be empty")));
    }
    Ok(())
}

pub fn ensure_non_negative(label: &str, value: i32) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::InvalidInput(format!(
            "{label} cannot be negative (got {value})"
        )));
    }
    Ok(())
}

pub fn parse_date(label: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!(
            "{label} must be a YYYY-MM-DD date (got '{}')",
            value.trim()
        ))
    })
}

/// Parses `HH:MM` into minutes since midnight. Hours run from 0 to 23.
pub fn parse_clock(label: &str, value: &str) -> Result<u32, AppError> {
    let (hours, minutes) = split_clock(label, value)?;
    if hours > 23 {
        return Err(clock_error(label, value));
    }
    Ok(hours * 60 + minutes)
}

/// Parses an `HH:MM` template offset. Hours are not capped, so a slot may run past
/// midnight.
pub fn parse_offset(label: &str, value: &str) -> Result<u32, AppError> {
    let (hours, minutes) = split_clock(label, value)?;
    hours
        .checked_mul(60)
        .and_then(|total| total.checked_add(minutes))
        .ok_or_else(|| clock_error(label, value))
}

fn clock_error(label: &str, value: &str) -> AppError {
    AppError::InvalidInput(format!(
        "{label} must be an HH:MM time (got '{}')",
        value.trim()
    ))
}

fn split_clock(label: &str, value: &str) -> Result<(u32, u32), AppError> {
    let invalid = || clock_error(label, value);
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |text: &str| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    if !digits(hours) || !digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    Ok((hours, minutes))
}

pub fn format_clock(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Trims text and maps blank values to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enums_parse_case_insensitively() {
        assert_eq!(PartyType::parse(" Formal "), Some(PartyType::Formal));
        assert_eq!(TaskCategory::parse("day-of"), Some(TaskCategory::DayOf));
        assert_eq!(TimeFrame::parse("day before"), Some(TimeFrame::DayBefore));
        assert_eq!(Rsvp::parse("maybe"), None);
    }

    #[test]
    fn from_input_lists_allowed_values() {
        let err = TodoPriority::from_input("priority", "urgent").expect_err("invalid");
        let message = err.to_string();
        assert!(message.contains("low, medium, high, critical"), "{message}");
        assert!(message.contains("urgent"), "{message}");
    }

    #[test]
    fn custom_time_frames_rank_last() {
        assert_eq!(TimeFrame::rank_of("4-6 weeks before"), 0);
        assert_eq!(TimeFrame::rank_of("Day of party"), 5);
        assert_eq!(TimeFrame::rank_of("whenever"), TimeFrame::ALL.len());
    }

    #[test]
    fn clock_parsing_accepts_hh_mm_only() {
        assert_eq!(parse_clock("start", "00:30").expect("clock"), 30);
        assert_eq!(parse_clock("start", "18:05").expect("clock"), 1085);
        assert!(parse_clock("start", "18:5").is_err());
        assert!(parse_clock("start", "18:75").is_err());
        assert!(parse_clock("start", "noon").is_err());
        assert!(parse_clock("start", "24:00").is_err());
        assert!(parse_clock("start", "99:00").is_err());
        assert!(parse_clock("start", "99999999:00").is_err());
        assert!(parse_clock("start", "+12:00").is_err());
        assert!(parse_clock("start", "12:+5").is_err());
        assert_eq!(parse_offset("slot", "25:30").expect("offset"), 25 * 60 + 30);
        assert!(parse_offset("slot", "99999999999:00").is_err());
        assert!(parse_offset("slot", "+1:00").is_err());
        assert_eq!(format_clock(1085), "18:05");
        assert_eq!(format_clock(25 * 60 + 30), "25:30");
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(
            optional_text(Some(" Tacos ".to_string())).as_deref(),
            Some("Tacos")
        );
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn dates_must_be_iso_days() {
        assert!(parse_date("date", "2025-07-04").is_ok());
        assert!(parse_date("date", "07/04/2025").is_err());
    }
}
