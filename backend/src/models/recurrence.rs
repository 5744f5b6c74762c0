use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::TemplateId;

/// How often a template repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Weekly,
    Monthly,
}

impl std::fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceType::Weekly => write!(f, "weekly"),
            RecurrenceType::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for RecurrenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown recurrence type: {}", s)),
        }
    }
}

/// Raw recurrence configuration as stored on an event template.
///
/// The optional fields mirror what a form submits; [`RecurrenceRule::pattern`]
/// decides which calendar pattern (if any) they describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub recurrence_type: RecurrenceType,
    /// Every N weeks or months. Zero behaves like one.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// 0 = Sunday .. 6 = Saturday
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// 1..=31
    #[serde(default)]
    pub day_of_month: Option<u8>,
    /// 1..=5, where 5 means "last"
    #[serde(default)]
    pub week_of_month: Option<u8>,
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
    #[serde(default = "default_max_attendees")]
    pub max_attendees: u32,
}

fn default_interval() -> u32 {
    1
}

fn default_max_attendees() -> u32 {
    1
}

/// Occurrence selector for the nth-weekday monthly pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekOfMonth {
    Nth(u8),
    Last,
}

impl WeekOfMonth {
    /// Map the stored 1..=5 encoding.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1..=4 => Some(Self::Nth(index)),
            5 => Some(Self::Last),
            _ => None,
        }
    }
}

/// A validated, unambiguous calendar pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePattern {
    Weekly {
        weekday: Weekday,
        interval: u32,
    },
    MonthlyFixedDay {
        day: u32,
        interval: u32,
    },
    MonthlyNthWeekday {
        week: WeekOfMonth,
        weekday: Weekday,
        interval: u32,
    },
}

impl RecurrenceRule {
    pub fn weekly(day_of_week: u8) -> Self {
        Self {
            recurrence_type: RecurrenceType::Weekly,
            interval: 1,
            day_of_week: Some(day_of_week),
            day_of_month: None,
            week_of_month: None,
            time_of_day: None,
            max_attendees: 1,
        }
    }

    pub fn monthly_on_day(day_of_month: u8) -> Self {
        Self {
            recurrence_type: RecurrenceType::Monthly,
            interval: 1,
            day_of_week: None,
            day_of_month: Some(day_of_month),
            week_of_month: None,
            time_of_day: None,
            max_attendees: 1,
        }
    }

    pub fn monthly_nth_weekday(week_of_month: u8, day_of_week: u8) -> Self {
        Self {
            recurrence_type: RecurrenceType::Monthly,
            interval: 1,
            day_of_week: Some(day_of_week),
            day_of_month: None,
            week_of_month: Some(week_of_month),
            time_of_day: None,
            max_attendees: 1,
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time_of_day = Some(time);
        self
    }

    pub fn with_max_attendees(mut self, max_attendees: u32) -> Self {
        self.max_attendees = max_attendees;
        self
    }

    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }

    /// Classify the rule, or `None` when it is incomplete or ambiguous.
    pub fn pattern(&self) -> Option<RecurrencePattern> {
        let interval = self.effective_interval();
        match self.recurrence_type {
            RecurrenceType::Weekly => {
                let weekday = self.day_of_week.and_then(weekday_from_index)?;
                Some(RecurrencePattern::Weekly { weekday, interval })
            }
            RecurrenceType::Monthly => match (self.day_of_month, self.week_of_month) {
                (None, Some(week)) => {
                    let week = WeekOfMonth::from_index(week)?;
                    let weekday = self.day_of_week.and_then(weekday_from_index)?;
                    Some(RecurrencePattern::MonthlyNthWeekday {
                        week,
                        weekday,
                        interval,
                    })
                }
                (Some(day), None) if (1..=31).contains(&day) => {
                    Some(RecurrencePattern::MonthlyFixedDay {
                        day: u32::from(day),
                        interval,
                    })
                }
                _ => None,
            },
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.pattern().is_some()
    }
}

/// 0 = Sunday, matching the stored encoding.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// A recurring event definition that owns a [`RecurrenceRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub id: Option<TemplateId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub rule: RecurrenceRule,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl EventTemplate {
    pub fn new(name: impl Into<String>, rule: RecurrenceRule) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            category: None,
            rule,
            active: true,
        }
    }
}
