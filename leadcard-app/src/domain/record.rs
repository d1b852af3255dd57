use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A lead record as handed to the card. Never mutated by the vote core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordFields {
    pub ticket_id: String,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub details: Option<String>,
    pub availability: Option<String>,
    pub cost_per_unit: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub resource_type: Option<String>,
    pub sub_resource_type: Option<String>,
    pub last_verified: Option<LastVerified>,
}

impl RecordFields {
    pub fn new(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_sub_resource_type(mut self, sub_resource_type: impl Into<String>) -> Self {
        self.sub_resource_type = Some(sub_resource_type.into());
        self
    }

    pub fn with_availability(mut self, availability: impl Into<String>) -> Self {
        self.availability = Some(availability.into());
        self
    }

    pub fn with_cost_per_unit(mut self, cost_per_unit: impl Into<String>) -> Self {
        self.cost_per_unit = Some(cost_per_unit.into());
        self
    }

    pub fn with_last_verified(mut self, last_verified: LastVerified) -> Self {
        self.last_verified = Some(last_verified);
        self
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(&self.phone)
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub fn details(&self) -> Option<&str> {
        non_empty(&self.details)
    }

    pub fn state(&self) -> Option<&str> {
        non_empty(&self.state)
    }

    pub fn city(&self) -> Option<&str> {
        non_empty(&self.city)
    }

    pub fn resource_type(&self) -> Option<&str> {
        non_empty(&self.resource_type)
    }

    pub fn sub_resource_type(&self) -> Option<&str> {
        non_empty(&self.sub_resource_type)
    }

    pub fn availability(&self) -> Option<&str> {
        non_empty(&self.availability)
    }

    pub fn cost_per_unit(&self) -> Option<&str> {
        non_empty(&self.cost_per_unit)
    }

    pub fn last_verified(&self) -> Option<&LastVerified> {
        self.last_verified.as_ref().filter(|v| v.is_present())
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Either epoch milliseconds or a date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastVerified {
    Millis(f64),
    Text(String),
}

impl LastVerified {
    fn is_present(&self) -> bool {
        match self {
            Self::Millis(ms) => *ms != 0.0 && !ms.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// Resolves the value to an instant, `None` when it cannot be read as a date.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => from_millis(*ms),
            Self::Text(s) => {
                let s = s.trim();
                match s.parse::<f64>() {
                    Ok(ms) => from_millis(ms),
                    Err(_) => parse_date_text(s),
                }
            }
        }
    }
}

fn from_millis(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms.trunc() as i64).single()
}

fn parse_date_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
