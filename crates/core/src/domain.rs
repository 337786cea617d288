use chrono::{SecondsFormat, Utc};

pub const BOT_NAME: &str = "Retrospective Bot";

/// Every keyword the command parser recognizes. Item text colliding with one
/// of these (case-folded) is rejected before it reaches the store.
pub const ALL_COMMAND_KEYWORDS: [&str; 7] = ["good", "bad", "try", "new", "list", "help", "?"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Good,
    Bad,
    Try,
}

impl Category {
    /// Case-folded parse, for matching command keywords and slash aliases.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_stored(raw.trim().to_ascii_lowercase().as_str())
    }

    /// Exact match on the lower-case value the store holds.
    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw {
            "good" => Some(Self::Good),
            "bad" => Some(Self::Bad),
            "try" => Some(Self::Try),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Try => "try",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Bad => "Bad",
            Self::Try => "Try",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "danger",
            Self::Try => "warning",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A retrospective item as read back from the store. The category stays a
/// plain string here: well-formed data only ever holds the three known
/// values, but presentation code must cope with whatever the store returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetroItem {
    pub category: String,
    pub object: String,
    pub creator: String,
    pub created_at: Option<String>,
    pub reviewed_at: Option<String>,
}

pub fn is_reserved_term(text: &str) -> bool {
    let folded = text.trim().to_ascii_lowercase();
    ALL_COMMAND_KEYWORDS.contains(&folded.as_str())
}

/// First character upper-cased, everything after it lower-cased, so repeated
/// submissions of the same text in different casings collapse to one stored
/// object value.
pub fn capitalize_object(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

/// Current UTC time, ISO-8601 at millisecond precision with a literal `Z`,
/// the format the store's timestamp columns expect.
pub fn utc_timestamp_millis() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
