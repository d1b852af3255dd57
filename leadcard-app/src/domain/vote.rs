use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status string the ticket service returns for an accepted vote.
pub const VOTE_SUCCESS_STATUS: &str = "200";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteState {
    pub count: i64,
    pub direction: VoteDirection,
}

impl VoteState {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            direction: VoteDirection::None,
        }
    }

    /// Folds an acknowledged vote into the current state.
    pub fn acknowledge(self, direction: VoteDirection) -> Self {
        let count = match direction {
            VoteDirection::Up => self.count.saturating_add(1),
            VoteDirection::Down => self.count.saturating_sub(1),
            VoteDirection::None => self.count,
        };
        Self { count, direction }
    }

    /// Count for the up indicator, only when strictly positive.
    pub fn up_badge(&self) -> Option<i64> {
        (self.count > 0).then_some(self.count)
    }

    /// Count for the down indicator, only when strictly negative.
    pub fn down_badge(&self) -> Option<i64> {
        (self.count < 0).then_some(self.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionFlags {
    pub can_upvote: bool,
    pub can_downvote: bool,
}

impl Default for PermissionFlags {
    fn default() -> Self {
        Self {
            can_upvote: true,
            can_downvote: true,
        }
    }
}

impl PermissionFlags {
    pub fn allows(&self, direction: VoteDirection) -> bool {
        match direction {
            VoteDirection::Up => self.can_upvote,
            VoteDirection::Down => self.can_downvote,
            VoteDirection::None => false,
        }
    }

    /// Flags after a vote in `direction` has been acknowledged.
    pub fn after(self, direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Self {
                can_upvote: false,
                can_downvote: true,
            },
            VoteDirection::Down => Self {
                can_upvote: true,
                can_downvote: false,
            },
            VoteDirection::None => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotePhase {
    Neutral,
    Upvoted,
    Downvoted,
}

impl From<PermissionFlags> for VotePhase {
    fn from(flags: PermissionFlags) -> Self {
        match (flags.can_upvote, flags.can_downvote) {
            (false, true) => Self::Upvoted,
            (true, false) => Self::Downvoted,
            _ => Self::Neutral,
        }
    }
}

/// Payload of `upvoteTicket` / `downvoteTicket`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteAck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl VoteAck {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == VOTE_SUCCESS_STATUS
    }
}

/// Normalizes the externally supplied starting count.
///
/// Numbers are truncated toward zero. A string must first read as a number
/// (decimal, exponent, or an unsigned `0x`/`0o`/`0b` literal); its count is
/// then the leading integer, so `"1e3"` is 1, `"4.5"` is 4 and `"0x10"` is 16.
/// Anything else (missing, blank, non-numeric, no leading digits) becomes 0.
pub fn parse_initial_count(input: Option<&Value>) -> i64 {
    match input {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_finite))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_count_str(s),
        _ => 0,
    }
}

fn parse_count_str(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if !is_numeric_literal(trimmed) {
        return 0;
    }
    leading_integer(trimmed).unwrap_or(0)
}

fn is_numeric_literal(s: &str) -> bool {
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    let unsigned = s.strip_prefix(&['+', '-'][..]).unwrap_or(s);
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') && s.parse::<f64>().is_ok()
}

/// Integer at the start of `s`, with an optional sign and `0x` prefix.
/// Saturates instead of overflowing.
fn leading_integer(s: &str) -> Option<i64> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }

    let mut value: i64 = 0;
    for c in digits.chars() {
        let digit = i64::from(c.to_digit(radix)?);
        value = value.saturating_mul(i64::from(radix)).saturating_add(digit);
    }
    Some(if negative { value.saturating_neg() } else { value })
}

fn truncate_finite(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}
