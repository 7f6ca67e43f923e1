//! Named value patterns recognized during type inference.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A structured value format detectable from text alone.
///
/// Declaration order is significant: when two patterns score equally the
/// earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Email,
    Phone,
    Url,
    IpAddress,
    PostalCode,
    CreditCard,
    DateIso,
    DatetimeIso,
    Currency,
    DatetimeGlobal,
}

impl PatternKind {
    /// Every pattern in declaration order.
    pub const ALL: [PatternKind; 10] = [
        PatternKind::Email,
        PatternKind::Phone,
        PatternKind::Url,
        PatternKind::IpAddress,
        PatternKind::PostalCode,
        PatternKind::CreditCard,
        PatternKind::DateIso,
        PatternKind::DatetimeIso,
        PatternKind::Currency,
        PatternKind::DatetimeGlobal,
    ];

    /// Stable snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Email => "email",
            PatternKind::Phone => "phone",
            PatternKind::Url => "url",
            PatternKind::IpAddress => "ip_address",
            PatternKind::PostalCode => "postal_code",
            PatternKind::CreditCard => "credit_card",
            PatternKind::DateIso => "date_iso",
            PatternKind::DatetimeIso => "datetime_iso",
            PatternKind::Currency => "currency",
            PatternKind::DatetimeGlobal => "datetime_global",
        }
    }

    /// Look a pattern up by its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    fn source(&self) -> &'static str {
        match self {
            PatternKind::Email => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
            PatternKind::Phone => r"\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}",
            PatternKind::Url => r"https?://[^\s]+",
            PatternKind::IpAddress => r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}",
            PatternKind::PostalCode => r"\d{5}(-\d{4})?",
            PatternKind::CreditCard => r"\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}",
            PatternKind::DateIso => r"\d{4}-\d{2}-\d{2}",
            PatternKind::DatetimeIso => {
                r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?"
            }
            PatternKind::Currency => r"\$?[\d,]+\.?\d*",
            PatternKind::DatetimeGlobal => {
                r"\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}([ T]\d{1,2}:\d{2}(:\d{2})?)?"
            }
        }
    }

    /// Returns true if the whole of `text` matches this pattern.
    pub fn is_match(&self, text: &str) -> bool {
        PATTERN_REGEXES[*self as usize].is_match(text)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anchored regexes indexed by declaration order.
static PATTERN_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    PatternKind::ALL
        .iter()
        .map(|p| {
            Regex::new(&format!("^(?:{})$", p.source())).expect("built-in pattern is valid")
        })
        .collect()
});
