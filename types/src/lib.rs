//! Core domain value types for GroFlow.
//!
//! Pure types with no IO and no async: identifiers, currency, the API
//! credential and the dashboard's view enumeration. Every other crate in the
//! workspace builds on these.

mod display;
mod ids;
mod money;

pub use display::sanitize_display_text;
pub use ids::{CampaignId, InvestmentId};
pub use money::{Money, MoneyParseError, TrustPoints};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming). Stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyStringError)
        } else if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Gemini API key held in memory for the session.
///
/// `Debug` is redacted so the key can't leak through logs or error output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API key must not be empty")]
pub struct EmptyApiKeyError;

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self, EmptyApiKeyError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(EmptyApiKeyError);
        }
        Ok(Self(key))
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Short masked form for display, e.g. `AIza…x9Q2`.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "•".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

// ============================================================================
// Views
// ============================================================================

/// The screen currently selected in the dashboard.
///
/// Switching views is plain assignment: there are no guards, no history and
/// no entry or exit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Home,
    Assistant,
    Roadmap,
    Tracker,
    Marketplace,
    Investor,
    Settings,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Assistant,
        View::Roadmap,
        View::Tracker,
        View::Marketplace,
        View::Investor,
        View::Settings,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Assistant => "AI Assistant",
            View::Roadmap => "Monthly Roadmap",
            View::Tracker => "Adaptive Tracker",
            View::Marketplace => "Fundraising",
            View::Investor => "Investor",
            View::Settings => "Settings",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    /// View for a 1-based navigation hotkey.
    #[must_use]
    pub fn from_hotkey(key: char) -> Option<View> {
        let n = key.to_digit(10)? as usize;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    #[must_use]
    pub fn next(self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}
