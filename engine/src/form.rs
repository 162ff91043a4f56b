//! Input forms and their validation.
//!
//! A [`Form`] is an ordered list of labelled [`DraftInput`] fields with one
//! focused field. Parsing helpers turn raw field text into typed values and
//! report problems as [`FormError`] so they can be shown as notices.

use std::num::NonZeroU64;

use thiserror::Error;

use groflow_types::{Money, MoneyParseError};

use crate::DraftInput;

/// Every form the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormId {
    /// Business profile shared by the assistant and the roadmap.
    Plan,
    NewTask,
    Setback,
    Campaign,
    Invest,
    Liquidity,
    Credential,
}

impl FormId {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            FormId::Plan => "Business profile",
            FormId::NewTask => "Add task",
            FormId::Setback => "What got in the way?",
            FormId::Campaign => "Post a campaign",
            FormId::Invest => "Invest in selected campaign",
            FormId::Liquidity => "Add liquidity",
            FormId::Credential => "Gemini API key",
        }
    }

    const fn fields(self) -> &'static [&'static str] {
        match self {
            FormId::Plan => &["Business type", "Budget", "Hours per week", "Goal"],
            FormId::NewTask => &["Task"],
            FormId::Setback => &["Setback"],
            FormId::Campaign => &[
                "Business name",
                "Owner",
                "Description",
                "Goal (points)",
                "Image",
            ],
            FormId::Invest | FormId::Liquidity => &["Amount"],
            FormId::Credential => &["API key"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field}: '{value}' is not a whole number")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: u64,
        max: u64,
    },
    #[error("{field}: {source}")]
    Amount {
        field: &'static str,
        #[source]
        source: MoneyParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub label: &'static str,
    pub input: DraftInput,
    /// Render as bullets instead of the typed text.
    pub masked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    id: FormId,
    fields: Vec<FormField>,
    focus: usize,
}

impl Form {
    #[must_use]
    pub fn new(id: FormId) -> Self {
        let fields = id
            .fields()
            .iter()
            .map(|&label| FormField {
                label,
                input: DraftInput::default(),
                masked: id == FormId::Credential,
            })
            .collect();
        Self {
            id,
            fields,
            focus: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> FormId {
        self.id
    }

    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    pub fn focused_input_mut(&mut self) -> &mut DraftInput {
        &mut self.fields[self.focus].input
    }

    #[must_use]
    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map_or("", |field| field.input.text().trim())
    }

    /// Set field `index` to `text`, ignoring indices the form lacks.
    pub fn set_value(&mut self, index: usize, text: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.input.set_text(text);
        }
    }

    pub fn clear(&mut self) {
        for field in &mut self.fields {
            field.input.clear();
        }
        self.focus = 0;
    }

    pub(crate) fn required(&self, index: usize) -> Result<&str, FormError> {
        let value = self.value(index);
        if value.is_empty() {
            return Err(FormError::Required(self.label(index)));
        }
        Ok(value)
    }

    pub(crate) fn optional(&self, index: usize) -> Option<&str> {
        Some(self.value(index)).filter(|v| !v.is_empty())
    }

    pub(crate) fn whole_number(&self, index: usize, min: u64, max: u64) -> Result<u64, FormError> {
        let field = self.label(index);
        let raw = self.required(index)?;
        let cleaned: String = raw
            .trim_start_matches('$')
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect();
        let value: u64 = cleaned.parse().map_err(|_| FormError::NotANumber {
            field,
            value: raw.to_string(),
        })?;
        if !(min..=max).contains(&value) {
            return Err(FormError::OutOfRange { field, min, max });
        }
        Ok(value)
    }

    pub(crate) fn non_zero(&self, index: usize) -> Result<NonZeroU64, FormError> {
        let value = self.whole_number(index, 1, u64::MAX)?;
        NonZeroU64::new(value).ok_or(FormError::OutOfRange {
            field: self.label(index),
            min: 1,
            max: u64::MAX,
        })
    }

    pub(crate) fn money(&self, index: usize) -> Result<Money, FormError> {
        let field = self.label(index);
        Money::parse(self.required(index)?)
            .map_err(|source| FormError::Amount { field, source })
    }

    fn label(&self, index: usize) -> &'static str {
        self.fields.get(index).map_or("field", |f| f.label)
    }
}
