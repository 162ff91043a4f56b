//! Prompt templates for the growth assistant.
//!
//! Each [`PromptKind`] owns a fixed template with `{field}` placeholders.
//! [`build_prompt`] fills them from a [`PromptContext`]; the output depends
//! only on its inputs.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    QuickActions,
    MonthlyRoadmap,
    CrisisRecalibration,
}

impl PromptKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PromptKind::QuickActions => "quick actions",
            PromptKind::MonthlyRoadmap => "monthly roadmap",
            PromptKind::CrisisRecalibration => "crisis recalibration",
        }
    }

    /// Whether the template asks the model for a JSON reply.
    #[must_use]
    pub const fn expects_json(self) -> bool {
        matches!(self, PromptKind::MonthlyRoadmap)
    }

    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            PromptKind::QuickActions | PromptKind::MonthlyRoadmap => {
                &["business_type", "budget", "hours_per_week", "goal"]
            }
            PromptKind::CrisisRecalibration => &[
                "business_type",
                "completed_tasks",
                "missed_tasks",
                "completion_rate",
                "setback",
            ],
        }
    }

    const fn template(self) -> &'static str {
        match self {
            PromptKind::QuickActions => QUICK_ACTIONS_TEMPLATE,
            PromptKind::MonthlyRoadmap => MONTHLY_ROADMAP_TEMPLATE,
            PromptKind::CrisisRecalibration => CRISIS_RECALIBRATION_TEMPLATE,
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const QUICK_ACTIONS_TEMPLATE: &str = "\
You are a practical growth advisor for a small business.
Business: {business_type}
Available budget this month: {budget}
Time available per week: {hours_per_week} hours
Main goal: {goal}

Suggest 5 concrete micro-actions the owner can finish this week within that \
budget and time. For each, give the action, the expected cost, and the time \
it takes. Keep it realistic; no action may exceed the stated budget or time.";

const MONTHLY_ROADMAP_TEMPLATE: &str = "\
You are a practical growth advisor for a small business.
Business: {business_type}
Monthly budget: {budget}
Time available per week: {hours_per_week} hours
Main goal: {goal}

Create a 4-week roadmap. Reply with JSON only, no prose and no code fences, \
in exactly this shape:
{\"weeks\": [{\"week\": 1, \"focus\": \"...\", \"tasks\": [\"...\", \"...\"]}]}
Give 3 to 5 short, checkable tasks per week that fit the budget and time.";

const CRISIS_RECALIBRATION_TEMPLATE: &str = "\
You are a supportive growth advisor for a small business that fell behind plan.
Business: {business_type}
Completion rate so far: {completion_rate}
Tasks completed:
{completed_tasks}
Tasks missed:
{missed_tasks}
What got in the way: {setback}

Recalibrate the plan. Drop or shrink what is unrealistic, keep what worked, \
and give a shorter list of the 3 most important next actions for the coming \
week, each small enough to finish despite the setback.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("{kind} prompt needs a value for '{field}'")]
    MissingField {
        kind: PromptKind,
        field: &'static str,
    },
}

/// Named values substituted into a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    fields: BTreeMap<String, String>,
}

impl PromptContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Render a list of task texts as a bulleted block, `(none)` when empty.
    #[must_use]
    pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
        if items.is_empty() {
            return "(none)".to_string();
        }
        items
            .iter()
            .map(|item| format!("- {}", item.as_ref()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn build_prompt(kind: PromptKind, context: &PromptContext) -> Result<String, PromptError> {
    for field in kind.required_fields() {
        let present = context.get(field).is_some_and(|v| !v.trim().is_empty());
        if !present {
            return Err(PromptError::MissingField { kind, field });
        }
    }

    // Single pass over the template: substituted values are never rescanned.
    let template = kind.template();
    let mut prompt = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after
            .find('}')
            .map(|close| &after[..close])
            .filter(|name| kind.required_fields().contains(name))
            .and_then(|name| context.get(name).map(|value| (name, value)));
        match placeholder {
            Some((name, value)) => {
                prompt.push_str(value.trim());
                rest = &after[name.len() + 1..];
            }
            None => {
                prompt.push('{');
                rest = after;
            }
        }
    }
    prompt.push_str(rest);
    Ok(prompt)
}
