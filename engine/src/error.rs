use thiserror::Error;

use groflow_core::{BookkeepingError, PromptError, PromptKind, TrackerError};
use groflow_providers::GenerationError;
use groflow_types::EmptyApiKeyError;

use crate::FormError;

/// Why a dashboard action did not go through.
///
/// Every variant is recoverable. The [`App`](crate::App) turns these into
/// an error notice and leaves the session as it was.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Bookkeeping(#[from] BookkeepingError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Credential(#[from] EmptyApiKeyError),
    #[error("no API key set; add one in Settings")]
    MissingCredential,
    #[error("still waiting on the {0} request")]
    GenerationInFlight(PromptKind),
    #[error("no async runtime available for the request")]
    NoRuntime,
    #[error("nothing selected")]
    NothingSelected,
    #[error("completion is {rate}%; recalibration opens below {threshold}%")]
    RecalibrationNotNeeded { rate: u32, threshold: u8 },
    #[error("the tracker has no tasks yet")]
    EmptyTracker,
    #[error("no roadmap to load yet")]
    NoRoadmap,
}
