//! Dashboard state machine for GroFlow.
//!
//! [`App`] owns the session, the current view, every form and the pending
//! generation request. It has no terminal dependencies: the TUI reads it to
//! render and calls its action methods from key handlers. Each action leaves
//! a [`Notice`] describing what happened; failures never touch the session.

mod error;
mod form;
mod generation;
mod input;
mod notice;

#[cfg(test)]
mod tests;

use groflow_core::{
    Campaign, MalformedAiResponse, MonthlyRoadmap, NewCampaign, PromptContext, PromptKind,
    Session, SessionSeed, build_prompt, parse_structured,
};
use groflow_providers::{GatewayConfig, GeminiClient, GenerationError};
use groflow_types::{ApiKey, NonEmptyString, View, sanitize_display_text};

pub use error::ActionError;
pub use form::{Form, FormError, FormField, FormId};
pub use input::DraftInput;
pub use notice::{Notice, NoticeKind};

pub use groflow_core;
pub use groflow_providers;
pub use groflow_types;

use generation::{GenerationPoll, GenerationResult, PendingGeneration};

const MAX_HOURS_PER_WEEK: u64 = 168;

/// Everything the binary resolves before the dashboard starts.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub seed: SessionSeed,
    pub gateway: GatewayConfig,
    pub api_key: Option<ApiKey>,
    pub start_view: View,
    pub high_contrast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Keystrokes go to the focused field of this form.
    Editing(FormId),
}

#[derive(Debug, Clone)]
struct Forms {
    plan: Form,
    new_task: Form,
    setback: Form,
    campaign: Form,
    invest: Form,
    liquidity: Form,
    credential: Form,
}

impl Default for Forms {
    fn default() -> Self {
        Self {
            plan: Form::new(FormId::Plan),
            new_task: Form::new(FormId::NewTask),
            setback: Form::new(FormId::Setback),
            campaign: Form::new(FormId::Campaign),
            invest: Form::new(FormId::Invest),
            liquidity: Form::new(FormId::Liquidity),
            credential: Form::new(FormId::Credential),
        }
    }
}

impl Forms {
    fn get(&self, id: FormId) -> &Form {
        match id {
            FormId::Plan => &self.plan,
            FormId::NewTask => &self.new_task,
            FormId::Setback => &self.setback,
            FormId::Campaign => &self.campaign,
            FormId::Invest => &self.invest,
            FormId::Liquidity => &self.liquidity,
            FormId::Credential => &self.credential,
        }
    }

    fn get_mut(&mut self, id: FormId) -> &mut Form {
        match id {
            FormId::Plan => &mut self.plan,
            FormId::NewTask => &mut self.new_task,
            FormId::Setback => &mut self.setback,
            FormId::Campaign => &mut self.campaign,
            FormId::Invest => &mut self.invest,
            FormId::Liquidity => &mut self.liquidity,
            FormId::Credential => &mut self.credential,
        }
    }
}

#[derive(Debug)]
pub struct App {
    session: Session,
    view: View,
    mode: InputMode,
    notice: Option<Notice>,
    should_quit: bool,
    tick: usize,
    /// Held in memory only; never logged or written to disk.
    api_key: Option<ApiKey>,
    gateway: GatewayConfig,
    high_contrast: bool,
    forms: Forms,
    quick_actions: Option<String>,
    roadmap: Option<Result<MonthlyRoadmap, MalformedAiResponse>>,
    recalibration: Option<String>,
    pending: Option<PendingGeneration>,
    marketplace_selected: usize,
    investor_selected: usize,
    tracker_selected: usize,
}

impl App {
    #[must_use]
    pub fn new(options: AppOptions) -> Self {
        tracing::info!(
            view = options.start_view.title(),
            model = %options.gateway.model,
            has_api_key = options.api_key.is_some(),
            "Dashboard starting"
        );
        Self {
            session: Session::new(options.seed),
            view: options.start_view,
            mode: InputMode::Normal,
            notice: None,
            should_quit: false,
            tick: 0,
            api_key: options.api_key,
            gateway: options.gateway,
            high_contrast: options.high_contrast,
            forms: Forms::default(),
            quick_actions: None,
            roadmap: None,
            recalibration: None,
            pending: None,
            marketplace_selected: 0,
            investor_selected: 0,
            tracker_selected: 0,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn high_contrast(&self) -> bool {
        self.high_contrast
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Masked form of the key for display.
    #[must_use]
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(ApiKey::masked)
    }

    #[must_use]
    pub fn gateway(&self) -> &GatewayConfig {
        &self.gateway
    }

    #[must_use]
    pub fn form(&self, id: FormId) -> &Form {
        self.forms.get(id)
    }

    pub fn form_mut(&mut self, id: FormId) -> &mut Form {
        self.forms.get_mut(id)
    }

    #[must_use]
    pub fn quick_actions(&self) -> Option<&str> {
        self.quick_actions.as_deref()
    }

    #[must_use]
    pub fn roadmap(&self) -> Option<&Result<MonthlyRoadmap, MalformedAiResponse>> {
        self.roadmap.as_ref()
    }

    #[must_use]
    pub fn recalibration(&self) -> Option<&str> {
        self.recalibration.as_deref()
    }

    /// Kind of the request still waiting on a reply, if any.
    #[must_use]
    pub fn pending_generation(&self) -> Option<PromptKind> {
        self.pending.as_ref().map(PendingGeneration::kind)
    }

    /// Frames since the pending request was sent.
    #[must_use]
    pub fn generation_ticks(&self) -> Option<usize> {
        self.pending
            .as_ref()
            .map(|p| self.tick.wrapping_sub(p.started_tick()))
    }

    #[must_use]
    pub fn recalibration_available(&self) -> bool {
        self.session.needs_recalibration()
    }

    // ------------------------------------------------------------------
    // Navigation and selection
    // ------------------------------------------------------------------

    pub fn navigate(&mut self, view: View) {
        if self.view != view {
            tracing::debug!(from = self.view.title(), to = view.title(), "Navigate");
        }
        self.view = view;
        self.mode = InputMode::Normal;
    }

    pub fn next_view(&mut self) {
        self.navigate(self.view.next());
    }

    pub fn prev_view(&mut self) {
        self.navigate(self.view.prev());
    }

    #[must_use]
    pub fn marketplace_selected(&self) -> usize {
        self.marketplace_selected
    }

    #[must_use]
    pub fn investor_selected(&self) -> usize {
        self.investor_selected
    }

    #[must_use]
    pub fn tracker_selected(&self) -> usize {
        self.tracker_selected
    }

    /// Campaign under the cursor on the marketplace.
    #[must_use]
    pub fn selected_campaign(&self) -> Option<&Campaign> {
        self.session
            .campaigns()
            .iter()
            .nth(self.marketplace_selected)
    }

    /// Eligible campaign under the cursor on the investor screen.
    #[must_use]
    pub fn selected_eligible(&self) -> Option<&Campaign> {
        self.session
            .campaigns()
            .list_eligible_for_investment()
            .nth(self.investor_selected)
    }

    pub fn select_next(&mut self) {
        let len = self.selectable_len();
        if let Some(selected) = self.selection_mut() {
            if len > 0 {
                *selected = (*selected + 1).min(len - 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    fn selectable_len(&self) -> usize {
        match self.view {
            View::Marketplace => self.session.campaigns().len(),
            View::Investor => self
                .session
                .campaigns()
                .list_eligible_for_investment()
                .count(),
            View::Tracker => self.session.tracker().len(),
            _ => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Marketplace => Some(&mut self.marketplace_selected),
            View::Investor => Some(&mut self.investor_selected),
            View::Tracker => Some(&mut self.tracker_selected),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub fn begin_edit(&mut self, id: FormId) {
        self.mode = InputMode::Editing(id);
    }

    pub fn cancel_edit(&mut self) {
        self.mode = InputMode::Normal;
    }

    /// Form receiving keystrokes, if editing.
    pub fn editing_form_mut(&mut self) -> Option<&mut Form> {
        match self.mode {
            InputMode::Editing(id) => Some(self.forms.get_mut(id)),
            InputMode::Normal => None,
        }
    }

    /// Submit the form being edited.
    ///
    /// On success editing ends; on failure the form stays open so the
    /// offending field can be fixed.
    pub fn submit(&mut self) {
        let InputMode::Editing(id) = self.mode else {
            return;
        };
        let result = match id {
            FormId::Plan => {
                let kind = if self.view == View::Roadmap {
                    PromptKind::MonthlyRoadmap
                } else {
                    PromptKind::QuickActions
                };
                self.try_request_generation(kind)
            }
            FormId::Setback => self.try_request_generation(PromptKind::CrisisRecalibration),
            FormId::NewTask => self.try_add_task(),
            FormId::Campaign => self.try_post_campaign(),
            FormId::Invest => self.try_invest_selected(),
            FormId::Liquidity => self.try_add_liquidity(),
            FormId::Credential => self.try_set_credential(),
        };
        if result.is_ok() {
            self.mode = InputMode::Normal;
        }
        self.report(result);
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn vouch_selected(&mut self) {
        let result = self.try_vouch_selected();
        self.report(result);
    }

    pub fn toggle_selected_task(&mut self) {
        let result = self.try_toggle_selected_task();
        self.report(result);
    }

    pub fn load_roadmap_into_tracker(&mut self) {
        let result = self.try_load_roadmap();
        self.report(result);
    }

    pub fn request_generation(&mut self, kind: PromptKind) {
        let result = self.try_request_generation(kind);
        self.report(result);
    }

    pub fn clear_credential(&mut self) {
        self.api_key = None;
        tracing::info!("API key cleared");
        self.set_notice(Notice::info("API key cleared"));
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Advance the frame counter and collect a finished generation.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.poll_generation();
    }

    fn report(&mut self, result: Result<Notice, ActionError>) {
        match result {
            Ok(notice) => self.notice = Some(notice),
            Err(err) => {
                tracing::info!(error = %err, "Action rejected");
                self.notice = Some(Notice::error(err.to_string()));
            }
        }
    }

    pub(crate) fn try_vouch_selected(&mut self) -> Result<Notice, ActionError> {
        let campaign = self
            .selected_campaign()
            .map(|c| c.id)
            .ok_or(ActionError::NothingSelected)?;
        let receipt = self.session.vouch(campaign)?;
        let name = self
            .session
            .campaigns()
            .get(receipt.campaign)
            .map_or_else(String::new, |c| c.name.to_string());
        Ok(Notice::success(format!(
            "Vouched for {name}: now {}, your balance {}",
            receipt.campaign_points, receipt.voucher_balance
        )))
    }

    pub(crate) fn try_post_campaign(&mut self) -> Result<Notice, ActionError> {
        let form = &self.forms.campaign;
        let name = NonEmptyString::new(form.required(0)?)
            .map_err(|_| FormError::Required("Business name"))?;
        let owner =
            NonEmptyString::new(form.required(1)?).map_err(|_| FormError::Required("Owner"))?;
        let campaign = NewCampaign {
            name,
            owner,
            description: form.value(2).to_string(),
            goal: form.non_zero(3)?,
            image_reference: form.optional(4).map(str::to_string),
        };

        let name = campaign.name.to_string();
        let id = self.session.post_campaign(campaign);
        self.forms.campaign.clear();
        self.marketplace_selected = self.session.campaigns().len().saturating_sub(1);

        if self.session.campaigns().duplicate_names().contains_key(&name) {
            return Ok(Notice::info(format!(
                "Posted {name} as {id}; another campaign already uses this name"
            )));
        }
        Ok(Notice::success(format!("Posted {name} as {id}")))
    }

    pub(crate) fn try_invest_selected(&mut self) -> Result<Notice, ActionError> {
        let amount = self.forms.invest.money(0)?;
        let campaign = self
            .selected_eligible()
            .map(|c| c.id)
            .ok_or(ActionError::NothingSelected)?;
        self.session.invest(campaign, amount)?;
        self.forms.invest.clear();
        let name = self
            .session
            .campaigns()
            .get(campaign)
            .map_or_else(String::new, |c| c.name.to_string());
        Ok(Notice::success(format!(
            "Invested {amount} in {name}; {} liquidity left",
            self.session.pool().liquidity()
        )))
    }

    pub(crate) fn try_add_liquidity(&mut self) -> Result<Notice, ActionError> {
        let amount = self.forms.liquidity.money(0)?;
        if amount.is_zero() {
            return Err(FormError::OutOfRange {
                field: "Amount",
                min: 1,
                max: u64::MAX,
            }
            .into());
        }
        self.session.add_liquidity(amount);
        self.forms.liquidity.clear();
        Ok(Notice::success(format!(
            "Added {amount}; liquidity now {}",
            self.session.pool().liquidity()
        )))
    }

    pub(crate) fn try_add_task(&mut self) -> Result<Notice, ActionError> {
        let text = self.forms.new_task.value(0).to_string();
        let index = self.session.tracker_mut().add(&text, None)?;
        self.forms.new_task.clear();
        self.tracker_selected = index;
        Ok(Notice::success(format!("Added task: {text}")))
    }

    pub(crate) fn try_toggle_selected_task(&mut self) -> Result<Notice, ActionError> {
        let index = self.tracker_selected;
        let done = self.session.tracker_mut().toggle(index)?;
        let rate = self.completion_percent().unwrap_or(0);
        let state = if done { "done" } else { "not done" };
        Ok(Notice::info(format!(
            "Task {} marked {state}; completion {rate}%",
            index + 1
        )))
    }

    pub(crate) fn try_load_roadmap(&mut self) -> Result<Notice, ActionError> {
        let Some(Ok(roadmap)) = &self.roadmap else {
            return Err(ActionError::NoRoadmap);
        };
        let count = self.session.tracker_mut().load_roadmap(roadmap);
        self.tracker_selected = 0;
        Ok(Notice::success(format!("Loaded {count} tasks into the tracker")))
    }

    pub(crate) fn try_set_credential(&mut self) -> Result<Notice, ActionError> {
        let key = ApiKey::new(self.forms.credential.value(0))?;
        self.forms.credential.clear();
        let masked = key.masked();
        self.api_key = Some(key);
        tracing::info!("API key updated");
        Ok(Notice::success(format!("API key set ({masked})")))
    }

    pub(crate) fn try_request_generation(
        &mut self,
        kind: PromptKind,
    ) -> Result<Notice, ActionError> {
        if let Some(pending) = &self.pending {
            return Err(ActionError::GenerationInFlight(pending.kind()));
        }
        let key = self.api_key.clone().ok_or(ActionError::MissingCredential)?;
        let context = match kind {
            PromptKind::QuickActions | PromptKind::MonthlyRoadmap => self.plan_context()?,
            PromptKind::CrisisRecalibration => self.recalibration_context()?,
        };
        let prompt = build_prompt(kind, &context)?;
        let client = GeminiClient::new(self.gateway.clone())?;
        self.pending = Some(PendingGeneration::spawn(kind, client, prompt, key, self.tick)?);
        Ok(Notice::info(format!("Asking Gemini for {kind}...")))
    }

    fn plan_context(&self) -> Result<PromptContext, ActionError> {
        let form = &self.forms.plan;
        Ok(PromptContext::new()
            .with("business_type", form.required(0)?)
            .with("budget", form.money(1)?.to_string())
            .with(
                "hours_per_week",
                form.whole_number(2, 1, MAX_HOURS_PER_WEEK)?.to_string(),
            )
            .with("goal", form.required(3)?))
    }

    fn recalibration_context(&self) -> Result<PromptContext, ActionError> {
        let rate = self.completion_percent().ok_or(ActionError::EmptyTracker)?;
        if !self.session.needs_recalibration() {
            return Err(ActionError::RecalibrationNotNeeded {
                rate,
                threshold: self.session.recalibration_threshold_percent(),
            });
        }
        let tracker = self.session.tracker();
        Ok(PromptContext::new()
            .with("business_type", self.forms.plan.required(0)?)
            .with(
                "completed_tasks",
                PromptContext::bullet_list(&tracker.completed()),
            )
            .with("missed_tasks", PromptContext::bullet_list(&tracker.missed()))
            .with("completion_rate", format!("{rate}%"))
            .with("setback", self.forms.setback.required(0)?))
    }

    /// Tracker completion rounded to a whole percent.
    #[must_use]
    pub fn completion_percent(&self) -> Option<u32> {
        self.session
            .tracker()
            .completion_rate()
            .map(|rate| (rate * 100.0).round() as u32)
    }

    fn poll_generation(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let kind = pending.kind();
        match pending.poll() {
            GenerationPoll::Pending => {}
            GenerationPoll::Finished(result) => {
                self.pending = None;
                self.apply_generation(kind, result);
            }
            GenerationPoll::Lost => {
                self.pending = None;
                tracing::warn!(kind = %kind, "Generation task ended without a result");
                self.set_notice(Notice::error(format!(
                    "The {kind} request ended without a reply"
                )));
            }
        }
    }

    /// Store a finished reply for the screen that asked for it.
    pub(crate) fn apply_generation(&mut self, kind: PromptKind, result: GenerationResult) {
        let text = match result {
            Ok(text) => sanitize_display_text(&text).into_owned(),
            Err(err) => {
                self.report_generation_error(kind, &err);
                return;
            }
        };

        let notice = match kind {
            PromptKind::QuickActions => {
                self.quick_actions = Some(text);
                Notice::success("Quick actions ready")
            }
            PromptKind::MonthlyRoadmap => match parse_structured::<MonthlyRoadmap>(&text) {
                Ok(roadmap) => {
                    let notice = Notice::success(format!(
                        "Roadmap ready: {} weeks, {} tasks",
                        roadmap.weeks.len(),
                        roadmap.task_count()
                    ));
                    self.roadmap = Some(Ok(roadmap));
                    notice
                }
                Err(malformed) => {
                    let notice = Notice::error(malformed.to_string());
                    self.roadmap = Some(Err(malformed));
                    notice
                }
            },
            PromptKind::CrisisRecalibration => {
                self.recalibration = Some(text);
                Notice::success("Recalibrated plan ready")
            }
        };
        self.set_notice(notice);
    }

    fn report_generation_error(&mut self, kind: PromptKind, err: &GenerationError) {
        tracing::warn!(kind = %kind, error = %err, "Generation failed");
        self.set_notice(Notice::error(err.to_string()));
    }
}
