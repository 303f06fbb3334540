#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use tokio::sync::mpsc;

use super::merge;
use super::OnboardingFlow;
use super::PersistenceHandle;
use crate::domain::models::Action;
use crate::domain::models::Answer;
use crate::domain::models::AppModel;
use crate::domain::models::BuildJob;
use crate::domain::models::BuildRequest;
use crate::domain::models::BuilderError;
use crate::domain::models::ChatLog;
use crate::domain::models::ChatMessage;
use crate::domain::models::CompletePayload;
use crate::domain::models::CompletionStatus;
use crate::domain::models::Event;
use crate::domain::models::GenerationMode;
use crate::domain::models::GenerationPhase;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResult;
use crate::domain::models::HistoryEntry;
use crate::domain::models::Progress;
use crate::domain::models::QuestionSet;
use crate::domain::models::Role;
use crate::domain::models::ScreenPayload;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    Blank,
    InFlight,
    NothingToRetry,
    NoOnboarding,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Accepted(GenerationMode),
    Rejected(RejectReason),
}

/// One app's builder session. Owns the screen model and chat log, and runs
/// the generation state machine against events from the actions worker.
pub struct BuilderSession {
    pub model: AppModel,
    pub chat: ChatLog,
    pub onboarding: Option<OnboardingFlow>,
    pub progress: Option<Progress>,
    pub build: Option<BuildJob>,
    pub last_error: Option<BuilderError>,
    phase: GenerationPhase,
    in_flight: bool,
    pending_mode: Option<GenerationMode>,
    acknowledged: bool,
    fallback_active: bool,
    last_prompt: Option<String>,
    history_window: usize,
    persistence: Option<PersistenceHandle>,
}

impl BuilderSession {
    pub fn new(model: AppModel, chat: ChatLog, history_window: usize) -> BuilderSession {
        return BuilderSession {
            last_prompt: chat.last_user_prompt(),
            model,
            chat,
            onboarding: None,
            progress: None,
            build: None,
            last_error: None,
            phase: GenerationPhase::Idle,
            in_flight: false,
            pending_mode: None,
            acknowledged: false,
            fallback_active: false,
            history_window,
            persistence: None,
        };
    }

    pub fn with_persistence(mut self, persistence: PersistenceHandle) -> BuilderSession {
        self.persistence = Some(persistence);
        return self;
    }

    pub fn phase(&self) -> GenerationPhase {
        return self.phase;
    }

    pub fn is_busy(&self) -> bool {
        return self.in_flight;
    }

    pub fn last_prompt(&self) -> Option<&str> {
        return self.last_prompt.as_deref();
    }

    /// False while the model is empty or only holds the failure placeholder.
    pub fn has_screens(&self) -> bool {
        return !self.model.is_empty() && !self.fallback_active;
    }

    pub fn select_mode(&self) -> GenerationMode {
        if self.has_screens() {
            return GenerationMode::Update;
        }

        if self.onboarding.is_none() && !self.acknowledged && self.chat.user_turns() <= 1 {
            return GenerationMode::Onboarding;
        }

        return GenerationMode::Generate;
    }

    pub fn submit(
        &mut self,
        text: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<Submission> {
        if self.in_flight {
            tracing::debug!("Dropping submission, a request is already in flight");
            return Ok(Submission::Rejected(RejectReason::InFlight));
        }
        if text.trim().is_empty() {
            return Ok(Submission::Rejected(RejectReason::Blank));
        }

        let mode = self.select_mode();
        if self.onboarding.take().is_some() {
            // A fresh prompt replaces the pending answers.
            self.acknowledged = true;
        }

        self.dispatch(text.trim(), mode, true, tx)?;
        return Ok(Submission::Accepted(mode));
    }

    /// Resubmits the last user prompt.
    pub fn retry(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<Submission> {
        if let Some(prompt) = self.last_prompt.clone() {
            return self.submit(&prompt, tx);
        }

        return Ok(Submission::Rejected(RejectReason::NothingToRetry));
    }

    /// Turns onboarding answers into one user message and starts generation.
    pub fn answer_onboarding(
        &mut self,
        answers: &HashMap<String, Answer>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<Submission> {
        if self.in_flight {
            return Ok(Submission::Rejected(RejectReason::InFlight));
        }
        let flow = match self.onboarding.take() {
            Some(flow) => flow,
            None => return Ok(Submission::Rejected(RejectReason::NoOnboarding)),
        };

        let mut text = flow.serialize_answers(answers);
        if text.is_empty() {
            text = self
                .last_prompt
                .clone()
                .unwrap_or_else(|| return "Build the app.".to_string());
        }

        self.acknowledged = true;
        self.dispatch(&text, GenerationMode::Generate, true, tx)?;
        return Ok(Submission::Accepted(GenerationMode::Generate));
    }

    pub fn skip_onboarding(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<Submission> {
        return self.answer_onboarding(&HashMap::new(), tx);
    }

    pub fn start_build(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if !self.has_screens() {
            anyhow::bail!(BuilderError::Validation(
                "There are no screens to build yet.".to_string()
            ));
        }

        tx.send(Action::SubmitBuild(BuildRequest {
            app_name: self.model.display_name(),
            screens: self.model.screens.iter().map(ScreenPayload::from).collect(),
            description: self.model.description.to_string(),
        }))?;

        return Ok(());
    }

    /// Stops tracking builds. Called on teardown.
    pub fn teardown(&mut self, tx: &mpsc::UnboundedSender<Action>) {
        if tx.send(Action::CancelBuild()).is_err() {
            tracing::debug!("Actions worker already stopped");
        }
        self.persist_model();
    }

    pub fn handle_event(&mut self, event: &Event, tx: &mpsc::UnboundedSender<Action>) {
        match event {
            Event::GenerationStarted() => {
                if self.in_flight {
                    self.transition(GenerationPhase::Streaming);
                }
            }
            Event::GenerationProgress(progress) => {
                if !self.in_flight {
                    return;
                }
                if self.phase == GenerationPhase::Submitting {
                    self.transition(GenerationPhase::Streaming);
                }
                self.progress = Some(progress.clone());
            }
            Event::GenerationFinished(result) => {
                if !self.in_flight {
                    tracing::warn!("Ignoring generation result with no request in flight");
                    return;
                }
                if self.phase == GenerationPhase::Submitting {
                    self.transition(GenerationPhase::Streaming);
                }
                match result {
                    GenerationResult::Screens(payload) => self.complete_screens(payload),
                    GenerationResult::Questions(set) => self.complete_questions(set, tx),
                }
            }
            Event::GenerationFailed(err) => {
                if self.in_flight {
                    self.fail(err.clone());
                }
            }
            Event::BuildSubmitted(job) => {
                self.build = Some(job.clone());
            }
            Event::BuildUpdated(job) => {
                let tracked = match &self.build {
                    Some(current) => current.id == job.id,
                    None => false,
                };
                if !tracked {
                    tracing::debug!(build_id = %job.id, "Ignoring status for superseded build");
                    return;
                }
                if let Some(current) = &mut self.build {
                    if !current.is_terminal() {
                        *current = job.clone();
                    }
                }
            }
            Event::BuildSubmitFailed(err) => {
                self.last_error = Some(err.clone());
            }
        }
    }

    fn dispatch(
        &mut self,
        prompt: &str,
        mode: GenerationMode,
        record_prompt: bool,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let history = self
            .chat
            .trailing(self.history_window)
            .iter()
            .map(HistoryEntry::from)
            .collect::<Vec<HistoryEntry>>();

        if record_prompt {
            let user_message = ChatMessage::new(Role::User, prompt, self.model.version);
            self.persist_message(&user_message);
            self.chat.push(user_message);
        }
        self.chat.push(ChatMessage::provisional(self.model.version));

        self.in_flight = true;
        self.pending_mode = Some(mode);
        self.last_prompt = Some(prompt.to_string());
        self.last_error = None;
        self.progress = None;
        self.transition(GenerationPhase::Submitting);

        let mut request = GenerationRequest {
            prompt: prompt.to_string(),
            mode,
            history,
            screens: None,
            app_name: None,
            description: None,
        };
        if mode == GenerationMode::Update {
            request.screens = Some(self.model.screens.iter().map(ScreenPayload::from).collect());
        }
        if !self.model.name.trim().is_empty() {
            request.app_name = Some(self.model.name.to_string());
        }
        if !self.model.description.trim().is_empty() {
            request.description = Some(self.model.description.to_string());
        }

        tracing::debug!(mode = %mode, history = request.history.len(), "Dispatching generation request");
        if tx.send(Action::Generate(request)).is_err() {
            let err = BuilderError::Transport("the actions worker has stopped".to_string());
            self.fail(err.clone());
            anyhow::bail!(err);
        }

        return Ok(());
    }

    fn complete_screens(&mut self, payload: &CompletePayload) {
        let mode = self.pending_mode.unwrap_or(GenerationMode::Generate);
        let is_update = mode == GenerationMode::Update && !self.fallback_active;

        if payload.screens.is_empty() && !is_update {
            self.fail(BuilderError::TerminalGeneration(
                "the complete frame contained no screens".to_string(),
            ));
            return;
        }

        let report = if is_update {
            merge::apply_update(&mut self.model, payload)
        } else {
            if self.fallback_active {
                self.model.screens.clear();
                self.fallback_active = false;
            }
            merge::apply_generation(&mut self.model, payload)
        };

        tracing::info!(
            mode = %mode,
            appended = report.appended.len(),
            replaced = report.replaced.len(),
            unchanged = report.unchanged.len(),
            "Merged generation result"
        );

        let summary = report.summary(&self.model);
        self.finalize_assistant(&summary);
        if report.has_changes() || !is_update {
            self.persist_model();
        }
        self.settle(CompletionStatus::Success);
    }

    fn complete_questions(&mut self, set: &QuestionSet, tx: &mpsc::UnboundedSender<Action>) {
        if let Some(name) = &set.app_name {
            if self.model.name.trim().is_empty() {
                self.model.name = name.to_string();
            }
        }
        if let Some(description) = &set.description {
            if self.model.description.trim().is_empty() {
                self.model.description = description.to_string();
            }
        }

        let mut acknowledgment = set.acknowledgment.trim().to_string();
        if acknowledgment.is_empty() {
            acknowledgment = "A few quick questions before I start.".to_string();
        }
        self.finalize_assistant(&acknowledgment);
        self.settle(CompletionStatus::Success);

        if set.questions.is_empty() {
            // Nothing to ask, continue straight to generation.
            self.acknowledged = true;
            let prompt = self.last_prompt.clone().unwrap_or_default();
            if let Err(err) = self.dispatch(&prompt, GenerationMode::Generate, false, tx) {
                tracing::error!(error = ?err, "Failed to continue after onboarding");
            }
            return;
        }

        self.onboarding = Some(OnboardingFlow::new(set));
    }

    fn fail(&mut self, err: BuilderError) {
        let mode = self.pending_mode.unwrap_or(GenerationMode::Generate);
        tracing::error!(error = %err, mode = %mode, "Generation failed");

        if mode != GenerationMode::Update && self.model.is_empty() {
            let prompt = self.last_prompt.clone().unwrap_or_default();
            self.model.screens.push(merge::fallback_screen(&prompt));
            self.model.set_current_index(0);
            self.fallback_active = true;
        }

        let mut text = err.to_string();
        if err.is_retryable() {
            text = format!("{text}\n\nUse /retry to send your last prompt again.");
        }
        self.finalize_assistant(&text);
        self.last_error = Some(err);
        self.settle(CompletionStatus::Error);
    }

    fn finalize_assistant(&mut self, content: &str) {
        if let Some(message) = self.chat.finalize_last(content, self.model.version) {
            self.persist_message(&message);
        }
    }

    fn settle(&mut self, status: CompletionStatus) {
        self.transition(GenerationPhase::Complete(status));
        self.in_flight = false;
        self.pending_mode = None;
        self.transition(GenerationPhase::Idle);
    }

    fn transition(&mut self, next: GenerationPhase) {
        if !self.phase.can_transition_to(next) {
            tracing::warn!(from = ?self.phase, to = ?next, "Ignoring illegal phase transition");
            return;
        }

        self.phase = next;
    }

    fn persist_model(&self) {
        if self.fallback_active {
            return;
        }
        if let Some(persistence) = &self.persistence {
            persistence.save(self.model.to_stored());
        }
    }

    fn persist_message(&self, message: &ChatMessage) {
        if let Some(persistence) = &self.persistence {
            persistence.append(&self.model.id, message.clone());
        }
    }
}
