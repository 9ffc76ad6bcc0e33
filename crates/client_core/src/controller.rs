//! Session controller: user action in, service round trip, replacement snapshot out.

use shared::{domain::Difficulty, protocol::SubmitResult};
use tracing::{debug, info, warn};

use crate::{
    error::ControllerError,
    format::{ExpressionFormat, LogicNotation},
    render::{FeedbackRenderer, HtmlRenderer},
    service::ReasoningService,
    types::{CopyContent, FeedbackEntry, Snapshot, Suggestion, Transition, UiEffect},
};

/// Hint requests always go out with an empty seed.
const HINT_SEED: &str = "";

pub struct SessionController<S, F = LogicNotation> {
    service: S,
    format: F,
    renderer: Box<dyn FeedbackRenderer>,
    difficulty: Difficulty,
}

impl<S: ReasoningService> SessionController<S, LogicNotation> {
    pub fn new(service: S) -> Self {
        Self::with_parts(service, LogicNotation, Box::new(HtmlRenderer::default()))
    }
}

impl<S: ReasoningService, F: ExpressionFormat> SessionController<S, F> {
    pub fn with_parts(service: S, format: F, renderer: Box<dyn FeedbackRenderer>) -> Self {
        Self {
            service,
            format,
            renderer,
            difficulty: Difficulty::default(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_renderer(mut self, renderer: impl FeedbackRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn format(&self) -> &F {
        &self.format
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Starts a new exercise; any previous snapshot is simply dropped.
    pub async fn generate(&self) -> Result<Transition, ControllerError> {
        let state = self
            .service
            .generate(self.difficulty)
            .await
            .map_err(ControllerError::service("generate"))?;
        info!(exercise = %state.exercise, difficulty = self.difficulty.0, "generated exercise");

        let snapshot = Snapshot::fresh(state);
        let markup = self.format.to_markup(&snapshot.exercise);
        let mut effects = vec![
            UiEffect::CloseAllHelp,
            UiEffect::ShowExercise(markup.clone()),
            UiEffect::ReplaceWorkArea(markup),
        ];
        effects.extend(self.log_effects(&snapshot, true));
        Ok(Transition { snapshot, effects })
    }

    pub async fn get_ready(&self, mut snapshot: Snapshot) -> Result<Transition, ControllerError> {
        let solved = self
            .service
            .ready(&snapshot.state)
            .await
            .map_err(ControllerError::service("ready"))?;
        info!(solved, "checked whether exercise is solved");

        snapshot.feedback.push(FeedbackEntry::Ready {
            expression: snapshot.current_term().to_string(),
            solved,
        });
        Ok(self.transition(snapshot, false))
    }

    pub async fn get_hint(&self, mut snapshot: Snapshot) -> Result<Transition, ControllerError> {
        let rules = self
            .service
            .applicable(HINT_SEED, &snapshot.state)
            .await
            .map_err(ControllerError::service("hint"))?;
        info!(rules = rules.len(), "fetched applicable rules");

        snapshot.feedback.push(FeedbackEntry::Hint {
            expression: snapshot.current_term().to_string(),
            rules,
        });
        Ok(self.transition(snapshot, false))
    }

    pub async fn get_next(
        &self,
        snapshot: Snapshot,
        work_area: &str,
    ) -> Result<Transition, ControllerError> {
        let mut snapshot = self.note_divergence(snapshot, work_area);
        let step = self
            .service
            .one_first(&snapshot.state)
            .await
            .map_err(ControllerError::service("next"))?;
        let expression = snapshot.current_term().to_string();

        match step.rule {
            Some(rule) => {
                info!(rule = %rule, "service suggested next step");
                snapshot.feedback.push(FeedbackEntry::Next {
                    expression,
                    suggestion: Some(Suggestion {
                        rule,
                        result: step.state.exercise.clone(),
                    }),
                });
                snapshot.copy = CopyContent::new(step.state, step.location);
                snapshot.work_text = self.format.to_plain(work_area);
            }
            None => {
                info!("no next step available");
                snapshot.feedback.push(FeedbackEntry::Next {
                    expression,
                    suggestion: None,
                });
            }
        }
        Ok(self.transition(snapshot, false))
    }

    pub async fn get_remaining(
        &self,
        snapshot: Snapshot,
        work_area: &str,
    ) -> Result<Transition, ControllerError> {
        let mut snapshot = self.note_divergence(snapshot, work_area);
        let steps = self
            .service
            .steps_remaining(&snapshot.state)
            .await
            .map_err(ControllerError::service("remaining"))?;
        info!(steps, "fetched remaining step count");

        snapshot.feedback.push(FeedbackEntry::Remaining {
            expression: snapshot.current_term().to_string(),
            steps,
        });
        Ok(self.transition(snapshot, false))
    }

    /// Submits the work area as the next step, unless it still shows the
    /// current term.
    pub async fn get_feedback(
        &self,
        mut snapshot: Snapshot,
        work_area: &str,
    ) -> Result<Transition, ControllerError> {
        if !self.diverges(&snapshot, work_area) {
            debug!("work area unchanged; nothing submitted");
            snapshot.feedback.push(FeedbackEntry::Unchanged);
            snapshot.work_text = self.format.to_plain(work_area);
            return Ok(self.transition(snapshot, false));
        }

        let term = self.format.to_plain(work_area);
        let result = self
            .service
            .submit(&snapshot.state, &term)
            .await
            .map_err(ControllerError::service("feedback"))?;

        let SubmitResult {
            outcome,
            applied_rules,
            state,
        } = result;
        let state = match state {
            Some(state) if outcome.is_accepted() => state,
            _ => {
                warn!(outcome = outcome.as_str(), "submitted step rejected");
                snapshot.feedback.push(FeedbackEntry::Checked {
                    outcome,
                    applied_rules,
                });
                return Ok(self.transition(snapshot, false));
            }
        };

        info!(
            outcome = outcome.as_str(),
            exercise = %state.exercise,
            "submitted step accepted"
        );
        snapshot.history.push(state.exercise.clone());
        snapshot.feedback.push(FeedbackEntry::Checked {
            outcome,
            applied_rules,
        });
        snapshot.work_text = state.exercise.clone();
        snapshot.copy = CopyContent::new(state.clone(), snapshot.location.clone());
        snapshot.state = state;
        Ok(self.transition(snapshot, true))
    }

    /// Work-area replacement for the Paste action.
    pub fn paste(&self, snapshot: &Snapshot) -> UiEffect {
        UiEffect::ReplaceWorkArea(snapshot.copy.paste_text(&self.format))
    }

    /// Effects that redraw every panel from `snapshot`.
    pub fn redraw(&self, snapshot: &Snapshot) -> Vec<UiEffect> {
        let mut effects = vec![UiEffect::ShowExercise(
            self.format.to_markup(&snapshot.exercise),
        )];
        effects.extend(self.log_effects(snapshot, true));
        effects
    }

    fn diverges(&self, snapshot: &Snapshot, work_area: &str) -> bool {
        self.format.normalize(work_area) != self.format.normalize(snapshot.current_term())
    }

    fn note_divergence(&self, mut snapshot: Snapshot, work_area: &str) -> Snapshot {
        if self.diverges(&snapshot, work_area) {
            debug!("work area differs from current term");
            snapshot.feedback.push(FeedbackEntry::Changed);
            snapshot.work_text = self.format.to_plain(work_area);
        }
        snapshot
    }

    fn transition(&self, snapshot: Snapshot, history_changed: bool) -> Transition {
        let mut effects = vec![UiEffect::CloseAllHelp];
        effects.extend(self.log_effects(&snapshot, history_changed));
        Transition { snapshot, effects }
    }

    fn log_effects(&self, snapshot: &Snapshot, with_history: bool) -> Vec<UiEffect> {
        let mut effects = Vec::with_capacity(3);
        if with_history {
            effects.push(UiEffect::ShowHistory(
                self.renderer.render_history(&snapshot.history),
            ));
        }
        effects.push(UiEffect::ShowFeedback(
            self.renderer.render_feedback(&snapshot.feedback),
        ));
        effects.push(UiEffect::ScrollFeedbackToEnd);
        effects
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
