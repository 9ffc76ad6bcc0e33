//! Terminal stand-in for the exercise page: exercise, work, feedback and
//! history panels driven by controller effects.

use std::sync::Arc;

use client_core::{ReasoningService, SessionController, Snapshot, UiEffect};
use tracing::{debug, error};

use crate::commands::{TutorCommand, USAGE};

pub type Controller = SessionController<Arc<dyn ReasoningService>>;

pub struct Console {
    controller: Controller,
    snapshot: Option<Snapshot>,
    work_area: String,
    exercise_panel: String,
    history_panel: String,
    feedback_panel: String,
    feedback_seen: usize,
    help_open: bool,
}

pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

impl Console {
    pub fn new(controller: Controller) -> Self {
        Self {
            controller,
            snapshot: None,
            work_area: String::new(),
            exercise_panel: String::new(),
            history_panel: String::new(),
            feedback_panel: String::new(),
            feedback_seen: 0,
            help_open: false,
        }
    }

    pub fn work_area(&self) -> &str {
        &self.work_area
    }

    pub async fn dispatch(&mut self, cmd: TutorCommand) -> Flow {
        let mut out = Vec::new();
        match cmd {
            TutorCommand::Quit => return Flow::Quit,
            TutorCommand::Help => {
                self.help_open = true;
                out.push(USAGE.to_string());
            }
            TutorCommand::Work(text) => {
                self.work_area = text;
                out.push(format!("work: {}", self.work_area));
            }
            TutorCommand::Generate => {
                let result = self.controller.generate().await;
                self.settle("generate", result, &mut out);
            }
            TutorCommand::Show => match &self.snapshot {
                Some(snapshot) => {
                    let effects = self.controller.redraw(snapshot);
                    self.feedback_seen = 0;
                    self.apply(effects, &mut out);
                    out.push(format!("exercise: {}", self.exercise_panel));
                    out.push(format!("history:\n{}", self.history_panel));
                    out.push(format!("work: {}", self.work_area));
                }
                None => out.push(NO_EXERCISE.to_string()),
            },
            TutorCommand::Paste => match &self.snapshot {
                Some(snapshot) => {
                    let effect = self.controller.paste(snapshot);
                    self.apply(vec![effect], &mut out);
                }
                None => out.push(NO_EXERCISE.to_string()),
            },
            TutorCommand::Ready
            | TutorCommand::Hint
            | TutorCommand::Next
            | TutorCommand::Remaining
            | TutorCommand::Feedback(_) => self.run_session_command(cmd, &mut out).await,
        }
        Flow::Continue(out)
    }

    async fn run_session_command(&mut self, cmd: TutorCommand, out: &mut Vec<String>) {
        let Some(snapshot) = self.snapshot.clone() else {
            out.push(NO_EXERCISE.to_string());
            return;
        };
        if let TutorCommand::Feedback(Some(text)) = &cmd {
            self.work_area = text.clone();
        }

        let work = self.work_area.clone();
        let (name, result) = match cmd {
            TutorCommand::Ready => ("ready", self.controller.get_ready(snapshot).await),
            TutorCommand::Hint => ("hint", self.controller.get_hint(snapshot).await),
            TutorCommand::Next => ("next", self.controller.get_next(snapshot, &work).await),
            TutorCommand::Remaining => (
                "remaining",
                self.controller.get_remaining(snapshot, &work).await,
            ),
            _ => (
                "feedback",
                self.controller.get_feedback(snapshot, &work).await,
            ),
        };
        self.settle(name, result, out);
    }

    fn settle(
        &mut self,
        name: &str,
        result: Result<client_core::Transition, client_core::ControllerError>,
        out: &mut Vec<String>,
    ) {
        match result {
            Ok(transition) => {
                debug!(command = name, effects = transition.effects.len(), "applying effects");
                self.snapshot = Some(transition.snapshot);
                self.apply(transition.effects, out);
            }
            Err(err) => {
                error!(command = name, error = %err, "command failed");
                out.push(format!("error: {err}"));
            }
        }
    }

    fn apply(&mut self, effects: Vec<UiEffect>, out: &mut Vec<String>) {
        for effect in effects {
            match effect {
                UiEffect::CloseAllHelp => self.help_open = false,
                UiEffect::ShowExercise(markup) => {
                    out.push(format!("exercise: {markup}"));
                    self.exercise_panel = markup;
                }
                UiEffect::ReplaceWorkArea(markup) => {
                    out.push(format!("work: {markup}"));
                    self.work_area = markup;
                }
                UiEffect::ShowHistory(rendered) => self.history_panel = rendered,
                UiEffect::ShowFeedback(rendered) => {
                    if !rendered.starts_with(&self.feedback_panel[..self.feedback_seen]) {
                        self.feedback_seen = 0;
                    }
                    self.feedback_panel = rendered;
                }
                UiEffect::ScrollFeedbackToEnd => {
                    let unseen = self.feedback_panel[self.feedback_seen..].trim_start_matches('\n');
                    if !unseen.is_empty() {
                        out.push(unseen.to_string());
                    }
                    self.feedback_seen = self.feedback_panel.len();
                }
            }
        }
    }
}

const NO_EXERCISE: &str = "no exercise yet; type generate";
