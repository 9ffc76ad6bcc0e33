use shared::{
    domain::{Location, RuleName},
    protocol::{FeedbackOutcome, ServiceState},
};

use crate::format::ExpressionFormat;

/// What the work area would receive if the user accepts the suggested step.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyContent {
    state: ServiceState,
    location: Location,
}

impl CopyContent {
    pub fn new(state: ServiceState, location: Location) -> Self {
        Self { state, location }
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn paste_text(&self, format: &dyn ExpressionFormat) -> String {
        format.to_markup(&self.state.exercise)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub rule: RuleName,
    pub result: String,
}

/// One block of the feedback log.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackEntry {
    Ready {
        expression: String,
        solved: bool,
    },
    /// An empty rule list means no hint was available.
    Hint {
        expression: String,
        rules: Vec<RuleName>,
    },
    Changed,
    Next {
        expression: String,
        suggestion: Option<Suggestion>,
    },
    Remaining {
        expression: String,
        steps: u32,
    },
    Unchanged,
    Checked {
        outcome: FeedbackOutcome,
        applied_rules: Vec<RuleName>,
    },
}

/// Complete session state between two user actions.
///
/// `state` is the last token the service accepted; `copy` may run ahead of it
/// when a suggested step has not been pasted yet. `work_text` is kept in
/// plain form.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub exercise: String,
    pub feedback: Vec<FeedbackEntry>,
    pub history: Vec<String>,
    pub work_text: String,
    pub copy: CopyContent,
    pub state: ServiceState,
    pub location: Location,
}

impl Snapshot {
    pub fn fresh(state: ServiceState) -> Self {
        let exercise = state.exercise.clone();
        Self {
            exercise: exercise.clone(),
            feedback: Vec::new(),
            history: vec![exercise.clone()],
            work_text: exercise,
            copy: CopyContent::new(state.clone(), Location::root()),
            state,
            location: Location::root(),
        }
    }

    /// Term the service currently considers the exercise to be at.
    pub fn current_term(&self) -> &str {
        &self.state.exercise
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    CloseAllHelp,
    ShowExercise(String),
    ReplaceWorkArea(String),
    ShowFeedback(String),
    ShowHistory(String),
    ScrollFeedbackToEnd,
}

/// Result of one controller operation: the replacement snapshot plus what
/// the host has to show.
#[derive(Debug, Clone)]
pub struct Transition {
    pub snapshot: Snapshot,
    pub effects: Vec<UiEffect>,
}
