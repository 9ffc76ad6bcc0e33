use super::*;

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{Location, RuleName},
    protocol::{FeedbackOutcome, NextStep, ServiceState, SubmitResult},
};

use crate::{error::ServiceError, render::TextRenderer};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Generate(Difficulty),
    Ready(String),
    Applicable(String, String),
    OneFirst(String),
    StepsRemaining(String),
    Submit(String, String),
}

#[derive(Default)]
struct ScriptedService {
    generated: Mutex<VecDeque<ServiceState>>,
    solved: bool,
    rules: Vec<RuleName>,
    next: Option<NextStep>,
    remaining: u32,
    submit: Option<SubmitResult>,
    fail_with_unavailable: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedService {
    fn new(initial: ServiceState) -> Self {
        Self {
            generated: Mutex::new(VecDeque::from([initial])),
            ..Self::default()
        }
    }

    fn record(&self, call: Call) -> Result<(), ServiceError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.fail_with_unavailable {
            return Err(ServiceError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl ReasoningService for ScriptedService {
    async fn generate(&self, difficulty: Difficulty) -> Result<ServiceState, ServiceError> {
        self.record(Call::Generate(difficulty))?;
        self.generated
            .lock()
            .expect("generated lock")
            .pop_front()
            .ok_or(ServiceError::Unavailable)
    }

    async fn ready(&self, state: &ServiceState) -> Result<bool, ServiceError> {
        self.record(Call::Ready(state.exercise.clone()))?;
        Ok(self.solved)
    }

    async fn applicable(
        &self,
        seed: &str,
        state: &ServiceState,
    ) -> Result<Vec<RuleName>, ServiceError> {
        self.record(Call::Applicable(seed.to_string(), state.exercise.clone()))?;
        Ok(self.rules.clone())
    }

    async fn one_first(&self, state: &ServiceState) -> Result<NextStep, ServiceError> {
        self.record(Call::OneFirst(state.exercise.clone()))?;
        Ok(self.next.clone().unwrap_or_else(|| NextStep {
            rule: None,
            location: Location::root(),
            state: state.clone(),
        }))
    }

    async fn steps_remaining(&self, state: &ServiceState) -> Result<u32, ServiceError> {
        self.record(Call::StepsRemaining(state.exercise.clone()))?;
        Ok(self.remaining)
    }

    async fn submit(
        &self,
        state: &ServiceState,
        term: &str,
    ) -> Result<SubmitResult, ServiceError> {
        self.record(Call::Submit(state.exercise.clone(), term.to_string()))?;
        self.submit.clone().ok_or(ServiceError::Unavailable)
    }
}

const EXERCISE: &str = "p∧q∨r";

fn s0() -> ServiceState {
    ServiceState::new(EXERCISE).with_field("prefix", serde_json::json!("[]"))
}

fn controller(service: ScriptedService) -> SessionController<ScriptedService> {
    SessionController::new(service)
}

async fn started(service: ScriptedService) -> (SessionController<ScriptedService>, Snapshot) {
    let controller = controller(service);
    let transition = controller.generate().await.expect("generate");
    (controller, transition.snapshot)
}

fn calls(controller: &SessionController<ScriptedService>) -> Vec<Call> {
    controller.service.calls.lock().expect("calls lock").clone()
}

fn count_changed(snapshot: &Snapshot) -> usize {
    snapshot
        .feedback
        .iter()
        .filter(|entry| **entry == FeedbackEntry::Changed)
        .count()
}

#[tokio::test]
async fn generate_resets_every_panel() {
    let controller = controller(ScriptedService::new(s0()));
    let transition = controller.generate().await.expect("generate");
    let snapshot = &transition.snapshot;

    assert_eq!(snapshot.exercise, EXERCISE);
    assert_eq!(snapshot.work_text, EXERCISE);
    assert_eq!(snapshot.history, vec![EXERCISE.to_string()]);
    assert!(snapshot.feedback.is_empty());
    assert_eq!(snapshot.copy, CopyContent::new(s0(), Location::root()));
    assert_eq!(snapshot.state, s0());
    assert!(snapshot.location.is_root());

    assert_eq!(
        transition.effects,
        vec![
            UiEffect::CloseAllHelp,
            UiEffect::ShowExercise(EXERCISE.into()),
            UiEffect::ReplaceWorkArea(EXERCISE.into()),
            UiEffect::ShowHistory(EXERCISE.into()),
            UiEffect::ShowFeedback(String::new()),
            UiEffect::ScrollFeedbackToEnd,
        ]
    );
    assert_eq!(calls(&controller), vec![Call::Generate(Difficulty(5))]);
}

#[tokio::test]
async fn generate_uses_configured_difficulty() {
    let controller = controller(ScriptedService::new(s0())).with_difficulty(Difficulty(2));
    controller.generate().await.expect("generate");
    assert_eq!(calls(&controller), vec![Call::Generate(Difficulty(2))]);
}

#[tokio::test]
async fn ready_appends_one_entry_and_keeps_the_rest() {
    let service = ScriptedService {
        solved: false,
        ..ScriptedService::new(s0())
    };
    let (controller, before) = started(service).await;
    let after = controller
        .get_ready(before.clone())
        .await
        .expect("ready")
        .snapshot;

    assert_eq!(
        after.feedback,
        vec![FeedbackEntry::Ready {
            expression: EXERCISE.into(),
            solved: false,
        }]
    );
    assert_eq!(Snapshot { feedback: Vec::new(), ..after }, before);
}

#[tokio::test]
async fn solved_exercise_is_reported_ready() {
    let service = ScriptedService {
        solved: true,
        ..ScriptedService::new(s0())
    };
    let (controller, before) = started(service).await;
    let transition = controller.get_ready(before.clone()).await.expect("ready");

    assert_eq!(
        transition.snapshot.feedback,
        vec![FeedbackEntry::Ready {
            expression: EXERCISE.into(),
            solved: true,
        }]
    );
    assert_eq!(
        rendered_feedback(&transition.effects),
        "<p>Yes, <strong>p∧q∨r</strong> is in disjunctive normal form.</p>"
    );
    assert_eq!(calls(&controller)[1], Call::Ready(EXERCISE.into()));
}

#[tokio::test]
async fn empty_hint_list_reports_sorry_and_leaves_snapshot() {
    let (controller, before) = started(ScriptedService::new(s0())).await;
    let transition = controller.get_hint(before.clone()).await.expect("hint");

    assert_eq!(
        transition.snapshot.feedback,
        vec![FeedbackEntry::Hint {
            expression: EXERCISE.into(),
            rules: Vec::new(),
        }]
    );
    let html = rendered_feedback(&transition.effects);
    assert!(html.contains("Sorry"));
    assert!(html.contains("<strong>p∧q∨r</strong>"));
    assert_eq!(
        Snapshot {
            feedback: Vec::new(),
            ..transition.snapshot
        },
        before
    );
    assert_eq!(
        calls(&controller)[1],
        Call::Applicable(String::new(), EXERCISE.into())
    );
}

fn rendered_feedback(effects: &[UiEffect]) -> String {
    effects
        .iter()
        .find_map(|effect| match effect {
            UiEffect::ShowFeedback(rendered) => Some(rendered.clone()),
            _ => None,
        })
        .expect("feedback effect")
}

#[tokio::test]
async fn every_operation_closes_help_and_scrolls_feedback() {
    let service = ScriptedService {
        rules: vec![RuleName::new("Distribution")],
        remaining: 3,
        ..ScriptedService::new(s0())
    };
    let (controller, snapshot) = started(service).await;

    let transitions = vec![
        controller.get_ready(snapshot.clone()).await.expect("ready"),
        controller.get_hint(snapshot.clone()).await.expect("hint"),
        controller
            .get_next(snapshot.clone(), EXERCISE)
            .await
            .expect("next"),
        controller
            .get_remaining(snapshot.clone(), EXERCISE)
            .await
            .expect("remaining"),
        controller
            .get_feedback(snapshot.clone(), EXERCISE)
            .await
            .expect("feedback"),
    ];
    for transition in transitions {
        assert_eq!(transition.effects.first(), Some(&UiEffect::CloseAllHelp));
        assert_eq!(
            transition.effects.last(),
            Some(&UiEffect::ScrollFeedbackToEnd)
        );
        assert_eq!(transition.snapshot.feedback.len(), 1);
    }
}

#[tokio::test]
async fn next_without_rule_reports_sorry_and_keeps_copy() {
    let (controller, before) = started(ScriptedService::new(s0())).await;
    let after = controller
        .get_next(before.clone(), EXERCISE)
        .await
        .expect("next")
        .snapshot;

    assert_eq!(
        after.feedback,
        vec![FeedbackEntry::Next {
            expression: EXERCISE.into(),
            suggestion: None,
        }]
    );
    assert_eq!(after.copy, before.copy);
    assert_eq!(after.state, before.state);
}

#[tokio::test]
async fn next_with_rule_updates_copy_but_not_state() {
    let s1 = ServiceState::new("(p∨r)∧(q∨r)");
    let location = Location(serde_json::json!([0]));
    let service = ScriptedService {
        next: Some(NextStep {
            rule: Some(RuleName::new("Distribution")),
            location: location.clone(),
            state: s1.clone(),
        }),
        ..ScriptedService::new(s0())
    };
    let (controller, before) = started(service).await;
    let transition = controller
        .get_next(before.clone(), "p ∧ q ∨ r")
        .await
        .expect("next");
    let after = transition.snapshot;

    assert_eq!(count_changed(&after), 0);
    assert_eq!(after.copy, CopyContent::new(s1, location));
    assert_eq!(after.state, before.state);
    assert_eq!(after.location, before.location);
    assert_eq!(after.history, before.history);
    assert_eq!(after.exercise, before.exercise);
    assert_eq!(after.work_text, "p /\\ q \\/ r");
    assert_eq!(
        after.feedback,
        vec![FeedbackEntry::Next {
            expression: EXERCISE.into(),
            suggestion: Some(Suggestion {
                rule: RuleName::new("Distribution"),
                result: "(p∨r)∧(q∨r)".into(),
            }),
        }]
    );
    assert_eq!(
        controller.paste(&after),
        UiEffect::ReplaceWorkArea("(p∨r)∧(q∨r)".into())
    );
}

#[tokio::test]
async fn next_after_edit_logs_exactly_one_changed_notice_first() {
    let (controller, before) = started(ScriptedService::new(s0())).await;
    let after = controller
        .get_next(before, "p ∨ r")
        .await
        .expect("next")
        .snapshot;

    assert_eq!(count_changed(&after), 1);
    assert_eq!(after.feedback[0], FeedbackEntry::Changed);
    assert_eq!(after.feedback.len(), 2);
    assert_eq!(after.work_text, "p \\/ r");
}

#[tokio::test]
async fn remaining_checks_for_changes_then_reports_count() {
    let service = ScriptedService {
        remaining: 4,
        ..ScriptedService::new(s0())
    };
    let (controller, before) = started(service).await;

    let unchanged = controller
        .get_remaining(before.clone(), EXERCISE)
        .await
        .expect("remaining")
        .snapshot;
    assert_eq!(
        unchanged.feedback,
        vec![FeedbackEntry::Remaining {
            expression: EXERCISE.into(),
            steps: 4,
        }]
    );

    let edited = controller
        .get_remaining(unchanged, "q")
        .await
        .expect("remaining")
        .snapshot;
    assert_eq!(edited.feedback.len(), 3);
    assert_eq!(edited.feedback[1], FeedbackEntry::Changed);
    assert_eq!(count_changed(&edited), 1);
}

#[tokio::test]
async fn unchanged_work_is_never_submitted() {
    let (controller, before) = started(ScriptedService::new(s0())).await;
    let after = controller
        .get_feedback(before.clone(), "p∧q ∨ r")
        .await
        .expect("feedback")
        .snapshot;

    assert_eq!(after.feedback, vec![FeedbackEntry::Unchanged]);
    assert_eq!(after.work_text, "p/\\q \\/ r");
    assert_eq!(
        Snapshot {
            feedback: Vec::new(),
            work_text: before.work_text.clone(),
            ..after
        },
        before
    );
    assert!(!calls(&controller)
        .iter()
        .any(|call| matches!(call, Call::Submit(..))));
}

fn accepting(outcome: FeedbackOutcome, s1: &ServiceState) -> ScriptedService {
    ScriptedService {
        submit: Some(SubmitResult::accepted(
            outcome,
            vec![RuleName::new("Distribution")],
            s1.clone(),
        )),
        ..ScriptedService::new(s0())
    }
}

#[tokio::test]
async fn accepted_step_extends_history_and_replaces_tokens() {
    for outcome in [FeedbackOutcome::Ok, FeedbackOutcome::Detour] {
        let s1 = ServiceState::new("(p∨r)∧(q∨r)").with_field("prefix", serde_json::json!("[0]"));
        let (controller, before) = started(accepting(outcome.clone(), &s1)).await;
        let transition = controller
            .get_feedback(before.clone(), "(p ∨ r) ∧ (q ∨ r)")
            .await
            .expect("feedback");
        let after = transition.snapshot;

        assert_eq!(after.history.len(), before.history.len() + 1);
        assert_eq!(after.history.last().map(String::as_str), Some("(p∨r)∧(q∨r)"));
        assert_eq!(after.state, s1);
        assert_eq!(after.copy, CopyContent::new(s1.clone(), before.location.clone()));
        assert_eq!(after.work_text, "(p∨r)∧(q∨r)");
        assert_eq!(after.exercise, before.exercise);
        assert_eq!(
            after.feedback,
            vec![FeedbackEntry::Checked {
                outcome: outcome.clone(),
                applied_rules: vec![RuleName::new("Distribution")],
            }]
        );
        assert!(transition
            .effects
            .contains(&UiEffect::ShowHistory("p∧q∨r<br>(p∨r)∧(q∨r)".into())));
        assert_eq!(
            calls(&controller)[1],
            Call::Submit(EXERCISE.into(), "(p \\/ r) /\\ (q \\/ r)".into())
        );
    }
}

#[tokio::test]
async fn rejected_step_only_touches_feedback() {
    let s1 = ServiceState::new("garbage");
    let (controller, before) =
        started(accepting(FeedbackOutcome::Other("Buggy".into()), &s1)).await;
    let transition = controller
        .get_feedback(before.clone(), "p ∧ r")
        .await
        .expect("feedback");
    let after = transition.snapshot;

    assert_eq!(after.feedback.len(), 1);
    assert_eq!(
        Snapshot {
            feedback: Vec::new(),
            ..after
        },
        before
    );
    assert!(!transition
        .effects
        .iter()
        .any(|effect| matches!(effect, UiEffect::ShowHistory(_))));
    let html = rendered_feedback(&transition.effects);
    assert!(html.contains("Use the Copy button"));
}

#[tokio::test]
async fn rejected_reply_without_state_still_renders_remediation() {
    let service = ScriptedService {
        submit: Some(SubmitResult::rejected("Buggy")),
        ..ScriptedService::new(s0())
    };
    let (controller, before) = started(service).await;
    let transition = controller
        .get_feedback(before.clone(), "p ∧ r")
        .await
        .expect("feedback");
    let after = transition.snapshot;

    assert_eq!(
        after.feedback,
        vec![FeedbackEntry::Checked {
            outcome: FeedbackOutcome::Other("Buggy".into()),
            applied_rules: Vec::new(),
        }]
    );
    assert_eq!(
        Snapshot {
            feedback: Vec::new(),
            ..after
        },
        before
    );
    let html = rendered_feedback(&transition.effects);
    assert!(html.starts_with("<p><strong>Buggy</strong></p>"));
    assert!(html.contains("Use the Copy button"));
}

#[tokio::test]
async fn feedback_log_only_grows_across_a_session() {
    let s1 = ServiceState::new("(p∨r)∧(q∨r)");
    let service = ScriptedService {
        rules: vec![RuleName::new("Distribution")],
        ..accepting(FeedbackOutcome::Ok, &s1)
    };
    let (controller, mut snapshot) = started(service).await;
    let mut previous_len = 0;
    let mut previous_html = String::new();

    for step in 0..5 {
        let transition = match step {
            0 => controller.get_hint(snapshot).await,
            1 => controller.get_ready(snapshot).await,
            2 => controller.get_feedback(snapshot, "(p∨r)∧(q∨r)").await,
            3 => controller.get_next(snapshot, "p").await,
            _ => controller.get_feedback(snapshot, "(p∨r)∧(q∨r)").await,
        }
        .expect("operation");
        let html = rendered_feedback(&transition.effects);
        assert!(transition.snapshot.feedback.len() > previous_len);
        assert!(html.starts_with(&previous_html));
        previous_len = transition.snapshot.feedback.len();
        previous_html = html;
        snapshot = transition.snapshot;
    }
    assert_eq!(snapshot.feedback.last(), Some(&FeedbackEntry::Unchanged));
}

#[tokio::test]
async fn service_failure_surfaces_operation_name() {
    let snapshot = Snapshot::fresh(s0());
    let failing = controller(ScriptedService {
        fail_with_unavailable: true,
        ..ScriptedService::new(s0())
    });

    let err = failing
        .get_remaining(snapshot, EXERCISE)
        .await
        .expect_err("unavailable");
    assert_eq!(err.operation(), "remaining");
    assert!(matches!(
        err,
        ControllerError::Service {
            source: ServiceError::Unavailable,
            ..
        }
    ));
}

#[tokio::test]
async fn text_renderer_can_replace_html() {
    let controller = controller(ScriptedService::new(s0())).with_renderer(TextRenderer::default());
    let transition = controller.generate().await.expect("generate");
    let transition = controller
        .get_feedback(transition.snapshot, EXERCISE)
        .await
        .expect("feedback");
    let text = rendered_feedback(&transition.effects);
    assert_eq!(text, "You have not changed the expression.");
}

#[tokio::test]
async fn redraw_shows_every_panel() {
    let (controller, snapshot) = started(ScriptedService::new(s0())).await;
    let effects = controller.redraw(&snapshot);
    assert_eq!(effects[0], UiEffect::ShowExercise(EXERCISE.into()));
    assert!(effects.contains(&UiEffect::ShowHistory(EXERCISE.into())));
}
