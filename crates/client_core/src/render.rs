//! Presentation of the feedback and history logs.

use std::fmt::Write as _;

use shared::{domain::RuleName, protocol::FeedbackOutcome};
use tracing::warn;

use crate::{
    format::{ExpressionFormat, LogicNotation},
    types::{FeedbackEntry, Suggestion},
};

/// User-facing sentence fragments.
#[derive(Debug, Clone)]
pub struct Phrases {
    pub yes: String,
    pub no: String,
    pub ready: String,
    pub not: String,
    pub applicable: String,
    pub sorry: String,
    pub changed: String,
    pub rule: String,
    pub resulting: String,
    pub paste: String,
    pub for_expression: String,
    pub minimum: String,
    pub steps: String,
    pub unchanged: String,
    pub applied: String,
    pub detour: String,
    pub copy_button: String,
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            yes: "Yes".into(),
            no: "No".into(),
            ready: "in disjunctive normal form".into(),
            not: "not".into(),
            applicable: "Applicable rules for".into(),
            sorry: "Sorry, there is no rule that can be applied to".into(),
            changed: "The expression in the work area has changed.".into(),
            rule: "rule".into(),
            resulting: "This results in".into(),
            paste: "Press Paste to copy the resulting expression to the work area.".into(),
            for_expression: "For".into(),
            minimum: "the minimum number of steps to reach the solution is".into(),
            steps: "steps".into(),
            unchanged: "You have not changed the expression.".into(),
            applied: "Applied rules:".into(),
            detour: "This is a correct step, but it takes another path than the one expected.".into(),
            copy_button: "Use the Copy button to restore the last correct expression and use Paste to continue from it.".into(),
        }
    }
}

pub trait FeedbackRenderer: Send + Sync {
    fn render_feedback(&self, entries: &[FeedbackEntry]) -> String;
    fn render_history(&self, history: &[String]) -> String;
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn join_rules(rules: &[RuleName]) -> String {
    rules
        .iter()
        .map(RuleName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `<p>` blocks, expressions in `<strong>`, history joined by `<br>`.
pub struct HtmlRenderer {
    phrases: Phrases,
    format: Box<dyn ExpressionFormat>,
}

impl HtmlRenderer {
    pub fn new(phrases: Phrases) -> Self {
        Self::with_format(phrases, LogicNotation)
    }

    pub fn with_format(phrases: Phrases, format: impl ExpressionFormat + 'static) -> Self {
        Self {
            phrases,
            format: Box::new(format),
        }
    }

    fn expr(&self, plain: &str) -> String {
        escape_html(&self.format.to_markup(plain))
    }

    fn text(&self, phrase: &str) -> String {
        escape_html(phrase)
    }

    fn write_entry(&self, out: &mut String, entry: &FeedbackEntry) -> std::fmt::Result {
        let p = &self.phrases;
        match entry {
            FeedbackEntry::Ready {
                expression,
                solved: true,
            } => write!(
                out,
                "<p>{}, <strong>{}</strong> is {}.</p>",
                self.text(&p.yes),
                self.expr(expression),
                self.text(&p.ready)
            ),
            FeedbackEntry::Ready {
                expression,
                solved: false,
            } => write!(
                out,
                "<p>{}, <strong>{}</strong> is <strong>{}</strong> {}.</p>",
                self.text(&p.no),
                self.expr(expression),
                self.text(&p.not),
                self.text(&p.ready)
            ),
            FeedbackEntry::Hint { expression, rules } if rules.is_empty() => {
                self.write_sorry(out, expression)
            }
            FeedbackEntry::Hint { expression, rules } => write!(
                out,
                "<p>{} <strong>{}</strong>:<br><br><strong>{}</strong></p>",
                self.text(&p.applicable),
                self.expr(expression),
                escape_html(&join_rules(rules))
            ),
            FeedbackEntry::Changed => write!(out, "<p>{}</p>", self.text(&p.changed)),
            FeedbackEntry::Next {
                expression,
                suggestion: Some(Suggestion { rule, result }),
            } => write!(
                out,
                "<p>{} <strong>{}</strong>:<br><br><strong>{}</strong> {}</p><p>{} <strong>{}</strong></p><p>{}</p>",
                self.text(&p.applicable),
                self.expr(expression),
                escape_html(rule.as_str()),
                self.text(&p.rule),
                self.text(&p.resulting),
                self.expr(result),
                self.text(&p.paste)
            ),
            FeedbackEntry::Next {
                expression,
                suggestion: None,
            } => self.write_sorry(out, expression),
            FeedbackEntry::Remaining { expression, steps } => write!(
                out,
                "<p>{} <strong>{}</strong>, {} <br><strong>{}</strong> {}.</p>",
                self.text(&p.for_expression),
                self.expr(expression),
                self.text(&p.minimum),
                steps,
                self.text(&p.steps)
            ),
            FeedbackEntry::Unchanged => write!(out, "<p>{}</p>", self.text(&p.unchanged)),
            FeedbackEntry::Checked {
                outcome,
                applied_rules,
            } => self.write_checked(out, outcome, applied_rules),
        }
    }

    fn write_sorry(&self, out: &mut String, expression: &str) -> std::fmt::Result {
        write!(
            out,
            "<p>{} <strong>{}</strong></p>",
            self.text(&self.phrases.sorry),
            self.expr(expression)
        )
    }

    fn write_checked(
        &self,
        out: &mut String,
        outcome: &FeedbackOutcome,
        applied_rules: &[RuleName],
    ) -> std::fmt::Result {
        let p = &self.phrases;
        write!(out, "<p><strong>{}</strong></p>", escape_html(outcome.as_str()))?;
        match outcome {
            FeedbackOutcome::Ok => {}
            FeedbackOutcome::Detour => {
                write!(out, "<p><strong>{}</strong></p>", self.text(&p.detour))?;
            }
            FeedbackOutcome::Other(_) => {
                return write!(out, "<p>{}</p>", self.text(&p.copy_button));
            }
        }
        if !applied_rules.is_empty() {
            write!(
                out,
                "<p>{} <strong>{}</strong></p>",
                self.text(&p.applied),
                escape_html(&join_rules(applied_rules))
            )?;
        }
        Ok(())
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(Phrases::default())
    }
}

impl FeedbackRenderer for HtmlRenderer {
    fn render_feedback(&self, entries: &[FeedbackEntry]) -> String {
        let mut out = String::new();
        if let Err(err) = entries
            .iter()
            .try_for_each(|entry| self.write_entry(&mut out, entry))
        {
            warn!(error = %err, "feedback rendering stopped early");
        }
        out
    }

    fn render_history(&self, history: &[String]) -> String {
        history
            .iter()
            .map(|expression| self.expr(expression))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

/// One line per entry, for terminals.
pub struct TextRenderer {
    phrases: Phrases,
    format: Box<dyn ExpressionFormat>,
}

impl TextRenderer {
    pub fn new(phrases: Phrases) -> Self {
        Self::with_format(phrases, LogicNotation)
    }

    pub fn with_format(phrases: Phrases, format: impl ExpressionFormat + 'static) -> Self {
        Self {
            phrases,
            format: Box::new(format),
        }
    }

    fn line(&self, entry: &FeedbackEntry) -> String {
        let p = &self.phrases;
        let expr = |plain: &str| self.format.to_markup(plain);
        match entry {
            FeedbackEntry::Ready {
                expression,
                solved: true,
            } => format!("{}, {} is {}.", p.yes, expr(expression), p.ready),
            FeedbackEntry::Ready {
                expression,
                solved: false,
            } => format!("{}, {} is {} {}.", p.no, expr(expression), p.not, p.ready),
            FeedbackEntry::Hint { expression, rules } if rules.is_empty() => {
                format!("{} {}", p.sorry, expr(expression))
            }
            FeedbackEntry::Hint { expression, rules } => {
                format!("{} {}: {}", p.applicable, expr(expression), join_rules(rules))
            }
            FeedbackEntry::Changed => p.changed.clone(),
            FeedbackEntry::Next {
                expression,
                suggestion: Some(Suggestion { rule, result }),
            } => format!(
                "{} {}: {} {}. {} {}. {}",
                p.applicable,
                expr(expression),
                rule,
                p.rule,
                p.resulting,
                expr(result),
                p.paste
            ),
            FeedbackEntry::Next {
                expression,
                suggestion: None,
            } => format!("{} {}", p.sorry, expr(expression)),
            FeedbackEntry::Remaining { expression, steps } => format!(
                "{} {}, {} {} {}.",
                p.for_expression,
                expr(expression),
                p.minimum,
                steps,
                p.steps
            ),
            FeedbackEntry::Unchanged => p.unchanged.clone(),
            FeedbackEntry::Checked {
                outcome,
                applied_rules,
            } => {
                let mut line = outcome.as_str().to_string();
                match outcome {
                    FeedbackOutcome::Other(_) => {
                        line.push_str(". ");
                        line.push_str(&p.copy_button);
                        return line;
                    }
                    FeedbackOutcome::Detour => {
                        line.push_str(". ");
                        line.push_str(&p.detour);
                    }
                    FeedbackOutcome::Ok => {}
                }
                if !applied_rules.is_empty() {
                    line.push_str(&format!(". {} {}", p.applied, join_rules(applied_rules)));
                }
                line
            }
        }
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(Phrases::default())
    }
}

impl FeedbackRenderer for TextRenderer {
    fn render_feedback(&self, entries: &[FeedbackEntry]) -> String {
        entries
            .iter()
            .map(|entry| self.line(entry))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_history(&self, history: &[String]) -> String {
        history
            .iter()
            .map(|expression| self.format.to_markup(expression))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
