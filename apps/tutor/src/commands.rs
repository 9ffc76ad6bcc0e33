//! Commands typed at the tutor prompt.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TutorCommand {
    Generate,
    Ready,
    Hint,
    Next,
    Remaining,
    /// Submit the work area, optionally replacing it first.
    Feedback(Option<String>),
    Work(String),
    Paste,
    Show,
    Help,
    Quit,
}

pub const USAGE: &str = "\
commands:
  generate            start a new exercise
  ready               is the current expression in DNF?
  hint                list applicable rules
  next                show the next step
  remaining           minimum number of steps left
  feedback [EXPR]     submit the work area (or EXPR)
  work EXPR           replace the work area
  paste               copy the suggested step into the work area
  show                redraw all panels
  help                this text
  quit";

pub fn parse_command(line: &str) -> Result<Option<TutorCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "generate" | "new" => TutorCommand::Generate,
        "ready" => TutorCommand::Ready,
        "hint" => TutorCommand::Hint,
        "next" => TutorCommand::Next,
        "remaining" | "steps" => TutorCommand::Remaining,
        "feedback" | "submit" => {
            TutorCommand::Feedback((!rest.is_empty()).then(|| rest.to_string()))
        }
        "work" => {
            if rest.is_empty() {
                return Err("work needs an expression".to_string());
            }
            TutorCommand::Work(rest.to_string())
        }
        "paste" => TutorCommand::Paste,
        "show" => TutorCommand::Show,
        "help" | "?" => TutorCommand::Help,
        "quit" | "exit" => TutorCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type help")),
    };
    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn feedback_takes_optional_expression() {
        assert_eq!(
            parse_command("feedback"),
            Ok(Some(TutorCommand::Feedback(None)))
        );
        assert_eq!(
            parse_command("Submit  ~p \\/ q "),
            Ok(Some(TutorCommand::Feedback(Some("~p \\/ q".into()))))
        );
    }

    #[test]
    fn work_requires_an_expression() {
        assert!(parse_command("work").is_err());
        assert_eq!(
            parse_command("work p ∧ q"),
            Ok(Some(TutorCommand::Work("p ∧ q".into())))
        );
    }

    #[test]
    fn unknown_commands_point_to_help() {
        let err = parse_command("undo").expect_err("unknown");
        assert!(err.contains("type help"));
    }
}
