use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};

use crate::model::action::{Action, ActionState};
use crate::model::project::Project;
use crate::ops::action_ops::{ActionDraft, UNSPECIFIED_WAITING, build_unattached, parse_due};
use crate::ops::context_ops::{is_reserved, normalize_context};
use crate::ops::reconcile::NextActionSource;

/// Asks on the console for a next action for each stalled project.
///
/// End of input at any prompt declines the current project.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
    contexts: Vec<String>,
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W, contexts: Vec<String>) -> Self {
        ConsolePrompter {
            input,
            output,
            contexts,
        }
    }

    /// Print `prompt` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn ask_default(&mut self, prompt: &str, default: &str) -> io::Result<Option<String>> {
        Ok(self
            .ask(&format!("{} [{}] ", prompt, default))?
            .map(|s| if s.is_empty() { default.to_string() } else { s }))
    }

    fn ask_state(&mut self) -> io::Result<Option<ActionState>> {
        loop {
            let Some(raw) = self.ask_default("State (active/waiting/someday):", "active")? else {
                return Ok(None);
            };
            match raw.to_lowercase().parse::<ActionState>() {
                Ok(state) if !state.is_terminal() => return Ok(Some(state)),
                _ => writeln!(self.output, "Invalid state. Use active, waiting, or someday.")?,
            }
        }
    }

    fn choose_context(&mut self) -> io::Result<Option<String>> {
        writeln!(self.output, "\nAvailable contexts:")?;
        for (i, c) in self.contexts.iter().enumerate() {
            writeln!(self.output, "  {}. {}", i + 1, c)?;
        }

        loop {
            let Some(raw) = self.ask("Choose context (number or name): ")? else {
                return Ok(None);
            };
            if let Ok(n) = raw.parse::<usize>() {
                if (1..=self.contexts.len()).contains(&n) {
                    return Ok(Some(self.contexts[n - 1].clone()));
                }
            } else {
                let name = normalize_context(&raw);
                if is_reserved(&name) {
                    writeln!(
                        self.output,
                        "'{}' is a state, not a context. Choose a real context like home or phone.",
                        name
                    )?;
                    continue;
                }
                if self.contexts.contains(&name) {
                    return Ok(Some(name));
                }
            }
            writeln!(
                self.output,
                "Invalid context. Choose a number from the list or type an exact context name."
            )?;
        }
    }

    fn ask_due(&mut self) -> io::Result<Option<Option<String>>> {
        loop {
            let Some(raw) = self.ask("Due date (YYYY-MM-DD, or blank): ")? else {
                return Ok(None);
            };
            match parse_due(Some(&raw)) {
                Ok(_) if raw.is_empty() => return Ok(Some(None)),
                Ok(_) => return Ok(Some(Some(raw))),
                Err(e) => writeln!(self.output, "{}", e)?,
            }
        }
    }

    fn preview(&mut self, project: &Project, action: &Action) -> io::Result<()> {
        writeln!(self.output, "\nNew next action:")?;
        writeln!(self.output, "  Title:   {}", action.title)?;
        writeln!(self.output, "  Project: {}", project.title)?;
        writeln!(self.output, "  State:   {}", action.state)?;
        match (&action.waiting_for, &action.context) {
            (Some(who), _) => writeln!(self.output, "  Waiting: {}", who)?,
            (None, Some(ctx)) => writeln!(self.output, "  Context: @{}", ctx)?,
            (None, None) => {}
        }
        if let Some(due) = action.due {
            writeln!(self.output, "  Due:     {}", due)?;
        }
        if !action.notes.is_empty() {
            writeln!(self.output, "  Notes:   {}", action.notes)?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> NextActionSource for ConsolePrompter<R, W> {
    fn next_action(
        &mut self,
        _project_id: &str,
        project: &Project,
        now: DateTime<Utc>,
    ) -> io::Result<Option<Action>> {
        writeln!(self.output, "\nProject stalled: {}", project.title)?;

        let Some(ans) = self.ask("Add a next action now? [Y/n]: ")? else {
            return Ok(None);
        };
        if is_no(&ans) {
            return Ok(None);
        }

        let Some(title) = self.ask("Action title: ")? else {
            return Ok(None);
        };
        if title.is_empty() {
            writeln!(self.output, "Action title is required.")?;
            return Ok(None);
        }

        let Some(state) = self.ask_state()? else {
            return Ok(None);
        };

        let mut draft = ActionDraft {
            title,
            state: Some(state.as_str().to_string()),
            ..Default::default()
        };
        if state == ActionState::Waiting {
            let Some(who) = self.ask_default("Waiting for (person/thing):", UNSPECIFIED_WAITING)?
            else {
                return Ok(None);
            };
            draft.waiting_for = Some(who);
        } else {
            if self.contexts.is_empty() {
                writeln!(
                    self.output,
                    "No contexts configured. Add contexts with `gtd context add ...`."
                )?;
                return Ok(None);
            }
            let Some(ctx) = self.choose_context()? else {
                return Ok(None);
            };
            draft.context = Some(ctx);
        }

        let Some(due) = self.ask_due()? else {
            return Ok(None);
        };
        draft.due = due;

        let Some(notes) = self.ask("Notes (optional): ")? else {
            return Ok(None);
        };
        draft.notes = Some(notes);

        let action = match build_unattached(&draft, &self.contexts, now) {
            Ok(action) => action,
            Err(e) => {
                writeln!(self.output, "{}", e)?;
                return Ok(None);
            }
        };

        self.preview(project, &action)?;
        let Some(confirm) = self.ask("Save this next action? [Y/n]: ")? else {
            return Ok(None);
        };
        if is_no(&confirm) {
            writeln!(self.output, "Cancelled. Not saved.")?;
            return Ok(None);
        }
        Ok(Some(action))
    }
}

fn is_no(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "n" | "no")
}
