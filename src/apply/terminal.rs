//! Terminal front end: renders the wizard as line prompts.
//!
//! Any prompt also accepts `:back`, `:jump <step>` (1-based) and `:quit`.
//! Pressing Enter on a text prompt keeps the current value. On the optional
//! steps a lone `-` clears it.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use super::model::{
    Choice, DaysPerWeek, DraftUpdate, Experience, Goal, Obstacle, filter_weight_input,
};
use super::steps::{STEPS, StepId};
use super::wizard::{SubmitOutcome, SubmitStatus, Wizard};
use crate::error::Error;

/// How a terminal session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Submitted,
    Abandoned,
}

enum Input {
    Text(String),
    Back,
    Jump(usize),
    Quit,
}

fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    match trimmed {
        ":back" | ":b" => Input::Back,
        ":quit" | ":q" => Input::Quit,
        _ => match trimmed.strip_prefix(":jump") {
            Some(rest) => match rest.trim().parse::<usize>() {
                Ok(n) if n >= 1 => Input::Jump(n - 1),
                // Lands on the out-of-range branch in `jump_to`.
                _ => Input::Jump(usize::MAX),
            },
            None => Input::Text(line.trim_end_matches(['\r', '\n']).to_string()),
        },
    }
}

/// Run the wizard until it is submitted or the user quits / input ends.
pub async fn run<R, W>(wizard: &Wizard, input: R, out: &mut W) -> Result<SessionEnd, Error>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        let snap = wizard.snapshot().await;
        if snap.status == SubmitStatus::Success {
            render_success(out)?;
            return Ok(SessionEnd::Submitted);
        }

        writeln!(out)?;
        writeln!(
            out,
            "APPLICATION • STEP {} / {}   [{}%]",
            snap.step_index + 1,
            STEPS.len(),
            snap.progress_pct
        )?;
        writeln!(out, "{}", snap.step.title())?;
        writeln!(out, "{}", snap.step.hint())?;
        if let Some(err) = &snap.error {
            writeln!(out, "Error: {err}")?;
        }

        let flow = match snap.step {
            StepId::Intro => {
                writeln!(out, "  • No templates. Your approach is built around you.")?;
                writeln!(out, "  • Standards are non-negotiable.")?;
                writeln!(out, "  • Honest answers get the best outcome.")?;
                match prompt(&mut lines, out, "Press Enter to continue").await? {
                    Some(Input::Text(_)) => Flow::Advance,
                    other => Flow::from_nav(other),
                }
            }
            StepId::Identity => {
                let draft = &snap.draft;
                match text_field(&mut lines, out, "Name", &draft.name, false).await? {
                    Ok(name) => {
                        wizard.update(DraftUpdate::Name(name)).await;
                        match text_field(&mut lines, out, "Email", &draft.email, false).await? {
                            Ok(email) => {
                                wizard.update(DraftUpdate::Email(email)).await;
                                Flow::Advance
                            }
                            Err(flow) => flow,
                        }
                    }
                    Err(flow) => flow,
                }
            }
            StepId::Bodyweight => {
                let current = &snap.draft.body_weight_kg;
                match text_field(&mut lines, out, "Body weight (kg)", current, false).await? {
                    Ok(raw) => {
                        let weight = filter_weight_input(&raw);
                        wizard.update(DraftUpdate::BodyWeightKg(weight)).await;
                        Flow::Advance
                    }
                    Err(flow) => flow,
                }
            }
            StepId::Goal => choice::<Goal, _, _>(&mut lines, out, DraftUpdate::Goal).await?,
            StepId::Experience => {
                choice::<Experience, _, _>(&mut lines, out, DraftUpdate::Experience).await?
            }
            StepId::Days => {
                choice::<DaysPerWeek, _, _>(&mut lines, out, DraftUpdate::DaysPerWeek).await?
            }
            StepId::Obstacle => {
                choice::<Obstacle, _, _>(&mut lines, out, DraftUpdate::Obstacle).await?
            }
            StepId::Injuries => {
                let label = "Injuries / limitations (optional)";
                match text_field(&mut lines, out, label, &snap.draft.injuries, true).await? {
                    Ok(v) => {
                        wizard.update(DraftUpdate::Injuries(v)).await;
                        Flow::Advance
                    }
                    Err(flow) => flow,
                }
            }
            StepId::WhyNow => {
                match text_field(&mut lines, out, "Why now?", &snap.draft.why_now, true).await? {
                    Ok(v) => {
                        wizard.update(DraftUpdate::WhyNow(v)).await;
                        Flow::Advance
                    }
                    Err(flow) => flow,
                }
            }
            StepId::Review => {
                for (label, value) in snap.draft.review_rows() {
                    writeln!(out, "  {label:<18} {value}")?;
                }
                match prompt(&mut lines, out, "Type 'submit' to send, or :back to change something")
                    .await?
                {
                    Some(Input::Text(t)) if t.trim().eq_ignore_ascii_case("submit") => {
                        Flow::Submit
                    }
                    Some(Input::Text(_)) => Flow::Stay,
                    other => Flow::from_nav(other),
                }
            }
        };

        match flow {
            Flow::Advance => {
                if !wizard.advance().await {
                    writeln!(out, "Fill in this step before continuing.")?;
                }
            }
            Flow::Selected(update) => {
                wizard.select_and_advance(update).await;
            }
            Flow::Back => {
                wizard.retreat().await;
            }
            Flow::Jump(index) => {
                if let Err(e) = wizard.jump_to(index).await {
                    writeln!(out, "{e}")?;
                }
            }
            Flow::Submit => {
                writeln!(out, "Submitting...")?;
                if let SubmitOutcome::Failed(message) = wizard.submit().await {
                    tracing::debug!(%message, "Terminal submission failed");
                }
            }
            Flow::Stay => {}
            Flow::Quit => return Ok(SessionEnd::Abandoned),
        }
    }
}

/// What the loop does after a prompt.
enum Flow {
    Advance,
    Selected(DraftUpdate),
    Back,
    Jump(usize),
    Submit,
    Stay,
    Quit,
}

impl Flow {
    /// Navigation inputs; EOF counts as quitting.
    fn from_nav(input: Option<Input>) -> Flow {
        match input {
            Some(Input::Back) => Flow::Back,
            Some(Input::Jump(i)) => Flow::Jump(i),
            Some(Input::Text(_)) => Flow::Stay,
            Some(Input::Quit) | None => Flow::Quit,
        }
    }
}

async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> std::io::Result<Option<Input>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}> ")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|line| parse_input(&line)))
}

/// Prompt for a text value. Enter keeps `current`, `-` clears it when
/// `clearable`. `Err` carries navigation.
async fn text_field<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    label: &str,
    current: &str,
    clearable: bool,
) -> std::io::Result<Result<String, Flow>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let label = if current.is_empty() {
        label.to_string()
    } else {
        format!("{label} [{current}]")
    };
    Ok(match prompt(lines, out, &label).await? {
        Some(Input::Text(t)) if t.trim().is_empty() => Ok(current.to_string()),
        Some(Input::Text(t)) if clearable && t.trim() == "-" => Ok(String::new()),
        Some(Input::Text(t)) => Ok(t),
        other => Err(Flow::from_nav(other)),
    })
}

/// List the options of a choice step and read a pick by number or key.
async fn choice<C, R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    wrap: fn(C) -> DraftUpdate,
) -> std::io::Result<Flow>
where
    C: Choice,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    for (i, option) in C::ALL.iter().enumerate() {
        writeln!(out, "  {}) {:<16} {}", i + 1, option.label(), option.blurb())?;
    }

    Ok(match prompt(lines, out, "Select").await? {
        Some(Input::Text(t)) => {
            let t = t.trim();
            let picked = t
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| C::ALL.get(i).copied())
                .or_else(|| C::from_key(t));
            match picked {
                Some(c) => Flow::Selected(wrap(c)),
                None => {
                    writeln!(out, "Pick one of the options above.")?;
                    Flow::Stay
                }
            }
        }
        other => Flow::from_nav(other),
    })
}

fn render_success<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Application received.")?;
    writeln!(
        out,
        "Your answers will be reviewed personally. If accepted, you'll be contacted with next steps."
    )?;
    writeln!(out, "THE PLAN ADAPTS. THE STANDARD DOES NOT.")?;
    Ok(())
}
