//! Terminal driver: line commands on stdin, screens on stdout.

use std::str::FromStr;
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::advisory::ContextChoice;
use crate::contact::{CONTACT_EMAIL, ContactCard, ContactForm};
use crate::error::FlowError;
use crate::flow::screens::ScreenBody;
use crate::flow::selection::{AdvancePolicy, SelectionOutcome};
use crate::flow::{CardStep, ChoiceValue, FeatureKey, JourneyStep, ScreenSource};
use crate::gesture::{DragSample, GestureRejection, WheelSample};
use crate::session::FlowSession;

pub const HELP: &str = "\
Commands:
  next | n                 advance one step
  prev | p                 go back one step
  back | b                 the back control
  goto <step>              jump to a step
  finish                   the final screen's continue action
  select <choice>          commit a choice on the current step
  confirm                  press continue on a choice step
  drag <offset> [velocity] release a horizontal drag
  wheel <delta_y>          one wheel tick
  entry <choice>           walkthrough entry overlay
  feature <key>            open a feature card (walkthrough explore)
  restart                  start over
  status                   show the current screen
  vcard                    print the contact card
  mailto <name>|<email>|<message>
  help | quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Previous,
    Back,
    GoTo(String),
    Finish,
    Select(String),
    Confirm,
    Drag { offset: f32, velocity: f32 },
    Wheel { delta_y: f32 },
    Entry(ChoiceValue),
    Feature(FeatureKey),
    Restart,
    Status,
    VCard,
    Mailto(ContactForm),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = FlowError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let head = head.strip_prefix('/').unwrap_or(head).to_lowercase();

        let require = |what: &str| {
            if rest.is_empty() {
                Err(FlowError::InvalidCommand(format!("{head} needs {what}")))
            } else {
                Ok(rest.to_string())
            }
        };

        let cmd = match head.as_str() {
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "back" | "b" => Self::Back,
            "goto" | "go" => Self::GoTo(require("a step name")?),
            "finish" => Self::Finish,
            "select" | "s" => Self::Select(require("a choice")?),
            "confirm" | "continue" => Self::Confirm,
            "drag" => {
                let mut nums = rest.split_whitespace().map(parse_number);
                let offset = nums
                    .next()
                    .ok_or_else(|| FlowError::InvalidCommand("drag needs an offset".into()))??;
                let velocity = nums.next().transpose()?.unwrap_or(0.0);
                Self::Drag { offset, velocity }
            }
            "wheel" => Self::Wheel {
                delta_y: parse_number(&require("a delta")?)?,
            },
            "entry" => Self::Entry(require("a choice")?.parse()?),
            "feature" | "f" => Self::Feature(require("a feature")?.parse()?),
            "restart" | "start-over" => Self::Restart,
            "status" | "" => Self::Status,
            "vcard" => Self::VCard,
            "mailto" => {
                let raw = require("name|email|message")?;
                let mut parts = raw.splitn(3, '|').map(|p| p.trim().to_string());
                Self::Mailto(ContactForm {
                    name: parts.next().unwrap_or_default(),
                    email: parts.next().unwrap_or_default(),
                    message: parts.next().unwrap_or_default(),
                })
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(FlowError::InvalidCommand(other.to_string())),
        };
        Ok(cmd)
    }
}

fn parse_number(raw: &str) -> Result<f32, FlowError> {
    raw.trim()
        .parse()
        .map_err(|_| FlowError::InvalidCommand(format!("not a number: {raw}")))
}

/// What the driver should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Show(String),
    Quit,
}

/// The flow the driver is running.
pub enum ActiveFlow {
    Card(FlowSession<CardStep>),
    Walkthrough(FlowSession<JourneyStep>),
}

impl ActiveFlow {
    pub async fn execute(&mut self, cmd: Command) -> Result<Reply, FlowError> {
        match self {
            Self::Card(session) => execute_common(session, cmd).await,
            Self::Walkthrough(session) => match cmd {
                Command::Entry(choice) => {
                    session.choose_entry(choice).await;
                    Ok(Reply::Show(describe(session)))
                }
                Command::Feature(feature) => {
                    if !session.view_feature(feature).await {
                        tracing::debug!(feature = %feature, "Feature view changed nothing");
                    }
                    let card = feature.card();
                    Ok(Reply::Show(format!(
                        "{}: {}\n  before: {}\n  after:  {}\n\n{}",
                        card.title,
                        card.description,
                        card.problems.join(" / "),
                        card.solutions.join(" / "),
                        describe(session)
                    )))
                }
                Command::Restart => {
                    session.start_over().await;
                    Ok(Reply::Show(format!(
                        "Where are you right now? (entry landed|housing|essentials|community)\n\n{}",
                        describe(session)
                    )))
                }
                other => execute_common(session, other).await,
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Card(session) => describe(session),
            Self::Walkthrough(session) => describe(session),
        }
    }
}

async fn execute_common<S>(session: &mut FlowSession<S>, cmd: Command) -> Result<Reply, FlowError>
where
    S: ScreenSource,
    S::Choice: ContextChoice + FromStr<Err = FlowError>,
{
    match cmd {
        Command::Next => {
            session.next().await;
        }
        Command::Previous => {
            session.previous().await;
        }
        Command::Back => {
            session.back().await;
        }
        Command::GoTo(name) => {
            let step = S::from_name(&name).ok_or(FlowError::UnknownStep(name))?;
            session.go_to(step).await;
        }
        Command::Finish => {
            session.finish().await;
        }
        Command::Select(raw) => {
            let choice: S::Choice = raw.parse()?;
            if session.select(choice).await == SelectionOutcome::Ignored {
                return Ok(Reply::Show("Nothing to select on this screen.".to_string()));
            }
        }
        Command::Confirm => {
            if session.confirm().await == SelectionOutcome::Ignored {
                let reply = match session.current().selection_policy() {
                    Some(AdvancePolicy::ConfirmRequired) => "Pick an option first.",
                    _ => "Nothing to confirm on this screen.",
                };
                return Ok(Reply::Show(reply.to_string()));
            }
        }
        Command::Drag { offset, velocity } => {
            if let Err(GestureRejection::Cancelled) =
                session.drag(DragSample { offset, velocity }).await
            {
                return Ok(Reply::Show("(snapped back)".to_string()));
            }
        }
        Command::Wheel { delta_y } => {
            if let Err(rejection) = session.wheel(WheelSample { delta_y }, Instant::now()).await {
                return Ok(Reply::Show(format!("(wheel ignored: {rejection:?})")));
            }
        }
        Command::Entry(_) | Command::Feature(_) => {
            return Err(FlowError::InvalidCommand(
                "only available in the walkthrough".to_string(),
            ));
        }
        Command::Restart => session.restart().await,
        Command::Status => {}
        Command::VCard => return Ok(Reply::Show(ContactCard::founder().to_vcard())),
        Command::Mailto(form) => return Ok(Reply::Show(form.mailto_uri(CONTACT_EMAIL))),
        Command::Help => return Ok(Reply::Show(HELP.to_string())),
        Command::Quit => return Ok(Reply::Quit),
    }
    Ok(Reply::Show(describe(session)))
}

/// Text rendering of the current screen plus the advisory panel.
pub fn describe<S>(session: &FlowSession<S>) -> String
where
    S: ScreenSource,
    S::Choice: ContextChoice,
{
    let screen = session.render();
    let mut out = String::new();

    if let Some(progress) = session.progress().filter(|_| screen.content.shows_progress) {
        out.push_str(&format!("{} {}\n", progress.bar(), progress.label()));
    }
    out.push_str(&format!("{}\n{}\n", screen.content.title, screen.content.subtitle));

    match &screen.body {
        ScreenBody::Plain => {}
        ScreenBody::Choices { options, selected } => {
            for (value, label) in options {
                let mark = if selected.as_deref() == Some(value.as_str()) {
                    "●"
                } else {
                    "○"
                };
                out.push_str(&format!("  {mark} {label} [{value}]\n"));
            }
        }
        ScreenBody::Features { headline, cards } => {
            out.push_str(&format!("  {headline}\n"));
            for key in cards {
                let card = key.card();
                out.push_str(&format!("  - {} [{key}]: {}\n", card.title, card.description));
            }
        }
    }

    if let Some(action) = screen.content.primary_action {
        let enabled = session.can_confirm() || screen.step.selection_policy().is_none();
        if enabled {
            out.push_str(&format!("  > {action}\n"));
        }
    }

    let insights = session.insights();
    if !insights.is_empty() {
        out.push_str(&format!("  What I understand: {}\n", insights.join("; ")));
    }
    out.push_str(&format!("💬 {}", session.advisory_text()));
    out
}

/// Read commands from stdin until EOF or `quit`.
pub async fn run(mut flow: ActiveFlow) -> crate::error::Result<()> {
    println!("{}\n", flow.describe());
    eprint!("> ");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let reply = match line.parse::<Command>() {
            Ok(cmd) => flow.execute(cmd).await,
            Err(e) => Err(e),
        };
        match reply {
            Ok(Reply::Show(text)) => println!("\n{text}\n"),
            Ok(Reply::Quit) => break,
            Err(e) => eprintln!("{e}. Type `help` for commands."),
        }
        eprint!("> ");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowConfig;

    fn card_flow() -> ActiveFlow {
        ActiveFlow::Card(FlowSession::new(&FlowConfig::default(), None))
    }

    fn walkthrough() -> ActiveFlow {
        ActiveFlow::Walkthrough(FlowSession::new(&FlowConfig::default(), None))
    }

    #[test]
    fn parses_basic_commands() {
        assert_eq!("n".parse::<Command>().unwrap(), Command::Next);
        assert_eq!("/back".parse::<Command>().unwrap(), Command::Back);
        assert_eq!(
            "goto story".parse::<Command>().unwrap(),
            Command::GoTo("story".to_string())
        );
        assert_eq!(
            "drag 70".parse::<Command>().unwrap(),
            Command::Drag {
                offset: 70.0,
                velocity: 0.0
            }
        );
        assert_eq!(
            "drag -10 -800".parse::<Command>().unwrap(),
            Command::Drag {
                offset: -10.0,
                velocity: -800.0
            }
        );
        assert_eq!(
            "entry rides".parse::<Command>().unwrap(),
            Command::Entry(ChoiceValue::Essentials)
        );
        assert_eq!(
            "feature housing".parse::<Command>().unwrap(),
            Command::Feature(FeatureKey::Rooms)
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            "dance".parse::<Command>(),
            Err(FlowError::InvalidCommand(_))
        ));
        assert!("goto".parse::<Command>().is_err());
        assert!("wheel lots".parse::<Command>().is_err());
        assert_eq!(
            "entry moon".parse::<Command>(),
            Err(FlowError::UnknownChoice("moon".to_string()))
        );
    }

    #[test]
    fn parses_mailto_fields() {
        match "mailto Ana | ana@example.com | hello there".parse::<Command>().unwrap() {
            Command::Mailto(form) => {
                assert_eq!(form.name, "Ana");
                assert_eq!(form.email, "ana@example.com");
                assert_eq!(form.message, "hello there");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn card_flow_commands() {
        let mut flow = card_flow();
        flow.execute(Command::Next).await.unwrap();
        let Reply::Show(text) = flow
            .execute(Command::Select("housing".into()))
            .await
            .unwrap()
        else {
            panic!("expected screen");
        };
        assert!(text.contains("● Looking for housing [housing]"));
        assert!(text.contains("Got it, housing feels urgent"));

        flow.execute(Command::Confirm).await.unwrap();
        assert!(flow.describe().contains("Looking for housing? Here's how Setly helps"));

        assert_eq!(
            flow.execute(Command::GoTo("nowhere".into())).await,
            Err(FlowError::UnknownStep("nowhere".into()))
        );
        assert!(flow.execute(Command::Feature(FeatureKey::Rides)).await.is_err());
        assert_eq!(flow.execute(Command::Quit).await.unwrap(), Reply::Quit);
    }

    #[tokio::test]
    async fn walkthrough_commands() {
        let mut flow = walkthrough();
        flow.execute(Command::Entry(ChoiceValue::Essentials)).await.unwrap();
        flow.execute(Command::Select("essentials".into())).await.unwrap();
        let Reply::Show(text) = flow
            .execute(Command::Feature(FeatureKey::Marketplace))
            .await
            .unwrap()
        else {
            panic!("expected screen");
        };
        assert!(text.starts_with("Essentials: Buy & sell what you need"));
        assert!(text.contains("Explored 1 feature"));

        let Reply::Show(text) = flow.execute(Command::Restart).await.unwrap() else {
            panic!("expected screen");
        };
        assert!(text.starts_with("Where are you right now?"));
    }

    #[tokio::test]
    async fn confirm_reply_depends_on_screen() {
        let mut flow = card_flow();
        assert_eq!(
            flow.execute(Command::Confirm).await.unwrap(),
            Reply::Show("Nothing to confirm on this screen.".to_string())
        );

        flow.execute(Command::Next).await.unwrap();
        assert_eq!(
            flow.execute(Command::Confirm).await.unwrap(),
            Reply::Show("Pick an option first.".to_string())
        );
    }

    #[tokio::test]
    async fn waitlist_hides_progress_bar() {
        let mut flow = card_flow();
        flow.execute(Command::GoTo("story".into())).await.unwrap();
        assert!(flow.describe().contains("Step 6 of 6"));
        flow.execute(Command::Finish).await.unwrap();
        assert!(!flow.describe().contains("Step"));
    }
}
