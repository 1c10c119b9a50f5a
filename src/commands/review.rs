//! Interactive review command
//!
//! A line-oriented shell over one sermon's review session. Commands act on
//! the selected slide; the slide is re-rendered whenever the session
//! publishes a change.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::SyncGateway;
use crate::progress::spinner;
use crate::review::{
    ApplyOutcome, DecisionAction, Navigator, ReviewSession, SlideAggregate, StateChange,
};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const HELP: &str = "\
Commands:
  show                 Show the current slide
  slides               List all slides
  goto N               Select slide N
  next, prev           Move to the following / preceding slide
  analyze              Run AI analysis on the current slide
  accept ID            Accept a suggestion
  reject ID            Reject a suggestion
  edit ID [TEXT]       Edit a suggestion (defaults to the proposed text)
  text ID TEXT         Replace the text of an edited suggestion
  save                 Save the current slide's decisions
  generate             Regenerate the presentation from saved decisions
  download             Download the regenerated presentation
  reload               Re-fetch slides, analysis and decisions
  help                 Show this help
  quit                 Leave the review";

/// One line of reviewer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Show,
    Slides,
    Goto(u32),
    Next,
    Prev,
    Analyze,
    Accept(String),
    Reject(String),
    Edit(String, Option<String>),
    Text(String, String),
    Save,
    Generate,
    Download,
    Reload,
    Help,
    Quit,
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn require_id(command: &str, rest: &str) -> Result<String> {
    let (id, _) = split_word(rest);
    if id.is_empty() {
        return Err(Error::InvalidCommand(format!(
            "'{}' needs a suggestion ID",
            command
        )));
    }
    Ok(id.to_string())
}

impl FromStr for ReviewCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let (word, rest) = split_word(line);
        let command = match word.to_lowercase().as_str() {
            "show" | "s" => ReviewCommand::Show,
            "slides" | "ls" => ReviewCommand::Slides,
            "goto" | "g" => {
                let number = rest.parse::<u32>().map_err(|_| {
                    Error::InvalidCommand(format!("'goto' needs a slide number, got '{}'", rest))
                })?;
                ReviewCommand::Goto(number)
            }
            "next" | "n" => ReviewCommand::Next,
            "prev" | "p" => ReviewCommand::Prev,
            "analyze" | "a" => ReviewCommand::Analyze,
            "accept" => ReviewCommand::Accept(require_id("accept", rest)?),
            "reject" => ReviewCommand::Reject(require_id("reject", rest)?),
            "edit" => {
                let id = require_id("edit", rest)?;
                let (_, text) = split_word(rest);
                let text = (!text.is_empty()).then(|| text.to_string());
                ReviewCommand::Edit(id, text)
            }
            "text" => {
                let id = require_id("text", rest)?;
                let (_, text) = split_word(rest);
                ReviewCommand::Text(id, text.to_string())
            }
            "save" => ReviewCommand::Save,
            "generate" => ReviewCommand::Generate,
            "download" => ReviewCommand::Download,
            "reload" => ReviewCommand::Reload,
            "help" | "?" => ReviewCommand::Help,
            "quit" | "exit" | "q" => ReviewCommand::Quit,
            other => {
                return Err(Error::InvalidCommand(format!(
                    "unknown command '{}' (type 'help')",
                    other
                )))
            }
        };
        Ok(command)
    }
}

/// Whether the shell keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ReviewShell<'a> {
    config: &'a Config,
    gateway: &'a SyncGateway,
    sermon_id: String,
    session: ReviewSession,
    changes: watch::Receiver<StateChange>,
    quiet: bool,
    quit_armed: bool,
}

impl<'a> ReviewShell<'a> {
    pub fn new(config: &'a Config, gateway: &'a SyncGateway, sermon_id: &str) -> Self {
        let session = ReviewSession::new();
        let changes = session.subscribe();
        Self {
            config,
            gateway,
            sermon_id: sermon_id.to_string(),
            session,
            changes,
            quiet: false,
            quit_armed: false,
        }
    }

    /// Suppress spinners
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    /// Fetch (or re-fetch) the sermon's slides, analysis and decisions
    pub async fn load(&mut self) -> Result<()> {
        let pb = spinner(format!("Loading sermon {}", self.sermon_id), self.quiet);
        let result = self
            .gateway
            .load_review(&mut self.session, &self.sermon_id)
            .await;
        pb.finish_and_clear();

        if result? == ApplyOutcome::Discarded {
            debug!("Discarded review data for {}", self.sermon_id);
        }
        Ok(())
    }

    /// The latest unseen change, if the session changed since the last call
    pub fn take_change(&mut self) -> Option<StateChange> {
        if self.changes.has_changed().unwrap_or(false) {
            Some(*self.changes.borrow_and_update())
        } else {
            None
        }
    }

    fn selected(&self) -> Result<u32> {
        if !self.session.is_loaded() {
            return Err(Error::NoSermonSelected);
        }
        self.session
            .selected_number()
            .ok_or(Error::NoSermonSelected)
    }

    pub async fn execute(&mut self, command: ReviewCommand) -> Result<Flow> {
        if command != ReviewCommand::Quit {
            self.quit_armed = false;
        }

        match command {
            ReviewCommand::Show => println!("{}", self.render_current()),
            ReviewCommand::Slides => println!("{}", render_slide_list(&self.session)),
            ReviewCommand::Goto(number) => {
                let before = self.session.selected_number();
                if !Navigator::new(&mut self.session).select_slide(number) {
                    return Err(Error::SlideNotFound(number));
                }
                if before == Some(number) {
                    println!("{}", self.render_current());
                }
            }
            ReviewCommand::Next => {
                if !Navigator::new(&mut self.session).next() {
                    println!("Already at the last slide");
                }
            }
            ReviewCommand::Prev => {
                if !Navigator::new(&mut self.session).previous() {
                    println!("Already at the first slide");
                }
            }
            ReviewCommand::Analyze => self.analyze().await?,
            ReviewCommand::Accept(id) => self.decide(&id, DecisionAction::Accept)?,
            ReviewCommand::Reject(id) => self.decide(&id, DecisionAction::Reject)?,
            ReviewCommand::Edit(id, text) => self.decide(&id, DecisionAction::Edit(text))?,
            ReviewCommand::Text(id, text) => self.decide(&id, DecisionAction::SetText(text))?,
            ReviewCommand::Save => self.save().await?,
            ReviewCommand::Generate => self.generate().await?,
            ReviewCommand::Download => {
                let dir = Path::new(&self.config.download_dir);
                let path = self.gateway.download_output(&self.sermon_id, dir).await?;
                println!("✓ Saved to {}", path.display());
            }
            ReviewCommand::Reload => self.load().await?,
            ReviewCommand::Help => println!("{}", HELP),
            ReviewCommand::Quit => {
                if self.session.has_unsaved_changes() && !self.quit_armed {
                    self.quit_armed = true;
                    println!(
                        "⚠ Unsaved decisions on slide(s) {}. Type 'quit' again to discard them.",
                        join_numbers(&self.session.unsaved_slides())
                    );
                } else {
                    return Ok(Flow::Quit);
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn analyze(&mut self) -> Result<()> {
        let slide_number = self.selected()?;
        // Results are tagged with the sermon they were requested for
        let sermon_id = self.sermon_id.clone();

        let pb = spinner(format!("Analyzing slide {}", slide_number), self.quiet);
        let result = self.gateway.analyze_slide(&sermon_id, slide_number).await;
        pb.finish_and_clear();
        let analysis = result?;

        let count = analysis.suggestions.len();
        if self.session.apply_analysis(&sermon_id, analysis) == ApplyOutcome::Discarded {
            warn!("Dropped analysis for {}: session moved on", sermon_id);
            return Ok(());
        }
        info!("Slide {} has {} suggestion(s)", slide_number, count);
        Ok(())
    }

    fn decide(&mut self, suggestion_id: &str, action: DecisionAction) -> Result<()> {
        let slide_number = self.selected()?;
        let decision = self.session.decide(slide_number, suggestion_id, action)?;
        println!("✓ {}: {}", suggestion_id, decision.label());
        Ok(())
    }

    async fn save(&mut self) -> Result<()> {
        let slide_number = self.selected()?;
        let sermon_id = self.sermon_id.clone();

        let pb = spinner(format!("Saving slide {}", slide_number), self.quiet);
        let result = self.gateway.save_decisions(&self.session, slide_number).await;
        pb.finish_and_clear();
        let saved = result?;

        if self.session.mark_saved(&sermon_id, slide_number) == ApplyOutcome::Applied {
            println!(
                "✓ Saved {} decision(s) for slide {}",
                saved.decisions.len(),
                slide_number
            );
        }
        Ok(())
    }

    async fn generate(&mut self) -> Result<()> {
        let unsaved = self.session.unsaved_slides();
        if !unsaved.is_empty() {
            println!(
                "⚠ Slide(s) {} have unsaved decisions that will not be included",
                join_numbers(&unsaved)
            );
        }

        let pb = spinner("Generating updated presentation", self.quiet);
        let result = self.gateway.generate_output(&self.sermon_id).await;
        pb.finish_and_clear();
        let receipt = result?;

        println!("✓ Updated presentation is {}", receipt.status);
        println!("  Type 'download' to fetch it");
        Ok(())
    }

    pub fn render_current(&self) -> String {
        let counter = self.session.counter_label();
        match self.session.current() {
            Some(aggregate) => {
                let unsaved = self
                    .session
                    .unsaved_slides()
                    .contains(&aggregate.slide.slide_number);
                render_slide(&aggregate, &counter, unsaved)
            }
            None if self.session.is_loaded() => "This sermon has no slides.".to_string(),
            None => "Nothing loaded. Type 'reload' to try again.".to_string(),
        }
    }
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one slide with its suggestions and their decisions
pub fn render_slide(aggregate: &SlideAggregate<'_>, counter: &str, unsaved: bool) -> String {
    let mut out = String::new();
    let marker = if unsaved { "  * unsaved" } else { "" };
    let _ = writeln!(out, "\n── {} ({}){}", counter, aggregate.slide_id(), marker);
    for line in aggregate.slide.original_text.lines() {
        let _ = writeln!(out, "   {}", line);
    }
    let _ = writeln!(out);

    if !aggregate.is_analyzed() {
        let _ = write!(out, "Not analyzed yet. Type 'analyze' to get suggestions.");
        return out;
    }
    if aggregate.suggestions.is_empty() {
        let _ = write!(out, "No suggestions for this slide.");
        return out;
    }

    let _ = writeln!(
        out,
        "Suggestions ({} decided, {} pending):",
        aggregate.decided_count(),
        aggregate.undecided_count()
    );
    for view in &aggregate.suggestions {
        let s = view.suggestion;
        let status = view
            .decision
            .map(|d| d.label())
            .unwrap_or_else(|| "undecided".to_string());
        let _ = writeln!(
            out,
            "  [{}] {} {}  {}",
            s.id,
            s.category,
            s.confidence_label(),
            status
        );
        let _ = writeln!(out, "      - {}", s.original);
        let _ = writeln!(out, "      + {}", s.proposed);
        if let Some(explanation) = &s.explanation {
            let _ = writeln!(out, "      why: {}", explanation);
        }
    }
    if aggregate.dangling_decisions > 0 {
        let _ = writeln!(
            out,
            "  ({} saved decision(s) refer to suggestions no longer shown)",
            aggregate.dangling_decisions
        );
    }
    out.trim_end().to_string()
}

/// One line per slide: number, analysis state and progress
pub fn render_slide_list(session: &ReviewSession) -> String {
    let unsaved = session.unsaved_slides();
    let selected = session.selected_number();
    let mut out = String::new();

    for aggregate in session.aggregates() {
        let number = aggregate.slide.slide_number;
        let pointer = if selected == Some(number) { ">" } else { " " };
        let preview: String = aggregate
            .slide
            .original_text
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(48)
            .collect();
        let state = if aggregate.is_analyzed() {
            format!(
                "{}/{} decided",
                aggregate.decided_count(),
                aggregate.suggestions.len()
            )
        } else {
            "not analyzed".to_string()
        };
        let flag = if unsaved.contains(&number) { " *" } else { "" };
        let _ = writeln!(out, "{} {:>3}. {:<48}  [{}]{}", pointer, number, preview, state, flag);
    }

    if out.is_empty() {
        "No slides.".to_string()
    } else {
        out.trim_end().to_string()
    }
}

/// Run the interactive review loop on stdin until `quit` or end of input
pub async fn cmd_review(config: &Config, gateway: &SyncGateway, sermon_id: &str) -> Result<()> {
    let mut shell = ReviewShell::new(config, gateway, sermon_id);

    if let Err(e) = shell.load().await {
        println!("✗ Could not load sermon {}", sermon_id);
        println!("{}", describe_failure(&e));
    }
    println!("Type 'help' for commands.");
    render_if_changed(&mut shell);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("review> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        debug!("Received: {}", line);

        let command = match line.parse::<ReviewCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("✗ {}", e);
                continue;
            }
        };

        match shell.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => println!("{}", describe_failure(&e)),
        }
        render_if_changed(&mut shell);
    }

    Ok(())
}

/// Status line for a failed command.
///
/// Remote failures leave the session untouched, so repeating the command is
/// the retry.
pub fn describe_failure(err: &Error) -> String {
    if err.is_remote() {
        format!("✗ {} (nothing changed; repeat the command to retry)", err)
    } else {
        format!("✗ {}", err)
    }
}

fn render_if_changed(shell: &mut ReviewShell<'_>) {
    if let Some(change) = shell.take_change() {
        debug!("Session changed: {:?}", change);
        println!("{}", shell.render_current());
    }
}
