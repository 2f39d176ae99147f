use std::io::{BufRead, Write};

use anyhow::Result;
use log::{debug, info};

use narrative_nexus::story::legacy::ACHIEVEMENT_NAME_KEY;
use narrative_nexus::{AchievementUnlocked, EngineError, PlayConfig, Session, StoryNode};

const DIVIDER: &str = "========================================";

// ---------------------------------------------------------------------------
// Player commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Zero-based choice index.
    Choose(usize),
    Undo,
    Restart,
    Stats,
    Transcript,
    Help,
    Quit,
}

/// Choices are numbered from 1 on screen.
fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim().to_lowercase();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).map(Command::Choose);
    }
    match input.as_str() {
        "u" | "undo" => Some(Command::Undo),
        "r" | "restart" => Some(Command::Restart),
        "s" | "stats" => Some(Command::Stats),
        "t" | "transcript" => Some(Command::Transcript),
        "h" | "help" | "?" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn show_scene<W: Write>(out: &mut W, session: &Session, config: &PlayConfig) -> Result<()> {
    let node = session.current_node();

    writeln!(out, "\n{DIVIDER}")?;
    match (&node.mood, config.show_moods) {
        (Some(mood), true) => writeln!(out, "[{}] ({mood})", node.id)?,
        _ => writeln!(out, "[{}]", node.id)?,
    }
    writeln!(out, "{DIVIDER}")?;
    writeln!(out, "{}", node.text.trim())?;

    if config.show_image_prompts {
        if let Some(prompt) = &node.image_prompt {
            writeln!(out, "\n  (Scene idea: {prompt})")?;
        }
    }

    if node.is_ending() {
        writeln!(out, "\n  THE END")?;
        writeln!(out, "  [r] Restart    [u] Undo    [q] Quit")?;
    } else {
        writeln!(out, "\nWhat will you do?")?;
        for (i, choice) in node.choices.iter().enumerate() {
            writeln!(out, "  [{}] {}", i + 1, choice.label)?;
        }
    }
    Ok(())
}

fn achievement_name(node: &StoryNode, event: &AchievementUnlocked) -> String {
    node.metadata
        .get(ACHIEVEMENT_NAME_KEY)
        .and_then(|name| name.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| event.achievement.to_string())
}

fn show_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  1..n          take that choice")?;
    writeln!(out, "  u, undo       undo the last choice")?;
    writeln!(out, "  r, restart    start over (achievements are kept)")?;
    writeln!(out, "  s, stats      show story statistics")?;
    writeln!(out, "  t, transcript show the story so far")?;
    writeln!(out, "  q, quit       leave the story")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

/// Play `session` against a line-oriented input until the player quits or
/// the input ends.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    config: &PlayConfig,
    mut input: R,
    mut out: W,
) -> Result<()> {
    show_scene(&mut out, session, config)?;

    let mut line = String::new();
    loop {
        write!(out, "\n> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("Input closed");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(command) = parse_command(trimmed) else {
            writeln!(out, "Unknown command '{trimmed}'. Type 'h' for help.")?;
            continue;
        };

        match command {
            Command::Choose(index) => match session.choose(index) {
                Ok(transition) => {
                    if let Some(event) = &transition.unlocked {
                        let name = achievement_name(session.current_node(), event);
                        writeln!(out, "\n*** Achievement unlocked: {name} ***")?;
                    }
                    show_scene(&mut out, session, config)?;
                }
                Err(EngineError::InvalidChoice { available: 0, .. }) => {
                    writeln!(out, "This is an ending. Undo or restart to keep playing.")?
                }
                Err(EngineError::InvalidChoice { index, available }) => writeln!(
                    out,
                    "There is no choice {}; pick 1-{available}.",
                    index + 1
                )?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Undo => match session.undo() {
                Ok(_) => {
                    writeln!(out, "Undid last choice.")?;
                    show_scene(&mut out, session, config)?;
                }
                Err(e) => writeln!(out, "{e}")?,
            },
            Command::Restart => {
                session.restart()?;
                info!("Player chose to restart");
                writeln!(out, "Story restarted.")?;
                show_scene(&mut out, session, config)?;
            }
            Command::Stats => writeln!(out, "{}", session.stats())?,
            Command::Transcript => writeln!(out, "{}", session.transcript())?,
            Command::Help => show_help(&mut out)?,
            Command::Quit => break,
        }
    }

    writeln!(out, "\nThanks for playing!")?;
    Ok(())
}
