mod play;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use narrative_nexus::{
    export_tree, import_legacy_tree, import_tree, outline, sample, PlayConfig, Session,
    StoryTree,
};

#[derive(Parser)]
#[command(
    name = "nexus",
    about = "Narrative Nexus: play and inspect branching stories",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a story interactively (the bundled sample by default)
    Play {
        /// Story file in JSON form
        #[arg(short, long)]
        story: Option<PathBuf>,

        /// Read the story file in the flat legacy format
        #[arg(long)]
        legacy: bool,

        /// Start at this node instead of the story's root
        #[arg(long)]
        root: Option<String>,

        /// Do not print scene image prompts
        #[arg(long)]
        hide_prompts: bool,

        /// Do not print scene moods
        #[arg(long)]
        hide_moods: bool,
    },

    /// Write a story in canonical JSON form
    Export {
        /// Story file in JSON form
        #[arg(short, long)]
        story: Option<PathBuf>,

        /// Read the story file in the flat legacy format
        #[arg(long)]
        legacy: bool,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a readable outline of a story
    Outline {
        /// Story file in JSON form
        #[arg(short, long)]
        story: Option<PathBuf>,

        /// Read the story file in the flat legacy format
        #[arg(long)]
        legacy: bool,
    },

    /// Validate a story file and summarise it
    Check {
        /// Story file in JSON form
        file: PathBuf,

        /// Read the file in the flat legacy format
        #[arg(long)]
        legacy: bool,
    },
}

fn main() -> Result<()> {
    // Control verbosity with RUST_LOG, e.g.
    //   RUST_LOG=info  nexus play   # transitions, undo, restarts, achievements
    //   RUST_LOG=debug nexus check story.json   # + import validation
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            story,
            legacy,
            root,
            hide_prompts,
            hide_moods,
        } => {
            let tree = load_or_sample(story.as_deref(), legacy)?;
            let mut config = PlayConfig::default()
                .with_image_prompts(!hide_prompts)
                .with_moods(!hide_moods);
            if let Some(root) = root {
                config = config.with_root(root);
            }

            let mut session = Session::start(Arc::new(tree), config.root.as_ref())
                .context("failed to start story")?;
            let stdin = io::stdin();
            play::run(&mut session, &config, stdin.lock(), io::stdout())
        }
        Commands::Export {
            story,
            legacy,
            output,
        } => {
            let tree = load_or_sample(story.as_deref(), legacy)?;
            let json = export_tree(&tree);
            match output {
                Some(path) => {
                    fs::write(&path, format!("{json}\n"))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Exported {} nodes to {}", tree.len(), path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Commands::Outline { story, legacy } => {
            let tree = load_or_sample(story.as_deref(), legacy)?;
            print!("{}", outline(&tree));
            Ok(())
        }
        Commands::Check { file, legacy } => {
            let tree = load_story(&file, legacy)?;
            println!("  All checks passed for {}.", file.display());
            println!(
                "  {} nodes, {} endings, {} achievements",
                tree.len(),
                tree.endings().count(),
                tree.achievements().len()
            );
            println!(
                "  {} of {} nodes reachable from root {}",
                tree.reachable().len(),
                tree.len(),
                tree.root_id()
            );
            Ok(())
        }
    }
}

fn load_story(path: &Path, legacy: bool) -> Result<StoryTree> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tree = if legacy {
        import_legacy_tree(&data)
    } else {
        import_tree(&data)
    }
    .with_context(|| format!("failed to import {}", path.display()))?;
    info!("Loaded {} nodes from {}", tree.len(), path.display());
    Ok(tree)
}

fn load_or_sample(path: Option<&Path>, legacy: bool) -> Result<StoryTree> {
    match path {
        Some(path) => load_story(path, legacy),
        None => sample::awakening().context("bundled sample story is invalid"),
    }
}
