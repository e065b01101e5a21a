// ============================================
// src/main.rs
// Command line front end: flashcards, quiz, stats, reset, import
// ============================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wordwiz::session::{Draw, Session, due_count, now_ms};
use wordwiz::{AppPaths, Deck, ReviewState, ReviewStore, Settings, StorageFormat};

// --------------------------------------------------
// Command line arguments
// --------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "wordwiz", version, about = "Vocabulary flashcards and quizzes with spaced repetition")]
struct Cli {
    /// CSV word list (overrides the imported one)
    #[arg(long, global = true, env = "WORDWIZ_DECK")]
    deck: Option<PathBuf>,

    /// Where progress is stored
    #[arg(long, global = true, env = "WORDWIZ_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Hide romanization hints
    #[arg(long, global = true)]
    no_roman: bool,

    /// Progress file format
    #[arg(long, global = true, value_enum)]
    format: Option<StorageFormat>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Review due cards one at a time (default)
    Flash,
    /// Multiple-choice quiz over the whole deck
    Quiz,
    /// Show answer counters and deck progress
    Stats,
    /// Forget all progress
    Reset {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },
    /// Check a CSV word list and remember it as the default deck
    Import { path: PathBuf },
    /// Print the review state of one card
    Show { key: String },
}

/// Everything one run needs, resolved from flags and saved settings.
struct App {
    deck: Deck,
    store: ReviewStore,
    show_roman: bool,
}

impl App {
    fn new(cli: &Cli) -> Result<Self> {
        let paths = AppPaths::resolve(cli.data_dir.clone());
        let settings = Settings::load(&paths.settings_file());
        let format = cli.format.unwrap_or(settings.storage_format);

        let deck = match cli.deck.as_ref().or(settings.deck_path.as_ref()) {
            Some(path) => Deck::from_csv_path(path)
                .with_context(|| format!("failed to load word list {}", path.display()))?,
            None => {
                info!("no word list configured, using the starter deck");
                Deck::starter()
            }
        };

        let store = ReviewStore::open(&paths.data_dir, format);
        let show_roman = settings.show_romanization && !cli.no_roman;
        Ok(Self {
            deck,
            store,
            show_roman,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // import runs before a deck is loaded, since it is how the deck gets chosen
    match cli.command.clone().unwrap_or(Command::Flash) {
        Command::Import { path } => import(&cli, &path),
        Command::Flash => run_flashcards(&mut App::new(&cli)?),
        Command::Quiz => run_quiz(&mut App::new(&cli)?),
        Command::Stats => {
            print_stats(&App::new(&cli)?);
            Ok(())
        }
        Command::Reset { yes } => reset(&mut App::new(&cli)?, yes),
        Command::Show { key } => show(&App::new(&cli)?, &key),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// --------------------------------------------------
// Study modes
// --------------------------------------------------

fn run_flashcards(app: &mut App) -> Result<()> {
    let theme = ColorfulTheme::default();
    let show_roman = app.show_roman;
    let mut session = Session::new(&app.deck, &mut app.store, rand::rng());

    loop {
        let card = match session.flashcard(now_ms()) {
            Draw::Card(card) => card,
            Draw::Exhausted => {
                println!("{}", style("All cards scheduled for later. Run `wordwiz reset` or try the quiz.").yellow());
                return Ok(());
            }
            Draw::Empty => bail!("the deck has no cards"),
        };

        println!();
        println!("  {}", style(&card.key).bold());
        if show_roman {
            if let Some(roman) = &card.romanization {
                println!("  {}", style(roman).dim());
            }
        }

        let choice = Select::with_theme(&theme)
            .with_prompt("Flip")
            .items(&["Show meaning", "Quit"])
            .default(0)
            .interact_opt()?;
        if choice != Some(0) {
            return Ok(());
        }

        let st = session.flip(&card.key, now_ms())?;
        println!("  {}  {}", style(&card.target).green(), style(format!("(next in {} d)", st.interval)).dim());
    }
}

fn run_quiz(app: &mut App) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut session = Session::new(&app.deck, &mut app.store, rand::rng());

    loop {
        let Some(question) = session.quiz() else {
            bail!("the deck has no cards");
        };
        println!();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt(question.prompt())
            .items(question.options.as_slice())
            .interact_opt()?
        else {
            return Ok(());
        };

        if session.answer(&question, choice, now_ms())? {
            println!("  {}", style("Correct!").green().bold());
        } else {
            println!(
                "  {} {}",
                style("Wrong:").red().bold(),
                style(&question.options[question.answer]).green()
            );
        }
        let stats = session.store().stats();
        println!(
            "  {}",
            style(format!(
                "Seen: {} | Correct: {} | Accuracy: {}%",
                stats.seen,
                stats.correct,
                stats.accuracy_percent()
            ))
            .dim()
        );
    }
}

// --------------------------------------------------
// Housekeeping commands
// --------------------------------------------------

fn print_stats(app: &App) {
    let stats = app.store.stats();
    let now = now_ms();
    println!("Seen: {} | Correct: {} | Accuracy: {}%", stats.seen, stats.correct, stats.accuracy_percent());
    println!(
        "Deck: {} words | reviewed: {} | due now: {}",
        app.deck.len(),
        app.deck.cards().iter().filter(|c| app.store.state(&c.key).is_some()).count(),
        due_count(&app.deck, &app.store, now)
    );
    if let Some(path) = app.store.path() {
        println!("Progress file: {}", path.display());
    }
}

fn reset(app: &mut App, yes: bool) -> Result<()> {
    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Forget all review progress?")
            .default(false)
            .interact()?;
    if !confirmed {
        return Ok(());
    }
    app.store.reset().context("failed to reset progress")?;
    println!("Progress reset.");
    Ok(())
}

fn show(app: &App, key: &str) -> Result<()> {
    let Some(card) = app.deck.get(key) else {
        bail!("no card {key:?} in the deck");
    };
    println!("{} = {}", card.key, card.target);
    match app.store.state(key) {
        Some(st) => print_state(st),
        None => println!("never reviewed"),
    }
    Ok(())
}

fn print_state(st: &ReviewState) {
    let due = Local
        .timestamp_millis_opt(st.due)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| st.due.to_string());
    println!("ease {:.2} | interval {} d | streak {} | due {}", st.ease, st.interval, st.streak, due);
}

fn import(cli: &Cli, path: &Path) -> Result<()> {
    let deck = Deck::from_csv_path(path).with_context(|| format!("failed to import {}", path.display()))?;
    let paths = AppPaths::resolve(cli.data_dir.clone());
    let mut settings = Settings::load(&paths.settings_file());
    settings.deck_path = Some(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
    if let Some(format) = cli.format {
        settings.storage_format = format;
    }
    if cli.no_roman {
        settings.show_romanization = false;
    }
    settings
        .save(&paths.settings_file())
        .context("failed to save settings")?;
    println!("Loaded {} words from {}", deck.len(), path.display());
    Ok(())
}
