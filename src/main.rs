//! questiondesk - Main Entry Point
//!
//! Command-line front end for the question formatter, the question view and
//! the click-to-copy flow.

mod cli;

use clap::Parser;
use cli::{Args, Commands};
use log::{debug, info};
use questiondesk::config::{get_config_file_path, load_config, save_config, Settings};
use questiondesk::dom::{Document, ElementData, NodeId};
use questiondesk::format::{escape_attr, ContentFormatter, CLICKABLE_CODE_CLASS, COPY_ATTR};
use questiondesk::question::{parse_questions, render_question_with};
use questiondesk::{
    ClipboardMirror, CopyInterceptor, DisabledMirror, Error, EventOutcome, RemoteMirror, Result,
    SystemClipboard,
};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    let settings = load_config();

    match run(args.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Format { input } => format_input(&input, settings),
        Commands::Render {
            file,
            question,
            flagged,
        } => render_file(&file, question.as_deref(), flagged, settings),
        Commands::Copy { text } => copy_text(&text, settings),
        Commands::Config { init } => show_config(settings, init),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn format_input(input: &str, settings: &Settings) -> Result<()> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };

    let formatter = ContentFormatter::new(&settings.formatter);
    println!("{}", formatter.format(&content));
    Ok(())
}

fn render_file(path: &Path, only: Option<&str>, flagged: bool, settings: &Settings) -> Result<()> {
    let questions = parse_questions(&fs::read_to_string(path)?)?;
    debug!("Loaded {} questions from {}", questions.len(), path.display());

    let formatter = ContentFormatter::new(&settings.formatter);
    let mut rendered = 0;
    for mut question in questions {
        if only.is_some_and(|id| question.id.to_string() != id) {
            continue;
        }
        if flagged {
            question.flagged = true;
        }
        println!("<!-- {} -->", question.title);
        println!("{}", render_question_with(&question, &formatter));
        rendered += 1;
    }

    match only {
        Some(id) if rendered == 0 => Err(Error::Application(format!(
            "No question with id {} in {}",
            id,
            path.display()
        ))),
        _ => Ok(()),
    }
}

fn copy_text(text: &str, settings: &Settings) -> Result<()> {
    // A single copy target holding the text, clicked once
    let mut doc = Document::new();
    let root = doc.root();
    let target = doc.append_element(
        root,
        ElementData::new("code")
            .with_attr("class", CLICKABLE_CODE_CLASS)
            .with_attr(COPY_ATTR, escape_attr(text)),
    );
    doc.append_text(target, text);

    let clipboard = SystemClipboard::one_shot(&settings.clipboard);
    let outcome = if settings.mirror.enabled {
        let mirror = RemoteMirror::new(settings);
        let mut interceptor = CopyInterceptor::new(clipboard, mirror, settings.notice);
        let outcome = click(&mut interceptor, &doc, target);

        let mirror = interceptor.mirror();
        mirror.wait_pending();
        let stats = mirror.stats().snapshot();
        info!(
            "Remote clipboard at {}: {} delivered, {} failed, {} retries",
            mirror.endpoint(),
            stats.delivered,
            stats.failed,
            stats.retries
        );
        outcome
    } else {
        let mut interceptor = CopyInterceptor::new(clipboard, DisabledMirror, settings.notice);
        click(&mut interceptor, &doc, target)
    };

    match outcome.notice {
        Some(notice) => {
            println!("{}", notice);
            Ok(())
        }
        None => Err(Error::Application("Could not copy text to clipboard".to_string())),
    }
}

fn click<M: ClipboardMirror>(
    interceptor: &mut CopyInterceptor<SystemClipboard, M>,
    doc: &Document,
    target: NodeId,
) -> EventOutcome {
    interceptor.mount();
    let outcome = interceptor.on_click(doc, target);
    interceptor.unmount();
    outcome
}

fn show_config(settings: &Settings, init: bool) -> Result<()> {
    match get_config_file_path() {
        Ok(path) => println!("Config file: {}", path.display()),
        Err(e) => println!("Config file: unavailable ({})", e),
    }
    println!("Mirror endpoint: {}", settings.mirror_endpoint());

    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| Error::Application(format!("Could not serialize settings: {}", e)))?;
    println!("{}", json);

    if init {
        save_config(settings)?;
        println!("Settings written");
    }
    Ok(())
}
