//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
EXAMPLES:
  questiondesk format notes.txt                    Format raw question text
  echo 'Run `ls -la`' | questiondesk format        Read question text from stdin
  questiondesk render questions.json --question 3  Render question 3 of an API response
  questiondesk copy 'ssh node01'                   Copy locally and to the remote desktop
  questiondesk config                              Show config path and settings
  questiondesk config --init                       Write the settings file
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Exam question rendering with click-to-copy and remote clipboard",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the HTML for raw question text
    Format {
        /// Input file, or '-' for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Print the question view for an API response file
    Render {
        /// JSON file holding a `questions` array
        file: PathBuf,
        /// Only render the question with this id
        #[arg(long)]
        question: Option<String>,
        /// Render questions as flagged for review
        #[arg(long)]
        flagged: bool,
    },
    /// Copy text as a click on a copy target would
    Copy {
        /// Text to copy
        text: String,
    },
    /// Show config path and effective settings
    Config {
        /// Write the effective settings to the config file
        #[arg(long)]
        init: bool,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let args = Args::parse_from([
            "questiondesk",
            "render",
            "q.json",
            "--question",
            "3",
            "--flagged",
        ]);
        match args.command {
            Commands::Render {
                file,
                question,
                flagged,
            } => {
                assert_eq!(file, PathBuf::from("q.json"));
                assert_eq!(question.as_deref(), Some("3"));
                assert!(flagged);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_format_defaults_to_stdin() {
        let args = Args::parse_from(["questiondesk", "format"]);
        assert!(matches!(args.command, Commands::Format { input } if input == "-"));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(Args::parse_from(["questiondesk", "config"]).log_level(), "warn");
        assert_eq!(
            Args::parse_from(["questiondesk", "-vv", "config"]).log_level(),
            "debug"
        );
        assert_eq!(
            Args::parse_from(["questiondesk", "config", "-q"]).log_level(),
            "error"
        );
    }
}
