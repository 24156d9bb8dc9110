use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `math-solver` - solve math questions with remote code execution and keep
/// a Markdown report of every answer.
#[derive(Parser, Debug)]
#[command(name = "math-solver")]
#[command(version)]
#[command(about = "Interactive math problem solver with code execution.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.math-solver/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive solver (the default)
    Solve {
        /// Solve a single question and exit
        #[arg(short, long)]
        question: Option<String>,
    },

    /// Print one random example problem
    Random {
        /// Category name, e.g. "Beginner" (default: any category)
        category: Option<String>,
    },

    /// List every example problem by category
    Demos,
}
