//! Interactive question loop and single-question mode.

mod input;

pub use input::{LineSource, spawn_line_reader, stdin_lines};

use crate::error::{FetchError, Result};
use crate::providers::{CliStreamSink, StreamSink};
use crate::solver::{MathSolver, ProgressReporter, Question, SavedFile, SolvedQuestion};
use crate::ui::style;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Notify;

const QUIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

pub type OutputWriter = Arc<dyn Fn(&str) + Send + Sync>;

/// `quit`, `exit` or `q` in any letter case, surrounding whitespace ignored.
pub fn is_quit_command(line: &str) -> bool {
    let line = line.trim();
    QUIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub failed: usize,
    pub reports: Vec<PathBuf>,
}

enum Turn {
    Line(String),
    Closed,
    Interrupted,
}

enum Interrupts {
    CtrlC,
    Notified(Arc<Notify>),
    Ignored,
}

pub struct Session {
    solver: MathSolver,
    sink: CliStreamSink,
    progress: ConsoleProgress,
    out: OutputWriter,
    interrupts: Interrupts,
}

impl Session {
    /// Session printing to stdout and listening for Ctrl-C.
    pub fn new(solver: MathSolver) -> Self {
        let out: OutputWriter = Arc::new(|text| {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        });
        Self {
            sink: CliStreamSink::new(),
            interrupts: Interrupts::CtrlC,
            ..Self::with_output(solver, out)
        }
    }

    /// Session writing everything through `out`, without a Ctrl-C listener.
    pub fn with_output(solver: MathSolver, out: OutputWriter) -> Self {
        Self {
            solver,
            sink: CliStreamSink::with_writer(Arc::clone(&out)),
            progress: ConsoleProgress {
                out: Arc::clone(&out),
            },
            out,
            interrupts: Interrupts::Ignored,
        }
    }

    /// Treat each `notify` signal as a user interrupt instead of Ctrl-C.
    #[must_use]
    pub fn interrupted_by(mut self, notify: Arc<Notify>) -> Self {
        self.interrupts = Interrupts::Notified(notify);
        self
    }

    fn say(&self, text: &str) {
        (self.out)(text);
    }

    pub fn banner(&self) {
        let rule = style::dim("=".repeat(60));
        let layout = self.solver.layout();
        self.say(&format!(
            "{}\n{rule}\n\
             Ask me any math question and I'll solve it step by step!\n\
             I can handle algebra, calculus, statistics, geometry, and more.\n\
             Type 'quit', 'exit', or 'q' to end the session.\n\
             {rule}\n\
             📁 Output directories:\n   • Images: {}\n   • Reports: {}\n",
            style::header("🧮 Interactive Math Problem Solver with Claude 4"),
            style::value(layout.images_dir().display()),
            style::value(layout.reports_dir().display()),
        ));
    }

    /// Read questions from `input` until a quit command, end of input or
    /// Ctrl-C at the prompt. Per-question failures never end the loop.
    pub async fn run<R>(&self, input: R) -> SessionSummary
    where
        R: AsyncBufRead + Unpin,
    {
        self.run_lines(input.lines()).await
    }

    pub async fn run_lines<L: LineSource>(&self, mut lines: L) -> SessionSummary {
        let mut summary = SessionSummary::default();
        let mut next_ordinal = 1;

        loop {
            self.say(&format!(
                "\n📝 {} ",
                style::accent(format!("Question #{next_ordinal}:"))
            ));

            let turn = tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => Turn::Line(line),
                    Ok(None) => Turn::Closed,
                    Err(error) => {
                        tracing::warn!("failed to read input: {error}");
                        Turn::Closed
                    }
                },
                () = self.interrupted() => Turn::Interrupted,
            };

            let line = match turn {
                Turn::Line(line) => line,
                Turn::Closed => {
                    self.say("\n\n👋 Thanks for using the Math Solver! Goodbye!\n");
                    break;
                }
                Turn::Interrupted => {
                    self.say("\n\n👋 Session interrupted. Goodbye!\n");
                    break;
                }
            };

            if is_quit_command(&line) {
                self.say("\n👋 Thanks for using the Math Solver! Goodbye!\n");
                break;
            }
            let Some(question) = Question::new(&line, next_ordinal) else {
                self.say("Please enter a question.\n");
                continue;
            };
            next_ordinal += 1;

            let outcome = tokio::select! {
                result = self.handle_question(question) => Some(result),
                () = self.interrupted() => None,
            };
            match outcome {
                Some(Ok(solved)) => {
                    summary.answered += 1;
                    summary.reports.push(solved.report_path);
                }
                Some(Err(error)) => {
                    summary.failed += 1;
                    if error.is_fatal() {
                        break;
                    }
                }
                None => {
                    summary.failed += 1;
                    self.say(&format!(
                        "\n{} Question abandoned.\n",
                        style::failure("⚠️  Interrupted:")
                    ));
                }
            }
        }

        tracing::info!(
            answered = summary.answered,
            failed = summary.failed,
            "session ended"
        );
        summary
    }

    /// Process one question and tell the user how it went.
    pub async fn handle_question(&self, question: Question) -> Result<SolvedQuestion> {
        self.say(&format!("\n🤔 Thinking about: {}\n", question.text()));
        self.say("\n💭 Claude is working...\n");

        match self
            .solver
            .process(question, &self.sink as &dyn StreamSink, &self.progress)
            .await
        {
            Ok(solved) => {
                self.say(&format!(
                    "\n{}\n📄 Report saved: {}\n",
                    style::success("✅ Solution complete!"),
                    style::value(solved.report_path.display())
                ));
                if !solved.fetch.saved.is_empty() {
                    self.say(&format!(
                        "🖼️  Visualizations: {} file(s) saved\n",
                        solved.fetch.saved.len()
                    ));
                }
                Ok(solved)
            }
            Err(error) => {
                tracing::warn!("question failed: {error}");
                self.say(&format!(
                    "{} {error}\nPlease try again with a different question.\n",
                    style::failure("❌ Error solving problem:")
                ));
                Err(error)
            }
        }
    }

    async fn interrupted(&self) {
        match &self.interrupts {
            Interrupts::CtrlC => match tokio::signal::ctrl_c().await {
                Ok(()) => return,
                Err(error) => tracing::warn!("cannot listen for Ctrl-C: {error}"),
            },
            Interrupts::Notified(notify) => return notify.notified().await,
            Interrupts::Ignored => {}
        }
        std::future::pending::<()>().await;
    }
}

struct ConsoleProgress {
    out: OutputWriter,
}

impl ProgressReporter for ConsoleProgress {
    fn downloads_started(&self, count: usize) {
        (self.out)(&format!("📥 Downloading {count} file(s)...\n"));
    }

    fn file_saved(&self, file: &SavedFile) {
        (self.out)(&format!(
            "{} {}\n",
            style::success("✅ Downloaded:"),
            file.filename
        ));
    }

    fn file_failed(&self, error: &FetchError) {
        (self.out)(&format!(
            "{} {}: {error}\n",
            style::failure("❌ Error downloading file"),
            error.file_id()
        ));
    }

    fn rendering(&self) {
        (self.out)("📝 Generating report...\n");
    }
}
