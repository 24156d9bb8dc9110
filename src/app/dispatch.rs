use crate::cli::commands::{Cli, Commands};
use math_solver::config::{API_KEY_ENV, Config};
use math_solver::demos;
use math_solver::error::SolverError;
use math_solver::session::{Session, stdin_lines};
use math_solver::solver::{MathSolver, Question};
use math_solver::ui::style;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;

/// Route a parsed command line. Only the solving paths need a credential.
pub async fn dispatch(cli: Cli) -> ExitCode {
    match cli.command {
        Some(Commands::Random { category }) => {
            let problem = demos::random_problem(category.as_deref(), &mut rand::rng());
            println!("Random problem: {problem}");
            ExitCode::SUCCESS
        }
        Some(Commands::Demos) => {
            print!("{}", demos::render_catalogue());
            ExitCode::SUCCESS
        }
        Some(Commands::Solve { question }) => run_solver(cli.config.as_deref(), question).await,
        None => run_solver(cli.config.as_deref(), None).await,
    }
}

async fn run_solver(config_path: Option<&Path>, question: Option<String>) -> ExitCode {
    let session = match connect(config_path) {
        Ok(session) => session,
        Err(error) => {
            eprintln!(
                "{} {error}",
                style::failure("❌ Failed to initialize Math Solver:")
            );
            eprintln!("Make sure you have set the {API_KEY_ENV} environment variable.");
            return ExitCode::FAILURE;
        }
    };

    match question {
        Some(text) => {
            let Some(question) = Question::new(&text, 1) else {
                eprintln!("Please enter a question.");
                return ExitCode::FAILURE;
            };
            match session.handle_question(question).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        None => {
            session.banner();
            let summary = session.run_lines(stdin_lines()).await;
            info!(
                answered = summary.answered,
                failed = summary.failed,
                reports = summary.reports.len(),
                "math solver finished"
            );
            ExitCode::SUCCESS
        }
    }
}

fn connect(config_path: Option<&Path>) -> Result<Session, SolverError> {
    let config = Config::load(config_path)?;
    let solver = MathSolver::connect(&config)?;
    info!(model = %config.model, output_dir = %config.output_dir.display(), "solver ready");
    Ok(Session::new(solver))
}
