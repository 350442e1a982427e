use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use util::config::AppConfig;
use util::languages::Language;
use util::logging::init_logging;
use workbench::grader::HttpGrader;
use workbench::problem::{Problem, StaticProblemProvider};
use workbench::{RoundOutcome, WorkbenchSession};

#[derive(Parser, Debug)]
#[command(version, about = "Run or submit a solution against a problem's test cases")]
struct Args {
    /// Problem definition (JSON, with test cases and starter code)
    problem: PathBuf,
    /// Source file to grade
    code: PathBuf,
    /// Language of the source file
    #[arg(long, short)]
    language: Language,
    /// Grade against every test case instead of the public ones only
    #[arg(long)]
    submit: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::global().clone();
    let _guard = init_logging(&config.log_file, &config.log_level, config.log_to_stdout);

    let problem: Problem = serde_json::from_str(
        &std::fs::read_to_string(&args.problem)
            .with_context(|| format!("reading {}", args.problem.display()))?,
    )
    .with_context(|| format!("parsing {}", args.problem.display()))?;
    let code = std::fs::read_to_string(&args.code)
        .with_context(|| format!("reading {}", args.code.display()))?;

    let problem_id = problem.id.clone();
    let problems = Arc::new(StaticProblemProvider::new([problem]));
    let grader = Arc::new(HttpGrader::from_config(&config)?);
    let mut session = WorkbenchSession::from_config(problems, grader, &config);

    session.open_problem(&problem_id, args.language).await?;
    session.edit(&code)?;

    let outcome = if args.submit {
        session.submit().await?
    } else {
        session.run().await?
    };
    session.shutdown();

    match outcome {
        RoundOutcome::Completed { report } | RoundOutcome::NoTestCases { report } => {
            if args.json {
                let response = marker::report::GradingResponse::from(report);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", report.render_text());
            }
        }
        RoundOutcome::Failed { message, error } => {
            eprintln!("{message}");
            anyhow::bail!(error);
        }
    }
    Ok(())
}
