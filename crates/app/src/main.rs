mod input;
mod render;

use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use input::Input;
use services::{
    ConfigError, HttpPracticeApi, MasteryService, PracticeConfig, QuestionSource, ReportSource,
    SessionController, SessionError, SessionSnapshot, SubjectReportService,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    Config(ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ConfigError> for ArgsError {
    fn from(err: ConfigError) -> Self {
        ArgsError::Config(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  practice [practice] [--api-url <url>] [--subject <name>] [--topic <name>]");
    eprintln!("                      [--timeout <secs>]");
    eprintln!("  practice report     [--api-url <url>] [--subject <name>] [--timeout <secs>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url http://127.0.0.1:5000");
    eprintln!("  --subject Mathematics");
    eprintln!("  --timeout 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PRACTICE_API_URL, PRACTICE_SUBJECT, PRACTICE_TOPIC, PRACTICE_TIMEOUT_SECS");
    eprintln!("  RUST_LOG (default: practice=info,services=info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Report,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "report" => Some(Self::Report),
            _ => None,
        }
    }
}

/// Flags override the environment.
fn parse_config(args: &mut impl Iterator<Item = String>) -> Result<PracticeConfig, ArgsError> {
    let mut config = PracticeConfig::from_env()?;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--api-url" => config.set_api_url(&require_value(args, "--api-url")?)?,
            "--subject" => config.set_subject(&require_value(args, "--subject")?)?,
            "--topic" => config.set_topic(&require_value(args, "--topic")?)?,
            "--timeout" => config.set_timeout_secs(&require_value(args, "--timeout")?)?,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    Ok(config)
}

/// Logs go to stderr; stdout belongs to the rendered session.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "practice=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let config = parse_config(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    info!(api_url = %config.api_url, subject = %config.subject, "practice client configured");

    let api = Arc::new(HttpPracticeApi::new(&config)?);
    let reports = SubjectReportService::new(Arc::clone(&api) as Arc<dyn ReportSource>);

    match cmd {
        Command::Report => {
            let report = reports.load(&config.subject).await?;
            print!("{}", render::report(&report));
            Ok(())
        }
        Command::Practice => {
            let controller = Arc::new(SessionController::new(
                config.subject.clone(),
                Arc::clone(&api) as Arc<dyn QuestionSource>,
                api as Arc<dyn MasteryService>,
            ));
            practice(controller, reports, config).await
        }
    }
}

async fn practice(
    controller: Arc<SessionController>,
    reports: SubjectReportService,
    config: PracticeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut updates = controller.subscribe();
    let renderer = tokio::spawn(async move {
        print!("{}", render::frame(&updates.borrow_and_update()));
        while updates.changed().await.is_ok() {
            let snap: SessionSnapshot = updates.borrow_and_update().clone();
            print!("{}", render::frame(&snap));
        }
    });

    if config.topic.is_some() {
        report_outcome(controller.start(config.topic.clone()).await);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match input::parse(&line) {
            Input::Quit => break,
            Input::Start(topic) => {
                report_outcome(controller.start(topic.or_else(|| config.topic.clone())).await);
            }
            Input::Next => report_outcome(controller.advance().await),
            Input::Retry => report_outcome(controller.retry_submission().await),
            Input::Answer(answer) => report_outcome(controller.submit_answer(&answer).await),
            Input::Hint => match controller.hint() {
                Ok(hint) => println!("{hint}"),
                Err(err) => eprintln!("{err}"),
            },
            Input::Restart => {
                controller.restart();
            }
            Input::Report => match reports.load(controller.subject()).await {
                Ok(report) => print!("{}", render::report(&report)),
                Err(err) => eprintln!("{err}"),
            },
            Input::Unknown(name) => eprintln!("unknown command: :{name}"),
        }
    }

    renderer.abort();
    info!(attempts = controller.attempts().len(), "practice session ended");
    Ok(())
}

/// Frames come from the subscription; only failures are printed here.
fn report_outcome(outcome: Result<SessionSnapshot, SessionError>) {
    match outcome {
        Ok(_) => {}
        Err(err) if err.is_terminal_noop() => println!("Module already mastered."),
        Err(err) if err.is_retryable() => {
            warn!(error = %err, "request failed");
            eprintln!("{err}");
        }
        Err(err) => eprintln!("{err}"),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
