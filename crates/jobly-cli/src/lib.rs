mod cli;
mod config;
mod init;

use cli::{Command, UsageError};
use config::ProjectConfig;
use jobly::{GenericClient, Job, JoblyError, TracingClient, UpdatePayload};
use serde::Serialize;
use serde_json::json;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let invocation = cli::parse_args(&args)?;
    match invocation.command {
        Command::Help => {
            cli::print_help();
            Ok(())
        }
        Command::Init => init::run(&invocation.global.config_path()),
        command => {
            let config = ProjectConfig::resolve(&invocation.global)?;
            tracing::debug!(config = %config.config_path.display(), "configuration loaded");

            let database = &config.file.database;
            let pool = jobly::create_pool_with_config(&database.url, database.max_connections)?;
            let client = pool.get().await.map_err(JoblyError::from)?;
            let client = TracingClient::new(client)
                .level(config.file.logging.level()?)
                .max_sql_length(config.file.logging.max_sql_length);

            execute(&client, command).await
        }
    }
}

async fn execute(conn: &impl GenericClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Setup => {
            jobly::schema::setup(conn).await?;
            print_json(&json!({ "status": "ok" }))
        }
        Command::List(filter) => {
            let jobs = Job::find_all(conn, &filter).await?;
            print_json(&json!({ "jobs": jobs }))
        }
        Command::Get(id) => {
            let job = Job::get(conn, id).await?;
            print_json(&json!({ "job": job }))
        }
        Command::Create(new_job) => {
            let job = Job::create(conn, new_job).await?;
            print_json(&json!({ "job": job }))
        }
        Command::Update { id, payload } => {
            let payload = UpdatePayload::from_json(payload)?;
            let job = Job::update(conn, id, &payload).await?;
            print_json(&json!({ "job": job }))
        }
        Command::Delete(id) => {
            Job::remove(conn, id).await?;
            print_json(&json!({ "deleted": id }))
        }
        Command::Help | Command::Init => unreachable!("handled before connecting"),
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Install the stderr `tracing` subscriber, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Process exit code for a failed run.
///
/// 2 for invalid input, 3 for a missing job, 4 for a duplicate, 1 otherwise.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<UsageError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<JoblyError>() {
        Some(JoblyError::Validation(_)) => 2,
        Some(JoblyError::NotFound(_)) => 3,
        Some(JoblyError::Conflict(_)) => 4,
        _ => 1,
    }
}
