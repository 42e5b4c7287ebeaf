#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    jobly_cli::init_tracing();

    if let Err(e) = jobly_cli::run(std::env::args().collect()).await {
        eprintln!("{e:#}");
        std::process::exit(jobly_cli::exit_code(&e));
    }
}
