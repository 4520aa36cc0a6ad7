mod args;
mod op;
mod ops;
mod state;

use args::Args;
use clap::{Parser, Subcommand};
use op::Op;
use ops::{
    BoxMessage, Create, Generate, Hash, Id, Load, SecretBox, SecretUnbox, Sign, Tag, Unbox,
    Verify, Version,
};
use state::AppState;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Generate, Generate),
    (Create, Create),
    (Load, Load),
    (Id, Id),
    (Sign, Sign),
    (Verify, Verify),
    (Box, BoxMessage),
    (Unbox, Unbox),
    (SecretBox, SecretBox),
    (SecretUnbox, SecretUnbox),
    (Hash, Hash),
    (Tag, Tag),
    (Version, Version),
}

/// Compact logs on stderr, so stdout only ever carries command output.
/// The returned guard flushes the writer when dropped.
fn init_logging(level: LevelFilter) -> tracing_appender::non_blocking::WorkerGuard {
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    stderr_guard
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let state = match AppState::load(args.config_path, args.keys_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let level = match state.log_level(args.log_level.as_deref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let guard = init_logging(level);

    let ctx = op::OpContext::new(state);
    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}
