// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Audit, Keygen, Reconstruct, Split, TagSegment, Version};

command_enum! {
    (Keygen, Keygen),
    (Tag, TagSegment),
    (Audit, Audit),
    (Split, Split),
    (Reconstruct, Reconstruct),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load config from --config-path (or default ~/.dtx)
    let ctx = match cli::op::OpContext::new(args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    // Log level: explicit flag > config file > info
    let log_level = match args.log_level {
        Some(level) => level,
        None => ctx.config.log_level().unwrap_or_else(|e| {
            eprintln!("Warning: {}, falling back to info", e);
            tracing::Level::INFO
        }),
    };
    let guard = dtx_app::logging::init_logging(log_level);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    // flush buffered log lines before exiting
    drop(guard);
    std::process::exit(code);
}
