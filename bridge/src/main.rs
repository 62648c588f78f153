use args::{Args, Command};
use clap::Parser;

mod args;
mod logger;
mod send;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args.log);

    let config = args.config()?;

    match &args.command {
        Command::Send { request } => send::run(&config, request).await,
        Command::LastError => {
            match interceptor::open_error_cache(&config.error_cache).peek_and_clear() {
                Some(error) => println!("{}", serde_json::to_string_pretty(&error)?),
                None => println!("No recent API error"),
            }

            Ok(())
        }
    }
}
