// ParkSense CLI entry point

use clap::Parser;
use parksense_cli::{commands, logging, output::OutputStyle, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let style = OutputStyle::default();
    match commands::run(cli, &style).await {
        Ok(rendered) => {
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("{}", OutputStyle::stderr().error(&e.user_message()));
            std::process::exit(e.exit_code());
        }
    }
}
