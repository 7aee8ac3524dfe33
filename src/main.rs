use anyhow::Result;
use clap::Parser;

use textedit::cli::{self, CliArgs};

fn main() -> Result<()> {
    textedit::tracing::init();

    let args = CliArgs::parse();
    tracing::debug!(?args, "starting");
    cli::run(args)
}
