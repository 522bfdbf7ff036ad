//! Featmill CLI: extract features for a dataset; --fetch/--unpack acquire it first.

use anyhow::Result;
use clap::Parser;
use featmill::engine::arg_parser::Cli;
use featmill::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
