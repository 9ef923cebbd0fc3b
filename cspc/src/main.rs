mod args;
mod io;
mod pseudocounts;
mod stats;
mod util;

use args::{Cli, SubCommands};
use pseudocounts::pseudocounts;
use util::set_threads;

use clap::Parser;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Cli::parse().command {
        SubCommands::Pseudocounts(args) => {
            set_threads(args.common_args.num_threads)?;
            let stats = pseudocounts(&args)?;
            stats.log();
        }
    }
    Ok(())
}
