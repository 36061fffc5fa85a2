use std::process;
use clap::Parser;

#[macro_use]
extern crate log;

use anyhow::Result;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;


/// Parse command line arguments and run `dpsim_rs::run()`
fn main() -> Result<()> {
    // ----------------------------- Run CLI Parser 
    let cli = parser::Cli::parse();

    // ----------------------------- Init logger.
    if let Err(e) = logger::Logger::init(cli.verbosity()) {
        eprintln!("Failed to initialize logger: {e}");
        process::exit(1);
    }

    // ----------------------------- Reject invalid parameters before writing anything.
    if let Err(e) = dpsim_rs::validate(&cli) {
        error!("{:?}", e);
        process::exit(1);
    }

    // ----------------------------- Serialize command line arguments
    match cli.serialize() {
        Ok(Some(yaml)) => info!("Command line arguments serialized into {}", yaml.display()),
        Ok(None)       => (),
        Err(e)         => {
            error!("{:?}", e);
            process::exit(1);
        }
    };
    
    // ----------------------------- unpack Cli and run the appropriate modules.
    if let Err(e) = dpsim_rs::run(cli) {
        error!("{:?}", e);
        process::exit(1);
    };

    Ok(())
}
