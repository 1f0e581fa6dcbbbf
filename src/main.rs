use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = par_connect::cli::Cli::parse();

    // Route library log output to the debug log file; command output on
    // stdout stays clean for scripting.
    par_connect::debug::init_log_bridge();
    log::info!("par-connect {} starting", par_connect::VERSION);

    match par_connect::cli::run(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("par-connect: error: {e:#}");
            std::process::exit(1);
        }
    }
}
