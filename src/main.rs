mod cli;

use clap::Parser;

use cli::Args;
use svgcast::recording::Completion;

fn main() {
    let args = Args::parse();
    svgcast::init_logging(args.verbose);

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    match svgcast::run(&config) {
        Ok(Completion::Finished) => {}
        Ok(Completion::Cancelled { reason }) => {
            let _ = svgcast::note_partial_output(&mut std::io::stderr(), &config);
            tracing::warn!(%reason, "recording ended early");
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
