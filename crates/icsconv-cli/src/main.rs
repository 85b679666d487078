use clap::Parser;
use icsconv_cli::cli_args::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = icsconv_cli::run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
