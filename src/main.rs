//! remove-guitar - Command line entry point

use clap::Parser;
use std::process;
use guitar_remover::{init_logging, Args, Config, GuitarRemover, Result};

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args_and_config(&args)?;

    if config.verbose() {
        println!("{}", guitar_remover::get_library_info());
        println!();
    }

    println!("=== Remove Guitar ===");
    println!("Input: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!("Model: {}", config.model());
    println!("=====================\n");

    let remover = GuitarRemover::new(config);
    let request = remover.request(args.input, args.output);
    let result = remover.remove_guitar(&request)?;

    println!("=== Processing Complete ===");
    println!("Output: {}", result.output_path.display());
    println!("Codec: {}", result.codec);
    println!("Time: {:.2}s", result.processing_time.as_secs_f64());
    if !result.stems_cleaned {
        println!("Note: intermediate stems were left in place");
    }

    Ok(())
}
