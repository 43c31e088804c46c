//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = waygraph_cli::run() {
        eprintln!("waygraph: {err}");
        std::process::exit(1);
    }
}
