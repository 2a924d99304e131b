#![forbid(unsafe_code)]

fn main() {
    squircle_cache_cli::init_tracing();
    if let Err(error) = squircle_cache_cli::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
