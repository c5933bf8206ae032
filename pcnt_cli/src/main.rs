fn main() {
    if let Err(e) = pcnt_cli::run_cli() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
