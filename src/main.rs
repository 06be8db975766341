fn main() {
    #[cfg(feature = "cli")]
    ipmatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("ipmatch: built without the `cli` feature; no command-line interface available.");
        std::process::exit(1);
    }
}
