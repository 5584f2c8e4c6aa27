use tracing_subscriber::EnvFilter;

fn main() {
    // stdout belongs to the protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("corvid v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let args: Vec<String> = std::env::args().collect();
    // Launches a perft test
    if args.get(1).map(String::as_str) == Some("perft") {
        let expected_format = "Expected : perft <depth> [<FEN>]";
        match args.get(2).and_then(|d| d.parse::<u32>().ok()) {
            Some(depth) => corvid::perft_report(depth, args.get(3).cloned()),
            None => {
                eprintln!("{}", expected_format);
                std::process::exit(2);
            }
        }
    } else {
        // Normal UCI
        match corvid::uci::UCI::new() {
            Ok(mut uci) => uci.run(),
            Err(e) => {
                eprintln!("could not start the UCI loop: {}", e);
                std::process::exit(1);
            }
        }
    }
}
