use notedown::Mode;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.html>", args[0]);
        std::process::exit(1);
    }

    let file_path = &args[1];

    match notedown::convert(file_path, Mode::Auto) {
        Ok(markdown_path) => println!("{}", markdown_path.display()),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
