//! CLI entry point for kataribe
//!
//! Plays or checks a scene document from the command line.

use kataribe::storage::SceneDocument;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug = args.iter().any(|arg| arg == "--debug");
    init_logging(debug);

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "play" | "check" => {
            let Some(path) = args.get(2).filter(|arg| !arg.starts_with("--")) else {
                eprintln!("Error: Missing scene file path");
                eprintln!();
                print_usage();
                process::exit(1);
            };
            let file_path = PathBuf::from(path);
            let scene = load_scene(&file_path).await;

            if command == "play" {
                run_play(scene, debug).await;
            } else if !kataribe::cli::play::run_check(&scene) {
                process::exit(1);
            }
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    }
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn print_usage() {
    println!("kataribe - Timed Dialogue Sequence Player");
    println!();
    println!("USAGE:");
    println!("    cargo run -- play <scene.json> [--debug]");
    println!("    cargo run -- check <scene.json>");
    println!();
    println!("COMMANDS:");
    println!("    play <file> [--debug]    Play a scene in the terminal");
    println!("    check <file>             Report problems in a scene");
    println!("    --help, -h               Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --debug    Show portraits, hides, effects and debug logs");
    println!();
    println!("ENVIRONMENT:");
    println!("    KATARIBE_STEP_DELAY_MS   Override the default step delay");
    println!("    KATARIBE_GAP_MS          Override the gap between messages");
    println!("    RUST_LOG                 Log filter (env_logger syntax)");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run -- play demos/lighthouse.json");
    println!("    cargo run -- check demos/lighthouse.json");
}

async fn load_scene(file_path: &Path) -> SceneDocument {
    match SceneDocument::load(file_path).await {
        Ok(mut scene) => {
            scene.config = scene.config.with_env_overrides();
            scene
        }
        Err(err) => {
            eprintln!("Error: Failed to load scene '{}'", file_path.display());
            eprintln!("Reason: {}", err);
            process::exit(1);
        }
    }
}

async fn run_play(scene: SceneDocument, debug: bool) {
    if let Err(err) = kataribe::cli::play::run_play(scene, debug).await {
        eprintln!("Error: Player mode failed");
        eprintln!("Reason: {:#}", err);
        process::exit(1);
    }
}
