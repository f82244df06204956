#![deny(clippy::expect_used)]
//! Remove generated quasiquote sources and artifacts
//!
//! Usage:
//!   qq-cleanup [--path DIR] [--no-recurse]
//!
//! Prints each removed path on its own line.

use std::env;
use std::path::PathBuf;

use quasiquote::cleanup;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut path = PathBuf::from(".");
    let mut recurse = true;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--path" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => path = PathBuf::from(dir),
                    None => {
                        eprintln!("Error: --path requires a directory");
                        std::process::exit(1);
                    }
                }
            }
            "--no-recurse" => {
                recurse = false;
            }
            "-h" | "--help" => {
                println!("Usage: qq-cleanup [--path DIR] [--no-recurse]");
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let removed = cleanup(&path, recurse).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    for path in removed {
        println!("{}", path.display());
    }
}
