//! CLI tool to generate a token encryption key.
//!
//! Usage:
//!   cargo run --bin generate-cipher-key -- --bits 256
//!   cargo run --bin generate-cipher-key -- --check <hex-key>

use std::env;

use kodiiing_lib::services::SymmetricCipher;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut bits: usize = 256;
    let mut check: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bits" | "-b" => {
                i += 1;
                bits = match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(b) => b,
                    None => {
                        eprintln!("Error: --bits needs a number");
                        print_usage();
                        std::process::exit(1);
                    }
                };
            }
            "--check" | "-c" => {
                i += 1;
                check = args.get(i).cloned();
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if let Some(key) = check {
        match SymmetricCipher::from_hex(&key) {
            Ok(_) => println!("Key is valid ({} bits)", key.trim().len() * 4),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let key = match bits {
        128 => hex::encode(rand::random::<[u8; 16]>()),
        192 => hex::encode(rand::random::<[u8; 24]>()),
        256 => hex::encode(rand::random::<[u8; 32]>()),
        other => {
            eprintln!("Error: Invalid key size {}. Must be 128, 192 or 256", other);
            std::process::exit(1);
        }
    };

    println!();
    println!("Cipher key generated ({} bits):", bits);
    println!();
    println!("  KDG_CIPHER_KEY={}", key);
    println!();
    println!("Store it with the server's other secrets. Changing it makes every");
    println!("stored provider token unreadable.");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: generate-cipher-key [--bits <128|192|256>] [--check <hex-key>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bits, -b   Key size in bits (default: 256)");
    eprintln!("  --check, -c  Validate an existing hex key instead of generating one");
    eprintln!("  --help, -h   Show this help");
    eprintln!();
}
