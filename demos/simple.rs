//! Basic BSO encoding and decoding of a serde struct.
//!
//! Run with: cargo run --example simple

use bso::{from_slice, from_str, from_tag, to_bytes, to_string, to_tag};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Player {
    name: String,
    level: u8,
    pos: (f64, f64, f64),
}

fn main() -> Result<(), Box<dyn Error>> {
    let players = vec![
        Player {
            name: "Steve".to_string(),
            level: 30,
            pos: (12.5, 64.0, -8.0),
        },
        Player {
            name: "Alex".to_string(),
            level: 7,
            pos: (0.0, 70.0, 3.25),
        },
    ];
    let tag = to_tag(&players)?;

    // Binary form
    let bytes = to_bytes(&tag)?;
    println!("Binary output: {} bytes\n{:02x?}\n", bytes.len(), bytes);

    // Canonical text form
    let text = to_string(&tag);
    println!("Text output:\n{}\n", text);

    let from_binary: Vec<Player> = from_tag(from_slice(&bytes)?)?;
    let from_text: Vec<Player> = from_tag(from_str(&text)?)?;
    assert_eq!(players, from_binary);
    assert_eq!(players, from_text);
    println!("✓ Round-trip successful");

    Ok(())
}
