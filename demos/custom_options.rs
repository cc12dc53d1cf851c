//! Choosing byte order, length mode and text layout per call.
//!
//! Run with: cargo run --example custom_options

use bso::{
    from_slice_with_options, tag, to_bytes_with_options, to_string_with_options, BinaryOptions,
    Endian, LengthMode, TextOptions,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let world = tag!({
        "name": "overworld",
        "spawn": [0, 64, 0],
        "heights": (bso::Tag::IntArray(vec![20, -10, 10, 300]))
    })?;

    let presets = [
        ("Default (big endian, counted, narrowed)", BinaryOptions::new()),
        (
            "Little endian",
            BinaryOptions::new().with_endian(Endian::Little),
        ),
        (
            "Indefinite lengths with End markers",
            BinaryOptions::new()
                .with_length_mode(LengthMode::Indefinite)
                .with_indefinite_strings(true),
        ),
        (
            "Native widths only",
            BinaryOptions::new().with_narrowing(false),
        ),
    ];
    for (label, options) in presets {
        let bytes = to_bytes_with_options(&world, &options)?;
        println!("{label}: {} bytes\n{:02x?}\n", bytes.len(), bytes);
        assert_eq!(from_slice_with_options(&bytes, &options)?, world);
    }

    println!("Compact text:");
    println!("{}\n", to_string_with_options(&world, &TextOptions::new()));

    println!("Pretty text, 4-space indent:");
    println!(
        "{}\n",
        to_string_with_options(&world, &TextOptions::pretty().with_indent(4))
    );

    println!("Colored text:");
    println!(
        "{}",
        to_string_with_options(&world, &TextOptions::pretty().with_color(true))
    );

    Ok(())
}
