//! Fade a single image and write the result as PNG.
//!
//! Usage:
//! ```sh
//! cargo run --example fade_image -- input.jpg output.png
//! ```

use std::env;
use std::process;

use radial_fade::Compositor;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output>", args[0]);
        process::exit(1);
    }

    let input = &args[1];
    let output = &args[2];

    let compositor = Compositor::in_memory();
    let result = compositor.process_file(input.as_ref(), output.as_ref());

    if result.success {
        println!("Done: {}", result.message);
    } else {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }
}
