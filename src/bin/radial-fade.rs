use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use radial_fade::{
    codec, default_output_path, Compositor, CompositorOptions, MemoryStore, ProcessResult,
};

#[derive(Parser)]
#[command(
    name = "radial-fade",
    about = "Fade image edges to transparent with a soft elliptical alpha mask",
    version,
    after_help = "Simple usage: radial-fade <image>  (writes {name}_faded.png next to it)\n\n\
                  NOTE: This is a geometric fade around the image center, not subject\n\
                  segmentation. Output is always PNG."
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_faded.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Weight of the radial mask against the original alpha (0.0-1.0)
    #[arg(short, long, default_value = "0.7")]
    blend: f32,

    /// Print the faded image as a data:image/png;base64 URL instead of writing a file
    #[arg(long, conflicts_with = "output")]
    data_url: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if !(0.0..=1.0).contains(&cli.blend) {
        eprintln!("Error: Blend factor must be between 0.0 and 1.0");
        process::exit(1);
    }

    let opts = CompositorOptions {
        blend_factor: cli.blend,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let compositor = match Compositor::new(MemoryStore::new(), opts) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Fatal: Failed to initialize compositor: {e}");
            process::exit(1);
        }
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if cli.data_url {
        if input_path.is_dir() {
            eprintln!("Error: --data-url needs a single image file");
            process::exit(1);
        }
        print_data_url(&compositor, input_path);
        return;
    }

    let opts = compositor.options();
    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: radial-fade <input_dir> -o <output_dir>");
            process::exit(1);
        };
        compositor.process_directory(input_path, &output_dir)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![compositor.process_file(input_path, &output_path)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_data_url(compositor: &Compositor, input: &Path) {
    let bytes = match std::fs::read(input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: Failed to read {}: {e}", input.display());
            process::exit(1);
        }
    };
    match compositor.process_bytes(&bytes) {
        Ok(png) => println!("{}", codec::to_data_url(&png)),
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", input.display());
            process::exit(1);
        }
    }
}

fn print_result(result: &ProcessResult, opts: &CompositorOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        if !opts.quiet {
            eprintln!("[OK] {filename}");
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
