//! Soft elliptical alpha fade for uploaded images.
//!
//! Every image gets the same geometric treatment: a radial mask that is
//! opaque at the center and transparent at the rim of the inscribed ellipse
//! (square-root taper), linearly blended into the existing alpha channel.
//! This is a deterministic cut-out effect, not subject segmentation.
//!
//! # Quick Start
//!
//! ```no_run
//! use radial_fade::{codec, composite_radial_mask};
//!
//! let bytes = std::fs::read("sticker.jpg").unwrap();
//! let img = codec::decode(&bytes).unwrap();
//! let faded = composite_radial_mask(&img).unwrap();
//! std::fs::write("sticker_faded.png", codec::encode_png(&faded).unwrap()).unwrap();
//! ```
//!
//! # Uploads
//!
//! [`Compositor`] stores the original and the faded PNG in a [`BlobStore`]
//! and returns a `data:image/png;base64,...` preview.
//!
//! ```no_run
//! use radial_fade::Compositor;
//!
//! let compositor = Compositor::in_memory();
//! let bytes = std::fs::read("sticker.png").unwrap();
//! let outcome = compositor.upload("image/png", &bytes).unwrap();
//! println!("{} -> {}", outcome.original_image_id, outcome.processed_image_id);
//! ```

#![deny(missing_docs)]

pub mod codec;
mod engine;
pub mod error;
pub mod mask;
pub mod store;

pub use engine::{
    default_output_path, is_supported_image, Compositor, CompositorOptions, ProcessResult,
    RemovalOutcome, UploadOutcome, PROCESSED_PREFIX, UPLOAD_PREFIX,
};
pub use error::{Error, Result};
pub use mask::{composite_radial_mask, composite_radial_mask_with, DEFAULT_BLEND_FACTOR};
pub use store::{BlobStore, DirStore, MemoryStore};
