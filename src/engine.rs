//! Upload and fade flows on top of a blob store.

use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::{Error, Result};
use crate::mask::{self, DEFAULT_BLEND_FACTOR};
use crate::store::{self, BlobStore, MemoryStore};

/// Key prefix for stored originals.
pub const UPLOAD_PREFIX: &str = "upload";

/// Key prefix for stored faded results.
pub const PROCESSED_PREFIX: &str = "processed";

/// Options controlling how images are faded.
#[derive(Debug, Clone)]
pub struct CompositorOptions {
    /// Weight of the radial mask against the original alpha (0.0-1.0).
    pub blend_factor: f32,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            blend_factor: DEFAULT_BLEND_FACTOR,
            verbose: false,
            quiet: false,
        }
    }
}

/// Result of an upload: both stored IDs plus the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Key of the faded PNG in the store.
    pub processed_image_id: String,
    /// Key of the original upload in the store.
    pub original_image_id: String,
    /// `data:image/png;base64,...` preview of the faded PNG.
    pub preview_url: String,
}

/// Result of fading an already stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// Key of the faded PNG in the store.
    pub image_id: String,
    /// `data:image/png;base64,...` preview of the faded PNG.
    pub preview_url: String,
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// Fades images and keeps originals and results in a [`BlobStore`].
///
/// Holds no per-image state; one compositor can serve concurrent calls.
pub struct Compositor<S: BlobStore = MemoryStore> {
    store: S,
    options: CompositorOptions,
}

impl Compositor<MemoryStore> {
    /// Compositor over a fresh [`MemoryStore`] with default options.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: MemoryStore::new(),
            options: CompositorOptions::default(),
        }
    }
}

impl<S: BlobStore> Compositor<S> {
    /// Create a compositor over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the blend factor is outside `[0, 1]`.
    pub fn new(store: S, options: CompositorOptions) -> Result<Self> {
        mask::check_blend_factor(options.blend_factor)?;
        Ok(Self { store, options })
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active options.
    #[must_use]
    pub fn options(&self) -> &CompositorOptions {
        &self.options
    }

    /// Store an upload, fade it and return both IDs with a preview URL.
    ///
    /// The original is stored under a fresh `upload_*` key before processing,
    /// the faded PNG under `processed_<original id>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `content_type` is not `image/*`,
    /// [`Error::Decode`]/[`Error::Encode`] if processing fails, and
    /// [`Error::Storage`] if the store fails.
    pub fn upload(&self, content_type: &str, bytes: &[u8]) -> Result<UploadOutcome> {
        if !codec::is_image_content_type(content_type) {
            return Err(Error::InvalidInput(format!(
                "file must be an image, got content type {content_type:?}"
            )));
        }

        let original_image_id = store::new_image_id(UPLOAD_PREFIX);
        self.store.put(&original_image_id, bytes)?;
        log::info!(
            "stored upload {original_image_id} ({} bytes, {content_type})",
            bytes.len()
        );

        let processed_image_id = self.fade_and_store(&original_image_id, bytes)?;
        let preview_url = self.preview(&processed_image_id)?;

        Ok(UploadOutcome {
            processed_image_id,
            original_image_id,
            preview_url,
        })
    }

    /// Fade an image already in the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if `image_id` is missing or the store fails,
    /// and [`Error::Decode`]/[`Error::Encode`] if processing fails.
    pub fn remove_background(&self, image_id: &str) -> Result<RemovalOutcome> {
        let original = self.store.get(image_id)?;
        let processed_id = self.fade_and_store(image_id, &original)?;
        let preview_url = self.preview(&processed_id)?;

        Ok(RemovalOutcome {
            image_id: processed_id,
            preview_url,
        })
    }

    /// Decode, fade and re-encode image bytes as PNG without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`], [`Error::Decode`] or [`Error::Encode`].
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let img = codec::decode(bytes)?;
        let faded = mask::composite_radial_mask_with(&img, self.options.blend_factor)?;
        let png = codec::encode_png(&faded)?;
        log::debug!(
            "faded {}x{} image into {} PNG bytes",
            faded.width(),
            faded.height(),
            png.len()
        );
        Ok(png)
    }

    /// Encoding completes before the put, so failures leave nothing stored.
    fn fade_and_store(&self, image_id: &str, bytes: &[u8]) -> Result<String> {
        let png = self.process_bytes(bytes).inspect_err(|e| {
            log::error!("failed to fade {image_id}: {e}");
        })?;

        let processed_id = format!("{PROCESSED_PREFIX}_{image_id}");
        self.store.put(&processed_id, &png)?;
        log::info!("stored {processed_id}");
        Ok(processed_id)
    }

    fn preview(&self, processed_id: &str) -> Result<String> {
        let png = self.store.get(processed_id)?;
        let url = codec::to_data_url(&png);
        log::debug!("preview URL for {processed_id} is {} chars", url.len());
        Ok(url)
    }

    /// Process a single image file: load, fade, save as PNG.
    ///
    /// Returns a [`ProcessResult`] indicating success or failure.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            message: String::new(),
        };

        match self.fade_file(input, output) {
            Ok(()) => {
                result.success = true;
                result.message = format!("Saved {}", output.display());
                log::debug!("{} -> {}", input.display(), output.display());
            }
            Err(e) => {
                log::warn!("{}: {e}", input.display());
                result.message = e.to_string();
            }
        }

        result
    }

    fn fade_file(&self, input: &Path, output: &Path) -> Result<()> {
        let bytes = std::fs::read(input)?;
        let png = self.process_bytes(&bytes)?;

        if !output
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        {
            log::warn!("{} will contain PNG data", output.display());
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output, png)?;
        Ok(())
    }

    /// Process all supported images in a directory.
    ///
    /// Outputs keep the input file stem with a `.png` extension. Uses parallel
    /// iteration when the `parallel` feature is enabled (via rayon).
    #[must_use]
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().is_ok_and(|ft| ft.is_file()))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    success: false,
                    message: format!("Failed to create output directory: {e}"),
                }];
            }
        }

        log::info!(
            "fading {} images from {}",
            entries.len(),
            input_dir.display()
        );

        let run = |input_path: &PathBuf| {
            let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
            let output_path = output_dir.join(format!("{stem}.png"));
            self.process_file(input_path, &output_path)
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            entries.iter().map(run).collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "gif"
        ),
        None => false,
    }
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_faded.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_faded.png"))
}
