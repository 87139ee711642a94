//! File-based image engine on top of the `image` crate.
//!
//! [`ImageEngine`] implements both collaborator traits: it reads dimensions
//! from the file header, and executes plans by decoding, cropping, resizing
//! and re-encoding into an output directory.
//!
//! # Example
//!
//! ```no_run
//! use imgplan::engine::ImageEngine;
//! use imgplan::options::TransformOptions;
//! use imgplan::{ImageRef, Mode, Processor};
//!
//! let engine = ImageEngine::new("/tmp/thumbs");
//! let done = Processor::new(&engine, &engine)
//!     .process(&ImageRef::new("/tmp/photo.png"), &TransformOptions::new(Mode::Crop, 400, 400))
//!     .unwrap();
//! println!("wrote {}", done.output);
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::geometry::{CropRect, Dimensions};
use crate::plan::Operation;
use crate::process::{DimensionProbe, ImageExecutor, ImageRef, OutputEncoding, OutputFormat};

/// Failure inside [`ImageEngine`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The reference is not a local path or `file://` URI.
    #[error("unsupported image reference `{0}`")]
    UnsupportedReference(ImageRef),

    #[error("i/o error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Decoding or encoding failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("crop {rect:?} exceeds decoded image {image}")]
    CropOutOfBounds { rect: CropRect, image: Dimensions },
}

/// Decodes, transforms and encodes local image files.
///
/// Every call writes a new file named `<stem>[-crop]-<w>x<h>-<random>.<ext>`,
/// so calls never overwrite each other's output. The file only appears under
/// that name once encoding has succeeded.
#[derive(Clone, Debug)]
pub struct ImageEngine {
    output_dir: PathBuf,
    filter: FilterType,
}

impl ImageEngine {
    /// Engine writing its results into `output_dir`, which must exist.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            filter: FilterType::Lanczos3,
        }
    }

    /// Resampling filter for resize steps.
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    fn open(
        &self,
        source: &ImageRef,
    ) -> Result<(PathBuf, ImageReader<io::BufReader<File>>), EngineError> {
        let path = source
            .to_path()
            .ok_or_else(|| EngineError::UnsupportedReference(source.clone()))?;
        let reader = ImageReader::open(&path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| io_error(&path, e))?;
        Ok((path, reader))
    }

    /// Name prefix and suffix around the random part of an output file.
    fn output_name(
        source: &Path,
        operations: &[Operation],
        format: OutputFormat,
    ) -> (String, String) {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("image"));
        let cropped = operations.iter().any(|op| matches!(op, Operation::Crop(_)));
        let size = operations.iter().rev().find_map(|op| match op {
            Operation::Resize(d) => Some(*d),
            Operation::Crop(_) => None,
        });
        let mut name = stem;
        if cropped {
            name.push_str("-crop");
        }
        if let Some(d) = size {
            name.push_str(&format!("-{d}"));
        }
        name.push('-');
        (name, format!(".{}", format.extension()))
    }

    /// Fresh, uniquely named file in the output directory. Removed on drop
    /// unless kept.
    fn create_output(
        &self,
        source: &Path,
        operations: &[Operation],
        format: OutputFormat,
    ) -> Result<NamedTempFile, EngineError> {
        let (prefix, suffix) = Self::output_name(source, operations, format);
        Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.output_dir)
            .map_err(|e| io_error(&self.output_dir, e))
    }
}

impl DimensionProbe for ImageEngine {
    type Error = EngineError;

    fn dimensions(&self, source: &ImageRef) -> Result<Dimensions, EngineError> {
        let (_, reader) = self.open(source)?;
        let (w, h) = reader.into_dimensions()?;
        Ok(Dimensions::new(w, h))
    }
}

impl ImageExecutor for ImageEngine {
    type Error = EngineError;

    fn execute(
        &self,
        source: &ImageRef,
        operations: &[Operation],
        encoding: OutputEncoding,
    ) -> Result<ImageRef, EngineError> {
        let (path, reader) = self.open(source)?;
        let mut img = reader.decode()?;
        tracing::trace!(width = img.width(), height = img.height(), "decoded source");

        for op in operations {
            img = apply(img, *op, self.filter)?;
        }

        let mut out = self.create_output(&path, operations, encoding.format)?;
        write_encoded(&img, &mut out, encoding)?;
        let (_, out_path) = out.keep().map_err(|e| io_error(&self.output_dir, e.error))?;
        tracing::trace!(path = %out_path.display(), "encoded output");
        Ok(ImageRef::from_path(out_path))
    }
}

fn apply(img: DynamicImage, op: Operation, filter: FilterType) -> Result<DynamicImage, EngineError> {
    match op {
        Operation::Crop(rect) => {
            let bounds = Dimensions::new(img.width(), img.height());
            // crop_imm clamps silently; a plan made for other dimensions is an error.
            if !rect.fits_within(bounds) {
                return Err(EngineError::CropOutOfBounds {
                    rect,
                    image: bounds,
                });
            }
            if rect.is_full(bounds) {
                return Ok(img);
            }
            Ok(img.crop_imm(rect.x, rect.y, rect.width, rect.height))
        }
        Operation::Resize(d) if d.width == img.width() && d.height == img.height() => Ok(img),
        Operation::Resize(d) => Ok(img.resize_exact(d.width, d.height, filter)),
    }
}

fn write_encoded(
    img: &DynamicImage,
    out: &mut NamedTempFile,
    encoding: OutputEncoding,
) -> Result<(), EngineError> {
    let path = out.path().to_path_buf();
    let mut writer = BufWriter::new(out.as_file_mut());
    match encoding.format {
        OutputFormat::Jpeg => {
            let quality = encoding.quality.clamp(1, 100);
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, quality))?;
        }
        OutputFormat::Png => {
            let img = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            img.write_with_encoder(PngEncoder::new(&mut writer))?;
        }
    }
    writer.flush().map_err(|e| io_error(&path, e))
}

fn io_error(path: &Path, source: io::Error) -> EngineError {
    EngineError::Io {
        path: path.to_path_buf(),
        source,
    }
}
