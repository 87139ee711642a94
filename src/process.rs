//! Probe, plan, execute.
//!
//! [`Processor`] drives one transform: ask a [`DimensionProbe`] for the
//! source size, compute the [`TransformPlan`], and hand its operations to an
//! [`ImageExecutor`] with a fixed [`OutputEncoding`]. Each stage runs once.
//! Collaborator failures come back unchanged as the `source()` of a
//! [`ProcessError`]; nothing is retried.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::geometry::{DimensionRole, Dimensions, PlanError};
use crate::options::TransformOptions;
use crate::plan::{Operation, TransformPlan, plan};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Opaque reference to an image: a file path or a URI.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Reference a local file.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().into_owned())
    }

    /// Local path, if this is a plain path or a local `file:` URI.
    ///
    /// URIs are percent-decoded; a `file:` URI naming a remote host has no
    /// local path.
    pub fn to_path(&self) -> Option<PathBuf> {
        if self.0.starts_with("file:") {
            return Url::parse(&self.0).ok()?.to_file_path().ok();
        }
        match self.0.split_once("://") {
            Some(_) => None,
            None => Some(PathBuf::from(&self.0)),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded output container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossy; honors [`OutputEncoding::quality`]. Alpha is dropped.
    #[default]
    Jpeg,
    /// Lossless; quality is ignored.
    Png,
}

impl OutputFormat {
    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Output policy handed to the executor with every plan.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputEncoding {
    pub format: OutputFormat,
    /// Lossy quality factor, 1-100.
    pub quality: u8,
}

impl OutputEncoding {
    /// JPEG at quality 80.
    pub const DEFAULT: Self = Self {
        format: OutputFormat::Jpeg,
        quality: 80,
    };
}

impl Default for OutputEncoding {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Reads the pixel dimensions of a source image.
pub trait DimensionProbe {
    type Error: StdError + Send + Sync + 'static;

    fn dimensions(&self, source: &ImageRef) -> Result<Dimensions, Self::Error>;
}

/// Applies planned operations to a source image and encodes the result.
pub trait ImageExecutor {
    type Error: StdError + Send + Sync + 'static;

    /// Run `operations` in order against `source` and return a reference to
    /// the produced image.
    fn execute(
        &self,
        source: &ImageRef,
        operations: &[Operation],
        encoding: OutputEncoding,
    ) -> Result<ImageRef, Self::Error>;
}

impl<T: DimensionProbe + ?Sized> DimensionProbe for &T {
    type Error = T::Error;

    fn dimensions(&self, source: &ImageRef) -> Result<Dimensions, Self::Error> {
        (**self).dimensions(source)
    }
}

impl<T: ImageExecutor + ?Sized> ImageExecutor for &T {
    type Error = T::Error;

    fn execute(
        &self,
        source: &ImageRef,
        operations: &[Operation],
        encoding: OutputEncoding,
    ) -> Result<ImageRef, Self::Error> {
        (**self).execute(source, operations, encoding)
    }
}

/// Transform failure.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Target or probed source dimensions are unusable.
    #[error(transparent)]
    InvalidDimensions(#[from] PlanError),

    #[error("could not determine dimensions of {image}")]
    DimensionProbeFailed {
        image: ImageRef,
        #[source]
        source: BoxError,
    },

    #[error("image processing failed for {image}")]
    ImageProcessingFailed {
        image: ImageRef,
        #[source]
        source: BoxError,
    },
}

impl ProcessError {
    /// The collaborator error behind a probe or executor failure.
    pub fn collaborator_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::InvalidDimensions(_) => None,
            Self::DimensionProbeFailed { source, .. }
            | Self::ImageProcessingFailed { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Outcome of a successful transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transformed {
    /// The produced image.
    pub output: ImageRef,
    /// The plan that was executed.
    pub plan: TransformPlan,
}

/// Runs probe → plan → execute for each request.
///
/// Holds no per-call state; share one across threads when the collaborators
/// are `Sync`.
#[derive(Clone, Debug)]
pub struct Processor<P, E> {
    probe: P,
    executor: E,
    encoding: OutputEncoding,
}

impl<P: DimensionProbe, E: ImageExecutor> Processor<P, E> {
    /// Processor with the default [`OutputEncoding`].
    pub fn new(probe: P, executor: E) -> Self {
        Self {
            probe,
            executor,
            encoding: OutputEncoding::DEFAULT,
        }
    }

    /// Override the output encoding.
    pub fn encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Compute the plan for `source` without executing it.
    pub fn plan(
        &self,
        source: &ImageRef,
        options: &TransformOptions,
    ) -> Result<TransformPlan, ProcessError> {
        let target = options.target().validate(DimensionRole::Target)?;
        let dims = self
            .probe
            .dimensions(source)
            .map_err(|e| ProcessError::DimensionProbeFailed {
                image: source.clone(),
                source: Box::new(e),
            })?;
        Ok(plan(dims, target, options.mode)?)
    }

    /// Transform `source` according to `options`.
    #[tracing::instrument(skip_all, fields(source = %source, mode = %options.mode))]
    pub fn process(
        &self,
        source: &ImageRef,
        options: &TransformOptions,
    ) -> Result<Transformed, ProcessError> {
        let plan = self.plan(source, options)?;
        tracing::debug!(?plan, "computed transform plan");

        let operations: Vec<Operation> = plan.operations().collect();
        let output = self
            .executor
            .execute(source, &operations, self.encoding)
            .map_err(|e| ProcessError::ImageProcessingFailed {
                image: source.clone(),
                source: Box::new(e),
            })?;
        tracing::debug!(output = %output, "transform complete");

        Ok(Transformed { output, plan })
    }
}
