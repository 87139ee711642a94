//! Transform options and their query-string form.
//!
//! A host app hands configuration over as `mode=crop&w=400&h=400`. [`parse`]
//! tokenizes that into a [`Request`] plus non-fatal warnings, and
//! [`Request::resolve`] validates it into [`TransformOptions`].
//!
//! # Example
//!
//! ```
//! use imgplan::options::{self, TransformOptions};
//! use imgplan::Mode;
//!
//! let result = options::parse("?mode=crop&w=400&h=400");
//! assert!(result.warnings.is_empty());
//!
//! let opts = result.request.resolve().unwrap();
//! assert_eq!(opts, TransformOptions::new(Mode::Crop, 400, 400));
//! ```

mod parse;

use alloc::string::String;
use alloc::vec::Vec;

use crate::geometry::{DimensionRole, Dimensions, PlanError};
use crate::plan::Mode;

/// Validated `{mode, targetWidth, targetHeight}` configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransformOptions {
    pub mode: Mode,
    /// Target box width in pixels.
    pub width: u32,
    /// Target box height in pixels.
    pub height: u32,
}

impl TransformOptions {
    /// Create options. Zero extents are rejected later, at planning time.
    pub const fn new(mode: Mode, width: u32, height: u32) -> Self {
        Self {
            mode,
            width,
            height,
        }
    }

    /// Target box.
    pub const fn target(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Parse and resolve a query string in one step.
    ///
    /// Non-fatal warnings are returned alongside the options.
    pub fn from_query(query: &str) -> Result<(Self, Vec<ParseWarning>), OptionsError> {
        let ParseResult { request, warnings } = parse(query);
        Ok((request.resolve()?, warnings))
    }
}

/// Options as read from a query string, before validation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Request {
    pub mode: Option<Mode>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Request {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that every field is present and the target is whole positive pixels.
    pub fn resolve(&self) -> Result<TransformOptions, OptionsError> {
        let mode = self.mode.ok_or(OptionsError::MissingMode)?;
        let width = self.width.ok_or(OptionsError::MissingWidth)?;
        let height = self.height.ok_or(OptionsError::MissingHeight)?;
        let target = Dimensions::from_f64(width, height, DimensionRole::Target)?;
        Ok(TransformOptions::new(mode, target.width, target.height))
    }
}

/// Result of parsing an options query string.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed, unvalidated fields.
    pub request: Request,
    /// Non-fatal parse warnings.
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal warning from query string parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A key appeared more than once (last value wins).
    DuplicateKey { key: String, value: String },
    /// A key is not a transform option.
    KeyNotRecognized { key: String, value: String },
    /// A key was recognized but its value could not be parsed.
    ValueInvalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Options could not be resolved.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("missing `mode` option")]
    MissingMode,
    #[error("missing target width (`w`)")]
    MissingWidth,
    #[error("missing target height (`h`)")]
    MissingHeight,
    #[error(transparent)]
    InvalidDimensions(#[from] PlanError),
}

/// Parse an options query string (with or without leading `?`).
pub fn parse(query: &str) -> ParseResult {
    let (request, warnings) = parse::parse_query(query);
    ParseResult { request, warnings }
}
