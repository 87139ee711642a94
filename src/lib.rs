//! Crop and resize planning for user-submitted photos.
//!
//! The core is pure geometry: no pixel operations, no allocations, `no_std`
//! compatible. Pixel work goes to an image executor behind a trait.
//!
//! # Modules
//!
//! - [`geometry`] — Dimensions, crop rectangles, validation errors
//! - [`plan`] — Crop/Resize modes and plan computation
//! - [`options`] — Transform options and their query-string form (`alloc`)
//! - [`process`] — Probe → plan → execute orchestration and collaborator traits (`std`)
//! - [`engine`] — File-based executor on the `image` crate (`image`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod geometry;
pub mod plan;

#[cfg(feature = "alloc")]
pub mod options;

#[cfg(feature = "std")]
pub mod process;

#[cfg(feature = "image")]
pub mod engine;

pub use geometry::{CropRect, DimensionRole, Dimensions, PlanError};
pub use plan::{CropPlan, Mode, Operation, ResizePlan, TransformPlan, UnknownMode, plan};

#[cfg(feature = "alloc")]
pub use options::{OptionsError, TransformOptions};

#[cfg(feature = "std")]
pub use process::{
    DimensionProbe, ImageExecutor, ImageRef, OutputEncoding, OutputFormat, ProcessError,
    Processor, Transformed,
};
