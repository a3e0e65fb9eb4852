//! Gap ("failure") counting in sugarcane plantation rows from aerial images.
//!
//! The pipeline has two entry points in [`pipeline`]: `segment` turns an
//! image into a [`segmentation::ComponentMap`] of plant components, and
//! `process` fits row lines through the components, measures the gaps along
//! them and converts the result to a percentage and a real-world length.

pub mod consts;
pub mod error;
pub mod filters;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod render;
pub mod rows;
pub mod segmentation;
