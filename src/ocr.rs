//! Optical character recognition.
//!
//! Images are cleaned up in-process ([`preprocess`]) and recognized by the
//! Tesseract executable ([`OcrEngine`]). PDF pages are rasterized with
//! `pdftoppm` first.

pub mod engine;
pub mod preprocess;

pub use engine::{OcrConfig, OcrEngine};
pub use preprocess::{Preprocessing, deskew, preprocess};
