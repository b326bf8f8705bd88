//! Data models shared across pipeline stages.

pub mod config;
pub mod document;

pub use config::{OcrBackend, OnDocumentError, ShiwakeConfig};
pub use document::{Document, ExtractedText};
