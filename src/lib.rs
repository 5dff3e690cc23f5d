//! OCR service that binarizes uploads before text recognition
//!
//! An upload flows through [`decoder`], the [`preprocessing`] pipeline, the
//! [`recognition`] adapter around a [`engine::TextRecognizer`], and finally
//! the [`aggregator`], which builds the JSON response.

pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod recognition;
pub mod server;
pub mod service;
