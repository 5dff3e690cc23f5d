//! Individual preprocessing steps, in pipeline order

pub mod resize;
pub mod contrast;
pub mod grayscale;
pub mod threshold;
pub mod restore;
