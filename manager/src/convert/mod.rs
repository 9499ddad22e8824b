//! Template to adapter conversion

pub mod image;

pub use image::{convert_all, image_to_service};
