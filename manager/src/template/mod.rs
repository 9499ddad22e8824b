//! Template module

pub mod parser;

pub use parser::{parse_images, parse_template, Template};
