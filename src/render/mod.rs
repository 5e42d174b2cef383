//! Renderer module — trait-based format dispatch.

pub mod json;
pub mod text;

use crate::meta::Command;
use anyhow::{anyhow, Result};

/// Trait for rendering a compiled Command into a specific output format.
pub trait Renderer {
    fn render(&self, command: &Command) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(json::JsonRenderer)),
        "text" | "txt" => Ok(Box::new(text::TextRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use json or text", format)),
    }
}
