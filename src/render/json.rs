//! JSON renderer — the compiled Command as handed to an emitter.

use crate::meta::Command;
use crate::render::Renderer;
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, command: &Command) -> Result<String> {
        let mut out =
            serde_json::to_string_pretty(command).context("failed to serialize command")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
