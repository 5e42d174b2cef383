//! Plain text renderer — a readable summary of what a Command compiled to.

use crate::meta::{Command, CommandInput};
use crate::render::Renderer;
use anyhow::Result;

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, command: &Command) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!(
            "{} ({}.{})\n",
            command.name, command.package, command.type_name
        ));
        if !command.help.is_empty() {
            out.push_str(&format!("\n{}\n", command.help));
        }
        if !command.description.is_empty() {
            out.push_str(&format!("\n{}\n", command.description));
        }

        if command.inputs.is_empty() {
            out.push_str("\nNo inputs.\n");
            return Ok(out);
        }
        out.push_str("\nInputs:\n");
        for input in &command.inputs {
            render_input(&mut out, input);
        }
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

fn render_input(out: &mut String, input: &CommandInput) {
    out.push_str(&format!("  {} {}\n", input.field_name, input.ty));

    let tag = &input.tag;
    if let Some(arg) = tag.arg() {
        let what = if arg.is_unbounded() || arg.is_range() {
            "args"
        } else {
            "arg"
        };
        out.push_str(&format!("    {}: {}\n", what, arg));
    }
    if let Some(flag) = tag.flag() {
        out.push_str(&format!("    flag: {}\n", flag.usage()));
    }
    if let Some(default) = tag.default_value() {
        out.push_str(&format!("    default: {}\n", default));
    }
    for line in input.doc.lines() {
        out.push_str(&format!("    {}\n", line));
    }
}
