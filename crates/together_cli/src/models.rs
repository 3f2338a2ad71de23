//! Models command

use clap::Args;
use std::io::Write;
use together_provider::{ModelDescriptor, TogetherPlugin};

/// Models command arguments
#[derive(Debug, Args)]
pub struct ModelsCmd {
    /// Print each catalog entry as a JSON line
    #[arg(long)]
    pub json: bool,
}

impl ModelsCmd {
    /// Run the models command
    pub async fn run(&self, plugin: &TogetherPlugin, out: &mut impl Write) -> anyhow::Result<()> {
        let mut descriptors = Vec::new();
        plugin
            .discover_and_register(|model| descriptors.push(model.descriptor().clone()))
            .await?;

        for descriptor in &descriptors {
            if self.json {
                writeln!(out, "{}", serde_json::to_string(descriptor)?)?;
            } else {
                writeln!(out, "{}", describe(descriptor))?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// One listing line: the ID, then the display name and context length if known.
fn describe(descriptor: &ModelDescriptor) -> String {
    let mut line = format!("Together: {}", descriptor.id);
    if let Some(name) = &descriptor.display_name {
        line.push_str(&format!(" ({name})"));
    }
    if let Some(context_length) = descriptor.context_length {
        line.push_str(&format!(" [{context_length} tokens]"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_bare_model() {
        assert_eq!(describe(&ModelDescriptor::new("a/b")), "Together: a/b");
    }

    #[test]
    fn describe_with_catalog_details() {
        let mut descriptor = ModelDescriptor::new("meta/llama");
        descriptor.display_name = Some("Llama".to_string());
        descriptor.context_length = Some(4096);

        assert_eq!(describe(&descriptor), "Together: meta/llama (Llama) [4096 tokens]");
    }
}
