//! `stockdrop config` — print the effective settings.

use anyhow::{Context, Result};
use clap::Args;
use stockdrop_core::Settings;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print JSON instead of YAML.
    #[arg(long)]
    pub json: bool,
}

impl ConfigArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let rendered = if self.json {
            serde_json::to_string_pretty(settings).context("failed to render settings JSON")?
        } else {
            settings.to_yaml().context("failed to render settings YAML")?
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}
