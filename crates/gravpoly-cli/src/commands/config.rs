//! Config command implementation

use crate::cli::ConfigArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{ConfigOutput, ConfigRow};
use anyhow::Result;
use std::path::Path;

pub fn execute(args: ConfigArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(config_path, args.overrides.into())?;

    let mut values: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    values.sort_by(|a, b| a.key.cmp(&b.key));

    if let Err(e) = config.validate() {
        output.warning(format!("Configuration is not usable for a run: {}", e));
    }

    if output.is_json() {
        output.result(ConfigOutput { values })?;
    } else {
        output.section("Configuration Values");
        output.table(values);

        output.section("Configuration Precedence");
        output.kv("Order", "CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
