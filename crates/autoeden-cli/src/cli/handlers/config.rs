//! Configuration command handlers

use crate::cli::commands::ConfigAction;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{compress_path, json_output, print_success, table_output};
use std::path::PathBuf;

pub async fn handle_config(
    action: ConfigAction,
    mut config: CliConfig,
    config_path: PathBuf,
    json: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let values = config.to_map();
            if json {
                return json_output(&values);
            }
            println!("Configuration file: {}", compress_path(&config_path));
            println!();
            table_output::display_config(&values)
        }
        ConfigAction::Get { key } => {
            let value = config.get(&key)?;
            if json {
                json_output(&serde_json::json!({ "key": key, "value": value }))
            } else {
                println!("{value}");
                Ok(())
            }
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to_path(&config_path).await?;
            print_success(&format!("Set {key} = {value}"));
            Ok(())
        }
    }
}
