//! Assistant handlers

use crate::cli::commands::AiAction;
use crate::error::Result;
use crate::output::{json_output, print_info, print_warning};
use autoeden_sdk::{ApiError, Store};
use console::style;

pub async fn handle_ai(store: &Store, action: AiAction, json: bool) -> Result<()> {
    match action {
        AiAction::Status => {
            // Other failures land in the status tracker
            if let Err(err @ ApiError::SessionExpired(_)) = store.check_ai_status().await {
                return Err(err.into());
            }
            let (enabled, error) =
                store.read(|s| (s.ai.is_enabled, s.ai.status_check.error_message()));

            if json {
                return json_output(&serde_json::json!({
                    "enabled": enabled,
                    "error": error,
                }));
            }
            match (enabled, error) {
                (true, _) => print_info("The assistant is available"),
                (false, Some(error)) => print_warning(&format!("Assistant unavailable: {error}")),
                (false, None) => print_info("The assistant is turned off"),
            }
            Ok(())
        }
        AiAction::Chat { message } => {
            let reply = store.send_chat_message(&message).await?;
            print_reply(json, reply.text())
        }
        AiAction::Ask {
            vehicle_id,
            question,
        } => {
            let reply = store.ask_about_vehicle(vehicle_id, &question).await?;
            print_reply(json, reply.text())
        }
    }
}

fn print_reply(json: bool, text: &str) -> Result<()> {
    if json {
        return json_output(&serde_json::json!({ "response": text }));
    }
    println!("{} {}", style("Eden:").cyan().bold(), text);
    Ok(())
}
