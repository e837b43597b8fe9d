//! Notification handlers

use crate::cli::commands::NotificationAction;
use crate::error::Result;
use crate::output::{json_output, print_info, print_success, table_output};
use autoeden_sdk::Store;

pub async fn handle_notifications(
    store: &Store,
    action: NotificationAction,
    json: bool,
) -> Result<()> {
    match action {
        NotificationAction::List { page } => {
            store.fetch_notifications(page).await?;
            let (items, has_more) =
                store.read(|s| (s.notifications.items.clone(), s.notifications.has_more));

            if json {
                return json_output(&serde_json::json!({
                    "results": items,
                    "has_more": has_more,
                }));
            }
            if items.is_empty() {
                print_info("No notifications");
                return Ok(());
            }
            table_output::display_notifications(&items)?;
            if has_more {
                let next = page.unwrap_or(1) + 1;
                print_info(&format!("More available: autoeden notifications list --page {next}"));
            }
            Ok(())
        }
        NotificationAction::Count => {
            let count = store.fetch_unread_count().await?;
            if json {
                json_output(&serde_json::json!({ "unread_count": count }))
            } else {
                println!("{count} unread");
                Ok(())
            }
        }
        NotificationAction::Read { id } => {
            store.mark_notification_read(id).await?;
            print_success(&format!("Notification {id} marked read"));
            Ok(())
        }
        NotificationAction::ReadAll => {
            store.mark_all_notifications_read().await?;
            print_success("All notifications marked read");
            Ok(())
        }
        NotificationAction::Delete { id } => {
            store.delete_notification(id).await?;
            print_success(&format!("Notification {id} deleted"));
            Ok(())
        }
        NotificationAction::Clear => {
            store.clear_read_notifications().await?;
            print_success("Read notifications cleared");
            Ok(())
        }
    }
}
