//! Bid handlers

use crate::cli::commands::BidAction;
use crate::error::Result;
use crate::output::{print_info, print_success, render, table_output};
use autoeden_sdk::Store;
use console::style;

pub async fn handle_bid(store: &Store, action: BidAction, json: bool) -> Result<()> {
    match action {
        BidAction::Place {
            vehicle_id,
            amount,
            message,
        } => {
            let bid = store.place_bid(vehicle_id, amount, message).await?;
            if json {
                return crate::output::json_output(&bid);
            }
            print_success(&format!(
                "Bid of {} placed on vehicle {}",
                style(format!("${}", bid.amount)).bold(),
                bid.vehicle
            ));
            Ok(())
        }
        BidAction::Mine => {
            let bids = store.fetch_my_bids().await?;
            render(json, &bids, |bids| {
                if bids.is_empty() {
                    print_info("You have not placed any bids");
                    Ok(())
                } else {
                    table_output::display_bids(bids)
                }
            })
        }
    }
}
