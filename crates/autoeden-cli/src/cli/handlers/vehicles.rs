//! Vehicle listing handlers

use crate::cli::commands::{AdminAction, MarketFilters, VehicleAction};
use crate::error::{CliError, Result};
use crate::output::{print_info, print_success, render, table_output};
use autoeden_sdk::state::selectors;
use autoeden_sdk::types::{MarketplaceFilters, Vehicle, VehicleStatus, VerificationUpdate};
use autoeden_sdk::Store;
use console::style;
use dialoguer::Confirm;

pub async fn handle_vehicles(store: &Store, action: VehicleAction, json: bool) -> Result<()> {
    match action {
        VehicleAction::List => {
            let vehicles = store.fetch_vehicles().await?;
            show(json, &vehicles, "No vehicles found")
        }
        VehicleAction::Mine => handle_mine(store, json).await,
        VehicleAction::Market { filters } => {
            let vehicles = store.fetch_marketplace(&marketplace_filters(filters)).await?;
            show(json, &vehicles, "No listings match those filters")
        }
        VehicleAction::Pending => {
            let vehicles = store.fetch_pending_vehicles().await?;
            show(json, &vehicles, "Nothing is waiting for review")
        }
        VehicleAction::Show { id } => handle_show(store, id, json).await,
        VehicleAction::Delete { id, yes } => handle_delete(store, id, yes).await,
        VehicleAction::Hide { id } => {
            let vehicle = store.toggle_visibility(id).await?;
            let state = if vehicle.is_visible { "visible" } else { "hidden" };
            print_success(&format!("Vehicle {id} is now {state}"));
            Ok(())
        }
    }
}

pub async fn handle_admin(store: &Store, action: AdminAction, json: bool) -> Result<()> {
    match action {
        AdminAction::Dashboard => {
            store.fetch_vehicles().await?;
            store.fetch_pending_vehicles().await?;
            let stats = store.read(selectors::admin_dashboard_stats);
            render(json, &stats, |stats| {
                println!("  {}: {}", style("Pending review").bold(), stats.pending_count);
                println!("  {}: {}", style("Physically verified").bold(), stats.verified_count);
                println!("  {}: {}", style("Total listings").bold(), stats.total_listings);
                println!(
                    "  {}: {}",
                    style("Instant sale requests").bold(),
                    stats.instant_sale_requests
                );
                Ok(())
            })
        }
        AdminAction::Verify { id, status, reason } => {
            if status == VehicleStatus::Rejected && reason.is_none() {
                return Err(CliError::invalid_argument(
                    "--reason is required when rejecting a vehicle",
                ));
            }

            let vehicle = store
                .verify_vehicle(
                    id,
                    &VerificationUpdate {
                        status,
                        rejection_reason: reason,
                    },
                )
                .await?;
            print_success(&format!(
                "{} {} {} marked {}",
                vehicle.year,
                vehicle.make,
                vehicle.model,
                vehicle.status.as_str()
            ));
            Ok(())
        }
    }
}

async fn handle_mine(store: &Store, json: bool) -> Result<()> {
    let vehicles = store.fetch_my_vehicles().await?;
    if json || vehicles.is_empty() {
        return show(json, &vehicles, "You have not listed any vehicles");
    }

    table_output::display_vehicles(&vehicles)?;
    let stats = store.read(selectors::user_vehicle_stats);
    println!(
        "{} total, {} pending, {} verified, {} rejected",
        stats.total, stats.pending, stats.verified, stats.rejected
    );

    store.read(|state| {
        for vehicle in selectors::rejected_vehicles(state) {
            if let Some(reason) = &vehicle.rejection_reason {
                println!(
                    "  {} {} {}: {}",
                    style("✗").red(),
                    vehicle.make,
                    vehicle.model,
                    reason
                );
            }
        }
    });
    Ok(())
}

async fn handle_show(store: &Store, id: u64, json: bool) -> Result<()> {
    store.fetch_vehicles().await?;
    store.fetch_all_bids().await?;

    store.read(|state| {
        let info = selectors::vehicle_with_bid_info(state, id)
            .ok_or_else(|| CliError::invalid_argument(format!("No vehicle with id {id}")))?;
        let timeline = selectors::verification_timeline(info.vehicle);

        if json {
            return crate::output::json_output(&serde_json::json!({
                "vehicle": info.vehicle,
                "bid_count": info.bid_count,
                "highest_bid": info.highest_bid,
                "timeline": timeline,
            }));
        }

        let vehicle = info.vehicle;
        println!(
            "{}",
            style(format!("{} {} {}", vehicle.year, vehicle.make, vehicle.model)).bold()
        );
        if let Some(price) = vehicle.display_price() {
            println!("  {}: ${}", style("Price").bold(), price);
        }
        if info.has_bids {
            println!(
                "  {}: {} (highest ${})",
                style("Bids").bold(),
                info.bid_count,
                info.highest_bid
            );
        } else {
            println!("  {}: none yet", style("Bids").bold());
        }
        println!();
        for step in timeline {
            let mark = if step.completed {
                style("●").green()
            } else {
                style("○").dim()
            };
            let date = step
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!("  {mark} {:<22} {date}", step.label);
        }
        Ok(())
    })
}

async fn handle_delete(store: &Store, id: u64, skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete vehicle {id}? This cannot be undone"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    store.delete_vehicle(id).await?;
    print_success(&format!("Vehicle {id} deleted"));
    Ok(())
}

fn show(json: bool, vehicles: &[Vehicle], empty: &str) -> Result<()> {
    render(json, vehicles, |vehicles| {
        if vehicles.is_empty() {
            print_info(empty);
            Ok(())
        } else {
            table_output::display_vehicles(vehicles)
        }
    })
}

fn marketplace_filters(filters: MarketFilters) -> MarketplaceFilters {
    MarketplaceFilters {
        make: filters.make,
        model: filters.model,
        min_year: filters.min_year,
        max_year: filters.max_year,
        max_price: filters.max_price,
        ..Default::default()
    }
}
