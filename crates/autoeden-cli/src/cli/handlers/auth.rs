//! Authentication command handlers

use crate::error::Result;
use crate::output::{json_output, print_info, print_success};
use autoeden_sdk::types::RegisterRequest;
use autoeden_sdk::Store;
use console::style;
use dialoguer::{Input, Password};
use tracing::debug;

/// Handle login command
pub async fn handle_login(store: &Store, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    debug!("Logging in as {}", email);
    let response = store.login(&email, &password).await?;

    let name = response
        .user
        .as_ref()
        .map(|u| u.username.clone())
        .unwrap_or(email);
    print_success(&format!("Logged in as {}", style(name).bold()));
    Ok(())
}

/// Handle register command
pub async fn handle_register(store: &Store, email: String, username: String) -> Result<()> {
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let ack = store
        .register(&RegisterRequest {
            username,
            email,
            password,
        })
        .await?;

    print_success(
        ack.detail
            .as_deref()
            .unwrap_or("Account created. Check your inbox to verify your email."),
    );
    Ok(())
}

/// Handle logout command
pub async fn handle_logout(store: &Store) -> Result<()> {
    if !store.read(|s| s.auth.is_authenticated) {
        print_info("Not logged in");
        return Ok(());
    }

    store.logout().await?;
    print_success("Logged out");
    Ok(())
}

/// Handle whoami command
pub async fn handle_whoami(store: &Store, json: bool) -> Result<()> {
    let (authenticated, user) = store.read(|s| (s.auth.is_authenticated, s.auth.user.clone()));

    if json {
        return json_output(&serde_json::json!({
            "authenticated": authenticated,
            "user": user,
        }));
    }

    match (authenticated, user) {
        (false, _) => {
            println!("Not logged in.");
            println!();
            println!("Sign in with:");
            println!("  {} login", style("autoeden").cyan());
        }
        (true, None) => print_info("Logged in"),
        (true, Some(user)) => {
            println!("  {}: {}", style("Username").bold(), user.username);
            println!("  {}: {}", style("Email").bold(), user.email);
            if user.is_staff {
                println!("  {}: administrator", style("Role").bold());
            }
        }
    }
    Ok(())
}
