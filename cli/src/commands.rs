use std::io::Write;
use std::sync::Arc;

use scoreboard_core::{ClientId, CreateOutcome, ToggleOutcome, ZoneLookup};
use tracing::warn;

use crate::CliContext;

pub fn join(ctx: &CliContext, name: &str, zone: &str) {
    let client = ClientId::from(name);
    ctx.zones.set(&client, zone);
    match ctx.manager.create(&client) {
        CreateOutcome::Created => println!("{name} joined {zone} with a scoreboard"),
        CreateOutcome::Cancelled => println!("{name} joined {zone}, scoreboard cancelled"),
        CreateOutcome::NoPartition => println!("{name} joined {zone}, no scoreboard for this zone"),
        CreateOutcome::Inert => println!("{name} joined {zone}, scoreboard is not loaded"),
    }
}

pub fn quit(ctx: &CliContext, name: &str) {
    let client = ClientId::from(name);
    let had_overlay = ctx.manager.find(&client).is_some();
    if !ctx.manager.delete(&client) && had_overlay {
        warn!(client = %client, "Failed to delete scoreboard for client");
    }
    ctx.zones.remove(&client);
    println!("{name} left");
}

/// Simulate a dropped connection: the host tears the overlay down before
/// the quit event arrives.
pub fn kick(ctx: &CliContext, name: &str) {
    let client = ClientId::from(name);
    ctx.console.close_externally(&client);
    quit(ctx, name);
}

pub fn toggle(ctx: &CliContext, name: &str) {
    let messages = ctx.config.get().messages;
    match ctx.manager.toggle(&ClientId::from(name)) {
        ToggleOutcome::NowVisible => println!("{}", messages.scoreboard_enabled),
        ToggleOutcome::NowHidden => println!("{}", messages.scoreboard_disabled),
        ToggleOutcome::NoOverlay => println!("{name} has no scoreboard"),
    }
}

pub fn move_to(ctx: &CliContext, name: &str, zone: &str) {
    ctx.zones.set(&ClientId::from(name), zone);
    println!("{name} moved to {zone}");
}

/// Re-read the configuration file and restart the rotations.
pub async fn reload(ctx: &CliContext) {
    let config = Arc::clone(&ctx.config);
    let manager = Arc::clone(&ctx.manager);

    // Stopping the rotation tasks can block for the shutdown grace period
    let result = tokio::task::spawn_blocking(move || match config.reload() {
        Ok(model) => Ok((manager.reload(&model), model.messages)),
        Err(err) => Err((err.to_string(), config.get().messages)),
    })
    .await;

    match result {
        Ok(Ok((true, messages))) => println!("{}", messages.reload_success),
        Ok(Ok((false, messages))) => println!("{}", messages.reload_failed),
        Ok(Err((err, messages))) => println!("{}: {err}", messages.reload_failed),
        Err(err) => println!("reload task failed: {err}"),
    }
}

pub fn list(ctx: &CliContext) {
    let mut overlays = ctx.manager.repository().all();
    if overlays.is_empty() {
        println!("No scoreboards");
        return;
    }
    overlays.sort_by(|a, b| a.id().cmp(b.id()));

    println!("{:<24} {:<10} Zone", "Client", "State");
    println!("{}", "-".repeat(48));
    for overlay in &overlays {
        let zone = ctx.zones.zone_of(overlay.id()).unwrap_or_else(|| "-".to_string());
        println!("{:<24} {:<10} {}", overlay.id().as_str(), overlay.visibility().to_string(), zone);
    }
    println!("\nTotal: {} scoreboards", overlays.len());
}

pub fn show(ctx: &CliContext, name: &str) {
    let client = ClientId::from(name);
    let Some(board) = ctx.console.board(&client) else {
        println!("{name} has no scoreboard");
        return;
    };
    let state = if board.attached { "shown" } else { "hidden" };
    println!("┌ {} ({state})", board.title);
    for (index, line) in board.lines.iter().enumerate() {
        println!("│ {index}: {line}");
    }
    println!("└");
}

pub fn status(ctx: &CliContext) {
    let Some(settings) = ctx.manager.settings() else {
        println!("Scoreboard is not loaded");
        return;
    };
    println!("Config:          {}", ctx.config.path().display());
    println!("Mode:            {}", settings.mode);
    println!("Line period:     {:?}", settings.line_period);
    println!("Title period:    {:?}", settings.title_period);
    println!("Animated title:  {}", settings.animated_title);
    println!("Running tasks:   {:?}", ctx.manager.running_tasks());
    println!("Scoreboards:     {}", ctx.manager.repository().len());
}

pub async fn exit(ctx: &CliContext) {
    let manager = Arc::clone(&ctx.manager);
    match tokio::task::spawn_blocking(move || manager.shutdown()).await {
        Ok(result) => println!("Scoreboard stopped: {result}"),
        Err(err) => println!("Scoreboard shutdown failed: {err}"),
    }
    print!("quitting...");
    let _ = std::io::stdout().flush();
}
