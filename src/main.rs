//! Challenge Tracker Demo
//!
//! Replays a scripted match against an in-memory host through the async
//! driver and prints what a display client would show.
//!
//! Usage: `challenge-tracker [config.json]`

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use challenge_tracker::{
    VERSION, PlayerId, Team, LocalHost, MatchState, MatchConfig, MatchDriver, DriverConfig,
    display::ChallengeHud,
    game::host::HeroStatus,
};

/// Optional JSON overrides.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoConfig {
    #[serde(rename = "match")]
    match_config: MatchConfig,
    driver: DriverConfig,
}

fn load_config(path: Option<&str>) -> anyhow::Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("reading config {path}"))?;
    let config: DemoConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))?;
    config.match_config.validate().with_context(|| format!("invalid config {path}"))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting tracing subscriber")?;

    info!("Challenge Tracker v{}", VERSION);

    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;

    demo_match(config).await
}

/// Drive a short scripted match.
async fn demo_match(config: DemoConfig) -> anyhow::Result<()> {
    info!("=== Starting Demo Match ===");

    let state = MatchState::new(config.match_config);
    info!("Match ID: {}", state.match_id);

    let (driver, handle) = MatchDriver::new(config.driver, state, LocalHost::standard());
    let task = tokio::spawn(driver.run());

    let viewer = PlayerId::new(0);
    let mut hud = ChallengeHud::new();
    let mut client = handle.connect(viewer).await?;

    // Pre-game: tracking starts shortly after.
    handle.update_host(|h| h.time = -60.0).await?;
    handle.send_engine_event("game_rules_state_change", json!({ "state": 8 })).await?;
    handle.update_host(|h| h.time = -59.0).await?;
    handle.advance().await?;

    // Laning.
    for i in 0..160u32 {
        let t = f64::from(i) * 3.0;
        handle.update_host(move |h| h.time = t).await?;
        handle
            .send_engine_event("last_hit", json!({ "PlayerID": 2, "EntKilled": 900, "HeroKill": 0 }))
            .await?;
        if i % 2 == 0 {
            handle.send_engine_event("tree_cut", json!({ "tree_x": 0.0, "tree_y": 0.0 })).await?;
        }
        if i % 40 == 0 {
            handle
                .send_engine_event("dota_item_purchased", json!({ "PlayerID": 7, "itemname": "item_dust", "itemcost": 80 }))
                .await?;
        }
    }

    // Mid game.
    handle
        .update_host(|h| {
            h.time = 600.0;
            h.heroes.insert(
                PlayerId::new(6),
                HeroStatus { alive: true, armor: 32.0, attacks_per_second: 1.4, inventory: Vec::new() },
            );
        })
        .await?;
    handle.advance().await?;
    handle
        .send_engine_event(
            "dota_ability_channel_finished",
            json!({ "caster_entindex": LocalHost::hero_entity(PlayerId::new(3)).0, "abilityname": "witch_doctor_death_ward", "interrupted": 1 }),
        )
        .await?;
    handle.send_engine_event("dota_roshan_kill", json!({ "teamnumber": Team::Dire.wire_value(), "gold": 200 })).await?;
    handle
        .send_engine_event("dota_player_used_ability", json!({ "PlayerID": 8, "abilityname": "invoker_invoke" }))
        .await?;
    handle.send_engine_event("dota_player_gained_level", json!({ "PlayerID": 4, "level": 18 })).await?;

    // Post game.
    handle.update_host(|h| h.time = 1800.0).await?;
    handle.send_engine_event("game_rules_state_change", json!({ "state": 11 })).await?;

    // Ask for a final refresh like an opened panel would, then stop.
    if let Some(request) = hud.toggle(viewer) {
        handle.send_client(request).await?;
    }
    drop(handle);

    let (state, host) = task.await.context("driver task panicked")?;

    while let Ok(message) = client.try_recv() {
        hud.apply(message.name(), &message.networked_payload()?)?;
    }

    info!("=== Announcements ===");
    for line in &host.announcements {
        info!("{}", line);
    }

    info!("=== Display Client ===");
    for line in hud.render() {
        info!("{}", line);
    }

    info!(
        "{} of {} challenges completed",
        state.store().completed_count(),
        state.registry().len()
    );

    Ok(())
}
