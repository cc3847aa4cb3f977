use tracing::{info, warn};

use teamchat::feed::{day_label, format_time, group_by_day, shows_avatar};
use teamchat::{ChatConfig, ChatError, Session};

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    tracing_subscriber::fmt::init();

    let config = ChatConfig::from_env();
    info!(
        send_latency_ms = config.send_latency.as_millis(),
        reply_probability = config.reply_probability,
        search_debounce_ms = config.search_debounce.as_millis(),
        seed = ?config.rng_seed,
        "teamchat config loaded"
    );

    let handle = teamchat::spawn(Session::seeded(config)?);

    handle.select_channel("general").await?;
    handle.send("Hello from the terminal 👋").await?;
    let view = handle.snapshot().await?;
    if let Some(first) = view.messages.first() {
        handle.toggle_reaction(first.id.clone(), "👍").await?;
    }
    handle.search("team").await?;

    // Long enough for delivery, a possible auto-reply, and the search scan.
    tokio::time::sleep(config.send_latency + config.reply_max_delay + config.search_debounce).await;

    let view = handle.snapshot().await?;
    let today = chrono::Utc::now().date_naive();
    for group in group_by_day(&view.messages) {
        info!(label = %day_label(group.day, today), "day");
        let mut previous = None;
        for message in &group.messages {
            if shows_avatar(previous, message) {
                info!(author_id = %message.author_id, time = %format_time(message.timestamp), "block");
            }
            info!(id = %message.id, reactions = message.reactions().len(), "  {}", message.content);
            previous = Some(message);
        }
    }
    for result in &view.search_results {
        info!(title = %result.title, subtitle = %result.subtitle, "search hit");
    }

    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("{json}"),
        Err(e) => warn!(error = %e, "snapshot encode failed"),
    }
    Ok(())
}
