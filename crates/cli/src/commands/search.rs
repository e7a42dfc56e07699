use eyre::Result;
use novelscout_engine::Dispatcher;
use novelscout_types::SearchType;

use super::print_replies;

pub async fn handle_search_command(
    dispatcher: &Dispatcher,
    search_type: SearchType,
    user: &str,
    args: &[String],
    cover_dir: Option<&str>,
) -> Result<()> {
    let replies = dispatcher.handle(user, search_type, &args.join(" ")).await;
    print_replies(&replies, cover_dir).await
}

pub async fn handle_random_command(dispatcher: &Dispatcher, cover_dir: Option<&str>) -> Result<()> {
    println!("🎲 Picking a random book...");
    let replies = dispatcher.random().await;
    print_replies(&replies, cover_dir).await
}
