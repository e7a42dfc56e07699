//! Line based stand-in for a chat front end. Session state lives for the
//! whole loop, so `next`, `prev` and bare numbers work across lines.

use eyre::Result;
use novelscout_engine::Dispatcher;
use novelscout_types::SearchType;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_replies;

const HELP: &str = "💡 Commands: /ys <args>, /hs <args>, /random, /quit";

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Search(SearchType, &'a str),
    Random,
    Quit,
    Unknown,
    Blank,
}

fn parse_line(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    let line = line.strip_prefix('/').unwrap_or(line);
    let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match name.to_lowercase().as_str() {
        "random" => Line::Random,
        "quit" | "exit" => Line::Quit,
        other => match other.parse::<SearchType>() {
            Ok(search_type) => Line::Search(search_type, args.trim()),
            Err(_) => Line::Unknown,
        },
    }
}

pub async fn handle_chat_command(
    dispatcher: &Dispatcher,
    user: &str,
    cover_dir: Option<&str>,
) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Line::Search(search_type, args) => {
                let replies = dispatcher.handle(user, search_type, args).await;
                print_replies(&replies, cover_dir).await?;
            }
            Line::Random => {
                let replies = dispatcher.random().await;
                print_replies(&replies, cover_dir).await?;
            }
            Line::Quit => break,
            Line::Unknown => println!("{HELP}"),
            Line::Blank => {}
        }
    }

    tracing::debug!("Chat session for {user} ended");
    Ok(())
}
