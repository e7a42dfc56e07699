pub mod chat;
pub mod config;
pub mod search;

pub use chat::handle_chat_command;
pub use config::handle_config_command;
pub use search::{handle_random_command, handle_search_command};

use std::path::PathBuf;

use eyre::Result;
use novelscout_engine::{Cover, Reply};
use tokio::fs;

/// Prints replies in order, saving loaded covers when a cover directory is
/// configured.
pub async fn print_replies(replies: &[Reply], cover_dir: Option<&str>) -> Result<()> {
    for reply in replies {
        if let (
            Reply::Details {
                book,
                cover: Cover::Loaded(bytes),
            },
            Some(dir),
        ) = (reply, cover_dir)
        {
            let path = PathBuf::from(dir).join(format!("{}.jpg", book.id));
            fs::create_dir_all(dir).await?;
            fs::write(&path, bytes).await?;
            println!("🖼️ Cover saved to {}", path.display());
        }
        println!("{}\n", reply.text());
    }
    Ok(())
}
