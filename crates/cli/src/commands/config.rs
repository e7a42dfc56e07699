use std::io::{self, BufRead, Write};
use std::path::Path;

use eyre::{Result, WrapErr};

use crate::cli::ConfigCommands;
use crate::config::Config;

pub async fn handle_config_command(cmd: ConfigCommands) -> Result<()> {
    let path = Config::get_config_path();

    if let ConfigCommands::Reset { force: false } = cmd {
        let confirmed = confirm(
            &format!("Overwrite {} with the defaults?", path.display()),
            &mut io::stdin().lock(),
            &mut io::stdout(),
        )?;
        if !confirmed {
            println!("Reset cancelled, nothing was written");
            return Ok(());
        }
    }

    let message = apply(cmd, &path).await?;
    println!("{message}");
    Ok(())
}

/// Runs a config subcommand against the file at `path` and returns the line
/// to print.
async fn apply(cmd: ConfigCommands, path: &Path) -> Result<String> {
    match cmd {
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_from(path).await?;
            let before = config.get_value(&key)?;
            config
                .set_value(&key, &value)
                .wrap_err_with(|| format!("Cannot set {key}"))?;
            config.save_to(path).await?;

            let after = config.get_value(&key)?;
            tracing::info!("Config key {key} updated");
            Ok(format!(
                "{key}: {} -> {}",
                shown(&key, &before),
                shown(&key, &after)
            ))
        }
        ConfigCommands::Get { key } => {
            let config = Config::load_from(path).await?;
            let value = config.get_value(&key)?;
            Ok(format!("{key} = {}", shown(&key, &value)))
        }
        ConfigCommands::Show => {
            let config = Config::load_from(path).await?;
            Ok(format!("{}\n\nLoaded from {}", config.show_all(), path.display()))
        }
        ConfigCommands::Reset { .. } => {
            Config::default().save_to(path).await?;
            Ok(format!("Defaults written to {}", path.display()))
        }
    }
}

/// The cookie is a credential and never echoed back.
fn shown(key: &str, value: &str) -> String {
    match (key, value.is_empty()) {
        (_, true) => "(not set)".to_string(),
        ("youshu.cookie", false) => "(set)".to_string(),
        (_, false) => value.to_string(),
    }
}

fn confirm(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
