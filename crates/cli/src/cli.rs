#[derive(clap::Parser, Debug)]
#[clap(name = "novelscout", version, about = "Search youshu and uaa for novels")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Search youshu: `<title> [<number> | -<page>]`, `next`, `prev` or a bare number
    Ys {
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        /// Session key the search is remembered under
        #[clap(long, default_value = "local")]
        user: String,
    },
    /// Search uaa, same arguments as `ys`
    Hs {
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
        #[clap(long, default_value = "local")]
        user: String,
    },
    /// Show a random youshu book
    Random,
    /// Read chat commands (`/ys ...`, `/hs ...`, `/random`) from stdin
    Chat {
        #[clap(long, default_value = "local")]
        user: String,
    },
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value, e.g. `youshu.base_url`
    Set { key: String, value: String },
    /// Get a configuration value
    Get { key: String },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}
