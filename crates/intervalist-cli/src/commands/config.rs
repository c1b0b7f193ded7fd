use std::error::Error;

use clap::Subcommand;
use intervalist_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// Print the whole configuration as TOML
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load_or_default();
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
