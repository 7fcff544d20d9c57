use crate::ConfigCommands;
use colored::Colorize;
use topolab_config::CloudSettings;

pub fn handle(settings: &CloudSettings, cmd: ConfigCommands) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Path => {
            println!("{}", topolab_config::settings_path()?.display());
        }
        ConfigCommands::Show => {
            let mut shown = settings.clone();
            shown.cloud_api_key = mask(&shown.cloud_api_key);
            println!("{}", serde_json::to_string_pretty(&shown)?);
            if let Err(e) = settings.provider() {
                eprintln!("{} {}", "warning:".yellow(), e);
            }
        }
    }
    Ok(())
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
