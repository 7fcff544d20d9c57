use crate::KeyPairCommands;
use colored::Colorize;
use topolab_cloud::{CloudCtrl, KeyPair};

pub async fn handle(ctrl: &CloudCtrl, cmd: KeyPairCommands) -> anyhow::Result<()> {
    match cmd {
        KeyPairCommands::List => {
            let key_pairs = ctrl.list_key_pairs().await?;
            if key_pairs.is_empty() {
                println!("{}", "No key pairs".dimmed());
                return Ok(());
            }
            println!("{}", format!("{:<24} {}", "NAME", "FINGERPRINT").bold());
            println!("{}", "─".repeat(72).dimmed());
            for key_pair in key_pairs {
                println!(
                    "{:<24} {}",
                    key_pair.name.cyan(),
                    key_pair.fingerprint.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        KeyPairCommands::Create { name } => {
            let key_pair = ctrl.create_key_pair(&name).await?;
            eprintln!("{}", format!("✓ Created key pair {}", key_pair.name).green());
            match key_pair.private_key {
                Some(private_key) => {
                    eprintln!(
                        "{}",
                        "Save the private key now; it cannot be fetched again.".yellow()
                    );
                    println!("{}", private_key);
                }
                None => println!("{}", key_pair.public_key),
            }
            Ok(())
        }
        KeyPairCommands::Delete { name } => {
            let key_pair = KeyPair {
                name,
                public_key: String::new(),
                fingerprint: None,
                private_key: None,
            };
            if ctrl.delete_key_pair(&key_pair).await? {
                println!("✓ Deleted key pair {}", key_pair.name.cyan());
                Ok(())
            } else {
                anyhow::bail!(
                    "{} refused to delete key pair {}",
                    ctrl.provider_name(),
                    key_pair.name
                )
            }
        }
    }
}
