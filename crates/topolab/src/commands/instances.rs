use crate::InstanceCommands;
use colored::Colorize;
use topolab_cloud::{CloudCtrl, Instance, InstanceState};
use topolab_config::CloudSettings;

pub async fn handle(
    ctrl: &CloudCtrl,
    settings: &CloudSettings,
    cmd: InstanceCommands,
) -> anyhow::Result<()> {
    match cmd {
        InstanceCommands::List => list(ctrl).await,
        InstanceCommands::Get { id } => {
            let instance = ctrl.get_instance(&Instance::new(id, "")).await?;
            print_instance(&instance);
            Ok(())
        }
        InstanceCommands::Create {
            name,
            size,
            image,
            keypair,
        } => create(ctrl, settings, name, size, image, keypair).await,
        InstanceCommands::Delete { id } => {
            let instance = ctrl.get_instance(&Instance::new(id, "")).await?;
            if ctrl.delete_instance(&instance).await? {
                println!("✓ Deleted {} ({})", instance.name.cyan(), instance.id);
                Ok(())
            } else {
                anyhow::bail!("{} refused to delete {}", ctrl.provider_name(), instance.id)
            }
        }
    }
}

async fn list(ctrl: &CloudCtrl) -> anyhow::Result<()> {
    let instances = ctrl.list_instances().await?;

    if instances.is_empty() {
        println!("{}", "No instances".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!("{:<38} {:<24} {:<12} {}", "ID", "NAME", "STATE", "PUBLIC IP").bold()
    );
    println!("{}", "─".repeat(92).dimmed());
    for instance in instances {
        println!(
            "{:<38} {:<24} {:<12} {}",
            instance.id,
            instance.name.cyan(),
            colored_state(instance.state),
            instance.public_ip().unwrap_or("-")
        );
    }
    Ok(())
}

async fn create(
    ctrl: &CloudCtrl,
    settings: &CloudSettings,
    name: String,
    size: Option<String>,
    image: Option<String>,
    keypair: Option<String>,
) -> anyhow::Result<()> {
    let size_id = size.unwrap_or_else(|| settings.new_instance_flavor.clone());
    let image_id = image.unwrap_or_else(|| settings.default_image.clone());
    if size_id.is_empty() {
        anyhow::bail!("no size given; pass --size or set new_instance_flavor");
    }
    if image_id.is_empty() {
        anyhow::bail!("no image given; pass --image or set default_image");
    }

    let key_pair = match keypair {
        Some(key_name) => {
            let found = ctrl
                .list_key_pairs()
                .await?
                .into_iter()
                .find(|k| k.name == key_name);
            Some(found.ok_or_else(|| anyhow::anyhow!("key pair '{}' not found", key_name))?)
        }
        None => None,
    };

    println!("Creating {} (size {}, image {})...", name.cyan(), size_id, image_id);
    let instance = ctrl
        .create_instance(&name, &size_id, &image_id, key_pair.as_ref())
        .await?;

    println!("{}", "✓ Instance created".green());
    print_instance(&instance);
    Ok(())
}

fn print_instance(instance: &Instance) {
    println!("{:<10} {}", "id".bold(), instance.id);
    println!("{:<10} {}", "name".bold(), instance.name.cyan());
    println!("{:<10} {}", "state".bold(), colored_state(instance.state));
    println!(
        "{:<10} {}",
        "size".bold(),
        instance.size_id.as_deref().unwrap_or("-")
    );
    println!(
        "{:<10} {}",
        "image".bold(),
        instance.image_id.as_deref().unwrap_or("-")
    );
    println!(
        "{:<10} {}",
        "public".bold(),
        join_or_dash(&instance.public_ips)
    );
    println!(
        "{:<10} {}",
        "private".bold(),
        join_or_dash(&instance.private_ips)
    );
}

fn colored_state(state: InstanceState) -> colored::ColoredString {
    let text = state.to_string();
    match state {
        InstanceState::Running => text.green(),
        InstanceState::Pending | InstanceState::Rebooting => text.yellow(),
        InstanceState::Stopped | InstanceState::Terminated => text.red(),
        InstanceState::Unknown => text.dimmed(),
    }
}

fn join_or_dash(ips: &[String]) -> String {
    if ips.is_empty() {
        "-".to_string()
    } else {
        ips.join(", ")
    }
}
