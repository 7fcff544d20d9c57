use colored::Colorize;
use topolab_cloud::CloudCtrl;

pub async fn sizes(ctrl: &CloudCtrl) -> anyhow::Result<()> {
    let sizes = ctrl.list_sizes().await?;

    if sizes.is_empty() {
        println!("{}", "No sizes offered".dimmed());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:<12} {:<32} {:>8} {:>8} {:>6}",
            "ID", "NAME", "RAM(MB)", "DISK(GB)", "VCPUS"
        )
        .bold()
    );
    println!("{}", "─".repeat(70).dimmed());
    for size in sizes {
        let vcpus = size
            .vcpus
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<32} {:>8} {:>8} {:>6}",
            size.id.cyan(),
            size.name,
            size.ram,
            size.disk,
            vcpus
        );
    }
    Ok(())
}

pub async fn images(ctrl: &CloudCtrl) -> anyhow::Result<()> {
    let images = ctrl.list_images().await?;

    if images.is_empty() {
        println!("{}", "No images offered".dimmed());
        return Ok(());
    }

    println!("{}", format!("{:<40} {}", "ID", "NAME").bold());
    println!("{}", "─".repeat(80).dimmed());
    for image in images {
        println!("{:<40} {}", image.id.cyan(), image.name);
    }
    Ok(())
}
