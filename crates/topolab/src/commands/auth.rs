use colored::Colorize;
use topolab_cloud::CloudCtrl;

pub async fn handle(ctrl: &CloudCtrl) -> anyhow::Result<()> {
    println!(
        "Authenticating {} with {}...",
        ctrl.credential().username().cyan(),
        ctrl.provider_name()
    );

    if ctrl.authenticate().await? {
        println!("{}", "✓ Credentials accepted".green());
        Ok(())
    } else {
        anyhow::bail!("credentials rejected by {}", ctrl.provider_name())
    }
}
