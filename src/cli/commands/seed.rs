//! Seed command handler

use crate::config::Config;
use crate::db::Store;
use crate::services::BootstrapService;

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::from_config(&config.general, &config.security).await?;
    let report = BootstrapService::new(store, config.bootstrap.clone())
        .run()
        .await?;

    if report.is_noop() {
        println!("Nothing to do, roles and permissions are already seeded.");
        return Ok(());
    }

    if !report.roles_created.is_empty() {
        println!("Roles created: {}", report.roles_created.join(", "));
    }
    if !report.permissions_created.is_empty() {
        println!(
            "Permissions created: {}",
            report.permissions_created.join(", ")
        );
    }
    println!("Role/permission edges added: {}", report.edges_added);
    if report.admin_created {
        println!("Admin account created: {}", config.bootstrap.admin_email);
    }

    Ok(())
}
