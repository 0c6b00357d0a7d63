//! List persons command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_persons(config: &Config) -> anyhow::Result<()> {
    let store = Store::from_config(&config.general, &config.security).await?;
    let persons = store.list_persons().await?;

    if persons.is_empty() {
        println!("No persons registered.");
        println!();
        println!("Seed the admin account with: warden seed");
        return Ok(());
    }

    println!("Persons ({} total)", persons.len());
    println!("{:-<70}", "");

    for details in persons {
        let person = &details.person;
        let roles = details.role_names();
        let roles = if roles.is_empty() {
            "-".to_string()
        } else {
            roles.join(", ")
        };
        let category = details
            .category
            .as_ref()
            .map_or("-", |c| c.name.as_str());

        println!(
            "{:>4}  {} {} <{}>",
            person.id, person.first_name, person.last_name, person.email
        );
        println!("      Roles: {roles} | Category: {category}");
    }

    Ok(())
}
