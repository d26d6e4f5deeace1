use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use techvault::config::cli::{Command, ResourceKind};
use techvault::utils::error::ErrorSeverity;
use techvault::utils::{logger, validation::Validate};
use techvault::{
    ApiClient, CliConfig, FileSelectionStore, OrganizationApi, OrganizationViews, SessionScope,
    TechVaultError,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let settings = match cli.validate().and_then(|_| cli.resolve_settings()) {
        Ok(settings) => settings,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            exit_with(&e);
        }
    };

    logger::init_cli_logger_with_level(cli.verbose, settings.log_level.as_deref());
    tracing::debug!("Resolved settings: {:?}", settings);

    if let Err(e) = settings.validate() {
        exit_with(&e);
    }

    let client = Arc::new(ApiClient::from_config(&settings).context("building API client")?);
    let store = Arc::new(FileSelectionStore::new(&settings.store_path));
    let directory = Arc::new(OrganizationApi::new(Arc::clone(&client)));

    let scope = SessionScope::mount(directory, store).await;
    let views = OrganizationViews::new(client);

    if let Err(e) = run(&cli.command, &scope, &views).await {
        exit_with(&e);
    }

    Ok(())
}

async fn run(command: &Command, scope: &SessionScope, views: &OrganizationViews) -> techvault::Result<()> {
    let ctx = scope.context()?;

    match command {
        Command::Orgs => {
            ctx.ensure_loaded()?;
            let selected_id = ctx.selected_org().map(|org| org.id);
            let organizations = ctx.organizations();
            if organizations.is_empty() {
                println!("No organizations available");
            }
            for org in organizations {
                let marker = if selected_id.as_deref() == Some(org.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let status = if org.is_active { "" } else { " (inactive)" };
                println!("{} {:<38} {}{}", marker, org.id, org.name, status);
            }
        }
        Command::Select { id } => {
            ctx.ensure_loaded()?;
            let org = ctx.select_by_id(id)?;
            println!("Selected organization: {} ({})", org.name, org.id);
        }
        Command::Clear => {
            ctx.set_selected_org(None);
            println!("Organization selection cleared");
        }
        Command::Current => {
            ctx.ensure_loaded()?;
            match ctx.selected_org() {
                Some(org) => {
                    println!("{} ({})", org.name, org.id);
                    for (label, value) in [
                        ("Email", &org.email),
                        ("Phone", &org.phone),
                        ("Website", &org.website),
                        ("City", &org.city),
                        ("Country", &org.country),
                    ] {
                        if !value.is_empty() {
                            println!("  {:<8} {}", label, value);
                        }
                    }
                }
                None => println!("No organization selected"),
            }
        }
        Command::Stats => {
            ctx.ensure_loaded()?;
            match views.stats(scope).await? {
                Some(stats) => {
                    println!("{}", stats.organization);
                    println!("  Locations       {}", stats.locations_count);
                    println!("  Contacts        {}", stats.contacts_count);
                    println!("  Documentation   {}", stats.documentations_count);
                    println!("  Passwords       {}", stats.password_entries_count);
                    println!("  Configurations  {}", stats.configurations_count);
                }
                None => print_select_hint(),
            }
        }
        Command::List { resource } => {
            ctx.ensure_loaded()?;
            list(*resource, scope, views).await?
        }
    }

    Ok(())
}

async fn list(resource: ResourceKind, scope: &SessionScope, views: &OrganizationViews) -> techvault::Result<()> {
    let lines: Option<Vec<String>> = match resource {
        ResourceKind::Locations => views.locations(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|l| format!("{:<38} {} ({}, {})", l.id, l.name, l.city, l.country))
                .collect()
        }),
        ResourceKind::Contacts => views.contacts(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|c| format!("{:<38} {} <{}> {}", c.id, c.display_name(), c.email, c.title))
                .collect()
        }),
        ResourceKind::Documentations => views.documentations(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|d| {
                    let state = if d.is_published { "published" } else { "draft" };
                    format!("{:<38} {} [{:?}, v{}, {}]", d.id, d.title, d.category, d.version, state)
                })
                .collect()
        }),
        // 列表中不顯示密碼本身
        ResourceKind::Passwords => views.passwords(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|p| format!("{:<38} {} ({}) [{:?}]", p.id, p.name, p.username, p.category))
                .collect()
        }),
        ResourceKind::Configurations => views.configurations(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|c| format!("{:<38} {} [{:?}] {}", c.id, c.name, c.config_type, c.version))
                .collect()
        }),
        ResourceKind::NetworkDevices => views.network_devices(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|d| {
                    let uplink = d.uplink().map(|u| format!(" via {}", u)).unwrap_or_default();
                    let ip = d.ip_address.as_deref().unwrap_or("-");
                    format!("{:<38} {} [{}] {}{}", d.id, d.name, d.device_type, ip, uplink)
                })
                .collect()
        }),
        ResourceKind::EndpointUsers => views.endpoint_users(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|u| {
                    let user = u.assigned_to_name.as_deref().unwrap_or("unassigned");
                    let os = u.operating_system.as_deref().unwrap_or("-");
                    format!("{:<38} {} [{}] {} ({})", u.id, u.name, u.device_type, user, os)
                })
                .collect()
        }),
        ResourceKind::Servers => views.servers(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|s| {
                    let role = s.role.as_deref().unwrap_or("-");
                    let ip = s.ip_address.as_deref().unwrap_or("-");
                    format!("{:<38} {} [{}] {} {}", s.id, s.name, s.server_type, role, ip)
                })
                .collect()
        }),
        ResourceKind::Peripherals => views.peripherals(scope).await?.map(|items| {
            items
                .into_iter()
                .map(|p| {
                    let make = [p.manufacturer.as_deref(), p.model.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    format!("{:<38} {} [{}] {}", p.id, p.name, p.device_type, make)
                })
                .collect()
        }),
    };

    match lines {
        Some(lines) if lines.is_empty() => println!("No records found"),
        Some(lines) => lines.iter().for_each(|line| println!("{}", line)),
        None => print_select_hint(),
    }
    Ok(())
}

fn print_select_hint() {
    println!("Please select an organization first: techvault select <id>");
}

fn exit_with(e: &TechVaultError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
