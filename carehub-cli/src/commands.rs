//! Command handlers.
//!
//! Handlers write their output to any `Write` so they can be driven from
//! tests against a temporary data directory.

use crate::Commands;
use carehub_access::{
    AccessError, Authenticator, FileStore, IdentityDirectory, NavigationOutcome, Navigator,
    RouteAccess, RouteTable, SessionStore,
};
use carehub_core::CareHubConfig;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything a command needs, wired from the loaded configuration
pub(crate) struct CliContext {
    authenticator: Authenticator,
    navigator: Navigator,
    directory: Arc<IdentityDirectory>,
}

impl CliContext {
    pub(crate) fn from_config(config: &CareHubConfig) -> anyhow::Result<Self> {
        let data_dir = expand_home(&config.storage.data_dir);
        debug!("Using data directory {:?}", data_dir);

        let backend = Arc::new(FileStore::new(&data_dir)?);
        let store = Arc::new(SessionStore::open(backend, &config.storage.session_key));
        let directory = Arc::new(IdentityDirectory::from_config(&config.auth)?);

        Ok(Self {
            authenticator: Authenticator::new(store.clone(), directory.clone()),
            navigator: Navigator::new(store, RouteTable::standard()),
            directory,
        })
    }
}

pub(crate) async fn run<W: Write>(
    command: Commands,
    context: &CliContext,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { email, password } => handle_login(context, &email, &password, out).await,
        Commands::Logout => handle_logout(context, out),
        Commands::Whoami => handle_whoami(context, out),
        Commands::Menu => handle_menu(context, out),
        Commands::Open { path } => handle_open(context, &path, out),
        Commands::Routes => handle_routes(context, out),
        Commands::Accounts => handle_accounts(context, out),
        // Handled before the context is built
        Commands::Config { .. } => Ok(()),
    }
}

async fn handle_login<W: Write>(
    context: &CliContext,
    email: &str,
    password: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    info!("Signing in as {}", email);
    writeln!(out, "Signing in...")?;

    match context.authenticator.login(email, password).await {
        Ok(identity) => {
            writeln!(out, "Welcome, {}", identity.display_string())?;
            Ok(())
        }
        Err(e) if e.is_user_facing() => {
            writeln!(out, "{}", login_failure_message(&e))?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn login_failure_message(error: &AccessError) -> &'static str {
    match error {
        AccessError::InvalidCredentials => "Login failed: email or password is incorrect",
        AccessError::LoginAlreadyInProgress => "Login failed: another sign-in is still running",
        _ => "Login failed",
    }
}

fn handle_logout<W: Write>(context: &CliContext, out: &mut W) -> anyhow::Result<()> {
    match context.authenticator.current_identity() {
        Some(identity) => {
            context.authenticator.logout();
            writeln!(out, "Signed out {}", identity.display_name())?;
        }
        None => writeln!(out, "Not signed in")?,
    }
    Ok(())
}

fn handle_whoami<W: Write>(context: &CliContext, out: &mut W) -> anyhow::Result<()> {
    match context.authenticator.current_identity() {
        Some(identity) => {
            writeln!(out, "{}", identity.display_string())?;
            writeln!(out, "  email: {}", identity.email())?;
            writeln!(out, "  role:  {}", identity.role().label())?;
        }
        None => writeln!(out, "Not signed in")?,
    }
    Ok(())
}

fn handle_menu<W: Write>(context: &CliContext, out: &mut W) -> anyhow::Result<()> {
    let items = context.navigator.menu();
    if items.is_empty() {
        writeln!(out, "Not signed in; no menu available")?;
        return Ok(());
    }

    for item in items {
        writeln!(out, "{:<16} {}", item.title, item.path())?;
    }
    Ok(())
}

fn handle_open<W: Write>(context: &CliContext, path: &str, out: &mut W) -> anyhow::Result<()> {
    let outcome = context.navigator.navigate(path);
    writeln!(out, "{}", describe_outcome(&outcome))?;
    Ok(())
}

fn describe_outcome(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::Render(view) => format!("render {}", view),
        NavigationOutcome::Denied { route, role } => {
            format!("access denied: {} may not open {}", role, route)
        }
        NavigationOutcome::Redirect { to } => format!("redirect -> {}", to),
        NavigationOutcome::NotFound => "not found".to_string(),
    }
}

fn handle_routes<W: Write>(context: &CliContext, out: &mut W) -> anyhow::Result<()> {
    for descriptor in context.navigator.routes().iter() {
        writeln!(
            out,
            "{:<14} {}",
            descriptor.path,
            describe_access(&descriptor.access)
        )?;
    }
    Ok(())
}

fn describe_access(access: &RouteAccess) -> String {
    match access {
        RouteAccess::Roles(roles) => {
            let mut roles: Vec<_> = roles.iter().copied().collect();
            roles.sort();
            roles
                .iter()
                .map(|role| role.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }
        RouteAccess::AnyAuthenticated => "any signed-in user".to_string(),
        RouteAccess::PublicOnly => "signed-out users only".to_string(),
    }
}

fn handle_accounts<W: Write>(context: &CliContext, out: &mut W) -> anyhow::Result<()> {
    let accounts = context.directory.demo_accounts();
    if accounts.is_empty() {
        writeln!(out, "No accounts configured")?;
        return Ok(());
    }

    for account in accounts {
        writeln!(
            out,
            "{:<14} {:<28} password: {}",
            account.role_label, account.email, account.secret
        )?;
    }
    Ok(())
}

/// Expand a leading `~` to the user's home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
