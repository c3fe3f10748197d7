//! `hospital-client` command: signs in against a hospital API, drives the
//! resource hooks and prints the results as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Report, Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use hospital_client::config::ClientSettings;
use hospital_client::domain::ports::HealthProbe;
use hospital_client::domain::{
    AppointmentScope, RecordId, RegistrationProfile, SessionManager, TokenStore,
};
use hospital_client::hooks::{
    AppointmentsHook, DashboardHook, Debouncer, FetchOutcome, PatientsHook,
};
use hospital_client::outbound::http::HospitalApiClient;
use hospital_client::outbound::storage::FileCredentialBackend;

/// `hospital-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hospital-client",
    about = "Sign in to a hospital records API and inspect its resources",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Query the unauthenticated health endpoint.
    Health,
    /// Sign in and persist the issued credential.
    Login {
        #[arg(long, value_name = "email")]
        email: String,
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Create an account and sign in with it.
    Register {
        #[arg(long, value_name = "name")]
        name: String,
        #[arg(long, value_name = "email")]
        email: String,
        #[arg(long, value_name = "password")]
        password: String,
        /// One of `patient`, `doctor`, `hospitalOwner`, `staff`.
        #[arg(long, value_name = "role")]
        role: String,
        #[arg(long = "hospital-id", value_name = "id")]
        hospital_id: Option<String>,
    },
    /// Forget the stored credential and notify the server.
    Logout,
    /// Show the signed-in user and the sections their role may open.
    Whoami,
    /// List patients, or search them by name.
    Patients {
        #[arg(long, value_name = "text")]
        query: Option<String>,
    },
    /// List appointments.
    Appointments {
        #[arg(long, conflicts_with = "doctor")]
        upcoming: bool,
        /// Only appointments of this doctor.
        #[arg(long, value_name = "id")]
        doctor: Option<String>,
    },
    /// Show dashboard figures.
    Dashboard {
        /// Also fetch appointment trends, department and workload analytics.
        #[arg(long)]
        insights: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("hospital-client")])
        .map_err(|err| eyre!("load client settings: {err}"))?;
    run(args.command, &settings).await
}

async fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    let token_dir = settings.token_dir()?;
    let backend = FileCredentialBackend::open(&token_dir)
        .wrap_err_with(|| format!("open credential directory {token_dir}"))?;
    let tokens = TokenStore::new(Arc::new(backend));
    let client = Arc::new(
        HospitalApiClient::new(settings.endpoints()?, tokens.clone())
            .wrap_err("build HTTP client")?,
    );

    if let Command::Health = command {
        let health = client.health().await?;
        return emit(&health);
    }

    let session = SessionManager::start(client.clone(), tokens).await;
    info!(status = ?session.status(), "session restored");

    match command {
        Command::Health => Ok(()),
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            emit(&user)
        }
        Command::Register {
            name,
            email,
            password,
            role,
            hospital_id,
        } => {
            let profile = RegistrationProfile::try_from_parts(
                &name,
                &email,
                &password,
                &role,
                hospital_id.as_deref(),
            )?;
            let user = session.register(&profile).await?;
            emit(&user)
        }
        Command::Logout => {
            session.logout().await;
            emit(&json!({ "status": "signed out" }))
        }
        Command::Whoami => {
            let user = session
                .current_user()
                .ok_or_else(|| eyre!("not signed in"))?;
            let sections: Vec<_> = session
                .sections()
                .iter()
                .map(|section| json!({ "path": section.path(), "label": section.label() }))
                .collect();
            emit(&json!({ "user": user, "sections": sections }))
        }
        Command::Patients { query } => {
            require_session(&session)?;
            let debouncer = Debouncer::new(settings.search_debounce());
            let hook = PatientsHook::with_query(client, debouncer, query.unwrap_or_default());
            settle(hook.mount().await)?;
            emit(&hook.records())
        }
        Command::Appointments { upcoming, doctor } => {
            require_session(&session)?;
            let scope = match (upcoming, doctor) {
                (_, Some(id)) => AppointmentScope::Doctor(RecordId::new(id)?),
                (true, None) => AppointmentScope::Upcoming,
                (false, None) => AppointmentScope::All,
            };
            let hook = AppointmentsHook::new(client, scope);
            settle(hook.mount().await)?;
            emit(&hook.appointments())
        }
        Command::Dashboard { insights } => {
            require_session(&session)?;
            let hook = DashboardHook::new(client);
            settle(hook.mount().await)?;
            let snapshot = hook.snapshot();
            if insights {
                let insights = hook.insights().await?;
                emit(&json!({ "snapshot": snapshot, "insights": insights }))
            } else {
                emit(&snapshot)
            }
        }
    }
}

fn require_session(session: &SessionManager) -> Result<()> {
    if session.is_authenticated() {
        Ok(())
    } else {
        Err(eyre!("not signed in; run `hospital-client login` first"))
    }
}

fn settle(outcome: FetchOutcome) -> Result<()> {
    match outcome {
        FetchOutcome::Applied => Ok(()),
        FetchOutcome::Failed(err) => Err(Report::new(err)),
        other => Err(eyre!("fetch did not complete: {other:?}")),
    }
}

fn emit(value: &impl Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).wrap_err("encode output")?;
    writeln!(stdout).wrap_err("write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use clap::CommandFactory;
    use hospital_client::domain::Role;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn role_help_lists_only_accepted_spellings() {
        let cli = CliArgs::command();
        let register = cli
            .find_subcommand("register")
            .expect("register subcommand");
        let help = register
            .get_arguments()
            .find(|arg| arg.get_id() == "role")
            .and_then(|arg| arg.get_help())
            .expect("role help")
            .to_string();

        let listed: Vec<&str> = help.split('`').skip(1).step_by(2).collect();
        assert_eq!(listed.len(), Role::ALL.len());
        for name in listed {
            assert!(Role::parse(name).is_some(), "help lists unknown role {name}");
        }
    }

    #[rstest]
    fn register_accepts_the_owner_spelling_from_help() {
        let args = CliArgs::try_parse_from([
            "hospital-client",
            "register",
            "--name",
            "Ann",
            "--email",
            "owner@example.org",
            "--password",
            "pw",
            "--role",
            "hospitalOwner",
        ])
        .expect("arguments parse");
        let Command::Register { role, .. } = args.command else {
            panic!("expected register");
        };
        let profile =
            RegistrationProfile::try_from_parts("Ann", "owner@example.org", "pw", &role, None);
        assert!(profile.is_ok());
    }
}
