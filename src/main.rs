mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intake_client::HttpBackend;
use intake_core::classifier::{self, Classification};
use intake_core::constants::{
    ENV_API_BASE_URL, ENV_EVENT_RETRY_ATTEMPTS, ENV_EVENT_RETRY_DELAY_MS,
    ENV_REQUEST_TIMEOUT_SECS, ENV_SESSION_COOKIE,
};
use intake_core::patient::GlucoseType;
use intake_core::{
    config, ClientConfig, ConsentSignature, EventSession, HealthSummary, IntakeError,
    PatientDirectory, RegistrationDraft, RegistrationForm, RegistrationWorkflow, ReferralForm,
    ReferralWorkflow, RequestScope,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Nurse intake client for corporate wellness events")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the event currently assigned to you
    Event,
    /// Patients registered at your event
    Patients {
        #[command(subcommand)]
        command: PatientCommands,
    },
    /// Referrals to external practitioners
    Referrals {
        #[command(subcommand)]
        command: ReferralCommands,
    },
    /// Health summary for your event
    Report,
    /// Classify a single reading (offline)
    Classify {
        #[command(subcommand)]
        metric: ClassifyCommands,
    },
}

#[derive(Subcommand)]
enum PatientCommands {
    /// List patients, twenty per page
    List {
        /// Filter on name, surname, ID number or email
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show one patient's full record
    Show {
        id_number: String,
    },
    /// Register a patient from a YAML draft
    Register {
        /// YAML file with personalInfo, medicalAidDetails, medicalInfo and
        /// mentalHealthAssessment sections
        draft: PathBuf,
        /// Consent signature image (PNG or JPEG)
        #[arg(long)]
        signature: PathBuf,
    },
}

#[derive(Subcommand)]
enum ReferralCommands {
    /// List referrals made at your event
    List,
    /// Refer a registered patient to a practitioner
    Create {
        /// Patient ID number
        id_number: String,
        /// Practitioner name
        #[arg(long)]
        name: String,
        /// Practitioner email
        #[arg(long)]
        email: String,
        #[arg(long)]
        comments: String,
    },
}

#[derive(Subcommand)]
enum ClassifyCommands {
    /// BMI from a value, or from height (cm) and weight (kg)
    Bmi {
        #[arg(long)]
        bmi: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Blood pressure as "systolic/diastolic"
    BloodPressure { value: String },
    /// Glucose in mmol/L
    Glucose {
        /// Fasting, Random or Postprandial
        #[arg(long = "type")]
        kind: String,
        value: f64,
    },
    /// HbA1c in percent
    Hba1c { value: f64 },
}

/// One directive per crate that emits events; `RUST_LOG` can still raise or lower them.
const DEFAULT_LOG_DIRECTIVES: [&str; 3] =
    ["intake=info", "intake_core=info", "intake_client=info"];

/// Entry point for the intake CLI.
///
/// # Environment Variables
/// - `INTAKE_API_BASE_URL`: booking API base URL (default: "http://localhost:5000")
/// - `INTAKE_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 30)
/// - `INTAKE_SESSION_COOKIE`: raw `Cookie` header for the nurse's session
/// - `INTAKE_EVENT_RETRY_ATTEMPTS` / `INTAKE_EVENT_RETRY_DELAY_MS`: login-race retry policy
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    if let Commands::Classify { metric } = &cli.command {
        return classify(&mut stdout, metric);
    }

    let config = Arc::new(config_from_env()?);
    tracing::info!(api = config.api_base_url(), "++ Starting intake client");

    let backend = Arc::new(HttpBackend::new(config.clone()).map_err(nurse_facing)?);
    let scope = RequestScope::new();
    let teardown = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling outstanding requests");
            teardown.cancel();
        }
    });

    let session = EventSession::mount(backend.clone(), scope.clone()).await;
    let event = session
        .load_with_retry(config.event_retry())
        .await
        .map_err(nurse_facing)?;
    let event_id = event
        .event_id()
        .ok_or_else(|| nurse_facing(IntakeError::NoActiveEvent))?;

    match cli.command {
        Commands::Event => render::event(&mut stdout, &event)?,
        Commands::Patients { command } => {
            let mut directory = PatientDirectory::new();
            if !matches!(command, PatientCommands::Register { .. }) {
                directory
                    .ensure_loaded(&backend, &scope, &event_id)
                    .await
                    .map_err(nurse_facing)?;
            }

            match command {
                PatientCommands::List { search, page } => {
                    if let Some(search) = search {
                        directory.set_query(search);
                    }
                    directory.go_to_page(page);
                    render::patient_page(&mut stdout, &directory)?;
                }
                PatientCommands::Show { id_number } => {
                    let patient = directory
                        .find_by_id_number(&id_number)
                        .with_context(|| {
                            format!("No patient with ID number {id_number} at this event")
                        })?;
                    render::patient_detail(&mut stdout, patient)?;
                }
                PatientCommands::Register { draft, signature } => {
                    let mut form = RegistrationForm::from_draft(load_draft(&draft)?);
                    form.set_signature(
                        ConsentSignature::from_file(&signature).map_err(nurse_facing)?,
                    );
                    form.advance_to_submit()
                        .map_err(|e| nurse_facing(IntakeError::from(e)))?;

                    let workflow = RegistrationWorkflow::new(backend.clone(), scope.clone());
                    let created = workflow
                        .submit(&mut form, Some(&event_id), &mut directory)
                        .await
                        .map_err(nurse_facing)?;
                    writeln!(
                        stdout,
                        "Registered {}. {} patients now registered at {}.",
                        created.personal_info.display_name(),
                        directory.patients().len(),
                        event.event_name
                    )?;
                }
            }
        }
        Commands::Referrals { command } => {
            let workflow = ReferralWorkflow::new(backend.clone(), scope.clone());
            match command {
                ReferralCommands::List => {
                    let referrals = workflow.list(&event_id).await.map_err(nurse_facing)?;
                    render::referrals(&mut stdout, &referrals)?;
                }
                ReferralCommands::Create {
                    id_number,
                    name,
                    email,
                    comments,
                } => {
                    let mut directory = PatientDirectory::new();
                    directory
                        .load(&backend, &scope, &event_id)
                        .await
                        .map_err(nurse_facing)?;
                    let patient = directory
                        .find_by_id_number(&id_number)
                        .with_context(|| {
                            format!("No patient with ID number {id_number} at this event")
                        })?;

                    let mut form = ReferralForm::for_patient(patient);
                    form.practitioner_name = name;
                    form.practitioner_email = email;
                    form.comments = comments;

                    let referral = workflow
                        .submit(&mut form, Some(&event_id))
                        .await
                        .map_err(nurse_facing)?;
                    writeln!(
                        stdout,
                        "Referred {} to {}.",
                        patient.personal_info.display_name(),
                        referral.practitioner_name
                    )?;
                }
            }
        }
        Commands::Report => {
            let mut directory = PatientDirectory::new();
            directory
                .load(&backend, &scope, &event_id)
                .await
                .map_err(nurse_facing)?;
            render::summary(
                &mut stdout,
                &HealthSummary::from_patients(directory.patients()),
            )?;
        }
        Commands::Classify { .. } => {}
    }

    Ok(())
}

/// Resolve client configuration from the process environment, once.
fn config_from_env() -> anyhow::Result<ClientConfig> {
    let var = |name: &str| std::env::var(name).ok();

    let config = ClientConfig::new(
        config::api_base_url_from_env_value(var(ENV_API_BASE_URL)),
        config::request_timeout_from_env_value(var(ENV_REQUEST_TIMEOUT_SECS))?,
        var(ENV_SESSION_COOKIE),
        config::event_retry_from_env_values(
            var(ENV_EVENT_RETRY_ATTEMPTS),
            var(ENV_EVENT_RETRY_DELAY_MS),
        )?,
    )?;
    Ok(config)
}

fn load_draft(path: &Path) -> anyhow::Result<RegistrationDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse draft {}", path.display()))
}

/// Reduces an intake error to the message a nurse should see.
fn nurse_facing(err: IntakeError) -> anyhow::Error {
    tracing::debug!(error = ?err, "request failed");
    anyhow::anyhow!(err.user_message())
}

fn classify(out: &mut impl Write, metric: &ClassifyCommands) -> anyhow::Result<()> {
    fn line<C: Classification>(out: &mut impl Write, value: &str, class: C) -> std::io::Result<()> {
        writeln!(out, "{value}: {} [{}]", class.label(), class.color())
    }

    match metric {
        ClassifyCommands::Bmi {
            bmi,
            height,
            weight,
        } => {
            let bmi = bmi.or_else(|| classifier::calculate_bmi(*height, *weight));
            let shown = bmi.map_or_else(|| "BMI -".to_string(), |b| format!("BMI {b:.1}"));
            line(out, &shown, classifier::classify_bmi(bmi))?;
        }
        ClassifyCommands::BloodPressure { value } => {
            line(out, value, classifier::classify_blood_pressure(value))?;
        }
        ClassifyCommands::Glucose { kind, value } => {
            let kind = kind
                .parse::<GlucoseType>()
                .map_err(anyhow::Error::msg)?;
            line(
                out,
                &format!("{value} mmol/L ({})", kind.as_str()),
                classifier::classify_glucose(Some(kind), Some(*value)),
            )?;
        }
        ClassifyCommands::Hba1c { value } => {
            line(
                out,
                &format!("HbA1c {value}%"),
                classifier::classify_hba1c(Some(*value)),
            )?;
        }
    }
    Ok(())
}
