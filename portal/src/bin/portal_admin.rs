//! Operator CLI for the enrollment portal backend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use portal::config::PortalSettings;
use portal::inbound::cli::{Cli, PortalApp, PortalPorts};
use portal::outbound::journal::FileSubmissionJournal;
use portal::outbound::rest::{
    HttpAttendanceGateway, HttpCertificateGateway, HttpCourseGateway, HttpEnrollmentGateway,
    HttpModuleGradeGateway, HttpNotificationGateway, HttpOfferingGateway, HttpPaymentGateway,
    HttpPersonGateway, HttpSupportContentGateway, HttpTeachingGateway, RestClient,
    RestClientConfig, Session,
};
use portal::outbound::storage::{HttpReceiptStorage, ReceiptStorageConfig};

const RELOGIN_HINT: &str =
    "La sesión expiró o no es válida: inicie sesión de nuevo y actualice PORTAL_BEARER_TOKEN";

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let cli = Cli::try_parse().map_err(io::Error::other)?;
    let settings = load_settings()?;
    let app = build_app(&settings)?;

    match app.run(&cli.command).await {
        Ok(output) => writeln!(io::stdout().lock(), "{output}"),
        Err(error) => {
            if error.is_unauthorized() {
                writeln!(io::stderr().lock(), "{RELOGIN_HINT}")?;
            }
            Err(io::Error::other(error.to_string()))
        }
    }
}

/// Settings from the environment and config files only; the command line
/// belongs to clap.
fn load_settings() -> io::Result<PortalSettings> {
    PortalSettings::load_from_iter([OsString::from("portal-admin")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))
}

fn build_app(settings: &PortalSettings) -> io::Result<PortalApp> {
    let api_base = settings
        .api_base_url()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let storage_base = settings
        .storage_url()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

    let session = settings
        .bearer_token()
        .map_or_else(Session::anonymous, Session::bearer);
    let config = RestClientConfig::new(api_base)
        .with_timeouts(settings.request_timeout(), settings.slow_request_timeout());
    let client = Arc::new(
        RestClient::new(config, session)
            .map_err(|error| io::Error::other(format!("create HTTP client: {error}")))?,
    );

    let storage_config = ReceiptStorageConfig::new(storage_base, settings.storage_bucket())
        .with_api_key(settings.storage_api_key())
        .with_timeout(settings.request_timeout());
    let storage = HttpReceiptStorage::new(storage_config)
        .map_err(|error| io::Error::other(format!("create storage client: {error}")))?;
    let journal = FileSubmissionJournal::open(settings.journal_dir())
        .map_err(|error| io::Error::other(error.to_string()))?;

    let ports = PortalPorts {
        persons: Arc::new(HttpPersonGateway::new(Arc::clone(&client))),
        courses: Arc::new(HttpCourseGateway::new(Arc::clone(&client))),
        offerings: Arc::new(HttpOfferingGateway::new(Arc::clone(&client))),
        enrollments: Arc::new(HttpEnrollmentGateway::new(Arc::clone(&client))),
        payments: Arc::new(HttpPaymentGateway::new(Arc::clone(&client))),
        grades: Arc::new(HttpModuleGradeGateway::new(Arc::clone(&client))),
        attendance: Arc::new(HttpAttendanceGateway::new(Arc::clone(&client))),
        teaching: Arc::new(HttpTeachingGateway::new(Arc::clone(&client))),
        contents: Arc::new(HttpSupportContentGateway::new(Arc::clone(&client))),
        certificates: Arc::new(HttpCertificateGateway::new(Arc::clone(&client))),
        notifications: Arc::new(HttpNotificationGateway::new(client)),
        storage: Arc::new(storage),
        journal: Arc::new(journal),
    };
    Ok(PortalApp::new(ports, Arc::new(DefaultClock)).with_payment_method(settings.payment_method()))
}

#[cfg(test)]
mod tests {
    //! Start-up wiring without a live backend.

    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    #[rstest]
    fn wiring_succeeds_from_environment_settings() {
        let journal = tempfile::tempdir().expect("temp dir");
        let _guard = lock_env([
            ("PORTAL_API_BASE_URL", Some("http://127.0.0.1:9".to_owned())),
            ("PORTAL_BEARER_TOKEN", None::<String>),
            ("PORTAL_STORAGE_URL", None),
            (
                "PORTAL_JOURNAL_DIR",
                Some(journal.path().to_string_lossy().into_owned()),
            ),
        ]);

        let settings = load_settings().expect("settings load");
        assert!(build_app(&settings).is_ok());
    }

    #[rstest]
    fn missing_base_url_is_an_input_error() {
        let _guard = lock_env([("PORTAL_API_BASE_URL", None::<String>)]);

        let settings = load_settings().expect("settings load");
        let error = build_app(&settings).err().expect("base url required");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
