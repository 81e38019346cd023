//! Application wiring: backend, stores, and the session listener.

use learnhub_backend::{FileSessionStore, SupabaseBackend, UserProfile};
use learnhub_catalog::CourseDirectory;
use learnhub_core::{Config, Notifier, Paths};
use learnhub_enrollment::{CurrentUserSource, EnrollmentLedger};
use learnhub_identity::{IdentitySynchronizer, ListenerGuard};
use std::sync::Arc;
use std::time::Duration;

/// How long a command waits for identity resolution to settle.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll interval while waiting for resolution.
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Adapter exposing the identity snapshot to the enrollment ledger.
struct IdentityUserSource(Arc<IdentitySynchronizer<SupabaseBackend>>);

impl CurrentUserSource for IdentityUserSource {
    fn current_profile(&self) -> Option<UserProfile> {
        self.0.snapshot().profile
    }
}

/// One process-wide wiring of the stores over a shared backend.
pub struct App {
    pub identity: Arc<IdentitySynchronizer<SupabaseBackend>>,
    pub directory: CourseDirectory<SupabaseBackend>,
    pub ledger: EnrollmentLedger<SupabaseBackend>,
    pub notifier: Notifier,
    /// Keeps the session-change subscription alive for the app's lifetime.
    _listener: ListenerGuard,
}

impl App {
    /// Construct the backend and stores, spawn the session listener, and
    /// perform the first identity resolution.
    pub async fn bootstrap(config: &Config, paths: &Paths) -> anyhow::Result<Self> {
        let store = FileSessionStore::new(paths.session_file());
        let backend = Arc::new(SupabaseBackend::new(
            &config.supabase_url,
            &config.supabase_publishable_key,
            Box::new(store),
        ));

        let notifier = Notifier::new();
        let identity = Arc::new(IdentitySynchronizer::new(
            backend.clone(),
            notifier.clone(),
        ));
        // First resolution before subscribing, so a refresh emitted during
        // startup is not double-handled.
        identity.initialize().await?;
        let rx = identity.subscribe_session_changes();
        let listener = ListenerGuard::new(tokio::spawn(
            identity.clone().run_session_listener(rx),
        ));

        let user_source: Arc<dyn CurrentUserSource> =
            Arc::new(IdentityUserSource(identity.clone()));

        Ok(Self {
            directory: CourseDirectory::new(backend.clone(), notifier.clone()),
            ledger: EnrollmentLedger::new(backend, user_source, notifier.clone()),
            identity,
            notifier,
            _listener: listener,
        })
    }

    /// Wait until the identity phase is no longer transient, so a command
    /// observes the outcome of the notification cycle it triggered.
    pub async fn wait_for_settle(&self) {
        let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
        while self.identity.phase().is_transient() {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!("Identity resolution did not settle in time");
                return;
            }
            tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
        }
    }
}
