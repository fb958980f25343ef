/// First-time account setup
///
/// When a freshly signed-up account shows up, the orchestrator gives it a
/// starter list so the user does not land in an empty app: one list, the
/// template's categories, and the template's items, all named in the account's
/// language. The account's `initial_setup_completed` flag is then turned on so
/// the run never repeats.
///
/// # Flow
///
/// ```text
/// run(account)
///   ├─> flag already set?               -> AlreadyCompleted
///   ├─> run for this account in flight?  -> InProgress
///   ├─> account already owns lists?      -> mark completed -> Healed
///   ├─> resolve language (sign-up, display, English)
///   ├─> create list                      (failure ends the run)
///   ├─> create categories one by one     (failures skipped)
///   ├─> insert items in chunks           (failed chunks skipped)
///   ├─> strict policy and gaps?          -> delete list + categories -> RolledBack
///   └─> mark completed                   -> Completed
/// ```
///
/// # Concurrency
///
/// A run holds a per-account entry in a process-wide in-flight set for its
/// whole duration, so separately built orchestrators still exclude each other. The entry is released when the run returns, fails, or its future
/// is dropped, so a later trigger can retry. Runs for different accounts do
/// not block each other.
///
/// # Example
///
/// ```no_run
/// use cartlist_engine::auth::{AuthProvider, StaticAuthProvider};
/// use cartlist_engine::setup::{SetupConfig, SetupOrchestrator, SetupReport};
/// use cartlist_engine::store::{MemoryStore, RemoteStore};
/// use cartlist_shared::auth::AuthUser;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let account_id = store.add_account(Some("no"));
/// let auth = Arc::new(StaticAuthProvider::new(AuthUser {
///     id: account_id,
///     email: None,
///     signup_language: None,
/// }));
///
/// let orchestrator = SetupOrchestrator::with_config(store.clone(), auth, SetupConfig::default());
/// let profile = store.fetch_profile(account_id).await?;
///
/// let outcome = orchestrator
///     .run(
///         &profile,
///         Some(Box::new(|report: &SetupReport| {
///             println!("Welcome! {} items", report.items_created)
///         })),
///     )
///     .await;
/// assert!(outcome.is_success());
/// # Ok(())
/// # }
/// ```

use crate::auth::AuthProvider;
use crate::seed::{resolve_language, Language, SeedTemplate};
use crate::store::{RemoteStore, StoreError};
use cartlist_shared::models::{CreateCategory, CreateItem, CreateList, Profile, ProfilePatch};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Default number of items per insert request
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// What to do when some categories or items could not be created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupPolicy {
    /// Mark the account completed anyway and keep what was created
    #[default]
    BestEffort,

    /// Delete what was created and leave the account for a later retry
    Strict,
}

impl SetupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupPolicy::BestEffort => "best_effort",
            SetupPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for SetupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(SetupPolicy::BestEffort),
            "strict" => Ok(SetupPolicy::Strict),
            other => Err(format!(
                "Unknown setup policy '{}', expected best_effort or strict",
                other
            )),
        }
    }
}

/// Setup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Partial-failure policy
    pub policy: SetupPolicy,

    /// Items per insert request (at least 1)
    pub chunk_size: usize,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            policy: SetupPolicy::BestEffort,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Step of a setup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStage {
    /// Looking for lists the account already owns
    Precheck,

    /// Creating the starter list
    CreateList,

    /// Turning on the account's setup flag
    MarkCompleted,
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStage::Precheck => write!(f, "precheck"),
            SetupStage::CreateList => write!(f, "create_list"),
            SetupStage::MarkCompleted => write!(f, "mark_completed"),
        }
    }
}

/// What a run created and what it had to skip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupReport {
    pub account_id: Uuid,

    /// Language the starter data was created in
    pub language: Language,

    /// The starter list, once created
    pub list_id: Option<Uuid>,

    pub categories_created: usize,
    pub categories_failed: usize,
    pub items_created: usize,
    pub items_failed: usize,

    /// Insert requests that failed
    pub failed_chunks: usize,

    /// Deletes that failed while rolling back
    pub rollback_failures: usize,
}

impl SetupReport {
    fn new(account_id: Uuid, language: Language) -> Self {
        Self {
            account_id,
            language,
            list_id: None,
            categories_created: 0,
            categories_failed: 0,
            items_created: 0,
            items_failed: 0,
            failed_chunks: 0,
            rollback_failures: 0,
        }
    }

    /// Whether any category or item is missing
    pub fn has_gaps(&self) -> bool {
        self.categories_failed > 0 || self.items_failed > 0
    }
}

/// Result of a setup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The account's setup flag was already on
    AlreadyCompleted,

    /// Another run for this account is in flight
    InProgress,

    /// The account already owned lists; only the flag was turned on
    Healed,

    /// Starter data created and the flag turned on (check `has_gaps`)
    Completed(SetupReport),

    /// Strict policy: partial data was deleted and the flag left off
    RolledBack(SetupReport),

    /// A required step failed; the account can be retried
    Failed { stage: SetupStage, error: StoreError },
}

impl SetupOutcome {
    /// Whether the account ends up with its setup flag on
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SetupOutcome::AlreadyCompleted | SetupOutcome::Healed | SetupOutcome::Completed(_)
        )
    }

    /// The run report, for runs that created anything
    pub fn report(&self) -> Option<&SetupReport> {
        match self {
            SetupOutcome::Completed(report) | SetupOutcome::RolledBack(report) => Some(report),
            _ => None,
        }
    }
}

/// Callback invoked once after a run that created starter data
pub type CompletionCallback = Box<dyn FnOnce(&SetupReport) + Send>;

/// Accounts with a setup run in flight, shared by every orchestrator in the process
static IN_FLIGHT: LazyLock<Mutex<HashSet<Uuid>>> =
    LazyLock::new(|| Mutex::new(HashSet::new()));

fn lock_in_flight(in_flight: &Mutex<HashSet<Uuid>>) -> MutexGuard<'_, HashSet<Uuid>> {
    in_flight.lock().unwrap_or_else(|poisoned| {
        error!("Setup in-flight set poisoned, recovering");
        poisoned.into_inner()
    })
}

/// Membership in the in-flight set, released on drop
struct InFlightGuard {
    in_flight: &'static Mutex<HashSet<Uuid>>,
    account_id: Uuid,
}

impl InFlightGuard {
    fn acquire(in_flight: &'static Mutex<HashSet<Uuid>>, account_id: Uuid) -> Option<Self> {
        if lock_in_flight(in_flight).insert(account_id) {
            Some(Self {
                in_flight,
                account_id,
            })
        } else {
            None
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock_in_flight(self.in_flight).remove(&self.account_id);
    }
}

/// Runs first-time setup for accounts
#[derive(Clone)]
pub struct SetupOrchestrator {
    store: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
    template: Arc<SeedTemplate>,
    config: SetupConfig,
}

impl SetupOrchestrator {
    /// Creates an orchestrator with the built-in template and default config
    pub fn new(store: Arc<dyn RemoteStore>, auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_config(store, auth, SetupConfig::default())
    }

    /// Creates an orchestrator with custom configuration
    pub fn with_config(
        store: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
        config: SetupConfig,
    ) -> Self {
        Self {
            store,
            auth,
            template: Arc::new(SeedTemplate::builtin()),
            config,
        }
    }

    /// Replaces the seed template
    pub fn with_template(mut self, template: SeedTemplate) -> Self {
        self.template = Arc::new(template);
        self
    }

    /// Whether a run for `account_id` is in flight
    pub fn is_running(&self, account_id: Uuid) -> bool {
        lock_in_flight(&IN_FLIGHT).contains(&account_id)
    }

    /// Runs setup for `account`
    ///
    /// Never returns an error: every way the run can end is a [`SetupOutcome`].
    /// `on_complete` is called once, only when the run created starter data and
    /// turned the flag on.
    pub async fn run(
        &self,
        account: &Profile,
        on_complete: Option<CompletionCallback>,
    ) -> SetupOutcome {
        let account_id = account.id;

        if account.initial_setup_completed {
            debug!(account_id = %account_id, "Setup already completed");
            return SetupOutcome::AlreadyCompleted;
        }

        let Some(guard) = InFlightGuard::acquire(&IN_FLIGHT, account_id) else {
            info!(account_id = %account_id, "Setup already running for account");
            return SetupOutcome::InProgress;
        };

        info!(
            account_id = %account_id,
            policy = %self.config.policy,
            "Starting first-time setup"
        );

        let outcome = self.seed(account).await;
        drop(guard);

        match &outcome {
            SetupOutcome::Completed(report) => {
                info!(
                    account_id = %account_id,
                    language = %report.language,
                    categories = report.categories_created,
                    items = report.items_created,
                    gaps = report.has_gaps(),
                    "First-time setup completed"
                );
                if let Some(on_complete) = on_complete {
                    on_complete(report);
                }
            }
            SetupOutcome::Healed => {
                info!(account_id = %account_id, "Existing lists found, setup marked completed");
            }
            SetupOutcome::RolledBack(report) => {
                warn!(
                    account_id = %account_id,
                    categories_failed = report.categories_failed,
                    items_failed = report.items_failed,
                    rollback_failures = report.rollback_failures,
                    "First-time setup rolled back"
                );
            }
            SetupOutcome::Failed { stage, error } => {
                error!(
                    account_id = %account_id,
                    stage = %stage,
                    error = %error,
                    "First-time setup failed"
                );
            }
            SetupOutcome::AlreadyCompleted | SetupOutcome::InProgress => {}
        }

        outcome
    }

    async fn seed(&self, account: &Profile) -> SetupOutcome {
        let account_id = account.id;

        match self.store.lists_owned_by(account_id).await {
            Ok(lists) if !lists.is_empty() => {
                debug!(account_id = %account_id, lists = lists.len(), "Account already owns lists");
                return match self.mark_completed(account_id).await {
                    Ok(()) => SetupOutcome::Healed,
                    Err(error) => SetupOutcome::Failed {
                        stage: SetupStage::MarkCompleted,
                        error,
                    },
                };
            }
            Ok(_) => {}
            Err(error) => {
                return SetupOutcome::Failed {
                    stage: SetupStage::Precheck,
                    error,
                }
            }
        }

        let language = self.seed_language(account).await;
        let mut report = SetupReport::new(account_id, language);

        let list = match self
            .store
            .insert_list(CreateList {
                name: self.template.list_name(language).to_string(),
                owner_id: account_id,
            })
            .await
        {
            Ok(list) => list,
            Err(error) => {
                return SetupOutcome::Failed {
                    stage: SetupStage::CreateList,
                    error,
                }
            }
        };
        report.list_id = Some(list.id);
        debug!(account_id = %account_id, list_id = %list.id, name = %list.name, "Created starter list");

        let category_ids = self.create_categories(account_id, language, &mut report).await;
        self.create_items(list.id, language, &category_ids, &mut report)
            .await;

        if report.has_gaps() && self.config.policy == SetupPolicy::Strict {
            self.roll_back(list.id, &category_ids, &mut report).await;
            return SetupOutcome::RolledBack(report);
        }

        match self.mark_completed(account_id).await {
            Ok(()) => SetupOutcome::Completed(report),
            Err(error) => SetupOutcome::Failed {
                stage: SetupStage::MarkCompleted,
                error,
            },
        }
    }

    /// Sign-up language from the auth record, then display language
    async fn seed_language(&self, account: &Profile) -> Language {
        let signup_language = match self.auth.current_user().await {
            Ok(user) if user.id == account.id => user.signup_language,
            Ok(user) => {
                warn!(
                    account_id = %account.id,
                    auth_user_id = %user.id,
                    "Signed-in user is not the account being set up, ignoring sign-up language"
                );
                None
            }
            Err(e) => {
                warn!(
                    account_id = %account.id,
                    error = %e,
                    "Could not load auth record, using display language"
                );
                None
            }
        };

        let language = resolve_language(signup_language.as_deref(), account.language.as_deref());
        debug!(account_id = %account.id, language = %language, "Resolved seed language");
        language
    }

    /// Creates the template categories in order
    ///
    /// Returns the created ID per template position, `None` where creation
    /// failed.
    async fn create_categories(
        &self,
        account_id: Uuid,
        language: Language,
        report: &mut SetupReport,
    ) -> Vec<Option<Uuid>> {
        let mut ids = Vec::with_capacity(self.template.categories.len());

        for (position, names) in self.template.categories.iter().enumerate() {
            let name = names.get(language).to_string();
            let result = self
                .store
                .insert_category(CreateCategory {
                    name: name.clone(),
                    owner_id: account_id,
                    sort_order: position as i32,
                })
                .await;

            match result {
                Ok(category) => {
                    report.categories_created += 1;
                    ids.push(Some(category.id));
                }
                Err(e) => {
                    warn!(
                        account_id = %account_id,
                        position,
                        name = %name,
                        error = %e,
                        "Failed to create category, skipping"
                    );
                    report.categories_failed += 1;
                    ids.push(None);
                }
            }
        }

        ids
    }

    /// Inserts the template items in chunks
    async fn create_items(
        &self,
        list_id: Uuid,
        language: Language,
        category_ids: &[Option<Uuid>],
        report: &mut SetupReport,
    ) {
        let mut rows = Vec::with_capacity(self.template.items.len());

        for (position, item) in self.template.items.iter().enumerate() {
            let row = CreateItem {
                list_id,
                name: item.names.get(language).to_string(),
                quantity: item.quantity,
                category_id: item
                    .category
                    .and_then(|category| category_ids.get(category).copied().flatten()),
                comment: None,
                checked: false,
                sort_order: position as i32,
            };

            if let Err(e) = row.validate() {
                warn!(list_id = %list_id, position, error = %e, "Invalid seed item, skipping");
                report.items_failed += 1;
                continue;
            }
            rows.push(row);
        }

        for (index, chunk) in rows.chunks(self.config.chunk_size.max(1)).enumerate() {
            match self.store.insert_items(chunk).await {
                Ok(inserted) => {
                    report.items_created += inserted as usize;
                }
                Err(e) => {
                    warn!(
                        list_id = %list_id,
                        chunk = index,
                        size = chunk.len(),
                        error = %e,
                        "Failed to insert item chunk, skipping"
                    );
                    report.items_failed += chunk.len();
                    report.failed_chunks += 1;
                }
            }
        }
    }

    /// Deletes the starter list (and with it its items) and the categories
    async fn roll_back(
        &self,
        list_id: Uuid,
        category_ids: &[Option<Uuid>],
        report: &mut SetupReport,
    ) {
        if let Err(e) = self.store.delete_list(list_id).await {
            warn!(list_id = %list_id, error = %e, "Failed to delete starter list");
            report.rollback_failures += 1;
        }

        for category_id in category_ids.iter().flatten() {
            if let Err(e) = self.store.delete_category(*category_id).await {
                warn!(category_id = %category_id, error = %e, "Failed to delete starter category");
                report.rollback_failures += 1;
            }
        }
    }

    async fn mark_completed(&self, account_id: Uuid) -> Result<(), StoreError> {
        self.store
            .update_profile(account_id, &ProfilePatch::setup_completed())
            .await
            .map(|_| ())
    }
}
