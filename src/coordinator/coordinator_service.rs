use log::{debug, error};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::accounts::{Account, AccountRepositoryTrait};
use crate::capabilities::{BiometricGate, Clipboard};
use crate::errors::Result;
use crate::events::EventBus;
use crate::platforms::{NewPlatform, Platform, PlatformRepositoryTrait, PlatformType};
use crate::reorder::ReorderEngine;

use super::coordinator_model::{group_by_platform, NewCredential, ViewState};

/// Aggregates the store's observable lists into the state the UI consumes
/// and mediates every mutation back into the repositories.
///
/// All public operations catch repository errors at the boundary, surface
/// a short message on the view state, and reset the loading flag on every
/// exit path.
pub struct VaultCoordinator<P, A>
where
    P: PlatformRepositoryTrait + 'static,
    A: AccountRepositoryTrait + 'static,
{
    platform_repo: Arc<P>,
    account_repo: Arc<A>,
    biometric: Arc<dyn BiometricGate>,
    clipboard: Arc<dyn Clipboard>,
    state: Arc<watch::Sender<ViewState>>,
    /// Current search task; a new search aborts the previous one
    search_task: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every new search and every cancel; a task only
    /// publishes results while its own generation is still current
    search_generation: Arc<AtomicU64>,
    /// Drag state; gesture events are serial, the mutex only guards
    /// against unrelated callers
    engine: Mutex<ReorderEngine>,
}

impl<P, A> VaultCoordinator<P, A>
where
    P: PlatformRepositoryTrait + 'static,
    A: AccountRepositoryTrait + 'static,
{
    /// Builds the coordinator, loads the initial lists, and spawns the
    /// background task that re-queries on every table change.
    pub fn new(
        platform_repo: Arc<P>,
        account_repo: Arc<A>,
        biometric: Arc<dyn BiometricGate>,
        clipboard: Arc<dyn Clipboard>,
        events: &EventBus,
    ) -> Self {
        let (state_tx, _state_rx) = watch::channel(ViewState::default());
        let state = Arc::new(state_tx);

        refresh_lists(&*platform_repo, &*account_repo, &state);

        let mut changes = events.subscribe();
        {
            let platform_repo = platform_repo.clone();
            let account_repo = account_repo.clone();
            let state = state.clone();
            tokio::spawn(async move {
                loop {
                    match changes.recv().await {
                        Ok(change) => {
                            debug!("Table changed: {:?}, re-querying lists", change);
                            refresh_lists(&*platform_repo, &*account_repo, &state);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!("Change listener lagged by {}, re-querying", skipped);
                            refresh_lists(&*platform_repo, &*account_repo, &state);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });
        }

        Self {
            platform_repo,
            account_repo,
            biometric,
            clipboard,
            state,
            search_task: Mutex::new(None),
            search_generation: Arc::new(AtomicU64::new(0)),
            engine: Mutex::new(ReorderEngine::default()),
        }
    }

    /// Subscribes to view-state updates
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Current view-state snapshot
    pub fn current_state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    // --- search lifecycle -------------------------------------------------

    /// Full-text search across platform name, login name, remark, phone
    /// and email. An empty keyword never reaches the repository: it just
    /// clears the results so the caller shows the full lists again.
    pub fn search_accounts(&self, keyword: &str) {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            self.clear_search_results();
            return;
        }

        self.spawn_search(keyword.clone(), {
            let repo = self.account_repo.clone();
            move || repo.search(&keyword)
        });
    }

    /// Shows only the accounts of one platform
    pub fn filter_by_platform_name(&self, platform_name: &str) {
        let name = platform_name.to_string();
        self.spawn_search(name.clone(), {
            let repo = self.account_repo.clone();
            move || repo.list_by_platform_name(&name)
        });
    }

    /// Shows only the accounts under platforms of one type. An unknown
    /// type string yields empty results rather than an error.
    pub fn filter_by_type(&self, type_name: &str) {
        match PlatformType::parse(type_name) {
            Some(platform_type) => {
                self.spawn_search(type_name.to_string(), {
                    let repo = self.account_repo.clone();
                    move || repo.list_by_platform_type(platform_type)
                });
            }
            None => {
                // Nothing can match; drop keyword, results and loading
                // state so the view does not claim a filter that yields
                // nothing (and reordering is not left blocked).
                self.cancel_search();
            }
        }
    }

    /// Cancels any in-flight search and clears loading state and results.
    /// The cancelled task's result, should it still arrive, is dropped.
    pub fn cancel_search(&self) {
        self.search_generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.search_task.lock().unwrap().take() {
            task.abort();
        }
        self.state.send_modify(|s| s.is_loading = false);
        self.clear_search_results();
    }

    pub fn clear_search_results(&self) {
        self.state.send_modify(|s| {
            s.search_keyword.clear();
            s.search_results.clear();
            s.grouped_search_results.clear();
        });
    }

    fn spawn_search<F>(&self, keyword: String, query: F)
    where
        F: FnOnce() -> Result<Vec<Account>> + Send + 'static,
    {
        let mut guard = self.search_task.lock().unwrap();
        if let Some(previous) = guard.take() {
            previous.abort();
        }
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
            s.search_keyword = keyword;
        });

        let state = self.state.clone();
        let current_generation = self.search_generation.clone();
        *guard = Some(tokio::spawn(async move {
            // The blocking query runs off the async workers; the await is
            // the point where an abort from a superseding search lands.
            let outcome = match tokio::task::spawn_blocking(query).await {
                Ok(outcome) => outcome,
                Err(_) => return, // query panicked or the runtime is shutting down
            };
            // A newer search or an explicit cancel owns the state now;
            // a stale result must not clobber it.
            state.send_if_modified(|s| {
                if current_generation.load(Ordering::SeqCst) != generation {
                    return false;
                }
                match outcome {
                    Ok(results) => {
                        s.grouped_search_results = group_by_platform(&results, &s.platforms);
                        s.search_results = results;
                    }
                    Err(e) => {
                        error!("Search failed: {}", e);
                        s.error_message = Some(format!("Search failed: {}", e));
                    }
                }
                s.is_loading = false;
                true
            });
        }));
    }

    // --- filters ----------------------------------------------------------

    /// Sets the type filter applied to the main list (None means "all").
    /// Reordering is disabled while a filter is active.
    pub fn set_type_filter(&self, filter: Option<PlatformType>) {
        self.state.send_modify(|s| s.type_filter = filter);
    }

    // --- mutations --------------------------------------------------------

    /// Saves an account (insert when id is 0, update otherwise)
    pub async fn save_account(&self, account: Account) {
        self.begin_op();
        let outcome = self.account_repo.save(account).await;
        self.finish_op(outcome, "Saved", "Save failed");
    }

    /// Resolves the named platform (reusing one that matches the given
    /// type, creating one at the top of the list otherwise), then saves
    /// the account under it.
    pub async fn save_account_with_platform(&self, input: NewCredential) {
        self.begin_op();
        let outcome = self.save_with_platform_inner(input).await;
        self.finish_op(outcome, "Saved", "Save failed");
    }

    async fn save_with_platform_inner(&self, input: NewCredential) -> Result<()> {
        input.validate()?;

        let existing = self.platform_repo.list_by_name(&input.platform_name)?;
        let platform_id = if !existing.is_empty() {
            // Prefer a platform whose type matches; else take the first.
            existing
                .iter()
                .find(|p| p.platform_type == input.platform_type)
                .unwrap_or(&existing[0])
                .id
        } else {
            self.platform_repo
                .insert_at_top(NewPlatform {
                    name: input.platform_name.clone(),
                    platform_type: input.platform_type,
                })
                .await?;
            // A new platform invalidates any reorder snapshot.
            self.engine.lock().unwrap().reset_order();

            // The insert does not return the generated id; recover it by
            // name (+type), safe because names are unique.
            let after_insert = self.platform_repo.list_by_name(&input.platform_name)?;
            after_insert
                .iter()
                .find(|p| p.platform_type == input.platform_type)
                .or_else(|| after_insert.first())
                .ok_or_else(|| {
                    crate::errors::Error::NotFound(format!(
                        "Platform '{}' missing after insert",
                        input.platform_name
                    ))
                })?
                .id
        };

        let account = Account {
            id: 0,
            platform_id,
            remark: input.remark,
            login_name: input.login_name,
            password: input.password,
            pay_password: input.pay_password,
            phone: input.phone,
            email: input.email,
            id_number: input.id_number,
        };
        self.account_repo.save(account).await
    }

    /// Deletes an account behind the biometric gate. When the platform's
    /// last account goes, the platform row is removed too (application
    /// cascade; the store-level cascade only works the other way).
    pub async fn delete_account(&self, account: &Account) {
        if !self.biometric.request_confirmation("Delete account").await {
            self.state
                .send_modify(|s| s.status_message = Some("Deletion cancelled".to_string()));
            return;
        }

        self.begin_op();
        let outcome = self.delete_account_inner(account).await;
        self.finish_op(outcome, "Deleted", "Delete failed");
    }

    async fn delete_account_inner(&self, account: &Account) -> Result<()> {
        self.account_repo.delete(account.id).await?;

        let remaining = self.account_repo.count_by_platform(account.platform_id)?;
        if remaining == 0 {
            self.platform_repo.delete(account.platform_id).await?;
            self.engine.lock().unwrap().reset_order();
        }
        Ok(())
    }

    /// Persists a platform copy with only the type changed
    pub async fn update_platform_type(&self, platform: &Platform, new_type: PlatformType) {
        self.begin_op();
        let updated = Platform {
            platform_type: Some(new_type),
            ..platform.clone()
        };
        let outcome = self.platform_repo.save(updated).await;
        self.finish_op(outcome, "Platform type updated", "Type update failed");
    }

    /// Persists a full platform ordering (sort_index = position).
    ///
    /// A failure is reported but does not roll back the in-memory order;
    /// retrying is safe because the updates are idempotent.
    pub async fn reorder_platforms(&self, ids_in_order: Vec<i32>) {
        self.begin_op();
        let outcome = self.platform_repo.update_sort_indices(ids_in_order).await;
        self.finish_op(outcome, "Order updated", "Reorder failed");
    }

    // --- drag-to-reorder surface -----------------------------------------

    /// Reports an item's rendered height (initial layout or resize)
    pub fn report_item_height(&self, platform_id: i32, height_px: f32) {
        self.engine
            .lock()
            .unwrap()
            .set_item_height(platform_id, height_px);
    }

    /// Starts a drag on long-press. Permitted only over the full list:
    /// with a type filter or search keyword active this returns false.
    pub fn drag_started(&self, platform_id: i32) -> bool {
        let (can_reorder, rendered_order) = {
            let s = self.state.borrow();
            (
                s.type_filter.is_none() && s.search_keyword.is_empty(),
                s.platforms.iter().map(|p| p.id).collect::<Vec<_>>(),
            )
        };
        if !can_reorder {
            return false;
        }
        self.engine
            .lock()
            .unwrap()
            .begin_drag(platform_id, &rendered_order)
    }

    /// Feeds one incremental vertical drag delta
    pub fn drag_moved(&self, dy: f32) {
        self.engine.lock().unwrap().drag_by(dy);
    }

    /// Ends the drag and persists the final order
    pub async fn drag_ended(&self) {
        let order = self.engine.lock().unwrap().finish_drag();
        if let Some(ids) = order {
            self.reorder_platforms(ids).await;
            self.engine.lock().unwrap().reset_order();
        }
    }

    /// Cancelled drags persist exactly like completed ones
    pub async fn drag_cancelled(&self) {
        self.drag_ended().await;
    }

    /// Current offset of the dragged item, for the caller's animation
    pub fn drag_offset(&self, platform_id: i32) -> f32 {
        self.engine.lock().unwrap().accumulated_offset(platform_id)
    }

    // --- clipboard --------------------------------------------------------

    /// Copies a labelled value to the clipboard. Fire-and-forget.
    pub fn copy_to_clipboard(&self, label: &str, value: &str) {
        self.clipboard.copy(label, value);
    }

    // --- messages ---------------------------------------------------------

    pub fn clear_error_message(&self) {
        self.state.send_modify(|s| s.error_message = None);
    }

    pub fn clear_status_message(&self) {
        self.state.send_modify(|s| s.status_message = None);
    }

    // --- internals --------------------------------------------------------

    fn begin_op(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error_message = None;
        });
    }

    fn finish_op(&self, outcome: Result<()>, success: &str, failure: &str) {
        self.state.send_modify(|s| {
            match outcome {
                Ok(()) => s.status_message = Some(success.to_string()),
                Err(ref e) => {
                    error!("{}: {}", failure, e);
                    s.error_message = Some(format!("{}: {}", failure, e));
                }
            }
            s.is_loading = false;
        });
    }
}

/// Re-queries both lists and the type index, then recombines the grouped
/// views. Latest value wins.
fn refresh_lists<P, A>(platform_repo: &P, account_repo: &A, state: &watch::Sender<ViewState>)
where
    P: PlatformRepositoryTrait,
    A: AccountRepositoryTrait,
{
    let queried = platform_repo.list().and_then(|platforms| {
        let accounts = account_repo.list()?;
        let types = platform_repo.list_types()?;
        Ok((platforms, accounts, types))
    });

    match queried {
        Ok((platforms, accounts, types)) => state.send_modify(|s| {
            s.grouped_accounts = group_by_platform(&accounts, &platforms);
            s.grouped_search_results = group_by_platform(&s.search_results, &platforms);
            s.platforms = platforms;
            s.accounts = accounts;
            s.platform_types = types;
        }),
        Err(e) => {
            error!("Failed to refresh lists: {}", e);
            state.send_modify(|s| s.error_message = Some(format!("Failed to load data: {}", e)));
        }
    }
}
