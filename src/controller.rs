use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::{QueryCache, normalize_query};
use crate::client::SearchTransport;
use crate::models::SearchResults;
use crate::routes;
use crate::store::{self, SessionStore, keys};

/// The one user-facing failure message. Transport errors, bad statuses and
/// decode failures are deliberately indistinguishable to the user.
pub const SEARCH_ERROR_MESSAGE: &str =
    "Wystąpił błąd podczas wyszukiwania. Spróbuj ponownie.";

/// Observable controller state, published over a watch channel.
/// Cancellation is not a state: a superseded request vanishes without a
/// published transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Fetching { query: String },
    Succeeded { query: String, results: SearchResults },
    Failed { query: String, message: String },
}

/// What a `search`/`load` call did, synchronously.
#[derive(Debug)]
pub enum Dispatch {
    /// Empty input or an unparsable location; nothing happened.
    Ignored,
    /// Served from the query cache; the result was published without a
    /// network call.
    CacheHit,
    /// A fetch task was started. Await the handle to observe completion.
    Spawned(JoinHandle<()>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Origin {
    /// User-triggered search: updates the visible address and persists the
    /// restoration snapshot.
    UserSearch,
    /// Fetch driven by the address itself on first load: the address is
    /// already correct and nothing is persisted.
    InitialLoad,
}

/// The active network call. At most one exists per controller; a newer
/// search cancels it through the token the instant it is dispatched.
struct InFlight {
    token: CancellationToken,
    generation: u64,
}

/// Orchestrates the search lifecycle: cache consultation, a single
/// cancellable network request, best-effort snapshot persistence and
/// restoration after history navigation.
pub struct SearchController<T: SearchTransport> {
    transport: T,
    cache: QueryCache,
    store: Arc<dyn SessionStore>,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
    state_tx: watch::Sender<SearchState>,
    location_tx: watch::Sender<Option<String>>,
}

impl<T: SearchTransport> SearchController<T> {
    pub fn new(transport: T, cache: QueryCache, store: Arc<dyn SessionStore>) -> Self {
        let (state_tx, _) = watch::channel(SearchState::Idle);
        let (location_tx, _) = watch::channel(None);
        SearchController {
            transport,
            cache,
            store,
            in_flight: Mutex::new(None),
            generation: AtomicU64::new(0),
            state_tx,
            location_tx,
        }
    }

    /// Subscribe to published search states.
    pub fn states(&self) -> watch::Receiver<SearchState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to the visible address, updated on successful
    /// user-triggered searches.
    pub fn location(&self) -> watch::Receiver<Option<String>> {
        self.location_tx.subscribe()
    }

    pub fn current_state(&self) -> SearchState {
        self.state_tx.borrow().clone()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Run a search for a raw user query. Fire-and-forget: the outcome is
    /// observed through the state channel. Empty input is a no-op.
    pub fn search(self: Arc<Self>, raw: &str) -> Dispatch {
        let query = normalize_query(raw);
        if query.is_empty() {
            return Dispatch::Ignored;
        }
        self.dispatch(query, Origin::UserSearch)
    }

    /// Run the search encoded in a location string, as on a fresh load of a
    /// bookmarked or shared address. The address is not rewritten.
    pub fn load(self: Arc<Self>, location: &str) -> Dispatch {
        match routes::parse_search_url(location) {
            Some(query) => self.dispatch(query, Origin::InitialLoad),
            None => Dispatch::Ignored,
        }
    }

    fn dispatch(self: Arc<Self>, query: String, origin: Origin) -> Dispatch {
        if let Some(results) = self.cache.get(&query) {
            tracing::debug!(%query, "query cache hit, skipping network call");
            // A cache hit supersedes any fetch still in flight, exactly as
            // a miss would; publish under the slot lock so the cancelled
            // task cannot land a stale result afterwards.
            let mut slot = self.in_flight.lock().unwrap();
            if let Some(previous) = slot.take() {
                tracing::debug!(%query, "superseding in-flight request");
                previous.token.cancel();
            }
            if origin == Origin::UserSearch {
                store::save_snapshot(self.store.as_ref(), &query, &results);
                self.location_tx
                    .send_replace(Some(routes::search_url(&query)));
            }
            self.state_tx
                .send_replace(SearchState::Succeeded { query, results });
            return Dispatch::CacheHit;
        }

        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut slot = self.in_flight.lock().unwrap();
            if let Some(previous) = slot.take() {
                tracing::debug!(%query, "superseding in-flight request");
                previous.token.cancel();
            }
            *slot = Some(InFlight {
                token: token.clone(),
                generation,
            });
            self.state_tx.send_replace(SearchState::Fetching {
                query: query.clone(),
            });
        }

        Dispatch::Spawned(tokio::spawn(self.run_fetch(query, token, generation, origin)))
    }

    async fn run_fetch(
        self: Arc<Self>,
        query: String,
        token: CancellationToken,
        generation: u64,
        origin: Origin,
    ) {
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.transport.fetch(&query) => Some(result),
        };

        // Publish under the in-flight lock: dispatch cancels the previous
        // token while holding it, so a response that got past the select
        // either publishes before the successor starts or sees the
        // cancellation here and is discarded. A stale result can never land
        // after a fresher one.
        let mut slot = self.in_flight.lock().unwrap();
        if token.is_cancelled() {
            tracing::debug!(%query, "request superseded, discarding");
            return;
        }
        let Some(result) = outcome else {
            return;
        };

        match result {
            Ok(results) => {
                self.cache.put(&query, results.clone());
                if origin == Origin::UserSearch {
                    store::save_snapshot(self.store.as_ref(), &query, &results);
                    self.location_tx
                        .send_replace(Some(routes::search_url(&query)));
                }
                self.state_tx
                    .send_replace(SearchState::Succeeded { query, results });
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "search request failed");
                self.state_tx.send_replace(SearchState::Failed {
                    query,
                    message: SEARCH_ERROR_MESSAGE.to_string(),
                });
            }
        }

        if slot.as_ref().is_some_and(|f| f.generation == generation) {
            *slot = None;
        }
    }

    /// Restore the last published result after a history-navigation reload.
    ///
    /// Requires the restoration flag in the session store and an intact
    /// snapshot; when `expected` is given the snapshot must be for that
    /// query. On success the snapshot is published and seeded into the
    /// cache with zero network calls, and the flag is cleared. Any missing
    /// or malformed piece falls through to normal fresh-load behavior.
    pub fn restore(&self, expected: Option<&str>) -> Option<String> {
        let flag = self.store.try_read(keys::RESTORED)?;
        if flag != "true" {
            return None;
        }
        let snapshot = store::load_snapshot(self.store.as_ref())?;
        if let Some(expected) = expected {
            if normalize_query(expected) != snapshot.query {
                tracing::debug!(
                    "snapshot does not match requested state, skipping restore"
                );
                return None;
            }
        }

        // Restoring publishes synchronously, so any fetch still in flight
        // must be superseded first or its response would later overwrite
        // the restored result.
        let mut slot = self.in_flight.lock().unwrap();
        if let Some(previous) = slot.take() {
            tracing::debug!("superseding in-flight request");
            previous.token.cancel();
        }
        self.cache.put(&snapshot.query, snapshot.results.clone());
        self.store.try_remove(keys::RESTORED);
        tracing::info!(query = %snapshot.query, "restored search from session snapshot");
        self.state_tx.send_replace(SearchState::Succeeded {
            query: snapshot.query.clone(),
            results: snapshot.results,
        });
        Some(snapshot.query)
    }

    /// Navigation-event entry point. `persisted` is the host's signal that
    /// the page came back from the back/forward cache; it arms the
    /// restoration flag before attempting a restore.
    pub fn on_page_show(&self, persisted: bool, expected: Option<&str>) -> Option<String> {
        if persisted {
            self.store.try_write(keys::RESTORED, "true");
        }
        self.restore(expected)
    }
}
