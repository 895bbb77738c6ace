use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    client::ApiClient,
    state::Load,
    trees::{StatusFilter, TreeRecord},
};

struct Current {
    filter: StatusFilter,
    generation: u64,
    inflight: Option<CancellationToken>,
    view: Load<Vec<TreeRecord>>,
}

/// The status-tabbed tree listing.
///
/// Each [`load`](TreeListing::load) supersedes the one before it: the older
/// request is cancelled and whatever it returns is dropped, so a slow answer
/// for a previous tab never replaces the rows of the current one. Nothing is
/// cached between tabs.
pub struct TreeListing {
    client: ApiClient,
    current: Mutex<Current>,
}

impl TreeListing {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            current: Mutex::new(Current {
                filter: StatusFilter::All,
                generation: 0,
                inflight: None,
                view: Load::Loading,
            }),
        }
    }

    pub fn filter(&self) -> StatusFilter {
        self.current.lock().filter
    }

    pub fn view(&self) -> Load<Vec<TreeRecord>> {
        self.current.lock().view.clone()
    }

    /// Fetches the rows for `filter`.
    ///
    /// Returns the new view, or `None` if a later `load` took over first.
    pub async fn load(&self, filter: StatusFilter) -> Option<Load<Vec<TreeRecord>>> {
        let token = CancellationToken::new();
        let generation = {
            let mut cur = self.current.lock();
            if let Some(previous) = cur.inflight.replace(token.clone()) {
                previous.cancel();
            }
            cur.generation += 1;
            cur.filter = filter;
            cur.view = Load::Loading;
            cur.generation
        };

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(%filter, generation, "tree load superseded");
                return None;
            }
            result = self.client.list_trees(filter) => result,
        };

        let mut cur = self.current.lock();
        if cur.generation != generation {
            debug!(%filter, generation, "dropping stale tree rows");
            return None;
        }
        cur.inflight = None;
        if let Err(e) = &result {
            warn!(%filter, error = %e, "tree load failed");
        }
        cur.view = result.into();
        Some(cur.view.clone())
    }
}
