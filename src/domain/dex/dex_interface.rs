//! Pool contract shared by every venue

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard};

use super::Venue;
use crate::shared::errors::QuoteError;
use crate::shared::move_types::TokenType;
use crate::shared::types::{EntryFunctionPayload, PriceType, QuoteType, TokenDescriptor};

/// Common interface for all venue pools
///
/// Pricing calls are synchronous and side-effect free over the last loaded
/// snapshot. `reload_state` is the only call that touches the ledger.
#[async_trait]
pub trait TradingPool: Send + Sync {
    fn venue(&self) -> Venue;

    /// Human readable identity, e.g. `Basiq<APT, USDC>`
    fn id(&self) -> String;

    /// Routable pools are swapped through the aggregator, never directly
    fn is_routable(&self) -> bool;

    fn x_token(&self) -> &Arc<TokenDescriptor>;

    fn y_token(&self) -> &Arc<TokenDescriptor>;

    fn is_state_loaded(&self) -> bool;

    /// Replace the snapshot with fresh ledger state; on failure the previous snapshot stays.
    /// Concurrent reloads of one pool run one at a time, in call order.
    async fn reload_state(&self) -> Result<(), QuoteError>;

    fn get_price(&self) -> Result<PriceType, QuoteError>;

    fn get_quote(&self, input_ui_amt: f64, is_x_to_y: bool) -> Result<QuoteType, QuoteError>;

    /// Build a direct swap payload
    fn build_swap_payload(
        &self,
        _input_ui_amt: f64,
        _min_out_ui_amt: f64,
        _is_x_to_y: bool,
    ) -> Result<EntryFunctionPayload, QuoteError> {
        if self.is_routable() {
            return Err(QuoteError::Unsupported(format!(
                "{} is routable; swap it through the aggregator",
                self.id()
            )));
        }
        Err(QuoteError::Unsupported(format!("{} has no direct swap payload", self.id())))
    }

    /// `Some(is_x_to_y)` when this pool trades `from` into `to`
    fn direction(&self, from: &TokenType, to: &TokenType) -> Option<bool> {
        let x = &self.x_token().token_type;
        let y = &self.y_token().token_type;
        if x == from && y == to {
            Some(true)
        } else if y == from && x == to {
            Some(false)
        } else {
            None
        }
    }
}

/// Whether a pool's snapshot has been loaded yet
#[derive(Debug)]
pub enum SnapshotState<S> {
    Unloaded,
    Loaded(Arc<S>),
}

/// Snapshot slot guarded for concurrent readers and a replacing reloader
#[derive(Debug)]
pub struct SnapshotCell<S> {
    state: RwLock<SnapshotState<S>>,
    reload: Mutex<()>,
}

impl<S> Default for SnapshotCell<S> {
    fn default() -> Self {
        Self {
            state: RwLock::new(SnapshotState::Unloaded),
            reload: Mutex::new(()),
        }
    }
}

impl<S> SnapshotCell<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.read(), SnapshotState::Loaded(_))
    }

    /// Held for the whole ledger read and swap, so an older read never lands last
    pub async fn lock_reload(&self) -> MutexGuard<'_, ()> {
        self.reload.lock().await
    }

    /// Swap in a new snapshot wholesale
    pub fn replace(&self, snapshot: S) {
        *self.state.write() = SnapshotState::Loaded(Arc::new(snapshot));
    }

    /// The current snapshot, or `NotLoaded` for `pool`
    pub fn loaded(&self, pool: &str) -> Result<Arc<S>, QuoteError> {
        match &*self.state.read() {
            SnapshotState::Loaded(snapshot) => Ok(Arc::clone(snapshot)),
            SnapshotState::Unloaded => Err(QuoteError::NotLoaded {
                pool: pool.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_cell_lifecycle() {
        let cell: SnapshotCell<u64> = SnapshotCell::new();
        assert!(!cell.is_loaded());
        assert!(matches!(cell.loaded("p"), Err(QuoteError::NotLoaded { pool }) if pool == "p"));

        cell.replace(7);
        assert!(cell.is_loaded());
        let first = cell.loaded("p").unwrap();
        cell.replace(8);
        // readers holding the old snapshot are unaffected by a reload
        assert_eq!(*first, 7);
        assert_eq!(*cell.loaded("p").unwrap(), 8);
    }

    #[tokio::test]
    async fn test_reloads_land_in_call_order() {
        let cell: SnapshotCell<u64> = SnapshotCell::new();
        let (release, held) = tokio::sync::oneshot::channel::<()>();

        // the first reload's ledger read finishes after the second one starts
        let slow = async {
            let _reload = cell.lock_reload().await;
            held.await.unwrap();
            cell.replace(1);
        };
        let fast = async {
            let _reload = cell.lock_reload().await;
            cell.replace(2);
        };
        let unblock = async {
            tokio::task::yield_now().await;
            release.send(()).unwrap();
        };
        tokio::join!(slow, fast, unblock);

        assert_eq!(*cell.loaded("p").unwrap(), 2);
    }
}
