//! Request-scoped batch loader
//!
//! A [`BatchLoader`] coalesces single-key `load` calls into one bulk fetch
//! and memoizes the outcome per key for as long as the loader lives, which
//! is one GraphQL request.
//!
//! Batch boundaries follow the executor's scheduling turns, never the wall
//! clock. The first `load` of a round opens a batch; the batch waits for the
//! request task to hand control back to the scheduler, and keeps waiting
//! turn after turn until one passes without any new key being registered.
//! Only then does it hand every pending key to the bulk fetch. All sibling
//! resolvers polled in the same round therefore land in the same batch,
//! however wide the response tree fans out.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Poll, Wake, Waker};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

/// Bulk fetch behind a [`BatchLoader`]
///
/// `load` receives distinct keys in registration order and must return
/// exactly one value per key, in the same order. A "not found" result is
/// expressed through the value type (`Option<T>`, or an empty `Vec<T>`).
pub trait BatchFn<K>: Send + Sync + 'static {
    type Value: Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Relation name used in logs and errors
    const RELATION: &'static str;

    fn load(
        &self,
        keys: &[K],
    ) -> impl Future<Output = Result<Vec<Self::Value>, Self::Error>> + Send;
}

/// Failure shared by every key of a batch
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// The bulk fetch itself failed
    #[error("{relation}: bulk fetch failed: {cause}")]
    Fetch {
        relation: &'static str,
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The bulk fetch broke the one-value-per-key contract
    #[error("{relation}: bulk fetch returned {actual} results for {expected} keys")]
    LengthMismatch {
        relation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The batch settled without an entry for a key it had accepted
    #[error("{relation}: batch resolved without a result for a requested key")]
    MissingKey { relation: &'static str },
}

type Resolved<K, V> = Result<Arc<HashMap<K, Arc<V>>>, BatchError>;
type Batch<K, V> = Shared<BoxFuture<'static, Resolved<K, V>>>;

struct State<K, V> {
    /// Every key ever requested, pointing at the batch that owns its result
    memo: HashMap<K, Batch<K, V>>,
    /// Keys registered with the open batch
    pending: Vec<K>,
    /// Batch still accepting keys
    open: Option<Batch<K, V>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Memoizing, round-batched loader for one relation
pub struct BatchLoader<K, F: BatchFn<K>> {
    fetcher: Arc<F>,
    state: Arc<Mutex<State<K, F::Value>>>,
}

impl<K, F> BatchLoader<K, F>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    F: BatchFn<K>,
{
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(State {
                memo: HashMap::new(),
                pending: Vec::new(),
                open: None,
            })),
        }
    }

    /// Load the value for `key`
    ///
    /// Repeated calls with the same key share one fetch and return the same
    /// `Arc`. A failed batch stays failed: later loads of its keys get the
    /// same error without re-fetching.
    pub async fn load(&self, key: K) -> Result<Arc<F::Value>, BatchError> {
        let batch = self.enqueue(&key);
        let resolved = batch.await?;
        resolved
            .get(&key)
            .cloned()
            .ok_or(BatchError::MissingKey {
                relation: F::RELATION,
            })
    }

    /// Number of distinct keys this loader has seen
    pub fn memoized_len(&self) -> usize {
        lock(&self.state).memo.len()
    }

    fn enqueue(&self, key: &K) -> Batch<K, F::Value> {
        let mut state = lock(&self.state);
        if let Some(batch) = state.memo.get(key) {
            return batch.clone();
        }
        let batch = match state.open.clone() {
            Some(batch) => batch,
            None => {
                let batch = self.open_batch();
                state.open = Some(batch.clone());
                batch
            }
        };
        state.pending.push(key.clone());
        state.memo.insert(key.clone(), batch.clone());
        batch
    }

    fn open_batch(&self) -> Batch<K, F::Value> {
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::downgrade(&self.state);
        async move {
            let keys = collect_round(&state).await;
            dispatch(fetcher.as_ref(), keys).await
        }
        .boxed()
        .shared()
    }
}

/// Wait until a scheduler turn registers no new key, then close the batch
async fn collect_round<K, V>(state: &Weak<Mutex<State<K, V>>>) -> Vec<K> {
    let mut registered = match state.upgrade() {
        Some(state) => lock(&state).pending.len(),
        None => return Vec::new(),
    };
    loop {
        NextTurn::default().await;
        if let Some(keys) = close_if_settled(state, &mut registered) {
            return keys;
        }
    }
}

fn close_if_settled<K, V>(state: &Weak<Mutex<State<K, V>>>, registered: &mut usize) -> Option<Vec<K>> {
    let Some(state) = state.upgrade() else {
        return Some(Vec::new());
    };
    let mut state = lock(&state);
    if state.pending.len() == *registered {
        state.open = None;
        return Some(std::mem::take(&mut state.pending));
    }
    *registered = state.pending.len();
    None
}

/// Completes once the polling task has been handed back to the scheduler
///
/// Waiters sharing a batch may poll it several times within one turn of the
/// request task; only the wake that tokio defers to the end of the turn
/// counts as a turn having passed.
#[derive(Default)]
struct NextTurn {
    passed: Option<Arc<TurnWaker>>,
}

struct TurnWaker {
    passed: AtomicBool,
    inner: Waker,
}

impl Wake for TurnWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.passed.store(true, Ordering::Release);
        self.inner.wake_by_ref();
    }
}

impl Future for NextTurn {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if let Some(turn) = &self.passed {
            return if turn.passed.load(Ordering::Acquire) {
                Poll::Ready(())
            } else {
                Poll::Pending
            };
        }

        let turn = Arc::new(TurnWaker {
            passed: AtomicBool::new(false),
            inner: cx.waker().clone(),
        });
        let waker = Waker::from(Arc::clone(&turn));
        // Inside a runtime tokio defers this wake until the task's poll returns;
        // without a scheduler context it fires at once and the batch closes early
        let mut yield_now = Box::pin(tokio::task::yield_now());
        let _ = yield_now.as_mut().poll(&mut Context::from_waker(&waker));
        self.passed = Some(turn);
        Poll::Pending
    }
}

async fn dispatch<K, F>(fetcher: &F, keys: Vec<K>) -> Resolved<K, F::Value>
where
    K: Eq + Hash,
    F: BatchFn<K>,
{
    if keys.is_empty() {
        return Ok(Arc::new(HashMap::new()));
    }

    tracing::debug!(relation = F::RELATION, keys = keys.len(), "Dispatching batch");

    let values = fetcher.load(&keys).await.map_err(|err| {
        tracing::warn!(relation = F::RELATION, error = %err, "Batch fetch failed");
        BatchError::Fetch {
            relation: F::RELATION,
            cause: Arc::new(err),
        }
    })?;

    if values.len() != keys.len() {
        tracing::warn!(
            relation = F::RELATION,
            expected = keys.len(),
            actual = values.len(),
            "Batch fetch broke the result length contract"
        );
        return Err(BatchError::LengthMismatch {
            relation: F::RELATION,
            expected: keys.len(),
            actual: values.len(),
        });
    }

    Ok(Arc::new(
        keys.into_iter()
            .zip(values.into_iter().map(Arc::new))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use futures_util::future::join_all;

    #[derive(Debug, Error)]
    #[error("upstream unavailable")]
    struct Unavailable;

    #[derive(Clone, Copy)]
    enum Mode {
        Double,
        DropLast,
        Fail,
    }

    #[derive(Clone)]
    struct Doubler {
        mode: Mode,
        calls: Arc<Mutex<Vec<Vec<u32>>>>,
    }

    impl Doubler {
        fn new(mode: Mode) -> Self {
            Self {
                mode,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<Vec<u32>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BatchFn<u32> for Doubler {
        type Value = u32;
        type Error = Unavailable;

        const RELATION: &'static str = "doubled";

        async fn load(&self, keys: &[u32]) -> Result<Vec<u32>, Unavailable> {
            self.calls.lock().unwrap().push(keys.to_vec());
            match self.mode {
                Mode::Double => Ok(keys.iter().map(|k| k * 2).collect()),
                Mode::DropLast => Ok(keys[..keys.len() - 1].iter().map(|k| k * 2).collect()),
                Mode::Fail => Err(Unavailable),
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let fetcher = Doubler::new(Mode::Double);
        let loader = BatchLoader::new(fetcher.clone());

        let results = join_all((1..=10).map(|k| loader.load(k))).await;

        let values: Vec<u32> = results.into_iter().map(|r| *r.unwrap()).collect();
        assert_eq!(values, (1..=10).map(|k| k * 2).collect::<Vec<_>>());
        assert_eq!(fetcher.calls(), vec![(1..=10).collect::<Vec<_>>()]);
    }

    #[tokio::test]
    async fn test_repeated_key_is_memoized_by_reference() {
        let fetcher = Doubler::new(Mode::Double);
        let loader = BatchLoader::new(fetcher.clone());

        let first = loader.load(7).await.unwrap();
        let second = loader.load(7).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(loader.memoized_len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_keys_in_one_round_are_fetched_once() {
        let fetcher = Doubler::new(Mode::Double);
        let loader = BatchLoader::new(fetcher.clone());

        let results = join_all([3, 3, 4, 3].map(|k| loader.load(k))).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(fetcher.calls(), vec![vec![3, 4]]);
    }

    #[tokio::test]
    async fn test_later_round_opens_a_new_batch() {
        let fetcher = Doubler::new(Mode::Double);
        let loader = BatchLoader::new(fetcher.clone());

        join_all([1, 2].map(|k| loader.load(k))).await;
        join_all([2, 3].map(|k| loader.load(k))).await;

        // key 2 comes from the memo, only 3 is new
        assert_eq!(fetcher.calls(), vec![vec![1, 2], vec![3]]);
    }

    #[tokio::test]
    async fn test_wrong_length_fails_the_whole_batch() {
        let fetcher = Doubler::new(Mode::DropLast);
        let loader = BatchLoader::new(fetcher.clone());

        let results = join_all([1, 2, 3].map(|k| loader.load(k))).await;

        for result in results {
            assert_matches!(
                result,
                Err(BatchError::LengthMismatch {
                    relation: "doubled",
                    expected: 3,
                    actual: 2,
                })
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_shared_and_sticky() {
        let fetcher = Doubler::new(Mode::Fail);
        let loader = BatchLoader::new(fetcher.clone());

        let results = join_all([1, 2].map(|k| loader.load(k))).await;
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(BatchError::Fetch { relation: "doubled", .. }))));

        // No retry for keys of a failed batch
        assert_matches!(loader.load(1).await, Err(BatchError::Fetch { .. }));
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_loads_issued_across_nested_futures_coalesce() {
        let fetcher = Doubler::new(Mode::Double);
        let loader = BatchLoader::new(fetcher.clone());

        // Inner fan-out is only reached after an extra await, as nested
        // resolvers are
        let nested = join_all((0..3).map(|group| {
            let loader = &loader;
            async move {
                tokio::task::yield_now().await;
                join_all((0..3).map(|i| loader.load(group * 10 + i))).await
            }
        }))
        .await;

        assert_eq!(nested.into_iter().flatten().filter(|r| r.is_ok()).count(), 9);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batches_hold_on_a_multi_thread_runtime() {
        let fetcher = Doubler::new(Mode::Double);

        let tasks = (0..8u32).map(|task| {
            let loader = BatchLoader::new(fetcher.clone());
            tokio::spawn(async move {
                let results = join_all((0..5).map(|i| loader.load(task * 100 + i))).await;
                results.into_iter().filter(|r| r.is_ok()).count()
            })
        });
        let loaded: Vec<usize> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(loaded, vec![5; 8]);
        let calls = fetcher.calls();
        assert_eq!(calls.len(), 8);
        assert!(calls.iter().all(|keys| keys.len() == 5));
    }
}
