use std::sync::{Condvar, Mutex};

use crate::error::ClientError;

enum State<T> {
    Unloaded,
    Loading,
    Loaded(T),
}

/// A one-shot loader for a group of attributes (§4.4). The first caller to
/// observe `Unloaded` runs `loader` while holding the `Loading` state;
/// concurrent callers block on the condvar instead of racing the loader.
/// Loader failure is not cached: the state reverts to `Unloaded` so the
/// next reader retries.
pub struct Lazy<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Default for Lazy<T> {
    fn default() -> Self {
        Lazy {
            state: Mutex::new(State::Unloaded),
            ready: Condvar::new(),
        }
    }
}

impl<T: Clone> Lazy<T> {
    /// Returns the loaded value, running `loader` at most once even under
    /// concurrent first access.
    pub fn get_or_load(
        &self,
        loader: impl FnOnce() -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let mut guard = self.state.lock().expect("lazy lock poisoned");
        loop {
            match &*guard {
                State::Loaded(value) => return Ok(value.clone()),
                State::Loading => {
                    guard = self.ready.wait(guard).expect("lazy lock poisoned");
                }
                State::Unloaded => break,
            }
        }
        *guard = State::Loading;
        drop(guard);

        let result = loader();

        let mut guard = self.state.lock().expect("lazy lock poisoned");
        match &result {
            Ok(value) => *guard = State::Loaded(value.clone()),
            Err(_) => *guard = State::Unloaded,
        }
        self.ready.notify_all();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn loads_once_under_concurrency() {
        let lazy: Arc<Lazy<u32>> = Arc::new(Lazy::default());
        let calls = Arc::new(AtomicUsize::new(0));
        let threads = 32;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let lazy = lazy.clone();
                let calls = calls.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    lazy.get_or_load(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(99)
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 99);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let lazy: Lazy<u32> = Lazy::default();
        let first = lazy.get_or_load(|| Err(ClientError::Void));
        assert!(first.is_err());
        let second = lazy.get_or_load(|| Ok(5));
        assert_eq!(second.unwrap(), 5);
    }
}
