//! Run progress reporting.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

type Callback = Box<dyn Fn(u8) + Send + Sync>;

/// Thread-safe, monotonic 0–100 progress value.
///
/// Updates that would lower the value are ignored. The optional callback
/// fires only when the value actually increases. Share it via `Arc` to
/// observe a run from another thread.
///
/// # Examples
///
/// ```
/// use u_timetable::ga::ProgressTracker;
///
/// let progress = ProgressTracker::new();
/// progress.update(40);
/// progress.update(10);
/// assert_eq!(progress.get(), 40);
/// progress.finish();
/// assert_eq!(progress.get(), 100);
/// ```
#[derive(Default)]
pub struct ProgressTracker {
    percent: AtomicU8,
    callback: Option<Callback>,
}

impl ProgressTracker {
    /// Creates a tracker at 0%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker that reports increases to `callback`.
    pub fn with_callback(callback: impl Fn(u8) + Send + Sync + 'static) -> Self {
        Self {
            percent: AtomicU8::new(0),
            callback: Some(Box::new(callback)),
        }
    }

    /// Raises progress to `percent` (capped at 100).
    pub fn update(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.percent.fetch_max(percent, Ordering::AcqRel);
        if percent > previous {
            if let Some(cb) = &self.callback {
                cb(percent);
            }
        }
    }

    /// Raises progress to `done / total` as a percentage.
    pub fn update_ratio(&self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = (done.min(total) * 100 / total) as u8;
        self.update(percent);
    }

    /// Marks the run complete.
    pub fn finish(&self) {
        self.update(100);
    }

    /// Current progress.
    pub fn get(&self) -> u8 {
        self.percent.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("percent", &self.get())
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_monotonic() {
        let p = ProgressTracker::new();
        p.update(30);
        p.update(20);
        assert_eq!(p.get(), 30);
        p.update(250);
        assert_eq!(p.get(), 100);
    }

    #[test]
    fn test_ratio() {
        let p = ProgressTracker::new();
        p.update_ratio(1, 4);
        assert_eq!(p.get(), 25);
        p.update_ratio(9, 4);
        assert_eq!(p.get(), 100);
        p.update_ratio(1, 0);
        assert_eq!(p.get(), 100);
    }

    #[test]
    fn test_callback_fires_on_increase_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let p = ProgressTracker::with_callback(move |v| sink.lock().unwrap().push(v));
        p.update(10);
        p.update(10);
        p.update(5);
        p.update(60);
        p.finish();
        assert_eq!(*seen.lock().unwrap(), vec![10, 60, 100]);
    }

    #[test]
    fn test_shared_across_threads() {
        let p = Arc::new(ProgressTracker::new());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.update(i * 20))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(p.get(), 60);
    }
}
