//! Periodic triggering of removal passes.
//!
//! The removal code never owns a timer. It is handed a [`Trigger`] and asks it
//! to run the pass every so often; [`IntervalTrigger`] is the tokio-backed
//! implementation used by the daemon.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Work run on every tick
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    async fn run(&self);
}

pub trait Trigger: Send + Sync {
    /// Run the job now and then every `every`, replacing any existing schedule
    fn schedule(&self, every: Duration);

    /// Like `schedule`, but the first run happens after `delay`
    fn schedule_after(&self, delay: Duration, every: Duration);

    /// Cancel the schedule. A run already in progress is left to finish.
    fn stop(&self);

    fn is_running(&self) -> bool;
}

/// Tokio interval loop driving a [`ScheduledJob`]. At most one loop exists at a time.
pub struct IntervalTrigger {
    job: Arc<dyn ScheduledJob>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl IntervalTrigger {
    pub fn new(job: Arc<dyn ScheduledJob>) -> Self {
        Self {
            job,
            handle: Mutex::new(None),
        }
    }

    fn handle(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start(&self, delay: Duration, every: Duration) {
        if every.is_zero() {
            warn!("Refusing to schedule removal passes with a zero interval");
            return;
        }

        let mut handle = self.handle();

        if let Some(previous) = handle.take() {
            debug!("Stopping previous removal schedule");
            previous.abort();
        }

        info!(
            delay_seconds = delay.as_secs_f64(),
            interval_seconds = every.as_secs_f64(),
            "Removal schedule starting"
        );

        let job = Arc::clone(&self.job);
        *handle = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                // Runs detached so that aborting this loop never cuts a pass short
                let job = Arc::clone(&job);
                if let Err(e) = tokio::spawn(async move { job.run().await }).await {
                    warn!(error = %e, "Scheduled job panicked");
                }
            }
        }));
    }
}

impl Trigger for IntervalTrigger {
    fn schedule(&self, every: Duration) {
        self.start(Duration::ZERO, every);
    }

    fn schedule_after(&self, delay: Duration, every: Duration) {
        self.start(delay, every);
    }

    fn stop(&self) {
        if let Some(handle) = self.handle().take() {
            info!("Removal schedule stopped");
            handle.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.handle()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for IntervalTrigger {
    fn drop(&mut self) {
        if let Some(handle) = self.handle().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl ScheduledJob for CountingJob {
        async fn run(&self) {
            self.runs.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl CountingJob {
        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_runs_immediately_then_periodically() {
        let job = Arc::new(CountingJob::default());
        let trigger = IntervalTrigger::new(job.clone());

        trigger.schedule(Duration::from_secs(100));
        settle().await;
        assert_eq!(job.runs(), 1);
        assert!(trigger.is_running());

        tokio::time::sleep(Duration::from_secs(250)).await;
        assert_eq!(job.runs(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_after_waits_for_delay() {
        let job = Arc::new(CountingJob::default());
        let trigger = IntervalTrigger::new(job.clone());

        trigger.schedule_after(Duration::from_secs(5), Duration::from_secs(100));
        settle().await;
        assert_eq!(job.runs(), 0);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(job.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_loop() {
        let job = Arc::new(CountingJob::default());
        let trigger = IntervalTrigger::new(job.clone());

        trigger.schedule(Duration::from_secs(100));
        settle().await;
        assert_eq!(job.runs(), 1);

        trigger.schedule(Duration::from_secs(100));
        settle().await;
        assert_eq!(job.runs(), 2);

        // A leftover loop would double these ticks
        tokio::time::sleep(Duration::from_secs(250)).await;
        assert_eq!(job.runs(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_schedule() {
        let job = Arc::new(CountingJob::default());
        let trigger = IntervalTrigger::new(job.clone());

        trigger.schedule(Duration::from_secs(100));
        settle().await;
        trigger.stop();
        settle().await;

        assert!(!trigger.is_running());
        tokio::time::sleep(Duration::from_secs(500)).await;
        assert_eq!(job.runs(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_keeps_existing_schedule() {
        let job = Arc::new(CountingJob::default());
        let trigger = IntervalTrigger::new(job.clone());

        trigger.schedule(Duration::from_secs(100));
        settle().await;
        trigger.schedule(Duration::ZERO);
        settle().await;

        assert!(trigger.is_running());
        assert_eq!(job.runs(), 1);
    }

    #[tokio::test]
    async fn test_not_running_before_schedule() {
        let trigger = IntervalTrigger::new(Arc::new(CountingJob::default()));
        assert!(!trigger.is_running());
        trigger.stop();
    }
}
