//! Scheduler lifecycle: start, pause, resume, stop and self-stop.

use mazechase::{ChaseError, Scheduler, WorkerJob};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn counter_job(counter: &Arc<AtomicUsize>) -> WorkerJob {
    let counter = counter.clone();
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn workers_run_at_their_own_cadence() {
    let fast = Arc::new(AtomicUsize::new(0));
    let slow = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::new(Duration::from_secs(1));
    scheduler.add_worker("fast", Duration::from_millis(5), counter_job(&fast));
    scheduler.add_worker("slow", Duration::from_millis(200), counter_job(&slow));
    scheduler.start().unwrap();

    assert!(wait_until(Duration::from_secs(2), || fast.load(Ordering::SeqCst) >= 20));
    let report = scheduler.stop();

    assert!(fast.load(Ordering::SeqCst) > slow.load(Ordering::SeqCst));
    assert!(slow.load(Ordering::SeqCst) >= 1);
    assert_eq!(report.joined, vec!["fast".to_string(), "slow".to_string()]);
    assert!(report.is_clean());
}

#[test]
fn pause_and_resume_gate_every_worker() {
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::new(Duration::from_secs(1));
    scheduler.add_worker("a", Duration::from_millis(3), counter_job(&a));
    scheduler.add_worker("b", Duration::from_millis(3), counter_job(&b));
    scheduler.start().unwrap();
    assert!(wait_until(Duration::from_secs(2), || a.load(Ordering::SeqCst) > 0 && b.load(Ordering::SeqCst) > 0));

    assert!(scheduler.pause());
    assert!(scheduler.is_paused());
    thread::sleep(Duration::from_millis(30));
    let (a_paused, b_paused) = (a.load(Ordering::SeqCst), b.load(Ordering::SeqCst));
    thread::sleep(Duration::from_millis(80));
    assert_eq!(a.load(Ordering::SeqCst), a_paused);
    assert_eq!(b.load(Ordering::SeqCst), b_paused);

    assert!(scheduler.resume());
    assert!(!scheduler.resume());
    assert!(wait_until(Duration::from_secs(2), || {
        a.load(Ordering::SeqCst) > a_paused && b.load(Ordering::SeqCst) > b_paused
    }));
    assert!(scheduler.stop().is_clean());
}

#[test]
fn stopped_scheduler_cannot_restart() {
    let scheduler = Scheduler::new(Duration::from_millis(500));
    scheduler.start().unwrap();
    scheduler.stop();
    assert!(!scheduler.is_running());
    assert!(!scheduler.pause());
    assert!(matches!(scheduler.start(), Err(ChaseError::InvalidState(_))));
}

#[test]
fn late_workers_are_ignored() {
    let runs = Arc::new(AtomicUsize::new(0));
    let scheduler = Scheduler::new(Duration::from_millis(500));
    scheduler.start().unwrap();
    scheduler.add_worker("late", Duration::from_millis(1), counter_job(&runs));
    thread::sleep(Duration::from_millis(30));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert!(scheduler.worker_names().is_empty());
    scheduler.stop();
}

#[test]
fn worker_can_stop_its_own_scheduler() {
    let scheduler = Arc::new(Scheduler::new(Duration::from_secs(1)));
    let ticks = Arc::new(AtomicUsize::new(0));
    let report = Arc::new(Mutex::new(None));

    let handle = scheduler.clone();
    let seen = report.clone();
    let count = ticks.clone();
    scheduler.add_worker(
        "self-stopper",
        Duration::from_millis(2),
        Box::new(move || {
            if count.fetch_add(1, Ordering::SeqCst) == 3 {
                *seen.lock().unwrap() = Some(handle.stop());
            }
            Ok(())
        }),
    );
    scheduler.add_worker("bystander", Duration::from_millis(2), Box::new(|| Ok(())));
    scheduler.start().unwrap();

    assert!(wait_until(Duration::from_secs(3), || report.lock().unwrap().is_some()));
    let report = report.lock().unwrap().clone().unwrap();
    assert_eq!(report.detached, vec!["self-stopper".to_string()]);
    assert_eq!(report.joined, vec!["bystander".to_string()]);
    assert!(!scheduler.is_running());

    let settled = ticks.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(ticks.load(Ordering::SeqCst), settled);
}
