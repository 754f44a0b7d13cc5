use super::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Clock returning a scripted sequence of hours, repeating the last one
struct ScriptedClock {
    hours: Mutex<Vec<u32>>,
    reads: AtomicUsize,
}

impl ScriptedClock {
    fn new(hours: &[u32]) -> Arc<Self> {
        let mut hours = hours.to_vec();
        hours.reverse();
        Arc::new(Self {
            hours: Mutex::new(hours),
            reads: AtomicUsize::new(0),
        })
    }
}

impl Clock for ScriptedClock {
    fn hour(&self) -> u32 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut hours = self.hours.lock().unwrap();
        if hours.len() > 1 {
            hours.pop().unwrap()
        } else {
            hours[0]
        }
    }
}

#[test]
fn test_window_bounds_are_half_open() {
    let window = HourWindow::new(2, 14);
    assert!(!window.contains(1));
    assert!(window.contains(2));
    assert!(window.contains(13));
    assert!(!window.contains(14));
    assert!(!window.contains(23));
}

#[test]
fn test_window_crossing_midnight() {
    let window = HourWindow::new(22, 6);
    assert!(window.contains(22));
    assert!(window.contains(0));
    assert!(window.contains(5));
    assert!(!window.contains(6));
    assert!(!window.contains(21));
}

#[test]
fn test_equal_bounds_mean_always_open() {
    let window = HourWindow::new(5, 5);
    for hour in 0..24 {
        assert!(window.contains(hour), "hour {hour} should be open");
    }
}

#[test]
fn test_disabled_config_gives_open_gate() {
    let config = AvailabilityConfig {
        enabled: false,
        start_hour: 3,
        end_hour: 4,
        ..Default::default()
    };
    assert!(NetworkGate::from_config(&config).is_open());
}

#[test]
fn test_is_open_reads_clock() {
    let gate = NetworkGate::new(
        HourWindow::new(2, 14),
        Duration::from_millis(1),
        ScriptedClock::new(&[20]),
    );
    assert!(!gate.is_open());

    let gate = NetworkGate::new(
        HourWindow::new(2, 14),
        Duration::from_millis(1),
        ScriptedClock::new(&[9]),
    );
    assert!(gate.is_open());
}

#[tokio::test]
async fn test_ensure_available_returns_immediately_inside_window() {
    let clock = ScriptedClock::new(&[10]);
    let gate = NetworkGate::new(
        HourWindow::new(2, 14),
        Duration::from_secs(3600),
        clock.clone(),
    );

    tokio::time::timeout(Duration::from_secs(1), gate.ensure_available())
        .await
        .expect("gate should not block inside the window");
    assert_eq!(clock.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ensure_available_polls_until_window_opens() {
    // 23h, 0h, 1h are outside; 2h opens the window
    let clock = ScriptedClock::new(&[23, 0, 1, 2]);
    let gate = NetworkGate::new(
        HourWindow::new(2, 14),
        Duration::from_millis(1),
        clock.clone(),
    );

    tokio::time::timeout(Duration::from_secs(5), gate.ensure_available())
        .await
        .expect("gate should open once the clock reaches the window");

    // One clock read per check
    assert_eq!(clock.reads.load(Ordering::SeqCst), 4);
    assert!(gate.is_open());
}

#[tokio::test]
async fn test_always_open_gate_never_sleeps() {
    let gate = NetworkGate::always_open();
    tokio::time::timeout(Duration::from_millis(100), gate.ensure_available())
        .await
        .expect("open gate should not block");
}
