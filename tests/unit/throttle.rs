//! Unit tests for request spacing and widening

use std::time::Duration;

use auth0_export::executor::{Clock, ManualClock, Throttle};

#[tokio::test]
async fn test_consecutive_requests_respect_min_interval() {
    let clock = ManualClock::shared();
    let throttle = Throttle::per_second(2.0, clock.clone());

    let mut stamps = Vec::new();
    for _ in 0..6 {
        stamps.push(throttle.wait().await);
    }

    for pair in stamps.windows(2) {
        assert!(
            pair[1] - pair[0] >= Duration::from_millis(500),
            "requests spaced {:?} apart",
            pair[1] - pair[0]
        );
    }
}

#[tokio::test]
async fn test_elapsed_time_counts_toward_interval() {
    let clock = ManualClock::shared();
    let throttle = Throttle::new(Duration::from_secs(1), clock.clone());

    throttle.wait().await;
    clock.advance(Duration::from_millis(700));
    throttle.wait().await;

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(300)]);
}

#[tokio::test]
async fn test_widening_is_monotonic_and_capped() {
    let clock = ManualClock::shared();
    let throttle = Throttle::per_second(2.0, clock);
    let ceiling = Duration::from_secs(2);

    let mut previous = throttle.min_interval().await;
    for _ in 0..10 {
        let next = throttle.widen(1.5, ceiling).await;
        assert!(next >= previous);
        assert!(next <= ceiling);
        previous = next;
    }
    assert_eq!(previous, ceiling);
}

#[tokio::test]
async fn test_last_request_time_tracks_wait() {
    let clock = ManualClock::shared();
    let throttle = Throttle::per_second(4.0, clock.clone());
    assert!(throttle.last_request_time().await.is_none());

    let stamp = throttle.wait().await;
    assert_eq!(throttle.last_request_time().await, Some(stamp));
    assert_eq!(stamp, clock.now());
}
