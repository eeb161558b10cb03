mod common;

use std::sync::Arc;
use std::time::Duration;

use sctui::audio::state::{PlaybackStatus, SelectedTrack};
use sctui::audio::system::AudioSystem;

use common::{GatedSource, RecordingSink};

fn track() -> SelectedTrack {
    SelectedTrack {
        title: "artist - song".into(),
        url: "https://soundcloud.com/artist/song".into(),
    }
}

fn system_with(source: Arc<GatedSource>) -> (AudioSystem, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (AudioSystem::new(sink.clone(), source), sink)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 2.5s");
}

#[tokio::test(flavor = "multi_thread")]
async fn download_without_track_is_a_no_op() {
    let source = Arc::new(GatedSource::finite(Vec::new()));
    let (mut system, _sink) = system_with(source.clone());

    assert!(!system.start_download());
    assert!(!system.state().is_downloading());
    system.shutdown().await;
    assert_eq!(source.downloads_finished(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn starting_playback_enters_streaming_with_clean_flags() {
    let source = Arc::new(GatedSource::endless(vec![vec![0.0; 8]]));
    let (mut system, sink) = system_with(source.clone());
    system.state().select_track(track());
    system.state().set_playback_error("stale".into());

    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Streaming).await;

    assert!(!system.state().is_paused());
    assert_eq!(system.state().playback_error(), None);
    wait_until(|| sink.chunk_count() == 1).await;

    source.release();
    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn only_one_playback_session_at_a_time() {
    let source = Arc::new(GatedSource::endless(Vec::new()));
    let (mut system, _sink) = system_with(source.clone());
    system.state().select_track(track());

    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Streaming).await;
    assert!(!system.start_playback());

    system.shutdown().await;
    assert_eq!(system.state().status(), PlaybackStatus::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn pause_toggles_device_and_freezes_delivery() {
    let source = Arc::new(GatedSource::paced(
        vec![0.0; 8],
        Duration::from_millis(10),
    ));
    let (mut system, sink) = system_with(source);
    system.state().select_track(track());

    assert!(system.start_playback());
    wait_until(|| sink.chunk_count() >= 1).await;

    system.toggle_pause();
    assert!(system.state().is_paused());
    assert_eq!(sink.last_pause_call(), Some(true));

    // One pre-pause chunk may still land; after that the producer is
    // parked in the pause loop.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let frozen = sink.chunk_count();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sink.chunk_count(), frozen);

    system.toggle_pause();
    assert_eq!(sink.last_pause_call(), Some(false));
    wait_until(|| sink.chunk_count() > frozen).await;

    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_joins_session_and_allows_restart() {
    let source = Arc::new(GatedSource::endless(vec![vec![0.0; 8]]));
    let (mut system, _sink) = system_with(source.clone());
    system.state().select_track(track());

    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Streaming).await;

    system.stop().await;
    assert_eq!(system.state().status(), PlaybackStatus::Idle);

    // A fresh start is honored once the previous session is gone.
    assert!(system.start_playback());
    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn restart_after_pause_then_stop_resumes_the_device() {
    let source = Arc::new(GatedSource::endless(vec![vec![0.0; 8]]));
    let (mut system, sink) = system_with(source.clone());
    system.state().select_track(track());

    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Streaming).await;
    system.toggle_pause();
    assert_eq!(sink.last_pause_call(), Some(true));

    system.stop().await;
    assert_eq!(system.state().status(), PlaybackStatus::Idle);

    // The new session must not inherit the paused device.
    let delivered = sink.chunk_count();
    assert!(system.start_playback());
    assert_eq!(sink.last_pause_call(), Some(false));
    wait_until(|| sink.chunk_count() > delivered).await;

    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_while_idle_is_a_no_op() {
    let source = Arc::new(GatedSource::finite(Vec::new()));
    let (mut system, _sink) = system_with(source);
    system.state().select_track(track());

    system.stop().await;
    assert_eq!(system.state().status(), PlaybackStatus::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_session_error_is_cleared_by_next_start() {
    let source = Arc::new(GatedSource::failing("stream cut"));
    let (mut system, _sink) = system_with(source.clone());
    system.state().select_track(track());

    // First session fails immediately and records its error.
    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Idle).await;
    assert!(
        system
            .state()
            .playback_error()
            .unwrap()
            .contains("stream cut")
    );

    // Second session parks on the gate: its start must already have
    // cleared the previous session's error.
    source.hold();
    assert!(system.start_playback());
    wait_until(|| system.state().status() == PlaybackStatus::Streaming).await;
    assert_eq!(system.state().playback_error(), None);

    source.release();
    wait_until(|| system.state().status() == PlaybackStatus::Idle).await;
    assert!(system.state().playback_error().is_some());
    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_download_runs_detached_and_joins_at_shutdown() {
    let source = Arc::new(
        GatedSource::endless(Vec::new()).with_download_delay(Duration::from_millis(50)),
    );
    let (mut system, _sink) = system_with(source.clone());
    system.state().select_track(track());

    assert!(system.start_playback());
    assert!(system.start_download());
    assert!(system.state().is_downloading());
    // Second download while one is in flight is refused.
    assert!(!system.start_download());

    system.shutdown().await;
    assert_eq!(source.downloads_finished(), 1);
    assert!(!system.state().is_downloading());
    assert_eq!(system.state().download_error(), None);
}
