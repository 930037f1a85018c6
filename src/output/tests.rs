use super::{CsvSampleLog, DisplayAdapter, SampleRecord, SampleSink};
use crate::acquisition::SensorSample;
use crate::config::Config;
use crate::fusion::{WindEstimate, WindFusion};
use crate::health::{HealthStatus, HealthTracker, Subsystem};
use crate::position::PositionFix;
use crate::test_support::MemoryDisplay;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;

fn reference_estimate() -> (SensorSample, WindEstimate) {
    let fusion = WindFusion::from_config(&Config::default());
    let sample = SensorSample::new(20, 90.0, 7);
    let estimate = fusion.fuse(&sample, Duration::from_secs(1), &PositionFix::new(5.0, 0.0, Instant::now()));
    (sample, estimate)
}

fn adapter() -> (DisplayAdapter, Arc<MemoryDisplay>) {
    let display = Arc::new(MemoryDisplay::default());
    (DisplayAdapter::new(Box::new(Arc::clone(&display)), 16), display)
}

#[test]
fn test_format_lines_and_glyphs() {
    let (adapter, _) = adapter();
    let (_, estimate) = reference_estimate();
    let (top, bottom) = adapter.format_lines(&estimate, HealthStatus::Ok, HealthStatus::Failed);
    assert_eq!(top, "Wsp: 9.79  A*");
    assert_eq!(bottom, "Wdr: 00090 G_");
    let (top, bottom) = adapter.format_lines(&WindEstimate::default(), HealthStatus::Unknown, HealthStatus::Ok);
    assert_eq!(top, "Wsp: 0.00  A_");
    assert_eq!(bottom, "Wdr: 00000 G*");
}

#[test]
fn test_lines_are_clipped_to_width() {
    let display = Arc::new(MemoryDisplay::default());
    let narrow = DisplayAdapter::new(Box::new(Arc::clone(&display)), 8);
    let (top, bottom) = narrow.format_lines(&WindEstimate::default(), HealthStatus::Ok, HealthStatus::Ok);
    assert_eq!(top, "Wsp: 0.0");
    assert_eq!(bottom.chars().count(), 8);
}

#[test]
fn test_refresh_initializes_once_then_renders() {
    let (mut adapter, display) = adapter();
    let health = HealthTracker::new();
    let (_, estimate) = reference_estimate();
    adapter.refresh(&estimate, &health);
    adapter.refresh(&estimate, &health);
    assert_eq!(display.inits(), 1);
    assert_eq!(display.frames().len(), 2);
    assert_eq!(health.status(Subsystem::Display), HealthStatus::Ok);
}

#[test]
fn test_io_failure_marks_failed_and_reinitializes() {
    let (mut adapter, display) = adapter();
    let health = HealthTracker::new();
    let (_, estimate) = reference_estimate();
    adapter.refresh(&estimate, &health);

    display.set_broken(true);
    adapter.refresh(&estimate, &health);
    assert_eq!(health.status(Subsystem::Display), HealthStatus::Failed);
    adapter.refresh(&estimate, &health);
    assert_eq!(display.inits(), 2);

    display.set_broken(false);
    adapter.refresh(&estimate, &health);
    assert_eq!(display.inits(), 3);
    assert_eq!(health.status(Subsystem::Display), HealthStatus::Ok);
    assert_eq!(display.frames().len(), 2);
    // instrument/position health are untouched by display failures
    assert_eq!(health.status(Subsystem::Instrument), HealthStatus::Unknown);
}

#[test]
fn test_farewell_only_when_healthy() {
    let (mut adapter, display) = adapter();
    let health = HealthTracker::new();
    adapter.farewell(&health);
    assert!(display.frames().is_empty());

    adapter.refresh(&WindEstimate::default(), &health);
    adapter.farewell(&health);
    let frames = display.frames();
    assert_eq!(frames.last().unwrap(), &(String::from("Quitting, bye!"), String::new()));
}

#[test]
fn test_sample_record_format() {
    let (sample, estimate) = reference_estimate();
    let record = SampleRecord::new(&sample, &estimate);
    assert_eq!(record.to_string(), "90,9,7");
}

#[tokio::test]
async fn test_csv_log_appends_lines() {
    let path = std::env::temp_dir().join(format!("truewind-log-{}.csv", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let (sample, estimate) = reference_estimate();
    let record = SampleRecord::new(&sample, &estimate);
    {
        let log = CsvSampleLog::new(&path);
        log.append(&record).await.unwrap();
        log.append(&record).await.unwrap();
    }
    // reopening continues the same file
    CsvSampleLog::new(&path).append(&record).await.unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "90,9,7\n90,9,7\n90,9,7\n");
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_csv_log_unwritable_path() {
    let log = CsvSampleLog::new("/nonexistent-dir/truewind/log.csv");
    let (sample, estimate) = reference_estimate();
    assert!(log.append(&SampleRecord::new(&sample, &estimate)).await.is_err());
}
