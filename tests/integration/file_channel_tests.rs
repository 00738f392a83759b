// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Integration tests for remote file download and upload
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use super::simulator::{Op, Quirks, SimulatedMako};
use lonkero_ssti::engines::mako::MAKO;
use lonkero_ssti::{
    CommandExecutor, ContentFingerprint, Context, EngineDetector, ExploitError, FileChannel,
    InjectionOracle, Integrity, TransferState,
};
use std::sync::Arc;

const PATH: &str = "/tmp/upload.bin";

fn simulator(quirks: Quirks) -> Arc<SimulatedMako> {
    Arc::new(SimulatedMako::with_quirks(Context::new(1, "1}", ""), quirks))
}

async fn channel_for(sim: &Arc<SimulatedMako>) -> FileChannel {
    let oracle: Arc<dyn InjectionOracle> = sim.clone();
    let (injector, _) = EngineDetector::new(oracle, &MAKO)
        .detect_engine()
        .await
        .unwrap();
    sim.clear_log();
    FileChannel::new(CommandExecutor::new(injector))
}

/// Bytes that differ between chunks so reordering is observable
fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn test_fingerprint_absent_and_present() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    assert!(channel.fingerprint("/etc/missing").await.is_none());

    sim.put_file("/etc/hostname", b"target\n");
    let fingerprint = channel.fingerprint("/etc/hostname").await.unwrap();
    assert_eq!(fingerprint, ContentFingerprint::of(b"target\n"));
}

#[tokio::test]
async fn test_read_existing_file() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;
    let data = patterned(2048);
    sim.put_file("/var/data.bin", &data);

    let report = channel.read("/var/data.bin").await.unwrap();
    assert_eq!(report.data, data);
    assert_eq!(report.size, 2048);
    assert_eq!(report.integrity, Integrity::Verified);
    assert_eq!(
        report.history,
        vec![
            TransferState::Idle,
            TransferState::Probing,
            TransferState::Transmitting { chunk: 0, total: 1 },
            TransferState::Verifying,
            TransferState::Verified,
        ]
    );
}

#[tokio::test]
async fn test_read_missing_file() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    let err = channel.read("/nope").await.unwrap_err();
    assert_eq!(err, ExploitError::RemoteFileMissing { path: "/nope".to_string() });
    assert!(!sim.ops().iter().any(|op| matches!(op, Op::Read(_))));
}

#[tokio::test]
async fn test_stale_read_is_soft_mismatch() {
    let sim = simulator(Quirks {
        stale_reads: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await;
    sim.put_file("/var/log/app.log", b"line one\n");

    let report = channel.read("/var/log/app.log").await.unwrap();
    assert_eq!(report.data, b"line one\n!".to_vec());
    match report.integrity {
        Integrity::Mismatch { expected, observed } => {
            assert_eq!(expected, ContentFingerprint::of(b"line one\n"));
            assert_eq!(observed, Some(ContentFingerprint::of(b"line one\n!")));
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
    assert_eq!(report.history.last(), Some(&TransferState::Unverified));
}

#[tokio::test]
async fn test_garbled_read_is_malformed() {
    let sim = simulator(Quirks {
        garbled_reads: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await;
    sim.put_file("/etc/passwd", b"root:x:0:0\n");

    let err = channel.read("/etc/passwd").await.unwrap_err();
    assert!(matches!(err, ExploitError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_upload_round_trip_sizes() {
    let mut all_bytes: Vec<u8> = (0..=255u8).collect();
    all_bytes.extend((0..=255u8).rev());

    let inputs = vec![
        Vec::new(),
        b"0123456789".to_vec(),
        patterned(500),
        patterned(1200),
        all_bytes,
    ];

    for (i, data) in inputs.into_iter().enumerate() {
        let sim = simulator(Quirks::default());
        let channel = channel_for(&sim).await;
        let path = format!("/tmp/round_trip_{}", i);

        let report = channel.write(&data, &path, false).await.unwrap();
        assert_eq!(report.integrity, Integrity::Verified, "input {}", i);
        assert_eq!(report.state, TransferState::Verified);
        assert_eq!(report.bytes_sent, data.len());
        assert_eq!(sim.file(&path), Some(data.clone()));

        let read_back = channel.read(&path).await.unwrap();
        assert_eq!(read_back.data, data);
    }
}

#[tokio::test]
async fn test_overwrite_round_trip_sizes() {
    let mut all_bytes: Vec<u8> = (0..=255u8).collect();
    all_bytes.extend((0..=255u8).rev());

    let inputs = vec![
        Vec::new(),
        b"0123456789".to_vec(),
        patterned(500),
        patterned(1200),
        all_bytes,
    ];

    for (i, data) in inputs.into_iter().enumerate() {
        let sim = simulator(Quirks::default());
        let channel = channel_for(&sim).await;
        sim.put_file(PATH, &patterned(3000));

        let report = channel.write(&data, PATH, true).await.unwrap();
        assert!(report.truncated, "input {}", i);
        assert_eq!(report.integrity, Integrity::Verified, "input {}", i);
        assert_eq!(report.chunks_sent, data.len().div_ceil(500));
        assert_eq!(sim.truncates(), 1);
        assert_eq!(sim.file(PATH), Some(data.clone()));

        let read_back = channel.read(PATH).await.unwrap();
        assert_eq!(read_back.data, data);
    }
}

#[tokio::test]
async fn test_existence_check_failure_aborts_write() {
    let sim = simulator(Quirks {
        exists_unreachable: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await;
    sim.put_file(PATH, b"original");

    let err = channel.write(b"appended?", PATH, false).await.unwrap_err();
    assert!(matches!(err, ExploitError::OracleUnreachable { .. }));
    assert_eq!(sim.file(PATH), Some(b"original".to_vec()));
    assert!(sim.appends().is_empty());
    assert_eq!(sim.truncates(), 0);
}

#[tokio::test]
async fn test_exists_reports_presence() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    assert!(!channel.exists(PATH).await.unwrap());
    sim.put_file(PATH, b"");
    assert!(channel.exists(PATH).await.unwrap());
    assert_eq!(sim.ops().last(), Some(&Op::Exists(PATH.to_string())));
}

#[tokio::test]
async fn test_existing_file_without_overwrite_is_untouched() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;
    sim.put_file(PATH, b"original");

    let err = channel.write(b"replacement", PATH, false).await.unwrap_err();
    assert_eq!(err, ExploitError::OverwriteDenied { path: PATH.to_string() });
    assert_eq!(sim.file(PATH), Some(b"original".to_vec()));
    assert_eq!(sim.truncates(), 0);
    assert!(sim.appends().is_empty());
}

#[tokio::test]
async fn test_overwrite_truncates_once_before_appends() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;
    sim.put_file(PATH, &patterned(4000));

    let data = patterned(1200);
    let report = channel.write(&data, PATH, true).await.unwrap();
    assert!(report.truncated);
    assert_eq!(report.integrity, Integrity::Verified);
    assert_eq!(sim.file(PATH), Some(data));

    let ops = sim.ops();
    let truncate_at = ops.iter().position(|op| matches!(op, Op::Truncate(_))).unwrap();
    let first_append = ops.iter().position(|op| matches!(op, Op::Append { .. })).unwrap();
    assert_eq!(sim.truncates(), 1);
    assert!(truncate_at < first_append);

    assert_eq!(
        report.history,
        vec![
            TransferState::Idle,
            TransferState::Probing,
            TransferState::Truncating,
            TransferState::Transmitting { chunk: 0, total: 3 },
            TransferState::Transmitting { chunk: 1, total: 3 },
            TransferState::Transmitting { chunk: 2, total: 3 },
            TransferState::Verifying,
            TransferState::Verified,
        ]
    );
}

#[tokio::test]
async fn test_new_file_is_not_truncated() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    let report = channel.write(b"fresh", PATH, false).await.unwrap();
    assert!(!report.truncated);
    assert_eq!(sim.truncates(), 0);
}

#[tokio::test]
async fn test_empty_upload_creates_file() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    let report = channel.write(&[], PATH, false).await.unwrap();
    assert!(report.truncated);
    assert_eq!(report.chunks_sent, 0);
    assert_eq!(report.integrity, Integrity::Verified);
    assert_eq!(sim.file(PATH), Some(Vec::new()));
}

#[tokio::test]
async fn test_chunk_sizes_on_the_wire() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await;

    channel.write(&patterned(1200), PATH, false).await.unwrap();
    assert_eq!(sim.appends(), vec![500, 500, 200]);

    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await.with_chunk_size(100);
    let report = channel.write(&patterned(1200), PATH, false).await.unwrap();
    assert_eq!(sim.appends(), vec![100; 12]);
    assert_eq!(report.chunks_sent, 12);
}

#[tokio::test]
async fn test_reordered_appends_are_reported() {
    let sim = simulator(Quirks {
        reorder_appends: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await;
    let data = patterned(1200);

    let report = channel.write(&data, PATH, false).await.unwrap();
    assert_eq!(report.state, TransferState::Unverified);
    match report.integrity {
        Integrity::Mismatch { expected, observed } => {
            assert_eq!(expected, ContentFingerprint::of(&data));
            assert!(observed.is_some());
            assert_ne!(observed, Some(expected));
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
    assert_eq!(sim.file(PATH).map(|f| f.len()), Some(1200));
}

#[tokio::test]
async fn test_chunk_confirmation_stops_at_first_loss() {
    let sim = simulator(Quirks {
        drop_first_append: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await.with_chunk_confirmation(true);

    let report = channel.write(&patterned(1200), PATH, false).await.unwrap();
    assert_eq!(report.state, TransferState::Unverified);
    assert_eq!(report.chunks_sent, 1);
    assert_eq!(
        report.integrity,
        Integrity::SizeMismatch {
            chunk: 0,
            expected_size: 500,
            observed_size: None,
        }
    );
    assert_eq!(sim.appends(), vec![500]);
}

#[tokio::test]
async fn test_lost_chunk_without_confirmation_fails_final_check() {
    let sim = simulator(Quirks {
        drop_first_append: true,
        ..Default::default()
    });
    let channel = channel_for(&sim).await;

    let report = channel.write(&patterned(1200), PATH, false).await.unwrap();
    assert_eq!(report.chunks_sent, 3);
    assert!(matches!(report.integrity, Integrity::Mismatch { .. }));
}

#[tokio::test]
async fn test_chunk_confirmation_on_healthy_target() {
    let sim = simulator(Quirks::default());
    let channel = channel_for(&sim).await.with_chunk_confirmation(true);

    let report = channel.write(&patterned(1200), PATH, false).await.unwrap();
    assert_eq!(report.integrity, Integrity::Verified);

    let sizes = sim.ops().iter().filter(|op| matches!(op, Op::Size(_))).count();
    assert_eq!(sizes, 3);
}
