// Copyright (c) 2025 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Integration tests for engine, scripting and exec detection
 *
 * @copyright 2025 Bountyy Oy
 * @license Proprietary
 */

use super::simulator::{Op, Quirks, SimulatedMako};
use lonkero_ssti::engines::mako::MAKO;
use lonkero_ssti::tokens::join_chars;
use lonkero_ssti::{Context, EngineDetector, ExploitError, InjectionOracle};
use rand::Rng;
use std::sync::Arc;

const EXPRESSION_CONTEXT: Context = Context::new(1, "1}", "");

fn detector(sim: &Arc<SimulatedMako>) -> EngineDetector {
    let oracle: Arc<dyn InjectionOracle> = sim.clone();
    EngineDetector::new(oracle, &MAKO)
}

#[tokio::test]
async fn test_join_probe_known_pair() {
    let sim = Arc::new(SimulatedMako::new(EXPRESSION_CONTEXT));
    let (injector, _) = detector(&sim).detect_engine().await.unwrap();

    let (expected, observed) = EngineDetector::join_probe(&injector, "kx", "qz").await.unwrap();
    assert_eq!(expected, "qkxz");
    assert_eq!(observed.as_deref(), Some("qkxz"));
}

#[tokio::test]
async fn test_join_probe_random_pairs_including_quotes() {
    let sim = Arc::new(SimulatedMako::new(Context::new(3, "1\")}", "")));
    let (injector, _) = detector(&sim).detect_engine().await.unwrap();

    let charset: Vec<char> = "abcxyz019'\"\\{}%<>$#".chars().collect();
    let mut rng = rand::rng();
    let token = |rng: &mut rand::rngs::ThreadRng| -> String {
        (0..2).map(|_| charset[rng.random_range(0..charset.len())]).collect()
    };

    for _ in 0..200 {
        let separator = token(&mut rng);
        let chars = token(&mut rng);
        let (expected, observed) = EngineDetector::join_probe(&injector, &separator, &chars)
            .await
            .unwrap();
        assert_eq!(expected, join_chars(&separator, &chars));
        assert_eq!(
            observed.as_deref(),
            Some(expected.as_str()),
            "separator {:?} chars {:?}",
            separator,
            chars
        );
    }
}

#[tokio::test]
async fn test_full_probe_reports_capabilities() {
    let sim = Arc::new(SimulatedMako::new(Context::new(2, "1'%>", "<%#")));
    let (probe, _) = detector(&sim).probe(true).await.unwrap();

    assert_eq!(probe.engine, "mako");
    assert_eq!(probe.language, "python");
    assert!(probe.engine_confirmed);
    assert_eq!(probe.resolved_context, Some(Context::new(2, "1'%>", "<%#")));
    assert!(probe.scripting_enabled);
    assert_eq!(probe.platform.as_deref(), Some("posix-linux"));
    assert!(probe.exec_enabled);
    assert!(probe.can_read_files());
    assert!(probe.can_write_files());

    let ops = sim.ops();
    assert!(ops.contains(&Op::Join));
    assert!(ops.contains(&Op::Platform));
    assert!(ops.iter().any(|op| matches!(op, Op::Exec(cmd) if cmd.starts_with("echo "))));
}

#[tokio::test]
async fn test_probe_without_exec() {
    let sim = Arc::new(SimulatedMako::new(EXPRESSION_CONTEXT));
    let (probe, _) = detector(&sim).probe(false).await.unwrap();

    assert!(probe.scripting_enabled);
    assert!(!probe.exec_enabled);
    assert!(!sim.ops().iter().any(|op| matches!(op, Op::Exec(_))));
}

#[tokio::test]
async fn test_blocked_imports_disable_scripting() {
    let quirks = Quirks {
        imports_blocked: true,
        ..Default::default()
    };
    let sim = Arc::new(SimulatedMako::with_quirks(EXPRESSION_CONTEXT, quirks));
    let (probe, _) = detector(&sim).probe(true).await.unwrap();

    assert!(probe.engine_confirmed);
    assert!(!probe.scripting_enabled);
    assert!(probe.platform.is_none());
    assert!(!probe.exec_enabled);
}

#[tokio::test]
async fn test_silent_shell_is_not_exec() {
    let quirks = Quirks {
        exec_silent: true,
        ..Default::default()
    };
    let sim = Arc::new(SimulatedMako::with_quirks(EXPRESSION_CONTEXT, quirks));
    let (probe, _) = detector(&sim).probe(true).await.unwrap();

    assert!(probe.scripting_enabled);
    assert!(!probe.exec_enabled);
}

#[tokio::test]
async fn test_foreign_join_is_engine_mismatch() {
    let quirks = Quirks {
        foreign_join: true,
        ..Default::default()
    };
    let sim = Arc::new(SimulatedMako::with_quirks(EXPRESSION_CONTEXT, quirks));

    match detector(&sim).detect_engine().await {
        Err(ExploitError::EngineMismatch { engine, expected, observed }) => {
            assert_eq!(engine, "mako");
            let reversed: String = expected.chars().rev().collect();
            assert_eq!(observed, Some(reversed));
        }
        other => panic!("expected EngineMismatch, got {:?}", other.map(|(_, c)| c)),
    }
}

#[tokio::test]
async fn test_probe_result_serializes() {
    let sim = Arc::new(SimulatedMako::new(EXPRESSION_CONTEXT));
    let (probe, _) = detector(&sim).probe(true).await.unwrap();

    let json = serde_json::to_value(&probe).unwrap();
    assert_eq!(json["engine_confirmed"], true);
    assert_eq!(json["resolved_context"]["breakout_prefix"], "1}");
    assert_eq!(json["resolved_context"]["nesting_level"], 1);
}
