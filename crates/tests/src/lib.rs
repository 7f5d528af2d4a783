//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract smoke tests
//! - Config file → router → consumers
//! - Routing scenarios against real bounded channels

#[cfg(test)]
mod contract_tests {
    use contracts::{ChannelName, Predicate, Record};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_closure_is_predicate() {
        fn check<P: Predicate<i32>>(p: &P, v: i32) -> bool {
            p.matches(&v)
        }
        assert!(check(&|n: &i32| *n > 3, 4));
        assert!(!check(&|n: &i32| *n > 3, 2));
    }

    #[test]
    fn test_poison_carries_no_payload() {
        let poison: Record<String> = Record::Poison;
        assert!(poison.is_poison());
        assert_eq!(poison.payload(), None);
        assert_eq!(ChannelName::from("q1"), "q1");
    }
}

#[cfg(test)]
mod config_tests {
    use std::fs;

    use config_loader::ConfigLoader;
    use contracts::{DispatchStrategy, SinkType};
    use tempfile::tempdir;

    const ROUTER_TOML: &str = r#"
version = "V1"

[router]
strategy = "content_based"
default_channel = "other"

[[channels]]
name = "errors"
capacity = 64
sink = "file"
params = { path = "out/errors.log" }

[[channels]]
name = "other"

[[routes]]
channel = "errors"
matcher = { kind = "contains", value = "ERROR" }
"#;

    #[test]
    fn test_load_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, ROUTER_TOML).unwrap();

        let bp = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(bp.router.strategy, DispatchStrategy::ContentBased);
        assert_eq!(bp.channels[0].capacity, 64);
        assert_eq!(bp.channels[0].sink, SinkType::File);
        assert_eq!(bp.channels[1].capacity, 100);
    }

    #[test]
    fn test_load_json_file_matches_toml() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("router.toml");
        fs::write(&toml_path, ROUTER_TOML).unwrap();
        let from_toml = ConfigLoader::load_from_path(&toml_path).unwrap();

        let json_path = dir.path().join("router.json");
        fs::write(&json_path, ConfigLoader::to_json(&from_toml).unwrap()).unwrap();
        let from_json = ConfigLoader::load_from_path(&json_path).unwrap();

        assert_eq!(from_toml, from_json);
    }

    #[test]
    fn test_rejects_invalid_files() {
        let dir = tempdir().unwrap();
        let cases = [
            ("dup.toml", "[[channels]]\nname = \"a\"\n[[channels]]\nname = \"a\"\n"),
            ("zero.toml", "[[channels]]\nname = \"a\"\ncapacity = 0\n"),
            (
                "unknown.toml",
                "[[channels]]\nname = \"a\"\n[[routes]]\nchannel = \"b\"\nmatcher = { kind = \"odd\" }\n",
            ),
            (
                "regex.toml",
                "[[channels]]\nname = \"a\"\n[[routes]]\nchannel = \"a\"\nmatcher = { kind = \"regex\", pattern = \"[\" }\n",
            ),
            ("empty.toml", "channels = []\n"),
        ];

        for (file, content) in cases {
            let path = dir.path().join(file);
            fs::write(&path, content).unwrap();
            assert!(
                ConfigLoader::load_from_path(&path).is_err(),
                "{file} should be rejected"
            );
        }
    }

    #[test]
    fn test_shipped_configs_are_valid() {
        let router = ConfigLoader::load_from_str(
            include_str!("../../../configs/router.toml"),
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert_eq!(router.routes.len(), 2);
        assert!(router.unrouted_channels().is_empty());

        let parity = ConfigLoader::load_from_str(
            include_str!("../../../configs/parity.json"),
            config_loader::ConfigFormat::Json,
        )
        .unwrap();
        assert_eq!(parity.channels.len(), 3);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("router.yaml");
        fs::write(&path, ROUTER_TOML).unwrap();
        assert!(ConfigLoader::load_from_path(&path).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use dispatcher::{
        cancel_pair, create_router, dispatch_all, CancelSignal, ContentBasedDispatcher,
        DispatchError, LogSink, OutputChannel, Record, RecordDispatcher, RoundRobinDispatcher,
        RoutingTable, SinkHandle,
    };
    use tempfile::tempdir;
    use tokio::sync::mpsc;
    use tokio::time::{timeout, Duration};

    fn drain<T>(rx: &mut mpsc::Receiver<Record<T>>) -> Vec<Record<T>> {
        let mut out = Vec::new();
        while let Ok(record) = rx.try_recv() {
            out.push(record);
        }
        out
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Value {
        Int(i64),
        Text(&'static str),
    }

    fn parity_dispatcher() -> (
        ContentBasedDispatcher<Value>,
        [mpsc::Receiver<Record<Value>>; 3],
    ) {
        let (q1, rx1) = OutputChannel::bounded("Q1", 8);
        let (q2, rx2) = OutputChannel::bounded("Q2", 8);
        let (q3, rx3) = OutputChannel::bounded("Q3", 8);

        let table = RoutingTable::builder()
            .when(|v: &Value| matches!(v, Value::Int(n) if n % 2 == 0))
            .dispatch_to(q1)
            .when(|v: &Value| matches!(v, Value::Int(n) if n % 2 != 0))
            .dispatch_to(q2)
            .otherwise(q3)
            .build()
            .unwrap();

        (ContentBasedDispatcher::new(table), [rx1, rx2, rx3])
    }

    /// {even→Q1, odd→Q2, default→Q3}: 4→Q1, 7→Q2, "x"→Q3, poison→all
    #[tokio::test]
    async fn test_parity_scenario() {
        let (dispatcher, [mut rx1, mut rx2, mut rx3]) = parity_dispatcher();

        dispatcher.dispatch(Record::data(Value::Int(4))).await.unwrap();
        dispatcher.dispatch(Record::data(Value::Int(7))).await.unwrap();
        dispatcher.dispatch(Record::data(Value::Text("x"))).await.unwrap();
        dispatcher.dispatch(Record::Poison).await.unwrap();

        assert_eq!(drain(&mut rx1), vec![Record::Data(Value::Int(4)), Record::Poison]);
        assert_eq!(drain(&mut rx2), vec![Record::Data(Value::Int(7)), Record::Poison]);
        assert_eq!(drain(&mut rx3), vec![Record::Data(Value::Text("x")), Record::Poison]);
    }

    #[tokio::test]
    async fn test_unmatched_without_default_is_dropped() {
        let (q1, mut rx1) = OutputChannel::bounded("Q1", 4);
        let table = RoutingTable::builder()
            .when(|n: &i64| *n > 100)
            .dispatch_to(q1)
            .build()
            .unwrap();
        let dispatcher = ContentBasedDispatcher::new(table);

        assert!(dispatcher.dispatch(Record::data(5)).await.is_ok());
        assert!(drain(&mut rx1).is_empty());
        assert_eq!(dispatcher.metrics().dropped_count(), 1);
    }

    /// Records reach consumers in per-producer order; poison stops every consumer.
    #[tokio::test]
    async fn test_consumers_stop_after_poison() {
        let (even, rx_even) = OutputChannel::bounded("even", 2);
        let (odd, rx_odd) = OutputChannel::bounded("odd", 2);
        let consumers = [
            SinkHandle::spawn(LogSink::new("even"), rx_even),
            SinkHandle::spawn(LogSink::new("odd"), rx_odd),
        ];

        let table = RoutingTable::builder()
            .when(|n: &u32| n % 2 == 0)
            .dispatch_to(even)
            .otherwise(odd)
            .build()
            .unwrap();
        let dispatcher = ContentBasedDispatcher::new(table);

        let sent = dispatch_all(&dispatcher, 0..50u32).await.unwrap();
        assert_eq!(sent, 50);

        for handle in consumers {
            let report = timeout(Duration::from_secs(5), handle.join()).await.unwrap();
            assert!(report.poisoned);
            assert_eq!(report.written, 25);
            assert_eq!(report.failures, 0);
        }
    }

    #[tokio::test]
    async fn test_concurrent_producers_share_dispatcher() {
        let (all, mut rx) = OutputChannel::bounded("all", 4);
        let table = RoutingTable::builder().otherwise(all).build().unwrap();
        let dispatcher = Arc::new(ContentBasedDispatcher::new(table));

        let mut producers = Vec::new();
        for p in 0..4u32 {
            let dispatcher = Arc::clone(&dispatcher);
            producers.push(tokio::spawn(async move {
                for i in 0..25u32 {
                    dispatcher.dispatch(Record::data((p, i))).await.unwrap();
                }
            }));
        }

        let mut last_seen = [None::<u32>; 4];
        for _ in 0..100 {
            let Some(Record::Data((p, i))) = rx.recv().await else {
                panic!("unexpected end of stream");
            };
            let slot = &mut last_seen[p as usize];
            assert!(slot.map_or(true, |prev| prev < i), "producer {p} out of order");
            *slot = Some(i);
        }
        for producer in producers {
            producer.await.unwrap();
        }
        assert_eq!(dispatcher.metrics().defaulted_count(), 100);
    }

    /// A dispatch blocked on a full channel unblocks on cancel; other channels are untouched.
    #[tokio::test]
    async fn test_cancel_blocked_dispatch() {
        let (full, mut rx_full) = OutputChannel::bounded("full", 1);
        let (free, mut rx_free) = OutputChannel::bounded("free", 4);
        let table = RoutingTable::builder()
            .when(|s: &String| s.starts_with("f:"))
            .dispatch_to(full)
            .otherwise(free)
            .build()
            .unwrap();

        let (handle, signal) = cancel_pair();
        let dispatcher = Arc::new(ContentBasedDispatcher::new(table).with_cancel_signal(signal));

        dispatcher.dispatch(Record::data("f:1".to_string())).await.unwrap();

        let blocked = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.dispatch(Record::data("f:2".to_string())).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        handle.cancel();
        let result = timeout(Duration::from_secs(1), blocked).await.unwrap().unwrap();
        match result {
            Err(DispatchError::Cancelled { channel, .. }) => assert_eq!(channel, "full"),
            other => panic!("expected cancellation, got {other:?}"),
        }

        assert_eq!(drain(&mut rx_full), vec![Record::Data("f:1".to_string())]);
        assert!(drain(&mut rx_free).is_empty());

        // An already fired signal fails the next enqueue at once, even with room.
        let err = dispatcher.dispatch(Record::data("other".to_string())).await;
        assert!(matches!(err, Err(DispatchError::Cancelled { .. })));
        let ok = dispatcher
            .dispatch_with(Record::data("other".to_string()), &CancelSignal::never())
            .await;
        assert!(ok.is_ok());
        assert_eq!(drain(&mut rx_free), vec![Record::Data("other".to_string())]);
    }

    #[tokio::test]
    async fn test_round_robin_spreads_and_poisons() {
        let (a, mut rx_a) = OutputChannel::bounded("a", 8);
        let (b, mut rx_b) = OutputChannel::bounded("b", 8);
        let (c, mut rx_c) = OutputChannel::bounded("c", 8);
        let dispatcher = RoundRobinDispatcher::new(vec![a, b, c]);

        dispatch_all(&dispatcher, 0..6u8).await.unwrap();

        assert_eq!(
            drain(&mut rx_a),
            vec![Record::Data(0), Record::Data(3), Record::Poison]
        );
        assert_eq!(
            drain(&mut rx_b),
            vec![Record::Data(1), Record::Data(4), Record::Poison]
        );
        assert_eq!(
            drain(&mut rx_c),
            vec![Record::Data(2), Record::Data(5), Record::Poison]
        );
    }

    /// Config text → router → file consumers, the way the CLI runs it.
    #[tokio::test]
    async fn test_config_to_file_sinks() {
        let dir = tempdir().unwrap();
        let out = |name: &str| dir.path().join(format!("{name}.log"));
        let toml = format!(
            r#"
[router]
default_channel = "info"

[[channels]]
name = "errors"
capacity = 2
sink = "file"
params = {{ path = "{errors}" }}

[[channels]]
name = "info"
capacity = 2
sink = "file"
params = {{ path = "{info}" }}

[[routes]]
channel = "errors"
matcher = {{ kind = "regex", pattern = "^(ERROR|FATAL)" }}
"#,
            errors = out("errors").display(),
            info = out("info").display(),
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let runtime = create_router(&blueprint, CancelSignal::never()).unwrap();
        let lines = [
            "ERROR disk full",
            "INFO started",
            "FATAL panic",
            "DEBUG ERROR in text",
            "INFO done",
        ];
        dispatch_all(&runtime.router, lines.iter().map(|l| l.to_string()))
            .await
            .unwrap();

        let reports = timeout(Duration::from_secs(5), runtime.shutdown())
            .await
            .unwrap();
        assert!(reports.iter().all(|r| r.poisoned && r.failures == 0));

        assert_eq!(
            fs::read_to_string(out("errors")).unwrap(),
            "ERROR disk full\nFATAL panic\n"
        );
        assert_eq!(
            fs::read_to_string(out("info")).unwrap(),
            "INFO started\nDEBUG ERROR in text\nINFO done\n"
        );
    }

    #[tokio::test]
    async fn test_latency_stats_over_dispatch() {
        let (q, _rx) = OutputChannel::bounded("q", 64);
        let table = RoutingTable::builder().otherwise(q).build().unwrap();
        let dispatcher = ContentBasedDispatcher::new(table);

        let mut stats = observability::LatencyStats::default();
        for i in 0..32u32 {
            let start = std::time::Instant::now();
            dispatcher.dispatch(Record::data(i)).await.unwrap();
            stats.push(start.elapsed().as_secs_f64() * 1000.0);
        }

        let summary = stats.summary();
        assert_eq!(summary.count, 32);
        assert!(summary.min_ms <= summary.mean_ms && summary.mean_ms <= summary.max_ms);
    }
}
