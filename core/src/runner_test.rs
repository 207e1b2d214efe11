#[cfg(test)]
mod tests {
    use crate::alloc_stats::HeapCounters;
    use crate::config::BenchConfig;
    use crate::context::ExecContext;
    use crate::pair::reference_chain;
    use crate::runner::*;
    use crate::sink::Sink;
    use crate::strategy::Case;
    use std::time::Duration;

    #[test]
    fn test_measure_doubles_from_start() {
        let mut seen = Vec::new();
        let m = measure(256, Duration::from_millis(10), |n| {
            seen.push(n);
            Duration::from_millis(3)
        });
        assert_eq!(seen, vec![256, 512, 1024, 2048]);
        assert_eq!(m.rounds, seen);
        assert_eq!(m.total_iterations, 256 + 512 + 1024 + 2048);
        assert_eq!(m.total_time, Duration::from_millis(12));
    }

    #[test]
    fn test_measure_stops_exactly_at_threshold() {
        let m = measure(256, Duration::from_millis(4), |_| Duration::from_millis(2));
        assert_eq!(m.rounds, vec![256, 512]);
    }

    #[test]
    fn test_measure_zero_min_time_runs_nothing() {
        let m = measure(256, Duration::ZERO, |_| panic!("no round expected"));
        assert_eq!(m, Measurement::default());
        assert_eq!(m.ns_per_iteration(), 0.0);
    }

    #[test]
    fn test_measure_terminates_with_growing_real_work() {
        let mut ctx = ExecContext::new();
        let mut sink = Sink::with_seed(1);
        let m = measure(256, Duration::from_millis(2), |n| time_case(Case::Inline, n, &mut ctx, &mut sink));
        assert!(m.total_time >= Duration::from_millis(2));
        assert_eq!(m.rounds[0], 256);
        for pair in m.rounds.windows(2) {
            assert_eq!(pair[1], pair[0] * 2);
        }
    }

    #[test]
    fn test_time_case_folds_result_into_sink() {
        let mut ctx = ExecContext::new();
        let mut sink = Sink::with_seed(0x1234_5678);
        time_case(Case::ReusedContainer, 300, &mut ctx, &mut sink);
        assert_eq!(sink.value(), 0x1234_5678 ^ reference_chain(300, 0x1234_5678));
    }

    #[test]
    fn test_report_line_format() {
        let m = Measurement {
            total_time: Duration::from_millis(3000),
            total_iterations: 1_000_000_000,
            rounds: vec![],
        };
        let heap = HeapCounters {
            events: 12,
            nanos: 30_000_000,
        };
        let report = CaseReport::new(Case::FreshAlloc, &m, heap);
        assert_eq!(report.total_ms, 3000);
        assert_eq!(report.heap_ms, 30);
        assert!((report.heap_percent - 1.0).abs() < 1e-9);
        assert_eq!(
            report.to_string(),
            "using Box::new                      :   3.000ns/it; GC: #12 30ms 1.00%; 1000000000 iters"
        );
    }

    #[test]
    fn test_report_serializes_case_key() {
        let report = CaseReport::new(Case::GlobalSlot, &Measurement::default(), HeapCounters::default());
        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["case"], "global_slot");
        assert_eq!(json["label"], "using static vars (not thread-safe)");
        assert_eq!(json["heap_percent"], 0.0);
    }

    #[test]
    fn test_runner_reports_only_measure_pass() {
        let config = BenchConfig {
            warmup_ms: 1,
            measure_ms: 1,
            start_iterations: 16,
            cases: vec!["inline".into(), "fresh_container".into()],
            alloc_timing: false,
        };
        let mut runner = Runner::new(config, ExecContext::new(), Sink::with_seed(7)).expect("valid config");
        assert_eq!(runner.cases(), &[Case::Inline, Case::FreshContainer]);
        assert!(runner.run_pass(Pass::Warmup).is_empty());

        let mut banners = Vec::new();
        let mut streamed = 0;
        let reports = runner.run_with(|event| match event {
            RunEvent::Banner(text) => banners.push(text),
            RunEvent::Report(_) => streamed += 1,
        });
        assert_eq!(banners, vec!["warmup...", "testing..."]);
        assert_eq!(streamed, 2);
        let cases: Vec<Case> = reports.iter().map(|r| r.case).collect();
        assert_eq!(cases, vec![Case::Inline, Case::FreshContainer]);
        for r in &reports {
            assert!(r.total_iterations >= 16);
            assert!(r.ns_per_iteration > 0.0);
        }
    }

    #[test]
    fn test_runner_rejects_invalid_config() {
        let config = BenchConfig {
            cases: vec!["missing".into()],
            ..BenchConfig::default()
        };
        assert!(Runner::new(config, ExecContext::new(), Sink::with_seed(0)).is_err());
    }
}
