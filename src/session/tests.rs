//! Tests for session state and background requests

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::analyzer::SolverConfig;
    use crate::constants::access_flags::access_flags::{PRIVATE, PUBLIC};
    use crate::corpus::Corpus;
    use crate::errors::{EvalError, FingerprintError, FingerprintResult};
    use crate::models::{Instruction, Member, MethodDef};
    use crate::resolver::Predicate;

    fn method(id: &str, flags: u32, string: &str) -> Member {
        Member::from(MethodDef::new(id, flags, "I").with_instruction(Instruction::const_string(string)))
    }

    fn corpus(id: &str) -> Corpus {
        Corpus::new(
            id,
            vec![
                method("LA;->m1()I", PUBLIC, "a"),
                method("LA;->m2()I", PUBLIC, "b"),
                method("LA;->m3()I", PRIVATE, "a"),
            ],
        )
    }

    /// Provider whose enumeration always fails
    struct BrokenProvider;

    impl CorpusProvider for BrokenProvider {
        fn corpus_id(&self) -> String {
            "broken".to_string()
        }

        fn members(&self) -> FingerprintResult<Vec<Member>> {
            Err(FingerprintError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "dex file vanished",
            )))
        }
    }

    /// Evaluator that accepts anything and matches everything
    struct MatchAll;

    impl PredicateEvaluator for MatchAll {
        fn evaluate(&self, _source: &str) -> Result<Predicate, EvalError> {
            Ok(Predicate::default())
        }
    }

    #[test]
    fn test_requests_need_a_corpus() {
        let session = Session::new(SessionConfig::default());
        assert!(matches!(session.snapshot(), Err(FingerprintError::NoCorpusLoaded)));
        assert!(matches!(
            session.generate_fingerprints(&MethodId::from("LA;->m1()I")),
            Err(FingerprintError::NoCorpusLoaded)
        ));
        assert!(matches!(
            session.resolve_predicate("fingerprint { }"),
            Err(FingerprintError::NoCorpusLoaded)
        ));
        assert!(!session.is_current(0));
    }

    #[test]
    fn test_load_and_unload() {
        let session = Session::new(SessionConfig::default());
        let snapshot = session.load(&corpus("app-1.0")).unwrap();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.corpus_id(), "app-1.0");
        assert_eq!(snapshot.index.len(), 3);
        assert_eq!(snapshot.digest.len(), 64);
        assert!(session.is_current(1));

        session.unload();
        assert!(matches!(session.snapshot(), Err(FingerprintError::NoCorpusLoaded)));
        assert!(!session.is_current(1));
        // Holders of the old snapshot keep a usable index
        assert_eq!(snapshot.index.len(), 3);
    }

    #[test]
    fn test_reload_bumps_generation() {
        let session = Session::new(SessionConfig::default());
        let first = session.load(&corpus("app-1.0")).unwrap();
        let second = session.load(&corpus("app-1.0")).unwrap();

        assert!(second.generation > first.generation);
        assert!(!session.is_current(first.generation));
        assert!(session.is_current(second.generation));
        // Same content, same digest
        assert_eq!(first.digest, second.digest);

        let changed = Corpus::new("app-1.0", vec![method("LA;->m1()I", PUBLIC, "z")]);
        let third = session.load(&changed).unwrap();
        assert_ne!(third.digest, second.digest);
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let session = Session::new(SessionConfig::default());
        let loaded = session.load(&corpus("app-1.0")).unwrap();

        let result = session.load(&BrokenProvider);
        match result {
            Err(FingerprintError::IndexBuild { context, reason }) => {
                assert_eq!(context.corpus_id.as_deref(), Some("broken"));
                assert!(reason.contains("dex file vanished"));
            }
            other => panic!("expected IndexBuild, got {:?}", other),
        }

        let duplicate = Corpus::new(
            "dup",
            vec![method("LA;->m1()I", PUBLIC, "a"), method("LA;->m1()I", PUBLIC, "a")],
        );
        assert!(session.load(&duplicate).is_err());

        let current = session.snapshot().unwrap();
        assert_eq!(current.generation, loaded.generation);
        assert_eq!(current.corpus_id(), "app-1.0");
    }

    #[test]
    fn test_generate_fingerprints() {
        let session = Session::new(SessionConfig::default());
        let snapshot = session.load(&corpus("app-1.0")).unwrap();

        let report = session.generate_fingerprints(&MethodId::from("LA;->m1()I")).unwrap();
        assert_eq!(report.corpus_id, "app-1.0");
        assert_eq!(report.generation, snapshot.generation);
        assert_eq!(report.corpus_digest, snapshot.digest);
        assert_eq!(report.full_feature_count, 5);
        assert_eq!(report.fingerprints.len(), 1);

        let resolution = session
            .resolve_predicate(report.fingerprints[0].fingerprint.as_str())
            .unwrap();
        assert_eq!(resolution.method, report.method);
        assert!(resolution.is_unique());

        let unknown = session.generate_fingerprints(&MethodId::from("LA;->gone()V"));
        assert!(matches!(unknown, Err(FingerprintError::UnknownMethod(_))));
    }

    #[test]
    fn test_generate_with_unnamed_flag_bits() {
        let session = Session::new(SessionConfig::default());
        session
            .load(&Corpus::new(
                "odd-flags",
                vec![method("LA;->a()I", PUBLIC | 0x40000, "x"), method("LA;->b()I", PUBLIC, "y")],
            ))
            .unwrap();

        let report = session.generate_fingerprints(&MethodId::from("LA;->a()I")).unwrap();
        assert!(!report.fingerprints.is_empty());
        for set in &report.fingerprints {
            let resolution = session.resolve_predicate(set.fingerprint.as_str()).unwrap();
            assert_eq!(resolution.method.as_str(), "LA;->a()I");
            assert!(resolution.is_unique());
        }
    }

    #[test]
    fn test_config_reaches_solver() {
        let config = SessionConfig {
            solver: SolverConfig { max_sets: 1, ..SolverConfig::default() },
            ..SessionConfig::default()
        };
        let session = Session::new(config);
        session
            .load(&Corpus::new(
                "many",
                vec![
                    Member::from(
                        MethodDef::new("LA;->m1()V", PUBLIC, "V")
                            .with_instruction(Instruction::const_string("x"))
                            .with_instruction(Instruction::const_string("y")),
                    ),
                    Member::from(MethodDef::new("LA;->m2()V", PUBLIC, "V")),
                ],
            ))
            .unwrap();

        assert_eq!(session.config().solver.max_sets, 1);
        let report = session.generate_fingerprints(&MethodId::from("LA;->m1()V")).unwrap();
        assert_eq!(report.fingerprints.len(), 1);
    }

    #[test]
    fn test_broken_evaluator_fails_round_trip() {
        let session = Session::with_evaluator(SessionConfig::default(), Arc::new(MatchAll));
        session.load(&corpus("app-1.0")).unwrap();

        let result = session.generate_fingerprints(&MethodId::from("LA;->m1()I"));
        assert!(matches!(result, Err(FingerprintError::RoundTrip { .. })));
    }

    #[tokio::test]
    async fn test_spawn_fingerprint() {
        let session = Session::new(SessionConfig::default());
        let snapshot = session.load(&corpus("app-1.0")).unwrap();

        let task = session.spawn_fingerprint(MethodId::from("LA;->m3()I")).unwrap();
        assert_eq!(task.generation(), snapshot.generation);
        assert!(!task.is_cancelled());

        let report = task.wait().await.unwrap();
        assert_eq!(report.method.as_str(), "LA;->m3()I");
        assert!(report.fingerprints[0].fingerprint.as_str().contains("AccessFlags.PRIVATE"));
    }

    #[tokio::test]
    async fn test_spawned_request_survives_reload() {
        let session = Session::new(SessionConfig::default());
        session.load(&corpus("app-1.0")).unwrap();

        let task = session.spawn_fingerprint(MethodId::from("LA;->m1()I")).unwrap();
        let generation = task.generation();
        session.load(&corpus("app-1.1")).unwrap();

        let report = task.wait().await.unwrap();
        assert_eq!(report.corpus_id, "app-1.0");
        assert!(!session.is_current(generation));
    }

    #[tokio::test]
    async fn test_spawn_resolve() {
        let session = Session::new(SessionConfig::default());
        session.load(&corpus("app-1.0")).unwrap();

        let task = session
            .spawn_resolve("fingerprint { strings(\"b\") }".to_string())
            .unwrap();
        let resolution = task.wait().await.unwrap();
        assert_eq!(resolution.method.as_str(), "LA;->m2()I");

        let missing = session
            .spawn_resolve("fingerprint { strings(\"c\") }".to_string())
            .unwrap()
            .wait()
            .await;
        assert!(matches!(missing, Err(FingerprintError::MatchNotFound)));
    }

    #[tokio::test]
    async fn test_cancelled_request() {
        let session = Session::new(SessionConfig::default());
        session.load(&corpus("app-1.0")).unwrap();

        let task = session.spawn_fingerprint(MethodId::from("LA;->m1()I")).unwrap();
        task.cancel();
        assert!(task.is_cancelled());
        assert!(matches!(task.wait().await, Err(FingerprintError::Cancelled)));
    }

    #[tokio::test]
    async fn test_spawn_without_corpus() {
        let session = Session::new(SessionConfig::default());
        let result = session.spawn_fingerprint(MethodId::from("LA;->m1()I"));
        assert!(matches!(result, Err(FingerprintError::NoCorpusLoaded)));
    }
}
