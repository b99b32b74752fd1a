//! Integration tests for the dictation quiz
//!
//! Full quiz scenarios through the public API: normalization, grading,
//! session lifecycle and rendering a question to disk.

use dictation::playback::{
    play_schedule, ClipCache, VirtualClock, WavDirectoryLoader, WavRenderSink,
};
use dictation::question::{preload_asset_keys, required_asset_keys};
use dictation::{
    builtin_pool, normalize, schedule_question, to_asset_key, to_display, Phase, Question,
    QuizConfig, QuizError, QuizSession,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn single_question_session(line: &str, config: QuizConfig) -> QuizSession<StdRng> {
    let pool = vec![Question::parse(line).unwrap()];
    let mut session = QuizSession::new(config, pool, StdRng::seed_from_u64(42)).unwrap();
    session.start().unwrap();
    session
}

#[test]
fn test_display_and_asset_examples() {
    assert_eq!(to_display(&normalize("do4").unwrap()), "Do");
    assert_eq!(to_display(&normalize("re5").unwrap()), "Re5");
    assert_eq!(to_asset_key(&normalize("fa#4").unwrap()), "Fs4");
}

#[test]
fn test_correct_answer_scenario() {
    let mut session = single_question_session("do re mi fa", QuizConfig::default());
    for token in ["Do", "Re", "Mi", "Fa"] {
        assert!(session.append_note(token).unwrap());
    }

    let verdict = session.submit_answer().unwrap();
    assert!(verdict.correct);
    assert_eq!(session.score(), 250);
    assert_eq!(session.question_number(), 2);
    assert_eq!(session.phase(), Phase::AwaitingAnswer);
}

#[test]
fn test_wrong_order_scenario() {
    let mut session = single_question_session("fa sol la si", QuizConfig::default());
    for token in ["sol", "fa", "la", "si"] {
        session.append_note(token).unwrap();
    }

    let verdict = session.submit_answer().unwrap();
    assert!(!verdict.correct);
    assert_eq!(verdict.expected_display(), "Fa, Sol, La, Si");
    assert_eq!(verdict.given_display(), "Sol, Fa, La, Si");
    assert_eq!(session.score(), 0);
}

#[test]
fn test_full_quiz_reaches_terminal() {
    let pool = builtin_pool().unwrap();
    let mut session =
        QuizSession::new(QuizConfig::default(), pool, StdRng::seed_from_u64(2024)).unwrap();
    session.start().unwrap();

    let mut submitted = 0;
    while !session.is_finished() {
        let question = session.current_question().unwrap().clone();
        // Answer every other question correctly
        let tokens: Vec<String> = if submitted % 2 == 0 {
            question.tokens().to_vec()
        } else {
            vec!["do".to_string(); 4]
        };
        for token in &tokens {
            session.append_note(token).unwrap();
        }
        let verdict = session.submit_answer().unwrap();
        submitted += 1;
        assert_eq!(verdict.finished, submitted == 15);
    }

    assert_eq!(submitted, 15);
    assert_eq!(session.phase(), Phase::Terminal);
    let report = session.report();
    assert_eq!(report.max_score, 3750);
    assert_eq!(report.score % 250, 0);
    assert!(report.score >= 8 * 250);
    assert!(report.score <= report.max_score);
    assert!(matches!(session.submit_answer(), Err(QuizError::SessionFinished)));
}

#[test]
fn test_retry_mode_keeps_question_until_correct() {
    let config = QuizConfig {
        retry_on_incorrect: true,
        total_questions: 1,
        ..QuizConfig::default()
    };
    let mut session = single_question_session("re5 si sol re5", config);

    for _ in 0..3 {
        for token in ["re", "si", "sol", "re"] {
            session.append_note(token).unwrap();
        }
        let verdict = session.submit_answer().unwrap();
        assert!(!verdict.correct);
        assert_eq!(verdict.expected_display(), "Re5, Si, Sol, Re5");
        assert_eq!(verdict.given_display(), "Re, Si, Sol, Re");
        assert!(!session.is_finished());
    }

    for token in ["re5", "si4", "sol4", "re5"] {
        session.append_note(token).unwrap();
    }
    let verdict = session.submit_answer().unwrap();
    assert!(verdict.correct);
    assert!(verdict.finished);
    assert_eq!(session.report().score, 250);
}

#[test]
fn test_incomplete_answer_is_not_fatal() {
    let mut session = single_question_session("do re mi fa", QuizConfig::default());
    session.append_note("do").unwrap();
    let err = session.submit_answer().unwrap_err();
    assert_eq!(err.to_string(), "You must enter all 4 notes (entered 1)");

    for token in ["re", "mi", "fa"] {
        session.append_note(token).unwrap();
    }
    assert!(session.submit_answer().unwrap().correct);
}

#[test]
fn test_config_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.yaml");
    std::fs::write(&path, "total-questions: 2\nreward: 10\nseed: 9\n").unwrap();

    let config = QuizConfig::from_file(&path).unwrap();
    let mut session = QuizSession::from_config(config, builtin_pool().unwrap()).unwrap();
    session.start().unwrap();
    assert_eq!(session.max_score(), 20);

    session.next_question().unwrap();
    session.next_question().unwrap();
    assert!(session.is_finished());
}

#[test]
fn test_seeded_sessions_draw_the_same_questions() {
    let config = QuizConfig {
        seed: Some(11),
        ..QuizConfig::default()
    };
    let draw = || {
        let mut session =
            QuizSession::from_config(config.clone(), builtin_pool().unwrap()).unwrap();
        session.start().unwrap();
        let mut drawn = Vec::new();
        while let Some(q) = session.current_question() {
            drawn.push(q.to_string());
            session.next_question().unwrap();
        }
        drawn
    };
    let first = draw();
    assert_eq!(first.len(), 15);
    assert_eq!(first, draw());
}

#[test]
fn test_render_question_from_asset_directory() {
    let dir = tempfile::tempdir().unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 1_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let config = QuizConfig {
        asset_dir: dir.path().to_path_buf(),
        ..QuizConfig::default()
    };

    // Write a clip for every note the pool needs except F#4
    let pool = builtin_pool().unwrap();
    for key in required_asset_keys(&pool, &config.reference_note) {
        if key == "Fs4" {
            continue;
        }
        let mut writer = hound::WavWriter::create(config.asset_path(&key), spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(8_000i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    let mut cache = ClipCache::new(WavDirectoryLoader::new(
        &config.asset_dir,
        &config.asset_extension,
    ));
    let failed = cache.preload(&preload_asset_keys().unwrap());
    assert!(failed.contains(&"Fs4".to_string()));

    let schedule = schedule_question("sol fa# sol la", &config).unwrap();
    let mut sink = WavRenderSink::new(1_000);
    let summary = play_schedule(&schedule, &mut cache, &mut VirtualClock::new(), &mut sink);
    assert_eq!(summary.played, vec!["C4", "G4", "G4", "A4"]);
    assert_eq!(summary.skipped, vec!["Fs4"]);

    let out = dir.path().join("question.wav");
    sink.write_wav(&out).unwrap();
    let reader = hound::WavReader::open(&out).unwrap();
    // 0.2 lead-in + 1.0 gap + 4 * 0.5
    assert_eq!(reader.len(), 3_200);
}
