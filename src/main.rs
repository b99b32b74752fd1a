use clap::{Parser, Subcommand};
use dictation::playback::{
    build_schedule, play_schedule, render_schedule, ClipCache, LogSink, ScheduleTiming,
    SystemClock, WavDirectoryLoader,
};
use dictation::question::{builtin_pool, preload_asset_keys, required_asset_keys};
use dictation::{
    normalize, to_asset_key, to_display, Question, QuizConfig, QuizError, QuizSession,
    NOTE_PALETTE,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Melodic dictation ear-training quiz
#[derive(Parser)]
#[command(name = "dictation")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the quiz interactively
    Quiz {
        /// Seed for reproducible question draws
        #[arg(long)]
        seed: Option<u64>,

        /// Render each played question to a WAV file in this directory
        /// instead of playing it in real time
        #[arg(long)]
        render_dir: Option<PathBuf>,

        /// Sample rate of rendered files
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },

    /// Show the canonical, display and asset-key forms of note tokens
    Normalize {
        #[arg(required = true)]
        tokens: Vec<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a question (e.g. "do re mi fa") to a WAV file
    Render {
        question: String,

        #[arg(short, long)]
        output: PathBuf,

        /// Seconds between question notes
        #[arg(short, long)]
        duration: Option<f64>,

        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },

    /// Validate the built-in question pool and list the clips it needs
    CheckPool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NormalizedToken {
    token: String,
    canonical: String,
    display: String,
    asset_key: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), QuizError> {
    let mut config = match &cli.config {
        Some(path) => QuizConfig::from_file(path)?,
        None => QuizConfig::default(),
    };

    match cli.command {
        Commands::Quiz {
            seed,
            render_dir,
            sample_rate,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            run_quiz(config, render_dir.as_deref(), sample_rate)
        }
        Commands::Normalize { tokens, json } => run_normalize(&tokens, json),
        Commands::Render {
            question,
            output,
            duration,
            sample_rate,
        } => {
            if let Some(d) = duration {
                config.note_duration = config.clamp_duration(d);
            }
            let question = Question::parse(&question)?;
            render_question(&config, &question, config.note_duration, &output, sample_rate, None)
        }
        Commands::CheckPool => run_check_pool(&config),
    }
}

fn run_normalize(tokens: &[String], json: bool) -> Result<(), QuizError> {
    let mut rows = Vec::with_capacity(tokens.len());
    for token in tokens {
        let note = normalize(token)?;
        rows.push(NormalizedToken {
            token: token.clone(),
            canonical: note.to_string(),
            display: to_display(&note),
            asset_key: to_asset_key(&note),
        });
    }

    if json {
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| QuizError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        println!("{}", out);
    } else {
        for row in rows {
            println!(
                "{:<8} {:<5} {:<6} {}",
                row.token, row.canonical, row.display, row.asset_key
            );
        }
    }
    Ok(())
}

fn run_check_pool(config: &QuizConfig) -> Result<(), QuizError> {
    let pool = builtin_pool()?;
    let keys = required_asset_keys(&pool, &config.reference_note);
    println!("{} questions OK", pool.len());
    println!("Clips needed ({}):", keys.len());
    for key in &keys {
        let path = config.asset_path(key);
        let status = if path.exists() { "found" } else { "missing" };
        println!("  {:<4} {} ({})", key, path.display(), status);
    }
    Ok(())
}

fn render_question(
    config: &QuizConfig,
    question: &Question,
    note_duration: f64,
    output: &Path,
    sample_rate: u32,
    cache: Option<&mut ClipCache<WavDirectoryLoader>>,
) -> Result<(), QuizError> {
    let mut local;
    let cache = match cache {
        Some(cache) => cache,
        None => {
            local = ClipCache::new(WavDirectoryLoader::new(
                &config.asset_dir,
                &config.asset_extension,
            ));
            &mut local
        }
    };

    let timing = ScheduleTiming::from_config(config, note_duration);
    let schedule = build_schedule(&config.reference_note, question.notes(), &timing);
    let summary = render_schedule(&schedule, cache, sample_rate, output)?;

    if !summary.is_complete() {
        eprintln!("Warning: silent notes: {}", summary.skipped.join(", "));
    }
    eprintln!("Wrote {}", output.display());
    Ok(())
}

fn print_help(config: &QuizConfig) {
    println!("Notes: {}", NOTE_PALETTE.join(" "));
    println!("Commands:");
    println!("  <note>      add a note to the answer");
    println!("  #           next note is sharp");
    println!("  play        listen to the question");
    println!("  clear       clear the answer");
    println!("  submit      check the answer");
    println!("  next        skip to the next question");
    println!(
        "  dur <secs>  time between notes ({:.2}-{:.2})",
        config.min_duration, config.max_duration
    );
    println!("  quit        stop the quiz");
}

fn print_status<R: rand::Rng>(session: &QuizSession<R>) {
    println!(
        "Question {} of {}    Score: {}",
        session.question_number(),
        session.total_questions(),
        session.score()
    );
}

fn run_quiz(
    config: QuizConfig,
    render_dir: Option<&Path>,
    sample_rate: u32,
) -> Result<(), QuizError> {
    let mut cache = ClipCache::new(WavDirectoryLoader::new(
        &config.asset_dir,
        &config.asset_extension,
    ));
    let failed = cache.preload(&preload_asset_keys()?);
    if !failed.is_empty() {
        eprintln!(
            "Warning: {} clips could not be loaded from {}; those notes will be silent",
            failed.len(),
            config.asset_dir.display()
        );
    }

    let mut session = QuizSession::from_config(config.clone(), builtin_pool()?)?;
    session.start()?;
    print_help(&config);
    print_status(&session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if session.is_finished() {
            break;
        }
        print!("> ");
        io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let input = line.trim();
        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "help" | "?" => print_help(&config),
            "quit" | "exit" => break,
            "#" | "sharp" => {
                let on = session.toggle_sharp();
                println!("Sharp {}", if on { "on" } else { "off" });
            }
            "clear" => {
                session.clear_answer();
                println!("Answer: []");
            }
            "dur" => match argument.parse::<f64>() {
                Ok(secs) => println!("Note duration: {:.2} s", session.set_note_duration(secs)),
                Err(_) => println!("Usage: dur <seconds>"),
            },
            "play" => {
                let question = match session.current_question() {
                    Some(q) => q.clone(),
                    None => continue,
                };
                match render_dir {
                    Some(dir) => {
                        let path = dir.join(format!("question-{:02}.wav", session.question_number()));
                        if let Err(e) = render_question(
                            &config,
                            &question,
                            session.note_duration(),
                            &path,
                            sample_rate,
                            Some(&mut cache),
                        ) {
                            log::warn!("Rendering {} failed: {}", path.display(), e);
                            eprintln!("Could not render the question: {}", e);
                        }
                    }
                    None => {
                        let timing = ScheduleTiming::from_config(&config, session.note_duration());
                        let schedule =
                            build_schedule(&config.reference_note, question.notes(), &timing);
                        let mut sink = LogSink::new();
                        let summary =
                            play_schedule(&schedule, &mut cache, &mut SystemClock::new(), &mut sink);
                        println!(
                            "Played {} of {} notes",
                            summary.played.len(),
                            schedule.events.len()
                        );
                    }
                }
            }
            "next" => {
                session.next_question()?;
                if !session.is_finished() {
                    print_status(&session);
                }
            }
            "submit" => match session.submit_answer() {
                Ok(verdict) => {
                    if verdict.correct {
                        println!("Correct!");
                    } else {
                        println!("Wrong answer.");
                        println!("  Correct:     {}", verdict.expected_display());
                        println!("  Your answer: {}", verdict.given_display());
                    }
                    if verdict.advanced && !verdict.finished {
                        print_status(&session);
                    }
                }
                Err(QuizError::IncompleteAnswer { required, .. }) => {
                    println!("You must enter all {} notes.", required);
                }
                Err(e) => return Err(e),
            },
            _ => match session.append_note(input) {
                Ok(true) => println!("Answer: [{}]", session.answer_display()?),
                Ok(false) => println!("The answer already has 4 notes."),
                Err(e) => println!("{}", e),
            },
        }
    }

    let report = session.report();
    println!(
        "Quiz over. Final score: {} / {}",
        report.score, report.max_score
    );
    Ok(())
}
