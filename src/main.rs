// src/main.rs

use chrono::{Datelike, Local, Utc};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Instant;
use tokei_lib::config::Settings;
use tokei_lib::feedback::{Feedback, LogFeedback, Muted};
use tokei_lib::repository::{ProfileRepository, SqliteRepository};
use tokei_lib::{database, pedagogy};
use tokei_lib::{
    Answer, ClockTime, LevelConfig, LevelSession, Question, QuestionGenerator, QuestionKind,
    SessionStep, SystemClock,
};

#[derive(Debug, PartialEq)]
enum Command {
    Practice(u32),
    Clock,
    Play,
    Report,
    Reset,
}

fn parse_command(args: &[String]) -> Command {
    match args.first().map(String::as_str) {
        Some("practice") => Command::Practice(parse_level(args.get(1).map(String::as_str))),
        Some("clock") => Command::Clock,
        Some("play") => Command::Play,
        Some("report") => Command::Report,
        Some("reset") => Command::Reset,
        level => Command::Practice(parse_level(level)),
    }
}

fn parse_level(arg: Option<&str>) -> u32 {
    match arg.map(str::parse::<u32>) {
        None => 1,
        Some(Ok(level)) => level,
        Some(Err(_)) => {
            warn!("Unknown command or level {:?}, practicing level 1", arg.unwrap_or_default());
            1
        }
    }
}

fn main() {
    let settings = Settings::from_env();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_filter.as_str()),
    )
    .init();

    info!("Starting Tokei tutor...");
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&settings, parse_command(&args)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(settings: &Settings, command: Command) -> Result<(), Box<dyn Error>> {
    info!("Database path: {:?}", settings.db_path);
    let conn = Connection::open(&settings.db_path)?;
    database::init_db(&conn)?;
    let profile_id = database::ensure_profile(&conn, &settings.child_name, Utc::now())?;
    let mut repo = SqliteRepository::new(conn, profile_id);
    seed_birth_date(settings, &mut repo)?;

    match command {
        Command::Practice(level) => practice(settings, &mut repo, level),
        Command::Clock => {
            let config = LevelConfig::home();
            let now = ClockTime::current(&SystemClock);
            println!("{}  {}", now, describe_clock(&now, &config));
            feedback(settings).speak_time(&now);
            Ok(())
        }
        Command::Play => play(settings),
        Command::Report => {
            let report = pedagogy::progress_report(&repo, Utc::now())?;
            println!("{}", report.to_json()?);
            for skill in pedagogy::due_reviews(&repo, Utc::now())? {
                println!("{} {}", skill.mastery_level(), skill.skill_id);
            }
            Ok(())
        }
        Command::Reset => {
            repo.delete_all()?;
            println!("がくしゅう データを リセット しました");
            Ok(())
        }
    }
}

fn feedback(settings: &Settings) -> LogFeedback {
    LogFeedback {
        sound_enabled: settings.sound_enabled,
        haptics_enabled: settings.haptics_enabled,
    }
}

/// A fresh profile gets a birth date matching the configured age.
fn seed_birth_date(settings: &Settings, repo: &mut SqliteRepository) -> Result<(), Box<dyn Error>> {
    let Some(mut profile) = repo.load_profile()? else {
        return Ok(());
    };
    if profile.birth_date.is_some() {
        return Ok(());
    }
    let today = Local::now().date_naive();
    profile.birth_date = today.with_year(today.year() - settings.child_age as i32);
    repo.save_profile(&profile)?;
    debug!("Seeded birth date {:?} for age {}", profile.birth_date, settings.child_age);
    Ok(())
}

/// Free play: every typed time is shown on the sandbox clock and read aloud.
fn play(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let config = LevelConfig::sandbox();
    let feedback: Box<dyn Feedback> = if settings.sound_enabled || settings.haptics_enabled {
        Box::new(feedback(settings))
    } else {
        Box::new(Muted)
    };
    println!("{} (H:MM)", config.title);
    for line in io::stdin().lock().lines() {
        let line = line?;
        match parse_time(line.trim()) {
            Some(time) => {
                println!("{}  {}", time, describe_clock(&time, &config));
                feedback.speak_time(&time);
            }
            None => println!("もういちど いれてね"),
        }
    }
    Ok(())
}

fn practice(settings: &Settings, repo: &mut SqliteRepository, level: u32) -> Result<(), Box<dyn Error>> {
    let config = LevelConfig::level(level);
    let feedback = feedback(settings);
    let mut generator = QuestionGenerator::new(rand::thread_rng());
    let mut session = LevelSession::new(config.id);
    let started = Instant::now();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{} ({})", config.title, config.subtitle);
    while let Some(question) = session.next_question(&mut generator) {
        println!();
        println!(
            "[{}] {}/{}  {}",
            session.phase().label(),
            session.questions_answered(),
            session.total_questions(),
            session.phase().description()
        );
        show_question(&question, config);

        let asked = Instant::now();
        let answer = loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                info!("Input closed, ending session early");
                return finish(repo, started);
            };
            match parse_answer(&question, config, line?.trim()) {
                Some(answer) => break answer,
                None => println!("もういちど いれてね"),
            }
        };

        let outcome = pedagogy::process_attempt(
            repo,
            &feedback,
            &question,
            &answer,
            config,
            asked.elapsed().as_secs_f64(),
            Utc::now(),
        )?;

        if outcome.correct {
            println!("せいかい！  {}", outcome.mastery_level());
        } else {
            println!("もういちど  ({})", question.target.japanese_reading());
        }

        if let SessionStep::Complete { correct, total } = session.record_answer(outcome.correct) {
            println!();
            println!("おわり！ {}/{} せいかい", correct, total);
        }
    }

    finish(repo, started)
}

fn finish(repo: &mut SqliteRepository, started: Instant) -> Result<(), Box<dyn Error>> {
    pedagogy::finish_session(repo, started.elapsed().as_secs_f64(), Local::now().date_naive())?;
    Ok(())
}

fn describe_clock(time: &ClockTime, config: &LevelConfig) -> String {
    if config.show_minute_hand {
        format!(
            "みじかいはり {:.1}° / ながいはり {:.0}°",
            time.hour_angle(),
            time.minute_angle()
        )
    } else {
        format!("みじかいはり {:.0}°", time.hour_angle())
    }
}

fn show_question(question: &Question, config: &LevelConfig) {
    println!("{}", question.prompt);
    match &question.kind {
        QuestionKind::MatchEvent { event_name } => {
            println!("{}  {}", event_name, describe_clock(&question.target, config));
            println!("(Enter で つぎへ)");
        }
        QuestionKind::ChooseTime { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, describe_clock(option, config));
            }
        }
        QuestionKind::ReadTime => {
            println!("{}", describe_clock(&question.target, config));
            if config.id == 1 {
                println!("(1-12)");
            } else {
                println!("(H:MM)");
            }
        }
        QuestionKind::SetTime => println!("(H:MM)"),
        QuestionKind::CalculateTime {
            start,
            duration_minutes,
        } => {
            println!("はじめ {}  +{}ふん", describe_clock(start, config), duration_minutes);
            println!("おわり (H:MM)");
        }
    }
}

fn parse_answer(question: &Question, config: &LevelConfig, input: &str) -> Option<Answer> {
    debug!("Raw answer {:?} for {}", input, question.kind.name());
    match &question.kind {
        QuestionKind::MatchEvent { .. } => Some(Answer::Acknowledged),
        QuestionKind::ChooseTime { .. } => input
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| Answer::Choice(n - 1)),
        QuestionKind::ReadTime if config.id == 1 => input.parse().ok().map(Answer::Hour),
        _ => parse_time(input).map(|t| {
            // Typed minutes land on the level's grid, as a dragged hand would.
            let step = config.minute_granularity.max(1);
            Answer::Time(ClockTime::new(t.hour(), (t.minute() / step) * step))
        }),
    }
}

fn parse_time(input: &str) -> Option<ClockTime> {
    let (h, m) = match input.split_once(':') {
        Some((h, m)) => (h.trim().parse().ok()?, m.trim().parse().ok()?),
        None => (input.parse().ok()?, 0),
    };
    Some(ClockTime::new(h, m))
}
