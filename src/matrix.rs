use log::{debug, info, warn};

use priority_matrix::*;
use snafu::{prelude::*, Snafu};

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::*;
use crate::matrix::config_reader::*;
use crate::matrix::file_store::FileStore;
use crate::matrix::io_common::now_millis;

mod config_reader;
mod file_store;
mod io_common;
mod io_csv;
mod io_excel;

pub const DEFAULT_STORE_PATH: &str = "prioriza_session.json";
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MatrixCliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file has no worksheet or no row"))]
    EmptyExcel {},
    #[snafu(display("Worksheet {name} not found"))]
    MissingWorksheet { name: String },
    #[snafu(display("Line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error reading or writing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Initiative {id} not found"))]
    NotFound { id: String },
    #[snafu(display("{source}"))]
    Matrix { source: MatrixErrors },
    #[snafu(display(
        "The session already holds {count} initiatives, pass --replace to remove them"
    ))]
    ReplaceNotConfirmed { count: usize },
    #[snafu(display("Difference detected between computed summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MatrixResult<T> = Result<T, MatrixCliError>;

/// Resolved settings shared by all the commands.
#[derive(Debug, Clone)]
struct Settings {
    store_path: String,
    session_id: Option<String>,
    roster: TeamRoster,
}

fn read_settings(args: &Args) -> MatrixResult<Settings> {
    let config = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let roster = match &config {
        Some(c) => c.roster()?,
        None => TeamRoster::default(),
    };
    let session_id = args
        .session
        .clone()
        .or_else(|| config.and_then(|c| c.session_id));
    let ctx = Settings {
        store_path: args
            .store
            .clone()
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
        session_id,
        roster,
    };
    debug!("context: {:?}", ctx);
    Ok(ctx)
}

fn open_store(ctx: &Settings) -> MatrixResult<FileStore> {
    FileStore::open(&ctx.store_path, ctx.session_id.as_deref())
}

fn run_ingest(ctx: &Settings, a: &IngestArgs) -> MatrixResult<()> {
    let records = match a.input_type.as_deref().unwrap_or("csv") {
        "csv" => io_csv::read_csv_backlog(&a.input)?,
        "xlsx" => io_excel::read_excel_backlog(&a.input, a.excel_worksheet_name.as_deref())?,
        x => whatever!("Input type not supported {:?}", x),
    };

    let mut store = open_store(ctx)?;
    let count = store.snapshot().initiatives.len();
    if count > 0 && !a.replace {
        return ReplaceNotConfirmedSnafu { count }.fail();
    }

    let ids = store.replace_all(records)?;
    println!(
        "Loaded {} initiatives in session {:?}",
        ids.len(),
        store.session_id()
    );
    Ok(())
}

fn run_vote(ctx: &Settings, a: &VoteArgs) -> MatrixResult<()> {
    let mut store = open_store(ctx)?;
    let session = Rc::new(RefCell::new(Session::new(ctx.roster.clone())));
    {
        let mut s = session.borrow_mut();
        s.apply(SessionEvent::JoinSession(store.session_id().to_string()))
            .context(MatrixSnafu {})?;
        let user = User::new(&a.user_id, &a.user_name, &a.user_team);
        s.apply(SessionEvent::Login(user)).context(MatrixSnafu {})?;
        s.apply(SessionEvent::Navigate(View::Voting))
            .context(MatrixSnafu {})?;
    }

    let inbox = Rc::clone(&session);
    let feed = store.subscribe(Box::new(move |snap: &Snapshot| {
        inbox.borrow_mut().receive_snapshot(snap.clone())
    }));

    let update = session
        .borrow()
        .vote(&a.initiative, a.impact, a.complexity, now_millis())
        .context(MatrixSnafu {})?;
    store.update_votes(&update.initiative_id, update.votes)?;
    feed.cancel();

    let s = session.borrow();
    let next = s.current_item().context(MatrixSnafu {})?;
    match next {
        Some(i) => println!("Next: {}\t{}\t{}\t{}", i.id, i.priority, i.team, i.name),
        None => println!("All initiatives scored by {}", a.user_name),
    }
    Ok(())
}

fn run_queue(ctx: &Settings, a: &QueueArgs) -> MatrixResult<()> {
    let store = open_store(ctx)?;
    let snapshot = store.snapshot();
    let queue = build_queue(&snapshot.initiatives, &a.user_id);
    if queue.is_empty() {
        println!("All {} initiatives scored", snapshot.initiatives.len());
        return Ok(());
    }
    let shown = if a.all { queue.len() } else { 1 };
    for i in queue.iter().take(shown) {
        println!("{}\t{}\t{}\t{}", i.id, i.priority, i.team, i.name);
    }
    Ok(())
}

fn build_summary_js(
    session_id: &str,
    roster: &TeamRoster,
    filter: &MatrixFilter,
    shown: &[&PlottedInitiative],
    total: usize,
) -> JSValue {
    let results: Vec<JSValue> = shown
        .iter()
        .map(|p| {
            let i = &p.initiative;
            json!({
                "id": i.id,
                "name": i.name,
                "team": i.team,
                "priority": i.priority.label(),
                "votes": i.votes().len(),
                "avgImpact": p.coordinates.avg_impact,
                "avgComplexity": p.coordinates.avg_complexity,
                "quadrant": p.quadrant().label(),
            })
        })
        .collect();
    json!({
        "config": {
            "session": session_id,
            "oversightTeam": roster.oversight_team(),
            "team": filter.team,
            "priority": filter.priority.map(|p| p.label()),
        },
        "plotted": total,
        "results": results,
    })
}

fn run_matrix(ctx: &Settings, a: &MatrixArgs) -> MatrixResult<()> {
    let store = open_store(ctx)?;
    let snapshot = store.snapshot();
    let plotted = plot(&snapshot.initiatives, &ctx.roster);
    let filter = MatrixFilter {
        team: a.team.clone(),
        priority: a.priority.as_deref().map(Priority::normalize),
    };
    let shown = filter.apply(&plotted);
    info!(
        "{} of {} initiatives shown, {} without votes",
        shown.len(),
        plotted.len(),
        snapshot.initiatives.len() - plotted.len()
    );

    let result_js = build_summary_js(
        store.session_id(),
        &ctx.roster,
        &filter,
        &shown,
        plotted.len(),
    );
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match a.out.as_deref() {
        None | Some("") => {
            for p in shown.iter() {
                println!(
                    "{:>6.2} {:>6.2}  {:<12} {}\t{}",
                    p.coordinates.avg_impact,
                    p.coordinates.avg_complexity,
                    p.quadrant().label(),
                    p.initiative.team,
                    p.initiative.name
                );
            }
        }
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingFileSnafu { path })?;
            info!("Summary written to {:?}", path);
        }
    }

    if let Some(path) = a.csv.as_deref() {
        io_csv::write_matrix_csv(path, &shown)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = a.reference.as_deref() {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }
    Ok(())
}

fn run_stats(ctx: &Settings, a: &StatsArgs) -> MatrixResult<()> {
    let store = open_store(ctx)?;
    let stats = backlog_stats(&store.snapshot().initiatives, a.user_id.as_deref());
    println!("Initiatives: {}", stats.total);
    println!(
        "High: {}  Medium: {}  Low: {}",
        stats.high, stats.medium, stats.low
    );
    for (team, count) in stats.by_team.iter() {
        println!("  {}: {}", team, count);
    }
    if let Some(uid) = a.user_id.as_deref() {
        println!("Pending for {}: {}", uid, stats.pending_for_user);
    }
    Ok(())
}

pub fn run(args: &Args) -> MatrixResult<()> {
    let ctx = read_settings(args)?;
    match &args.command {
        Command::Ingest(a) => run_ingest(&ctx, a),
        Command::Vote(a) => run_vote(&ctx, a),
        Command::Queue(a) => run_queue(&ctx, a),
        Command::Matrix(a) => run_matrix(&ctx, a),
        Command::Stats(a) => run_stats(&ctx, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const BACKLOG: &str = "Time;Métrica;Objetivo;KR;Prioridade;Iniciativa\n\
        OPS;NPS;Retain;+5 NPS;Alta;Refunds\n\
        BizDev;Revenue;Expand;3 partners;Média;Partner portal\n\
        \"Product Marketing\";Leads;Grow;+20% MQL;;\"Webinar \"\"series\"\"\"\n";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Fixture {
            let _ = env_logger::builder().is_test(true).try_init();
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("backlog.csv"), BACKLOG).unwrap();
            Fixture { dir }
        }

        fn path(&self, name: &str) -> String {
            self.dir.path().join(name).display().to_string()
        }

        fn run(&self, cmd: &[&str]) -> MatrixResult<()> {
            let store = self.path("session.json");
            let mut argv = vec!["prioriza", "--store", store.as_str(), "--session", "q3"];
            argv.extend_from_slice(cmd);
            run(&Args::parse_from(argv))
        }

        fn vote(&self, uid: &str, team: &str, id: &str, impact: &str, complexity: &str) {
            self.run(&[
                "vote",
                "--initiative",
                id,
                "--user-id",
                uid,
                "--user-name",
                uid,
                "--user-team",
                team,
                "--impact",
                impact,
                "--complexity",
                complexity,
            ])
            .unwrap();
        }

        fn snapshot(&self) -> Snapshot {
            FileStore::open(&self.path("session.json"), Some("q3"))
                .unwrap()
                .snapshot()
        }

        fn id_of(&self, name: &str) -> String {
            self.snapshot()
                .initiatives
                .iter()
                .find(|i| i.name == name)
                .map(|i| i.id.clone())
                .unwrap()
        }
    }

    #[test]
    fn ingest_writes_the_session_file() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();

        let snap = f.snapshot();
        assert_eq!(snap.initiatives.len(), 3);
        assert_eq!(snap.initiatives[0].priority, Priority::High);
        assert_eq!(snap.initiatives[2].team, "Product Marketing");
        assert_eq!(snap.initiatives[2].priority, Priority::Low);
        assert_eq!(snap.initiatives[2].name, "Webinar \"series\"");

        let stored: StoredSession =
            serde_json::from_str(&fs::read_to_string(f.path("session.json")).unwrap()).unwrap();
        assert_eq!(stored.session_id, "q3");
        assert_eq!(stored.initiatives[1].priority, "Medium");
    }

    #[test]
    fn second_ingest_needs_confirmation() {
        let f = Fixture::new();
        let input = f.path("backlog.csv");
        f.run(&["ingest", "--input", input.as_str()]).unwrap();
        let id = f.id_of("Refunds");
        f.vote("u1", "OPS", &id, "80", "60");

        let err = f.run(&["ingest", "--input", input.as_str()]).unwrap_err();
        assert!(matches!(
            err,
            MatrixCliError::ReplaceNotConfirmed { count: 3 }
        ));

        f.run(&["ingest", "--input", input.as_str(), "--replace"]).unwrap();
        assert!(f
            .snapshot()
            .initiatives
            .iter()
            .all(|i| i.votes().is_empty()));
    }

    #[test]
    fn empty_backlog_is_rejected() {
        let f = Fixture::new();
        let input = f.path("empty.csv");
        fs::write(&input, "team;metric\n\n").unwrap();
        let err = f.run(&["ingest", "--input", input.as_str()]).unwrap_err();
        assert!(matches!(
            err,
            MatrixCliError::Matrix {
                source: MatrixErrors::EmptyBacklog
            }
        ));
        assert!(!Path::new(&f.path("session.json")).exists());
    }

    #[test]
    fn votes_are_replaced_and_persisted() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();
        let id = f.id_of("Refunds");

        f.vote("u1", "OPS", &id, "80", "60");
        f.vote("u1", "OPS", &id, "120", "10");
        f.vote("u2", "Diretoria", &id, "40", "20");

        let snap = f.snapshot();
        let init = snap.get(&id).unwrap();
        assert_eq!(init.votes().len(), 2);
        let v = user_vote(init, "u1").unwrap();
        assert_eq!((v.impact(), v.complexity()), (100, 10));

        let err = f
            .run(&[
                "vote",
                "--initiative",
                "missing",
                "--user-id",
                "u1",
                "--user-name",
                "Ana",
                "--user-team",
                "OPS",
                "--impact",
                "1",
                "--complexity",
                "1",
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            MatrixCliError::Matrix {
                source: MatrixErrors::InitiativeNotFound(_)
            }
        ));
    }

    #[test]
    fn unknown_team_cannot_vote() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();
        let id = f.id_of("Refunds");
        let err = f
            .run(&[
                "vote",
                "--initiative",
                id.as_str(),
                "--user-id",
                "u1",
                "--user-name",
                "Ana",
                "--user-team",
                "Finance",
                "--impact",
                "50",
                "--complexity",
                "50",
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            MatrixCliError::Matrix {
                source: MatrixErrors::UnknownTeam(_)
            }
        ));
    }

    #[test]
    fn matrix_summary_matches_reference() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();
        let id = f.id_of("Refunds");
        f.vote("u1", "OPS", &id, "80", "60");
        f.vote("u2", "Diretoria", &id, "40", "20");

        let out = f.path("summary.json");
        let csv_out = f.path("matrix.csv");
        f.run(&["matrix", "--out", out.as_str(), "--csv", csv_out.as_str()]).unwrap();

        let js = read_summary(&out).unwrap();
        assert_eq!(js["plotted"], 1);
        assert_eq!(js["config"]["oversightTeam"], "Diretoria");
        let r = &js["results"][0];
        assert_eq!(r["name"], "Refunds");
        assert_eq!(r["votes"], 2);
        assert!((r["avgImpact"].as_f64().unwrap() - 160.0 / 3.0).abs() < 1e-9);
        assert!((r["avgComplexity"].as_f64().unwrap() - 140.0 / 3.0).abs() < 1e-9);
        assert_eq!(r["quadrant"], "Quick Wins");

        let csv_text = fs::read_to_string(&csv_out).unwrap();
        assert_eq!(csv_text.lines().count(), 2);
        assert!(csv_text.starts_with("id,team,priority,name,votes,avgImpact"));

        // The same summary passes the reference check.
        f.run(&["matrix", "--reference", out.as_str()]).unwrap();

        // A summary filtered on another team does not.
        let err = f
            .run(&["matrix", "--team", "BizDev", "--reference", out.as_str()])
            .unwrap_err();
        assert!(matches!(err, MatrixCliError::ReferenceMismatch {}));
    }

    #[test]
    fn config_file_sets_session_and_roster() {
        let f = Fixture::new();
        let config = f.path("config.json");
        fs::write(
            &config,
            r#"{"sessionId": "q4", "teams": ["Ops", "Sales", "Board"]}"#,
        )
        .unwrap();
        let args = Args::parse_from(["prioriza", "--config", config.as_str(), "stats"]);
        let ctx = read_settings(&args).unwrap();
        assert_eq!(ctx.session_id.as_deref(), Some("q4"));
        assert_eq!(ctx.roster.oversight_team(), "Board");
        assert_eq!(ctx.store_path, DEFAULT_STORE_PATH);

        // The command line wins over the file.
        let args = Args::parse_from([
            "prioriza",
            "--config",
            config.as_str(),
            "--session",
            "q5",
            "stats",
        ]);
        assert_eq!(read_settings(&args).unwrap().session_id.as_deref(), Some("q5"));
    }

    #[test]
    fn session_file_of_another_session_is_refused() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();
        assert!(FileStore::open(&f.path("session.json"), Some("other")).is_err());
        assert!(FileStore::open(&f.path("session.json"), None).is_ok());
    }

    #[test]
    fn legacy_labels_and_duplicates_are_normalized_on_load() {
        let f = Fixture::new();
        let path = f.path("legacy.json");
        fs::write(
            &path,
            r#"{
              "sessionId": "old",
              "initiatives": [{
                "id": "abc", "team": "OPS", "metric": "m", "objective": "o",
                "keyResult": "k", "priority": "Média", "name": "n",
                "votes": [
                  {"userId": "u1", "userName": "Ana", "userTeam": "OPS",
                   "impact": 10, "complexity": 10, "timestamp": 1},
                  {"userId": "u1", "userName": "Ana", "userTeam": "OPS",
                   "impact": 30, "complexity": 300, "timestamp": 2}
                ]
              }]
            }"#,
        )
        .unwrap();
        let store = FileStore::open(&path, None).unwrap();
        assert_eq!(store.session_id(), "old");
        let snap = store.snapshot();
        let init = snap.get("abc").unwrap();
        assert_eq!(init.priority, Priority::Medium);
        assert_eq!(init.description, None);
        assert_eq!(init.votes().len(), 1);
        assert_eq!(init.votes()[0].complexity(), 100);
    }

    #[test]
    fn file_and_subscribers_see_the_same_votes() {
        let f = Fixture::new();
        f.run(&["ingest", "--input", f.path("backlog.csv").as_str()]).unwrap();
        let id = f.id_of("Refunds");

        let mut store = FileStore::open(&f.path("session.json"), Some("q3")).unwrap();
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let key = id.clone();
        let _feed = store.subscribe(Box::new(move |snap: &Snapshot| {
            let n = snap.get(&key).map(|i| i.votes().len()).unwrap_or(0);
            sink.borrow_mut().push(n)
        }));

        let ana = User::new("u1", "Ana", "OPS");
        store
            .update_votes(
                &id,
                vec![Vote::new(&ana, 100, 0, 1), Vote::new(&ana, 0, 0, 2)],
            )
            .unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1]);
        let on_disk = f.snapshot();
        let init = on_disk.get(&id).unwrap();
        assert_eq!(init.votes().len(), 1);
        assert_eq!(init.votes()[0].impact(), 0);
        assert_eq!(on_disk, store.snapshot());
    }
}
