//! Demo application running the classic scheduler, channel and counter
//! scenarios and rendering the results.
//!
//! Run with:
//! ```bash
//! cargo run --example demo --features demo -- --help
//! RUST_LOG=coordina=debug cargo run --example demo --features demo -- scheduler
//! ```

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use coordina::channel::BoundedChannel;
use coordina::counters::atomic::AtomicCounter;
use coordina::counters::cas::CasCounter;
use coordina::counters::locking::LockingCounter;
use coordina::counters::Counter;
use coordina::observers::json::JsonObserver;
use coordina::observers::table::{TableObserver, TableStyle};
use coordina::runner::{RunReport, RunnerConfig, Task, TaskRunner};
use coordina::waitgroup::WaitGroup;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Output format for reports.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty ASCII table
    Table,
    /// JSON format
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Dots,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Dots => TableStyle::Dots,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum Scenario {
    /// Run units sleeping 1s, 2s, 3s concurrently and time each
    Scheduler {
        /// Give up on units still running after this many milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Make the second unit fail to show failure isolation
        #[arg(long)]
        inject_failure: bool,
    },
    /// One producer sends integers through a bounded channel to one consumer
    Channel {
        /// Channel capacity
        #[arg(long, default_value = "10")]
        capacity: NonZeroUsize,

        /// Number of integers to send
        #[arg(long, default_value = "100")]
        items: u32,
    },
    /// Two threads print the odd and even numbers up to a limit, joined by a wait group
    Waitgroup {
        /// Largest number printed
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Actors increment mutex, atomic and CAS counters concurrently
    Counters {
        /// Number of concurrent actors
        #[arg(long, default_value = "10")]
        actors: usize,

        /// Increments performed by each actor
        #[arg(long, default_value = "1000")]
        increments: usize,
    },
}

/// Demo application for coordina.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run
    #[command(subcommand)]
    scenario: Scenario,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table format)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Include timestamp in JSON output
    #[arg(long)]
    timestamp: bool,

    /// Prefix for worker thread names
    #[arg(long, default_value = "demo")]
    thread_prefix: String,
}

fn runner(args: &Args, deadline: Option<Duration>) -> TaskRunner {
    TaskRunner::with_config(RunnerConfig {
        thread_name_prefix: args.thread_prefix.clone(),
        deadline,
        ..RunnerConfig::default()
    })
}

fn scheduler(args: &Args, deadline_ms: Option<u64>, inject_failure: bool) -> RunReport {
    let tasks = (1..=3_u64).map(|secs| {
        let name = format!("sleep-{secs}s");
        if inject_failure && secs == 2 {
            Task::fallible(move || {
                thread::sleep(Duration::from_secs(secs));
                Err(format!("unit {secs} gave up"))
            })
            .with_name(name)
        } else {
            Task::new(move || {
                thread::sleep(Duration::from_secs(secs));
                info!(secs, "unit finished sleeping");
            })
            .with_name(name)
        }
    });

    runner(args, deadline_ms.map(Duration::from_millis)).run_tasks(tasks)
}

fn channel(args: &Args, capacity: NonZeroUsize, items: u32) -> RunReport {
    let channel = Arc::new(BoundedChannel::new(capacity));
    let sum = Arc::new(AtomicCounter::new().with_name("received_sum"));

    let producer = {
        let channel = Arc::clone(&channel);
        Task::fallible(move || {
            for i in 1..=items {
                channel.enqueue(i)?;
            }
            channel.close();
            Ok::<(), coordina::error::ClosedQueueError<u32>>(())
        })
        .with_name("producer")
    };

    let consumer = {
        let channel = Arc::clone(&channel);
        let sum = Arc::clone(&sum);
        Task::new(move || {
            for item in channel.iter() {
                sum.add(i64::from(item));
            }
        })
        .with_name("consumer")
    };

    let report = runner(args, None).run_tasks(vec![producer, consumer]);
    info!(sum = sum.value(), "channel drained");
    report
}

fn odds_and_evens(limit: u32) -> Vec<Arc<dyn Counter>> {
    let wait_group = Arc::new(WaitGroup::new(2));
    let odds = Arc::new(AtomicCounter::new().with_name("odds_printed"));
    let evens = Arc::new(AtomicCounter::new().with_name("evens_printed"));

    for (first, printed) in [(1, Arc::clone(&odds)), (2, Arc::clone(&evens))] {
        let guard = wait_group.guard();
        thread::spawn(move || {
            let _guard = guard;
            for n in (first..=limit).step_by(2) {
                println!("{n}");
                printed.increment();
            }
        });
    }

    wait_group.wait();
    info!(odds = odds.value(), evens = evens.value(), "both printers signaled");
    vec![odds as Arc<dyn Counter>, evens]
}

fn counter_race(
    args: &Args,
    actors: usize,
    increments: usize,
) -> (RunReport, Vec<Arc<dyn Counter>>) {
    let counters: Vec<Arc<dyn Counter>> = vec![
        Arc::new(LockingCounter::new().with_name("mutex")),
        Arc::new(AtomicCounter::new().with_name("atomic")),
        Arc::new(CasCounter::new().with_name("cas")),
    ];

    let tasks = (0..actors).map(|actor| {
        let counters = counters.clone();
        Task::new(move || {
            for _ in 0..increments {
                for counter in &counters {
                    counter.increment();
                }
            }
        })
        .with_name(format!("actor-{actor}"))
    });

    let report = runner(args, None).run_tasks(tasks);
    (report, counters)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (report, counters) = match args.scenario.clone() {
        Scenario::Scheduler {
            deadline_ms,
            inject_failure,
        } => (scheduler(&args, deadline_ms, inject_failure), Vec::new()),
        Scenario::Channel { capacity, items } => (channel(&args, capacity, items), Vec::new()),
        Scenario::Waitgroup { limit } => (RunReport::default(), odds_and_evens(limit)),
        Scenario::Counters { actors, increments } => counter_race(&args, actors, increments),
    };

    let views: Vec<&dyn Counter> = counters.iter().map(|c| &**c as &dyn Counter).collect();

    match args.format {
        OutputFormat::Table => {
            let observer = TableObserver::new().with_style(args.style.into());
            if !report.is_empty() {
                println!("{}", observer.render_report(&report));
            }
            if !views.is_empty() {
                println!("{}", observer.render_counters(views.iter().copied()));
            }
        }
        OutputFormat::Json => {
            let observer = JsonObserver::new()
                .pretty(args.pretty)
                .include_timestamp(args.timestamp);
            let rendered = observer.report_to_json(&report).and_then(|report| {
                if views.is_empty() {
                    Ok(report)
                } else {
                    let counters = observer.counters_to_json(views.iter().copied())?;
                    Ok(format!("{report}\n{counters}"))
                }
            });
            match rendered {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("Error: {err}");
                    std::process::exit(1);
                }
            }
        }
    }
}
