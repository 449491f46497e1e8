use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tickloop::Millis;
use tickloop_demo::{logger, LinkState, Settings, TraceFormatter};
use tickloop_posix::{LoopRunner, RunnerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cooperative scheduler demo on a sleeping host loop")]
struct Opts {
    /// Stop after this many milliseconds (runs until Ctrl-C when omitted)
    #[arg(long = "duration-ms", value_name = "MS")]
    duration_ms: Option<u64>,

    #[arg(long = "blink-ms", default_value_t = 250, value_name = "MS")]
    blink_ms: u32,

    #[arg(long = "heartbeat-ms", default_value_t = 1000, value_name = "MS")]
    heartbeat_ms: u32,

    /// Heartbeats before the heartbeat task stops itself
    #[arg(long = "heartbeats", default_value_t = 3)]
    heartbeats: u32,

    #[arg(long = "link-poll-ms", default_value_t = 100, value_name = "MS")]
    link_poll_ms: u32,

    /// Pretend the link comes up after this many milliseconds
    #[arg(long = "link-up-ms", value_name = "MS")]
    link_up_ms: Option<u32>,

    /// Give up waiting for the link after this many milliseconds
    #[arg(long = "deadline-ms", default_value_t = 1500, value_name = "MS")]
    deadline_ms: u32,

    #[arg(long = "watchdog-ms", default_value_t = 2500, value_name = "MS")]
    watchdog_ms: u32,

    /// Longest sleep between polls
    #[arg(long = "max-sleep-ms", default_value_t = 10, value_name = "MS")]
    max_sleep_ms: u64,

    /// Print scheduler trace records
    #[arg(long = "trace")]
    trace: bool,

    /// Print trace records as JSON lines
    #[arg(long = "json", requires = "trace")]
    json: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Opts {
    fn settings(&self) -> Settings {
        Settings {
            blink: Millis::from_millis(self.blink_ms),
            heartbeat: Millis::from_millis(self.heartbeat_ms),
            heartbeats: self.heartbeats,
            link_poll: Millis::from_millis(self.link_poll_ms),
            link_up_after: self.link_up_ms.map(Millis::from_millis),
            deadline: Millis::from_millis(self.deadline_ms),
            watchdog: Millis::from_millis(self.watchdog_ms),
        }
    }

    fn runner_config(&self) -> RunnerConfig {
        let config = RunnerConfig::default().with_max_sleep(Duration::from_millis(self.max_sleep_ms));
        match self.duration_ms {
            Some(ms) => config.run_for(Duration::from_millis(ms)),
            None => config,
        }
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    logger::init(logger::level_for(opts.verbose)).context("installing logger")?;

    let settings = opts.settings();
    settings.validate()?;

    let runner = LoopRunner::new(opts.runner_config());
    runner.handle_ctrlc()?;

    let trace = opts
        .trace
        .then(|| TraceFormatter::new(opts.json).into_hook());
    let (report, summary) = tickloop_demo::run(&settings, &runner, trace);

    println!(
        "{} polls in {:?}: {} blinks, {} heartbeats, LED {}",
        report.polls,
        report.elapsed,
        summary.blinks,
        summary.heartbeats,
        if summary.led_on { "on" } else { "off" }
    );
    match summary.link {
        LinkState::Waiting => println!("link: still waiting"),
        LinkState::Up(at) => println!("link: up at {at}"),
        LinkState::Abandoned(at) => println!("link: abandoned at {at}"),
    }
    if let Some(at) = summary.watchdog_fired_at {
        println!("watchdog: fired at {at}");
    }
    Ok(())
}
