use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::process;
use tracing::{debug, warn};

use ticktock::cache::CatalogCache;
use ticktock::calendar::{parse_date, week_bounds, week_number};
use ticktock::config::Config;
use ticktock::display;
use ticktock::logging;
use ticktock::{
    AbandonSignal, DateBucket, EntryPatch, HttpTransport, MemoryTransport, NewEntry, Outcome,
    Session, StatusFilter, TimesheetTransport,
};

#[derive(Parser)]
#[command(name = "ticktock")]
#[command(about = "Weekly timesheet tracking tool", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
struct Cli {
    /// Timesheet API base URL (overrides config and TICKTOCK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Date to treat as today (YYYY-MM-DD, YYYY.MM.DD, or YYYY/MM/DD format)
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List timesheets
    List {
        /// Status filter (all, completed, incomplete, in-draft, missing)
        #[arg(short, long, default_value = "all")]
        status: String,

        /// Date range (all, this-week, this-month, last-month, last-3-months)
        #[arg(short, long, default_value = "all")]
        range: String,
    },
    /// Show the entries of one week
    Show {
        #[arg(short, long)]
        week: u32,
    },
    /// Add an entry to a week
    Add {
        #[arg(short, long)]
        week: u32,

        /// Entry date (default: the first day of the week)
        #[arg(short = 'D', long)]
        date: Option<String>,

        #[arg(short, long)]
        project: String,

        /// Type of work
        #[arg(short = 't', long)]
        work_type: String,

        #[arg(short = 'm', long)]
        description: String,

        #[arg(short = 'H', long)]
        hours: f64,
    },
    /// Change fields of an existing entry
    Edit {
        /// Entry id
        #[arg(short, long)]
        entry: String,

        #[arg(short = 'D', long)]
        date: Option<String>,

        #[arg(short, long)]
        project: Option<String>,

        #[arg(short = 't', long)]
        work_type: Option<String>,

        #[arg(short = 'm', long)]
        description: Option<String>,

        #[arg(short = 'H', long)]
        hours: Option<f64>,
    },
    /// Delete an entry
    Delete {
        /// Entry id
        #[arg(short, long)]
        entry: String,
    },
    /// Keep a week in draft, or hand it back to the hours rule
    Draft {
        #[arg(short, long)]
        week: u32,

        /// Clear the draft marker
        #[arg(long)]
        clear: bool,
    },
    /// List projects and types of work
    Catalog,
    /// Print the Monday to Sunday span of a week number
    WeekBounds {
        /// Week number (default: the current week)
        #[arg(short, long)]
        week: Option<u32>,

        /// Year (default: the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(_) => (),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let today = match &cli.today {
        Some(date) => parse_date(date)?,
        None => Local::now().date_naive(),
    };

    let Some(command) = cli.command else {
        println!("No command specified. Use --help for available commands.");
        return Ok(());
    };

    // Pure calendar arithmetic, no backend needed
    if let Commands::WeekBounds { week, year } = command {
        return print_week_bounds(week, year, today);
    }

    let mut config = Config::load_or_default()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url)?;
    }

    match &config.log_file {
        Some(file) => {
            logging::init_with_file(file).map_err(|e| anyhow!("failed to set up logging: {}", e))?
        }
        None => logging::init(),
    }

    match config.api_url.clone() {
        Some(url) => {
            debug!(api_url = %url, "using HTTP backend");
            execute(Session::new(HttpTransport::new(&url)), command, &config, today).await
        }
        None => {
            debug!("no API URL configured, using the demo backend");
            println!("(demo data, changes are not kept between runs)");
            let transport = MemoryTransport::demo(today);
            execute(Session::new(transport), command, &config, today).await
        }
    }
}

async fn execute<T: TimesheetTransport>(
    mut session: Session<T>,
    command: Commands,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    session.refresh().await?;

    match command {
        Commands::List { status, range } => {
            let status: StatusFilter = status.parse()?;
            let range: DateBucket = range.parse()?;
            let visible = session.filtered(status, range, today);
            println!("Status: {}, range: {}\n", status, range);
            print!("{}", display::timesheet_table(&visible));
        }
        Commands::Show { week } => {
            let ts = session
                .engine()
                .timesheet_by_week(week)
                .ok_or_else(|| anyhow!("no timesheet for week {}", week))?;
            print!("{}", display::week_detail(ts));
        }
        Commands::Add {
            week,
            date,
            project,
            work_type,
            description,
            hours,
        } => {
            let ts = session
                .engine()
                .timesheet_by_week(week)
                .ok_or_else(|| anyhow!("no timesheet for week {}", week))?;
            let timesheet_id = ts.id.clone();
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => ts.start_date,
            };
            let entry = NewEntry {
                project_name: project,
                type_of_work: work_type,
                task_description: description,
                hours,
                date,
            };
            let outcome = session
                .create_entry(&timesheet_id, entry, abandon_on_ctrl_c())
                .await?;
            report(&outcome, "Entry added");
        }
        Commands::Edit {
            entry,
            date,
            project,
            work_type,
            description,
            hours,
        } => {
            let patch = EntryPatch {
                project_name: project,
                type_of_work: work_type,
                task_description: description,
                hours,
                date: date.as_deref().map(parse_date).transpose()?,
            };
            if patch.is_empty() {
                return Err(anyhow!("nothing to change, pass at least one field"));
            }
            let timesheet_id = session
                .snapshot()
                .owner_of(&entry)
                .map(|ts| ts.id.clone())
                .ok_or_else(|| anyhow!("no entry with id {}", entry))?;
            let outcome = session
                .update_entry(&timesheet_id, &entry, &patch, abandon_on_ctrl_c())
                .await?;
            report(&outcome, "Entry updated");
        }
        Commands::Delete { entry } => {
            let outcome = session.delete_entry(&entry, abandon_on_ctrl_c()).await?;
            report(&outcome, "Entry deleted");
        }
        Commands::Draft { week, clear } => {
            let timesheet_id = session
                .engine()
                .timesheet_by_week(week)
                .map(|ts| ts.id.clone())
                .ok_or_else(|| anyhow!("no timesheet for week {}", week))?;
            let ts = if clear {
                session.clear_draft(&timesheet_id)?
            } else {
                session.mark_draft(&timesheet_id)?
            };
            println!("Week {} is now {}", ts.week_number, ts.status.status());
        }
        Commands::Catalog => {
            let mut cache = CatalogCache::load().unwrap_or_else(|e| {
                warn!(error = %e, "catalog cache unreadable, starting empty");
                CatalogCache::new()
            });
            let catalog = session
                .catalog(&mut cache, config.catalog_max_age_hours)
                .await?;
            if let Err(e) = cache.save() {
                warn!(error = %e, "failed to save catalog cache");
            }
            print!("{}", display::catalog_listing(&catalog));
        }
        Commands::WeekBounds { week, year } => print_week_bounds(week, year, today)?,
    }

    Ok(())
}

fn print_week_bounds(week: Option<u32>, year: Option<i32>, today: NaiveDate) -> Result<()> {
    let week = week.unwrap_or_else(|| week_number(today));
    let year = year.unwrap_or_else(|| today.year());
    let range = week_bounds(week, year)?;
    println!("{}", display::week_bounds_line(week, year, &range));
    Ok(())
}

/// Ctrl-C while waiting on the backend abandons the confirmation
fn abandon_on_ctrl_c() -> AbandonSignal {
    let (handle, signal) = AbandonSignal::pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.abandon();
        }
    });
    signal
}

fn report(outcome: &Outcome, action: &str) {
    match outcome {
        Outcome::Confirmed(ts) => {
            println!("✅ {}", action);
            print!("{}", display::week_detail(ts));
        }
        Outcome::Abandoned(ts) => {
            println!("⚠️  Stopped waiting for the backend; week {} may be out of date", ts.week_number);
        }
    }
}
