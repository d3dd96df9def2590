// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use superstore_analytics::{
    export_csv, format_thousands, init_logging, DashboardSession, DashboardView, DatasetArgs,
    FilterPredicate,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "SuperStore sales analytics dashboard", long_about = None)]
struct Cli {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// Region to include (repeatable; default: all)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// Category to include (repeatable; default: all)
    #[arg(long = "category")]
    categories: Vec<String>,
}

impl FilterArgs {
    fn to_predicate(&self) -> FilterPredicate {
        let all = FilterPredicate::all();
        let regions: Vec<String> = if self.regions.is_empty() {
            all.regions().iter().map(|r| r.to_string()).collect()
        } else {
            self.regions.clone()
        };
        let categories: Vec<String> = if self.categories.is_empty() {
            all.categories().iter().map(|c| c.to_string()).collect()
        } else {
            self.categories.clone()
        };
        FilterPredicate::from_names(&regions, &categories)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal dashboard (default)
    Ui,
    /// Print KPIs and grouped sales for a filter
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the filtered detail table as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);

    // Keep the dashboard screen clean unless RUST_LOG asks for more
    let default_level = if matches!(command, Command::Ui) { "warn" } else { "info" };
    init_logging(default_level)?;

    let config = cli.dataset.into_config().context("invalid dataset configuration")?;
    let mut session = DashboardSession::from_config(&config);

    match command {
        Command::Ui => run_ui_mode(session),
        Command::Summary { filter, json } => {
            session.set_predicate(filter.to_predicate());
            run_summary(&session, json)
        }
        Command::Export { filter, output } => {
            session.set_predicate(filter.to_predicate());
            run_export(&session, &output)
        }
    }
}

fn run_summary(session: &DashboardSession, json: bool) -> Result<()> {
    let view = session.view();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let snapshot = match &view {
        DashboardView::NoData => {
            if json {
                writeln!(out, "{}", serde_json::json!({ "empty": true }))?;
            } else {
                writeln!(out, "⚠ No data available based on the current filter settings!")?;
            }
            return Ok(());
        }
        DashboardView::Ready(snapshot) => snapshot,
    };

    if json {
        let payload = serde_json::json!({
            "empty": false,
            "summary": snapshot.summary,
            "kpis": snapshot.kpis,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }

    writeln!(out, "🛒 SuperStore Analytics - Executive Overview")?;
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    for card in &snapshot.kpis {
        writeln!(out, "{:<15} {:>15}", card.label, card.value)?;
    }

    writeln!(out, "\n🏆 Sales by Sub-Category")?;
    for group in &snapshot.summary.sales_by_sub_category {
        writeln!(out, "  {:<14} ${:>10}", group.sub_category, format_thousands(group.sales))?;
    }

    writeln!(out, "\n🌍 Sales by Region")?;
    for entry in &snapshot.summary.sales_by_region {
        writeln!(
            out,
            "  {:<14} ${:>10}  {:>5.1}%",
            entry.region.as_str(),
            format_thousands(entry.sales),
            entry.share_pct
        )?;
    }

    writeln!(out, "\n📈 Revenue Trend")?;
    for entry in &snapshot.summary.sales_by_month {
        writeln!(out, "  {}       ${:>10}", entry.month, format_thousands(entry.sales))?;
    }

    Ok(())
}

fn run_export(session: &DashboardSession, output: &Path) -> Result<()> {
    let rows = match session.view() {
        DashboardView::NoData => Vec::new(),
        DashboardView::Ready(snapshot) => snapshot.records,
    };

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    export_csv(&rows, BufWriter::new(file))?;

    info!(rows = rows.len(), path = %output.display(), "exported detail table");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(session: DashboardSession) -> Result<()> {
    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_session: DashboardSession) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: superstore-analytics summary");
    std::process::exit(1);
}
