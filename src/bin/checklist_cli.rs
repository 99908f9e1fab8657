use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fieldops::domain::entities::HistoryFilter;
use fieldops::{
    init_logging, AppConfig, AppServices, ChecklistItemId, ChecklistKey, ChecklistView,
    RequisiteStatus, SaveOutcome,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::runtime::Runtime;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "checklist_cli", about = "Edit checklists and manage site requisites")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write the JSON report to a file instead of stdout.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Command {
    /// Load a checklist, apply edits locally and optionally save them as one batch.
    Checklist {
        job_id: i64,
        checklist_id: i64,
        /// Flip an item's checked flag. May be repeated.
        #[arg(long = "toggle", value_name = "ITEM_ID", value_parser = parse_item_id)]
        toggles: Vec<ChecklistItemId>,
        /// Set an item's comment. May be repeated.
        #[arg(long = "comment", value_name = "ITEM_ID=TEXT", value_parser = parse_comment)]
        comments: Vec<(ChecklistItemId, String)>,
        #[arg(long)]
        save: bool,
    },
    /// List submitted requisites.
    History {
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        sales_order: Option<String>,
        #[arg(long = "status", value_parser = parse_status)]
        filter_status: Option<RequisiteStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Fetch the BOM tree for a sales order and cabinet position.
    Bom {
        sales_order: String,
        cabinet_position: String,
    },
}

#[derive(Debug, serde::Serialize)]
struct ChecklistReport {
    view: ChecklistView,
    save: Option<SaveOutcome>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging();
    let config = AppConfig::from_env();
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;

    let payload = rt.block_on(async {
        let services = AppServices::from_config(&config)
            .await
            .context("Failed to initialise services")?;
        run(&services, &cli).await
    })?;
    emit_payload(cli.output.as_deref(), &payload)
}

async fn run(services: &AppServices, cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Checklist {
            job_id,
            checklist_id,
            toggles,
            comments,
            save,
        } => {
            let key = ChecklistKey {
                job_id: *job_id,
                checklist_id: *checklist_id,
            };
            let checklist = &services.checklist;
            checklist
                .load(key)
                .await
                .with_context(|| format!("Failed to load {key}"))?;
            for id in toggles {
                let checked = checklist.toggle_checked(*id)?;
                info!(item = %id, checked, "toggled item");
            }
            for (id, text) in comments {
                checklist.set_comment(*id, text.clone())?;
            }
            let save = if *save {
                Some(checklist.save().await.context("Failed to save checklist")?)
            } else {
                None
            };
            let report = ChecklistReport {
                view: checklist.view(),
                save,
            };
            to_json(&report, cli.pretty)
        }
        Command::History {
            offset,
            sales_order,
            filter_status,
            search,
        } => {
            let requisites = &services.requisites;
            let records = match sales_order {
                Some(so) => requisites.history_for_sales_order(so).await,
                None => requisites.load_history(*offset).await,
            }
            .context("Failed to load requisite history")?;
            let filter = HistoryFilter {
                search: search.clone(),
                status: filter_status.clone(),
            };
            to_json(&filter.apply(&records), cli.pretty)
        }
        Command::Bom {
            sales_order,
            cabinet_position,
        } => {
            let requisites = &services.requisites;
            if let Err(err) = requisites.restore().await {
                warn!(error = %err, "ignoring unreadable saved bucket");
            }
            let bom = requisites
                .load_bom(sales_order, cabinet_position)
                .await
                .with_context(|| format!("Failed to load BOM for {sales_order}/{cabinet_position}"))?;
            to_json(&bom, cli.pretty)
        }
    }
}

fn write_output(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn emit_payload(target: Option<&Path>, payload: &str) -> Result<()> {
    if let Some(path) = target {
        write_output(path, payload)?;
        println!("Report written to {}", path.display());
    } else {
        println!("{payload}");
    }
    Ok(())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn parse_item_id(value: &str) -> Result<ChecklistItemId> {
    let parsed: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid item id '{value}'. Expected an integer."))?;
    Ok(ChecklistItemId::new(parsed))
}

fn parse_comment(value: &str) -> Result<(ChecklistItemId, String)> {
    let Some((id, text)) = value.split_once('=') else {
        bail!("Invalid comment '{value}'. Expected <item-id>=<text>.");
    };
    Ok((parse_item_id(id)?, text.to_string()))
}

fn parse_status(value: &str) -> Result<RequisiteStatus> {
    let value = value.trim();
    if value.is_empty() {
        bail!("Status must not be empty.");
    }
    Ok(RequisiteStatus::from(value.to_ascii_lowercase()))
}
