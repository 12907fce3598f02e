mod args;
mod render;
mod sheet;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use inventario_auth::{Session, StaticSession};
use inventario_events::{EventBus, InMemoryEventBus, Notice};
use inventario_infra::store::sqlite::connect;
use inventario_infra::{
    AuditLog, CommandDispatcher, InventoryLedger, ItemStore, LedgerConfig, NoticeTimings,
    SqliteAuditLog, SqliteItemStore,
};
use inventario_inventory::{Item, ItemDraft, LedgerCommand, StockOutRequest, parse_quantity};

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    inventario_observability::init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "parsed arguments");

    let mut config = LedgerConfig::load(cli.config.as_deref()).context("invalid configuration")?;
    if let Some(url) = cli.database_url.clone() {
        config.database_url = url;
    }

    let pool = connect(&config.database_url)
        .await
        .with_context(|| format!("failed to open {}", config.database_url))?;
    let session = cli.actor.map(StaticSession::authenticated).unwrap_or_default();
    let ledger = InventoryLedger::new(
        SqliteItemStore::new(pool.clone()),
        SqliteAuditLog::new(pool),
        session,
    )
    .with_config(&config);

    let bus = Arc::new(InMemoryEventBus::<Notice>::new());
    let notices = bus.subscribe();
    let mut dispatcher =
        CommandDispatcher::new(ledger, bus).with_timings(NoticeTimings::from(&config));

    dispatcher
        .ledger_mut()
        .refresh()
        .await
        .context("failed to load items")?;

    let result = run(&mut dispatcher, cli.command, cli.json).await;
    for notice in notices.drain() {
        render::notice(&notice, cli.json);
    }
    result
}

async fn run<S, A, P, B>(
    dispatcher: &mut CommandDispatcher<S, A, P, B>,
    command: Command,
    json: bool,
) -> Result<()>
where
    S: ItemStore,
    A: AuditLog,
    P: Session,
    B: EventBus<Notice>,
{
    let ledger_command = match command {
        Command::List => return render::items(dispatcher.ledger().items(), json),
        Command::Movements { limit } => {
            let records = dispatcher.ledger().recent_movements(limit).await?;
            return render::movements(&records, json);
        }
        Command::Add { name, code, quantity } => {
            LedgerCommand::Create(ItemDraft::new(name, code, quantity))
        }
        Command::Delete { item } => LedgerCommand::Delete(resolve(dispatcher.ledger(), &item)?.id),
        Command::SetQuantity { item, quantity } => LedgerCommand::EditQuantity {
            item_id: resolve(dispatcher.ledger(), &item)?.id,
            new_quantity: parse_quantity(&quantity)?,
        },
        Command::Out { item, quantity, observation } => {
            let item = resolve(dispatcher.ledger(), &item)?;
            let mut request = StockOutRequest::new(item.id, item.quantity.value(), parse_quantity(&quantity)?);
            if let Some(observation) = observation {
                request = request.with_observation(observation);
            }
            LedgerCommand::StockOut(request)
        }
        Command::OutBatch { file } => {
            LedgerCommand::StockOutSheet(sheet::stock_out_rows(&read_sheet(&file)?)?)
        }
        Command::Import { file } => {
            LedgerCommand::BulkImport(sheet::import_rows(&read_sheet(&file)?)?.into_rows())
        }
    };

    let outcome = dispatcher.dispatch(ledger_command).await?;
    render::outcome(&outcome, json)
}

fn read_sheet(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn resolve<'a, S, A, P>(ledger: &'a InventoryLedger<S, A, P>, reference: &str) -> Result<&'a Item> {
    ledger
        .resolve(reference)
        .ok_or_else(|| anyhow!("no item with id or code '{}'", reference.trim()))
}
