use std::io::{self, Write};

use anyhow::Result;
use serde_json::Value;

use inventario_events::{Notice, NoticeLevel};
use inventario_infra::CommandOutcome;
use inventario_inventory::{Item, MovementRecord};

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn items(items: &[Item], json: bool) -> Result<()> {
    if json {
        return print_json(items);
    }
    let mut out = io::stdout().lock();
    if items.is_empty() {
        writeln!(out, "(no items)")?;
    }
    for item in items {
        writeln!(out, "{}  {:<14} {:>8}  {}", item.id, item.code, item.quantity, item.name)?;
    }
    Ok(())
}

pub fn movements(records: &[MovementRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    let mut out = io::stdout().lock();
    if records.is_empty() {
        writeln!(out, "(no movements)")?;
    }
    for record in records {
        let actor = record
            .actor_id
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}  {:<14} {:>8}  {}  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.code,
            record.quantity_exited,
            record.name,
            record.observation,
            actor
        )?;
    }
    Ok(())
}

pub fn outcome(outcome: &CommandOutcome, json: bool) -> Result<()> {
    if json {
        return print_json(outcome);
    }
    let line = match outcome {
        CommandOutcome::Created { item_id } => format!("created {item_id}"),
        CommandOutcome::Deleted { item_id } => format!("deleted {item_id}"),
        CommandOutcome::QuantitySet { item_id, quantity } => format!("{item_id} = {quantity}"),
        CommandOutcome::StockedOut { movement } => format!("movement {}", movement.id),
        CommandOutcome::Batch { outcome } => {
            format!("{} ok, {} failed", outcome.successes, outcome.errors)
        }
    };
    writeln!(io::stdout().lock(), "{line}")?;
    Ok(())
}

/// Notices go to stderr so `--json` output stays parseable.
pub fn notice(notice: &Notice, json: bool) {
    if json {
        let value = serde_json::to_value(notice).unwrap_or(Value::Null);
        eprintln!("{value}");
        return;
    }
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Error => "error",
    };
    eprintln!("[{tag}] {}", notice.message);
}
