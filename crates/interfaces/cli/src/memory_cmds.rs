use std::io;
use std::io::IsTerminal;
use std::io::Write;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};

use memkit_memory::{MemoryManager, RecallOptions};

pub(crate) fn run_remember(memory: &mut MemoryManager, key: &str, value: &str, category: &str) -> Result<()> {
    memory.remember(key, value, category)?;
    println!("remembered {key} in {}", category.trim().to_lowercase());
    Ok(())
}

pub(crate) fn run_recall(memory: &MemoryManager, query: &str, options: RecallOptions, json: bool) -> Result<()> {
    let hits = memory.recall(query, options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("no memories matched {query:?} (threshold {:.2})", options.threshold);
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{:.3}] {}/{}: {}",
            rank + 1,
            hit.score,
            hit.category,
            hit.key,
            hit.value
        );
    }
    Ok(())
}

pub(crate) fn run_forget(memory: &mut MemoryManager, key: &str, category: &str) -> Result<()> {
    if memory.forget(key, category)? {
        println!("forgot {key}");
    } else {
        println!("no entry {key:?} in {}", category.trim().to_lowercase());
    }
    Ok(())
}

pub(crate) fn run_list(memory: &MemoryManager, category: &str, json: bool) -> Result<()> {
    let entries = memory.list(category)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("- {}: {}", entry.key, entry.value);
    }
    println!("({} entries)", entries.len());
    Ok(())
}

pub(crate) fn run_categories(memory: &MemoryManager) {
    for category in memory.categories() {
        println!("{category}");
    }
}

pub(crate) fn run_stats(memory: &MemoryManager) {
    println!("── memory stats ─────────────────────────────────────");
    for (category, count) in memory.stats() {
        println!("  {category:<20} {count}");
    }
    println!("  {:<20} {}", "total", memory.total_entries());
    println!("  {:<20} {}", "indexed", memory.index().len());
}

pub(crate) fn run_trim(memory: &mut MemoryManager, max_per_category: usize, yes: bool) -> Result<()> {
    let over: Vec<(String, usize)> = memory
        .stats()
        .into_iter()
        .filter(|(_, count)| *count > max_per_category)
        .map(|(category, count)| (category, count - max_per_category))
        .collect();

    if over.is_empty() {
        println!("nothing to trim (limit {max_per_category} per category)");
        return Ok(());
    }

    println!("⚠️  destructive operation: trim memory to {max_per_category} entries per category");
    for (category, excess) in &over {
        println!("- {category}: drop {excess} oldest");
    }

    if !yes {
        if !io::stdin().is_terminal() {
            bail!("refusing to trim in non-interactive mode without --yes");
        }

        print!("Type 'TRIM' to continue: ");
        io::stdout().flush()?;

        let mut confirmation = String::new();
        io::stdin().read_line(&mut confirmation)?;
        if confirmation.trim() != "TRIM" {
            println!("trim cancelled");
            return Ok(());
        }
    }

    let removed = memory.trim_categories(max_per_category)?;
    let total: usize = removed.values().sum();
    println!("trim complete: removed {total} entries");
    Ok(())
}

pub(crate) fn run_log(memory: &mut MemoryManager, text: &str, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let entry = memory.daily_log(text, Some(date))?;
    println!(
        "logged at {} → {}",
        entry.timestamp,
        memory.store().log_path(date).display()
    );
    Ok(())
}

pub(crate) fn run_log_show(memory: &MemoryManager, date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let entries = memory.daily_entries(Some(date))?;
    println!("daily log {date} ({} entries)", entries.len());
    for entry in entries {
        println!("- {} {}", entry.timestamp, entry.text);
    }
    Ok(())
}
