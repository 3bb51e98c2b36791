//! 文本渲染：缓存内容表格、统计信息、帮助

use cache_core::{Cache, CacheStats};
use std::fmt::Write;

const HEADERS: [&str; 7] = ["Set #", "Line #", "Valid", "Tag", "Data", "Dirty", "LRU Counter"];

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

/// 渲染缓存内容；组号只在每组第一行显示
pub fn table(cache: &Cache) -> String {
    let mut rows: Vec<[String; 7]> = Vec::with_capacity(cache.num_sets() * cache.ways());
    for (set_index, set) in cache.sets().iter().enumerate() {
        for (way, line) in set.lines().iter().enumerate() {
            rows.push([
                if way == 0 { set_index.to_string() } else { String::new() },
                way.to_string(),
                yes_no(line.is_valid()).to_string(),
                line.tag().to_string(),
                line.data().to_string(),
                yes_no(line.is_dirty()).to_string(),
                line.recency().to_string(),
            ]);
        }
    }

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let _ = writeln!(out, "+{separator}+");
    push_row(&mut out, &HEADERS.map(str::to_string), &widths);
    let _ = writeln!(out, "+{separator}+");
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    let _ = write!(out, "+{separator}+");
    out
}

fn push_row(out: &mut String, cells: &[String; 7], widths: &[usize; 7]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, " {cell:<width$} |");
    }
    out.push('\n');
}

pub fn stats(stats: &CacheStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reads:          {}", stats.reads);
    let _ = writeln!(out, "Writes:         {}", stats.writes);
    let _ = writeln!(
        out,
        "Hit rate:       {:.2}% ({} / {})",
        stats.hit_rate() * 100.0,
        stats.hits,
        stats.accesses()
    );
    let _ = writeln!(out, "Evictions:      {}", stats.evictions);
    let _ = writeln!(out, "Write-backs:    {}", stats.write_backs);
    let _ = write!(out, "Write-throughs: {}", stats.write_throughs);
    out
}

pub fn help() -> String {
    [
        "COMMANDS:",
        "    read <addr>                      Read an address (1-100)",
        "    write <addr> <data>              Write 2-50 characters to an address",
        "    config <sets> <type> <repl> <wp> Rebuild the cache, e.g. `config 2 set-associative LRU write-back`",
        "    show                             Print the cache contents",
        "    json                             Dump the cache contents as JSON",
        "    stats                            Print access statistics",
        "    memory <addr>                    Inspect the backing store",
        "    help                             Print this message",
        "    quit                             Exit",
    ]
    .join("\n")
}
