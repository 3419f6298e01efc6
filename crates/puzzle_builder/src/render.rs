//! Text and JSON output for the CLI.

use anyhow::Result;
use dribble_core::{CandidateTable, Player, PlayerCatalog, PlayerId, Puzzle, PuzzleId, PuzzleSummary, TeammateRecord};
use serde::Serialize;
use serde_json::json;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn player_name(catalog: &PlayerCatalog, id: PlayerId) -> String {
    catalog
        .get(id)
        .map(|p| p.display_name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

pub fn players(players: &[&Player], total: usize, json: bool) -> Result<()> {
    if json {
        return print_json(players);
    }

    println!("Players ({} of {total})", players.len());
    for p in players {
        println!("  {:>8}  {:<28} rank {:>3}", p.id, p.display_name, p.search_rank);
    }
    Ok(())
}

pub fn teammates(player: &Player, records: &[TeammateRecord], catalog: &PlayerCatalog, json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }

    println!("Teammates of {} ({})", player.display_name, records.len());
    for r in records {
        println!(
            "  {:>8}  {:<28} {:>2} yrs  last {}",
            r.player_b,
            player_name(catalog, r.player_b),
            r.years_teammates,
            r.last_season_teammates.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn random_pair(catalog: &PlayerCatalog, start: PlayerId, end: PlayerId, json: bool) -> Result<()> {
    if json {
        return print_json(&json!({ "start_player_id": start, "end_player_id": end }));
    }

    println!("🎲 Start: {} ({start})", player_name(catalog, start));
    println!("   End:   {} ({end})", player_name(catalog, end));
    Ok(())
}

pub fn candidates(table: Option<CandidateTable>, json: bool) -> Result<()> {
    let Some(table) = table else {
        println!("Select a start and an end player first.");
        return Ok(());
    };
    if json {
        return print_json(&table);
    }

    println!("\nOne-Shot Solutions ({})", table.rows.len());
    for row in &table.rows {
        println!(
            "  {:>8}  {:<28} rank {:>3}  total {:>2}  w/ {}: [{}]  w/ {}: [{}]",
            row.id,
            row.display_name,
            row.search_rank,
            row.total_shared_seasons,
            table.start_last_name,
            row.seasons_with_start.join(", "),
            table.end_last_name,
            row.seasons_with_end.join(", ")
        );
    }
    Ok(())
}

pub fn created(puzzle: &Puzzle, json: bool) -> Result<()> {
    if json {
        return print_json(puzzle);
    }

    println!("✅ Puzzle {} saved for {}", puzzle.id, puzzle.username);
    println!(
        "   {} → {} via {}",
        puzzle.start_player_id, puzzle.end_player_id, puzzle.solution_player_id
    );
    Ok(())
}

pub fn puzzles(puzzles: &[PuzzleSummary], json: bool) -> Result<()> {
    if json {
        return print_json(puzzles);
    }

    if puzzles.is_empty() {
        println!("No puzzles found.");
        return Ok(());
    }

    println!("Puzzles Found: {}", puzzles.len());
    for p in puzzles {
        let created = p
            .created_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{:<6} {created}  {} → {} via {}",
            p.id, p.start.display_name, p.end.display_name, p.solution.display_name
        );
    }
    Ok(())
}

pub fn deleted(id: PuzzleId, json: bool) -> Result<()> {
    if json {
        return print_json(&json!({ "deleted": id }));
    }

    println!("🗑️  Deleted puzzle {id}");
    Ok(())
}
