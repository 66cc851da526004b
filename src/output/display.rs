//! Display functions for command results

use colored::Colorize;

use super::formatters::{colored_guess, create_progress_bar, format_bytes, format_probability};
use crate::commands::{BuiltTable, Observation, SuggestOutcome, TableOutcome};
use crate::core::{Trits, Word};
use crate::solver::{GuessAnalysis, LetterHeatmap};
use crate::table::{CacheStats, PatternRow, TableMeta, TableSource};

fn header(title: &str) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(" {}", title.bright_cyan().bold());
    println!("{}", "═".repeat(60).cyan());
}

/// Print the observed guesses
pub fn print_history(history: &[Observation]) {
    for (i, obs) in history.iter().enumerate() {
        println!("  {}  {}", i + 1, colored_guess(&obs.guess, &obs.feedback));
    }
}

/// Print the result of a suggest run
pub fn print_suggestions(outcome: &SuggestOutcome) {
    match outcome {
        SuggestOutcome::Ranked {
            candidates,
            suggestions,
        } => {
            header("SUGGESTIONS");
            println!(
                "\n📊 {} candidates remain",
                candidates.to_string().bright_yellow().bold()
            );
            if let Some(first) = suggestions.first() {
                println!("   α = {:.3} (weight of information over solving)", first.alpha);
            }
            println!(
                "\n   {:>2}  {:<12} {:>8} {:>8} {:>10} {:>8}",
                "#", "guess", "score", "EIG", "P(solve)", "E[left]"
            );
            for (rank, s) in suggestions.iter().enumerate() {
                let guess = format!("{:<12}", s.guess.to_uppercase());
                let guess = if rank == 0 {
                    guess.green().bold()
                } else {
                    guess.normal()
                };
                println!(
                    "   {:>2}  {} {:>8.4} {:>8.3} {:>10} {:>8.1}",
                    rank + 1,
                    guess,
                    s.score,
                    s.eig,
                    format_probability(s.solve_prob),
                    s.expected_remaining
                );
            }
        }
        SuggestOutcome::Solved { answer } => {
            println!(
                "{}",
                format!("✅ Solved: {}", answer.to_uppercase()).green().bold()
            );
        }
        SuggestOutcome::Contradiction => {
            println!(
                "{}",
                "❌ No word fits this feedback; check the history".red().bold()
            );
        }
        SuggestOutcome::Canceled => println!("{}", "Canceled".yellow()),
    }
}

/// Print the breakdown of one guess
pub fn print_guess_analysis(analysis: &GuessAnalysis, buckets_shown: usize) {
    header(&format!("GUESS ANALYSIS: {}", analysis.guess.to_uppercase()));

    let max_bits = (analysis.candidates.max(1) as f64).log2().max(1.0);
    println!("\n📊 Against {} candidates:", analysis.candidates);
    println!(
        "   EIG:         [{}] {}",
        create_progress_bar(analysis.eig, max_bits, 30).green(),
        format!("{:.3} bits", analysis.eig).bright_yellow()
    );
    println!("   P(solve):    {}", format_probability(analysis.solve_prob));
    println!("   Expected:    {:.1} candidates remain", analysis.expected_remaining);
    println!("   Worst case:  {} candidates", analysis.max_bucket);
    println!("   Outcomes:    {}", analysis.buckets.len());

    if buckets_shown > 0 {
        println!("\n📈 {}", "Heaviest outcomes:".bright_cyan().bold());
        for bucket in analysis.buckets.iter().take(buckets_shown) {
            println!(
                "   {} {:>5} words  {:>7}",
                bucket.pattern.to_emoji(),
                bucket.count,
                format_probability(bucket.mass)
            );
        }
    }
}

/// Print per-position letter mass
pub fn print_heatmap(heatmap: &LetterHeatmap, letters_shown: usize) {
    header("LETTER HEATMAP");
    println!("\n📊 {} candidates", heatmap.candidates);

    for (pos, row) in heatmap.positions.iter().enumerate() {
        let mut letters: Vec<(u8, f64)> = (b'a'..=b'z').zip(row.iter().copied()).collect();
        letters.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let cells: Vec<String> = letters
            .iter()
            .take(letters_shown)
            .filter(|(_, mass)| *mass > 0.0)
            .map(|(letter, mass)| {
                format!(
                    "{} {}",
                    char::from(letter.to_ascii_uppercase()).to_string().bold(),
                    format_probability(*mass)
                )
            })
            .collect();
        println!("   {}: {}", pos + 1, cells.join("  "));
    }

    let mut present: Vec<(u8, f64)> = (b'a'..=b'z').zip(heatmap.presence.iter().copied()).collect();
    present.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    println!("\n📈 {}", "Letter presence:".bright_cyan().bold());
    for (letter, mass) in present.iter().take(letters_shown).filter(|(_, m)| *m > 0.0) {
        println!(
            "   {} [{}] {}",
            char::from(letter.to_ascii_uppercase()),
            create_progress_bar(*mass, 1.0, 20).green(),
            format_probability(*mass)
        );
    }
}

/// Print a feedback pattern
pub fn print_feedback(guess: &Word, secret: &Word, feedback: &Trits) {
    println!(
        "{} vs {}: {}  {}  {}",
        guess.text().to_uppercase().bold(),
        secret.text().to_uppercase(),
        colored_guess(guess, feedback),
        feedback.to_emoji(),
        feedback.to_digits().bright_black()
    );
}

/// Print the result of an offline build
pub fn print_built_table(built: &BuiltTable) {
    header("PATTERN TABLE BUILT");
    println!("   File:        {}", built.path.display());
    println!("   Word length: {}", built.word_len);
    println!("   Vocabulary:  {} words", built.vocab_len);
    println!("   Seeds:       {}", built.seeds.len());
    println!("   Size:        {}", format_bytes(built.bytes));
    let preview: Vec<&str> = built.seeds.iter().take(10).map(String::as_str).collect();
    if !preview.is_empty() {
        println!("   Top seeds:   {}", preview.join(", "));
    }
}

fn print_meta(meta: &TableMeta) {
    let source = match meta.source {
        TableSource::Asset => "precomputed asset".green(),
        TableSource::Compute => "on-demand".yellow(),
    };
    println!("   Dataset:     {} (length {})", meta.dataset, meta.word_len);
    println!("   Vocabulary:  {} words, hash {:08x}", meta.vocab_len, meta.vocab_hash);
    println!("   Rows:        {source}");
    if meta.source == TableSource::Asset {
        println!("   Seeds:       {}", meta.seeds);
        println!("   Asset size:  {}", format_bytes(meta.asset_bytes));
    }
}

fn print_stats(stats: &CacheStats) {
    println!("   Asset hits:  {}", stats.asset_hits);
    println!("   Memory hits: {}", stats.memory_hits);
    println!("   Store hits:  {}", stats.store_hits);
    println!(
        "   Computed:    {} ({} accelerated, {} fallbacks)",
        stats.computes, stats.accel_computes, stats.accel_fallbacks
    );
    println!("   Store errors: {}", stats.store_errors);
    println!(
        "   Memory:      {} rows, {} of {} [{}]",
        stats.memory_entries,
        format_bytes(stats.memory_bytes),
        format_bytes(stats.memory_budget),
        create_progress_bar(stats.memory_bytes as f64, stats.memory_budget as f64, 20)
    );
    println!("   Tables:      {} loaded", stats.tables_loaded);
}

fn print_row(guess: &str, row: &PatternRow, words: &[Word], shown: usize) {
    let kind = match row {
        PatternRow::Seed { .. } => "asset",
        PatternRow::Packed(_) => "packed",
        PatternRow::Wide(_) => "wide",
    };
    println!("   Row for {} ({kind}, {} entries)", guess.to_uppercase().bold(), row.len());
    for (i, word) in words.iter().enumerate().take(shown.min(row.len())) {
        println!("   {}  {}", row.trits(i, word.len()).to_emoji(), word.text());
    }
    if row.len() > shown {
        println!("   … {} more", row.len() - shown);
    }
}

/// Print the result of a table action
pub fn print_table_outcome(outcome: &TableOutcome, words: &[Word]) {
    match outcome {
        TableOutcome::Ready { meta, stages } => {
            header("PATTERN TABLE");
            println!("   Stages:      {}", stages.len());
            print_meta(meta);
        }
        TableOutcome::Stats(stats) => {
            header("CACHE STATS");
            print_stats(stats);
        }
        TableOutcome::Row { guess, row } => {
            header("PATTERN ROW");
            print_row(guess, row, words, 20);
        }
        TableOutcome::Cleared { tier, ok } => {
            let status = if *ok { "cleared".green() } else { "not cleared".red() };
            println!("{tier:?} tier {status}");
        }
    }
}
