//! Vendor search and tagging commands.

use std::path::Path;
use tokio::runtime::Runtime;

use crate::audio::{AudioFile, FilenamePattern};
use crate::config::Config;
use crate::matching::{Identifier, MatchQuery, MatchResult};
use crate::vendors::{EntityKind, LookupOutcome, LookupService, LookupStatus, Vendor};

use super::collect_audio_files;

/// Arguments of `tunelink match`
pub struct MatchRequest<'a> {
    pub vendor: &'a str,
    pub title: &'a str,
    pub artist: &'a str,
    pub identifier: Option<&'a str>,
    pub album: bool,
    pub track_count: Option<u32>,
}

/// Arguments of `tunelink tag`
pub struct TagOptions<'a> {
    pub vendors: &'a [String],
    pub overwrite: bool,
    pub recursive: bool,
    pub pattern: Option<&'a str>,
    pub dry_run: bool,
}

/// Search one vendor and print its candidates and the chosen match
pub fn cmd_match(rt: &Runtime, config: &Config, request: &MatchRequest<'_>) -> anyhow::Result<()> {
    let vendor: Vendor = request.vendor.parse().map_err(anyhow::Error::msg)?;
    let kind = if request.album {
        EntityKind::Album
    } else {
        EntityKind::Track
    };

    let mut query = MatchQuery::new(request.title, request.artist)?;
    if let Some(id) = request.identifier {
        query = query.with_identifier(match kind {
            EntityKind::Track => Identifier::Isrc(id.to_string()),
            EntityKind::Album => Identifier::Upc(id.to_string()),
        });
    }
    if let Some(n) = request.track_count {
        query = query.with_expected_count(n);
    }

    let service = LookupService::from_config(config);
    let (candidates, result) = rt.block_on(service.search(vendor, &query, kind))?;

    println!("Searching {} for '{}'", vendor, query.search_text());
    println!();
    if candidates.is_empty() {
        println!("✗ No results.");
        return Ok(());
    }

    let chosen = result.candidate().map(|c| c.id.clone());
    for candidate in &candidates {
        let marker = if chosen.as_deref() == Some(candidate.id.as_str()) {
            "→"
        } else {
            " "
        };
        println!(
            "{} [{}] {} - {}{}",
            marker,
            candidate.id,
            candidate.artist.as_deref().unwrap_or("?"),
            candidate.title.as_deref().unwrap_or("?"),
            candidate
                .identifier
                .as_ref()
                .map(|i| format!(" ({})", i.value()))
                .unwrap_or_default()
        );
    }

    println!();
    match result {
        MatchResult::Identifier(c) => println!("✓ Matched {} by identifier", c.id),
        MatchResult::Fuzzy { candidate, score } => {
            println!("✓ Matched {} (score: {:.0}%)", candidate.id, score * 100.0)
        }
        MatchResult::NoMatch { best_score } => match best_score {
            Some(score) => println!("✗ No match (best score: {:.0}%)", score * 100.0),
            None => println!("✗ No match"),
        },
    }
    Ok(())
}

/// Tag one file or a directory of files from vendor catalogs
pub fn cmd_tag(
    rt: &Runtime,
    config: &Config,
    path: &Path,
    options: &TagOptions<'_>,
) -> anyhow::Result<()> {
    let vendors: Vec<Vendor> = if options.vendors.is_empty() {
        config.matching.vendor_order()
    } else {
        options
            .vendors
            .iter()
            .map(|v| v.parse::<Vendor>().map_err(anyhow::Error::msg))
            .collect::<anyhow::Result<_>>()?
    };
    let pattern = options.pattern.map(FilenamePattern::new).transpose()?;

    let files = collect_audio_files(path, options.recursive)?;
    if files.is_empty() {
        println!("No audio files found at {:?}", path);
        return Ok(());
    }

    let service = LookupService::from_config(config);
    let names: Vec<_> = vendors.iter().map(|v| v.name()).collect();
    println!("Tagging {} file(s) from: {}", files.len(), names.join(", "));
    if options.dry_run {
        println!("[DRY RUN MODE - No files will be modified]");
    }
    println!();

    let mut tagged = 0;
    let mut unchanged = 0;
    let mut errors = 0;

    rt.block_on(async {
        for file_path in &files {
            println!("{}", file_path.display());

            let mut file = match AudioFile::open(file_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("  ✗ {}", e);
                    errors += 1;
                    continue;
                }
            };

            let mut changed = false;
            if let Some(pattern) = &pattern {
                let filled = file.fill_from_filename(pattern);
                if !filled.is_empty() {
                    let names: Vec<_> = filled.iter().map(|f| f.name()).collect();
                    println!("  filename: {}", names.join(", "));
                    changed = true;
                }
            }

            match service.tag_file(&mut file, &vendors, options.overwrite).await {
                Ok(outcomes) => {
                    for outcome in &outcomes {
                        print_outcome(outcome);
                    }
                    changed |= outcomes.iter().any(|o| match &o.status {
                        LookupStatus::Merged { report, .. } => report.changed(),
                        _ => false,
                    });
                }
                Err(e) => {
                    eprintln!("  ✗ {}", e);
                    errors += 1;
                    continue;
                }
            }

            if !changed {
                unchanged += 1;
                continue;
            }
            if options.dry_run {
                tagged += 1;
                continue;
            }
            match file.flush() {
                Ok(()) => tagged += 1,
                Err(e) => {
                    eprintln!("  ✗ {}", e);
                    errors += 1;
                }
            }
        }
    });

    println!();
    println!(
        "Completed: {} tagged, {} unchanged, {} errors",
        tagged, unchanged, errors
    );
    Ok(())
}

fn print_outcome(outcome: &LookupOutcome) {
    let vendor = outcome.vendor;
    match &outcome.status {
        LookupStatus::Merged { report, .. } => {
            let names: Vec<_> = report.fields_updated.iter().map(|f| f.name()).collect();
            if names.is_empty() {
                println!("  ✓ {}: matched, nothing new", vendor);
            } else {
                println!("  ✓ {}: {}", vendor, names.join(", "));
            }
        }
        LookupStatus::NoMatch {
            best_score: Some(score),
        } => println!("  - {}: no match (best {:.0}%)", vendor, score * 100.0),
        LookupStatus::NoMatch { best_score: None } => println!("  - {}: no results", vendor),
        LookupStatus::Skipped(reason) => println!("  - {}: skipped ({})", vendor, reason),
        LookupStatus::Failed(reason) => println!("  ✗ {}: {}", vendor, reason),
    }
}
