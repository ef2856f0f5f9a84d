use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;

mod models;
mod rotation;


use crate::models::{DanceCatalog, DanceId};
use crate::rotation::{RecentHistory, SelectionEngine, SelectionProfile};
use crate::rotation::naming::RotationNaming;

#[derive(Parser)]
#[command(name = "rotation-generator")]
#[command(about = "Dance rotation generator for ballroom practice and social sessions")]
#[command(version)]
struct Args {
    /// Path to the dance catalog JSON file
    #[arg(short = 'c', long = "catalog", default_value = "dances.json")]
    catalog_file: String,

    /// Path to the selection profile JSON file
    #[arg(short = 'p', long = "profiles", default_value = "profiles.json")]
    profile_file: String,

    /// Number of selections per rotation (continuous mode)
    #[arg(short = 'l', long = "length", default_value_t = 30)]
    length: usize,

    /// Build an exact mix consuming the catalog counts as a finite supply
    #[arg(short = 'm', long = "mix")]
    mix: bool,

    /// RNG seed for a reproducible rotation
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Validate input files up front so a bad path fails before any work
    for path in [&args.catalog_file, &args.profile_file] {
        if !std::path::Path::new(path).exists() {
            eprintln!("Error: input file '{path}' not found.");
            eprintln!("Please ensure the file exists or point at a different one.");
            return Err(anyhow::anyhow!("Input file '{}' not found", path));
        }
    }

    let catalog = DanceCatalog::load_from_file(&args.catalog_file)?;
    if catalog.is_empty() {
        return Err(anyhow::anyhow!(
            "Dance catalog '{}' contains no dances",
            args.catalog_file
        ));
    }
    println!(
        "Loaded {} dance categories from {}",
        catalog.len(),
        args.catalog_file
    );

    if !args.quiet {
        println!("\nCatalog contents:");
        for dance in catalog.iter() {
            let tags_display = if dance.tags.is_empty() {
                "none".to_string()
            } else {
                dance.tags.join(", ")
            };
            println!(
                "- {} [{} songs] fast: {} | tags: {}",
                dance.name,
                dance.song_count,
                if dance.is_fast { "yes" } else { "no" },
                tags_display
            );
        }
    }

    let profiles = match SelectionProfile::load_all_from_file(&args.profile_file) {
        Ok(profiles) => {
            println!("Loaded {} selection profiles", profiles.len());
            profiles
        }
        Err(e) => {
            eprintln!("Failed to load selection profiles: {e}");
            return Err(anyhow::anyhow!("Failed to load selection profiles: {}", e));
        }
    };

    // The inventory snapshot comes straight from the library counts
    let counts: Vec<(DanceId, u32)> = catalog
        .iter()
        .map(|d| (d.id.clone(), d.song_count))
        .collect();

    let mut results = Vec::new();

    for profile in profiles {
        let profile_name = profile.name.clone();
        println!("\n=== {} ===", profile_name.to_uppercase());

        let sequence = match generate_rotation(&args, &catalog, counts.clone(), profile) {
            Ok(sequence) => sequence,
            Err(e) => {
                eprintln!("Failed to generate rotation for '{profile_name}': {e}");
                results.push((profile_name, false, format!("Error: {e}")));
                continue;
            }
        };

        let mut per_dance: HashMap<String, usize> = HashMap::new();
        for id in &sequence {
            *per_dance.entry(id.clone()).or_insert(0) += 1;
        }

        let repeats = sequence
            .windows(2)
            .filter(|pair| pair[0] == pair[1])
            .count();
        let fast_pairs = sequence
            .windows(2)
            .filter(|pair| catalog.is_fast(&pair[0]) && catalog.is_fast(&pair[1]))
            .count();

        let rotation_name = RotationNaming::generate_rotation_name(profile_name.clone(), &per_dance);
        println!("Rotation: {rotation_name}");
        println!(
            "Selections: {} | Immediate repeats: {} | Fast back-to-back: {}",
            sequence.len(),
            repeats,
            fast_pairs
        );

        let mut distribution: Vec<_> = per_dance.iter().collect();
        distribution.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let top: Vec<String> = distribution
            .iter()
            .map(|(dance, count)| format!("{dance} ({count})"))
            .collect();
        println!("Distribution: {}", top.join(", "));

        if !args.quiet {
            println!("\nSequence:");
            for (i, id) in sequence.iter().enumerate() {
                let fast_indicator = if catalog.is_fast(id) { " *fast*" } else { "" };
                println!("  {}. {}{}", i + 1, id, fast_indicator);
            }
        }

        results.push((profile_name, true, format!("{} selections", sequence.len())));
    }

    // Summary suitable for scripted runs
    println!("\n=== GENERATION SUMMARY ===");
    let successes = results.iter().filter(|(_, ok, _)| *ok).count();
    println!("Generated {successes}/{} rotations", results.len());
    for (name, ok, message) in &results {
        let status = if *ok { "ok " } else { "err" };
        println!("[{status}] {name}: {message}");
    }

    if successes == 0 {
        return Err(anyhow::anyhow!("Rotation generation failed"));
    }

    Ok(())
}

/// Run one engine session the way a player would: select, record, append to
/// the externally-owned history, advance the prior counter, repeat.
fn generate_rotation(
    args: &Args,
    catalog: &DanceCatalog,
    counts: Vec<(DanceId, u32)>,
    profile: SelectionProfile,
) -> Result<Vec<DanceId>> {
    let history = RecentHistory::new();

    let mut engine = if args.mix {
        SelectionEngine::new_mix_build(
            catalog.clone(),
            counts,
            profile,
            Some(Box::new(history.clone())),
        )?
    } else {
        SelectionEngine::new(
            catalog.clone(),
            counts,
            profile,
            Some(Box::new(history.clone())),
        )?
    };
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }

    let mut sequence = Vec::new();
    loop {
        if !args.mix && sequence.len() >= args.length {
            break;
        }
        let Some(id) = engine.select(history.len() as u32) else {
            break; // Mix supply exhausted
        };
        if args.mix {
            engine.consume_supply(&id);
        } else {
            engine.record_play_weight(&id);
        }
        engine.record_last_played(&id);
        history.push(id.clone());
        sequence.push(id);
    }

    Ok(sequence)
}
