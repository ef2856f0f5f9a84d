use chrono::Local;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Helper trait for string formatting
pub trait ToTitleCase {
    fn to_title_case(&self) -> String;
}

impl ToTitleCase for str {
    fn to_title_case(&self) -> String {
        self.split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Rotation naming utilities
pub struct RotationNaming;

impl RotationNaming {
    /// Generate a descriptive name for a rotation from its dance distribution
    pub fn generate_rotation_name(name: String, counts: &HashMap<String, usize>) -> String {
        let day_of_week = Local::now().format("%A").to_string();
        let total: usize = counts.values().sum();
        // Lead with the dominant dance only if it covers at least 40% of selections
        if let Some((dance, &count)) = counts.iter().max_by_key(|(_, c)| *c) {
            if total > 0 && (count as f32 / total as f32) >= 0.4 {
                return format!("{} {} {}", name, day_of_week, dance.to_title_case())
                    .to_lowercase();
            }
            let backup_suffixes = vec![
                "social",
                "rotation",
                "floor mix",
                "session",
                "lineup",
                "program",
            ];
            // Pick a random suffix from the backup list
            let mut rng = rand::thread_rng();
            let random_suffix = backup_suffixes.choose(&mut rng).unwrap();
            return format!("{} {} {}", name, day_of_week, random_suffix).to_lowercase();
        }
        // Fallback to base name
        name
    }
}
