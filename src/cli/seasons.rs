//! Seasons command: print the effective season table

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use crate::config::loader::load_config;
use crate::season::{Season, SeasonParameters, SeasonTable};

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Serialize)]
struct SeasonEntry<'a> {
    key: Season,
    #[serde(flatten)]
    parameters: &'a SeasonParameters,
}

fn entries(table: &SeasonTable) -> Vec<SeasonEntry<'_>> {
    table.iter().map(|(key, parameters)| SeasonEntry { key, parameters }).collect()
}

/// Execute the seasons command
pub fn run_seasons(config: Option<&Path>, json: bool) -> ExitCode {
    let config = match load_config(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let table = config.season_table();

    if json {
        match serde_json::to_string_pretty(&entries(&table)) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{:<8} {:<8} {:>6} {:>5} {:>8} {:>6}  {:<8}  title", "season", "label", "leaves", "snow", "gravity", "wind", "accent");
    for (season, p) in table.iter() {
        println!(
            "{:<8} {:<8} {:>6} {:>5} {:>8} {:>6}  {:<8}  {}",
            season.as_str(),
            p.label,
            p.leaf_count,
            p.snow_count,
            p.gravity,
            format!("{}/{}", p.wind.base, p.wind.gust),
            p.accent,
            p.title
        );
    }
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_entries_flatten_parameters() {
        let table = SeasonTable::default();
        let value = serde_json::to_value(entries(&table)).unwrap();
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[2]["key"], "autumn");
        assert_eq!(list[2]["leaf_count"], 120);
        assert_eq!(list[2]["accent"], "#d35400");
        assert_eq!(list[3]["wind"]["gust"], 180.0);
    }
}
