use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

/* Stats contains the ranch statistics record, as accumulated by the trackers,
 * and the payout arithmetic applied to it.
 * A record maps player mentions to their milk and egg counts, and keeps the
 * order in which players appear in the file.
 */

pub const MILK_RATE: f64 = 1.25;
pub const EGG_RATE: f64 = 1.25;

const BACKUP_PREFIX: &str = "payout";

#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    #[error("Invalid stats file: {0}")]
    Parse(serde_json::Error),
    #[error("Invalid stats for {player}: {source}")]
    InvalidEntry {
        player: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub milk: f64,
    #[serde(default)]
    pub eggs: f64,
}

impl PlayerStats {
    pub fn total_profit(&self) -> f64 {
        self.milk * MILK_RATE + self.eggs * EGG_RATE
    }
}

// Formats an amount in dollars, with exactly two decimal places.
pub fn display_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsRecord {
    entries: Map<String, Value>,
}

impl StatsRecord {
    /* Parses the contents of a stats file.
     * Blank content counts as an empty record, anything else must be a JSON object.
     */
    pub fn parse(text: &str) -> Result<StatsRecord, StatsError> {
        if text.trim().is_empty() {
            return Ok(StatsRecord::default());
        }

        let entries: Map<String, Value> = serde_json::from_str(text).map_err(StatsError::Parse)?;
        Ok(StatsRecord { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Player stats in file order. Fails on the first entry that is not a stats object.
    pub fn players(&self) -> Result<Vec<(String, PlayerStats)>, StatsError> {
        self.entries
            .iter()
            .map(|(player, value)| {
                PlayerStats::deserialize(value)
                    .map(|stats| (player.clone(), stats))
                    .map_err(|source| StatsError::InvalidEntry {
                        player: player.clone(),
                        source,
                    })
            })
            .collect()
    }

    // Pretty-printed JSON, two-space indentation, entries kept verbatim.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/* Builds the backup file path for a ranch payout.
 * Path separators in the ranch name are replaced so the file stays in the backup directory.
 */
pub fn backup_path(dir: &Path, ranch_name: &str, epoch_millis: i64) -> PathBuf {
    let name: String = ranch_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.join(format!("{BACKUP_PREFIX}_{name}_{epoch_millis}.json"))
}

// Writes a snapshot of the record. Never touches the source stats file.
pub async fn write_backup(
    dir: &Path,
    ranch_name: &str,
    record: &StatsRecord,
    epoch_millis: i64,
) -> std::io::Result<PathBuf> {
    let path = backup_path(dir, ranch_name, epoch_millis);
    let json = record.to_pretty_json()?;
    tokio::fs::write(&path, json).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_is_empty() {
        assert!(StatsRecord::parse("").unwrap().is_empty());
        assert!(StatsRecord::parse("  \n").unwrap().is_empty());
        assert!(StatsRecord::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            StatsRecord::parse("{\"@Alice\": "),
            Err(StatsError::Parse(_))
        ));
        assert!(matches!(
            StatsRecord::parse("[1, 2]"),
            Err(StatsError::Parse(_))
        ));
    }

    #[test]
    fn test_payout_amount() {
        let record = StatsRecord::parse(r#"{"@Alice": {"milk": 10, "eggs": 4}}"#).unwrap();
        let players = record.players().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].0, "@Alice");
        assert_eq!(players[0].1.total_profit(), 17.5);
        assert_eq!(display_amount(players[0].1.total_profit()), "$17.50");
    }

    #[test]
    fn test_players_keep_file_order() {
        let record = StatsRecord::parse(
            r#"{"@Zed": {"milk": 1, "eggs": 0}, "@Amy": {"milk": 0, "eggs": 3}, "@Mo": {"eggs": 2}}"#,
        )
        .unwrap();
        let players: Vec<String> = record
            .players()
            .unwrap()
            .into_iter()
            .map(|(player, _)| player)
            .collect();
        assert_eq!(players, vec!["@Zed", "@Amy", "@Mo"]);
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let record = StatsRecord::parse(r#"{"@Mo": {"eggs": 2}}"#).unwrap();
        let players = record.players().unwrap();
        assert_eq!(display_amount(players[0].1.total_profit()), "$2.50");
    }

    #[test]
    fn test_invalid_entry() {
        let record = StatsRecord::parse(r#"{"@Bob": {"milk": "lots"}}"#).unwrap();
        match record.players() {
            Err(StatsError::InvalidEntry { player, .. }) => assert_eq!(player, "@Bob"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_backup_path() {
        let path = backup_path(Path::new("backups"), "Sunny", 1700000000123);
        assert_eq!(path, PathBuf::from("backups/payout_Sunny_1700000000123.json"));

        let path = backup_path(Path::new("backups"), "North/South", 1);
        assert_eq!(path, PathBuf::from("backups/payout_North_South_1.json"));
    }

    #[tokio::test]
    async fn test_write_backup_matches_record() {
        let dir = tempfile::tempdir().unwrap();
        let text = r#"{"@Alice": {"milk": 10, "eggs": 4, "note": "kept"}, "@Bob": {"milk": 0.5, "eggs": 1}}"#;
        let record = StatsRecord::parse(text).unwrap();

        let path = write_backup(dir.path(), "Sunny", &record, 42).await.unwrap();
        assert_eq!(path, dir.path().join("payout_Sunny_42.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \"@Alice\": {\n    \"milk\": 10,"));
        assert_eq!(StatsRecord::parse(&written).unwrap(), record);
    }
}
