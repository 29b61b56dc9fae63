use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A name-unique label, many-to-many with media assets.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

/// Parse the API-boundary comma-separated tag list into trimmed,
/// non-empty, first-seen-wins names (case-sensitive).
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for part in raw.split(',') {
        let name = part.trim();
        if !name.is_empty() && !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_empty() {
        assert_eq!(
            parse_tag_list(" music, ,live ,,concert"),
            vec!["music", "live", "concert"]
        );
    }

    #[test]
    fn test_first_seen_wins_case_sensitive() {
        assert_eq!(
            parse_tag_list("Rock,rock,Rock"),
            vec!["Rock", "rock"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_tag_list("").is_empty());
        assert!(parse_tag_list(" , ,").is_empty());
    }
}
