//! Session identity derived from folder names.
//!
//! Folders are named `<season>_<event>_<session>`, where the event may itself
//! contain underscores (`2023_Las_Vegas_Grand_Prix_R`).

use paddock_core::error::{PaddockError, Result};
use paddock_core::models::SessionKey;

const DELIMITER: char = '_';

/// Split a session folder name into its [`SessionKey`].
///
/// The first token is the season, the last the session type, and everything
/// between is rejoined as the event name (empty when there is nothing
/// between). Fails when there are fewer than two tokens or when the season or
/// session token is empty.
pub fn parse_session_folder(name: &str) -> Result<SessionKey> {
    let parts: Vec<&str> = name.split(DELIMITER).collect();
    if parts.len() < 2 {
        return Err(PaddockError::InvalidSessionFolder(name.to_string()));
    }

    let season = parts[0];
    let session = parts[parts.len() - 1];
    if season.is_empty() || session.is_empty() {
        return Err(PaddockError::InvalidSessionFolder(name.to_string()));
    }

    let event = parts[1..parts.len() - 1].join("_");
    Ok(SessionKey::new(season, event, session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multi_word_event() {
        let key = parse_session_folder("2023_Las_Vegas_Grand_Prix_R").unwrap();
        assert_eq!(key, SessionKey::new("2023", "Las_Vegas_Grand_Prix", "R"));
    }

    #[test]
    fn test_parse_single_word_event() {
        let key = parse_session_folder("2022_Monaco_Q").unwrap();
        assert_eq!(key.season, "2022");
        assert_eq!(key.event, "Monaco");
        assert_eq!(key.session, "Q");
    }

    #[test]
    fn test_parse_without_event() {
        let key = parse_session_folder("2021_R").unwrap();
        assert_eq!(key, SessionKey::new("2021", "", "R"));
    }

    #[test]
    fn test_parse_keeps_season_opaque() {
        let key = parse_session_folder("preseason_Bahrain_Testing_FP1").unwrap();
        assert_eq!(key.season, "preseason");
        assert_eq!(key.event, "Bahrain_Testing");
    }

    #[test]
    fn test_parse_recovers_folder_name() {
        for name in [
            "2018_Australian_Grand_Prix_R",
            "2019_Mexican_Grand_Prix_Q",
            "2024_São_Paulo_Grand_Prix_SQ",
        ] {
            let key = parse_session_folder(name).unwrap();
            assert_eq!(key.folder_name(), name);
        }
    }

    #[test]
    fn test_parse_rejects_single_token() {
        let err = parse_session_folder("cache").unwrap_err();
        assert!(matches!(err, PaddockError::InvalidSessionFolder(ref n) if n == "cache"));
    }

    #[test]
    fn test_parse_rejects_empty_tokens() {
        assert!(parse_session_folder("").is_err());
        assert!(parse_session_folder("_Monaco_R").is_err());
        assert!(parse_session_folder("2022_Monaco_").is_err());
    }
}
