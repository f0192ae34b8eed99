use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The record linking one kid to one workshop.
///
/// A record is created the first time a kid interacts with a workshop
/// (bookmark, presentation or validation) and mutated afterwards. The two
/// milestone timestamps are independently optional: `validated_at` normally
/// follows `presented_at`, but nothing in the data model enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub id: Uuid,
    pub kid_id: Uuid,
    pub workshop_id: Uuid,
    /// Set while the workshop is pinned on the kid's board.
    pub bookmarked_at: Option<DateTime<Utc>>,
    pub presented_at: Option<DateTime<Utc>>,
    pub validated_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn is_bookmarked(&self) -> bool {
        self.bookmarked_at.is_some()
    }

    pub fn is_presented(&self) -> bool {
        self.presented_at.is_some()
    }

    pub fn is_validated(&self) -> bool {
        self.validated_at.is_some()
    }
}

/// A mutation applied to the (kid, workshop) progress record.
///
/// - `Bookmark` / `Unbookmark`: pin or unpin the workshop on the kid's board
/// - `Present`: record the presentation
/// - `Validate`: record the validation, and the presentation too if missing
/// - `Reset`: clear both presentation and validation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressAction {
    Bookmark,
    Unbookmark,
    Present,
    Validate,
    Reset,
}

impl ProgressAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::Unbookmark => "unbookmark",
            Self::Present => "present",
            Self::Validate => "validate",
            Self::Reset => "reset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bookmark" => Some(Self::Bookmark),
            "unbookmark" => Some(Self::Unbookmark),
            "present" => Some(Self::Present),
            "validate" => Some(Self::Validate),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }

    /// Apply the action to a record, stamping with `at`.
    pub fn apply(&self, progress: &mut Progress, at: DateTime<Utc>) {
        match self {
            Self::Bookmark => progress.bookmarked_at = Some(at),
            Self::Unbookmark => progress.bookmarked_at = None,
            Self::Present => progress.presented_at = Some(at),
            Self::Validate => {
                progress.presented_at.get_or_insert(at);
                progress.validated_at = Some(at);
            }
            Self::Reset => {
                progress.presented_at = None;
                progress.validated_at = None;
            }
        }
    }
}

/// Optional body for a progress action. `at` defaults to now.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressActionInput {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn blank() -> Progress {
        Progress {
            id: Uuid::new_v4(),
            kid_id: Uuid::new_v4(),
            workshop_id: Uuid::new_v4(),
            bookmarked_at: None,
            presented_at: None,
            validated_at: None,
        }
    }

    #[test]
    fn validate_fills_missing_presentation() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let mut progress = blank();
        ProgressAction::Validate.apply(&mut progress, at);
        assert_eq!(progress.presented_at, Some(at));
        assert_eq!(progress.validated_at, Some(at));
    }

    #[test]
    fn validate_keeps_earlier_presentation() {
        let presented = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let validated = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let mut progress = blank();
        ProgressAction::Present.apply(&mut progress, presented);
        ProgressAction::Validate.apply(&mut progress, validated);
        assert_eq!(progress.presented_at, Some(presented));
        assert_eq!(progress.validated_at, Some(validated));
    }

    #[test]
    fn reset_keeps_bookmark() {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let mut progress = blank();
        ProgressAction::Bookmark.apply(&mut progress, at);
        ProgressAction::Validate.apply(&mut progress, at);
        ProgressAction::Reset.apply(&mut progress, at);
        assert!(progress.is_bookmarked());
        assert!(!progress.is_presented());
        assert!(!progress.is_validated());
    }

    #[test]
    fn action_names_round_trip() {
        for action in [
            ProgressAction::Bookmark,
            ProgressAction::Unbookmark,
            ProgressAction::Present,
            ProgressAction::Validate,
            ProgressAction::Reset,
        ] {
            assert_eq!(ProgressAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(ProgressAction::from_str("archive"), None);
    }
}
