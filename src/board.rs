//! The kid detail board: every workshop, bucketed by where the kid stands.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Progress, Workshop};

/// Workshops of one kid split into the four board lists.
///
/// `bookmarked` overlaps with the other lists: a pinned workshop still shows
/// up under its status. The three status lists are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KidBoard {
    pub bookmarked: Vec<Workshop>,
    /// Presented but not validated yet.
    pub in_progress: Vec<Workshop>,
    /// Never presented nor validated.
    pub available: Vec<Workshop>,
    pub validated: Vec<Workshop>,
}

impl KidBoard {
    /// Lists follow the order of `workshops`.
    pub fn build(workshops: &[Workshop], progresses: &[Progress]) -> Self {
        let by_workshop: HashMap<Uuid, &Progress> =
            progresses.iter().map(|p| (p.workshop_id, p)).collect();

        let mut board = Self::default();
        for workshop in workshops {
            let progress = by_workshop.get(&workshop.id);

            if progress.is_some_and(|p| p.is_bookmarked()) {
                board.bookmarked.push(workshop.clone());
            }

            match progress {
                Some(p) if p.is_validated() => board.validated.push(workshop.clone()),
                Some(p) if p.is_presented() => board.in_progress.push(workshop.clone()),
                _ => board.available.push(workshop.clone()),
            }
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn workshop(name: &str) -> Workshop {
        let at = Utc.with_ymd_and_hms(2023, 9, 1, 0, 0, 0).unwrap();
        Workshop {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn progress_on(workshop: &Workshop, bookmarked: bool, presented: bool, validated: bool) -> Progress {
        let at = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        Progress {
            id: Uuid::new_v4(),
            kid_id: Uuid::nil(),
            workshop_id: workshop.id,
            bookmarked_at: bookmarked.then_some(at),
            presented_at: presented.then_some(at),
            validated_at: validated.then_some(at),
        }
    }

    fn names(list: &[Workshop]) -> Vec<&str> {
        list.iter().map(|w| w.name.as_str()).collect()
    }

    #[test]
    fn buckets_workshops_by_status() {
        let cubes = workshop("Cubes");
        let eau = workshop("Eau");
        let perles = workshop("Perles");
        let sable = workshop("Sable");
        let workshops = vec![cubes.clone(), eau.clone(), perles.clone(), sable.clone()];
        let progresses = vec![
            progress_on(&cubes, false, true, false),
            progress_on(&eau, true, false, false),
            progress_on(&perles, false, true, true),
        ];

        let board = KidBoard::build(&workshops, &progresses);
        assert_eq!(names(&board.bookmarked), vec!["Eau"]);
        assert_eq!(names(&board.in_progress), vec!["Cubes"]);
        assert_eq!(names(&board.available), vec!["Eau", "Sable"]);
        assert_eq!(names(&board.validated), vec!["Perles"]);
    }

    #[test]
    fn validated_without_presentation_counts_as_validated() {
        let w = workshop("Lettres rugueuses");
        let board = KidBoard::build(&[w.clone()], &[progress_on(&w, false, false, true)]);
        assert_eq!(names(&board.validated), vec!["Lettres rugueuses"]);
        assert!(board.in_progress.is_empty());
        assert!(board.available.is_empty());
    }

    #[test]
    fn no_progress_means_everything_is_available() {
        let workshops = vec![workshop("A"), workshop("B")];
        let board = KidBoard::build(&workshops, &[]);
        assert_eq!(names(&board.available), vec!["A", "B"]);
        assert!(board.bookmarked.is_empty());
    }
}
