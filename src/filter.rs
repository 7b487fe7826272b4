// filter.rs
//
// Pure predicates and derivations shared by the projects, tasks and planner
// screens. Everything here is input -> output and cheap enough to re-run on
// every keystroke.

use chrono::NaiveDate;

use crate::entities::{Entity, TaskDigest, TodoItem};

/// "All users" or one owning user id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OwnerFilter {
    #[default]
    All,
    User(String),
}

impl OwnerFilter {
    pub fn matches(&self, entity: &impl Entity) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::User(id) => entity.owner_id() == id,
        }
    }
}

/// Case-insensitive substring match; an empty query matches everything.
pub fn text_matches(haystack: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Inclusive [start, end] calendar window; an absent bound is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date <= e)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Deadline proximity buckets used for visual emphasis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
    Completed,
    NoDeadline,
    /// Due within a day, today, or overdue.
    Imminent,
    /// Due within three days.
    Elevated,
    Normal,
}

/// Classifies a deadline relative to `today` in whole calendar days.
pub fn classify(completed: bool, deadline: Option<NaiveDate>, today: NaiveDate) -> Urgency {
    if completed {
        return Urgency::Completed;
    }
    let Some(deadline) = deadline else {
        return Urgency::NoDeadline;
    };
    let days = (deadline - today).num_days();
    if days <= 1 {
        Urgency::Imminent
    } else if days <= 3 {
        Urgency::Elevated
    } else {
        Urgency::Normal
    }
}

pub fn classify_task(task: &TodoItem, today: NaiveDate) -> Urgency {
    classify(task.completed, task.deadline, today)
}

/// A project inherits the bucket of the nearest deadline among its incomplete
/// tasks; with no dated incomplete task it stays Normal.
pub fn project_urgency(tasks: &[TaskDigest], today: NaiveDate) -> Urgency {
    let nearest = tasks
        .iter()
        .filter(|t| !t.completed)
        .filter_map(|t| t.deadline)
        .min();
    match nearest {
        Some(deadline) => classify(false, Some(deadline), today),
        None => Urgency::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PlannerEntry;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    fn entry(id: &str, owner: &str, content: &str, date: NaiveDate) -> PlannerEntry {
        PlannerEntry {
            id: id.to_string(),
            date,
            content: content.to_string(),
            emoji: "📝".to_string(),
            user_id: owner.to_string(),
            user_email: String::new(),
        }
    }

    fn apply<'a>(
        entries: &'a [PlannerEntry],
        owner: &OwnerFilter,
        query: &str,
        range: DateRange,
    ) -> Vec<&'a PlannerEntry> {
        entries
            .iter()
            .filter(|e| owner.matches(*e) && text_matches(&e.content, query) && range.contains(e.date))
            .collect()
    }

    #[test]
    fn filters_on_the_empty_list_yield_the_empty_list() {
        let none: Vec<PlannerEntry> = Vec::new();
        let owner = OwnerFilter::User("alice".to_string());
        let range = DateRange {
            start: Some(today()),
            end: Some(today()),
        };
        assert!(apply(&none, &owner, "plan", range).is_empty());
    }

    #[test]
    fn identity_filter_preserves_list_and_order() {
        let entries = vec![
            entry("b", "bob", "Buy milk", today()),
            entry("a", "alice", "Write report", today() - Duration::days(3)),
            entry("c", "carol", "Ship release", today() - Duration::days(9)),
        ];
        let visible = apply(&entries, &OwnerFilter::All, "", DateRange::default());
        let ids: Vec<&str> = visible.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn filters_compose_by_and() {
        let entries = vec![
            entry("a", "alice", "Write report", today()),
            entry("b", "alice", "buy MILK", today()),
            entry("c", "bob", "buy milk", today()),
            entry("d", "alice", "buy milk", today() - Duration::days(30)),
        ];
        let owner = OwnerFilter::User("alice".to_string());
        let range = DateRange {
            start: Some(today() - Duration::days(7)),
            end: None,
        };
        let visible = apply(&entries, &owner, "milk", range);
        let ids: Vec<&str> = visible.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let range = DateRange {
            start: Some(today()),
            end: Some(today() + Duration::days(2)),
        };
        assert!(range.contains(today()));
        assert!(range.contains(today() + Duration::days(2)));
        assert!(!range.contains(today() - Duration::days(1)));
        assert!(!range.contains(today() + Duration::days(3)));
    }

    #[test]
    fn urgency_buckets_match_deadline_proximity() {
        let t = today();
        assert_eq!(classify(false, Some(t), t), Urgency::Imminent);
        assert_eq!(classify(false, Some(t + Duration::days(1)), t), Urgency::Imminent);
        assert_eq!(classify(false, Some(t - Duration::days(5)), t), Urgency::Imminent);
        assert_eq!(classify(false, Some(t + Duration::days(3)), t), Urgency::Elevated);
        assert_eq!(classify(false, Some(t + Duration::days(10)), t), Urgency::Normal);
        assert_eq!(classify(false, None, t), Urgency::NoDeadline);
        assert_eq!(classify(true, Some(t), t), Urgency::Completed);
    }

    #[test]
    fn project_urgency_uses_nearest_incomplete_deadline() {
        let t = today();
        let digest = |deadline, completed| TaskDigest { deadline, completed };

        // A far deadline listed first must not mask the nearer one.
        let tasks = vec![
            digest(Some(t + Duration::days(10)), false),
            digest(Some(t + Duration::days(1)), false),
        ];
        assert_eq!(project_urgency(&tasks, t), Urgency::Imminent);

        // Completed tasks and undated tasks do not contribute.
        let tasks = vec![
            digest(Some(t), true),
            digest(None, false),
            digest(Some(t + Duration::days(3)), false),
        ];
        assert_eq!(project_urgency(&tasks, t), Urgency::Elevated);

        assert_eq!(project_urgency(&[], t), Urgency::Normal);
        assert_eq!(project_urgency(&[digest(None, false)], t), Urgency::Normal);
    }

    #[test]
    fn text_match_is_case_insensitive_substring() {
        assert!(text_matches("Quarterly Report", "report"));
        assert!(text_matches("anything", ""));
        assert!(!text_matches("Quarterly Report", "budget"));
    }
}
