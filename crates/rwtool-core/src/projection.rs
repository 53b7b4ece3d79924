// ── Filtered view projection ──
//
// Derives the visible subset of a synced collection from the search
// text and status filter. Pure: never touches the controller.

use std::fmt;
use std::sync::Arc;

use crate::model::{Domain, SubscriptionRequest, UserGroup};

/// A record that can be searched and, optionally, filtered by status.
pub trait Searchable {
    /// Fields matched against the search text.
    fn search_fields(&self) -> Vec<&str>;

    /// Status compared against a concrete filter. `None` never matches one.
    fn status(&self) -> Option<&str> {
        None
    }
}

/// Case folding shared by the search and status predicates.
fn fold(s: &str) -> String {
    s.to_lowercase()
}

/// Status filter. `All` passes every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Case-insensitive exact match against the record's status.
    Only(String),
}

impl StatusFilter {
    /// Parse user input: `"All"`, `"all"`, blank or absent mean `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::All,
            Some(s) if s.eq_ignore_ascii_case("all") => Self::All,
            Some(s) => Self::Only(s.to_owned()),
        }
    }

    pub fn matches(&self, status: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => status.is_some_and(|s| fold(s) == fold(wanted)),
        }
    }

    /// Step through `choices`, wrapping back to `All` after the last one.
    pub fn cycle(&self, choices: &[&str]) -> Self {
        let next = match self {
            Self::All => choices.first(),
            Self::Only(current) => choices
                .iter()
                .position(|c| fold(c) == fold(current))
                .and_then(|i| choices.get(i + 1)),
        };
        next.map_or(Self::All, |c| Self::Only((*c).to_owned()))
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StatusFilter {
    fn from(raw: &str) -> Self {
        Self::parse(Some(raw))
    }
}

/// Search text and status filter as one unit of view state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: String,
    pub status: StatusFilter,
}

/// Records whose searchable fields contain `search` and whose status
/// passes `status`. Order is preserved.
pub fn project<T: Searchable>(items: &[Arc<T>], search: &str, status: &StatusFilter) -> Vec<Arc<T>> {
    project_with(items, search, status, T::search_fields, T::status)
}

/// Like [`project`], with explicit field and status accessors for
/// records that are searched differently on different screens.
pub fn project_with<T, F, S>(
    items: &[Arc<T>],
    search: &str,
    status: &StatusFilter,
    fields: F,
    status_of: S,
) -> Vec<Arc<T>>
where
    F: Fn(&T) -> Vec<&str>,
    S: Fn(&T) -> Option<&str>,
{
    let needle = fold(search);
    items
        .iter()
        .filter(|item| {
            let item: &T = item;
            status.matches(status_of(item))
                && (needle.is_empty()
                    || fields(item)
                        .into_iter()
                        .any(|f| fold(f).contains(&needle)))
        })
        .cloned()
        .collect()
}

// ── Searchable records ───────────────────────────────────────────────

impl Searchable for Domain {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }
}

/// Admin queue: requester and domain.
impl Searchable for SubscriptionRequest {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.user_name.as_str(),
            self.user_email.as_str(),
            self.domain_name.as_str(),
        ]
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

/// Fields a subscriber searches their own requests by.
pub fn own_request_fields(r: &SubscriptionRequest) -> Vec<&str> {
    let mut fields = vec![r.domain_name.as_str()];
    if let Some(reason) = r.rejection_reason.as_deref() {
        fields.push(reason);
    }
    fields
}

impl Searchable for UserGroup {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(self.folder_access.len() + 1);
        fields.push(self.ad_group_name.as_str());
        fields.extend(self.folder_access.iter().map(String::as_str));
        fields
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Row {
        name: &'static str,
        status: Option<&'static str>,
    }

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name]
        }

        fn status(&self) -> Option<&str> {
            self.status
        }
    }

    fn rows(spec: &[(&'static str, Option<&'static str>)]) -> Vec<Arc<Row>> {
        spec.iter()
            .map(|&(name, status)| Arc::new(Row { name, status }))
            .collect()
    }

    fn names(v: &[Arc<Row>]) -> Vec<&'static str> {
        v.iter().map(|r| r.name).collect()
    }

    #[test]
    fn search_and_status_are_anded() {
        let items = rows(&[("Finance", Some("pending")), ("Credit", Some("approved"))]);
        let out = project(&items, "fin", &StatusFilter::parse(Some("approved")));
        assert!(out.is_empty());

        let out = project(&items, "fin", &StatusFilter::All);
        assert_eq!(names(&out), vec!["Finance"]);
    }

    #[test]
    fn empty_search_and_all_filter_pass_everything() {
        let items = rows(&[("A", Some("PENDING")), ("B", None)]);
        assert_eq!(names(&project(&items, "", &StatusFilter::All)), vec!["A", "B"]);
        assert_eq!(names(&project(&items, "", &"all".into())), vec!["A", "B"]);
    }

    #[test]
    fn missing_status_never_matches_concrete_filter() {
        let items = rows(&[("A", Some("pending")), ("B", None)]);
        assert_eq!(names(&project(&items, "", &"PENDING".into())), vec!["A"]);
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(StatusFilter::parse(None), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("All")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(Some("REJECTED")), StatusFilter::Only("REJECTED".into()));
    }

    #[test]
    fn status_match_folds_like_search() {
        let items = rows(&[("Bilan", Some("GEPRÜFT")), ("Audit", Some(" pending "))]);
        assert_eq!(names(&project(&items, "", &"geprüft".into())), vec!["Bilan"]);
        assert_eq!(names(&project(&items, "", &"pending".into())), Vec::<&str>::new());
        assert_eq!(StatusFilter::parse(Some("  pending ")), StatusFilter::Only("pending".into()));
    }

    #[test]
    fn cycle_wraps_to_all() {
        let choices = ["PENDING", "APPROVED"];
        let f = StatusFilter::All.cycle(&choices);
        assert_eq!(f, StatusFilter::Only("PENDING".into()));
        let f = f.cycle(&choices);
        assert_eq!(f, StatusFilter::Only("APPROVED".into()));
        assert_eq!(f.cycle(&choices), StatusFilter::All);
    }

    /// Every (search, filter) pair selects exactly the records a direct
    /// reading of the rule would select.
    #[test]
    fn projection_agrees_with_rule() {
        let items = rows(&[
            ("Finance", Some("pending")),
            ("finance-eu", Some("APPROVED")),
            ("Credit", Some("approved")),
            ("Risk", None),
            ("Treasury", Some("rejected")),
        ]);
        let searches = ["", "fin", "FIN", "e", "zzz", "risk"];
        let filters = ["all", "pending", "approved", "rejected", "archived"];

        for search in searches {
            for raw in filters {
                let filter = StatusFilter::parse(Some(raw));
                let expected: Vec<&str> = items
                    .iter()
                    .filter(|r| r.name.to_lowercase().contains(&search.to_lowercase()))
                    .filter(|r| {
                        raw == "all" || r.status.is_some_and(|s| s.to_lowercase() == raw)
                    })
                    .map(|r| r.name)
                    .collect();
                assert_eq!(names(&project(&items, search, &filter)), expected, "{search}/{raw}");
            }
        }
    }

    #[test]
    fn group_search_covers_folders() {
        let group = Arc::new(UserGroup {
            id: 1.into(),
            ad_group_name: "Compliance".into(),
            associated_domain: Some("Finance".into()),
            folder_access: vec!["Audit".into(), "Ledger".into()],
            members: vec![],
            created: None,
            updated: None,
        });
        let items = vec![group];
        assert_eq!(project(&items, "ledg", &StatusFilter::All).len(), 1);
        assert_eq!(project(&items, "hr", &StatusFilter::All).len(), 0);
    }
}
