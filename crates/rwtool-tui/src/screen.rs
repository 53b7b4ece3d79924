//! Screen identifiers and tab-bar order.

use std::fmt;

use rwtool_core::{Role, ScreenKind};

/// The seven console screens, navigable by number keys 1-7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Dashboard,
    Domains,
    Approvals,
    Groups,
    Catalog,
    MySubscriptions,
    Reports,
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 7] = [
        Self::Dashboard,
        Self::Domains,
        Self::Approvals,
        Self::Groups,
        Self::Catalog,
        Self::MySubscriptions,
        Self::Reports,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Domains => 2,
            Self::Approvals => 3,
            Self::Groups => 4,
            Self::Catalog => 5,
            Self::MySubscriptions => 6,
            Self::Reports => 7,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    pub fn kind(self) -> ScreenKind {
        match self {
            Self::Dashboard => ScreenKind::Dashboard,
            Self::Domains => ScreenKind::Domains,
            Self::Approvals => ScreenKind::Approvals,
            Self::Groups => ScreenKind::UserGroups,
            Self::Catalog => ScreenKind::Catalog,
            Self::MySubscriptions => ScreenKind::MySubscriptions,
            Self::Reports => ScreenKind::Reports,
        }
    }

    /// Tab label, shared with the CLI's screen names.
    pub fn label(self) -> String {
        self.kind().to_string()
    }

    /// Whether the role's navigation hint includes this screen. The
    /// server still decides what each call may do.
    pub fn suggested_for(self, role: Role) -> bool {
        role.is_administrative() || !self.kind().is_administrative()
    }

    /// Screen to open first for a role.
    pub fn landing(role: Role) -> Self {
        role.landing_screen().into()
    }
}

impl From<ScreenKind> for ScreenId {
    fn from(kind: ScreenKind) -> Self {
        match kind {
            ScreenKind::Dashboard => Self::Dashboard,
            ScreenKind::Domains => Self::Domains,
            ScreenKind::Approvals => Self::Approvals,
            ScreenKind::UserGroups => Self::Groups,
            ScreenKind::Catalog => Self::Catalog,
            ScreenKind::MySubscriptions => Self::MySubscriptions,
            ScreenKind::Reports => Self::Reports,
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_keys_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(8), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Reports.next(), ScreenId::Dashboard);
        assert_eq!(ScreenId::Dashboard.prev(), ScreenId::Reports);
        assert_eq!(ScreenId::Approvals.next(), ScreenId::Groups);
    }

    #[test]
    fn landing_follows_role() {
        assert_eq!(ScreenId::landing(Role::Admin), ScreenId::Dashboard);
        assert_eq!(ScreenId::landing(Role::Ops), ScreenId::Dashboard);
        assert_eq!(ScreenId::landing(Role::User), ScreenId::Catalog);
    }

    #[test]
    fn subscriber_hint_hides_admin_screens() {
        assert!(!ScreenId::Approvals.suggested_for(Role::User));
        assert!(ScreenId::Reports.suggested_for(Role::User));
        assert!(ScreenId::Approvals.suggested_for(Role::Ops));
    }

    #[test]
    fn labels_match_screen_names() {
        assert_eq!(ScreenId::Groups.label(), "Groups");
        assert_eq!(ScreenId::MySubscriptions.to_string(), "My Subscriptions");
    }
}
