use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single named permission checked before an action or a route is allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Capability {
    #[serde(rename = "canSubmitWork")]
    SubmitWork = 0,
    #[serde(rename = "canViewOwnWork")]
    ViewOwnWork = 1,
    #[serde(rename = "canViewTeamWork")]
    ViewTeamWork = 2,
    #[serde(rename = "canViewAllWork")]
    ViewAllWork = 3,
    #[serde(rename = "canApproveReports")]
    ApproveReports = 4,
    #[serde(rename = "canOverrideReports")]
    OverrideReports = 5,
    #[serde(rename = "canManageUsers")]
    ManageUsers = 6,
    #[serde(rename = "canViewPayroll")]
    ViewPayroll = 7,
    #[serde(rename = "canManagePayroll")]
    ManagePayroll = 8,
    #[serde(rename = "canViewInvestments")]
    ViewInvestments = 9,
    #[serde(rename = "canManageInvestments")]
    ManageInvestments = 10,
    #[serde(rename = "canUseTradingJournal")]
    UseTradingJournal = 11,
    #[serde(rename = "canResolveComplaints")]
    ResolveComplaints = 12,
    #[serde(rename = "canViewAuditLogs")]
    ViewAuditLogs = 13,
    #[serde(rename = "canViewAttentionSignals")]
    ViewAttentionSignals = 14,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::SubmitWork,
        Capability::ViewOwnWork,
        Capability::ViewTeamWork,
        Capability::ViewAllWork,
        Capability::ApproveReports,
        Capability::OverrideReports,
        Capability::ManageUsers,
        Capability::ViewPayroll,
        Capability::ManagePayroll,
        Capability::ViewInvestments,
        Capability::ManageInvestments,
        Capability::UseTradingJournal,
        Capability::ResolveComplaints,
        Capability::ViewAuditLogs,
        Capability::ViewAttentionSignals,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SubmitWork => "canSubmitWork",
            Capability::ViewOwnWork => "canViewOwnWork",
            Capability::ViewTeamWork => "canViewTeamWork",
            Capability::ViewAllWork => "canViewAllWork",
            Capability::ApproveReports => "canApproveReports",
            Capability::OverrideReports => "canOverrideReports",
            Capability::ManageUsers => "canManageUsers",
            Capability::ViewPayroll => "canViewPayroll",
            Capability::ManagePayroll => "canManagePayroll",
            Capability::ViewInvestments => "canViewInvestments",
            Capability::ManageInvestments => "canManageInvestments",
            Capability::UseTradingJournal => "canUseTradingJournal",
            Capability::ResolveComplaints => "canResolveComplaints",
            Capability::ViewAuditLogs => "canViewAuditLogs",
            Capability::ViewAttentionSignals => "canViewAttentionSignals",
        }
    }

    const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Capability::ALL
            .iter()
            .copied()
            .find(|cap| cap.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Fixed-size set of capabilities, cheap to copy and usable in const tables
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u32);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);
    pub const ALL: CapabilitySet = CapabilitySet::of(Capability::ALL);

    pub const fn of(caps: &[Capability]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < caps.len() {
            bits |= caps[i].bit();
            i += 1;
        }
        CapabilitySet(bits)
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub const fn union(self, other: CapabilitySet) -> Self {
        CapabilitySet(self.0 | other.0)
    }

    pub const fn with(self, cap: Capability) -> Self {
        CapabilitySet(self.0 | cap.bit())
    }

    pub fn is_superset(self, other: CapabilitySet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.iter().copied().filter(move |cap| self.contains(*cap))
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(CapabilitySet::EMPTY, CapabilitySet::with)
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
