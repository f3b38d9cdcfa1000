// Capability resolver: maps an actor's role and profile flags to permitted
// actions and viewable routes. Pure lookups, no I/O.

pub mod capability;
pub mod role;

pub use capability::{Capability, CapabilitySet, UnknownCapability};
pub use role::{Role, UnknownRole};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auxiliary profile attributes that sit beside the role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub is_investor: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

/// The authenticated caller of every capability check and transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    #[serde(default)]
    pub profile: Profile,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self {
            id,
            role,
            profile: Profile::default(),
        }
    }

    pub fn investor(mut self) -> Self {
        self.profile.is_investor = true;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn display_name(&self) -> String {
        self.profile
            .display_name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn can(&self, capability: Capability) -> bool {
        can(self, capability)
    }
}

/// Role -> capability table. The match is exhaustive, so adding a role
/// without deciding its capabilities does not compile.
pub const fn capabilities_for(role: Role) -> CapabilitySet {
    use Capability::*;

    match role {
        Role::Worker => CapabilitySet::of(&[SubmitWork, ViewOwnWork]),
        Role::Trader => CapabilitySet::of(&[SubmitWork, ViewOwnWork, UseTradingJournal]),
        Role::TeamLead => {
            CapabilitySet::of(&[SubmitWork, ViewOwnWork, ViewTeamWork, ApproveReports])
        }
        Role::DepartmentHead => CapabilitySet::of(&[
            SubmitWork,
            ViewOwnWork,
            ViewTeamWork,
            ViewAllWork,
            ApproveReports,
            ViewPayroll,
            ResolveComplaints,
            ViewAttentionSignals,
        ]),
        Role::ReportAdmin => CapabilitySet::of(&[
            ViewOwnWork,
            ViewTeamWork,
            ViewAllWork,
            ApproveReports,
            OverrideReports,
            ViewAuditLogs,
            ViewAttentionSignals,
        ]),
        Role::FinanceAdmin => CapabilitySet::of(&[
            ViewOwnWork,
            ViewAllWork,
            ViewPayroll,
            ManagePayroll,
            ViewAuditLogs,
        ]),
        Role::InvestmentAdmin => CapabilitySet::of(&[
            ViewOwnWork,
            ViewInvestments,
            ManageInvestments,
            ViewAuditLogs,
        ]),
        Role::UserAdmin => CapabilitySet::of(&[ViewOwnWork, ManageUsers, ViewAuditLogs]),
        // Supreme authority
        Role::GeneralOverseer => CapabilitySet::ALL,
    }
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    if role == Role::GeneralOverseer {
        return true;
    }
    capabilities_for(role).contains(capability)
}

/// Investors may view investments whatever their role
pub fn is_investor_override(capability: Capability, profile: &Profile) -> bool {
    capability == Capability::ViewInvestments && profile.is_investor
}

pub fn can(actor: &Actor, capability: Capability) -> bool {
    let allowed =
        is_investor_override(capability, &actor.profile) || has_capability(actor.role, capability);
    tracing::trace!(
        "capability check: actor={} role={} capability={} allowed={}",
        actor.id, actor.role, capability, allowed
    );
    allowed
}

/// Effective capabilities of an actor, including profile overrides
pub fn effective_capabilities(actor: &Actor) -> CapabilitySet {
    Capability::ALL
        .iter()
        .copied()
        .filter(|cap| can(actor, *cap))
        .collect()
}

/// String entry point for CLI and HTTP inputs. Unknown names fail closed.
pub fn can_named(role: &str, capability: &str, profile: &Profile) -> bool {
    let role = match role.parse::<Role>() {
        Ok(role) => role,
        Err(e) => {
            tracing::debug!("capability check denied: {}", e);
            return false;
        }
    };
    let capability = match capability.parse::<Capability>() {
        Ok(cap) => cap,
        Err(e) => {
            tracing::debug!("capability check denied: {}", e);
            return false;
        }
    };
    is_investor_override(capability, profile) || has_capability(role, capability)
}

/// Application areas an actor may navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Dashboard,
    Tasks,
    WorkReports,
    ReviewQueue,
    Payroll,
    Investments,
    TradingJournal,
    Governance,
    Users,
    AuditLogs,
    Messages,
    Notifications,
}

impl Route {
    pub const ALL: [Route; 12] = [
        Route::Dashboard,
        Route::Tasks,
        Route::WorkReports,
        Route::ReviewQueue,
        Route::Payroll,
        Route::Investments,
        Route::TradingJournal,
        Route::Governance,
        Route::Users,
        Route::AuditLogs,
        Route::Messages,
        Route::Notifications,
    ];

    /// Capability gating the route, `None` for routes open to every actor
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Route::Dashboard | Route::Messages | Route::Notifications => None,
            Route::Tasks | Route::WorkReports => Some(Capability::ViewOwnWork),
            Route::ReviewQueue => Some(Capability::ApproveReports),
            Route::Payroll => Some(Capability::ViewPayroll),
            Route::Investments => Some(Capability::ViewInvestments),
            Route::TradingJournal => Some(Capability::UseTradingJournal),
            Route::Governance => Some(Capability::ResolveComplaints),
            Route::Users => Some(Capability::ManageUsers),
            Route::AuditLogs => Some(Capability::ViewAuditLogs),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Dashboard => "dashboard",
            Route::Tasks => "tasks",
            Route::WorkReports => "work_reports",
            Route::ReviewQueue => "review_queue",
            Route::Payroll => "payroll",
            Route::Investments => "investments",
            Route::TradingJournal => "trading_journal",
            Route::Governance => "governance",
            Route::Users => "users",
            Route::AuditLogs => "audit_logs",
            Route::Messages => "messages",
            Route::Notifications => "notifications",
        }
    }
}

pub fn viewable_routes(actor: &Actor) -> Vec<Route> {
    Route::ALL
        .iter()
        .copied()
        .filter(|route| route.required_capability().map_or(true, |cap| can(actor, cap)))
        .collect()
}
