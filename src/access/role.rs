use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Primary authorization tier of an actor. Every actor holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "employee")]
    Worker,
    Trader,
    TeamLead,
    DepartmentHead,
    ReportAdmin,
    FinanceAdmin,
    InvestmentAdmin,
    UserAdmin,
    GeneralOverseer,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Worker,
        Role::Trader,
        Role::TeamLead,
        Role::DepartmentHead,
        Role::ReportAdmin,
        Role::FinanceAdmin,
        Role::InvestmentAdmin,
        Role::UserAdmin,
        Role::GeneralOverseer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Trader => "trader",
            Role::TeamLead => "team_lead",
            Role::DepartmentHead => "department_head",
            Role::ReportAdmin => "report_admin",
            Role::FinanceAdmin => "finance_admin",
            Role::InvestmentAdmin => "investment_admin",
            Role::UserAdmin => "user_admin",
            Role::GeneralOverseer => "general_overseer",
        }
    }

    /// Human-facing label used in notifications and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Role::Worker => "Worker",
            Role::Trader => "Trader",
            Role::TeamLead => "Team Lead",
            Role::DepartmentHead => "Department Head",
            Role::ReportAdmin => "Report Admin",
            Role::FinanceAdmin => "Finance/HR Admin",
            Role::InvestmentAdmin => "Investment Admin",
            Role::UserAdmin => "User Admin",
            Role::GeneralOverseer => "General Overseer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worker" | "employee" => Ok(Role::Worker),
            "trader" => Ok(Role::Trader),
            "team_lead" => Ok(Role::TeamLead),
            "department_head" => Ok(Role::DepartmentHead),
            "report_admin" => Ok(Role::ReportAdmin),
            "finance_admin" => Ok(Role::FinanceAdmin),
            "investment_admin" => Ok(Role::InvestmentAdmin),
            "user_admin" => Ok(Role::UserAdmin),
            "general_overseer" => Ok(Role::GeneralOverseer),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}
