// Read-side payroll aggregation over approved work items

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::lifecycle::{FinalStatus, WorkItem};

/// Decimal places stored for hours and hourly rates
pub const MONEY_SCALE: u32 = 2;

/// Inclusive date window of a salary period. While the period is open, hours
/// approved only by a team lead can still be overridden by an admin and are
/// reported as provisional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub closed: bool,
}

impl SalaryPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err(format!("salary period ends ({}) before it starts ({})", end, start));
        }
        Ok(Self {
            start,
            end,
            closed: false,
        })
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollLine {
    pub user_id: Uuid,
    pub approved_items: usize,
    pub approved_hours: Decimal,
    /// Approved hours still open to an admin override
    pub provisional_hours: Decimal,
    pub hourly_rate: Decimal,
    pub gross: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub period: SalaryPeriod,
    pub lines: Vec<PayrollLine>,
    pub total_hours: Decimal,
    pub provisional_hours: Decimal,
    pub total_gross: Decimal,
}

/// Sum approved hours per owner inside `period` and price them at the
/// owner's rate, falling back to `default_rate`.
pub fn aggregate(
    items: &[WorkItem],
    period: SalaryPeriod,
    rates: &HashMap<Uuid, Decimal>,
    default_rate: Decimal,
) -> PayrollSummary {
    let mut per_owner: BTreeMap<Uuid, (usize, Decimal, Decimal)> = BTreeMap::new();

    for item in items
        .iter()
        .filter(|item| item.final_status == FinalStatus::Approved && period.contains(item.work_date))
    {
        let entry = per_owner
            .entry(item.owner_id)
            .or_insert((0, Decimal::ZERO, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += item.hours;
        if !period.closed && item.admin_status.is_none() {
            entry.2 += item.hours;
        }
    }

    let lines: Vec<PayrollLine> = per_owner
        .into_iter()
        .map(|(user_id, (approved_items, approved_hours, provisional_hours))| {
            let hourly_rate = rates.get(&user_id).copied().unwrap_or(default_rate);
            PayrollLine {
                user_id,
                approved_items,
                approved_hours,
                provisional_hours,
                hourly_rate,
                gross: approved_hours * hourly_rate,
            }
        })
        .collect();

    let total_hours = lines.iter().map(|l| l.approved_hours).sum();
    let provisional_hours = lines.iter().map(|l| l.provisional_hours).sum();
    let total_gross = lines.iter().map(|l| l.gross).sum();

    PayrollSummary {
        period,
        lines,
        total_hours,
        provisional_hours,
        total_gross,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::work_item::fixtures::new_report;
    use crate::lifecycle::{Decision, ReviewStatus};
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn item(owner: Uuid, hours: &str, day: u32, team_lead: ReviewStatus, admin: Option<Decision>) -> WorkItem {
        let mut new = new_report(1);
        new.hours = hours.parse().unwrap();
        new.work_date = date(day);
        let mut item = WorkItem::submit(owner, new, Utc::now());
        item.team_lead_status = Some(team_lead);
        item.admin_status = admin;
        item.refresh_final_status();
        item
    }

    #[test]
    fn sums_only_approved_items_inside_the_window() {
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let items = vec![
            item(alice, "4.5", 2, ReviewStatus::Approved, None),
            item(alice, "3", 3, ReviewStatus::Rejected, Some(Decision::Approved)),
            item(alice, "8", 4, ReviewStatus::Approved, Some(Decision::Rejected)),
            item(alice, "2", 20, ReviewStatus::Approved, None),
            item(bob, "6", 5, ReviewStatus::Pending, None),
            item(bob, "1.25", 6, ReviewStatus::Approved, None),
        ];
        let period = SalaryPeriod::new(date(1), date(15)).unwrap();
        let rates = HashMap::from([(alice, Decimal::from(20))]);

        let summary = aggregate(&items, period, &rates, Decimal::from(10));
        assert_eq!(summary.lines.len(), 2);

        let a = summary.lines.iter().find(|l| l.user_id == alice).unwrap();
        assert_eq!(a.approved_items, 2);
        assert_eq!(a.approved_hours, "7.5".parse::<Decimal>().unwrap());
        assert_eq!(a.gross, Decimal::from(150));

        let b = summary.lines.iter().find(|l| l.user_id == bob).unwrap();
        assert_eq!(b.hourly_rate, Decimal::from(10));
        assert_eq!(b.gross, "12.5".parse::<Decimal>().unwrap());

        assert_eq!(summary.total_hours, "8.75".parse::<Decimal>().unwrap());
        assert_eq!(summary.total_gross, "162.5".parse::<Decimal>().unwrap());
        // only the admin-approved 3h of alice is settled while the period is open
        assert_eq!(a.provisional_hours, "4.5".parse::<Decimal>().unwrap());
        assert_eq!(summary.provisional_hours, "5.75".parse::<Decimal>().unwrap());
    }

    #[test]
    fn closing_the_period_settles_team_lead_approvals() {
        let owner = Uuid::new_v4();
        let items = vec![
            item(owner, "4", 2, ReviewStatus::Approved, None),
            item(owner, "2", 3, ReviewStatus::Rejected, Some(Decision::Approved)),
        ];
        let open = SalaryPeriod::new(date(1), date(15)).unwrap();
        let rates = HashMap::new();

        let summary = aggregate(&items, open, &rates, Decimal::from(10));
        assert_eq!(summary.provisional_hours, Decimal::from(4));
        assert_eq!(summary.total_hours, Decimal::from(6));

        let summary = aggregate(&items, open.closed(), &rates, Decimal::from(10));
        assert_eq!(summary.provisional_hours, Decimal::ZERO);
        assert_eq!(summary.total_hours, Decimal::from(6));
        assert_eq!(summary.total_gross, Decimal::from(60));
    }

    #[test]
    fn period_bounds_are_inclusive_and_ordered() {
        let period = SalaryPeriod::new(date(1), date(15)).unwrap();
        assert!(period.contains(date(1)));
        assert!(period.contains(date(15)));
        assert!(!period.contains(date(16)));
        assert!(SalaryPeriod::new(date(15), date(1)).is_err());
    }

    #[test]
    fn empty_input_gives_zero_totals() {
        let period = SalaryPeriod::new(date(1), date(2)).unwrap().closed();
        let summary = aggregate(&[], period, &HashMap::new(), Decimal::from(10));
        assert!(summary.lines.is_empty());
        assert_eq!(summary.total_gross, Decimal::ZERO);
        assert!(summary.period.closed);
    }
}
