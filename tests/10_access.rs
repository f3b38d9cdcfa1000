use uuid::Uuid;

use workforce_api::access::{
    can, can_named, capabilities_for, viewable_routes, Actor, Capability, Profile, Role, Route,
};

#[test]
fn capability_checks_are_total_and_deterministic() {
    for role in Role::ALL {
        let actor = Actor::new(Uuid::new_v4(), role);
        for cap in Capability::ALL {
            let first = can(&actor, *cap);
            assert_eq!(first, can(&actor, *cap), "{} / {}", role, cap);
            assert_eq!(first, capabilities_for(role).contains(*cap));
        }
    }
}

#[test]
fn general_overseer_holds_everything_any_role_holds() {
    let overseer = capabilities_for(Role::GeneralOverseer);
    for role in Role::ALL {
        assert!(overseer.is_superset(capabilities_for(role)), "{} not covered", role);
    }
}

#[test]
fn investor_profile_unlocks_investments_only() {
    let employee = Actor::new(Uuid::new_v4(), "employee".parse().unwrap()).investor();
    assert_eq!(employee.role, Role::Worker);
    assert!(can(&employee, Capability::ViewInvestments));
    assert!(!can(&employee, Capability::ManageInvestments));
    assert!(!can(&Actor::new(Uuid::new_v4(), Role::Worker), Capability::ViewInvestments));

    let investor = Profile {
        is_investor: true,
        ..Profile::default()
    };
    assert!(can_named("employee", "canViewInvestments", &investor));
    assert!(!can_named("employee", "canViewInvestments", &Profile::default()));
}

#[test]
fn unknown_names_fail_closed() {
    let profile = Profile::default();
    assert!(!can_named("janitor", "canSubmitWork", &profile));
    assert!(!can_named("general_overseer", "canLaunchRockets", &profile));
    assert!(can_named("general_overseer", "canOverrideReports", &profile));
}

#[test]
fn routes_follow_capabilities() {
    let worker = viewable_routes(&Actor::new(Uuid::new_v4(), Role::Worker));
    assert!(worker.contains(&Route::Dashboard));
    assert!(worker.contains(&Route::WorkReports));
    assert!(!worker.contains(&Route::ReviewQueue));
    assert!(!worker.contains(&Route::AuditLogs));

    let overseer = viewable_routes(&Actor::new(Uuid::new_v4(), Role::GeneralOverseer));
    assert_eq!(overseer.len(), Route::ALL.len());
}
