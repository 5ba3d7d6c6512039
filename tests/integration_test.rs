//! Integration tests for GymFlow

use chrono::{NaiveDate, TimeZone, Utc};
use gymflow::core::{cpf, dashboard};
use gymflow::models::types::*;
use gymflow::store::classes::NewClass;
use gymflow::store::members::NewMember;
use gymflow::store::payments::NewPayment;
use gymflow::store::users::NewUser;
use gymflow::store::{SessionStore, Store};
use gymflow::utils::pagination::{paginate, PageQuery};

fn member_input(email: &str, cpf_str: &str) -> NewMember {
    NewMember {
        name: "Ana Souza".to_string(),
        email: email.to_string(),
        cpf: cpf::format(cpf_str),
        phone: Some("(11) 98765-4321".to_string()),
        birth_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        address: None,
        photo_url: None,
        height_m: Some(1.70),
        weight_kg: Some(65.0),
        goal: Some(TrainingGoal::Hypertrophy),
        notes: None,
        plan_id: None,
    }
}

fn instructor(store: &Store, email: &str) -> u64 {
    let user = store
        .create_user(NewUser {
            name: "Coach".to_string(),
            email: email.to_string(),
            password: "senha123".to_string(),
            role: Role::Instructor,
            status: None,
            photo_url: None,
            specialty: Some("Functional".to_string()),
            available_hours: None,
        })
        .unwrap();
    store.instructor_profile_for(user.id).unwrap().id
}

#[test]
fn test_cpf_spec_properties() {
    // Known verifier pair
    assert!(cpf::is_valid("123.456.789-09"));
    assert!(!cpf::is_valid("123.456.789-10"));

    // Length and degenerate cases
    assert!(!cpf::is_valid(""));
    assert!(!cpf::is_valid("111.111.111-11"));

    // Formatting is idempotent over already-formatted input
    assert_eq!(cpf::format("12345678909"), "123.456.789-09");
    assert_eq!(cpf::format("123.456.789-09"), "123.456.789-09");

    // normalize is idempotent
    let noisy = " 123.456.789-09 ";
    assert_eq!(cpf::normalize(cpf::normalize(noisy).as_str()), cpf::normalize(noisy));
}

#[test]
fn test_login_flow_against_seeded_store() {
    let store = Store::new();
    store.seed_defaults("admin@gymflow.com", "admin123");
    let sessions = SessionStore::new();

    let admin = store.find_user_by_email("admin@gymflow.com").unwrap();
    assert!(admin.password.verify("admin123"));
    assert!(!admin.password.verify("wrong"));

    let token = sessions.issue(admin.id, admin.role);
    let session = sessions.get(&token).unwrap();
    assert_eq!(session.user_id, admin.id);
    assert_eq!(session.role, Role::Manager);

    assert!(sessions.revoke(&token));
    assert!(sessions.get(&token).is_none());
}

#[test]
fn test_member_lifecycle_with_canonical_cpf() {
    let store = Store::new();

    // Bare digits come back formatted because the caller canonicalizes
    let member = store.create_member(member_input("ana@gym.com", "12345678909")).unwrap();
    assert_eq!(member.cpf, "123.456.789-09");
    assert_eq!(member.status, MemberStatus::Active);

    // Second member with the same CPF is refused
    let err = store
        .create_member(member_input("other@gym.com", "123.456.789-09"))
        .unwrap_err();
    assert_eq!(err.code_str(), "STORE_DUPLICATE_CPF");

    store.delete_member(member.id).unwrap();
    assert!(store.members.get(member.id).is_none());
}

#[test]
fn test_class_capacity_and_occupancy() {
    let store = Store::new();
    let instructor_id = instructor(&store, "coach@gym.com");

    let class = store
        .create_class(NewClass {
            instructor_id,
            modality: ClassModality::Pilates,
            level: SkillLevel::Beginner,
            weekday: 1,
            starts_at: "07:00".to_string(),
            ends_at: "08:00".to_string(),
            capacity: 2,
        })
        .unwrap();

    let m1 = store.create_member(member_input("a@gym.com", "123.456.789-09")).unwrap();
    let m2 = store.create_member(member_input("b@gym.com", "111.444.777-35")).unwrap();
    let m3 = store.create_member(member_input("c@gym.com", "529.982.247-25")).unwrap();

    store.enroll_member(class.id, m1.id).unwrap();
    store.enroll_member(class.id, m2.id).unwrap();
    let err = store.enroll_member(class.id, m3.id).unwrap_err();
    assert_eq!(err.code_str(), "STORE_CLASS_FULL");

    let occupancy = dashboard::class_occupancy(&store);
    assert_eq!(occupancy.len(), 1);
    assert_eq!(occupancy[0].enrolled, 2);
    assert_eq!(occupancy[0].occupancy_percent, 100.0);
}

#[test]
fn test_dashboard_revenue_and_delinquency() {
    let store = Store::new();
    let member = store.create_member(member_input("a@gym.com", "123.456.789-09")).unwrap();

    let august = Utc.with_ymd_and_hms(2026, 8, 5, 9, 0, 0).unwrap();
    let march = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();

    let paid_now = store
        .create_payment(NewPayment {
            member_id: member.id,
            reference_month: "2026-08".to_string(),
            amount: Some(120.0),
            notes: None,
        })
        .unwrap();
    store.settle_payment(paid_now.id, august).unwrap();

    let paid_earlier = store
        .create_payment(NewPayment {
            member_id: member.id,
            reference_month: "2026-03".to_string(),
            amount: Some(100.0),
            notes: None,
        })
        .unwrap();
    store.settle_payment(paid_earlier.id, march).unwrap();

    let overdue = store
        .create_payment(NewPayment {
            member_id: member.id,
            reference_month: "2026-07".to_string(),
            amount: Some(100.0),
            notes: None,
        })
        .unwrap();
    store
        .update_payment(
            overdue.id,
            gymflow::store::payments::PaymentPatch {
                status: Some(PaymentStatus::Overdue),
                ..Default::default()
            },
        )
        .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 8, 15, 12, 0, 0).unwrap();
    let metrics = dashboard::dashboard_metrics(&store, now);

    assert_eq!(metrics.active_members, 1);
    assert_eq!(metrics.monthly_revenue, 120.0);
    assert_eq!(metrics.monthly_revenue_series[2], 100.0); // March
    assert_eq!(metrics.monthly_revenue_series[7], 120.0); // August

    // 1 overdue of 3 billed
    assert!((metrics.delinquency_rate - 33.333).abs() < 0.01);
}

#[test]
fn test_member_listing_pagination() {
    let store = Store::new();
    // Valid CPFs generated from sequential prefixes
    let cpfs = [
        "123.456.789-09",
        "111.444.777-35",
        "529.982.247-25",
        "853.513.468-93",
        "390.533.447-05",
    ];
    for (i, cpf_str) in cpfs.iter().enumerate() {
        store
            .create_member(member_input(&format!("m{}@gym.com", i), cpf_str))
            .unwrap();
    }

    let rows = store.search_members(Some(MemberStatus::Active), None);
    assert_eq!(rows.len(), 5);

    let page = paginate(rows, PageQuery { page: 2, per_page: 2 });
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pages, 3);
    assert_eq!(page.items[0].email, "m2@gym.com");
}

#[test]
fn test_router_builds() {
    use gymflow::api::handlers::AppState;
    use gymflow::models::config::AppConfig;
    use std::sync::Arc;

    let state = Arc::new(AppState::new(AppConfig::load()));
    state.store.seed_defaults("admin@gymflow.com", "admin123");
    let _router = gymflow::create_router(state);
}
