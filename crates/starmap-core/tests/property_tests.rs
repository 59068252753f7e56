//! # Property-Based Tests
//!
//! Boundary validation and storage aggregate invariants, checked with proptest.

use proptest::collection::vec;
use proptest::prelude::*;
use starmap_core::{
    CreatePlanet, CreateSystem, RedbStore, System, UpdatePlanet, Validate, is_valid_email,
};
use uuid::Uuid;

fn system_named(name: &str) -> System {
    CreateSystem {
        name: name.to_string(),
        supreme_commander: "Sincere@april.biz".to_string(),
    }
    .validate()
    .expect("valid system")
    .into_system("Leanne Graham".to_string())
}

proptest! {
    /// Negative populations never validate, on create or update.
    #[test]
    fn negative_population_always_rejected(population in i64::MIN..0) {
        let create = CreatePlanet {
            name: "test".to_string(),
            project_id: Uuid::new_v4(),
            population_millions: population,
            system_id: Uuid::new_v4(),
        };
        let errors = create.validate().expect_err("negative");
        prop_assert!(errors.has_field("population_millions"));

        let update = UpdatePlanet {
            name: "test".to_string(),
            population_millions: population,
        };
        prop_assert!(update.validate().is_err());
    }

    /// Non-negative populations validate and keep their value.
    #[test]
    fn non_negative_population_preserved(population in 0i64..=i64::MAX) {
        let create = CreatePlanet {
            name: "test".to_string(),
            project_id: Uuid::new_v4(),
            population_millions: population,
            system_id: Uuid::new_v4(),
        };
        let valid = create.validate().expect("non-negative");
        prop_assert_eq!(valid.population_millions, population as u64);
    }

    /// Anything without an `@` is never an email.
    #[test]
    fn no_at_sign_is_never_an_email(candidate in "[a-zA-Z0-9._-]{0,40}") {
        prop_assert!(!is_valid_email(&candidate));
    }

    /// Blank names are rejected whatever the whitespace.
    #[test]
    fn blank_names_rejected(name in "[ \t\n]{0,8}") {
        let request = CreateSystem {
            name,
            supreme_commander: "Sincere@april.biz".to_string(),
        };
        let errors = request.validate().expect_err("blank");
        prop_assert!(errors.has_field("name"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// The stored aggregate equals the arithmetic sum of the inserted planets.
    #[test]
    fn population_sum_matches_inserted(populations in vec(0i64..1_000_000, 0..12)) {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("prop.redb")).expect("open db");
        let system = system_named("Sol");
        store.insert_system(&system).expect("insert system");

        for &population in &populations {
            let record = CreatePlanet {
                name: "p".to_string(),
                project_id: Uuid::new_v4(),
                population_millions: population,
                system_id: system.id,
            }
            .validate()
            .expect("valid planet")
            .into_record();
            store.insert_planet(&record).expect("insert planet");
        }

        let expected = if populations.is_empty() {
            None
        } else {
            Some(populations.iter().map(|&p| p as u64).sum::<u64>())
        };
        prop_assert_eq!(store.system_population_sum(system.id).expect("sum"), expected);
    }
}
