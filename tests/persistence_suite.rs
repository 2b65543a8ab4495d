mod common;

use std::fs;

use common::{month, open_manager, setup_test_env, storage_in, temp_base};
use six_jars::{
    codec::{decode_backup, decode_compact, encode_compact},
    config::Config,
    core::SeedSource,
    domain::{default_jars, JarId},
    errors::{JarsError, ShareDecodeError},
    storage::StateStorage,
};

#[test]
fn state_survives_reopening() {
    let base = temp_base();
    let mut manager = open_manager(&base, None, "2024-01");
    manager.set_user_name("Linh");
    manager.add_income(2000.0, "salary");
    manager.add_month();
    manager.add_expense(JarId::Edu, 150.0, "course");
    drop(manager);

    let mut reopened = open_manager(&base, None, "2030-01");
    assert_eq!(reopened.seed_source(), SeedSource::Persisted);
    assert_eq!(reopened.user_name(), "Linh");
    assert_eq!(reopened.selected_month(), month("2024-02"));
    let edu = reopened.selected_allocations()[3].clone();
    assert_eq!(edu.id(), JarId::Edu);
    assert_eq!(edu.amount, 50.0);
}

#[test]
fn malformed_state_falls_back_to_a_fresh_month() {
    let base = temp_base();
    storage_in(&base)
        .save_state("{ this is not json")
        .expect("write garbage");

    let manager = open_manager(&base, None, "2025-03");
    assert_eq!(manager.seed_source(), SeedSource::Fresh);
    assert_eq!(manager.store().months(), vec![month("2025-03")]);
    assert_eq!(manager.user_name(), "");
    let record = manager.store().record(month("2025-03")).expect("record");
    assert_eq!(record.jars, default_jars());
}

#[test]
fn share_link_takes_precedence_over_persisted_state() {
    let base = temp_base();
    let mut manager = open_manager(&base, None, "2024-01");
    manager.add_income(500.0, "side job");
    manager.add_month();
    drop(manager);

    let mut jars = default_jars();
    jars[0].percentage = 50;
    jars[1].percentage = 15;
    let payload = encode_compact("Mai", &jars);

    let shared = open_manager(&base, Some(&payload), "2024-07");
    assert_eq!(shared.seed_source(), SeedSource::SharedLink);
    assert_eq!(shared.store().months(), vec![month("2024-07")]);
    assert_eq!(shared.user_name(), "Mai");
    assert_eq!(shared.total_percentage(), 100);
    let record = shared.store().record(month("2024-07")).expect("record");
    assert!(record.incomes.is_empty());
    drop(shared);

    // Reopening without the parameter uses what the shared session saved.
    let reopened = open_manager(&base, None, "2024-08");
    assert_eq!(reopened.seed_source(), SeedSource::Persisted);
    assert_eq!(reopened.user_name(), "Mai");
}

#[test]
fn malformed_share_payload_keeps_persisted_state() {
    let base = temp_base();
    let mut manager = open_manager(&base, None, "2024-01");
    manager.add_income(900.0, "salary");
    let before = manager.store().clone();
    drop(manager);

    let short = encode_compact("X", &default_jars());
    let truncated = &short[..8];
    assert!(decode_compact(truncated).is_err());

    let reopened = open_manager(&base, Some(truncated), "2024-05");
    assert_eq!(reopened.seed_source(), SeedSource::Persisted);
    assert_eq!(reopened.store(), &before);
}

#[test]
fn too_few_share_fields_is_a_decode_failure() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let payload = STANDARD.encode("Name|55|10|10|10|10");
    assert_eq!(
        decode_compact(&payload),
        Err(ShareDecodeError::FieldCount { found: 6 })
    );
}

#[test]
fn backup_round_trip_restores_everything() {
    let (mut manager, _config, _base) = setup_test_env();
    manager.set_user_name("Quân");
    manager.add_income(1500.0, "salary");
    manager.add_expense(JarId::Nec, 400.0, "rent");
    manager.set_jar_percentage(JarId::Play, 5);
    manager.add_month();
    manager.add_income(1600.0, "salary");

    let document = manager.export_backup().expect("export");
    let original = manager.store().clone();

    manager.set_user_name("Someone else");
    manager.add_month();
    assert_ne!(manager.store(), &original);

    manager.restore_backup(&document).expect("restore");
    assert_eq!(manager.store(), &original);
    assert_eq!(manager.selected_month(), month("2024-02"));
}

#[test]
fn backups_are_written_listed_and_restored_by_name() {
    let (mut manager, _config, base) = setup_test_env();
    manager.add_income(100.0, "first");
    let info = manager.write_backup(Some("checkpoint")).expect("backup");
    assert!(info.path.starts_with(base.join("backups")));
    assert!(info.name.ends_with("_checkpoint.json"));

    manager.add_income(50.0, "second");
    let listed = manager.list_backups().expect("list");
    assert_eq!(listed[0].name, info.name);

    manager.restore_named_backup(&info.name).expect("restore");
    let record = manager.store().latest().expect("record");
    assert_eq!(record.incomes.len(), 1);
    assert_eq!(record.incomes[0].description, "first");
}

#[test]
fn invalid_backup_leaves_the_store_untouched() {
    let (mut manager, _config, _base) = setup_test_env();
    manager.add_income(100.0, "pay");
    let before = manager.store().clone();
    let revision = manager.revision();

    assert!(manager.restore_backup("[]").is_err());
    assert!(matches!(
        manager.restore_backup(r#"{"history": [], "userName": "x"}"#),
        Err(JarsError::Storage(_))
    ));
    assert!(matches!(
        manager.restore_named_backup("missing.json"),
        Err(JarsError::Storage(_))
    ));
    assert!(matches!(
        manager.restore_named_backup("../state.json"),
        Err(JarsError::Storage(_))
    ));
    assert_eq!(manager.store(), &before);
    assert_eq!(manager.revision(), revision);
}

#[test]
fn persisted_document_is_a_backup_document() {
    let base = temp_base();
    let mut manager = open_manager(&base, None, "2024-01");
    manager.add_expense(JarId::Ffa, 10.0, "index fund");
    drop(manager);

    let raw = fs::read_to_string(base.join("state.json")).expect("state file");
    let document = decode_backup(&raw).expect("decodes");
    assert_eq!(document.history.len(), 1);
    assert_eq!(document.user_name, "");
}

#[test]
fn config_lives_beside_the_state() {
    let (_manager, config_manager, base) = setup_test_env();
    assert_eq!(config_manager.path(), base.join("config.json"));
    let config = Config {
        currency: "VND".into(),
        ..Config::default()
    };
    config_manager.save(&config).expect("save config");
    assert_eq!(config_manager.load().expect("load config"), config);
}
