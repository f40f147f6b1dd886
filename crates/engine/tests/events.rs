use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, EventDraft, NewCurrency};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn draft(name: &str, start: Option<NaiveDate>) -> EventDraft {
    EventDraft {
        name: Some(Some(name.to_string())),
        start_date: Some(start),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_defaults_currency_and_mirrors_legacy_total() {
    let (engine, _db) = engine_with_db().await;

    let event = engine
        .create_event(EventDraft {
            legacy_total: Some(Some(dec("500"))),
            ..draft("Conf", date(2025, 1, 1))
        })
        .await
        .unwrap();

    assert_eq!(event.currency_code, "THB");
    assert_eq!(event.base_total, Some(dec("500")));
    assert_eq!(event.total_budget, event.base_total);
}

#[tokio::test]
async fn create_without_any_total_stores_null() {
    let (engine, _db) = engine_with_db().await;

    let event = engine
        .create_event(draft("Offsite", date(2025, 3, 1)))
        .await
        .unwrap();

    assert_eq!(event.base_total, None);
    assert_eq!(event.total_budget, None);
}

#[tokio::test]
async fn currency_code_is_upper_cased() {
    let (engine, _db) = engine_with_db().await;

    let event = engine
        .create_event(EventDraft {
            currency_code: Some("usd".to_string()),
            base_total: Some(Some(dec("12.50"))),
            ..draft("Summit", date(2025, 5, 1))
        })
        .await
        .unwrap();

    assert_eq!(event.currency_code, "USD");
    assert_eq!(event.base_total, Some(dec("12.50")));
}

#[tokio::test]
async fn update_mirrors_base_total_and_keeps_currency() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(EventDraft {
            currency_code: Some("eur".to_string()),
            legacy_total: Some(Some(dec("100"))),
            ..draft("Gala", date(2025, 2, 1))
        })
        .await
        .unwrap();

    let updated = engine
        .update_event(
            created.id,
            EventDraft {
                base_total: Some(Some(dec("250"))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.base_total, Some(dec("250")));
    assert_eq!(updated.total_budget, Some(dec("250")));
    assert_eq!(updated.currency_code, "EUR");
    assert_eq!(updated.name, "Gala");
}

#[tokio::test]
async fn update_without_total_keeps_stored_amount() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(EventDraft {
            base_total: Some(Some(dec("900"))),
            ..draft("Retreat", date(2025, 6, 1))
        })
        .await
        .unwrap();

    let updated = engine
        .update_event(
            created.id,
            EventDraft {
                location: Some(Some("Chiang Mai".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.base_total, Some(dec("900")));
    assert_eq!(updated.total_budget, Some(dec("900")));
    assert_eq!(updated.location.as_deref(), Some("Chiang Mai"));
}

#[tokio::test]
async fn list_orders_by_start_date_descending() {
    let (engine, _db) = engine_with_db().await;
    for (name, start) in [
        ("January", date(2025, 1, 10)),
        ("March", date(2025, 3, 10)),
        ("February", date(2025, 2, 10)),
    ] {
        engine.create_event(draft(name, start)).await.unwrap();
    }

    let names: Vec<String> = engine
        .list_events()
        .await
        .unwrap()
        .into_iter()
        .map(|event| event.name)
        .collect();

    assert_eq!(names, vec!["March", "February", "January"]);
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(
        engine.delete_event(42).await,
        Err(EngineError::KeyNotFound("event 42".to_string()))
    );
    assert!(matches!(
        engine.update_event(42, EventDraft::default()).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_removes_event() {
    let (engine, _db) = engine_with_db().await;
    let event = engine
        .create_event(draft("Launch", date(2025, 4, 1)))
        .await
        .unwrap();

    engine.delete_event(event.id).await.unwrap();

    assert!(engine.list_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn strict_mode_rejects_unknown_codes() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .strict_currency_codes(true)
        .build()
        .await
        .unwrap();

    let err = engine
        .create_event(EventDraft {
            currency_code: Some("JPY".to_string()),
            ..draft("Expo", date(2025, 7, 1))
        })
        .await
        .unwrap_err();
    let EngineError::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert!(fields.contains("currency_code"));

    // default currency needs no registration
    engine
        .create_event(draft("Expo", date(2025, 7, 1)))
        .await
        .unwrap();

    engine
        .create_currency(NewCurrency {
            code: Some("JPY".to_string()),
            name: Some("Japanese Yen".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let event = engine
        .create_event(EventDraft {
            currency_code: Some("jpy".to_string()),
            ..draft("Expo", date(2025, 7, 1))
        })
        .await
        .unwrap();
    assert_eq!(event.currency_code, "JPY");
}

#[tokio::test]
async fn custom_default_currency() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .default_currency("usd")
        .build()
        .await
        .unwrap();

    assert_eq!(engine.default_currency(), "USD");
    let event = engine
        .create_event(draft("Demo day", date(2025, 8, 1)))
        .await
        .unwrap();
    assert_eq!(event.currency_code, "USD");
}

#[tokio::test]
async fn update_with_legacy_total_moves_both_columns() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(EventDraft {
            base_total: Some(Some(dec("300"))),
            ..draft("Workshop", date(2025, 9, 1))
        })
        .await
        .unwrap();

    let updated = engine
        .update_event(
            created.id,
            EventDraft {
                legacy_total: Some(Some(dec("420.75"))),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.base_total, Some(dec("420.75")));
    assert_eq!(updated.total_budget, Some(dec("420.75")));
}

#[tokio::test]
async fn update_upper_cases_new_currency_code() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(draft("Roadshow", date(2025, 10, 1)))
        .await
        .unwrap();
    assert_eq!(created.currency_code, "THB");

    let updated = engine
        .update_event(
            created.id,
            EventDraft {
                currency_code: Some(" sgd ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.currency_code, "SGD");
}

#[tokio::test]
async fn update_with_empty_fields_clears_them() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(EventDraft {
            description: Some(Some("Three days".to_string())),
            end_date: Some(date(2025, 1, 3)),
            legacy_total: Some(Some(dec("500"))),
            ..draft("Conf", date(2025, 1, 1))
        })
        .await
        .unwrap();

    let updated = engine
        .update_event(
            created.id,
            EventDraft {
                description: Some(None),
                end_date: Some(None),
                legacy_total: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description, None);
    assert_eq!(updated.end_date, None);
    assert_eq!(updated.base_total, None);
    assert_eq!(updated.total_budget, None);
    assert_eq!(updated.name, "Conf");
    assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
}

#[tokio::test]
async fn update_cannot_clear_name_or_start_date() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_event(draft("Conf", date(2025, 1, 1)))
        .await
        .unwrap();

    let err = engine
        .update_event(
            created.id,
            EventDraft {
                name: Some(None),
                start_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    let EngineError::Validation(fields) = err else {
        panic!("expected validation error");
    };
    assert!(fields.contains("name"));
    assert!(fields.contains("start_date"));
}

#[tokio::test]
async fn blank_or_long_default_currency_is_rejected() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    for code in ["  ", "NOT-A-CURRENCY"] {
        let err = Engine::builder()
            .database(db.clone())
            .default_currency(code)
            .build()
            .await
            .unwrap_err();
        let EngineError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.contains("default_currency"), "{code}");
    }
}
