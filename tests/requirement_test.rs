//! Requirement catalog tests: item ownership and survey details.

mod common;

use balai_survey::errors::AppError;
use balai_survey::models::requirement::*;
use common::*;

fn item(id: Option<i64>, name: &str) -> RequirementItemForm {
    RequirementItemForm {
        id,
        name: name.to_string(),
        unit: Some("m3".to_string()),
        quantity: Some(12.5),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_update_keeps_owner() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Jambi", "Paket Rusun").await;
    let other_id = seed_planning(pool, "Balai Jambi", "Paket Pasar").await;

    let created = store_item(pool, planning_id, RequirementKind::Material, &item(None, "Beton K-250"))
        .await
        .unwrap();
    assert_eq!(created.planning_id, planning_id);
    assert_eq!(created.kind, RequirementKind::Material);

    let updated = store_item(
        pool,
        planning_id,
        RequirementKind::Material,
        &item(Some(created.id), "Beton K-300"),
    )
    .await
    .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Beton K-300");

    let moved = store_item(pool, other_id, RequirementKind::Material, &item(Some(created.id), "Beton"))
        .await;
    assert!(matches!(moved, Err(AppError::Validation(_))));

    let wrong_kind = store_item(pool, planning_id, RequirementKind::Labor, &item(Some(created.id), "Beton"))
        .await;
    assert!(matches!(wrong_kind, Err(AppError::Validation(_))));

    let missing = store_item(pool, planning_id, RequirementKind::Material, &item(Some(created.id + 50), "X"))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let unnamed = store_item(pool, planning_id, RequirementKind::Material, &item(None, " ")).await;
    assert!(matches!(unnamed, Err(AppError::Validation(_))));

    let listed = list_by_planning(pool, planning_id, RequirementKind::Material).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Beton K-300");
    assert!(list_by_planning(pool, other_id, RequirementKind::Material).await.unwrap().is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn test_items_grouped_by_kind() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Lampung", "Paket Jalan Desa").await;
    seed_item(pool, planning_id, RequirementKind::Material, "Aspal Curah").await;
    seed_item(pool, planning_id, RequirementKind::Labor, "Tukang Aspal").await;
    seed_item(pool, planning_id, RequirementKind::Material, "Agregat Kasar").await;

    let names = names_by_kind(pool, planning_id).await.unwrap();
    assert_eq!(names.material, vec!["Aspal Curah".to_string(), "Agregat Kasar".to_string()]);
    assert!(names.equipment.is_empty());
    assert_eq!(names.labor, vec!["Tukang Aspal".to_string()]);

    db.cleanup().await;
}

#[tokio::test]
async fn test_survey_detail_upsert_and_lookup() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Bengkulu", "Paket Talud").await;
    let stone = seed_item(pool, planning_id, RequirementKind::Material, "Batu Kali").await;
    let roller = seed_item(pool, planning_id, RequirementKind::Equipment, "Vibro Roller").await;

    let first = SurveyDetail {
        local_unit: Some("truk".to_string()),
        local_unit_price: Some(850_000.0),
        ..Default::default()
    };
    upsert_survey_detail(pool, stone, &first).await.unwrap();

    let second = SurveyDetail {
        local_unit: Some("m3".to_string()),
        converted_price: Some(210_000.0),
        notes: Some("harga franco".to_string()),
        ..Default::default()
    };
    upsert_survey_detail(pool, stone, &second).await.unwrap();

    let found = find_with_survey(pool, RequirementKind::Material, &[stone, roller]).await.unwrap();
    assert_eq!(found.len(), 1, "kind filter drops the equipment item");
    assert_eq!(found[0].survey.as_ref(), Some(&second));

    let bare = find_with_survey(pool, RequirementKind::Equipment, &[roller]).await.unwrap();
    assert!(bare[0].survey.is_none());

    assert!(find_with_survey(pool, RequirementKind::Labor, &[]).await.unwrap().is_empty());

    let missing = upsert_survey_detail(pool, roller + 1000, &first).await;
    assert!(matches!(missing, Err(AppError::Validation(_))));

    db.cleanup().await;
}
