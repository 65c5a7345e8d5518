//! Vendor shortlist tests: keyword suggestions, confirmation, resource
//! selections and questionnaire links.

mod common;

use balai_survey::errors::AppError;
use balai_survey::models::requirement::RequirementKind;
use balai_survey::models::shortlist::matcher::SubstringMatcher;
use balai_survey::models::shortlist::*;
use balai_survey::models::vendor;
use common::*;

fn confirm(vendor_id: i64, name: &str, resource_text: &str) -> ShortlistForm {
    ShortlistForm {
        vendor_id,
        vendor_name: name.to_string(),
        owner_name: format!("Pemilik {name}"),
        address: "Jl. Sudirman 1".to_string(),
        contact: "021-5550001".to_string(),
        resource_text: Some(resource_text.to_string()),
    }
}

#[tokio::test]
async fn test_suggest_vendors_per_kind() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Kalimantan", "Paket Jembatan").await;
    seed_item(pool, planning_id, RequirementKind::Material, "Semen Portland Tipe I").await;
    seed_item(pool, planning_id, RequirementKind::Equipment, "Excavator PC200").await;

    let cement = seed_vendor(
        pool,
        "CV Sumber Semen",
        &[
            (RequirementKind::Material, "Semen Portland Curah"),
            (RequirementKind::Material, "Pasir Beton"),
        ],
    )
    .await;
    let rental = seed_vendor(pool, "PT Alat Berat", &[(RequirementKind::Equipment, "Excavator Mini")]).await;
    let _steel = seed_vendor(pool, "UD Baja", &[(RequirementKind::Material, "Baja Ringan")]).await;

    let suggested = suggest_vendors(pool, &SubstringMatcher, planning_id).await.unwrap();
    assert_eq!(suggested.material.iter().map(|c| c.id).collect::<Vec<_>>(), vec![cement]);
    assert_eq!(suggested.equipment.iter().map(|c| c.id).collect::<Vec<_>>(), vec![rental]);
    assert!(suggested.labor.is_empty());

    // Every declared resource of the kind travels with the hit.
    assert_eq!(suggested.material[0].sumber_daya_vendor.len(), 2);
    assert_eq!(suggested.material[0].kontak, "021-5550001");
    assert!(!suggested.material[0].is_selected);
    assert!(!suggested.equipment[0].is_selected);

    store_entry(pool, planning_id, &confirm(cement, "CV Sumber Semen", "Semen Portland Curah"))
        .await
        .unwrap();
    let resource_ids: Vec<i64> = vendor::find_resources(pool, rental)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    save_selected_resource_ids(
        pool,
        &SelectionForm {
            planning_id,
            vendor_id: rental,
            material: vec![],
            equipment: resource_ids.clone(),
            labor: vec![],
        },
    )
    .await
    .unwrap();

    let suggested = suggest_vendors(pool, &SubstringMatcher, planning_id).await.unwrap();
    assert!(suggested.material[0].is_selected);
    assert!(suggested.equipment[0].is_selected);
    assert_eq!(suggested.equipment[0].selected_resources.equipment, resource_ids);

    db.cleanup().await;
}

#[tokio::test]
async fn test_suggest_without_requirements_is_empty() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Maluku", "Paket Kosong").await;
    seed_vendor(pool, "CV Serba Ada", &[(RequirementKind::Labor, "Tukang Batu")]).await;

    let suggested = suggest_vendors(pool, &SubstringMatcher, planning_id).await.unwrap();
    assert!(suggested.material.is_empty());
    assert!(suggested.equipment.is_empty());
    assert!(suggested.labor.is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn test_store_entry_is_idempotent_per_vendor() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Riau", "Paket Pelabuhan").await;
    let vendor_id = seed_vendor(pool, "CV Bahari", &[(RequirementKind::Material, "Batu Split")]).await;

    let first = store_entry(pool, planning_id, &confirm(vendor_id, "CV Bahari", "Batu Split"))
        .await
        .unwrap();
    let mut form = confirm(vendor_id, "CV Bahari Jaya", "Batu Split");
    form.contact = "0811111111".to_string();
    let second = store_entry(pool, planning_id, &form).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.vendor_name, "CV Bahari Jaya");
    assert_eq!(second.contact, "0811111111");
    assert_eq!(list_by_planning(pool, planning_id).await.unwrap().len(), 1);
    let stored = find_by_vendor(pool, planning_id, vendor_id).await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);

    let unknown = store_entry(pool, planning_id, &confirm(vendor_id + 50, "Ghost", "")).await;
    assert!(matches!(unknown, Err(AppError::Validation(_))));
    let no_planning = store_entry(pool, planning_id + 50, &confirm(vendor_id, "CV Bahari", "")).await;
    assert!(matches!(no_planning, Err(AppError::NotFound)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_empty_selection_is_stored_as_null() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Aceh", "Paket Saluran").await;
    let vendor_id = seed_vendor(pool, "CV Tirta", &[(RequirementKind::Labor, "Mandor")]).await;

    assert_eq!(find_selection(pool, planning_id, vendor_id).await.unwrap(), Default::default());

    save_selected_resource_ids(
        pool,
        &SelectionForm {
            planning_id,
            vendor_id,
            material: vec![],
            equipment: vec![],
            labor: vec![7, 8],
        },
    )
    .await
    .unwrap();

    let (material, labor): (Option<Vec<i64>>, Option<Vec<i64>>) = sqlx::query_as(
        "SELECT material_ids, labor_ids FROM questionnaire_selections \
         WHERE planning_id = $1 AND vendor_id = $2",
    )
    .bind(planning_id)
    .bind(vendor_id)
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(material, None);
    assert_eq!(labor, Some(vec![7, 8]));

    let selection = find_selection(pool, planning_id, vendor_id).await.unwrap();
    assert!(selection.material.is_empty());
    assert_eq!(selection.labor, vec![7, 8]);

    db.cleanup().await;
}

#[tokio::test]
async fn test_identify_items_from_declared_text() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Sumbar", "Paket Irigasi Hulu").await;
    let cement = seed_item(pool, planning_id, RequirementKind::Material, "Semen Portland Tipe I").await;
    seed_item(pool, planning_id, RequirementKind::Material, "Besi Beton").await;
    let digger = seed_item(pool, planning_id, RequirementKind::Equipment, "Excavator PC200").await;

    let vendor_id = seed_vendor(pool, "CV Lengkap", &[(RequirementKind::Material, "Semen")]).await;
    let entry = store_entry(
        pool,
        planning_id,
        &confirm(vendor_id, "CV Lengkap", "Semen Portland; excavator, semen portland"),
    )
    .await
    .unwrap();

    let found = identify_by_shortlist(pool, entry.id, planning_id).await.unwrap();
    assert_eq!(found.vendor_id, vendor_id);
    assert_eq!(found.items.material.iter().map(|i| i.id).collect::<Vec<_>>(), vec![cement]);
    assert_eq!(found.items.equipment.iter().map(|i| i.id).collect::<Vec<_>>(), vec![digger]);
    assert!(found.items.labor.is_empty());

    assert!(matches!(
        identify_by_shortlist(pool, entry.id + 10, planning_id).await,
        Err(AppError::NotFound)
    ));

    db.cleanup().await;
}

#[tokio::test]
async fn test_questionnaire_url_refreshes_snapshot() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai NTT", "Paket Bendungan").await;
    let vendor_id = seed_vendor(pool, "PT Karya", &[(RequirementKind::Material, "Aspal")]).await;

    let entry = save_questionnaire_url(
        pool,
        &QuestionnaireUrlForm {
            vendor_id,
            planning_id,
            url: " https://files.example/kuisioner/1.pdf ".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(entry.vendor_name, "PT Karya");
    assert_eq!(entry.contact, "021-5550001");
    assert_eq!(entry.questionnaire_url.as_deref(), Some("https://files.example/kuisioner/1.pdf"));
    let stored = find_by_vendor(pool, planning_id, vendor_id).await.unwrap().unwrap();
    assert_eq!(stored.id, entry.id);
    assert_eq!(stored.questionnaire_url, entry.questionnaire_url);

    let missing = save_questionnaire_url(
        pool,
        &QuestionnaireUrlForm {
            vendor_id: vendor_id + 77,
            planning_id,
            url: "https://files.example/x.pdf".to_string(),
        },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_questionnaire_link_lifecycle() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    let planning_id = seed_planning(pool, "Balai Banten", "Paket Drainase").await;
    let vendor_id = seed_vendor(pool, "CV Link", &[(RequirementKind::Material, "Pipa")]).await;
    let entry = store_entry(pool, planning_id, &confirm(vendor_id, "CV Link", "Pipa")).await.unwrap();

    let link = generate_link(pool, "http://survey.test/", 7, entry.id).await.unwrap();
    assert_eq!(
        link.url,
        format!("http://survey.test{QUESTIONNAIRE_PATH}?token={}", link.token)
    );
    assert_eq!(resolve_token(pool, &link.token).await.unwrap(), entry.id);

    let stale = generate_link(pool, BASE_URL, -1, entry.id).await.unwrap();
    assert!(matches!(resolve_token(pool, &stale.token).await, Err(AppError::Validation(_))));

    assert!(matches!(resolve_token(pool, "no-such-token").await, Err(AppError::NotFound)));
    assert!(matches!(generate_link(pool, BASE_URL, 7, entry.id + 1).await, Err(AppError::NotFound)));
    assert!(matches!(
        generate_link(pool, BASE_URL, i64::MAX, entry.id).await,
        Err(AppError::Validation(_))
    ));

    db.cleanup().await;
}
