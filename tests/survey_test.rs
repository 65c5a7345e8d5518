//! Survey entry tests: the aggregated data-entry view, saving survey
//! details and the supervisor verification step.

mod common;

use balai_survey::errors::AppError;
use balai_survey::models::planning::{self, PlanningStatus};
use balai_survey::models::requirement::{self, RequirementKind, SurveyDetail, SurveyDetailInput};
use balai_survey::models::shortlist::{self, SelectionForm, ShortlistForm};
use balai_survey::models::survey::merge::FieldSource;
use balai_survey::models::survey::*;
use common::*;

struct Fixture {
    planning_id: i64,
    vendor_id: i64,
    shortlist_id: i64,
    cement: i64,
    sand: i64,
    digger: i64,
    officer: i64,
    supervisor: i64,
}

/// One planning record with a confirmed vendor and a resource selection
/// naming two material items and one equipment item.
async fn fixture(pool: &sqlx::PgPool) -> Fixture {
    let planning_id = seed_planning(pool, "Balai Jawa Barat", "Paket Gedung Sekolah").await;
    let cement = seed_item(pool, planning_id, RequirementKind::Material, "Semen Portland").await;
    let sand = seed_item(pool, planning_id, RequirementKind::Material, "Pasir Pasang").await;
    let digger = seed_item(pool, planning_id, RequirementKind::Equipment, "Excavator").await;
    let vendor_id = seed_vendor(pool, "CV Bangun Jaya", &[(RequirementKind::Material, "Semen")]).await;
    let officer = seed_user(pool, "Wawan Setiawan", "petugas lapangan", None).await;
    let supervisor = seed_user(pool, "Yusuf", "pengawas", None).await;

    let entry = shortlist::store_entry(
        pool,
        planning_id,
        &ShortlistForm {
            vendor_id,
            vendor_name: "CV Bangun Jaya".to_string(),
            owner_name: "Pemilik".to_string(),
            address: "Jl. Sudirman 1".to_string(),
            contact: "021-5550001".to_string(),
            resource_text: Some("Semen".to_string()),
        },
    )
    .await
    .unwrap();

    shortlist::save_selected_resource_ids(
        pool,
        &SelectionForm {
            planning_id,
            vendor_id,
            material: vec![cement, sand],
            equipment: vec![digger],
            labor: vec![],
        },
    )
    .await
    .unwrap();

    Fixture {
        planning_id,
        vendor_id,
        shortlist_id: entry.id,
        cement,
        sand,
        digger,
        officer,
        supervisor,
    }
}

fn priced(id: i64, price: f64) -> SurveyDetailInput {
    SurveyDetailInput {
        id,
        detail: SurveyDetail {
            local_unit: Some("sak".to_string()),
            local_unit_price: Some(price),
            ..Default::default()
        },
    }
}

fn entry_form(f: &Fixture, survey_date: &str) -> EntryDataForm {
    EntryDataForm {
        planning_id: f.planning_id,
        vendor_id: f.vendor_id,
        officer: OfficerInput {
            field_officer_id: Some(f.officer),
            supervisor_id: None,
            respondent_name: Some("Pak Harjo".to_string()),
            survey_date: Some(survey_date.to_string()),
            oversight_date: None,
        },
        material: vec![priced(f.cement, 65_000.0)],
        equipment: vec![],
        labor: vec![],
    }
}

#[tokio::test]
async fn test_entry_data_merges_remarks_over_shortlist() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let f = fixture(pool).await;

    let saved = save_entry_data(pool, &entry_form(&f, "05-03-2024")).await.unwrap();
    assert_eq!(saved.shortlist_id, f.shortlist_id);
    assert_eq!(saved.items_saved, 1);

    save_remarks(
        pool,
        &RemarksForm {
            planning_id: f.planning_id,
            officer: OfficerInput {
                supervisor_id: Some(f.supervisor),
                oversight_date: Some("10-03-2024".to_string()),
                ..Default::default()
            },
            block_v_notes: Some("Harga wajar".to_string()),
        },
    )
    .await
    .unwrap();

    let by_planning = get_entry_data(pool, f.planning_id).await.unwrap();
    let by_row = get_entry_data(pool, f.shortlist_id).await.unwrap();
    assert_eq!(by_planning.shortlist_id, f.shortlist_id);
    assert_eq!(by_row.shortlist_id, f.shortlist_id);

    let data = by_planning;
    assert_eq!(data.identifikasi_kebutuhan_id, f.planning_id);
    assert_eq!(data.data_vendor_id, f.vendor_id);
    assert_eq!(data.user_id_petugas_lapangan, Some(f.officer));
    assert_eq!(data.user_id_pengawas, Some(f.supervisor));
    assert_eq!(data.tanggal_survei.as_deref(), Some("05-03-2024"));
    assert_eq!(data.tanggal_pengawasan.as_deref(), Some("10-03-2024"));
    assert_eq!(data.catatan_blok_v.as_deref(), Some("Harga wajar"));
    assert_eq!(data.nama_responden, "CV Bangun Jaya");
    assert_eq!(data.no_telepon.as_deref(), Some("021-5550001"));

    assert_eq!(data.sumber_data.field_officer_id.source, FieldSource::Shortlist);
    assert_eq!(data.sumber_data.supervisor_id.source, FieldSource::Remarks);
    assert_eq!(data.sumber_data.oversight_date.source, FieldSource::Remarks);

    assert_eq!(
        data.keterangan_petugas_lapangan.nama_petugas_lapangan.as_deref(),
        Some("Wawan Setiawan")
    );
    assert_eq!(data.keterangan_petugas_lapangan.nama_pengawas.as_deref(), Some("Yusuf"));
    let signature = data
        .keterangan_pemberi_informasi
        .tanda_tangan_responden
        .expect("signature");
    assert!(signature.starts_with("Ditandatangani oleh Pak Harjo pada "));

    // Selected items come back in id order with their survey detail.
    assert_eq!(data.material.len(), 2);
    assert_eq!(data.material[0].item.id, f.cement);
    assert_eq!(
        data.material[0].survey.as_ref().and_then(|s| s.local_unit_price),
        Some(65_000.0)
    );
    assert_eq!(data.material[1].item.id, f.sand);
    assert!(data.material[1].survey.is_none());
    assert_eq!(data.peralatan.len(), 1);
    assert_eq!(data.peralatan[0].item.id, f.digger);
    assert!(data.tenaga_kerja.is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn test_entry_data_unknown_id() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();

    assert!(matches!(get_entry_data(pool, 12_345).await, Err(AppError::NotFound)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_bad_date_writes_nothing() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let f = fixture(pool).await;

    let err = save_entry_data(pool, &entry_form(&f, "2024-03-05")).await.unwrap_err();
    assert!(matches!(err, AppError::Date(_)), "got {err:?}");

    let details: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_details")
        .fetch_one(pool)
        .await
        .unwrap();
    assert_eq!(details, 0);
    let entry = shortlist::find_by_id(pool, f.shortlist_id).await.unwrap().unwrap();
    assert!(entry.respondent_name.is_none());

    db.cleanup().await;
}

#[tokio::test]
async fn test_unknown_item_stops_save_after_earlier_items() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let f = fixture(pool).await;

    let mut form = entry_form(&f, "05-03-2024");
    form.material = vec![priced(f.cement, 70_000.0), priced(f.cement + 9_999, 1.0)];

    let err = save_entry_data(pool, &form).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");

    let kept = requirement::find_with_survey(pool, RequirementKind::Material, &[f.cement])
        .await
        .unwrap();
    assert_eq!(kept[0].survey.as_ref().and_then(|s| s.local_unit_price), Some(70_000.0));

    // Officer fields are written only after every item succeeded.
    let entry = shortlist::find_by_id(pool, f.shortlist_id).await.unwrap().unwrap();
    assert!(entry.field_officer_id.is_none());

    db.cleanup().await;
}

#[tokio::test]
async fn test_save_entry_data_creates_missing_shortlist_row() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let f = fixture(pool).await;
    let other_vendor = seed_vendor(pool, "UD Kayu Jati", &[(RequirementKind::Material, "Kayu")]).await;

    let mut form = entry_form(&f, "");
    form.vendor_id = other_vendor;
    form.material = vec![];
    let saved = save_entry_data(pool, &form).await.unwrap();
    assert_ne!(saved.shortlist_id, f.shortlist_id);

    let entry = shortlist::find_by_id(pool, saved.shortlist_id).await.unwrap().unwrap();
    assert_eq!(entry.vendor_name, "UD Kayu Jati");
    assert_eq!(entry.contact, "021-5550001");
    assert!(entry.survey_date.is_none());
    assert_eq!(entry.respondent_name.as_deref(), Some("Pak Harjo"));

    form.vendor_id = other_vendor + 100;
    assert!(matches!(save_entry_data(pool, &form).await, Err(AppError::Validation(_))));
    form.planning_id = f.planning_id + 100;
    assert!(matches!(save_entry_data(pool, &form).await, Err(AppError::NotFound)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_supervisor_verification_moves_status() {
    let Some(db) = setup_test_db().await else { return };
    let pool = db.pool();
    let f = fixture(pool).await;

    let check = |item: &str, status: &str| CheckInput {
        item_number: item.to_string(),
        status: status.to_string(),
        verified_by: "Yusuf".to_string(),
    };

    let record = submit_supervisor_verification(
        pool,
        &SupervisorVerificationForm {
            planning_id: f.planning_id,
            vendor_id: f.vendor_id,
            note_block_1: Some("Lengkap".to_string()),
            note_block_2: None,
            note_block_3: None,
            note_block_4: Some("Perlu foto".to_string()),
            checks: vec![check("1", "sesuai"), check("2", "tidak sesuai")],
        },
    )
    .await
    .unwrap();
    assert_eq!(record.status, PlanningStatus::SupervisorVerifying);

    let entry = shortlist::find_by_id(pool, f.shortlist_id).await.unwrap().unwrap();
    assert_eq!(entry.note_block_1.as_deref(), Some("Lengkap"));
    assert_eq!(entry.note_block_4.as_deref(), Some("Perlu foto"));

    // A second round updates item 2 and leaves item 1 alone.
    submit_supervisor_verification(
        pool,
        &SupervisorVerificationForm {
            planning_id: f.planning_id,
            vendor_id: f.vendor_id,
            note_block_1: Some("Lengkap".to_string()),
            note_block_2: None,
            note_block_3: None,
            note_block_4: None,
            checks: vec![check("2", "sesuai")],
        },
    )
    .await
    .unwrap();

    let checks = list_checks(pool, f.vendor_id, f.planning_id).await.unwrap();
    let states: Vec<(&str, &str)> = checks
        .iter()
        .map(|c| (c.item_number.as_str(), c.status.as_str()))
        .collect();
    assert_eq!(states, vec![("1", "sesuai"), ("2", "sesuai")]);

    let data = get_entry_data(pool, f.shortlist_id).await.unwrap();
    assert_eq!(data.verifikasi_dokumen.len(), 2);

    // The record does not move back once further along.
    planning::change_status(pool, f.planning_id, PlanningStatus::DataEntry).await.unwrap();
    let late = submit_supervisor_verification(
        pool,
        &SupervisorVerificationForm {
            planning_id: f.planning_id,
            vendor_id: f.vendor_id,
            note_block_1: None,
            note_block_2: None,
            note_block_3: None,
            note_block_4: None,
            checks: vec![check("1", "tidak sesuai")],
        },
    )
    .await;
    assert!(matches!(late, Err(AppError::Validation(_))));

    // A rejected submission leaves the notes and checks untouched.
    let entry = shortlist::find_by_id(pool, f.shortlist_id).await.unwrap().unwrap();
    assert_eq!(entry.note_block_1.as_deref(), Some("Lengkap"));
    let checks = list_checks(pool, f.vendor_id, f.planning_id).await.unwrap();
    assert_eq!(checks[0].item_number, "1");
    assert_eq!(checks[0].status, "sesuai");
    let record = planning::find_by_id(pool, f.planning_id).await.unwrap().unwrap();
    assert_eq!(record.status, PlanningStatus::DataEntry);

    db.cleanup().await;
}
