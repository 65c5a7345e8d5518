//! Shared test infrastructure for database-backed tests.
//!
//! Each test gets its own throw-away PostgreSQL database created from
//! `TEST_DATABASE_URL`. When the variable is unset the helpers return
//! `None` and the calling test returns early.

#![allow(dead_code)]

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use balai_survey::auth::token::generate_token;
use balai_survey::db::MIGRATOR;
use balai_survey::models::planning::{self, GeneralInfoForm};
use balai_survey::models::requirement::{self, RequirementItemForm, RequirementKind};
use balai_survey::models::vendor::{self, NewResource, NewVendor};
use balai_survey::storage::StorageUrls;

pub const BASE_URL: &str = "http://survey.test";

pub struct TestDb {
    pool: PgPool,
    admin: PgPool,
    name: String,
}

impl TestDb {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Drop the database. Call at the end of each test.
    pub async fn cleanup(self) {
        self.pool.close().await;
        let sql = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
        let _ = sqlx::query(&sql).execute(&self.admin).await;
        self.admin.close().await;
    }
}

pub async fn setup_test_db() -> Option<TestDb> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let base: PgConnectOptions = url.parse().expect("TEST_DATABASE_URL is not a valid Postgres URL");

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(base.clone())
        .await
        .expect("Failed to connect to TEST_DATABASE_URL");

    let token = generate_token();
    let name = format!("balai_test_{}", &token[..16]);
    sqlx::query(&format!("CREATE DATABASE \"{name}\""))
        .execute(&admin)
        .await
        .expect("Failed to create test database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(base.database(&name))
        .await
        .expect("Failed to connect to test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");

    Some(TestDb { pool, admin, name })
}

pub fn urls() -> StorageUrls {
    StorageUrls::new(BASE_URL, "/storage")
}

// ============================================================================
// SEED HELPERS
// ============================================================================

pub async fn seed_org_unit(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO org_units (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to seed org unit")
}

/// An active, email-verified user holding `role`.
pub async fn seed_user(pool: &PgPool, full_name: &str, role: &str, org_unit_id: Option<i64>) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO users (full_name, email, nrp, role_id, status, email_verified_at, org_unit_id) \
         VALUES ($1, $2, $3, (SELECT id FROM roles WHERE name = $4), 'active', now(), $5) \
         RETURNING id",
    )
    .bind(full_name)
    .bind(format!("{}@example.test", full_name.to_lowercase().replace(' ', ".")))
    .bind(format!("NRP-{}", full_name.len()))
    .bind(role)
    .bind(org_unit_id)
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

pub async fn role_of(pool: &PgPool, user_id: i64) -> String {
    sqlx::query_scalar("SELECT r.name FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read role")
}

/// A package and its planning record. Returns the planning id.
pub async fn seed_planning(pool: &PgPool, balai: &str, package: &str) -> i64 {
    let form = GeneralInfoForm {
        id: None,
        org_unit_name: balai.to_string(),
        package_name: package.to_string(),
        rup_code: "RUP-001".to_string(),
        ppk_title: None,
        ppk_name: None,
        typology: "gedung".to_string(),
        info_type: "manual".to_string(),
    };
    planning::save_general_info(pool, &form)
        .await
        .expect("Failed to seed planning record")
        .planning_id
}

pub async fn seed_item(pool: &PgPool, planning_id: i64, kind: RequirementKind, name: &str) -> i64 {
    let form = RequirementItemForm {
        name: name.to_string(),
        ..Default::default()
    };
    requirement::store_item(pool, planning_id, kind, &form)
        .await
        .expect("Failed to seed requirement item")
        .id
}

pub async fn seed_vendor(pool: &PgPool, name: &str, resources: &[(RequirementKind, &str)]) -> i64 {
    let new = NewVendor {
        name: name.to_string(),
        pic_name: format!("Pemilik {name}"),
        address: "Jl. Sudirman 1".to_string(),
        phone: Some("021-5550001".to_string()),
        mobile: None,
        province_id: None,
        city_id: None,
        category_ids: vec![],
        resource_text: Some(
            resources
                .iter()
                .map(|(_, n)| n.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        resources: resources
            .iter()
            .map(|(kind, n)| NewResource {
                kind: *kind,
                name: n.to_string(),
                specification: None,
            })
            .collect(),
    };
    vendor::create(pool, &new).await.expect("Failed to seed vendor").id
}
