use sqlx::{PgExecutor, PgPool};

use super::kind::{ByKind, RequirementKind};
use super::types::*;
use crate::auth::validate;
use crate::errors::AppError;

const SELECT_ITEM: &str = "\
    SELECT id, planning_id, kind, name, unit, specification, dimension, code, item_group, \
           quantity, brand, province_id, city_id \
    FROM requirement_items";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    planning_id: i64,
    kind: String,
    name: String,
    unit: Option<String>,
    specification: Option<String>,
    dimension: Option<String>,
    code: Option<String>,
    item_group: Option<String>,
    quantity: Option<f64>,
    brand: Option<String>,
    province_id: Option<i64>,
    city_id: Option<i64>,
}

impl TryFrom<ItemRow> for RequirementItem {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let kind = RequirementKind::parse(&row.kind)
            .ok_or_else(|| AppError::Validation(format!("unknown requirement kind '{}'", row.kind)))?;
        Ok(RequirementItem {
            id: row.id,
            planning_id: row.planning_id,
            kind,
            name: row.name,
            unit: row.unit,
            specification: row.specification,
            dimension: row.dimension,
            code: row.code,
            item_group: row.item_group,
            quantity: row.quantity,
            brand: row.brand,
            province_id: row.province_id,
            city_id: row.city_id,
        })
    }
}

fn into_items(rows: Vec<ItemRow>) -> Result<Vec<RequirementItem>, AppError> {
    rows.into_iter().map(RequirementItem::try_from).collect()
}

/// Create or update a requirement item under a planning record.
///
/// An existing item keeps its owner: updating it through another planning
/// record is rejected.
pub async fn store_item(
    pool: &PgPool,
    planning_id: i64,
    kind: RequirementKind,
    form: &RequirementItemForm,
) -> Result<RequirementItem, AppError> {
    if let Some(msg) = validate::validate_required(&form.name, "Item name", 255) {
        return Err(AppError::Validation(msg));
    }

    let row = match form.id {
        Some(id) => {
            let owner: Option<(i64, String)> =
                sqlx::query_as("SELECT planning_id, kind FROM requirement_items WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool)
                    .await?;
            let (owner_id, owner_kind) = owner.ok_or(AppError::NotFound)?;
            if owner_id != planning_id {
                log::warn!("Refused to move requirement item {id} from planning {owner_id} to {planning_id}");
                return Err(AppError::Validation(
                    "item belongs to another requirement identification".to_string(),
                ));
            }
            if owner_kind != kind.as_str() {
                return Err(AppError::Validation(format!(
                    "item {id} is a {owner_kind} item, not {kind}"
                )));
            }

            let sql = "UPDATE requirement_items SET name = $2, unit = $3, specification = $4, \
                           dimension = $5, code = $6, item_group = $7, quantity = $8, brand = $9, \
                           province_id = $10, city_id = $11 \
                       WHERE id = $1 \
                       RETURNING id, planning_id, kind, name, unit, specification, dimension, code, \
                                 item_group, quantity, brand, province_id, city_id";
            bind_item_fields(sqlx::query_as::<_, ItemRow>(sql).bind(id), form)
                .fetch_one(pool)
                .await?
        }
        None => {
            let sql = "INSERT INTO requirement_items \
                           (planning_id, name, unit, specification, dimension, code, item_group, \
                            quantity, brand, province_id, city_id, kind) \
                       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
                       RETURNING id, planning_id, kind, name, unit, specification, dimension, code, \
                                 item_group, quantity, brand, province_id, city_id";
            bind_item_fields(sqlx::query_as::<_, ItemRow>(sql).bind(planning_id), form)
                .bind(kind.as_str())
                .fetch_one(pool)
                .await?
        }
    };
    RequirementItem::try_from(row)
}

type ItemQuery<'q> = sqlx::query::QueryAs<'q, sqlx::Postgres, ItemRow, sqlx::postgres::PgArguments>;

/// Binds $2..$11 in column order.
fn bind_item_fields<'q>(query: ItemQuery<'q>, form: &'q RequirementItemForm) -> ItemQuery<'q> {
    query
        .bind(form.name.trim())
        .bind(form.unit.as_deref())
        .bind(form.specification.as_deref())
        .bind(form.dimension.as_deref())
        .bind(form.code.as_deref())
        .bind(form.item_group.as_deref())
        .bind(form.quantity)
        .bind(form.brand.as_deref())
        .bind(form.province_id)
        .bind(form.city_id)
}

pub async fn list_by_planning(
    pool: &PgPool,
    planning_id: i64,
    kind: RequirementKind,
) -> Result<Vec<RequirementItem>, AppError> {
    let sql = format!("{SELECT_ITEM} WHERE planning_id = $1 AND kind = $2 ORDER BY id");
    let rows = sqlx::query_as::<_, ItemRow>(&sql)
        .bind(planning_id)
        .bind(kind.as_str())
        .fetch_all(pool)
        .await?;
    into_items(rows)
}

/// Every item of a planning record, grouped by kind.
pub async fn items_by_kind(
    pool: &PgPool,
    planning_id: i64,
) -> Result<ByKind<Vec<RequirementItem>>, AppError> {
    let sql = format!("{SELECT_ITEM} WHERE planning_id = $1 ORDER BY id");
    let rows = sqlx::query_as::<_, ItemRow>(&sql)
        .bind(planning_id)
        .fetch_all(pool)
        .await?;

    let mut grouped: ByKind<Vec<RequirementItem>> = ByKind::default();
    for item in into_items(rows)? {
        grouped.get_mut(item.kind).push(item);
    }
    Ok(grouped)
}

/// Requirement names per kind, in item order.
pub async fn names_by_kind(pool: &PgPool, planning_id: i64) -> Result<ByKind<Vec<String>>, AppError> {
    let items = items_by_kind(pool, planning_id).await?;
    Ok(items.map(|_, list| list.into_iter().map(|item| item.name).collect()))
}

/// Items of one kind among `ids`, each with its survey detail if recorded.
pub async fn find_with_survey(
    pool: &PgPool,
    kind: RequirementKind,
    ids: &[i64],
) -> Result<Vec<RequirementWithSurvey>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    #[derive(sqlx::FromRow)]
    struct Row {
        #[sqlx(flatten)]
        item: ItemRow,
        has_survey: bool,
        #[sqlx(flatten)]
        survey: SurveyDetail,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT i.id, i.planning_id, i.kind, i.name, i.unit, i.specification, i.dimension, \
                i.code, i.item_group, i.quantity, i.brand, i.province_id, i.city_id, \
                (s.requirement_item_id IS NOT NULL) AS has_survey, \
                s.local_unit, s.local_unit_length, s.local_unit_width, s.local_unit_height, \
                s.local_unit_conversion, s.local_unit_price, s.converted_price, s.special_price, \
                s.rental_price, s.rental_conversion_price, s.base_price, \
                s.hourly_conversion_price, s.notes \
         FROM requirement_items i \
         LEFT JOIN survey_details s ON s.requirement_item_id = i.id \
         WHERE i.kind = $1 AND i.id = ANY($2) \
         ORDER BY i.id",
    )
    .bind(kind.as_str())
    .bind(ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(RequirementWithSurvey {
                item: RequirementItem::try_from(row.item)?,
                survey: row.has_survey.then_some(row.survey),
            })
        })
        .collect()
}

/// Insert or replace the survey detail of one requirement item.
pub async fn upsert_survey_detail<'e, E>(
    executor: E,
    item_id: i64,
    detail: &SurveyDetail,
) -> Result<(), AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO survey_details \
             (requirement_item_id, local_unit, local_unit_length, local_unit_width, \
              local_unit_height, local_unit_conversion, local_unit_price, converted_price, \
              special_price, rental_price, rental_conversion_price, base_price, \
              hourly_conversion_price, notes) \
         SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14 \
         WHERE EXISTS (SELECT 1 FROM requirement_items WHERE id = $1) \
         ON CONFLICT (requirement_item_id) DO UPDATE SET \
             local_unit = EXCLUDED.local_unit, \
             local_unit_length = EXCLUDED.local_unit_length, \
             local_unit_width = EXCLUDED.local_unit_width, \
             local_unit_height = EXCLUDED.local_unit_height, \
             local_unit_conversion = EXCLUDED.local_unit_conversion, \
             local_unit_price = EXCLUDED.local_unit_price, \
             converted_price = EXCLUDED.converted_price, \
             special_price = EXCLUDED.special_price, \
             rental_price = EXCLUDED.rental_price, \
             rental_conversion_price = EXCLUDED.rental_conversion_price, \
             base_price = EXCLUDED.base_price, \
             hourly_conversion_price = EXCLUDED.hourly_conversion_price, \
             notes = EXCLUDED.notes, \
             updated_at = now()",
    )
    .bind(item_id)
    .bind(detail.local_unit.as_deref())
    .bind(detail.local_unit_length)
    .bind(detail.local_unit_width)
    .bind(detail.local_unit_height)
    .bind(detail.local_unit_conversion.as_deref())
    .bind(detail.local_unit_price)
    .bind(detail.converted_price)
    .bind(detail.special_price)
    .bind(detail.rental_price)
    .bind(detail.rental_conversion_price)
    .bind(detail.base_price)
    .bind(detail.hourly_conversion_price)
    .bind(detail.notes.as_deref())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Validation(format!("requirement item {item_id} does not exist")));
    }
    Ok(())
}
