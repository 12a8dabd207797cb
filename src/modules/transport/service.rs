use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{StudentId, TransportRouteId};
use sqlx::types::Json;
use tracing::{info, instrument};

use crate::modules::transport::model::{
    CreateTransportRouteDto, TransportFilterParams, TransportRoute, UpdateTransportRouteDto,
};
use crate::modules::users::service::like_pattern;

const ROUTE_SELECT: &str = r#"
    SELECT r.id, r.route_name, r.vehicle_number, r.driver_name, r.driver_phone, r.capacity,
           r.fare, r.stops, r.is_active,
           (SELECT COUNT(*) FROM students s WHERE s.transport_route_id = r.id) AS assigned_count,
           r.created_at, r.updated_at
    FROM transport_routes r
"#;

const ROUTE_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR r.route_name ILIKE $1 OR r.vehicle_number ILIKE $1)
"#;

fn map_route_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.constraint() == Some("transport_routes_route_name_key")
    {
        return AppError::conflict(anyhow!("A route with this name already exists"));
    }
    AppError::from(e)
}

pub struct TransportService;

impl TransportService {
    #[instrument(skip(db, dto), fields(route_name = %dto.route_name))]
    pub async fn create_route(
        db: &PgPool,
        dto: CreateTransportRouteDto,
    ) -> Result<TransportRoute, AppError> {
        let id = sqlx::query_scalar::<_, TransportRouteId>(
            r#"INSERT INTO transport_routes (route_name, vehicle_number, driver_name, driver_phone,
                                             capacity, fare, stops)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING id"#,
        )
        .bind(dto.route_name.trim())
        .bind(dto.vehicle_number.trim().to_uppercase())
        .bind(&dto.driver_name)
        .bind(&dto.driver_phone)
        .bind(dto.capacity)
        .bind(dto.fare)
        .bind(Json(&dto.stops))
        .fetch_one(db)
        .await
        .map_err(map_route_write_error)?;

        Self::get_route(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_routes(
        db: &PgPool,
        filters: TransportFilterParams,
    ) -> Result<Paginated<TransportRoute>, AppError> {
        let search = like_pattern(&filters.search);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM transport_routes r {ROUTE_FILTER}"
        ))
        .bind(&search)
        .fetch_one(db)
        .await?;

        let sql = format!("{ROUTE_SELECT} {ROUTE_FILTER} ORDER BY r.route_name LIMIT $2 OFFSET $3");
        let routes = sqlx::query_as::<_, TransportRoute>(&sql)
            .bind(&search)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(routes, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_route(db: &PgPool, id: TransportRouteId) -> Result<TransportRoute, AppError> {
        sqlx::query_as::<_, TransportRoute>(&format!("{ROUTE_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Transport route not found")))
    }

    /// Capacity may not drop below the riders already assigned. The route row
    /// stays locked until the update commits, as in `assign_student`.
    #[instrument(skip(db, dto))]
    pub async fn update_route(
        db: &PgPool,
        id: TransportRouteId,
        dto: UpdateTransportRouteDto,
    ) -> Result<TransportRoute, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query_scalar::<_, TransportRouteId>(
            "SELECT id FROM transport_routes WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Transport route not found")))?;

        if let Some(capacity) = dto.capacity {
            let assigned_count = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM students WHERE transport_route_id = $1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

            if assigned_count > i64::from(capacity) {
                return Err(AppError::bad_request(anyhow!(
                    "capacity cannot be lower than the {assigned_count} students already assigned"
                )));
            }
        }

        sqlx::query(
            r#"UPDATE transport_routes SET
                   vehicle_number = COALESCE($2, vehicle_number),
                   driver_name = COALESCE($3, driver_name),
                   driver_phone = COALESCE($4, driver_phone),
                   capacity = COALESCE($5, capacity),
                   fare = COALESCE($6, fare),
                   stops = COALESCE($7, stops),
                   is_active = COALESCE($8, is_active),
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(dto.vehicle_number.as_deref().map(|v| v.trim().to_uppercase()))
        .bind(&dto.driver_name)
        .bind(&dto.driver_phone)
        .bind(dto.capacity)
        .bind(dto.fare)
        .bind(dto.stops.as_ref().map(Json))
        .bind(dto.is_active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Self::get_route(db, id).await
    }

    /// Riders on a deleted route are left unassigned.
    #[instrument(skip(db))]
    pub async fn delete_route(db: &PgPool, id: TransportRouteId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transport_routes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Transport route not found")));
        }

        Ok(())
    }

    /// Puts a student on a route, moving them off any previous one. The route
    /// row is locked so concurrent assignments cannot overfill the bus.
    #[instrument(skip(db))]
    pub async fn assign_student(
        db: &PgPool,
        route_id: TransportRouteId,
        student_id: StudentId,
    ) -> Result<TransportRoute, AppError> {
        let mut tx = db.begin().await?;

        let (capacity, is_active) = sqlx::query_as::<_, (i32, bool)>(
            "SELECT capacity, is_active FROM transport_routes WHERE id = $1 FOR UPDATE",
        )
        .bind(route_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Transport route not found")))?;

        if !is_active {
            return Err(AppError::bad_request(anyhow!("Transport route is not active")));
        }

        let current_route = sqlx::query_scalar::<_, Option<TransportRouteId>>(
            "SELECT transport_route_id FROM students WHERE id = $1",
        )
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))?;

        if current_route == Some(route_id) {
            return Err(AppError::bad_request(anyhow!(
                "Student is already assigned to this route"
            )));
        }

        let assigned = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE transport_route_id = $1",
        )
        .bind(route_id)
        .fetch_one(&mut *tx)
        .await?;

        if assigned >= i64::from(capacity) {
            return Err(AppError::bad_request(anyhow!("Transport route is full")));
        }

        sqlx::query("UPDATE students SET transport_route_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(student_id)
            .bind(route_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(%route_id, %student_id, "Student assigned to route");
        Self::get_route(db, route_id).await
    }

    #[instrument(skip(db))]
    pub async fn unassign_student(
        db: &PgPool,
        route_id: TransportRouteId,
        student_id: StudentId,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"UPDATE students SET transport_route_id = NULL, updated_at = NOW()
               WHERE id = $1 AND transport_route_id = $2"#,
        )
        .bind(student_id)
        .bind(route_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow!(
                "Student is not assigned to this route"
            )));
        }

        Ok(())
    }
}
