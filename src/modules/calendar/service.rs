use anyhow::anyhow;
use scholaris_core::{AppError, Paginated};
use scholaris_db::PgPool;
use scholaris_models::{CalendarEventId, UserId};
use tracing::instrument;
use validator::ValidationErrors;

use crate::modules::calendar::model::{
    CalendarEvent, CalendarFilterParams, CreateCalendarEventDto, UpdateCalendarEventDto,
    check_event_dates,
};

const EVENT_COLUMNS: &str = "id, title, description, event_type, start_date, end_date, academic_year, created_by, created_at, updated_at";

const EVENT_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR academic_year = $1)
      AND ($2::text IS NULL OR event_type = $2)
      AND ($3::date IS NULL OR end_date >= $3)
      AND ($4::date IS NULL OR start_date <= $4)
"#;

pub struct CalendarService;

impl CalendarService {
    #[instrument(skip(db, dto), fields(title = %dto.title))]
    pub async fn create_event(
        db: &PgPool,
        created_by: UserId,
        dto: CreateCalendarEventDto,
    ) -> Result<CalendarEvent, AppError> {
        let sql = format!(
            r#"INSERT INTO calendar_events (title, description, event_type, start_date, end_date,
                                            academic_year, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {EVENT_COLUMNS}"#
        );

        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(dto.title.trim())
            .bind(&dto.description)
            .bind(dto.event_type)
            .bind(dto.start_date)
            .bind(dto.end_date.unwrap_or(dto.start_date))
            .bind(&dto.academic_year)
            .bind(created_by)
            .fetch_one(db)
            .await?;

        Ok(event)
    }

    /// Events overlapping `[from, to]`, earliest first.
    #[instrument(skip(db))]
    pub async fn get_events(
        db: &PgPool,
        filters: CalendarFilterParams,
    ) -> Result<Paginated<CalendarEvent>, AppError> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM calendar_events {EVENT_FILTER}"
        ))
        .bind(&filters.academic_year)
        .bind(filters.event_type)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_one(db)
        .await?;

        let sql = format!(
            r#"SELECT {EVENT_COLUMNS} FROM calendar_events {EVENT_FILTER}
               ORDER BY start_date, title
               LIMIT $5 OFFSET $6"#
        );
        let events = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(&filters.academic_year)
            .bind(filters.event_type)
            .bind(filters.from)
            .bind(filters.to)
            .bind(filters.pagination.limit())
            .bind(filters.pagination.offset())
            .fetch_all(db)
            .await?;

        Ok(Paginated::new(events, total, &filters.pagination))
    }

    #[instrument(skip(db))]
    pub async fn get_event(db: &PgPool, id: CalendarEventId) -> Result<CalendarEvent, AppError> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_event(
        db: &PgPool,
        id: CalendarEventId,
        dto: UpdateCalendarEventDto,
    ) -> Result<CalendarEvent, AppError> {
        let current = Self::get_event(db, id).await?;
        let start_date = dto.start_date.unwrap_or(current.start_date);
        let end_date = dto.end_date.unwrap_or(current.end_date);

        check_event_dates(start_date, end_date).map_err(|err| {
            let mut errors = ValidationErrors::new();
            errors.add("end_date", err);
            AppError::validation(&errors)
        })?;

        let sql = format!(
            r#"UPDATE calendar_events SET
                   title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   event_type = COALESCE($4, event_type),
                   start_date = $5,
                   end_date = $6,
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {EVENT_COLUMNS}"#
        );

        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(dto.event_type)
            .bind(start_date)
            .bind(end_date)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Event not found")))
    }

    #[instrument(skip(db))]
    pub async fn delete_event(db: &PgPool, id: CalendarEventId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Event not found")));
        }

        Ok(())
    }
}
