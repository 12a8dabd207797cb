pub use scholaris_models::calendar::{
    CalendarEvent, CalendarFilterParams, CreateCalendarEventDto, EventType,
    UpdateCalendarEventDto, check_event_dates,
};
