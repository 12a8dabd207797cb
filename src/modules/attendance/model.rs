pub use scholaris_models::attendance::{
    ATTENDANCE_UNIQUE_CONSTRAINT, Attendance, AttendanceEntryDto, AttendanceFilterParams,
    AttendancePercentage, AttendancePercentageQuery, AttendanceStatus, AttendanceSummary,
    RecordAttendanceDto, RecordAttendanceResult, SkipReason, UpdateAttendanceRemarksDto,
    attendance_percentage,
};
