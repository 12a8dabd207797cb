use scholaris_core::{ErrorResponse, FieldError, MessageResponse, PaginationMeta, PaginationParams};
use scholaris_models::admissions::{
    AcademicInfo, Admission, AdmissionStatus, AdmissionStatusLookup, ApproveAdmissionDto,
    ContactInfo, FeeInfo, ParentInfo, RejectAdmissionDto, StudentInfo, SubmitAdmissionDto,
    SubmitAdmissionResponse, UpdateAdmissionStatusDto,
};
use scholaris_models::attendance::{
    Attendance, AttendanceEntryDto, AttendancePercentage, AttendanceStatus, AttendanceSummary,
    RecordAttendanceDto, RecordAttendanceResult, SkipReason, SkippedEntry,
    UpdateAttendanceRemarksDto,
};
use scholaris_models::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
};
use scholaris_models::calendar::{
    CalendarEvent, CreateCalendarEventDto, EventType, UpdateCalendarEventDto,
};
use scholaris_models::courses::{
    Course, CreateCourseDto, EnrollStudentDto, EnrolledStudent, Enrollment, UpdateCourseDto,
};
use scholaris_models::dashboard::{AdmissionBreakdown, DashboardStats, StatusCount};
use scholaris_models::faculty::{CreateFacultyDto, Faculty, UpdateFacultyDto};
use scholaris_models::fees::{
    CreateFeeStructureDto, FeePayment, FeePaymentStatus, FeeStructure, FeeSummaryLine, FeeType,
    PaymentMethod, RecordPaymentDto, StudentFeeSummary, UpdateFeeStructureDto,
};
use scholaris_models::grades::{AssessmentType, CreateGradeDto, Grade, UpdateGradeDto};
use scholaris_models::payments::{
    CapturePaymentDto, CapturePaymentResponse, CreatePaymentIntentDto, PaymentIntent,
    PaymentIntentResponse, PaymentIntentStatus,
};
use scholaris_models::students::{CreateStudentDto, Student, UpdateStudentDto};
use scholaris_models::subjects::{CreateSubjectDto, Subject, UpdateSubjectDto};
use scholaris_models::transport::{
    AssignStudentDto, CreateTransportRouteDto, RouteStop, TransportRoute, UpdateTransportRouteDto,
};
use scholaris_models::users::{CreateUserDto, UpdateUserStatusDto, User, UserRole};
use scholaris_models::Session;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::general::model::HealthStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::get_me,
        crate::modules::auth::controller::change_password,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user_status,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::get_my_profile,
        crate::modules::students::controller::get_my_children,
        crate::modules::faculty::controller::create_faculty,
        crate::modules::faculty::controller::get_faculty_list,
        crate::modules::faculty::controller::get_faculty,
        crate::modules::faculty::controller::update_faculty,
        crate::modules::faculty::controller::delete_faculty,
        crate::modules::faculty::controller::get_my_faculty_profile,
        crate::modules::subjects::controller::create_subject,
        crate::modules::subjects::controller::get_subjects,
        crate::modules::subjects::controller::get_subject,
        crate::modules::subjects::controller::update_subject,
        crate::modules::subjects::controller::delete_subject,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::enroll_student,
        crate::modules::courses::controller::unenroll_student,
        crate::modules::courses::controller::get_course_students,
        crate::modules::courses::controller::get_my_courses,
        crate::modules::courses::controller::get_student_courses,
        crate::modules::attendance::controller::record_attendance,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::update_attendance_remarks,
        crate::modules::attendance::controller::get_attendance_percentage,
        crate::modules::attendance::controller::get_my_attendance,
        crate::modules::attendance::controller::get_my_attendance_summary,
        crate::modules::attendance::controller::get_my_attendance_percentage,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::get_my_grades,
        crate::modules::admissions::controller::submit_admission,
        crate::modules::admissions::controller::lookup_admission,
        crate::modules::admissions::controller::get_admissions,
        crate::modules::admissions::controller::get_admission,
        crate::modules::admissions::controller::approve_admission,
        crate::modules::admissions::controller::reject_admission,
        crate::modules::admissions::controller::update_admission_status,
        crate::modules::fees::controller::create_fee_structure,
        crate::modules::fees::controller::get_fee_structures,
        crate::modules::fees::controller::get_fee_structure,
        crate::modules::fees::controller::update_fee_structure,
        crate::modules::fees::controller::delete_fee_structure,
        crate::modules::fees::controller::record_payment,
        crate::modules::fees::controller::get_fee_payments,
        crate::modules::fees::controller::get_student_fee_summary,
        crate::modules::fees::controller::get_my_fee_summary,
        crate::modules::fees::controller::get_my_fee_payments,
        crate::modules::payments::controller::create_payment_intent,
        crate::modules::payments::controller::capture_payment,
        crate::modules::transport::controller::create_route,
        crate::modules::transport::controller::get_routes,
        crate::modules::transport::controller::get_route,
        crate::modules::transport::controller::update_route,
        crate::modules::transport::controller::delete_route,
        crate::modules::transport::controller::assign_student,
        crate::modules::transport::controller::unassign_student,
        crate::modules::calendar::controller::create_event,
        crate::modules::calendar::controller::get_events,
        crate::modules::calendar::controller::get_event,
        crate::modules::calendar::controller::update_event,
        crate::modules::calendar::controller::delete_event,
        crate::modules::dashboard::controller::get_dashboard_stats,
        crate::modules::dashboard::controller::get_admission_breakdown,
        crate::modules::general::controller::health,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            MessageResponse,
            PaginationMeta,
            PaginationParams,
            Session,
            LoginRequest,
            LoginResponse,
            RefreshTokenRequest,
            ChangePasswordRequest,
            User,
            UserRole,
            CreateUserDto,
            UpdateUserStatusDto,
            Student,
            CreateStudentDto,
            UpdateStudentDto,
            Faculty,
            CreateFacultyDto,
            UpdateFacultyDto,
            Subject,
            CreateSubjectDto,
            UpdateSubjectDto,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            EnrollStudentDto,
            Enrollment,
            EnrolledStudent,
            Attendance,
            AttendanceStatus,
            AttendanceEntryDto,
            RecordAttendanceDto,
            RecordAttendanceResult,
            SkippedEntry,
            SkipReason,
            UpdateAttendanceRemarksDto,
            AttendancePercentage,
            AttendanceSummary,
            Grade,
            AssessmentType,
            CreateGradeDto,
            UpdateGradeDto,
            Admission,
            AdmissionStatus,
            StudentInfo,
            AcademicInfo,
            ContactInfo,
            ParentInfo,
            FeeInfo,
            SubmitAdmissionDto,
            SubmitAdmissionResponse,
            AdmissionStatusLookup,
            ApproveAdmissionDto,
            RejectAdmissionDto,
            UpdateAdmissionStatusDto,
            FeeStructure,
            FeeType,
            CreateFeeStructureDto,
            UpdateFeeStructureDto,
            FeePayment,
            FeePaymentStatus,
            PaymentMethod,
            RecordPaymentDto,
            FeeSummaryLine,
            StudentFeeSummary,
            PaymentIntent,
            PaymentIntentStatus,
            CreatePaymentIntentDto,
            CapturePaymentDto,
            PaymentIntentResponse,
            CapturePaymentResponse,
            TransportRoute,
            RouteStop,
            CreateTransportRouteDto,
            UpdateTransportRouteDto,
            AssignStudentDto,
            CalendarEvent,
            EventType,
            CreateCalendarEventDto,
            UpdateCalendarEventDto,
            DashboardStats,
            StatusCount,
            AdmissionBreakdown,
            HealthStatus,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, token refresh and password changes"),
        (name = "Users", description = "Account administration"),
        (name = "Students", description = "Student records and the student portal"),
        (name = "Faculty", description = "Faculty records"),
        (name = "Subjects", description = "Subject catalogue"),
        (name = "Courses", description = "Course offerings and enrollment"),
        (name = "Attendance", description = "Daily attendance"),
        (name = "Grades", description = "Assessment marks"),
        (name = "Admissions", description = "Application review"),
        (name = "Fees", description = "Fee structures and payments"),
        (name = "Payments", description = "Mock online payment gateway"),
        (name = "Transport", description = "Bus routes and assignments"),
        (name = "Calendar", description = "Academic calendar"),
        (name = "Dashboard", description = "Administrative statistics"),
        (name = "General", description = "Public endpoints")
    ),
    info(
        title = "Scholaris API",
        version = "0.1.0",
        description = "School management REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_public_and_gated_paths_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/general/health",
            "/api/general/admissions",
            "/api/admin/admissions/{id}/approve",
            "/api/courses/{id}/enroll",
            "/api/faculty/attendance",
            "/api/payments/capture",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
