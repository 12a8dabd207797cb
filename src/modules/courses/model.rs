pub use scholaris_models::courses::{
    Course, CourseFilterParams, CreateCourseDto, EnrollStudentDto, EnrolledStudent, Enrollment,
    EnrollmentRejection, UpdateCourseDto, check_enrollment,
};
