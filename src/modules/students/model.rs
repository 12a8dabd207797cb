pub use scholaris_models::students::{
    CreateStudentDto, Student, StudentFilterParams, StudentScopeQuery, UpdateStudentDto,
};
