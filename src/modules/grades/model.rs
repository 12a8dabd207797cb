pub use scholaris_models::grades::{
    AssessmentType, CreateGradeDto, Grade, GradeFilterParams, UpdateGradeDto, check_marks,
    grade_percentage, letter_grade,
};
