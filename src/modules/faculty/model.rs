pub use scholaris_models::faculty::{
    CreateFacultyDto, Faculty, FacultyFilterParams, UpdateFacultyDto,
};
