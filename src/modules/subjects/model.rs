pub use scholaris_models::subjects::{
    CreateSubjectDto, Subject, SubjectFilterParams, UpdateSubjectDto,
};
