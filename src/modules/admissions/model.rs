pub use scholaris_models::admissions::{
    APPLICATION_NUMBER_ATTEMPTS, Admission, AdmissionFilterParams, AdmissionStatus,
    AdmissionStatusLookup, ApproveAdmissionDto, RejectAdmissionDto, SubmitAdmissionDto,
    SubmitAdmissionResponse, UpdateAdmissionStatusDto, check_transition,
    format_application_number,
};
