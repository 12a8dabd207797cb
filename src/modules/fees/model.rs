pub use scholaris_models::fees::{
    CreateFeeStructureDto, FeePayment, FeePaymentFilterParams, FeePaymentStatus, FeeStructure,
    FeeStructureFilterParams, FeeSummaryLine, FeeSummaryQuery, PaymentMethod, RecordPaymentDto,
    StudentFeeSummary, UpdateFeeStructureDto,
};
