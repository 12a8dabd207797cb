pub use scholaris_models::payments::{
    CapturePaymentDto, CapturePaymentResponse, CreatePaymentIntentDto, PaymentIntent,
    PaymentIntentResponse, PaymentIntentStatus,
};
