pub use scholaris_models::transport::{
    AssignStudentDto, CreateTransportRouteDto, RouteStop, TransportFilterParams, TransportRoute,
    UpdateTransportRouteDto,
};
