//! ---
//! vire_section: "02-messaging-ipc-data-model"
//! vire_subsection: "module"
//! vire_type: "source"
//! vire_scope: "code"
//! vire_description: "Resource execution payloads and status records."
//! vire_version: "v0.0.0-prealpha"
//! vire_owner: "tbd"
//! ---
//! Payloads exchanged with the control and monitoring system about managed
//! resources, addressed by path (e.g. `SuperNEMO:/Demonstrator/CMS/Coil/Control/Voltage/__dp_write__`).

pub mod argument;
pub mod request;
pub mod response;
pub mod status;

pub use argument::{ArgumentList, MethodArgument};
pub use request::ResourceExecRequest;
pub use response::{
    ExecFailure, ResourceExecBaseResponse, ResourceExecFailureResponse,
    ResourceExecSuccessResponse,
};
pub use status::ResourceStatusRecord;
