use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use crate::tracker::{LocationSample, TrackerMode, ViewModel};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracker::view,
        super::api::tracker::route,
        super::api::tracker::reconnect,
    ),
    components(schemas(ViewModel, LocationSample, TrackerMode, ErrorResponse)),
    info(
        title = "Vehicle Tracker API",
        description = "Live position and route of the tracked vehicle",
        version = "0.1.0"
    ),
    tags(
        (name = "tracker", description = "Vehicle position and connectivity")
    )
)]
pub struct ApiDoc;
