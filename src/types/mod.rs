// ABOUTME: Validated domain newtypes for polepole.
// ABOUTME: App names, image references, revision identifiers, traffic weights.

mod app_name;
mod id;
mod image_ref;
mod traffic_weight;

pub use app_name::{AppName, AppNameError};
pub use id::{GroupMarker, Id, ResourceGroup, RevisionMarker, RevisionName};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use traffic_weight::{TrafficWeight, TrafficWeightError};
