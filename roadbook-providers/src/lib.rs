//! The two concrete mapping-provider adapters.
//!
//! Each adapter implements [`roadbook_core::MapProvider`] over an injected
//! vendor SDK transport, chosen once per editor session. The vendors differ
//! in their native datum and overlay APIs: the "compass" back-end speaks
//! GCJ-02 and returns a single dense drive polyline, while the "beacon"
//! back-end speaks BD-09 and returns a list of candidate plans. All datum
//! conversion happens at the adapter boundary; everything upstream sees
//! WGS84 only.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod beacon;
pub mod compass;
pub mod datum;
pub mod scene;

pub use beacon::{
    BeaconAddress, BeaconGeocoder, BeaconPlan, BeaconProvider, BeaconRouting, BeaconServiceError,
};
pub use compass::{
    CompassGeocoder, CompassPlan, CompassProvider, CompassRouting, CompassServiceError,
};
pub use scene::{MarkerDiff, OverlayScene};
