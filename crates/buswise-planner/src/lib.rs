//! buswise planner - turns a natural-language trip request into a
//! display-ready transit itinerary.
//!
//! The pipeline is: validate the request ([`contracts`]), render the
//! instruction ([`prompt`]), call the model through the rate-limit aware
//! retry layer, validate its JSON and derive the [`TripPlan`]
//! ([`transform`]). [`TripPlanner::plan_trip`] wraps all of it and reports
//! a tagged [`PlanTripResult`] instead of an error.
//!
//! Saved itineraries live in a [`TripHistoryStore`] ([`history`]).

#![forbid(unsafe_code)]

pub mod contracts;
pub mod history;
pub mod planner;
pub mod prompt;
pub mod result;
pub mod transform;

pub use buswise_core::{PlannerError, PlannerResult, TripPlan, TripRequest, TripStep};
pub use contracts::{ValidatedTripRequest, parse_planner_output, validate_request};
pub use history::{
    HistoryError, InMemoryHistoryStore, NewTripRecord, TripHistoryRecord, TripHistoryStore,
};
pub use planner::{PlannerSettings, TripPlanner, retry_config};
pub use prompt::build_prompt;
pub use result::PlanTripResult;
pub use transform::{MapsLinkBuilder, extract_bus_number, to_trip_plan, waypoints};
