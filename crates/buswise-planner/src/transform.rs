//! Derivation of the display-ready [`TripPlan`] from validated model output.
//!
//! Everything here is a pure function of its inputs: no clock, no randomness,
//! no I/O. Transforming the same output twice yields equal plans.

use crate::contracts::ValidatedTripRequest;
use buswise_core::{PlannerError, PlannerOutput, PlannerResult, PlannerStep, TripPlan, TripStep};
use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;

/// Directions endpoint of the external map service.
pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/dir/";

static BUS_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bus ([0-9A-Za-z_]+)").expect("bus number regex is valid"));

/// Stop names between the first and last step, empty names dropped.
///
/// Names are passed through as given; only the empty string is skipped.
pub fn waypoints(steps: &[PlannerStep]) -> Vec<String> {
    if steps.len() <= 2 {
        return Vec::new();
    }

    steps[1..steps.len() - 1]
        .iter()
        .filter(|step| !step.location_name.is_empty())
        .map(|step| step.location_name.clone())
        .collect()
}

/// First "bus <token>" mention in an instruction, case-insensitive.
///
/// Best effort only; instructions phrased differently yield `None`.
pub fn extract_bus_number(instruction: &str) -> Option<String> {
    BUS_NUMBER
        .captures(instruction)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

/// Builds transit-direction deep links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsLinkBuilder {
    base_url: String,
}

impl Default for MapsLinkBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MAPS_BASE_URL)
    }
}

impl MapsLinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        MapsLinkBuilder {
            base_url: base_url.into(),
        }
    }

    /// `<base>?api=1&origin=..&destination=..[&waypoints=a|b]&travelmode=transit`,
    /// every value form-encoded.
    pub fn directions_url(&self, origin: &str, destination: &str, waypoints: &[String]) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("api", "1")
            .append_pair("origin", origin)
            .append_pair("destination", destination);
        if !waypoints.is_empty() {
            query.append_pair("waypoints", &waypoints.join("|"));
        }
        query.append_pair("travelmode", "transit");

        format!("{}?{}", self.base_url, query.finish())
    }
}

fn to_trip_step(step: &PlannerStep) -> TripStep {
    TripStep {
        instruction: step.instruction.clone(),
        departure_time: step.schedule.clone(),
        arrival_time: step.arrival_time.clone(),
        description: step.description.clone(),
        landmark: step.landmark.clone(),
        bus_number: extract_bus_number(&step.instruction),
    }
}

/// Turn planner output into a trip plan.
///
/// An itinerary without steps is rejected with
/// [`PlannerError::EmptyItinerary`].
pub fn to_trip_plan(
    request: &ValidatedTripRequest,
    output: &PlannerOutput,
    debug_prompt: &str,
    maps: &MapsLinkBuilder,
) -> PlannerResult<TripPlan> {
    if output.steps.is_empty() {
        return Err(PlannerError::EmptyItinerary);
    }

    let maps_url = maps.directions_url(
        request.start(),
        request.destination(),
        &waypoints(&output.steps),
    );

    Ok(TripPlan {
        summary: output.summary.clone(),
        total_time: output.eta.clone(),
        estimated_cost: output.estimated_cost.clone(),
        maps_url,
        debug_prompt: debug_prompt.to_owned(),
        steps: output.steps.iter().map(to_trip_step).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::validate_request;
    use buswise_core::TripRequest;

    fn step(location: &str, instruction: &str) -> PlannerStep {
        PlannerStep {
            instruction: instruction.to_string(),
            schedule: "9:00 AM".to_string(),
            arrival_time: None,
            location_name: location.to_string(),
            description: format!("At {location}"),
            landmark: None,
        }
    }

    fn output(steps: Vec<PlannerStep>) -> PlannerOutput {
        PlannerOutput {
            summary: "Two buses".to_string(),
            steps,
            eta: "45 minutes".to_string(),
            estimated_cost: "₹45.00".to_string(),
        }
    }

    fn request() -> ValidatedTripRequest {
        validate_request(&TripRequest::new("Majestic", "Electronic City"), 3).unwrap()
    }

    #[test]
    fn interior_steps_become_waypoints() {
        let steps = vec![step("A", "Walk"), step("B", "Take Bus 500D"), step("C", "Walk")];
        assert_eq!(waypoints(&steps), vec!["B"]);

        let plan = to_trip_plan(&request(), &output(steps), "p", &MapsLinkBuilder::default()).unwrap();
        assert!(plan.maps_url.contains("waypoints=B&"));
        assert!(!plan.maps_url.contains("waypoints=A"));
        assert!(!plan.maps_url.contains("C%7C") && !plan.maps_url.contains("%7CC"));
    }

    #[test]
    fn short_itineraries_have_no_waypoints() {
        assert!(waypoints(&[]).is_empty());
        assert!(waypoints(&[step("A", "Walk")]).is_empty());
        assert!(waypoints(&[step("A", "Walk"), step("B", "Walk")]).is_empty());
    }

    #[test]
    fn empty_waypoints_are_dropped() {
        let steps = vec![
            step("Start", "Walk"),
            step("", "Walk"),
            step("Hebbal", "Take Bus 500D"),
            step("", "Wait"),
            step("End", "Walk"),
        ];
        assert_eq!(waypoints(&steps), vec!["Hebbal"]);
    }

    #[test]
    fn whitespace_names_pass_through_untouched() {
        let steps = vec![step("A", "Walk"), step(" ", "Wait"), step(" B ", "Take Bus 1"), step("C", "Walk")];
        assert_eq!(waypoints(&steps), vec![" ", " B "]);

        let url = MapsLinkBuilder::default().directions_url("A", "C", &waypoints(&steps));
        assert!(url.contains("&waypoints=+%7C+B+&"), "{url}");
    }

    #[test]
    fn directions_url_encodes_values() {
        let maps = MapsLinkBuilder::default();
        let url = maps.directions_url(
            "MG Road & Brigade",
            "Koramangala 5th Block",
            &["Hosur Road".to_string(), "Silk Board".to_string()],
        );

        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=MG+Road+%26+Brigade\
             &destination=Koramangala+5th+Block&waypoints=Hosur+Road%7CSilk+Board&travelmode=transit"
        );
    }

    #[test]
    fn waypoints_parameter_is_omitted_when_empty() {
        let url = MapsLinkBuilder::new("https://maps.example.test/dir/").directions_url("Majestic", "Hebbal", &[]);
        assert_eq!(
            url,
            "https://maps.example.test/dir/?api=1&origin=Majestic&destination=Hebbal&travelmode=transit"
        );
    }

    #[test]
    fn bus_numbers_are_extracted() {
        assert_eq!(extract_bus_number("Take Bus 502"), Some("502".to_string()));
        assert_eq!(extract_bus_number("board the BUS 335E at stop 4"), Some("335E".to_string()));
        assert_eq!(extract_bus_number("Walk to the corner"), None);
        assert_eq!(extract_bus_number("Wait at the bus stop"), Some("stop".to_string()));
    }

    #[test]
    fn fields_pass_through() {
        let mut transit = step("Hebbal", "Take Bus 500D");
        transit.arrival_time = Some("9:40 AM".to_string());
        transit.landmark = Some("Flyover".to_string());
        let plan = to_trip_plan(
            &request(),
            &output(vec![step("Majestic", "Walk to platform 3"), transit]),
            "the prompt",
            &MapsLinkBuilder::default(),
        )
        .unwrap();

        assert_eq!(plan.summary, "Two buses");
        assert_eq!(plan.total_time, "45 minutes");
        assert_eq!(plan.estimated_cost, "₹45.00");
        assert_eq!(plan.debug_prompt, "the prompt");
        assert_eq!(plan.steps[0].departure_time, "9:00 AM");
        assert_eq!(plan.steps[0].bus_number, None);
        assert_eq!(plan.steps[1].arrival_time.as_deref(), Some("9:40 AM"));
        assert_eq!(plan.steps[1].landmark.as_deref(), Some("Flyover"));
        assert_eq!(plan.steps[1].bus_number.as_deref(), Some("500D"));
    }

    #[test]
    fn transform_is_idempotent() {
        let raw = output(vec![step("A", "Walk"), step("B", "Take Bus 1"), step("C", "Walk")]);
        let maps = MapsLinkBuilder::default();
        let first = to_trip_plan(&request(), &raw, "p", &maps).unwrap();
        let second = to_trip_plan(&request(), &raw, "p", &maps).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_itinerary_is_rejected() {
        let err = to_trip_plan(&request(), &output(vec![]), "p", &MapsLinkBuilder::default()).unwrap_err();
        assert_eq!(err, PlannerError::EmptyItinerary);
    }
}
