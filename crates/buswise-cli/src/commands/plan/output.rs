use std::fmt;

use buswise_planner::{TripPlan, TripStep};

/// Human-readable itinerary, rendered through `Display`.
pub struct PlanView<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub plan: &'a TripPlan,
}

impl fmt::Display for PlanView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;
        writeln!(f, "{} -> {}", self.from, self.to)?;
        writeln!(f, "{}", plan.summary)?;
        writeln!(
            f,
            "Total time: {}  |  Estimated cost: {}",
            plan.total_time, plan.estimated_cost
        )?;
        let buses: Vec<&str> = plan.bus_numbers().collect();
        if !buses.is_empty() {
            writeln!(f, "Buses: {}", buses.join(" -> "))?;
        }
        writeln!(f)?;

        for (index, step) in plan.steps.iter().enumerate() {
            write_step(f, index + 1, step)?;
        }

        writeln!(f)?;
        writeln!(f, "Map: {}", plan.maps_url)
    }
}

fn write_step(f: &mut fmt::Formatter<'_>, number: usize, step: &TripStep) -> fmt::Result {
    writeln!(f, "{:>2}. [{}] {}", number, step.departure_time, step.instruction)?;
    writeln!(f, "    {}", step.description)?;

    let mut details = Vec::new();
    if let Some(arrival) = &step.arrival_time {
        details.push(format!("arrives {arrival}"));
    }
    if let Some(bus) = &step.bus_number {
        details.push(format!("bus {bus}"));
    }
    if let Some(landmark) = &step.landmark {
        details.push(format!("near {landmark}"));
    }
    if !details.is_empty() {
        writeln!(f, "    ({})", details.join(", "))?;
    }
    Ok(())
}
