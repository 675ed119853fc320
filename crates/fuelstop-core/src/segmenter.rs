//! Range segmentation: decide where along a route the vehicle must refuel.
//!
//! The trace is walked with a fixed stride; intermediate points are never
//! looked at, so the result depends on point density rather than physical
//! distance. Once the sampled distance since the last refuel reaches the
//! trigger fraction of range, the next stride samples are scanned and the
//! first one closer than the accept limit becomes a refuel point. In practice
//! the first candidate is almost always accepted, which puts stops just past
//! the trigger distance.

use serde::{Deserialize, Serialize};

use crate::models::{Coverage, RefuelPoint, RoutePoint, RouteTrace};
use crate::rules::PlannerConfig;
use crate::spatial::haversine_miles;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub points: Vec<RefuelPoint>,
    pub coverage: Coverage,
}

fn miles_between(a: &RoutePoint, b: &RoutePoint) -> f64 {
    haversine_miles(a.lat, a.lon, b.lat, b.lon)
}

/// Pick the refuel points for `trace`.
///
/// Never fails: an empty or short trace yields no points, and a lookahead
/// that finds nothing under the accept limit ends the walk with
/// `Coverage::Truncated` (the points found so far are kept).
pub fn segment_route(trace: &RouteTrace, config: &PlannerConfig) -> Segmentation {
    let points = trace.points();
    let mut segmentation = Segmentation::default();
    let Some(first) = points.first() else {
        return segmentation;
    };

    let stride = config.stride.max(1);
    let trigger_miles = config.trigger_miles();
    let accept_limit = config.accept_limit_miles();

    let mut anchor = *first;
    let mut accumulated_miles = 0.0;
    let mut index = stride;

    while index < points.len() {
        let sample = points[index];
        accumulated_miles += miles_between(&anchor, &sample);
        anchor = sample;

        if accumulated_miles < trigger_miles {
            index += stride;
            continue;
        }

        let mut window = (1..=config.lookahead_window)
            .map(|step| index + step * stride)
            .take_while(|&candidate| candidate < points.len())
            .peekable();
        if window.peek().is_none() {
            // Triggered on the last sample: the route ends within one stride.
            tracing::debug!(
                trace_index = index,
                accumulated_miles,
                remaining_points = points.len() - 1 - index,
                "trigger on final stride sample, route ends before next candidate"
            );
            break;
        }

        let accepted = window.find(|&candidate| miles_between(&anchor, &points[candidate]) < accept_limit);
        match accepted {
            Some(candidate) => {
                let point = points[candidate];
                segmentation.points.push(RefuelPoint {
                    trace_index: candidate,
                    lat: point.lat,
                    lon: point.lon,
                });
                anchor = point;
                accumulated_miles = 0.0;
                index = candidate + stride;
            }
            None => {
                tracing::debug!(
                    trace_index = index,
                    accumulated_miles,
                    "no refuel candidate inside accept limit, truncating walk"
                );
                segmentation.coverage = Coverage::Truncated { trace_index: index };
                break;
            }
        }
    }

    segmentation
}
