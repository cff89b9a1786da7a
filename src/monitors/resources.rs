//! Threshold evaluation
//!
//! Every metric is checked against a fixed rule. Rules run in the order of [`RULES`], which is
//! also the order of the returned alerts.

use tracing::trace;

use crate::{AlertRecord, MetricKind, Readings, Resource, ResourceMetric};

pub const LOAD_AVERAGE_LIMIT: f64 = 30.0;
pub const MEMORY_USAGE_LIMIT: f64 = 0.8;
pub const DISK_USAGE_LIMIT: f64 = 0.9;
pub const NETWORK_USAGE_LIMIT: f64 = 0.9;

/// Divisor turning bytes into megabytes for free-capacity figures.
pub const MEGABYTE: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub resource: Resource,

    /// Exclusive upper bound: values strictly above it violate the rule
    pub limit: f64,

    /// Applied to the free capacity before it is reported
    pub unit_divisor: f64,
}

pub const RULES: [Rule; 4] = [
    Rule {
        resource: Resource::LoadAverage,
        limit: LOAD_AVERAGE_LIMIT,
        unit_divisor: 1.0,
    },
    Rule {
        resource: Resource::Memory,
        limit: MEMORY_USAGE_LIMIT,
        unit_divisor: 1.0,
    },
    Rule {
        resource: Resource::Disk,
        limit: DISK_USAGE_LIMIT,
        unit_divisor: MEGABYTE,
    },
    Rule {
        resource: Resource::Network,
        limit: NETWORK_USAGE_LIMIT,
        unit_divisor: MEGABYTE,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceEvaluation {
    /// Within the limit
    Ok,

    /// Capacity is zero (or missing for a ratio metric), nothing to compare
    NoCapacity,

    /// Over the limit, carrying the figure to report
    Exceeding { observed: f64 },
}

impl ResourceEvaluation {
    pub fn evaluate(metric: &ResourceMetric, rule: &Rule) -> ResourceEvaluation {
        match metric.kind {
            MetricKind::Direct => {
                if metric.used > rule.limit {
                    return ResourceEvaluation::Exceeding {
                        observed: metric.used,
                    };
                }
                ResourceEvaluation::Ok
            }
            MetricKind::Percentage | MetricKind::FreeCapacity => {
                let Some(capacity) = metric.capacity.filter(|capacity| *capacity > 0.0) else {
                    return ResourceEvaluation::NoCapacity;
                };

                let ratio = metric.used / capacity;
                if ratio <= rule.limit {
                    return ResourceEvaluation::Ok;
                }

                let observed = match metric.kind {
                    MetricKind::Percentage => ratio * 100.0,
                    _ => (capacity - metric.used) / rule.unit_divisor,
                };
                ResourceEvaluation::Exceeding { observed }
            }
        }
    }
}

/// Evaluate all readings against the rule table.
pub fn evaluate(readings: &Readings) -> Vec<AlertRecord> {
    readings
        .metrics()
        .into_iter()
        .zip(RULES.iter())
        .filter_map(|(metric, rule)| {
            let evaluation = ResourceEvaluation::evaluate(metric, rule);
            trace!(
                "{}: used {} of {:?} (limit {}) -> {evaluation:?}",
                metric.resource, metric.used, metric.capacity, rule.limit
            );

            match evaluation {
                ResourceEvaluation::Exceeding { observed } => Some(AlertRecord {
                    metric: metric.resource,
                    message: alert_message(metric.resource, observed),
                    observed_value: observed,
                }),
                ResourceEvaluation::Ok | ResourceEvaluation::NoCapacity => None,
            }
        })
        .collect()
}

fn alert_message(resource: Resource, observed: f64) -> String {
    match resource {
        Resource::LoadAverage => format!("Load Average is too high: {observed:.0}"),
        Resource::Memory => format!("Memory usage too high: {observed:.0}%"),
        Resource::Disk => format!("Free disk space is too low: {observed:.0} Mb left"),
        Resource::Network => {
            format!("Network bandwidth usage high: {observed:.0} Mbit/s available")
        }
    }
}
