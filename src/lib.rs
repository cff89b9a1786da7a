pub mod actors;
pub mod alerts;
pub mod clock;
pub mod config;
pub mod discord;
pub mod monitors;
pub mod transport;
pub mod util;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resources reported by a snapshot, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    LoadAverage,
    Memory,
    Disk,
    Network,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::LoadAverage,
        Resource::Memory,
        Resource::Disk,
        Resource::Network,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::LoadAverage => "load_average",
            Resource::Memory => "memory",
            Resource::Disk => "disk",
            Resource::Network => "network",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a metric is compared against its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    /// The used value is compared as is (no capacity)
    Direct,

    /// used/capacity is compared, the alert reports a percentage
    Percentage,

    /// used/capacity is compared, the alert reports the remaining capacity
    FreeCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetric {
    pub resource: Resource,
    pub capacity: Option<f64>,
    pub used: f64,
    pub kind: MetricKind,
}

impl ResourceMetric {
    /// Remaining capacity, if the metric has one
    pub fn free(&self) -> Option<f64> {
        self.capacity.map(|capacity| capacity - self.used)
    }
}

/// Decoded form of one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub load_average: ResourceMetric,
    pub memory: ResourceMetric,
    pub disk: ResourceMetric,
    pub network: ResourceMetric,
}

impl Readings {
    /// Number of positional fields in the wire format.
    pub const FIELD_COUNT: usize = 7;

    /// Field names in wire order.
    pub const FIELD_NAMES: [&'static str; Readings::FIELD_COUNT] = [
        "loadAverage",
        "memoryTotal",
        "memoryUsed",
        "diskTotal",
        "diskUsed",
        "networkTotal",
        "networkUsed",
    ];

    /// Build readings from the positional fields of a snapshot.
    pub fn from_fields(fields: [f64; Readings::FIELD_COUNT]) -> Self {
        let [
            load_average,
            memory_total,
            memory_used,
            disk_total,
            disk_used,
            network_total,
            network_used,
        ] = fields;

        Self {
            load_average: ResourceMetric {
                resource: Resource::LoadAverage,
                capacity: None,
                used: load_average,
                kind: MetricKind::Direct,
            },
            memory: ResourceMetric {
                resource: Resource::Memory,
                capacity: Some(memory_total),
                used: memory_used,
                kind: MetricKind::Percentage,
            },
            disk: ResourceMetric {
                resource: Resource::Disk,
                capacity: Some(disk_total),
                used: disk_used,
                kind: MetricKind::FreeCapacity,
            },
            network: ResourceMetric {
                resource: Resource::Network,
                capacity: Some(network_total),
                used: network_used,
                kind: MetricKind::FreeCapacity,
            },
        }
    }

    /// Positional fields in wire order (inverse of [`Readings::from_fields`]).
    pub fn fields(&self) -> [f64; Readings::FIELD_COUNT] {
        [
            self.load_average.used,
            self.memory.capacity.unwrap_or_default(),
            self.memory.used,
            self.disk.capacity.unwrap_or_default(),
            self.disk.used,
            self.network.capacity.unwrap_or_default(),
            self.network.used,
        ]
    }

    /// Metrics in evaluation order: load, memory, disk, network.
    pub fn metrics(&self) -> [&ResourceMetric; 4] {
        [&self.load_average, &self.memory, &self.disk, &self.network]
    }
}

/// One violated threshold in one poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Resource whose threshold was violated
    pub metric: Resource,

    /// Human-readable alert line
    pub message: String,

    /// The figure rendered in `message` (load, percent or free capacity)
    pub observed_value: f64,
}
