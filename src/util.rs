use std::net::Ipv4Addr;

const MONITOR_URL: &str = "MONITOR_URL";

pub fn get_url() -> Option<String> {
    std::env::var(MONITOR_URL).ok().filter(|url| !url.is_empty())
}

const MONITOR_INTERVAL: &str = "MONITOR_INTERVAL";

pub fn get_interval() -> Option<u64> {
    let interval_from_env = std::env::var(MONITOR_INTERVAL);
    interval_from_env.ok().and_then(|res| res.parse().ok())
}

const AGENT_PORT: &str = "AGENT_PORT";

const DEFAULT_PORT: u16 = 51243;

pub fn get_port() -> u16 {
    let port_from_env = std::env::var(AGENT_PORT);
    port_from_env.map_or(DEFAULT_PORT, |res| res.parse().unwrap_or(DEFAULT_PORT))
}

const AGENT_ADDR: &str = "AGENT_ADDR";

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(0, 0, 0, 0);

pub fn get_addr() -> Ipv4Addr {
    let addr_from_env = std::env::var(AGENT_ADDR);
    addr_from_env.map_or(DEFAULT_ADDR, |res| res.parse().unwrap_or(DEFAULT_ADDR))
}

const AGENT_NETWORK_CAPACITY: &str = "AGENT_NETWORK_CAPACITY";

/// 1 Gbit/s in bytes per second
const DEFAULT_NETWORK_CAPACITY: u64 = 125_000_000;

pub fn get_network_capacity() -> u64 {
    let capacity_from_env = std::env::var(AGENT_NETWORK_CAPACITY);
    capacity_from_env.map_or(DEFAULT_NETWORK_CAPACITY, |res| {
        res.parse().unwrap_or(DEFAULT_NETWORK_CAPACITY)
    })
}
