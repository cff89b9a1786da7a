use std::time::Duration;

use rocket::{figment::Figment, get, launch, routes};
use stats_monitor::{
    Readings,
    monitors::snapshot::{DEFAULT_DELIMITER, encode},
    util::{get_addr, get_network_capacity, get_port},
};
use sysinfo::{Disks, Networks, System};
use tracing::{debug, instrument};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Window over which network throughput is sampled
const SAMPLE_WINDOW: Duration = Duration::from_millis(500);

#[get("/_stats")]
#[instrument]
async fn stats() -> String {
    let mut sys = System::new();
    sys.refresh_memory();

    let load_average = System::load_average().one;

    let disks = Disks::new_with_refreshed_list();
    let (disk_total, disk_used) = disks.list().iter().fold((0u64, 0u64), |(total, used), disk| {
        (
            total + disk.total_space(),
            used + disk.total_space().saturating_sub(disk.available_space()),
        )
    });

    let mut networks = Networks::new_with_refreshed_list();
    rocket::tokio::time::sleep(SAMPLE_WINDOW).await;
    networks.refresh(true);
    let transferred = networks
        .list()
        .values()
        .map(|data| data.received() + data.transmitted())
        .sum::<u64>();
    let network_used = transferred as f64 / SAMPLE_WINDOW.as_secs_f64();

    let readings = Readings::from_fields([
        load_average,
        sys.total_memory() as f64,
        sys.used_memory() as f64,
        disk_total as f64,
        disk_used as f64,
        get_network_capacity() as f64,
        network_used,
    ]);
    debug!("serving {readings:?}");

    encode(&readings, DEFAULT_DELIMITER)
}

#[get("/ping")]
fn ping() {}

fn init() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(true),
        )
        .with(filter::LevelFilter::DEBUG)
        .init();
}

fn get_config() -> Figment {
    rocket::Config::figment()
        .merge(("port", get_port()))
        .merge(("address", get_addr()))
        .merge(("workers", 1))
}

#[launch]
fn rocket() -> _ {
    init();
    let figment = get_config();

    rocket::custom(figment).mount("/", routes![stats, ping])
}
