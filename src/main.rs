use log::*;
use perf_monitor::error::Error;
use perf_monitor::TimerRegistry;
use std::thread::sleep;
use std::time::Duration;

fn main() -> Result<(), Error> {
    let config = perf_monitor::config::load_or_default("config.ini")?.apply_env()?;
    // provide logging format
    perf_monitor::logger::log_init(config.log_level)?;
    info!("{config:?}");

    let registry = TimerRegistry::from_config(&config);
    let checkout = registry.timer_for_topic("checkout");

    checkout.start("render", None);
    sleep(Duration::from_millis(20));
    checkout.stop("render");

    // over the limit on purpose, shows the warning
    checkout.start("payment", Some(Duration::from_millis(5)));
    sleep(Duration::from_millis(15));
    checkout.stop("payment");

    checkout.start("confirmation", None);
    checkout.log_summary("main");
    checkout.reset();
    info!("topics: {:?}", registry.topics());
    Ok(())
}
