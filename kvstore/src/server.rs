use std::time::Duration;

use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "kvstore-server")]
struct Opt {
    /// Unique server ID, below 1000
    #[structopt(short = "i", long = "id", env = "SERVER_ID")]
    id: u64,

    /// Host to listen on
    #[structopt(long = "host", env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[structopt(short = "p", long = "port", env = "PORT")]
    port: u16,

    /// Comma-separated `host:port` of every replica, this one included
    #[structopt(short = "r", long = "replicas", env = "REPLICAS", default_value = "")]
    replicas: String,

    /// Timeout for calls to other replicas (in milliseconds)
    #[structopt(short = "t", long = "timeout", default_value = "1000")]
    timeout: u64,

    /// Rounds attempted per write
    #[structopt(long = "retries", default_value = "5")]
    retries: usize,

    /// Base delay between rounds of one write (in milliseconds)
    #[structopt(long = "backoff", default_value = "0")]
    backoff: u64,

    /// Chance that a prepare or accept fails synthetically
    #[structopt(long = "fault-probability", default_value = "0")]
    fault_probability: f64,

    /// Verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", parse(from_occurrences))]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let opt = Opt::from_args();

    if let Err(error) = kvstore::logger(opt.verbose) {
        eprintln!("[ERROR]: could not install logger: {}", error);
    }

    let address = format!("{}:{}", opt.host, opt.port);
    let mut replicas = kvstore::replicas(&opt.replicas);
    if replicas.is_empty() {
        replicas.push(address.clone());
    }

    let config = kvpaxos::Config::new(opt.id, address, replicas)
        .with_timeout(Duration::from_millis(opt.timeout))
        .with_retries(opt.retries)
        .with_backoff(Duration::from_millis(opt.backoff))
        .with_fault_probability(opt.fault_probability);

    tokio::select! {
        result = config.run() => {
            if let Err(error) = result {
                log::error!("server {} stopped: {}", opt.id, error);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => log::info!("server {} shutting down", opt.id),
    }
}
