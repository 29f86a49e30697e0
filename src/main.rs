use clap::Parser;
use workshop_yard::cli::{self, Cli};
use workshop_yard::OrderError;

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to start async runtime: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = runtime.block_on(cli::run(cli)) {
        match e.downcast_ref::<OrderError>() {
            Some(order_error) if order_error.is_fatal() => {
                eprintln!("🛑 {order_error}");
                eprintln!("   Nothing shown: the order store must be reachable.");
                eprintln!("   → Check `database.path`, or create the store with: workshop-yard init");
                std::process::exit(2);
            }
            Some(order_error) => eprintln!("❌ {order_error}"),
            None => eprintln!("❌ {e:#}"),
        }
        std::process::exit(1);
    }
}
