#[tokio::main]
async fn main() {
    if let Err(e) = health_report_lib::run().await {
        eprintln!("health-report: {e}");
        std::process::exit(1);
    }
}
