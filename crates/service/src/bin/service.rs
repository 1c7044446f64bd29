#[tokio::main]
async fn main() {
    dvt_relayer_service_lib::service_main().await;
}
