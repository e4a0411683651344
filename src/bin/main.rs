use std::sync::Arc;

use flexcrow_dashboard::{
    addresses::ApiAddressService,
    api::{ApiClient, ReqwestApiTransport},
    auth::ApiAuthService,
    clock::SystemClock,
    config::Config,
    enrichment::NameResolver,
    files::ApiFileService,
    payments::ApiPaymentService,
    products::ApiProductService,
    router,
    state::AppState,
    support::EmailJsMailer,
    transactions::ApiTransactionService,
    users::ApiUserService,
    views::Views,
    withdrawals::ApiWithdrawalService,
};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::load("config.json")?;
    let client = ReqwestApiTransport::build_client(config.request_timeout_secs)?;
    let api = ApiClient::new(ReqwestApiTransport::new_dyn(client.clone(), &config.api_base_url));

    let user_svc = ApiUserService::new_dyn(api.clone());
    let product_svc = ApiProductService::new_dyn(api.clone());
    let app_state = AppState {
        views: Views::load(&config.templates)?,
        clock: SystemClock::new_dyn(),
        auth_svc: ApiAuthService::new_dyn(api.clone()),
        address_svc: ApiAddressService::new_dyn(api.clone()),
        tx_svc: ApiTransactionService::new_dyn(api.clone()),
        payment_svc: ApiPaymentService::new_dyn(api.clone()),
        withdrawal_svc: ApiWithdrawalService::new_dyn(api.clone()),
        file_svc: ApiFileService::new_dyn(api),
        mailer: EmailJsMailer::new_dyn(client, config.email.clone()),
        names: NameResolver::new(user_svc.clone(), product_svc.clone()),
        user_svc,
        product_svc,
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&app_state.config.listen_addr).await?;
    info!("Listening on {} against {}", app_state.config.listen_addr, app_state.config.api_base_url);
    axum::serve(listener, router::app(app_state)).await?;

    Ok(())
}
