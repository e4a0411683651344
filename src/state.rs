use std::sync::Arc;

use axum_macros::FromRef;

use crate::{
    addresses::DynAddressService,
    auth::DynAuthService,
    clock::DynClock,
    config::Config,
    enrichment::NameResolver,
    files::DynFileService,
    payments::DynPaymentService,
    products::DynProductService,
    support::DynSupportMailer,
    transactions::DynTransactionService,
    users::DynUserService,
    views::Views,
    withdrawals::DynWithdrawalService,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub config: Arc<Config>,
    pub views: Views,
    pub clock: DynClock,
    pub auth_svc: DynAuthService,
    pub user_svc: DynUserService,
    pub address_svc: DynAddressService,
    pub product_svc: DynProductService,
    pub tx_svc: DynTransactionService,
    pub payment_svc: DynPaymentService,
    pub withdrawal_svc: DynWithdrawalService,
    pub file_svc: DynFileService,
    pub mailer: DynSupportMailer,
    pub names: NameResolver,
}
