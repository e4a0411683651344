pub mod error;
pub mod models;
pub mod routes;

use axum::extract::FromRef;

use crate::{
    addresses::DynAddressService,
    api::query::{ListQuery, Owner},
    auth::DynAuthService,
    enrichment::NameResolver,
    payments::DynPaymentService,
    products::DynProductService,
    state::AppState,
    transactions::DynTransactionService,
    users::DynUserService,
    withdrawals::DynWithdrawalService,
};

use {error::*, models::*};

#[cfg(test)]
mod test;

/// Reads behind the landing pages
#[derive(Clone)]
pub struct Dashboard {
    pub user_svc: DynUserService,
    pub address_svc: DynAddressService,
    pub product_svc: DynProductService,
    pub tx_svc: DynTransactionService,
    pub payment_svc: DynPaymentService,
    pub withdrawal_svc: DynWithdrawalService,
    pub auth_svc: DynAuthService,
    pub names: NameResolver,
}

impl FromRef<AppState> for Dashboard {
    fn from_ref(state: &AppState) -> Self {
        Self {
            user_svc: state.user_svc.clone(),
            address_svc: state.address_svc.clone(),
            product_svc: state.product_svc.clone(),
            tx_svc: state.tx_svc.clone(),
            payment_svc: state.payment_svc.clone(),
            withdrawal_svc: state.withdrawal_svc.clone(),
            auth_svc: state.auth_svc.clone(),
            names: state.names.clone(),
        }
    }
}

impl Dashboard {
    ///
    /// Totals of every record list. Each list is asked for a single row
    /// and only its `total_count` is kept.
    ///
    pub async fn counts(&self, token: &str) -> Result<Counts> {
        let one = || ListQuery::new(1, 1);
        let (users, addresses, products, transactions, payments, withdrawals) = futures::join!(
            self.user_svc.list_users(token, one()),
            self.address_svc.list_addresses(token, one()),
            self.product_svc.list_products(token, one()),
            self.tx_svc.list_transactions(token, one()),
            self.payment_svc.list_payments(token, one()),
            self.withdrawal_svc.list_withdrawals(token, one()),
        );

        Ok(Counts {
            users: users?.total_count,
            addresses: addresses?.total_count,
            products: products?.total_count,
            transactions: transactions?.total_count,
            payments: payments?.total_count,
            withdrawals: withdrawals?.total_count,
        })
    }

    /// The signed in member with their latest deals on both sides
    pub async fn member_summary(&self, token: &str) -> Result<MemberSummary> {
        let recent = |owner| ListQuery::new(1, RECENT_TRANSACTIONS).owned_by(owner);
        let (me, selling, buying) = futures::join!(
            self.auth_svc.current_user(token),
            self.tx_svc.list_transactions(token, recent(Owner::current_user())),
            self.tx_svc.list_transactions(token, recent(Owner::current_customer())),
        );
        let (me, selling, buying) = (me?, selling?, buying?);

        let product_ids = selling.items.iter().chain(&buying.items).map(|tx| &tx.product_id);
        let products = self.names.product_names(token, product_ids).await;
        Ok(MemberSummary { me, selling, buying, products })
    }
}
