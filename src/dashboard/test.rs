use std::sync::Arc;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use reqwest::StatusCode;
use rust_decimal::Decimal;

use crate::{
    addresses::MockAddressService,
    api::{self, query::{Owner, Page}},
    auth::MockAuthService,
    enrichment::NameResolver,
    payments::MockPaymentService,
    products::{models::Product, MockProductService},
    transactions::{
        models::{Transaction, TransactionStatus},
        MockTransactionService,
    },
    users::{models::User, MockUserService},
    withdrawals::{error::Error as WithdrawalError, MockWithdrawalService},
};

use super::{error::Error, models::*, Dashboard};

lazy_static! {
    // 2025-03-01 09:30:00
    static ref NOW: DateTime<Utc> = DateTime::<Utc>::from_timestamp(1740821400, 0).unwrap();
}

fn page<T>(total_count: u64, items: Vec<T>) -> Page<T> {
    Page { total_count, items }
}

struct Mocks {
    user: MockUserService,
    address: MockAddressService,
    product: MockProductService,
    tx: MockTransactionService,
    payment: MockPaymentService,
    withdrawal: MockWithdrawalService,
    auth: MockAuthService,
}

impl Mocks {
    fn new() -> Self {
        Self {
            user: MockUserService::new(),
            address: MockAddressService::new(),
            product: MockProductService::new(),
            tx: MockTransactionService::new(),
            payment: MockPaymentService::new(),
            withdrawal: MockWithdrawalService::new(),
            auth: MockAuthService::new(),
        }
    }

    fn dashboard(self) -> Dashboard {
        let user_svc: crate::users::DynUserService = Arc::new(self.user);
        let product_svc: crate::products::DynProductService = Arc::new(self.product);
        Dashboard {
            names: NameResolver::new(user_svc.clone(), product_svc.clone()),
            user_svc,
            address_svc: Arc::new(self.address),
            product_svc,
            tx_svc: Arc::new(self.tx),
            payment_svc: Arc::new(self.payment),
            withdrawal_svc: Arc::new(self.withdrawal),
            auth_svc: Arc::new(self.auth),
        }
    }
}

#[tokio::test]
async fn test_counts_read_each_list_total() -> anyhow::Result<()> {
    let mut mocks = Mocks::new();
    mocks.user.expect_list_users()
        .withf(|_, query| query.page == 1 && query.record_per_page == 1 && query.owner.is_none())
        .times(1)
        .returning(|_, _| Ok(page(12, vec![User::default()])));
    mocks.address.expect_list_addresses().returning(|_, _| Ok(page(0, vec![])));
    mocks.product.expect_list_products().returning(|_, _| Ok(page(7, vec![])));
    mocks.tx.expect_list_transactions().returning(|_, _| Ok(page(30, vec![])));
    mocks.payment.expect_list_payments().returning(|_, _| Ok(page(9, vec![])));
    mocks.withdrawal.expect_list_withdrawals().returning(|_, _| Ok(page(2, vec![])));

    let counts = mocks.dashboard().counts("tok").await?;
    assert_eq!(
        Counts { users: 12, addresses: 0, products: 7, transactions: 30, payments: 9, withdrawals: 2 },
        counts
    );

    let page = admin_page(&counts);
    let users = &page.sections[0].rows[0];
    assert_eq!(("Users", "12"), (users.label.as_str(), users.value.as_str()));
    assert_eq!(Some("/admin/users"), users.href.as_deref());
    Ok(())
}

#[tokio::test]
async fn test_failed_list_fails_the_page() -> anyhow::Result<()> {
    let mut mocks = Mocks::new();
    mocks.user.expect_list_users().returning(|_, _| Ok(page(1, vec![])));
    mocks.address.expect_list_addresses().returning(|_, _| Ok(page(1, vec![])));
    mocks.product.expect_list_products().returning(|_, _| Ok(page(1, vec![])));
    mocks.tx.expect_list_transactions().returning(|_, _| Ok(page(1, vec![])));
    mocks.payment.expect_list_payments().returning(|_, _| Ok(page(1, vec![])));
    mocks.withdrawal.expect_list_withdrawals().returning(|_, _| {
        Err(WithdrawalError::ApiError(api::error::Error::StatusCodeFetchError(
            StatusCode::BAD_GATEWAY,
            String::new(),
        )))
    });

    let res = mocks.dashboard().counts("tok").await;
    assert!(matches!(res, Err(Error::WithdrawalError(_))));
    Ok(())
}

#[tokio::test]
async fn test_member_summary_splits_both_sides() -> anyhow::Result<()> {
    let mut mocks = Mocks::new();
    mocks.auth.expect_current_user().returning(|_| Ok(User {
        user_id: "u1".into(),
        username: Some("somchai".into()),
        balance: Some(Decimal::new(125050, 2)),
        ..Default::default()
    }));
    mocks.tx.expect_list_transactions()
        .withf(|_, query| query.owner == Some(Owner::current_user()) && query.record_per_page == RECENT_TRANSACTIONS)
        .times(1)
        .returning(|_, _| Ok(page(8, vec![Transaction {
            transaction_id: "t1".into(),
            product_id: Some("p1".into()),
            status: Some(TransactionStatus::Pending),
            ..Default::default()
        }])));
    mocks.tx.expect_list_transactions()
        .withf(|_, query| query.owner == Some(Owner::current_customer()))
        .times(1)
        .returning(|_, _| Ok(page(0, vec![])));
    mocks.product.expect_get_product()
        .withf(|_, id| id.to_string() == "p1")
        .times(1)
        .returning(|_, _| Ok(Product { product_id: "p1".into(), name: Some("Camera".into()), ..Default::default() }));

    let summary = mocks.dashboard().member_summary("tok").await?;
    let page = member_page(&summary, *NOW);

    let balance = page.sections[0].rows.iter().find(|r| r.label == "Balance").map(|r| r.value.clone());
    assert_eq!(Some("1,250.50".to_string()), balance);

    let selling = &page.sections[1];
    assert_eq!("Selling (8)", selling.heading);
    assert_eq!("Camera", selling.rows[0].label);
    assert!(selling.rows[0].value.starts_with("Offered"));
    assert_eq!(Some("/member/transactions/sell/t1"), selling.rows[0].href.as_deref());

    assert_eq!("Buying (0)", page.sections[2].heading);
    assert_eq!(None, page.sections[2].rows[0].href);
    Ok(())
}
