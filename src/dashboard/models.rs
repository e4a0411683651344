use chrono::{DateTime, Utc};

use crate::{
    api::query::Page,
    enrichment::Names,
    transactions::{actions::Role, models::Transaction, step::Progress},
    users::models::User,
    views::{
        format,
        models::{Area, DetailPage, Section},
    },
};

/// Transactions listed on the member landing page, per side
pub const RECENT_TRANSACTIONS: u64 = 5;

/// Record totals shown on the admin landing page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub users: u64,
    pub addresses: u64,
    pub products: u64,
    pub transactions: u64,
    pub payments: u64,
    pub withdrawals: u64,
}

pub fn admin_page(counts: &Counts) -> DetailPage {
    let totals = [
        ("Users", counts.users, "/admin/users"),
        ("Addresses", counts.addresses, "/admin/addresses"),
        ("Products", counts.products, "/admin/products"),
        ("Transactions", counts.transactions, "/admin/transactions"),
        ("Payments", counts.payments, "/admin/payments"),
        ("Withdrawals", counts.withdrawals, "/admin/withdrawals"),
    ]
    .into_iter()
    .fold(Section::new("Records"), |section, (label, total, href)| section.link(label, total.to_string(), href));

    DetailPage::new(Area::Admin, "Dashboard")
        .section(totals)
        .link("Create transaction", "/admin/transactions/create")
        .link("Create user", "/admin/users/create")
}

/// What a member sees after signing in
#[derive(Debug, Clone)]
pub struct MemberSummary {
    pub me: User,
    pub selling: Page<Transaction>,
    pub buying: Page<Transaction>,
    pub products: Names,
}

fn recent(role: Role, heading: &str, page: &Page<Transaction>, products: &Names, now: DateTime<Utc>) -> Section {
    let section = Section::new(format!("{heading} ({})", page.total_count));
    if page.items.is_empty() {
        return section.row("Nothing yet", format::EMPTY);
    }
    page.items.iter().fold(section, |section, tx| {
        let progress = Progress::of(tx);
        let value = format!("{}, {}", progress.label(), format::datetime_opt(tx.created_at, now));
        section.link(&products.get(&tx.product_id), value, format!("{}/{}", role.area_path(), tx.transaction_id))
    })
}

pub fn member_page(summary: &MemberSummary, now: DateTime<Utc>) -> DetailPage {
    let me = &summary.me;
    let account = Section::new("Account")
        .row("Name", me.display_name())
        .row("Username", me.username())
        .row("Email", format::text(&me.email))
        .row("Balance", format::money(me.balance()));

    DetailPage::new(Area::Member, "Dashboard")
        .section(account)
        .section(recent(Role::Seller, "Selling", &summary.selling, &summary.products, now))
        .section(recent(Role::Buyer, "Buying", &summary.buying, &summary.products, now))
        .link("Create transaction", "/member/transactions/create")
        .link("Request withdrawal", "/member/withdrawals/create")
}
