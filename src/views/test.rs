use axum::{body::to_bytes, http::StatusCode, response::Response};
use chrono::{Duration, TimeZone, Utc};
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::Serialize;
use tera::escape_html;

use crate::{
    api::query::PaginationInfo,
    validations::{FieldErrors, Rejection},
};

use super::{format, models::*, Views};

lazy_static! {
    static ref VIEWS: Views =
        Views::load(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html")).unwrap();
}

async fn body_text(res: Response) -> anyhow::Result<String> {
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[derive(Serialize)]
struct Probe {
    name: String,
    password: String,
    status: String,
}

const PROBE_FIELDS: &[FieldSpec] = &[
    FieldSpec::text("name", "Name"),
    FieldSpec::new("password", "Password", FieldKind::Password),
    FieldSpec::select("status", "Status", crate::models::ActiveStatus::options),
];

fn probe() -> Probe {
    Probe { name: "Home <1>".into(), password: "secret1".into(), status: "2".into() }
}

#[test]
fn test_money_groups_thousands() {
    assert_eq!("1,234.50", format::money(Decimal::new(12345, 1)));
    assert_eq!("0.05", format::money(Decimal::new(5, 2)));
    assert_eq!("-1,000,000.00", format::money(Decimal::from(-1_000_000)));
    assert_eq!("-", format::money_opt(None));
}

#[test]
fn test_time_ago() {
    let now = Utc.with_ymd_and_hms(2024, 11, 10, 12, 0, 0).unwrap();
    assert_eq!("just now", format::time_ago(now - Duration::seconds(30), now));
    assert_eq!("1 minute ago", format::time_ago(now - Duration::seconds(90), now));
    assert_eq!("2 hours ago", format::time_ago(now - Duration::hours(2), now));
    assert_eq!("3 days ago", format::time_ago(now - Duration::days(3), now));
    assert_eq!(
        "10 November 2024 | 10:00 (2 hours ago)",
        format::datetime(now - Duration::hours(2), now)
    );
}

#[test]
fn test_form_fields_echo_values_but_not_passwords() {
    let errors = FieldErrors::single("name", "Name is required");
    let fields = form_fields(PROBE_FIELDS, &probe(), &errors);

    assert_eq!("Home <1>", fields[0].value);
    assert_eq!(Some("Name is required".to_string()), fields[0].error);
    assert_eq!("", fields[1].value);

    let selected: Vec<_> = fields[2].options.iter().filter(|o| o.selected).collect();
    assert_eq!(1, selected.len());
    assert_eq!("Inactive", selected[0].label);
}

#[tokio::test]
async fn test_table_renders_rows_and_pager() -> anyhow::Result<()> {
    let rows = vec![TableRow { href: "/admin/users/u1".into(), cells: vec!["alice".into()] }];
    let page = TablePage::new(
        Area::Admin,
        "Users",
        "/admin/users",
        vec!["Username"],
        rows,
        PaginationInfo::new(2, 25, 10),
    )
    .action("Create user", "/admin/users/create");

    let html = body_text(VIEWS.table(&page)?).await?;
    assert!(html.contains("<td>alice</td>"));
    assert!(html.contains(&format!("{}?page=1", escape_html("/admin/users"))));
    assert!(html.contains(&format!("{}?page=3", escape_html("/admin/users"))));
    assert!(html.contains("Page 2 of 3"));
    assert!(html.contains(&escape_html("/admin/users/create")));
    Ok(())
}

#[tokio::test]
async fn test_empty_table_says_so() -> anyhow::Result<()> {
    let page = TablePage::new(Area::Member, "Products", "/member/products", vec!["Name"], vec![], PaginationInfo::new(1, 0, 10));
    let html = body_text(VIEWS.table(&page)?).await?;
    assert!(html.contains("No records found"));
    assert!(!html.contains("?page="));
    Ok(())
}

#[tokio::test]
async fn test_rejected_form_is_unprocessable_and_escaped() -> anyhow::Result<()> {
    let rejection = Rejection::Invalid(FieldErrors::single("name", "Name is required"));
    let res = VIEWS.reject_form(rejection, |errors| {
        FormPage::new(Area::Member, "Address", "/member/addresses/create", form_fields(PROBE_FIELDS, &probe(), errors))
    })?;

    assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, res.status());
    let html = body_text(res).await?;
    assert!(html.contains("Name is required"));
    assert!(html.contains("Home &lt;1&gt;"));
    assert!(!html.contains("secret1"));
    Ok(())
}

#[tokio::test]
async fn test_failed_form_shows_banner() -> anyhow::Result<()> {
    let rejection = Rejection::Failed("Something went wrong! Please try again.".into());
    let res = VIEWS.reject_form(rejection, |errors| {
        FormPage::new(Area::Admin, "Address", "/admin/addresses/create", form_fields(PROBE_FIELDS, &probe(), errors))
    })?;

    let html = body_text(res).await?;
    assert!(html.contains(r#"<div class="banner">Something went wrong! Please try again.</div>"#));
    Ok(())
}

#[test]
fn test_unauthorized_rejection_goes_to_signin() -> anyhow::Result<()> {
    let res = VIEWS.reject_form(Rejection::Unauthorized, |errors| {
        FormPage::new(Area::Admin, "x", "/x", form_fields(PROBE_FIELDS, &probe(), errors))
    })?;
    assert_eq!(StatusCode::SEE_OTHER, res.status());
    assert_eq!(Some("/auth/signin"), res.headers().get("location").and_then(|v| v.to_str().ok()));
    Ok(())
}

#[tokio::test]
async fn test_detail_renders_stepper_and_actions() -> anyhow::Result<()> {
    let mut page = DetailPage::new(Area::Member, "Transaction #t1")
        .section(Section::new("Summary").row("Fee", "12.00").link("Product", "Camera", "/member/products/p1"))
        .form(ActionForm::new("Reject", "/member/transactions/t1/reject").danger());
    page.stepper = Some(Stepper {
        stages: vec![
            Stage { number: 1, label: "Offered", state: StageState::Done },
            Stage { number: 2, label: "Waiting for payment", state: StageState::Current },
        ],
        terminal: None,
    });

    let html = body_text(VIEWS.detail(&page)?).await?;
    assert!(html.contains(r#"<li class="current">2. Waiting for payment</li>"#));
    assert!(html.contains(&format!(r#"<a href="{}">Camera</a>"#, escape_html("/member/products/p1"))));
    assert!(html.contains(&format!(r#"action="{}""#, escape_html("/member/transactions/t1/reject"))));
    assert!(html.contains(r#"class="danger""#));
    Ok(())
}

#[tokio::test]
async fn test_error_page_keeps_status() -> anyhow::Result<()> {
    let res = VIEWS.error(Some(Area::Admin), StatusCode::NOT_FOUND, "Nothing here");
    assert_eq!(StatusCode::NOT_FOUND, res.status());
    assert!(body_text(res).await?.contains("Nothing here"));
    Ok(())
}
