pub mod error;
pub mod format;
pub mod models;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use log::error;
use serde::Serialize;
use tera::{Context, Tera};

use crate::{
    response::{error_page, signin_redirect},
    validations::{FieldErrors, Rejection},
};

use error::Result;
use models::*;

#[cfg(test)]
mod test;

/// Renders dashboard pages from the `tera` templates
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    pub fn load(glob: &str) -> Result<Self> {
        Ok(Self { tera: Arc::new(Tera::new(glob)?) })
    }

    pub fn render<T: Serialize>(&self, template: &str, page: &T) -> Result<Html<String>> {
        let ctx = Context::from_serialize(page)?;
        Ok(Html(self.tera.render(template, &ctx)?))
    }

    pub fn table(&self, page: &TablePage) -> Result<Response> {
        Ok(self.render("table.html", page)?.into_response())
    }

    pub fn detail(&self, page: &DetailPage) -> Result<Response> {
        Ok(self.render("detail.html", page)?.into_response())
    }

    pub fn form(&self, page: &FormPage) -> Result<Response> {
        Ok(self.render("form.html", page)?.into_response())
    }

    ///
    /// Shows a refused submission: the form again with its field
    /// messages or banner, or the sign in page when the session expired.
    ///
    pub fn reject_form<F>(&self, rejection: Rejection, page: F) -> Result<Response>
    where
        F: FnOnce(&FieldErrors) -> FormPage,
    {
        if let Rejection::Unauthorized = rejection {
            return Ok(signin_redirect());
        }
        let page = page(&rejection.field_errors()).banner(rejection.banner());
        Ok((StatusCode::UNPROCESSABLE_ENTITY, self.render("form.html", &page)?).into_response())
    }

    pub fn error(&self, area: Option<Area>, status: StatusCode, message: &str) -> Response {
        #[derive(Serialize)]
        struct ErrorPage<'a> {
            area: Option<Area>,
            title: String,
            message: &'a str,
        }

        let page = ErrorPage { area, title: status.as_u16().to_string(), message };
        match self.render("error.html", &page) {
            Ok(html) => (status, html).into_response(),
            Err(err) => {
                error!("{}", err);
                error_page(status, message)
            }
        }
    }
}
