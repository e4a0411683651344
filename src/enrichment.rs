use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use log::warn;

use crate::{models::present, products::DynProductService, users::DynUserService};

pub const UNKNOWN_USER: &str = "Unknown User";
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

///
/// Labels resolved for one page of rows. Ids that could not be
/// resolved read as the fallback label.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Names {
    labels: HashMap<String, String>,
    fallback: &'static str,
}

impl Names {
    pub fn new(fallback: &'static str) -> Self {
        Self { labels: HashMap::new(), fallback }
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    pub fn get(&self, id: &Option<String>) -> String {
        present(id)
            .and_then(|id| self.labels.get(id))
            .cloned()
            .unwrap_or_else(|| self.fallback.to_string())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn distinct<'a>(ids: impl IntoIterator<Item = &'a Option<String>>) -> BTreeSet<String> {
    ids.into_iter().filter_map(present).map(str::to_string).collect()
}

///
/// Puts names on the ids shown in tables. Every distinct id of a page
/// is looked up once, all lookups run concurrently, and a failed lookup
/// only costs that row its name.
///
#[derive(Clone)]
pub struct NameResolver {
    user_svc: DynUserService,
    product_svc: DynProductService,
}

impl NameResolver {
    pub fn new(user_svc: DynUserService, product_svc: DynProductService) -> Self {
        Self { user_svc, product_svc }
    }

    pub async fn user_names<'a>(&self, token: &str, ids: impl IntoIterator<Item = &'a Option<String>>) -> Names {
        let ids = distinct(ids);
        let lookups = ids.iter().map(|id| async move {
            match self.user_svc.user_summary(token, id).await {
                Ok(user) => Some((id.clone(), user.display_name())),
                Err(err) => {
                    warn!("Could not resolve user {}: {}", id, err);
                    None
                }
            }
        });

        let mut names = Names::new(UNKNOWN_USER);
        for (id, name) in join_all(lookups).await.into_iter().flatten() {
            names.insert(id, name);
        }
        names
    }

    pub async fn product_names<'a>(&self, token: &str, ids: impl IntoIterator<Item = &'a Option<String>>) -> Names {
        let ids = distinct(ids);
        let lookups = ids.iter().map(|id| async move {
            match self.product_svc.get_product(token, id).await {
                Ok(product) => Some((id.clone(), product.display_name().to_string())),
                Err(err) => {
                    warn!("Could not resolve product {}: {}", id, err);
                    None
                }
            }
        });

        let mut names = Names::new(UNKNOWN_PRODUCT);
        for (id, name) in join_all(lookups).await.into_iter().flatten() {
            names.insert(id, name);
        }
        names
    }

    pub async fn user_name(&self, token: &str, id: &Option<String>) -> String {
        self.user_names(token, [id]).await.get(id)
    }

    pub async fn product_name(&self, token: &str, id: &Option<String>) -> String {
        self.product_names(token, [id]).await.get(id)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use reqwest::StatusCode;

    use crate::{
        api,
        products::{models::Product, MockProductService},
        users::{error::Error, models::User, MockUserService},
    };

    use super::*;

    fn resolver(users: MockUserService, products: MockProductService) -> NameResolver {
        NameResolver::new(Arc::new(users), Arc::new(products))
    }

    #[tokio::test]
    async fn test_each_distinct_user_is_resolved_once() -> anyhow::Result<()> {
        let mut users = MockUserService::new();
        users.expect_user_summary()
            .withf(|_, id| id.to_string() == "u1")
            .times(1)
            .returning(|_, _| Ok(User {
                user_id: "u1".into(),
                first_name: Some("Ann".into()),
                last_name: Some("Lee".into()),
                ..Default::default()
            }));
        users.expect_user_summary()
            .withf(|_, id| id.to_string() == "u2")
            .times(1)
            .returning(|_, _| Err(Error::ApiError(api::error::Error::StatusCodeFetchError(StatusCode::NOT_FOUND, String::new()))));

        let ids = vec![Some("u1".to_string()), Some("u2".to_string()), Some("u1".to_string()), None, Some(" ".to_string())];
        let names = resolver(users, MockProductService::new()).user_names("tok", &ids).await;

        assert_eq!(1, names.len());
        assert_eq!("Ann Lee", names.get(&ids[0]));
        assert_eq!(UNKNOWN_USER, names.get(&ids[1]));
        assert_eq!(UNKNOWN_USER, names.get(&None));
        Ok(())
    }

    #[tokio::test]
    async fn test_product_fallback() -> anyhow::Result<()> {
        let mut products = MockProductService::new();
        products.expect_get_product()
            .returning(|_, id| match id {
                "p1" => Ok(Product { product_id: "p1".into(), name: Some("Camera".into()), ..Default::default() }),
                _ => Err(crate::products::error::Error::ApiError(api::error::Error::StatusCodeFetchError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::new(),
                ))),
            });

        let resolver = resolver(MockUserService::new(), products);
        assert_eq!("Camera", resolver.product_name("tok", &Some("p1".into())).await);
        assert_eq!(UNKNOWN_PRODUCT, resolver.product_name("tok", &Some("p9".into())).await);
        Ok(())
    }
}
