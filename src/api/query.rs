use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const CURRENT: &str = "current";
pub const DEFAULT_RECORDS_PER_PAGE: u64 = 10;

///
/// Restricts a list to the records one user owns. The API resolves
/// the literal `current` to the holder of the session token.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    User(String),
    Customer(String),
}

impl Owner {
    pub fn current_user() -> Self {
        Owner::User(CURRENT.to_string())
    }

    pub fn current_customer() -> Self {
        Owner::Customer(CURRENT.to_string())
    }

    pub fn pair(&self) -> (String, String) {
        match self {
            Owner::User(id) => ("user_id".to_string(), id.clone()),
            Owner::Customer(id) => ("customer_id".to_string(), id.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u64,
    pub record_per_page: u64,
    pub owner: Option<Owner>,
}

impl ListQuery {
    pub fn new(page: u64, record_per_page: u64) -> Self {
        Self {
            page: page.max(1),
            record_per_page: record_per_page.max(1),
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn start_index(&self) -> u64 {
        (self.page - 1).saturating_mul(self.record_per_page)
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("recordPerPage".to_string(), self.record_per_page.to_string()),
            ("startIndex".to_string(), self.start_index().to_string()),
        ];
        if let Some(owner) = &self.owner {
            query.push(owner.pair());
        }
        query
    }
}

///
/// One page of a list endpoint. The API answers with
/// `{ total_count, <entity>_items }` and omits both when nothing matches.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self { total_count: 0, items: vec![] }
    }
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_envelope(mut value: Value, items_key: &str) -> serde_json::Result<Self> {
        let total_count = value.get("total_count").and_then(Value::as_u64).unwrap_or(0);
        let items = match value.get_mut(items_key).map(Value::take) {
            None | Some(Value::Null) => vec![],
            Some(items) => serde_json::from_value(items)?,
        };
        Ok(Self { total_count, items })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl PaginationInfo {
    pub fn new(current_page: u64, total_items: u64, items_per_page: u64) -> Self {
        let items_per_page = items_per_page.max(1);
        let total_pages = total_items.div_ceil(items_per_page).max(1);
        let current_page = current_page.max(1);

        Self {
            current_page,
            total_pages,
            total_items,
            items_per_page,
            prev_page: (current_page > 1).then(|| current_page - 1),
            next_page: (current_page < total_pages).then(|| current_page + 1),
        }
    }

    pub fn of<T>(query: &ListQuery, page: &Page<T>) -> Self {
        Self::new(query.page, page.total_count, query.record_per_page)
    }
}

/// `?page=` as sent by the pager links
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub page: Option<u64>,
}

impl PageParams {
    pub fn list_query(&self, record_per_page: u64) -> ListQuery {
        ListQuery::new(self.page.unwrap_or(1), record_per_page)
    }
}

fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}
