use serde::Serialize;
use serde_json::Value;

use crate::{api::query::PaginationInfo, validations::FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Guest,
    Admin,
    Member,
}

impl Area {
    pub fn root(self) -> &'static str {
        match self {
            Area::Guest => "/auth/signin",
            Area::Admin => "/admin",
            Area::Member => "/member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self { label: label.into(), href: href.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub href: String,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub area: Area,
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<TableRow>,
    pub pagination: PaginationInfo,
    pub base_path: String,
    pub actions: Vec<Link>,
    pub notice: Option<String>,
}

impl TablePage {
    pub fn new(
        area: Area,
        title: impl Into<String>,
        base_path: impl Into<String>,
        columns: Vec<&'static str>,
        rows: Vec<TableRow>,
        pagination: PaginationInfo,
    ) -> Self {
        Self {
            area,
            title: title.into(),
            columns,
            rows,
            pagination,
            base_path: base_path.into(),
            actions: vec![],
            notice: None,
        }
    }

    pub fn action(mut self, label: &str, href: impl Into<String>) -> Self {
        self.actions.push(Link::new(label, href));
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: String,
    pub rows: Vec<DetailRow>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self { heading: heading.into(), rows: vec![] }
    }

    pub fn row(mut self, label: &str, value: impl Into<String>) -> Self {
        self.rows.push(DetailRow { label: label.to_string(), value: value.into(), href: None });
        self
    }

    pub fn link(mut self, label: &str, value: impl Into<String>, href: impl Into<String>) -> Self {
        self.rows.push(DetailRow {
            label: label.to_string(),
            value: value.into(),
            href: Some(href.into()),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Done,
    Current,
    Todo,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub number: u8,
    pub label: &'static str,
    pub state: StageState,
}

///
/// Progress bar of a transaction. A terminal transaction renders every
/// stage as not reached and names its outcome instead.
///
#[derive(Debug, Clone, Serialize)]
pub struct Stepper {
    pub stages: Vec<Stage>,
    pub terminal: Option<&'static str>,
}

/// A button that posts a small form, optionally with inputs
#[derive(Debug, Clone, Serialize)]
pub struct ActionForm {
    pub label: String,
    pub action: String,
    pub fields: Vec<FormField>,
    pub multipart: bool,
    pub danger: bool,
}

impl ActionForm {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            fields: vec![],
            multipart: false,
            danger: false,
        }
    }

    pub fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    pub fn fields(mut self, fields: Vec<FormField>) -> Self {
        self.multipart = fields.iter().any(|f| f.kind == FieldKind::File);
        self.fields = fields;
        self
    }

    pub fn options(mut self, name: &str, options: Vec<(String, String)>) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.set_options(options);
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailPage {
    pub area: Area,
    pub title: String,
    pub sections: Vec<Section>,
    pub media: Vec<Media>,
    pub links: Vec<Link>,
    pub forms: Vec<ActionForm>,
    pub stepper: Option<Stepper>,
    pub notice: Option<String>,
    pub banner: Option<String>,
}

impl DetailPage {
    pub fn new(area: Area, title: impl Into<String>) -> Self {
        Self {
            area,
            title: title.into(),
            sections: vec![],
            media: vec![],
            links: vec![],
            forms: vec![],
            stepper: None,
            notice: None,
            banner: None,
        }
    }

    pub fn section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn link(mut self, label: &str, href: impl Into<String>) -> Self {
        self.links.push(Link::new(label, href));
        self
    }

    pub fn form(mut self, form: ActionForm) -> Self {
        self.forms.push(form);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Textarea,
    Select,
    File,
    Hidden,
}

pub type Options = fn() -> Vec<(String, String)>;

/// Static description of one form input
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub options: Option<Options>,
    pub multiple: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true, options: None, multiple: false }
    }

    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub const fn select(name: &'static str, label: &'static str, options: Options) -> Self {
        Self { name, label, kind: FieldKind::Select, required: true, options: Some(options), multiple: false }
    }

    pub const fn optional(self) -> Self {
        Self { required: false, ..self }
    }

    pub const fn multiple(self) -> Self {
        Self { multiple: true, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub error: Option<String>,
    pub required: bool,
    pub multiple: bool,
    pub options: Vec<SelectOption>,
}

impl FormField {
    fn set_options(&mut self, options: Vec<(String, String)>) {
        self.options = options
            .into_iter()
            .map(|(value, label)| SelectOption { selected: value == self.value, value, label })
            .collect();
    }
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

///
/// Builds the inputs of a form from its specs, echoing back what was
/// submitted (passwords excepted) together with each field's message.
///
pub fn form_fields<T: Serialize>(specs: &[FieldSpec], values: &T, errors: &FieldErrors) -> Vec<FormField> {
    let values = serde_json::to_value(values).unwrap_or(Value::Null);
    specs
        .iter()
        .map(|spec| {
            let value = match spec.kind {
                FieldKind::Password | FieldKind::File => String::new(),
                _ => value_text(values.get(spec.name)),
            };
            let mut field = FormField {
                name: spec.name,
                label: spec.label,
                kind: spec.kind,
                value,
                error: errors.get(spec.name).map(str::to_string),
                required: spec.required,
                multiple: spec.multiple,
                options: vec![],
            };
            if let Some(options) = spec.options {
                field.set_options(options());
            }
            field
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FormPage {
    pub area: Area,
    pub title: String,
    pub action: String,
    pub multipart: bool,
    pub fields: Vec<FormField>,
    pub submit_label: String,
    pub cancel_href: Option<String>,
    pub banner: Option<String>,
    pub notes: Vec<DetailRow>,
}

impl FormPage {
    pub fn new(area: Area, title: impl Into<String>, action: impl Into<String>, fields: Vec<FormField>) -> Self {
        let multipart = fields.iter().any(|f| f.kind == FieldKind::File);
        Self {
            area,
            title: title.into(),
            action: action.into(),
            multipart,
            fields,
            submit_label: "Save".to_string(),
            cancel_href: None,
            banner: None,
            notes: vec![],
        }
    }

    pub fn submit(mut self, label: &str) -> Self {
        self.submit_label = label.to_string();
        self
    }

    pub fn cancel(mut self, href: impl Into<String>) -> Self {
        self.cancel_href = Some(href.into());
        self
    }

    pub fn banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    pub fn note(mut self, label: &str, value: impl Into<String>) -> Self {
        self.notes.push(DetailRow { label: label.to_string(), value: value.into(), href: None });
        self
    }

    /// Replaces the choices of a select input
    pub fn options(mut self, name: &str, options: Vec<(String, String)>) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.set_options(options);
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
