//! Meet credentials document: model, loader validation and serialization.
//!
//! # Document Format
//!
//! ```text
//! {
//!   "meets": [
//!     {
//!       "name": "Spring Open",
//!       "admin": { "username": "director", "password": "..." },
//!       "secondaryAdmins": [ { "username": "...", "password": "..." } ],
//!       "users": [ { "username": "left", "password": "..." } ]
//!     }
//!   ],
//!   "superuser": { "username": "root", "password": "..." }
//! }
//! ```
//!
//! Fields not listed above are carried through untouched. Absent lists stay
//! absent when the document is written back.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{CredsError, Result};

/// Placeholder used in error messages for meets without a name.
pub const UNNAMED_MEET: &str = "UNKNOWN";

/// How strictly credential records other than `admin` are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Malformed secondary admins, users and superuser are kept verbatim and
    /// skipped by the normalizer.
    #[default]
    Lenient,
    /// Every credential record must be a mapping with a string password.
    Strict,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lenient => write!(f, "lenient"),
            Policy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(Policy::Lenient),
            "strict" => Ok(Policy::Strict),
            other => Err(format!(
                "unknown policy '{}', expected 'lenient' or 'strict'",
                other
            )),
        }
    }
}

/// Position of a credential record in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SecondaryAdmin,
    User,
    Superuser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::SecondaryAdmin => write!(f, "secondary admin"),
            Role::User => write!(f, "user"),
            Role::Superuser => write!(f, "superuser"),
        }
    }
}

/// Where a credential lives in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPath {
    /// Index of the owning meet, `None` for the superuser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet_index: Option<usize>,
    /// Name of the owning meet, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meet_name: Option<String>,
    pub role: Role,
    /// Index within `secondaryAdmins` or `users`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl CredentialPath {
    fn in_meet(meet_index: usize, meet_name: Option<&str>, role: Role, index: Option<usize>) -> Self {
        Self {
            meet_index: Some(meet_index),
            meet_name: meet_name.map(str::to_string),
            role,
            index,
        }
    }

    fn superuser() -> Self {
        Self {
            meet_index: None,
            meet_name: None,
            role: Role::Superuser,
            index: None,
        }
    }
}

impl fmt::Display for CredentialPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.role == Role::Superuser {
            return write!(f, "superuser");
        }
        let name = self.meet_name.as_deref().unwrap_or(UNNAMED_MEET);
        match (self.role, self.index) {
            (Role::SecondaryAdmin, Some(i)) => write!(f, "meet '{}' secondaryAdmins[{}]", name, i),
            (Role::User, Some(i)) => write!(f, "meet '{}' users[{}]", name, i),
            _ => write!(f, "meet '{}' {}", name, self.role),
        }
    }
}

/// A credential-bearing record: a `password` plus opaque identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(Map<String, Value>);

impl Credential {
    pub fn password(&self) -> Option<&str> {
        self.0.get("password").and_then(Value::as_str)
    }

    pub fn username(&self) -> Option<&str> {
        self.0.get("username").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }
}

impl From<Map<String, Value>> for Credential {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One competition event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Credential>,
    #[serde(
        rename = "secondaryAdmins",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_admins: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Value>>,
    /// Other fields (`date`, ...) passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meet {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_MEET)
    }
}

/// The whole credentials file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetCreds {
    pub meets: Vec<Meet>,
    /// Kept as raw JSON so a malformed record survives a lenient run.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub superuser: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Maps any present value (including `null`) to `Some`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl MeetCreds {
    /// Parses and validates a credentials document.
    pub fn from_json(text: &str, policy: Policy) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| CredsError::malformed("document", format!("invalid JSON: {}", e)))?;
        Self::from_value(root, policy)
    }

    /// Validates an already parsed document.
    pub fn from_value(root: Value, policy: Policy) -> Result<Self> {
        validate(&root, policy)?;
        serde_json::from_value(root).map_err(|e| CredsError::malformed("document", e.to_string()))
    }

    /// Serializes with the given indent width and a trailing newline.
    pub fn to_json_pretty(&self, indent: usize) -> Result<String> {
        let indent = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| CredsError::malformed("document", e.to_string()))?;
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| CredsError::malformed("document", e.to_string()))
    }

    /// Finds a meet by name.
    pub fn meet(&self, name: &str) -> Option<&Meet> {
        self.meets.iter().find(|m| m.name.as_deref() == Some(name))
    }

    /// Finds a credential in a meet by its `username` field.
    ///
    /// Looks at the admin first, then secondary admins, then users.
    pub fn find_login(&self, meet_name: &str, username: &str) -> Option<(Role, &Map<String, Value>)> {
        let (i, meet) = self
            .meets
            .iter()
            .enumerate()
            .find(|(_, m)| m.name.as_deref() == Some(meet_name))?;
        let mut found = None;
        visit_meet(i, meet, |path, record| {
            if found.is_some() {
                return;
            }
            if let Some(map) = record {
                if map.get("username").and_then(Value::as_str) == Some(username) {
                    found = Some((path.role, map));
                }
            }
        });
        found
    }

    /// Visits every credential record in traversal order.
    ///
    /// Records that are not mappings are passed as `None`.
    pub fn visit_credentials<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(CredentialPath, Option<&'a Map<String, Value>>),
    {
        for (i, meet) in self.meets.iter().enumerate() {
            visit_meet(i, meet, &mut f);
        }
        if let Some(superuser) = &self.superuser {
            f(CredentialPath::superuser(), superuser.as_object());
        }
    }

    /// Mutable counterpart of [`MeetCreds::visit_credentials`].
    pub fn visit_credentials_mut<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(CredentialPath, Option<&mut Map<String, Value>>) -> Result<()>,
    {
        for (i, meet) in self.meets.iter_mut().enumerate() {
            let name = meet.name.as_deref();
            if let Some(admin) = meet.admin.as_mut() {
                f(CredentialPath::in_meet(i, name, Role::Admin, None), Some(admin.fields_mut()))?;
            }
            for (j, record) in meet.secondary_admins.iter_mut().flatten().enumerate() {
                let path = CredentialPath::in_meet(i, name, Role::SecondaryAdmin, Some(j));
                f(path, record.as_object_mut())?;
            }
            for (j, record) in meet.users.iter_mut().flatten().enumerate() {
                f(CredentialPath::in_meet(i, name, Role::User, Some(j)), record.as_object_mut())?;
            }
        }
        if let Some(superuser) = self.superuser.as_mut() {
            f(CredentialPath::superuser(), superuser.as_object_mut())?;
        }
        Ok(())
    }
}

fn visit_meet<'a, F>(index: usize, meet: &'a Meet, mut f: F)
where
    F: FnMut(CredentialPath, Option<&'a Map<String, Value>>),
{
    if let Some(admin) = &meet.admin {
        f(CredentialPath::in_meet(index, meet.name.as_deref(), Role::Admin, None), Some(admin.fields()));
    }
    for (j, record) in meet.secondary_admins.iter().flatten().enumerate() {
        let path = CredentialPath::in_meet(index, meet.name.as_deref(), Role::SecondaryAdmin, Some(j));
        f(path, record.as_object());
    }
    for (j, record) in meet.users.iter().flatten().enumerate() {
        f(CredentialPath::in_meet(index, meet.name.as_deref(), Role::User, Some(j)), record.as_object());
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate(root: &Value, policy: Policy) -> Result<()> {
    let root = root
        .as_object()
        .ok_or_else(|| CredsError::malformed("document", "expected a JSON object at the top level"))?;

    let meets = match root.get("meets") {
        Some(Value::Array(meets)) => meets,
        Some(_) => return Err(CredsError::malformed("meets", "expected an array")),
        None => return Err(CredsError::malformed("meets", "missing required field")),
    };

    for (i, meet) in meets.iter().enumerate() {
        validate_meet(i, meet, policy)?;
    }

    if policy == Policy::Strict {
        if let Some(superuser) = root.get("superuser") {
            validate_credential("superuser", superuser)?;
        }
    }

    Ok(())
}

fn validate_meet(index: usize, meet: &Value, policy: Policy) -> Result<()> {
    let meet = meet
        .as_object()
        .ok_or_else(|| CredsError::malformed(format!("meets[{}]", index), "expected a mapping"))?;

    let name = match meet.get("name") {
        None => UNNAMED_MEET,
        Some(Value::String(name)) => name.as_str(),
        Some(_) => {
            return Err(CredsError::malformed(
                format!("meets[{}].name", index),
                "expected a string",
            ))
        }
    };

    if let Some(admin) = meet.get("admin") {
        validate_credential(&format!("meet '{}' admin", name), admin)?;
    }

    for field in ["secondaryAdmins", "users"] {
        let Some(list) = meet.get(field) else {
            continue;
        };
        let records = list.as_array().ok_or_else(|| {
            CredsError::malformed(format!("meet '{}' {}", name, field), "expected an array")
        })?;
        if policy == Policy::Strict {
            for (j, record) in records.iter().enumerate() {
                validate_credential(&format!("meet '{}' {}[{}]", name, field, j), record)?;
            }
        }
    }

    Ok(())
}

fn validate_credential(location: &str, record: &Value) -> Result<()> {
    let record = record
        .as_object()
        .ok_or_else(|| CredsError::malformed(location, "expected a mapping"))?;

    match record.get("password") {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(CredsError::malformed(location, "password must be a string")),
        None => Err(CredsError::malformed(location, "missing password")),
    }
}
