mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{ParseError, Pos, ProfileError};
use crate::golang::{self, Evaluator, Expr, ExprKind, SourceFile};

pub use validate::validate;

/// A switch hardware profile as consumed by the front-end.
///
/// Keys keep the Go field names. `Name` is lifted out of `ObjectMeta` and
/// the `Spec` fields sit next to it at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchProfile {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(flatten)]
    pub spec: SwitchProfileSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfileSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub other_names: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub switch_silicon: String,
    #[serde(default)]
    pub features: SwitchProfileFeatures,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default)]
    pub config: SwitchProfileConfig,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, SwitchProfilePort>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub port_groups: BTreeMap<String, SwitchProfilePortGroup>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub port_profiles: BTreeMap<String, SwitchProfilePortProfile>,
    /// Spec fields without a typed counterpart, emitted as written.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchProfileFeatures {
    #[serde(rename = "Subinterfaces", default, skip_serializing_if = "is_false")]
    pub subinterfaces: bool,
    #[serde(rename = "VXLAN", default, skip_serializing_if = "is_false")]
    pub vxlan: bool,
    #[serde(rename = "ACLs", default, skip_serializing_if = "is_false")]
    pub acls: bool,
    /// Newer feature flags (L2VNI, L3VNI, RoCE, MCLAG, ESLAG, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchProfileConfig {
    #[serde(rename = "MaxPathsEBGP", default, skip_serializing_if = "is_zero")]
    pub max_paths_ebgp: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePort {
    #[serde(rename = "NOSName", default, skip_serializing_if = "String::is_empty")]
    pub nos_name: String,
    #[serde(rename = "BaseNOSName", default, skip_serializing_if = "String::is_empty")]
    pub base_nos_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub management: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub onie_port_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePortGroup {
    #[serde(rename = "NOSName", default, skip_serializing_if = "String::is_empty")]
    pub nos_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub profile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePortProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<SwitchProfilePortProfileSpeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakout: Option<SwitchProfilePortProfileBreakout>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_neg_allowed: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_neg_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePortProfileSpeed {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub supported: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePortProfileBreakout {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub supported: BTreeMap<String, SwitchProfilePortProfileBreakoutMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchProfilePortProfileBreakoutMode {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub offsets: Vec<String>,
}

/// Shape of the Go literal before `Name` is lifted out of `ObjectMeta`.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProfileLiteral {
    #[serde(default)]
    object_meta: ObjectMeta,
    #[serde(default)]
    spec: SwitchProfileSpec,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ObjectMeta {
    #[serde(default)]
    name: String,
}

impl SwitchProfile {
    /// Parses Go source, decodes the profile literal and validates it.
    pub fn from_go_source(source: &str) -> Result<Self, ProfileError> {
        let file = golang::parse_file(source)?;
        let value = profile_value(&file)?;
        let profile = Self::from_value(value)?;
        let problems = validate(&profile);
        if !problems.is_empty() {
            return Err(ProfileError::Invalid(problems));
        }
        Ok(profile)
    }

    /// Decodes an evaluated `wiringapi.SwitchProfile` literal.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let literal: ProfileLiteral = serde_json::from_value(value)?;
        Ok(Self {
            name: literal.object_meta.name,
            spec: literal.spec,
        })
    }

    /// Two-space indented JSON without a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Evaluates the first `var` holding a composite literal with `ObjectMeta`
/// and `Spec` fields.
pub fn profile_value(file: &SourceFile) -> Result<Value, ParseError> {
    let decl = file
        .decls
        .iter()
        .filter(|d| d.kind == golang::DeclKind::Var)
        .find(|d| d.value.as_ref().is_some_and(is_profile_literal))
        .ok_or_else(|| {
            ParseError::new(
                Pos { line: 1, column: 1 },
                "no switch profile declaration (a var with ObjectMeta and Spec) found",
            )
        })?;

    tracing::debug!(var = %decl.name, "found switch profile declaration");
    match &decl.value {
        Some(expr) => Evaluator::new(file).evaluate(expr),
        None => Err(ParseError::new(decl.pos, "profile declaration has no value")),
    }
}

fn is_profile_literal(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::AddrOf(inner) => is_profile_literal(inner),
        ExprKind::Composite { elements, .. } => {
            let has = |field: &str| {
                elements.iter().any(|e| {
                    matches!(&e.key, Some(Expr { kind: ExprKind::Ident(name), .. }) if name == field)
                })
            };
            has("ObjectMeta") && has("Spec")
        }
        _ => false,
    }
}

/// Go `nil` slices and maps decode to empty collections.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}
