//! Identity provider event parsing.
//!
//! Parsing happens in two stages. `WebhookEnvelope::parse` is strict: the body
//! must be a JSON object with a string `type`, otherwise the delivery is
//! rejected. The per-kind payload parsers are lenient: every field read yields
//! `None` when the field is absent, empty, or of the wrong shape, and a
//! non-object `data` simply produces an all-`None` payload.

use serde_json::{Map, Value};

use super::WebhookError;
use crate::domain::foundation::{ExternalOrgId, ExternalUserId};
use crate::domain::organization::{MemberRole, OrganizationProfile};
use crate::domain::user::UserProfile;

/// Top-level shape of every delivery: `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEnvelope {
    pub event_type: String,
    pub data: Value,
}

impl WebhookEnvelope {
    /// Parses a verified body.
    ///
    /// # Errors
    ///
    /// - `InvalidJson` if the body is not a JSON object
    /// - `MissingEventType` if `type` is absent or not a string
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let mut object: Map<String, Value> =
            serde_json::from_slice(body).map_err(|e| WebhookError::InvalidJson(e.to_string()))?;

        let event_type = match object.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => return Err(WebhookError::MissingEventType),
        };

        Ok(Self {
            event_type,
            data: object.remove("data").unwrap_or(Value::Null),
        })
    }
}

/// A delivery, classified by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// `user.created` or `user.updated`
    UserUpserted(UserPayload),
    /// `organization.created` or `organization.updated`
    OrganizationUpserted(OrganizationPayload),
    /// `organizationMembership.created`
    MembershipCreated(MembershipPayload),
    /// `organizationMembership.deleted`
    MembershipDeleted(MembershipPayload),
    /// Any other type. Accepted and ignored.
    Unknown(String),
}

impl IdentityEvent {
    pub fn from_envelope(envelope: &WebhookEnvelope) -> Self {
        let data = &envelope.data;
        match envelope.event_type.as_str() {
            "user.created" | "user.updated" => Self::UserUpserted(UserPayload::parse(data)),
            "organization.created" | "organization.updated" => {
                Self::OrganizationUpserted(OrganizationPayload::parse(data))
            }
            "organizationMembership.created" => {
                Self::MembershipCreated(MembershipPayload::parse(data))
            }
            "organizationMembership.deleted" => {
                Self::MembershipDeleted(MembershipPayload::parse(data))
            }
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Short name of the kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserUpserted(_) => "user_upserted",
            Self::OrganizationUpserted(_) => "organization_upserted",
            Self::MembershipCreated(_) => "membership_created",
            Self::MembershipDeleted(_) => "membership_deleted",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Fields of a `user.*` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPayload {
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl UserPayload {
    /// The primary email is the first entry of `email_addresses`.
    pub fn parse(data: &Value) -> Self {
        Self {
            external_id: string_at(data, &["id"]),
            email: data
                .get("email_addresses")
                .and_then(Value::as_array)
                .and_then(|addresses| addresses.first())
                .and_then(|first| string_at(first, &["email_address"])),
            first_name: string_at(data, &["first_name"]),
            last_name: string_at(data, &["last_name"]),
            image_url: string_at(data, &["image_url"]),
        }
    }

    /// Returns the upsert input, or `None` when id or email is missing.
    pub fn profile(&self) -> Option<UserProfile> {
        let external_id = ExternalUserId::new(self.external_id.clone()?).ok()?;
        let email = self.email.clone()?;
        Some(
            UserProfile::new(external_id, email)
                .with_name(
                    self.first_name.clone().unwrap_or_default(),
                    self.last_name.clone().unwrap_or_default(),
                )
                .with_avatar_url(self.image_url.clone().unwrap_or_default()),
        )
    }
}

/// Fields of an `organization.*` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationPayload {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
    pub created_by: Option<String>,
}

impl OrganizationPayload {
    pub fn parse(data: &Value) -> Self {
        Self {
            external_id: string_at(data, &["id"]),
            name: string_at(data, &["name"]),
            slug: string_at(data, &["slug"]),
            image_url: string_at(data, &["image_url"]),
            created_by: string_at(data, &["created_by"]),
        }
    }

    /// Returns the upsert input, or `None` when id, name, or slug is missing.
    pub fn profile(&self) -> Option<OrganizationProfile> {
        let external_id = ExternalOrgId::new(self.external_id.clone()?).ok()?;
        Some(
            OrganizationProfile::new(external_id, self.name.clone()?, self.slug.clone()?)
                .with_logo_url(self.image_url.clone().unwrap_or_default()),
        )
    }

    pub fn creator(&self) -> Option<ExternalUserId> {
        self.created_by
            .clone()
            .and_then(|id| ExternalUserId::new(id).ok())
    }
}

/// Fields of an `organizationMembership.*` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipPayload {
    /// The provider's membership id.
    pub external_id: Option<String>,
    pub org_external_id: Option<String>,
    pub user_external_id: Option<String>,
    pub role: Option<String>,
}

impl MembershipPayload {
    pub fn parse(data: &Value) -> Self {
        Self {
            external_id: string_at(data, &["id"]),
            org_external_id: string_at(data, &["organization", "id"]),
            user_external_id: string_at(data, &["public_user_data", "user_id"]),
            role: string_at(data, &["role"]),
        }
    }

    /// Returns both sides of the link, or `None` if either is missing.
    pub fn parties(&self) -> Option<(ExternalOrgId, ExternalUserId)> {
        let org = ExternalOrgId::new(self.org_external_id.clone()?).ok()?;
        let user = ExternalUserId::new(self.user_external_id.clone()?).ok()?;
        Some((org, user))
    }

    pub fn member_role(&self) -> MemberRole {
        MemberRole::from_external(self.role.as_deref())
    }
}

/// Follows `path` through nested objects and returns a non-empty string.
fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    current
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn envelope(value: Value) -> WebhookEnvelope {
        WebhookEnvelope::parse(value.to_string().as_bytes()).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Envelope Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn envelope_requires_json_object() {
        assert!(matches!(
            WebhookEnvelope::parse(b"not json"),
            Err(WebhookError::InvalidJson(_))
        ));
        assert!(matches!(
            WebhookEnvelope::parse(b"[1,2]"),
            Err(WebhookError::InvalidJson(_))
        ));
    }

    #[test]
    fn envelope_requires_string_type() {
        assert_eq!(
            WebhookEnvelope::parse(br#"{"data":{}}"#),
            Err(WebhookError::MissingEventType)
        );
        assert_eq!(
            WebhookEnvelope::parse(br#"{"type":42}"#),
            Err(WebhookError::MissingEventType)
        );
    }

    #[test]
    fn envelope_without_data_has_null_data() {
        let env = envelope(json!({"type": "user.created"}));
        assert_eq!(env.data, Value::Null);
    }

    // ══════════════════════════════════════════════════════════════
    // Classification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn classifies_known_types() {
        let cases = [
            ("user.created", "user_upserted"),
            ("user.updated", "user_upserted"),
            ("organization.created", "organization_upserted"),
            ("organization.updated", "organization_upserted"),
            ("organizationMembership.created", "membership_created"),
            ("organizationMembership.deleted", "membership_deleted"),
        ];
        for (wire, kind) in cases {
            let event = IdentityEvent::from_envelope(&envelope(json!({"type": wire, "data": {}})));
            assert_eq!(event.kind(), kind, "{}", wire);
        }
    }

    #[test]
    fn empty_type_is_unknown() {
        let env = WebhookEnvelope::parse(br#"{"type": "", "data": {}}"#).unwrap();
        assert_eq!(IdentityEvent::from_envelope(&env), IdentityEvent::Unknown(String::new()));
    }

    #[test]
    fn unknown_type_keeps_name() {
        let event = IdentityEvent::from_envelope(&envelope(json!({"type": "session.created"})));
        assert_eq!(event, IdentityEvent::Unknown("session.created".to_string()));
    }

    // ══════════════════════════════════════════════════════════════
    // User Payload Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn user_payload_reads_primary_email() {
        let payload = UserPayload::parse(&json!({
            "id": "user_1",
            "email_addresses": [
                {"email_address": "first@x.io"},
                {"email_address": "second@x.io"}
            ],
            "first_name": "Ada",
            "last_name": null,
            "image_url": "https://img/u.png"
        }));

        assert_eq!(payload.external_id.as_deref(), Some("user_1"));
        assert_eq!(payload.email.as_deref(), Some("first@x.io"));
        assert_eq!(payload.first_name.as_deref(), Some("Ada"));
        assert_eq!(payload.last_name, None);

        let profile = payload.profile().unwrap();
        assert_eq!(profile.last_name, "");
        assert_eq!(profile.avatar_url, "https://img/u.png");
    }

    #[test]
    fn user_payload_without_email_has_no_profile() {
        let payload = UserPayload::parse(&json!({"id": "user_1", "email_addresses": []}));
        assert_eq!(payload.email, None);
        assert!(payload.profile().is_none());
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let payload = UserPayload::parse(&json!({
            "id": "",
            "email_addresses": [{"email_address": "a@x.io"}]
        }));
        assert_eq!(payload.external_id, None);
        assert!(payload.profile().is_none());
    }

    #[test]
    fn wrong_shapes_yield_none() {
        let payload = UserPayload::parse(&json!({
            "id": 7,
            "email_addresses": {"email_address": "a@x.io"},
            "first_name": ["Ada"]
        }));
        assert_eq!(payload, UserPayload::default());
    }

    #[test]
    fn non_object_data_yields_empty_payloads() {
        for data in [json!(null), json!("user_1"), json!([1, 2])] {
            assert_eq!(UserPayload::parse(&data), UserPayload::default());
            assert_eq!(OrganizationPayload::parse(&data), OrganizationPayload::default());
            assert_eq!(MembershipPayload::parse(&data), MembershipPayload::default());
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Organization Payload Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn organization_payload_reads_fields() {
        let payload = OrganizationPayload::parse(&json!({
            "id": "org_1",
            "name": "Acme",
            "slug": "acme",
            "image_url": "https://img/o.png",
            "created_by": "user_1"
        }));

        let profile = payload.profile().unwrap();
        assert_eq!(profile.external_id.as_str(), "org_1");
        assert_eq!(profile.logo_url, "https://img/o.png");
        assert_eq!(payload.creator().unwrap().as_str(), "user_1");
    }

    #[test]
    fn organization_payload_requires_slug() {
        let payload = OrganizationPayload::parse(&json!({"id": "org_1", "name": "Acme"}));
        assert!(payload.profile().is_none());
    }

    #[test]
    fn organization_without_creator() {
        let payload =
            OrganizationPayload::parse(&json!({"id": "org_1", "name": "Acme", "slug": "acme"}));
        assert!(payload.profile().is_some());
        assert!(payload.creator().is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Membership Payload Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn membership_payload_reads_nested_ids() {
        let payload = MembershipPayload::parse(&json!({
            "id": "orgmem_1",
            "organization": {"id": "org_1", "name": "Acme"},
            "public_user_data": {"user_id": "user_1"},
            "role": "admin"
        }));

        let (org, user) = payload.parties().unwrap();
        assert_eq!(org.as_str(), "org_1");
        assert_eq!(user.as_str(), "user_1");
        assert_eq!(payload.external_id.as_deref(), Some("orgmem_1"));
        assert_eq!(payload.member_role(), MemberRole::Admin);
    }

    #[test]
    fn membership_payload_missing_user_has_no_parties() {
        let payload = MembershipPayload::parse(&json!({"organization": {"id": "org_1"}}));
        assert!(payload.parties().is_none());
        assert_eq!(payload.member_role(), MemberRole::Member);
    }

    // ══════════════════════════════════════════════════════════════
    // Property Tests
    // ══════════════════════════════════════════════════════════════

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z_@.]{0,12}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("email_addresses".to_string()),
                        Just("email_address".to_string()),
                        Just("organization".to_string()),
                        Just("public_user_data".to_string()),
                        Just("user_id".to_string()),
                        Just("role".to_string()),
                        Just("slug".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..5
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn parsers_never_panic_on_arbitrary_json(data in arb_json()) {
            let user = UserPayload::parse(&data);
            let org = OrganizationPayload::parse(&data);
            let membership = MembershipPayload::parse(&data);

            let _ = user.profile();
            let _ = org.profile();
            let _ = membership.parties();
        }

        #[test]
        fn extracted_strings_are_never_empty(data in arb_json()) {
            let user = UserPayload::parse(&data);
            for field in [user.external_id, user.email, user.first_name, user.last_name, user.image_url]
                .into_iter()
                .flatten()
            {
                prop_assert!(!field.is_empty());
            }
        }

        #[test]
        fn membership_role_is_never_owner(data in arb_json()) {
            let membership = MembershipPayload::parse(&data);
            prop_assert_ne!(membership.member_role(), MemberRole::Owner);
        }

        #[test]
        fn any_role_string_maps_to_admin_or_member(role in ".{0,16}") {
            let mapped = MemberRole::from_external(Some(&role));
            if role == "admin" {
                prop_assert_eq!(mapped, MemberRole::Admin);
            } else {
                prop_assert_eq!(mapped, MemberRole::Member);
            }
        }
    }
}
