//! Account data returned by the upstream profile service.

use serde::{Deserialize, Deserializer};

/// Upstream sends `null` for unset fields as often as it omits them
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Profile record for one BIS identifier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_banner_hidden: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_redirection_enabled: bool,
    #[serde(default)]
    pub redirection_url: Option<String>,
    /// Creation order as delivered by the upstream
    #[serde(default, deserialize_with = "null_as_default")]
    pub buttons: Vec<Button>,
}

/// One link entry on the account page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub label: String,
    pub link: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Button {
    /// Sort key; a missing `order` sorts as 0
    pub fn sort_key(&self) -> i64 {
        self.order.unwrap_or(0)
    }

    pub fn is_visible(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

impl Account {
    /// Banner URL to render, if any
    pub fn visible_banner(&self) -> Option<&str> {
        if self.is_banner_hidden {
            return None;
        }
        self.banner_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Active buttons, ascending by `order`, ties kept in upstream order
    pub fn sorted_buttons(&self) -> Vec<&Button> {
        let mut buttons: Vec<&Button> = self.buttons.iter().filter(|b| b.is_visible()).collect();
        // sort_by_key is stable
        buttons.sort_by_key(|b| b.sort_key());
        buttons
    }
}

/// Result of one upstream lookup, after classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Success(Account),
    NotFound,
    /// Upstream rejected our credentials or endpoint
    Unauthorized,
    OtherError(u16),
    /// The call never produced an HTTP response (connect error, timeout, ...)
    TransportFailure(String),
}

/// Top-level upstream envelope
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum Envelope {
    Success { data: SuccessData },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuccessData {
    pub account: Account,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(label: &str, order: Option<i64>) -> Button {
        Button {
            label: label.to_string(),
            link: format!("https://example.com/{label}"),
            icon_url: None,
            order,
            is_active: None,
        }
    }

    fn account(buttons: Vec<Button>) -> Account {
        Account {
            name: "Test".to_string(),
            banner_url: None,
            is_banner_hidden: false,
            is_redirection_enabled: false,
            redirection_url: None,
            buttons,
        }
    }

    #[test]
    fn test_sorted_buttons_stable_on_ties() {
        let acc = account(vec![
            button("c", Some(2)),
            button("a1", None),
            button("b", Some(1)),
            button("a2", Some(0)),
            button("neg", Some(-3)),
            button("b2", Some(1)),
        ]);
        let labels: Vec<&str> = acc.sorted_buttons().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["neg", "a1", "a2", "b", "b2", "c"]);
    }

    #[test]
    fn test_inactive_buttons_filtered() {
        let mut hidden = button("hidden", Some(0));
        hidden.is_active = Some(false);
        let acc = account(vec![hidden, button("shown", Some(1))]);
        let sorted = acc.sorted_buttons();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].label, "shown");
    }

    #[test]
    fn test_visible_banner() {
        let mut acc = account(vec![]);
        assert_eq!(acc.visible_banner(), None);

        acc.banner_url = Some("https://cdn.example.com/b.png".to_string());
        assert_eq!(acc.visible_banner(), Some("https://cdn.example.com/b.png"));

        acc.is_banner_hidden = true;
        assert_eq!(acc.visible_banner(), None);

        acc.is_banner_hidden = false;
        acc.banner_url = Some("   ".to_string());
        assert_eq!(acc.visible_banner(), None);
    }

    #[test]
    fn test_account_wire_names() {
        let json = serde_json::json!({
            "name": "Cafe",
            "bannerUrl": "https://cdn.example.com/banner.jpg",
            "isBannerHidden": true,
            "isRedirectionEnabled": true,
            "redirectionUrl": "https://example.com",
            "buttons": [
                {"label": "Menu", "link": "https://example.com/menu", "iconUrl": "https://cdn.example.com/i.svg", "order": 4}
            ]
        });
        let acc: Account = serde_json::from_value(json).unwrap();
        assert!(acc.is_banner_hidden);
        assert!(acc.is_redirection_enabled);
        assert_eq!(acc.redirection_url.as_deref(), Some("https://example.com"));
        assert_eq!(acc.buttons[0].order, Some(4));
        assert_eq!(
            acc.buttons[0].icon_url.as_deref(),
            Some("https://cdn.example.com/i.svg")
        );
    }

    #[test]
    fn test_account_null_fields() {
        let json = serde_json::json!({
            "name": "Nulls",
            "bannerUrl": null,
            "isBannerHidden": null,
            "isRedirectionEnabled": null,
            "buttons": null
        });
        let acc: Account = serde_json::from_value(json).unwrap();
        assert!(!acc.is_banner_hidden);
        assert!(acc.buttons.is_empty());
    }

    #[test]
    fn test_account_minimal() {
        let acc: Account = serde_json::from_value(serde_json::json!({"name": "Only"})).unwrap();
        assert!(acc.buttons.is_empty());
        assert!(!acc.is_redirection_enabled);
    }
}
