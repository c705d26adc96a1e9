//! Alert recipient model.
//!
//! Each tenant registers a list of e-mail alerts that the notification side of
//! the platform delivers when error records arrive.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A single alert e-mail registered for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecipient {
    /// Identifier of the alert entry.
    #[serde(default)]
    pub id: String,

    /// Sender address.
    #[validate(email(message = "Sender must be a valid e-mail address"))]
    pub from: String,

    /// Recipient address.
    #[validate(email(message = "Recipient must be a valid e-mail address"))]
    pub to: String,

    /// Subject line.
    #[serde(default)]
    pub subject: String,

    /// Message body template.
    #[serde(default)]
    pub body: String,
}

/// A tenant registration and the alerts attached to it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The tenant's unique id.
    #[validate(length(min = 1, message = "Registration id cannot be empty"))]
    pub registration_id: String,

    /// Registered alert e-mails.
    #[serde(default)]
    #[validate(nested)]
    pub emails: Vec<AlertRecipient>,
}
