//! Acting session for private mutations.
//!
//! Logging in is out of scope: a session is an already-authenticated user ID
//! plus the device identifiers every private mutation repeats.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::adapters::Payload;
use crate::config::SessionSettings;
use crate::error::{Error, Result};

/// Identity the client acts as
#[derive(Debug, Clone)]
pub struct Session {
    user_id: Option<u64>,
    uuid: Uuid,
    device_id: String,
}

impl Session {
    /// Create a session for a logged-in user
    pub fn new(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::anonymous()
        }
    }

    /// Create a session with no user (read-only operations only)
    pub fn anonymous() -> Self {
        let uuid = Uuid::new_v4();
        Self {
            user_id: None,
            device_id: format!("android-{}", &uuid.simple().to_string()[..16]),
            uuid,
        }
    }

    /// Create from resolved configuration
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            user_id: settings.user_id,
            uuid: settings.uuid,
            device_id: settings.device_id.clone(),
        }
    }

    pub fn user_id(&self) -> Option<u64> {
        self.user_id
    }

    /// Fail with [`Error::AuthRequired`] unless a user is logged in
    pub fn require_login(&self) -> Result<u64> {
        self.user_id.ok_or(Error::AuthRequired)
    }

    /// Add the identity fields every private mutation carries
    pub fn with_default_data(&self, mut data: Payload) -> Payload {
        data.insert("_uuid".to_string(), json!(self.uuid.to_string()));
        data.insert(
            "_uid".to_string(),
            self.user_id
                .map(|id| Value::String(id.to_string()))
                .unwrap_or(Value::Null),
        );
        data.insert("device_id".to_string(), json!(self.device_id));
        data
    }

    /// Default data plus the network descriptor engagement endpoints expect
    pub fn with_action_data(&self, data: Payload) -> Payload {
        let mut data = self.with_default_data(data);
        data.insert("radio_type".to_string(), json!("wifi-none"));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_login() {
        assert!(matches!(
            Session::anonymous().require_login(),
            Err(Error::AuthRequired)
        ));
        assert_eq!(Session::new(7).require_login().unwrap(), 7);
    }

    #[test]
    fn test_default_data() {
        let session = Session::new(1903424587);
        let mut data = Payload::new();
        data.insert("media_id".to_string(), json!("1_2"));

        let data = session.with_default_data(data);
        assert_eq!(data["media_id"], "1_2");
        assert_eq!(data["_uid"], "1903424587");
        assert_eq!(data["_uuid"], session.uuid.to_string());
        assert!(data["device_id"].as_str().unwrap().starts_with("android-"));
        assert!(data.get("radio_type").is_none());
    }

    #[test]
    fn test_action_data() {
        let data = Session::new(1).with_action_data(Payload::new());
        assert_eq!(data["radio_type"], "wifi-none");
        assert_eq!(data["_uid"], "1");
    }
}
