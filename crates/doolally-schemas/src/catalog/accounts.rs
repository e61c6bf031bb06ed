//! Session, login and blob payloads.

use doolally_core::{union_with_null, FieldExt, Schema, SchemaError, StringField};

use crate::validators::{hexstring_of_length, https_url};

/// Session, user, login and trace ids are 32 hex digits.
pub(crate) const ID_LEN: usize = 32;
pub(crate) const BLOB_ID_LEN: usize = 48;

pub fn session_resp() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("SessionResp")
        .description("ids of current session")
        .field("session_id", hexstring_of_length(ID_LEN).required())
        .field("user_id", union_with_null([hexstring_of_length(ID_LEN)])?.required())
        .field("login_id", union_with_null([hexstring_of_length(ID_LEN)])?.required())
        .build())
}

pub fn new_login_req() -> Schema {
    Schema::builder("NewLoginReq")
        .description("start an oauth login from the current page")
        .field(
            "current_url",
            StringField::new()
                .required()
                .described("current url of browser")
                .validated_by(https_url()),
        )
        .build()
}

pub fn insert_blob_resp() -> Schema {
    Schema::builder("InsertBlobResp")
        .field("blob_id", hexstring_of_length(BLOB_ID_LEN).required())
        .build()
}

pub(super) fn schemas() -> Result<Vec<Schema>, SchemaError> {
    Ok(vec![session_resp()?, new_login_req(), insert_blob_resp()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use doolally_core::validate;
    use serde_json::json;

    const ID: &str = "00112233445566778899aabbccddeeff";

    #[test]
    fn test_session_resp_anonymous_session() {
        let doc = json!({"sessionId": ID, "userId": null, "loginId": null});
        assert!(validate(&doc, &session_resp().unwrap()).is_ok());
    }

    #[test]
    fn test_session_resp_rejects_short_user_id() {
        let doc = json!({"sessionId": ID, "userId": "abcd", "loginId": null});
        let err = validate(&doc, &session_resp().unwrap()).unwrap_err();
        let err = err.as_validation().unwrap();
        assert_eq!(err.path(), "/userId");
        assert_eq!(err.message(), "no element_field in union passes validation");
    }

    #[test]
    fn test_new_login_req_requires_https() {
        let schema = new_login_req();
        assert!(validate(&json!({"currentUrl": "https://example.com/a"}), &schema).is_ok());
        let err = validate(&json!({"currentUrl": "http://example.com/a"}), &schema).unwrap_err();
        assert_eq!(err.as_validation().unwrap().message(), "url scheme must be https");
    }

    #[test]
    fn test_insert_blob_resp_description_defaults_to_name() {
        let schema = insert_blob_resp();
        assert_eq!(schema.description(), "InsertBlobResp");
        assert!(validate(&json!({"blobId": "ab".repeat(24)}), &schema).is_ok());
    }
}
