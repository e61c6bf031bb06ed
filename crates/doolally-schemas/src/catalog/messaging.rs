//! Queue and websocket payloads.

use doolally_core::{
    union_with_null, FieldExt, Schema, SchemaError, SchemaLessObject, StaticTypeArray, StringField,
};

use super::accounts::ID_LEN;
use crate::validators::{email_address, hexstring_of_length, one_of};

const PARENT_ID_LEN: usize = 16;

const RABBIT_MSG_TYPES: [&str; 1] = ["email"];
const WEBSOCKET_MSG_TYPES: [&str; 2] = ["email.message", "tuliptheclown.contact"];

pub fn rabbit_message() -> Schema {
    Schema::builder("RabbitMessage")
        .description("envelope for messages on the queue")
        .field("trace_id", hexstring_of_length(ID_LEN).required())
        .field("parent_id", hexstring_of_length(PARENT_ID_LEN).required())
        .field(
            "type",
            StringField::new()
                .required()
                .validated_by(one_of("unrecognised rabbit msg type", RABBIT_MSG_TYPES)),
        )
        .field("payload", SchemaLessObject::new().required())
        .build()
}

pub fn email_message() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("EmailMessage")
        .description("email payload for rabbit")
        .field("email_addr", StringField::new().required().validated_by(email_address()))
        .field("message", StringField::new().min_length(1).required())
        .field("session_id", union_with_null([hexstring_of_length(ID_LEN)])?.required())
        .build())
}

pub fn websocket_req() -> Schema {
    let ids = || StaticTypeArray::new(hexstring_of_length(ID_LEN)).required();
    Schema::builder("WebSocketReq")
        .description("request to send to websocket service")
        .field("session_ids", ids())
        .field("user_ids", ids())
        .field("login_ids", ids())
        .field("message", StringField::new().min_length(1).required())
        .build()
}

pub fn websocket_message() -> Schema {
    Schema::builder("WebSocketMessage")
        .description("the message to be delivered over the websocket")
        .field(
            "type",
            StringField::new()
                .min_length(3)
                .required()
                .validated_by(one_of("unknown websocket message type", WEBSOCKET_MSG_TYPES)),
        )
        .field("trace_id", hexstring_of_length(ID_LEN).required())
        .field("parent_id", hexstring_of_length(PARENT_ID_LEN).required())
        .field("message", SchemaLessObject::new().required())
        .build()
}

pub fn email_sent_req() -> Schema {
    Schema::builder("EmailSentReq")
        .description("an email has been sent successfully")
        .field("email_addr", StringField::new().required().validated_by(email_address()))
        .field("message", StringField::new().required())
        .build()
}

pub(super) fn schemas() -> Result<Vec<Schema>, SchemaError> {
    Ok(vec![
        rabbit_message(),
        email_message()?,
        websocket_req(),
        websocket_message(),
        email_sent_req(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use doolally_core::validate;
    use serde_json::json;

    const TRACE: &str = "00112233445566778899aabbccddeeff";
    const PARENT: &str = "0011223344556677";

    #[test]
    fn test_rabbit_message_accepts_any_payload() {
        let doc = json!({
            "traceId": TRACE,
            "parentId": PARENT,
            "type": "email",
            "payload": {"nested": [1, {"x": null}]}
        });
        assert!(validate(&doc, &rabbit_message()).is_ok());
    }

    #[test]
    fn test_rabbit_message_unknown_type() {
        let doc = json!({"traceId": TRACE, "parentId": PARENT, "type": "sms", "payload": {}});
        let err = validate(&doc, &rabbit_message()).unwrap_err();
        let err = err.as_validation().unwrap();
        assert_eq!(err.path(), "/type");
        assert_eq!(err.message(), "unrecognised rabbit msg type sms");
    }

    #[test]
    fn test_email_message_checks_address() {
        let schema = email_message().unwrap();
        let good = json!({"emailAddr": "ann@example.com", "message": "hi", "sessionId": null});
        assert!(validate(&good, &schema).is_ok());
        let bad = json!({"emailAddr": "ann", "message": "hi", "sessionId": null});
        let err = validate(&bad, &schema).unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().message(),
            "expected exactly one @ in email address"
        );
    }

    #[test]
    fn test_websocket_req_id_paths() {
        let doc = json!({
            "sessionIds": [TRACE],
            "userIds": [TRACE, "nothex"],
            "loginIds": [],
            "message": "x"
        });
        let err = validate(&doc, &websocket_req()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().path(), "/userIds/1");
    }

    #[test]
    fn test_websocket_message_type_whitelist() {
        let doc = |kind: &str| {
            json!({"type": kind, "traceId": TRACE, "parentId": PARENT, "message": {}})
        };
        assert!(validate(&doc("email.message"), &websocket_message()).is_ok());
        let err = validate(&doc("ping"), &websocket_message()).unwrap_err();
        assert_eq!(
            err.as_validation().unwrap().message(),
            "unknown websocket message type ping"
        );
        let err = validate(&doc("ab"), &websocket_message()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().message(), "string too short 2 < 3");
    }
}
