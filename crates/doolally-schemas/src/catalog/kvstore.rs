//! Key/value store payloads.

use doolally_core::{
    union_with_null, FieldExt, NumberField, Schema, SchemaError, StaticTypeArray, StringField,
};

use crate::validators::hexstring_of_length;

pub(crate) const KEY_LEN: usize = 32;
pub(crate) const XOR_KEY_LEN: usize = 64;

const KEY: &str = "key to insert";
const VALUE: &str = "value to be stored with key";
const XOR_KEY: &str = "key used to encrypt value, itself encrypted";
const EXPIRY_TIME: &str = "expiry time in unix time";

fn expiry_time() -> NumberField {
    NumberField::new().unsigned().integer()
}

pub fn kv_element_req() -> Schema {
    Schema::builder("KVElementReq")
        .description("a single element in the k/v store")
        .field("key", hexstring_of_length(KEY_LEN).required().described(KEY))
        .field("value", StringField::new().min_length(1).required().described(VALUE))
        .field("xor_key", hexstring_of_length(XOR_KEY_LEN).required().described(XOR_KEY))
        .field("expiry_time", expiry_time().required().described(EXPIRY_TIME))
        .build()
}

pub fn kv_element_resp() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("KVElementResp")
        .description("an element in the k/v store which may or may not exist")
        .field("key", hexstring_of_length(KEY_LEN).required().described(KEY))
        .field(
            "value",
            union_with_null([StringField::new().min_length(1).described(VALUE)])?.required(),
        )
        .field(
            "xor_key",
            union_with_null([hexstring_of_length(XOR_KEY_LEN).described(XOR_KEY)])?.required(),
        )
        .field(
            "expiry_time",
            union_with_null([expiry_time().described(EXPIRY_TIME)])?.required(),
        )
        .build())
}

pub fn insert_kv_values_req() -> Schema {
    Schema::builder("InsertKVValuesReq")
        .description("insert array into k/v store")
        .field(
            "values",
            StaticTypeArray::new(kv_element_req())
                .min_length(1)
                .required()
                .described("elements to insert into k/v store"),
        )
        .build()
}

pub fn retrieve_kv_values_resp() -> Result<Schema, SchemaError> {
    Ok(Schema::builder("RetrieveKVValuesResp")
        .description("retrieve array of values from k/v store")
        .field(
            "values",
            StaticTypeArray::new(kv_element_resp()?)
                .min_length(1)
                .required()
                .described("received elements from k/v store"),
        )
        .build())
}

pub(super) fn schemas() -> Result<Vec<Schema>, SchemaError> {
    Ok(vec![
        kv_element_req(),
        kv_element_resp()?,
        insert_kv_values_req(),
        retrieve_kv_values_resp()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use doolally_core::validate;
    use serde_json::json;

    fn element() -> serde_json::Value {
        json!({
            "key": "0123456789abcdef0123456789abcdef",
            "value": "secret",
            "xorKey": "ab".repeat(32),
            "expiryTime": 1_700_000_000
        })
    }

    #[test]
    fn test_element_req_accepts_valid_element() {
        assert!(validate(&element(), &kv_element_req()).is_ok());
    }

    #[test]
    fn test_element_req_rejects_fractional_expiry() {
        let mut doc = element();
        doc["expiryTime"] = json!(1.5);
        let err = validate(&doc, &kv_element_req()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().path(), "/expiryTime");
    }

    #[test]
    fn test_element_resp_allows_nulls() {
        let doc = json!({
            "key": "0123456789abcdef0123456789abcdef",
            "value": null,
            "xorKey": null,
            "expiryTime": null
        });
        assert!(validate(&doc, &kv_element_resp().unwrap()).is_ok());
    }

    #[test]
    fn test_insert_requires_at_least_one_element() {
        let err = validate(&json!({"values": []}), &insert_kv_values_req()).unwrap_err();
        assert_eq!(err.as_validation().unwrap().message(), "collection too short 0 < 1");
        assert!(validate(&json!({"values": [element()]}), &insert_kv_values_req()).is_ok());
    }
}
