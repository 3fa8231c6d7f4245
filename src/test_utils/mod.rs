#![allow(missing_docs)]

pub(crate) mod http;

pub(crate) use http::{
    assert_status_ok, get_header, get_test_app_state, get_test_server, parse_json_body,
};
