// Unit tests for HttpStatusCode categorization.

use crate::HttpStatusCode;

#[test]
fn given_status_ranges_when_categorized_then_boundaries_are_correct() {
    assert!(HttpStatusCode(200).is_success());
    assert!(HttpStatusCode(299).is_success());
    assert!(!HttpStatusCode(300).is_success());

    assert!(HttpStatusCode(400).is_client_error());
    assert!(HttpStatusCode(499).is_client_error());
    assert!(!HttpStatusCode(500).is_client_error());

    assert!(HttpStatusCode(500).is_server_error());
    assert!(HttpStatusCode(599).is_server_error());
    assert!(!HttpStatusCode(400).is_server_error());
}

#[test]
fn given_transient_codes_when_checked_then_only_default_set_matches() {
    for code in [408, 429, 500, 502, 503, 504] {
        assert!(HttpStatusCode(code).is_transient(), "{code} is transient");
    }
    for code in [400, 401, 403, 404, 413, 418, 501, 505] {
        assert!(!HttpStatusCode(code).is_transient(), "{code} is terminal");
    }
}
